//! Capture payload decoding: event envelope → base64 text → bitmap.
//!
//! Each conversion stage fails with its own error so the orchestration
//! boundary can log precisely what went wrong; none of them may take the
//! overlay down.

use base64::engine::general_purpose;
use base64::Engine as _;
use image::RgbaImage;
use serde_json::Value;
use thiserror::Error;

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("capture event payload has no recognizable shape")]
    InvalidPayloadShape,
    #[error("capture payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("bitmap creation failed: {0}")]
    BitmapCreation(#[from] image::ImageError),
}

/// Raw capture bytes as delivered by the shell, still base64 text.
/// Consumed exactly once; the decoded bitmap supersedes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImagePayload(String);

impl CapturedImagePayload {
    /// Probes the envelope shapes the shell is allowed to use: the base64
    /// text directly, or nested one level under `payload` or `data`.
    /// Anything else fails before any decoding is attempted.
    pub fn from_event(envelope: &Value) -> DecodeResult<Self> {
        let text = match envelope {
            Value::String(text) => Some(text.as_str()),
            Value::Object(fields) => fields
                .get("payload")
                .or_else(|| fields.get("data"))
                .and_then(Value::as_str),
            _ => None,
        };

        text.map(|text| Self(text.to_owned()))
            .ok_or(DecodeError::InvalidPayloadShape)
    }

    pub fn from_base64(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_base64(&self) -> &str {
        &self.0
    }
}

/// An already-decoded raster surface with intrinsic pixel dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBitmap {
    image: RgbaImage,
}

impl DecodedBitmap {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

/// Decodes the base64 text into a drawable bitmap. No side effects beyond
/// the returned surface.
pub fn decode(payload: &CapturedImagePayload) -> DecodeResult<DecodedBitmap> {
    let bytes = general_purpose::STANDARD.decode(payload.as_base64())?;
    let image = image::load_from_memory(&bytes)?.to_rgba8();
    Ok(DecodedBitmap { image })
}
