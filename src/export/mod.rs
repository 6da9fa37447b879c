//! Crop & export: reads exactly the selected rectangle out of the source
//! bitmap and re-encodes it, losslessly, as a PNG data URL.

use base64::engine::general_purpose;
use base64::Engine as _;
use image::codecs::png::PngEncoder;
use image::{imageops, ExtendedColorType, ImageEncoder, RgbaImage};
use thiserror::Error;

use crate::geometry::{BitmapSize, ScaledCropRect, SelectionArea, ViewportSize};

const DATA_URL_PREFIX: &str = "data:image/png;base64,";

pub type ExportResult<T> = std::result::Result<T, ExportError>;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("png encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Re-encoded crop ready for the persistence boundary. Produced once per
/// completed gesture and not retained afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CroppedImagePayload {
    data_url: String,
    rect: ScaledCropRect,
}

impl CroppedImagePayload {
    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    pub fn rect(&self) -> ScaledCropRect {
        self.rect
    }
}

/// Crops `selection` out of `bitmap`. The displayed-to-intrinsic ratio is
/// taken from `displayed` at call time, so window resizes between paint
/// and crop are honoured. Returns `Ok(None)` for selections spanning less
/// than one device pixel on either axis; the source is never mutated.
pub fn crop(
    bitmap: &RgbaImage,
    selection: &SelectionArea,
    displayed: ViewportSize,
) -> ExportResult<Option<CroppedImagePayload>> {
    let bounds = BitmapSize::new(bitmap.width(), bitmap.height());
    let Some(rect) = selection.scale_to_bitmap(displayed, bounds) else {
        tracing::warn!(?selection, "selection under one device pixel; crop rejected");
        return Ok(None);
    };

    let region = imageops::crop_imm(bitmap, rect.x, rect.y, rect.width, rect.height).to_image();
    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(
        region.as_raw(),
        region.width(),
        region.height(),
        ExtendedColorType::Rgba8,
    )?;

    let mut data_url = String::from(DATA_URL_PREFIX);
    general_purpose::STANDARD.encode_string(&png, &mut data_url);
    Ok(Some(CroppedImagePayload { data_url, rect }))
}

/// Decodes a payload produced by [`crop`] back into pixels. Used by hosts
/// that store raw rasters rather than data URLs.
pub fn decode_data_url(data_url: &str) -> Option<RgbaImage> {
    let encoded = data_url.strip_prefix(DATA_URL_PREFIX)?;
    let bytes = general_purpose::STANDARD.decode(encoded).ok()?;
    Some(image::load_from_memory(&bytes).ok()?.to_rgba8())
}
