use image::RgbaImage;

use crate::decode::DecodedBitmap;
use crate::geometry::{BitmapSize, ViewportSize};

/// The overlay's drawing surface. Painting a new capture resizes the
/// surface to the bitmap's intrinsic dimensions, which discards whatever
/// was drawn before; nothing of a previous capture survives.
#[derive(Debug, Default)]
pub struct CanvasSurface {
    bitmap: Option<RgbaImage>,
    displayed: Option<ViewportSize>,
}

impl CanvasSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resize-to-fit and paint at the origin in one step.
    pub fn paint(&mut self, bitmap: DecodedBitmap) {
        self.bitmap = Some(bitmap.into_image());
    }

    pub fn clear(&mut self) {
        self.bitmap = None;
    }

    pub fn bitmap(&self) -> Option<&RgbaImage> {
        self.bitmap.as_ref()
    }

    pub fn size(&self) -> Option<BitmapSize> {
        self.bitmap
            .as_ref()
            .map(|bitmap| BitmapSize::new(bitmap.width(), bitmap.height()))
    }

    /// Records the surface's current on-screen size. The host reports this
    /// whenever the overlay window is laid out or resized.
    pub fn set_displayed_size(&mut self, displayed: ViewportSize) {
        self.displayed = Some(displayed);
    }

    /// The size crop math should scale against. Falls back to the
    /// intrinsic bitmap size (a 1:1 ratio) until the host reports layout.
    pub fn displayed_size(&self) -> Option<ViewportSize> {
        self.displayed
            .or_else(|| self.size().map(BitmapSize::as_viewport))
    }
}
