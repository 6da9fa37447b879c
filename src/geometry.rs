/// Shared geometric primitives for the overlay selection engine.
///
/// Pointer coordinates live in overlay-logical space (`f64`); crop
/// rectangles live in the bitmap's backing-store pixel space (`u32`).

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionArea {
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
}

impl SelectionArea {
    /// A fresh gesture rectangle: both corners at the press point.
    pub const fn begin(x: f64, y: f64) -> Self {
        Self {
            start_x: x,
            start_y: y,
            end_x: x,
            end_y: y,
        }
    }

    /// Moves the trailing corner only; the anchor never changes for the
    /// duration of a gesture.
    pub fn extend(&mut self, x: f64, y: f64) {
        self.end_x = x;
        self.end_y = y;
    }

    /// Per-axis min/max normalization as `(left, top, width, height)`.
    /// The stored corners stay directional; this is consumption-time only.
    pub fn normalized(&self) -> (f64, f64, f64, f64) {
        let left = self.start_x.min(self.end_x);
        let top = self.start_y.min(self.end_y);
        let width = (self.end_x - self.start_x).abs();
        let height = (self.end_y - self.start_y).abs();
        (left, top, width, height)
    }

    /// Scales the rectangle into backing-store pixel space using the ratio
    /// between the bitmap's intrinsic size and its displayed size.
    ///
    /// Returns `None` when either scaled dimension lands under one device
    /// pixel; such gestures are rejected outright, never clamped up.
    pub fn scale_to_bitmap(
        &self,
        displayed: ViewportSize,
        bitmap: BitmapSize,
    ) -> Option<ScaledCropRect> {
        if displayed.width <= 0.0 || displayed.height <= 0.0 {
            return None;
        }

        let scale_x = f64::from(bitmap.width) / displayed.width;
        let scale_y = f64::from(bitmap.height) / displayed.height;
        let (left, top, width, height) = self.normalized();
        let scaled_width = width * scale_x;
        let scaled_height = height * scale_y;
        if scaled_width < 1.0 || scaled_height < 1.0 {
            return None;
        }

        let max_x = bitmap.width.saturating_sub(1);
        let max_y = bitmap.height.saturating_sub(1);
        let x = ((left * scale_x).floor().max(0.0) as u32).min(max_x);
        let y = ((top * scale_y).floor().max(0.0) as u32).min(max_y);
        let width = (scaled_width.round() as u32).clamp(1, bitmap.width - x);
        let height = (scaled_height.round() as u32).clamp(1, bitmap.height - y);
        Some(ScaledCropRect {
            x,
            y,
            width,
            height,
        })
    }
}

/// The overlay's current on-screen size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Intrinsic bitmap dimensions in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapSize {
    pub width: u32,
    pub height: u32,
}

impl BitmapSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn as_viewport(self) -> ViewportSize {
        ViewportSize::new(f64::from(self.width), f64::from(self.height))
    }
}

/// A crop rectangle in backing-store pixel space. Invariant: both
/// dimensions are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaledCropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}
