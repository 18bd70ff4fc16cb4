use crate::shared::bounding_box::BoundingBox;

/// A blur target in absolute pixel coordinates.
///
/// Always lies inside the frame it was mapped for: `x + w <= frame_width`
/// and `y + h <= frame_height`. Zero-area rects are valid and blur nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Maps a normalized bounding box onto a `frame_width × frame_height`
    /// frame, rounding to the nearest pixel and clamping to the frame.
    pub fn from_bounding_box(bbox: &BoundingBox, frame_width: u32, frame_height: u32) -> Self {
        let x = scale_clamped(bbox.x_min, frame_width);
        let y = scale_clamped(bbox.y_min, frame_height);
        let w = scale_clamped(bbox.width, frame_width).min(frame_width - x);
        let h = scale_clamped(bbox.height, frame_height).min(frame_height - y);
        Self { x, y, w, h }
    }

    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    pub fn contains(&self, px: u32, py: u32) -> bool {
        let (px, py) = (px as u64, py as u64);
        px >= self.x as u64
            && px < self.x as u64 + self.w as u64
            && py >= self.y as u64
            && py < self.y as u64 + self.h as u64
    }

    /// Whether the rect lies entirely inside a `width × height` frame.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x as u64 + self.w as u64 <= width as u64
            && self.y as u64 + self.h as u64 <= height as u64
    }
}

fn scale_clamped(fraction: f64, extent: u32) -> u32 {
    let scaled = (fraction * extent as f64).round();
    if !fraction.is_finite() || scaled <= 0.0 {
        0
    } else {
        (scaled as u64).min(extent as u64) as u32
    }
}
