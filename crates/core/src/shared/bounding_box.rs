/// A detected face as fractions of the frame's width and height.
///
/// Produced by the face detector and mapped to pixels immediately; never
/// persisted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub width: f64,
    pub height: f64,
    pub score: f64,
}

impl BoundingBox {
    pub fn new(x_min: f64, y_min: f64, width: f64, height: f64) -> Self {
        Self {
            x_min,
            y_min,
            width,
            height,
            score: 1.0,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    /// Box covering the whole frame.
    pub fn full_frame() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    /// Builds a box from normalized corner coordinates, clipped to [0,1].
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let x1 = x1.clamp(0.0, 1.0);
        let y1 = y1.clamp(0.0, 1.0);
        let x2 = x2.clamp(0.0, 1.0);
        let y2 = y2.clamp(0.0, 1.0);
        Self::new(x1, y1, (x2 - x1).max(0.0), (y2 - y1).max(0.0))
    }

    pub fn x_max(&self) -> f64 {
        self.x_min + self.width
    }

    pub fn y_max(&self) -> f64 {
        self.y_min + self.height
    }

    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let ix1 = self.x_min.max(other.x_min);
        let iy1 = self.y_min.max(other.y_min);
        let ix2 = self.x_max().min(other.x_max());
        let iy2 = self.y_max().min(other.y_max());

        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        if inter == 0.0 {
            return 0.0;
        }
        let area_a = self.width * self.height;
        let area_b = other.width * other.height;
        inter / (area_a + area_b - inter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_corners_clips_to_unit_square() {
        let b = BoundingBox::from_corners(-0.2, 0.5, 0.4, 1.3);
        assert_relative_eq!(b.x_min, 0.0);
        assert_relative_eq!(b.y_min, 0.5);
        assert_relative_eq!(b.width, 0.4);
        assert_relative_eq!(b.height, 0.5);
    }

    #[test]
    fn test_from_corners_inverted_is_empty() {
        let b = BoundingBox::from_corners(0.6, 0.6, 0.4, 0.4);
        assert_relative_eq!(b.width, 0.0);
        assert_relative_eq!(b.height, 0.0);
    }

    #[test]
    fn test_iou_partial_overlap() {
        let a = BoundingBox::new(0.0, 0.0, 0.5, 0.5);
        let b = BoundingBox::new(0.25, 0.0, 0.5, 0.5);
        // inter = 0.25 * 0.5, union = 0.25 + 0.25 - 0.125
        assert_relative_eq!(a.iou(&b), 0.125 / 0.375);
    }

    #[test]
    fn test_iou_disjoint() {
        let a = BoundingBox::new(0.0, 0.0, 0.1, 0.1);
        let b = BoundingBox::new(0.5, 0.5, 0.1, 0.1);
        assert_relative_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_with_score() {
        let b = BoundingBox::full_frame().with_score(0.7);
        assert_relative_eq!(b.score, 0.7);
        assert_relative_eq!(b.x_max(), 1.0);
    }
}
