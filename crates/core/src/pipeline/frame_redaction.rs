use crate::blurring::domain::frame_blurrer::{redact, FrameBlurrer};
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::error::RedactError;
use crate::shared::frame::Frame;
use crate::shared::pixel_rect::PixelRect;

/// Per-frame step shared by every mode: detect → map → blur.
///
/// Owns the detector (and with it the model session) for the whole run.
pub struct FrameRedaction {
    detector: Box<dyn FaceDetector>,
    blurrer: Box<dyn FrameBlurrer>,
}

impl FrameRedaction {
    pub fn new(detector: Box<dyn FaceDetector>, blurrer: Box<dyn FrameBlurrer>) -> Self {
        Self { detector, blurrer }
    }

    /// Blurs every detected face in `frame` and returns how many were blurred.
    pub fn apply(&mut self, frame: &mut Frame) -> Result<usize, RedactError> {
        let boxes = self
            .detector
            .detect(frame)
            .map_err(|e| RedactError::Detection(e.to_string()))?;

        let rects: Vec<PixelRect> = boxes
            .iter()
            .map(|b| PixelRect::from_bounding_box(b, frame.width(), frame.height()))
            .filter(|r| !r.is_empty())
            .collect();

        if !rects.is_empty() {
            redact(frame, &rects, self.blurrer.as_ref())
                .map_err(|e| RedactError::Blur(e.to_string()))?;
        }
        log::trace!("Frame {}: {} face(s)", frame.index(), rects.len());
        Ok(rects.len())
    }
}
