use crate::shared::frame::Frame;
use crate::shared::pixel_rect::PixelRect;

/// Domain interface for blurring rectangular regions within a frame.
///
/// Implementations modify the frame in-place (`&mut Frame`) to avoid allocation.
pub trait FrameBlurrer: Send {
    fn blur(&self, frame: &mut Frame, rects: &[PixelRect])
        -> Result<(), Box<dyn std::error::Error>>;
}

/// Blurs `rects` in place and hands the frame back for chaining.
pub fn redact<'a>(
    frame: &'a mut Frame,
    rects: &[PixelRect],
    blurrer: &dyn FrameBlurrer,
) -> Result<&'a mut Frame, Box<dyn std::error::Error>> {
    blurrer.blur(frame, rects)?;
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct InvertBlurrer;

    impl FrameBlurrer for InvertBlurrer {
        fn blur(
            &self,
            frame: &mut Frame,
            rects: &[PixelRect],
        ) -> Result<(), Box<dyn std::error::Error>> {
            if !rects.is_empty() {
                for b in frame.data_mut() {
                    *b = 255 - *b;
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_redact_returns_same_frame() {
        let mut frame = Frame::new(vec![10; 12], 2, 2, 3, 3);
        let out = redact(&mut frame, &[PixelRect::new(0, 0, 1, 1)], &InvertBlurrer).unwrap();
        assert_eq!(out.data()[0], 245);
        assert_eq!(out.index(), 3);
    }
}
