use std::cell::RefCell;

use crate::blurring::domain::frame_blurrer::FrameBlurrer;
use crate::shared::blur_strength::BlurStrength;
use crate::shared::frame::Frame;
use crate::shared::pixel_rect::PixelRect;

use super::box_filter;

/// CPU blurrer applying a square mean filter to each rectangle.
///
/// Each rect is blurred as an isolated crop, so pixels outside it are
/// neither read nor written.
pub struct BoxBlurrer {
    kernel_size: usize,
    roi_buf: RefCell<Vec<u8>>,
    blur_temp: RefCell<Vec<u64>>,
}

impl BoxBlurrer {
    pub fn new(strength: BlurStrength) -> Self {
        Self {
            kernel_size: strength.kernel_size(),
            roi_buf: RefCell::new(Vec::new()),
            blur_temp: RefCell::new(Vec::new()),
        }
    }

    pub fn kernel_size(&self) -> usize {
        self.kernel_size
    }
}

impl Default for BoxBlurrer {
    fn default() -> Self {
        Self::new(BlurStrength::default())
    }
}

impl FrameBlurrer for BoxBlurrer {
    fn blur(
        &self,
        frame: &mut Frame,
        rects: &[PixelRect],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let fw = frame.width();
        let fh = frame.height();
        let channels = frame.channels() as usize;
        let data = frame.data_mut();

        for &rect in rects {
            if rect.is_empty() {
                continue;
            }
            if !rect.fits_within(fw, fh) {
                return Err(format!("{rect:?} lies outside the {fw}x{fh} frame").into());
            }

            let mut roi = self.roi_buf.borrow_mut();
            box_filter::extract_roi(data, fw as usize, channels, rect, &mut roi);

            let mut temp = self.blur_temp.borrow_mut();
            box_filter::separable_box_blur(
                &mut roi,
                rect.w as usize,
                rect.h as usize,
                channels,
                self.kernel_size,
                &mut temp,
            );

            box_filter::write_roi_back(data, &roi, fw as usize, channels, rect);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::bounding_box::BoundingBox;
    use rstest::rstest;

    fn make_frame(width: u32, height: u32, value: u8) -> Frame {
        let data = vec![value; (width * height * 3) as usize];
        Frame::new(data, width, height, 3, 0)
    }

    /// Diagonal gradient so any averaging changes interior pixels.
    fn gradient_frame(width: u32, height: u32) -> Frame {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((x * 7 + y * 13) % 256) as u8;
                data.extend_from_slice(&[v, v / 2, 255 - v]);
            }
        }
        Frame::new(data, width, height, 3, 0)
    }

    fn blurrer(k: i64) -> BoxBlurrer {
        BoxBlurrer::new(BlurStrength::new(k).unwrap())
    }

    fn pixel(frame: &Frame, x: u32, y: u32) -> &[u8] {
        let idx = ((y * frame.width() + x) * 3) as usize;
        &frame.data()[idx..idx + 3]
    }

    #[test]
    fn test_no_rects_frame_unchanged() {
        let mut frame = gradient_frame(50, 50);
        let original = frame.data().to_vec();
        blurrer(5).blur(&mut frame, &[]).unwrap();
        assert_eq!(frame.data(), &original[..]);
    }

    #[test]
    fn test_preserves_frame_index() {
        let mut frame = Frame::new(vec![128u8; 100 * 100 * 3], 100, 100, 3, 42);
        blurrer(5).blur(&mut frame, &[PixelRect::new(0, 0, 10, 10)]).unwrap();
        assert_eq!(frame.index(), 42);
    }

    #[test]
    fn test_reference_scenario_blurs_only_inside_rect() {
        let original = gradient_frame(100, 100);
        let mut frame = original.clone();
        let rect = PixelRect::from_bounding_box(&BoundingBox::new(0.1, 0.1, 0.2, 0.2), 100, 100);
        assert_eq!(rect, PixelRect::new(10, 10, 20, 20));

        blurrer(10).blur(&mut frame, &[rect]).unwrap();

        let mut changed_inside = 0;
        for y in 0..100 {
            for x in 0..100 {
                let before = pixel(&original, x, y);
                let after = pixel(&frame, x, y);
                if rect.contains(x, y) {
                    if before != after {
                        changed_inside += 1;
                    }
                } else {
                    assert_eq!(before, after, "pixel ({x},{y}) outside rect changed");
                }
            }
        }
        assert!(changed_inside > 0, "no pixel inside the rect was filtered");
    }

    #[test]
    fn test_full_frame_rect_blurs_whole_frame() {
        let mut frame = make_frame(50, 50, 0);
        let center = (25 * 50 + 25) * 3;
        frame.data_mut()[center] = 255;
        let corner_marker = 0;
        frame.data_mut()[corner_marker] = 255;

        let rect = PixelRect::from_bounding_box(&BoundingBox::full_frame(), 50, 50);
        blurrer(5).blur(&mut frame, &[rect]).unwrap();

        assert!(frame.data()[center] < 255);
        assert!(frame.data()[corner_marker] < 255);
        // Brightness spreads to neighbours
        let neighbour = (24 * 50 + 25) * 3;
        assert!(frame.data()[neighbour] > 0);
    }

    #[test]
    fn test_zero_size_rect_skipped() {
        let mut frame = gradient_frame(30, 30);
        let original = frame.data().to_vec();
        blurrer(5)
            .blur(&mut frame, &[PixelRect::new(10, 10, 0, 20)])
            .unwrap();
        assert_eq!(frame.data(), &original[..]);
    }

    #[test]
    fn test_strength_one_is_noop() {
        let mut frame = gradient_frame(30, 30);
        let original = frame.data().to_vec();
        blurrer(1)
            .blur(&mut frame, &[PixelRect::new(0, 0, 30, 30)])
            .unwrap();
        assert_eq!(frame.data(), &original[..]);
    }

    #[test]
    fn test_multiple_rects_independent() {
        let mut frame = make_frame(100, 100, 0);
        let idx1 = (15 * 100 + 15) * 3;
        let idx2 = (75 * 100 + 75) * 3;
        frame.data_mut()[idx1] = 255;
        frame.data_mut()[idx2] = 255;

        blurrer(5)
            .blur(
                &mut frame,
                &[PixelRect::new(10, 10, 20, 20), PixelRect::new(70, 70, 20, 20)],
            )
            .unwrap();

        assert!(frame.data()[idx1] < 255);
        assert!(frame.data()[idx2] < 255);
    }

    #[test]
    fn test_reblur_selects_same_region_but_changes_values() {
        let original = gradient_frame(60, 60);
        let rect = PixelRect::new(5, 5, 30, 30);
        let b = blurrer(7);

        let mut once = original.clone();
        b.blur(&mut once, &[rect]).unwrap();
        let mut twice = once.clone();
        b.blur(&mut twice, &[rect]).unwrap();

        for y in 0..60 {
            for x in 0..60 {
                if !rect.contains(x, y) {
                    assert_eq!(pixel(&original, x, y), pixel(&twice, x, y));
                }
            }
        }
        assert_ne!(once.data(), twice.data());
    }

    #[test]
    fn test_out_of_bounds_rect_is_error() {
        let mut frame = make_frame(10, 10, 0);
        let result = blurrer(3).blur(&mut frame, &[PixelRect::new(5, 5, 10, 10)]);
        assert!(result.is_err());
    }

    #[rstest]
    #[case(PixelRect::new(u32::MAX, 0, 1, 1))]
    #[case(PixelRect::new(0, u32::MAX, 1, 1))]
    #[case(PixelRect::new(5, 5, u32::MAX, 2))]
    fn test_wrapping_rect_is_error(#[case] rect: PixelRect) {
        let mut frame = gradient_frame(10, 10);
        let original = frame.data().to_vec();
        assert!(blurrer(3).blur(&mut frame, &[rect]).is_err());
        assert_eq!(frame.data(), &original[..]);
    }

    #[test]
    fn test_huge_strength_keeps_uniform_frame() {
        let mut frame = make_frame(2, 2, 255);
        blurrer(20_000_000)
            .blur(&mut frame, &[PixelRect::new(0, 0, 2, 2)])
            .unwrap();
        assert!(frame.data().iter().all(|&v| v == 255), "got {:?}", frame.data());
    }

    #[test]
    fn test_default_kernel_size() {
        assert_eq!(BoxBlurrer::default().kernel_size(), 40);
    }
}
