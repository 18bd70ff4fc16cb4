use std::path::Path;

use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

/// Writes a single frame to an image file using the `image` crate.
///
/// The parent directory must already exist.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if frame.channels() != 3 {
            return Err(format!("cannot save a {}-channel frame", frame.channels()).into());
        }

        let rgb = frame.to_rgb();
        let img = image::RgbImage::from_raw(rgb.width(), rgb.height(), rgb.data().to_vec())
            .ok_or("Failed to create image from frame data")?;

        img.save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame::PixelFormat;

    fn make_frame(width: u32, height: u32, rgb: [u8; 3]) -> Frame {
        let data = rgb.repeat((width * height) as usize);
        Frame::new(data, width, height, 3, 0)
    }

    #[test]
    fn test_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let frame = make_frame(100, 80, [50, 100, 200]);
        ImageFileWriter::new().write(&path, &frame).unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_png_preserves_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let frame = make_frame(50, 50, [50, 100, 200]);
        ImageFileWriter::new().write(&path, &frame).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (50, 50));
        assert_eq!(img.get_pixel(0, 0).0, [50, 100, 200]);
    }

    #[test]
    fn test_bgr_frame_is_saved_as_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let frame = make_frame(4, 4, [200, 100, 50]).with_pixel_format(PixelFormat::Bgr);
        ImageFileWriter::new().write(&path, &frame).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.get_pixel(1, 1).0, [50, 100, 200]);
    }

    #[test]
    fn test_format_follows_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.JPG");
        let frame = make_frame(32, 32, [10, 20, 30]);
        ImageFileWriter::new().write(&path, &frame).unwrap();

        let format = image::ImageFormat::from_path(&path).unwrap();
        assert_eq!(format, image::ImageFormat::Jpeg);
        assert!(image::open(&path).is_ok());
    }

    #[test]
    fn test_write_into_missing_dir_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let frame = make_frame(10, 10, [0, 0, 0]);
        let path = dir.path().join("missing").join("out.png");
        assert!(ImageFileWriter::new().write(&path, &frame).is_err());
    }
}
