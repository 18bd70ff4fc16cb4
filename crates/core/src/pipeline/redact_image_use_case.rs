use std::path::{Path, PathBuf};

use crate::pipeline::frame_redaction::FrameRedaction;
use crate::shared::error::RedactError;
use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_reader::VideoReader;

/// Single-image pipeline: read → detect → blur → write.
pub struct RedactImageUseCase {
    reader: Box<dyn VideoReader>,
    image_writer: Box<dyn ImageWriter>,
    redaction: FrameRedaction,
}

impl RedactImageUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        image_writer: Box<dyn ImageWriter>,
        redaction: FrameRedaction,
    ) -> Self {
        Self {
            reader,
            image_writer,
            redaction,
        }
    }

    /// Redacts `input` into `output_dir/<file name>` and returns that path.
    ///
    /// Nothing is created when `input` does not exist.
    pub fn execute(&mut self, input: &Path, output_dir: &Path) -> Result<PathBuf, RedactError> {
        if !input.exists() {
            return Err(RedactError::NotFound {
                path: input.to_path_buf(),
            });
        }
        let file_name = input
            .file_name()
            .ok_or_else(|| RedactError::read(input, "path has no file name"))?;

        std::fs::create_dir_all(output_dir).map_err(|e| RedactError::io_write(output_dir, e))?;

        let frame = self.read_frame(input);
        self.reader.close();
        let mut frame = frame?;

        let faces = self.redaction.apply(&mut frame)?;

        let output_path = output_dir.join(file_name);
        self.image_writer
            .write(&output_path, &frame)
            .map_err(|e| RedactError::io_write(&output_path, e))?;

        log::info!(
            "Redacted {faces} face(s): {} -> {}",
            input.display(),
            output_path.display()
        );
        Ok(output_path)
    }

    fn read_frame(&mut self, input: &Path) -> Result<Frame, RedactError> {
        self.reader
            .open(input)
            .map_err(|e| RedactError::read(input, e))?;
        self.reader
            .frames()
            .next()
            .ok_or_else(|| RedactError::read(input, "no image data"))?
            .map_err(|e| RedactError::read(input, e))
    }
}
