use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::pipeline::frame_redaction::FrameRedaction;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::error::RedactError;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_codec::VideoCodec;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

/// Outcome of a video run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoReport {
    pub output_path: PathBuf,
    pub frames_written: usize,
    pub faces_redacted: usize,
}

/// Video pipeline: decode → crop to even size → redact → encode, one frame
/// at a time.
///
/// Reader and writer are closed when `execute` returns, whatever the outcome.
pub struct RedactVideoUseCase {
    reader: Box<dyn VideoReader>,
    writer: Box<dyn VideoWriter>,
    redaction: FrameRedaction,
    logger: Box<dyn PipelineLogger>,
}

impl RedactVideoUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        writer: Box<dyn VideoWriter>,
        redaction: FrameRedaction,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            reader,
            writer,
            redaction,
            logger,
        }
    }

    pub fn execute(&mut self, input: &Path, output_dir: &Path) -> Result<VideoReport, RedactError> {
        if !input.exists() {
            return Err(RedactError::NotFound {
                path: input.to_path_buf(),
            });
        }

        let result = self.run(input, output_dir);
        self.reader.close();
        let closed = self.writer.close();

        match (result, closed) {
            (Ok(report), Ok(())) => {
                self.logger.summary();
                log::info!(
                    "Wrote {} frame(s) with {} face(s) redacted to {}",
                    report.frames_written,
                    report.faces_redacted,
                    report.output_path.display()
                );
                Ok(report)
            }
            (Ok(report), Err(e)) => Err(RedactError::io_write(report.output_path, e)),
            (Err(e), closed) => {
                if let Err(close_err) = closed {
                    log::warn!("Could not finalise output after error: {close_err}");
                }
                Err(e)
            }
        }
    }

    fn run(&mut self, input: &Path, output_dir: &Path) -> Result<VideoReport, RedactError> {
        let file_name = input
            .file_name()
            .ok_or_else(|| RedactError::read(input, "path has no file name"))?;

        let metadata = self
            .reader
            .open(input)
            .map_err(|e| RedactError::read(input, e))?;

        let (width, height) = metadata.even_dimensions();
        if width == 0 || height == 0 {
            return Err(RedactError::read(
                input,
                format!("{}x{} is too small to encode", metadata.width, metadata.height),
            ));
        }

        let output_path = output_dir.join(file_name);
        let codec = VideoCodec::for_path(&output_path);
        let output_metadata = VideoMetadata {
            width,
            height,
            fps: metadata.effective_fps(),
            ..metadata.clone()
        };
        let total = metadata.total_frames;

        let mut frames = self.reader.frames();
        let first = frames
            .next()
            .ok_or_else(|| RedactError::read(input, "no frames"))?
            .map_err(|e| RedactError::read(input, e))?;

        std::fs::create_dir_all(output_dir).map_err(|e| RedactError::io_write(output_dir, e))?;
        self.writer
            .open(&output_path, &output_metadata, codec)
            .map_err(|e| RedactError::io_write(&output_path, e))?;
        self.logger.info(&format!(
            "Redacting {} ({}x{} @ {:.2} fps, {}) -> {}",
            input.display(),
            width,
            height,
            output_metadata.fps,
            codec.fourcc(),
            output_path.display()
        ));

        let mut report = VideoReport {
            output_path,
            frames_written: 0,
            faces_redacted: 0,
        };

        let mut next = Some(first);
        while let Some(frame) = next.take() {
            let mut frame = if frame.width() == width && frame.height() == height {
                frame
            } else {
                frame.cropped(width, height)
            };

            let t0 = Instant::now();
            let faces = self.redaction.apply(&mut frame)?;
            self.logger.timing("redact", t0.elapsed().as_secs_f64() * 1000.0);
            self.logger.metric("faces", faces as f64);

            let t0 = Instant::now();
            self.writer
                .write(&frame)
                .map_err(|e| RedactError::io_write(&report.output_path, e))?;
            self.logger.timing("write", t0.elapsed().as_secs_f64() * 1000.0);

            report.frames_written += 1;
            report.faces_redacted += faces;
            self.logger.progress(report.frames_written, total);

            next = match frames.next() {
                Some(Ok(frame)) => Some(frame),
                Some(Err(e)) => {
                    log::warn!("Stopping at frame {}: {e}", report.frames_written);
                    None
                }
                None => None,
            };
        }

        Ok(report)
    }
}
