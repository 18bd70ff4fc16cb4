use std::path::{Path, PathBuf};

use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::redact_image_use_case::RedactImageUseCase;
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::error::RedactError;

/// Outcome of a directory run. One bad file does not stop the batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Output paths, in processing order.
    pub processed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, RedactError)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.processed.len() + self.failed.len()
    }
}

/// Batch pipeline: redacts every image directly inside a directory.
pub struct RedactDirectoryUseCase {
    image: RedactImageUseCase,
    logger: Box<dyn PipelineLogger>,
}

impl RedactDirectoryUseCase {
    pub fn new(image: RedactImageUseCase, logger: Box<dyn PipelineLogger>) -> Self {
        Self { image, logger }
    }

    pub fn execute(&mut self, dir: &Path, output_dir: &Path) -> Result<BatchReport, RedactError> {
        if !dir.exists() {
            return Err(RedactError::NotFound {
                path: dir.to_path_buf(),
            });
        }

        let inputs = list_images(dir)?;
        let total = inputs.len();
        self.logger
            .info(&format!("Found {total} image(s) in {}", dir.display()));

        let mut report = BatchReport::default();
        for (i, input) in inputs.into_iter().enumerate() {
            match self.image.execute(&input, output_dir) {
                Ok(output) => report.processed.push(output),
                Err(e) => {
                    log::warn!("Skipping {}: {e}", input.display());
                    report.failed.push((input, e));
                }
            }
            self.logger.progress(i + 1, total);
        }

        self.logger.info(&format!(
            "Redacted {} of {total} image(s), {} failed",
            report.processed.len(),
            report.failed.len()
        ));
        self.logger.summary();
        Ok(report)
    }
}

/// Regular files in `dir` with an image extension, sorted by path.
fn list_images(dir: &Path) -> Result<Vec<PathBuf>, RedactError> {
    let entries = std::fs::read_dir(dir).map_err(|e| RedactError::read(dir, e))?;

    let mut images: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && has_image_extension(path))
        .collect();
    images.sort();
    Ok(images)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}
