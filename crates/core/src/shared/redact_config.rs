use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::shared::blur_strength::BlurStrength;
use crate::shared::constants::{DEFAULT_BLUR_STRENGTH, DEFAULT_OUTPUT_DIR, DEFAULT_PROGRESS_EVERY};
use crate::shared::error::RedactError;

/// Settings for one processing run.
///
/// Loaded from an optional JSON file; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactConfig {
    pub output_dir: PathBuf,
    pub blur_strength: i64,
    /// Explicit detector model file. Skips cache lookup when set.
    pub model_path: Option<PathBuf>,
    /// Where to download the detector model if it is not cached.
    pub model_url: Option<String>,
    /// Capture device for live mode; the platform default when unset.
    pub camera_device: Option<String>,
    pub progress_every: usize,
}

impl Default for RedactConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            blur_strength: DEFAULT_BLUR_STRENGTH as i64,
            model_path: None,
            model_url: None,
            camera_device: None,
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }
}

impl RedactConfig {
    pub fn load(path: &Path) -> Result<Self, RedactError> {
        let json = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => RedactError::NotFound {
                path: path.to_path_buf(),
            },
            _ => RedactError::read(path, e),
        })?;
        serde_json::from_str(&json)
            .map_err(|e| RedactError::Config(format!("{}: {e}", path.display())))
    }

    /// Checks the settings and returns the validated blur strength.
    pub fn validate(&self) -> Result<BlurStrength, RedactError> {
        if self.progress_every == 0 {
            return Err(RedactError::Config(
                "progress_every must be at least 1".to_string(),
            ));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(RedactError::Config(
                "output_dir must not be empty".to_string(),
            ));
        }
        BlurStrength::new(self.blur_strength)
    }
}
