use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::shared::error::RedactError;

/// The kind of input named on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputKind {
    #[default]
    Image,
    Video,
    Webcam,
}

impl FromStr for InputKind {
    type Err = RedactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "image" => Ok(InputKind::Image),
            "video" => Ok(InputKind::Video),
            "webcam" => Ok(InputKind::Webcam),
            other => Err(RedactError::Config(format!(
                "unknown mode '{other}' (expected image, video or webcam)"
            ))),
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputKind::Image => "image",
            InputKind::Video => "video",
            InputKind::Webcam => "webcam",
        };
        f.write_str(name)
    }
}

/// What one run processes, with its input path where there is one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaMode {
    SingleImage(PathBuf),
    ImageDirectory(PathBuf),
    Video(PathBuf),
    LiveCamera,
}

impl MediaMode {
    /// Combines the requested kind with the input path.
    ///
    /// An image path that is a directory selects batch mode. Existence of
    /// files is checked later by the use case so the error names the path.
    pub fn resolve(kind: InputKind, path: Option<&Path>) -> Result<Self, RedactError> {
        let require_path = || {
            path.map(Path::to_path_buf).ok_or_else(|| {
                RedactError::Config(format!("--filePath is required in {kind} mode"))
            })
        };

        match kind {
            InputKind::Webcam => Ok(MediaMode::LiveCamera),
            InputKind::Video => Ok(MediaMode::Video(require_path()?)),
            InputKind::Image => {
                let path = require_path()?;
                if path.is_dir() {
                    Ok(MediaMode::ImageDirectory(path))
                } else {
                    Ok(MediaMode::SingleImage(path))
                }
            }
        }
    }

    pub fn input_path(&self) -> Option<&Path> {
        match self {
            MediaMode::SingleImage(p) | MediaMode::ImageDirectory(p) | MediaMode::Video(p) => {
                Some(p)
            }
            MediaMode::LiveCamera => None,
        }
    }
}
