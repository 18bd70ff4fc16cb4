pub const BLAZEFACE_MODEL_NAME: &str = "blazeface_short_range.onnx";

/// Minimum detector score for a face to be redacted.
pub const MIN_DETECTION_CONFIDENCE: f64 = 0.5;

pub const DEFAULT_BLUR_STRENGTH: u32 = 40;

/// Output frame rate when the source does not report one.
pub const FALLBACK_FPS: f64 = 25.0;

pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Log a progress line every this many frames.
pub const DEFAULT_PROGRESS_EVERY: usize = 10;

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];
