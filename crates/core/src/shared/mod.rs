pub mod blur_strength;
pub mod bounding_box;
pub mod constants;
pub mod error;
pub mod frame;
pub mod pixel_rect;
pub mod redact_config;
pub mod video_metadata;
