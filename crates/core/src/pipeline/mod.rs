pub mod frame_redaction;
pub mod live_camera_use_case;
pub mod media_mode;
pub mod pipeline_logger;
pub mod redact_directory_use_case;
pub mod redact_image_use_case;
pub mod redact_video_use_case;
