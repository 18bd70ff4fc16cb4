pub mod camera_source;
pub mod image_writer;
pub mod video_codec;
pub mod video_reader;
pub mod video_writer;
