mod ffmpeg_decode;
pub mod ffmpeg_camera;
pub mod ffmpeg_reader;
pub mod ffmpeg_writer;
pub mod image_file_reader;
pub mod image_file_writer;
