pub mod ffmpeg_stream_source;
pub mod image_file_source;
pub mod image_file_writer;
