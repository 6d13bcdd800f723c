use std::path::{Path, PathBuf};

use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

/// Writes each frame as `frame_{index:05}.png` using the `image` crate, so a
/// monitoring run leaves an ordered image sequence behind.
#[derive(Debug, Default)]
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn file_name(&self, index: usize) -> String {
        format!("frame_{index:05}.png")
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, dir: &Path, frame: &Frame) -> Result<PathBuf, Box<dyn std::error::Error>> {
        std::fs::create_dir_all(dir)?;

        let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
            .ok_or("Failed to create image from frame data")?;

        let path = dir.join(self.file_name(frame.index()));
        img.save(&path)?;
        Ok(path)
    }
}
