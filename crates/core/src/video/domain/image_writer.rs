use std::path::{Path, PathBuf};

use crate::shared::frame::Frame;

/// Persists displayed frames, e.g. for offline review of a monitoring run.
pub trait ImageWriter: Send {
    /// Writes `frame` into `dir` and returns the path that was written.
    fn write(&self, dir: &Path, frame: &Frame) -> Result<PathBuf, Box<dyn std::error::Error>>;
}
