use crate::detection::domain::path_estimate::PathDetection;
use crate::shared::frame::Frame;

/// Domain interface for per-frame path detection.
///
/// Implementations annotate the frame in place (`&mut Frame`); callers that
/// need the untouched pixels must clone beforehand. Detection holds no state
/// between calls, hence `&self`.
pub trait PathDetector: Send {
    fn detect(&self, frame: &mut Frame) -> PathDetection;
}
