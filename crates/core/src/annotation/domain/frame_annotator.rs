use crate::detection::domain::path_estimate::PathEstimate;
use crate::shared::constants::GUIDE_LINE_HALF_LENGTH;
use crate::shared::frame::Frame;

/// Colors are RGB, matching [`Frame`]'s byte order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotationStyle {
    pub contour_color: [u8; 3],
    pub contour_thickness: u32,
    pub centroid_color: [u8; 3],
    pub centroid_radius: i32,
    pub guide_color: [u8; 3],
    pub guide_thickness: u32,
    pub guide_half_length: f64,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            contour_color: [0, 255, 0],
            contour_thickness: 2,
            centroid_color: [255, 0, 0],
            centroid_radius: 5,
            guide_color: [0, 0, 255],
            guide_thickness: 2,
            guide_half_length: GUIDE_LINE_HALF_LENGTH,
        }
    }
}

/// Domain interface for drawing a path estimate onto a frame.
///
/// Implementations modify the frame in-place (`&mut Frame`) to avoid allocation.
pub trait FrameAnnotator: Send {
    fn annotate(&self, frame: &mut Frame, estimate: &PathEstimate);
}
