use std::fmt;

use imageproc::point::Point;

/// Outcome classification for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionStatus {
    PathOk,
    NoPath,
}

impl fmt::Display for DetectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectionStatus::PathOk => write!(f, "path OK"),
            DetectionStatus::NoPath => write!(f, "no path detected"),
        }
    }
}

/// Geometry derived from the largest dark region of a single frame.
///
/// Never carried across frames.
#[derive(Debug, Clone, PartialEq)]
pub struct PathEstimate {
    /// Boundary of the selected region, in pixel coordinates.
    pub contour: Vec<Point<i32>>,
    /// Enclosed area of `contour` (zeroth moment).
    pub area: f64,
    pub centroid: (f64, f64),
    /// Unit direction of the fitted line.
    pub direction: (f64, f64),
    /// A point on the fitted line.
    pub line_point: (f64, f64),
}

impl PathEstimate {
    /// Endpoints of the guide segment through the centroid, extended
    /// `half_length` along the fitted direction on both sides.
    pub fn guide_segment(&self, half_length: f64) -> ((f64, f64), (f64, f64)) {
        let (cx, cy) = self.centroid;
        let (vx, vy) = self.direction;
        (
            (cx - vx * half_length, cy - vy * half_length),
            (cx + vx * half_length, cy + vy * half_length),
        )
    }

    /// Angle of the guide line from vertical, in degrees, folded into
    /// `(-90, 90]`. Positive leans right going up the frame.
    pub fn heading_degrees(&self) -> f64 {
        let (vx, vy) = self.direction;
        // Orient the vector to point up the image (negative y).
        let (vx, vy) = if vy > 0.0 { (-vx, -vy) } else { (vx, vy) };
        let angle = vx.atan2(-vy).to_degrees();
        if angle <= -90.0 {
            angle + 180.0
        } else {
            angle
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathDetection {
    pub status: DetectionStatus,
    pub estimate: Option<PathEstimate>,
}

impl PathDetection {
    pub fn none() -> Self {
        Self {
            status: DetectionStatus::NoPath,
            estimate: None,
        }
    }

    pub fn found(estimate: PathEstimate) -> Self {
        Self {
            status: DetectionStatus::PathOk,
            estimate: Some(estimate),
        }
    }
}
