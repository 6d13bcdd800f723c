use crate::detection::domain::path_estimate::PathDetection;
use crate::guidance::domain::drive_command::DriveCommand;
use crate::shared::constants::DEFAULT_DEAD_BAND;

/// Maps a path detection to the drive command that would re-center the
/// path in the camera view.
///
/// The horizontal centroid offset is normalized by half the frame width,
/// so `dead_band` is a fraction in `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringPolicy {
    dead_band: f64,
}

impl SteeringPolicy {
    pub fn new(dead_band: f64) -> Self {
        Self {
            dead_band: dead_band.clamp(0.0, 1.0),
        }
    }

    pub fn dead_band(&self) -> f64 {
        self.dead_band
    }

    /// Signed offset of the path centroid from the frame's vertical center
    /// line, in `-1..=1` for centroids inside the frame.
    pub fn offset(&self, detection: &PathDetection, frame_width: u32) -> Option<f64> {
        let estimate = detection.estimate.as_ref()?;
        if frame_width == 0 {
            return None;
        }
        let half = frame_width as f64 / 2.0;
        Some((estimate.centroid.0 - half) / half)
    }

    pub fn command(&self, detection: &PathDetection, frame_width: u32) -> DriveCommand {
        match self.offset(detection, frame_width) {
            None => DriveCommand::Stop,
            Some(offset) if offset < -self.dead_band => DriveCommand::TurnLeft,
            Some(offset) if offset > self.dead_band => DriveCommand::TurnRight,
            Some(_) => DriveCommand::Forward,
        }
    }
}

impl Default for SteeringPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_DEAD_BAND)
    }
}
