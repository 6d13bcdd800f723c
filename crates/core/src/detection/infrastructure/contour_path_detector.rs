use imageproc::point::Point;

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::annotation::infrastructure::imageproc_annotator::ImageprocAnnotator;
use crate::detection::domain::path_detector::PathDetector;
use crate::detection::domain::path_estimate::{PathDetection, PathEstimate};
use crate::detection::infrastructure::contours::{dark_mask, external_contours, largest_by_area};
use crate::detection::infrastructure::line_fit::{fit_line, DistanceKind};
use crate::shared::constants::{LINE_FIT_AEPS, LINE_FIT_REPS, PATH_THRESHOLD};
use crate::shared::frame::Frame;

/// Dark-path detector: grayscale → inverse threshold → largest external
/// contour → line fit and centroid → annotation.
///
/// Assumes the path is darker than its surroundings. Stateless across
/// frames; the same input always yields the same detection.
pub struct ContourPathDetector {
    threshold: u8,
    distance: DistanceKind,
    annotator: Option<Box<dyn FrameAnnotator>>,
}

impl ContourPathDetector {
    pub fn new(annotator: Option<Box<dyn FrameAnnotator>>) -> Self {
        Self {
            threshold: PATH_THRESHOLD,
            distance: DistanceKind::L2,
            annotator,
        }
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_distance(mut self, distance: DistanceKind) -> Self {
        self.distance = distance;
        self
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }
}

impl Default for ContourPathDetector {
    fn default() -> Self {
        Self::new(Some(Box::new(ImageprocAnnotator::default())))
    }
}

impl PathDetector for ContourPathDetector {
    fn detect(&self, frame: &mut Frame) -> PathDetection {
        let mask = dark_mask(&frame.to_luma(), self.threshold);
        let mut contours = external_contours(&mask);

        let Some((index, moments)) = largest_by_area(&contours) else {
            return PathDetection::none();
        };
        let contour: Vec<Point<i32>> = contours.swap_remove(index);

        let points: Vec<(f64, f64)> = contour.iter().map(|p| (p.x as f64, p.y as f64)).collect();
        let fit = fit_line(&points, self.distance, LINE_FIT_REPS, LINE_FIT_AEPS);

        let centroid = moments.centroid().unwrap_or((
            frame.width() as f64 / 2.0,
            frame.height() as f64 / 2.0,
        ));

        let estimate = PathEstimate {
            contour,
            area: moments.m00,
            centroid,
            direction: fit.direction,
            line_point: fit.point,
        };
        log::trace!(
            "Frame {}: {} contours, area {:.0}, centroid ({:.1}, {:.1})",
            frame.index(),
            contours.len() + 1,
            estimate.area,
            centroid.0,
            centroid.1
        );

        if let Some(annotator) = &self.annotator {
            annotator.annotate(frame, &estimate);
        }
        PathDetection::found(estimate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::path_estimate::DetectionStatus;
    use approx::assert_relative_eq;
    use rstest::rstest;

    const LIGHT: [u8; 3] = [200, 200, 200];
    const DARK: [u8; 3] = [20, 20, 20];

    fn paint_rect(frame: &mut Frame, x0: u32, y0: u32, w: u32, h: u32, rgb: [u8; 3]) {
        let width = frame.width();
        let data = frame.data_mut();
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                let offset = ((y * width + x) * 3) as usize;
                data[offset..offset + 3].copy_from_slice(&rgb);
            }
        }
    }

    fn bare_detector() -> ContourPathDetector {
        ContourPathDetector::new(None)
    }

    #[test]
    fn test_light_frame_is_untouched_and_reports_no_path() {
        let original = Frame::filled(64, 48, LIGHT, 0);
        let mut frame = original.clone();
        let detection = ContourPathDetector::default().detect(&mut frame);
        assert_eq!(detection.status, DetectionStatus::NoPath);
        assert_eq!(detection.status.to_string(), "no path detected");
        assert!(detection.estimate.is_none());
        assert_eq!(frame, original);
    }

    #[test]
    fn test_pixels_just_above_threshold_are_background() {
        let mut frame = Frame::filled(32, 32, LIGHT, 0);
        paint_rect(&mut frame, 8, 8, 10, 10, [61, 61, 61]);
        assert_eq!(bare_detector().detect(&mut frame).status, DetectionStatus::NoPath);

        paint_rect(&mut frame, 8, 8, 10, 10, [60, 60, 60]);
        assert_eq!(bare_detector().detect(&mut frame).status, DetectionStatus::PathOk);
    }

    #[test]
    fn test_single_blob_centroid_inside_bounding_box() {
        let mut frame = Frame::filled(200, 150, LIGHT, 0);
        paint_rect(&mut frame, 60, 40, 50, 30, DARK);

        let detection = bare_detector().detect(&mut frame);
        assert_eq!(detection.status, DetectionStatus::PathOk);
        let (cx, cy) = detection.estimate.unwrap().centroid;
        assert!((60.0..110.0).contains(&cx), "cx = {cx}");
        assert!((40.0..70.0).contains(&cy), "cy = {cy}");
    }

    #[test]
    fn test_largest_blob_wins() {
        let mut frame = Frame::filled(200, 100, LIGHT, 0);
        paint_rect(&mut frame, 10, 10, 10, 10, DARK);
        paint_rect(&mut frame, 100, 20, 60, 60, DARK);

        let estimate = bare_detector().detect(&mut frame).estimate.unwrap();
        let (cx, cy) = estimate.centroid;
        assert!((100.0..160.0).contains(&cx));
        assert!((20.0..80.0).contains(&cy));
    }

    #[test]
    fn test_single_pixel_blob_falls_back_to_frame_center() {
        let mut frame = Frame::filled(101, 60, LIGHT, 0);
        paint_rect(&mut frame, 7, 9, 1, 1, DARK);

        let detection = bare_detector().detect(&mut frame);
        assert_eq!(detection.status, DetectionStatus::PathOk);
        let estimate = detection.estimate.unwrap();
        assert_eq!(estimate.area, 0.0);
        assert_eq!(estimate.centroid, (50.5, 30.0));
    }

    #[test]
    fn test_one_pixel_line_falls_back_to_frame_center() {
        let mut frame = Frame::filled(80, 40, LIGHT, 0);
        paint_rect(&mut frame, 10, 5, 30, 1, DARK);

        let estimate = bare_detector().detect(&mut frame).estimate.unwrap();
        assert_eq!(estimate.centroid, (40.0, 20.0));
        // Direction still follows the degenerate contour.
        assert_relative_eq!(estimate.direction.0.abs(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_detection_is_repeatable() {
        let mut source = Frame::filled(120, 90, LIGHT, 0);
        paint_rect(&mut source, 30, 10, 20, 70, DARK);

        let detector = ContourPathDetector::default();
        let first = detector.detect(&mut source.clone());
        let second = detector.detect(&mut source.clone());
        assert_eq!(first.status, second.status);
        assert_eq!(first.estimate, second.estimate);
    }

    #[test]
    fn test_direction_is_unit_vector() {
        let mut frame = Frame::filled(120, 120, LIGHT, 0);
        // Diagonal staircase blob.
        for i in 0..80 {
            paint_rect(&mut frame, 10 + i, 10 + i, 12, 3, DARK);
        }
        let (vx, vy) = bare_detector().detect(&mut frame).estimate.unwrap().direction;
        assert_relative_eq!(vx * vx + vy * vy, 1.0, epsilon = 1e-9);
        // Runs down-right, so both components share a sign.
        assert!(vx * vy > 0.0);
    }

    #[test]
    fn test_vertical_bar_scene() {
        let mut frame = Frame::filled(640, 480, LIGHT, 0);
        paint_rect(&mut frame, 280, 0, 40, 480, DARK);

        let detection = ContourPathDetector::default().detect(&mut frame);
        assert_eq!(detection.status.to_string(), "path OK");
        let estimate = detection.estimate.unwrap();
        assert_relative_eq!(estimate.centroid.0, 300.0, epsilon = 1.0);
        assert_relative_eq!(estimate.centroid.1, 240.0, epsilon = 1.0);
        assert_relative_eq!(estimate.direction.0, 0.0, epsilon = 1e-2);
        assert_relative_eq!(estimate.direction.1.abs(), 1.0, epsilon = 1e-2);
    }

    #[rstest]
    #[case::left_edge(0, 0, 40, 480, (19.5, 239.5))]
    #[case::right_edge(600, 0, 40, 480, (619.5, 239.5))]
    #[case::top_edge(0, 0, 640, 40, (319.5, 19.5))]
    #[case::bottom_half(0, 240, 640, 240, (319.5, 359.5))]
    #[case::all_dark(0, 0, 640, 480, (319.5, 239.5))]
    fn test_dark_regions_touching_frame_edges_are_found(
        #[case] x0: u32,
        #[case] y0: u32,
        #[case] w: u32,
        #[case] h: u32,
        #[case] centroid: (f64, f64),
    ) {
        let mut frame = Frame::filled(640, 480, LIGHT, 0);
        paint_rect(&mut frame, x0, y0, w, h, DARK);

        let detection = ContourPathDetector::default().detect(&mut frame);
        assert_eq!(detection.status, DetectionStatus::PathOk);
        let estimate = detection.estimate.unwrap();
        assert_relative_eq!(estimate.centroid.0, centroid.0, epsilon = 1e-6);
        assert_relative_eq!(estimate.centroid.1, centroid.1, epsilon = 1e-6);
        assert_relative_eq!(
            estimate.area,
            ((w - 1) * (h - 1)) as f64,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_default_detector_annotates_in_place() {
        let mut source = Frame::filled(200, 150, LIGHT, 0);
        paint_rect(&mut source, 60, 40, 50, 30, DARK);

        let mut annotated = source.clone();
        ContourPathDetector::default().detect(&mut annotated);
        assert_ne!(annotated, source);

        let mut bare = source.clone();
        bare_detector().detect(&mut bare);
        assert_eq!(bare, source);
    }

    #[test]
    fn test_custom_threshold() {
        let mut frame = Frame::filled(40, 40, LIGHT, 0);
        paint_rect(&mut frame, 5, 5, 10, 10, [100, 100, 100]);
        let strict = bare_detector();
        let loose = bare_detector().with_threshold(120);
        assert_eq!(loose.threshold(), 120);
        assert_eq!(strict.detect(&mut frame.clone()).status, DetectionStatus::NoPath);
        assert_eq!(loose.detect(&mut frame.clone()).status, DetectionStatus::PathOk);
    }
}
