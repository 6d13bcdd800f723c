use image::Rgb;
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, Canvas};

use crate::annotation::domain::frame_annotator::{AnnotationStyle, FrameAnnotator};
use crate::detection::domain::path_estimate::PathEstimate;
use crate::shared::frame::Frame;

/// Draws the contour, centroid marker, and guide line with
/// `imageproc::drawing`, in that order.
///
/// Everything is clipped to the frame, so a guide line that runs past the
/// edges is simply cut off.
pub struct ImageprocAnnotator {
    style: AnnotationStyle,
}

impl ImageprocAnnotator {
    pub fn new(style: AnnotationStyle) -> Self {
        Self { style }
    }
}

impl Default for ImageprocAnnotator {
    fn default() -> Self {
        Self::new(AnnotationStyle::default())
    }
}

impl FrameAnnotator for ImageprocAnnotator {
    fn annotate(&self, frame: &mut Frame, estimate: &PathEstimate) {
        let Some(mut canvas) = frame.as_rgb_image_mut() else {
            log::warn!("Skipping annotation: frame is not 3-channel RGB");
            return;
        };
        let style = &self.style;

        let contour = &estimate.contour;
        for (i, p) in contour.iter().enumerate() {
            let q = contour[(i + 1) % contour.len()];
            draw_thick_segment(
                &mut canvas,
                (p.x as f32, p.y as f32),
                (q.x as f32, q.y as f32),
                style.contour_thickness,
                Rgb(style.contour_color),
            );
        }

        let (cx, cy) = estimate.centroid;
        draw_filled_circle_mut(
            &mut canvas,
            (cx.round() as i32, cy.round() as i32),
            style.centroid_radius,
            Rgb(style.centroid_color),
        );

        let (start, end) = estimate.guide_segment(style.guide_half_length);
        draw_thick_segment(
            &mut canvas,
            (start.0 as f32, start.1 as f32),
            (end.0 as f32, end.1 as f32),
            style.guide_thickness,
            Rgb(style.guide_color),
        );
    }
}

/// Approximates a `thickness`-pixel stroke by drawing the segment at every
/// offset of a `thickness x thickness` block centered on the segment. Even
/// thicknesses lean one pixel toward negative coordinates.
fn draw_thick_segment<C>(
    canvas: &mut C,
    start: (f32, f32),
    end: (f32, f32),
    thickness: u32,
    color: Rgb<u8>,
) where
    C: Canvas<Pixel = Rgb<u8>>,
{
    let thickness = thickness.max(1) as i32;
    let offsets = -(thickness / 2)..thickness - thickness / 2;
    for dy in offsets.clone() {
        for dx in offsets.clone() {
            let (ox, oy) = (dx as f32, dy as f32);
            draw_line_segment_mut(
                canvas,
                (start.0 + ox, start.1 + oy),
                (end.0 + ox, end.1 + oy),
                color,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::point::Point;
    use rstest::rstest;
    use std::ops::Range;

    const WHITE: [u8; 3] = [255, 255, 255];

    fn pixel(frame: &Frame, x: u32, y: u32) -> [u8; 3] {
        let offset = ((y * frame.width() + x) * 3) as usize;
        [
            frame.data()[offset],
            frame.data()[offset + 1],
            frame.data()[offset + 2],
        ]
    }

    fn square_estimate() -> PathEstimate {
        PathEstimate {
            contour: vec![
                Point::new(10, 10),
                Point::new(30, 10),
                Point::new(30, 30),
                Point::new(10, 30),
            ],
            area: 400.0,
            centroid: (50.0, 50.0),
            direction: (0.0, 1.0),
            line_point: (50.0, 50.0),
        }
    }

    #[test]
    fn test_draws_contour_marker_and_guide() {
        let mut frame = Frame::filled(100, 100, WHITE, 0);
        ImageprocAnnotator::default().annotate(&mut frame, &square_estimate());

        let style = AnnotationStyle::default();
        assert_eq!(pixel(&frame, 10, 20), style.contour_color);
        assert_eq!(pixel(&frame, 20, 30), style.contour_color);
        assert_eq!(pixel(&frame, 53, 50), style.centroid_color);
        assert_eq!(pixel(&frame, 50, 5), style.guide_color);
        assert_eq!(pixel(&frame, 50, 95), style.guide_color);
        assert_eq!(pixel(&frame, 90, 90), WHITE);
        assert_eq!(pixel(&frame, 20, 20), WHITE);
    }

    #[rstest]
    #[case(1, 50..51)]
    #[case(2, 49..51)]
    #[case(3, 49..52)]
    #[case(4, 48..52)]
    fn test_stroke_is_centered_on_segment(#[case] thickness: u32, #[case] rows: Range<u32>) {
        let mut frame = Frame::filled(100, 100, WHITE, 0);
        let mut canvas = frame.as_rgb_image_mut().unwrap();
        draw_thick_segment(&mut canvas, (10.0, 50.0), (90.0, 50.0), thickness, Rgb([0, 0, 0]));

        for y in 44..57 {
            let expected = if rows.contains(&y) { [0, 0, 0] } else { WHITE };
            assert_eq!(pixel(&frame, 50, y), expected, "row {y}");
        }
    }

    #[test]
    fn test_custom_style_colors() {
        let style = AnnotationStyle {
            guide_color: [1, 2, 3],
            ..AnnotationStyle::default()
        };
        let mut frame = Frame::filled(100, 100, WHITE, 0);
        ImageprocAnnotator::new(style).annotate(&mut frame, &square_estimate());
        assert_eq!(pixel(&frame, 50, 5), [1, 2, 3]);
    }

    #[test]
    fn test_single_point_contour_is_drawn() {
        let estimate = PathEstimate {
            contour: vec![Point::new(70, 80)],
            ..square_estimate()
        };
        let mut frame = Frame::filled(100, 100, WHITE, 0);
        ImageprocAnnotator::default().annotate(&mut frame, &estimate);
        assert_eq!(pixel(&frame, 70, 80), AnnotationStyle::default().contour_color);
    }

    #[test]
    fn test_non_rgb_frame_is_left_alone() {
        let mut frame = Frame::new(vec![7u8; 16], 4, 4, 1, 0);
        ImageprocAnnotator::default().annotate(&mut frame, &square_estimate());
        assert!(frame.data().iter().all(|&v| v == 7));
    }
}
