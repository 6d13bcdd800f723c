//! Binary masking, external contour extraction, and polygon moments.

use image::imageops::replace;
use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::point::Point;

/// Inverse binary threshold: pixels at or below `level` become 255.
pub fn dark_mask(gray: &GrayImage, level: u8) -> GrayImage {
    threshold(gray, level, ThresholdType::BinaryInverted)
}

/// Outer borders of top-level foreground regions.
///
/// Hole borders and regions nested inside holes are dropped. The mask is
/// traced inside a one-pixel background border, since `find_contours`
/// misclassifies regions touching the image edge; points are shifted back
/// into mask coordinates.
pub fn external_contours(mask: &GrayImage) -> Vec<Vec<Point<i32>>> {
    let (width, height) = mask.dimensions();
    let mut padded = GrayImage::new(width + 2, height + 2);
    replace(&mut padded, mask, 1, 1);

    find_contours::<i32>(&padded)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .map(|c| {
            c.points
                .into_iter()
                .map(|p| Point::new(p.x - 1, p.y - 1))
                .collect()
        })
        .collect()
}

/// Index of the contour with the largest enclosed area.
///
/// Ties keep the earliest contour.
pub fn largest_by_area(contours: &[Vec<Point<i32>>]) -> Option<(usize, Moments)> {
    let mut best: Option<(usize, Moments)> = None;
    for (i, contour) in contours.iter().enumerate() {
        let moments = Moments::of_polygon(contour);
        if best.map_or(true, |(_, b)| moments.m00 > b.m00) {
            best = Some((i, moments));
        }
    }
    best
}

/// Zeroth and first spatial moments of a closed polygon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    /// Green's theorem over the polygon edges, sign-normalized so that
    /// `m00` is the non-negative enclosed area regardless of winding.
    pub fn of_polygon(points: &[Point<i32>]) -> Self {
        let n = points.len();
        let (mut a00, mut a10, mut a01) = (0.0_f64, 0.0_f64, 0.0_f64);
        for i in 0..n {
            let p = points[i];
            let q = points[(i + 1) % n];
            let (xi, yi) = (p.x as f64, p.y as f64);
            let (xj, yj) = (q.x as f64, q.y as f64);
            let cross = xi * yj - xj * yi;
            a00 += cross;
            a10 += cross * (xi + xj);
            a01 += cross * (yi + yj);
        }

        let sign = if a00 < 0.0 { -1.0 } else { 1.0 };
        Self {
            m00: sign * a00 / 2.0,
            m10: sign * a10 / 6.0,
            m01: sign * a01 / 6.0,
        }
    }

    /// `(m10/m00, m01/m00)`, or `None` for a zero-area polygon.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.m00 == 0.0 {
            return None;
        }
        Some((self.m10 / self.m00, self.m01 / self.m00))
    }
}
