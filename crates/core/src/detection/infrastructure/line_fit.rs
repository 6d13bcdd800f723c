//! 2D line fitting by (weighted) least squares.
//!
//! `L2` is solved in closed form from the point covariance. `L1` and
//! `Huber` reweight the points by their distance to the current line and
//! refit until both the line point and the direction settle. Reweighting
//! only finds the nearest local minimum, so the robust fits start from the
//! `L2` line and from lines through evenly spaced point pairs, and keep
//! the result with the lowest total robust cost.

const MAX_ITERATIONS: usize = 30;
/// Points sampled for pairwise starting lines.
const SEED_SAMPLES: usize = 8;
const HUBER_C: f64 = 1.345;
const MIN_DISTANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceKind {
    L2,
    L1,
    Huber,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    /// Unit direction vector.
    pub direction: (f64, f64),
    /// Weighted mean of the points, which lies on the line.
    pub point: (f64, f64),
}

/// Fits a line to `points`.
///
/// `reps` and `aeps` bound the point shift and the angular change (radians)
/// between iterations of the robust fits; `L2` converges in one step.
/// Fewer than two distinct points yield a horizontal direction through the
/// first point.
pub fn fit_line(points: &[(f64, f64)], kind: DistanceKind, reps: f64, aeps: f64) -> LineFit {
    let uniform = vec![1.0; points.len()];
    let fit = match weighted_fit(points, &uniform) {
        Some(fit) => fit,
        None => {
            return LineFit {
                direction: (1.0, 0.0),
                point: points.first().copied().unwrap_or((0.0, 0.0)),
            }
        }
    };
    if kind == DistanceKind::L2 {
        return fit;
    }

    let mut best = reweight(points, kind, fit, reps, aeps);
    let mut best_cost = cost(points, kind, &best);
    for seed in pair_seeds(points) {
        let candidate = reweight(points, kind, seed, reps, aeps);
        let candidate_cost = cost(points, kind, &candidate);
        if candidate_cost < best_cost {
            best = candidate;
            best_cost = candidate_cost;
        }
    }
    best
}

/// Iteratively reweighted least squares from `fit`.
fn reweight(
    points: &[(f64, f64)],
    kind: DistanceKind,
    mut fit: LineFit,
    reps: f64,
    aeps: f64,
) -> LineFit {
    for _ in 0..MAX_ITERATIONS {
        let weights: Vec<f64> = points
            .iter()
            .map(|&p| weight(kind, distance_to_line(&fit, p)))
            .collect();
        let Some(next) = weighted_fit(points, &weights) else {
            break;
        };

        let shift = ((next.point.0 - fit.point.0).powi(2) + (next.point.1 - fit.point.1).powi(2))
            .sqrt();
        let turn = angle_between(next.direction, fit.direction);
        fit = next;
        if shift < reps && turn < aeps {
            break;
        }
    }
    fit
}

/// Lines through every pair of up to `SEED_SAMPLES` evenly spaced points.
fn pair_seeds(points: &[(f64, f64)]) -> Vec<LineFit> {
    let n = points.len();
    let samples: Vec<(f64, f64)> = if n <= SEED_SAMPLES {
        points.to_vec()
    } else {
        (0..SEED_SAMPLES)
            .map(|i| points[i * (n - 1) / (SEED_SAMPLES - 1)])
            .collect()
    };

    let mut seeds = Vec::new();
    for (i, &p) in samples.iter().enumerate() {
        for &q in &samples[i + 1..] {
            let (dx, dy) = (q.0 - p.0, q.1 - p.1);
            let len = (dx * dx + dy * dy).sqrt();
            if len > f64::EPSILON {
                seeds.push(LineFit {
                    direction: (dx / len, dy / len),
                    point: p,
                });
            }
        }
    }
    seeds
}

/// Sum of the robust loss over all points.
fn cost(points: &[(f64, f64)], kind: DistanceKind, fit: &LineFit) -> f64 {
    points
        .iter()
        .map(|&p| {
            let d = distance_to_line(fit, p);
            match kind {
                DistanceKind::L2 => d * d / 2.0,
                DistanceKind::L1 => d,
                DistanceKind::Huber => {
                    if d < HUBER_C {
                        d * d / 2.0
                    } else {
                        HUBER_C * (d - HUBER_C / 2.0)
                    }
                }
            }
        })
        .sum()
}

/// Perpendicular distance from `p` to the fitted line.
pub fn distance_to_line(fit: &LineFit, p: (f64, f64)) -> f64 {
    let (vx, vy) = fit.direction;
    let (dx, dy) = (p.0 - fit.point.0, p.1 - fit.point.1);
    (dx * vy - dy * vx).abs()
}

fn weight(kind: DistanceKind, d: f64) -> f64 {
    match kind {
        DistanceKind::L2 => 1.0,
        DistanceKind::L1 => 1.0 / d.max(MIN_DISTANCE),
        DistanceKind::Huber => {
            if d < HUBER_C {
                1.0
            } else {
                HUBER_C / d
            }
        }
    }
}

/// Principal axis of the weighted point cloud, or `None` when the points
/// have no spread (all coincide, or all weights vanish).
fn weighted_fit(points: &[(f64, f64)], weights: &[f64]) -> Option<LineFit> {
    let total: f64 = weights.iter().sum();
    if points.is_empty() || total <= 0.0 {
        return None;
    }

    let (mut mx, mut my) = (0.0, 0.0);
    for (&(x, y), &w) in points.iter().zip(weights) {
        mx += w * x;
        my += w * y;
    }
    mx /= total;
    my /= total;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (&(x, y), &w) in points.iter().zip(weights) {
        let (dx, dy) = (x - mx, y - my);
        sxx += w * dx * dx;
        syy += w * dy * dy;
        sxy += w * dx * dy;
    }
    if sxx + syy <= f64::EPSILON {
        return None;
    }

    let theta = 0.5 * (2.0 * sxy).atan2(sxx - syy);
    Some(LineFit {
        direction: (theta.cos(), theta.sin()),
        point: (mx, my),
    })
}

/// Unsigned angle between two lines, ignoring direction sign.
fn angle_between(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 * b.0 + a.1 * b.1).abs().min(1.0).acos()
}
