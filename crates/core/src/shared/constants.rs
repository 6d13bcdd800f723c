/// Intensity at or below which a pixel is treated as part of the path.
pub const PATH_THRESHOLD: u8 = 60;

/// Distance the guide line extends from the centroid in each direction.
pub const GUIDE_LINE_HALF_LENGTH: f64 = 200.0;

/// Radial and angular accuracy for iterative line fitting.
pub const LINE_FIT_REPS: f64 = 0.01;
pub const LINE_FIT_AEPS: f64 = 0.01;

/// Polling period between frame reads (~33 fps).
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 30;

/// Fraction of half the frame width the centroid may drift before steering.
pub const DEFAULT_DEAD_BAND: f64 = 0.15;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
