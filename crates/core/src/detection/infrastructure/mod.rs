pub mod contour_path_detector;
pub mod contours;
pub mod line_fit;
