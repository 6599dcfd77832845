//! Linear calibration of ELR centre-lines against mileposts.
//!
//! The builder runs once per ELR at build time; the resulting segments are
//! stored on each [`Line`](crate::registry::Line) and searched at query time.

mod builder;
mod quality;
mod segment;

pub use builder::{
    Calibration, CalibrationError, CalibrationPoint, LineExtent, Observation, calibrate,
    calibration_points, points_to_segments,
};
pub use quality::CalibrationQuality;
pub use segment::{CalibrationSegment, locate};
