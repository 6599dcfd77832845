//! Calibrated ELR records.

use serde::{Deserialize, Serialize};

use crate::calibration::{CalibrationSegment, locate};
use crate::geometry::{Point, Polyline};

/// A single ELR with its geometry and linear calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Low mileage end of the ELR (total yards).
    pub ty_from: i64,
    /// High mileage end of the ELR (total yards).
    pub ty_to: i64,
    /// Geometry length (metres).
    pub shape_length: f64,
    /// Whether mileages are reported in kilometres.
    pub metric: bool,
    /// Centre-line geometry.
    pub geometry: Polyline,
    /// Calibration segments sorted by `ty_from`.
    pub segments: Vec<CalibrationSegment>,
}

impl Line {
    /// The calibration segment covering `ty`, if any.
    pub fn segment_at(&self, ty: i64) -> Option<&CalibrationSegment> {
        locate(&self.segments, ty)
    }
}

/// A geocoded railway position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RailwayPoint {
    /// Easting / Northing (metres).
    pub point: Point,
    /// Linear accuracy of the calibration segment used (metres).
    pub accuracy: f64,
}
