//! Per-ELR calibration quality summary.

use serde::{Deserialize, Serialize};

use super::segment::CalibrationSegment;
use crate::stats::{Statistics, StatsError};

/// Statistics over an ELR's calibration segments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationQuality {
    /// Measured minus reported segment length (metres).
    pub accuracy: Statistics,
    /// Reported segment length (yards).
    pub segment_length: Statistics,
    /// Normalised quarter mile length (yards).
    pub quarter_mile_norm: Statistics,
}

impl CalibrationQuality {
    pub fn from_segments(segments: &[CalibrationSegment]) -> Result<Self, StatsError> {
        let collect = |f: fn(&CalibrationSegment) -> f64| -> Vec<f64> {
            segments.iter().map(f).collect()
        };

        Ok(CalibrationQuality {
            accuracy: Statistics::from_samples(&collect(|s| s.accuracy))?,
            segment_length: Statistics::from_samples(&collect(|s| s.yards() as f64))?,
            quarter_mile_norm: Statistics::from_samples(&collect(|s| s.quarter_mile_norm))?,
        })
    }
}
