//! Calibration segments and segment lookup.

use serde::{Deserialize, Serialize};

/// Linear calibration between two reference points on an ELR.
///
/// Maps the reported yardage interval `[ty_from, ty_to]` onto the measured
/// offset interval `[lo_from, lo_to]` along the centre-line geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSegment {
    /// Low mileage end (total yards).
    pub ty_from: i64,
    /// High mileage end (total yards).
    pub ty_to: i64,
    /// Linear offset at the low mileage end (metres).
    pub lo_from: f64,
    /// Linear offset at the high mileage end (metres).
    pub lo_to: f64,
    /// Linear offset at the low mileage end, normalised to 0..1.
    pub lo_norm_from: f64,
    /// Linear offset at the high mileage end, normalised to 0..1.
    pub lo_norm_to: f64,
    /// Measured minus reported length (metres).
    pub accuracy: f64,
    /// Measured length of a nominal quarter mile (yards) at this segment's
    /// measured-to-reported ratio.
    pub quarter_mile_norm: f64,
}

impl CalibrationSegment {
    /// Whether the segment covers `ty` (inclusive at both ends).
    pub fn contains(&self, ty: i64) -> bool {
        self.ty_from <= ty && ty <= self.ty_to
    }

    /// Reported length in yards.
    pub fn yards(&self) -> i64 {
        self.ty_to - self.ty_from
    }

    /// Linear offset (metres) for a yardage, interpolated within the segment.
    ///
    /// The segment ends map exactly onto `lo_from` and `lo_to`.
    pub fn offset_at(&self, ty: i64) -> f64 {
        if ty == self.ty_to {
            return self.lo_to;
        }
        self.lo_from
            + (ty as f64 - self.ty_from as f64) / (self.ty_to as f64 - self.ty_from as f64)
                * (self.lo_to - self.lo_from)
    }
}

/// Find the segment containing `ty` by binary search.
///
/// `segments` must be sorted by `ty_from` and non-overlapping except at
/// shared boundaries; a yardage on a shared boundary resolves to the lower
/// segment. Returns `None` outside the calibrated range or in a gap.
pub fn locate(segments: &[CalibrationSegment], ty: i64) -> Option<&CalibrationSegment> {
    let idx = segments.partition_point(|s| s.ty_to < ty);
    segments.get(idx).filter(|s| s.contains(ty))
}
