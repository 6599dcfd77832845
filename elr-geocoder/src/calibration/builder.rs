//! Calibration of ELR geometry against milepost observations.
//!
//! Each milepost has a declared yardage and a surveyed position. Projecting
//! the position onto the centre-line gives a measured linear offset; pairs of
//! consecutive (yardage, offset) points then define calibration segments.
//! Where the mileposts do not reach the ends of the ELR, virtual points are
//! added at the ends of the geometry.

use tracing::{debug, warn};

use super::quality::CalibrationQuality;
use super::segment::CalibrationSegment;
use crate::domain::{QUARTER_MILE_YARDS, YARDS_TO_METRES};
use crate::geometry::{Point, Polyline, distance_along_line, nearest_point_on_line};
use crate::stats::StatsError;

/// Linear calibration values at a single railway point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationPoint {
    /// Total yards.
    pub ty: i64,
    /// Linear offset along the geometry (metres).
    pub lo_metres: f64,
    /// Linear offset normalised by the geometry length (0..1).
    pub lo_normalised: f64,
}

/// A milepost yardage and its projected offset along the geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub ty: i64,
    pub offset: f64,
}

impl Observation {
    /// Project a surveyed milepost position onto the ELR geometry.
    pub fn project(ty: i64, position: Point, geometry: &Polyline) -> Self {
        let (nearest, _) = nearest_point_on_line(geometry, position);
        Observation {
            ty,
            offset: distance_along_line(geometry, nearest),
        }
    }
}

/// Declared extent of an ELR.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineExtent {
    pub ty_from: i64,
    pub ty_to: i64,
    /// Geometry length (metres).
    pub length: f64,
}

/// Calibration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalibrationError {
    /// Fewer than two distinct calibration points were available
    #[error("no calibration segments for extent {ty_from}..{ty_to}")]
    NoSegments { ty_from: i64, ty_to: i64 },

    #[error(transparent)]
    Stats(#[from] StatsError),
}

/// Calibration segments and their quality summary for one ELR.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    pub segments: Vec<CalibrationSegment>,
    pub quality: CalibrationQuality,
}

/// Build calibration points from observations ordered by yardage.
///
/// Adds a virtual point at the low end (offset 0) when the first
/// observation is past `ty_from`, and at the high end (offset = length) when
/// the last observation falls short of `ty_to`. Observations repeating the
/// previous yardage are dropped.
pub fn calibration_points(
    extent: &LineExtent,
    observations: &[Observation],
) -> Vec<CalibrationPoint> {
    let mut points: Vec<CalibrationPoint> = Vec::with_capacity(observations.len() + 2);

    let starts_late = observations.first().is_none_or(|o| o.ty > extent.ty_from);
    if starts_late {
        points.push(CalibrationPoint {
            ty: extent.ty_from,
            lo_metres: 0.0,
            lo_normalised: 0.0,
        });
    }

    for obs in observations {
        if let Some(last) = points.last()
            && last.ty == obs.ty
        {
            warn!(ty = obs.ty, "duplicate milepost yardage, skipping");
            continue;
        }
        points.push(CalibrationPoint {
            ty: obs.ty,
            lo_metres: obs.offset,
            lo_normalised: obs.offset / extent.length,
        });
    }

    let ends_early = points.last().is_some_and(|p| p.ty < extent.ty_to);
    if ends_early {
        points.push(CalibrationPoint {
            ty: extent.ty_to,
            lo_metres: extent.length,
            lo_normalised: 1.0,
        });
    }

    points
}

/// Pairwise transform of calibration points into segments.
pub fn points_to_segments(points: &[CalibrationPoint]) -> Vec<CalibrationSegment> {
    points
        .windows(2)
        .map(|w| {
            let (current, next) = (w[0], w[1]);
            let yards = (next.ty - current.ty) as f64;

            let reported = yards * YARDS_TO_METRES;
            let measured = next.lo_metres - current.lo_metres;

            CalibrationSegment {
                ty_from: current.ty,
                ty_to: next.ty,
                lo_from: current.lo_metres,
                lo_to: next.lo_metres,
                lo_norm_from: current.lo_normalised,
                lo_norm_to: next.lo_normalised,
                accuracy: measured - reported,
                quarter_mile_norm: (QUARTER_MILE_YARDS / yards) * (measured / YARDS_TO_METRES),
            }
        })
        .collect()
}

/// Calibrate one ELR from its extent and ordered observations.
pub fn calibrate(
    extent: &LineExtent,
    observations: &[Observation],
) -> Result<Calibration, CalibrationError> {
    let points = calibration_points(extent, observations);
    let segments = points_to_segments(&points);

    if segments.is_empty() {
        return Err(CalibrationError::NoSegments {
            ty_from: extent.ty_from,
            ty_to: extent.ty_to,
        });
    }

    let quality = CalibrationQuality::from_segments(&segments)?;
    debug!(
        segments = segments.len(),
        mean_accuracy = quality.accuracy.mean,
        "calibrated"
    );

    Ok(Calibration { segments, quality })
}
