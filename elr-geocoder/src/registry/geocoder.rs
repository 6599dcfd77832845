//! Point and substring resolution against calibrated ELRs.

use tracing::{info, warn};

use super::config::GeocoderConfig;
use super::error::{GeocodeError, LoadError};
use super::line::{Line, RailwayPoint};
use super::snapshot::{LineMap, SnapshotCache};
use crate::calibration::CalibrationSegment;
use crate::domain::Elr;
use crate::geometry::{Polyline, distance, point_at_distance};
use crate::source::SurveySource;

/// Registry of calibrated ELRs.
///
/// Immutable once loaded; share it across threads by reference.
#[derive(Debug, Clone)]
pub struct Geocoder {
    lines: LineMap,
    config: GeocoderConfig,
}

impl Geocoder {
    /// Load from the snapshot cache, building it from the survey source if
    /// the cache does not exist yet.
    pub fn open(config: GeocoderConfig) -> Result<Self, LoadError> {
        let source_path = config.source_path.clone();
        Self::load_or_build(config, move || {
            let survey = SurveySource::load(&source_path)?.calibrate()?;
            Ok(survey.lines)
        })
    }

    /// Load from the snapshot cache, or run `build` and save its result.
    pub fn load_or_build<F>(config: GeocoderConfig, build: F) -> Result<Self, LoadError>
    where
        F: FnOnce() -> Result<LineMap, LoadError>,
    {
        let cache = SnapshotCache::new(&config.cache_path);

        let lines = if cache.exists() {
            let lines = cache.load()?;
            info!(path = %cache.path().display(), lines = lines.len(), "loaded ELR snapshot");
            lines
        } else {
            let lines = build()?;
            cache.save(&lines)?;
            info!(path = %cache.path().display(), lines = lines.len(), "saved ELR snapshot");
            lines
        };

        Ok(Self { lines, config })
    }

    /// Load from an existing snapshot cache. Never builds.
    pub fn load_snapshot(config: GeocoderConfig) -> Result<Self, LoadError> {
        let lines = SnapshotCache::new(&config.cache_path).load()?;
        Ok(Self { lines, config })
    }

    pub fn from_lines(lines: LineMap, config: GeocoderConfig) -> Self {
        Self { lines, config }
    }

    /// Find the line and the calibration segment covering `ty`.
    pub fn find(&self, elr: Elr, ty: i64) -> Result<(&Line, &CalibrationSegment), GeocodeError> {
        let line = self.lines.get(&elr).ok_or(GeocodeError::UnknownLine(elr))?;
        let segment = line
            .segment_at(ty)
            .ok_or(GeocodeError::NotFound { elr, ty })?;
        Ok((line, segment))
    }

    fn find_logged(&self, elr: Elr, ty: i64) -> Result<(&Line, &CalibrationSegment), GeocodeError> {
        self.find(elr, ty).inspect_err(|_| {
            if self.config.verbose {
                warn!(%elr, ty, "no calibration found");
            }
        })
    }

    /// The position at a yardage, with the linear accuracy of its segment.
    pub fn point(&self, elr: Elr, ty: i64) -> Result<RailwayPoint, GeocodeError> {
        let (line, segment) = self.find_logged(elr, ty)?;
        let distance = segment.offset_at(ty);
        Ok(RailwayPoint {
            point: point_at_distance(&line.geometry, distance),
            accuracy: segment.accuracy,
        })
    }

    /// The portion of the line between two yardages.
    ///
    /// Starts and ends with the interpolated end points; geometry vertices
    /// strictly between the two offsets are kept in between. Linear accuracy
    /// of the ends is not reported.
    pub fn substring(&self, elr: Elr, ty_from: i64, ty_to: i64) -> Result<Polyline, GeocodeError> {
        let (line, from_segment) = self.find_logged(elr, ty_from)?;
        let distance_from = from_segment.offset_at(ty_from);

        let (_, to_segment) = self.find_logged(elr, ty_to)?;
        let distance_to = to_segment.offset_at(ty_to);

        let geometry = &line.geometry;
        let vertices = geometry.points();

        let mut points = Vec::with_capacity(vertices.len().min(32) + 2);
        points.push(point_at_distance(geometry, distance_from));

        let mut travelled = 0.0;
        for w in vertices.windows(2) {
            if travelled >= distance_to {
                break;
            }
            if travelled > distance_from {
                points.push(w[0]);
            }
            travelled += distance(w[0], w[1]);
        }

        points.push(point_at_distance(geometry, distance_to));
        Ok(Polyline::new(points))
    }

    /// All ELR codes, sorted.
    pub fn all_elrs(&self) -> Vec<Elr> {
        self.lines.keys().copied().collect()
    }

    /// Whether the ELR is reported in kilometres. Unknown codes are not.
    pub fn is_metric(&self, elr: Elr) -> bool {
        self.lines.get(&elr).is_some_and(|l| l.metric)
    }

    /// ELR codes reported in kilometres, sorted.
    pub fn metric_elrs(&self) -> Vec<Elr> {
        self.lines
            .iter()
            .filter(|(_, l)| l.metric)
            .map(|(elr, _)| *elr)
            .collect()
    }

    pub fn line(&self, elr: Elr) -> Option<&Line> {
        self.lines.get(&elr)
    }

    pub fn lines(&self) -> impl Iterator<Item = (&Elr, &Line)> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
