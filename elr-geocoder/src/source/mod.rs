//! Survey source: ELR centre-lines and milepost positions.
//!
//! The source is a JSON document:
//!
//! ```json
//! {
//!   "lines": [
//!     {"elr": "ECM1", "ty_from": 0, "ty_to": 3520, "metric": false,
//!      "geometry": [[529740.0, 180773.0], [531000.0, 182000.0]]}
//!   ],
//!   "mileposts": [
//!     {"elr": "ECM1", "ty": 1760, "point": [530300.0, 181350.0]}
//!   ]
//! }
//! ```

mod error;

pub use error::SourceError;

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::calibration::{CalibrationQuality, LineExtent, Observation, calibrate};
use crate::domain::Elr;
use crate::geometry::{Point, Polyline};
use crate::registry::{Line, LineMap};

/// An ELR centre-line as surveyed.
#[derive(Debug, Clone, Deserialize)]
pub struct SurveyLine {
    pub elr: Elr,
    pub ty_from: i64,
    pub ty_to: i64,
    #[serde(default)]
    pub metric: bool,
    /// `[easting, northing]` vertices.
    pub geometry: Vec<[f64; 2]>,
}

/// A milepost with its declared yardage and surveyed position.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Milepost {
    pub elr: Elr,
    pub ty: i64,
    /// `[easting, northing]`.
    pub point: [f64; 2],
}

impl Milepost {
    pub fn position(&self) -> Point {
        Point::from(self.point)
    }
}

/// Raw survey data, before calibration.
#[derive(Debug, Clone, Deserialize)]
pub struct SurveySource {
    pub lines: Vec<SurveyLine>,
    #[serde(default)]
    pub mileposts: Vec<Milepost>,
}

/// Calibrated lines plus the per-line quality summary.
#[derive(Debug, Clone)]
pub struct CalibratedSurvey {
    pub lines: LineMap,
    pub quality: BTreeMap<Elr, CalibrationQuality>,
}

impl SurveySource {
    /// Read a survey source JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let survey: SurveySource = serde_json::from_str(&contents)?;
        info!(
            path = %path.display(),
            lines = survey.lines.len(),
            mileposts = survey.mileposts.len(),
            "loaded survey source"
        );
        Ok(survey)
    }

    /// Calibrate every line against its mileposts.
    pub fn calibrate(&self) -> Result<CalibratedSurvey, SourceError> {
        let mut by_line: HashMap<Elr, Vec<&Milepost>> = HashMap::new();
        for line in &self.lines {
            if by_line.insert(line.elr, Vec::new()).is_some() {
                return Err(SourceError::DuplicateLine(line.elr));
            }
        }
        for mp in &self.mileposts {
            by_line
                .get_mut(&mp.elr)
                .ok_or(SourceError::OrphanMilepost {
                    elr: mp.elr,
                    ty: mp.ty,
                })?
                .push(mp);
        }

        let mut lines = LineMap::new();
        let mut quality = BTreeMap::new();

        for survey_line in &self.lines {
            let mut mileposts = by_line.remove(&survey_line.elr).unwrap_or_default();
            mileposts.sort_by_key(|mp| mp.ty);

            let (line, line_quality) = calibrate_line(survey_line, &mileposts)?;
            lines.insert(survey_line.elr, line);
            quality.insert(survey_line.elr, line_quality);
        }

        info!(lines = lines.len(), "calibrated survey");
        Ok(CalibratedSurvey { lines, quality })
    }
}

fn calibrate_line(
    survey_line: &SurveyLine,
    mileposts: &[&Milepost],
) -> Result<(Line, CalibrationQuality), SourceError> {
    let elr = survey_line.elr;
    let geometry = Polyline::from(survey_line.geometry.clone());
    if geometry.len() < 2 {
        return Err(SourceError::DegenerateGeometry {
            elr,
            vertices: geometry.len(),
        });
    }

    let extent = LineExtent {
        ty_from: survey_line.ty_from,
        ty_to: survey_line.ty_to,
        length: geometry.length(),
    };
    let observations: Vec<Observation> = mileposts
        .iter()
        .map(|mp| Observation::project(mp.ty, mp.position(), &geometry))
        .collect();

    let calibration = calibrate(&extent, &observations)
        .map_err(|source| SourceError::Calibration { elr, source })?;
    debug!(
        %elr,
        mileposts = mileposts.len(),
        segments = calibration.segments.len(),
        "calibrated line"
    );

    let line = Line {
        ty_from: extent.ty_from,
        ty_to: extent.ty_to,
        shape_length: extent.length,
        metric: survey_line.metric,
        geometry,
        segments: calibration.segments,
    };
    Ok((line, calibration.quality))
}
