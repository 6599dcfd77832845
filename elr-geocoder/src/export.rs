//! Row-oriented CSV exports: calibration segments, calibration statistics and
//! precomputed positions.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::calibration::CalibrationQuality;
use crate::domain::{Elr, fmt_total_yards};
use crate::osgrid::{GridRefError, point_to_osgr};
use crate::registry::{GeocodeError, Geocoder, LineMap};
use crate::reproject::to_lon_lat;
use crate::stats::Statistics;

/// Export failures. All are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to flush CSV output: {0}")]
    Flush(io::Error),

    #[error("no grid reference for position: {0}")]
    GridRef(#[from] GridRefError),

    #[error("precompute lookup failed: {0}")]
    Geocode(#[from] GeocodeError),

    #[error("resolution must be positive, got {0}")]
    InvalidResolution(i64),
}

/// One calibration segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationRow {
    pub line: Elr,
    pub ty_from: i64,
    pub ty_to: i64,
    pub offset_from_m: f64,
    pub offset_to_m: f64,
    pub offset_from_norm: f64,
    pub offset_to_norm: f64,
    pub accuracy: f64,
    pub quarter_mile_norm: f64,
}

/// Calibration statistics for one line, flattened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsRow {
    pub line: Elr,
    pub accuracy_count: usize,
    pub accuracy_min: f64,
    pub accuracy_max: f64,
    pub accuracy_mean: f64,
    pub accuracy_median: f64,
    pub accuracy_stddev: Option<f64>,
    pub segment_length_count: usize,
    pub segment_length_min: f64,
    pub segment_length_max: f64,
    pub segment_length_mean: f64,
    pub segment_length_median: f64,
    pub segment_length_stddev: Option<f64>,
    pub quarter_mile_norm_count: usize,
    pub quarter_mile_norm_min: f64,
    pub quarter_mile_norm_max: f64,
    pub quarter_mile_norm_mean: f64,
    pub quarter_mile_norm_median: f64,
    pub quarter_mile_norm_stddev: Option<f64>,
}

/// A geocoded position at a precomputed yardage.
///
/// Coordinates are pre-formatted: Easting / Northing to 0.1 m, longitude /
/// latitude to 6 decimal places (roughly 0.11 m).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionRow {
    pub line: Elr,
    pub total_yards: i64,
    pub formatted_mileage: String,
    pub easting: String,
    pub northing: String,
    pub longitude: String,
    pub latitude: String,
    pub grid_reference: String,
    /// Linear accuracy rounded half-up to whole metres.
    pub accuracy_metres: i64,
}

/// Every calibration segment of every line, in line order.
pub fn calibration_rows(lines: &LineMap) -> Vec<CalibrationRow> {
    lines
        .iter()
        .flat_map(|(elr, line)| {
            line.segments.iter().map(move |s| CalibrationRow {
                line: *elr,
                ty_from: s.ty_from,
                ty_to: s.ty_to,
                offset_from_m: s.lo_from,
                offset_to_m: s.lo_to,
                offset_from_norm: s.lo_norm_from,
                offset_to_norm: s.lo_norm_to,
                accuracy: s.accuracy,
                quarter_mile_norm: s.quarter_mile_norm,
            })
        })
        .collect()
}

pub fn statistics_rows(quality: &BTreeMap<Elr, CalibrationQuality>) -> Vec<StatisticsRow> {
    quality
        .iter()
        .map(|(elr, q)| {
            let Statistics {
                count: a_count,
                min: a_min,
                max: a_max,
                mean: a_mean,
                median: a_median,
                std_dev: a_std_dev,
            } = q.accuracy;
            let Statistics {
                count: s_count,
                min: s_min,
                max: s_max,
                mean: s_mean,
                median: s_median,
                std_dev: s_std_dev,
            } = q.segment_length;
            let Statistics {
                count: n_count,
                min: n_min,
                max: n_max,
                mean: n_mean,
                median: n_median,
                std_dev: n_std_dev,
            } = q.quarter_mile_norm;

            StatisticsRow {
                line: *elr,
                accuracy_count: a_count,
                accuracy_min: a_min,
                accuracy_max: a_max,
                accuracy_mean: a_mean,
                accuracy_median: a_median,
                accuracy_stddev: a_std_dev,
                segment_length_count: s_count,
                segment_length_min: s_min,
                segment_length_max: s_max,
                segment_length_mean: s_mean,
                segment_length_median: s_median,
                segment_length_stddev: s_std_dev,
                quarter_mile_norm_count: n_count,
                quarter_mile_norm_min: n_min,
                quarter_mile_norm_max: n_max,
                quarter_mile_norm_mean: n_mean,
                quarter_mile_norm_median: n_median,
                quarter_mile_norm_stddev: n_std_dev,
            }
        })
        .collect()
}

/// Yardages to precompute for a line: every multiple of `resolution` within
/// `[ty_from, ty_to]`, plus both ends. Ascending, without duplicates.
///
/// A non-positive resolution yields the ends only.
pub fn precompute_yardages(ty_from: i64, ty_to: i64, resolution: i64) -> Vec<i64> {
    if ty_from > ty_to {
        return Vec::new();
    }

    let mut yardages = vec![ty_from];
    if resolution > 0 {
        let mut ty = ty_from.div_euclid(resolution) * resolution;
        if ty <= ty_from {
            ty += resolution;
        }
        while ty < ty_to {
            yardages.push(ty);
            ty += resolution;
        }
    }
    if ty_to != ty_from {
        yardages.push(ty_to);
    }
    yardages
}

/// Geocode every precompute yardage of every line, in line order.
pub fn precompute_rows(
    geocoder: &Geocoder,
    resolution: i64,
) -> Result<Vec<PositionRow>, ExportError> {
    if resolution <= 0 {
        return Err(ExportError::InvalidResolution(resolution));
    }

    let mut rows = Vec::new();
    for (elr, line) in geocoder.lines() {
        for ty in precompute_yardages(line.ty_from, line.ty_to, resolution) {
            let rp = geocoder.point(*elr, ty)?;
            let lon_lat = to_lon_lat(rp.point);

            rows.push(PositionRow {
                line: *elr,
                total_yards: ty,
                formatted_mileage: fmt_total_yards(ty, line.metric),
                easting: format!("{:.1}", rp.point.x),
                northing: format!("{:.1}", rp.point.y),
                longitude: format!("{:.6}", lon_lat.lon),
                latitude: format!("{:.6}", lon_lat.lat),
                grid_reference: point_to_osgr(rp.point)?,
                accuracy_metres: round_accuracy(rp.accuracy),
            });
        }
    }
    Ok(rows)
}

/// Whole metres: `value + 0.5` truncated toward zero.
fn round_accuracy(value: f64) -> i64 {
    (value + 0.5) as i64
}

/// Write rows with a header line.
pub fn write_rows<W: io::Write, R: Serialize>(writer: W, rows: &[R]) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush().map_err(ExportError::Flush)
}

/// Write rows to a CSV file, replacing it if it exists.
pub fn write_csv<R: Serialize>(path: &Path, rows: &[R]) -> Result<(), ExportError> {
    let file = std::fs::File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_rows(io::BufWriter::new(file), rows).map_err(|e| match e {
        ExportError::Flush(source) => ExportError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{CalibrationSegment, LineExtent, Observation, calibrate};
    use crate::geometry::{Polyline, point};
    use crate::registry::{GeocoderConfig, Line};
    use tempfile::tempdir;

    fn elr(s: &str) -> Elr {
        Elr::parse(s).unwrap()
    }

    fn seg(
        ty_from: i64,
        ty_to: i64,
        lo_from: f64,
        lo_to: f64,
        accuracy: f64,
    ) -> CalibrationSegment {
        CalibrationSegment {
            ty_from,
            ty_to,
            lo_from,
            lo_to,
            lo_norm_from: lo_from / 1_000.0,
            lo_norm_to: lo_to / 1_000.0,
            accuracy,
            quarter_mile_norm: 440.0,
        }
    }

    fn sample_lines() -> LineMap {
        let geometry: Polyline = vec![
            point(529_740.0, 180_773.0),
            point(530_740.0, 180_773.0),
        ]
        .into();
        let mut lines = LineMap::new();
        lines.insert(
            elr("ECM1"),
            Line {
                ty_from: 0,
                ty_to: 1_100,
                shape_length: 1_000.0,
                metric: false,
                geometry: geometry.clone(),
                segments: vec![seg(0, 500, 0.0, 450.0, -7.2), seg(500, 1_100, 450.0, 1_000.0, 1.5)],
            },
        );
        lines.insert(
            elr("CTR"),
            Line {
                ty_from: -100,
                ty_to: 900,
                shape_length: 1_000.0,
                metric: true,
                geometry,
                segments: vec![seg(-100, 900, 0.0, 1_000.0, 85.6)],
            },
        );
        lines
    }

    fn to_string<R: Serialize>(rows: &[R]) -> String {
        let mut out = Vec::new();
        write_rows(&mut out, rows).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn yardages_include_boundaries_and_multiples() {
        assert_eq!(precompute_yardages(0, 1_000, 440), vec![0, 440, 880, 1_000]);
        assert_eq!(precompute_yardages(100, 880, 440), vec![100, 440, 880]);
        assert_eq!(precompute_yardages(-500, 500, 440), vec![-500, -440, 0, 440, 500]);
        assert_eq!(precompute_yardages(-440, 0, 440), vec![-440, 0]);
        assert_eq!(precompute_yardages(10, 20, 440), vec![10, 20]);
        assert_eq!(precompute_yardages(50, 50, 22), vec![50]);
        assert_eq!(precompute_yardages(0, 100, 0), vec![0, 100]);
        assert!(precompute_yardages(100, 0, 22).is_empty());
    }

    #[test]
    fn yardages_match_filter_over_range() {
        for (from, to, res) in [(0, 5_000, 22), (-313, 1_777, 110), (17, 9_000, 1_760)] {
            let expected: Vec<i64> = (from..=to)
                .filter(|ty| ty % res == 0 || *ty == from || *ty == to)
                .collect();
            assert_eq!(precompute_yardages(from, to, res), expected);
        }
    }

    #[test]
    fn accuracy_rounding_truncates_after_adding_half() {
        assert_eq!(round_accuracy(0.5), 1);
        assert_eq!(round_accuracy(1.49), 1);
        assert_eq!(round_accuracy(85.6), 86);
        assert_eq!(round_accuracy(-0.5), 0);
        assert_eq!(round_accuracy(-1.2), 0);
        assert_eq!(round_accuracy(-5.84), -5);
        assert_eq!(round_accuracy(-7.2), -6);
        assert_eq!(round_accuracy(-9.3), -8);
    }

    #[test]
    fn calibration_table() {
        let rows = calibration_rows(&sample_lines());
        assert_eq!(rows.len(), 3);
        // Lines are emitted in sorted order.
        assert_eq!(rows[0].line, elr("CTR"));
        assert_eq!((rows[1].ty_from, rows[1].ty_to), (0, 500));
        assert_eq!((rows[2].ty_from, rows[2].ty_to), (500, 1_100));

        let csv = to_string(&rows);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some(
                "line,ty_from,ty_to,offset_from_m,offset_to_m,offset_from_norm,offset_to_norm,accuracy,quarter_mile_norm"
            )
        );
        assert_eq!(lines.next(), Some("CTR,-100,900,0.0,1000.0,0.0,1.0,85.6,440.0"));
    }

    #[test]
    fn statistics_table() {
        let segments = [seg(0, 500, 0.0, 450.0, -7.2)];
        let quality = CalibrationQuality::from_segments(&segments).unwrap();
        let mut map = BTreeMap::new();
        map.insert(elr("ECM1"), quality);

        let rows = statistics_rows(&map);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].accuracy_count, 1);
        assert_eq!(rows[0].segment_length_max, 500.0);
        assert_eq!(rows[0].accuracy_stddev, None);

        let csv = to_string(&rows);
        let mut lines = csv.lines();
        let header = lines.next().unwrap();
        assert_eq!(header.split(',').count(), 19);
        assert!(header.starts_with("line,accuracy_count,accuracy_min"));
        assert_eq!(
            lines.next(),
            Some("ECM1,1,-7.2,-7.2,-7.2,-7.2,,1,500.0,500.0,500.0,500.0,,1,440.0,440.0,440.0,440.0,")
        );
    }

    #[test]
    fn precompute_positions() {
        let gc = Geocoder::from_lines(sample_lines(), GeocoderConfig::default());
        let rows = precompute_rows(&gc, 440).unwrap();

        let ctr: Vec<i64> = rows
            .iter()
            .filter(|r| r.line == elr("CTR"))
            .map(|r| r.total_yards)
            .collect();
        assert_eq!(ctr, vec![-100, 0, 440, 880, 900]);

        let ecm1: Vec<&PositionRow> = rows.iter().filter(|r| r.line == elr("ECM1")).collect();
        let yards: Vec<i64> = ecm1.iter().map(|r| r.total_yards).collect();
        assert_eq!(yards, vec![0, 440, 880, 1_100]);

        let first = ecm1[0];
        assert_eq!(first.formatted_mileage, "0M 0000y");
        assert_eq!(first.easting, "529740.0");
        assert_eq!(first.northing, "180773.0");
        assert_eq!(first.grid_reference, "TQ2974080773");
        assert_eq!(first.accuracy_metres, -6);
        let lon_lat = to_lon_lat(point(529_740.0, 180_773.0));
        assert_eq!(first.longitude, format!("{:.6}", lon_lat.lon));
        assert_eq!(first.latitude, format!("{:.6}", lon_lat.lat));

        let last = ecm1[3];
        assert_eq!(last.easting, "530740.0");
        assert_eq!(last.accuracy_metres, 2);

        let metric = rows.iter().find(|r| r.line == elr("CTR")).unwrap();
        assert_eq!(metric.formatted_mileage, "-0.091km");
        assert_eq!(metric.accuracy_metres, 86);
    }

    #[test]
    fn precompute_miss_is_fatal() {
        let mut lines = sample_lines();
        if let Some(line) = lines.get_mut(&elr("ECM1")) {
            line.ty_to = 2_000;
        }
        let gc = Geocoder::from_lines(lines, GeocoderConfig::default());
        assert!(matches!(
            precompute_rows(&gc, 440),
            Err(ExportError::Geocode(GeocodeError::NotFound { ty: 1_320, .. }))
        ));
    }

    #[test]
    fn precompute_rejects_non_positive_resolution() {
        let gc = Geocoder::from_lines(sample_lines(), GeocoderConfig::default());
        assert!(matches!(
            precompute_rows(&gc, 0),
            Err(ExportError::InvalidResolution(0))
        ));
    }

    #[test]
    fn calibrated_line_exports_end_to_end() {
        let geometry: Polyline = vec![point(0.0, 0.0), point(1_000.0, 0.0)].into();
        let extent = LineExtent {
            ty_from: 0,
            ty_to: 1_100,
            length: geometry.length(),
        };
        let obs = [Observation::project(550, point(500.0, 20.0), &geometry)];
        let cal = calibrate(&extent, &obs).unwrap();

        let mut lines = LineMap::new();
        lines.insert(
            elr("MLN1"),
            Line {
                ty_from: 0,
                ty_to: 1_100,
                shape_length: extent.length,
                metric: false,
                geometry,
                segments: cal.segments,
            },
        );

        let rows = calibration_rows(&lines);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].offset_to_m, 500.0);
        assert_eq!(rows[1].offset_to_norm, 1.0);
    }

    #[test]
    fn write_csv_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("calibration.csv");
        write_csv(&path, &calibration_rows(&sample_lines())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 4);
    }

    struct FailingFlush;

    impl io::Write for FailingFlush {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::other("disk full"))
        }
    }

    #[test]
    fn write_rows_flush_failure_has_no_path() {
        let rows = calibration_rows(&sample_lines());
        let err = write_rows(FailingFlush, &rows).unwrap_err();
        assert!(matches!(err, ExportError::Flush(_)));
        assert_eq!(err.to_string(), "failed to flush CSV output: disk full");
    }

    #[test]
    fn precompute_off_grid_position_is_an_error() {
        let mut lines = sample_lines();
        if let Some(line) = lines.get_mut(&elr("CTR")) {
            line.geometry = vec![point(-1_500_000.0, 0.0), point(-1_499_000.0, 0.0)].into();
        }
        let gc = Geocoder::from_lines(lines, GeocoderConfig::default());
        assert!(matches!(
            precompute_rows(&gc, 440),
            Err(ExportError::GridRef(GridRefError::OutOfGrid { .. }))
        ));
    }

    #[test]
    fn write_csv_to_missing_directory_fails() {
        let rows: Vec<CalibrationRow> = Vec::new();
        let path = Path::new("/nonexistent/dir/calibration.csv");
        assert!(matches!(
            write_csv(path, &rows),
            Err(ExportError::Io { .. })
        ));
    }
}
