//! Survey source error types.

use std::path::PathBuf;

use crate::calibration::CalibrationError;
use crate::domain::Elr;

/// Errors reading or calibrating the survey source. All are fatal.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read survey source {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse survey source: {0}")]
    Json(#[from] serde_json::Error),

    /// A milepost references an ELR with no geometry
    #[error("milepost at total yards {ty} references unknown ELR {elr}")]
    OrphanMilepost { elr: Elr, ty: i64 },

    /// An ELR geometry has too few vertices to define a line
    #[error("ELR {elr} geometry has {vertices} vertices, need at least 2")]
    DegenerateGeometry { elr: Elr, vertices: usize },

    #[error("ELR {0} is listed more than once")]
    DuplicateLine(Elr),

    #[error("failed to calibrate ELR {elr}: {source}")]
    Calibration {
        elr: Elr,
        source: CalibrationError,
    },
}
