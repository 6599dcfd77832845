//! Geocoder error types.

use super::snapshot::CacheError;
use crate::domain::Elr;
use crate::source::SourceError;

/// Query-time lookup failures. These are recoverable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeocodeError {
    /// The ELR is not in the registry
    #[error("no ELR found: {0}")]
    UnknownLine(Elr),

    /// No calibration segment covers the requested yardage
    #[error("no calibration found for ELR {elr} at total yards {ty}")]
    NotFound { elr: Elr, ty: i64 },
}

/// Failures loading or building the registry. These are fatal.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to build ELRs from source: {0}")]
    Source(#[from] SourceError),

    #[error("snapshot cache error: {0}")]
    Cache(#[from] CacheError),
}
