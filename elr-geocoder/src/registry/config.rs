//! Geocoder configuration.

use std::path::PathBuf;

/// Configuration for a [`Geocoder`](super::Geocoder).
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Survey source (ELR geometry and mileposts), read only when the
    /// snapshot cache is missing.
    pub source_path: PathBuf,

    /// Serialised snapshot of calibrated ELRs.
    pub cache_path: PathBuf,

    /// Log lookups that find no calibration segment.
    pub verbose: bool,
}

impl GeocoderConfig {
    /// Create a config with the given source and cache paths, non-verbose.
    pub fn new(source_path: impl Into<PathBuf>, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            cache_path: cache_path.into(),
            verbose: false,
        }
    }

    /// Enable or disable logging of lookup misses.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self::new("survey.json", "elr_cache.msgpack")
    }
}
