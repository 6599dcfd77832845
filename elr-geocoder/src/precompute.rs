//! Parallel precompute of geocoded positions, one task per resolution.

use std::path::{Path, PathBuf};

use futures::future::join_all;
use tracing::info;

use crate::config::positions_csv;
use crate::export::{ExportError, precompute_rows, write_csv};
use crate::registry::{Geocoder, GeocoderConfig, LoadError};

#[derive(Debug, thiserror::Error)]
pub enum PrecomputeError {
    #[error("failed to load geocoder: {0}")]
    Load(#[from] LoadError),

    #[error("failed to export positions: {0}")]
    Export(#[from] ExportError),

    #[error("precompute task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Precompute and write positions at a single resolution.
///
/// Loads its own [`Geocoder`] from the snapshot, so the snapshot must exist.
pub fn precompute(
    config: &GeocoderConfig,
    output_dir: &Path,
    resolution: i64,
) -> Result<PathBuf, PrecomputeError> {
    info!(resolution, "precomputing positions");

    let geocoder = Geocoder::load_snapshot(config.clone())?;
    let rows = precompute_rows(&geocoder, resolution)?;
    let path = positions_csv(output_dir, resolution);
    write_csv(&path, &rows)?;

    info!(resolution, rows = rows.len(), path = %path.display(), "wrote positions");
    Ok(path)
}

/// Precompute every resolution on the blocking pool.
///
/// All tasks run to completion; the first error in resolution order is
/// returned. On success returns the written paths in resolution order.
pub async fn precompute_all(
    config: &GeocoderConfig,
    output_dir: &Path,
    resolutions: &[i64],
) -> Result<Vec<PathBuf>, PrecomputeError> {
    let tasks: Vec<_> = resolutions
        .iter()
        .map(|&resolution| {
            let config = config.clone();
            let output_dir = output_dir.to_path_buf();
            tokio::task::spawn_blocking(move || precompute(&config, &output_dir, resolution))
        })
        .collect();

    let mut paths = Vec::with_capacity(resolutions.len());
    for joined in join_all(tasks).await {
        paths.push(joined??);
    }
    Ok(paths)
}
