//! Disk snapshot of calibrated ELRs.
//!
//! The snapshot is written once after a build and read in place of
//! rebuilding thereafter. It carries no version or timestamp: delete the
//! file to force a rebuild.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::line::Line;
use crate::domain::Elr;

/// Calibrated ELRs keyed by code.
pub type LineMap = BTreeMap<Elr, Line>;

/// Snapshot read / write failures.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("failed to access snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("failed to decode snapshot: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

/// MessagePack snapshot file.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    path: PathBuf,
}

impl SnapshotCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Whether a snapshot has been written.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the snapshot.
    pub fn load(&self) -> Result<LineMap, CacheError> {
        let bytes = std::fs::read(&self.path).map_err(|source| CacheError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(rmp_serde::from_slice(&bytes)?)
    }

    /// Write the snapshot, creating parent directories if needed.
    pub fn save(&self, lines: &LineMap) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|source| CacheError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let bytes = rmp_serde::to_vec(lines)?;
        std::fs::write(&self.path, bytes).map_err(|source| CacheError::Io {
            path: self.path.clone(),
            source,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
