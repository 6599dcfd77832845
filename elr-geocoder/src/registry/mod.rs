//! Registry of calibrated ELRs and the point / substring resolver.
//!
//! A [`Geocoder`] is loaded from a MessagePack snapshot when one exists, and
//! otherwise built from the survey source and saved.

mod config;
mod error;
mod geocoder;
mod line;
mod snapshot;

pub use config::GeocoderConfig;
pub use error::{GeocodeError, LoadError};
pub use geocoder::Geocoder;
pub use line::{Line, RailwayPoint};
pub use snapshot::{CacheError, LineMap, SnapshotCache};
