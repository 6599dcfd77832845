//! Railway linear-referencing geocoder.
//!
//! Converts a position on a British railway line, given as an Engineer's
//! Line Reference (ELR) and a mileage in total yards, into Easting /
//! Northing, WGS84 longitude / latitude and an OS grid reference. Lines are
//! calibrated against surveyed mileposts to correct for the difference
//! between reported and measured distances.

pub mod calibration;
pub mod config;
pub mod domain;
pub mod export;
pub mod geometry;
pub mod osgrid;
pub mod precompute;
pub mod registry;
pub mod reproject;
pub mod source;
pub mod stats;
