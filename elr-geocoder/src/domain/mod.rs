//! Domain types for railway linear referencing.
//!
//! This module contains the validated line code type and the mileage
//! conversions shared by the calibration, geocoding and export layers.

mod elr;
pub mod mileage;

pub use elr::{Elr, InvalidElr};
pub use mileage::{
    QUARTER_MILE_YARDS, YARDS_IN_MILE, YARDS_TO_METRES, build_total_yards, explode_total_yards,
    fmt_mileages, fmt_total_yards, metres_to_miles,
};
