//! Conversion between Easting / Northing points and Ordnance Survey grid
//! references (e.g. "TQ2974080773").
//!
//! A grid reference is two tile letters followed by two equal-length digit
//! groups. The first letter selects a 500 km tile, the second a 100 km tile
//! within it; the digits are the offset within the 100 km tile. Five digits
//! per group gives 1 metre resolution.

use crate::geometry::{Point, point};

/// Size of the first-letter tiles (metres).
const PRIMARY_TILE_SIZE: f64 = 500_000.0;

/// Size of the second-letter tiles (metres).
const SECONDARY_TILE_SIZE: f64 = 100_000.0;

/// South-west origin of the lettered grid relative to the coordinate origin.
const GRID_ORIGIN_EASTING: f64 = -2.0 * PRIMARY_TILE_SIZE;
const GRID_ORIGIN_NORTHING: f64 = -PRIMARY_TILE_SIZE;

/// Tile letters ordered from the south-west corner, west to east then south
/// to north. "I" is not used.
const TILE_LETTERS: &[u8; 25] = b"VWXYZQRSTULMNOPFGHJKABCDE";

const TILES_PER_ROW: usize = 5;

/// Digits per group at 1 metre resolution.
pub const FULL_RESOLUTION_DIGITS: usize = 5;

/// Errors from encoding or decoding a grid reference.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridRefError {
    /// Shorter than the two-letter prefix
    #[error("grid reference too short: {0:?}")]
    TooShort(String),

    /// Digit groups are not of equal length
    #[error("grid reference has an odd number of digits: {0:?}")]
    OddDigits(String),

    /// Digit groups contain a non-digit character
    #[error("grid reference digits are not numeric: {0:?}")]
    NotNumeric(String),

    /// A prefix character is not a grid tile letter
    #[error("unknown grid tile letter {0:?}")]
    UnknownLetter(char),

    /// Point lies outside the lettered grid
    #[error("point ({x}, {y}) is outside the grid")]
    OutOfGrid { x: f64, y: f64 },
}

/// Tile letter and south-west origin for a point, measured from the grid
/// origin, at the given tile size. `None` outside the 5x5 tile block.
fn tile_and_origin(x: f64, y: f64, tile_size: f64) -> Option<(u8, f64, f64)> {
    let col = (x / tile_size).floor();
    let row = (y / tile_size).floor();
    let span = 0.0..TILES_PER_ROW as f64;
    if !span.contains(&col) || !span.contains(&row) {
        return None;
    }
    let index = col as usize + TILES_PER_ROW * row as usize;
    Some((TILE_LETTERS[index], col * tile_size, row * tile_size))
}

/// The two tile letters and the south-west origin of the 100 km tile
/// containing `point`.
fn tile_100km_and_origin(p: Point) -> Result<([u8; 2], Point), GridRefError> {
    let out_of_grid = || GridRefError::OutOfGrid { x: p.x, y: p.y };
    let (first, x1, y1) = tile_and_origin(
        p.x - GRID_ORIGIN_EASTING,
        p.y - GRID_ORIGIN_NORTHING,
        PRIMARY_TILE_SIZE,
    )
    .ok_or_else(out_of_grid)?;
    let (second, x2, y2) = tile_and_origin(
        p.x - x1 - GRID_ORIGIN_EASTING,
        p.y - y1 - GRID_ORIGIN_NORTHING,
        SECONDARY_TILE_SIZE,
    )
    .ok_or_else(out_of_grid)?;

    let origin = point(
        x1 + x2 + GRID_ORIGIN_EASTING,
        y1 + y2 + GRID_ORIGIN_NORTHING,
    );
    Ok(([first, second], origin))
}

/// Grid reference at 1 metre resolution.
///
/// Points outside the lettered 2500 km square around the false origin are
/// rejected with [`GridRefError::OutOfGrid`].
///
/// # Examples
///
/// ```
/// use elr_geocoder::geometry::point;
/// use elr_geocoder::osgrid::point_to_osgr;
///
/// assert_eq!(point_to_osgr(point(529_740.0, 180_773.0)).unwrap(), "TQ2974080773");
/// assert!(point_to_osgr(point(-1_500_000.0, 0.0)).is_err());
/// ```
pub fn point_to_osgr(p: Point) -> Result<String, GridRefError> {
    point_to_osgr_with_digits(p, FULL_RESOLUTION_DIGITS)
}

/// Grid reference with `digits` digits per group (1 to 5).
///
/// Offsets are truncated (floored) to the grid cell, never rounded.
pub fn point_to_osgr_with_digits(p: Point, digits: usize) -> Result<String, GridRefError> {
    let digits = digits.clamp(1, FULL_RESOLUTION_DIGITS);
    let ([first, second], origin) = tile_100km_and_origin(p)?;

    let cell_size = cell_size(digits);
    let east = ((p.x - origin.x) / cell_size).floor() as i64;
    let north = ((p.y - origin.y) / cell_size).floor() as i64;

    Ok(format!(
        "{}{}{:0width$}{:0width$}",
        first as char,
        second as char,
        east,
        north,
        width = digits
    ))
}

/// Point at the south-west corner of the cell named by a grid reference.
///
/// # Examples
///
/// ```
/// use elr_geocoder::geometry::point;
/// use elr_geocoder::osgrid::osgr_to_point;
///
/// assert_eq!(osgr_to_point("TQ2974080773").unwrap(), point(529_740.0, 180_773.0));
/// assert!(osgr_to_point("TQ29X4080773").is_err());
/// ```
pub fn osgr_to_point(osgr: &str) -> Result<Point, GridRefError> {
    let mut chars = osgr.chars();
    let (Some(first), Some(second)) = (chars.next(), chars.next()) else {
        return Err(GridRefError::TooShort(osgr.to_string()));
    };
    let digits = chars.as_str();

    if digits.len() % 2 != 0 {
        return Err(GridRefError::OddDigits(osgr.to_string()));
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GridRefError::NotNumeric(osgr.to_string()));
    }

    let half = digits.len() / 2;
    let east = parse_digits(&digits[..half], osgr)?;
    let north = parse_digits(&digits[half..], osgr)?;

    let first = letter_index(first)?;
    let second = letter_index(second)?;

    let cell_size = cell_size(half);
    let x = PRIMARY_TILE_SIZE * (first % TILES_PER_ROW) as f64
        + GRID_ORIGIN_EASTING
        + SECONDARY_TILE_SIZE * (second % TILES_PER_ROW) as f64
        + east * cell_size;
    let y = PRIMARY_TILE_SIZE * (first / TILES_PER_ROW) as f64
        + GRID_ORIGIN_NORTHING
        + SECONDARY_TILE_SIZE * (second / TILES_PER_ROW) as f64
        + north * cell_size;

    Ok(point(x, y))
}

/// Empty digit groups denote the 100 km tile corner.
fn parse_digits(group: &str, osgr: &str) -> Result<f64, GridRefError> {
    if group.is_empty() {
        return Ok(0.0);
    }
    group
        .parse::<u64>()
        .map(|v| v as f64)
        .map_err(|_| GridRefError::NotNumeric(osgr.to_string()))
}

fn letter_index(letter: char) -> Result<usize, GridRefError> {
    u8::try_from(letter)
        .ok()
        .and_then(|b| TILE_LETTERS.iter().position(|&l| l == b))
        .ok_or(GridRefError::UnknownLetter(letter))
}

/// Cell size in metres for a digit group of the given length.
fn cell_size(digits: usize) -> f64 {
    SECONDARY_TILE_SIZE / 10f64.powi(digits as i32)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Decoding an encoded point returns the floored point
        #[test]
        fn roundtrip_floors(e in 0.0f64..700_000.0, n in 0.0f64..1_300_000.0) {
            let osgr = point_to_osgr(point(e, n)).unwrap();
            prop_assert_eq!(osgr.len(), 12);
            let p = osgr_to_point(&osgr).unwrap();
            prop_assert_eq!(p, point(e.floor(), n.floor()));
        }

        /// Every encoded reference is two uppercase letters then 2k digits
        #[test]
        fn encoded_shape(e in 0u32..700_000, n in 0u32..1_300_000, k in 1usize..=5) {
            let osgr = point_to_osgr_with_digits(point(f64::from(e), f64::from(n)), k).unwrap();
            prop_assert_eq!(osgr.len(), 2 + 2 * k);
            prop_assert!(osgr[..2].bytes().all(|b| b.is_ascii_uppercase()));
            prop_assert!(osgr[2..].bytes().all(|b| b.is_ascii_digit()));
        }
    }
}
