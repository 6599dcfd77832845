//! Railway mileage conversions and formatting.
//!
//! Positions along an ELR are held as "total yards" irrespective of whether
//! the line reports in miles/yards or kilometres.

/// Number of yards in a mile.
pub const YARDS_IN_MILE: i64 = 1_760;

/// Number of yards in a quarter mile.
pub const QUARTER_MILE_YARDS: f64 = 440.0;

/// Metres in a statute mile.
pub const METRES_IN_MILE: f64 = 1_609.344;

/// Yards to metres conversion factor.
pub const YARDS_TO_METRES: f64 = 0.9144;

/// Split total yards into (miles, yards).
///
/// Values under one mile, including all negative values, are returned as
/// zero miles and the total yards unchanged. Some ELRs carry negative
/// mileages from historical renumbering; no attempt is made to convert these.
pub fn explode_total_yards(total_yards: i64) -> (i64, i64) {
    if total_yards >= YARDS_IN_MILE {
        return (total_yards / YARDS_IN_MILE, total_yards % YARDS_IN_MILE);
    }
    (0, total_yards)
}

/// Combine miles and yards into total yards.
pub fn build_total_yards(miles: i64, yards: i64) -> i64 {
    miles * YARDS_IN_MILE + yards
}

/// Format a distance in metres as decimal miles, e.g. "9.500 miles".
pub fn metres_to_miles(metres: f64) -> String {
    format!("{:.3} miles", metres / METRES_IN_MILE)
}

/// Format total yards for display.
///
/// Metric ELRs are shown in kilometres ("1.609km"), others as miles and
/// zero-padded yards ("35M 0880y").
pub fn fmt_total_yards(total_yards: i64, metric: bool) -> String {
    if metric {
        return format!("{:.3}km", total_yards as f64 * YARDS_TO_METRES / 1_000.0);
    }

    let (miles, yards) = explode_total_yards(total_yards);
    format!("{}M {:04}y", miles, yards)
}

/// Format a mileage range, e.g. "1M 0000y to 2M 0440y".
pub fn fmt_mileages(ty_from: i64, ty_to: i64, metric: bool) -> String {
    format!(
        "{} to {}",
        fmt_total_yards(ty_from, metric),
        fmt_total_yards(ty_to, metric)
    )
}
