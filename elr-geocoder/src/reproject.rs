//! Reprojection from British National Grid (OSGB36, EPSG:27700) Easting /
//! Northing to WGS84 (EPSG:4326) longitude / latitude.
//!
//! Inverse Transverse Mercator on the Airy 1830 ellipsoid, then a
//! seven-parameter Helmert transformation to WGS84. This is the same
//! transformation PROJ applies for EPSG:27700 -> EPSG:4326 when the OSTN15
//! grid is not installed; agreement is better than 1e-5 degrees.

use crate::geometry::Point;

/// Airy 1830 ellipsoid.
const AIRY_A: f64 = 6_377_563.396;
const AIRY_B: f64 = 6_356_256.909;

/// WGS84 ellipsoid.
const WGS84_A: f64 = 6_378_137.0;
const WGS84_B: f64 = 6_356_752.314_245;

/// National Grid true origin and scale.
const F0: f64 = 0.999_601_271_7;
const LAT0_DEG: f64 = 49.0;
const LON0_DEG: f64 = -2.0;
const E0: f64 = 400_000.0;
const N0: f64 = -100_000.0;

/// Helmert parameters OSGB36 -> WGS84: translation (m), scale (ppm),
/// rotation (arc-seconds).
const TX: f64 = 446.448;
const TY: f64 = -125.157;
const TZ: f64 = 542.060;
const SCALE_PPM: f64 = -20.4894;
const RX_SEC: f64 = 0.1502;
const RY_SEC: f64 = 0.2470;
const RZ_SEC: f64 = 0.8421;

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

/// Convert a National Grid point to WGS84 longitude / latitude.
pub fn to_lon_lat(point: Point) -> LonLat {
    let (lat, lon) = grid_to_osgb36(point);
    let (x, y, z) = geodetic_to_cartesian(lat, lon, AIRY_A, AIRY_B);
    let (x, y, z) = helmert(x, y, z);
    let (lat, lon) = cartesian_to_geodetic(x, y, z, WGS84_A, WGS84_B);

    LonLat {
        lon: lon.to_degrees(),
        lat: lat.to_degrees(),
    }
}

/// Convert many points.
pub fn to_lon_lat_multi(points: &[Point]) -> Vec<LonLat> {
    points.iter().copied().map(to_lon_lat).collect()
}

/// Inverse Transverse Mercator: (lat, lon) in radians on the Airy ellipsoid.
fn grid_to_osgb36(point: Point) -> (f64, f64) {
    let (a, b) = (AIRY_A, AIRY_B);
    let lat0 = LAT0_DEG.to_radians();
    let lon0 = LON0_DEG.to_radians();
    let e2 = 1.0 - (b * b) / (a * a);
    let n = (a - b) / (a + b);
    let (n2, n3) = (n * n, n * n * n);

    let meridional_arc = |lat: f64| {
        let ma = (1.0 + n + 1.25 * n2 + 1.25 * n3) * (lat - lat0);
        let mb = (3.0 * n + 3.0 * n2 + 21.0 / 8.0 * n3) * (lat - lat0).sin() * (lat + lat0).cos();
        let mc = (15.0 / 8.0 * n2 + 15.0 / 8.0 * n3)
            * (2.0 * (lat - lat0)).sin()
            * (2.0 * (lat + lat0)).cos();
        let md = 35.0 / 24.0 * n3 * (3.0 * (lat - lat0)).sin() * (3.0 * (lat + lat0)).cos();
        b * F0 * (ma - mb + mc - md)
    };

    let mut lat = lat0;
    let mut m = 0.0;
    for _ in 0..100 {
        lat += (point.y - N0 - m) / (a * F0);
        m = meridional_arc(lat);
        if (point.y - N0 - m).abs() < 1e-5 {
            break;
        }
    }

    let (sin_lat, cos_lat) = lat.sin_cos();
    let nu = a * F0 / (1.0 - e2 * sin_lat * sin_lat).sqrt();
    let rho = a * F0 * (1.0 - e2) / (1.0 - e2 * sin_lat * sin_lat).powf(1.5);
    let eta2 = nu / rho - 1.0;

    let t = lat.tan();
    let (t2, t4) = (t * t, t.powi(4));
    let t6 = t4 * t2;
    let sec = 1.0 / cos_lat;
    let (nu3, nu5, nu7) = (nu.powi(3), nu.powi(5), nu.powi(7));

    let vii = t / (2.0 * rho * nu);
    let viii = t / (24.0 * rho * nu3) * (5.0 + 3.0 * t2 + eta2 - 9.0 * t2 * eta2);
    let ix = t / (720.0 * rho * nu5) * (61.0 + 90.0 * t2 + 45.0 * t4);
    let x = sec / nu;
    let xi = sec / (6.0 * nu3) * (nu / rho + 2.0 * t2);
    let xii = sec / (120.0 * nu5) * (5.0 + 28.0 * t2 + 24.0 * t4);
    let xiia = sec / (5040.0 * nu7) * (61.0 + 662.0 * t2 + 1320.0 * t4 + 720.0 * t6);

    let de = point.x - E0;
    let phi = lat - vii * de.powi(2) + viii * de.powi(4) - ix * de.powi(6);
    let lambda = lon0 + x * de - xi * de.powi(3) + xii * de.powi(5) - xiia * de.powi(7);

    (phi, lambda)
}

fn geodetic_to_cartesian(lat: f64, lon: f64, a: f64, b: f64) -> (f64, f64, f64) {
    let e2 = 1.0 - (b * b) / (a * a);
    let (sin_lat, cos_lat) = lat.sin_cos();
    let nu = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();

    (
        nu * cos_lat * lon.cos(),
        nu * cos_lat * lon.sin(),
        (1.0 - e2) * nu * sin_lat,
    )
}

fn helmert(x: f64, y: f64, z: f64) -> (f64, f64, f64) {
    let s = SCALE_PPM * 1e-6;
    let arcsec = |v: f64| (v / 3600.0).to_radians();
    let (rx, ry, rz) = (arcsec(RX_SEC), arcsec(RY_SEC), arcsec(RZ_SEC));

    (
        TX + (1.0 + s) * x - rz * y + ry * z,
        TY + rz * x + (1.0 + s) * y - rx * z,
        TZ - ry * x + rx * y + (1.0 + s) * z,
    )
}

/// Iterative conversion from cartesian to (lat, lon) in radians.
fn cartesian_to_geodetic(x: f64, y: f64, z: f64, a: f64, b: f64) -> (f64, f64) {
    let e2 = 1.0 - (b * b) / (a * a);
    let p = x.hypot(y);

    let mut lat = z.atan2(p * (1.0 - e2));
    for _ in 0..100 {
        let nu = a / (1.0 - e2 * lat.sin().powi(2)).sqrt();
        let next = (z + e2 * nu * lat.sin()).atan2(p);
        let converged = (next - lat).abs() < 1e-12;
        lat = next;
        if converged {
            break;
        }
    }

    (lat, y.atan2(x))
}
