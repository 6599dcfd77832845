//! Planar polyline geometry.
//!
//! All coordinates are Easting / Northing metres in a single projected
//! coordinate system (British National Grid), so plain Euclidean distance is
//! used throughout. Points and lines are `geo` types; the linear referencing
//! walks below are written over them.

use geo::{Coord, EuclideanDistance, EuclideanLength, Line, LineString};
use serde::{Deserialize, Serialize};

/// Tolerance for deciding that a point lies on a line segment.
const ON_SEGMENT_EPSILON: f64 = 1e-9;

/// A planar point (Easting, Northing) in metres.
pub type Point = Coord<f64>;

/// Shorthand for a [`Point`] from Easting and Northing.
pub const fn point(x: f64, y: f64) -> Point {
    Coord { x, y }
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    geo::Point::from(a).euclidean_distance(&geo::Point::from(b))
}

/// An ordered sequence of vertices describing a line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polyline(pub LineString<f64>);

impl Polyline {
    pub fn new(points: Vec<Point>) -> Self {
        Self(LineString::new(points))
    }

    pub fn points(&self) -> &[Point] {
        &self.0.0
    }

    pub fn len(&self) -> usize {
        self.0.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.0.is_empty()
    }

    /// Total planar length in metres.
    pub fn length(&self) -> f64 {
        self.0.euclidean_length()
    }

    pub fn as_line_string(&self) -> &LineString<f64> {
        &self.0
    }
}

impl Default for Polyline {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl From<Vec<Point>> for Polyline {
    fn from(points: Vec<Point>) -> Self {
        Self::new(points)
    }
}

impl From<Vec<[f64; 2]>> for Polyline {
    fn from(pairs: Vec<[f64; 2]>) -> Self {
        Self::new(pairs.into_iter().map(Point::from).collect())
    }
}

impl From<LineString<f64>> for Polyline {
    fn from(line: LineString<f64>) -> Self {
        Self(line)
    }
}

/// Linear interpolation between two points.
pub fn interpolate(from: Point, to: Point, ratio: f64) -> Point {
    from + (to - from) * ratio
}

/// Nearest point on a polyline to `target`, and the distance to it.
///
/// Each segment is tried in order; the first segment achieving the smallest
/// distance wins. A polyline with fewer than two vertices has no segments and
/// yields the default point at infinite distance.
pub fn nearest_point_on_line(line: &Polyline, target: Point) -> (Point, f64) {
    let mut nearest = Point::default();
    let mut min_distance = f64::MAX;

    for segment in line.0.lines() {
        let (candidate, distance) = nearest_point_on_segment(segment, target);
        if distance < min_distance {
            min_distance = distance;
            nearest = candidate;
        }
    }

    (nearest, min_distance)
}

/// Project `target` onto `segment`, clamped to its ends.
fn nearest_point_on_segment(segment: Line<f64>, target: Point) -> (Point, f64) {
    let delta = segment.delta();
    let len_squared = delta.x * delta.x + delta.y * delta.y;

    if len_squared == 0.0 {
        return (segment.start, distance(segment.start, target));
    }

    let offset = target - segment.start;
    let ratio = (offset.x * delta.x + offset.y * delta.y) / len_squared;

    if ratio < 0.0 {
        return (segment.start, distance(segment.start, target));
    }
    if ratio > 1.0 {
        return (segment.end, distance(segment.end, target));
    }

    let projection = segment.start + delta * ratio;
    (projection, distance(projection, target))
}

/// Distance along the line from its first vertex to `target`.
///
/// `target` is expected to lie on the line (typically the output of
/// [`nearest_point_on_line`]). A point off the line accumulates the full
/// line length.
pub fn distance_along_line(line: &Polyline, target: Point) -> f64 {
    let mut total = 0.0;

    for segment in line.0.lines() {
        if point_on_segment(segment, target) {
            total += distance(segment.start, target);
            break;
        }
        total += segment.euclidean_length();
    }

    total
}

fn point_on_segment(segment: Line<f64>, target: Point) -> bool {
    let via_target = distance(segment.start, target) + distance(segment.end, target);
    (segment.euclidean_length() - via_target).abs() < ON_SEGMENT_EPSILON
}

/// The point at `distance` metres along the line, interpolated if necessary.
///
/// Negative distances return the first vertex; distances past the end return
/// the last vertex. An empty line returns the origin.
pub fn point_at_distance(line: &Polyline, distance: f64) -> Point {
    let points = line.points();
    let Some(&first) = points.first() else {
        return Point::default();
    };

    if distance < 0.0 || points.len() == 1 {
        return first;
    }

    let mut travelled = 0.0;
    for segment in line.0.lines() {
        let length = segment.euclidean_length();
        let remaining = distance - travelled;

        if remaining < length {
            return interpolate(segment.start, segment.end, remaining / length);
        }

        travelled += length;
    }

    points[points.len() - 1]
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Polylines of 2..8 vertices with integer-ish coordinates and no
    /// repeated consecutive vertices.
    fn polyline() -> impl Strategy<Value = Polyline> {
        proptest::collection::vec((-1_000i32..1_000, -1_000i32..1_000), 2..8)
            .prop_filter("consecutive vertices must differ", |v| {
                v.windows(2).all(|w| w[0] != w[1])
            })
            .prop_map(|v| {
                v.into_iter()
                    .map(|(x, y)| point(f64::from(x), f64::from(y)))
                    .collect::<Vec<_>>()
                    .into()
            })
    }

    proptest! {
        /// Walking to a vertex then measuring back returns that vertex
        #[test]
        fn vertex_distance_roundtrip(l in polyline(), idx in 0usize..8) {
            let idx = idx % l.len();
            let vertex = l.points()[idx];
            let d = distance_along_line(&l, vertex);
            let p = point_at_distance(&l, d);
            prop_assert!(distance(p, vertex) < 1e-6, "{:?} vs {:?}", p, vertex);
        }

        /// A point placed at a fraction along a segment measures back to itself
        #[test]
        fn interior_point_roundtrip(l in polyline(), seg in 0usize..8, t in 0.0f64..1.0) {
            let seg = seg % (l.len() - 1);
            let on_line = interpolate(l.points()[seg], l.points()[seg + 1], t);
            let (projected, dist) = nearest_point_on_line(&l, on_line);
            prop_assert!(dist < 1e-6);
            let d = distance_along_line(&l, projected);
            let p = point_at_distance(&l, d);
            prop_assert!(distance(p, projected) < 1e-6, "{:?} vs {:?}", p, projected);
        }

        /// The nearest point is never further than any vertex
        #[test]
        fn nearest_not_worse_than_vertices(l in polyline(), x in -2_000.0f64..2_000.0, y in -2_000.0f64..2_000.0) {
            let target = point(x, y);
            let (_, d) = nearest_point_on_line(&l, target);
            for v in l.points() {
                prop_assert!(d <= distance(*v, target) + 1e-9);
            }
        }
    }
}
