//! Geometry primitives for region lookup.
//!
//! Coordinates follow the Cartesian convention used by the index: `x` is
//! longitude and `y` is latitude. Query points arrive the other way round,
//! as `(latitude, longitude)`, and are converted by [`GeoPoint`].
//!
//! Containment is decided by ray casting, preceded by a cross-product on-edge
//! check so that points lying on a ring are classified by [`EdgePolicy`].
//! The check runs in plain `f64` arithmetic: it is deterministic for a given
//! ring and point, but a point that is only mathematically on a diagonal edge
//! may round to either side of it.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::bounding_box::BoundingBox;

/// A 2D coordinate (x = longitude, y = latitude).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    /// Creates a new coordinate.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((x, y): (f64, f64)) -> Self {
        Coordinate::new(x, y)
    }
}

/// A query point in decimal degrees.
///
/// The constructor takes `(latitude, longitude)`, the natural order for
/// geographic input. No datum or projection handling happens here: callers
/// must pass coordinates in the same reference system as the indexed layer.
///
/// ```rust
/// use flora_finder::GeoPoint;
///
/// let point = GeoPoint::new(-36.45954, 146.13957);
/// let coord = point.to_coordinate();
/// assert_eq!(coord.x, 146.13957);
/// assert_eq!(coord.y, -36.45954);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Whether latitude is within [-90, 90] and longitude within [-180, 180].
    ///
    /// Lookups do not call this; it is a helper for callers that want to
    /// reject obviously swapped or projected input before querying.
    pub fn is_within_wgs84_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Converts to index coordinates (x = longitude, y = latitude).
    pub fn to_coordinate(&self) -> Coordinate {
        Coordinate::new(self.longitude, self.latitude)
    }
}

impl Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GeoPoint(lat={:.6}, lon={:.6})", self.latitude, self.longitude)
    }
}

/// How a point lying exactly on a ring is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EdgePolicy {
    /// Points on the boundary are contained.
    #[default]
    Inclusive,
    /// Points on the boundary are not contained.
    Exclusive,
}

impl EdgePolicy {
    fn admits_boundary(self) -> bool {
        matches!(self, EdgePolicy::Inclusive)
    }
}

/// Position of a point relative to a ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Inside,
    Boundary,
    Outside,
}

/// An ordered sequence of coordinates forming a polygon ring.
///
/// The ring is treated as implicitly closed for containment: an explicit
/// closing coordinate is allowed but not required. Closure is enforced only
/// when the ring is rendered as boundary text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ring {
    coords: Vec<Coordinate>,
}

impl Ring {
    pub fn new(coords: Vec<Coordinate>) -> Self {
        Self { coords }
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coords
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// First and last coordinate are identical.
    pub fn is_closed(&self) -> bool {
        match (self.coords.first(), self.coords.last()) {
            (Some(first), Some(last)) => self.coords.len() > 1 && first == last,
            _ => false,
        }
    }

    /// Whether the ring has at least `min` distinct coordinates.
    ///
    /// Stops scanning as soon as `min` distinct coordinates have been seen, so
    /// the cost is linear in the ring length for small `min`.
    pub fn has_distinct_points(&self, min: usize) -> bool {
        if min == 0 {
            return true;
        }
        let mut distinct: Vec<&Coordinate> = Vec::with_capacity(min);
        for c in &self.coords {
            if !distinct.iter().any(|d| *d == c) {
                distinct.push(c);
                if distinct.len() >= min {
                    return true;
                }
            }
        }
        false
    }

    pub fn envelope(&self) -> Option<BoundingBox> {
        BoundingBox::from_coordinates(&self.coords)
    }

    /// Classifies a point against this ring.
    ///
    /// Rings with fewer than three coordinates enclose nothing and report
    /// every point as outside.
    pub fn locate(&self, point: &Coordinate) -> Location {
        let n = self.coords.len();
        if n < 3 {
            return Location::Outside;
        }

        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = &self.coords[j];
            let b = &self.coords[i];

            if on_segment(point, a, b) {
                return Location::Boundary;
            }

            if ((b.y > point.y) != (a.y > point.y))
                && (point.x < (a.x - b.x) * (point.y - b.y) / (a.y - b.y) + b.x)
            {
                inside = !inside;
            }
            j = i;
        }

        if inside {
            Location::Inside
        } else {
            Location::Outside
        }
    }
}

impl From<Vec<Coordinate>> for Ring {
    fn from(coords: Vec<Coordinate>) -> Self {
        Ring::new(coords)
    }
}

/// Tests whether `p` lies on the closed segment `a`-`b`.
///
/// Collinearity is a zero `f64` cross product, so the answer is
/// deterministic but subject to rounding on non-axis-aligned edges.
fn on_segment(p: &Coordinate, a: &Coordinate, b: &Coordinate) -> bool {
    let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    if cross != 0.0 {
        return false;
    }
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Containment of `point` by a polygon with optional holes.
///
/// A point inside a hole is outside the polygon. A point on the exterior ring
/// or on a hole ring is decided by `policy`.
pub fn polygon_contains(
    exterior: &Ring,
    holes: &[Ring],
    point: &Coordinate,
    policy: EdgePolicy,
) -> bool {
    match exterior.locate(point) {
        Location::Outside => return false,
        Location::Boundary => return policy.admits_boundary(),
        Location::Inside => {}
    }

    for hole in holes {
        match hole.locate(point) {
            Location::Inside => return false,
            Location::Boundary => return policy.admits_boundary(),
            Location::Outside => {}
        }
    }

    true
}
