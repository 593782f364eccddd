//! Boundary text: a single exterior ring as well-known text.
//!
//! Output is `POLYGON ((x1 y1, x2 y2, ..., x1 y1))` with coordinates in
//! `x y` (longitude latitude) order. Numbers use Rust's shortest round-trip
//! formatting, so `0.0` renders as `0` and parsing the text back yields the
//! exact same `f64` values.

use crate::errors::{FloraError, FloraResult};
use crate::geometry::{Coordinate, Ring};

const POLYGON_TAG: &str = "POLYGON";
const MIN_DISTINCT_POINTS: usize = 3;

/// Serializes a ring as boundary text.
///
/// The ring must already be closed (first coordinate equal to the last) and
/// have at least three distinct points; otherwise `InvalidRing` is returned.
///
/// ```rust
/// use flora_finder::geometry::{Coordinate, Ring};
/// use flora_finder::wkt::to_boundary_text;
///
/// let ring = Ring::new(vec![
///     Coordinate::new(0.0, 0.0),
///     Coordinate::new(0.0, 10.0),
///     Coordinate::new(10.0, 10.0),
///     Coordinate::new(10.0, 0.0),
///     Coordinate::new(0.0, 0.0),
/// ]);
/// assert_eq!(
///     to_boundary_text(&ring).unwrap(),
///     "POLYGON ((0 0, 0 10, 10 10, 10 0, 0 0))"
/// );
/// ```
pub fn to_boundary_text(ring: &Ring) -> FloraResult<String> {
    validate_ring(ring)?;

    let body = ring
        .coordinates()
        .iter()
        .map(|c| format!("{} {}", c.x, c.y))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!("{} (({}))", POLYGON_TAG, body))
}

fn validate_ring(ring: &Ring) -> FloraResult<()> {
    if !ring.has_distinct_points(MIN_DISTINCT_POINTS) {
        return Err(FloraError::InvalidRing(format!(
            "a polygon ring needs at least {} distinct points",
            MIN_DISTINCT_POINTS
        )));
    }
    if !ring.is_closed() {
        return Err(FloraError::InvalidRing(
            "ring is not closed: first and last coordinates differ".to_string(),
        ));
    }
    Ok(())
}

/// Parses single-ring boundary text back into a ring.
///
/// Accepts the output of [`to_boundary_text`] and minor whitespace
/// variations (`POLYGON((...))`). Interior rings are rejected.
pub fn parse_boundary_text(text: &str) -> FloraResult<Ring> {
    let text = text.trim();
    let rest = text
        .strip_prefix(POLYGON_TAG)
        .ok_or_else(|| invalid(format!("expected '{}' prefix", POLYGON_TAG)))?
        .trim();

    let inner = rest
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| invalid("polygon body must be enclosed in parentheses".to_string()))?
        .trim();

    let ring_body = inner
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| invalid("ring must be enclosed in parentheses".to_string()))?;

    if ring_body.contains('(') || ring_body.contains(')') {
        return Err(invalid("only a single ring is supported".to_string()));
    }

    let mut coords = Vec::new();
    for pair in ring_body.split(',') {
        let parts: Vec<&str> = pair.split_whitespace().collect();
        if parts.len() != 2 {
            return Err(invalid(format!("invalid coordinate pair: '{}'", pair.trim())));
        }
        let x: f64 = parts[0]
            .parse()
            .map_err(|_| invalid(format!("invalid x coordinate: {}", parts[0])))?;
        let y: f64 = parts[1]
            .parse()
            .map_err(|_| invalid(format!("invalid y coordinate: {}", parts[1])))?;
        coords.push(Coordinate::new(x, y));
    }

    Ok(Ring::new(coords))
}

fn invalid(reason: String) -> FloraError {
    FloraError::InvalidBoundaryText(reason)
}
