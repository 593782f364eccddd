use rstar::primitives::Rectangle;
use rstar::AABB;

use crate::geometry::Coordinate;

/// An axis-aligned 2D bounding box given by its minimum and maximum corners.
///
/// Every region carries the envelope of its exterior ring; the R-Tree is
/// bulk-loaded from these envelopes and snapshots store them so that a restore
/// does not have to walk every ring again.
///
/// # Examples
///
/// ```rust
/// use flora_finder::BoundingBox;
///
/// let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
/// assert!(bbox.contains_point(10.0, 5.0));
/// assert!(!bbox.contains_point(10.5, 5.0));
/// ```
#[derive(Clone, Copy, PartialEq, Default, Debug, serde::Deserialize, serde::Serialize)]
pub struct BoundingBox {
    /// Minimum X coordinate (westmost longitude)
    pub min_x: f64,
    /// Minimum Y coordinate (southmost latitude)
    pub min_y: f64,
    /// Maximum X coordinate
    pub max_x: f64,
    /// Maximum Y coordinate
    pub max_y: f64,
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BoundingBox({}, {}, {}, {})",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

impl BoundingBox {
    /// Creates a new bounding box with the specified coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> BoundingBox {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Computes the envelope of a coordinate sequence.
    ///
    /// Returns `None` for an empty sequence.
    pub fn from_coordinates(coords: &[Coordinate]) -> Option<BoundingBox> {
        let first = coords.first()?;
        let mut bbox = BoundingBox::new(first.x, first.y, first.x, first.y);
        for c in &coords[1..] {
            bbox.min_x = bbox.min_x.min(c.x);
            bbox.min_y = bbox.min_y.min(c.y);
            bbox.max_x = bbox.max_x.max(c.x);
            bbox.max_y = bbox.max_y.max(c.y);
        }
        Some(bbox)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Checks if this bounding box contains a point. Edges count as inside.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Returns the union of this bounding box with another.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// Checks if this bounding box is valid (finite and min <= max).
    pub fn is_valid(&self) -> bool {
        [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite())
            && self.min_x <= self.max_x
            && self.min_y <= self.max_y
    }

    /// Converts to the rectangle primitive stored in the R-Tree.
    pub(crate) fn to_rectangle(self) -> Rectangle<[f64; 2]> {
        Rectangle::from_aabb(AABB::from_corners(
            [self.min_x, self.min_y],
            [self.max_x, self.max_y],
        ))
    }
}
