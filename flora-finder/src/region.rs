use serde::{Deserialize, Serialize};

use crate::bounding_box::BoundingBox;
use crate::errors::FloraResult;
use crate::geometry::{polygon_contains, Coordinate, EdgePolicy, Ring};
use crate::wkt;

/// Position of a region in its index. Stable for the lifetime of one loaded
/// index; a rebuild from source data may assign different ids.
pub type RegionId = usize;

/// One polygon of the layer together with its attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region<A> {
    boundary: Ring,
    holes: Vec<Ring>,
    envelope: BoundingBox,
    attributes: A,
}

impl<A> Region<A> {
    pub(crate) fn new(boundary: Ring, holes: Vec<Ring>, envelope: BoundingBox, attributes: A) -> Self {
        Self {
            boundary,
            holes,
            envelope,
            attributes,
        }
    }

    /// The exterior ring.
    pub fn boundary(&self) -> &Ring {
        &self.boundary
    }

    /// Interior rings, if the source polygon had any.
    pub fn holes(&self) -> &[Ring] {
        &self.holes
    }

    /// Bounding box of the exterior ring.
    pub fn envelope(&self) -> &BoundingBox {
        &self.envelope
    }

    pub fn attributes(&self) -> &A {
        &self.attributes
    }

    /// Exact containment test, holes included.
    pub fn contains(&self, point: &Coordinate, policy: EdgePolicy) -> bool {
        polygon_contains(&self.boundary, &self.holes, point, policy)
    }

    /// Renders the exterior ring as `POLYGON ((x y, ...))`.
    ///
    /// Fails with `InvalidRing` when the ring is not closed or has fewer
    /// than three distinct points.
    pub fn to_boundary_text(&self) -> FloraResult<String> {
        wkt::to_boundary_text(&self.boundary)
    }
}
