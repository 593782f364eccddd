//! # Flora Finder - Region Lookup for Vegetation Class Layers
//!
//! This crate answers "which polygon of a layer contains this point?" for
//! polygon layers such as the Victorian "Modelled 1750 Ecological Vegetation
//! Classes" dataset, and renders the matching polygon's boundary as
//! well-known text.
//!
//! ## Features
//!
//! - **Two-Phase Search**: R-Tree bounding-box filter followed by an exact
//!   point-in-polygon test
//! - **Immutable Index**: built once, queried from any number of threads
//! - **Typed Attributes**: convert loosely typed source fields into your own
//!   record type at build time
//! - **GeoJSON Input**: build directly from a `FeatureCollection`
//! - **Snapshots**: persist a built index and restore it without the source
//! - **Boundary Text**: `POLYGON ((x y, ...))` output that parses back exactly
//!
//! ## Quick Start
//!
//! ```rust
//! use flora_finder::{AttributeMap, LookupConfig, RegionLookupService};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let layer = r#"{
//!     "type": "FeatureCollection",
//!     "features": [{
//!         "type": "Feature",
//!         "properties": {"X_EVCNAME": "Plains Grassy Woodland"},
//!         "geometry": {
//!             "type": "Polygon",
//!             "coordinates": [[[144.0, -38.0], [144.0, -37.0], [145.0, -37.0], [145.0, -38.0], [144.0, -38.0]]]
//!         }
//!     }]
//! }"#;
//!
//! let service: RegionLookupService<AttributeMap> =
//!     RegionLookupService::from_geojson_str(layer, &LookupConfig::new())?;
//!
//! if let Some(region) = service.find_region(-37.5, 144.5) {
//!     println!("{}", service.to_boundary_text(region)?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod attributes;
pub mod bounding_box;
pub mod config;
pub mod errors;
pub mod geometry;
pub mod index;
pub mod lookup;
pub mod region;
pub mod snapshot;
pub mod source;
pub mod wkt;

pub use attributes::{EvcProperties, RegionAttributes};
pub use bounding_box::BoundingBox;
pub use config::{LookupConfig, LookupConfigBuilder, MalformedPolicy};
pub use errors::{FloraError, FloraResult};
pub use geometry::{Coordinate, EdgePolicy, GeoPoint, Location, Ring};
pub use index::{BuildReport, PolygonIndex, QueryTrace};
pub use lookup::RegionLookupService;
pub use region::{Region, RegionId};
pub use source::{AttributeMap, AttributeValue, RawGeometry, SourceRecord};
pub use wkt::{parse_boundary_text, to_boundary_text};
