use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::attributes::RegionAttributes;
use crate::config::LookupConfig;
use crate::errors::FloraResult;
use crate::geometry::GeoPoint;
use crate::index::{BuildReport, PolygonIndex};
use crate::region::{Region, RegionId};
use crate::source::{self, SourceRecord};

/// Answers "which region contains this latitude/longitude?".
///
/// The service is a cheap handle over a shared, immutable [`PolygonIndex`];
/// cloning it shares the index. It is `Send + Sync` whenever the attribute
/// type is, so one instance can serve any number of threads without locking.
///
/// # Examples
///
/// ```rust
/// use flora_finder::{AttributeMap, LookupConfig, RegionLookupService, SourceRecord};
///
/// let square = SourceRecord::polygon(
///     &[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)],
///     AttributeMap::new().with("NAME", "square"),
/// );
/// let service: RegionLookupService<AttributeMap> =
///     RegionLookupService::from_records(vec![square], &LookupConfig::new()).unwrap();
///
/// // latitude is y, longitude is x
/// let region = service.find_region(5.0, 5.0).unwrap();
/// assert_eq!(
///     service.to_boundary_text(region).unwrap(),
///     "POLYGON ((0 0, 0 10, 10 10, 10 0, 0 0))"
/// );
/// assert!(service.find_region(50.0, 50.0).is_none());
/// ```
pub struct RegionLookupService<A> {
    inner: Arc<PolygonIndex<A>>,
}

impl<A> Clone for RegionLookupService<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: RegionAttributes> RegionLookupService<A> {
    /// Builds the service from source records.
    pub fn from_records<I>(records: I, config: &LookupConfig) -> FloraResult<Self>
    where
        I: IntoIterator<Item = SourceRecord>,
    {
        PolygonIndex::build(records, config).map(Self::from_index)
    }

    /// Builds the service from a GeoJSON `FeatureCollection` document.
    pub fn from_geojson_str(text: &str, config: &LookupConfig) -> FloraResult<Self> {
        Self::from_records(source::read_feature_collection(text)?, config)
    }
}

impl<A: DeserializeOwned> RegionLookupService<A> {
    /// Restores the service from a snapshot file.
    pub fn from_snapshot_file(path: impl AsRef<Path>, config: &LookupConfig) -> FloraResult<Self> {
        PolygonIndex::load_snapshot(path, config).map(Self::from_index)
    }
}

impl<A: Serialize> RegionLookupService<A> {
    /// Persists the underlying index so it can be restored without the source
    /// data.
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> FloraResult<()> {
        self.inner.save_snapshot(path)
    }
}

impl<A> RegionLookupService<A> {
    pub fn from_index(index: PolygonIndex<A>) -> Self {
        Self {
            inner: Arc::new(index),
        }
    }

    /// Returns the region containing the point, or `None`.
    ///
    /// Coordinates are WGS84 degrees. Out-of-range or non-finite input is not
    /// an error; it simply matches nothing.
    pub fn find_region(&self, latitude: f64, longitude: f64) -> Option<&Region<A>> {
        self.find_region_at(&GeoPoint::new(latitude, longitude))
    }

    pub fn find_region_at(&self, point: &GeoPoint) -> Option<&Region<A>> {
        self.locate(point).and_then(|id| self.inner.region(id))
    }

    /// Like [`find_region_at`](Self::find_region_at) but returns the id.
    pub fn locate(&self, point: &GeoPoint) -> Option<RegionId> {
        let found = self.inner.locate(&point.to_coordinate());
        if found.is_none() {
            log::trace!("No region contains {}", point);
        }
        found
    }

    /// Boundary text of a region returned by this service.
    pub fn to_boundary_text(&self, region: &Region<A>) -> FloraResult<String> {
        region.to_boundary_text()
    }

    pub fn index(&self) -> &PolygonIndex<A> {
        &self.inner
    }

    pub fn build_report(&self) -> &BuildReport {
        self.inner.build_report()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<A> std::fmt::Debug for RegionLookupService<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionLookupService")
            .field("index", &self.inner)
            .finish()
    }
}
