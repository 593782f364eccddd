//! Immutable polygon index.
//!
//! The index owns every region of a layer plus an R-Tree over the regions'
//! bounding boxes. Queries run in two phases: the tree returns the regions
//! whose box contains the point, then each candidate gets an exact
//! point-in-polygon test. The first candidate that passes wins.
//!
//! Candidate order is the tree's own iteration order. For a well-formed layer
//! (no overlapping polygons) at most one candidate can pass; where polygons do
//! overlap the winner is whichever the tree yields first, not the smallest or
//! most specific region.

use std::time::Instant;

use rstar::primitives::{GeomWithData, Rectangle};
use rstar::RTree;

use crate::attributes::RegionAttributes;
use crate::bounding_box::BoundingBox;
use crate::config::{LookupConfig, MalformedPolicy};
use crate::errors::{FloraError, FloraResult};
use crate::geometry::{Coordinate, EdgePolicy, Ring};
use crate::region::{Region, RegionId};
use crate::source::{RawGeometry, RawPosition, SourceRecord};

/// Tree entry: a region's envelope tagged with its position.
type RegionEntry = GeomWithData<Rectangle<[f64; 2]>, RegionId>;

/// Counts collected while building an index from source records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Records consumed from the source.
    pub records_read: usize,
    /// Regions that made it into the index.
    pub regions_indexed: usize,
    /// Records skipped because their geometry was not a single polygon.
    pub skipped_non_polygon: usize,
    /// Records dropped under [`MalformedPolicy::Skip`].
    pub malformed_skipped: usize,
}

/// Work done by a single query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryTrace {
    /// Regions whose bounding box contained the point.
    pub candidates: usize,
    /// Exact point-in-polygon tests run before an answer was found.
    pub exact_tests: usize,
}

/// Write-once, read-many spatial index over a layer of polygons.
///
/// `A` is the attribute type carried by every region. The index never changes
/// after construction, so a shared reference can be queried from many threads
/// at once.
pub struct PolygonIndex<A> {
    regions: Vec<Region<A>>,
    tree: RTree<RegionEntry>,
    edge_policy: EdgePolicy,
    report: BuildReport,
}

impl<A: RegionAttributes> PolygonIndex<A> {
    /// Builds an index from source records, in source order.
    ///
    /// Records whose geometry is not a single polygon are skipped. Malformed
    /// geometry and attributes that fail conversion either abort the build or
    /// are skipped, according to the configured [`MalformedPolicy`].
    pub fn build<I>(records: I, config: &LookupConfig) -> FloraResult<Self>
    where
        I: IntoIterator<Item = SourceRecord>,
    {
        let start = Instant::now();
        let mut report = BuildReport::default();
        let mut regions = Vec::new();

        for (position, record) in records.into_iter().enumerate() {
            report.records_read += 1;

            match ingest_record(position, record) {
                Ok(Some(region)) => regions.push(region),
                Ok(None) => report.skipped_non_polygon += 1,
                Err(err) => match config.malformed_policy() {
                    MalformedPolicy::Abort => {
                        log::debug!("Aborting index build at record {}", position);
                        return Err(err);
                    }
                    MalformedPolicy::Skip => {
                        log::warn!("Skipping record: {}", err);
                        report.malformed_skipped += 1;
                    }
                },
            }
        }

        report.regions_indexed = regions.len();
        let index = Self::from_regions(regions, config, report);

        log::info!(
            "Indexed {} regions from {} records in {:?} ({} non-polygon, {} malformed skipped)",
            index.report.regions_indexed,
            index.report.records_read,
            start.elapsed(),
            index.report.skipped_non_polygon,
            index.report.malformed_skipped,
        );
        Ok(index)
    }
}

impl<A> PolygonIndex<A> {
    /// Assembles an index from finished regions by bulk-loading their
    /// envelopes. Region ids are positions in `regions`.
    pub(crate) fn from_regions(
        regions: Vec<Region<A>>,
        config: &LookupConfig,
        report: BuildReport,
    ) -> Self {
        let entries: Vec<RegionEntry> = regions
            .iter()
            .enumerate()
            .map(|(id, region)| GeomWithData::new(region.envelope().to_rectangle(), id))
            .collect();
        let tree = RTree::bulk_load(entries);

        Self {
            regions,
            tree,
            edge_policy: config.edge_policy(),
            report,
        }
    }

    /// Finds the region containing `point` (x = longitude, y = latitude).
    ///
    /// Returns `None` when no region contains the point.
    pub fn locate(&self, point: &Coordinate) -> Option<RegionId> {
        self.tree
            .locate_all_at_point(&[point.x, point.y])
            .map(|entry| entry.data)
            .find(|&id| self.regions[id].contains(point, self.edge_policy))
    }

    /// Same answer as [`locate`](Self::locate), also reporting how much work
    /// the query did. Unlike `locate`, this drains the tree iterator so that
    /// `candidates` counts every box hit.
    pub fn locate_traced(&self, point: &Coordinate) -> (Option<RegionId>, QueryTrace) {
        let mut trace = QueryTrace::default();
        let mut found = None;

        for entry in self.tree.locate_all_at_point(&[point.x, point.y]) {
            trace.candidates += 1;
            if found.is_some() {
                continue;
            }
            trace.exact_tests += 1;
            if self.regions[entry.data].contains(point, self.edge_policy) {
                found = Some(entry.data);
            }
        }

        (found, trace)
    }

    /// Ids of all regions whose bounding box contains `point`, in tree order.
    ///
    /// This is the filter phase only; candidates may not contain the point.
    pub fn candidates(&self, point: &Coordinate) -> Vec<RegionId> {
        self.tree
            .locate_all_at_point(&[point.x, point.y])
            .map(|entry| entry.data)
            .collect()
    }

    pub fn region(&self, id: RegionId) -> Option<&Region<A>> {
        self.regions.get(id)
    }

    /// All regions, indexed by [`RegionId`].
    pub fn regions(&self) -> &[Region<A>] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Union of every region's bounding box, `None` for an empty index.
    pub fn envelope(&self) -> Option<BoundingBox> {
        self.regions
            .iter()
            .map(|r| *r.envelope())
            .reduce(|acc, b| acc.union(&b))
    }

    pub fn edge_policy(&self) -> EdgePolicy {
        self.edge_policy
    }

    /// Counts from the build that produced this index. An index restored from
    /// a snapshot reports the restored region count only.
    pub fn build_report(&self) -> &BuildReport {
        &self.report
    }
}

impl<A> std::fmt::Debug for PolygonIndex<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolygonIndex")
            .field("regions", &self.regions.len())
            .field("edge_policy", &self.edge_policy)
            .field("report", &self.report)
            .finish()
    }
}

/// Turns one source record into a region.
///
/// `Ok(None)` means the record is of a geometry kind the index ignores.
fn ingest_record<A: RegionAttributes>(
    position: usize,
    record: SourceRecord,
) -> FloraResult<Option<Region<A>>> {
    let rings = match record.geometry {
        RawGeometry::Polygon(rings) => rings,
        RawGeometry::Unreadable { reason } => {
            return Err(FloraError::MalformedGeometry {
                record: position,
                reason,
            })
        }
        other => {
            log::debug!("Skipping record {}: {} is not a polygon", position, other.kind());
            return Ok(None);
        }
    };

    let mut rings = rings.into_iter();
    let exterior = rings.next().ok_or_else(|| FloraError::MalformedGeometry {
        record: position,
        reason: "polygon has no rings".to_string(),
    })?;

    let boundary = convert_ring(position, "exterior ring", exterior)?;
    let holes = rings
        .enumerate()
        .map(|(i, ring)| convert_ring(position, &format!("interior ring {}", i), ring))
        .collect::<FloraResult<Vec<_>>>()?;

    let envelope = boundary
        .envelope()
        .ok_or_else(|| FloraError::MalformedGeometry {
            record: position,
            reason: "empty exterior ring".to_string(),
        })?;

    let attributes = A::from_attributes(position, &record.attributes)?;
    Ok(Some(Region::new(boundary, holes, envelope, attributes)))
}

fn convert_ring(position: usize, name: &str, raw: Vec<RawPosition>) -> FloraResult<Ring> {
    if raw.is_empty() {
        return Err(FloraError::MalformedGeometry {
            record: position,
            reason: format!("empty {}", name),
        });
    }

    let mut coords = Vec::with_capacity(raw.len());
    for (i, ordinates) in raw.iter().enumerate() {
        let (x, y) = match ordinates.as_slice() {
            [x, y, ..] => (*x, *y),
            _ => {
                return Err(FloraError::MalformedGeometry {
                    record: position,
                    reason: format!(
                        "{} position {} has {} ordinates, expected at least 2",
                        name,
                        i,
                        ordinates.len()
                    ),
                })
            }
        };
        let coord = Coordinate::new(x, y);
        if !coord.is_finite() {
            return Err(FloraError::MalformedGeometry {
                record: position,
                reason: format!("{} position {} is not finite: {}", name, i, coord),
            });
        }
        coords.push(coord);
    }
    Ok(Ring::new(coords))
}
