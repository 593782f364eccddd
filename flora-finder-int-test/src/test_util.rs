use flora_finder::{
    AttributeMap, EvcProperties, FloraResult, GeoPoint, LookupConfig, RegionLookupService,
    SourceRecord,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tempfile::TempDir;

/// Runs a test between a setup and a teardown step.
///
/// The teardown runs even when the test body returns an error, and any
/// failure is reported with the step that produced it.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> FloraResult<()>,
    B: Fn() -> FloraResult<TestContext>,
    A: Fn(TestContext) -> FloraResult<()>,
{
    let start = Instant::now();
    let ctx = match before() {
        Ok(ctx) => ctx,
        Err(e) => panic!("Before run failed: {:?}", e),
    };

    let test_result = test(ctx.clone());
    let after_result = after(ctx);

    if let Err(e) = test_result {
        panic!("Test failed after {:?}: {:?}", start.elapsed(), e);
    }
    if let Err(e) = after_result {
        panic!("After run failed: {:?}", e);
    }
}

/// A scratch directory plus a service built over a square grid layer.
#[derive(Clone)]
pub struct TestContext {
    dir: Arc<TempDir>,
    side: usize,
    service: RegionLookupService<AttributeMap>,
}

impl TestContext {
    pub fn new(dir: TempDir, side: usize, service: RegionLookupService<AttributeMap>) -> Self {
        Self {
            dir: Arc::new(dir),
            side,
            service,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn snapshot_path(&self, name: &str) -> PathBuf {
        self.dir.path().join(format!("{}.snap", name))
    }

    /// Number of cells along each axis of the grid layer.
    pub fn side(&self) -> usize {
        self.side
    }

    pub fn service(&self) -> RegionLookupService<AttributeMap> {
        self.service.clone()
    }
}

/// Grid of `side * side` one-degree cells anchored at (144, -39).
pub fn create_grid_context(side: usize) -> FloraResult<TestContext> {
    let dir = tempfile::tempdir()?;
    let service = RegionLookupService::from_records(grid_records(side), &LookupConfig::new())?;
    Ok(TestContext::new(dir, side, service))
}

pub fn create_test_context() -> FloraResult<TestContext> {
    create_grid_context(20)
}

pub fn cleanup(ctx: TestContext) -> FloraResult<()> {
    // the directory itself goes away with the last clone of the context
    for entry in std::fs::read_dir(ctx.path())? {
        std::fs::remove_file(entry?.path())?;
    }
    Ok(())
}

pub const GRID_ORIGIN: (f64, f64) = (144.0, -39.0);

pub fn cell_name(row: usize, col: usize) -> String {
    format!("cell-{}-{}", row, col)
}

/// Closed exterior ring of a square, counter-clockwise from the lower left.
pub fn square_ring(x: f64, y: f64, size: f64) -> Vec<(f64, f64)> {
    vec![
        (x, y),
        (x + size, y),
        (x + size, y + size),
        (x, y + size),
        (x, y),
    ]
}

pub fn square_record(x: f64, y: f64, size: f64, name: &str) -> SourceRecord {
    SourceRecord::polygon(
        &square_ring(x, y, size),
        AttributeMap::new().with("NAME", name),
    )
}

pub fn grid_records(side: usize) -> Vec<SourceRecord> {
    let (x0, y0) = GRID_ORIGIN;
    let mut records = Vec::with_capacity(side * side);
    for row in 0..side {
        for col in 0..side {
            records.push(square_record(
                x0 + col as f64,
                y0 + row as f64,
                1.0,
                &cell_name(row, col),
            ));
        }
    }
    records
}

/// Centre of a grid cell as a latitude/longitude point.
pub fn cell_center(row: usize, col: usize) -> GeoPoint {
    let (x0, y0) = GRID_ORIGIN;
    GeoPoint::new(y0 + row as f64 + 0.5, x0 + col as f64 + 0.5)
}

/// Deterministic random points spread over the grid and a margin around it.
pub fn random_points(seed: u64, count: usize, side: usize) -> Vec<GeoPoint> {
    let (x0, y0) = GRID_ORIGIN;
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let lat = rng.gen_range(y0 - 1.0..y0 + side as f64 + 1.0);
            let lon = rng.gen_range(x0 - 1.0..x0 + side as f64 + 1.0);
            GeoPoint::new(lat, lon)
        })
        .collect()
}

pub fn region_name(service: &RegionLookupService<AttributeMap>, point: &GeoPoint) -> Option<String> {
    service
        .find_region_at(point)
        .and_then(|r| r.attributes().get("NAME"))
        .map(|v| v.to_string())
}

pub fn evc_properties(evc: i64, name: &str, group: &str) -> EvcProperties {
    EvcProperties {
        evc_study: 1,
        evc,
        evcfc_unit: format!("{}_0", evc),
        scale: 25000,
        evc_src: 2,
        evcfc: evc.to_string(),
        evcfc_dash: evc.to_string(),
        hectares: 100.0,
        evc_gp: 18,
        evc_subgp: 1.0,
        x_evcname: name.to_string(),
        areasqm: 1_000_000.0,
        xgroupname: group.to_string(),
        x_evcstudy: "Statewide".to_string(),
        x_evcsrc: "Modelled".to_string(),
        xsubggroup: group.to_string(),
    }
}

/// A GeoJSON feature with a polygon geometry.
pub fn polygon_feature(rings: &[Vec<(f64, f64)>], properties: Value) -> Value {
    let coordinates: Vec<Vec<[f64; 2]>> = rings
        .iter()
        .map(|ring| ring.iter().map(|(x, y)| [*x, *y]).collect())
        .collect();
    json!({
        "type": "Feature",
        "properties": properties,
        "geometry": {"type": "Polygon", "coordinates": coordinates}
    })
}

pub fn feature_collection(features: Vec<Value>) -> String {
    json!({"type": "FeatureCollection", "features": features}).to_string()
}
