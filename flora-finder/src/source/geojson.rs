//! GeoJSON `FeatureCollection` source.
//!
//! Exported vegetation layers are commonly shipped as GeoJSON alongside the
//! shapefile. Each feature becomes one [`SourceRecord`]; features are kept in
//! document order.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::{AttributeMap, AttributeValue, RawGeometry, SourceRecord};
use crate::errors::{FloraError, FloraResult};

/// Reads every feature of a GeoJSON `FeatureCollection`.
///
/// Geometry whose coordinates cannot be decoded is returned as
/// [`RawGeometry::Unreadable`] so that the index builder can apply its
/// malformed-record policy. Only a document that is not a feature collection
/// at all is an error here.
///
/// ```rust
/// use flora_finder::source::{read_feature_collection, RawGeometry};
///
/// let json = r#"{
///   "type": "FeatureCollection",
///   "features": [{
///     "type": "Feature",
///     "properties": {"EVC": 55},
///     "geometry": {"type": "Polygon", "coordinates": [[[0,0],[0,1],[1,1],[0,0]]]}
///   }]
/// }"#;
/// let records = read_feature_collection(json).unwrap();
/// assert!(matches!(records[0].geometry, RawGeometry::Polygon(_)));
/// ```
pub fn read_feature_collection(json: &str) -> FloraResult<Vec<SourceRecord>> {
    let document: Value =
        serde_json::from_str(json).map_err(|e| FloraError::Source(e.to_string()))?;

    match document.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {}
        Some(other) => {
            return Err(FloraError::Source(format!(
                "Expected a FeatureCollection, found '{}'",
                other
            )))
        }
        None => {
            return Err(FloraError::Source(
                "Document has no 'type' member".to_string(),
            ))
        }
    }

    let features = document
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| FloraError::Source("FeatureCollection has no 'features' array".to_string()))?;

    let mut records = Vec::with_capacity(features.len());
    for (position, feature) in features.iter().enumerate() {
        let Some(feature) = feature.as_object() else {
            return Err(FloraError::Source(format!(
                "Feature {} is not an object",
                position
            )));
        };
        let geometry = read_geometry(feature.get("geometry"));
        let attributes = read_properties(feature.get("properties"));
        records.push(SourceRecord::new(geometry, attributes));
    }

    log::debug!("Read {} features from GeoJSON source", records.len());
    Ok(records)
}

fn read_geometry(value: Option<&Value>) -> RawGeometry {
    let Some(geometry) = value.and_then(Value::as_object) else {
        return RawGeometry::Unreadable {
            reason: "feature has no geometry".to_string(),
        };
    };

    let Some(kind) = geometry.get("type").and_then(Value::as_str) else {
        return RawGeometry::Unreadable {
            reason: "geometry has no 'type' member".to_string(),
        };
    };

    let result = match kind {
        "Point" => coordinates(geometry).map(RawGeometry::Point),
        "MultiPoint" => coordinates(geometry).map(RawGeometry::MultiPoint),
        "LineString" => coordinates(geometry).map(RawGeometry::LineString),
        "MultiLineString" => coordinates(geometry).map(RawGeometry::MultiLineString),
        "Polygon" => coordinates(geometry).map(RawGeometry::Polygon),
        "MultiPolygon" => coordinates(geometry).map(RawGeometry::MultiPolygon),
        other => Ok(RawGeometry::Other {
            kind: other.to_string(),
        }),
    };

    result.unwrap_or_else(|reason| RawGeometry::Unreadable { reason })
}

fn coordinates<T: DeserializeOwned>(geometry: &Map<String, Value>) -> Result<T, String> {
    let value = geometry
        .get("coordinates")
        .ok_or_else(|| "geometry has no 'coordinates' member".to_string())?;
    T::deserialize(value).map_err(|e| format!("invalid coordinates: {}", e))
}

fn read_properties(value: Option<&Value>) -> AttributeMap {
    let mut attributes = AttributeMap::new();
    if let Some(properties) = value.and_then(Value::as_object) {
        for (key, value) in properties {
            attributes.insert(key.as_str(), to_attribute_value(value));
        }
    }
    attributes
}

fn to_attribute_value(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null,
        Value::Bool(b) => AttributeValue::Integer(i64::from(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                AttributeValue::Integer(i)
            } else {
                // u64 beyond i64 range and all non-integers
                AttributeValue::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => AttributeValue::Text(s.clone()),
        other => AttributeValue::Text(other.to_string()),
    }
}
