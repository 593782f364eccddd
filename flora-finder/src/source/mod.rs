//! Raw records supplied by a source geometry collaborator.
//!
//! A source yields [`SourceRecord`]s in the order it reads them; the index
//! treats that order as final. Geometry arrives loosely typed
//! ([`RawGeometry`], mirroring the GeoJSON geometry kinds) and attributes as
//! an ordered map of scalar values ([`AttributeMap`]). Interpretation and
//! validation happen in the index builder, not here.

pub mod geojson;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

pub use geojson::read_feature_collection;

/// A position as delivered by the source: `[x, y, ...]`.
///
/// Anything beyond the first two ordinates (elevation, measure) is ignored.
pub type RawPosition = Vec<f64>;

/// Geometry of a source record before interpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawGeometry {
    Point(RawPosition),
    MultiPoint(Vec<RawPosition>),
    LineString(Vec<RawPosition>),
    MultiLineString(Vec<Vec<RawPosition>>),
    /// Exterior ring followed by any interior rings.
    Polygon(Vec<Vec<RawPosition>>),
    MultiPolygon(Vec<Vec<Vec<RawPosition>>>),
    /// A geometry kind the index does not know about.
    Other { kind: String },
    /// The source could not decode the geometry at all.
    Unreadable { reason: String },
}

impl RawGeometry {
    /// Name of the geometry kind, as used in log messages.
    pub fn kind(&self) -> &str {
        match self {
            RawGeometry::Point(_) => "Point",
            RawGeometry::MultiPoint(_) => "MultiPoint",
            RawGeometry::LineString(_) => "LineString",
            RawGeometry::MultiLineString(_) => "MultiLineString",
            RawGeometry::Polygon(_) => "Polygon",
            RawGeometry::MultiPolygon(_) => "MultiPolygon",
            RawGeometry::Other { kind } => kind,
            RawGeometry::Unreadable { .. } => "Unreadable",
        }
    }
}

/// A scalar attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Null,
}

impl AttributeValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as a float, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(v) => Some(*v),
            AttributeValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::Integer(_) => "integer",
            AttributeValue::Float(_) => "float",
            AttributeValue::Text(_) => "text",
            AttributeValue::Null => "null",
        }
    }
}

impl Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Integer(v) => write!(f, "{}", v),
            AttributeValue::Float(v) => write!(f, "{}", v),
            AttributeValue::Text(v) => write!(f, "{}", v),
            AttributeValue::Null => write!(f, "null"),
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Integer(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Float(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Text(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::Text(v)
    }
}

/// Insertion-ordered map of attribute names to values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeMap {
    values: IndexMap<String, AttributeValue>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.values.get(key)
    }

    /// Inserts or replaces a value. Replacing keeps the original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<AttributeValue>> FromIterator<(K, V)> for AttributeMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = AttributeMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// One geometry plus its attributes, as produced by a source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    pub geometry: RawGeometry,
    pub attributes: AttributeMap,
}

impl SourceRecord {
    pub fn new(geometry: RawGeometry, attributes: AttributeMap) -> Self {
        Self {
            geometry,
            attributes,
        }
    }

    /// A polygon record with a single exterior ring given as `(x, y)` pairs.
    pub fn polygon(exterior: &[(f64, f64)], attributes: AttributeMap) -> Self {
        let ring = exterior.iter().map(|(x, y)| vec![*x, *y]).collect();
        Self::new(RawGeometry::Polygon(vec![ring]), attributes)
    }
}
