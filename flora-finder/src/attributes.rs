//! Typed region attributes.
//!
//! The index is generic over its attribute type. Any type implementing
//! [`RegionAttributes`] can be built from the loosely typed [`AttributeMap`]
//! a source delivers; the conversion runs once per record during ingestion,
//! so a badly typed field fails the build instead of surfacing later.

use serde::{Deserialize, Serialize};

use crate::errors::{FloraError, FloraResult};
use crate::source::{AttributeMap, AttributeValue};

/// Conversion from raw source attributes into a typed record.
pub trait RegionAttributes: Sized {
    /// Builds the typed record. `record` is the source position, used only
    /// for error reporting.
    fn from_attributes(record: usize, attributes: &AttributeMap) -> FloraResult<Self>;
}

/// Untyped passthrough: keep the source map as is.
impl RegionAttributes for AttributeMap {
    fn from_attributes(_record: usize, attributes: &AttributeMap) -> FloraResult<Self> {
        Ok(attributes.clone())
    }
}

/// Attributes of one polygon of the "Modelled 1750 Ecological Vegetation
/// Classes" layer.
///
/// Field names in the source are upper case (`EVC`, `X_EVCNAME`, ...); see
/// [`EvcProperties::FIELDS`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvcProperties {
    pub evc_study: i64,
    /// EVC number.
    pub evc: i64,
    pub evcfc_unit: String,
    pub scale: i64,
    pub evc_src: i64,
    pub evcfc: String,
    pub evcfc_dash: String,
    pub hectares: f64,
    /// EVC group number.
    pub evc_gp: i64,
    pub evc_subgp: f64,
    /// EVC name.
    pub x_evcname: String,
    pub areasqm: f64,
    /// EVC group name.
    pub xgroupname: String,
    pub x_evcstudy: String,
    pub x_evcsrc: String,
    pub xsubggroup: String,
}

impl EvcProperties {
    /// Source field names, in layer order.
    pub const FIELDS: [&'static str; 16] = [
        "EVC_STUDY",
        "EVC",
        "EVCFC_UNIT",
        "SCALE",
        "EVC_SRC",
        "EVCFC",
        "EVCFC_DASH",
        "HECTARES",
        "EVC_GP",
        "EVC_SUBGP",
        "X_EVCNAME",
        "AREASQM",
        "XGROUPNAME",
        "X_EVCSTUDY",
        "X_EVCSRC",
        "XSUBGGROUP",
    ];

    /// Converts back to a source-style attribute map.
    pub fn to_attribute_map(&self) -> AttributeMap {
        AttributeMap::new()
            .with("EVC_STUDY", self.evc_study)
            .with("EVC", self.evc)
            .with("EVCFC_UNIT", self.evcfc_unit.as_str())
            .with("SCALE", self.scale)
            .with("EVC_SRC", self.evc_src)
            .with("EVCFC", self.evcfc.as_str())
            .with("EVCFC_DASH", self.evcfc_dash.as_str())
            .with("HECTARES", self.hectares)
            .with("EVC_GP", self.evc_gp)
            .with("EVC_SUBGP", self.evc_subgp)
            .with("X_EVCNAME", self.x_evcname.as_str())
            .with("AREASQM", self.areasqm)
            .with("XGROUPNAME", self.xgroupname.as_str())
            .with("X_EVCSTUDY", self.x_evcstudy.as_str())
            .with("X_EVCSRC", self.x_evcsrc.as_str())
            .with("XSUBGGROUP", self.xsubggroup.as_str())
    }
}

impl RegionAttributes for EvcProperties {
    fn from_attributes(record: usize, attributes: &AttributeMap) -> FloraResult<Self> {
        let fields = FieldReader {
            record,
            attributes,
        };
        Ok(EvcProperties {
            evc_study: fields.integer("EVC_STUDY")?,
            evc: fields.integer("EVC")?,
            evcfc_unit: fields.text("EVCFC_UNIT")?,
            scale: fields.integer("SCALE")?,
            evc_src: fields.integer("EVC_SRC")?,
            evcfc: fields.text("EVCFC")?,
            evcfc_dash: fields.text("EVCFC_DASH")?,
            hectares: fields.float("HECTARES")?,
            evc_gp: fields.integer("EVC_GP")?,
            evc_subgp: fields.float("EVC_SUBGP")?,
            x_evcname: fields.text("X_EVCNAME")?,
            areasqm: fields.float("AREASQM")?,
            xgroupname: fields.text("XGROUPNAME")?,
            x_evcstudy: fields.text("X_EVCSTUDY")?,
            x_evcsrc: fields.text("X_EVCSRC")?,
            xsubggroup: fields.text("XSUBGGROUP")?,
        })
    }
}

struct FieldReader<'a> {
    record: usize,
    attributes: &'a AttributeMap,
}

impl FieldReader<'_> {
    fn value(&self, field: &str) -> FloraResult<&AttributeValue> {
        self.attributes
            .get(field)
            .ok_or_else(|| self.error(field, "field is missing".to_string()))
    }

    fn integer(&self, field: &str) -> FloraResult<i64> {
        let value = self.value(field)?;
        value
            .as_i64()
            .ok_or_else(|| self.mismatch(field, "integer", value))
    }

    fn float(&self, field: &str) -> FloraResult<f64> {
        let value = self.value(field)?;
        value.as_f64().ok_or_else(|| self.mismatch(field, "float", value))
    }

    fn text(&self, field: &str) -> FloraResult<String> {
        let value = self.value(field)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.mismatch(field, "text", value))
    }

    fn mismatch(&self, field: &str, expected: &str, found: &AttributeValue) -> FloraError {
        self.error(
            field,
            format!("expected {}, found {} ({})", expected, found.type_name(), found),
        )
    }

    fn error(&self, field: &str, reason: String) -> FloraError {
        FloraError::InvalidAttributes {
            record: self.record,
            field: field.to_string(),
            reason,
        }
    }
}
