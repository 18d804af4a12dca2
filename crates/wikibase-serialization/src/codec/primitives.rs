//! Field access helpers for decoding wire values.
//!
//! Wraps a JSON object and provides typed field reads with error handling
//! that names the offending field.

use serde_json::Map;

use crate::error::{DeserializeError, SerializeError};
use crate::model::PropertyId;
use crate::registry::{WireShape, WireValue};

/// Reader over one wire object.
#[derive(Debug, Clone, Copy)]
pub struct ObjectReader<'a> {
    map: &'a Map<String, WireValue>,
    context: &'static str,
}

impl<'a> ObjectReader<'a> {
    /// Creates a reader; fails if `wire` is not an object.
    pub fn new(wire: &'a WireValue, context: &'static str) -> Result<Self, DeserializeError> {
        Ok(Self {
            map: as_object(wire, context)?,
            context,
        })
    }

    /// The underlying map.
    pub fn map(&self) -> &'a Map<String, WireValue> {
        self.map
    }

    /// Returns the field, treating `null` as absent.
    pub fn optional(&self, field: &'static str) -> Option<&'a WireValue> {
        self.map.get(field).filter(|v| !v.is_null())
    }

    /// Returns the field or fails with `MissingField`.
    pub fn required(&self, field: &'static str) -> Result<&'a WireValue, DeserializeError> {
        self.optional(field)
            .ok_or(DeserializeError::MissingField { field })
    }

    pub fn required_str(&self, field: &'static str) -> Result<&'a str, DeserializeError> {
        as_str(self.required(field)?, field)
    }

    pub fn optional_str(&self, field: &'static str) -> Result<Option<&'a str>, DeserializeError> {
        self.optional(field).map(|v| as_str(v, field)).transpose()
    }

    pub fn required_object(
        &self,
        field: &'static str,
    ) -> Result<&'a Map<String, WireValue>, DeserializeError> {
        as_object(self.required(field)?, field)
    }

    pub fn optional_object(
        &self,
        field: &'static str,
    ) -> Result<Option<&'a Map<String, WireValue>>, DeserializeError> {
        self.optional(field).map(|v| as_object(v, field)).transpose()
    }

    pub fn required_array(&self, field: &'static str) -> Result<&'a [WireValue], DeserializeError> {
        as_array(self.required(field)?, field)
    }

    pub fn optional_array(
        &self,
        field: &'static str,
    ) -> Result<Option<&'a [WireValue]>, DeserializeError> {
        self.optional(field).map(|v| as_array(v, field)).transpose()
    }

    pub fn required_u64(&self, field: &'static str) -> Result<u64, DeserializeError> {
        self.required(field)?
            .as_u64()
            .ok_or_else(|| DeserializeError::malformed(field, "expected a non-negative integer"))
    }

    pub fn required_i64(&self, field: &'static str) -> Result<i64, DeserializeError> {
        self.required(field)?
            .as_i64()
            .ok_or_else(|| DeserializeError::malformed(field, "expected an integer"))
    }

    pub fn required_f64(&self, field: &'static str) -> Result<f64, DeserializeError> {
        self.required(field)?
            .as_f64()
            .ok_or_else(|| DeserializeError::malformed(field, "expected a number"))
    }

    pub fn optional_f64(&self, field: &'static str) -> Result<Option<f64>, DeserializeError> {
        self.optional(field)
            .map(|v| {
                v.as_f64()
                    .ok_or_else(|| DeserializeError::malformed(field, "expected a number"))
            })
            .transpose()
    }

    /// The context name given at construction.
    pub fn context(&self) -> &'static str {
        self.context
    }
}

pub fn as_object<'a>(
    wire: &'a WireValue,
    field: &'static str,
) -> Result<&'a Map<String, WireValue>, DeserializeError> {
    wire.as_object()
        .ok_or_else(|| DeserializeError::malformed(field, format!("expected an object, found {}", kind_of(wire))))
}

pub fn as_array<'a>(wire: &'a WireValue, field: &'static str) -> Result<&'a [WireValue], DeserializeError> {
    wire.as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| DeserializeError::malformed(field, format!("expected an array, found {}", kind_of(wire))))
}

pub fn as_str<'a>(wire: &'a WireValue, field: &'static str) -> Result<&'a str, DeserializeError> {
    wire.as_str()
        .ok_or_else(|| DeserializeError::malformed(field, format!("expected a string, found {}", kind_of(wire))))
}

/// Unwraps the object a nested strategy produced, for splicing into an
/// enclosing object.
pub fn into_object(wire: WireValue, field: &'static str) -> Result<Map<String, WireValue>, SerializeError> {
    match wire {
        WireValue::Object(map) => Ok(map),
        other => Err(SerializeError::unencodable(
            field,
            format!("expected an object, found {}", kind_of(&other)),
        )),
    }
}

/// Short name of a wire value's JSON type, for error messages.
pub fn kind_of(wire: &WireValue) -> &'static str {
    match wire {
        WireValue::Null => "null",
        WireValue::Bool(_) => "boolean",
        WireValue::Number(_) => "number",
        WireValue::String(_) => "string",
        WireValue::Array(_) => "array",
        WireValue::Object(_) => "object",
    }
}

/// Parses a property id used as an object key or field value.
pub fn parse_property(s: &str, field: &'static str) -> Result<PropertyId, DeserializeError> {
    s.parse()
        .map_err(|e: crate::error::IdParseError| DeserializeError::malformed(field, e.to_string()))
}

/// Renders a property id as an object key of the given shape.
pub fn property_key(property: PropertyId, shape: WireShape) -> String {
    match shape {
        WireShape::Current => property.to_string(),
        WireShape::Legacy => property.to_legacy_key(),
    }
}
