//! Data value encoding/decoding.
//!
//! A data value travels as `{"value": ..., "type": tag}`. The payload under
//! `value` depends on the kind; the kind itself is supplied by the caller
//! (from the property's declared type), not read from the tag.

use serde_json::{json, Map};

use crate::codec::primitives::{as_str, kind_of, ObjectReader};
use crate::error::{DeserializeError, SerializeError};
use crate::model::{
    DataValue, DataValueKind, EntityId, GlobeCoordinateValue, QuantityValue, TimeValue,
};
use crate::registry::WireValue;
use crate::util::{is_signed_decimal, parse_timestamp, MAX_TIME_PRECISION};

// =============================================================================
// DECODING
// =============================================================================

/// Decodes a `datavalue` object as a value of `kind`.
///
/// A `type` tag, when present, must name `kind`.
pub fn decode_data_value(wire: &WireValue, kind: DataValueKind) -> Result<DataValue, DeserializeError> {
    let reader = ObjectReader::new(wire, "datavalue")?;
    if let Some(tag) = reader.optional_str("type")? {
        if tag != kind.wire_tag() {
            return Err(DeserializeError::malformed(
                "datavalue",
                format!("type {tag:?} does not match expected {:?}", kind.wire_tag()),
            ));
        }
    }
    let value = reader.required("value")?;

    match kind {
        DataValueKind::String => Ok(DataValue::String(as_str(value, "value")?.to_string())),
        DataValueKind::EntityId => decode_entity_id(value).map(DataValue::EntityId),
        DataValueKind::Time => decode_time(value).map(DataValue::Time),
        DataValueKind::Quantity => decode_quantity(value).map(DataValue::Quantity),
        DataValueKind::GlobeCoordinate => decode_globe_coordinate(value).map(DataValue::GlobeCoordinate),
        DataValueKind::MonolingualText => decode_monolingual_text(value),
    }
}

fn decode_entity_id(value: &WireValue) -> Result<EntityId, DeserializeError> {
    let reader = ObjectReader::new(value, "value")?;

    let from_parts = match reader.optional_str("entity-type")? {
        Some(entity_type) => {
            let numeric = reader.required_u64("numeric-id")?;
            let id = EntityId::from_parts(entity_type, numeric).ok_or_else(|| {
                DeserializeError::malformed(
                    "numeric-id",
                    format!("no {entity_type} entity with numeric id {numeric}"),
                )
            })?;
            Some(id)
        }
        None => None,
    };
    let from_id = reader
        .optional_str("id")?
        .map(|s| {
            s.parse::<EntityId>()
                .map_err(|e| DeserializeError::malformed("id", e.to_string()))
        })
        .transpose()?;

    match (from_parts, from_id) {
        (Some(a), Some(b)) if a != b => Err(DeserializeError::malformed(
            "id",
            format!("{b} does not match entity-type/numeric-id {a}"),
        )),
        (Some(id), _) | (None, Some(id)) => Ok(id),
        (None, None) => Err(DeserializeError::MissingField { field: "id" }),
    }
}

fn decode_time(value: &WireValue) -> Result<TimeValue, DeserializeError> {
    let reader = ObjectReader::new(value, "value")?;

    let time = reader.required_str("time")?;
    parse_timestamp(time).map_err(|e| DeserializeError::malformed("time", e.to_string()))?;

    let timezone = i32::try_from(reader.required_i64("timezone")?)
        .map_err(|_| DeserializeError::malformed("timezone", "out of range"))?;
    let before = u32::try_from(reader.required_u64("before")?)
        .map_err(|_| DeserializeError::malformed("before", "out of range"))?;
    let after = u32::try_from(reader.required_u64("after")?)
        .map_err(|_| DeserializeError::malformed("after", "out of range"))?;
    let precision = reader.required_u64("precision")?;
    if precision > u64::from(MAX_TIME_PRECISION) {
        return Err(DeserializeError::malformed(
            "precision",
            format!("{precision} exceeds {MAX_TIME_PRECISION}"),
        ));
    }

    Ok(TimeValue {
        time: time.to_string(),
        timezone,
        before,
        after,
        precision: precision as u8,
        calendar_model: reader.required_str("calendarmodel")?.to_string(),
    })
}

fn decimal(reader: &ObjectReader<'_>, field: &'static str, required: bool) -> Result<Option<String>, DeserializeError> {
    let raw = if required {
        Some(reader.required_str(field)?)
    } else {
        reader.optional_str(field)?
    };
    match raw {
        Some(s) if !is_signed_decimal(s) => Err(DeserializeError::malformed(
            field,
            format!("{s:?} is not a signed decimal"),
        )),
        Some(s) => Ok(Some(s.to_string())),
        None => Ok(None),
    }
}

fn decode_quantity(value: &WireValue) -> Result<QuantityValue, DeserializeError> {
    let reader = ObjectReader::new(value, "value")?;
    let amount = decimal(&reader, "amount", true)?
        .ok_or(DeserializeError::MissingField { field: "amount" })?;
    Ok(QuantityValue {
        amount,
        unit: reader.required_str("unit")?.to_string(),
        upper_bound: decimal(&reader, "upperBound", false)?,
        lower_bound: decimal(&reader, "lowerBound", false)?,
    })
}

fn decode_globe_coordinate(value: &WireValue) -> Result<GlobeCoordinateValue, DeserializeError> {
    let reader = ObjectReader::new(value, "value")?;

    let latitude = reader.required_f64("latitude")?;
    let longitude = reader.required_f64("longitude")?;
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(DeserializeError::malformed(
            "latitude",
            format!("{latitude} out of range [-90, 90]"),
        ));
    }
    if !(-360.0..=360.0).contains(&longitude) {
        return Err(DeserializeError::malformed(
            "longitude",
            format!("{longitude} out of range [-360, 360]"),
        ));
    }

    Ok(GlobeCoordinateValue {
        latitude,
        longitude,
        precision: reader.optional_f64("precision")?,
        globe: reader.required_str("globe")?.to_string(),
    })
}

fn decode_monolingual_text(value: &WireValue) -> Result<DataValue, DeserializeError> {
    let reader = ObjectReader::new(value, "value")?;
    Ok(DataValue::MonolingualText {
        language: reader.required_str("language")?.to_string(),
        text: reader.required_str("text")?.to_string(),
    })
}

/// Reads the `type` tag of a `datavalue` object, if any.
pub fn data_value_tag(wire: &WireValue) -> Result<Option<DataValueKind>, DeserializeError> {
    let Some(tag) = wire.get("type") else {
        return Ok(None);
    };
    let tag = tag.as_str().ok_or_else(|| {
        DeserializeError::malformed("datavalue", format!("type tag is a {}", kind_of(tag)))
    })?;
    DataValueKind::from_wire_tag(tag)
        .map(Some)
        .ok_or_else(|| DeserializeError::malformed("datavalue", format!("unknown value type {tag:?}")))
}

// =============================================================================
// ENCODING
// =============================================================================

fn finite(value: f64, field: &'static str) -> Result<f64, SerializeError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SerializeError::unencodable(field, format!("{value} is not a finite number")))
    }
}

/// Encodes a data value as a `datavalue` object.
///
/// Fails for values the decoder would reject, such as malformed timestamps
/// or non-finite coordinates.
pub fn encode_data_value(value: &DataValue) -> Result<WireValue, SerializeError> {
    let payload = match value {
        DataValue::String(s) => WireValue::String(s.clone()),
        DataValue::EntityId(id) => json!({
            "entity-type": id.entity_type(),
            "numeric-id": id.numeric(),
            "id": id.to_string(),
        }),
        DataValue::Time(t) => {
            parse_timestamp(&t.time).map_err(|e| SerializeError::unencodable("time", e.to_string()))?;
            if t.precision > MAX_TIME_PRECISION {
                return Err(SerializeError::unencodable(
                    "precision",
                    format!("{} exceeds {MAX_TIME_PRECISION}", t.precision),
                ));
            }
            json!({
                "time": t.time,
                "timezone": t.timezone,
                "before": t.before,
                "after": t.after,
                "precision": t.precision,
                "calendarmodel": t.calendar_model,
            })
        }
        DataValue::Quantity(q) => {
            let mut m = Map::new();
            m.insert("amount".into(), json!(q.amount));
            m.insert("unit".into(), json!(q.unit));
            if let Some(upper) = &q.upper_bound {
                m.insert("upperBound".into(), json!(upper));
            }
            if let Some(lower) = &q.lower_bound {
                m.insert("lowerBound".into(), json!(lower));
            }
            WireValue::Object(m)
        }
        DataValue::GlobeCoordinate(g) => {
            let mut m = Map::new();
            m.insert("latitude".into(), json!(finite(g.latitude, "latitude")?));
            m.insert("longitude".into(), json!(finite(g.longitude, "longitude")?));
            m.insert("altitude".into(), WireValue::Null);
            if let Some(precision) = g.precision {
                m.insert("precision".into(), json!(finite(precision, "precision")?));
            }
            m.insert("globe".into(), json!(g.globe));
            WireValue::Object(m)
        }
        DataValue::MonolingualText { language, text } => json!({
            "text": text,
            "language": language,
        }),
    };

    Ok(json!({
        "value": payload,
        "type": value.kind().wire_tag(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemId, PropertyId};

    fn roundtrip(value: DataValue) {
        let wire = encode_data_value(&value).unwrap();
        let decoded = decode_data_value(&wire, value.kind()).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_each_kind_roundtrips() {
        roundtrip(DataValue::String("Douglas Adams".into()));
        roundtrip(DataValue::EntityId(ItemId::new(5).unwrap().into()));
        roundtrip(DataValue::EntityId(PropertyId::new(31).unwrap().into()));
        roundtrip(DataValue::Time(TimeValue {
            time: "+1952-03-11T00:00:00Z".into(),
            timezone: 60,
            before: 0,
            after: 1,
            precision: 11,
            calendar_model: "http://www.wikidata.org/entity/Q1985727".into(),
        }));
        roundtrip(DataValue::Quantity(QuantityValue {
            amount: "+1.5".into(),
            unit: "1".into(),
            upper_bound: Some("+2".into()),
            lower_bound: None,
        }));
        roundtrip(DataValue::GlobeCoordinate(GlobeCoordinateValue {
            latitude: 52.5,
            longitude: -1.25,
            precision: Some(0.01),
            globe: "http://www.wikidata.org/entity/Q2".into(),
        }));
        roundtrip(DataValue::MonolingualText {
            language: "en".into(),
            text: "hello".into(),
        });
    }

    #[test]
    fn test_entity_id_wire_form() {
        let wire = encode_data_value(&DataValue::EntityId(ItemId::new(2).unwrap().into())).unwrap();
        assert_eq!(
            wire,
            json!({
                "value": {"entity-type": "item", "numeric-id": 2, "id": "Q2"},
                "type": "wikibase-entityid"
            })
        );
    }

    #[test]
    fn test_entity_id_legacy_forms() {
        let q2 = DataValue::EntityId(ItemId::new(2).unwrap().into());
        let parts_only = json!({"value": {"entity-type": "item", "numeric-id": 2}});
        assert_eq!(decode_data_value(&parts_only, DataValueKind::EntityId).unwrap(), q2);
        let id_only = json!({"value": {"id": "Q2"}, "type": "wikibase-entityid"});
        assert_eq!(decode_data_value(&id_only, DataValueKind::EntityId).unwrap(), q2);

        let inconsistent = json!({"value": {"entity-type": "item", "numeric-id": 2, "id": "Q3"}});
        assert!(decode_data_value(&inconsistent, DataValueKind::EntityId).is_err());
    }

    #[test]
    fn test_tag_must_match_kind() {
        let wire = json!({"value": "x", "type": "string"});
        let err = decode_data_value(&wire, DataValueKind::EntityId).unwrap_err();
        assert!(matches!(err, DeserializeError::MalformedWireValue { field: "datavalue", .. }));
    }

    #[test]
    fn test_rejects_bad_payloads() {
        let bad_time = json!({"value": {
            "time": "2013-01-01", "timezone": 0, "before": 0, "after": 0,
            "precision": 11, "calendarmodel": "x"
        }});
        assert!(matches!(
            decode_data_value(&bad_time, DataValueKind::Time),
            Err(DeserializeError::MalformedWireValue { field: "time", .. })
        ));

        let bad_precision = json!({"value": {
            "time": "+2013-01-01T00:00:00Z", "timezone": 0, "before": 0, "after": 0,
            "precision": 15, "calendarmodel": "x"
        }});
        assert!(matches!(
            decode_data_value(&bad_precision, DataValueKind::Time),
            Err(DeserializeError::MalformedWireValue { field: "precision", .. })
        ));

        let bad_amount = json!({"value": {"amount": "12", "unit": "1"}});
        assert!(matches!(
            decode_data_value(&bad_amount, DataValueKind::Quantity),
            Err(DeserializeError::MalformedWireValue { field: "amount", .. })
        ));

        let bad_latitude = json!({"value": {"latitude": 91.0, "longitude": 0.0, "globe": "g"}});
        assert!(matches!(
            decode_data_value(&bad_latitude, DataValueKind::GlobeCoordinate),
            Err(DeserializeError::MalformedWireValue { field: "latitude", .. })
        ));

        let missing_value = json!({"type": "string"});
        assert_eq!(
            decode_data_value(&missing_value, DataValueKind::String),
            Err(DeserializeError::MissingField { field: "value" })
        );
    }

    #[test]
    fn test_encoder_rejects_undecodable_values() {
        for (latitude, longitude, field) in [
            (f64::NAN, 0.0, "latitude"),
            (0.0, f64::INFINITY, "longitude"),
            (10.0, f64::NEG_INFINITY, "longitude"),
        ] {
            let value = DataValue::GlobeCoordinate(GlobeCoordinateValue {
                latitude,
                longitude,
                precision: None,
                globe: "http://www.wikidata.org/entity/Q2".into(),
            });
            let err = encode_data_value(&value).unwrap_err();
            assert!(
                matches!(err, SerializeError::UnencodableValue { field: f, .. } if f == field),
                "{err}"
            );
        }

        let bad_time = DataValue::Time(TimeValue {
            time: "2013-01-01".into(),
            timezone: 0,
            before: 0,
            after: 0,
            precision: 11,
            calendar_model: "x".into(),
        });
        assert!(matches!(
            encode_data_value(&bad_time),
            Err(SerializeError::UnencodableValue { field: "time", .. })
        ));
    }

    #[test]
    fn test_data_value_tag() {
        assert_eq!(
            data_value_tag(&json!({"type": "time"})).unwrap(),
            Some(DataValueKind::Time)
        );
        assert_eq!(data_value_tag(&json!({"value": "x"})).unwrap(), None);
        assert!(data_value_tag(&json!({"type": "bogus"})).is_err());
    }
}
