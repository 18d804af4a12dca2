//! Snak and snak list codecs.
//!
//! Snak wire form:
//!
//! ```text
//! {"snaktype": "value" | "somevalue" | "novalue",
//!  "property": "P31",
//!  "datavalue": {"value": ..., "type": ...}}   // value snaks only
//! ```

use std::sync::Arc;

use serde_json::Map;

use crate::codec::primitives::{as_array, parse_property, ObjectReader};
use crate::codec::value::{decode_data_value, encode_data_value};
use crate::error::{DeserializeError, RegistryError, SerializeError};
use crate::lookup::DataValueKindLookup;
use crate::model::{Snak, SnakList};
use crate::registry::{
    Deserialization, Deserializer, Discriminator, Serialization, Serializer, StrategyRegistry,
    WireValue,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct SnakSerializer;

impl Serializer<Snak> for SnakSerializer {
    fn serialize(&self, snak: &Snak) -> Result<WireValue, SerializeError> {
        let mut out = Map::new();
        out.insert("snaktype".into(), snak.snak_type().into());
        out.insert("property".into(), snak.property().to_string().into());
        if let Snak::Value { value, .. } = snak {
            out.insert("datavalue".into(), encode_data_value(value)?);
        }
        Ok(WireValue::Object(out))
    }
}

/// Decodes snaks; value payloads are typed through the property lookup.
pub struct SnakDeserializer {
    lookup: Arc<dyn DataValueKindLookup>,
}

impl SnakDeserializer {
    pub fn new(lookup: Arc<dyn DataValueKindLookup>) -> Self {
        Self { lookup }
    }
}

impl Deserializer<Snak> for SnakDeserializer {
    fn deserialize(&self, wire: &WireValue) -> Result<Snak, DeserializeError> {
        let reader = ObjectReader::new(wire, "snak")?;

        let snak_type = reader.required_str("snaktype")?;
        if !matches!(snak_type, "value" | "somevalue" | "novalue") {
            return Err(DeserializeError::UnknownSnakType {
                snaktype: snak_type.to_string(),
            });
        }
        let property = parse_property(reader.required_str("property")?, "property")?;

        match snak_type {
            "novalue" => Ok(Snak::no_value(property)),
            "somevalue" => Ok(Snak::some_value(property)),
            _ => {
                let datavalue = reader.required("datavalue")?;
                let kind = self.lookup.data_value_kind(property)?;
                Ok(Snak::value(property, decode_data_value(datavalue, kind)?))
            }
        }
    }
}

pub struct SnakListSerializer {
    snak: Arc<dyn Serializer<Snak>>,
}

impl SnakListSerializer {
    pub fn from_registry(registry: &StrategyRegistry<Serialization>) -> Result<Self, RegistryError> {
        Ok(Self {
            snak: registry.serializer(&Discriminator::Snak)?,
        })
    }
}

impl Serializer<SnakList> for SnakListSerializer {
    fn serialize(&self, snaks: &SnakList) -> Result<WireValue, SerializeError> {
        let out = snaks
            .iter()
            .map(|s| self.snak.serialize(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(WireValue::Array(out))
    }
}

pub struct SnakListDeserializer {
    snak: Arc<dyn Deserializer<Snak>>,
}

impl SnakListDeserializer {
    pub fn from_registry(registry: &StrategyRegistry<Deserialization>) -> Result<Self, RegistryError> {
        Ok(Self {
            snak: registry.deserializer(&Discriminator::Snak)?,
        })
    }
}

impl Deserializer<SnakList> for SnakListDeserializer {
    fn deserialize(&self, wire: &WireValue) -> Result<SnakList, DeserializeError> {
        as_array(wire, "snaks")?
            .iter()
            .map(|s| self.snak.deserialize(s))
            .collect()
    }
}
