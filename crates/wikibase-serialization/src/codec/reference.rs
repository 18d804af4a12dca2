//! Reference and reference list codecs.
//!
//! A reference travels as `{"hash": "<40 hex>", "snaks": [snak, ...]}`. The
//! hash is always recomputed from the decoded snaks; a hash found on the wire
//! is only compared against it.

use std::sync::Arc;

use serde_json::Map;

use crate::codec::primitives::{as_array, ObjectReader};
use crate::error::{DeserializeError, RegistryError, SerializeError};
use crate::model::{Reference, ReferenceList, SnakList};
use crate::registry::{
    Deserialization, Deserializer, Discriminator, Serialization, Serializer, StrategyRegistry,
    WireValue,
};

pub struct ReferenceSerializer {
    snaks: Arc<dyn Serializer<SnakList>>,
}

impl ReferenceSerializer {
    pub fn from_registry(registry: &StrategyRegistry<Serialization>) -> Result<Self, RegistryError> {
        Ok(Self {
            snaks: registry.serializer(&Discriminator::SnakList)?,
        })
    }
}

impl Serializer<Reference> for ReferenceSerializer {
    fn serialize(&self, reference: &Reference) -> Result<WireValue, SerializeError> {
        let mut out = Map::new();
        out.insert("hash".into(), reference.hash().into());
        out.insert("snaks".into(), self.snaks.serialize(reference.snaks())?);
        Ok(WireValue::Object(out))
    }
}

pub struct ReferenceDeserializer {
    snaks: Arc<dyn Deserializer<SnakList>>,
    verify_hash: bool,
}

impl ReferenceDeserializer {
    /// With `verify_hash` unset, a wire hash is ignored rather than checked.
    pub fn from_registry(
        registry: &StrategyRegistry<Deserialization>,
        verify_hash: bool,
    ) -> Result<Self, RegistryError> {
        Ok(Self {
            snaks: registry.deserializer(&Discriminator::SnakList)?,
            verify_hash,
        })
    }
}

impl Deserializer<Reference> for ReferenceDeserializer {
    fn deserialize(&self, wire: &WireValue) -> Result<Reference, DeserializeError> {
        let reader = ObjectReader::new(wire, "reference")?;
        let reference = Reference::new(self.snaks.deserialize(reader.required("snaks")?)?);

        if self.verify_hash {
            if let Some(found) = reader.optional_str("hash")? {
                let expected = reference.hash();
                if found != expected {
                    return Err(DeserializeError::ReferenceHashMismatch {
                        expected,
                        found: found.to_string(),
                    });
                }
            }
        }
        Ok(reference)
    }
}

pub struct ReferenceListSerializer {
    reference: Arc<dyn Serializer<Reference>>,
}

impl ReferenceListSerializer {
    pub fn from_registry(registry: &StrategyRegistry<Serialization>) -> Result<Self, RegistryError> {
        Ok(Self {
            reference: registry.serializer(&Discriminator::Reference)?,
        })
    }
}

impl Serializer<ReferenceList> for ReferenceListSerializer {
    fn serialize(&self, references: &ReferenceList) -> Result<WireValue, SerializeError> {
        let out = references
            .iter()
            .map(|r| self.reference.serialize(r))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(WireValue::Array(out))
    }
}

pub struct ReferenceListDeserializer {
    reference: Arc<dyn Deserializer<Reference>>,
}

impl ReferenceListDeserializer {
    pub fn from_registry(registry: &StrategyRegistry<Deserialization>) -> Result<Self, RegistryError> {
        Ok(Self {
            reference: registry.deserializer(&Discriminator::Reference)?,
        })
    }
}

impl Deserializer<ReferenceList> for ReferenceListDeserializer {
    fn deserialize(&self, wire: &WireValue) -> Result<ReferenceList, DeserializeError> {
        as_array(wire, "references")?
            .iter()
            .map(|r| self.reference.deserialize(r))
            .collect()
    }
}
