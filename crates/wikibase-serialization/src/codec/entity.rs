//! Entity codecs and the current/legacy shape switch.
//!
//! Each entity kind has a shape-aware strategy registered under
//! `Discriminator::Entity(kind)`. The strategy resolves both shapes'
//! statement group set codecs at build time and picks one per call; the
//! fingerprint and site link codecs are shared by both shapes.
//!
//! [`EntitySerializer`] and [`EntityDeserializer`] dispatch on the entity
//! kind over whatever kinds the registry holds.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde_json::Map;

use crate::codec::primitives::{into_object, ObjectReader};
use crate::error::{DeserializeError, RegistryError, SerializeError};
use crate::model::{
    Entity, Fingerprint, Item, ItemId, Property, PropertyId, SiteLinkSet, StatementGroupSet,
};
use crate::registry::{
    Deserialization, Deserializer, Discriminator, Serialization, Serializer, ShapedDeserializer,
    ShapedSerializer, StrategyRegistry, WireShape, WireValue,
};

/// One value per wire shape.
#[derive(Clone)]
struct ByShape<T> {
    current: T,
    legacy: T,
}

impl<T> ByShape<T> {
    fn try_new<E>(mut f: impl FnMut(WireShape) -> Result<T, E>) -> Result<Self, E> {
        Ok(Self {
            current: f(WireShape::Current)?,
            legacy: f(WireShape::Legacy)?,
        })
    }

    fn get(&self, shape: WireShape) -> &T {
        match shape {
            WireShape::Current => &self.current,
            WireShape::Legacy => &self.legacy,
        }
    }
}

fn unsupported(entity: &Entity) -> SerializeError {
    SerializeError::UnsupportedEntityKind {
        kind: entity.kind().to_string(),
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Parts shared by every entity kind.
struct EntityParts {
    fingerprint: Arc<dyn Serializer<Fingerprint>>,
    claims: ByShape<Arc<dyn Serializer<StatementGroupSet>>>,
}

impl EntityParts {
    fn from_registry(registry: &StrategyRegistry<Serialization>) -> Result<Self, RegistryError> {
        Ok(Self {
            fingerprint: registry.serializer(&Discriminator::Fingerprint)?,
            claims: ByShape::try_new(|shape| {
                registry.serializer::<StatementGroupSet>(&Discriminator::StatementGroupSet(shape))
            })?,
        })
    }

    fn write_fingerprint(&self, out: &mut Map<String, WireValue>, fingerprint: &Fingerprint) -> Result<(), SerializeError> {
        out.extend(into_object(self.fingerprint.serialize(fingerprint)?, "fingerprint")?);
        Ok(())
    }

    fn write_claims(
        &self,
        out: &mut Map<String, WireValue>,
        statements: &StatementGroupSet,
        shape: WireShape,
    ) -> Result<(), SerializeError> {
        out.insert("claims".into(), self.claims.get(shape).serialize(statements)?);
        Ok(())
    }
}

/// `{type, id, labels, descriptions, aliases, claims, sitelinks}`
pub struct ItemSerializer {
    parts: EntityParts,
    site_links: Arc<dyn Serializer<SiteLinkSet>>,
}

impl ItemSerializer {
    pub fn from_registry(registry: &StrategyRegistry<Serialization>) -> Result<Self, RegistryError> {
        Ok(Self {
            parts: EntityParts::from_registry(registry)?,
            site_links: registry.serializer(&Discriminator::SiteLinkSet)?,
        })
    }
}

impl ShapedSerializer<Entity> for ItemSerializer {
    fn serialize_shaped(&self, entity: &Entity, shape: WireShape) -> Result<WireValue, SerializeError> {
        let Entity::Item(item) = entity else {
            return Err(unsupported(entity));
        };
        let mut out = Map::new();
        out.insert("type".into(), "item".into());
        out.insert("id".into(), item.id.to_string().into());
        self.parts.write_fingerprint(&mut out, &item.fingerprint)?;
        self.parts.write_claims(&mut out, &item.statements, shape)?;
        out.insert("sitelinks".into(), self.site_links.serialize(&item.site_links)?);
        Ok(WireValue::Object(out))
    }
}

/// `{type, datatype, id, labels, descriptions, aliases, claims}`
pub struct PropertySerializer {
    parts: EntityParts,
}

impl PropertySerializer {
    pub fn from_registry(registry: &StrategyRegistry<Serialization>) -> Result<Self, RegistryError> {
        Ok(Self {
            parts: EntityParts::from_registry(registry)?,
        })
    }
}

impl ShapedSerializer<Entity> for PropertySerializer {
    fn serialize_shaped(&self, entity: &Entity, shape: WireShape) -> Result<WireValue, SerializeError> {
        let Entity::Property(property) = entity else {
            return Err(unsupported(entity));
        };
        let mut out = Map::new();
        out.insert("type".into(), "property".into());
        out.insert("datatype".into(), property.data_type.clone().into());
        out.insert("id".into(), property.id.to_string().into());
        self.parts.write_fingerprint(&mut out, &property.fingerprint)?;
        self.parts.write_claims(&mut out, &property.statements, shape)?;
        Ok(WireValue::Object(out))
    }
}

/// Serializes any registered entity kind.
///
/// [`Serializer::serialize`] uses the default shape given at construction;
/// [`serialize_shaped`](Self::serialize_shaped) picks one per call.
pub struct EntitySerializer {
    kinds: FxHashMap<String, Arc<dyn ShapedSerializer<Entity>>>,
    default_shape: WireShape,
}

impl EntitySerializer {
    pub fn from_registry(
        registry: &StrategyRegistry<Serialization>,
        default_shape: WireShape,
    ) -> Result<Self, RegistryError> {
        let kinds = registry
            .entity_kinds()
            .map(|kind| {
                let strategy = registry.shaped_serializer::<Entity>(&Discriminator::entity(kind.to_string()))?;
                Ok((kind.to_string(), strategy))
            })
            .collect::<Result<_, RegistryError>>()?;
        Ok(Self { kinds, default_shape })
    }

    pub fn serialize_shaped(&self, entity: &Entity, shape: WireShape) -> Result<WireValue, SerializeError> {
        let strategy = self.kinds.get(entity.kind()).ok_or_else(|| unsupported(entity))?;
        strategy.serialize_shaped(entity, shape)
    }

    /// The shape used by [`Serializer::serialize`].
    pub fn default_shape(&self) -> WireShape {
        self.default_shape
    }

    /// Entity kinds this serializer handles.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }
}

impl Serializer<Entity> for EntitySerializer {
    fn serialize(&self, entity: &Entity) -> Result<WireValue, SerializeError> {
        self.serialize_shaped(entity, self.default_shape)
    }
}

impl ShapedSerializer<Entity> for EntitySerializer {
    fn serialize_shaped(&self, entity: &Entity, shape: WireShape) -> Result<WireValue, SerializeError> {
        EntitySerializer::serialize_shaped(self, entity, shape)
    }
}

// =============================================================================
// DECODING
// =============================================================================

struct EntityPartsDeserializer {
    fingerprint: Arc<dyn Deserializer<Fingerprint>>,
    claims: ByShape<Arc<dyn Deserializer<StatementGroupSet>>>,
}

impl EntityPartsDeserializer {
    fn from_registry(registry: &StrategyRegistry<Deserialization>) -> Result<Self, RegistryError> {
        Ok(Self {
            fingerprint: registry.deserializer(&Discriminator::Fingerprint)?,
            claims: ByShape::try_new(|shape| {
                registry.deserializer::<StatementGroupSet>(&Discriminator::StatementGroupSet(shape))
            })?,
        })
    }

    fn read_claims(
        &self,
        reader: &ObjectReader<'_>,
        shape: WireShape,
    ) -> Result<StatementGroupSet, DeserializeError> {
        match reader.optional("claims") {
            Some(claims) => self.claims.get(shape).deserialize(claims),
            None => Ok(StatementGroupSet::new()),
        }
    }
}

fn read_id<T>(reader: &ObjectReader<'_>) -> Result<T, DeserializeError>
where
    T: std::str::FromStr<Err = crate::error::IdParseError>,
{
    reader
        .required_str("id")?
        .parse()
        .map_err(|e: crate::error::IdParseError| DeserializeError::malformed("id", e.to_string()))
}

pub struct ItemDeserializer {
    parts: EntityPartsDeserializer,
    site_links: Arc<dyn Deserializer<SiteLinkSet>>,
}

impl ItemDeserializer {
    pub fn from_registry(registry: &StrategyRegistry<Deserialization>) -> Result<Self, RegistryError> {
        Ok(Self {
            parts: EntityPartsDeserializer::from_registry(registry)?,
            site_links: registry.deserializer(&Discriminator::SiteLinkSet)?,
        })
    }
}

impl ShapedDeserializer<Entity> for ItemDeserializer {
    fn deserialize_shaped(&self, wire: &WireValue, shape: WireShape) -> Result<Entity, DeserializeError> {
        let reader = ObjectReader::new(wire, "entity")?;
        let mut item = Item::new(read_id::<ItemId>(&reader)?);
        item.fingerprint = self.parts.fingerprint.deserialize(wire)?;
        item.statements = self.parts.read_claims(&reader, shape)?;
        if let Some(site_links) = reader.optional("sitelinks") {
            item.site_links = self.site_links.deserialize(site_links)?;
        }
        Ok(Entity::Item(item))
    }
}

pub struct PropertyDeserializer {
    parts: EntityPartsDeserializer,
}

impl PropertyDeserializer {
    pub fn from_registry(registry: &StrategyRegistry<Deserialization>) -> Result<Self, RegistryError> {
        Ok(Self {
            parts: EntityPartsDeserializer::from_registry(registry)?,
        })
    }
}

impl ShapedDeserializer<Entity> for PropertyDeserializer {
    fn deserialize_shaped(&self, wire: &WireValue, shape: WireShape) -> Result<Entity, DeserializeError> {
        let reader = ObjectReader::new(wire, "entity")?;
        let mut property = Property::new(read_id::<PropertyId>(&reader)?, reader.required_str("datatype")?);
        property.fingerprint = self.parts.fingerprint.deserialize(wire)?;
        property.statements = self.parts.read_claims(&reader, shape)?;
        Ok(Entity::Property(property))
    }
}

/// Deserializes any registered entity kind, dispatching on the wire `type`.
pub struct EntityDeserializer {
    kinds: FxHashMap<String, Arc<dyn ShapedDeserializer<Entity>>>,
    default_shape: WireShape,
}

impl EntityDeserializer {
    pub fn from_registry(
        registry: &StrategyRegistry<Deserialization>,
        default_shape: WireShape,
    ) -> Result<Self, RegistryError> {
        let kinds = registry
            .entity_kinds()
            .map(|kind| {
                let strategy = registry.shaped_deserializer::<Entity>(&Discriminator::entity(kind.to_string()))?;
                Ok((kind.to_string(), strategy))
            })
            .collect::<Result<_, RegistryError>>()?;
        Ok(Self { kinds, default_shape })
    }

    pub fn deserialize_shaped(&self, wire: &WireValue, shape: WireShape) -> Result<Entity, DeserializeError> {
        let reader = ObjectReader::new(wire, "entity")?;
        let kind = reader.required_str("type")?;
        let strategy = self
            .kinds
            .get(kind)
            .ok_or_else(|| DeserializeError::UnsupportedEntityKind {
                kind: kind.to_string(),
            })?;
        strategy.deserialize_shaped(wire, shape)
    }

    pub fn default_shape(&self) -> WireShape {
        self.default_shape
    }
}

impl Deserializer<Entity> for EntityDeserializer {
    fn deserialize(&self, wire: &WireValue) -> Result<Entity, DeserializeError> {
        self.deserialize_shaped(wire, self.default_shape)
    }
}

impl ShapedDeserializer<Entity> for EntityDeserializer {
    fn deserialize_shaped(&self, wire: &WireValue, shape: WireShape) -> Result<Entity, DeserializeError> {
        EntityDeserializer::deserialize_shaped(self, wire, shape)
    }
}
