//! Construction entry points for serializers and deserializers.
//!
//! A factory owns its own strategy registry, wired leaves first so every
//! composite can resolve its parts by discriminator. Factories are cheap to
//! build and share nothing: two calls to [`SerializerFactory::new`] yield
//! independent registries. The codecs handed out hold no mutable state and
//! may be used from any number of threads.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use wikibase_serialization::factory::{CodecOptions, DeserializerFactory, SerializerFactory};
//! use wikibase_serialization::lookup::PropertyTypes;
//! use wikibase_serialization::model::{Entity, ItemBuilder, ItemId, PropertyId};
//! use wikibase_serialization::registry::{Deserializer, Serializer};
//!
//! let p31 = PropertyId::new(31).unwrap();
//! let item: Entity = ItemBuilder::new(ItemId::new(1).unwrap())
//!     .label("en", "Earth")
//!     .statement(p31, |s| s.item_value(ItemId::new(2).unwrap()))
//!     .build()
//!     .into();
//!
//! let serializer = SerializerFactory::new(CodecOptions::new()).unwrap().new_entity_serializer().unwrap();
//! let wire = serializer.serialize(&item).unwrap();
//! assert_eq!(wire["claims"]["P31"][0]["rank"], "normal");
//!
//! let types = PropertyTypes::new().with_property(p31, "wikibase-item");
//! let deserializer = DeserializerFactory::new(CodecOptions::new(), Arc::new(types))
//!     .unwrap()
//!     .new_entity_deserializer()
//!     .unwrap();
//! assert_eq!(deserializer.deserialize(&wire).unwrap(), item);
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use crate::codec::{
    ClaimDeserializer, ClaimSerializer, EntityDeserializer, EntitySerializer,
    FingerprintDeserializer, FingerprintSerializer, ItemDeserializer, ItemSerializer,
    MultiTermDeserializer, MultiTermMapDeserializer, MultiTermMapSerializer, MultiTermSerializer,
    PropertyDeserializer, PropertySerializer, ReferenceDeserializer, ReferenceListDeserializer,
    ReferenceListSerializer, ReferenceSerializer, SiteLinkDeserializer, SiteLinkSerializer,
    SiteLinkSetDeserializer, SiteLinkSetSerializer, SnakDeserializer, SnakListDeserializer,
    SnakListSerializer, SnakSerializer, StatementDeserializer, StatementGroupDeserializer,
    StatementGroupSerializer, StatementGroupSetDeserializer, StatementGroupSetSerializer,
    StatementListDeserializer, StatementListSerializer, StatementSerializer, TermDeserializer,
    TermMapDeserializer, TermMapSerializer, TermSerializer,
};
use crate::error::RegistryError;
use crate::lookup::DataValueKindLookup;
use crate::model::{
    Claim, Entity, Fingerprint, MultiTerm, MultiTermMap, Reference, ReferenceList, SiteLink,
    SiteLinkSet, Snak, SnakList, Statement, StatementGroup, StatementGroupSet, StatementList,
    Term, TermMap,
};
use crate::registry::{
    Deserialization, Deserializer, Discriminator, Serialization, Serializer, ShapedDeserializer,
    ShapedSerializer, StrategyRegistry, WireShape,
};

const SHAPES: [WireShape; 2] = [WireShape::Current, WireShape::Legacy];

/// Options for building codecs.
#[derive(Debug, Clone, Copy)]
pub struct CodecOptions {
    /// Produce the legacy wire shape by default.
    pub legacy_style: bool,
    /// Check wire reference hashes against the recomputed hash.
    ///
    /// When disabled, a wire hash is ignored; the model hash is always
    /// derived from the snaks.
    pub verify_reference_hashes: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            legacy_style: false,
            verify_reference_hashes: true,
        }
    }
}

impl CodecOptions {
    /// Creates default options (current shape, strict hashes).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options producing the legacy shape.
    pub fn legacy() -> Self {
        Self::new().with_legacy_style(true)
    }

    pub fn with_legacy_style(mut self, legacy_style: bool) -> Self {
        self.legacy_style = legacy_style;
        self
    }

    pub fn with_reference_hash_verification(mut self, verify: bool) -> Self {
        self.verify_reference_hashes = verify;
        self
    }

    /// The default wire shape.
    pub fn shape(&self) -> WireShape {
        WireShape::from_legacy_flag(self.legacy_style)
    }
}

// =============================================================================
// SERIALIZERS
// =============================================================================

/// Hands out serializers over a privately wired registry.
#[derive(Debug)]
pub struct SerializerFactory {
    registry: StrategyRegistry<Serialization>,
    options: CodecOptions,
}

impl SerializerFactory {
    pub fn new(options: CodecOptions) -> Result<Self, RegistryError> {
        let mut registry = StrategyRegistry::new();
        wire_serializers(&mut registry)?;
        tracing::debug!(
            strategies = registry.len(),
            shape = %options.shape(),
            "serializer factory wired"
        );
        Ok(Self { registry, options })
    }

    pub fn options(&self) -> CodecOptions {
        self.options
    }

    /// Registers a strategy for an additional entity kind. Entity serializers
    /// created afterwards dispatch to it.
    pub fn register_entity_kind<S>(&mut self, kind: impl Into<Cow<'static, str>>, strategy: S) -> Result<(), RegistryError>
    where
        S: ShapedSerializer<Entity> + 'static,
    {
        self.registry
            .register_shaped_serializer::<Entity, _>(Discriminator::entity(kind), strategy)
    }

    pub fn new_entity_serializer(&self) -> Result<EntitySerializer, RegistryError> {
        EntitySerializer::from_registry(&self.registry, self.options.shape())
    }

    pub fn new_statement_group_set_serializer(&self) -> Result<Arc<dyn Serializer<StatementGroupSet>>, RegistryError> {
        self.registry.serializer(&Discriminator::StatementGroupSet(self.options.shape()))
    }

    pub fn new_statement_group_serializer(&self) -> Result<Arc<dyn Serializer<StatementGroup>>, RegistryError> {
        self.registry.serializer(&Discriminator::StatementGroup(self.options.shape()))
    }

    pub fn new_statement_list_serializer(&self) -> Result<Arc<dyn Serializer<StatementList>>, RegistryError> {
        self.registry.serializer(&Discriminator::StatementList(self.options.shape()))
    }

    pub fn new_statement_serializer(&self) -> Result<Arc<dyn Serializer<Statement>>, RegistryError> {
        self.registry.serializer(&Discriminator::Statement(self.options.shape()))
    }

    pub fn new_claim_serializer(&self) -> Result<Arc<dyn Serializer<Claim>>, RegistryError> {
        self.registry.serializer(&Discriminator::Claim(self.options.shape()))
    }

    pub fn new_reference_list_serializer(&self) -> Result<Arc<dyn Serializer<ReferenceList>>, RegistryError> {
        self.registry.serializer(&Discriminator::ReferenceList)
    }

    pub fn new_reference_serializer(&self) -> Result<Arc<dyn Serializer<Reference>>, RegistryError> {
        self.registry.serializer(&Discriminator::Reference)
    }

    pub fn new_snak_list_serializer(&self) -> Result<Arc<dyn Serializer<SnakList>>, RegistryError> {
        self.registry.serializer(&Discriminator::SnakList)
    }

    pub fn new_snak_serializer(&self) -> Result<Arc<dyn Serializer<Snak>>, RegistryError> {
        self.registry.serializer(&Discriminator::Snak)
    }

    pub fn new_fingerprint_serializer(&self) -> Result<Arc<dyn Serializer<Fingerprint>>, RegistryError> {
        self.registry.serializer(&Discriminator::Fingerprint)
    }

    pub fn new_term_map_serializer(&self) -> Result<Arc<dyn Serializer<TermMap>>, RegistryError> {
        self.registry.serializer(&Discriminator::TermMap)
    }

    pub fn new_term_serializer(&self) -> Result<Arc<dyn Serializer<Term>>, RegistryError> {
        self.registry.serializer(&Discriminator::Term)
    }

    pub fn new_alias_group_list_serializer(&self) -> Result<Arc<dyn Serializer<MultiTermMap>>, RegistryError> {
        self.registry.serializer(&Discriminator::MultiTermMap)
    }

    pub fn new_alias_group_serializer(&self) -> Result<Arc<dyn Serializer<MultiTerm>>, RegistryError> {
        self.registry.serializer(&Discriminator::MultiTerm)
    }

    pub fn new_site_link_set_serializer(&self) -> Result<Arc<dyn Serializer<SiteLinkSet>>, RegistryError> {
        self.registry.serializer(&Discriminator::SiteLinkSet)
    }

    pub fn new_site_link_serializer(&self) -> Result<Arc<dyn Serializer<SiteLink>>, RegistryError> {
        self.registry.serializer(&Discriminator::SiteLink)
    }
}

fn wire_serializers(r: &mut StrategyRegistry<Serialization>) -> Result<(), RegistryError> {
    // Leaves.
    r.register_serializer::<Term, _>(Discriminator::Term, TermSerializer)?;
    r.register_serializer::<MultiTerm, _>(Discriminator::MultiTerm, MultiTermSerializer)?;
    r.register_serializer::<Snak, _>(Discriminator::Snak, SnakSerializer)?;
    r.register_serializer::<SiteLink, _>(Discriminator::SiteLink, SiteLinkSerializer)?;

    // Shape-independent composites.
    let s = TermMapSerializer::from_registry(r)?;
    r.register_serializer::<TermMap, _>(Discriminator::TermMap, s)?;
    let s = MultiTermMapSerializer::from_registry(r)?;
    r.register_serializer::<MultiTermMap, _>(Discriminator::MultiTermMap, s)?;
    let s = FingerprintSerializer::from_registry(r)?;
    r.register_serializer::<Fingerprint, _>(Discriminator::Fingerprint, s)?;
    let s = SnakListSerializer::from_registry(r)?;
    r.register_serializer::<SnakList, _>(Discriminator::SnakList, s)?;
    let s = ReferenceSerializer::from_registry(r)?;
    r.register_serializer::<Reference, _>(Discriminator::Reference, s)?;
    let s = ReferenceListSerializer::from_registry(r)?;
    r.register_serializer::<ReferenceList, _>(Discriminator::ReferenceList, s)?;
    let s = SiteLinkSetSerializer::from_registry(r)?;
    r.register_serializer::<SiteLinkSet, _>(Discriminator::SiteLinkSet, s)?;

    // Statement family, once per shape.
    for shape in SHAPES {
        let s = ClaimSerializer::from_registry(r, shape)?;
        r.register_serializer::<Claim, _>(Discriminator::Claim(shape), s)?;
        let s = StatementSerializer::from_registry(r, shape)?;
        r.register_serializer::<Statement, _>(Discriminator::Statement(shape), s)?;
        let s = StatementListSerializer::from_registry(r, shape)?;
        r.register_serializer::<StatementList, _>(Discriminator::StatementList(shape), s)?;
        let s = StatementGroupSerializer::from_registry(r, shape)?;
        r.register_serializer::<StatementGroup, _>(Discriminator::StatementGroup(shape), s)?;
        let s = StatementGroupSetSerializer::from_registry(r, shape)?;
        r.register_serializer::<StatementGroupSet, _>(Discriminator::StatementGroupSet(shape), s)?;
    }

    // Entity kinds.
    let s = ItemSerializer::from_registry(r)?;
    r.register_shaped_serializer::<Entity, _>(Discriminator::entity("item"), s)?;
    let s = PropertySerializer::from_registry(r)?;
    r.register_shaped_serializer::<Entity, _>(Discriminator::entity("property"), s)?;
    Ok(())
}

// =============================================================================
// DESERIALIZERS
// =============================================================================

/// Hands out deserializers over a privately wired registry.
#[derive(Debug)]
pub struct DeserializerFactory {
    registry: StrategyRegistry<Deserialization>,
    options: CodecOptions,
}

impl DeserializerFactory {
    /// `lookup` supplies the value kind of each property for value snaks.
    pub fn new(options: CodecOptions, lookup: Arc<dyn DataValueKindLookup>) -> Result<Self, RegistryError> {
        let mut registry = StrategyRegistry::new();
        wire_deserializers(&mut registry, lookup, options)?;
        tracing::debug!(
            strategies = registry.len(),
            shape = %options.shape(),
            verify_reference_hashes = options.verify_reference_hashes,
            "deserializer factory wired"
        );
        Ok(Self { registry, options })
    }

    pub fn options(&self) -> CodecOptions {
        self.options
    }

    /// Registers a strategy for an additional entity kind.
    pub fn register_entity_kind<S>(&mut self, kind: impl Into<Cow<'static, str>>, strategy: S) -> Result<(), RegistryError>
    where
        S: ShapedDeserializer<Entity> + 'static,
    {
        self.registry
            .register_shaped_deserializer::<Entity, _>(Discriminator::entity(kind), strategy)
    }

    pub fn new_entity_deserializer(&self) -> Result<EntityDeserializer, RegistryError> {
        EntityDeserializer::from_registry(&self.registry, self.options.shape())
    }

    pub fn new_statement_group_set_deserializer(&self) -> Result<Arc<dyn Deserializer<StatementGroupSet>>, RegistryError> {
        self.registry.deserializer(&Discriminator::StatementGroupSet(self.options.shape()))
    }

    pub fn new_statement_group_deserializer(&self) -> Result<Arc<dyn Deserializer<StatementGroup>>, RegistryError> {
        self.registry.deserializer(&Discriminator::StatementGroup(self.options.shape()))
    }

    pub fn new_statement_list_deserializer(&self) -> Result<Arc<dyn Deserializer<StatementList>>, RegistryError> {
        self.registry.deserializer(&Discriminator::StatementList(self.options.shape()))
    }

    pub fn new_statement_deserializer(&self) -> Result<Arc<dyn Deserializer<Statement>>, RegistryError> {
        self.registry.deserializer(&Discriminator::Statement(self.options.shape()))
    }

    pub fn new_claim_deserializer(&self) -> Result<Arc<dyn Deserializer<Claim>>, RegistryError> {
        self.registry.deserializer(&Discriminator::Claim(self.options.shape()))
    }

    pub fn new_reference_list_deserializer(&self) -> Result<Arc<dyn Deserializer<ReferenceList>>, RegistryError> {
        self.registry.deserializer(&Discriminator::ReferenceList)
    }

    pub fn new_reference_deserializer(&self) -> Result<Arc<dyn Deserializer<Reference>>, RegistryError> {
        self.registry.deserializer(&Discriminator::Reference)
    }

    pub fn new_snak_list_deserializer(&self) -> Result<Arc<dyn Deserializer<SnakList>>, RegistryError> {
        self.registry.deserializer(&Discriminator::SnakList)
    }

    pub fn new_snak_deserializer(&self) -> Result<Arc<dyn Deserializer<Snak>>, RegistryError> {
        self.registry.deserializer(&Discriminator::Snak)
    }

    pub fn new_fingerprint_deserializer(&self) -> Result<Arc<dyn Deserializer<Fingerprint>>, RegistryError> {
        self.registry.deserializer(&Discriminator::Fingerprint)
    }

    pub fn new_term_map_deserializer(&self) -> Result<Arc<dyn Deserializer<TermMap>>, RegistryError> {
        self.registry.deserializer(&Discriminator::TermMap)
    }

    pub fn new_term_deserializer(&self) -> Result<Arc<dyn Deserializer<Term>>, RegistryError> {
        self.registry.deserializer(&Discriminator::Term)
    }

    pub fn new_alias_group_list_deserializer(&self) -> Result<Arc<dyn Deserializer<MultiTermMap>>, RegistryError> {
        self.registry.deserializer(&Discriminator::MultiTermMap)
    }

    pub fn new_alias_group_deserializer(&self) -> Result<Arc<dyn Deserializer<MultiTerm>>, RegistryError> {
        self.registry.deserializer(&Discriminator::MultiTerm)
    }

    pub fn new_site_link_set_deserializer(&self) -> Result<Arc<dyn Deserializer<SiteLinkSet>>, RegistryError> {
        self.registry.deserializer(&Discriminator::SiteLinkSet)
    }

    pub fn new_site_link_deserializer(&self) -> Result<Arc<dyn Deserializer<SiteLink>>, RegistryError> {
        self.registry.deserializer(&Discriminator::SiteLink)
    }
}

fn wire_deserializers(
    r: &mut StrategyRegistry<Deserialization>,
    lookup: Arc<dyn DataValueKindLookup>,
    options: CodecOptions,
) -> Result<(), RegistryError> {
    // Leaves.
    r.register_deserializer::<Term, _>(Discriminator::Term, TermDeserializer)?;
    r.register_deserializer::<MultiTerm, _>(Discriminator::MultiTerm, MultiTermDeserializer)?;
    r.register_deserializer::<Snak, _>(Discriminator::Snak, SnakDeserializer::new(lookup))?;
    r.register_deserializer::<SiteLink, _>(Discriminator::SiteLink, SiteLinkDeserializer)?;

    // Shape-independent composites.
    let d = TermMapDeserializer::from_registry(r)?;
    r.register_deserializer::<TermMap, _>(Discriminator::TermMap, d)?;
    let d = MultiTermMapDeserializer::from_registry(r)?;
    r.register_deserializer::<MultiTermMap, _>(Discriminator::MultiTermMap, d)?;
    let d = FingerprintDeserializer::from_registry(r)?;
    r.register_deserializer::<Fingerprint, _>(Discriminator::Fingerprint, d)?;
    let d = SnakListDeserializer::from_registry(r)?;
    r.register_deserializer::<SnakList, _>(Discriminator::SnakList, d)?;
    let d = ReferenceDeserializer::from_registry(r, options.verify_reference_hashes)?;
    r.register_deserializer::<Reference, _>(Discriminator::Reference, d)?;
    let d = ReferenceListDeserializer::from_registry(r)?;
    r.register_deserializer::<ReferenceList, _>(Discriminator::ReferenceList, d)?;
    let d = SiteLinkSetDeserializer::from_registry(r)?;
    r.register_deserializer::<SiteLinkSet, _>(Discriminator::SiteLinkSet, d)?;

    // Statement family, once per shape.
    for shape in SHAPES {
        let d = ClaimDeserializer::from_registry(r, shape)?;
        r.register_deserializer::<Claim, _>(Discriminator::Claim(shape), d)?;
        let d = StatementDeserializer::from_registry(r, shape)?;
        r.register_deserializer::<Statement, _>(Discriminator::Statement(shape), d)?;
        let d = StatementListDeserializer::from_registry(r, shape)?;
        r.register_deserializer::<StatementList, _>(Discriminator::StatementList(shape), d)?;
        let d = StatementGroupDeserializer::from_registry(r, shape)?;
        r.register_deserializer::<StatementGroup, _>(Discriminator::StatementGroup(shape), d)?;
        let d = StatementGroupSetDeserializer::from_registry(r, shape)?;
        r.register_deserializer::<StatementGroupSet, _>(Discriminator::StatementGroupSet(shape), d)?;
    }

    // Entity kinds.
    let d = ItemDeserializer::from_registry(r)?;
    r.register_shaped_deserializer::<Entity, _>(Discriminator::entity("item"), d)?;
    let d = PropertyDeserializer::from_registry(r)?;
    r.register_shaped_deserializer::<Entity, _>(Discriminator::entity("property"), d)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::error::{DeserializeError, SerializeError};
    use crate::lookup::PropertyTypes;
    use crate::model::{
        DataValue, GlobeCoordinateValue, Item, ItemBuilder, ItemId, Property, PropertyId,
        QuantityValue, Rank, StatementBuilder, TimeValue,
    };
    use crate::registry::WireValue;
    use crate::util::Timestamp;

    fn p(n: u64) -> PropertyId {
        PropertyId::new(n).unwrap()
    }

    fn q(n: u64) -> ItemId {
        ItemId::new(n).unwrap()
    }

    /// P1 string, P2 item, P3 quantity, P4 monolingual text, P5 time, P6 coordinate.
    fn property_types() -> PropertyTypes {
        PropertyTypes::new()
            .with_property(p(1), "string")
            .with_property(p(2), "wikibase-item")
            .with_property(p(3), "quantity")
            .with_property(p(4), "monolingualtext")
            .with_property(p(5), "time")
            .with_property(p(6), "globe-coordinate")
            .with_property(p(31), "wikibase-item")
    }

    fn serializer(options: CodecOptions) -> EntitySerializer {
        SerializerFactory::new(options).unwrap().new_entity_serializer().unwrap()
    }

    fn deserializer(options: CodecOptions) -> EntityDeserializer {
        DeserializerFactory::new(options, Arc::new(property_types()))
            .unwrap()
            .new_entity_deserializer()
            .unwrap()
    }

    fn earth() -> Entity {
        ItemBuilder::new(q(1))
            .label("en", "Earth")
            .statement(p(31), |s| s.item_value(q(2)).guid("Q1$0b2a4e6c"))
            .build()
            .into()
    }

    #[test]
    fn test_end_to_end_current_shape() {
        let wire = serializer(CodecOptions::new()).serialize(&earth()).unwrap();
        assert_eq!(
            wire,
            json!({
                "type": "item",
                "id": "Q1",
                "labels": {"en": {"language": "en", "value": "Earth"}},
                "descriptions": {},
                "aliases": {},
                "claims": {
                    "P31": [{
                        "mainsnak": {
                            "snaktype": "value",
                            "property": "P31",
                            "datavalue": {
                                "value": {"entity-type": "item", "numeric-id": 2, "id": "Q2"},
                                "type": "wikibase-entityid"
                            }
                        },
                        "type": "statement",
                        "rank": "normal",
                        "qualifiers": {},
                        "references": [],
                        "id": "Q1$0b2a4e6c"
                    }]
                },
                "sitelinks": {}
            })
        );
        let keys: Vec<_> = wire.as_object().unwrap().keys().cloned().collect();
        assert_eq!(
            keys,
            ["type", "id", "labels", "descriptions", "aliases", "claims", "sitelinks"]
        );
        assert_eq!(deserializer(CodecOptions::new()).deserialize(&wire).unwrap(), earth());
    }

    #[test]
    fn test_statement_id_is_never_invented() {
        let item: Entity = ItemBuilder::new(q(1))
            .statement(p(31), |s| s.item_value(q(2)))
            .build()
            .into();
        let wire = serializer(CodecOptions::new()).serialize(&item).unwrap();
        assert!(wire["claims"]["P31"][0].get("id").is_none());
        let back = deserializer(CodecOptions::new()).deserialize(&wire).unwrap();
        assert!(back.statements().statements().all(|s| s.guid().is_none()));
    }

    #[test]
    fn test_legacy_shape_lowercases_property_keys() {
        let item: Entity = ItemBuilder::new(q(1))
            .statement(p(31), |s| s.item_value(q(2)).qualifier(Snak::no_value(p(1))))
            .build()
            .into();
        let ser = serializer(CodecOptions::new());
        let current = ser.serialize_shaped(&item, WireShape::Current).unwrap();
        let legacy = ser.serialize_shaped(&item, WireShape::Legacy).unwrap();

        assert!(current["claims"].get("P31").is_some());
        assert!(legacy["claims"].get("p31").is_some());
        assert!(legacy["claims"]["p31"][0]["qualifiers"].get("p1").is_some());
        assert_eq!(legacy["labels"], current["labels"]);

        let de = deserializer(CodecOptions::legacy());
        assert_eq!(de.deserialize(&legacy).unwrap(), item);
        assert_eq!(de.deserialize_shaped(&current, WireShape::Legacy).unwrap(), item);
    }

    #[test]
    fn test_default_shape_follows_options() {
        let item: Entity = ItemBuilder::new(q(1)).statement(p(2), |s| s.no_value()).build().into();
        let wire = serializer(CodecOptions::legacy()).serialize(&item).unwrap();
        assert!(wire["claims"].get("p2").is_some());
    }

    #[test]
    fn test_empty_item_keeps_containers() {
        let item: Entity = Item::new(q(7)).into();
        let wire = serializer(CodecOptions::new()).serialize(&item).unwrap();
        assert_eq!(wire["claims"], json!({}));
        assert_eq!(wire["sitelinks"], json!({}));
        let back = deserializer(CodecOptions::new()).deserialize(&wire).unwrap();
        assert!(back.statements().is_empty());
        assert_eq!(back, item);
    }

    #[test]
    fn test_property_entity() {
        let mut property = Property::new(p(31), "wikibase-item");
        property.fingerprint.set_label(crate::model::Term::new("en", "instance of"));
        let entity: Entity = property.into();

        let wire = serializer(CodecOptions::new()).serialize(&entity).unwrap();
        let keys: Vec<_> = wire.as_object().unwrap().keys().cloned().collect();
        assert_eq!(
            keys,
            ["type", "datatype", "id", "labels", "descriptions", "aliases", "claims"]
        );
        assert_eq!(deserializer(CodecOptions::new()).deserialize(&wire).unwrap(), entity);
    }

    #[test]
    fn test_property_statements_legacy_shape() {
        let mut property = Property::new(p(9), "string");
        property.fingerprint.set_label(crate::model::Term::new("en", "subproperty"));
        property
            .statements
            .add_statement(StatementBuilder::new(p(2)).item_value(q(5)).guid("P9$1").build());
        property.statements.add_statement(StatementBuilder::new(p(31)).no_value().build());
        let entity: Entity = property.into();

        let wire = serializer(CodecOptions::legacy()).serialize(&entity).unwrap();
        let claims: Vec<_> = wire["claims"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(claims, ["p2", "p31"]);
        assert_eq!(wire["claims"]["p2"][0]["mainsnak"]["property"], "P2");
        assert_eq!(wire["datatype"], "string");

        let back = deserializer(CodecOptions::legacy()).deserialize(&wire).unwrap();
        assert_eq!(back, entity);
    }

    #[test]
    fn test_group_key_mismatch() {
        let wire = json!({
            "type": "item",
            "id": "Q1",
            "claims": {
                "P7": [{
                    "mainsnak": {"snaktype": "novalue", "property": "P8"},
                    "type": "statement",
                    "rank": "normal"
                }]
            }
        });
        assert_eq!(
            deserializer(CodecOptions::new()).deserialize(&wire),
            Err(DeserializeError::GroupKeyMismatch { key: "P7".into(), property: p(8) })
        );
    }

    #[test]
    fn test_snak_errors_through_factory() {
        let factory = DeserializerFactory::new(CodecOptions::new(), Arc::new(property_types())).unwrap();
        let snak = factory.new_snak_deserializer().unwrap();
        assert_eq!(
            snak.deserialize(&json!({"snaktype": "bogus", "property": "P1"})),
            Err(DeserializeError::UnknownSnakType { snaktype: "bogus".into() })
        );
        assert_eq!(
            snak.deserialize(&json!({"snaktype": "novalue"})),
            Err(DeserializeError::MissingField { field: "property" })
        );
    }

    #[test]
    fn test_unsupported_entity_kind() {
        let err = deserializer(CodecOptions::new())
            .deserialize(&json!({"type": "lexeme", "id": "L1"}))
            .unwrap_err();
        assert_eq!(err, DeserializeError::UnsupportedEntityKind { kind: "lexeme".into() });
    }

    #[test]
    fn test_factories_are_independent() {
        struct Stub;
        impl ShapedSerializer<Entity> for Stub {
            fn serialize_shaped(&self, _: &Entity, _: WireShape) -> Result<WireValue, SerializeError> {
                Ok(json!("stub"))
            }
        }

        let mut extended = SerializerFactory::new(CodecOptions::new()).unwrap();
        let plain = SerializerFactory::new(CodecOptions::new()).unwrap();
        extended.register_entity_kind("lexeme", Stub).unwrap();

        assert_eq!(extended.new_entity_serializer().unwrap().kinds().count(), 3);
        assert_eq!(plain.new_entity_serializer().unwrap().kinds().count(), 2);
        assert!(matches!(
            extended.register_entity_kind("item", Stub),
            Err(RegistryError::DuplicateStrategy { .. })
        ));
    }

    #[test]
    fn test_statement_codecs_from_factory() {
        let ser = SerializerFactory::new(CodecOptions::new()).unwrap();
        let de = DeserializerFactory::new(CodecOptions::new(), Arc::new(property_types())).unwrap();

        let statements: StatementList = [
            StatementBuilder::new(p(1)).string_value("b").build(),
            StatementBuilder::new(p(1)).string_value("a").rank(Rank::Deprecated).build(),
        ]
        .into_iter()
        .collect();
        let wire = ser.new_statement_list_serializer().unwrap().serialize(&statements).unwrap();
        let back = de.new_statement_list_deserializer().unwrap().deserialize(&wire).unwrap();
        assert_eq!(back, statements);
    }

    #[test]
    fn test_reference_hash_policy() {
        let item: Entity = ItemBuilder::new(q(1))
            .statement(p(2), |s| s.item_value(q(5)).reference([Snak::value(p(1), DataValue::String("src".into()))]))
            .build()
            .into();
        let mut wire = serializer(CodecOptions::new()).serialize(&item).unwrap();
        wire["claims"]["P2"][0]["references"][0]["hash"] = json!("stale");

        assert!(matches!(
            deserializer(CodecOptions::new()).deserialize(&wire),
            Err(DeserializeError::ReferenceHashMismatch { .. })
        ));
        let lenient = CodecOptions::new().with_reference_hash_verification(false);
        assert_eq!(deserializer(lenient).deserialize(&wire).unwrap(), item);
    }

    // -------------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------------

    fn arb_text() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 ]{0,12}"
    }

    fn arb_language() -> impl Strategy<Value = &'static str> {
        prop_oneof![Just("en"), Just("de"), Just("fr"), Just("pt-br")]
    }

    fn arb_decimal() -> impl Strategy<Value = String> {
        (any::<bool>(), 0u32..100_000, proptest::option::of(0u32..1000)).prop_map(
            |(negative, int, frac)| {
                let sign = if negative { '-' } else { '+' };
                match frac {
                    Some(frac) => format!("{sign}{int}.{frac}"),
                    None => format!("{sign}{int}"),
                }
            },
        )
    }

    /// A snak about one of P1..=P6 with a value matching its declared type.
    fn arb_snak() -> impl Strategy<Value = Snak> {
        let value = prop_oneof![
            arb_text().prop_map(|s| (1u64, DataValue::String(s))),
            (1u64..1000).prop_map(|n| (2, DataValue::EntityId(q(n).into()))),
            (arb_decimal(), proptest::option::of(arb_decimal())).prop_map(|(amount, upper)| {
                (
                    3,
                    DataValue::Quantity(QuantityValue {
                        amount,
                        unit: "1".into(),
                        upper_bound: upper,
                        lower_bound: None,
                    }),
                )
            }),
            (arb_language(), arb_text()).prop_map(|(language, text)| {
                (4, DataValue::MonolingualText { language: language.into(), text })
            }),
            (-3000i64..3000, 1u8..=12, 1u8..=28, 0u8..=14).prop_map(|(year, month, day, precision)| {
                let timestamp = Timestamp { year, month, day, hour: 0, minute: 0, second: 0 };
                (5, DataValue::Time(TimeValue::gregorian(&timestamp, precision)))
            }),
            (-9000i32..=9000, -18000i32..=18000, proptest::option::of(1u32..100)).prop_map(
                |(lat, lon, precision)| {
                    (
                        6,
                        DataValue::GlobeCoordinate(GlobeCoordinateValue {
                            latitude: f64::from(lat) / 100.0,
                            longitude: f64::from(lon) / 100.0,
                            precision: precision.map(|p| f64::from(p) / 1000.0),
                            globe: "http://www.wikidata.org/entity/Q2".into(),
                        }),
                    )
                },
            ),
        ];
        prop_oneof![
            (1u64..=6).prop_map(|n| Snak::no_value(p(n))),
            (1u64..=6).prop_map(|n| Snak::some_value(p(n))),
            value.prop_map(|(n, v)| Snak::value(p(n), v)),
        ]
    }

    fn arb_statement() -> impl Strategy<Value = Statement> {
        let rank = prop_oneof![Just(Rank::Deprecated), Just(Rank::Normal), Just(Rank::Preferred)];
        (
            arb_snak(),
            proptest::collection::vec(arb_snak(), 0..4),
            proptest::collection::vec(proptest::collection::vec(arb_snak(), 1..3), 0..3),
            rank,
            proptest::option::of("[0-9a-f]{8}"),
        )
            .prop_map(|(main, qualifiers, references, rank, guid)| {
                let statement = Statement::new(
                    Claim::new(main, qualifiers.into_iter().collect()),
                    references
                        .into_iter()
                        .map(|snaks| Reference::new(snaks.into_iter().collect()))
                        .collect(),
                    rank,
                );
                match guid {
                    Some(g) => statement.with_guid(format!("Q1${g}")),
                    None => statement,
                }
            })
    }

    fn arb_fingerprint() -> impl Strategy<Value = Fingerprint> {
        (
            proptest::collection::vec((arb_language(), arb_text()), 0..4),
            proptest::collection::vec((arb_language(), arb_text()), 0..4),
            proptest::collection::vec((arb_language(), proptest::collection::vec(arb_text(), 0..3)), 0..3),
        )
            .prop_map(|(labels, descriptions, aliases)| {
                let mut fingerprint = Fingerprint::new();
                for (language, text) in labels {
                    fingerprint.set_label(crate::model::Term::new(language, text));
                }
                for (language, text) in descriptions {
                    fingerprint.set_description(crate::model::Term::new(language, text));
                }
                for (language, texts) in aliases {
                    fingerprint.set_aliases(MultiTerm::new(language, texts));
                }
                fingerprint
            })
    }

    fn arb_item() -> impl Strategy<Value = Entity> {
        (
            1u64..100_000,
            arb_fingerprint(),
            proptest::collection::vec(arb_statement(), 0..6),
            proptest::collection::vec((prop_oneof![Just("enwiki"), Just("dewiki"), Just("frwiki")], arb_text(), proptest::collection::vec(1u64..50, 0..2)), 0..3),
        )
            .prop_map(|(id, fingerprint, statements, links)| {
                let mut item = Item::new(q(id));
                item.fingerprint = fingerprint;
                for statement in statements {
                    item.statements.add_statement(statement);
                }
                for (site, title, badges) in links {
                    item.site_links.set(SiteLink::new(site, title).with_badges(badges.into_iter().map(q).collect()));
                }
                item.into()
            })
    }

    fn arb_property() -> impl Strategy<Value = Entity> {
        let data_type = prop_oneof![
            Just("string"),
            Just("wikibase-item"),
            Just("quantity"),
            Just("time"),
            Just("external-id"),
        ];
        (
            1u64..100_000,
            data_type,
            arb_fingerprint(),
            proptest::collection::vec(arb_statement(), 0..6),
        )
            .prop_map(|(id, data_type, fingerprint, statements)| {
                let mut property = Property::new(p(id), data_type);
                property.fingerprint = fingerprint;
                for statement in statements {
                    property.statements.add_statement(statement);
                }
                property.into()
            })
    }

    fn arb_entity() -> impl Strategy<Value = Entity> {
        prop_oneof![arb_item(), arb_property()]
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

        #[test]
        fn roundtrip_both_shapes(entity in arb_entity(), legacy in any::<bool>()) {
            let shape = WireShape::from_legacy_flag(legacy);
            let wire = serializer(CodecOptions::new()).serialize_shaped(&entity, shape).unwrap();
            let back = deserializer(CodecOptions::new()).deserialize_shaped(&wire, shape).unwrap();
            prop_assert_eq!(back, entity);
        }

        #[test]
        fn serialization_is_idempotent(entity in arb_entity()) {
            let ser = serializer(CodecOptions::new());
            let first = serde_json::to_string(&ser.serialize(&entity).unwrap()).unwrap();
            let second = serde_json::to_string(&ser.serialize(&entity).unwrap()).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn statement_order_is_preserved(statements in proptest::collection::vec(arb_statement(), 0..8)) {
            let list: StatementList = statements.into_iter().collect();
            let ser = SerializerFactory::new(CodecOptions::new()).unwrap();
            let de = DeserializerFactory::new(CodecOptions::new(), Arc::new(property_types())).unwrap();
            let wire = ser.new_statement_list_serializer().unwrap().serialize(&list).unwrap();
            let back = de.new_statement_list_deserializer().unwrap().deserialize(&wire).unwrap();
            prop_assert_eq!(back, list);
        }
    }
}
