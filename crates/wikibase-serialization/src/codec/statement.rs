//! Claim and statement codecs, and the grouped statement containers.
//!
//! Every strategy here is built for one [`WireShape`]; the shapes differ only
//! in how property-id keys of `qualifiers` and of statement group sets are
//! rendered. Deserializers accept either key case.
//!
//! Statement wire form:
//!
//! ```text
//! {"mainsnak": snak,
//!  "type": "statement",
//!  "rank": "normal",
//!  "qualifiers": {"P580": [snak, ...]},
//!  "references": [reference, ...],
//!  "id": "Q1$..."}                  // only when a GUID is assigned
//! ```

use std::sync::Arc;

use serde_json::Map;

use crate::codec::primitives::{
    as_array, as_object, into_object, parse_property, property_key, ObjectReader,
};
use crate::error::{DeserializeError, ModelError, RegistryError, SerializeError};
use crate::model::{
    Claim, Rank, ReferenceList, Snak, SnakList, Statement, StatementGroup, StatementGroupSet,
    StatementList,
};
use crate::registry::{
    Deserialization, Deserializer, Discriminator, Serialization, Serializer, StrategyRegistry,
    WireShape, WireValue,
};

// =============================================================================
// QUALIFIERS
// =============================================================================

fn serialize_qualifiers(
    snak: &dyn Serializer<Snak>,
    qualifiers: &SnakList,
    shape: WireShape,
) -> Result<WireValue, SerializeError> {
    let mut out = Map::new();
    for (property, snaks) in qualifiers.property_groups() {
        let snaks = snaks
            .into_iter()
            .map(|s| snak.serialize(s))
            .collect::<Result<Vec<_>, _>>()?;
        out.insert(property_key(property, shape), WireValue::Array(snaks));
    }
    Ok(WireValue::Object(out))
}

fn deserialize_qualifiers(
    snak: &dyn Deserializer<Snak>,
    wire: Option<&WireValue>,
) -> Result<SnakList, DeserializeError> {
    let mut qualifiers = SnakList::new();
    let Some(wire) = wire else {
        return Ok(qualifiers);
    };
    for (key, snaks) in as_object(wire, "qualifiers")? {
        let property = parse_property(key, "qualifiers")?;
        for s in as_array(snaks, "qualifiers")? {
            let s = snak.deserialize(s)?;
            if s.property() != property {
                return Err(DeserializeError::GroupKeyMismatch {
                    key: key.clone(),
                    property: s.property(),
                });
            }
            qualifiers.push(s);
        }
    }
    Ok(qualifiers)
}

// =============================================================================
// CLAIM
// =============================================================================

pub struct ClaimSerializer {
    shape: WireShape,
    snak: Arc<dyn Serializer<Snak>>,
}

impl ClaimSerializer {
    pub fn from_registry(
        registry: &StrategyRegistry<Serialization>,
        shape: WireShape,
    ) -> Result<Self, RegistryError> {
        Ok(Self {
            shape,
            snak: registry.serializer(&Discriminator::Snak)?,
        })
    }
}

impl Serializer<Claim> for ClaimSerializer {
    fn serialize(&self, claim: &Claim) -> Result<WireValue, SerializeError> {
        let mut out = Map::new();
        out.insert("mainsnak".into(), self.snak.serialize(claim.main_snak())?);
        out.insert("type".into(), "claim".into());
        out.insert(
            "qualifiers".into(),
            serialize_qualifiers(self.snak.as_ref(), claim.qualifiers(), self.shape)?,
        );
        Ok(WireValue::Object(out))
    }
}

pub struct ClaimDeserializer {
    snak: Arc<dyn Deserializer<Snak>>,
}

impl ClaimDeserializer {
    /// Both shapes decode alike; the shape only selects the registry slot.
    pub fn from_registry(
        registry: &StrategyRegistry<Deserialization>,
        _shape: WireShape,
    ) -> Result<Self, RegistryError> {
        Ok(Self {
            snak: registry.deserializer(&Discriminator::Snak)?,
        })
    }
}

impl Deserializer<Claim> for ClaimDeserializer {
    fn deserialize(&self, wire: &WireValue) -> Result<Claim, DeserializeError> {
        let reader = ObjectReader::new(wire, "claim")?;
        let main_snak = self.snak.deserialize(reader.required("mainsnak")?)?;
        let qualifiers = deserialize_qualifiers(self.snak.as_ref(), reader.optional("qualifiers"))?;
        Ok(Claim::new(main_snak, qualifiers))
    }
}

// =============================================================================
// STATEMENT
// =============================================================================

fn deserialize_rank(wire: &WireValue) -> Result<Rank, DeserializeError> {
    match wire {
        WireValue::String(name) => {
            Rank::from_name(name).ok_or_else(|| DeserializeError::UnknownRank { rank: name.clone() })
        }
        WireValue::Number(n) => n
            .as_u64()
            .and_then(Rank::from_ordinal)
            .ok_or_else(|| DeserializeError::UnknownRank { rank: n.to_string() }),
        _ => Err(DeserializeError::malformed("rank", "expected a string or an integer")),
    }
}

pub struct StatementSerializer {
    claim: Arc<dyn Serializer<Claim>>,
    references: Arc<dyn Serializer<ReferenceList>>,
}

impl StatementSerializer {
    pub fn from_registry(
        registry: &StrategyRegistry<Serialization>,
        shape: WireShape,
    ) -> Result<Self, RegistryError> {
        Ok(Self {
            claim: registry.serializer(&Discriminator::Claim(shape))?,
            references: registry.serializer(&Discriminator::ReferenceList)?,
        })
    }
}

impl Serializer<Statement> for StatementSerializer {
    fn serialize(&self, statement: &Statement) -> Result<WireValue, SerializeError> {
        let mut claim = into_object(self.claim.serialize(statement.claim())?, "claim")?;

        let mut out = Map::new();
        if let Some(main_snak) = claim.remove("mainsnak") {
            out.insert("mainsnak".into(), main_snak);
        }
        out.insert("type".into(), "statement".into());
        out.insert("rank".into(), statement.rank().name().into());
        out.insert(
            "qualifiers".into(),
            claim
                .remove("qualifiers")
                .unwrap_or_else(|| WireValue::Object(Map::new())),
        );
        out.insert("references".into(), self.references.serialize(statement.references())?);
        if let Some(guid) = statement.guid() {
            out.insert("id".into(), guid.into());
        }
        Ok(WireValue::Object(out))
    }
}

pub struct StatementDeserializer {
    claim: Arc<dyn Deserializer<Claim>>,
    references: Arc<dyn Deserializer<ReferenceList>>,
}

impl StatementDeserializer {
    pub fn from_registry(
        registry: &StrategyRegistry<Deserialization>,
        shape: WireShape,
    ) -> Result<Self, RegistryError> {
        Ok(Self {
            claim: registry.deserializer(&Discriminator::Claim(shape))?,
            references: registry.deserializer(&Discriminator::ReferenceList)?,
        })
    }
}

impl Deserializer<Statement> for StatementDeserializer {
    fn deserialize(&self, wire: &WireValue) -> Result<Statement, DeserializeError> {
        let reader = ObjectReader::new(wire, "statement")?;
        if let Some(kind) = reader.optional_str("type")? {
            if kind != "statement" {
                return Err(DeserializeError::malformed(
                    "type",
                    format!("expected \"statement\", found {kind:?}"),
                ));
            }
        }

        let claim = self.claim.deserialize(wire)?;
        let rank = deserialize_rank(reader.required("rank")?)?;
        let references = match reader.optional("references") {
            Some(references) => self.references.deserialize(references)?,
            None => ReferenceList::new(),
        };

        let statement = Statement::new(claim, references, rank);
        Ok(match reader.optional_str("id")? {
            Some(guid) => statement.with_guid(guid),
            None => statement,
        })
    }
}

// =============================================================================
// STATEMENT LIST / GROUP
// =============================================================================

pub struct StatementListSerializer {
    statement: Arc<dyn Serializer<Statement>>,
}

impl StatementListSerializer {
    pub fn from_registry(
        registry: &StrategyRegistry<Serialization>,
        shape: WireShape,
    ) -> Result<Self, RegistryError> {
        Ok(Self {
            statement: registry.serializer(&Discriminator::Statement(shape))?,
        })
    }
}

impl Serializer<StatementList> for StatementListSerializer {
    fn serialize(&self, statements: &StatementList) -> Result<WireValue, SerializeError> {
        let out = statements
            .iter()
            .map(|s| self.statement.serialize(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(WireValue::Array(out))
    }
}

pub struct StatementListDeserializer {
    statement: Arc<dyn Deserializer<Statement>>,
}

impl StatementListDeserializer {
    pub fn from_registry(
        registry: &StrategyRegistry<Deserialization>,
        shape: WireShape,
    ) -> Result<Self, RegistryError> {
        Ok(Self {
            statement: registry.deserializer(&Discriminator::Statement(shape))?,
        })
    }
}

impl Deserializer<StatementList> for StatementListDeserializer {
    fn deserialize(&self, wire: &WireValue) -> Result<StatementList, DeserializeError> {
        as_array(wire, "statements")?
            .iter()
            .map(|s| self.statement.deserialize(s))
            .collect()
    }
}

/// A group travels as its statement list; the property is implied.
pub struct StatementGroupSerializer {
    list: Arc<dyn Serializer<StatementList>>,
}

impl StatementGroupSerializer {
    pub fn from_registry(
        registry: &StrategyRegistry<Serialization>,
        shape: WireShape,
    ) -> Result<Self, RegistryError> {
        Ok(Self {
            list: registry.serializer(&Discriminator::StatementList(shape))?,
        })
    }
}

impl Serializer<StatementGroup> for StatementGroupSerializer {
    fn serialize(&self, group: &StatementGroup) -> Result<WireValue, SerializeError> {
        self.list.serialize(group.statements())
    }
}

pub struct StatementGroupDeserializer {
    list: Arc<dyn Deserializer<StatementList>>,
}

impl StatementGroupDeserializer {
    pub fn from_registry(
        registry: &StrategyRegistry<Deserialization>,
        shape: WireShape,
    ) -> Result<Self, RegistryError> {
        Ok(Self {
            list: registry.deserializer(&Discriminator::StatementList(shape))?,
        })
    }
}

impl Deserializer<StatementGroup> for StatementGroupDeserializer {
    fn deserialize(&self, wire: &WireValue) -> Result<StatementGroup, DeserializeError> {
        StatementGroup::new(self.list.deserialize(wire)?).map_err(|e| match e {
            ModelError::MixedStatementGroup { expected, found } => DeserializeError::GroupKeyMismatch {
                key: expected.to_string(),
                property: found,
            },
            other => DeserializeError::malformed("statements", other.to_string()),
        })
    }
}

// =============================================================================
// STATEMENT GROUP SET
// =============================================================================

pub struct StatementGroupSetSerializer {
    shape: WireShape,
    group: Arc<dyn Serializer<StatementGroup>>,
}

impl StatementGroupSetSerializer {
    pub fn from_registry(
        registry: &StrategyRegistry<Serialization>,
        shape: WireShape,
    ) -> Result<Self, RegistryError> {
        Ok(Self {
            shape,
            group: registry.serializer(&Discriminator::StatementGroup(shape))?,
        })
    }
}

impl Serializer<StatementGroupSet> for StatementGroupSetSerializer {
    fn serialize(&self, set: &StatementGroupSet) -> Result<WireValue, SerializeError> {
        let mut out = Map::new();
        for group in set.groups() {
            out.insert(property_key(group.property(), self.shape), self.group.serialize(group)?);
        }
        Ok(WireValue::Object(out))
    }
}

/// Regroups statements by their own main-snak property; the wire key is only
/// checked against it.
pub struct StatementGroupSetDeserializer {
    list: Arc<dyn Deserializer<StatementList>>,
}

impl StatementGroupSetDeserializer {
    pub fn from_registry(
        registry: &StrategyRegistry<Deserialization>,
        shape: WireShape,
    ) -> Result<Self, RegistryError> {
        Ok(Self {
            list: registry.deserializer(&Discriminator::StatementList(shape))?,
        })
    }
}

impl Deserializer<StatementGroupSet> for StatementGroupSetDeserializer {
    fn deserialize(&self, wire: &WireValue) -> Result<StatementGroupSet, DeserializeError> {
        let mut set = StatementGroupSet::new();
        for (key, statements) in as_object(wire, "claims")? {
            let property = parse_property(key, "claims")?;
            for statement in self.list.deserialize(statements)? {
                if statement.property() != property {
                    return Err(DeserializeError::GroupKeyMismatch {
                        key: key.clone(),
                        property: statement.property(),
                    });
                }
                set.add_statement(statement);
            }
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::codec::reference::{
        ReferenceDeserializer, ReferenceListDeserializer, ReferenceListSerializer,
        ReferenceSerializer,
    };
    use crate::codec::snak::{SnakDeserializer, SnakListDeserializer, SnakListSerializer, SnakSerializer};
    use crate::lookup::PropertyTypes;
    use crate::model::{DataValue, ItemId, PropertyId, Reference};

    fn p(n: u64) -> PropertyId {
        PropertyId::new(n).unwrap()
    }

    fn serializers() -> StrategyRegistry<Serialization> {
        let mut r = StrategyRegistry::new();
        r.register_serializer::<Snak, _>(Discriminator::Snak, SnakSerializer).unwrap();
        let s = SnakListSerializer::from_registry(&r).unwrap();
        r.register_serializer::<SnakList, _>(Discriminator::SnakList, s).unwrap();
        let s = ReferenceSerializer::from_registry(&r).unwrap();
        r.register_serializer::<Reference, _>(Discriminator::Reference, s).unwrap();
        let s = ReferenceListSerializer::from_registry(&r).unwrap();
        r.register_serializer::<ReferenceList, _>(Discriminator::ReferenceList, s).unwrap();
        for shape in [WireShape::Current, WireShape::Legacy] {
            let s = ClaimSerializer::from_registry(&r, shape).unwrap();
            r.register_serializer::<Claim, _>(Discriminator::Claim(shape), s).unwrap();
            let s = StatementSerializer::from_registry(&r, shape).unwrap();
            r.register_serializer::<Statement, _>(Discriminator::Statement(shape), s).unwrap();
            let s = StatementListSerializer::from_registry(&r, shape).unwrap();
            r.register_serializer::<StatementList, _>(Discriminator::StatementList(shape), s).unwrap();
            let s = StatementGroupSerializer::from_registry(&r, shape).unwrap();
            r.register_serializer::<StatementGroup, _>(Discriminator::StatementGroup(shape), s).unwrap();
        }
        r
    }

    fn deserializers() -> StrategyRegistry<Deserialization> {
        let lookup = Arc::new(
            PropertyTypes::new()
                .with_property(p(31), "wikibase-item")
                .with_property(p(580), "string")
                .with_property(p(854), "url"),
        );
        let mut r = StrategyRegistry::new();
        r.register_deserializer::<Snak, _>(Discriminator::Snak, SnakDeserializer::new(lookup))
            .unwrap();
        let d = SnakListDeserializer::from_registry(&r).unwrap();
        r.register_deserializer::<SnakList, _>(Discriminator::SnakList, d).unwrap();
        let d = ReferenceDeserializer::from_registry(&r, true).unwrap();
        r.register_deserializer::<Reference, _>(Discriminator::Reference, d).unwrap();
        let d = ReferenceListDeserializer::from_registry(&r).unwrap();
        r.register_deserializer::<ReferenceList, _>(Discriminator::ReferenceList, d).unwrap();
        for shape in [WireShape::Current, WireShape::Legacy] {
            let d = ClaimDeserializer::from_registry(&r, shape).unwrap();
            r.register_deserializer::<Claim, _>(Discriminator::Claim(shape), d).unwrap();
            let d = StatementDeserializer::from_registry(&r, shape).unwrap();
            r.register_deserializer::<Statement, _>(Discriminator::Statement(shape), d).unwrap();
            let d = StatementListDeserializer::from_registry(&r, shape).unwrap();
            r.register_deserializer::<StatementList, _>(Discriminator::StatementList(shape), d)
                .unwrap();
        }
        r
    }

    fn statement() -> Statement {
        let qualifiers: SnakList = [
            Snak::value(p(580), DataValue::String("a".into())),
            Snak::no_value(p(582)),
            Snak::value(p(580), DataValue::String("b".into())),
        ]
        .into_iter()
        .collect();
        let references: ReferenceList = std::iter::once(Reference::new(
            [Snak::value(p(854), DataValue::String("https://example.org".into()))]
                .into_iter()
                .collect(),
        ))
        .collect();
        Statement::new(
            Claim::new(
                Snak::value(p(31), DataValue::EntityId(ItemId::new(5).unwrap().into())),
                qualifiers,
            ),
            references,
            Rank::Preferred,
        )
        .with_guid("Q1$8f2c")
    }

    #[test]
    fn test_statement_wire_form() {
        let ser = StatementSerializer::from_registry(&serializers(), WireShape::Current).unwrap();
        let wire = ser.serialize(&statement()).unwrap();

        let keys: Vec<_> = wire.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["mainsnak", "type", "rank", "qualifiers", "references", "id"]);
        assert_eq!(wire["type"], json!("statement"));
        assert_eq!(wire["rank"], json!("preferred"));
        assert_eq!(wire["id"], json!("Q1$8f2c"));
        let qualifier_keys: Vec<_> = wire["qualifiers"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(qualifier_keys, ["P580", "P582"]);
        assert_eq!(wire["qualifiers"]["P580"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_statement_roundtrip_both_shapes() {
        let ser = serializers();
        let de = deserializers();
        for shape in [WireShape::Current, WireShape::Legacy] {
            let s = ser.serializer::<Statement>(&Discriminator::Statement(shape)).unwrap();
            let d = de.deserializer::<Statement>(&Discriminator::Statement(shape)).unwrap();
            let wire = s.serialize(&statement()).unwrap();
            assert_eq!(d.deserialize(&wire).unwrap(), statement());
        }
    }

    #[test]
    fn test_claim_strategy_must_produce_object() {
        struct ClaimAsString;

        impl Serializer<Claim> for ClaimAsString {
            fn serialize(&self, claim: &Claim) -> Result<WireValue, SerializeError> {
                Ok(claim.property().to_string().into())
            }
        }

        let references = serializers()
            .serializer::<ReferenceList>(&Discriminator::ReferenceList)
            .unwrap();
        let mut r = StrategyRegistry::new();
        r.register_serializer::<Claim, _>(Discriminator::Claim(WireShape::Current), ClaimAsString)
            .unwrap();
        r.register(Discriminator::ReferenceList, references).unwrap();

        let ser = StatementSerializer::from_registry(&r, WireShape::Current).unwrap();
        let err = ser.serialize(&statement()).unwrap_err();
        assert!(matches!(err, SerializeError::UnencodableValue { field: "claim", .. }));
        assert_eq!(err.class().code(), "W001");
    }

    #[test]
    fn test_legacy_qualifier_keys_are_lowercase() {
        let ser = StatementSerializer::from_registry(&serializers(), WireShape::Legacy).unwrap();
        let wire = ser.serialize(&statement()).unwrap();
        assert!(wire["qualifiers"].get("p580").is_some());
        assert!(wire["qualifiers"].get("P580").is_none());
    }

    #[test]
    fn test_claim_wire_form() {
        let ser = ClaimSerializer::from_registry(&serializers(), WireShape::Current).unwrap();
        let claim = Claim::new(Snak::no_value(p(31)), SnakList::new());
        assert_eq!(
            ser.serialize(&claim).unwrap(),
            json!({
                "mainsnak": {"snaktype": "novalue", "property": "P31"},
                "type": "claim",
                "qualifiers": {}
            })
        );
    }

    #[test]
    fn test_rank_forms() {
        assert_eq!(deserialize_rank(&json!("deprecated")).unwrap(), Rank::Deprecated);
        assert_eq!(deserialize_rank(&json!(2)).unwrap(), Rank::Preferred);
        assert_eq!(deserialize_rank(&json!(0)).unwrap(), Rank::Deprecated);
        assert_eq!(
            deserialize_rank(&json!(7)),
            Err(DeserializeError::UnknownRank { rank: "7".into() })
        );
        assert_eq!(
            deserialize_rank(&json!("top")),
            Err(DeserializeError::UnknownRank { rank: "top".into() })
        );
    }

    #[test]
    fn test_missing_rank() {
        let de = StatementDeserializer::from_registry(&deserializers(), WireShape::Current).unwrap();
        let wire = json!({"mainsnak": {"snaktype": "novalue", "property": "P31"}, "type": "statement"});
        assert_eq!(de.deserialize(&wire), Err(DeserializeError::MissingField { field: "rank" }));
    }

    #[test]
    fn test_qualifier_key_mismatch() {
        let de = StatementDeserializer::from_registry(&deserializers(), WireShape::Current).unwrap();
        let wire = json!({
            "mainsnak": {"snaktype": "novalue", "property": "P31"},
            "type": "statement",
            "rank": "normal",
            "qualifiers": {"P580": [{"snaktype": "novalue", "property": "P582"}]}
        });
        assert_eq!(
            de.deserialize(&wire),
            Err(DeserializeError::GroupKeyMismatch { key: "P580".into(), property: p(582) })
        );
    }

    #[test]
    fn test_group_set_regroups_by_statement_property() {
        let ser = serializers();
        let de = deserializers();
        let set_ser = StatementGroupSetSerializer::from_registry(&ser, WireShape::Current).unwrap();
        let set_de = StatementGroupSetDeserializer::from_registry(&de, WireShape::Current).unwrap();

        let other = Statement::new(
            Claim::new(Snak::some_value(p(580)), SnakList::new()),
            ReferenceList::new(),
            Rank::Normal,
        );
        let set: StatementGroupSet = [statement(), other, statement()].into_iter().collect();
        let wire = set_ser.serialize(&set).unwrap();
        let keys: Vec<_> = wire.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["P31", "P580"]);
        assert_eq!(set_de.deserialize(&wire).unwrap(), set);
    }

    #[test]
    fn test_group_set_key_mismatch() {
        let de = StatementGroupSetDeserializer::from_registry(&deserializers(), WireShape::Current)
            .unwrap();
        let wire = json!({
            "P7": [{
                "mainsnak": {"snaktype": "novalue", "property": "P8"},
                "type": "statement",
                "rank": "normal"
            }]
        });
        assert_eq!(
            de.deserialize(&wire),
            Err(DeserializeError::GroupKeyMismatch { key: "P7".into(), property: p(8) })
        );
    }

    #[test]
    fn test_legacy_group_set_accepts_either_case() {
        let de = StatementGroupSetDeserializer::from_registry(&deserializers(), WireShape::Legacy)
            .unwrap();
        let statement = json!({
            "mainsnak": {"snaktype": "novalue", "property": "P31"},
            "type": "statement",
            "rank": "normal"
        });
        for key in ["p31", "P31"] {
            let mut wire = Map::new();
            wire.insert(key.to_string(), json!([statement.clone()]));
            let set = de.deserialize(&WireValue::Object(wire)).unwrap();
            assert_eq!(set.get(p(31)).unwrap().statements().len(), 1);
        }
    }

    #[test]
    fn test_group_rejects_mixed_statements() {
        let mut r = deserializers();
        let d = StatementGroupDeserializer::from_registry(&r, WireShape::Current).unwrap();
        r.register_deserializer::<StatementGroup, _>(Discriminator::StatementGroup(WireShape::Current), d)
            .unwrap();
        let de = r
            .deserializer::<StatementGroup>(&Discriminator::StatementGroup(WireShape::Current))
            .unwrap();
        let wire = json!([
            {"mainsnak": {"snaktype": "novalue", "property": "P1"}, "rank": "normal"},
            {"mainsnak": {"snaktype": "novalue", "property": "P2"}, "rank": "normal"}
        ]);
        assert!(matches!(
            de.deserialize(&wire),
            Err(DeserializeError::GroupKeyMismatch { .. })
        ));
        assert!(matches!(
            de.deserialize(&json!([])),
            Err(DeserializeError::MalformedWireValue { .. })
        ));
    }
}
