//! Term, alias and fingerprint codecs.
//!
//! | Kind         | Wire form                                   |
//! |--------------|---------------------------------------------|
//! | Term         | `{"language": "en", "value": "Earth"}`      |
//! | TermMap      | `{"en": Term, "de": Term}`                  |
//! | MultiTerm    | `{"en": ["Terra", "Blue Planet"]}`          |
//! | MultiTermMap | `{"en": [...], "de": [...]}`                |
//! | Fingerprint  | `{"labels", "descriptions", "aliases"}`     |

use std::sync::Arc;

use serde_json::{json, Map};

use crate::codec::primitives::{as_array, as_object, as_str, into_object, ObjectReader};
use crate::error::{DeserializeError, RegistryError, SerializeError};
use crate::model::{Fingerprint, MultiTerm, MultiTermMap, Term, TermMap};
use crate::registry::{
    Deserialization, Deserializer, Discriminator, Serialization, Serializer, StrategyRegistry,
    WireValue,
};

/// Reads a required string field of a term, reporting absence as malformed.
fn term_field<'a>(reader: &ObjectReader<'a>, field: &'static str) -> Result<&'a str, DeserializeError> {
    match reader.required_str(field) {
        Err(DeserializeError::MissingField { field }) => {
            Err(DeserializeError::malformed(field, "term field is absent"))
        }
        other => other,
    }
}

// =============================================================================
// TERM
// =============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct TermSerializer;

impl Serializer<Term> for TermSerializer {
    fn serialize(&self, term: &Term) -> Result<WireValue, SerializeError> {
        Ok(json!({
            "language": term.language(),
            "value": term.text(),
        }))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TermDeserializer;

impl Deserializer<Term> for TermDeserializer {
    fn deserialize(&self, wire: &WireValue) -> Result<Term, DeserializeError> {
        let reader = ObjectReader::new(wire, "term")?;
        Ok(Term::new(term_field(&reader, "language")?, term_field(&reader, "value")?))
    }
}

pub struct TermMapSerializer {
    term: Arc<dyn Serializer<Term>>,
}

impl TermMapSerializer {
    pub fn from_registry(registry: &StrategyRegistry<Serialization>) -> Result<Self, RegistryError> {
        Ok(Self {
            term: registry.serializer(&Discriminator::Term)?,
        })
    }
}

impl Serializer<TermMap> for TermMapSerializer {
    fn serialize(&self, terms: &TermMap) -> Result<WireValue, SerializeError> {
        let mut out = Map::new();
        for term in terms {
            out.insert(term.language().to_string(), self.term.serialize(term)?);
        }
        Ok(WireValue::Object(out))
    }
}

pub struct TermMapDeserializer {
    term: Arc<dyn Deserializer<Term>>,
}

impl TermMapDeserializer {
    pub fn from_registry(registry: &StrategyRegistry<Deserialization>) -> Result<Self, RegistryError> {
        Ok(Self {
            term: registry.deserializer(&Discriminator::Term)?,
        })
    }
}

impl Deserializer<TermMap> for TermMapDeserializer {
    fn deserialize(&self, wire: &WireValue) -> Result<TermMap, DeserializeError> {
        let mut terms = TermMap::new();
        for (language, value) in as_object(wire, "terms")? {
            let term = self.term.deserialize(value)?;
            if term.language() != language {
                return Err(DeserializeError::malformed(
                    "language",
                    format!("term keyed {language:?} has language {:?}", term.language()),
                ));
            }
            terms.set(term);
        }
        Ok(terms)
    }
}

// =============================================================================
// MULTI-TERM
// =============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct MultiTermSerializer;

impl Serializer<MultiTerm> for MultiTermSerializer {
    fn serialize(&self, aliases: &MultiTerm) -> Result<WireValue, SerializeError> {
        let mut out = Map::new();
        out.insert(aliases.language().to_string(), json!(aliases.texts()));
        Ok(WireValue::Object(out))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MultiTermDeserializer;

impl Deserializer<MultiTerm> for MultiTermDeserializer {
    fn deserialize(&self, wire: &WireValue) -> Result<MultiTerm, DeserializeError> {
        let map = as_object(wire, "aliases")?;
        let mut entries = map.iter();
        let (Some((language, texts)), None) = (entries.next(), entries.next()) else {
            return Err(DeserializeError::malformed(
                "aliases",
                format!("expected exactly one language, found {}", map.len()),
            ));
        };
        let texts = as_array(texts, "aliases")?
            .iter()
            .map(|t| as_str(t, "aliases").map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MultiTerm::new(language.as_str(), texts))
    }
}

pub struct MultiTermMapSerializer {
    multi_term: Arc<dyn Serializer<MultiTerm>>,
}

impl MultiTermMapSerializer {
    pub fn from_registry(registry: &StrategyRegistry<Serialization>) -> Result<Self, RegistryError> {
        Ok(Self {
            multi_term: registry.serializer(&Discriminator::MultiTerm)?,
        })
    }
}

impl Serializer<MultiTermMap> for MultiTermMapSerializer {
    fn serialize(&self, aliases: &MultiTermMap) -> Result<WireValue, SerializeError> {
        let mut out = Map::new();
        for group in aliases {
            out.extend(into_object(self.multi_term.serialize(group)?, "aliases")?);
        }
        Ok(WireValue::Object(out))
    }
}

pub struct MultiTermMapDeserializer {
    multi_term: Arc<dyn Deserializer<MultiTerm>>,
}

impl MultiTermMapDeserializer {
    pub fn from_registry(registry: &StrategyRegistry<Deserialization>) -> Result<Self, RegistryError> {
        Ok(Self {
            multi_term: registry.deserializer(&Discriminator::MultiTerm)?,
        })
    }
}

impl Deserializer<MultiTermMap> for MultiTermMapDeserializer {
    fn deserialize(&self, wire: &WireValue) -> Result<MultiTermMap, DeserializeError> {
        let mut aliases = MultiTermMap::new();
        for (language, texts) in as_object(wire, "aliases")? {
            let mut entry = Map::new();
            entry.insert(language.clone(), texts.clone());
            aliases.set(self.multi_term.deserialize(&WireValue::Object(entry))?);
        }
        Ok(aliases)
    }
}

// =============================================================================
// FINGERPRINT
// =============================================================================

pub struct FingerprintSerializer {
    terms: Arc<dyn Serializer<TermMap>>,
    aliases: Arc<dyn Serializer<MultiTermMap>>,
}

impl FingerprintSerializer {
    pub fn from_registry(registry: &StrategyRegistry<Serialization>) -> Result<Self, RegistryError> {
        Ok(Self {
            terms: registry.serializer(&Discriminator::TermMap)?,
            aliases: registry.serializer(&Discriminator::MultiTermMap)?,
        })
    }
}

impl Serializer<Fingerprint> for FingerprintSerializer {
    fn serialize(&self, fingerprint: &Fingerprint) -> Result<WireValue, SerializeError> {
        let mut out = Map::new();
        out.insert("labels".into(), self.terms.serialize(&fingerprint.labels)?);
        out.insert("descriptions".into(), self.terms.serialize(&fingerprint.descriptions)?);
        out.insert("aliases".into(), self.aliases.serialize(&fingerprint.aliases)?);
        Ok(WireValue::Object(out))
    }
}

pub struct FingerprintDeserializer {
    terms: Arc<dyn Deserializer<TermMap>>,
    aliases: Arc<dyn Deserializer<MultiTermMap>>,
}

impl FingerprintDeserializer {
    pub fn from_registry(registry: &StrategyRegistry<Deserialization>) -> Result<Self, RegistryError> {
        Ok(Self {
            terms: registry.deserializer(&Discriminator::TermMap)?,
            aliases: registry.deserializer(&Discriminator::MultiTermMap)?,
        })
    }
}

impl Deserializer<Fingerprint> for FingerprintDeserializer {
    fn deserialize(&self, wire: &WireValue) -> Result<Fingerprint, DeserializeError> {
        let reader = ObjectReader::new(wire, "fingerprint")?;
        let mut fingerprint = Fingerprint::new();
        if let Some(labels) = reader.optional("labels") {
            fingerprint.labels = self.terms.deserialize(labels)?;
        }
        if let Some(descriptions) = reader.optional("descriptions") {
            fingerprint.descriptions = self.terms.deserialize(descriptions)?;
        }
        if let Some(aliases) = reader.optional("aliases") {
            fingerprint.aliases = self.aliases.deserialize(aliases)?;
        }
        Ok(fingerprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serializers() -> StrategyRegistry<Serialization> {
        let mut r = StrategyRegistry::new();
        r.register_serializer::<Term, _>(Discriminator::Term, TermSerializer).unwrap();
        r.register_serializer::<MultiTerm, _>(Discriminator::MultiTerm, MultiTermSerializer).unwrap();
        let term_map = TermMapSerializer::from_registry(&r).unwrap();
        r.register_serializer::<TermMap, _>(Discriminator::TermMap, term_map).unwrap();
        let alias_map = MultiTermMapSerializer::from_registry(&r).unwrap();
        r.register_serializer::<MultiTermMap, _>(Discriminator::MultiTermMap, alias_map).unwrap();
        r
    }

    fn deserializers() -> StrategyRegistry<Deserialization> {
        let mut r = StrategyRegistry::new();
        r.register_deserializer::<Term, _>(Discriminator::Term, TermDeserializer).unwrap();
        r.register_deserializer::<MultiTerm, _>(Discriminator::MultiTerm, MultiTermDeserializer).unwrap();
        let term_map = TermMapDeserializer::from_registry(&r).unwrap();
        r.register_deserializer::<TermMap, _>(Discriminator::TermMap, term_map).unwrap();
        let alias_map = MultiTermMapDeserializer::from_registry(&r).unwrap();
        r.register_deserializer::<MultiTermMap, _>(Discriminator::MultiTermMap, alias_map).unwrap();
        r
    }

    fn fingerprint() -> Fingerprint {
        let mut fp = Fingerprint::new();
        fp.set_label(Term::new("en", "Earth"));
        fp.set_label(Term::new("de", "Erde"));
        fp.set_description(Term::new("en", "planet"));
        fp.set_aliases(MultiTerm::new("en", vec!["Terra".into(), "Blue Planet".into()]));
        fp
    }

    #[test]
    fn test_term_wire_form() {
        let wire = TermSerializer.serialize(&Term::new("en", "Earth")).unwrap();
        assert_eq!(wire, json!({"language": "en", "value": "Earth"}));
        assert_eq!(TermDeserializer.deserialize(&wire).unwrap(), Term::new("en", "Earth"));
    }

    #[test]
    fn test_term_missing_or_mistyped_fields() {
        for wire in [
            json!({"language": "en"}),
            json!({"value": "Earth"}),
            json!({"language": "en", "value": 3}),
            json!("Earth"),
        ] {
            assert!(matches!(
                TermDeserializer.deserialize(&wire),
                Err(DeserializeError::MalformedWireValue { .. })
            ));
        }
    }

    #[test]
    fn test_multi_term_wire_form() {
        let aliases = MultiTerm::new("en", vec!["b".into(), "a".into()]);
        let wire = MultiTermSerializer.serialize(&aliases).unwrap();
        assert_eq!(wire, json!({"en": ["b", "a"]}));
        assert_eq!(MultiTermDeserializer.deserialize(&wire).unwrap(), aliases);
    }

    #[test]
    fn test_multi_term_rejects_non_strings() {
        let err = MultiTermDeserializer.deserialize(&json!({"en": ["a", 1]})).unwrap_err();
        assert!(matches!(err, DeserializeError::MalformedWireValue { field: "aliases", .. }));
        assert!(MultiTermDeserializer.deserialize(&json!({})).is_err());
    }

    #[test]
    fn test_term_map_key_must_match_language() {
        let de = TermMapDeserializer::from_registry(&deserializers()).unwrap();
        let err = de
            .deserialize(&json!({"en": {"language": "de", "value": "Erde"}}))
            .unwrap_err();
        assert!(matches!(err, DeserializeError::MalformedWireValue { field: "language", .. }));
    }

    #[test]
    fn test_fingerprint_roundtrip_preserves_order() {
        let ser = FingerprintSerializer::from_registry(&serializers()).unwrap();
        let de = FingerprintDeserializer::from_registry(&deserializers()).unwrap();

        let wire = ser.serialize(&fingerprint()).unwrap();
        let labels: Vec<_> = wire["labels"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(labels, ["en", "de"]);
        assert_eq!(wire["aliases"], json!({"en": ["Terra", "Blue Planet"]}));

        assert_eq!(de.deserialize(&wire).unwrap(), fingerprint());
    }

    #[test]
    fn test_fingerprint_parts_default_to_empty() {
        let de = FingerprintDeserializer::from_registry(&deserializers()).unwrap();
        let fp = de.deserialize(&json!({"labels": {"en": {"language": "en", "value": "x"}}})).unwrap();
        assert_eq!(fp.labels.len(), 1);
        assert!(fp.descriptions.is_empty());
        assert!(fp.aliases.is_empty());
    }

    #[test]
    fn test_composite_requires_registered_leaf() {
        let empty = StrategyRegistry::<Serialization>::new();
        assert!(matches!(
            TermMapSerializer::from_registry(&empty),
            Err(RegistryError::UnregisteredStrategy { .. })
        ));
    }
}
