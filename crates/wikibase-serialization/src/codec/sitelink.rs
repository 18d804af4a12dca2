//! Site link codecs.
//!
//! A link travels as `{"site": "enwiki", "title": "Earth", "badges": ["Q17437796"]}`;
//! a set as an object keyed by site identifier.

use std::sync::Arc;

use serde_json::{json, Map};

use crate::codec::primitives::{as_object, as_str, ObjectReader};
use crate::error::{DeserializeError, RegistryError, SerializeError};
use crate::model::{ItemId, SiteLink, SiteLinkSet};
use crate::registry::{
    Deserialization, Deserializer, Discriminator, Serialization, Serializer, StrategyRegistry,
    WireValue,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct SiteLinkSerializer;

impl Serializer<SiteLink> for SiteLinkSerializer {
    fn serialize(&self, link: &SiteLink) -> Result<WireValue, SerializeError> {
        let badges: Vec<String> = link.badges().iter().map(ItemId::to_string).collect();
        Ok(json!({
            "site": link.site(),
            "title": link.title(),
            "badges": badges,
        }))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SiteLinkDeserializer;

impl Deserializer<SiteLink> for SiteLinkDeserializer {
    fn deserialize(&self, wire: &WireValue) -> Result<SiteLink, DeserializeError> {
        let reader = ObjectReader::new(wire, "sitelink")?;
        let badges = reader
            .optional_array("badges")?
            .unwrap_or_default()
            .iter()
            .map(|b| {
                as_str(b, "badges")?
                    .parse::<ItemId>()
                    .map_err(|e| DeserializeError::malformed("badges", e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SiteLink::new(reader.required_str("site")?, reader.required_str("title")?).with_badges(badges))
    }
}

pub struct SiteLinkSetSerializer {
    link: Arc<dyn Serializer<SiteLink>>,
}

impl SiteLinkSetSerializer {
    pub fn from_registry(registry: &StrategyRegistry<Serialization>) -> Result<Self, RegistryError> {
        Ok(Self {
            link: registry.serializer(&Discriminator::SiteLink)?,
        })
    }
}

impl Serializer<SiteLinkSet> for SiteLinkSetSerializer {
    fn serialize(&self, links: &SiteLinkSet) -> Result<WireValue, SerializeError> {
        let mut out = Map::new();
        for link in links.iter() {
            out.insert(link.site().to_string(), self.link.serialize(link)?);
        }
        Ok(WireValue::Object(out))
    }
}

/// Each entry's key must equal its `site` field; two entries naming the
/// same site are rejected.
pub struct SiteLinkSetDeserializer {
    link: Arc<dyn Deserializer<SiteLink>>,
}

impl SiteLinkSetDeserializer {
    pub fn from_registry(registry: &StrategyRegistry<Deserialization>) -> Result<Self, RegistryError> {
        Ok(Self {
            link: registry.deserializer(&Discriminator::SiteLink)?,
        })
    }
}

impl Deserializer<SiteLinkSet> for SiteLinkSetDeserializer {
    fn deserialize(&self, wire: &WireValue) -> Result<SiteLinkSet, DeserializeError> {
        let mut links = SiteLinkSet::new();
        for (site, value) in as_object(wire, "sitelinks")? {
            let link = self.link.deserialize(value)?;
            if links.has(link.site()) {
                return Err(DeserializeError::DuplicateSiteLink {
                    site: link.site().to_string(),
                });
            }
            if link.site() != site {
                return Err(DeserializeError::malformed(
                    "site",
                    format!("site link keyed {site:?} has site {:?}", link.site()),
                ));
            }
            links.set(link);
        }
        Ok(links)
    }
}
