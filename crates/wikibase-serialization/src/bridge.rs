//! Entity access for an embedded script engine.
//!
//! [`ScriptBridge`] answers the handful of calls scripts make (`getEntity`,
//! `getLabel`, ...) on top of an entity store and a site link table. Entities
//! are handed out in wire form, in either shape. Every failure collapses into
//! one of two [`BridgeError`] message keys.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::codec::EntitySerializer;
use crate::error::{BridgeError, RegistryError};
use crate::factory::{CodecOptions, SerializerFactory};
use crate::model::{Entity, EntityId, ItemId, SiteLink};
use crate::registry::{WireShape, WireValue};

/// Read access to stored entities.
pub trait EntityLookup: Send + Sync {
    fn entity(&self, id: EntityId) -> Option<Entity>;
}

/// Read access to the site link table.
pub trait SiteLinkLookup: Send + Sync {
    /// The item a page on `site` is linked to.
    fn item_for_link(&self, site: &str, title: &str) -> Option<ItemId>;

    fn links_for_item(&self, item: ItemId) -> Vec<SiteLink>;
}

/// Client-wiki settings visible to the bridge.
#[derive(Debug, Clone, Default)]
pub struct BridgeSettings {
    /// Global id of the wiki the scripts run on (`enwiki`).
    pub global_site_id: String,
    pub content_language: String,
    /// Tried in order when the content language has no label.
    pub fallback_languages: Vec<String>,
    pub settings: FxHashMap<String, WireValue>,
}

impl BridgeSettings {
    pub fn new(global_site_id: impl Into<String>, content_language: impl Into<String>) -> Self {
        Self {
            global_site_id: global_site_id.into(),
            content_language: content_language.into(),
            ..Self::default()
        }
    }

    pub fn with_fallback_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fallback_languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_setting(mut self, name: impl Into<String>, value: WireValue) -> Self {
        self.settings.insert(name.into(), value);
        self
    }
}

pub struct ScriptBridge {
    entities: Arc<dyn EntityLookup>,
    site_links: Arc<dyn SiteLinkLookup>,
    serializer: EntitySerializer,
    settings: BridgeSettings,
}

impl ScriptBridge {
    pub fn new(
        entities: Arc<dyn EntityLookup>,
        site_links: Arc<dyn SiteLinkLookup>,
        settings: BridgeSettings,
    ) -> Result<Self, RegistryError> {
        let serializer = SerializerFactory::new(CodecOptions::new())?.new_entity_serializer()?;
        Ok(Self {
            entities,
            site_links,
            serializer,
            settings,
        })
    }

    /// Serialized entity, or `None` when no such entity exists.
    pub fn get_entity(&self, id: &str, legacy_style: bool) -> Result<Option<WireValue>, BridgeError> {
        let id = parse_entity_id(id)?;
        let Some(entity) = self.entities.entity(id) else {
            return Ok(None);
        };
        let shape = WireShape::from_legacy_flag(legacy_style);
        self.serializer
            .serialize_shaped(&entity, shape)
            .map(Some)
            .map_err(|e| {
                tracing::warn!(%id, %shape, error = %e, "entity serialization failed");
                BridgeError::SerializeError { detail: e.to_string() }
            })
    }

    /// Label in the content language, else in the first fallback language
    /// that has one.
    pub fn get_label(&self, id: &str) -> Result<Option<String>, BridgeError> {
        let id = parse_entity_id(id)?;
        let Some(entity) = self.entities.entity(id) else {
            return Ok(None);
        };
        let fingerprint = entity.fingerprint();
        let label = std::iter::once(&self.settings.content_language)
            .chain(&self.settings.fallback_languages)
            .find_map(|language| fingerprint.label(language));
        Ok(label.map(|term| term.text().to_string()))
    }

    /// Id of the item linked to `page_title` on this wiki.
    pub fn get_entity_id(&self, page_title: &str) -> Option<String> {
        self.site_links
            .item_for_link(&self.settings.global_site_id, page_title)
            .map(|id| id.to_string())
    }

    /// Title of this wiki's page linked to item `id`.
    pub fn get_site_link_page_name(&self, id: &str) -> Result<Option<String>, BridgeError> {
        let EntityId::Item(item) = parse_entity_id(id)? else {
            return Ok(None);
        };
        Ok(self
            .site_links
            .links_for_item(item)
            .into_iter()
            .find(|link| link.site() == self.settings.global_site_id)
            .map(|link| link.title().to_string()))
    }

    pub fn get_setting(&self, name: &str) -> Option<&WireValue> {
        self.settings.settings.get(name)
    }

    pub fn get_global_site_id(&self) -> &str {
        &self.settings.global_site_id
    }
}

fn parse_entity_id(id: &str) -> Result<EntityId, BridgeError> {
    id.parse::<EntityId>().map_err(|e| {
        tracing::warn!(input = id, error = %e, "script passed an invalid entity id");
        BridgeError::InvalidEntityId(e)
    })
}
