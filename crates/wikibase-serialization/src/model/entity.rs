//! Top-level entities: items and properties.

use crate::model::id::{EntityId, ItemId, PropertyId};
use crate::model::sitelink::SiteLinkSet;
use crate::model::statement::StatementGroupSet;
use crate::model::term::Fingerprint;

/// An item: terms, statements and site links.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub fingerprint: Fingerprint,
    pub statements: StatementGroupSet,
    pub site_links: SiteLinkSet,
}

impl Item {
    /// Creates an empty item.
    pub fn new(id: ItemId) -> Self {
        Self {
            id,
            fingerprint: Fingerprint::new(),
            statements: StatementGroupSet::new(),
            site_links: SiteLinkSet::new(),
        }
    }
}

/// A property: terms, statements and the id of its data type.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub id: PropertyId,
    /// Data type id such as `wikibase-item` or `string`.
    pub data_type: String,
    pub fingerprint: Fingerprint,
    pub statements: StatementGroupSet,
}

impl Property {
    /// Creates an empty property of the given data type.
    pub fn new(id: PropertyId, data_type: impl Into<String>) -> Self {
        Self {
            id,
            data_type: data_type.into(),
            fingerprint: Fingerprint::new(),
            statements: StatementGroupSet::new(),
        }
    }
}

/// Any entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Item(Item),
    Property(Property),
}

impl Entity {
    /// The entity kind discriminator (`"item"`, `"property"`).
    pub fn kind(&self) -> &'static str {
        self.id().entity_type()
    }

    pub fn id(&self) -> EntityId {
        match self {
            Entity::Item(item) => EntityId::Item(item.id),
            Entity::Property(property) => EntityId::Property(property.id),
        }
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        match self {
            Entity::Item(item) => &item.fingerprint,
            Entity::Property(property) => &property.fingerprint,
        }
    }

    pub fn fingerprint_mut(&mut self) -> &mut Fingerprint {
        match self {
            Entity::Item(item) => &mut item.fingerprint,
            Entity::Property(property) => &mut property.fingerprint,
        }
    }

    pub fn statements(&self) -> &StatementGroupSet {
        match self {
            Entity::Item(item) => &item.statements,
            Entity::Property(property) => &property.statements,
        }
    }

    /// Site links, for entity kinds that have them.
    pub fn site_links(&self) -> Option<&SiteLinkSet> {
        match self {
            Entity::Item(item) => Some(&item.site_links),
            Entity::Property(_) => None,
        }
    }
}

impl From<Item> for Entity {
    fn from(item: Item) -> Self {
        Entity::Item(item)
    }
}

impl From<Property> for Entity {
    fn from(property: Property) -> Self {
        Entity::Property(property)
    }
}
