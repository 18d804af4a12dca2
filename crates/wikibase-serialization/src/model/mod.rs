//! Data model types for knowledge-base entities.
//!
//! This module contains all the core types the codecs operate on:
//! - Identifiers (items, properties, statement GUIDs)
//! - Terms (labels, descriptions, aliases)
//! - Snaks and data values
//! - Claims, references and statements
//! - Site links
//! - Entities
//! - Builders (ergonomic construction)

pub mod builder;
pub mod entity;
pub mod id;
pub mod sitelink;
pub mod snak;
pub mod statement;
pub mod term;
pub mod value;

pub use builder::{ItemBuilder, StatementBuilder};
pub use entity::{Entity, Item, Property};
pub use id::{ContentHasher, EntityId, GuidGenerator, ItemId, PropertyId, REFERENCE_HASH_LEN};
pub use sitelink::{SiteLink, SiteLinkSet};
pub use snak::{Snak, SnakList};
pub use statement::{
    Claim, Rank, Reference, ReferenceList, Statement, StatementGroup, StatementGroupSet,
    StatementList,
};
pub use term::{Fingerprint, LanguageKeyed, LanguageMap, MultiTerm, MultiTermMap, Term, TermMap};
pub use value::{
    DataValue, DataValueKind, GlobeCoordinateValue, QuantityValue, TimeValue, GREGORIAN_CALENDAR,
};
