//! Wikibase entity serialization: JSON wire codecs for items, properties,
//! statements and terms.
//!
//! Codecs are small strategies registered in a [`registry::StrategyRegistry`]
//! under a [`registry::Discriminator`]. Composite codecs resolve their parts
//! from the registry when they are built, so a factory wires leaves first and
//! entities last. The same strategy set produces both the current wire shape
//! and the legacy shape older consumers expect.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use wikibase_serialization::{
//!     CodecOptions, DeserializerFactory, Entity, ItemBuilder, ItemId, PropertyId, PropertyTypes,
//!     SerializerFactory,
//! };
//! use wikibase_serialization::registry::{Deserializer, Serializer};
//!
//! let p31 = PropertyId::new(31).unwrap();
//! let item: Entity = ItemBuilder::new(ItemId::new(1).unwrap())
//!     .label("en", "Earth")
//!     .statement(p31, |s| s.item_value(ItemId::new(2).unwrap()))
//!     .build()
//!     .into();
//!
//! // Serialize to the current shape
//! let serializer = SerializerFactory::new(CodecOptions::new())
//!     .unwrap()
//!     .new_entity_serializer()
//!     .unwrap();
//! let wire = serializer.serialize(&item).unwrap();
//!
//! // Deserialize; value snaks need the data type of their property
//! let types = PropertyTypes::new().with_property(p31, "wikibase-item");
//! let deserializer = DeserializerFactory::new(CodecOptions::new(), Arc::new(types))
//!     .unwrap()
//!     .new_entity_deserializer()
//!     .unwrap();
//! assert_eq!(deserializer.deserialize(&wire).unwrap(), item);
//!
//! // Pack for storage
//! let blob = wikibase_serialization::encode_blob_compressed(&wire).unwrap();
//! assert_eq!(wikibase_serialization::decode_blob(&blob).unwrap(), wire);
//! ```
//!
//! # Modules
//!
//! - [`model`]: Entities, statements, snaks, terms and site links
//! - [`registry`]: Strategy traits, discriminators and the registry
//! - [`codec`]: Leaf, composite and entity codecs, plus the blob format
//! - [`factory`]: Wired serializer and deserializer factories
//! - [`lookup`]: Property data type lookup for value snaks
//! - [`bridge`]: Entity access for script engines
//! - [`changer`]: Persisting description edits
//! - [`error`]: Error types
//! - [`limits`]: Blob format constants and limits
//!
//! # Wire Shapes
//!
//! Both shapes share every leaf encoding. The legacy shape keys statement
//! groups and qualifiers by lowercase property id (`p31`); deserializers
//! accept either case.

pub mod bridge;
pub mod changer;
pub mod codec;
pub mod error;
pub mod factory;
pub mod limits;
pub mod lookup;
pub mod model;
pub mod registry;
pub mod util;

// Re-export commonly used types at crate root
pub use codec::{decode_blob, encode_blob, encode_blob_compressed, EntityDeserializer, EntitySerializer};
pub use error::{
    BlobError, BridgeError, DeserializeError, ErrorClass, IdParseError, LookupError, ModelError,
    RegistryError, RepoApiError, SerializeError,
};
pub use factory::{CodecOptions, DeserializerFactory, SerializerFactory};
pub use lookup::{DataValueKindLookup, PropertyTypes};
pub use model::{
    Claim, DataValue, DataValueKind, Entity, EntityId, Fingerprint, Item, ItemBuilder, ItemId,
    Property, PropertyId, Rank, Reference, SiteLink, Snak, Statement, StatementBuilder,
    StatementGroupSet, Term,
};
pub use registry::{WireShape, WireValue};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
