//! Serialization strategies for every model kind.
//!
//! Leaf strategies are stateless; composite strategies are built with
//! `from_registry`, resolving their sub-strategies by discriminator. The
//! [`blob`] module packs finished wire values for storage.

pub mod blob;
pub mod entity;
pub mod primitives;
pub mod reference;
pub mod sitelink;
pub mod snak;
pub mod statement;
pub mod term;
pub mod value;

pub use blob::{decode_blob, decompress, encode_blob, encode_blob_compressed, encode_blob_compressed_with_level};
pub use entity::{
    EntityDeserializer, EntitySerializer, ItemDeserializer, ItemSerializer, PropertyDeserializer,
    PropertySerializer,
};
pub use primitives::ObjectReader;
pub use reference::{
    ReferenceDeserializer, ReferenceListDeserializer, ReferenceListSerializer, ReferenceSerializer,
};
pub use sitelink::{SiteLinkDeserializer, SiteLinkSerializer, SiteLinkSetDeserializer, SiteLinkSetSerializer};
pub use snak::{SnakDeserializer, SnakListDeserializer, SnakListSerializer, SnakSerializer};
pub use statement::{
    ClaimDeserializer, ClaimSerializer, StatementDeserializer, StatementGroupDeserializer,
    StatementGroupSerializer, StatementGroupSetDeserializer, StatementGroupSetSerializer,
    StatementListDeserializer, StatementListSerializer, StatementSerializer,
};
pub use term::{
    FingerprintDeserializer, FingerprintSerializer, MultiTermDeserializer, MultiTermMapDeserializer,
    MultiTermMapSerializer, MultiTermSerializer, TermDeserializer, TermMapDeserializer,
    TermMapSerializer, TermSerializer,
};
pub use value::{decode_data_value, encode_data_value};
