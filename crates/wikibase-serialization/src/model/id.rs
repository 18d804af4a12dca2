//! Entity identifiers, statement GUIDs and content hashes.
//!
//! Entity ids are a kind prefix plus a positive numeric id (`Q42`, `P31`).
//! Parsing accepts either case for the prefix since the legacy wire shape keys
//! statement groups by lowercase property ids.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::error::IdParseError;

/// Number of digest bytes kept for a reference hash (40 hex characters).
pub const REFERENCE_HASH_LEN: usize = 20;

/// Identifier of an item entity (`Q<n>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

/// Identifier of a property entity (`P<n>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyId(u64);

impl ItemId {
    /// Creates an item id. Returns `None` for the reserved numeric id 0.
    pub fn new(numeric: u64) -> Option<Self> {
        (numeric != 0).then_some(Self(numeric))
    }

    /// Returns the numeric part of the id.
    pub fn numeric(self) -> u64 {
        self.0
    }
}

impl PropertyId {
    /// Creates a property id. Returns `None` for the reserved numeric id 0.
    pub fn new(numeric: u64) -> Option<Self> {
        (numeric != 0).then_some(Self(numeric))
    }

    /// Returns the numeric part of the id.
    pub fn numeric(self) -> u64 {
        self.0
    }

    /// Lowercase rendering used as a key by the legacy wire shape.
    pub fn to_legacy_key(self) -> String {
        format!("p{}", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.0)
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Splits `s` into an upper-cased prefix character and a validated numeric part.
fn split_prefixed(s: &str) -> Result<(char, u64), IdParseError> {
    let mut chars = s.chars();
    let prefix = chars
        .next()
        .ok_or_else(|| IdParseError::new(s, "empty id"))?
        .to_ascii_uppercase();
    let digits = chars.as_str();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IdParseError::new(s, "numeric part must be ASCII digits"));
    }
    if digits.starts_with('0') {
        return Err(IdParseError::new(s, "numeric part must not have leading zeros"));
    }
    let numeric = digits
        .parse::<u64>()
        .map_err(|_| IdParseError::new(s, "numeric part out of range"))?;
    Ok((prefix, numeric))
}

impl FromStr for ItemId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match split_prefixed(s)? {
            ('Q', n) => Ok(Self(n)),
            _ => Err(IdParseError::new(s, "item ids start with Q")),
        }
    }
}

impl FromStr for PropertyId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match split_prefixed(s)? {
            ('P', n) => Ok(Self(n)),
            _ => Err(IdParseError::new(s, "property ids start with P")),
        }
    }
}

/// Any entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityId {
    Item(ItemId),
    Property(PropertyId),
}

impl EntityId {
    /// The entity type discriminator used on the wire (`"item"`, `"property"`).
    pub fn entity_type(&self) -> &'static str {
        match self {
            EntityId::Item(_) => "item",
            EntityId::Property(_) => "property",
        }
    }

    /// Returns the numeric part of the id.
    pub fn numeric(&self) -> u64 {
        match self {
            EntityId::Item(id) => id.numeric(),
            EntityId::Property(id) => id.numeric(),
        }
    }

    /// Builds an id from the `entity-type` / `numeric-id` pair used by
    /// entity-id data values.
    pub fn from_parts(entity_type: &str, numeric: u64) -> Option<Self> {
        match entity_type {
            "item" => ItemId::new(numeric).map(EntityId::Item),
            "property" => PropertyId::new(numeric).map(EntityId::Property),
            _ => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Item(id) => id.fmt(f),
            EntityId::Property(id) => id.fmt(f),
        }
    }
}

impl FromStr for EntityId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match split_prefixed(s)? {
            ('Q', n) => Ok(EntityId::Item(ItemId(n))),
            ('P', n) => Ok(EntityId::Property(PropertyId(n))),
            _ => Err(IdParseError::new(s, "unknown entity id prefix")),
        }
    }
}

impl From<ItemId> for EntityId {
    fn from(id: ItemId) -> Self {
        EntityId::Item(id)
    }
}

impl From<PropertyId> for EntityId {
    fn from(id: PropertyId) -> Self {
        EntityId::Property(id)
    }
}

/// Mints statement GUIDs of the form `<entity id>$<uuid v4>`.
///
/// The codec never invents statement ids; editing code calls this before
/// handing a new statement to the repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuidGenerator;

impl GuidGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Returns a fresh GUID for a statement on `entity`.
    pub fn new_guid(&self, entity: &EntityId) -> String {
        format!("{}${}", entity, uuid::Uuid::new_v4())
    }
}

/// Incremental hasher over a canonical, length-prefixed byte stream.
///
/// Used to derive reference hashes from their snaks; the stream layout is
/// private to this crate but stable across runs.
#[derive(Debug, Clone, Default)]
pub struct ContentHasher {
    inner: Sha256,
}

impl ContentHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a single tag byte.
    pub fn tag(&mut self, tag: u8) -> &mut Self {
        self.inner.update([tag]);
        self
    }

    /// Writes a length-prefixed string.
    pub fn str(&mut self, s: &str) -> &mut Self {
        self.inner.update((s.len() as u64).to_le_bytes());
        self.inner.update(s.as_bytes());
        self
    }

    pub fn u64(&mut self, v: u64) -> &mut Self {
        self.inner.update(v.to_le_bytes());
        self
    }

    pub fn f64(&mut self, v: f64) -> &mut Self {
        self.inner.update(v.to_bits().to_le_bytes());
        self
    }

    /// Writes an optional string, distinguishing `None` from `Some("")`.
    pub fn opt_str(&mut self, s: Option<&str>) -> &mut Self {
        match s {
            Some(s) => self.tag(1).str(s),
            None => self.tag(0),
        }
    }

    /// Finishes the digest as lowercase hex of the first [`REFERENCE_HASH_LEN`] bytes.
    pub fn finish_hex(self) -> String {
        let digest = self.inner.finalize();
        let mut s = String::with_capacity(REFERENCE_HASH_LEN * 2);
        for byte in &digest[..REFERENCE_HASH_LEN] {
            s.push_str(&format!("{:02x}", byte));
        }
        s
    }
}
