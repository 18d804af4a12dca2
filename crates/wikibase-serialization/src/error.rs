//! Error types for entity serialization, deserialization and wiring.

use thiserror::Error;

use crate::model::PropertyId;

/// Failure classes, used by collaborators to decide user-visible behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// W001: Structurally wrong input (missing or mistyped field)
    MalformedWireValue,
    /// W002: A discriminator value that is not recognized
    UnknownVariant,
    /// W003: Internally inconsistent payload
    ConsistencyViolation,
    /// W004: Strategy wiring error (a bug, not a data error)
    Registry,
}

impl ErrorClass {
    /// Returns the error code string (e.g., "W001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorClass::MalformedWireValue => "W001",
            ErrorClass::UnknownVariant => "W002",
            ErrorClass::ConsistencyViolation => "W003",
            ErrorClass::Registry => "W004",
        }
    }
}

/// Error while wiring or resolving codec strategies.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("[W004] no strategy registered for {discriminator}")]
    UnregisteredStrategy { discriminator: String },

    #[error("[W004] a strategy is already registered for {discriminator}")]
    DuplicateStrategy { discriminator: String },

    #[error("[W004] strategy registered for {discriminator} does not handle {expected}")]
    StrategyTypeMismatch {
        discriminator: String,
        expected: &'static str,
    },
}

/// Error during serialization of a model value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SerializeError {
    #[error("[W001] cannot encode {field}: {reason}")]
    UnencodableValue { field: &'static str, reason: String },

    #[error("[W002] unsupported entity kind: {kind}")]
    UnsupportedEntityKind { kind: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl SerializeError {
    pub(crate) fn unencodable(field: &'static str, reason: impl Into<String>) -> Self {
        SerializeError::UnencodableValue {
            field,
            reason: reason.into(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            SerializeError::UnencodableValue { .. } => ErrorClass::MalformedWireValue,
            SerializeError::UnsupportedEntityKind { .. } => ErrorClass::UnknownVariant,
            SerializeError::Registry(_) => ErrorClass::Registry,
        }
    }
}

/// Error during deserialization of a wire value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeserializeError {
    // === W001: Malformed wire value ===
    #[error("[W001] malformed {field}: {reason}")]
    MalformedWireValue { field: &'static str, reason: String },

    #[error("[W001] missing field: {field}")]
    MissingField { field: &'static str },

    // === W002: Unknown variant ===
    #[error("[W002] unknown snak type: {snaktype}")]
    UnknownSnakType { snaktype: String },

    #[error("[W002] unsupported entity kind: {kind}")]
    UnsupportedEntityKind { kind: String },

    #[error("[W002] unknown rank: {rank}")]
    UnknownRank { rank: String },

    // === W003: Consistency violation ===
    #[error("[W003] reference hash mismatch: wire says {found}, snaks hash to {expected}")]
    ReferenceHashMismatch { expected: String, found: String },

    #[error("[W003] statement group key {key} holds a statement about {property}")]
    GroupKeyMismatch { key: String, property: PropertyId },

    #[error("[W003] duplicate site link for {site}")]
    DuplicateSiteLink { site: String },

    // === W004: Registry ===
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl DeserializeError {
    pub(crate) fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        DeserializeError::MalformedWireValue {
            field,
            reason: reason.into(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            DeserializeError::MalformedWireValue { .. } | DeserializeError::MissingField { .. } => {
                ErrorClass::MalformedWireValue
            }
            DeserializeError::UnknownSnakType { .. }
            | DeserializeError::UnsupportedEntityKind { .. }
            | DeserializeError::UnknownRank { .. } => ErrorClass::UnknownVariant,
            DeserializeError::ReferenceHashMismatch { .. }
            | DeserializeError::GroupKeyMismatch { .. }
            | DeserializeError::DuplicateSiteLink { .. } => ErrorClass::ConsistencyViolation,
            DeserializeError::Registry(_) => ErrorClass::Registry,
        }
    }
}

/// The value-type lookup does not know a property.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("data type of property {property} is unknown")]
    PropertyTypeUnknown { property: PropertyId },

    #[error("property {property} has data type {data_type}, which has no known value kind")]
    UnknownDataType {
        property: PropertyId,
        data_type: String,
    },
}

impl From<LookupError> for DeserializeError {
    fn from(e: LookupError) -> Self {
        DeserializeError::malformed("datavalue", e.to_string())
    }
}

/// A string is not a valid entity id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid entity id {input:?}: {reason}")]
pub struct IdParseError {
    pub input: String,
    pub reason: &'static str,
}

impl IdParseError {
    pub(crate) fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// Violation of a model invariant by editing code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("statement already has GUID {existing}")]
    GuidAlreadyAssigned { existing: String },

    #[error("statement group must not be empty")]
    EmptyStatementGroup,

    #[error("statement group for {expected} contains a statement about {found}")]
    MixedStatementGroup {
        expected: PropertyId,
        found: PropertyId,
    },
}

/// Error while packing or unpacking a storage blob.
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("invalid blob magic: expected WBE1 or WBEZ, found {found:?}")]
    InvalidMagic { found: Vec<u8> },

    #[error("unexpected end of blob while reading {context}")]
    UnexpectedEof { context: &'static str },

    #[error("varint exceeds maximum length")]
    VarintTooLong,

    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("zstd compression failed: {0}")]
    CompressionFailed(String),

    #[error("zstd decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("decompressed size {actual} doesn't match declared {declared}")]
    UncompressedSizeMismatch { declared: usize, actual: usize },

    #[error("blob payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// User-facing failure of a scripting bridge call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BridgeError {
    #[error("wikibase-error-invalid-entity-id")]
    InvalidEntityId(#[source] IdParseError),

    #[error("wikibase-error-serialize-error")]
    SerializeError { detail: String },
}

impl BridgeError {
    /// The message key shown to script authors.
    pub fn message_key(&self) -> &'static str {
        match self {
            BridgeError::InvalidEntityId(_) => "wikibase-error-invalid-entity-id",
            BridgeError::SerializeError { .. } => "wikibase-error-serialize-error",
        }
    }
}

/// A repository API call was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("repository API error: {code}")]
pub struct RepoApiError {
    pub code: String,
}

impl RepoApiError {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}
