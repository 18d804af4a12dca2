//! Property data types and the value kinds they imply.
//!
//! Decoding a value snak's `datavalue` requires knowing the property's
//! declared data type; the wire payload alone is not authoritative for
//! legacy data. Deserializers consult a [`DataValueKindLookup`] for that.

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

use crate::codec::value::data_value_tag;
use crate::error::LookupError;
use crate::model::{DataValueKind, PropertyId};
use crate::registry::WireValue;

lazy_static! {
    /// Built-in data types and the value kind each one stores.
    static ref BUILTIN_DATA_TYPES: FxHashMap<&'static str, DataValueKind> = {
        let mut m = FxHashMap::default();
        m.insert("wikibase-item", DataValueKind::EntityId);
        m.insert("wikibase-property", DataValueKind::EntityId);
        m.insert("string", DataValueKind::String);
        m.insert("external-id", DataValueKind::String);
        m.insert("url", DataValueKind::String);
        m.insert("commonsMedia", DataValueKind::String);
        m.insert("geo-shape", DataValueKind::String);
        m.insert("tabular-data", DataValueKind::String);
        m.insert("math", DataValueKind::String);
        m.insert("musical-notation", DataValueKind::String);
        m.insert("time", DataValueKind::Time);
        m.insert("quantity", DataValueKind::Quantity);
        m.insert("globe-coordinate", DataValueKind::GlobeCoordinate);
        m.insert("monolingualtext", DataValueKind::MonolingualText);
        m
    };
}

/// Returns the value kind stored by a built-in data type.
pub fn builtin_value_kind(data_type: &str) -> Option<DataValueKind> {
    BUILTIN_DATA_TYPES.get(data_type).copied()
}

/// Data type recorded for a property seen only through a value of `kind`.
fn data_type_for_kind(kind: DataValueKind) -> &'static str {
    match kind {
        DataValueKind::String => "string",
        DataValueKind::EntityId => "wikibase-item",
        DataValueKind::Time => "time",
        DataValueKind::Quantity => "quantity",
        DataValueKind::GlobeCoordinate => "globe-coordinate",
        DataValueKind::MonolingualText => "monolingualtext",
    }
}

/// Maps a property to the kind of data value its snaks carry.
pub trait DataValueKindLookup: Send + Sync {
    fn data_value_kind(&self, property: PropertyId) -> Result<DataValueKind, LookupError>;
}

/// In-memory table of property data types.
#[derive(Debug, Clone, Default)]
pub struct PropertyTypes {
    properties: FxHashMap<PropertyId, String>,
    custom_types: FxHashMap<String, DataValueKind>,
}

impl PropertyTypes {
    /// Creates a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a property with its data type id (e.g. `wikibase-item`).
    pub fn add_property(&mut self, id: PropertyId, data_type: impl Into<String>) {
        self.properties.insert(id, data_type.into());
    }

    /// Builder form of [`add_property`](Self::add_property).
    pub fn with_property(mut self, id: PropertyId, data_type: impl Into<String>) -> Self {
        self.add_property(id, data_type);
        self
    }

    /// Registers a data type not in the built-in table.
    pub fn add_data_type(&mut self, data_type: impl Into<String>, kind: DataValueKind) {
        self.custom_types.insert(data_type.into(), kind);
    }

    /// Gets the data type of a property, if registered.
    pub fn data_type(&self, id: PropertyId) -> Option<&str> {
        self.properties.get(&id).map(String::as_str)
    }

    /// Records the data types visible in one wire entity and returns how many
    /// properties were new.
    ///
    /// A property entity contributes its own `datatype`. Every snak under
    /// `claims` contributes its `datatype` field when present, else a data type
    /// matching its `datavalue` tag. Already known properties are kept, and
    /// anything unreadable is skipped.
    pub fn learn_from_wire(&mut self, entity: &WireValue) -> usize {
        let before = self.properties.len();
        if entity.get("type").and_then(WireValue::as_str) == Some("property") {
            let id = entity.get("id").and_then(WireValue::as_str).and_then(|s| s.parse().ok());
            let data_type = entity.get("datatype").and_then(WireValue::as_str);
            if let (Some(id), Some(data_type)) = (id, data_type) {
                self.properties.entry(id).or_insert_with(|| data_type.to_string());
            }
        }
        let statements = entity
            .get("claims")
            .and_then(WireValue::as_object)
            .into_iter()
            .flat_map(|claims| claims.values())
            .filter_map(WireValue::as_array)
            .flatten();
        for statement in statements {
            self.learn_snak(statement.get("mainsnak"));
            let qualifiers = statement
                .get("qualifiers")
                .and_then(WireValue::as_object)
                .into_iter()
                .flat_map(|q| q.values());
            let references = statement
                .get("references")
                .and_then(WireValue::as_array)
                .into_iter()
                .flatten()
                .filter_map(|r| r.get("snaks"));
            for snaks in qualifiers.chain(references).filter_map(WireValue::as_array) {
                for snak in snaks {
                    self.learn_snak(Some(snak));
                }
            }
        }
        self.properties.len() - before
    }

    fn learn_snak(&mut self, snak: Option<&WireValue>) {
        let Some(snak) = snak else { return };
        let Some(property) = snak
            .get("property")
            .and_then(WireValue::as_str)
            .and_then(|s| s.parse::<PropertyId>().ok())
        else {
            return;
        };
        if self.properties.contains_key(&property) {
            return;
        }
        let data_type = match snak.get("datatype").and_then(WireValue::as_str) {
            Some(data_type) => data_type,
            None => match snak.get("datavalue").map(data_value_tag) {
                Some(Ok(Some(kind))) => data_type_for_kind(kind),
                _ => return,
            },
        };
        self.properties.insert(property, data_type.to_string());
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl DataValueKindLookup for PropertyTypes {
    fn data_value_kind(&self, property: PropertyId) -> Result<DataValueKind, LookupError> {
        let data_type = self
            .data_type(property)
            .ok_or(LookupError::PropertyTypeUnknown { property })?;
        self.custom_types
            .get(data_type)
            .copied()
            .or_else(|| builtin_value_kind(data_type))
            .ok_or_else(|| LookupError::UnknownDataType {
                property,
                data_type: data_type.to_string(),
            })
    }
}
