//! Typed data values carried by value snaks.

use crate::model::id::{ContentHasher, EntityId};
use crate::util::{format_timestamp, Timestamp};

/// Kinds of data values, named by their wire `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataValueKind {
    String,
    EntityId,
    Time,
    Quantity,
    GlobeCoordinate,
    MonolingualText,
}

impl DataValueKind {
    /// Returns the wire tag of this kind.
    pub fn wire_tag(self) -> &'static str {
        match self {
            DataValueKind::String => "string",
            DataValueKind::EntityId => "wikibase-entityid",
            DataValueKind::Time => "time",
            DataValueKind::Quantity => "quantity",
            DataValueKind::GlobeCoordinate => "globecoordinate",
            DataValueKind::MonolingualText => "monolingualtext",
        }
    }

    /// Parses a wire tag.
    pub fn from_wire_tag(tag: &str) -> Option<DataValueKind> {
        match tag {
            "string" => Some(DataValueKind::String),
            "wikibase-entityid" => Some(DataValueKind::EntityId),
            "time" => Some(DataValueKind::Time),
            "quantity" => Some(DataValueKind::Quantity),
            "globecoordinate" => Some(DataValueKind::GlobeCoordinate),
            "monolingualtext" => Some(DataValueKind::MonolingualText),
            _ => None,
        }
    }

    fn hash_tag(self) -> u8 {
        match self {
            DataValueKind::String => 1,
            DataValueKind::EntityId => 2,
            DataValueKind::Time => 3,
            DataValueKind::Quantity => 4,
            DataValueKind::GlobeCoordinate => 5,
            DataValueKind::MonolingualText => 6,
        }
    }
}

/// Concept URI of the proleptic Gregorian calendar.
pub const GREGORIAN_CALENDAR: &str = "http://www.wikidata.org/entity/Q1985727";

/// A point in time with calendar model and precision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeValue {
    /// Timestamp such as `+2013-01-01T00:00:00Z`.
    pub time: String,
    /// Offset from UTC in minutes.
    pub timezone: i32,
    pub before: u32,
    pub after: u32,
    /// 0 (billion years) ..= 14 (second).
    pub precision: u8,
    /// Concept URI of the calendar model.
    pub calendar_model: String,
}

impl TimeValue {
    /// A UTC value in the Gregorian calendar with no uncertainty bounds.
    pub fn gregorian(timestamp: &Timestamp, precision: u8) -> Self {
        Self {
            time: format_timestamp(timestamp),
            timezone: 0,
            before: 0,
            after: 0,
            precision,
            calendar_model: GREGORIAN_CALENDAR.to_string(),
        }
    }
}

/// A decimal amount with optional bounds and a unit URI (`"1"` for unitless).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantityValue {
    pub amount: String,
    pub unit: String,
    pub upper_bound: Option<String>,
    pub lower_bound: Option<String>,
}

/// WGS84-style coordinate on a globe.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobeCoordinateValue {
    pub latitude: f64,
    pub longitude: f64,
    pub precision: Option<f64>,
    /// Concept URI of the globe.
    pub globe: String,
}

/// A typed value attached to a value snak.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    String(String),
    EntityId(EntityId),
    Time(TimeValue),
    Quantity(QuantityValue),
    GlobeCoordinate(GlobeCoordinateValue),
    MonolingualText { language: String, text: String },
}

impl DataValue {
    /// Returns the kind of this value.
    pub fn kind(&self) -> DataValueKind {
        match self {
            DataValue::String(_) => DataValueKind::String,
            DataValue::EntityId(_) => DataValueKind::EntityId,
            DataValue::Time(_) => DataValueKind::Time,
            DataValue::Quantity(_) => DataValueKind::Quantity,
            DataValue::GlobeCoordinate(_) => DataValueKind::GlobeCoordinate,
            DataValue::MonolingualText { .. } => DataValueKind::MonolingualText,
        }
    }

    /// Feeds a canonical rendering of this value into `hasher`.
    pub(crate) fn hash_into(&self, hasher: &mut ContentHasher) {
        hasher.tag(self.kind().hash_tag());
        match self {
            DataValue::String(s) => {
                hasher.str(s);
            }
            DataValue::EntityId(id) => {
                hasher.str(id.entity_type()).u64(id.numeric());
            }
            DataValue::Time(t) => {
                hasher
                    .str(&t.time)
                    .u64(t.timezone as i64 as u64)
                    .u64(u64::from(t.before))
                    .u64(u64::from(t.after))
                    .tag(t.precision)
                    .str(&t.calendar_model);
            }
            DataValue::Quantity(q) => {
                hasher
                    .str(&q.amount)
                    .str(&q.unit)
                    .opt_str(q.upper_bound.as_deref())
                    .opt_str(q.lower_bound.as_deref());
            }
            DataValue::GlobeCoordinate(g) => {
                hasher.f64(g.latitude).f64(g.longitude);
                match g.precision {
                    Some(p) => hasher.tag(1).f64(p),
                    None => hasher.tag(0),
                };
                hasher.str(&g.globe);
            }
            DataValue::MonolingualText { language, text } => {
                hasher.str(language).str(text);
            }
        }
    }
}
