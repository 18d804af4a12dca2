//! Utility modules.

pub mod time;

pub use time::{
    format_timestamp, is_signed_decimal, parse_timestamp, Timestamp, TimestampParseError,
    MAX_TIME_PRECISION,
};
