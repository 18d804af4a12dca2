//! Wikibase timestamp parsing and formatting.
//!
//! Time values carry a signed, zero-padded year of at least four digits
//! followed by month, day and a UTC time of day:
//!
//! ```text
//! +2013-01-01T00:00:00Z
//! -13798000000-00-00T00:00:00Z
//! ```
//!
//! Month and day may be `00` when the value's precision is coarser than a
//! month or a day.

/// Highest precision (one second).
pub const MAX_TIME_PRECISION: u8 = 14;

/// Error type for timestamp parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampParseError {
    pub message: String,
}

impl std::fmt::Display for TimestampParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TimestampParseError {}

fn error(input: &str, what: &str) -> TimestampParseError {
    TimestampParseError {
        message: format!("Invalid timestamp {input:?}: {what}"),
    }
}

/// A parsed timestamp. `month` and `day` are 0 when unspecified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub year: i64,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// Returns true if the given year is a leap year (proleptic Gregorian).
fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Returns the number of days in a given month (1-indexed).
fn days_in_month(year: i64, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

fn two_digits(s: &str, input: &str, what: &str) -> Result<u8, TimestampParseError> {
    if s.len() != 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(error(input, what));
    }
    s.parse().map_err(|_| error(input, what))
}

/// Parses a Wikibase timestamp.
pub fn parse_timestamp(input: &str) -> Result<Timestamp, TimestampParseError> {
    let negative = match input.as_bytes().first() {
        Some(b'+') => false,
        Some(b'-') => true,
        _ => return Err(error(input, "missing sign")),
    };
    let body = &input[1..];
    let (date, time) = body
        .split_once('T')
        .ok_or_else(|| error(input, "missing 'T' separator"))?;
    let time = time
        .strip_suffix('Z')
        .ok_or_else(|| error(input, "missing 'Z' suffix"))?;

    let mut date_parts = date.rsplitn(3, '-');
    let (Some(day), Some(month), Some(year)) =
        (date_parts.next(), date_parts.next(), date_parts.next())
    else {
        return Err(error(input, "expected year-month-day"));
    };
    if year.len() < 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(error(input, "year must have at least four digits"));
    }
    let magnitude: i64 = year
        .parse()
        .map_err(|_| error(input, "year out of range"))?;
    let year = if negative { -magnitude } else { magnitude };

    let month = two_digits(month, input, "bad month")?;
    let day = two_digits(day, input, "bad day")?;
    if month > 12 {
        return Err(error(input, "month out of range"));
    }
    if month == 0 && day != 0 {
        return Err(error(input, "day given without month"));
    }
    if month != 0 && day > days_in_month(year, month) {
        return Err(error(input, "day out of range"));
    }

    let mut clock = time.split(':');
    let (Some(h), Some(m), Some(s), None) = (clock.next(), clock.next(), clock.next(), clock.next())
    else {
        return Err(error(input, "expected hh:mm:ss"));
    };
    let hour = two_digits(h, input, "bad hour")?;
    let minute = two_digits(m, input, "bad minute")?;
    let second = two_digits(s, input, "bad second")?;
    if hour > 23 || minute > 59 || second > 59 {
        return Err(error(input, "time of day out of range"));
    }

    Ok(Timestamp {
        year,
        month,
        day,
        hour,
        minute,
        second,
    })
}

/// Formats a timestamp in canonical form (four-digit minimum year).
pub fn format_timestamp(ts: &Timestamp) -> String {
    let sign = if ts.year < 0 { '-' } else { '+' };
    format!(
        "{}{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        sign,
        ts.year.unsigned_abs(),
        ts.month,
        ts.day,
        ts.hour,
        ts.minute,
        ts.second
    )
}

/// Returns `true` if `s` is a signed decimal such as `+1.5` or `-20`.
pub fn is_signed_decimal(s: &str) -> bool {
    let Some(rest) = s.strip_prefix('+').or_else(|| s.strip_prefix('-')) else {
        return false;
    };
    let (int, frac) = match rest.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (rest, None),
    };
    !int.is_empty()
        && int.bytes().all(|b| b.is_ascii_digit())
        && frac.is_none_or(|f| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()))
}
