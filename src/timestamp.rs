//! Timestamp resolution for matched log text.
//!
//! A rule hands over the substring its capture group matched, plus an
//! optional explicit strftime-style format. Resolution tries the explicit
//! format first and falls back to generic inference over the common log
//! layouts (RFC 3339, RFC 2822, Apache, syslog, Unix epochs, ...).
//! Values carrying no offset are interpreted as UTC.

use jiff::Timestamp;
use jiff::fmt::strtime::BrokenDownTime;
use jiff::tz::TimeZone;

/// Layouts tried by generic inference, most specific first.
///
/// Year-less layouts are completed with the resolver's current year. `%.f`
/// also matches an absent fraction.
const INFERRED_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%d/%b/%Y:%H:%M:%S %z",
    "%a %b %d %H:%M:%S %z %Y",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%a %b %d %H:%M:%S %Y",
    "%b %d %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%y%m%d %H:%M:%S",
    "%Y%m%d%H%M%S",
    "%b %d %H:%M:%S%.f",
    "%a %b %d %H:%M:%S",
];

/// Converts timestamp text into an absolute instant.
///
/// Holds the calendar year used to complete formats that carry none, so
/// resolution is deterministic for a given resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolver {
    current_year: i16,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// Resolver completing year-less timestamps with the current calendar year.
    pub fn new() -> Self {
        Self {
            current_year: jiff::Zoned::now().year(),
        }
    }

    /// Resolver completing year-less timestamps with `year`.
    pub const fn with_year(year: i16) -> Self {
        Self { current_year: year }
    }

    /// Resolve `text`, trying `format` first when given, then generic inference.
    pub fn resolve(&self, text: &str, format: Option<&str>) -> Option<Timestamp> {
        if let Some(format) = format
            && let Some(ts) = self.parse_with_format(text, format)
        {
            return Some(ts);
        }
        self.infer(text)
    }

    /// Parse `text` with an explicit strftime-style `format`.
    ///
    /// Missing year is filled with the resolver's current year; missing
    /// month and day default to January 1st.
    pub fn parse_with_format(&self, text: &str, format: &str) -> Option<Timestamp> {
        let mut tm = BrokenDownTime::parse(format, text).ok()?;
        if tm.month().is_none() {
            tm.set_month(Some(1)).ok()?;
        }
        if tm.day().is_none() {
            tm.set_day(Some(1)).ok()?;
        }
        self.complete_year(&mut tm)?;
        to_instant(&tm)
    }

    /// Fill in a missing year.
    ///
    /// February 29th in a non-leap current year becomes March 1st.
    fn complete_year(&self, tm: &mut BrokenDownTime) -> Option<()> {
        if tm.year().is_some() {
            return Some(());
        }
        tm.set_year(Some(self.current_year)).ok()?;
        if tm.month() == Some(2)
            && tm.day() == Some(29)
            && jiff::civil::Date::new(self.current_year, 2, 29).is_err()
        {
            tm.set_month(Some(3)).ok()?;
            tm.set_day(Some(1)).ok()?;
            // A parsed weekday no longer matches the shifted date
            tm.set_weekday(None);
        }
        Some(())
    }

    /// Infer the layout of `text` and parse it.
    pub fn infer(&self, text: &str) -> Option<Timestamp> {
        let text = normalize(text);
        if text.is_empty() {
            return None;
        }

        if let Some(ts) = parse_epoch(&text) {
            return Some(ts);
        }

        // RFC 3339 / ISO 8601 with offset; jiff handles these natively
        if let Ok(ts) = text.parse::<Timestamp>() {
            return Some(ts);
        }

        if let Ok(zdt) = jiff::fmt::rfc2822::parse(&text) {
            return Some(zdt.timestamp());
        }

        INFERRED_FORMATS.iter().find_map(|format| {
            let mut tm = BrokenDownTime::parse(*format, text.as_str()).ok()?;
            self.complete_year(&mut tm)?;
            to_instant(&tm)
        })
    }
}

/// Convert a parsed broken-down time into an instant, assuming UTC when no
/// offset was parsed.
fn to_instant(tm: &BrokenDownTime) -> Option<Timestamp> {
    if let Ok(ts) = tm.to_timestamp() {
        return Some(ts);
    }
    let dt = tm.to_datetime().ok()?;
    Some(dt.to_zoned(TimeZone::UTC).ok()?.timestamp())
}

/// Strip surrounding brackets, collapse whitespace runs, and turn a
/// comma-separated fraction (`10:00:00,123`) into a dotted one.
fn normalize(text: &str) -> String {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);

    let mut out = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");

    if let Some(comma) = out.rfind(',') {
        let before = out[..comma].chars().last();
        let after = &out[comma + 1..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        if before.is_some_and(|c| c.is_ascii_digit()) && digits > 0 {
            out.replace_range(comma..=comma, ".");
        }
    }
    out
}

/// Parse a Unix epoch, picking the unit by magnitude:
/// - Value < 1e12 → seconds (optionally with a `.fraction`)
/// - Value < 1e15 → milliseconds
/// - Value < 1e18 → microseconds
/// - otherwise → nanoseconds
///
/// Fewer than nine integer digits is not treated as an epoch.
fn parse_epoch(text: &str) -> Option<Timestamp> {
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text, None),
    };
    if int_part.len() < 9 || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if int_part.len() == 14 && frac_part.is_none() {
        // YYYYmmddHHMMSS, not an epoch
        return None;
    }
    let value: i64 = int_part.parse().ok()?;

    if let Some(frac) = frac_part {
        if value >= 1_000_000_000_000 || frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        let digits: String = frac.chars().take(9).collect();
        let nanos: i32 = format!("{digits:0<9}").parse().ok()?;
        return Timestamp::new(value, nanos).ok();
    }

    if value < 1_000_000_000_000 {
        Timestamp::from_second(value).ok()
    } else if value < 1_000_000_000_000_000 {
        Timestamp::from_millisecond(value).ok()
    } else if value < 1_000_000_000_000_000_000 {
        Timestamp::from_microsecond(value).ok()
    } else {
        Timestamp::from_nanosecond(i128::from(value)).ok()
    }
}
