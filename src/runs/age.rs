//! Parsing of the `--age` time window, e.g. `5d:12h`.
//!
//! An age is `<from>[:<to>]`. Each side is a whole number immediately
//! followed by a unit, and both are measured backwards from now, so `from`
//! must be the larger of the two.

use chrono::{DateTime, Duration, Utc};

use super::{Result, RunsError};

/// Accepted units, as shown in error messages.
pub const AGE_UNITS: &str = "'w' (weeks), 'd' (days), 'h' (hours) or 'm' (minutes)";

const MINUTES_PER_WEEK: u64 = 7 * MINUTES_PER_DAY;
const MINUTES_PER_DAY: u64 = 24 * MINUTES_PER_HOUR;
const MINUTES_PER_HOUR: u64 = 60;

/// A window of time in minutes before now. Zero means "no bound".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgeRange {
    pub from: u64,
    pub to: u64,
}

impl AgeRange {
    /// No time bounds at all.
    pub const UNBOUNDED: AgeRange = AgeRange { from: 0, to: 0 };

    /// The oldest instant included, if bounded.
    pub fn from_instant(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        minutes_before(now, self.from)
    }

    /// The newest instant included, if bounded.
    pub fn to_instant(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        minutes_before(now, self.to)
    }
}

fn minutes_before(now: DateTime<Utc>, minutes: u64) -> Option<DateTime<Utc>> {
    if minutes == 0 {
        return None;
    }
    let minutes = i64::try_from(minutes).ok()?;
    now.checked_sub_signed(Duration::try_minutes(minutes)?)
}

/// Resolve the user's age flag, which may be omitted only when a run name
/// narrows the query instead.
pub fn resolve_age(age: &str, run_name: Option<&str>) -> Result<AgeRange> {
    let age = age.trim();
    if age.is_empty() {
        return match run_name {
            Some(name) if !name.is_empty() => Ok(AgeRange::UNBOUNDED),
            _ => Err(RunsError::AgeOrRunNameRequired),
        };
    }
    parse_age(age)
}

/// Parse `<from>[:<to>]` into minute offsets. `from` must reach back no
/// further than the calendar can represent.
pub fn parse_age(age: &str) -> Result<AgeRange> {
    let parts: Vec<&str> = age.split(':').collect();
    if parts.len() > 2 {
        return Err(format_error(age));
    }

    let from = parse_part(parts[0], age)?;
    if from == 0 || minutes_before(Utc::now(), from).is_none() {
        return Err(format_error(age));
    }

    let to = match parts.get(1) {
        Some(part) => parse_part(part, age)?,
        None => 0,
    };

    if from <= to {
        return Err(RunsError::AgeOrdering { age: age.to_string() });
    }

    Ok(AgeRange { from, to })
}

/// Parse one `<digits><unit>` side into minutes.
fn parse_part(part: &str, age: &str) -> Result<u64> {
    let digits_end = part
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(part.len());
    let (digits, rest) = part.split_at(digits_end);
    if digits.is_empty() {
        return Err(format_error(age));
    }

    let value: u64 = digits.parse().map_err(|_| format_error(age))?;

    let mut chars = rest.chars();
    let multiplier = match chars.next() {
        Some('w') => MINUTES_PER_WEEK,
        Some('d') => MINUTES_PER_DAY,
        Some('h') => MINUTES_PER_HOUR,
        Some('m') => 1,
        _ => return Err(format_error(age)),
    };

    let trailing = chars.as_str();
    if !trailing.is_empty() {
        // "3d2d" is a missing colon rather than stray text.
        if trailing.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(format_error(age));
        }
        return Err(RunsError::AgeTrailingCharacters {
            age: age.to_string(),
            units: AGE_UNITS,
        });
    }

    value.checked_mul(multiplier).ok_or_else(|| format_error(age))
}

fn format_error(age: &str) -> RunsError {
    RunsError::AgeFormat {
        age: age.to_string(),
        units: AGE_UNITS,
    }
}
