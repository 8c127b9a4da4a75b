//! Parsing of the tracker's message timestamps.
//!
//! The tracker stores Go-style strings such as `2024-07-28 00:02:05 +0300 EEST`.
//! The trailing zone abbreviation is ambiguous and carries nothing the numeric
//! offset does not, so it is dropped before parsing.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};

/// Layout of the timestamp once the zone name has been stripped.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Layout used when writing timestamps back out to CSV.
pub const OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

/// Drop the zone-name token that follows the numeric offset.  The name may be
/// an abbreviation (`EEST`) or, for zones without one, numeric (`+03`).
/// Strings that already end in the offset are returned unchanged, apart from
/// outer whitespace.
pub fn strip_zone_name(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.rsplit_once(char::is_whitespace) {
        Some((head, _zone)) if ends_with_offset(head) => head.trim_end(),
        _ => trimmed,
    }
}

fn ends_with_offset(head: &str) -> bool {
    head.trim_end()
        .rsplit(char::is_whitespace)
        .next()
        .and_then(|token| token.strip_prefix(['+', '-']))
        .is_some_and(|digits| digits.len() == 4 && digits.bytes().all(|b| b.is_ascii_digit()))
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_str(strip_zone_name(raw), TIMESTAMP_FORMAT)
        .with_context(|| format!("invalid message timestamp {raw:?}"))
}

/// A parsed message timestamp with its derived calendar parts.  Date and time
/// are taken in the message's own offset, not converted to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedTimestamp {
    at: DateTime<FixedOffset>,
}

impl NormalizedTimestamp {
    pub fn parse(raw: &str) -> Result<Self> {
        Ok(Self {
            at: parse_timestamp(raw)?,
        })
    }

    pub fn at(&self) -> DateTime<FixedOffset> {
        self.at
    }

    pub fn date(&self) -> NaiveDate {
        self.at.date_naive()
    }

    pub fn time(&self) -> NaiveTime {
        self.at.time()
    }
}
