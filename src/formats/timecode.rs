/*!
 * `HH:MM:SS,mmm` timecodes.
 *
 * SRT files write milliseconds after a comma. The structured representation
 * handed to callers uses a period instead, so both separators are accepted
 * when reading and the separator is chosen when writing.
 */

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

/// Separator written between seconds and milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MillisSeparator {
    /// `00:00:01,000`, the on-disk SRT form
    Comma,
    /// `00:00:01.000`, the normalized form
    Period,
}

impl MillisSeparator {
    fn as_char(self) -> char {
        match self {
            Self::Comma => ',',
            Self::Period => '.',
        }
    }
}

// @struct: Point in time with millisecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timecode {
    // @field: Milliseconds since the start of the media
    millis: u64,
}

impl Timecode {
    pub const ZERO: Timecode = Timecode { millis: 0 };

    pub fn from_millis(millis: u64) -> Self {
        Self { millis }
    }

    pub fn as_millis(&self) -> u64 {
        self.millis
    }

    /// Parse `HH:MM:SS,mmm` or `HH:MM:SS.mmm`
    pub fn parse(timestamp: &str) -> Result<Self> {
        let timestamp = timestamp.trim();
        let invalid = || anyhow!("Invalid timestamp format: {}", timestamp);

        // HH:MM:SS, then exactly one ',' or '.' before the milliseconds
        let (clock, fraction) = timestamp.split_once([',', '.']).ok_or_else(invalid)?;
        let mut parts: Vec<&str> = clock.split(':').collect();
        parts.push(fraction);

        if parts.len() != 4 || parts.iter().any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit())) {
            return Err(invalid());
        }

        let hours: u64 = parts[0].parse().context("Failed to parse hours")?;
        let minutes: u64 = parts[1].parse().context("Failed to parse minutes")?;
        let seconds: u64 = parts[2].parse().context("Failed to parse seconds")?;
        let millis: u64 = parts[3].parse().context("Failed to parse milliseconds")?;

        if parts[3].len() > 3 || minutes >= 60 || seconds >= 60 {
            return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
        }

        // "1,5" reads as 500 ms, like a decimal fraction
        let millis = millis * 10u64.pow(3 - parts[3].len() as u32);

        hours
            .checked_mul(3_600_000)
            .and_then(|h| h.checked_add(minutes * 60_000 + seconds * 1_000 + millis))
            .map(Self::from_millis)
            .ok_or_else(|| anyhow!("Timestamp out of range: {}", timestamp))
    }

    /// Format as `HH:MM:SS<sep>mmm`
    pub fn format(&self, separator: MillisSeparator) -> String {
        let hours = self.millis / 3_600_000;
        let minutes = (self.millis % 3_600_000) / 60_000;
        let seconds = (self.millis % 60_000) / 1_000;
        let millis = self.millis % 1_000;

        format!(
            "{:02}:{:02}:{:02}{}{:03}",
            hours,
            minutes,
            seconds,
            separator.as_char(),
            millis
        )
    }
}

impl FromStr for Timecode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.format(MillisSeparator::Comma))
    }
}
