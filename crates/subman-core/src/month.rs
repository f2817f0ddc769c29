//! Month-granularity calendar dates
//!
//! Every date in SubMan is a billing month. The only accepted textual form is
//! `MM-YYYY` (two-digit month, four-digit year), e.g. `07-2025`. Ordering is
//! lexicographic over `(year, month)`, which is what the derived `Ord` gives
//! because of the field order.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// A calendar month (day and time are irrelevant)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthDate {
    year: i32,
    month: u32,
}

impl MonthDate {
    /// Create a month value, rejecting months outside 1..=12
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidFormat(format!(
                "month must be between 01 and 12, got {}",
                month
            )));
        }
        Ok(Self { year, month })
    }

    /// Parse a strict `MM-YYYY` token
    ///
    /// # Errors
    /// - `Error::InvalidFormat` for any other shape (including `YYYY-MM`,
    ///   the empty string and months outside 01..=12)
    pub fn parse(text: &str) -> Result<Self> {
        let bytes = text.as_bytes();
        let well_formed = bytes.len() == 7
            && bytes[2] == b'-'
            && bytes[..2].iter().all(u8::is_ascii_digit)
            && bytes[3..].iter().all(u8::is_ascii_digit);

        if !well_formed {
            return Err(Error::InvalidFormat(format!(
                "expected MM-YYYY, got '{}'",
                text
            )));
        }

        // Both slices are ASCII digits at this point
        let month = u32::from(bytes[0] - b'0') * 10 + u32::from(bytes[1] - b'0');
        let year = bytes[3..]
            .iter()
            .fold(0i32, |acc, b| acc * 10 + i32::from(b - b'0'));

        Self::new(year, month)
    }

    /// Canonical `MM-YYYY` text
    pub fn format(&self) -> String {
        self.to_string()
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First calendar day of this month, as stored in `DATE` columns
    pub fn first_day(&self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).ok_or_else(|| {
            Error::Internal(format!("month {} has no representable first day", self))
        })
    }
}

impl From<NaiveDate> for MonthDate {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for MonthDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:04}", self.month, self.year)
    }
}

impl FromStr for MonthDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MonthDate {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<MonthDate> for String {
    fn from(value: MonthDate) -> Self {
        value.to_string()
    }
}
