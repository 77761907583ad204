// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Event date parsing and day arithmetic.
//!
//! Canonical event dates are `YYYY-MM-DD`. Records written by the old
//! booking form use `MM/DD/YYYY`; both are accepted on input and the
//! canonical form is always written back.

use crate::error::DomainError;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Duration};

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const US_DATE: &[BorrowedFormatItem<'static>] = format_description!("[month]/[day]/[year]");

/// Parses an event date in `YYYY-MM-DD` or legacy `MM/DD/YYYY` form.
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if neither format matches.
pub fn parse_event_date(value: &str) -> Result<Date, DomainError> {
    let trimmed: &str = value.trim();
    let format: &[BorrowedFormatItem<'static>] = if trimmed.contains('/') {
        US_DATE
    } else {
        ISO_DATE
    };
    Date::parse(trimmed, format).map_err(|e| DomainError::DateParseError {
        date_string: value.to_string(),
        error: e.to_string(),
    })
}

/// Formats a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_event_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Formats a date as `YYYYMMDD` for calendar files.
#[must_use]
pub fn format_compact_date(date: Date) -> String {
    format!(
        "{:04}{:02}{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Shifts a date by a signed number of days.
///
/// # Errors
///
/// Returns `DomainError::DateArithmeticOverflow` if the result leaves the
/// supported calendar range.
pub fn offset_days(date: Date, days: i64) -> Result<Date, DomainError> {
    date.checked_add(Duration::days(days))
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: format!("shifting {} by {days} days", format_event_date(date)),
        })
}

/// Serde adapter for event dates: writes `YYYY-MM-DD`, reads either form.
pub mod event_date {
    use super::{format_event_date, parse_event_date};
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    /// Serializes a date as `YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_event_date(*date))
    }

    /// Deserializes a date from either accepted form.
    ///
    /// # Errors
    ///
    /// Fails if the string is not a valid date.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let raw: String = String::deserialize(deserializer)?;
        parse_event_date(&raw).map_err(serde::de::Error::custom)
    }
}
