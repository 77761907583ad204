// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Availability evaluation.
//!
//! Pure: the caller loads the bookings for the date and this module
//! decides. Only bookings that hold their date (active and not failed)
//! are considered.

use crate::rules::BookingRules;
use crate::types::Booking;
use serde::{Deserialize, Serialize};
use time::Date;

/// Why a request is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictReason {
    /// A requested item is already reserved on that date.
    ItemConflict,
    /// The date is blacked out.
    BlackoutDate,
    /// The date already carries the maximum number of bookings.
    DailyLimit,
}

/// Outcome of an availability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityResult {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ConflictReason>,
}

impl AvailabilityResult {
    #[must_use]
    pub const fn available() -> Self {
        Self {
            available: true,
            conflict: None,
            reason: None,
        }
    }

    const fn unavailable(conflict: Option<String>, reason: ConflictReason) -> Self {
        Self {
            available: false,
            conflict,
            reason: Some(reason),
        }
    }
}

/// Decides whether `requested` items can be booked on `date`.
///
/// Checks run in order: blackout, item conflicts, daily cap. For item
/// conflicts the first requested title found in any live booking wins.
#[must_use]
pub fn evaluate_availability(
    date: Date,
    requested: &[String],
    bookings: &[Booking],
    rules: Option<&BookingRules>,
) -> AvailabilityResult {
    if rules.is_some_and(|rules| rules.is_blackout(date)) {
        return AvailabilityResult::unavailable(None, ConflictReason::BlackoutDate);
    }

    let live: Vec<&Booking> = bookings
        .iter()
        .filter(|booking| booking.event_date == date && booking.holds_date())
        .collect();

    for title in requested {
        if live.iter().any(|booking| booking.reserves_item(title)) {
            return AvailabilityResult::unavailable(
                Some(title.clone()),
                ConflictReason::ItemConflict,
            );
        }
    }

    if let Some(rules) = rules
        && rules.max_bookings_per_day > 0
        && live.len() >= rules.max_bookings_per_day as usize
    {
        return AvailabilityResult::unavailable(None, ConflictReason::DailyLimit);
    }

    AvailabilityResult::available()
}
