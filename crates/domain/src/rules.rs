// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The booking rules settings document.

use crate::dates::parse_event_date;
use crate::error::DomainError;
use crate::money::Rate;
use serde::{Deserialize, Serialize};
use time::Date;
use time::Time;
use time::macros::format_description;

/// Business rules that gate new bookings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingRules {
    /// Dates on which nothing can be booked, `YYYY-MM-DD`.
    pub blackout_dates: Vec<String>,
    /// Maximum number of live bookings on one date. Zero disables the cap.
    pub max_bookings_per_day: u32,
    /// Earliest delivery time, `HH:MM`.
    pub earliest_start: String,
    /// Latest pickup time, `HH:MM`.
    pub latest_end: String,
    /// Share of the total collected at checkout.
    pub deposit_percent: u32,
    pub cancellation_policy: String,
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            blackout_dates: Vec::new(),
            max_bookings_per_day: 3,
            earliest_start: String::from("08:00"),
            latest_end: String::from("10:00"),
            deposit_percent: 35,
            cancellation_policy: String::new(),
        }
    }
}

impl BookingRules {
    /// Default rules with a different deposit percentage.
    #[must_use]
    pub fn with_deposit_percent(deposit_percent: u32) -> Self {
        Self {
            deposit_percent,
            ..Self::default()
        }
    }

    /// Checks that every field is well formed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBookingRules` naming the first bad field,
    /// or `DomainError::InvalidDepositPercent`.
    pub fn validate(&self) -> Result<(), DomainError> {
        for date in &self.blackout_dates {
            parse_event_date(date).map_err(|e| {
                DomainError::InvalidBookingRules(format!("blackoutDates: {e}"))
            })?;
        }
        for (field, value) in [
            ("earliestStart", &self.earliest_start),
            ("latestEnd", &self.latest_end),
        ] {
            Time::parse(value, format_description!("[hour]:[minute]")).map_err(|e| {
                DomainError::InvalidBookingRules(format!("{field} '{value}': {e}"))
            })?;
        }
        Rate::from_percent(self.deposit_percent)?;
        Ok(())
    }

    /// Returns the deposit share as a rate.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDepositPercent` if above 100.
    pub const fn deposit_rate(&self) -> Result<Rate, DomainError> {
        Rate::from_percent(self.deposit_percent)
    }

    /// Returns true if the date is blacked out.
    #[must_use]
    pub fn is_blackout(&self, date: Date) -> bool {
        self.blackout_dates
            .iter()
            .filter_map(|raw| parse_event_date(raw).ok())
            .any(|blackout| blackout == date)
    }
}
