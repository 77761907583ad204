// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Availability checks against the store.

use rentbook_domain::{
    AvailabilityResult, Booking, BookingRules, BookingStatus, ConflictReason,
    evaluate_availability, format_event_date, parse_event_date,
};
use rentbook_persistence::{BookingField, Persistence};
use time::Date;
use tokio::sync::MutexGuard;
use tracing::debug;

use crate::BookingEngine;
use crate::error::{ApiError, translate_domain_error};
use crate::request_response::AvailabilityRequest;

/// Evaluates availability on `date` against the active bookings stored for it.
pub(crate) fn availability_locked(
    store: &mut Persistence,
    rules: &BookingRules,
    date: Date,
    items: &[String],
    exclude: Option<&Booking>,
) -> Result<AvailabilityResult, ApiError> {
    let mut bookings: Vec<Booking> =
        store.find_bookings(&BookingField::EventDate(date), Some(BookingStatus::Active))?;
    if let Some(excluded) = exclude {
        bookings.retain(|booking| booking.booking_id != excluded.booking_id);
    }
    Ok(evaluate_availability(date, items, &bookings, Some(rules)))
}

/// Turns an unavailable result into the error returned to a booking request.
pub(crate) fn ensure_available(result: AvailabilityResult, date: Date) -> Result<(), ApiError> {
    if result.available {
        return Ok(());
    }
    let reason: &str = match result.reason {
        Some(ConflictReason::BlackoutDate) => "blackout_date",
        Some(ConflictReason::DailyLimit) => "daily_limit",
        Some(ConflictReason::ItemConflict) | None => "item_conflict",
    };
    debug!(
        event_date = %format_event_date(date),
        reason,
        conflict = ?result.conflict,
        "Booking request refused"
    );
    Err(ApiError::Unavailable {
        reason: reason.to_string(),
        conflict: result.conflict,
    })
}

impl BookingEngine {
    /// Checks whether the requested items are free on a date.
    ///
    /// Pure read. Blackout dates and the daily cap from the booking rules
    /// are reported alongside item conflicts.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for an unparsable date, or a store
    /// error if the scan fails.
    pub async fn check_availability(
        &self,
        request: &AvailabilityRequest,
    ) -> Result<AvailabilityResult, ApiError> {
        let date: Date = parse_event_date(&request.date).map_err(translate_domain_error)?;
        let mut store: MutexGuard<'_, Persistence> = self.lock_store().await?;
        let rules: BookingRules = self.rules_locked(&mut store)?;
        availability_locked(&mut store, &rules, date, &request.items, None)
    }
}
