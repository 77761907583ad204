// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use rentbook_audit::TransitionRecord;
use rentbook_domain::{Booking, format_event_date};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;

use crate::diesel_schema::{booking_events, bookings, settings};
use crate::error::PersistenceError;

/// A stored booking: the JSON document plus the columns scans filter on.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bookings)]
pub struct BookingRow {
    pub booking_id: String,
    pub document: String,
}

impl BookingRow {
    /// Decodes the stored document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document no longer matches the schema.
    pub fn into_booking(self) -> Result<Booking, PersistenceError> {
        serde_json::from_str(&self.document).map_err(|e| {
            PersistenceError::SerializationError(format!(
                "booking {} has an unreadable document: {e}",
                self.booking_id
            ))
        })
    }
}

/// Column values derived from a booking document.
///
/// Used both for inserts and for full-row rewrites, so the index columns
/// can never drift from the document.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = bookings)]
pub struct BookingColumns {
    pub booking_id: String,
    pub event_date: String,
    pub status: String,
    pub payment_status: String,
    pub contract_status: String,
    pub invoice_id: Option<String>,
    pub customer_email: String,
    pub document: String,
    pub created_at: String,
}

impl BookingColumns {
    /// Derives the stored columns of a booking.
    ///
    /// # Errors
    ///
    /// Returns an error if the booking cannot be serialized.
    pub fn of(booking: &Booking) -> Result<Self, PersistenceError> {
        Ok(Self {
            booking_id: booking.booking_id.as_str().to_string(),
            event_date: format_event_date(booking.event_date),
            status: booking.status.as_str().to_string(),
            payment_status: booking.payment_status.as_str().to_string(),
            contract_status: booking.contract_status.as_str().to_string(),
            invoice_id: booking.invoice_id.clone(),
            customer_email: booking.customer.email.trim().to_lowercase(),
            document: serde_json::to_string(booking)?,
            created_at: booking.created_at.format(&Rfc3339)?,
        })
    }
}

/// Insertable audit row for one applied transition.
#[derive(Debug, Insertable)]
#[diesel(table_name = booking_events)]
pub struct NewBookingEvent {
    pub booking_id: String,
    pub action_name: String,
    pub actor_json: String,
    pub cause_json: String,
    pub action_json: String,
    pub before_snapshot_json: String,
    pub after_snapshot_json: String,
}

impl NewBookingEvent {
    /// Serializes a transition record into its row.
    ///
    /// # Errors
    ///
    /// Returns an error if any part of the record fails to serialize.
    pub fn of(record: &TransitionRecord) -> Result<Self, PersistenceError> {
        Ok(Self {
            booking_id: record.booking_id.as_str().to_string(),
            action_name: record.action.name.clone(),
            actor_json: serde_json::to_string(&record.actor)?,
            cause_json: serde_json::to_string(&record.cause)?,
            action_json: serde_json::to_string(&record.action)?,
            before_snapshot_json: serde_json::to_string(&record.before)?,
            after_snapshot_json: serde_json::to_string(&record.after)?,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = booking_events)]
pub struct BookingEventRow {
    pub event_id: i64,
    pub booking_id: String,
    pub actor_json: String,
    pub cause_json: String,
    pub action_json: String,
    pub before_snapshot_json: String,
    pub after_snapshot_json: String,
    pub recorded_at: String,
}

/// A persisted transition record with its position in the trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub event_id: i64,
    pub recorded_at: String,
    #[serde(flatten)]
    pub record: TransitionRecord,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = settings)]
pub struct SettingRow {
    pub document: String,
}
