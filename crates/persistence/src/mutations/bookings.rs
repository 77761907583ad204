// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking mutations.
//!
//! Every write rewrites the whole document together with its index
//! columns. Transition writes and their audit row share one database
//! transaction.

use diesel::SqliteConnection;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::Text;
use rentbook::TransitionResult;
use rentbook_domain::{Booking, BookingId, BookingPatch};
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{BookingColumns, NewBookingEvent};
use crate::diesel_schema::{booking_events, bookings};
use crate::error::PersistenceError;
use crate::queries::bookings::get_booking;

/// Inserts a new booking.
///
/// # Errors
///
/// Returns `PersistenceError::BookingAlreadyExists` if the id is taken.
pub fn insert_booking(
    conn: &mut SqliteConnection,
    booking: &Booking,
) -> Result<(), PersistenceError> {
    let columns: BookingColumns = BookingColumns::of(booking)?;

    match diesel::insert_into(bookings::table)
        .values(&columns)
        .execute(conn)
    {
        Ok(_) => {
            debug!(booking_id = %booking.booking_id, "Inserted booking");
            Ok(())
        }
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => Err(PersistenceError::BookingAlreadyExists(
            booking.booking_id.to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Rewrites an existing booking document.
///
/// # Errors
///
/// Returns `PersistenceError::BookingNotFound` if no row was updated.
pub fn rewrite_booking(
    conn: &mut SqliteConnection,
    booking: &Booking,
) -> Result<(), PersistenceError> {
    let columns: BookingColumns = BookingColumns::of(booking)?;

    let rows_affected: usize = diesel::update(bookings::table.find(booking.booking_id.as_str()))
        .set((
            &columns,
            bookings::updated_at.eq(sql::<Text>("CURRENT_TIMESTAMP")),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::BookingNotFound(
            booking.booking_id.to_string(),
        ));
    }
    Ok(())
}

/// Merges a patch into a stored booking and returns the result.
///
/// Fields the patch leaves unset keep their stored values.
///
/// # Errors
///
/// Returns `PersistenceError::BookingNotFound` if the booking is absent.
pub fn update_booking(
    conn: &mut SqliteConnection,
    id: &BookingId,
    patch: &BookingPatch,
) -> Result<Booking, PersistenceError> {
    conn.transaction::<Booking, PersistenceError, _>(|conn| {
        let mut booking: Booking = get_booking(conn, id)?;
        patch.merge_into(&mut booking);
        rewrite_booking(conn, &booking)?;
        info!(booking_id = %id, "Merged booking update");
        Ok(booking)
    })
}

/// Writes an applied transition: the new booking and its audit row.
///
/// # Returns
///
/// The event id assigned to the audit row.
///
/// # Errors
///
/// Returns an error if either write fails; neither is kept in that case.
pub fn persist_transition(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
) -> Result<i64, PersistenceError> {
    conn.transaction::<i64, PersistenceError, _>(|conn| {
        rewrite_booking(conn, &result.new_booking)?;

        let event: NewBookingEvent = NewBookingEvent::of(&result.record)?;
        diesel::insert_into(booking_events::table)
            .values(&event)
            .execute(conn)?;
        let event_id: i64 = get_last_insert_rowid(conn)?;

        debug!(
            booking_id = %result.record.booking_id,
            action = %result.record.action.name,
            event_id,
            "Persisted transition"
        );
        Ok(event_id)
    })
}

/// Deletes a booking and its audit trail.
///
/// # Errors
///
/// Returns `PersistenceError::BookingNotFound` if the booking is absent.
pub fn delete_booking(conn: &mut SqliteConnection, id: &BookingId) -> Result<(), PersistenceError> {
    let rows_affected: usize =
        diesel::delete(bookings::table.find(id.as_str())).execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::BookingNotFound(id.to_string()));
    }
    info!(booking_id = %id, "Deleted booking");
    Ok(())
}
