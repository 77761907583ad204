// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking lookups.
//!
//! Scans filter on the indexed columns and decode the matching documents.
//! Results are ordered by event date, then booking id.

use diesel::SqliteConnection;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use rentbook_domain::{Booking, BookingId, BookingStatus, PaymentStatus, format_event_date};
use time::Date;
use tracing::error;

use crate::data_models::BookingRow;
use crate::diesel_schema::bookings;
use crate::error::PersistenceError;

/// An indexed field a booking scan can match on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingField {
    EventDate(Date),
    InvoiceId(String),
    PaymentStatus(PaymentStatus),
    /// Matched case-insensitively.
    CustomerEmail(String),
}

/// Retrieves a booking by id.
///
/// # Errors
///
/// Returns `PersistenceError::BookingNotFound` if no booking has this id.
pub fn get_booking(
    conn: &mut SqliteConnection,
    id: &BookingId,
) -> Result<Booking, PersistenceError> {
    let row: Option<BookingRow> = bookings::table
        .find(id.as_str())
        .select(BookingRow::as_select())
        .first::<BookingRow>(conn)
        .optional()?;

    row.map_or_else(
        || Err(PersistenceError::BookingNotFound(id.to_string())),
        BookingRow::into_booking,
    )
}

/// Returns true if a booking with this id exists.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn booking_exists(
    conn: &mut SqliteConnection,
    id: &BookingId,
) -> Result<bool, PersistenceError> {
    let count: i64 = bookings::table
        .filter(bookings::booking_id.eq(id.as_str()))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

/// Finds bookings whose `field` matches, optionally restricted to one status.
///
/// # Errors
///
/// Returns an error if the query fails. Rows whose document cannot be
/// decoded are logged and left out.
pub fn find_bookings(
    conn: &mut SqliteConnection,
    field: &BookingField,
    status: Option<BookingStatus>,
) -> Result<Vec<Booking>, PersistenceError> {
    let mut query = bookings::table
        .select(BookingRow::as_select())
        .into_boxed::<Sqlite>();

    query = match field {
        BookingField::EventDate(date) => {
            query.filter(bookings::event_date.eq(format_event_date(*date)))
        }
        BookingField::InvoiceId(invoice_id) => {
            query.filter(bookings::invoice_id.eq(invoice_id.clone()))
        }
        BookingField::PaymentStatus(payment_status) => {
            query.filter(bookings::payment_status.eq(payment_status.as_str()))
        }
        BookingField::CustomerEmail(email) => {
            query.filter(bookings::customer_email.eq(email.trim().to_lowercase()))
        }
    };

    if let Some(status) = status {
        query = query.filter(bookings::status.eq(status.as_str()));
    }

    let rows: Vec<BookingRow> = query
        .order((bookings::event_date.asc(), bookings::booking_id.asc()))
        .load::<BookingRow>(conn)?;

    Ok(decode_rows(rows))
}

/// Lists every booking.
///
/// # Errors
///
/// Returns an error if the query fails. Rows whose document cannot be
/// decoded are logged and left out.
pub fn list_bookings(conn: &mut SqliteConnection) -> Result<Vec<Booking>, PersistenceError> {
    let rows: Vec<BookingRow> = bookings::table
        .select(BookingRow::as_select())
        .order((bookings::event_date.asc(), bookings::booking_id.asc()))
        .load::<BookingRow>(conn)?;

    Ok(decode_rows(rows))
}

/// Lists bookings that have a cart line titled `title`.
///
/// Item titles live inside the document, so this decodes every row.
///
/// # Errors
///
/// Returns an error if the query fails. Rows whose document cannot be
/// decoded are logged and left out.
pub fn find_bookings_with_item(
    conn: &mut SqliteConnection,
    title: &str,
) -> Result<Vec<Booking>, PersistenceError> {
    let all: Vec<Booking> = list_bookings(conn)?;
    Ok(all
        .into_iter()
        .filter(|booking| booking.reserves_item(title))
        .collect())
}

/// Decodes scanned rows, skipping any that no longer decode.
///
/// One unreadable document must not hide the other bookings of a scan.
fn decode_rows(rows: Vec<BookingRow>) -> Vec<Booking> {
    rows.into_iter()
        .filter_map(|row| match row.into_booking() {
            Ok(booking) => Some(booking),
            Err(e) => {
                error!(error = %e, "Skipping unreadable booking document");
                None
            }
        })
        .collect()
}
