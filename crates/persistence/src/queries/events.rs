// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use rentbook_audit::{Action, Actor, Cause, StateSnapshot, TransitionRecord};
use rentbook_domain::BookingId;

use crate::data_models::{BookingEventRow, HistoryEntry};
use crate::diesel_schema::booking_events;
use crate::error::PersistenceError;

/// Retrieves the transition trail of a booking, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn get_history(
    conn: &mut SqliteConnection,
    id: &BookingId,
) -> Result<Vec<HistoryEntry>, PersistenceError> {
    let rows: Vec<BookingEventRow> = booking_events::table
        .filter(booking_events::booking_id.eq(id.as_str()))
        .order(booking_events::event_id.asc())
        .select(BookingEventRow::as_select())
        .load::<BookingEventRow>(conn)?;

    rows.into_iter().map(decode_event).collect()
}

/// Counts the transitions recorded for a booking.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_events(conn: &mut SqliteConnection, id: &BookingId) -> Result<i64, PersistenceError> {
    Ok(booking_events::table
        .filter(booking_events::booking_id.eq(id.as_str()))
        .count()
        .get_result(conn)?)
}

fn decode_event(row: BookingEventRow) -> Result<HistoryEntry, PersistenceError> {
    let actor: Actor = serde_json::from_str(&row.actor_json)?;
    let cause: Cause = serde_json::from_str(&row.cause_json)?;
    let action: Action = serde_json::from_str(&row.action_json)?;
    let before: StateSnapshot = serde_json::from_str(&row.before_snapshot_json)?;
    let after: StateSnapshot = serde_json::from_str(&row.after_snapshot_json)?;

    Ok(HistoryEntry {
        event_id: row.event_id,
        recorded_at: row.recorded_at,
        record: TransitionRecord::new(
            BookingId::new(&row.booking_id),
            actor,
            cause,
            action,
            before,
            after,
        ),
    })
}
