// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking store for rentbook.
//!
//! Bookings are stored as canonical JSON documents alongside the columns
//! that lifecycle scans filter on (event date, status, payment status,
//! invoice id, customer email). Every applied transition is written in
//! the same database transaction as an audit row, so the trail and the
//! document cannot disagree.
//!
//! ## Backend
//!
//! `SQLite` through Diesel, with migrations embedded at compile time.
//! Tests use a unique shared in-memory database per `Persistence`.
//!
//! ## Settings
//!
//! Named settings documents (`booking_rules`) are seeded with their
//! defaults on first read and merge-updated afterwards.
//!
//! ## Legacy import
//!
//! Documents exported from the previous store are normalised once, at
//! import, by the `legacy` module.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use rentbook::TransitionResult;
use rentbook_domain::{Booking, BookingId, BookingPatch, BookingRules, BookingStatus};
use serde_json::Value;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;
use tracing::{info, warn};

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod legacy;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::HistoryEntry;
pub use error::PersistenceError;
pub use legacy::normalize_legacy_document;
pub use mutations::settings::merge_document;
pub use queries::BookingField;

/// Name of the booking rules settings document.
pub const BOOKING_RULES_SETTING: &str = "booking_rules";

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Outcome of a legacy import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Documents written as new bookings.
    pub imported: usize,
    /// Documents whose booking id was already present.
    pub skipped: usize,
    /// Documents that could not be normalised, with the reason.
    pub rejected: Vec<String>,
}

/// Booking store adapter.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a store backed by a fresh in-memory database.
    ///
    /// Each call receives its own database via an atomic counter, so tests
    /// running in parallel never share state.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String =
            format!("file:memdb_rentbook_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a store backed by a database file.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    // ========================================================================
    // Bookings
    // ========================================================================

    /// Stores a new booking.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::BookingAlreadyExists` if the id is taken.
    pub fn create_booking(&mut self, booking: &Booking) -> Result<(), PersistenceError> {
        mutations::bookings::insert_booking(&mut self.conn, booking)
    }

    /// Retrieves a booking.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::BookingNotFound` if the booking is absent.
    pub fn get_booking(&mut self, id: &BookingId) -> Result<Booking, PersistenceError> {
        queries::bookings::get_booking(&mut self.conn, id)
    }

    /// Finds bookings matching one indexed field, optionally by status.
    ///
    /// A row whose document no longer decodes is logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan fails.
    pub fn find_bookings(
        &mut self,
        field: &BookingField,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, PersistenceError> {
        queries::bookings::find_bookings(&mut self.conn, field, status)
    }

    /// Finds bookings with a cart line titled `title`.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan fails.
    pub fn find_bookings_with_item(
        &mut self,
        title: &str,
    ) -> Result<Vec<Booking>, PersistenceError> {
        queries::bookings::find_bookings_with_item(&mut self.conn, title)
    }

    /// Lists every booking ordered by event date.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan fails.
    pub fn list_bookings(&mut self) -> Result<Vec<Booking>, PersistenceError> {
        queries::bookings::list_bookings(&mut self.conn)
    }

    /// Merges plain field edits into a booking.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::BookingNotFound` if the booking is absent.
    pub fn update_booking(
        &mut self,
        id: &BookingId,
        patch: &BookingPatch,
    ) -> Result<Booking, PersistenceError> {
        mutations::bookings::update_booking(&mut self.conn, id, patch)
    }

    /// Writes an applied transition and its audit record atomically.
    ///
    /// # Returns
    ///
    /// The event id of the audit record.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails; nothing is kept in that case.
    pub fn persist_transition(
        &mut self,
        result: &TransitionResult,
    ) -> Result<i64, PersistenceError> {
        mutations::bookings::persist_transition(&mut self.conn, result)
    }

    /// Hard-deletes a booking and its audit trail.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::BookingNotFound` if the booking is absent.
    pub fn delete_booking(&mut self, id: &BookingId) -> Result<(), PersistenceError> {
        mutations::bookings::delete_booking(&mut self.conn, id)
    }

    /// Returns the transition trail of a booking, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::BookingNotFound` if the booking is absent.
    pub fn history(&mut self, id: &BookingId) -> Result<Vec<HistoryEntry>, PersistenceError> {
        if !queries::bookings::booking_exists(&mut self.conn, id)? {
            return Err(PersistenceError::BookingNotFound(id.to_string()));
        }
        queries::events::get_history(&mut self.conn, id)
    }

    /// Counts the transitions recorded for a booking.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_transitions(&mut self, id: &BookingId) -> Result<i64, PersistenceError> {
        queries::events::count_events(&mut self.conn, id)
    }

    // ========================================================================
    // Settings
    // ========================================================================

    /// Reads a settings document, seeding `defaults` on first read.
    ///
    /// # Errors
    ///
    /// Returns an error if the read or seeding write fails.
    pub fn get_or_seed_setting(
        &mut self,
        name: &str,
        defaults: &Value,
    ) -> Result<Value, PersistenceError> {
        mutations::settings::get_or_seed_setting(&mut self.conn, name, defaults)
    }

    /// Replaces a settings document.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn put_setting(&mut self, name: &str, document: &Value) -> Result<(), PersistenceError> {
        mutations::settings::put_setting(&mut self.conn, name, document)
    }

    /// Reads the booking rules, seeding `defaults` on first read.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the stored document does not
    /// decode as booking rules.
    pub fn booking_rules(
        &mut self,
        defaults: &BookingRules,
    ) -> Result<BookingRules, PersistenceError> {
        let seed: Value = serde_json::to_value(defaults)?;
        let document: Value = self.get_or_seed_setting(BOOKING_RULES_SETTING, &seed)?;
        Ok(serde_json::from_value(document)?)
    }

    /// Stores the booking rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn put_booking_rules(&mut self, rules: &BookingRules) -> Result<(), PersistenceError> {
        let document: Value = serde_json::to_value(rules)?;
        self.put_setting(BOOKING_RULES_SETTING, &document)
    }

    // ========================================================================
    // Legacy import
    // ========================================================================

    /// Normalises and stores legacy booking documents.
    ///
    /// Documents whose id already exists are skipped, so an import can be
    /// re-run. A document that cannot be normalised is reported and does
    /// not stop the run.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store itself fails.
    pub fn import_legacy_documents(
        &mut self,
        documents: &[Value],
        imported_at: OffsetDateTime,
    ) -> Result<ImportReport, PersistenceError> {
        let mut report: ImportReport = ImportReport::default();

        for (index, document) in documents.iter().enumerate() {
            let booking: Booking = match normalize_legacy_document(document, imported_at) {
                Ok(booking) => booking,
                Err(e) => {
                    warn!(index, error = %e, "Rejected legacy booking document");
                    report.rejected.push(format!("document {index}: {e}"));
                    continue;
                }
            };

            match self.create_booking(&booking) {
                Ok(()) => report.imported += 1,
                Err(PersistenceError::BookingAlreadyExists(_)) => report.skipped += 1,
                Err(e) => return Err(e),
            }
        }

        info!(
            imported = report.imported,
            skipped = report.skipped,
            rejected = report.rejected.len(),
            "Legacy import finished"
        );
        Ok(report)
    }
}
