// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The rentbook booking engine.
//!
//! `BookingEngine` owns the booking store and the two collaborator ports
//! and exposes every operation the HTTP surface needs: checkout, direct
//! booking, webhook reconciliation, the daily lifecycle run, availability
//! and admin booking management.
//!
//! ## Consistency
//!
//! The store sits behind one async mutex. Every guarded transition reads
//! the booking, runs `rentbook::apply` and writes the result inside a
//! single lock acquisition. The lock is never held across a processor or
//! mailer call.
//!
//! ## Side effects
//!
//! Notifications are sent only after the transition that triggers them is
//! persisted, and a failed send is logged and dropped. When an external
//! side effect succeeds but the following store write fails, the engine
//! reports a reconciliation gap and does not repeat the side effect.

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

mod admin;
mod availability;
mod checkout;
mod config;
mod dispatch;
mod error;
mod ports;
mod request_response;
mod scheduler;
mod signature;
mod transition;
mod webhook;

#[cfg(test)]
mod tests;

use rentbook_domain::{Booking, BookingRules};
use rentbook_persistence::Persistence;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::error;

pub use config::{DEFAULT_EXTERNAL_TIMEOUT, EngineConfig, TemplateIds};
pub use dispatch::build_notifications;
pub use error::{ApiError, translate_core_error, translate_domain_error};
pub use ports::{
    Attachment, ChargeReceipt, ChargeRequest, CheckoutLine, CheckoutLink, CheckoutLinkRequest,
    Invoice, InvoiceRequest, Notifier, NotifyError, OutboundEmail, PaymentProcessor,
    ProcessorError, PublishedInvoice,
};
pub use request_response::{
    AdminNoteRequest, AvailabilityRequest, BookingRequest, CalendarDay, CalendarEntry,
    CheckoutResponse, SchedulerRunRequest, TransitionReport, UpdateBookingRequest,
    UpdateBookingResponse, WebhookAck,
};
pub use scheduler::SchedulerReport;
pub use signature::{SIGNATURE_HEADER, compute_signature, verify_signature};
pub use transition::{GuardedOutcome, report_reconciliation_gap};

/// The booking engine.
///
/// Cheap to clone; clones share the store and the collaborators.
#[derive(Clone)]
pub struct BookingEngine {
    store: Arc<Mutex<Persistence>>,
    processor: Arc<dyn PaymentProcessor>,
    notifier: Arc<dyn Notifier>,
    config: Arc<EngineConfig>,
}

impl BookingEngine {
    /// Creates an engine over a store and its collaborators.
    #[must_use]
    pub fn new(
        persistence: Persistence,
        processor: Arc<dyn PaymentProcessor>,
        notifier: Arc<dyn Notifier>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store: Arc::new(Mutex::new(persistence)),
            processor,
            notifier,
            config: Arc::new(config),
        }
    }

    /// Returns the engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Acquires the store, giving up after the external timeout.
    async fn lock_store(&self) -> Result<MutexGuard<'_, Persistence>, ApiError> {
        tokio::time::timeout(self.config.external_timeout, self.store.lock())
            .await
            .map_err(|_| {
                error!(
                    timeout = ?self.config.external_timeout,
                    "Timed out waiting for the booking store"
                );
                ApiError::StoreUnavailable {
                    message: String::from("timed out waiting for the booking store"),
                }
            })
    }

    /// Runs one processor call under the external timeout.
    async fn call_processor<T, F>(&self, call: F) -> Result<T, ProcessorError>
    where
        F: Future<Output = Result<T, ProcessorError>> + Send,
    {
        tokio::time::timeout(self.config.external_timeout, call)
            .await
            .map_err(|_| ProcessorError::Timeout(self.config.external_timeout))?
    }

    /// Reads the booking rules, seeding the configured defaults.
    fn rules_locked(&self, store: &mut Persistence) -> Result<BookingRules, ApiError> {
        Ok(store.booking_rules(&self.config.default_rules())?)
    }

    /// Writes a new booking.
    async fn store_new_booking(&self, booking: &Booking) -> Result<(), ApiError> {
        let mut store: MutexGuard<'_, Persistence> = self.lock_store().await?;
        store.create_booking(booking)?;
        Ok(())
    }
}
