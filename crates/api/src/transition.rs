// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Guarded transitions against the store.

use rentbook::{NotificationKind, Transition, TransitionOutcome, apply};
use rentbook_audit::{Actor, Cause};
use rentbook_domain::{Booking, BookingId, DomainError};
use rentbook_persistence::Persistence;
use tokio::sync::MutexGuard;
use tracing::{debug, error, info, warn};

use crate::BookingEngine;
use crate::error::{ApiError, translate_core_error};

/// What a guarded transition did, with the booking as it now stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardedOutcome {
    /// The transition was persisted.
    Applied {
        booking: Booking,
        notification: Option<NotificationKind>,
    },
    /// The booking was already at or past the target.
    AlreadyApplied(Booking),
    /// The booking was not in an expected prior state and was left alone.
    Rejected { booking: Booking, reason: DomainError },
}

impl GuardedOutcome {
    /// Short label for logs and acknowledgements.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Applied { .. } => "applied",
            Self::AlreadyApplied(_) => "duplicate",
            Self::Rejected { .. } => "rejected",
        }
    }

    /// The booking after the attempt.
    #[must_use]
    pub const fn booking(&self) -> &Booking {
        match self {
            Self::Applied { booking, .. }
            | Self::AlreadyApplied(booking)
            | Self::Rejected { booking, .. } => booking,
        }
    }
}

/// Logs an external side effect whose local record could not be written.
///
/// The side effect is not retried; the fields logged here are what a
/// manual repair needs.
pub fn report_reconciliation_gap(
    booking_id: &BookingId,
    event_type: &str,
    side_effect: &str,
    err: &ApiError,
) {
    error!(
        booking_id = %booking_id,
        event_type,
        side_effect,
        error = %err,
        "Reconciliation gap: external side effect succeeded but the booking was not updated"
    );
}

/// Applies a transition to a loaded booking and persists it.
///
/// Must be called with the store lock held, so the read and the write
/// see the same booking.
pub(crate) fn apply_locked(
    store: &mut Persistence,
    booking: &Booking,
    transition: Transition,
    actor: Actor,
    cause: Cause,
) -> Result<GuardedOutcome, ApiError> {
    let name: &'static str = transition.name();
    let outcome: TransitionOutcome =
        apply(booking, transition, actor, cause).map_err(translate_core_error)?;

    match outcome {
        TransitionOutcome::Applied(result) => {
            let event_id: i64 = store.persist_transition(&result)?;
            info!(
                booking_id = %booking.booking_id,
                transition = name,
                event_id,
                payment_status = result.new_booking.payment_status.as_str(),
                status = result.new_booking.status.as_str(),
                "Transition applied"
            );
            Ok(GuardedOutcome::Applied {
                booking: result.new_booking,
                notification: result.notification,
            })
        }
        TransitionOutcome::AlreadyApplied => {
            debug!(
                booking_id = %booking.booking_id,
                transition = name,
                "Transition already applied"
            );
            Ok(GuardedOutcome::AlreadyApplied(booking.clone()))
        }
        TransitionOutcome::Rejected(reason) => {
            warn!(
                booking_id = %booking.booking_id,
                transition = name,
                reason = %reason,
                "Transition rejected"
            );
            Ok(GuardedOutcome::Rejected {
                booking: booking.clone(),
                reason,
            })
        }
    }
}

impl BookingEngine {
    /// Reads, guards and writes one transition under a single lock acquisition.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::ResourceNotFound` if the booking does not exist,
    /// or a store error if the read or write fails.
    pub(crate) async fn apply_guarded(
        &self,
        booking_id: &BookingId,
        transition: Transition,
        actor: Actor,
        cause: Cause,
    ) -> Result<GuardedOutcome, ApiError> {
        let mut store: MutexGuard<'_, Persistence> = self.lock_store().await?;
        let booking: Booking = store.get_booking(booking_id)?;
        apply_locked(&mut store, &booking, transition, actor, cause)
    }

    /// Applies a transition and, once persisted, sends its notification.
    ///
    /// # Errors
    ///
    /// See [`BookingEngine::apply_guarded`]. Notification failures are not
    /// errors.
    pub(crate) async fn apply_and_notify(
        &self,
        booking_id: &BookingId,
        transition: Transition,
        actor: Actor,
        cause: Cause,
    ) -> Result<GuardedOutcome, ApiError> {
        let outcome: GuardedOutcome = self
            .apply_guarded(booking_id, transition, actor, cause)
            .await?;
        if let GuardedOutcome::Applied {
            booking,
            notification: Some(kind),
        } = &outcome
        {
            self.notify(booking, *kind).await;
        }
        Ok(outcome)
    }
}
