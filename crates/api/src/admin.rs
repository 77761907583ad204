// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Admin booking operations.
//!
//! Reads need no identity. Every write requires the admin identity the
//! fronting gateway asserted, which is recorded as the actor of any
//! transition it causes.

use rentbook::{Transition, TransitionOutcome, TransitionResult, apply};
use rentbook_audit::{Actor, Cause};
use rentbook_domain::{
    AvailabilityResult, Booking, BookingId, BookingPatch, BookingRules, BookingStatus,
    ContractStatus, DomainError, PaymentAttempt, PaymentStatus, format_event_date,
    parse_event_date, validate_customer,
};
use rentbook_persistence::{BookingField, HistoryEntry, Persistence, merge_document};
use serde_json::Value;
use time::Date;
use tokio::sync::MutexGuard;
use tracing::{info, warn};

use crate::BookingEngine;
use crate::availability::{availability_locked, ensure_available};
use crate::error::{ApiError, translate_core_error, translate_domain_error};
use crate::request_response::{
    CalendarDay, CalendarEntry, TransitionReport, UpdateBookingRequest, UpdateBookingResponse,
};

/// Builds the actor for an admin write.
fn admin_actor(identity: &str, action: &str) -> Result<Actor, ApiError> {
    let identity: &str = identity.trim();
    if identity.is_empty() {
        return Err(ApiError::Unauthorized {
            action: action.to_string(),
        });
    }
    Ok(Actor::admin(identity))
}

/// A requested status value the booking cannot move to.
fn regression(field: &str, from: &str, to: &str) -> DomainError {
    DomainError::InvalidStatusTransition {
        from: from.to_string(),
        to: to.to_string(),
        reason: format!("{field} cannot move backwards"),
    }
}

/// Maps the status fields of an update to guarded transitions.
///
/// A field already at the requested value yields no transition. A
/// request to go back to an initial state is refused outright.
fn requested_transitions(
    booking: &Booking,
    request: &UpdateBookingRequest,
    identity: &str,
) -> Result<Vec<(&'static str, Option<Transition>)>, ApiError> {
    let mut transitions: Vec<(&'static str, Option<Transition>)> = Vec::new();

    if let Some(target) = request.contract_status {
        let transition: Option<Transition> = match target {
            ContractStatus::Received => Some(Transition::ReceiveContract),
            ContractStatus::Pending if booking.contract_status == ContractStatus::Pending => None,
            ContractStatus::Pending => {
                return Err(translate_domain_error(regression(
                    "contractStatus",
                    booking.contract_status.as_str(),
                    target.as_str(),
                )));
            }
        };
        transitions.push(("contractStatus", transition));
    }

    if let Some(target) = request.payment_status {
        let reference: String = format!("admin:{identity}");
        let transition: Option<Transition> = match target {
            PaymentStatus::DepositPaid => Some(Transition::MarkDepositPaid {
                payment_id: reference,
                refs: None,
            }),
            PaymentStatus::BalancePaid => Some(Transition::MarkBalancePaid { reference }),
            PaymentStatus::Failed => Some(Transition::MarkPaymentFailed {
                attempt: PaymentAttempt::Deposit,
                reference,
            }),
            PaymentStatus::Pending if booking.payment_status == PaymentStatus::Pending => None,
            PaymentStatus::Pending => {
                return Err(translate_domain_error(regression(
                    "paymentStatus",
                    booking.payment_status.as_str(),
                    target.as_str(),
                )));
            }
        };
        transitions.push(("paymentStatus", transition));
    }

    if let Some(target) = request.status {
        let transition: Option<Transition> = match target {
            BookingStatus::Completed => Some(Transition::Complete),
            BookingStatus::Canceled => Some(Transition::Cancel),
            BookingStatus::Active if booking.status == BookingStatus::Active => None,
            BookingStatus::Active => {
                return Err(translate_domain_error(regression(
                    "status",
                    booking.status.as_str(),
                    target.as_str(),
                )));
            }
        };
        transitions.push(("status", transition));
    }

    Ok(transitions)
}

impl BookingEngine {
    /// Lists every booking ordered by event date.
    ///
    /// # Errors
    ///
    /// Returns a store error if the scan fails.
    pub async fn list_bookings(&self) -> Result<Vec<Booking>, ApiError> {
        let mut store: MutexGuard<'_, Persistence> = self.lock_store().await?;
        Ok(store.list_bookings()?)
    }

    /// Retrieves one booking.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::ResourceNotFound` if the booking does not exist.
    pub async fn get_booking(&self, booking_id: &BookingId) -> Result<Booking, ApiError> {
        let mut store: MutexGuard<'_, Persistence> = self.lock_store().await?;
        Ok(store.get_booking(booking_id)?)
    }

    /// Lists the bookings of one event date.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for an unparsable date.
    pub async fn bookings_on_date(&self, date: &str) -> Result<Vec<Booking>, ApiError> {
        let date: Date = parse_event_date(date).map_err(translate_domain_error)?;
        let mut store: MutexGuard<'_, Persistence> = self.lock_store().await?;
        Ok(store.find_bookings(&BookingField::EventDate(date), None)?)
    }

    /// Lists the bookings with a cart line of the given title.
    ///
    /// # Errors
    ///
    /// Returns a store error if the scan fails.
    pub async fn bookings_with_item(&self, title: &str) -> Result<Vec<Booking>, ApiError> {
        let mut store: MutexGuard<'_, Persistence> = self.lock_store().await?;
        Ok(store.find_bookings_with_item(title.trim())?)
    }

    /// Groups bookings that are not canceled by event date.
    ///
    /// # Errors
    ///
    /// Returns a store error if the scan fails.
    pub async fn calendar(&self) -> Result<Vec<CalendarDay>, ApiError> {
        let bookings: Vec<Booking> = self.list_bookings().await?;
        let mut days: Vec<CalendarDay> = Vec::new();

        for booking in bookings
            .iter()
            .filter(|booking| booking.status != BookingStatus::Canceled)
        {
            let date: String = format_event_date(booking.event_date);
            match days.last_mut() {
                Some(day) if day.date == date => day.bookings.push(CalendarEntry::of(booking)),
                _ => days.push(CalendarDay {
                    date,
                    bookings: vec![CalendarEntry::of(booking)],
                }),
            }
        }
        Ok(days)
    }

    /// Sets the admin note of a booking.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` without an admin identity and
    /// `ApiError::ResourceNotFound` if the booking does not exist.
    pub async fn add_note(
        &self,
        booking_id: &BookingId,
        note: &str,
        identity: &str,
    ) -> Result<Booking, ApiError> {
        admin_actor(identity, "add_note")?;
        let patch: BookingPatch = BookingPatch {
            admin_note: Some(note.trim().to_string()),
            ..BookingPatch::default()
        };
        let mut store: MutexGuard<'_, Persistence> = self.lock_store().await?;
        let booking: Booking = store.update_booking(booking_id, &patch)?;
        info!(booking_id = %booking_id, admin = identity, "Admin note updated");
        Ok(booking)
    }

    /// Hard-deletes a booking and its history.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` without an admin identity and
    /// `ApiError::ResourceNotFound` if the booking does not exist.
    pub async fn delete_booking(
        &self,
        booking_id: &BookingId,
        identity: &str,
    ) -> Result<(), ApiError> {
        admin_actor(identity, "delete_booking")?;
        let mut store: MutexGuard<'_, Persistence> = self.lock_store().await?;
        store.delete_booking(booking_id)?;
        warn!(booking_id = %booking_id, admin = identity, "Booking deleted");
        Ok(())
    }

    /// Returns the transition history of a booking, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::ResourceNotFound` if the booking does not exist.
    pub async fn booking_history(
        &self,
        booking_id: &BookingId,
    ) -> Result<Vec<HistoryEntry>, ApiError> {
        let mut store: MutexGuard<'_, Persistence> = self.lock_store().await?;
        Ok(store.history(booking_id)?)
    }

    /// Returns the booking rules, seeding the defaults on first read.
    ///
    /// # Errors
    ///
    /// Returns a store error if the read fails.
    pub async fn booking_rules(&self) -> Result<BookingRules, ApiError> {
        let mut store: MutexGuard<'_, Persistence> = self.lock_store().await?;
        self.rules_locked(&mut store)
    }

    /// Merges a partial document into the booking rules.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` if the merged rules do not decode
    /// or validate.
    pub async fn update_booking_rules(
        &self,
        patch: &Value,
        identity: &str,
    ) -> Result<BookingRules, ApiError> {
        admin_actor(identity, "update_booking_rules")?;
        if !patch.is_object() {
            return Err(ApiError::InvalidInput {
                field: String::from("bookingRules"),
                message: String::from("expected a JSON object"),
            });
        }

        let mut store: MutexGuard<'_, Persistence> = self.lock_store().await?;
        let current: BookingRules = self.rules_locked(&mut store)?;
        let mut document: Value = serde_json::to_value(&current).map_err(|e| ApiError::Internal {
            message: e.to_string(),
        })?;
        merge_document(&mut document, patch);

        let rules: BookingRules =
            serde_json::from_value(document).map_err(|e| ApiError::InvalidInput {
                field: String::from("bookingRules"),
                message: e.to_string(),
            })?;
        rules.validate().map_err(translate_domain_error)?;
        store.put_booking_rules(&rules)?;

        info!(admin = identity, "Booking rules updated");
        Ok(rules)
    }

    /// Applies an admin update: plain field edits plus guarded status changes.
    ///
    /// Everything is decided before anything is written. If any requested
    /// status change is refused, nothing is stored and the refusal is
    /// returned. Notifications go out after the writes.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No admin identity is present
    /// - The booking does not exist
    /// - A plain field is invalid, or a date change makes the booking unavailable
    /// - A status change is not a legal transition
    /// - The store fails
    pub async fn update_booking(
        &self,
        booking_id: &BookingId,
        request: &UpdateBookingRequest,
        identity: &str,
    ) -> Result<UpdateBookingResponse, ApiError> {
        let actor: Actor = admin_actor(identity, "update_booking")?;
        let cause: Cause = Cause::new(
            format!("admin-update-{booking_id}"),
            format!("admin update by {}", identity.trim()),
        );

        let (booking, reports, applied): (Booking, Vec<TransitionReport>, Vec<TransitionResult>) = {
            let mut store: MutexGuard<'_, Persistence> = self.lock_store().await?;
            let current: Booking = store.get_booking(booking_id)?;

            let mut working: Booking = current.clone();
            request.patch.merge_into(&mut working);
            if request.patch.name.is_some()
                || request.patch.email.is_some()
                || request.patch.phone.is_some()
            {
                validate_customer(&working.customer).map_err(translate_domain_error)?;
            }
            if working.event_date != current.event_date && working.holds_date() {
                let rules: BookingRules = self.rules_locked(&mut store)?;
                let titles: Vec<String> =
                    working.items.iter().map(|item| item.title.clone()).collect();
                let availability: AvailabilityResult = availability_locked(
                    &mut store,
                    &rules,
                    working.event_date,
                    &titles,
                    Some(&current),
                )?;
                ensure_available(availability, working.event_date)?;
            }

            let mut reports: Vec<TransitionReport> = Vec::new();
            let mut applied: Vec<TransitionResult> = Vec::new();
            for (field, transition) in requested_transitions(&current, request, identity.trim())? {
                let Some(transition) = transition else {
                    reports.push(TransitionReport {
                        transition: field.to_string(),
                        outcome: String::from("duplicate"),
                    });
                    continue;
                };
                let outcome: TransitionOutcome =
                    apply(&working, transition, actor.clone(), cause.clone())
                        .map_err(translate_core_error)?;
                reports.push(TransitionReport {
                    transition: field.to_string(),
                    outcome: outcome.label().to_string(),
                });
                match outcome {
                    TransitionOutcome::Applied(result) => {
                        working = result.new_booking.clone();
                        applied.push(*result);
                    }
                    TransitionOutcome::AlreadyApplied => {}
                    TransitionOutcome::Rejected(reason) => {
                        warn!(
                            booking_id = %booking_id,
                            field,
                            reason = %reason,
                            "Admin update refused"
                        );
                        return Err(translate_domain_error(reason));
                    }
                }
            }

            if applied.is_empty() {
                if !request.patch.is_empty() {
                    working = store.update_booking(booking_id, &request.patch)?;
                }
            } else {
                for result in &applied {
                    store.persist_transition(result)?;
                }
            }
            (working, reports, applied)
        };

        info!(
            booking_id = %booking_id,
            admin = identity,
            transitions = applied.len(),
            "Booking updated"
        );
        for result in &applied {
            if let Some(kind) = result.notification {
                self.notify(&result.new_booking, kind).await;
            }
        }

        Ok(UpdateBookingResponse {
            booking,
            transitions: reports,
        })
    }
}
