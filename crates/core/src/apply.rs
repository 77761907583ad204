// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::{NotificationGuard, Transition};
use crate::error::CoreError;
use crate::notification::NotificationKind;
use crate::state::{TransitionOutcome, TransitionResult};
use rentbook_audit::{Action, Actor, Cause, StateSnapshot, TransitionRecord};
use rentbook_domain::{
    Booking, BookingStatus, ContractStatus, DomainError, PaymentAttempt, PaymentStatus,
};

/// What a single transition decided, before the audit record is built.
enum Step {
    Advance {
        notification: Option<NotificationKind>,
        details: Option<String>,
    },
    Noop,
    Reject(DomainError),
}

impl Step {
    const fn advance(notification: Option<NotificationKind>, details: Option<String>) -> Self {
        Self::Advance {
            notification,
            details,
        }
    }
}

/// Applies a guarded transition to a booking.
///
/// The current value of the guarded field is compared with the target:
/// at or past the target is a no-op, a legal predecessor advances, and
/// anything else is rejected without touching the booking.
///
/// # Arguments
///
/// * `booking` - The booking as currently persisted
/// * `transition` - The requested change
/// * `actor` - Who requested it
/// * `cause` - What triggered it
///
/// # Errors
///
/// Returns `CoreError::MalformedTransition` if the transition carries data
/// that can never be applied (for example an empty invoice id).
#[allow(clippy::too_many_lines)]
pub fn apply(
    booking: &Booking,
    transition: Transition,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionOutcome, CoreError> {
    let mut next: Booking = booking.clone();

    let step: Step = match &transition {
        Transition::MarkDepositPaid { payment_id, refs } => {
            match advance_payment(booking.payment_status, PaymentStatus::DepositPaid) {
                Ok(true) => {
                    next.payment_status = PaymentStatus::DepositPaid;
                    if let Some(refs) = refs
                        && next.processor_refs().is_none()
                    {
                        next.processor_customer_ref = Some(refs.customer_id.clone());
                        next.processor_payment_source_ref = Some(refs.payment_source_id.clone());
                    }
                    Step::advance(
                        Some(NotificationKind::DepositReceived),
                        Some(format!("deposit payment {payment_id}")),
                    )
                }
                Ok(false) => Step::Noop,
                Err(e) => Step::Reject(e),
            }
        }
        Transition::MarkPaymentFailed { attempt, reference } => {
            payment_failed(booking, &mut next, *attempt, reference)
        }
        Transition::MarkBalancePaid { reference } => {
            match advance_payment(booking.payment_status, PaymentStatus::BalancePaid) {
                Ok(true) => {
                    next.payment_status = PaymentStatus::BalancePaid;
                    Step::advance(
                        Some(NotificationKind::BalancePaid),
                        Some(format!("balance collected by {reference}")),
                    )
                }
                Ok(false) => Step::Noop,
                Err(e) => Step::Reject(e),
            }
        }
        Transition::ReceiveContract => {
            if booking.contract_status == ContractStatus::Received {
                Step::Noop
            } else {
                match booking
                    .contract_status
                    .validate_transition(ContractStatus::Received)
                {
                    Ok(()) => {
                        next.contract_status = ContractStatus::Received;
                        Step::advance(Some(NotificationKind::ContractReceived), None)
                    }
                    Err(e) => Step::Reject(e),
                }
            }
        }
        Transition::Complete => change_status(booking, &mut next, BookingStatus::Completed, None),
        Transition::Cancel => change_status(
            booking,
            &mut next,
            BookingStatus::Canceled,
            Some(NotificationKind::BookingCanceled),
        ),
        Transition::AttachInvoice {
            invoice_id,
            invoice_url,
        } => {
            if invoice_id.trim().is_empty() {
                return Err(CoreError::MalformedTransition(String::from(
                    "invoice id cannot be empty",
                )));
            }
            attach_invoice(booking, &mut next, invoice_id, invoice_url.as_deref())
        }
        Transition::MarkNotified(guard) => mark_notified(booking, &mut next, *guard),
    };

    match step {
        Step::Noop => Ok(TransitionOutcome::AlreadyApplied),
        Step::Reject(reason) => Ok(TransitionOutcome::Rejected(reason)),
        Step::Advance {
            notification,
            details,
        } => {
            let action: Action = Action::new(String::from(transition.name()), details);
            let record: TransitionRecord = TransitionRecord::new(
                booking.booking_id.clone(),
                actor,
                cause,
                action,
                StateSnapshot::of(booking),
                StateSnapshot::of(&next),
            );
            Ok(TransitionOutcome::Applied(Box::new(TransitionResult {
                new_booking: next,
                record,
                notification,
            })))
        }
    }
}

/// `Ok(true)` to advance, `Ok(false)` if already at or past `target`.
fn advance_payment(current: PaymentStatus, target: PaymentStatus) -> Result<bool, DomainError> {
    if current.has_reached(target) {
        return Ok(false);
    }
    current.validate_transition(target)?;
    Ok(true)
}

fn payment_failed(
    booking: &Booking,
    next: &mut Booking,
    attempt: PaymentAttempt,
    reference: &str,
) -> Step {
    match (attempt, booking.payment_status) {
        (PaymentAttempt::Deposit, PaymentStatus::Pending) => {
            next.payment_status = PaymentStatus::Failed;
            Step::advance(
                Some(NotificationKind::PaymentDeclined { attempt }),
                Some(format!("deposit declined ({reference})")),
            )
        }
        (PaymentAttempt::Deposit, PaymentStatus::Failed)
        | (PaymentAttempt::Balance, PaymentStatus::BalancePaid) => Step::Noop,
        (PaymentAttempt::Deposit, current) => Step::Reject(DomainError::InvalidStatusTransition {
            from: current.as_str().to_string(),
            to: PaymentStatus::Failed.as_str().to_string(),
            reason: String::from("a failed deposit attempt does not forfeit a collected deposit"),
        }),
        // The deposit stays collected; only the decline notice is guarded.
        (PaymentAttempt::Balance, PaymentStatus::DepositPaid) => {
            if booking.balance_declined_ref.as_deref() == Some(reference) {
                Step::Noop
            } else {
                next.balance_declined_ref = Some(reference.to_string());
                Step::advance(
                    Some(NotificationKind::PaymentDeclined { attempt }),
                    Some(format!("balance declined ({reference})")),
                )
            }
        }
        (PaymentAttempt::Balance, current) => Step::Reject(DomainError::InvalidStatusTransition {
            from: current.as_str().to_string(),
            to: PaymentStatus::Failed.as_str().to_string(),
            reason: String::from("no deposit has been collected"),
        }),
    }
}

fn change_status(
    booking: &Booking,
    next: &mut Booking,
    target: BookingStatus,
    notification: Option<NotificationKind>,
) -> Step {
    if booking.status == target {
        return Step::Noop;
    }
    match booking.status.validate_transition(target) {
        Ok(()) => {
            next.status = target;
            Step::advance(notification, None)
        }
        Err(e) => Step::Reject(e),
    }
}

fn attach_invoice(
    booking: &Booking,
    next: &mut Booking,
    invoice_id: &str,
    invoice_url: Option<&str>,
) -> Step {
    match booking.invoice_id.as_deref() {
        None => {
            next.invoice_id = Some(invoice_id.to_string());
            if next.invoice_url.is_none() {
                next.invoice_url = invoice_url.map(str::to_string);
            }
            Step::advance(None, Some(format!("invoice {invoice_id}")))
        }
        Some(existing) if existing == invoice_id => {
            if booking.invoice_url.is_none()
                && let Some(url) = invoice_url
            {
                next.invoice_url = Some(url.to_string());
                Step::advance(None, Some(format!("invoice {invoice_id} published")))
            } else {
                Step::Noop
            }
        }
        Some(existing) => Step::Reject(DomainError::InvalidStatusTransition {
            from: existing.to_string(),
            to: invoice_id.to_string(),
            reason: String::from("a different invoice is already attached"),
        }),
    }
}

fn mark_notified(booking: &Booking, next: &mut Booking, guard: NotificationGuard) -> Step {
    let already_sent: bool = match guard {
        NotificationGuard::ReviewRequest => booking.review_requested,
        NotificationGuard::Reengagement => booking.reengagement_sent,
        NotificationGuard::EventReminder => booking.event_reminder_sent,
        NotificationGuard::BalanceReminder => booking.balance_reminder_sent,
        NotificationGuard::Refund => booking.refund_notified,
        NotificationGuard::Anniversary(days) => booking.anniversaries_sent.contains(&days),
    };
    if already_sent {
        return Step::Noop;
    }
    if let Err(e) = guard_precondition(booking, guard) {
        return Step::Reject(e);
    }

    let notification: NotificationKind = match guard {
        NotificationGuard::ReviewRequest => {
            next.review_requested = true;
            NotificationKind::ReviewRequest
        }
        NotificationGuard::Reengagement => {
            next.reengagement_sent = true;
            NotificationKind::Reengagement
        }
        NotificationGuard::EventReminder => {
            next.event_reminder_sent = true;
            NotificationKind::EventReminder
        }
        NotificationGuard::BalanceReminder => {
            next.balance_reminder_sent = true;
            NotificationKind::BalanceReminder
        }
        NotificationGuard::Refund => {
            next.refund_notified = true;
            NotificationKind::RefundIssued {
                amount: booking.pricing.remaining,
            }
        }
        NotificationGuard::Anniversary(days) => {
            next.anniversaries_sent.push(days);
            NotificationKind::Anniversary { days }
        }
    };
    Step::advance(Some(notification), Some(guard.flag_name().to_string()))
}

fn guard_precondition(booking: &Booking, guard: NotificationGuard) -> Result<(), DomainError> {
    let (holds, reason): (bool, &str) = match guard {
        NotificationGuard::ReviewRequest | NotificationGuard::Anniversary(_) => (
            booking.status == BookingStatus::Completed,
            "booking is not completed",
        ),
        NotificationGuard::Reengagement => (
            booking.payment_status.is_deposit_collected(),
            "no payment was collected",
        ),
        NotificationGuard::EventReminder => (
            booking.status == BookingStatus::Active,
            "booking is not active",
        ),
        NotificationGuard::BalanceReminder => (
            booking.status == BookingStatus::Active
                && booking.payment_status == PaymentStatus::DepositPaid,
            "no balance is outstanding",
        ),
        NotificationGuard::Refund => (true, ""),
    };
    if holds {
        Ok(())
    } else {
        Err(DomainError::InvalidStatusTransition {
            from: format!(
                "{}/{}",
                booking.status.as_str(),
                booking.payment_status.as_str()
            ),
            to: guard.flag_name().to_string(),
            reason: reason.to_string(),
        })
    }
}
