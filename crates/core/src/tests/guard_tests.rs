// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! One-shot notification guards.

use crate::tests::helpers::{apply_ok, apply_outcome, create_test_booking};
use crate::{NotificationGuard, NotificationKind, Transition, TransitionOutcome, TransitionResult};
use rentbook_domain::{Booking, BookingStatus, Money, PaymentStatus};

fn notified(guard: NotificationGuard) -> Transition {
    Transition::MarkNotified(guard)
}

#[test]
fn test_review_request_requires_completed_booking() {
    let booking: Booking = create_test_booking();
    let outcome: TransitionOutcome =
        apply_outcome(&booking, notified(NotificationGuard::ReviewRequest));
    assert!(matches!(outcome, TransitionOutcome::Rejected(_)));

    let mut completed: Booking = create_test_booking();
    completed.status = BookingStatus::Completed;
    let result: TransitionResult = apply_ok(&completed, notified(NotificationGuard::ReviewRequest));
    assert!(result.new_booking.review_requested);
    assert_eq!(result.notification, Some(NotificationKind::ReviewRequest));

    let replay: TransitionOutcome =
        apply_outcome(&result.new_booking, notified(NotificationGuard::ReviewRequest));
    assert_eq!(replay, TransitionOutcome::AlreadyApplied);
}

#[test]
fn test_reengagement_requires_collected_payment() {
    let booking: Booking = create_test_booking();
    let outcome: TransitionOutcome =
        apply_outcome(&booking, notified(NotificationGuard::Reengagement));
    assert!(matches!(outcome, TransitionOutcome::Rejected(_)));

    let mut paid: Booking = create_test_booking();
    paid.payment_status = PaymentStatus::BalancePaid;
    let result: TransitionResult = apply_ok(&paid, notified(NotificationGuard::Reengagement));
    assert!(result.new_booking.reengagement_sent);
}

#[test]
fn test_event_reminder_flag() {
    let booking: Booking = create_test_booking();
    let result: TransitionResult = apply_ok(&booking, notified(NotificationGuard::EventReminder));
    assert!(result.new_booking.event_reminder_sent);
    assert_eq!(result.notification, Some(NotificationKind::EventReminder));
    assert_eq!(result.record.action.name, "MarkNotified");
    assert_eq!(
        result.record.action.details.as_deref(),
        Some("eventReminderSent")
    );
}

#[test]
fn test_balance_reminder_only_with_outstanding_balance() {
    let booking: Booking = create_test_booking();
    let outcome: TransitionOutcome =
        apply_outcome(&booking, notified(NotificationGuard::BalanceReminder));
    assert!(matches!(outcome, TransitionOutcome::Rejected(_)));

    let mut deposit_paid: Booking = create_test_booking();
    deposit_paid.payment_status = PaymentStatus::DepositPaid;
    let result: TransitionResult =
        apply_ok(&deposit_paid, notified(NotificationGuard::BalanceReminder));
    assert!(result.new_booking.balance_reminder_sent);
}

#[test]
fn test_refund_carries_remaining_balance() {
    let booking: Booking = create_test_booking();

    let result: TransitionResult = apply_ok(&booking, notified(NotificationGuard::Refund));

    assert_eq!(
        result.notification,
        Some(NotificationKind::RefundIssued {
            amount: Money::from_cents(20_865)
        })
    );
    let replay: TransitionOutcome =
        apply_outcome(&result.new_booking, notified(NotificationGuard::Refund));
    assert_eq!(replay, TransitionOutcome::AlreadyApplied);
}

#[test]
fn test_anniversaries_are_tracked_per_offset() {
    let mut booking: Booking = create_test_booking();
    booking.status = BookingStatus::Completed;

    let half_year: TransitionResult =
        apply_ok(&booking, notified(NotificationGuard::Anniversary(182)));
    assert_eq!(half_year.new_booking.anniversaries_sent, vec![182]);

    let replay: TransitionOutcome = apply_outcome(
        &half_year.new_booking,
        notified(NotificationGuard::Anniversary(182)),
    );
    assert_eq!(replay, TransitionOutcome::AlreadyApplied);

    let full_year: TransitionResult = apply_ok(
        &half_year.new_booking,
        notified(NotificationGuard::Anniversary(365)),
    );
    assert_eq!(full_year.new_booking.anniversaries_sent, vec![182, 365]);
    assert_eq!(
        full_year.notification,
        Some(NotificationKind::Anniversary { days: 365 })
    );
}
