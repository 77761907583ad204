// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    apply_ok, apply_outcome, create_test_booking, create_test_refs, deposit_paid,
};
use crate::{CoreError, NotificationKind, Transition, TransitionOutcome, TransitionResult, apply};
use rentbook_audit::{Actor, Cause};
use rentbook_domain::{Booking, PaymentAttempt, PaymentStatus, ProcessorRefs};

#[test]
fn test_deposit_moves_pending_to_deposit_paid() {
    let booking: Booking = create_test_booking();

    let result: TransitionResult = apply_ok(&booking, deposit_paid());

    assert_eq!(result.new_booking.payment_status, PaymentStatus::DepositPaid);
    assert_eq!(result.notification, Some(NotificationKind::DepositReceived));
    assert_eq!(result.new_booking.processor_refs(), Some(create_test_refs()));
}

#[test]
fn test_applied_transition_emits_audit_record() {
    let booking: Booking = create_test_booking();

    let result: TransitionResult = apply_ok(&booking, deposit_paid());

    assert_eq!(result.record.booking_id, booking.booking_id);
    assert_eq!(result.record.action.name, "MarkDepositPaid");
    assert_eq!(result.record.actor.actor_type, "webhook");
    assert_eq!(result.record.cause.id, "evt-456");
    assert_eq!(result.record.before.payment_status, PaymentStatus::Pending);
    assert_eq!(result.record.after.payment_status, PaymentStatus::DepositPaid);
    assert!(
        result
            .record
            .action
            .details
            .as_ref()
            .unwrap()
            .contains("PAY-1")
    );
}

#[test]
fn test_replayed_deposit_is_a_noop() {
    let booking: Booking = create_test_booking();
    let first: TransitionResult = apply_ok(&booking, deposit_paid());

    let second: TransitionOutcome = apply_outcome(&first.new_booking, deposit_paid());

    assert_eq!(second, TransitionOutcome::AlreadyApplied);
}

#[test]
fn test_deposit_on_balance_paid_never_downgrades() {
    let mut booking: Booking = create_test_booking();
    booking.payment_status = PaymentStatus::BalancePaid;

    let outcome: TransitionOutcome = apply_outcome(&booking, deposit_paid());

    assert_eq!(outcome, TransitionOutcome::AlreadyApplied);
}

#[test]
fn test_deposit_after_failure_is_rejected() {
    let mut booking: Booking = create_test_booking();
    booking.payment_status = PaymentStatus::Failed;

    let outcome: TransitionOutcome = apply_outcome(&booking, deposit_paid());

    assert!(matches!(outcome, TransitionOutcome::Rejected(_)));
    assert_eq!(outcome.label(), "rejected");
}

#[test]
fn test_existing_refs_are_not_overwritten() {
    let mut booking: Booking = create_test_booking();
    booking.processor_customer_ref = Some(String::from("CUST-OLD"));
    booking.processor_payment_source_ref = Some(String::from("CARD-OLD"));

    let result: TransitionResult = apply_ok(&booking, deposit_paid());

    assert_eq!(
        result.new_booking.processor_refs(),
        Some(ProcessorRefs {
            customer_id: String::from("CUST-OLD"),
            payment_source_id: String::from("CARD-OLD"),
        })
    );
}

#[test]
fn test_failed_deposit_from_pending() {
    let booking: Booking = create_test_booking();
    let transition: Transition = Transition::MarkPaymentFailed {
        attempt: PaymentAttempt::Deposit,
        reference: String::from("PAY-2"),
    };

    let result: TransitionResult = apply_ok(&booking, transition.clone());
    assert_eq!(result.new_booking.payment_status, PaymentStatus::Failed);
    assert_eq!(
        result.notification,
        Some(NotificationKind::PaymentDeclined {
            attempt: PaymentAttempt::Deposit
        })
    );

    let replay: TransitionOutcome = apply_outcome(&result.new_booking, transition);
    assert_eq!(replay, TransitionOutcome::AlreadyApplied);
}

#[test]
fn test_failed_deposit_does_not_forfeit_collected_deposit() {
    let mut booking: Booking = create_test_booking();
    booking.payment_status = PaymentStatus::DepositPaid;

    let outcome: TransitionOutcome = apply_outcome(
        &booking,
        Transition::MarkPaymentFailed {
            attempt: PaymentAttempt::Deposit,
            reference: String::from("PAY-3"),
        },
    );

    assert!(matches!(outcome, TransitionOutcome::Rejected(_)));
}

#[test]
fn test_failed_balance_keeps_deposit_and_notifies_once_per_reference() {
    let mut booking: Booking = create_test_booking();
    booking.payment_status = PaymentStatus::DepositPaid;
    let transition: Transition = Transition::MarkPaymentFailed {
        attempt: PaymentAttempt::Balance,
        reference: String::from("autopay-bk-1-2025-06-01"),
    };

    let result: TransitionResult = apply_ok(&booking, transition.clone());
    assert_eq!(result.new_booking.payment_status, PaymentStatus::DepositPaid);
    assert_eq!(
        result.new_booking.balance_declined_ref.as_deref(),
        Some("autopay-bk-1-2025-06-01")
    );
    assert_eq!(
        result.notification,
        Some(NotificationKind::PaymentDeclined {
            attempt: PaymentAttempt::Balance
        })
    );

    let replay: TransitionOutcome = apply_outcome(&result.new_booking, transition);
    assert_eq!(replay, TransitionOutcome::AlreadyApplied);

    let other_attempt: TransitionResult = apply_ok(
        &result.new_booking,
        Transition::MarkPaymentFailed {
            attempt: PaymentAttempt::Balance,
            reference: String::from("PAY-9"),
        },
    );
    assert_eq!(
        other_attempt.new_booking.balance_declined_ref.as_deref(),
        Some("PAY-9")
    );
}

#[test]
fn test_balance_paid_requires_deposit() {
    let booking: Booking = create_test_booking();
    let transition: Transition = Transition::MarkBalancePaid {
        reference: String::from("INV-1"),
    };

    let outcome: TransitionOutcome = apply_outcome(&booking, transition.clone());
    assert!(matches!(outcome, TransitionOutcome::Rejected(_)));

    let deposit: TransitionResult = apply_ok(&booking, deposit_paid());
    let balance: TransitionResult = apply_ok(&deposit.new_booking, transition.clone());
    assert_eq!(balance.new_booking.payment_status, PaymentStatus::BalancePaid);
    assert_eq!(balance.notification, Some(NotificationKind::BalancePaid));

    let replay: TransitionOutcome = apply_outcome(&balance.new_booking, transition);
    assert_eq!(replay, TransitionOutcome::AlreadyApplied);
}

#[test]
fn test_attach_invoice_is_set_once() {
    let booking: Booking = create_test_booking();
    let attach = |id: &str, url: Option<&str>| Transition::AttachInvoice {
        invoice_id: String::from(id),
        invoice_url: url.map(String::from),
    };

    let first: TransitionResult = apply_ok(&booking, attach("INV-1", None));
    assert_eq!(first.new_booking.invoice_id.as_deref(), Some("INV-1"));
    assert_eq!(first.notification, None);

    let published: TransitionResult =
        apply_ok(&first.new_booking, attach("INV-1", Some("https://pay/INV-1")));
    assert_eq!(
        published.new_booking.invoice_url.as_deref(),
        Some("https://pay/INV-1")
    );

    let replay: TransitionOutcome =
        apply_outcome(&published.new_booking, attach("INV-1", Some("https://pay/other")));
    assert_eq!(replay, TransitionOutcome::AlreadyApplied);

    let other: TransitionOutcome = apply_outcome(&published.new_booking, attach("INV-2", None));
    assert!(matches!(other, TransitionOutcome::Rejected(_)));
}

#[test]
fn test_empty_invoice_id_is_malformed() {
    let booking: Booking = create_test_booking();

    let result: Result<TransitionOutcome, CoreError> = apply(
        &booking,
        Transition::AttachInvoice {
            invoice_id: String::from("  "),
            invoice_url: None,
        },
        Actor::scheduler(),
        Cause::new(String::from("run"), String::from("test")),
    );

    assert!(matches!(result, Err(CoreError::MalformedTransition(_))));
}

#[test]
fn test_input_booking_is_never_mutated() {
    let booking: Booking = create_test_booking();
    let snapshot: Booking = booking.clone();

    let _ = apply_ok(&booking, deposit_paid());

    assert_eq!(booking, snapshot);
}
