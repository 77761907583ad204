// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{apply_ok, create_test_booking, create_test_persistence};
use crate::{HistoryEntry, Persistence, PersistenceError};
use rentbook::{Transition, TransitionResult};
use rentbook_domain::{Booking, BookingId, ContractStatus, PaymentStatus, ProcessorRefs};

fn deposit() -> Transition {
    Transition::MarkDepositPaid {
        payment_id: String::from("PAY-1"),
        refs: Some(ProcessorRefs {
            customer_id: String::from("CUST-1"),
            payment_source_id: String::from("CARD-1"),
        }),
    }
}

#[test]
fn test_persist_transition_writes_booking_and_record() {
    let mut persistence: Persistence = create_test_persistence();
    let booking: Booking = create_test_booking("bk-1", "2025-06-01", &["Slide"]);
    persistence.create_booking(&booking).unwrap();

    let result: TransitionResult = apply_ok(&booking, deposit());
    let event_id: i64 = persistence.persist_transition(&result).unwrap();

    let stored: Booking = persistence.get_booking(&BookingId::new("bk-1")).unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::DepositPaid);
    assert_eq!(stored.processor_customer_ref.as_deref(), Some("CUST-1"));

    let history: Vec<HistoryEntry> = persistence.history(&BookingId::new("bk-1")).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].event_id, event_id);
    assert_eq!(history[0].record, result.record);
    assert_eq!(history[0].record.before.payment_status, PaymentStatus::Pending);
    assert_eq!(history[0].record.after.payment_status, PaymentStatus::DepositPaid);
}

#[test]
fn test_history_is_ordered_oldest_first() {
    let mut persistence: Persistence = create_test_persistence();
    let booking: Booking = create_test_booking("bk-1", "2025-06-01", &["Slide"]);
    persistence.create_booking(&booking).unwrap();

    let first: TransitionResult = apply_ok(&booking, deposit());
    persistence.persist_transition(&first).unwrap();
    let second: TransitionResult = apply_ok(&first.new_booking, Transition::ReceiveContract);
    persistence.persist_transition(&second).unwrap();

    let history: Vec<HistoryEntry> = persistence.history(&BookingId::new("bk-1")).unwrap();
    let actions: Vec<&str> = history
        .iter()
        .map(|entry| entry.record.action.name.as_str())
        .collect();

    assert_eq!(
        actions,
        vec![
            first.record.action.name.as_str(),
            second.record.action.name.as_str()
        ]
    );
    assert!(history[0].event_id < history[1].event_id);
    assert_eq!(history[1].record.after.contract_status, ContractStatus::Received);
}

#[test]
fn test_persist_transition_for_missing_booking_keeps_nothing() {
    let mut persistence: Persistence = create_test_persistence();
    let booking: Booking = create_test_booking("bk-ghost", "2025-06-01", &["Slide"]);

    let result: TransitionResult = apply_ok(&booking, deposit());
    let err: PersistenceError = persistence.persist_transition(&result).unwrap_err();

    assert_eq!(err, PersistenceError::BookingNotFound(String::from("bk-ghost")));
    assert_eq!(
        persistence
            .count_transitions(&BookingId::new("bk-ghost"))
            .unwrap(),
        0
    );
}

#[test]
fn test_history_of_missing_booking_is_not_found() {
    let mut persistence: Persistence = create_test_persistence();

    assert!(
        persistence
            .history(&BookingId::new("bk-none"))
            .unwrap_err()
            .is_not_found()
    );
}

#[test]
fn test_history_entry_serializes_flat() {
    let mut persistence: Persistence = create_test_persistence();
    let booking: Booking = create_test_booking("bk-1", "2025-06-01", &["Slide"]);
    persistence.create_booking(&booking).unwrap();
    persistence
        .persist_transition(&apply_ok(&booking, Transition::Cancel))
        .unwrap();

    let history: Vec<HistoryEntry> = persistence.history(&BookingId::new("bk-1")).unwrap();
    let json: serde_json::Value = serde_json::to_value(&history[0]).unwrap();

    assert_eq!(json["bookingId"], "bk-1");
    assert_eq!(json["after"]["status"], "canceled");
    assert!(json["eventId"].is_i64());
}
