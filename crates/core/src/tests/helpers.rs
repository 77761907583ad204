// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Transition, TransitionOutcome, TransitionResult, apply};
use rentbook_audit::{Actor, Cause};
use rentbook_domain::{
    Booking, BookingId, BookingItem, Customer, DEFAULT_DEPOSIT_RATE, Money, PricingInputs,
    ProcessorRefs, compute_pricing, parse_event_date,
};
use time::macros::datetime;

pub fn create_test_actor() -> Actor {
    Actor::webhook()
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("evt-456"), String::from("payment.updated"))
}

pub fn create_test_refs() -> ProcessorRefs {
    ProcessorRefs {
        customer_id: String::from("CUST-1"),
        payment_source_id: String::from("CARD-1"),
    }
}

/// A pending booking for one $300 slide on 2025-06-01.
pub fn create_test_booking() -> Booking {
    let items: Vec<BookingItem> = vec![BookingItem {
        title: String::from("Slide"),
        price: Money::from_cents(30_000),
        quantity: None,
        mode: None,
    }];
    let pricing = compute_pricing(&items, &PricingInputs::default(), DEFAULT_DEPOSIT_RATE);
    Booking::new(
        BookingId::new("bk-1"),
        Customer {
            name: String::from("Jane Doe"),
            email: String::from("jane@example.com"),
            phone: String::from("555-0100"),
        },
        parse_event_date("2025-06-01").unwrap(),
        items,
        Some(String::from("12 Main St")),
        pricing,
        datetime!(2025-01-01 10:00 UTC),
    )
}

/// Applies a transition and returns the result, panicking unless it was applied.
pub fn apply_ok(booking: &Booking, transition: Transition) -> TransitionResult {
    match apply(booking, transition, create_test_actor(), create_test_cause()).unwrap() {
        TransitionOutcome::Applied(result) => *result,
        other => panic!("expected transition to apply, got {other:?}"),
    }
}

/// Applies a transition and returns the outcome.
pub fn apply_outcome(booking: &Booking, transition: Transition) -> TransitionOutcome {
    apply(booking, transition, create_test_actor(), create_test_cause()).unwrap()
}

pub fn deposit_paid() -> Transition {
    Transition::MarkDepositPaid {
        payment_id: String::from("PAY-1"),
        refs: Some(create_test_refs()),
    }
}
