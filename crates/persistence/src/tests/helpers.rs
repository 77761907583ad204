// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::Persistence;
use rentbook::{Transition, TransitionOutcome, TransitionResult, apply};
use rentbook_audit::{Actor, Cause};
use rentbook_domain::{
    Booking, BookingId, BookingItem, Customer, DEFAULT_DEPOSIT_RATE, Money, PricingBreakdown,
    PricingInputs, compute_pricing, parse_event_date,
};
use time::macros::datetime;

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory store")
}

/// A pending booking with one $100 line per title.
pub fn create_test_booking(id: &str, date: &str, titles: &[&str]) -> Booking {
    let items: Vec<BookingItem> = titles
        .iter()
        .map(|title| BookingItem {
            title: String::from(*title),
            price: Money::from_cents(10_000),
            quantity: None,
            mode: None,
        })
        .collect();
    let pricing: PricingBreakdown =
        compute_pricing(&items, &PricingInputs::default(), DEFAULT_DEPOSIT_RATE);
    Booking::new(
        BookingId::new(id),
        Customer {
            name: String::from("Jane Doe"),
            email: String::from("Jane@Example.com"),
            phone: String::from("555-0100"),
        },
        parse_event_date(date).unwrap(),
        items,
        Some(String::from("12 Main St")),
        pricing,
        datetime!(2025-01-01 10:00 UTC),
    )
}

/// Applies a transition, panicking unless it was applied.
pub fn apply_ok(booking: &Booking, transition: Transition) -> TransitionResult {
    let outcome: TransitionOutcome = apply(
        booking,
        transition,
        Actor::webhook(),
        Cause::new(String::from("evt-1"), String::from("payment.updated")),
    )
    .unwrap();
    match outcome {
        TransitionOutcome::Applied(result) => *result,
        other => panic!("expected transition to apply, got {other:?}"),
    }
}
