// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    Booking, BookingId, BookingItem, Customer, DEFAULT_DEPOSIT_RATE, Money, PricingBreakdown,
    PricingInputs, compute_pricing, parse_event_date,
};
use time::OffsetDateTime;
use time::macros::datetime;

pub fn create_test_customer() -> Customer {
    Customer {
        name: String::from("Jane Doe"),
        email: String::from("jane@example.com"),
        phone: String::from("555-0100"),
    }
}

pub fn create_test_item(title: &str, dollars: i64) -> BookingItem {
    BookingItem {
        title: String::from(title),
        price: Money::from_cents(dollars * 100),
        quantity: None,
        mode: None,
    }
}

pub fn create_test_booking(id: &str, date: &str, titles: &[&str]) -> Booking {
    let items: Vec<BookingItem> = titles
        .iter()
        .map(|title| create_test_item(title, 100))
        .collect();
    let pricing: PricingBreakdown =
        compute_pricing(&items, &PricingInputs::default(), DEFAULT_DEPOSIT_RATE);
    let created_at: OffsetDateTime = datetime!(2025-01-01 10:00 UTC);
    Booking::new(
        BookingId::new(id),
        create_test_customer(),
        parse_event_date(date).unwrap(),
        items,
        Some(String::from("12 Main St")),
        pricing,
        created_at,
    )
}
