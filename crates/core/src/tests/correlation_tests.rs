// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{CorrelationNote, autopay_key, checkout_key, invoice_key};
use rentbook_domain::{BookingId, PaymentAttempt, parse_event_date};

#[test]
fn test_note_render_and_parse() {
    let note: CorrelationNote =
        CorrelationNote::new(BookingId::new("bk-1"), PaymentAttempt::Balance);
    let rendered: String = note.render();
    assert_eq!(rendered, "booking_id=bk-1;purpose=balance");
    assert_eq!(CorrelationNote::parse(&rendered), Some(note));
}

#[test]
fn test_bare_id_note() {
    let note: CorrelationNote = CorrelationNote::parse(" 7f1c2a ").unwrap();
    assert_eq!(note.booking_id.as_str(), "7f1c2a");
    assert_eq!(note.purpose, None);
}

#[test]
fn test_unusable_notes() {
    assert_eq!(CorrelationNote::parse(""), None);
    assert_eq!(CorrelationNote::parse("Thanks for your order"), None);
    assert_eq!(CorrelationNote::parse("purpose=deposit"), None);
    assert_eq!(CorrelationNote::parse("booking_id=;purpose=deposit"), None);
}

#[test]
fn test_unknown_purpose_is_dropped() {
    let note: CorrelationNote = CorrelationNote::parse("booking_id=bk-1;purpose=tip").unwrap();
    assert_eq!(note.booking_id.as_str(), "bk-1");
    assert_eq!(note.purpose, None);
}

#[test]
fn test_idempotency_keys() {
    let id: BookingId = BookingId::new("bk-1");
    assert_eq!(checkout_key(&id), "checkout-bk-1");
    assert_eq!(invoice_key(&id), "invoice-bk-1");
    assert_eq!(
        autopay_key(&id, parse_event_date("2025-06-01").unwrap()),
        "autopay-bk-1-2025-06-01"
    );
}
