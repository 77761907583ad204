// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Correlation notes and idempotency keys shared with the payment processor.
//!
//! Every order, invoice and charge created for a booking carries a note of
//! the form `booking_id=<id>;purpose=<deposit|balance>` so inbound events
//! can be routed back. Notes written before the format existed hold the
//! bare booking id.

use rentbook_domain::{BookingId, PaymentAttempt, format_event_date};
use time::Date;

/// A parsed correlation note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationNote {
    pub booking_id: BookingId,
    pub purpose: Option<PaymentAttempt>,
}

impl CorrelationNote {
    #[must_use]
    pub const fn new(booking_id: BookingId, purpose: PaymentAttempt) -> Self {
        Self {
            booking_id,
            purpose: Some(purpose),
        }
    }

    /// Renders the note.
    #[must_use]
    pub fn render(&self) -> String {
        match self.purpose {
            Some(purpose) => format!("booking_id={};purpose={}", self.booking_id, purpose.as_str()),
            None => format!("booking_id={}", self.booking_id),
        }
    }

    /// Parses a note. Returns `None` if no booking id can be found.
    #[must_use]
    pub fn parse(note: &str) -> Option<Self> {
        let trimmed: &str = note.trim();
        if trimmed.is_empty() {
            return None;
        }
        if !trimmed.contains('=') {
            // Bare id; reject free text that happens to sit in the note
            if trimmed.contains(char::is_whitespace) {
                return None;
            }
            return Some(Self {
                booking_id: BookingId::new(trimmed),
                purpose: None,
            });
        }

        let mut booking_id: Option<BookingId> = None;
        let mut purpose: Option<PaymentAttempt> = None;
        for pair in trimmed.split(';') {
            if let Some((key, value)) = pair.split_once('=') {
                match key.trim() {
                    "booking_id" | "bookingId" if !value.trim().is_empty() => {
                        booking_id = Some(BookingId::new(value));
                    }
                    "purpose" => purpose = value.trim().parse().ok(),
                    _ => {}
                }
            }
        }
        booking_id.map(|booking_id| Self {
            booking_id,
            purpose,
        })
    }
}

/// Idempotency key for the checkout order of a booking.
#[must_use]
pub fn checkout_key(booking_id: &BookingId) -> String {
    format!("checkout-{booking_id}")
}

/// Idempotency key for the balance invoice of a booking.
#[must_use]
pub fn invoice_key(booking_id: &BookingId) -> String {
    format!("invoice-{booking_id}")
}

/// Idempotency key for the autopay charge of a booking's event.
#[must_use]
pub fn autopay_key(booking_id: &BookingId, event_date: Date) -> String {
    format!("autopay-{booking_id}-{}", format_event_date(event_date))
}
