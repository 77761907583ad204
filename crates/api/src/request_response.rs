// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request and response types for engine operations.

use rentbook_domain::{
    Booking, BookingItem, BookingPatch, BookingStatus, ContractStatus, Customer, PaymentStatus,
    PricingBreakdown, PricingInputs,
};
use serde::{Deserialize, Serialize};

/// Request to book a cart, either through checkout or directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    /// The cart lines.
    pub cart: Vec<BookingItem>,
    /// Who is renting.
    pub customer: Customer,
    /// `YYYY-MM-DD` or `MM/DD/YYYY`.
    pub event_date: String,
    /// Delivery address.
    #[serde(default)]
    pub address: Option<String>,
    /// Referral, waiver, distance, staff and tax modifiers.
    #[serde(flatten)]
    pub pricing: PricingInputs,
}

/// Response after starting a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    /// The id of the booking waiting for its deposit.
    pub booking_id: String,
    /// Hosted checkout page for the deposit.
    pub checkout_url: String,
    /// The computed price breakdown.
    pub pricing: PricingBreakdown,
}

/// Request to check whether items are free on a date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    pub date: String,
    #[serde(default)]
    pub items: Vec<String>,
}

/// Acknowledgement returned for every authenticated webhook event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookAck {
    /// Always true; the event was authenticated and accepted.
    pub received: bool,
    /// What the event did: `applied`, `duplicate`, `rejected` or `ignored`.
    pub outcome: String,
}

impl WebhookAck {
    #[must_use]
    pub fn new(outcome: &str) -> Self {
        Self {
            received: true,
            outcome: outcome.to_string(),
        }
    }
}

/// Admin update of a booking.
///
/// Plain fields are merged. Status fields are applied as guarded
/// transitions after the merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingRequest {
    #[serde(flatten)]
    pub patch: BookingPatch,
    #[serde(default)]
    pub status: Option<BookingStatus>,
    #[serde(default)]
    pub contract_status: Option<ContractStatus>,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
}

/// Outcome of one guarded transition requested by an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionReport {
    pub transition: String,
    pub outcome: String,
}

/// Response after an admin update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBookingResponse {
    pub booking: Booking,
    pub transitions: Vec<TransitionReport>,
}

/// Request to set the admin note of a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminNoteRequest {
    pub note: String,
}

/// A booking as shown in the calendar view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    pub booking_id: String,
    pub customer_name: String,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub items: Vec<String>,
}

impl CalendarEntry {
    #[must_use]
    pub fn of(booking: &Booking) -> Self {
        Self {
            booking_id: booking.booking_id.to_string(),
            customer_name: booking.customer.name.clone(),
            status: booking.status,
            payment_status: booking.payment_status,
            items: booking.items.iter().map(|item| item.title.clone()).collect(),
        }
    }
}

/// All bookings of one event date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub bookings: Vec<CalendarEntry>,
}

/// Request to run the lifecycle scheduler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerRunRequest {
    /// Run as if today were this date. Defaults to the current UTC date.
    #[serde(default)]
    pub date: Option<String>,
}
