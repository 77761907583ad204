// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The canonical booking schema.

use crate::dates::event_date;
use crate::money::Money;
use crate::pricing::PricingBreakdown;
use crate::status::{BookingStatus, ContractStatus, PaymentStatus};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

/// Opaque booking identifier.
///
/// New bookings receive a random UUID. Imported records keep whatever
/// identifier the old store assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(String);

impl BookingId {
    /// Creates an identifier from an existing value.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.trim().to_string())
    }

    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the identifier is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Contact details of the person renting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// One line of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingItem {
    pub title: String,
    #[serde(alias = "unitPrice")]
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    /// Free-form rental mode (e.g. `dry`, `wet`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

/// A booking document.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub booking_id: BookingId,
    pub customer: Customer,
    #[serde(with = "event_date")]
    pub event_date: Date,
    pub items: Vec<BookingItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub pricing: PricingBreakdown,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub contract_status: ContractStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor_customer_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor_payment_source_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_note: Option<String>,
    #[serde(default)]
    pub review_requested: bool,
    #[serde(default)]
    pub reengagement_sent: bool,
    #[serde(default)]
    pub event_reminder_sent: bool,
    #[serde(default)]
    pub balance_reminder_sent: bool,
    #[serde(default)]
    pub refund_notified: bool,
    /// Day offsets (182, 365) for which an anniversary note went out.
    #[serde(default)]
    pub anniversaries_sent: Vec<u32>,
    /// Reference of the last balance attempt a decline notice was sent for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_declined_ref: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Booking {
    /// Creates a booking in its initial state: active, nothing paid, no contract.
    #[must_use]
    pub const fn new(
        booking_id: BookingId,
        customer: Customer,
        event_date: Date,
        items: Vec<BookingItem>,
        address: Option<String>,
        pricing: PricingBreakdown,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            booking_id,
            customer,
            event_date,
            items,
            address,
            pricing,
            status: BookingStatus::Active,
            payment_status: PaymentStatus::Pending,
            contract_status: ContractStatus::Pending,
            checkout_url: None,
            order_id: None,
            invoice_id: None,
            invoice_url: None,
            processor_customer_ref: None,
            processor_payment_source_ref: None,
            admin_note: None,
            review_requested: false,
            reengagement_sent: false,
            event_reminder_sent: false,
            balance_reminder_sent: false,
            refund_notified: false,
            anniversaries_sent: Vec::new(),
            balance_declined_ref: None,
            created_at,
        }
    }

    /// Returns the stored processor references if both are present.
    #[must_use]
    pub fn processor_refs(&self) -> Option<ProcessorRefs> {
        match (
            &self.processor_customer_ref,
            &self.processor_payment_source_ref,
        ) {
            (Some(customer_id), Some(payment_source_id))
                if !customer_id.is_empty() && !payment_source_id.is_empty() =>
            {
                Some(ProcessorRefs {
                    customer_id: customer_id.clone(),
                    payment_source_id: payment_source_id.clone(),
                })
            }
            _ => None,
        }
    }

    /// Returns true if any cart line carries the given title.
    #[must_use]
    pub fn reserves_item(&self, title: &str) -> bool {
        self.items.iter().any(|item| item.title == title)
    }

    /// Returns true if the booking holds its date for availability purposes.
    #[must_use]
    pub fn holds_date(&self) -> bool {
        self.status == BookingStatus::Active && self.payment_status != PaymentStatus::Failed
    }
}

/// Payment-processor references captured from the first successful deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorRefs {
    pub customer_id: String,
    pub payment_source_id: String,
}

/// Plain field edits an admin may merge into a booking.
///
/// Identifiers, pricing, items and status flags are not part of the
/// patch; status flags change only through guarded transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(with = "optional_event_date")]
    pub event_date: Option<Date>,
    pub address: Option<String>,
    pub admin_note: Option<String>,
}

impl BookingPatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.event_date.is_none()
            && self.address.is_none()
            && self.admin_note.is_none()
    }

    /// Merges the patch into a booking, keeping fields the patch leaves unset.
    pub fn merge_into(&self, booking: &mut Booking) {
        if let Some(name) = &self.name {
            booking.customer.name.clone_from(name);
        }
        if let Some(email) = &self.email {
            booking.customer.email.clone_from(email);
        }
        if let Some(phone) = &self.phone {
            booking.customer.phone.clone_from(phone);
        }
        if let Some(date) = self.event_date {
            booking.event_date = date;
        }
        if let Some(address) = &self.address {
            booking.address = Some(address.clone());
        }
        if let Some(note) = &self.admin_note {
            booking.admin_note = Some(note.clone());
        }
    }
}

mod optional_event_date {
    use crate::dates::{format_event_date, parse_event_date};
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_str(&format_event_date(*date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Date>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|value| parse_event_date(&value).map_err(serde::de::Error::custom))
            .transpose()
    }
}
