// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! One-time migration of legacy booking documents.
//!
//! Older records spelled the same field several ways (`date` and
//! `eventDate`, `name` and `customer_name`, a nested `pricing_breakdown`
//! next to top-level totals). Each alias is resolved here, once, into the
//! canonical `Booking` schema.

use rentbook_domain::{
    Booking, BookingId, BookingItem, BookingStatus, ContractStatus, Customer, DEFAULT_DEPOSIT_RATE,
    Money, PaymentStatus, PricingBreakdown, parse_event_date,
};
use serde_json::{Map, Value};
use std::str::FromStr;
use time::{Date, OffsetDateTime};
use time::format_description::well_known::Rfc3339;

use crate::error::PersistenceError;

const ID_KEYS: &[&str] = &["bookingId", "booking_id", "id"];
const NAME_KEYS: &[&str] = &["name", "customer_name", "customerName"];
const EMAIL_KEYS: &[&str] = &["email", "customerEmail", "customer_email"];
const PHONE_KEYS: &[&str] = &["phone", "customerPhone", "customer_phone"];
const DATE_KEYS: &[&str] = &["eventDate", "date", "event_date"];
const ITEM_KEYS: &[&str] = &["items", "cart", "rentals"];
const PRICING_KEYS: &[&str] = &["pricing", "pricing_breakdown", "pricingBreakdown"];
const ADDRESS_KEYS: &[&str] = &["address", "eventAddress", "event_address"];

/// Maps a legacy document onto the canonical booking schema.
///
/// `imported_at` stands in for a missing or unreadable creation time.
///
/// # Errors
///
/// Returns `PersistenceError::InvalidLegacyDocument` if the document is
/// not an object, lacks a customer name, email, event date or total, or
/// carries an unknown status value.
pub fn normalize_legacy_document(
    document: &Value,
    imported_at: OffsetDateTime,
) -> Result<Booking, PersistenceError> {
    let Value::Object(doc) = document else {
        return Err(invalid("document is not an object"));
    };

    let booking_id: BookingId =
        text(doc, ID_KEYS).map_or_else(BookingId::generate, |id| BookingId::new(&id));

    let customer_doc: &Map<String, Value> = match doc.get("customer") {
        Some(Value::Object(customer)) => customer,
        _ => doc,
    };
    let customer: Customer = Customer {
        name: text(customer_doc, NAME_KEYS).ok_or_else(|| invalid("missing customer name"))?,
        email: text(customer_doc, EMAIL_KEYS).ok_or_else(|| invalid("missing customer email"))?,
        phone: text(customer_doc, PHONE_KEYS).unwrap_or_default(),
    };

    let raw_date: String = text(doc, DATE_KEYS).ok_or_else(|| invalid("missing event date"))?;
    let event_date: Date = parse_event_date(&raw_date).map_err(|e| invalid(&e.to_string()))?;

    let items: Vec<BookingItem> = legacy_items(doc)?;
    let pricing: PricingBreakdown = legacy_pricing(doc, &items)?;

    let created_at: OffsetDateTime = text(doc, &["createdAt", "created_at"])
        .and_then(|raw| OffsetDateTime::parse(&raw, &Rfc3339).ok())
        .unwrap_or(imported_at);

    let mut booking: Booking = Booking::new(
        booking_id,
        customer,
        event_date,
        items,
        text(doc, ADDRESS_KEYS),
        pricing,
        created_at,
    );

    booking.status = status_field(doc, &["status"], BookingStatus::Active)?;
    booking.payment_status =
        status_field(doc, &["paymentStatus", "payment_status"], PaymentStatus::Pending)?;
    booking.contract_status = status_field(
        doc,
        &["contractStatus", "contract_status"],
        ContractStatus::Pending,
    )?;

    booking.checkout_url = text(doc, &["checkoutUrl", "checkout_url"]);
    booking.order_id = text(doc, &["orderId", "order_id"]);
    booking.invoice_id = text(doc, &["invoiceId", "invoice_id"]);
    booking.invoice_url = text(doc, &["invoiceUrl", "invoice_url"]);
    booking.processor_customer_ref =
        text(doc, &["processorCustomerRef", "customerId", "customer_id"]);
    booking.processor_payment_source_ref =
        text(doc, &["processorPaymentSourceRef", "cardId", "card_id"]);
    booking.admin_note = text(doc, &["adminNote", "admin_note", "note"]);
    booking.review_requested = flag(doc, &["reviewRequested", "review_requested"]);
    booking.reengagement_sent = flag(doc, &["reengagementSent", "reengagement_sent"]);

    Ok(booking)
}

fn invalid(reason: &str) -> PersistenceError {
    PersistenceError::InvalidLegacyDocument(reason.to_string())
}

/// First non-empty string (or number) stored under any of `keys`.
fn text(doc: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match doc.get(*key) {
        Some(Value::String(value)) if !value.trim().is_empty() => Some(value.trim().to_string()),
        Some(Value::Number(value)) => Some(value.to_string()),
        _ => None,
    })
}

fn flag(doc: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter()
        .any(|key| matches!(doc.get(*key), Some(Value::Bool(true))))
}

/// Amount stored under any of `keys`, as a number or a numeric string.
fn amount(doc: &Map<String, Value>, keys: &[&str]) -> Result<Option<Money>, PersistenceError> {
    for key in keys {
        let value: Option<f64> = match doc.get(*key) {
            Some(Value::Number(number)) => number.as_f64(),
            Some(Value::String(raw)) => raw.trim().trim_start_matches('$').parse::<f64>().ok(),
            _ => None,
        };
        if let Some(value) = value {
            return Money::from_decimal(key, value)
                .map(Some)
                .map_err(|e| invalid(&e.to_string()));
        }
    }
    Ok(None)
}

fn status_field<T: FromStr<Err = rentbook_domain::DomainError>>(
    doc: &Map<String, Value>,
    keys: &[&str],
    default: T,
) -> Result<T, PersistenceError> {
    text(doc, keys).map_or(Ok(default), |raw| {
        T::from_str(&raw.to_lowercase()).map_err(|e| invalid(&e.to_string()))
    })
}

fn legacy_items(doc: &Map<String, Value>) -> Result<Vec<BookingItem>, PersistenceError> {
    let Some(Value::Array(lines)) = ITEM_KEYS.iter().find_map(|key| doc.get(*key)) else {
        return Ok(Vec::new());
    };

    let mut items: Vec<BookingItem> = Vec::with_capacity(lines.len());
    for line in lines {
        match line {
            Value::String(title) => items.push(BookingItem {
                title: title.trim().to_string(),
                price: Money::ZERO,
                quantity: None,
                mode: None,
            }),
            Value::Object(line) => {
                let title: String =
                    text(line, &["title", "name"]).ok_or_else(|| invalid("item without title"))?;
                let quantity: Option<u32> = line
                    .get("quantity")
                    .and_then(Value::as_u64)
                    .and_then(|q| u32::try_from(q).ok());
                items.push(BookingItem {
                    title,
                    price: amount(line, &["price", "unitPrice"])?.unwrap_or(Money::ZERO),
                    quantity,
                    mode: text(line, &["mode"]),
                });
            }
            _ => return Err(invalid("item is neither a title nor an object")),
        }
    }
    Ok(items)
}

/// Rebuilds the price breakdown from a nested breakdown, top-level totals,
/// or both. Nested values win over top-level ones.
fn legacy_pricing(
    doc: &Map<String, Value>,
    items: &[BookingItem],
) -> Result<PricingBreakdown, PersistenceError> {
    let empty: Map<String, Value> = Map::new();
    let nested: &Map<String, Value> = PRICING_KEYS
        .iter()
        .find_map(|key| match doc.get(*key) {
            Some(Value::Object(pricing)) => Some(pricing),
            _ => None,
        })
        .unwrap_or(&empty);

    let lookup = |keys: &[&str]| -> Result<Option<Money>, PersistenceError> {
        match amount(nested, keys)? {
            Some(value) => Ok(Some(value)),
            None => amount(doc, keys),
        }
    };

    let total: Money = lookup(&["total"])?.ok_or_else(|| invalid("missing total"))?;
    let deposit_field: Option<Money> = lookup(&["deposit"])?;
    let remaining_field: Option<Money> = lookup(&["remaining", "balance"])?;

    let (deposit, remaining): (Money, Money) = match (deposit_field, remaining_field) {
        (Some(deposit), Some(remaining)) => (deposit, remaining),
        (Some(deposit), None) => (deposit, total.saturating_sub(deposit)),
        (None, Some(remaining)) => (total.saturating_sub(remaining), remaining),
        (None, None) => {
            let deposit: Money = total.apply_rate(DEFAULT_DEPOSIT_RATE);
            (deposit, total.saturating_sub(deposit))
        }
    };

    let subtotal: Money = match lookup(&["subtotal"])? {
        Some(subtotal) => subtotal,
        None => items.iter().map(|item| item.price).sum(),
    };

    Ok(PricingBreakdown {
        subtotal,
        discount: lookup(&["discount"])?.unwrap_or(Money::ZERO),
        waiver: lookup(&["waiver", "damageWaiver"])?.unwrap_or(Money::ZERO),
        tax: lookup(&["tax"])?.unwrap_or(Money::ZERO),
        distance_charge: lookup(&["distanceCharge", "distance_charge"])?.unwrap_or(Money::ZERO),
        staff_fee: lookup(&["staffFee", "staff_fee"])?.unwrap_or(Money::ZERO),
        total,
        deposit,
        remaining,
    })
}
