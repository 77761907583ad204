// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::money::Money;
use crate::pricing::PricingBreakdown;
use crate::types::{BookingItem, Customer};

/// Validates that the customer's contact fields are present.
///
/// # Arguments
///
/// * `customer` - The customer to validate
///
/// # Errors
///
/// Returns an error if:
/// - The name is empty
/// - The email is empty or has no `@`
/// - The phone is empty
pub fn validate_customer(customer: &Customer) -> Result<(), DomainError> {
    // Rule: name must not be empty
    if customer.name.trim().is_empty() {
        return Err(DomainError::InvalidCustomerName(String::from(
            "Name cannot be empty",
        )));
    }

    // Rule: email must look like an address
    let email: &str = customer.email.trim();
    if email.is_empty() {
        return Err(DomainError::InvalidCustomerEmail(String::from(
            "Email cannot be empty",
        )));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
        _ => {
            return Err(DomainError::InvalidCustomerEmail(format!(
                "'{email}' is not an email address"
            )));
        }
    }

    // Rule: phone must not be empty
    if customer.phone.trim().is_empty() {
        return Err(DomainError::InvalidCustomerPhone(String::from(
            "Phone cannot be empty",
        )));
    }

    Ok(())
}

/// Validates a cart.
///
/// # Errors
///
/// Returns `DomainError::EmptyCart` for an empty cart and
/// `DomainError::InvalidItemTitle` for a line without a title. Prices are
/// already non-negative by construction of `Money` deserialization.
pub fn validate_items(items: &[BookingItem]) -> Result<(), DomainError> {
    if items.is_empty() {
        return Err(DomainError::EmptyCart);
    }
    if let Some(index) = items.iter().position(|item| item.title.trim().is_empty()) {
        return Err(DomainError::InvalidItemTitle { index });
    }
    Ok(())
}

/// Validates that every amount of a computed breakdown is storable.
///
/// Each cart price is capped on the way in, but a sum of capped prices is
/// not.
///
/// # Errors
///
/// Returns `DomainError::InvalidAmount` naming the first amount above
/// [`Money::MAX`].
pub fn validate_pricing(pricing: &PricingBreakdown) -> Result<(), DomainError> {
    let amounts: [(&str, Money); 9] = [
        ("subtotal", pricing.subtotal),
        ("discount", pricing.discount),
        ("waiver", pricing.waiver),
        ("tax", pricing.tax),
        ("distanceCharge", pricing.distance_charge),
        ("staffFee", pricing.staff_fee),
        ("total", pricing.total),
        ("deposit", pricing.deposit),
        ("remaining", pricing.remaining),
    ];
    match amounts.iter().find(|(_, amount)| amount.exceeds_max()) {
        Some((field, amount)) => Err(DomainError::InvalidAmount {
            field: (*field).to_string(),
            reason: format!("{amount} exceeds the supported maximum of {}", Money::MAX),
        }),
        None => Ok(()),
    }
}
