// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Pricing calculator.
//!
//! Maps a cart and its modifiers to a full price breakdown. Every step is
//! rounded to the cent before it feeds the next one:
//!
//! 1. subtotal is the flat sum of item prices
//! 2. referral discount (5% friend, 10% repeat customer)
//! 3. damage waiver, 8% of the discounted subtotal
//! 4. sales tax, 7% of discounted subtotal plus waiver plus distance charge
//! 5. total adds the staff fee, which is never taxed
//! 6. deposit is a configured share of the total, the rest is the balance

use crate::money::{Money, Rate};
use crate::types::BookingItem;
use serde::{Deserialize, Serialize};

/// Discount for a customer referred by a friend.
pub const FRIEND_DISCOUNT: Rate = Rate::from_basis_points(500);
/// Discount for a returning customer.
pub const REPEAT_DISCOUNT: Rate = Rate::from_basis_points(1000);
/// Optional damage waiver surcharge.
pub const DAMAGE_WAIVER: Rate = Rate::from_basis_points(800);
/// Sales tax.
pub const SALES_TAX: Rate = Rate::from_basis_points(700);
/// Default share of the total collected at checkout.
pub const DEFAULT_DEPOSIT_RATE: Rate = Rate::from_basis_points(3500);

/// How the customer heard about the business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReferralType {
    Friend,
    Repeat,
    /// Anything else, including an absent or unrecognised value.
    #[default]
    #[serde(other)]
    None,
}

impl ReferralType {
    /// Returns the discount rate for this referral.
    #[must_use]
    pub const fn discount_rate(self) -> Rate {
        match self {
            Self::Friend => FRIEND_DISCOUNT,
            Self::Repeat => REPEAT_DISCOUNT,
            Self::None => Rate::from_basis_points(0),
        }
    }
}

/// Modifiers applied on top of the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingInputs {
    pub referral_type: ReferralType,
    pub damage_waiver: bool,
    pub distance_charge: Money,
    pub staff_fee: Money,
    pub tax_exempt: bool,
}

/// A computed price breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    pub subtotal: Money,
    pub discount: Money,
    pub waiver: Money,
    pub tax: Money,
    pub distance_charge: Money,
    pub staff_fee: Money,
    pub total: Money,
    pub deposit: Money,
    pub remaining: Money,
}

impl PricingBreakdown {
    /// Returns true if deposit and remaining add up to the total.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.deposit + self.remaining == self.total
    }
}

/// Computes the price breakdown for a cart.
///
/// Quantities are ignored: each cart line contributes its price once.
#[must_use]
pub fn compute_pricing(
    items: &[BookingItem],
    inputs: &PricingInputs,
    deposit_rate: Rate,
) -> PricingBreakdown {
    let subtotal: Money = items.iter().map(|item| item.price).sum();
    let discount: Money = subtotal.apply_rate(inputs.referral_type.discount_rate());
    let after_discount: Money = subtotal.saturating_sub(discount);

    let waiver: Money = if inputs.damage_waiver {
        after_discount.apply_rate(DAMAGE_WAIVER)
    } else {
        Money::ZERO
    };

    let taxable: Money = after_discount + waiver + inputs.distance_charge;
    let tax: Money = if inputs.tax_exempt {
        Money::ZERO
    } else {
        taxable.apply_rate(SALES_TAX)
    };

    let total: Money = taxable + tax + inputs.staff_fee;
    let deposit: Money = total.apply_rate(deposit_rate);
    let remaining: Money = total - deposit;

    PricingBreakdown {
        subtotal,
        discount,
        waiver,
        tax,
        distance_charge: inputs.distance_charge,
        staff_fee: inputs.staff_fee,
        total,
        deposit,
        remaining,
    }
}
