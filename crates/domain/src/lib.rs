// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod availability;
mod calendar;
mod dates;
mod error;
mod money;
mod pricing;
mod rules;
mod status;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use availability::{AvailabilityResult, ConflictReason, evaluate_availability};
pub use calendar::{CalendarInvite, INVITE_FILENAME, render_invite};
pub use dates::{event_date, format_compact_date, format_event_date, offset_days, parse_event_date};
pub use error::DomainError;
pub use money::{Money, Rate};
pub use pricing::{
    DAMAGE_WAIVER, DEFAULT_DEPOSIT_RATE, FRIEND_DISCOUNT, PricingBreakdown, PricingInputs,
    REPEAT_DISCOUNT, ReferralType, SALES_TAX, compute_pricing,
};
pub use rules::BookingRules;
pub use status::{BookingStatus, ContractStatus, PaymentAttempt, PaymentStatus};
pub use types::{Booking, BookingId, BookingItem, BookingPatch, Customer, ProcessorRefs};
pub use validation::{validate_customer, validate_items, validate_pricing};
