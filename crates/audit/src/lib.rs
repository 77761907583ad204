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
    clippy::unwrap_used,
    clippy::expect_used
)]

#[cfg(test)]
mod tests;

use rentbook_domain::{Booking, BookingId, BookingStatus, ContractStatus, PaymentStatus};
use serde::{Deserialize, Serialize};

/// Represents the entity performing an action.
///
/// Booking state changes come from three places: inbound payment
/// webhooks, the daily scheduler, and admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (`webhook`, `scheduler`, `admin`, `customer`).
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }

    /// The payment processor delivering a webhook.
    #[must_use]
    pub fn webhook() -> Self {
        Self::new(String::from("payment-processor"), String::from("webhook"))
    }

    /// The daily lifecycle scheduler.
    #[must_use]
    pub fn scheduler() -> Self {
        Self::new(String::from("lifecycle-scheduler"), String::from("scheduler"))
    }

    /// An admin identified by the fronting gateway.
    #[must_use]
    pub fn admin(identity: &str) -> Self {
        Self::new(identity.to_string(), String::from("admin"))
    }

    /// The customer placing a booking.
    #[must_use]
    pub fn customer(email: &str) -> Self {
        Self::new(email.to_string(), String::from("customer"))
    }
}

/// Represents the reason or trigger for an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cause {
    /// Identifier of the trigger (webhook event id, run date, request id).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// Represents the specific action performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The name of the action (e.g., "`MarkDepositPaid`", "`Cancel`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// The three status flags of a booking at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub contract_status: ContractStatus,
}

impl StateSnapshot {
    /// Captures the status flags of a booking.
    #[must_use]
    pub const fn of(booking: &Booking) -> Self {
        Self {
            status: booking.status,
            payment_status: booking.payment_status,
            contract_status: booking.contract_status,
        }
    }
}

/// An immutable record of one applied booking transition.
///
/// Every applied transition produces exactly one record. Guard no-ops and
/// rejected transitions produce none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRecord {
    /// The booking the transition applied to.
    pub booking_id: BookingId,
    /// The actor who initiated this state change.
    pub actor: Actor,
    /// The cause or reason for this state change.
    pub cause: Cause,
    /// The action that was performed.
    pub action: Action,
    /// The flags before the transition.
    pub before: StateSnapshot,
    /// The flags after the transition.
    pub after: StateSnapshot,
}

impl TransitionRecord {
    /// Creates a new `TransitionRecord`.
    #[must_use]
    pub const fn new(
        booking_id: BookingId,
        actor: Actor,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
    ) -> Self {
        Self {
            booking_id,
            actor,
            cause,
            action,
            before,
            after,
        }
    }
}
