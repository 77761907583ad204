// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking status flags and their legal transitions.
//!
//! A booking carries three independent flags: the lifecycle `status`,
//! the `paymentStatus` and the `contractStatus`. Each flag validates
//! its own transitions; the guarded-transition primitive in the core
//! crate decides whether a requested change is a no-op, an advance, or
//! a rejection.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Booking is live and counts towards availability
    Active,
    /// Event has happened
    Completed,
    /// Booking was called off
    Canceled,
}

impl BookingStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
        }
    }

    /// Returns true if no transition out of this status exists.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Canceled)
    }

    /// Validates a move from this status to `new_status`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatusTransition` unless the move is
    /// `active -> completed` or `active -> canceled`.
    pub fn validate_transition(&self, new_status: Self) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: String::from("cannot transition from terminal state"),
            });
        }
        if new_status == Self::Active {
            return Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: String::from("booking is already active"),
            });
        }
        Ok(())
    }
}

impl FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            // Older records spell it with two l's
            "canceled" | "cancelled" => Ok(Self::Canceled),
            _ => Err(DomainError::InvalidStatus {
                kind: "status",
                value: s.to_string(),
            }),
        }
    }
}

/// Payment progress of a booking.
///
/// `pending -> deposit_paid -> balance_paid` is monotonic. `failed` is a
/// side branch reachable from `pending` (deposit declined) or from
/// `deposit_paid` when a balance attempt fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    DepositPaid,
    BalancePaid,
    Failed,
}

impl PaymentStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::DepositPaid => "deposit_paid",
            Self::BalancePaid => "balance_paid",
            Self::Failed => "failed",
        }
    }

    /// Position on the monotonic payment path, `None` for `failed`.
    #[must_use]
    pub const fn progress(&self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::DepositPaid => Some(1),
            Self::BalancePaid => Some(2),
            Self::Failed => None,
        }
    }

    /// Returns true if this status is on the monotonic path at or beyond `target`.
    #[must_use]
    pub fn has_reached(&self, target: Self) -> bool {
        match (self.progress(), target.progress()) {
            (Some(current), Some(wanted)) => current >= wanted,
            (None, None) => true,
            _ => false,
        }
    }

    /// Returns true if at least the deposit has been collected.
    #[must_use]
    pub const fn is_deposit_collected(&self) -> bool {
        matches!(self, Self::DepositPaid | Self::BalancePaid)
    }

    /// Validates a move from this status to `new_status`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatusTransition` if the move is not on
    /// the payment path.
    pub fn validate_transition(&self, new_status: Self) -> Result<(), DomainError> {
        let valid: bool = matches!(
            (self, new_status),
            (Self::Pending, Self::DepositPaid | Self::Failed)
                | (Self::DepositPaid, Self::BalancePaid | Self::Failed)
        );
        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: String::from("transition not permitted by payment lifecycle rules"),
            })
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "deposit_paid" => Ok(Self::DepositPaid),
            "balance_paid" | "paid_in_full" => Ok(Self::BalancePaid),
            "failed" => Ok(Self::Failed),
            _ => Err(DomainError::InvalidStatus {
                kind: "paymentStatus",
                value: s.to_string(),
            }),
        }
    }
}

/// Rental contract progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Pending,
    Received,
}

impl ContractStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Received => "received",
        }
    }

    /// Validates a move from this status to `new_status`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatusTransition` unless the move is
    /// `pending -> received`.
    pub fn validate_transition(&self, new_status: Self) -> Result<(), DomainError> {
        if *self == Self::Pending && new_status == Self::Received {
            return Ok(());
        }
        Err(DomainError::InvalidStatusTransition {
            from: self.as_str().to_string(),
            to: new_status.as_str().to_string(),
            reason: String::from("a received contract cannot be withdrawn"),
        })
    }
}

impl FromStr for ContractStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "received" => Ok(Self::Received),
            _ => Err(DomainError::InvalidStatus {
                kind: "contractStatus",
                value: s.to_string(),
            }),
        }
    }
}

/// Which payment attempt an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentAttempt {
    Deposit,
    Balance,
}

impl PaymentAttempt {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Balance => "balance",
        }
    }
}

impl FromStr for PaymentAttempt {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(Self::Deposit),
            "balance" => Ok(Self::Balance),
            _ => Err(DomainError::InvalidStatus {
                kind: "purpose",
                value: s.to_string(),
            }),
        }
    }
}
