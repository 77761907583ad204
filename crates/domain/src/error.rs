// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The cart or item list is empty.
    EmptyCart,
    /// A monetary amount is negative, not finite, or out of range.
    InvalidAmount {
        /// The field carrying the amount.
        field: String,
        /// Description of the problem.
        reason: String,
    },
    /// Customer name is empty or invalid.
    InvalidCustomerName(String),
    /// Customer email is empty or invalid.
    InvalidCustomerEmail(String),
    /// Customer phone is empty or invalid.
    InvalidCustomerPhone(String),
    /// An item title is empty.
    InvalidItemTitle {
        /// Zero-based position of the item in the cart.
        index: usize,
    },
    /// Failed to parse date from string.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
    /// A status string does not name a known status.
    InvalidStatus {
        /// The status family (`status`, `paymentStatus`, `contractStatus`).
        kind: &'static str,
        /// The rejected value.
        value: String,
    },
    /// A status change is not permitted by the lifecycle rules.
    InvalidStatusTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
        /// Why the transition was refused.
        reason: String,
    },
    /// The deposit percentage is outside 0..=100.
    InvalidDepositPercent(u32),
    /// A booking rules document is inconsistent.
    InvalidBookingRules(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCart => write!(f, "Cart must contain at least one item"),
            Self::InvalidAmount { field, reason } => {
                write!(f, "Invalid amount for '{field}': {reason}")
            }
            Self::InvalidCustomerName(msg) => write!(f, "Invalid customer name: {msg}"),
            Self::InvalidCustomerEmail(msg) => write!(f, "Invalid customer email: {msg}"),
            Self::InvalidCustomerPhone(msg) => write!(f, "Invalid customer phone: {msg}"),
            Self::InvalidItemTitle { index } => {
                write!(f, "Item at position {index} has an empty title")
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
            Self::InvalidStatus { kind, value } => {
                write!(f, "Invalid {kind} value: '{value}'")
            }
            Self::InvalidStatusTransition { from, to, reason } => {
                write!(f, "Invalid status transition from '{from}' to '{to}': {reason}")
            }
            Self::InvalidDepositPercent(value) => {
                write!(
                    f,
                    "Invalid deposit percent: {value}. Must be between 0 and 100"
                )
            }
            Self::InvalidBookingRules(msg) => write!(f, "Invalid booking rules: {msg}"),
        }
    }
}

impl std::error::Error for DomainError {}
