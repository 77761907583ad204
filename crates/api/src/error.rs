// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the engine boundary.

use rentbook::CoreError;
use rentbook_domain::DomainError;
use rentbook_persistence::PersistenceError;

use crate::ports::ProcessorError;

/// Engine-level errors.
///
/// These are distinct from domain, core and store errors and represent the
/// contract callers see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The cart has no items.
    EmptyCart,
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// The webhook signature did not match. Carries no detail on purpose.
    InvalidSignature,
    /// The caller lacks the identity an operation requires.
    Unauthorized {
        /// The action that was attempted.
        action: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// A lifecycle rule refused the change.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// The requested date or items are not available.
    Unavailable {
        /// Why the request cannot be booked.
        reason: String,
        /// The conflicting item, for item conflicts.
        conflict: Option<String>,
    },
    /// The payment processor failed or refused a request.
    PaymentProcessor {
        /// A description of the failure.
        message: String,
    },
    /// The booking store could not complete the operation.
    StoreUnavailable {
        /// A description of the failure.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCart => write!(f, "Cart cannot be empty"),
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::InvalidSignature => write!(f, "Invalid signature"),
            Self::Unauthorized { action } => {
                write!(f, "Unauthorized: '{action}' requires an admin identity")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => write!(f, "{resource_type} not found: {message}"),
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::Unavailable { reason, conflict } => match conflict {
                Some(item) => write!(f, "Not available ({reason}): {item}"),
                None => write!(f, "Not available ({reason})"),
            },
            Self::PaymentProcessor { message } => {
                write!(f, "Payment processor error: {message}")
            }
            Self::StoreUnavailable { message } => write!(f, "Booking store unavailable: {message}"),
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::BookingNotFound(id) => Self::ResourceNotFound {
                resource_type: String::from("Booking"),
                message: format!("Booking '{id}' does not exist"),
            },
            PersistenceError::NotFound(msg) => Self::ResourceNotFound {
                resource_type: String::from("Record"),
                message: msg,
            },
            PersistenceError::BookingAlreadyExists(id) => Self::DomainRuleViolation {
                rule: String::from("unique_booking_id"),
                message: format!("Booking '{id}' already exists"),
            },
            other => Self::StoreUnavailable {
                message: other.to_string(),
            },
        }
    }
}

impl From<ProcessorError> for ApiError {
    fn from(err: ProcessorError) -> Self {
        Self::PaymentProcessor {
            message: err.to_string(),
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::EmptyCart => ApiError::EmptyCart,
        DomainError::InvalidAmount { field, reason } => ApiError::InvalidInput {
            field,
            message: reason,
        },
        DomainError::InvalidCustomerName(msg) => ApiError::InvalidInput {
            field: String::from("customer.name"),
            message: msg,
        },
        DomainError::InvalidCustomerEmail(msg) => ApiError::InvalidInput {
            field: String::from("customer.email"),
            message: msg,
        },
        DomainError::InvalidCustomerPhone(msg) => ApiError::InvalidInput {
            field: String::from("customer.phone"),
            message: msg,
        },
        DomainError::InvalidItemTitle { index } => ApiError::InvalidInput {
            field: format!("cart[{index}].title"),
            message: String::from("Item title cannot be empty"),
        },
        DomainError::DateParseError { date_string, error } => ApiError::InvalidInput {
            field: String::from("eventDate"),
            message: format!("Failed to parse date '{date_string}': {error}"),
        },
        DomainError::DateArithmeticOverflow { operation } => ApiError::InvalidInput {
            field: String::from("date"),
            message: format!("Date arithmetic overflow while {operation}"),
        },
        DomainError::InvalidStatus { kind, value } => ApiError::InvalidInput {
            field: kind.to_string(),
            message: format!("'{value}' is not a known {kind}"),
        },
        DomainError::InvalidStatusTransition { from, to, reason } => {
            ApiError::DomainRuleViolation {
                rule: String::from("guarded_transition"),
                message: format!("Cannot move from {from} to {to}: {reason}"),
            }
        }
        DomainError::InvalidDepositPercent(percent) => ApiError::InvalidInput {
            field: String::from("depositPercent"),
            message: format!("Deposit percent must be between 0 and 100, got {percent}"),
        },
        DomainError::InvalidBookingRules(msg) => ApiError::InvalidInput {
            field: String::from("bookingRules"),
            message: msg,
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::MalformedTransition(msg) => ApiError::InvalidInput {
            field: String::from("transition"),
            message: msg,
        },
    }
}
