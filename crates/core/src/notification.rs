// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rentbook_domain::{Money, PaymentAttempt};

/// Notifications the engine sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Admin alert that a customer opened a checkout.
    CheckoutStarted,
    /// Direct booking confirmation to the customer plus an admin alert.
    BookingReceived,
    /// Deposit confirmation with the balance invoice link and a calendar invite.
    DepositReceived,
    PaymentDeclined {
        attempt: PaymentAttempt,
    },
    BalancePaid,
    RefundIssued {
        amount: Money,
    },
    ContractReceived,
    BookingCanceled,
    EventReminder,
    BalanceReminder,
    Reengagement,
    Anniversary {
        days: u32,
    },
    ReviewRequest,
}

impl NotificationKind {
    /// All template keys, for configuration.
    pub const TEMPLATE_KEYS: [&'static str; 13] = [
        "checkout_started",
        "booking_received",
        "deposit_received",
        "payment_declined",
        "balance_paid",
        "refund_issued",
        "contract_received",
        "booking_canceled",
        "event_reminder",
        "balance_reminder",
        "reengagement",
        "anniversary",
        "review_request",
    ];

    /// Template key for this notification.
    #[must_use]
    pub const fn template_key(&self) -> &'static str {
        match self {
            Self::CheckoutStarted => "checkout_started",
            Self::BookingReceived => "booking_received",
            Self::DepositReceived => "deposit_received",
            Self::PaymentDeclined { .. } => "payment_declined",
            Self::BalancePaid => "balance_paid",
            Self::RefundIssued { .. } => "refund_issued",
            Self::ContractReceived => "contract_received",
            Self::BookingCanceled => "booking_canceled",
            Self::EventReminder => "event_reminder",
            Self::BalanceReminder => "balance_reminder",
            Self::Reengagement => "reengagement",
            Self::Anniversary { .. } => "anniversary",
            Self::ReviewRequest => "review_request",
        }
    }

    /// Returns true if the notification goes to the admins rather than the customer.
    #[must_use]
    pub const fn is_admin_alert(&self) -> bool {
        matches!(self, Self::CheckoutStarted)
    }
}
