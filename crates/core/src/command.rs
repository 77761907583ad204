// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rentbook_domain::{PaymentAttempt, ProcessorRefs};

/// A requested change to a booking's guarded state, as data only.
///
/// Transitions are the only way status flags and one-shot notification
/// guards change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The deposit payment completed.
    MarkDepositPaid {
        /// Processor payment id, for the audit trail.
        payment_id: String,
        /// Customer and card references for later autopay.
        refs: Option<ProcessorRefs>,
    },
    /// A payment attempt was declined or canceled.
    MarkPaymentFailed {
        /// Which attempt failed.
        attempt: PaymentAttempt,
        /// Processor payment id or autopay idempotency key.
        reference: String,
    },
    /// The balance was collected (invoice paid or autopay charged).
    MarkBalancePaid {
        /// Invoice id or charge id.
        reference: String,
    },
    /// The signed rental contract arrived.
    ReceiveContract,
    /// The event took place.
    Complete,
    /// The booking was called off.
    Cancel,
    /// A balance invoice was published for the booking.
    AttachInvoice {
        invoice_id: String,
        invoice_url: Option<String>,
    },
    /// A one-shot notification is about to be sent.
    MarkNotified(NotificationGuard),
}

impl Transition {
    /// Returns the audit action name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MarkDepositPaid { .. } => "MarkDepositPaid",
            Self::MarkPaymentFailed { .. } => "MarkPaymentFailed",
            Self::MarkBalancePaid { .. } => "MarkBalancePaid",
            Self::ReceiveContract => "ReceiveContract",
            Self::Complete => "Complete",
            Self::Cancel => "Cancel",
            Self::AttachInvoice { .. } => "AttachInvoice",
            Self::MarkNotified(_) => "MarkNotified",
        }
    }
}

/// One-shot notifications guarded by a flag on the booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationGuard {
    /// `reviewRequested`
    ReviewRequest,
    /// `reengagementSent`
    Reengagement,
    /// `eventReminderSent`
    EventReminder,
    /// `balanceReminderSent`
    BalanceReminder,
    /// `refundNotified`
    Refund,
    /// `anniversariesSent` entry for the given day offset
    Anniversary(u32),
}

impl NotificationGuard {
    /// Returns the name of the guard flag.
    #[must_use]
    pub const fn flag_name(&self) -> &'static str {
        match self {
            Self::ReviewRequest => "reviewRequested",
            Self::Reengagement => "reengagementSent",
            Self::EventReminder => "eventReminderSent",
            Self::BalanceReminder => "balanceReminderSent",
            Self::Refund => "refundNotified",
            Self::Anniversary(_) => "anniversariesSent",
        }
    }
}
