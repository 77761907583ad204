// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::notification::NotificationKind;
use rentbook_audit::TransitionRecord;
use rentbook_domain::{Booking, DomainError};

/// The result of an applied transition.
///
/// The new booking and its audit record must be persisted together before
/// the notification is dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The booking after the transition.
    pub new_booking: Booking,
    /// The audit record for this transition.
    pub record: TransitionRecord,
    /// The notification this transition triggers, if any.
    pub notification: Option<NotificationKind>,
}

/// What a guarded transition did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The booking moved; persist and then notify.
    Applied(Box<TransitionResult>),
    /// The booking is already at or past the target. Nothing to do.
    AlreadyApplied,
    /// The booking is not in the expected prior state. Ignored, never regressed.
    Rejected(DomainError),
}

impl TransitionOutcome {
    /// Short label for logs and webhook acknowledgements.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Applied(_) => "applied",
            Self::AlreadyApplied => "duplicate",
            Self::Rejected(_) => "rejected",
        }
    }
}
