// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Notification dispatch.
//!
//! Building an email is pure; sending it is best-effort. A send failure
//! is logged and never reaches the transition that triggered it.

use rentbook::NotificationKind;
use rentbook_domain::{Booking, CalendarInvite, PaymentAttempt, format_event_date, render_invite};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::BookingEngine;
use crate::config::EngineConfig;
use crate::ports::{Attachment, OutboundEmail};

const CALENDAR_CONTENT_TYPE: &str = "text/calendar";

/// Builds the emails one notification produces.
///
/// Admin alerts go to the configured admins. A direct booking
/// confirmation goes to the customer and, separately, to the admins.
/// Everything else goes to the customer.
#[must_use]
pub fn build_notifications(
    config: &EngineConfig,
    booking: &Booking,
    kind: NotificationKind,
) -> Vec<OutboundEmail> {
    let template_id: String = config.templates.resolve(&kind);
    let customer: Vec<String> = vec![booking.customer.email.clone()];

    let audiences: Vec<(&str, Vec<String>)> = if kind.is_admin_alert() {
        vec![("admin", config.admin_emails.clone())]
    } else if kind == NotificationKind::BookingReceived {
        vec![("customer", customer), ("admin", config.admin_emails.clone())]
    } else {
        vec![("customer", customer)]
    };

    let attachments: Vec<Attachment> = if kind == NotificationKind::DepositReceived {
        let invite: CalendarInvite = render_invite(booking);
        vec![Attachment {
            filename: invite.filename,
            content_type: String::from(CALENDAR_CONTENT_TYPE),
            content: invite.content,
        }]
    } else {
        Vec::new()
    };

    audiences
        .into_iter()
        .filter(|(_, to)| !to.is_empty())
        .map(|(audience, to)| OutboundEmail {
            to,
            template_id: template_id.clone(),
            data: template_data(config, booking, kind, audience),
            attachments: attachments.clone(),
        })
        .collect()
}

fn template_data(
    config: &EngineConfig,
    booking: &Booking,
    kind: NotificationKind,
    audience: &str,
) -> Value {
    let items: Vec<&str> = booking.items.iter().map(|item| item.title.as_str()).collect();
    let mut data: Value = json!({
        "audience": audience,
        "bookingId": booking.booking_id.as_str(),
        "customerName": booking.customer.name,
        "customerEmail": booking.customer.email,
        "eventDate": format_event_date(booking.event_date),
        "address": booking.address,
        "items": items,
        "total": booking.pricing.total,
        "deposit": booking.pricing.deposit,
        "remaining": booking.pricing.remaining,
        "invoiceUrl": booking.invoice_url,
        "checkoutUrl": booking.checkout_url,
    });

    let extra: Value = match kind {
        NotificationKind::PaymentDeclined { attempt } => json!({
            "attempt": attempt.as_str(),
            "amount": match attempt {
                PaymentAttempt::Deposit => booking.pricing.deposit,
                PaymentAttempt::Balance => booking.pricing.remaining,
            },
        }),
        NotificationKind::RefundIssued { amount } => json!({ "refundAmount": amount }),
        NotificationKind::BalanceReminder => json!({
            "payLink": booking.invoice_url.clone().or_else(|| config.default_pay_link.clone()),
        }),
        NotificationKind::ReviewRequest | NotificationKind::Reengagement => {
            json!({ "reviewLink": config.review_link })
        }
        NotificationKind::Anniversary { days } => json!({ "days": days }),
        _ => Value::Null,
    };

    if let (Value::Object(base), Value::Object(extra)) = (&mut data, extra) {
        base.extend(extra);
    }
    data
}

impl BookingEngine {
    /// Sends the emails of a notification. Never fails.
    pub(crate) async fn notify(&self, booking: &Booking, kind: NotificationKind) {
        for email in build_notifications(&self.config, booking, kind) {
            let recipients: usize = email.to.len();
            match tokio::time::timeout(self.config.external_timeout, self.notifier.send(email))
                .await
            {
                Ok(Ok(())) => debug!(
                    booking_id = %booking.booking_id,
                    template = kind.template_key(),
                    recipients,
                    "Notification sent"
                ),
                Ok(Err(e)) => warn!(
                    booking_id = %booking.booking_id,
                    template = kind.template_key(),
                    error = %e,
                    "Notification failed"
                ),
                Err(_) => warn!(
                    booking_id = %booking.booking_id,
                    template = kind.template_key(),
                    timeout = ?self.config.external_timeout,
                    "Notification timed out"
                ),
            }
        }
    }
}
