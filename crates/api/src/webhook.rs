// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Webhook reconciliation.
//!
//! Payment processor events arrive at least once. Each authenticated event
//! is turned into one guarded transition, so a replay finds the booking
//! already at its target and does nothing. Events that do not concern a
//! known booking are acknowledged and ignored, never surfaced as errors.

use rentbook::{
    CorrelationNote, NotificationGuard, NotificationKind, Transition, invoice_key,
};
use rentbook_audit::{Actor, Cause};
use rentbook_domain::{
    Booking, BookingId, PaymentAttempt, ProcessorRefs, format_event_date,
};
use rentbook_persistence::{BookingField, Persistence};
use serde::Deserialize;
use tokio::sync::MutexGuard;
use tracing::{debug, info, warn};

use crate::BookingEngine;
use crate::error::{ApiError, translate_domain_error};
use crate::ports::{Invoice, InvoiceRequest, PublishedInvoice};
use crate::request_response::WebhookAck;
use crate::signature::verify_signature;
use crate::transition::{GuardedOutcome, report_reconciliation_gap};

const PAYMENT_UPDATED: &str = "payment.updated";
const INVOICE_UPDATED: &str = "invoice.updated";
const IGNORED: &str = "ignored";

#[derive(Debug, Deserialize)]
struct WebhookEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    event_id: Option<String>,
    #[serde(default)]
    data: EventData,
}

#[derive(Debug, Default, Deserialize)]
struct EventData {
    #[serde(default)]
    object: EventObject,
}

#[derive(Debug, Default, Deserialize)]
struct EventObject {
    #[serde(default)]
    payment: Option<PaymentObject>,
    #[serde(default)]
    invoice: Option<InvoiceObject>,
}

#[derive(Debug, Deserialize)]
struct PaymentObject {
    id: String,
    status: String,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    order_id: Option<String>,
    #[serde(default)]
    customer_id: Option<String>,
    #[serde(default)]
    card_details: Option<CardDetails>,
}

#[derive(Debug, Deserialize)]
struct CardDetails {
    #[serde(default)]
    card: Option<Card>,
}

#[derive(Debug, Deserialize)]
struct Card {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InvoiceObject {
    id: String,
    status: String,
}

impl PaymentObject {
    fn refs(&self) -> Option<ProcessorRefs> {
        let customer_id: &str = self.customer_id.as_deref()?;
        let payment_source_id: &str = self
            .card_details
            .as_ref()?
            .card
            .as_ref()?
            .id
            .as_deref()?;
        Some(ProcessorRefs {
            customer_id: customer_id.to_string(),
            payment_source_id: payment_source_id.to_string(),
        })
    }
}

fn webhook_cause(event: &WebhookEvent, subject: &str) -> Cause {
    Cause::new(
        event
            .event_id
            .clone()
            .unwrap_or_else(|| subject.to_string()),
        format!("{} for {subject}", event.event_type),
    )
}

impl BookingEngine {
    /// Authenticates and reconciles one payment processor event.
    ///
    /// # Arguments
    ///
    /// * `raw_body` - The request body exactly as received
    /// * `signature` - The `x-signature` header value
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidSignature` if the signature does not match;
    /// the event is not looked at. Returns a store or processor error if a
    /// relevant event could not be processed, so the processor retries it.
    pub async fn handle_event(
        &self,
        raw_body: &[u8],
        signature: &str,
    ) -> Result<WebhookAck, ApiError> {
        verify_signature(&self.config.webhook_secret, raw_body, signature)?;

        let event: WebhookEvent = match serde_json::from_slice(raw_body) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable webhook body");
                return Ok(WebhookAck::new(IGNORED));
            }
        };

        let outcome: &str = match event.event_type.as_str() {
            PAYMENT_UPDATED => self.handle_payment(&event).await?,
            INVOICE_UPDATED => self.handle_invoice(&event).await?,
            other => {
                debug!(event_type = other, "Ignoring unrelated webhook event");
                IGNORED
            }
        };
        Ok(WebhookAck::new(outcome))
    }

    async fn handle_payment(&self, event: &WebhookEvent) -> Result<&'static str, ApiError> {
        let Some(payment) = event.data.object.payment.as_ref() else {
            debug!(event_type = PAYMENT_UPDATED, "Payment event without a payment object");
            return Ok(IGNORED);
        };

        let note: Option<String> = match (&payment.note, &payment.order_id) {
            (Some(note), _) if !note.trim().is_empty() => Some(note.clone()),
            (_, Some(order_id)) => self
                .call_processor(self.processor.retrieve_order(order_id))
                .await
                .map_err(|e| {
                    warn!(order_id = %order_id, error = %e, "Could not resolve payment order note");
                    ApiError::from(e)
                })?,
            _ => None,
        };

        let Some(correlation) = note.as_deref().and_then(CorrelationNote::parse) else {
            debug!(payment_id = %payment.id, "Payment event without a booking reference");
            return Ok(IGNORED);
        };
        let booking_id: BookingId = correlation.booking_id;

        let transition: Transition = match (payment.status.as_str(), correlation.purpose) {
            ("COMPLETED", Some(PaymentAttempt::Balance)) => Transition::MarkBalancePaid {
                reference: payment.id.clone(),
            },
            ("COMPLETED", _) => Transition::MarkDepositPaid {
                payment_id: payment.id.clone(),
                refs: payment.refs(),
            },
            ("FAILED" | "CANCELED", purpose) => Transition::MarkPaymentFailed {
                attempt: purpose.unwrap_or(PaymentAttempt::Deposit),
                reference: payment.id.clone(),
            },
            (status, _) => {
                debug!(booking_id = %booking_id, status, "Ignoring payment status");
                return Ok(IGNORED);
            }
        };

        let cause: Cause = webhook_cause(event, &payment.id);
        let outcome: GuardedOutcome = match self
            .apply_guarded(&booking_id, transition, Actor::webhook(), cause)
            .await
        {
            Ok(outcome) => outcome,
            Err(ApiError::ResourceNotFound { .. }) => {
                debug!(booking_id = %booking_id, "Payment event for an unknown booking");
                return Ok(IGNORED);
            }
            Err(e) => return Err(e),
        };

        // Captured money the booking cannot take needs a manual refund or fix.
        match &outcome {
            GuardedOutcome::Rejected { reason, .. } if payment.status == "COMPLETED" => {
                report_reconciliation_gap(
                    &booking_id,
                    PAYMENT_UPDATED,
                    "payment_captured",
                    &translate_domain_error(reason.clone()),
                );
            }
            _ => {}
        }

        if let GuardedOutcome::Applied {
            booking,
            notification: Some(kind),
        } = &outcome
        {
            let booking: Booking = if *kind == NotificationKind::DepositReceived {
                self.request_balance_invoice(booking).await
            } else {
                booking.clone()
            };
            self.notify(&booking, *kind).await;
        }

        info!(
            booking_id = %booking_id,
            event_type = PAYMENT_UPDATED,
            payment_status = payment.status.as_str(),
            outcome = outcome.label(),
            "Payment event reconciled"
        );
        Ok(outcome.label())
    }

    async fn handle_invoice(&self, event: &WebhookEvent) -> Result<&'static str, ApiError> {
        let Some(invoice) = event.data.object.invoice.as_ref() else {
            debug!(event_type = INVOICE_UPDATED, "Invoice event without an invoice object");
            return Ok(IGNORED);
        };

        let transition: Transition = match invoice.status.as_str() {
            "PAID" => Transition::MarkBalancePaid {
                reference: invoice.id.clone(),
            },
            "CANCELED" | "REFUNDED" | "PARTIALLY_REFUNDED" => {
                Transition::MarkNotified(NotificationGuard::Refund)
            }
            status => {
                debug!(invoice_id = %invoice.id, status, "Ignoring invoice status");
                return Ok(IGNORED);
            }
        };

        let booking_id: BookingId = {
            let mut store: MutexGuard<'_, Persistence> = self.lock_store().await?;
            let matches: Vec<Booking> =
                store.find_bookings(&BookingField::InvoiceId(invoice.id.clone()), None)?;
            match matches.into_iter().next() {
                Some(booking) => booking.booking_id,
                None => {
                    debug!(invoice_id = %invoice.id, "Invoice event for an unknown booking");
                    return Ok(IGNORED);
                }
            }
        };

        let cause: Cause = webhook_cause(event, &invoice.id);
        let outcome: GuardedOutcome = match self
            .apply_and_notify(&booking_id, transition, Actor::webhook(), cause)
            .await
        {
            Ok(outcome) => outcome,
            Err(ApiError::ResourceNotFound { .. }) => return Ok(IGNORED),
            Err(e) => return Err(e),
        };

        info!(
            booking_id = %booking_id,
            event_type = INVOICE_UPDATED,
            invoice_status = invoice.status.as_str(),
            outcome = outcome.label(),
            "Invoice event reconciled"
        );
        Ok(outcome.label())
    }

    /// Creates and publishes the balance invoice for a booking whose
    /// deposit just arrived, and attaches it to the booking.
    ///
    /// Best-effort: a processor failure is logged and the booking is
    /// returned unchanged. A failed attach after publishing is a
    /// reconciliation gap.
    async fn request_balance_invoice(&self, booking: &Booking) -> Booking {
        if booking.invoice_id.is_some() || !booking.pricing.remaining.is_positive() {
            return booking.clone();
        }

        let request: InvoiceRequest = InvoiceRequest {
            idempotency_key: invoice_key(&booking.booking_id),
            customer_ref: booking.processor_customer_ref.clone(),
            customer_email: booking.customer.email.clone(),
            customer_name: booking.customer.name.clone(),
            amount: booking.pricing.remaining,
            due_date: format_event_date(booking.event_date),
            note: CorrelationNote::new(booking.booking_id.clone(), PaymentAttempt::Balance)
                .render(),
            title: format!("Balance for {}", format_event_date(booking.event_date)),
        };

        let invoice: Invoice = match self
            .call_processor(self.processor.create_invoice(request))
            .await
        {
            Ok(invoice) => invoice,
            Err(e) => {
                warn!(
                    booking_id = %booking.booking_id,
                    error = %e,
                    "Balance invoice creation failed"
                );
                return booking.clone();
            }
        };
        let published: PublishedInvoice = match self
            .call_processor(self.processor.publish_invoice(&invoice.id, invoice.version))
            .await
        {
            Ok(published) => published,
            Err(e) => {
                warn!(
                    booking_id = %booking.booking_id,
                    invoice_id = %invoice.id,
                    error = %e,
                    "Balance invoice publication failed"
                );
                return booking.clone();
            }
        };

        let transition: Transition = Transition::AttachInvoice {
            invoice_id: invoice.id.clone(),
            invoice_url: published.public_url,
        };
        let cause: Cause = Cause::new(
            invoice.id.clone(),
            String::from("balance invoice published after deposit"),
        );
        match self
            .apply_guarded(&booking.booking_id, transition, Actor::webhook(), cause)
            .await
        {
            Ok(outcome) => outcome.booking().clone(),
            Err(e) => {
                report_reconciliation_gap(
                    &booking.booking_id,
                    PAYMENT_UPDATED,
                    "invoice_published",
                    &e,
                );
                booking.clone()
            }
        }
    }
}
