// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Collaborator ports.
//!
//! The engine talks to the payment processor and the mailer only through
//! these traits. The server crate provides HTTP-backed implementations;
//! tests provide recording fakes.

use async_trait::async_trait;
use rentbook_domain::Money;
use serde_json::Value;
use std::time::Duration;

/// One line of a hosted checkout order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLine {
    pub name: String,
    pub amount: Money,
    pub note: Option<String>,
}

/// A hosted checkout request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLinkRequest {
    pub idempotency_key: String,
    /// Correlation note carried on the order.
    pub note: String,
    pub lines: Vec<CheckoutLine>,
    pub customer_email: String,
}

/// A created checkout link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLink {
    pub url: String,
    pub order_id: Option<String>,
}

/// A balance invoice request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceRequest {
    pub idempotency_key: String,
    /// Processor customer id, if the deposit payment produced one.
    pub customer_ref: Option<String>,
    pub customer_email: String,
    pub customer_name: String,
    pub amount: Money,
    /// `YYYY-MM-DD`.
    pub due_date: String,
    pub note: String,
    pub title: String,
}

/// A draft invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub id: String,
    pub version: i64,
}

/// A published invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedInvoice {
    pub public_url: Option<String>,
}

/// An off-session charge against a stored card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRequest {
    pub idempotency_key: String,
    pub customer_id: String,
    pub payment_source_id: String,
    pub amount: Money,
    pub note: String,
}

/// A completed charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeReceipt {
    pub payment_id: String,
}

/// Errors reported by the payment processor port.
#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("processor rejected the request: {0}")]
    Rejected(String),
    #[error("payment declined: {0}")]
    Declined(String),
    #[error("processor call timed out after {0:?}")]
    Timeout(Duration),
}

/// The payment processor.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Creates a hosted checkout link for an order.
    async fn create_checkout_link(
        &self,
        request: CheckoutLinkRequest,
    ) -> Result<CheckoutLink, ProcessorError>;

    /// Creates a draft invoice.
    async fn create_invoice(&self, request: InvoiceRequest) -> Result<Invoice, ProcessorError>;

    /// Publishes a draft invoice so the customer can pay it.
    async fn publish_invoice(
        &self,
        invoice_id: &str,
        version: i64,
    ) -> Result<PublishedInvoice, ProcessorError>;

    /// Charges a stored payment source off-session.
    async fn charge_stored_source(
        &self,
        request: ChargeRequest,
    ) -> Result<ChargeReceipt, ProcessorError>;

    /// Returns the note of an order, if it has one.
    async fn retrieve_order(&self, order_id: &str) -> Result<Option<String>, ProcessorError>;
}

/// A file attached to an email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub content: String,
}

/// A templated transactional email.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundEmail {
    pub to: Vec<String>,
    pub template_id: String,
    pub data: Value,
    pub attachments: Vec<Attachment>,
}

/// Errors reported by the mailer port.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("mailer rejected the message: {0}")]
    Rejected(String),
    #[error("mailer call timed out after {0:?}")]
    Timeout(Duration),
}

/// Outbound transactional email.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends one templated email.
    async fn send(&self, email: OutboundEmail) -> Result<(), NotifyError>;
}
