// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTTP client for a Square-style payment processor.
//!
//! Implements the engine's `PaymentProcessor` port over the processor's
//! JSON API: hosted payment links, invoices, card-on-file payments and
//! order lookup. Amounts travel as integer cents in USD.
//!
//! Every write carries the idempotency key chosen by the engine, so a
//! retried request is answered with the original result.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Response, StatusCode};
use rentbook_api::{
    ChargeReceipt, ChargeRequest, CheckoutLink, CheckoutLinkRequest, Invoice, InvoiceRequest,
    PaymentProcessor, ProcessorError, PublishedInvoice,
};
use rentbook_domain::Money;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

/// API version pinned in every request.
const API_VERSION: &str = "2025-01-23";
const CURRENCY: &str = "USD";

/// Error category the processor uses for card declines.
const DECLINE_CATEGORY: &str = "PAYMENT_METHOD_ERROR";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    category: String,
    #[serde(default)]
    code: String,
    #[serde(default)]
    detail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PaymentLinkEnvelope {
    payment_link: PaymentLinkBody,
}

#[derive(Debug, Deserialize)]
struct PaymentLinkBody {
    url: String,
    #[serde(default)]
    order_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InvoiceEnvelope {
    invoice: InvoiceBody,
}

#[derive(Debug, Deserialize)]
struct InvoiceBody {
    id: String,
    #[serde(default)]
    version: i64,
    #[serde(default)]
    public_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PaymentEnvelope {
    payment: PaymentBody,
}

#[derive(Debug, Deserialize)]
struct PaymentBody {
    id: String,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct OrderEnvelope {
    order: OrderBody,
}

#[derive(Debug, Deserialize)]
struct OrderBody {
    #[serde(default)]
    metadata: Option<Value>,
}

fn money(amount: Money) -> Value {
    json!({ "amount": amount.cents(), "currency": CURRENCY })
}

/// Payment processor reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPaymentProcessor {
    client: reqwest::Client,
    base_url: String,
    location_id: String,
    timeout: Duration,
}

impl HttpPaymentProcessor {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns `ProcessorError::Transport` if the token is not a valid
    /// header value or the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        token: &str,
        location_id: &str,
        timeout: Duration,
    ) -> Result<Self, ProcessorError> {
        let mut headers: HeaderMap = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                ProcessorError::Transport(format!("invalid processor token header value: {e}"))
            })?,
        );
        headers.insert("square-version", HeaderValue::from_static(API_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client: reqwest::Client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ProcessorError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            location_id: location_id.to_string(),
            timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn transport_error(&self, err: &reqwest::Error) -> ProcessorError {
        if err.is_timeout() {
            ProcessorError::Timeout(self.timeout)
        } else {
            ProcessorError::Transport(format!("HTTP request failed: {err}"))
        }
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<T, ProcessorError> {
        let response: Response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;
        self.decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        path: &str,
        response: Response,
    ) -> Result<T, ProcessorError> {
        let status: StatusCode = response.status();
        debug!(path, status = %status, "Processor response received");

        let body: String = response
            .text()
            .await
            .map_err(|e| self.transport_error(&e))?;
        if status.is_success() {
            return serde_json::from_str(&body).map_err(|e| {
                ProcessorError::Transport(format!("failed to parse processor response: {e}"))
            });
        }
        Err(error_from(status, &body))
    }
}

/// Classifies a non-success response.
fn error_from(status: StatusCode, body: &str) -> ProcessorError {
    let detail: Option<ErrorDetail> = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.errors.into_iter().next());

    let message: String = detail.as_ref().map_or_else(
        || format!("processor returned {status}"),
        |detail| {
            format!(
                "{} ({status}): {}",
                detail.code,
                detail.detail.as_deref().unwrap_or("no detail")
            )
        },
    );

    if detail
        .as_ref()
        .is_some_and(|detail| detail.category == DECLINE_CATEGORY)
    {
        ProcessorError::Declined(message)
    } else if status.is_server_error() {
        warn!(status = %status, "Processor unavailable");
        ProcessorError::Transport(message)
    } else {
        ProcessorError::Rejected(message)
    }
}

#[async_trait]
impl PaymentProcessor for HttpPaymentProcessor {
    async fn create_checkout_link(
        &self,
        request: CheckoutLinkRequest,
    ) -> Result<CheckoutLink, ProcessorError> {
        let line_items: Vec<Value> = request
            .lines
            .iter()
            .map(|line| {
                json!({
                    "name": line.name,
                    "quantity": "1",
                    "base_price_money": money(line.amount),
                    "note": line.note,
                })
            })
            .collect();
        let body: Value = json!({
            "idempotency_key": request.idempotency_key,
            "payment_note": request.note,
            "order": {
                "location_id": self.location_id,
                "line_items": line_items,
                "metadata": { "note": request.note },
            },
            "pre_populated_data": { "buyer_email": request.customer_email },
        });

        let envelope: PaymentLinkEnvelope =
            self.post("/v2/online-checkout/payment-links", &body).await?;
        Ok(CheckoutLink {
            url: envelope.payment_link.url,
            order_id: envelope.payment_link.order_id,
        })
    }

    async fn create_invoice(&self, request: InvoiceRequest) -> Result<Invoice, ProcessorError> {
        let mut recipient: Value = json!({
            "email_address": request.customer_email,
            "given_name": request.customer_name,
        });
        if let Some(customer_ref) = &request.customer_ref {
            recipient["customer_id"] = json!(customer_ref);
        }
        let body: Value = json!({
            "idempotency_key": request.idempotency_key,
            "invoice": {
                "location_id": self.location_id,
                "primary_recipient": recipient,
                "title": request.title,
                "description": request.note,
                "delivery_method": "EMAIL",
                "accepted_payment_methods": { "card": true },
                "payment_requests": [{
                    "request_type": "BALANCE",
                    "due_date": request.due_date,
                    "fixed_amount_requested_money": money(request.amount),
                }],
            },
        });

        let envelope: InvoiceEnvelope = self.post("/v2/invoices", &body).await?;
        Ok(Invoice {
            id: envelope.invoice.id,
            version: envelope.invoice.version,
        })
    }

    async fn publish_invoice(
        &self,
        invoice_id: &str,
        version: i64,
    ) -> Result<PublishedInvoice, ProcessorError> {
        let body: Value = json!({
            "version": version,
            "idempotency_key": format!("publish-{invoice_id}-{version}"),
        });
        let envelope: InvoiceEnvelope = self
            .post(&format!("/v2/invoices/{invoice_id}/publish"), &body)
            .await?;
        Ok(PublishedInvoice {
            public_url: envelope.invoice.public_url,
        })
    }

    async fn charge_stored_source(
        &self,
        request: ChargeRequest,
    ) -> Result<ChargeReceipt, ProcessorError> {
        let body: Value = json!({
            "idempotency_key": request.idempotency_key,
            "source_id": request.payment_source_id,
            "customer_id": request.customer_id,
            "location_id": self.location_id,
            "amount_money": money(request.amount),
            "note": request.note,
            "autocomplete": true,
        });

        let envelope: PaymentEnvelope = self.post("/v2/payments", &body).await?;
        match envelope.payment.status.as_str() {
            "FAILED" | "CANCELED" => Err(ProcessorError::Declined(format!(
                "payment {} ended {}",
                envelope.payment.id, envelope.payment.status
            ))),
            _ => Ok(ChargeReceipt {
                payment_id: envelope.payment.id,
            }),
        }
    }

    async fn retrieve_order(&self, order_id: &str) -> Result<Option<String>, ProcessorError> {
        let path: String = format!("/v2/orders/{order_id}");
        let response: Response = self
            .client
            .get(self.url(&path))
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let envelope: OrderEnvelope = self.decode(&path, response).await?;
        Ok(envelope
            .order
            .metadata
            .as_ref()
            .and_then(|metadata| metadata.get("note"))
            .and_then(Value::as_str)
            .map(str::to_string))
    }
}
