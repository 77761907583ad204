// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use rentbook_api::{
    BookingEngine, ChargeReceipt, ChargeRequest, CheckoutLink, CheckoutLinkRequest, EngineConfig,
    Invoice, InvoiceRequest, Notifier, NotifyError, OutboundEmail, PaymentProcessor,
    ProcessorError, PublishedInvoice, compute_signature,
};
use rentbook_persistence::Persistence;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use crate::admin::ADMIN_IDENTITY_HEADER;
use crate::routes::{AppState, build_router};

pub const TEST_SECRET: &str = "whsec-test";
pub const ADMIN: &str = "owner@example.com";

/// Processor that approves everything and derives ids from the keys.
#[derive(Default)]
pub struct StubProcessor;

#[async_trait]
impl PaymentProcessor for StubProcessor {
    async fn create_checkout_link(
        &self,
        request: CheckoutLinkRequest,
    ) -> Result<CheckoutLink, ProcessorError> {
        Ok(CheckoutLink {
            url: format!("https://checkout.example.com/{}", request.idempotency_key),
            order_id: Some(format!("order-{}", request.idempotency_key)),
        })
    }

    async fn create_invoice(&self, request: InvoiceRequest) -> Result<Invoice, ProcessorError> {
        Ok(Invoice {
            id: request.idempotency_key.replace("invoice-", "inv-"),
            version: 0,
        })
    }

    async fn publish_invoice(
        &self,
        invoice_id: &str,
        _version: i64,
    ) -> Result<PublishedInvoice, ProcessorError> {
        Ok(PublishedInvoice {
            public_url: Some(format!("https://pay.example.com/{invoice_id}")),
        })
    }

    async fn charge_stored_source(
        &self,
        request: ChargeRequest,
    ) -> Result<ChargeReceipt, ProcessorError> {
        Ok(ChargeReceipt {
            payment_id: format!("pay-{}", request.idempotency_key),
        })
    }

    async fn retrieve_order(&self, _order_id: &str) -> Result<Option<String>, ProcessorError> {
        Ok(None)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<OutboundEmail>>,
}

impl RecordingNotifier {
    pub fn templates(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|email| email.template_id.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, email: OutboundEmail) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn create_test_app() -> TestApp {
    let mut config: EngineConfig = EngineConfig::new(TEST_SECRET);
    config.admin_emails = vec![String::from(ADMIN)];
    config.external_timeout = Duration::from_secs(2);

    let notifier: Arc<RecordingNotifier> = Arc::new(RecordingNotifier::default());
    let engine: BookingEngine = BookingEngine::new(
        Persistence::new_in_memory().unwrap(),
        Arc::new(StubProcessor),
        notifier.clone(),
        config,
    );
    TestApp {
        router: build_router(AppState { engine }),
        notifier,
    }
}

pub fn booking_body(date: &str, title: &str) -> Value {
    json!({
        "cart": [{ "title": title, "price": 300.0 }],
        "customer": { "name": "Jane Doe", "email": "jane@example.com", "phone": "555-0100" },
        "eventDate": date,
        "address": "12 Park Lane",
    })
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub fn admin_request(method: &str, uri: &str, body: Option<&Value>) -> Request<Body> {
    let builder: axum::http::request::Builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(ADMIN_IDENTITY_HEADER, ADMIN)
        .header("content-type", "application/json");
    let body: Body = body.map_or_else(Body::empty, |body| {
        Body::from(serde_json::to_vec(body).unwrap())
    });
    builder.body(body).unwrap()
}

pub fn signed_webhook(body: &Value) -> Request<Body> {
    let raw: Vec<u8> = serde_json::to_vec(body).unwrap();
    let signature: String = compute_signature(TEST_SECRET, &raw).unwrap();
    Request::builder()
        .method("POST")
        .uri("/webhooks/payment")
        .header("content-type", "application/json")
        .header("x-signature", signature)
        .body(Body::from(raw))
        .unwrap()
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes: axum::body::Bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Creates a booking through the public route and returns its id.
pub async fn create_booking(app: &TestApp, date: &str, title: &str) -> String {
    let response: Response<Body> = send(
        &app.router,
        json_request("POST", "/bookings", &booking_body(date, title)),
    )
    .await;
    let booking: Value = body_json(response).await;
    booking["bookingId"].as_str().unwrap().to_string()
}
