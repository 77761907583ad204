// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test fakes and fixtures.

use async_trait::async_trait;
use rentbook_domain::{
    Booking, BookingId, BookingItem, Customer, Money, PaymentStatus, PricingInputs,
};
use rentbook_persistence::Persistence;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;

use crate::{
    BookingEngine, BookingRequest, ChargeReceipt, ChargeRequest, CheckoutLink,
    CheckoutLinkRequest, CheckoutResponse, EngineConfig, Invoice, InvoiceRequest, Notifier,
    NotifyError, OutboundEmail, PaymentProcessor, ProcessorError, PublishedInvoice, WebhookAck,
    compute_signature,
};

pub const TEST_SECRET: &str = "test-webhook-secret";
pub const ADMIN: &str = "owner@example.com";

/// A processor call as recorded by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessorCall {
    CheckoutLink(CheckoutLinkRequest),
    CreateInvoice(InvoiceRequest),
    PublishInvoice(String, i64),
    Charge(ChargeRequest),
    RetrieveOrder(String),
}

/// Runs against the engine's store while a charge is in flight.
pub type ChargeHook = Box<dyn Fn(&mut Persistence, &ChargeRequest) + Send + Sync>;

/// In-memory payment processor that records every call.
#[derive(Default)]
pub struct FakeProcessor {
    calls: Mutex<Vec<ProcessorCall>>,
    order_notes: Mutex<HashMap<String, String>>,
    pub fail_checkout: AtomicBool,
    pub fail_invoices: AtomicBool,
    pub decline_charges: AtomicBool,
    store: Mutex<Option<Arc<tokio::sync::Mutex<Persistence>>>>,
    on_charge: Mutex<Option<ChargeHook>>,
    stall: Mutex<Option<(String, Duration)>>,
}

impl FakeProcessor {
    /// Gives the fake access to the store the engine uses.
    pub fn attach_store(&self, store: Arc<tokio::sync::Mutex<Persistence>>) {
        *self.store.lock().unwrap() = Some(store);
    }

    pub fn on_charge(&self, hook: ChargeHook) {
        *self.on_charge.lock().unwrap() = Some(hook);
    }

    /// After a charge or invoice publish for `booking_id` succeeds, keeps the
    /// store locked for `hold`, so the write that follows times out.
    pub fn stall_store_after(&self, booking_id: &BookingId, hold: Duration) {
        *self.stall.lock().unwrap() = Some((booking_id.to_string(), hold));
    }

    fn attached_store(&self) -> Option<Arc<tokio::sync::Mutex<Persistence>>> {
        self.store.lock().unwrap().clone()
    }

    /// Locks the store for the configured hold if `key` names the stalled
    /// booking.
    async fn maybe_stall(&self, key: &str) {
        let hold: Option<Duration> = self
            .stall
            .lock()
            .unwrap()
            .as_ref()
            .filter(|(booking_id, _)| key.contains(booking_id.as_str()))
            .map(|(_, hold)| *hold);
        if let (Some(hold), Some(store)) = (hold, self.attached_store()) {
            let guard: OwnedMutexGuard<Persistence> = store.lock_owned().await;
            tokio::spawn(async move {
                tokio::time::sleep(hold).await;
                drop(guard);
            });
        }
    }

    fn record(&self, call: ProcessorCall) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<ProcessorCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn charges(&self) -> Vec<ChargeRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ProcessorCall::Charge(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn checkouts(&self) -> Vec<CheckoutLinkRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ProcessorCall::CheckoutLink(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn invoices(&self) -> Vec<InvoiceRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ProcessorCall::CreateInvoice(request) => Some(request),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl PaymentProcessor for FakeProcessor {
    async fn create_checkout_link(
        &self,
        request: CheckoutLinkRequest,
    ) -> Result<CheckoutLink, ProcessorError> {
        self.record(ProcessorCall::CheckoutLink(request.clone()));
        if self.fail_checkout.load(Ordering::SeqCst) {
            return Err(ProcessorError::Rejected(String::from("location disabled")));
        }
        let order_id: String = format!("order-{}", request.idempotency_key);
        self.order_notes
            .lock()
            .unwrap()
            .insert(order_id.clone(), request.note.clone());
        Ok(CheckoutLink {
            url: format!("https://checkout.example.com/{}", request.idempotency_key),
            order_id: Some(order_id),
        })
    }

    async fn create_invoice(&self, request: InvoiceRequest) -> Result<Invoice, ProcessorError> {
        self.record(ProcessorCall::CreateInvoice(request.clone()));
        if self.fail_invoices.load(Ordering::SeqCst) {
            return Err(ProcessorError::Transport(String::from("connection reset")));
        }
        Ok(Invoice {
            id: request.idempotency_key.replace("invoice-", "inv-"),
            version: 0,
        })
    }

    async fn publish_invoice(
        &self,
        invoice_id: &str,
        version: i64,
    ) -> Result<PublishedInvoice, ProcessorError> {
        self.record(ProcessorCall::PublishInvoice(invoice_id.to_string(), version));
        self.maybe_stall(invoice_id).await;
        Ok(PublishedInvoice {
            public_url: Some(format!("https://pay.example.com/{invoice_id}")),
        })
    }

    async fn charge_stored_source(
        &self,
        request: ChargeRequest,
    ) -> Result<ChargeReceipt, ProcessorError> {
        self.record(ProcessorCall::Charge(request.clone()));
        if self.decline_charges.load(Ordering::SeqCst) {
            return Err(ProcessorError::Declined(String::from("CARD_DECLINED")));
        }
        if let Some(shared) = self.attached_store() {
            let mut store: tokio::sync::MutexGuard<'_, Persistence> = shared.lock().await;
            if let Some(hook) = self.on_charge.lock().unwrap().as_ref() {
                hook(&mut store, &request);
            }
        }
        self.maybe_stall(&request.idempotency_key).await;
        Ok(ChargeReceipt {
            payment_id: format!("pay-{}", request.idempotency_key),
        })
    }

    async fn retrieve_order(&self, order_id: &str) -> Result<Option<String>, ProcessorError> {
        self.record(ProcessorCall::RetrieveOrder(order_id.to_string()));
        Ok(self.order_notes.lock().unwrap().get(order_id).cloned())
    }
}

/// Mailer that records every email it is asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<OutboundEmail>>,
    pub fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_with_template(&self, template_id: &str) -> Vec<OutboundEmail> {
        self.sent()
            .into_iter()
            .filter(|email| email.template_id == template_id)
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, email: OutboundEmail) -> Result<(), NotifyError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::Rejected(String::from("mailbox unavailable")));
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

pub struct Harness {
    pub engine: BookingEngine,
    pub processor: Arc<FakeProcessor>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn test_config() -> EngineConfig {
    let mut config: EngineConfig = EngineConfig::new(TEST_SECRET);
    config.admin_emails = vec![String::from(ADMIN)];
    config.external_timeout = Duration::from_secs(2);
    config.review_link = Some(String::from("https://reviews.example.com"));
    config
}

pub fn create_test_engine() -> Harness {
    create_test_engine_with(test_config())
}

pub fn create_test_engine_with(config: EngineConfig) -> Harness {
    let persistence: Persistence = Persistence::new_in_memory().unwrap();
    let processor: Arc<FakeProcessor> = Arc::new(FakeProcessor::default());
    let notifier: Arc<RecordingNotifier> = Arc::new(RecordingNotifier::default());
    let engine: BookingEngine =
        BookingEngine::new(persistence, processor.clone(), notifier.clone(), config);
    processor.attach_store(engine.store.clone());
    Harness {
        engine,
        processor,
        notifier,
    }
}

pub fn create_booking_request(date: &str, titles: &[(&str, i64)]) -> BookingRequest {
    BookingRequest {
        cart: titles
            .iter()
            .map(|(title, cents)| BookingItem {
                title: (*title).to_string(),
                price: Money::from_cents(*cents),
                quantity: None,
                mode: None,
            })
            .collect(),
        customer: Customer {
            name: String::from("Jane Doe"),
            email: String::from("jane@example.com"),
            phone: String::from("555-0100"),
        },
        event_date: date.to_string(),
        address: Some(String::from("12 Park Lane")),
        pricing: PricingInputs::default(),
    }
}

/// A one-line "Slide" cart at $300.
pub fn slide_request(date: &str) -> BookingRequest {
    create_booking_request(date, &[("Slide", 30_000)])
}

pub fn sign(body: &[u8]) -> String {
    compute_signature(TEST_SECRET, body).unwrap()
}

pub fn payment_event(note: Option<&str>, status: &str, with_card: bool) -> Vec<u8> {
    let mut payment: Value = json!({
        "id": "pay-deposit-1",
        "status": status,
    });
    if let Some(note) = note {
        payment["note"] = json!(note);
    }
    if with_card {
        payment["customer_id"] = json!("cust-1");
        payment["card_details"] = json!({ "card": { "id": "card-1" } });
    }
    serde_json::to_vec(&json!({
        "type": "payment.updated",
        "event_id": "evt-1",
        "data": { "object": { "payment": payment } },
    }))
    .unwrap()
}

pub fn deposit_note(booking_id: &BookingId) -> String {
    format!("booking_id={booking_id};purpose=deposit")
}

pub fn invoice_event(invoice_id: &str, status: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "type": "invoice.updated",
        "data": { "object": { "invoice": { "id": invoice_id, "status": status } } },
    }))
    .unwrap()
}

pub async fn deliver(harness: &Harness, body: &[u8]) -> WebhookAck {
    harness.engine.handle_event(body, &sign(body)).await.unwrap()
}

/// Checks out a slide for `date` and delivers its completed deposit payment.
pub async fn create_deposit_paid_booking(
    harness: &Harness,
    date: &str,
    with_card: bool,
) -> Booking {
    create_deposit_paid_booking_from(harness, slide_request(date), with_card).await
}

/// Checks out `request` and delivers the completed deposit payment.
pub async fn create_deposit_paid_booking_from(
    harness: &Harness,
    request: BookingRequest,
    with_card: bool,
) -> Booking {
    let response: CheckoutResponse = harness.engine.start_checkout(request).await.unwrap();
    let booking_id: BookingId = BookingId::new(&response.booking_id);
    let body: Vec<u8> = payment_event(Some(&deposit_note(&booking_id)), "COMPLETED", with_card);
    deliver(harness, &body).await;

    let booking: Booking = harness.engine.get_booking(&booking_id).await.unwrap();
    assert_eq!(booking.payment_status, PaymentStatus::DepositPaid);
    booking
}
