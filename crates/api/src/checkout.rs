// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Checkout and direct booking creation.

use rentbook::{CorrelationNote, NotificationKind, checkout_key};
use rentbook_domain::{
    AvailabilityResult, Booking, BookingId, BookingItem, BookingRules, Customer, Money,
    PaymentAttempt, PricingBreakdown, PricingInputs, Rate, compute_pricing, format_event_date,
    parse_event_date, validate_customer, validate_items, validate_pricing,
};
use rentbook_persistence::Persistence;
use time::{Date, OffsetDateTime};
use tokio::sync::MutexGuard;
use tracing::{info, warn};

use crate::BookingEngine;
use crate::availability::{availability_locked, ensure_available};
use crate::error::{ApiError, translate_domain_error};
use crate::ports::{CheckoutLine, CheckoutLink, CheckoutLinkRequest};
use crate::request_response::{BookingRequest, CheckoutResponse};
use crate::transition::report_reconciliation_gap;

/// A validated booking request.
struct Draft {
    customer: Customer,
    event_date: Date,
    items: Vec<BookingItem>,
    address: Option<String>,
    inputs: PricingInputs,
}

impl Draft {
    fn validate(request: BookingRequest) -> Result<Self, ApiError> {
        validate_items(&request.cart).map_err(translate_domain_error)?;
        validate_customer(&request.customer).map_err(translate_domain_error)?;
        let event_date: Date =
            parse_event_date(&request.event_date).map_err(translate_domain_error)?;

        let customer: Customer = Customer {
            name: request.customer.name.trim().to_string(),
            email: request.customer.email.trim().to_string(),
            phone: request.customer.phone.trim().to_string(),
        };
        let items: Vec<BookingItem> = request
            .cart
            .into_iter()
            .map(|item| BookingItem {
                title: item.title.trim().to_string(),
                ..item
            })
            .collect();

        Ok(Self {
            customer,
            event_date,
            items,
            address: request.address.filter(|address| !address.trim().is_empty()),
            inputs: request.pricing,
        })
    }

    fn titles(&self) -> Vec<String> {
        self.items.iter().map(|item| item.title.clone()).collect()
    }

    fn into_booking(self, booking_id: BookingId, pricing: PricingBreakdown) -> Booking {
        Booking::new(
            booking_id,
            self.customer,
            self.event_date,
            self.items,
            self.address,
            pricing,
            OffsetDateTime::now_utc(),
        )
    }
}

impl BookingEngine {
    /// Prices a draft and gates it on the booking rules.
    ///
    /// A breakdown with an amount above `Money::MAX` is refused before
    /// anything is stored.
    fn price_locked(
        &self,
        store: &mut Persistence,
        draft: &Draft,
    ) -> Result<PricingBreakdown, ApiError> {
        let rules: BookingRules = self.rules_locked(store)?;
        let deposit_rate: Rate = rules.deposit_rate().map_err(translate_domain_error)?;
        let pricing: PricingBreakdown = compute_pricing(&draft.items, &draft.inputs, deposit_rate);
        validate_pricing(&pricing).map_err(translate_domain_error)?;

        let availability: AvailabilityResult =
            availability_locked(store, &rules, draft.event_date, &draft.titles(), None)?;
        ensure_available(availability, draft.event_date)?;
        Ok(pricing)
    }

    /// Starts a hosted checkout for the deposit of a new booking.
    ///
    /// The booking is stored only after the processor returns a checkout
    /// link. Its id travels in the order note so the payment webhook can
    /// find it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The cart is empty or the request is malformed
    /// - An amount of the computed price exceeds `Money::MAX`
    /// - The date or items are unavailable
    /// - The processor fails (nothing is stored)
    /// - The store fails
    pub async fn start_checkout(
        &self,
        request: BookingRequest,
    ) -> Result<CheckoutResponse, ApiError> {
        let draft: Draft = Draft::validate(request)?;
        let pricing: PricingBreakdown = {
            let mut store: MutexGuard<'_, Persistence> = self.lock_store().await?;
            self.price_locked(&mut store, &draft)?
        };

        let booking_id: BookingId = BookingId::generate();
        let link_request: CheckoutLinkRequest = CheckoutLinkRequest {
            idempotency_key: checkout_key(&booking_id),
            note: CorrelationNote::new(booking_id.clone(), PaymentAttempt::Deposit).render(),
            lines: vec![
                CheckoutLine {
                    name: String::from("Deposit"),
                    amount: pricing.deposit,
                    note: Some(format!(
                        "Deposit for {} on {}",
                        draft.titles().join(", "),
                        format_event_date(draft.event_date)
                    )),
                },
                CheckoutLine {
                    name: String::from("Remaining balance"),
                    amount: Money::ZERO,
                    note: Some(format!("{} due before the event", pricing.remaining)),
                },
            ],
            customer_email: draft.customer.email.clone(),
        };

        let link: CheckoutLink = self
            .call_processor(self.processor.create_checkout_link(link_request))
            .await
            .map_err(|e| {
                warn!(booking_id = %booking_id, error = %e, "Checkout link creation failed");
                ApiError::from(e)
            })?;

        let mut booking: Booking = draft.into_booking(booking_id, pricing);
        booking.checkout_url = Some(link.url.clone());
        booking.order_id = link.order_id;

        if let Err(e) = self.store_new_booking(&booking).await {
            report_reconciliation_gap(&booking.booking_id, "checkout", "checkout_link", &e);
            return Err(e);
        }

        info!(
            booking_id = %booking.booking_id,
            event_date = %format_event_date(booking.event_date),
            total = %booking.pricing.total,
            deposit = %booking.pricing.deposit,
            "Checkout started"
        );
        self.notify(&booking, NotificationKind::CheckoutStarted).await;

        Ok(CheckoutResponse {
            booking_id: booking.booking_id.to_string(),
            checkout_url: link.url,
            pricing: booking.pricing,
        })
    }

    /// Books a cart directly, without a checkout.
    ///
    /// The rules, the availability check and the insert share one lock
    /// acquisition.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is malformed, the date or items are
    /// unavailable, or the store fails.
    pub async fn create_booking(&self, request: BookingRequest) -> Result<Booking, ApiError> {
        let draft: Draft = Draft::validate(request)?;
        let booking: Booking = {
            let mut store: MutexGuard<'_, Persistence> = self.lock_store().await?;
            let pricing: PricingBreakdown = self.price_locked(&mut store, &draft)?;
            let booking: Booking = draft.into_booking(BookingId::generate(), pricing);
            store.create_booking(&booking)?;
            booking
        };

        info!(
            booking_id = %booking.booking_id,
            event_date = %format_event_date(booking.event_date),
            total = %booking.pricing.total,
            "Booking created"
        );
        self.notify(&booking, NotificationKind::BookingReceived).await;
        Ok(booking)
    }
}
