// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The daily lifecycle run.
//!
//! Every task is an exact event-date scan. Bookings are handled one at a
//! time and independently: a failure is recorded in the report and the
//! run moves on to the next booking.

use rentbook::{
    CorrelationNote, NotificationGuard, NotificationKind, SchedulePlan, Transition, autopay_key,
};
use rentbook_audit::{Actor, Cause};
use rentbook_domain::{
    Booking, BookingId, BookingStatus, PaymentAttempt, PaymentStatus, ProcessorRefs,
    format_event_date,
};
use rentbook_persistence::{BookingField, Persistence};
use serde::{Deserialize, Serialize};
use time::Date;
use tokio::sync::MutexGuard;
use tracing::{debug, info, warn};

use crate::BookingEngine;
use crate::error::{ApiError, translate_core_error};
use crate::ports::{ChargeReceipt, ChargeRequest, ProcessorError};
use crate::transition::{GuardedOutcome, report_reconciliation_gap};

/// What one scheduler run did, by booking id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerReport {
    /// The run date, `YYYY-MM-DD`.
    pub date: String,
    pub autopay_charged: Vec<String>,
    pub autopay_failed: Vec<String>,
    pub balance_reminders: Vec<String>,
    pub event_reminders: Vec<String>,
    pub reengagements: Vec<String>,
    pub review_requests: Vec<String>,
    pub anniversaries: Vec<String>,
    /// Failures, one line per booking or scan.
    pub errors: Vec<String>,
}

/// Notification tasks of a run.
#[derive(Debug, Clone, Copy)]
enum Task {
    BalanceReminder,
    EventReminder,
    Reengagement,
    ReviewRequest,
    Anniversary,
}

impl Task {
    const fn as_str(self) -> &'static str {
        match self {
            Self::BalanceReminder => "balance_reminder",
            Self::EventReminder => "event_reminder",
            Self::Reengagement => "reengagement",
            Self::ReviewRequest => "review_request",
            Self::Anniversary => "anniversary",
        }
    }
}

impl SchedulerReport {
    fn record(&mut self, booking_id: &BookingId, task: Task, result: Result<bool, ApiError>) {
        match result {
            Ok(true) => {
                let list: &mut Vec<String> = match task {
                    Task::BalanceReminder => &mut self.balance_reminders,
                    Task::EventReminder => &mut self.event_reminders,
                    Task::Reengagement => &mut self.reengagements,
                    Task::ReviewRequest => &mut self.review_requests,
                    Task::Anniversary => &mut self.anniversaries,
                };
                list.push(booking_id.to_string());
            }
            Ok(false) => {}
            Err(e) => {
                warn!(
                    booking_id = %booking_id,
                    task = task.as_str(),
                    error = %e,
                    "Scheduler task failed"
                );
                self.errors.push(format!("{} {booking_id}: {e}", task.as_str()));
            }
        }
    }
}

impl BookingEngine {
    /// Runs every lifecycle task for `today`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the scan dates cannot be computed.
    /// Per-booking and per-scan failures are collected in the report.
    pub async fn run_scheduler(&self, today: Date) -> Result<SchedulerReport, ApiError> {
        let plan: SchedulePlan = SchedulePlan::for_day(today, self.config.autopay_lead_days)
            .map_err(translate_core_error)?;
        let mut report: SchedulerReport = SchedulerReport {
            date: format_event_date(today),
            ..SchedulerReport::default()
        };
        let cause = |task: Task| -> Cause {
            Cause::new(
                format!("scheduler-{}", format_event_date(today)),
                format!("{} scan for {}", task.as_str(), format_event_date(today)),
            )
        };

        // Balance collection for events `autopay_lead_days` out
        for booking in self
            .scan(&mut report, plan.autopay_date, Some(BookingStatus::Active))
            .await
        {
            if booking.payment_status != PaymentStatus::DepositPaid {
                continue;
            }
            match booking.processor_refs() {
                Some(_) if booking.pricing.remaining.is_positive() => {
                    self.autopay(&booking.booking_id, &mut report).await;
                }
                Some(_) => {}
                None => {
                    let result: Result<bool, ApiError> = self
                        .send_guarded(
                            &booking,
                            NotificationGuard::BalanceReminder,
                            cause(Task::BalanceReminder),
                        )
                        .await;
                    report.record(&booking.booking_id, Task::BalanceReminder, result);
                }
            }
        }

        // Day-of reminders
        for booking in self
            .scan(&mut report, plan.today, Some(BookingStatus::Active))
            .await
        {
            let result: Result<bool, ApiError> = if self.config.guard_event_reminders {
                self.send_guarded(
                    &booking,
                    NotificationGuard::EventReminder,
                    cause(Task::EventReminder),
                )
                .await
            } else {
                self.notify(&booking, NotificationKind::EventReminder).await;
                Ok(true)
            };
            report.record(&booking.booking_id, Task::EventReminder, result);
        }

        // Follow-ups for yesterday's events
        for booking in self.scan(&mut report, plan.yesterday, None).await {
            if booking.payment_status.is_deposit_collected() {
                let result: Result<bool, ApiError> = self
                    .send_guarded(
                        &booking,
                        NotificationGuard::Reengagement,
                        cause(Task::Reengagement),
                    )
                    .await;
                report.record(&booking.booking_id, Task::Reengagement, result);
            }
            if booking.status == BookingStatus::Completed {
                let result: Result<bool, ApiError> = self
                    .send_guarded(
                        &booking,
                        NotificationGuard::ReviewRequest,
                        cause(Task::ReviewRequest),
                    )
                    .await;
                report.record(&booking.booking_id, Task::ReviewRequest, result);
            }
        }

        for (days, date) in &plan.anniversaries {
            for booking in self
                .scan(&mut report, *date, Some(BookingStatus::Completed))
                .await
            {
                let result: Result<bool, ApiError> = self
                    .send_guarded(
                        &booking,
                        NotificationGuard::Anniversary(*days),
                        cause(Task::Anniversary),
                    )
                    .await;
                report.record(&booking.booking_id, Task::Anniversary, result);
            }
        }

        info!(
            date = %report.date,
            autopay_charged = report.autopay_charged.len(),
            autopay_failed = report.autopay_failed.len(),
            balance_reminders = report.balance_reminders.len(),
            event_reminders = report.event_reminders.len(),
            reengagements = report.reengagements.len(),
            review_requests = report.review_requests.len(),
            anniversaries = report.anniversaries.len(),
            errors = report.errors.len(),
            "Scheduler run complete"
        );
        Ok(report)
    }

    /// Loads the bookings of one event date. A failed scan is recorded and
    /// yields nothing.
    async fn scan(
        &self,
        report: &mut SchedulerReport,
        date: Date,
        status: Option<BookingStatus>,
    ) -> Vec<Booking> {
        self.bookings_on(date, status).await.unwrap_or_else(|e| {
            warn!(event_date = %format_event_date(date), error = %e, "Scheduler scan failed");
            report
                .errors
                .push(format!("scan {}: {e}", format_event_date(date)));
            Vec::new()
        })
    }

    async fn current_booking(&self, booking_id: &BookingId) -> Result<Booking, ApiError> {
        let mut store: MutexGuard<'_, Persistence> = self.lock_store().await?;
        Ok(store.get_booking(booking_id)?)
    }

    async fn bookings_on(
        &self,
        date: Date,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, ApiError> {
        let mut store: MutexGuard<'_, Persistence> = self.lock_store().await?;
        Ok(store.find_bookings(&BookingField::EventDate(date), status)?)
    }

    /// Sets a one-shot flag and sends its notification if it was unset.
    async fn send_guarded(
        &self,
        booking: &Booking,
        guard: NotificationGuard,
        cause: Cause,
    ) -> Result<bool, ApiError> {
        let outcome: GuardedOutcome = self
            .apply_and_notify(
                &booking.booking_id,
                Transition::MarkNotified(guard),
                Actor::scheduler(),
                cause,
            )
            .await?;
        Ok(matches!(outcome, GuardedOutcome::Applied { .. }))
    }

    /// Charges the stored card for the remaining balance.
    ///
    /// The booking is read again right before the charge: the scan may be
    /// stale if the balance was paid since. The idempotency key is fixed
    /// per booking and event date, so a retry after a lost write cannot
    /// charge twice.
    async fn autopay(&self, booking_id: &BookingId, report: &mut SchedulerReport) {
        let booking: Booking = match self.current_booking(booking_id).await {
            Ok(booking) => booking,
            Err(e) => {
                warn!(booking_id = %booking_id, error = %e, "Autopay skipped");
                report.errors.push(format!("autopay {booking_id}: {e}"));
                return;
            }
        };
        let refs: ProcessorRefs = match booking.processor_refs() {
            Some(refs)
                if booking.status == BookingStatus::Active
                    && booking.payment_status == PaymentStatus::DepositPaid
                    && booking.pricing.remaining.is_positive() =>
            {
                refs
            }
            _ => {
                debug!(
                    booking_id = %booking_id,
                    payment_status = booking.payment_status.as_str(),
                    "Autopay no longer due"
                );
                return;
            }
        };
        let key: String = autopay_key(booking_id, booking.event_date);
        let request: ChargeRequest = ChargeRequest {
            idempotency_key: key.clone(),
            customer_id: refs.customer_id,
            payment_source_id: refs.payment_source_id,
            amount: booking.pricing.remaining,
            note: CorrelationNote::new(booking_id.clone(), PaymentAttempt::Balance).render(),
        };
        let cause: Cause = Cause::new(key.clone(), String::from("autopay before the event"));

        let charged: Result<ChargeReceipt, ProcessorError> = self
            .call_processor(self.processor.charge_stored_source(request))
            .await;
        match charged {
            Ok(receipt) => {
                info!(
                    booking_id = %booking_id,
                    payment_id = %receipt.payment_id,
                    amount = %booking.pricing.remaining,
                    "Autopay charged"
                );
                let transition: Transition = Transition::MarkBalancePaid {
                    reference: receipt.payment_id,
                };
                match self
                    .apply_and_notify(booking_id, transition, Actor::scheduler(), cause)
                    .await
                {
                    Ok(_) => report.autopay_charged.push(booking_id.to_string()),
                    Err(e) => {
                        report_reconciliation_gap(booking_id, "autopay", "balance_charged", &e);
                        report.errors.push(format!("autopay {booking_id}: {e}"));
                    }
                }
            }
            Err(e) => {
                warn!(booking_id = %booking_id, error = %e, "Autopay charge failed");
                report.autopay_failed.push(booking_id.to_string());
                let transition: Transition = Transition::MarkPaymentFailed {
                    attempt: PaymentAttempt::Balance,
                    reference: key,
                };
                if let Err(e) = self
                    .apply_and_notify(booking_id, transition, Actor::scheduler(), cause)
                    .await
                {
                    report.errors.push(format!("autopay {booking_id}: {e}"));
                }
            }
        }
    }
}
