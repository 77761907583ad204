// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTTP routes.
//!
//! Handlers are thin: they extract the request, call the engine and map
//! `ApiError` onto a status code. No booking logic lives here.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State as AxumState},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rentbook_api::{
    AdminNoteRequest, ApiError, AvailabilityRequest, BookingEngine, BookingRequest, CalendarDay,
    CheckoutResponse, SIGNATURE_HEADER, SchedulerReport, SchedulerRunRequest, UpdateBookingRequest,
    UpdateBookingResponse, WebhookAck, translate_domain_error,
};
use rentbook_domain::{AvailabilityResult, Booking, BookingId, BookingRules, parse_event_date};
use rentbook_persistence::HistoryEntry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{Date, OffsetDateTime};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::admin::AdminIdentity;

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: BookingEngine,
}

/// Error body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: bool,
    pub message: String,
    /// The conflicting item when a booking is refused for availability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
    conflict: Option<String>,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
            conflict: self.conflict,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::EmptyCart | ApiError::InvalidInput { .. } | ApiError::InvalidSignature => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::DomainRuleViolation { .. } | ApiError::Unavailable { .. } => {
                StatusCode::CONFLICT
            }
            ApiError::PaymentProcessor { .. } => StatusCode::BAD_GATEWAY,
            ApiError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %err, "Request failed");
        } else {
            debug!(status = status.as_u16(), error = %err, "Request refused");
        }

        let conflict: Option<String> = match &err {
            ApiError::Unavailable { conflict, .. } => conflict.clone(),
            _ => None,
        };
        Self {
            status,
            message: err.to_string(),
            conflict,
        }
    }
}

// ============================================================================
// Public routes
// ============================================================================

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("ok"),
    })
}

/// Handler for POST `/checkout`.
async fn handle_checkout(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<BookingRequest>,
) -> Result<Json<CheckoutResponse>, HttpError> {
    info!(
        items = req.cart.len(),
        event_date = %req.event_date,
        "Handling checkout request"
    );
    let response: CheckoutResponse = app_state.engine.start_checkout(req).await?;
    Ok(Json(response))
}

/// Handler for POST `/webhooks/payment`.
///
/// The raw body is handed to the engine untouched; the signature covers
/// the exact bytes received.
async fn handle_payment_webhook(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, HttpError> {
    let signature: &str = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let ack: WebhookAck = app_state.engine.handle_event(&body, signature).await?;
    Ok(Json(ack))
}

/// Handler for POST `/bookings`.
async fn handle_create_booking(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<BookingRequest>,
) -> Result<(StatusCode, Json<Booking>), HttpError> {
    let booking: Booking = app_state.engine.create_booking(req).await?;
    info!(booking_id = %booking.booking_id, "Created booking");
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Handler for POST `/bookings/check-availability`.
async fn handle_check_availability(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<AvailabilityRequest>,
) -> Result<Json<AvailabilityResult>, HttpError> {
    let result: AvailabilityResult = app_state.engine.check_availability(&req).await?;
    Ok(Json(result))
}

// ============================================================================
// Admin routes
// ============================================================================

async fn handle_list_bookings(
    AxumState(app_state): AxumState<AppState>,
    AdminIdentity(_admin): AdminIdentity,
) -> Result<Json<Vec<Booking>>, HttpError> {
    Ok(Json(app_state.engine.list_bookings().await?))
}

async fn handle_get_booking(
    AxumState(app_state): AxumState<AppState>,
    AdminIdentity(_admin): AdminIdentity,
    Path(booking_id): Path<String>,
) -> Result<Json<Booking>, HttpError> {
    let booking: Booking = app_state
        .engine
        .get_booking(&BookingId::new(&booking_id))
        .await?;
    Ok(Json(booking))
}

/// Handler for PUT `/bookings/{id}`.
async fn handle_update_booking(
    AxumState(app_state): AxumState<AppState>,
    AdminIdentity(admin): AdminIdentity,
    Path(booking_id): Path<String>,
    Json(req): Json<UpdateBookingRequest>,
) -> Result<Json<UpdateBookingResponse>, HttpError> {
    info!(admin = %admin, booking_id = %booking_id, "Handling booking update");
    let response: UpdateBookingResponse = app_state
        .engine
        .update_booking(&BookingId::new(&booking_id), &req, &admin)
        .await?;
    Ok(Json(response))
}

async fn handle_delete_booking(
    AxumState(app_state): AxumState<AppState>,
    AdminIdentity(admin): AdminIdentity,
    Path(booking_id): Path<String>,
) -> Result<StatusCode, HttpError> {
    app_state
        .engine
        .delete_booking(&BookingId::new(&booking_id), &admin)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn handle_add_note(
    AxumState(app_state): AxumState<AppState>,
    AdminIdentity(admin): AdminIdentity,
    Path(booking_id): Path<String>,
    Json(req): Json<AdminNoteRequest>,
) -> Result<Json<Booking>, HttpError> {
    let booking: Booking = app_state
        .engine
        .add_note(&BookingId::new(&booking_id), &req.note, &admin)
        .await?;
    Ok(Json(booking))
}

async fn handle_booking_history(
    AxumState(app_state): AxumState<AppState>,
    AdminIdentity(_admin): AdminIdentity,
    Path(booking_id): Path<String>,
) -> Result<Json<Vec<HistoryEntry>>, HttpError> {
    let history: Vec<HistoryEntry> = app_state
        .engine
        .booking_history(&BookingId::new(&booking_id))
        .await?;
    Ok(Json(history))
}

async fn handle_bookings_on_date(
    AxumState(app_state): AxumState<AppState>,
    AdminIdentity(_admin): AdminIdentity,
    Path(date): Path<String>,
) -> Result<Json<Vec<Booking>>, HttpError> {
    Ok(Json(app_state.engine.bookings_on_date(&date).await?))
}

async fn handle_bookings_with_item(
    AxumState(app_state): AxumState<AppState>,
    AdminIdentity(_admin): AdminIdentity,
    Path(item): Path<String>,
) -> Result<Json<Vec<Booking>>, HttpError> {
    Ok(Json(app_state.engine.bookings_with_item(&item).await?))
}

async fn handle_calendar(
    AxumState(app_state): AxumState<AppState>,
    AdminIdentity(_admin): AdminIdentity,
) -> Result<Json<Vec<CalendarDay>>, HttpError> {
    Ok(Json(app_state.engine.calendar().await?))
}

/// Handler for POST `/scheduler/run`.
///
/// The body is optional. A `date` in it overrides today (UTC), which is
/// how missed runs are replayed.
async fn handle_run_scheduler(
    AxumState(app_state): AxumState<AppState>,
    AdminIdentity(admin): AdminIdentity,
    body: Bytes,
) -> Result<Json<SchedulerReport>, HttpError> {
    let req: SchedulerRunRequest = if body.iter().all(u8::is_ascii_whitespace) {
        SchedulerRunRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::InvalidInput {
            field: String::from("body"),
            message: e.to_string(),
        })?
    };

    let today: Date = match req.date.as_deref() {
        Some(raw) => parse_event_date(raw).map_err(translate_domain_error)?,
        None => OffsetDateTime::now_utc().date(),
    };

    info!(admin = %admin, %today, "Running lifecycle scheduler");
    let report: SchedulerReport = app_state.engine.run_scheduler(today).await?;
    Ok(Json(report))
}

async fn handle_get_booking_rules(
    AxumState(app_state): AxumState<AppState>,
    AdminIdentity(_admin): AdminIdentity,
) -> Result<Json<BookingRules>, HttpError> {
    Ok(Json(app_state.engine.booking_rules().await?))
}

async fn handle_update_booking_rules(
    AxumState(app_state): AxumState<AppState>,
    AdminIdentity(admin): AdminIdentity,
    Json(patch): Json<Value>,
) -> Result<Json<BookingRules>, HttpError> {
    let rules: BookingRules = app_state
        .engine
        .update_booking_rules(&patch, &admin)
        .await?;
    Ok(Json(rules))
}

/// Builds the application router with all endpoints.
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/checkout", post(handle_checkout))
        .route("/webhooks/payment", post(handle_payment_webhook))
        .route(
            "/bookings",
            post(handle_create_booking).get(handle_list_bookings),
        )
        .route(
            "/bookings/check-availability",
            post(handle_check_availability),
        )
        .route(
            "/bookings/{id}",
            get(handle_get_booking)
                .put(handle_update_booking)
                .delete(handle_delete_booking),
        )
        .route("/bookings/{id}/note", post(handle_add_note))
        .route("/bookings/{id}/history", get(handle_booking_history))
        .route("/bookings/date/{date}", get(handle_bookings_on_date))
        .route("/bookings/item/{item}", get(handle_bookings_with_item))
        .route("/calendar", get(handle_calendar))
        .route("/scheduler/run", post(handle_run_scheduler))
        .route(
            "/settings/booking-rules",
            get(handle_get_booking_rules).put(handle_update_booking_rules),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
