// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
};
use serde_json::{Value, json};

use super::helpers::{
    TestApp, admin_request, body_json, booking_body, create_booking, create_test_app,
    json_request, send, signed_webhook,
};

fn deposit_event(booking_id: &str, status: &str) -> Value {
    json!({
        "type": "payment.updated",
        "event_id": "evt-1",
        "data": { "object": { "payment": {
            "id": "pay-1",
            "status": status,
            "note": format!("booking_id={booking_id};purpose=deposit"),
        } } },
    })
}

// ============================================================================
// Public routes
// ============================================================================

#[tokio::test]
async fn test_health() {
    let app: TestApp = create_test_app();

    let response: Response<Body> = send(
        &app.router,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_checkout_returns_link_and_pricing() {
    let app: TestApp = create_test_app();

    let response: Response<Body> = send(
        &app.router,
        json_request("POST", "/checkout", &booking_body("2025-06-01", "Slide")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = body_json(response).await;
    let booking_id: &str = body["bookingId"].as_str().unwrap();
    assert_eq!(
        body["checkoutUrl"].as_str().unwrap(),
        format!("https://checkout.example.com/checkout-{booking_id}")
    );
    assert!(body["pricing"]["deposit"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_empty_cart_is_bad_request() {
    let app: TestApp = create_test_app();
    let mut body: Value = booking_body("2025-06-01", "Slide");
    body["cart"] = json!([]);

    let response: Response<Body> =
        send(&app.router, json_request("POST", "/checkout", &body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], true);
}

#[tokio::test]
async fn test_taken_item_is_conflict_with_item_named() {
    let app: TestApp = create_test_app();
    create_booking(&app, "2025-06-01", "Slide").await;

    let response: Response<Body> = send(
        &app.router,
        json_request("POST", "/bookings", &booking_body("2025-06-01", "Slide")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["conflict"], "Slide");
}

#[tokio::test]
async fn test_direct_booking_is_created() {
    let app: TestApp = create_test_app();

    let response: Response<Body> = send(
        &app.router,
        json_request("POST", "/bookings", &booking_body("2025-06-01", "Slide")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let booking: Value = body_json(response).await;
    assert_eq!(booking["status"], "active");
    assert_eq!(booking["paymentStatus"], "pending");
    assert_eq!(
        app.notifier.templates(),
        vec![String::from("booking_received"), String::from("booking_received")]
    );
}

#[tokio::test]
async fn test_availability_check() {
    let app: TestApp = create_test_app();
    create_booking(&app, "2025-06-01", "Slide").await;

    let response: Response<Body> = send(
        &app.router,
        json_request(
            "POST",
            "/bookings/check-availability",
            &json!({ "date": "2025-06-01", "items": ["Slide", "Tent"] }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let result: Value = body_json(response).await;
    assert_eq!(result["available"], false);
    assert_eq!(result["conflict"], "Slide");
}

// ============================================================================
// Webhooks
// ============================================================================

#[tokio::test]
async fn test_webhook_without_valid_signature_is_refused() {
    let app: TestApp = create_test_app();
    let request: Request<Body> = Request::builder()
        .method("POST")
        .uri("/webhooks/payment")
        .header("x-signature", "00ff")
        .body(Body::from(deposit_event("b1", "COMPLETED").to_string()))
        .unwrap();

    let response: Response<Body> = send(&app.router, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Invalid signature");
}

#[tokio::test]
async fn test_webhook_applies_once_then_reports_duplicate() {
    let app: TestApp = create_test_app();
    let checkout: Response<Body> = send(
        &app.router,
        json_request("POST", "/checkout", &booking_body("2025-06-01", "Slide")),
    )
    .await;
    let booking_id: String = body_json(checkout).await["bookingId"]
        .as_str()
        .unwrap()
        .to_string();

    let first: Value = body_json(
        send(
            &app.router,
            signed_webhook(&deposit_event(&booking_id, "COMPLETED")),
        )
        .await,
    )
    .await;
    let second: Value = body_json(
        send(
            &app.router,
            signed_webhook(&deposit_event(&booking_id, "COMPLETED")),
        )
        .await,
    )
    .await;

    assert_eq!(first, json!({ "received": true, "outcome": "applied" }));
    assert_eq!(second["outcome"], "duplicate");
}

#[tokio::test]
async fn test_webhook_for_unknown_booking_is_acknowledged() {
    let app: TestApp = create_test_app();

    let response: Response<Body> = send(
        &app.router,
        signed_webhook(&deposit_event("no-such-booking", "COMPLETED")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["outcome"], "ignored");
}

// ============================================================================
// Admin routes
// ============================================================================

#[tokio::test]
async fn test_admin_routes_require_identity() {
    let app: TestApp = create_test_app();

    for uri in ["/bookings", "/calendar", "/settings/booking-rules"] {
        let response: Response<Body> = send(
            &app.router,
            Request::builder().uri(uri).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }

    let blank: Response<Body> = send(
        &app.router,
        Request::builder()
            .uri("/bookings")
            .header("x-admin-identity", "   ")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(blank.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_reads() {
    let app: TestApp = create_test_app();
    let booking_id: String = create_booking(&app, "2025-06-01", "Slide").await;
    create_booking(&app, "2025-06-03", "Tent").await;

    let all: Value =
        body_json(send(&app.router, admin_request("GET", "/bookings", None)).await).await;
    let one: Value = body_json(
        send(
            &app.router,
            admin_request("GET", &format!("/bookings/{booking_id}"), None),
        )
        .await,
    )
    .await;
    let on_date: Value = body_json(
        send(
            &app.router,
            admin_request("GET", "/bookings/date/2025-06-03", None),
        )
        .await,
    )
    .await;
    let with_item: Value = body_json(
        send(&app.router, admin_request("GET", "/bookings/item/Slide", None)).await,
    )
    .await;
    let calendar: Value =
        body_json(send(&app.router, admin_request("GET", "/calendar", None)).await).await;

    assert_eq!(all.as_array().unwrap().len(), 2);
    assert_eq!(one["bookingId"], booking_id.as_str());
    assert_eq!(on_date[0]["items"][0]["title"], "Tent");
    assert_eq!(with_item[0]["bookingId"], booking_id.as_str());
    assert_eq!(calendar.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_missing_booking_is_not_found() {
    let app: TestApp = create_test_app();

    let response: Response<Body> = send(
        &app.router,
        admin_request("GET", "/bookings/does-not-exist", None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_guarded_update_then_illegal_update() {
    let app: TestApp = create_test_app();
    let booking_id: String = create_booking(&app, "2025-06-01", "Slide").await;
    let uri: String = format!("/bookings/{booking_id}");

    let canceled: Response<Body> = send(
        &app.router,
        admin_request("PUT", &uri, Some(&json!({ "status": "canceled" }))),
    )
    .await;
    assert_eq!(canceled.status(), StatusCode::OK);
    let body: Value = body_json(canceled).await;
    assert_eq!(body["booking"]["status"], "canceled");
    assert_eq!(body["transitions"][0]["outcome"], "applied");

    let completed: Response<Body> = send(
        &app.router,
        admin_request("PUT", &uri, Some(&json!({ "status": "completed" }))),
    )
    .await;
    assert_eq!(completed.status(), StatusCode::CONFLICT);

    let history: Value = body_json(
        send(
            &app.router,
            admin_request("GET", &format!("{uri}/history"), None),
        )
        .await,
    )
    .await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(
        app.notifier
            .templates()
            .iter()
            .filter(|template| *template == "booking_canceled")
            .count(),
        1
    );
}

#[tokio::test]
async fn test_note_and_delete() {
    let app: TestApp = create_test_app();
    let booking_id: String = create_booking(&app, "2025-06-01", "Slide").await;
    let uri: String = format!("/bookings/{booking_id}");

    let noted: Value = body_json(
        send(
            &app.router,
            admin_request(
                "POST",
                &format!("{uri}/note"),
                Some(&json!({ "note": "side gate" })),
            ),
        )
        .await,
    )
    .await;
    assert_eq!(noted["adminNote"], "side gate");

    let deleted: Response<Body> = send(&app.router, admin_request("DELETE", &uri, None)).await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let gone: Response<Body> = send(&app.router, admin_request("GET", &uri, None)).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_booking_rules_round_trip() {
    let app: TestApp = create_test_app();

    let updated: Response<Body> = send(
        &app.router,
        admin_request(
            "PUT",
            "/settings/booking-rules",
            Some(&json!({ "maxBookingsPerDay": 1 })),
        ),
    )
    .await;
    assert_eq!(updated.status(), StatusCode::OK);

    let rules: Value = body_json(
        send(
            &app.router,
            admin_request("GET", "/settings/booking-rules", None),
        )
        .await,
    )
    .await;
    assert_eq!(rules["maxBookingsPerDay"], 1);
    assert_eq!(rules["depositPercent"], 35);

    create_booking(&app, "2025-06-01", "Slide").await;
    let second: Response<Body> = send(
        &app.router,
        json_request("POST", "/bookings", &booking_body("2025-06-01", "Tent")),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_scheduler_run_with_date_override() {
    let app: TestApp = create_test_app();
    create_booking(&app, "2025-06-01", "Slide").await;

    let response: Response<Body> = send(
        &app.router,
        admin_request("POST", "/scheduler/run", Some(&json!({ "date": "2025-06-01" }))),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let report: Value = body_json(response).await;
    assert_eq!(report["date"], "2025-06-01");
    assert_eq!(report["eventReminders"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_scheduler_run_with_bad_date_is_bad_request() {
    let app: TestApp = create_test_app();

    let response: Response<Body> = send(
        &app.router,
        admin_request("POST", "/scheduler/run", Some(&json!({ "date": "someday" }))),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_scheduler_run_without_body() {
    let app: TestApp = create_test_app();

    let response: Response<Body> =
        send(&app.router, admin_request("POST", "/scheduler/run", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
}
