use super::common::*;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Duration;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::waitlist::clock::FixedClock;
use crate::workflows::waitlist::domain::{DayOfWeek, Urgency, WaitlistStatus};
use crate::workflows::waitlist::router::{
    book_handler, entry_matches_handler, matches_handler, waitlist_handler, BookMatchRequest,
    WaitlistQuery,
};
use crate::workflows::waitlist::settings::MatchingSettings;
use crate::workflows::waitlist::store::InMemoryClinicStore;
use crate::workflows::waitlist::{matching_router, WaitlistMatchingService};

fn seeded_service() -> Arc<WaitlistMatchingService<InMemoryClinicStore, InMemoryClinicStore>> {
    let mut mondays = entry("E2", Urgency::Normal, 10);
    mondays.preferences.available_days.insert(DayOfWeek::Mon);
    let (service, _) = build_service(
        vec![entry("E1", Urgency::Urgent, 3), mondays],
        vec![
            slot("S1", monday_morning()),
            slot("S2", tuesday_morning()),
        ],
    );
    Arc::new(service)
}

/// Initial consults with Dr Johnson at the main clinic (one booked) and massage with Michael
/// Chen at the north branch (one already in the past).
fn catalog_service() -> Arc<WaitlistMatchingService<InMemoryClinicStore, InMemoryClinicStore>> {
    let massage_slot = |id: &str, starts_at| {
        let mut slot = slot(id, starts_at);
        slot.practitioner = michael_chen();
        slot.business = north_branch();
        slot.appointment_type = massage();
        slot
    };
    let massage_entry = |id: &str, status| {
        let mut entry = entry(id, Urgency::High, 2);
        entry.appointment_type = massage();
        entry.status = status;
        entry
    };
    let mut booked = slot("S2", tuesday_morning());
    booked.is_booked = true;

    let (service, _) = build_service(
        vec![
            entry("E1", Urgency::Urgent, 3),
            massage_entry("E-massage", WaitlistStatus::Active),
            massage_entry("E-cancelled", WaitlistStatus::Cancelled),
        ],
        vec![
            slot("S1", monday_morning()),
            booked,
            massage_slot("S3", at(5, 14)),
            massage_slot("S4", at(6, 9)),
            massage_slot("S-past", now() - Duration::days(1)),
        ],
    );
    Arc::new(service)
}

fn book_request(entry: &str, slot: &str) -> Result<axum::Json<BookMatchRequest>, JsonRejection> {
    Ok(axum::Json(BookMatchRequest {
        waitlist_entry_id: Some(entry.to_string()),
        slot_id: Some(slot.to_string()),
    }))
}

async fn get(router: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            axum::http::Request::get(uri)
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");
    let status = response.status();
    (status, read_json_body(response).await)
}

#[tokio::test]
async fn matches_handler_renders_ranked_board() {
    let response = matches_handler(State(seeded_service())).await.into_response();

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["count"], json!(3));
    let first = &payload["matches"][0];
    assert_eq!(first["id"], json!("E1-S1"));
    assert_eq!(first["score"], json!(146));
    assert_eq!(first["breakdown"]["urgency_bonus"], json!(40));
    assert_eq!(first["match_reasons"], json!(["Urgent priority"]));
    assert_eq!(first["waitlist_entry"]["patient"]["name"], json!("John Smith"));
    assert_eq!(first["slot"]["practitioner"]["name"], json!("Dr Sarah Johnson"));
    assert_eq!(first["slot"]["business"]["name"], json!("Main Clinic"));
}

#[tokio::test]
async fn entry_matches_handler_returns_not_found_for_unknown_entry() {
    let response = entry_matches_handler(State(seeded_service()), Path("missing".to_string()))
        .await
        .into_response();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], json!("waitlist entry missing not found"));
}

#[tokio::test]
async fn entry_matches_handler_lists_slots_without_repeating_entry() {
    let response = entry_matches_handler(State(seeded_service()), Path("E2".to_string()))
        .await
        .into_response();

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["waitlist_entry_id"], json!("E2"));
    assert_eq!(payload["count"], json!(1));
    assert_eq!(payload["matches"][0]["slot"]["id"], json!("S1"));
    assert!(payload["matches"][0].get("waitlist_entry").is_none());
    assert_eq!(
        payload["matches"][0]["match_reasons"],
        json!(["Available on mon", "Waiting 10 days"])
    );
}

#[tokio::test]
async fn book_handler_requires_both_ids() {
    let request = Ok(axum::Json(BookMatchRequest {
        waitlist_entry_id: Some("E1".to_string()),
        slot_id: Some("   ".to_string()),
    }));

    let response = book_handler(State(seeded_service()), request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["success"], json!(false));
    assert_eq!(
        payload["error"],
        json!("waitlist_entry_id and slot_id are required")
    );
}

#[tokio::test]
async fn book_handler_maps_outcomes_to_status_codes() {
    let service = seeded_service();

    let created = book_handler(State(service.clone()), book_request("E1", "S1")).await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let payload = read_json_body(created).await;
    assert_eq!(payload["success"], json!(true));
    assert_eq!(payload["appointment_id"], json!("apt-000001"));

    let conflict = book_handler(State(service.clone()), book_request("E2", "S1")).await;
    assert_eq!(conflict.status(), StatusCode::CONFLICT);
    let payload = read_json_body(conflict).await;
    assert_eq!(payload["success"], json!(false));
    assert_eq!(payload["error"], json!("slot S1 is already booked"));

    let missing = book_handler(State(service), book_request("E2", "S9")).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn book_handler_reports_storage_failures() {
    let service = Arc::new(WaitlistMatchingService::with_clock(
        Arc::new(InMemoryClinicStore::with_records(
            vec![entry("E1", Urgency::Low, 1)],
            vec![slot("S1", monday_morning())],
        )),
        Arc::new(UnavailableBookings),
        MatchingSettings::default(),
        Arc::new(FixedClock(now())),
    ));

    let response = book_handler(State(service), book_request("E1", "S1")).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn matches_handler_surfaces_repository_outage() {
    let service = Arc::new(WaitlistMatchingService::with_clock(
        Arc::new(UnavailableRepository),
        Arc::new(UnavailableBookings),
        MatchingSettings::default(),
        Arc::new(FixedClock(now())),
    ));

    let response = matches_handler(State(service)).await.into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload["error"],
        json!("repository unavailable: database offline")
    );
}

#[tokio::test]
async fn waitlist_handler_ignores_unknown_status() {
    let query = Query(WaitlistQuery {
        status: Some("pending".to_string()),
    });

    let response = waitlist_handler(State(seeded_service()), query)
        .await
        .into_response();

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["count"], json!(2));
    assert_eq!(payload["entries"][0]["id"], json!("E1"));
    assert_eq!(payload["entries"][1]["available_days"], json!(["mon"]));
}

#[tokio::test]
async fn router_serves_dashboard_routes() {
    let router = matching_router(seeded_service());

    let (status, overview) = get(router.clone(), "/api/v1/dashboard/overview").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overview["active_waitlist"], json!(2));
    assert_eq!(overview["urgent_waitlist"], json!(1));
    assert_eq!(overview["available_slots"], json!(2));
    assert_eq!(overview["potential_matches"], json!(3));

    let (status, top) = get(router.clone(), "/api/v1/dashboard/top-matches?limit=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(top.as_array().map(Vec::len), Some(1));
    assert_eq!(top[0]["patient_name"], json!("John Smith"));
    assert_eq!(top[0]["practitioner"], json!("Dr Johnson"));

    let (status, stats) = get(router.clone(), "/api/v1/waitlist/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["by_urgency"]["urgent"], json!(1));

    let (status, slots) = get(router.clone(), "/api/v1/slots/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(slots["available"], json!(2));

    let (status, filtered) = get(router, "/api/v1/waitlist?status=booked").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(filtered["count"], json!(0));
}

#[tokio::test]
async fn book_route_accepts_json_payloads() {
    let service = seeded_service();
    let router = matching_router(service.clone());

    let response = router
        .oneshot(
            axum::http::Request::post("/api/v1/matching/book")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::to_vec(&json!({
                        "waitlist_entry_id": "E2",
                        "slot_id": "S1",
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["message"], json!("appointment booked from waitlist"));
    assert!(service
        .find_matches()
        .expect("matches")
        .iter()
        .all(|result| result.slot.id.as_str() != "S1"));
}

async fn post_book(
    router: axum::Router,
    content_type: Option<&str>,
    body: &str,
) -> (StatusCode, Value) {
    let mut request = axum::http::Request::post("/api/v1/matching/book");
    if let Some(content_type) = content_type {
        request = request.header(axum::http::header::CONTENT_TYPE, content_type);
    }
    let response = router
        .oneshot(request.body(axum::body::Body::from(body.to_string())).unwrap())
        .await
        .expect("route executes");
    let status = response.status();
    (status, read_json_body(response).await)
}

#[tokio::test]
async fn book_route_answers_unreadable_bodies_with_json_failure() {
    let service = seeded_service();
    let router = matching_router(service.clone());
    let body = r#"{"waitlist_entry_id":"E1","slot_id":"S1"}"#;

    let (status, payload) = post_book(router.clone(), None, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["success"], json!(false));
    assert!(payload["error"]
        .as_str()
        .is_some_and(|message| message.contains("Content-Type")));

    let (status, payload) = post_book(router, Some("application/json"), "{\"slot_id\":").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["success"], json!(false));
    assert!(payload["error"].is_string());

    assert_eq!(service.find_matches().expect("matches").len(), 3);
}

#[tokio::test]
async fn dashboard_lists_practitioner_and_type_availability() {
    let router = matching_router(catalog_service());

    let (status, practitioners) = get(router.clone(), "/api/v1/dashboard/practitioners").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(practitioners.as_array().map(Vec::len), Some(2));
    assert_eq!(practitioners[0]["id"], json!("prac-1"));
    assert_eq!(practitioners[0]["last_name"], json!("Johnson"));
    assert_eq!(practitioners[0]["available_slots"], json!(1));
    assert_eq!(practitioners[1]["id"], json!("prac-2"));
    assert_eq!(practitioners[1]["available_slots"], json!(2));

    let (status, types) = get(router, "/api/v1/dashboard/appointment-types").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        types,
        json!([
            {
                "id": "type-initial",
                "name": "Initial Consultation",
                "duration_minutes": 60,
                "color": "#4F46E5",
                "available_slots": 1,
                "active_waitlist": 1,
            },
            {
                "id": "type-massage",
                "name": "Massage Therapy",
                "duration_minutes": 60,
                "color": "#F59E0B",
                "available_slots": 2,
                "active_waitlist": 1,
            },
        ])
    );
}

#[tokio::test]
async fn slots_by_practitioner_uses_display_names() {
    let (status, rows) = get(
        matching_router(catalog_service()),
        "/api/v1/slots/by-practitioner",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        rows,
        json!([
            {
                "practitioner": {
                    "id": "prac-1",
                    "name": "Dr Sarah Johnson",
                    "designation": "Physiotherapist",
                },
                "available_slots": 1,
            },
            {
                "practitioner": {
                    "id": "prac-2",
                    "name": "Michael Chen",
                    "designation": "Massage Therapist",
                },
                "available_slots": 2,
            },
        ])
    );
}

#[tokio::test]
async fn slot_listing_applies_filters() {
    let router = matching_router(catalog_service());
    let ids = |payload: &Value| -> Vec<String> {
        payload["slots"]
            .as_array()
            .expect("slots array")
            .iter()
            .map(|slot| slot["id"].as_str().unwrap_or_default().to_string())
            .collect()
    };

    let (status, unbooked) = get(router.clone(), "/api/v1/slots").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unbooked["count"], json!(4));
    assert_eq!(ids(&unbooked), vec!["S-past", "S1", "S3", "S4"]);
    assert_eq!(unbooked["slots"][1]["is_booked"], json!(false));
    assert_eq!(
        unbooked["slots"][1]["practitioner"]["name"],
        json!("Dr Sarah Johnson")
    );

    let (_, everything) = get(router.clone(), "/api/v1/slots?include_booked=true").await;
    assert_eq!(everything["count"], json!(5));

    let (_, chen) = get(router.clone(), "/api/v1/slots?practitioner_id=prac-2").await;
    assert_eq!(ids(&chen), vec!["S-past", "S3", "S4"]);

    let (_, main) = get(
        router.clone(),
        "/api/v1/slots?business_id=biz-main&include_booked=true",
    )
    .await;
    assert_eq!(ids(&main), vec!["S1", "S2"]);
    assert_eq!(main["slots"][1]["is_booked"], json!(true));

    let (_, window) = get(
        router.clone(),
        "/api/v1/slots?from=2025-03-03T10:00:00Z&to=2025-03-05T14:00:00Z",
    )
    .await;
    assert_eq!(ids(&window), vec!["S1", "S3"]);

    let (_, massage) = get(router, "/api/v1/slots?appointment_type_id=type-massage").await;
    assert_eq!(massage["count"], json!(3));
}

#[tokio::test]
async fn slot_listing_rejects_unparseable_bounds_as_json() {
    let (status, payload) = get(
        matching_router(catalog_service()),
        "/api/v1/slots?from=yesterday",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(payload["error"].is_string());
}

#[tokio::test]
async fn waitlist_entry_route_returns_entry_or_not_found() {
    let router = matching_router(catalog_service());

    let (status, entry) = get(router.clone(), "/api/v1/waitlist/E-cancelled").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["id"], json!("E-cancelled"));
    assert_eq!(entry["status"], json!("cancelled"));
    assert_eq!(entry["appointment_type"]["id"], json!("type-massage"));

    let (status, missing) = get(router.clone(), "/api/v1/waitlist/E-unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["error"], json!("waitlist entry E-unknown not found"));

    let (status, stats) = get(router, "/api/v1/waitlist/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total"], json!(3));
}

#[tokio::test]
async fn read_routes_surface_repository_outage_as_server_error() {
    let service = Arc::new(WaitlistMatchingService::with_clock(
        Arc::new(UnavailableRepository),
        Arc::new(UnavailableBookings),
        MatchingSettings::default(),
        Arc::new(FixedClock(now())),
    ));
    let router = matching_router(service);

    for uri in [
        "/api/v1/slots",
        "/api/v1/slots/by-practitioner",
        "/api/v1/dashboard/practitioners",
        "/api/v1/dashboard/appointment-types",
        "/api/v1/waitlist/E1",
    ] {
        let (status, payload) = get(router.clone(), uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(
            payload["error"],
            json!("repository unavailable: database offline"),
            "{uri}"
        );
    }
}
