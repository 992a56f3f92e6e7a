//! Typed endpoint wrapper tests: query construction, request payloads,
//! and response parsing against a mock backend.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use roadmate_core::models::{BookingRequest, BookingStatus, PlaceFilter, PlaceType, RegisterRequest};
use roadmate_core::{ApiClient, Config, SessionStore, SessionTokens};

fn setup(server: &MockServer, dir: &TempDir) -> (ApiClient, Arc<SessionStore>) {
    let config = Config {
        base_url: format!("{}/api", server.uri()),
        last_username: None,
    };
    let session = Arc::new(SessionStore::new(dir.path().to_path_buf()));
    let client = ApiClient::new(&config, Arc::clone(&session)).expect("client builds");
    (client, session)
}

async fn seed_session(session: &SessionStore) {
    session
        .set(SessionTokens::new(
            "A1".to_string(),
            "R1".to_string(),
            "alice".to_string(),
        ))
        .await
        .expect("session persists");
}

fn place_body(id: i64, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "place_type": "hotel",
        "description": "",
        "latitude": "12.971600",
        "longitude": "77.594600",
        "address": "NH44, km 212",
        "city": "Bangalore",
        "state": "Karnataka",
        "country": "India",
        "price_range": "$$",
        "contact_number": "08012345678",
        "is_available": true,
        "amenities": [],
        "created_at": "2024-11-02T08:30:00Z",
        "updated_at": "2024-11-02T08:30:00Z"
    })
}

#[tokio::test]
async fn places_sends_filter_query_params() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (client, _session) = setup(&server, &dir);

    Mock::given(method("GET"))
        .and(path("/api/rest-places/places/"))
        .and(query_param("city", "Bangalore"))
        .and(query_param("place_type", "hotel"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([place_body(3, "Highway Haven")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let filter = PlaceFilter {
        city: Some("Bangalore".to_string()),
        place_type: Some(PlaceType::Hotel),
        ..Default::default()
    };
    let places = client.places(&filter).await.expect("search succeeds");
    assert_eq!(places.len(), 1);
    assert_eq!(places[0].name, "Highway Haven");
    assert_eq!(places[0].latitude, 12.9716);
}

#[tokio::test]
async fn nearby_places_sends_coordinates_and_radius() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (client, _session) = setup(&server, &dir);

    Mock::given(method("GET"))
        .and(path("/api/rest-places/places/nearby/"))
        .and(query_param("latitude", "12.9716"))
        .and(query_param("longitude", "77.5946"))
        .and(query_param("radius", "25"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([place_body(3, "Highway Haven")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let places = client
        .nearby_places(12.9716, 77.5946, 25.0)
        .await
        .expect("nearby search succeeds");
    assert_eq!(places.len(), 1);
}

#[tokio::test]
async fn place_types_returns_code_to_label_mapping() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (client, _session) = setup(&server, &dir);

    Mock::given(method("GET"))
        .and(path("/api/rest-places/places/types/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hotel": "Hotel",
            "motel": "Motel",
            "rest_stop": "Rest Stop"
        })))
        .mount(&server)
        .await;

    let types = client.place_types().await.expect("types fetch succeeds");
    assert_eq!(types.get("rest_stop").map(String::as_str), Some("Rest Stop"));
}

#[tokio::test]
async fn amenities_parse() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (client, _session) = setup(&server, &dir);

    Mock::given(method("GET"))
        .and(path("/api/rest-places/amenities/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Parking", "icon": "parking"},
            {"id": 2, "name": "WiFi", "icon": "wifi"}
        ])))
        .mount(&server)
        .await;

    let amenities = client.amenities().await.expect("amenities fetch succeeds");
    assert_eq!(amenities.len(), 2);
    assert_eq!(amenities[1].name, "WiFi");
}

#[tokio::test]
async fn book_place_posts_stay_details() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (client, session) = setup(&server, &dir);
    seed_session(&session).await;

    Mock::given(method("POST"))
        .and(path("/api/rest-places/places/3/book/"))
        .and(body_partial_json(json!({ "total_price": "1200.00" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 12,
            "user": 7,
            "rest_place": 3,
            "rest_place_name": "Highway Haven",
            "user_name": "alice",
            "check_in": "2025-01-10T14:00:00Z",
            "check_out": "2025-01-11T10:00:00Z",
            "status": "pending",
            "total_price": "1200.00",
            "created_at": "2025-01-02T09:15:00Z",
            "updated_at": "2025-01-02T09:15:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = BookingRequest {
        check_in: Utc.with_ymd_and_hms(2025, 1, 10, 14, 0, 0).unwrap(),
        check_out: Utc.with_ymd_and_hms(2025, 1, 11, 10, 0, 0).unwrap(),
        total_price: "1200.00".to_string(),
    };
    let booking = client.book_place(3, &request).await.expect("booking succeeds");
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.total_price, 1200.0);
}

#[tokio::test]
async fn cancel_booking_posts_to_cancel_action() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (client, session) = setup(&server, &dir);
    seed_session(&session).await;

    Mock::given(method("POST"))
        .and(path("/api/rest-places/bookings/12/cancel/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "status": "Booking cancelled" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let cancelled = client.cancel_booking(12).await.expect("cancel succeeds");
    assert_eq!(cancelled.status, "Booking cancelled");
}

#[tokio::test]
async fn add_credits_posts_amount_and_parses_balance() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (client, session) = setup(&server, &dir);
    seed_session(&session).await;

    Mock::given(method("POST"))
        .and(path("/api/users/credits/"))
        .and(body_json(json!({ "amount": 100.0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Added 100 credits",
            "new_balance": 250.0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let added = client.add_credits(100.0).await.expect("top-up succeeds");
    assert_eq!(added.new_balance, 250.0);
}

#[tokio::test]
async fn update_profile_sends_only_set_fields() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (client, session) = setup(&server, &dir);
    seed_session(&session).await;

    Mock::given(method("PATCH"))
        .and(path("/api/users/profile/"))
        .and(body_json(json!({ "phone_number": "9980012345" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "username": "alice",
            "phone_number": "9980012345"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let update = roadmate_core::models::ProfileUpdate {
        phone_number: Some("9980012345".to_string()),
        ..Default::default()
    };
    let profile = client.update_profile(&update).await.expect("update succeeds");
    assert_eq!(profile.phone_number.as_deref(), Some("9980012345"));
}

#[tokio::test]
async fn register_chains_into_login() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (client, session) = setup(&server, &dir);

    Mock::given(method("POST"))
        .and(path("/api/users/register/"))
        .and(body_partial_json(json!({ "username": "bob" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "message": "User registered successfully",
            "user": { "id": 9, "username": "bob" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .and(body_json(json!({ "username": "bob", "password": "hunter2" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access": "B1", "refresh": "BR1" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/users/profile/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": 9, "username": "bob" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = RegisterRequest {
        username: "bob".to_string(),
        email: "bob@example.com".to_string(),
        password: "hunter2".to_string(),
        phone_number: None,
    };
    let profile = client.register(&request).await.expect("register succeeds");
    assert_eq!(profile.username, "bob");
    assert_eq!(session.access().await.as_deref(), Some("B1"));
    assert_eq!(session.username().await.as_deref(), Some("bob"));
}
