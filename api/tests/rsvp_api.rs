use adapter::repository::memory::InMemoryDb;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use kernel::model::{
    event::Event,
    id::{EventId, UserId},
    user::{EventCreator, User},
};
use registry::AppRegistry;
use serde_json::{json, Value};
use shared::config::AppConfig;
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> (Router, InMemoryDb) {
    let db = InMemoryDb::new();
    let registry = AppRegistry::with_repositories(
        Arc::new(db.clone()),
        Arc::new(db.clone()),
        Arc::new(db.clone()),
        Arc::new(db.clone()),
        Arc::new(db.clone()),
        AppConfig::new().unwrap(),
    );
    (api::route::v1::routes().with_state(registry), db)
}

fn seed_user(db: &InMemoryDb, name: &str) -> (User, String) {
    let user = User {
        user_id: UserId::new(),
        user_name: name.into(),
        email: format!("{name}@example.com"),
    };
    db.insert_user(user.clone(), "password");
    let token = format!("token-{name}");
    db.insert_access_token(&token, user.user_id);
    (user, token)
}

// 受付開始済み・開催前のイベントを登録する
fn seed_open_event(db: &InMemoryDb, capacity: i32, creator: &User) -> Event {
    let now = Utc::now();
    seed_event(
        db,
        capacity,
        creator,
        now + Duration::days(1),
        Some(now - Duration::minutes(5)),
    )
}

fn seed_event(
    db: &InMemoryDb,
    capacity: i32,
    creator: &User,
    starts_at: chrono::DateTime<Utc>,
    rsvp_open_at: Option<chrono::DateTime<Utc>>,
) -> Event {
    let event = Event {
        event_id: EventId::new(),
        title: "Rust LT Night".into(),
        description: "lightning talks".into(),
        location: "Shibuya".into(),
        capacity,
        starts_at,
        rsvp_open_at,
        created_at: Utc::now() - Duration::minutes(10),
        creator: EventCreator {
            user_id: creator.user_id,
            user_name: creator.user_name.clone(),
            email: creator.email.clone(),
        },
    };
    db.insert_event(event.clone());
    event
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    // 抽出器の拒否レスポンスはプレーンテキストのことがある
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn rsvp_and_cancel_roundtrip() {
    let (router, db) = app();
    let (creator, _) = seed_user(&db, "organizer");
    let (_alice, alice_token) = seed_user(&db, "alice");
    let event = seed_open_event(&db, 2, &creator);
    let uri = format!("/api/v1/events/{}/rsvp", event.event_id);

    let (status, body) = send(&router, Method::POST, &uri, Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["attendeesCount"], 1);
    assert_eq!(body["attendees"][0]["userName"], "alice");

    // 二重登録
    let (status, body) = send(&router, Method::POST, &uri, Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "already_rsvped");

    // 取り消し
    let (status, body) = send(&router, Method::DELETE, &uri, Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["attendeesCount"], 0);

    // 取り消し済みの取り消し
    let (status, body) = send(&router, Method::DELETE, &uri, Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "not_rsvped");
}

#[tokio::test]
async fn full_event_rejects_with_capacity_code() {
    let (router, db) = app();
    let (creator, _) = seed_user(&db, "organizer");
    let (_alice, alice_token) = seed_user(&db, "alice");
    let (_bob, bob_token) = seed_user(&db, "bob");
    let event = seed_open_event(&db, 1, &creator);
    let uri = format!("/api/v1/events/{}/rsvp", event.event_id);

    let (status, _) = send(&router, Method::POST, &uri, Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&router, Method::POST, &uri, Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "capacity_full");
}

#[tokio::test]
async fn rsvp_before_open_reports_remaining_seconds() {
    let (router, db) = app();
    let (creator, _) = seed_user(&db, "organizer");
    let (_alice, alice_token) = seed_user(&db, "alice");
    let now = Utc::now();
    let event = seed_event(
        &db,
        5,
        &creator,
        now + Duration::days(1),
        Some(now + Duration::seconds(30)),
    );
    let uri = format!("/api/v1/events/{}/rsvp", event.event_id);

    let (status, body) = send(&router, Method::POST, &uri, Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "rsvp_not_open");
    let remaining = body["secondsRemaining"].as_i64().unwrap();
    assert!((1..=30).contains(&remaining), "remaining: {remaining}");
}

#[tokio::test]
async fn past_event_rejects_even_with_free_seats() {
    let (router, db) = app();
    let (creator, _) = seed_user(&db, "organizer");
    let (_alice, alice_token) = seed_user(&db, "alice");
    let now = Utc::now();
    let event = seed_event(
        &db,
        5,
        &creator,
        now - Duration::hours(1),
        Some(now - Duration::hours(2)),
    );
    let uri = format!("/api/v1/events/{}/rsvp", event.event_id);

    let (status, body) = send(&router, Method::POST, &uri, Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "event_in_past");
}

#[tokio::test]
async fn unknown_event_returns_not_found() {
    let (router, db) = app();
    let (_alice, alice_token) = seed_user(&db, "alice");
    let uri = format!("/api/v1/events/{}/rsvp", uuid::Uuid::new_v4());

    let (status, body) = send(&router, Method::POST, &uri, Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn rsvp_without_token_is_unauthorized() {
    let (router, db) = app();
    let (creator, _) = seed_user(&db, "organizer");
    let event = seed_open_event(&db, 2, &creator);
    let uri = format!("/api/v1/events/{}/rsvp", event.event_id);

    let (status, _) = send(&router, Method::POST, &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_event_id_is_rejected_without_touching_the_store() {
    let (router, db) = app();
    let (_alice, alice_token) = seed_user(&db, "alice");

    let (status, _) = send(
        &router,
        Method::POST,
        "/api/v1/events/not-a-uuid/rsvp",
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_login_me_and_rsvp_flow() {
    let (router, db) = app();
    let (creator, _) = seed_user(&db, "organizer");
    let event = seed_open_event(&db, 2, &creator);

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/v1/users",
        None,
        Some(json!({
            "userName": "carol",
            "email": "carol@example.com",
            "password": "secret",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["userName"], "carol");

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({
            "email": "carol@example.com",
            "password": "secret",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["accessToken"].as_str().unwrap().to_string();

    let (status, body) = send(&router, Method::GET, "/api/v1/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userName"], "carol");

    let uri = format!("/api/v1/events/{}/rsvp", event.event_id);
    let (status, body) = send(&router, Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["attendeesCount"], 1);

    // ログアウト後はトークンが失効する
    let (status, _) = send(
        &router,
        Method::POST,
        "/api/v1/auth/logout",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&router, Method::GET, "/api/v1/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn created_event_is_not_open_until_the_delay_elapses() {
    let (router, db) = app();
    let (_creator, creator_token) = seed_user(&db, "organizer");

    let starts_at = Utc::now() + Duration::days(3);
    let (status, body) = send(
        &router,
        Method::POST,
        "/api/v1/events",
        Some(&creator_token),
        Some(json!({
            "title": "Monthly Rust Meetup",
            "description": "talks and pizza",
            "location": "Nagoya",
            "capacity": 3,
            "startsAt": starts_at.to_rfc3339(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["attendeesCount"], 0);
    let event_id = body["eventId"].as_str().unwrap().to_string();

    // 作成直後の RSVP は受付開始前として拒否される
    let uri = format!("/api/v1/events/{event_id}/rsvp");
    let (status, body) = send(&router, Method::POST, &uri, Some(&creator_token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "rsvp_not_open");
    assert!(body["secondsRemaining"].as_i64().unwrap() <= 60);
}

#[tokio::test]
async fn listings_cover_search_attending_and_created() {
    let (router, db) = app();
    let (creator, creator_token) = seed_user(&db, "organizer");
    let (_alice, alice_token) = seed_user(&db, "alice");
    let event = seed_open_event(&db, 2, &creator);

    // 公開の一覧と検索
    let (status, body) = send(&router, Method::GET, "/api/v1/events", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["attendeesCount"], 0);

    let (status, body) = send(
        &router,
        Method::GET,
        "/api/v1/events?search=lightning",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        &router,
        Method::GET,
        "/api/v1/events?search=no-such-event",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 0);

    // 単体取得
    let (status, body) = send(
        &router,
        Method::GET,
        &format!("/api/v1/events/{}", event.event_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Rust LT Night");

    // 参加予定の一覧
    let uri = format!("/api/v1/events/{}/rsvp", event.event_id);
    send(&router, Method::POST, &uri, Some(&alice_token), None).await;
    let (status, body) = send(
        &router,
        Method::GET,
        "/api/v1/rsvps/user",
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["attendeesCount"], 1);

    // 作成したイベントの一覧
    let (status, body) = send(
        &router,
        Method::GET,
        "/api/v1/rsvps/user/created",
        Some(&creator_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        &router,
        Method::GET,
        "/api/v1/rsvps/user",
        Some(&creator_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn health_endpoints_respond_ok() {
    let (router, _db) = app();

    let (status, _) = send(&router, Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&router, Method::GET, "/api/v1/health/db", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
