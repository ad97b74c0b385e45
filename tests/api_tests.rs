//! API integration tests
//!
//! Drive the full router against the in-memory store, without a live
//! server or SMTP relay.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

use libris_server::{
    config::AppConfig,
    error::AppResult,
    services::{email::Notifier, Services},
    store::Store,
    AppState,
};

/// Discards every message; delivery is covered by the scanner unit tests.
struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn send(&self, _from: &str, _to: &str, _subject: &str, _body: &str) -> AppResult<()> {
        Ok(())
    }
}

fn app() -> Router {
    let config = AppConfig {
        server: Default::default(),
        logging: Default::default(),
        email: Default::default(),
        reminder: Default::default(),
    };
    let services = Services::new(Store::in_memory(), Arc::new(NullNotifier), &config);
    libris_server::api::create_router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    })
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&value).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

async fn create_book(app: &Router, title: &str, author: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/book",
        Some(json!({"title": title, "author": author})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body
}

async fn create_user(app: &Router, name: &str, email: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/user",
        Some(json!({"name": name, "email": email})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body
}

async fn borrow(app: &Router, user_id: &str, book_id: &str) -> (StatusCode, Value) {
    let now = chrono::Utc::now();
    send(
        app,
        Method::POST,
        "/api/borrowing/borrow",
        Some(json!({
            "userId": user_id,
            "bookId": book_id,
            "borrowDate": now,
            "returnDate": now + chrono::Duration::days(30),
        })),
    )
    .await
}

#[tokio::test]
async fn health_check() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn borrow_and_return_round_trip() {
    let app = app();

    let book = create_book(&app, "T", "A").await;
    let user = create_user(&app, "Name", "email@domain.com").await;
    let book_id = book["id"].as_str().unwrap().to_string();
    let user_id = user["id"].as_str().unwrap().to_string();

    assert_eq!(book["borrowed"], false);

    // Borrow
    let (status, borrowing) = borrow(&app, &user_id, &book_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(borrowing["bookId"], book_id.as_str());
    assert_eq!(borrowing["userId"], user_id.as_str());
    let borrowing_id = borrowing["id"].as_str().unwrap().to_string();

    let (status, fetched) = send(&app, Method::GET, &format!("/api/book/{}", book_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["borrowed"], true);

    // Return
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/borrowing/return/{}", borrowing_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, fetched) = send(&app, Method::GET, &format!("/api/book/{}", book_id), None).await;
    assert_eq!(fetched["borrowed"], false);

    // Return is not idempotent
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/borrowing/return/{}", borrowing_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn borrow_rejects_bad_requests() {
    let app = app();
    let now = chrono::Utc::now();
    let later = now + chrono::Duration::days(1);
    let nil = "00000000-0000-0000-0000-000000000000";
    let unknown = uuid::Uuid::new_v4().to_string();

    let cases = [
        (nil, nil, now, now, "userId"),
        (nil, unknown.as_str(), now, later, "userId"),
        (unknown.as_str(), nil, now, later, "bookId"),
        // Date order is checked before existence
        (unknown.as_str(), unknown.as_str(), later, now, "returnDate"),
        (unknown.as_str(), unknown.as_str(), now, now, "returnDate"),
        // Well-formed but referencing nothing
        (unknown.as_str(), unknown.as_str(), now, later, "bookId"),
    ];

    for (user_id, book_id, borrow_date, return_date, field) in cases {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/borrowing/borrow",
            Some(json!({
                "userId": user_id,
                "bookId": book_id,
                "borrowDate": borrow_date,
                "returnDate": return_date,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "field: {}", field);
        assert_eq!(body["field"], field);
    }
}

#[tokio::test]
async fn second_borrow_of_same_book_is_rejected() {
    let app = app();

    let book = create_book(&app, "T", "A").await;
    let user = create_user(&app, "Name", "email@domain.com").await;
    let book_id = book["id"].as_str().unwrap().to_string();
    let user_id = user["id"].as_str().unwrap().to_string();

    let (status, _) = borrow(&app, &user_id, &book_id).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = borrow(&app, &user_id, &book_id).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "bookId");
    assert!(body["message"].as_str().unwrap().contains("already borrowed"));
}

#[tokio::test]
async fn create_book_requires_title_and_author() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/book",
        Some(json!({"title": "", "author": "A"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "title");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/book",
        Some(json!({"title": "T", "author": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "author");
}

#[tokio::test]
async fn book_lookup_error_contract() {
    let app = app();

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/book/{}", uuid::Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/book/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "id");
}

#[tokio::test]
async fn book_update_cannot_set_borrowed() {
    let app = app();

    let book = create_book(&app, "T", "A").await;
    let user = create_user(&app, "Name", "email@domain.com").await;
    let book_id = book["id"].as_str().unwrap().to_string();
    let user_id = user["id"].as_str().unwrap().to_string();

    let (status, _) = borrow(&app, &user_id, &book_id).await;
    assert_eq!(status, StatusCode::OK);

    // A direct edit trying to smuggle the flag back to false is ignored
    let (status, updated) = send(
        &app,
        Method::PUT,
        "/api/book",
        Some(json!({
            "id": book_id,
            "title": "T2",
            "author": "A2",
            "borrowed": false,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "T2");
    assert_eq!(updated["borrowed"], true);
}

#[tokio::test]
async fn return_after_book_deletion_is_a_conflict() {
    let app = app();

    let book = create_book(&app, "T", "A").await;
    let user = create_user(&app, "Name", "email@domain.com").await;
    let book_id = book["id"].as_str().unwrap().to_string();
    let user_id = user["id"].as_str().unwrap().to_string();

    let (_, borrowing) = borrow(&app, &user_id, &book_id).await;
    let borrowing_id = borrowing["id"].as_str().unwrap().to_string();

    // Deleting a borrowed book is allowed
    let (status, _) = send(&app, Method::DELETE, &format!("/api/book/{}", book_id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/borrowing/return/{}", borrowing_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn user_crud_round_trip() {
    let app = app();

    let user = create_user(&app, "Name", "email@domain.com").await;
    let user_id = user["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        Method::PUT,
        "/api/user",
        Some(json!({
            "id": user_id,
            "name": "Renamed",
            "email": "renamed@domain.com",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Renamed");

    let (status, _) = send(&app, Method::DELETE, &format!("/api/user/{}", user_id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, &format!("/api/user/{}", user_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_user_requires_valid_email() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/user",
        Some(json!({"name": "Name", "email": "not-an-email"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "email");
}
