//! HTTP contract tests
//!
//! Drive the router end to end against the in-memory store.

use std::collections::HashSet;
use std::sync::Arc;

use album_service::api::{create_router, AppState};
use album_service::storage::AlbumStore;
use album_service::types::{Album, AlbumId, NewAlbum};
use album_service::{Error, Result};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt; // for oneshot

/// Store whose every call fails, standing in for an unreachable database
struct BrokenStore;

#[async_trait]
impl AlbumStore for BrokenStore {
    async fn get_album(&self, _id: &str) -> Result<Option<Album>> {
        Err(Error::internal("connection refused"))
    }

    async fn create_album(&self, _album: &NewAlbum) -> Result<AlbumId> {
        Err(Error::internal("connection refused"))
    }
}

fn app() -> Router {
    create_router(AppState::in_memory())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn create(app: &Router, body: Value) -> AlbumId {
    let (status, bytes) = send(app, post_json("/albums", &body.to_string())).await;
    assert_eq!(status, StatusCode::CREATED, "body: {}", String::from_utf8_lossy(&bytes));
    let created: Value = serde_json::from_slice(&bytes).unwrap();
    created["id"].as_i64().expect("id should be numeric")
}

#[tokio::test]
async fn health_check_returns_empty_ok() {
    let app = app();

    for uri in ["/", "/health"] {
        let (status, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
    }
}

#[tokio::test]
async fn health_check_does_not_touch_the_store() {
    let app = create_router(AppState::new(Arc::new(BrokenStore)));

    let (status, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn missing_album_is_404_with_empty_body() {
    let app = app();

    let (status, body) = send(&app, get("/albums/12345")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.is_empty());
}

#[tokio::test]
async fn created_album_can_be_fetched() {
    let app = app();

    let id = create(
        &app,
        json!({ "title": "Blue Train", "artist": "John Coltrane", "price": 56.99 }),
    )
    .await;
    assert!(id > 0);

    let (status, body) = send(&app, get(&format!("/albums/{}", id))).await;
    assert_eq!(status, StatusCode::OK);

    let album: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(album["id"].as_i64(), Some(id));
    assert_eq!(album["title"], "Blue Train");
    assert_eq!(album["artist"], "John Coltrane");
    assert_eq!(album["price"].as_f64(), Some(56.99));
}

#[tokio::test]
async fn client_supplied_id_is_ignored() {
    let app = app();

    let first = create(
        &app,
        json!({ "id": "500", "title": "Jeru", "artist": "Gerry Mulligan", "price": 17.99 }),
    )
    .await;
    assert_ne!(first, 500);
}

#[tokio::test]
async fn non_numeric_price_is_400() {
    let app = app();

    let (status, body) = send(
        &app,
        post_json(
            "/albums",
            r#"{"title": "Jeru", "artist": "Gerry Mulligan", "price": "seventeen"}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_empty());
}

#[tokio::test]
async fn missing_field_is_400() {
    let app = app();

    let (status, body) = send(
        &app,
        post_json("/albums", r#"{"title": "Jeru", "price": 17.99}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_empty());
}

#[tokio::test]
async fn malformed_json_is_400() {
    let app = app();

    let (status, body) = send(&app, post_json("/albums", r#"{"title": "Jeru","#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_empty());
}

#[tokio::test]
async fn body_without_content_type_is_still_created() {
    let app = app();
    let body = r#"{"title": "Jeru", "artist": "Gerry Mulligan", "price": 17.99}"#;

    let bare = Request::builder()
        .method("POST")
        .uri("/albums")
        .body(Body::from(body))
        .unwrap();
    let (status, _) = send(&app, bare).await;
    assert_eq!(status, StatusCode::CREATED);

    let text_plain = Request::builder()
        .method("POST")
        .uri("/albums")
        .header("content-type", "text/plain")
        .body(Body::from(body))
        .unwrap();
    let (status, _) = send(&app, text_plain).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn price_is_stored_at_column_scale() {
    let app = app();

    let id = create(
        &app,
        json!({ "title": "Jeru", "artist": "Gerry Mulligan", "price": 1.234 }),
    )
    .await;

    let (status, body) = send(&app, get(&format!("/albums/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    let album: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(album["price"].as_f64(), Some(1.23));
}

#[tokio::test]
async fn overlong_title_is_500() {
    let app = app();
    let body = json!({ "title": "x".repeat(129), "artist": "Gerry Mulligan", "price": 17.99 });

    let (status, body) = send(&app, post_json("/albums", &body.to_string())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());
}

#[tokio::test]
async fn non_numeric_id_is_500_not_404() {
    let app = app();

    let (status, body) = send(&app, get("/albums/abc")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());
}

#[tokio::test]
async fn store_failures_are_500_with_empty_body() {
    let app = create_router(AppState::new(Arc::new(BrokenStore)));

    let (status, body) = send(&app, get("/albums/1")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());

    let (status, body) = send(
        &app,
        post_json(
            "/albums",
            r#"{"title": "Jeru", "artist": "Gerry Mulligan", "price": 17.99}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());
}

#[tokio::test]
async fn concurrent_creates_get_distinct_ids() {
    let app = app();

    let requests = (0..32).map(|i| {
        let app = app.clone();
        async move {
            create(
                &app,
                json!({ "title": format!("Take {}", i), "artist": "Dave Brubeck", "price": 9.99 }),
            )
            .await
        }
    });

    let ids: Vec<AlbumId> = futures::future::join_all(requests).await;
    let unique: HashSet<AlbumId> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len());
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = app();

    let (status, _) = send(&app, get("/artists")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
