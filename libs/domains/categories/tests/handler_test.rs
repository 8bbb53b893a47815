//! Handler tests for the categories domain: status codes and JSON shapes.
//!
//! Backed by the in-memory repository so they run without Docker.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_helpers::{ErrorResponse, MessageResponse};
use domain_categories::*;
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn app() -> (axum::Router, InMemoryCategoryRepository) {
    let repo = InMemoryCategoryRepository::new();
    let app = handlers::router(CategoryService::new(repo.clone()));
    (app, repo)
}

#[tokio::test]
async fn test_create_category_returns_201() {
    let (app, _) = app();

    let response = app
        .oneshot(post_json("/", json!({"name": "Food", "description": "Snacks"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let category: Category = json_body(response.into_body()).await;
    assert_eq!(category.name, "Food");
    assert_eq!(category.id, 1);
}

#[tokio::test]
async fn test_create_category_validates_name() {
    let (app, _) = app();

    let response = app.oneshot(post_json("/", json!({"name": ""}))).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(error.error, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_get_unknown_category_returns_404() {
    let (app, _) = app();

    let response = app
        .oneshot(Request::get("/77").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(error.message, "Category 77 not found");
}

#[tokio::test]
async fn test_non_numeric_id_returns_400() {
    let (app, _) = app();

    let response = app
        .oneshot(Request::get("/abc").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_category_replaces_fields() {
    let (app, repo) = app();
    let created = repo
        .create(CreateCategory {
            name: "Old".into(),
            description: "old".into(),
        })
        .await
        .unwrap();

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/{}", created.id))
        .header("content-type", "application/json")
        .body(Body::from(json!({"name": "New"}).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let category: Category = json_body(response.into_body()).await;
    assert_eq!(category.name, "New");
    assert_eq!(category.description, "");
}

#[tokio::test]
async fn test_delete_category_returns_message() {
    let (app, repo) = app();
    let created = repo
        .create(CreateCategory {
            name: "Temp".into(),
            description: String::new(),
        })
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::delete(format!("/{}", created.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: MessageResponse = json_body(response.into_body()).await;
    assert_eq!(body.message, "Category deleted successfully");

    let again = app
        .oneshot(
            Request::delete(format!("/{}", created.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}
