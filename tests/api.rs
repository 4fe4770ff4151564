use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use pantrychef::{auth::Session, build_app, functions::ScriptedLlm, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn call(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(b) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

async fn register(app: &Router, email: &str) -> Session {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "email": email, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    serde_json::from_value(body).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let app = build_app(AppState::fake());
    let (status, body) = call(&app, Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".into()));
}

#[tokio::test]
async fn pantry_requires_auth_and_is_per_user() {
    let app = build_app(AppState::fake());
    let (status, body) = call(&app, Method::GET, "/api/v1/pantry", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let alice = register(&app, "alice@example.com").await;
    let bob = register(&app, "bob@example.com").await;

    let (status, item) = call(
        &app,
        Method::POST,
        "/api/v1/pantry",
        Some(&alice.access_token),
        Some(json!({ "name": "Eggs", "quantity": 12, "unit": "pcs", "expiry_date": "2030-01-15" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["unit"], "pcs");

    let (_, list) = call(&app, Method::GET, "/api/v1/pantry", Some(&alice.access_token), None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["quantity"], 12.0);
    assert_eq!(list[0]["expiry_date"], "2030-01-15");

    let uri = format!("/api/v1/pantry/{}", item["id"].as_str().unwrap());
    let (status, _) = call(&app, Method::DELETE, &uri, Some(&bob.access_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, Method::DELETE, &uri, Some(&alice.access_token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn unplanned_day_returns_empty_meals() {
    let app = build_app(AppState::fake());
    let user = register(&app, "planner@example.com").await;
    let (status, plan) = call(
        &app,
        Method::GET,
        "/api/v1/meal-plans/2024-03-10",
        Some(&user.access_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["meals"], json!([]));
    assert_eq!(plan["date"], "2024-03-10");
}

#[tokio::test]
async fn rating_twice_keeps_latest() {
    let app = build_app(AppState::fake());
    let user = register(&app, "rater@example.com").await;
    let (status, recipe) = call(
        &app,
        Method::POST,
        "/api/v1/recipes",
        Some(&user.access_token),
        Some(json!({ "title": "Shakshuka", "ingredients": [{ "name": "eggs", "quantity": 4 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = recipe["id"].as_str().unwrap();

    for value in [3, 5] {
        let (status, _) = call(
            &app,
            Method::PUT,
            &format!("/api/v1/recipes/{id}/rating"),
            Some(&user.access_token),
            Some(json!({ "rating": value })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, summary) = call(&app, Method::GET, &format!("/api/v1/recipes/{id}/ratings"), None, None).await;
    assert_eq!(summary["count"], 1);
    assert_eq!(summary["ratings"][0]["rating"], 5);
}

#[tokio::test]
async fn edge_functions_validate_before_calling_the_llm() {
    let llm = Arc::new(ScriptedLlm::new(["unused"]));
    let app = build_app(AppState::fake().with_llm(llm.clone()));

    let (status, body) = call(
        &app,
        Method::POST,
        "/functions/v1/recipe-generator",
        None,
        Some(json!({ "ingredients": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = call(&app, Method::POST, "/functions/v1/ai-chef", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn edge_functions_without_key_answer_500() {
    let app = build_app(AppState::fake());
    let (status, body) = call(
        &app,
        Method::POST,
        "/functions/v1/ai-chef-assistant",
        None,
        Some(json!({ "message": "What's for dinner?" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "OpenAI API key not configured");
}

#[tokio::test]
async fn recipe_generator_returns_parsed_recipe() {
    let llm = Arc::new(ScriptedLlm::new([
        r#"{"title": "Garlic Rice", "ingredients": [{"name": "rice"}, {"name": "garlic"}]}"#,
    ]));
    let app = build_app(AppState::fake().with_llm(llm));
    let (status, body) = call(
        &app,
        Method::POST,
        "/functions/v1/recipe-generator",
        None,
        Some(json!({ "ingredients": ["rice", "garlic"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recipe"]["title"], "Garlic Rice");
    assert!(body["timestamp"].is_string());
}
