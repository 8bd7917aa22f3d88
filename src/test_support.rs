//! Helpers for driving the router in tests.

use axum::{
    body::Body,
    extract::FromRef,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::app::build_app;
use crate::auth::jwt::JwtKeys;
use crate::auth::repo_types::{NewUser, User};
use crate::state::AppState;

pub fn test_app() -> (AppState, Router) {
    let state = AppState::fake();
    let app = build_app(state.clone());
    (state, app)
}

/// Send one request; the body comes back as JSON, or as a JSON string when
/// it is not JSON, or `null` when empty.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(v) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string())),
        None => req.body(Body::empty()),
    }
    .unwrap();

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

/// Insert a user directly (skipping argon2) and mint an access token.
pub async fn user_with_token(state: &AppState, email: &str, name: &str) -> (User, String) {
    let user = User::create(
        &state.db,
        NewUser {
            id: None,
            email: email.into(),
            password_hash: "unused".into(),
            display_name: name.into(),
        },
    )
    .await;
    let token = JwtKeys::from_ref(state).sign_access(user.id).unwrap();
    (user, token)
}

pub fn recipe_body(title: &str) -> Value {
    json!({
        "title": title,
        "ingredients": [{"quantity": "1 slice", "item": "bread"}],
        "instructions": "Toast the bread until golden.",
        "cookingTime": 5,
        "servings": 1,
        "tags": ["breakfast"]
    })
}
