//! Shared test utilities

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use concierge_gateway::{ApiState, Config, api};
use secrecy::SecretString;
use tokio::net::TcpListener;
use tower::ServiceExt;

/// Serve `app` on an ephemeral local port and return its base URL
pub async fn spawn_stub(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind stub");
    let addr = listener.local_addr().expect("stub has no address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server failed");
    });

    format!("http://{addr}")
}

/// Configuration with every vendor pointed at a closed local port
pub fn test_config() -> Config {
    let unreachable = "http://127.0.0.1:9".to_string();

    let mut config = Config::default();
    config.weather.base_url.clone_from(&unreachable);
    config.wikipedia.base_url.clone_from(&unreachable);
    config.news.base_url.clone_from(&unreachable);
    config.chat.url = format!("{unreachable}/query");
    config.chat.keycloak_url.clone_from(&unreachable);
    config.elevenlabs.base_url.clone_from(&unreachable);
    config.azure_speech.endpoint = Some(unreachable);
    config
}

pub fn secret(value: &str) -> Option<SecretString> {
    Some(SecretString::from(value.to_string()))
}

/// Build the API router over `config`
pub fn build_router(config: Config) -> Router {
    let state = ApiState::new(config).expect("failed to build api state");
    api::router(Arc::new(state))
}

/// Send a GET and decode the JSON body
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

/// Send a JSON POST and decode the JSON body
pub async fn post_json(
    app: &Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// Send a POST with an arbitrary body and optional content type
pub async fn post_raw(
    app: &Router,
    uri: &str,
    content_type: Option<&str>,
    body: &str,
) -> (StatusCode, serde_json::Value) {
    let mut request = Request::builder().method("POST").uri(uri);
    if let Some(content_type) = content_type {
        request = request.header(header::CONTENT_TYPE, content_type);
    }
    let request = request.body(Body::from(body.to_string())).unwrap();
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}
