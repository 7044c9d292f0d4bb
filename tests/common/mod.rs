//! Local HTTP server shared by the network tests

#![allow(dead_code)]

use std::time::Duration;

use axum::{
    extract::{Path, RawQuery},
    http::{header::SET_COOKIE, HeaderMap, Method, StatusCode},
    response::AppendHeaders,
    routing::{any, get},
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;

fn app() -> Router {
    Router::new()
        .route("/hello", get(|| async { Json(json!({ "message": "hi" })) }))
        .route("/echo", any(echo))
        .route("/users/{id}", any(user))
        .route("/empty", get(|| async { StatusCode::NO_CONTENT }))
        .route(
            "/cookies",
            get(|| async {
                (
                    AppendHeaders([(SET_COOKIE, "a=1"), (SET_COOKIE, "b=2")]),
                    "ok",
                )
            }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "late"
            }),
        )
}

fn header_map(headers: &HeaderMap) -> Map<String, Value> {
    headers
        .iter()
        .map(|(name, value)| {
            let value = value.to_str().unwrap_or_default().to_string();
            (name.as_str().to_string(), Value::String(value))
        })
        .collect()
}

async fn echo(
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: String,
) -> Json<Value> {
    Json(json!({
        "method": method.as_str(),
        "query": query,
        "headers": header_map(&headers),
        "body": body,
    }))
}

async fn user(Path(id): Path<String>, method: Method, body: String) -> Json<Value> {
    Json(json!({ "id": id, "method": method.as_str(), "body": body }))
}

/// Start the server on an ephemeral port and return its base URL.
pub async fn spawn_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app()).await.unwrap();
    });
    format!("http://{addr}")
}

/// A base URL nothing is listening on.
pub async fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
