mod common;

use std::time::Duration;

use gust::{AuthPreset, Error, Executor, HttpMethod, Request};
use serde_json::Value;

fn body_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn executes_get_and_reads_body() {
    let base = common::spawn_server().await;
    let executor = Executor::new(Duration::from_secs(5)).unwrap();

    let resp = executor
        .execute(&Request::new(HttpMethod::GET, format!("{base}/hello")))
        .await
        .unwrap();

    assert_eq!(resp.status_code, 200);
    assert_eq!(resp.status, "200 OK");
    assert_eq!(resp.header("Content-Type"), Some("application/json"));
    assert_eq!(resp.size, resp.body.len());
    assert_eq!(body_json(&resp.body)["message"], "hi");
}

#[tokio::test]
async fn sends_headers_query_body_and_auth() {
    let base = common::spawn_server().await;
    let executor = Executor::with_user_agent(Duration::from_secs(5), "gust-test/1.0").unwrap();

    let mut request = Request::new(HttpMethod::POST, format!("{base}/echo?a=1"));
    request.headers.insert("X-Custom".into(), "value".into());
    request
        .headers
        .insert("Authorization".into(), "Token manual".into());
    request.query_params.insert("limit".into(), "10".into());
    request.body = r#"{"name":"John"}"#.into();
    request.auth = Some(AuthPreset::bearer("api", "xyz").unwrap());

    let resp = executor.execute(&request).await.unwrap();
    let echo = body_json(&resp.body);

    assert_eq!(echo["method"], "POST");
    assert_eq!(echo["query"], "a=1&limit=10");
    assert_eq!(echo["headers"]["x-custom"], "value");
    assert_eq!(echo["headers"]["authorization"], "Bearer xyz");
    assert_eq!(echo["headers"]["user-agent"], "gust-test/1.0");
    assert_eq!(echo["body"], r#"{"name":"John"}"#);
}

#[tokio::test]
async fn empty_body_is_not_sent() {
    let base = common::spawn_server().await;
    let executor = Executor::new(Duration::from_secs(5)).unwrap();

    let resp = executor
        .execute(&Request::new(HttpMethod::PUT, format!("{base}/echo")))
        .await
        .unwrap();
    let echo = body_json(&resp.body);

    assert_eq!(echo["body"], "");
    assert!(echo["headers"].get("content-type").is_none());
}

#[tokio::test]
async fn no_content_has_zero_size() {
    let base = common::spawn_server().await;
    let executor = Executor::new(Duration::from_secs(5)).unwrap();

    let resp = executor
        .execute(&Request::new(HttpMethod::GET, format!("{base}/empty")))
        .await
        .unwrap();

    assert_eq!(resp.status_code, 204);
    assert_eq!(resp.size, 0);
    assert!(resp.body.is_empty());
    assert!(resp.duration > Duration::ZERO);
}

#[tokio::test]
async fn repeated_headers_keep_every_value() {
    let base = common::spawn_server().await;
    let executor = Executor::new(Duration::from_secs(5)).unwrap();

    let resp = executor
        .execute(&Request::new(HttpMethod::GET, format!("{base}/cookies")))
        .await
        .unwrap();

    assert_eq!(resp.headers["set-cookie"], vec!["a=1", "b=2"]);
}

#[tokio::test]
async fn timeout_is_transport_error() {
    let base = common::spawn_server().await;
    let executor = Executor::new(Duration::from_millis(200)).unwrap();

    let mut request = Request::new(HttpMethod::GET, format!("{base}/slow"));
    request.timeout = Duration::from_millis(200);

    match executor.execute(&request).await {
        Err(Error::Transport(e)) => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    let base = common::closed_port().await;
    let executor = Executor::new(Duration::from_secs(5)).unwrap();

    let err = executor
        .execute(&Request::new(HttpMethod::GET, format!("{base}/hello")))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn invalid_url_fails_before_sending() {
    let executor = Executor::new(Duration::from_secs(5)).unwrap();
    let err = executor
        .execute(&Request::new(HttpMethod::GET, "not a url"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidUrl { .. }));
}

#[tokio::test]
async fn executor_serves_concurrent_requests() {
    let base = common::spawn_server().await;
    let executor = Executor::new(Duration::from_secs(5)).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let executor = executor.clone();
            let url = format!("{base}/users/{i}");
            tokio::spawn(async move {
                executor
                    .execute(&Request::new(HttpMethod::GET, url))
                    .await
                    .map(|resp| body_json(&resp.body)["id"].clone())
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let id = handle.await.unwrap().unwrap();
        assert_eq!(id, Value::String(i.to_string()));
    }
}
