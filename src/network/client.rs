//! HTTP client wrapper - builds transport requests and executes them

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderName, HeaderValue};

use crate::error::{Error, Result};
use crate::models::{Request, Response};

/// Build a transport request from a fully resolved [`Request`].
///
/// Query parameters are appended, sorted by key, after any already in the
/// URL, so a key present in both is sent twice. Headers are set (last write wins per key) and the
/// auth preset is applied after them so it can override `Authorization`.
pub fn build_request(request: &Request) -> Result<reqwest::Request> {
    let mut url = reqwest::Url::parse(&request.url).map_err(|e| Error::InvalidUrl {
        url: request.url.clone(),
        reason: e.to_string(),
    })?;

    if !request.query_params.is_empty() {
        let mut params: Vec<_> = request.query_params.iter().collect();
        params.sort();
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key, value);
        }
    }

    let mut http_request = reqwest::Request::new(request.method.to_reqwest(), url);

    // Empty string means no body at all, not a zero-length one
    if !request.body.is_empty() {
        *http_request.body_mut() = Some(request.body.clone().into());
    }

    for (key, value) in &request.headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| Error::Validation(format!("invalid header name: {key}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| Error::Validation(format!("invalid value for header {key}")))?;
        http_request.headers_mut().insert(name, value);
    }

    if let Some(auth) = &request.auth {
        auth.apply(http_request.headers_mut())?;
    }

    if !request.timeout.is_zero() {
        *http_request.timeout_mut() = Some(request.timeout);
    }

    Ok(http_request)
}

/// Executes requests through a pooled client.
///
/// Holds no per-call state, so one executor can serve concurrent calls.
#[derive(Clone, Debug)]
pub struct Executor {
    client: reqwest::Client,
    timeout: Duration,
}

impl Executor {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Executor {
            client: create_client(timeout, None)?,
            timeout,
        })
    }

    /// Fails when the client cannot be built, e.g. for a user agent that is
    /// not a valid header value.
    pub fn with_user_agent(timeout: Duration, user_agent: &str) -> Result<Self> {
        Ok(Executor {
            client: create_client(timeout, Some(user_agent))?,
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute a request and read the full body into memory.
    pub async fn execute(&self, request: &Request) -> Result<Response> {
        let http_request = build_request(request)?;
        tracing::info!(method = %request.method, url = %http_request.url(), "Executing request");

        let start = Instant::now();
        let result = self.client.execute(http_request).await;
        let duration = start.elapsed();

        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(error = %e, elapsed_ms = duration.as_millis() as u64, "Request failed");
                return Err(Error::Transport(e));
            }
        };

        let status = resp.status();
        let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in resp.headers() {
            headers
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        let body = resp.bytes().await.map_err(Error::Transport)?.to_vec();
        let status_line = match status.canonical_reason() {
            Some(reason) => format!("{} {}", status.as_u16(), reason),
            None => status.as_u16().to_string(),
        };

        tracing::info!(
            status = status.as_u16(),
            size = body.len(),
            elapsed_ms = duration.as_millis() as u64,
            "Request completed"
        );

        Ok(Response {
            status_code: status.as_u16(),
            status: status_line,
            headers,
            size: body.len(),
            body,
            duration,
        })
    }
}

/// Create an HTTP client with the given timeout
fn create_client(timeout: Duration, user_agent: Option<&str>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if !timeout.is_zero() {
        builder = builder.timeout(timeout);
    }
    if let Some(user_agent) = user_agent {
        builder = builder.user_agent(user_agent);
    }
    builder
        .build()
        .map_err(|e| Error::Validation(format!("invalid HTTP client configuration: {e}")))
}
