use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::auth::AuthPreset;
use crate::constants::DEFAULT_TIMEOUT;
use crate::error::Error;

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
    TRACE,
    CONNECT,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
            HttpMethod::TRACE => "TRACE",
            HttpMethod::CONNECT => "CONNECT",
        }
    }

    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::GET => reqwest::Method::GET,
            HttpMethod::POST => reqwest::Method::POST,
            HttpMethod::PUT => reqwest::Method::PUT,
            HttpMethod::DELETE => reqwest::Method::DELETE,
            HttpMethod::PATCH => reqwest::Method::PATCH,
            HttpMethod::HEAD => reqwest::Method::HEAD,
            HttpMethod::OPTIONS => reqwest::Method::OPTIONS,
            HttpMethod::TRACE => reqwest::Method::TRACE,
            HttpMethod::CONNECT => reqwest::Method::CONNECT,
        }
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    /// Case-insensitive: `get`, `Get` and `GET` are all accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::GET),
            "POST" => Ok(HttpMethod::POST),
            "PUT" => Ok(HttpMethod::PUT),
            "DELETE" => Ok(HttpMethod::DELETE),
            "PATCH" => Ok(HttpMethod::PATCH),
            "HEAD" => Ok(HttpMethod::HEAD),
            "OPTIONS" => Ok(HttpMethod::OPTIONS),
            "TRACE" => Ok(HttpMethod::TRACE),
            "CONNECT" => Ok(HttpMethod::CONNECT),
            other => Err(Error::Validation(format!("invalid HTTP method: {other}"))),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single HTTP request, fully described as data.
///
/// The URL may still contain `{name}` / `${NAME}` placeholders until the
/// template resolver has run. An empty `body` means no body is sent.
#[derive(Clone, Debug)]
pub struct Request {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
    pub body: String,
    pub timeout: Duration,
    pub auth: Option<AuthPreset>,
}

impl Request {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Request {
            method,
            url: url.into(),
            headers: HashMap::new(),
            query_params: HashMap::new(),
            body: String::new(),
            timeout: DEFAULT_TIMEOUT,
            auth: None,
        }
    }
}

/// Response from HTTP request
#[derive(Clone, Debug)]
pub struct Response {
    pub status_code: u16,
    /// Status line, e.g. `200 OK`
    pub status: String,
    /// Lowercased header names; repeated headers keep every value in order.
    pub headers: BTreeMap<String, Vec<String>>,
    pub body: Vec<u8>,
    pub duration: Duration,
    /// Always `body.len()`, never taken from `Content-Length`.
    pub size: usize,
}

impl Response {
    /// First value of a header, looked up case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }
}

/// A named request persisted for later replay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCall {
    pub name: String,
    pub method: HttpMethod,
    pub url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub query_params: HashMap<String, String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub description: String,
    /// RFC3339, set once here and never regenerated on save.
    pub created_at: String,
}

impl SavedCall {
    pub fn new(
        name: impl Into<String>,
        method: HttpMethod,
        url: impl Into<String>,
        headers: HashMap<String, String>,
        query_params: HashMap<String, String>,
        body: impl Into<String>,
    ) -> Self {
        SavedCall {
            name: name.into(),
            method,
            url: url.into(),
            headers,
            query_params,
            body: body.into(),
            description: String::new(),
            created_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
