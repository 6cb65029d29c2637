//! JSON HTTP helper for talking to a running console.
//!
//! Wraps the synchronous `ureq` client. Every request carries a default
//! `Content-Type: application/json` header merged with caller headers; the
//! response body is read in full and parsed as JSON:
//!
//! - empty body → `null`
//! - unparsable body → `{"raw": "<body text>"}`
//! - non-2xx status → [`ApiError::Status`] with the parsed body attached

use std::time::Duration;

use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::config::ClientConfig;

/// Header merged into every request unless the caller overrides it.
pub const DEFAULT_CONTENT_TYPE: (&str, &str) = ("Content-Type", "application/json");

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("HTTP {status}")]
    Status { status: u16, payload: Value },
    /// The request never produced a response (connect failure, timeout).
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("failed to read response body: {0}")]
    Body(#[from] std::io::Error),
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ApiError {
    /// Parsed response body attached to a status error.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Status { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Request options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            headers: Vec::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    /// A `POST` carrying `body` serialized as JSON.
    pub fn post_json<T: Serialize>(body: &T) -> Result<Self, ApiError> {
        Ok(Self {
            method: "POST".to_string(),
            headers: Vec::new(),
            body: Some(serde_json::to_string(body)?),
        })
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Merge caller headers over the defaults. Names compare case-insensitively
/// and the caller's value wins.
pub fn merge_headers(
    defaults: &[(&str, &str)],
    caller: &[(String, String)],
) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = defaults
        .iter()
        .filter(|(name, _)| !caller.iter().any(|(c, _)| c.eq_ignore_ascii_case(name)))
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    merged.extend(caller.iter().cloned());
    merged
}

// ---------------------------------------------------------------------------
// Response interpretation
// ---------------------------------------------------------------------------

/// Parse a response body: empty → `null`, invalid JSON → `{"raw": text}`.
pub fn parse_body(text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "raw": text }))
}

/// Turn a status code and body text into the helper's result.
pub fn interpret_response(status: u16, text: &str) -> Result<Value, ApiError> {
    let payload = parse_body(text);
    if (200..300).contains(&status) {
        Ok(payload)
    } else {
        Err(ApiError::Status { status, payload })
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous JSON client bound to one console base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    agent: ureq::Agent,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    /// Build a client from the resolved config.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.base_url, Duration::from_millis(config.timeout_ms))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `path`. Absolute `http(s)://` paths pass through.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Perform a request and return the parsed JSON body.
    pub fn api_json(&self, path: &str, options: &RequestOptions) -> Result<Value, ApiError> {
        let url = self.url_for(path);

        let mut request = self.agent.request(&options.method, &url);
        for (name, value) in merge_headers(&[DEFAULT_CONTENT_TYPE], &options.headers) {
            request = request.set(&name, &value);
        }

        let result = match &options.body {
            Some(body) => request.send_string(body),
            None => request.call(),
        };

        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(transport)) => {
                return Err(ApiError::Transport {
                    url,
                    message: transport.to_string(),
                });
            }
        };

        let status = response.status();
        let text = response.into_string()?;
        interpret_response(status, &text)
    }

    /// `GET path`.
    pub fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.api_json(path, &RequestOptions::get())
    }

    /// `POST path` with a JSON body.
    pub fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Value, ApiError> {
        self.api_json(path, &RequestOptions::post_json(body)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
