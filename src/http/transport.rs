use std::collections::BTreeMap;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::AppError;
use crate::http::builder::build_request;
use crate::state::request_state::HttpMethod;
use crate::state::response_state::{ExecutionResult, HeaderMap};
use crate::util::json::try_parse_json;
use crate::util::key_value::materialize;

/// A fully materialized call: the only thing a transport sees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectRequest {
    pub method: HttpMethod,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl DirectRequest {
    /// Build from editor text fields. Headers and parameters that reduce to
    /// nothing are omitted, as is an empty body.
    pub fn from_fields(
        method: HttpMethod,
        url: &str,
        body: Option<&str>,
        headers: Option<&str>,
        parameters: Option<&str>,
    ) -> Self {
        Self {
            method,
            url: url.to_string(),
            headers: materialize(headers),
            parameters: materialize(parameters),
            body: body.filter(|b| !b.is_empty()).map(str::to_string),
        }
    }
}

/// Issues HTTP calls.
///
/// A non-2xx status is a normal result. Only connection-level failures
/// (refused, DNS, TLS, timeout) and unbuildable requests are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_request(&self, request: DirectRequest) -> Result<ExecutionResult, AppError>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send_request(&self, request: DirectRequest) -> Result<ExecutionResult, AppError> {
        let start = Instant::now();
        debug!(method = %request.method, url = %request.url, "sending request");

        let builder = build_request(&self.client, &request)?;
        let response = builder.send().await.map_err(transport_error)?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or("").to_string();
        let headers = collect_headers(response.headers());
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(is_json_content_type);

        let bytes = response.bytes().await.map_err(transport_error)?;
        let duration = start.elapsed().as_millis() as u64;
        let size = bytes.len() as u64;

        let text = String::from_utf8_lossy(&bytes).into_owned();
        let data = if is_json && !text.is_empty() {
            let fallback = Value::String(text.clone());
            try_parse_json(&text, fallback)
        } else {
            Value::String(text)
        };

        info!(status = status.as_u16(), duration_ms = duration, size, "response received");

        Ok(ExecutionResult {
            status: Some(status.as_u16()),
            status_text: Some(status_text),
            headers: Some(headers),
            data,
            duration: Some(duration),
            size: Some(size),
        })
    }
}

fn transport_error(e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        AppError::Timeout
    } else {
        AppError::Http(e)
    }
}

/// `application/json` and structured `+json` types such as
/// `application/problem+json`.
fn is_json_content_type(content_type: &str) -> bool {
    content_type
        .parse::<mime::Mime>()
        .is_ok_and(|m| m.subtype() == mime::JSON || m.suffix() == Some(mime::JSON))
}

/// Flatten to one value per name; repeated headers are joined with `", "`.
fn collect_headers(raw: &reqwest::header::HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in raw {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        headers
            .entry(name.to_string())
            .and_modify(|existing: &mut String| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    headers
}
