use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;

use crate::error::AppError;
use crate::state::response_state::ResponseData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Redirect,
    ClientError,
    ServerError,
    Unknown,
}

impl StatusClass {
    pub fn of(status: Option<u16>) -> Self {
        match status.unwrap_or(0) {
            200..=299 => StatusClass::Success,
            300..=399 => StatusClass::Redirect,
            400..=499 => StatusClass::ClientError,
            500.. => StatusClass::ServerError,
            _ => StatusClass::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusClass::Success => "success",
            StatusClass::Redirect => "redirect",
            StatusClass::ClientError => "client error",
            StatusClass::ServerError => "server error",
            StatusClass::Unknown => "unknown",
        }
    }
}

/// Header line of the response viewer. Values reported by the transport
/// (`result`) take precedence over the run record.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSummary {
    pub status: Option<u16>,
    pub status_text: Option<String>,
    pub duration_ms: Option<u64>,
    pub size: Option<u64>,
}

impl From<&ResponseData> for ResponseSummary {
    fn from(data: &ResponseData) -> Self {
        let result = data.result.as_ref();
        let run = &data.request_run;
        Self {
            status: result.and_then(|r| r.status).or(run.status),
            status_text: result
                .and_then(|r| r.status_text.clone())
                .or_else(|| run.status_text.clone()),
            duration_ms: result.and_then(|r| r.duration).or(run.duration_ms),
            size: result.and_then(|r| r.size),
        }
    }
}

impl ResponseSummary {
    pub fn class(&self) -> StatusClass {
        StatusClass::of(self.status)
    }

    /// `200 OK  ·  87ms  ·  1.2 KB  ·  success`
    pub fn line(&self) -> String {
        let status = self.status.map(|s| s.to_string()).unwrap_or_else(|| "---".into());
        let text = self.status_text.as_deref().unwrap_or("");
        format!(
            "{} {}  ·  {}  ·  {}  ·  {}",
            status,
            text,
            format_duration(self.duration_ms.unwrap_or(0)),
            format_bytes(self.size.unwrap_or(0)),
            self.class().label(),
        )
    }
}

pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    humansize::format_size(bytes, humansize::WINDOWS)
}

pub fn format_duration(ms: u64) -> String {
    if ms == 0 {
        return "0ms".to_string();
    }
    humantime::format_duration(Duration::from_millis(ms)).to_string()
}

/// Save the response to a JSON file the way the viewer's "save" action does.
pub fn export_response(data: &ResponseData, path: &Path) -> Result<(), AppError> {
    let result = data.result.as_ref();
    let run = &data.request_run;
    let summary = ResponseSummary::from(data);
    let document = json!({
        "status": summary.status,
        "statusText": summary.status_text,
        "headers": result.and_then(|r| r.headers.as_ref()).or(run.headers.as_ref()),
        "body": result.map(|r| &r.data).or(run.body.as_ref()),
        "duration": summary.duration_ms,
        "timestamp": Utc::now().to_rfc3339(),
    });
    std::fs::write(path, serde_json::to_string_pretty(&document)?)?;
    Ok(())
}
