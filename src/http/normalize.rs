use chrono::Utc;
use serde_json::Value;

use crate::http::headers::filter_allowed;
use crate::state::response_state::{ExecutionResult, RequestRun, ResponseData};
use crate::util::json::to_pretty_json;

/// Run id used for playground executions, which have no persisted run.
pub const DIRECT_REQUEST_ID: &str = "direct-request";

/// Shape a raw transport result into the viewer's `ResponseData`.
///
/// Missing status reads as `0`, missing status text as `"OK"`, missing
/// duration as `0`. A string payload is passed through untouched; any other
/// payload is rendered as indented JSON.
pub fn normalize(raw: ExecutionResult) -> ResponseData {
    let status = raw.status.unwrap_or(0);
    let status_text = raw.status_text.clone().unwrap_or_else(|| "OK".to_string());
    let headers = filter_allowed(raw.headers.clone().unwrap_or_default());
    let body = match &raw.data {
        Value::String(s) => s.clone(),
        other => to_pretty_json(other),
    };
    let duration_ms = raw.duration.unwrap_or(0);

    ResponseData {
        success: true,
        request_run: RequestRun {
            id: DIRECT_REQUEST_ID.to_string(),
            request_id: Some(DIRECT_REQUEST_ID.to_string()),
            status: Some(status),
            status_text: Some(status_text),
            headers: Some(headers),
            body: Some(Value::String(body)),
            duration_ms: Some(duration_ms),
            created_at: Utc::now(),
        },
        result: Some(raw),
    }
}
