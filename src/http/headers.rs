use crate::state::response_state::{HeaderMap, ResponseData};

/// Response headers shown in the viewer. Everything else is dropped.
pub const ALLOWED_RESPONSE_HEADERS: [&str; 6] = [
    "date",
    "content-type",
    "server",
    "cache-control",
    "etag",
    "x-powered-by",
];

/// Case-insensitive allow-list match; the stored key is never rewritten.
pub fn is_allowed(name: &str) -> bool {
    ALLOWED_RESPONSE_HEADERS
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(name))
}

pub fn filter_allowed(headers: HeaderMap) -> HeaderMap {
    headers.into_iter().filter(|(name, _)| is_allowed(name)).collect()
}

/// Apply the allow-list to a response produced elsewhere so both execution
/// paths render the same header set.
pub fn filter_response_data(mut data: ResponseData) -> ResponseData {
    if let Some(headers) = data.request_run.headers.take() {
        data.request_run.headers = Some(filter_allowed(headers));
    }
    data
}
