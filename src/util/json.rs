use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Marker written in place of a value that cannot be rendered as JSON text.
pub const UNSERIALIZABLE: &str = "[unserializable]";

/// Parse `input` as JSON into `T`, returning `fallback` on any failure.
/// Never fails: malformed editor text degrades to the fallback.
pub fn try_parse_json<T: DeserializeOwned>(input: &str, fallback: T) -> T {
    match serde_json::from_str::<T>(input) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "falling back on unparseable JSON");
            fallback
        }
    }
}

/// Pretty-print with two-space indentation.
pub fn to_pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| UNSERIALIZABLE.to_string())
}
