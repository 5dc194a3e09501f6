use serde_json::Value;

use crate::util::json::{to_pretty_json, try_parse_json};

/// Text shown in the body pane.
///
/// Strings holding JSON are re-indented, other strings are shown verbatim,
/// structured values are indented, and a missing or null body shows as `{}`.
/// An empty string is shown quoted, as `""`.
pub fn format_body(body: Option<&Value>) -> String {
    match body {
        None | Some(Value::Null) => to_pretty_json(&Value::Object(Default::default())),
        Some(Value::String(raw)) if raw.is_empty() => to_pretty_json(&Value::String(String::new())),
        Some(Value::String(raw)) => match try_parse_json::<Option<Value>>(raw, None) {
            Some(parsed) => to_pretty_json(&parsed),
            None => raw.clone(),
        },
        Some(other) => to_pretty_json(other),
    }
}
