use std::collections::BTreeMap;

use serde_json::Value;

use crate::state::request_state::KeyValueEntry;
use crate::util::json::try_parse_json;

/// Parse the free-text headers/parameters editor field into entries.
///
/// Absent input, malformed JSON and JSON that is not an array all yield an
/// empty list. Array elements that are not entry-shaped objects are skipped.
pub fn extract_entries(input: Option<&str>) -> Vec<KeyValueEntry> {
    let Some(text) = input else {
        return Vec::new();
    };
    try_parse_json::<Vec<Value>>(text, Vec::new())
        .into_iter()
        .filter_map(|item| serde_json::from_value::<KeyValueEntry>(item).ok())
        .collect()
}

/// Reduce entries to the mapping sent over the wire. Disabled entries and
/// entries with an empty key or value are dropped; the last duplicate wins.
pub fn to_mapping(entries: &[KeyValueEntry]) -> BTreeMap<String, String> {
    entries
        .iter()
        .filter(|e| e.enabled && !e.key.is_empty() && !e.value.is_empty())
        .map(|e| (e.key.clone(), e.value.clone()))
        .collect()
}

/// `extract_entries` then `to_mapping`, with an empty mapping reported as `None`
/// so the transport never sees `{}`.
pub fn materialize(input: Option<&str>) -> Option<BTreeMap<String, String>> {
    let mapping = to_mapping(&extract_entries(input));
    if mapping.is_empty() { None } else { Some(mapping) }
}
