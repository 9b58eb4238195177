//! Helpers for list-valued slots.

use serde_json::Value;

/// Append `item` to a list slot, keeping only the newest `limit` entries.
///
/// A missing or non-array slot starts a fresh list.
pub fn push_bounded(current: Option<&Value>, item: Value, limit: usize) -> Value {
    let mut items = current
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    items.push(item);
    if items.len() > limit {
        let excess = items.len() - limit;
        items.drain(..excess);
    }
    Value::Array(items)
}

/// Find the `{key, result}` entry with a matching `key`.
pub fn find_entry_by_key<'a>(list: Option<&'a Value>, key: &str) -> Option<&'a Value> {
    list.and_then(Value::as_array)?
        .iter()
        .find(|entry| entry.get("key").and_then(Value::as_str) == Some(key))
}

/// Find a registry record whose `id` equals `id`.
pub fn find_entry_by_id(list: Option<&Value>, id: u64) -> Option<&Value> {
    list.and_then(Value::as_array)?
        .iter()
        .find(|entry| entry.get("id").and_then(Value::as_u64) == Some(id))
}

/// Drop items installed at `pkg_dir` from a list slot.
///
/// Returns `None` when nothing matched so the slot is left as is.
pub fn remove_by_pkg_dir(list: &Value, pkg_dir: &str) -> Option<Value> {
    let items = list.as_array()?;
    let kept: Vec<Value> = items
        .iter()
        .filter(|item| item.get("__pkg_dir").and_then(Value::as_str) != Some(pkg_dir))
        .cloned()
        .collect();
    (kept.len() != items.len()).then_some(Value::Array(kept))
}
