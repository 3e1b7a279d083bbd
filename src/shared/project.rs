//! Project Records
//!
//! Projects travel through the sync core as opaque JSON objects. The core only
//! relies on three facts about them: the `id` field, the `name` field and the
//! transient `pendingSync` marker. This module holds the helpers built on those
//! facts.

use serde_json::{Map, Value};

/// Field set on cache records that reflect a queued, unconfirmed save
pub const PENDING_SYNC_FIELD: &str = "pendingSync";

/// Field set on the synthetic result of a queued save
pub const QUEUED_FIELD: &str = "queued";

/// Identity of a project record inside the cache.
///
/// The `id` value wins when present and non-null, otherwise the `name` value.
/// Values are compared as JSON, so the number `1` and the string `"1"` are
/// different identities.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityKey(Value);

impl IdentityKey {
    /// Derive the identity key of a record, if it has one
    pub fn of(record: &Value) -> Option<Self> {
        let object = record.as_object()?;
        ["id", "name"]
            .iter()
            .filter_map(|field| object.get(*field))
            .find(|value| !value.is_null())
            .map(|value| IdentityKey(value.clone()))
    }

    /// The JSON value used as key
    pub fn value(&self) -> &Value {
        &self.0
    }
}

/// Shallow-merge `update` onto `base`: fields of `update` win, fields only in
/// `base` are kept. Non-object inputs are replaced by `update`.
pub fn shallow_merge(base: &Value, update: &Value) -> Value {
    match (base.as_object(), update.as_object()) {
        (Some(base), Some(update)) => {
            let mut merged: Map<String, Value> = base.clone();
            for (key, value) in update {
                merged.insert(key.clone(), value.clone());
            }
            Value::Object(merged)
        }
        _ => update.clone(),
    }
}

/// Copy of `record` carrying `pendingSync: true`
pub fn mark_pending(record: &Value) -> Value {
    let mut marked = record.clone();
    if let Some(object) = marked.as_object_mut() {
        object.insert(PENDING_SYNC_FIELD.to_string(), Value::Bool(true));
    }
    marked
}

/// Remove the `pendingSync` marker in place
pub fn clear_pending(record: &mut Value) {
    if let Some(object) = record.as_object_mut() {
        object.remove(PENDING_SYNC_FIELD);
    }
}

/// Whether the record carries `pendingSync: true`
pub fn is_pending(record: &Value) -> bool {
    record
        .get(PENDING_SYNC_FIELD)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Project name, when the record has a string `name`
pub fn project_name(record: &Value) -> Option<&str> {
    record.get("name").and_then(Value::as_str)
}
