//! In-place document updates
//!
//! Supports field assignment and the array operators the roster needs:
//! upsert-by-key and pull. Updates are applied to a copy by the
//! store so a failed update never leaves a half-modified document.

use serde_json::{Map, Value};

use super::errors::{StoreError, StoreResult};
use super::filter::{values_equal, Filter};
use super::{ID_FIELD, VERSION_FIELD};

/// Condition selecting array elements to pull
#[derive(Debug, Clone, PartialEq)]
pub enum PullCondition {
    /// Remove elements equal to this value
    Value(Value),
    /// Remove object elements matching this filter
    Matching(Filter),
}

/// A single update operation
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Overwrite top-level fields
    Set(Map<String, Value>),
    /// Replace the array element whose `key` equals `value[key]`, else append
    UpsertByKey {
        field: String,
        key: String,
        value: Value,
    },
    /// Remove matching array elements
    Pull {
        field: String,
        condition: PullCondition,
    },
}

impl Update {
    pub fn set(fields: Map<String, Value>) -> Self {
        Self::Set(fields)
    }

    pub fn upsert_by_key(field: impl Into<String>, key: impl Into<String>, value: Value) -> Self {
        Self::UpsertByKey {
            field: field.into(),
            key: key.into(),
            value,
        }
    }

    pub fn pull_value(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Pull {
            field: field.into(),
            condition: PullCondition::Value(value.into()),
        }
    }

    pub fn pull_matching(field: impl Into<String>, filter: Filter) -> Self {
        Self::Pull {
            field: field.into(),
            condition: PullCondition::Matching(filter),
        }
    }

    /// Apply the update to a document.
    ///
    /// Returns whether the document changed.
    pub fn apply(&self, document: &mut Value) -> StoreResult<bool> {
        let obj = document
            .as_object_mut()
            .ok_or_else(|| StoreError::InvalidDocument("document is not an object".into()))?;

        match self {
            Update::Set(fields) => apply_set(obj, fields),
            Update::UpsertByKey { field, key, value } => {
                let key_value = value
                    .get(key)
                    .filter(|k| !k.is_null())
                    .ok_or_else(|| {
                        StoreError::invalid_update(field, format!("upsert value has no '{}'", key))
                    })?
                    .clone();
                let items = array_field(obj, field)?;
                let existing = items.iter().position(|item| {
                    item.get(key)
                        .is_some_and(|candidate| values_equal(candidate, &key_value))
                });
                match existing {
                    Some(idx) if values_equal(&items[idx], value) => Ok(false),
                    Some(idx) => {
                        items[idx] = value.clone();
                        Ok(true)
                    }
                    None => {
                        items.push(value.clone());
                        Ok(true)
                    }
                }
            }
            Update::Pull { field, condition } => {
                let items = match obj.get_mut(field) {
                    None => return Ok(false),
                    Some(Value::Array(items)) => items,
                    Some(_) => {
                        return Err(StoreError::invalid_update(field, "field is not an array"))
                    }
                };
                let before = items.len();
                items.retain(|item| !pull_matches(item, condition));
                Ok(items.len() != before)
            }
        }
    }
}

fn apply_set(obj: &mut Map<String, Value>, fields: &Map<String, Value>) -> StoreResult<bool> {
    for reserved in [ID_FIELD, VERSION_FIELD] {
        if fields.contains_key(reserved) {
            return Err(StoreError::invalid_update(reserved, "field is immutable"));
        }
    }

    let mut changed = false;
    for (key, value) in fields {
        let same = obj.get(key).is_some_and(|current| values_equal(current, value));
        if !same {
            obj.insert(key.clone(), value.clone());
            changed = true;
        }
    }
    Ok(changed)
}

/// Get an array field, creating it when absent.
fn array_field<'a>(obj: &'a mut Map<String, Value>, field: &str) -> StoreResult<&'a mut Vec<Value>> {
    let slot = obj
        .entry(field.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    match slot {
        Value::Array(items) => Ok(items),
        _ => Err(StoreError::invalid_update(field, "field is not an array")),
    }
}

fn pull_matches(item: &Value, condition: &PullCondition) -> bool {
    match condition {
        PullCondition::Value(value) => values_equal(item, value),
        PullCondition::Matching(filter) => item.is_object() && filter.matches(item),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_overwrites_fields() {
        let mut doc = json!({"_id": "s1", "first": "Ada"});
        let mut fields = Map::new();
        fields.insert("first".into(), json!("Grace"));

        assert!(Update::set(fields.clone()).apply(&mut doc).unwrap());
        assert_eq!(doc["first"], "Grace");

        // Same value again is not a change
        assert!(!Update::set(fields).apply(&mut doc).unwrap());
    }

    #[test]
    fn test_set_rejects_reserved_fields() {
        let mut doc = json!({"_id": "s1"});
        let mut fields = Map::new();
        fields.insert("_id".into(), json!("other"));

        let err = Update::set(fields).apply(&mut doc).unwrap_err();
        assert!(matches!(err, StoreError::InvalidUpdate { .. }));
        assert_eq!(doc["_id"], "s1");
    }

    #[test]
    fn test_upsert_by_key_creates_missing_array() {
        let mut doc = json!({});
        let update = Update::upsert_by_key("assignments", "assignmentId", json!({"assignmentId": 1}));
        assert!(update.apply(&mut doc).unwrap());
        assert_eq!(doc["assignments"], json!([{"assignmentId": 1}]));
    }

    #[test]
    fn test_upsert_by_key_replaces_same_key() {
        let mut doc = json!({"assignments": [{"assignmentId": 1, "score": 80}]});

        let update = Update::upsert_by_key(
            "assignments",
            "assignmentId",
            json!({"assignmentId": 1, "score": 95}),
        );
        assert!(update.apply(&mut doc).unwrap());
        assert_eq!(doc["assignments"], json!([{"assignmentId": 1, "score": 95}]));
    }

    #[test]
    fn test_upsert_by_key_identical_is_noop() {
        let mut doc = json!({"assignments": [{"assignmentId": 1, "score": 80}]});

        let update = Update::upsert_by_key(
            "assignments",
            "assignmentId",
            json!({"assignmentId": 1, "score": 80}),
        );
        assert!(!update.apply(&mut doc).unwrap());
        assert_eq!(doc["assignments"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_upsert_by_key_appends_new_key() {
        let mut doc = json!({"assignments": [{"assignmentId": 1, "score": 80}]});

        let update = Update::upsert_by_key(
            "assignments",
            "assignmentId",
            json!({"assignmentId": 2, "score": 100}),
        );
        assert!(update.apply(&mut doc).unwrap());
        assert_eq!(doc["assignments"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_upsert_requires_key() {
        let mut doc = json!({"assignments": []});
        let update = Update::upsert_by_key("assignments", "assignmentId", json!({"score": 1}));
        assert!(update.apply(&mut doc).is_err());
    }

    #[test]
    fn test_pull_value() {
        let mut doc = json!({"students": ["a", "b", "a"]});

        assert!(Update::pull_value("students", "a").apply(&mut doc).unwrap());
        assert_eq!(doc["students"], json!(["b"]));
        assert!(!Update::pull_value("students", "a").apply(&mut doc).unwrap());
    }

    #[test]
    fn test_pull_matching_objects() {
        let mut doc = json!({"assignments": [
            {"assignmentId": 1, "score": 80},
            {"assignmentId": 2, "score": 100}
        ]});

        let update = Update::pull_matching("assignments", Filter::all().eq("assignmentId", 1));
        assert!(update.apply(&mut doc).unwrap());
        assert_eq!(doc["assignments"], json!([{"assignmentId": 2, "score": 100}]));
    }

    #[test]
    fn test_pull_on_missing_field_is_noop() {
        let mut doc = json!({"_id": "s1"});
        assert!(!Update::pull_value("students", "a").apply(&mut doc).unwrap());
    }

    #[test]
    fn test_array_operator_on_scalar_field_fails() {
        let mut doc = json!({"students": "not-an-array"});
        let upsert = Update::upsert_by_key("students", "id", json!({"id": "a"}));
        assert!(upsert.apply(&mut doc).is_err());
        assert!(Update::pull_value("students", "a").apply(&mut doc).is_err());
    }
}
