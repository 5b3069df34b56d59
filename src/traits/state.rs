// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use serde_json::{Map, Value};

/// The single value an engine run operates on.
///
/// The engine never looks inside a state. It only needs to snapshot it
/// (`Clone`) and to fold a partial update into it with `merge`, which must
/// report whether any field actually changed. A `false` from `merge` means
/// no new evaluation round is scheduled, so a no-op patch cannot spin the loop.
pub trait State: Clone + Send + Sync + 'static {
    /// A sparse set of field assignments.
    type Patch: Send + 'static;

    /// Apply `patch` field-by-field and return whether anything changed.
    fn merge(&mut self, patch: Self::Patch) -> bool;
}

/// Dynamic, loosely-typed state backed by a JSON object.
///
/// Patches are JSON objects whose keys overwrite the matching fields.
/// Change detection compares values structurally, so writing an equal value
/// is not a change.
///
/// # Example
/// ```
/// use serde_json::json;
/// use the_tripwire::traits::{JsonState, State};
///
/// let mut state = JsonState::new();
/// assert!(state.merge(JsonState::patch(json!({ "a": 1 }))));
/// assert!(!state.merge(JsonState::patch(json!({ "a": 1 }))));
/// assert_eq!(state.get("a"), Some(&json!(1)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct JsonState(pub Map<String, Value>);

impl JsonState {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Integer view of a field, `None` when missing or not an integer.
    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.0.get(field).and_then(Value::as_i64)
    }

    /// JavaScript-style truthiness: missing, `null`, `false`, `0` and `""` are falsy.
    pub fn is_truthy(&self, field: &str) -> bool {
        match self.0.get(field) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    /// Build a patch from a JSON value. Anything other than an object yields
    /// an empty patch.
    pub fn patch(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

impl From<Value> for JsonState {
    fn from(value: Value) -> Self {
        Self(Self::patch(value))
    }
}

impl State for JsonState {
    type Patch = Map<String, Value>;

    fn merge(&mut self, patch: Self::Patch) -> bool {
        let mut changed = false;
        for (field, value) in patch {
            if self.0.get(&field) != Some(&value) {
                self.0.insert(field, value);
                changed = true;
            }
        }
        changed
    }
}
