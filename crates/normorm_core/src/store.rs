//! Read-only view over the host's normalized state.
//!
//! The host state is a JSON value holding, under a root key, a map of
//! table -> (id -> record). This module never mutates it.

use serde_json::{Map, Number, Value};
use std::borrow::Cow;

/// Record map as stored in the normalized state.
pub type Record = Map<String, Value>;

/// Normalizes a raw id value into the string key used by table maps.
///
/// Strings and numbers are ids; anything else is not.
pub fn id_key(id: &Value) -> Option<Cow<'_, str>> {
    match id {
        Value::String(value) => Some(Cow::Borrowed(value.as_str())),
        Value::Number(value) => Some(Cow::Owned(number_key(value))),
        _ => None,
    }
}

/// Integral floats key like their integer form (`10.0` -> `"10"`).
fn number_key(value: &Number) -> String {
    const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;
    match value.as_f64() {
        Some(float) if value.is_f64() && float.fract() == 0.0 && float.abs() <= MAX_EXACT_INT => {
            (float as i64).to_string()
        }
        _ => value.to_string(),
    }
}

/// Borrowed table map of one state snapshot.
#[derive(Debug, Clone, Copy)]
pub struct StoreView<'a> {
    tables: Option<&'a Map<String, Value>>,
}

impl<'a> StoreView<'a> {
    pub fn new(state: &'a Value, root_key: &str) -> Self {
        Self {
            tables: state.get(root_key).and_then(Value::as_object),
        }
    }

    pub fn table(&self, table: &str) -> Option<&'a Map<String, Value>> {
        self.tables?.get(table)?.as_object()
    }

    /// Looks up one record. `null` and non-object entries count as absent.
    pub fn record(&self, table: &str, id: &Value) -> Option<&'a Record> {
        let key = id_key(id)?;
        self.table(table)?.get(&*key)?.as_object()
    }

    /// Every id present in `table`, in map key order.
    pub fn ids(&self, table: &str) -> Vec<Value> {
        self.table(table)
            .map(|rows| rows.keys().cloned().map(Value::String).collect())
            .unwrap_or_default()
    }
}
