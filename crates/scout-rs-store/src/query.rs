//! Query parameters passed from the HTTP layer to storage.

use scout_rs_format::is_truthy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default `count` applied by list routes when the client sends none.
pub const DEFAULT_COUNT: u64 = 10;

/// Filter and pagination parameters, nested the way bracketed query strings
/// describe them (`find[created_at][$gte]=…`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query(Map<String, Value>);

impl Query {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Build a query from decoded `key=value` pairs, expanding bracket syntax.
    ///
    /// `a[b][c]=1` nests objects, `a[]=1` appends to an array, and repeating a
    /// plain key collects its values into an array.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut map = Map::new();
        for (key, value) in pairs {
            let path = split_key(key.as_ref());
            insert_path(&mut map, &path, Value::String(value.into()));
        }
        Self(map)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    /// Number of top-level parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Set `count` to `default` unless the client supplied a truthy value.
    pub fn ensure_count(&mut self, default: u64) {
        if !self.0.get("count").is_some_and(is_truthy) {
            self.0.insert("count".to_string(), Value::from(default));
        }
    }

    /// Numeric `count`, if present and parseable. Negative values clamp to 0.
    pub fn count(&self) -> Option<u64> {
        let count = match self.0.get("count")? {
            Value::Number(number) => number.as_f64()?,
            Value::String(text) => text.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        if !count.is_finite() {
            return None;
        }
        Some(count.max(0.0).trunc() as u64)
    }

    /// The `find` filter object, if any.
    pub fn find(&self) -> Option<&Map<String, Value>> {
        self.0.get("find").and_then(Value::as_object)
    }

    /// Set (`Some`) or clear (`None`) one field of the `find` filter.
    ///
    /// A missing or non-object `find` is replaced with an empty object first.
    pub fn set_find_field(&mut self, field: &str, value: Option<Value>) {
        let find = self
            .0
            .entry("find")
            .or_insert_with(|| Value::Object(Map::new()));
        if !find.is_object() {
            *find = Value::Object(Map::new());
        }
        if let Value::Object(map) = find {
            match value {
                Some(value) => {
                    map.insert(field.to_string(), value);
                }
                None => {
                    map.shift_remove(field);
                }
            }
        }
    }
}

/// Summary returned by delete operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSummary {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteSummary {
    pub fn deleted(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}

/// Split `a[b][]` into `["a", "b", ""]`. Malformed brackets keep the key whole.
fn split_key(key: &str) -> Vec<String> {
    let Some(open) = key.find('[') else {
        return vec![key.to_string()];
    };
    if open == 0 {
        return vec![key.to_string()];
    }
    let mut segments = vec![key[..open].to_string()];
    let mut rest = &key[open..];
    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return vec![key.to_string()];
        };
        let Some(close) = inner.find(']') else {
            return vec![key.to_string()];
        };
        segments.push(inner[..close].to_string());
        rest = &inner[close + 1..];
    }
    segments
}

fn insert_path(map: &mut Map<String, Value>, path: &[String], value: Value) {
    let Some((head, tail)) = path.split_first() else {
        return;
    };
    if tail.is_empty() {
        match map.get_mut(head) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let previous = existing.take();
                *existing = Value::Array(vec![previous, value]);
            }
            None => {
                map.insert(head.clone(), value);
            }
        }
        return;
    }
    if tail.len() == 1 && tail[0].is_empty() {
        let entry = map
            .entry(head.clone())
            .or_insert_with(|| Value::Array(Vec::new()));
        match entry {
            Value::Array(items) => items.push(value),
            other => {
                let previous = other.take();
                *other = Value::Array(vec![previous, value]);
            }
        }
        return;
    }
    let entry = map
        .entry(head.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(child) = entry {
        insert_path(child, tail, value);
    }
}

#[cfg(test)]
mod tests {
    use super::{DeleteSummary, Query};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn bracket_keys_nest_objects() {
        let query = Query::from_pairs([
            ("count", "100000"),
            ("find[created_at][$gte]", "2024-01-01"),
            ("find[created_at][$lte]", "2024-02-01"),
            ("find[device]", "xDrip"),
        ]);
        assert_eq!(
            serde_json::to_value(&query).expect("json"),
            json!({
                "count": "100000",
                "find": {
                    "created_at": { "$gte": "2024-01-01", "$lte": "2024-02-01" },
                    "device": "xDrip"
                }
            })
        );
        assert_eq!(query.len(), 2);
    }

    #[test]
    fn repeated_and_array_keys_collect_values() {
        let query = Query::from_pairs([("a", "1"), ("a", "2"), ("b[]", "x"), ("b[]", "y")]);
        assert_eq!(query.get("a"), Some(&json!(["1", "2"])));
        assert_eq!(query.get("b"), Some(&json!(["x", "y"])));
    }

    #[test]
    fn malformed_brackets_stay_literal() {
        let query = Query::from_pairs([("find[x", "1"), ("[y]", "2")]);
        assert_eq!(query.get("find[x"), Some(&json!("1")));
        assert_eq!(query.get("[y]"), Some(&json!("2")));
    }

    #[test]
    fn ensure_count_only_fills_missing_or_falsy() {
        let mut query = Query::new();
        query.ensure_count(10);
        assert_eq!(query.count(), Some(10));

        let mut query = Query::from_pairs([("count", "0")]);
        query.ensure_count(10);
        assert_eq!(query.get("count"), Some(&json!("0")));

        let mut query = Query::from_pairs([("count", "")]);
        query.ensure_count(10);
        assert_eq!(query.count(), Some(10));
    }

    #[test]
    fn count_parses_numbers_and_rejects_words() {
        assert_eq!(Query::from_pairs([("count", "25")]).count(), Some(25));
        assert_eq!(Query::from_pairs([("count", "-3")]).count(), Some(0));
        assert_eq!(Query::from_pairs([("count", "many")]).count(), None);
    }

    #[test]
    fn set_find_field_replaces_scalar_find() {
        let mut query = Query::from_pairs([("find", "oops")]);
        query.set_find_field("_id", Some(json!("abc")));
        assert_eq!(
            serde_json::to_value(&query).expect("json"),
            json!({ "find": { "_id": "abc" } })
        );

        query.set_find_field("_id", None);
        assert_eq!(
            serde_json::to_value(&query).expect("json"),
            json!({ "find": {} })
        );
    }

    #[test]
    fn delete_summary_serializes_camel_case() {
        assert_eq!(
            serde_json::to_value(DeleteSummary::deleted(3)).expect("json"),
            json!({ "acknowledged": true, "deletedCount": 3 })
        );
    }
}
