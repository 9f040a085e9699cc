//! Minimal `find` filter evaluation for the document store.
//!
//! Supports equality plus `$gt`, `$gte`, `$lt`, `$lte`, `$ne` and `$in` on
//! top-level or dotted field paths. Query-string values arrive as strings, so
//! comparisons coerce numeric strings to numbers when both sides allow it.

use crate::error::StoreError;
use scout_rs_format::Record;
use serde_json::{Map, Value};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl Operator {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "$eq" => Some(Self::Eq),
            "$ne" => Some(Self::Ne),
            "$gt" => Some(Self::Gt),
            "$gte" => Some(Self::Gte),
            "$lt" => Some(Self::Lt),
            "$lte" => Some(Self::Lte),
            "$in" => Some(Self::In),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Condition {
    field: String,
    operator: Operator,
    operand: Value,
}

/// A compiled `find` filter. The empty filter matches every record.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// Filter matching every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Compile a `find` object.
    pub fn parse(find: Option<&Map<String, Value>>) -> Result<Self, StoreError> {
        let Some(find) = find else {
            return Ok(Self::all());
        };
        let mut conditions = Vec::new();
        for (field, criterion) in find {
            match criterion {
                Value::Object(ops) if ops.keys().any(|key| key.starts_with('$')) => {
                    for (name, operand) in ops {
                        let operator = Operator::parse(name).ok_or_else(|| {
                            StoreError::InvalidQuery(format!(
                                "unsupported operator {name} on {field}"
                            ))
                        })?;
                        conditions.push(Condition {
                            field: field.clone(),
                            operator,
                            operand: operand.clone(),
                        });
                    }
                }
                operand => conditions.push(Condition {
                    field: field.clone(),
                    operator: Operator::Eq,
                    operand: operand.clone(),
                }),
            }
        }
        Ok(Self { conditions })
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Whether `record` satisfies every condition.
    pub fn matches(&self, record: &Record) -> bool {
        self.conditions.iter().all(|condition| {
            let value = lookup(record, &condition.field);
            evaluate(condition, value)
        })
    }
}

fn lookup<'a>(record: &'a Record, field: &str) -> Option<&'a Value> {
    if let Some(value) = record.get(field) {
        return Some(value);
    }
    let mut parts = field.split('.');
    let mut current = record.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

fn evaluate(condition: &Condition, value: Option<&Value>) -> bool {
    let operand = &condition.operand;
    match condition.operator {
        Operator::Eq => value.is_some_and(|value| loose_eq(value, operand)),
        Operator::Ne => !value.is_some_and(|value| loose_eq(value, operand)),
        Operator::In => value.is_some_and(|value| {
            in_candidates(operand)
                .iter()
                .any(|candidate| loose_eq(value, candidate))
        }),
        Operator::Gt => compare(value, operand).is_some_and(Ordering::is_gt),
        Operator::Gte => compare(value, operand).is_some_and(Ordering::is_ge),
        Operator::Lt => compare(value, operand).is_some_and(Ordering::is_lt),
        Operator::Lte => compare(value, operand).is_some_and(Ordering::is_le),
    }
}

/// `$in` accepts an array or a comma-separated string.
fn in_candidates(operand: &Value) -> Vec<Value> {
    match operand {
        Value::Array(items) => items.clone(),
        Value::String(text) => text
            .split(',')
            .map(|item| Value::String(item.trim().to_string()))
            .collect(),
        other => vec![other.clone()],
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) if !text.trim().is_empty() => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn loose_eq(value: &Value, operand: &Value) -> bool {
    if value == operand {
        return true;
    }
    match (value, operand) {
        (Value::Bool(flag), Value::String(text)) | (Value::String(text), Value::Bool(flag)) => {
            text == if *flag { "true" } else { "false" }
        }
        (Value::Number(_), _) | (_, Value::Number(_)) => {
            matches!((as_number(value), as_number(operand)), (Some(a), Some(b)) if a == b)
        }
        _ => false,
    }
}

fn compare(value: Option<&Value>, operand: &Value) -> Option<Ordering> {
    let value = value?;
    if matches!(value, Value::Number(_)) || matches!(operand, Value::Number(_)) {
        if let (Some(a), Some(b)) = (as_number(value), as_number(operand)) {
            return a.partial_cmp(&b);
        }
    }
    match (value, operand) {
        (Value::String(a), Value::String(b)) => Some(a.as_str().cmp(b.as_str())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::Filter;
    use scout_rs_format::Record;
    use serde_json::{Value, json};

    fn record(value: Value) -> Record {
        Record::try_from(value).expect("object")
    }

    fn filter(value: Value) -> Filter {
        Filter::parse(value.as_object()).expect("filter")
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(Filter::parse(None).expect("filter").matches(&record(json!({}))));
        assert!(filter(json!({})).is_empty());
    }

    #[test]
    fn equality_coerces_query_strings() {
        let rec = record(json!({ "_id": "a", "carbs": 12, "hidden": false }));
        assert!(filter(json!({ "_id": "a" })).matches(&rec));
        assert!(filter(json!({ "carbs": "12" })).matches(&rec));
        assert!(filter(json!({ "hidden": "false" })).matches(&rec));
        assert!(!filter(json!({ "_id": "b" })).matches(&rec));
        assert!(!filter(json!({ "missing": "x" })).matches(&rec));
    }

    #[test]
    fn range_operators_compare_strings_and_numbers() {
        let rec = record(json!({ "created_at": "2024-01-15T00:00:00Z", "mills": 1705276800000_i64 }));
        assert!(
            filter(json!({ "created_at": { "$gte": "2024-01-01", "$lte": "2024-02-01" } }))
                .matches(&rec)
        );
        assert!(!filter(json!({ "created_at": { "$gt": "2024-02-01" } })).matches(&rec));
        assert!(filter(json!({ "mills": { "$lt": "1705276800001" } })).matches(&rec));
    }

    #[test]
    fn ne_and_in_operators() {
        let rec = record(json!({ "type": "quickpick", "pump": { "model": "722" } }));
        assert!(filter(json!({ "type": { "$ne": "food" } })).matches(&rec));
        assert!(filter(json!({ "type": { "$in": ["food", "quickpick"] } })).matches(&rec));
        assert!(filter(json!({ "type": { "$in": "food,quickpick" } })).matches(&rec));
        assert!(filter(json!({ "pump.model": "722" })).matches(&rec));
    }

    #[test]
    fn unknown_operators_are_rejected() {
        let err = Filter::parse(json!({ "a": { "$where": "1" } }).as_object()).unwrap_err();
        assert!(err.to_string().contains("$where"));
    }
}
