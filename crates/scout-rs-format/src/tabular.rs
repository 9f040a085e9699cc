//! Delimiter-separated export of record sets.
//!
//! Rows are flattened onto the resource's fixed column schema, then every
//! data cell is JSON-string-encoded so separators, quotes and line breaks
//! inside a value stay inside one cell. The header row is emitted verbatim.
//! Existing exports depend on the exact bytes produced here, including the
//! `"\"\""` rendering of a missing object column.

use crate::json::{replace_nulls, to_js_string};
use crate::record::{Record, is_truthy};
use crate::schema::{Column, ColumnKind, ResourceKind};
use log::warn;
use serde_json::Value;

/// Row terminator for every tabular media type.
const ROW_SEPARATOR: &str = "\r\n";

/// Format a record set for the given resource kind.
///
/// Returns an empty string when there are no records.
pub fn format_with_separator(records: &[Record], kind: ResourceKind, separator: char) -> String {
    if records.is_empty() {
        return String::new();
    }
    let columns = kind.columns();
    let separator = separator.to_string();

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(
        columns
            .iter()
            .map(|column| column.name)
            .collect::<Vec<_>>()
            .join(&separator),
    );
    for record in records {
        let row = columns
            .iter()
            .map(|column| encode_cell(&flatten_cell(record, column)))
            .collect::<Vec<_>>()
            .join(&separator);
        lines.push(row);
    }
    lines.join(ROW_SEPARATOR)
}

/// Format an arbitrary JSON value, which must be an array of objects.
///
/// Anything that is not an array yields an empty string; array items that are
/// not objects are treated as records with every field missing.
pub fn format_value(value: &Value, kind: ResourceKind, separator: char) -> String {
    let Value::Array(items) = value else {
        return String::new();
    };
    let records: Vec<Record> = items
        .iter()
        .map(|item| Record::try_from(item.clone()).unwrap_or_default())
        .collect();
    format_with_separator(&records, kind, separator)
}

/// Resolve one column of a record to the value that will be encoded.
fn flatten_cell(record: &Record, column: &Column) -> Value {
    let raw = record
        .get(column.name)
        .filter(|value| is_truthy(value))
        .cloned()
        .unwrap_or_else(|| Value::String(String::new()));
    match column.kind {
        ColumnKind::Scalar => raw,
        ColumnKind::Object => Value::String(json_text(&raw)),
    }
}

/// Encode a single data cell; nulls anywhere inside become empty strings.
fn encode_cell(value: &Value) -> String {
    json_text(&replace_nulls(value))
}

fn json_text(value: &Value) -> String {
    match to_js_string(value) {
        Ok(text) => text,
        Err(err) => {
            warn!("failed to encode tabular cell: {err}");
            "\"\"".to_string()
        }
    }
}
