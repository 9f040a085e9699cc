//! Markup stripping for client-supplied records.

use crate::error::ScoutCoreError;
use log::debug;
use regex::Regex;
use scout_rs_format::Record;
use serde_json::Value;

/// Cleans string content of a record in place before it is stored.
pub trait Purifier: Send + Sync {
    fn purify_object(&self, record: &mut Record);
}

/// Leaves records untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPurifier;

impl Purifier for NoopPurifier {
    fn purify_object(&self, _record: &mut Record) {}
}

/// Removes HTML tags from every string, dropping script and style blocks
/// along with their content.
#[derive(Debug, Clone)]
pub struct TagStripPurifier {
    blocks: Regex,
    tags: Regex,
}

impl TagStripPurifier {
    pub fn new() -> Result<Self, ScoutCoreError> {
        Ok(Self {
            blocks: compile(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>")?,
            tags: compile(r"(?s)</?[A-Za-z!][^>]*>")?,
        })
    }

    fn clean(&self, text: &str) -> Option<String> {
        if !text.contains('<') {
            return None;
        }
        let without_blocks = self.blocks.replace_all(text, "");
        let cleaned = self.tags.replace_all(&without_blocks, "");
        (cleaned != text).then(|| cleaned.into_owned())
    }

    fn purify_value(&self, value: &mut Value) -> usize {
        match value {
            Value::String(text) => match self.clean(text) {
                Some(cleaned) => {
                    *text = cleaned;
                    1
                }
                None => 0,
            },
            Value::Array(items) => items.iter_mut().map(|item| self.purify_value(item)).sum(),
            Value::Object(map) => map.values_mut().map(|item| self.purify_value(item)).sum(),
            _ => 0,
        }
    }
}

impl Purifier for TagStripPurifier {
    fn purify_object(&self, record: &mut Record) {
        let changed: usize = record
            .as_map_mut()
            .values_mut()
            .map(|value| self.purify_value(value))
            .sum();
        if changed > 0 {
            debug!("purified record (id={:?}, fields={changed})", record.id());
        }
    }
}

fn compile(pattern: &str) -> Result<Regex, ScoutCoreError> {
    Regex::new(pattern).map_err(|err| ScoutCoreError::InvalidPattern {
        pattern: pattern.to_string(),
        message: err.to_string(),
    })
}
