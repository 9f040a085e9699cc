//! In-memory document collection with optional JSONL persistence.

use crate::error::StoreError;
use crate::filter::Filter;
use log::{debug, info};
use parking_lot::RwLock;
use scout_rs_format::Record;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// A named collection of records.
///
/// When opened from a directory, every mutation rewrites
/// `<root>/<name>.jsonl` through a temporary file so readers never observe a
/// half-written collection.
#[derive(Debug)]
pub struct DocumentCollection {
    name: String,
    path: Option<PathBuf>,
    records: RwLock<Vec<Record>>,
}

impl DocumentCollection {
    /// Create an empty, non-persistent collection.
    pub fn in_memory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            records: RwLock::new(Vec::new()),
        }
    }

    /// Open (or create) a JSONL-backed collection under `root`.
    pub fn open(root: impl AsRef<Path>, name: &str) -> Result<Self, StoreError> {
        let root = root.as_ref();
        std::fs::create_dir_all(root)?;
        let path = root.join(format!("{name}.jsonl"));
        let records = load_records(&path)?;
        info!(
            "opened document collection (name={}, path={}, records={})",
            name,
            path.display(),
            records.len()
        );
        Ok(Self {
            name: name.to_string(),
            path: Some(path),
            records: RwLock::new(records),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Clone every record matching `filter`, in insertion order.
    pub fn find(&self, filter: &Filter) -> Vec<Record> {
        self.records
            .read()
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect()
    }

    /// Append a record.
    pub fn insert(&self, record: Record) -> Result<Record, StoreError> {
        let mut records = self.records.write();
        records.push(record.clone());
        self.persist(&records)?;
        debug!(
            "inserted record (collection={}, id={:?})",
            self.name,
            record.id()
        );
        Ok(record)
    }

    /// Replace the record with the same `_id`, or append when none exists.
    pub fn upsert(&self, record: Record) -> Result<Record, StoreError> {
        let mut records = self.records.write();
        let existing = record
            .id()
            .and_then(|id| records.iter().position(|stored| stored.id() == Some(id)));
        match existing {
            Some(idx) => records[idx] = record.clone(),
            None => records.push(record.clone()),
        }
        self.persist(&records)?;
        debug!(
            "upserted record (collection={}, id={:?}, replaced={})",
            self.name,
            record.id(),
            existing.is_some()
        );
        Ok(record)
    }

    /// Remove every record matching `filter`, returning how many were removed.
    pub fn remove_matching(&self, filter: &Filter) -> Result<u64, StoreError> {
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|record| !filter.matches(record));
        let removed = before - records.len();
        if removed > 0 {
            self.persist(&records)?;
        }
        info!(
            "removed records (collection={}, removed={}, remaining={})",
            self.name,
            removed,
            records.len()
        );
        Ok(removed as u64)
    }

    /// Rewrite the backing file atomically; no-op for in-memory collections.
    fn persist(&self, records: &[Record]) -> Result<(), StoreError> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        let temp_path = path.with_extension("jsonl.tmp");
        {
            let mut file = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&temp_path)?;
            for record in records {
                let line = serde_json::to_string(record)?;
                writeln!(file, "{line}")?;
            }
            file.sync_all()?;
        }
        std::fs::rename(temp_path, path)?;
        Ok(())
    }
}

fn load_records(path: &Path) -> Result<Vec<Record>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = OpenOptions::new().read(true).open(path)?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value: serde_json::Value = serde_json::from_str(&line)?;
        let record = Record::try_from(value).map_err(|_| {
            StoreError::InvalidRecord(format!("{}:{} is not an object", path.display(), idx + 1))
        })?;
        records.push(record);
    }
    Ok(records)
}
