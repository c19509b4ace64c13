//! In-memory record store

use super::{Storage, check_batch, file_type_for_table};
use crate::app::models::CanonicalRecord;
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// One call received by a [`MemoryStorage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageOp {
    Insert { table: String, rows: usize },
    Delete { table: String, source_file: String, rows: usize },
    Checkpoint,
}

#[derive(Debug, Default)]
struct Inner {
    tables: HashMap<String, Vec<CanonicalRecord>>,
    operations: Vec<StorageOp>,
}

/// Store keeping records in process memory
///
/// Clones share the same underlying tables, so one handle per worker sees
/// the writes of every other.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| Error::storage(format!("Memory storage lock poisoned: {}", e)))
    }

    /// Number of records in a table
    pub fn count(&self, table: &str) -> usize {
        self.lock()
            .map(|inner| inner.tables.get(table).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    /// Number of records in a table tagged with a source file
    pub fn count_for_source(&self, table: &str, source_file: &str) -> usize {
        self.records(table)
            .iter()
            .filter(|r| r.source_file() == source_file)
            .count()
    }

    /// Snapshot of a table's records
    pub fn records(&self, table: &str) -> Vec<CanonicalRecord> {
        self.lock()
            .map(|inner| inner.tables.get(table).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    /// Every call received so far, in order
    pub fn operations(&self) -> Vec<StorageOp> {
        self.lock()
            .map(|inner| inner.operations.clone())
            .unwrap_or_default()
    }
}

impl Storage for MemoryStorage {
    fn bulk_insert(&mut self, table: &str, records: &[CanonicalRecord]) -> Result<usize> {
        file_type_for_table(table)?;
        check_batch(table, records)?;

        let mut inner = self.lock()?;
        inner
            .tables
            .entry(table.to_string())
            .or_default()
            .extend_from_slice(records);
        inner.operations.push(StorageOp::Insert {
            table: table.to_string(),
            rows: records.len(),
        });
        Ok(records.len())
    }

    fn delete_where(&mut self, table: &str, source_file: &str) -> Result<usize> {
        file_type_for_table(table)?;

        let mut inner = self.lock()?;
        let removed = match inner.tables.get_mut(table) {
            Some(rows) => {
                let before = rows.len();
                rows.retain(|r| r.source_file() != source_file);
                before - rows.len()
            }
            None => 0,
        };
        inner.operations.push(StorageOp::Delete {
            table: table.to_string(),
            source_file: source_file.to_string(),
            rows: removed,
        });
        Ok(removed)
    }

    fn checkpoint(&mut self) -> Result<()> {
        self.lock()?.operations.push(StorageOp::Checkpoint);
        Ok(())
    }
}
