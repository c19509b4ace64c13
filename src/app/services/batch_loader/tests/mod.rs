//! Shared fixtures for batch loader tests

use crate::app::models::{CanonicalRecord, FileType, RecordBody, RejectedRow};
use crate::app::services::batch_loader::RowOutcome;
use crate::app::services::storage::{MemoryStorage, Storage};
use crate::{Error, Result};
use std::sync::Arc;

pub mod loader_tests;

pub fn accepted(report_key: usize, source_file: &str) -> Result<RowOutcome> {
    let body = RecordBody::new(report_key.to_string(), Arc::from(source_file), Vec::new(), Vec::new());
    Ok(RowOutcome::Accepted(CanonicalRecord::from_body(FileType::Device, body)))
}

pub fn rejected(row_index: u64) -> Result<RowOutcome> {
    Ok(RowOutcome::Rejected(RejectedRow::new(
        row_index,
        "expected 34 fields, found 3",
        "1|2|3",
    )))
}

/// `n` accepted device rows for one source file
pub fn device_rows(n: usize, source_file: &str) -> Vec<Result<RowOutcome>> {
    (0..n).map(|i| accepted(i, source_file)).collect()
}

/// Memory storage whose nth bulk insert (1-based) fails
pub struct FailingStorage {
    pub inner: MemoryStorage,
    pub fail_on_insert: usize,
    pub fail_checkpoint: bool,
    inserts: usize,
}

impl FailingStorage {
    pub fn new(fail_on_insert: usize) -> Self {
        Self {
            inner: MemoryStorage::new(),
            fail_on_insert,
            fail_checkpoint: false,
            inserts: 0,
        }
    }
}

impl Storage for FailingStorage {
    fn bulk_insert(&mut self, table: &str, records: &[CanonicalRecord]) -> Result<usize> {
        self.inserts += 1;
        if self.inserts == self.fail_on_insert {
            return Err(Error::storage("disk full"));
        }
        self.inner.bulk_insert(table, records)
    }

    fn delete_where(&mut self, table: &str, source_file: &str) -> Result<usize> {
        self.inner.delete_where(table, source_file)
    }

    fn checkpoint(&mut self) -> Result<()> {
        if self.fail_checkpoint {
            return Err(Error::storage("fsync failed"));
        }
        self.inner.checkpoint()
    }
}
