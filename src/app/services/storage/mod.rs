//! Storage backends for canonical records
//!
//! The loader needs exactly three operations from storage, captured by the
//! [`Storage`] trait. Provenance entries go to a separate [`ProvenanceSink`].
//!
//! - [`memory`] - In-process store for tests and dry runs
//! - [`sqlite`] - Embedded SQLite database with one table per file type
//! - [`provenance`] - Provenance sinks (JSON lines, in-memory)

use crate::app::models::{CanonicalRecord, FileType, ProvenanceEntry};
use crate::{Error, Result};

pub mod memory;
pub mod provenance;
pub mod sqlite;

#[cfg(test)]
pub mod tests;

pub use memory::{MemoryStorage, StorageOp};
pub use provenance::{JsonlProvenanceLog, MemoryProvenanceLog};
pub use sqlite::SqliteStorage;

/// Write side of a canonical record store
///
/// Implementations must make each `bulk_insert` all-or-nothing: a failed
/// call leaves none of its records behind.
pub trait Storage: Send {
    /// Persist a batch of records into a table, returning the rows written
    fn bulk_insert(&mut self, table: &str, records: &[CanonicalRecord]) -> Result<usize>;

    /// Remove every record of a table tagged with a source file
    fn delete_where(&mut self, table: &str, source_file: &str) -> Result<usize>;

    /// Make previously written batches durable
    fn checkpoint(&mut self) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for &mut S {
    fn bulk_insert(&mut self, table: &str, records: &[CanonicalRecord]) -> Result<usize> {
        (**self).bulk_insert(table, records)
    }

    fn delete_where(&mut self, table: &str, source_file: &str) -> Result<usize> {
        (**self).delete_where(table, source_file)
    }

    fn checkpoint(&mut self) -> Result<()> {
        (**self).checkpoint()
    }
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn bulk_insert(&mut self, table: &str, records: &[CanonicalRecord]) -> Result<usize> {
        (**self).bulk_insert(table, records)
    }

    fn delete_where(&mut self, table: &str, source_file: &str) -> Result<usize> {
        (**self).delete_where(table, source_file)
    }

    fn checkpoint(&mut self) -> Result<()> {
        (**self).checkpoint()
    }
}

/// Append-only destination for provenance entries
pub trait ProvenanceSink: Send {
    fn append(&mut self, entry: &ProvenanceEntry) -> Result<()>;
}

impl<P: ProvenanceSink + ?Sized> ProvenanceSink for &mut P {
    fn append(&mut self, entry: &ProvenanceEntry) -> Result<()> {
        (**self).append(entry)
    }
}

impl<P: ProvenanceSink + ?Sized> ProvenanceSink for Box<P> {
    fn append(&mut self, entry: &ProvenanceEntry) -> Result<()> {
        (**self).append(entry)
    }
}

/// Every sink receives each entry, in order; the first failure stops the fan-out
impl<P: ProvenanceSink> ProvenanceSink for Vec<P> {
    fn append(&mut self, entry: &ProvenanceEntry) -> Result<()> {
        for sink in self.iter_mut() {
            sink.append(entry)?;
        }
        Ok(())
    }
}

/// File type owning a canonical table name
pub fn file_type_for_table(table: &str) -> Result<FileType> {
    FileType::ALL
        .into_iter()
        .find(|file_type| file_type.table_name() == table)
        .ok_or_else(|| Error::storage(format!("Unknown table '{}'", table)))
}

/// Refuse a batch containing records of another table
pub(crate) fn check_batch(table: &str, records: &[CanonicalRecord]) -> Result<()> {
    match records.iter().find(|r| r.table_name() != table) {
        Some(stray) => Err(Error::storage(format!(
            "{} record for report {} cannot be written to table '{}'",
            stray.file_type(),
            stray.report_key(),
            table
        ))),
        None => Ok(()),
    }
}
