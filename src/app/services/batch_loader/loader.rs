//! Batch accumulation and idempotent flushing

use super::progress::LoadProgress;
use super::state::{LoadJob, LoadState};
use crate::app::models::{CanonicalRecord, FileType, LoadStatus, ProvenanceEntry, RejectedRow};
use crate::app::services::storage::Storage;
use crate::constants::{DEFAULT_BATCH_SIZE, DEFAULT_DIAGNOSTIC_SAMPLE_SIZE};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Rows between progress refreshes
const PROGRESS_INTERVAL: u64 = 10_000;

/// One row offered to the loader
#[derive(Debug, Clone)]
pub enum RowOutcome {
    Accepted(CanonicalRecord),
    Rejected(RejectedRow),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Rejected rows kept for diagnostics
    pub diagnostic_sample_size: usize,

    /// Show a progress spinner while streaming
    pub show_progress: bool,

    /// Data row the rows start at when resuming an interrupted load
    ///
    /// Nonzero means the earlier rows are already stored, so the previous
    /// generation is kept and the rows are appended to it.
    pub resume_from: u64,
}

impl LoadOptions {
    pub fn is_resume(&self) -> bool {
        self.resume_from > 0
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            diagnostic_sample_size: DEFAULT_DIAGNOSTIC_SAMPLE_SIZE,
            show_progress: false,
            resume_from: 0,
        }
    }
}

/// Result of one load attempt, successful or not
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    /// Provenance entry describing the attempt
    pub entry: ProvenanceEntry,

    pub state: LoadState,
    pub history: Vec<LoadState>,
    pub batches_flushed: usize,

    /// Records removed from a previous generation of the same file
    pub rows_deleted: usize,

    /// First rejected rows, in file order
    pub rejected_sample: Vec<RejectedRow>,
}

impl LoadOutcome {
    pub fn is_complete(&self) -> bool {
        self.state == LoadState::Complete
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.entry.elapsed_ms)
    }

    /// Persisted rows per second
    pub fn rows_per_second(&self) -> f64 {
        self.entry.throughput()
    }

    /// Turn a failed outcome into a [`Error::LoadFailure`]
    pub fn into_result(self) -> Result<Self> {
        if self.is_complete() {
            Ok(self)
        } else {
            Err(Error::load_failure(
                &self.entry.source_file,
                self.entry.rows_accepted,
                self.entry.error.clone().unwrap_or_else(|| "load failed".to_string()),
            ))
        }
    }
}

/// Counters and state for the load in progress
struct Tally {
    job: LoadJob,
    rows_read: u64,
    rows_accepted: u64,
    rows_rejected: u64,
    batches_flushed: usize,
    rows_deleted: usize,
    deleted: bool,
    rejected_sample: Vec<RejectedRow>,
}

/// Streams canonical records into storage in fixed-size batches
///
/// The first write for a file is always a delete of that file's previous
/// records, so reloading a file leaves exactly one generation behind.
/// Resumed loads skip the delete and append. Batches already flushed stay
/// in storage if a later one fails.
pub struct BatchLoader<S: Storage> {
    storage: S,
    options: LoadOptions,
    cancellation: Option<CancellationToken>,
}

impl<S: Storage> BatchLoader<S> {
    pub fn new(storage: S, options: LoadOptions) -> Self {
        Self {
            storage,
            options,
            cancellation: None,
        }
    }

    /// Abandon loads at the next batch boundary once the token fires
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    /// Load every row of one file
    ///
    /// Never returns early on bad rows; they are counted and sampled. Storage
    /// and stream failures end the load in the `Failed` state with partial
    /// counts in the returned outcome.
    pub fn load<I>(
        &mut self,
        file_name: &str,
        file_type: FileType,
        schema_name: &str,
        rows: I,
        batch_size: usize,
    ) -> LoadOutcome
    where
        I: IntoIterator<Item = Result<RowOutcome>>,
    {
        let loaded_at = Utc::now();
        let started = Instant::now();
        let batch_size = if batch_size == 0 { DEFAULT_BATCH_SIZE } else { batch_size };
        let table = file_type.table_name();
        let progress = LoadProgress::new(self.options.show_progress, file_name);

        let mut tally = Tally {
            job: LoadJob::new(),
            rows_read: 0,
            rows_accepted: 0,
            rows_rejected: 0,
            batches_flushed: 0,
            rows_deleted: 0,
            deleted: self.options.is_resume(),
            rejected_sample: Vec::new(),
        };

        if self.options.is_resume() {
            info!(
                "Resuming {} into {} at row {} with schema {} (batch size {})",
                file_name, table, self.options.resume_from, schema_name, batch_size
            );
        } else {
            info!(
                "Loading {} into {} with schema {} (batch size {})",
                file_name, table, schema_name, batch_size
            );
        }

        let result = self.run(file_name, table, schema_name, rows, batch_size, &mut tally, &progress);

        let error = match result {
            Ok(()) => {
                progress.finish(&format!("{} rows loaded", tally.rows_accepted));
                None
            }
            Err(e) => {
                tally.job.fail();
                progress.finish_with_error(&e.to_string());
                warn!(
                    "Load of {} failed after {} accepted rows: {}",
                    file_name, tally.rows_accepted, e
                );
                Some(match e {
                    Error::LoadFailure { message, .. } => message,
                    other => other.to_string(),
                })
            }
        };

        self.outcome(file_name, file_type, schema_name, loaded_at, started, tally, error)
    }

    #[allow(clippy::too_many_arguments)]
    fn run<I>(
        &mut self,
        file_name: &str,
        table: &str,
        schema_name: &str,
        rows: I,
        batch_size: usize,
        tally: &mut Tally,
        progress: &LoadProgress,
    ) -> Result<()>
    where
        I: IntoIterator<Item = Result<RowOutcome>>,
    {
        tally.job.transition(LoadState::SchemaDetected)?;
        tally.job.transition(LoadState::Streaming)?;

        let mut batch: Vec<CanonicalRecord> = Vec::with_capacity(batch_size.min(DEFAULT_BATCH_SIZE));

        for row in rows {
            match row? {
                RowOutcome::Accepted(record) => batch.push(record),
                RowOutcome::Rejected(rejected) => {
                    tally.rows_rejected += 1;
                    debug!(
                        "{}: rejected row {}: {}",
                        file_name, rejected.row_index, rejected.reason
                    );
                    if tally.rejected_sample.len() < self.options.diagnostic_sample_size {
                        tally.rejected_sample.push(rejected);
                    }
                }
            }
            tally.rows_read += 1;

            if batch.len() >= batch_size {
                self.flush(file_name, table, &mut batch, tally)?;
                progress.update(tally.rows_read, tally.batches_flushed);
            } else if tally.rows_read % PROGRESS_INTERVAL == 0 {
                progress.update(tally.rows_read, tally.batches_flushed);
            }
        }

        if !batch.is_empty() {
            self.flush(file_name, table, &mut batch, tally)?;
        }

        self.check_cancelled(file_name)?;
        if !tally.deleted {
            // Nothing was flushed; still clear out a previous generation
            self.delete_previous(file_name, table, tally)?;
        }

        self.storage.checkpoint().map_err(|e| {
            Error::load_failure(file_name, tally.rows_accepted, format!("checkpoint failed: {}", e))
        })?;
        tally.job.transition(LoadState::Checkpointed)?;
        tally.job.transition(LoadState::Complete)?;

        if tally.rows_rejected > 0 {
            warn!(
                "{}: {} of {} rows rejected with schema {}",
                file_name, tally.rows_rejected, tally.rows_read, schema_name
            );
        }
        Ok(())
    }

    fn check_cancelled(&self, file_name: &str) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::processing_interrupted(format!(
                "load of {} cancelled",
                file_name
            )));
        }
        Ok(())
    }

    fn delete_previous(&mut self, file_name: &str, table: &str, tally: &mut Tally) -> Result<()> {
        let removed = self.storage.delete_where(table, file_name).map_err(|e| {
            Error::load_failure(file_name, tally.rows_accepted, format!("delete failed: {}", e))
        })?;
        tally.deleted = true;
        tally.rows_deleted = removed;
        if removed > 0 {
            info!("Removed {} rows of a previous load of {}", removed, file_name);
        }
        Ok(())
    }

    /// Write the pending batch, discarding it if cancellation was requested
    fn flush(
        &mut self,
        file_name: &str,
        table: &str,
        batch: &mut Vec<CanonicalRecord>,
        tally: &mut Tally,
    ) -> Result<()> {
        if let Err(e) = self.check_cancelled(file_name) {
            batch.clear();
            return Err(e);
        }

        tally.job.transition(LoadState::Flushing)?;

        if !tally.deleted {
            self.delete_previous(file_name, table, tally)?;
        }

        let written = self.storage.bulk_insert(table, batch).map_err(|e| {
            Error::load_failure(file_name, tally.rows_accepted, format!("batch insert failed: {}", e))
        })?;

        tally.rows_accepted += written as u64;
        tally.batches_flushed += 1;
        batch.clear();
        debug!(
            "{}: flushed batch {} ({} rows, {} total)",
            file_name, tally.batches_flushed, written, tally.rows_accepted
        );

        tally.job.transition(LoadState::Streaming)
    }

    #[allow(clippy::too_many_arguments)]
    fn outcome(
        &self,
        file_name: &str,
        file_type: FileType,
        schema_name: &str,
        loaded_at: DateTime<Utc>,
        started: Instant,
        tally: Tally,
        error: Option<String>,
    ) -> LoadOutcome {
        let status = if tally.job.state() == LoadState::Complete {
            LoadStatus::Complete
        } else {
            LoadStatus::Failed
        };

        let entry = ProvenanceEntry {
            source_file: file_name.to_string(),
            file_type: Some(file_type),
            loaded_at,
            schema: Some(schema_name.to_string()),
            rows_read: tally.rows_read,
            rows_accepted: tally.rows_accepted,
            rows_rejected: tally.rows_rejected,
            status,
            elapsed_ms: started.elapsed().as_millis() as u64,
            resumed_from: self.options.is_resume().then_some(self.options.resume_from),
            error,
        };

        info!("{}", entry.summary());

        LoadOutcome {
            entry,
            state: tally.job.state(),
            history: tally.job.history().to_vec(),
            batches_flushed: tally.batches_flushed,
            rows_deleted: tally.rows_deleted,
            rejected_sample: tally.rejected_sample,
        }
    }
}
