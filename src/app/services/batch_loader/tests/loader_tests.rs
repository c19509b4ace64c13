//! Tests for batch loading

use super::*;
use crate::app::models::{FileType, LoadStatus};
use crate::app::services::batch_loader::{BatchLoader, LoadOptions, LoadState};
use crate::app::services::storage::{MemoryStorage, StorageOp};
use crate::Error;
use tokio_util::sync::CancellationToken;

const FILE: &str = "foidev2021.txt";

fn loader(storage: MemoryStorage) -> BatchLoader<MemoryStorage> {
    BatchLoader::new(storage, LoadOptions::default())
}

#[test]
fn test_batches_flushed_at_size_then_remainder() {
    let storage = MemoryStorage::new();
    let mut loader = loader(storage.clone());

    let outcome = loader.load(FILE, FileType::Device, "device-34", device_rows(25, FILE), 10);

    assert!(outcome.is_complete());
    assert_eq!(outcome.batches_flushed, 3);
    assert_eq!(outcome.entry.rows_read, 25);
    assert_eq!(outcome.entry.rows_accepted, 25);
    assert_eq!(outcome.entry.status, LoadStatus::Complete);
    assert_eq!(outcome.entry.schema.as_deref(), Some("device-34"));

    assert_eq!(
        storage.operations(),
        vec![
            StorageOp::Delete { table: "devices".to_string(), source_file: FILE.to_string(), rows: 0 },
            StorageOp::Insert { table: "devices".to_string(), rows: 10 },
            StorageOp::Insert { table: "devices".to_string(), rows: 10 },
            StorageOp::Insert { table: "devices".to_string(), rows: 5 },
            StorageOp::Checkpoint,
        ]
    );
}

/// Test that loading the same file twice leaves one generation
#[test]
fn test_reload_is_idempotent() {
    let storage = MemoryStorage::new();
    let mut loader = loader(storage.clone());

    loader.load(FILE, FileType::Device, "device-34", device_rows(12, FILE), 5);
    assert_eq!(storage.count("devices"), 12);

    let second = loader.load(FILE, FileType::Device, "device-34", device_rows(12, FILE), 5);
    assert_eq!(second.rows_deleted, 12);
    assert_eq!(storage.count("devices"), 12);

    // Another file's rows are untouched by the reload
    loader.load("foidev2020.txt", FileType::Device, "device-34", device_rows(3, "foidev2020.txt"), 5);
    loader.load(FILE, FileType::Device, "device-34", device_rows(12, FILE), 5);
    assert_eq!(storage.count_for_source("devices", "foidev2020.txt"), 3);
    assert_eq!(storage.count("devices"), 15);
}

#[test]
fn test_delete_issued_even_when_nothing_accepted() {
    let storage = MemoryStorage::new();
    let mut loader = loader(storage.clone());
    loader.load(FILE, FileType::Device, "device-34", device_rows(4, FILE), 10);

    let rows = vec![rejected(0), rejected(1)];
    let outcome = loader.load(FILE, FileType::Device, "device-34", rows, 10);

    assert!(outcome.is_complete());
    assert_eq!(outcome.batches_flushed, 0);
    assert_eq!(outcome.rows_deleted, 4);
    assert_eq!(storage.count("devices"), 0);

    let deletes = storage
        .operations()
        .iter()
        .filter(|op| matches!(op, StorageOp::Delete { .. }))
        .count();
    assert_eq!(deletes, 2);
}

#[test]
fn test_rejected_rows_counted_and_sampled() {
    let storage = MemoryStorage::new();
    let mut loader = BatchLoader::new(
        storage.clone(),
        LoadOptions {
            diagnostic_sample_size: 2,
            ..LoadOptions::default()
        },
    );

    let mut rows = device_rows(3, FILE);
    rows.extend((10..15).map(rejected));

    let outcome = loader.load(FILE, FileType::Device, "device-34", rows, 100);
    assert_eq!(outcome.entry.rows_read, 8);
    assert_eq!(outcome.entry.rows_accepted, 3);
    assert_eq!(outcome.entry.rows_rejected, 5);
    assert_eq!(outcome.rejected_sample.len(), 2);
    assert_eq!(outcome.rejected_sample[0].row_index, 10);
}

/// Test that a failed insert keeps earlier batches and abandons the current one
#[test]
fn test_storage_failure_keeps_flushed_batches() {
    let mut loader = BatchLoader::new(FailingStorage::new(2), LoadOptions::default());

    let outcome = loader.load(FILE, FileType::Device, "device-34", device_rows(25, FILE), 10);

    assert_eq!(outcome.state, LoadState::Failed);
    assert_eq!(outcome.entry.status, LoadStatus::Failed);
    assert_eq!(outcome.entry.rows_accepted, 10);
    assert_eq!(outcome.entry.rows_read, 20);
    assert!(outcome.entry.error.as_deref().unwrap_or("").contains("disk full"));
    assert_eq!(loader.storage().inner.count("devices"), 10);
    assert!(!outcome.history.contains(&LoadState::Checkpointed));

    match outcome.into_result() {
        Err(Error::LoadFailure { file, rows_accepted, .. }) => {
            assert_eq!(file, FILE);
            assert_eq!(rows_accepted, 10);
        }
        other => panic!("expected load failure, got {:?}", other.map(|o| o.state)),
    }
}

#[test]
fn test_checkpoint_failure_fails_load() {
    let mut storage = FailingStorage::new(usize::MAX);
    storage.fail_checkpoint = true;
    let mut loader = BatchLoader::new(storage, LoadOptions::default());

    let outcome = loader.load(FILE, FileType::Device, "device-34", device_rows(5, FILE), 10);
    assert_eq!(outcome.state, LoadState::Failed);
    assert_eq!(outcome.entry.rows_accepted, 5);
}

#[test]
fn test_stream_error_fails_load() {
    let storage = MemoryStorage::new();
    let mut loader = loader(storage.clone());

    let mut rows = device_rows(3, FILE);
    rows.push(Err(Error::processing_interrupted("read error")));
    rows.extend(device_rows(3, FILE));

    let outcome = loader.load(FILE, FileType::Device, "device-34", rows, 2);
    assert_eq!(outcome.state, LoadState::Failed);
    assert_eq!(outcome.entry.rows_read, 3);
    assert_eq!(outcome.entry.rows_accepted, 2);
    assert_eq!(storage.count("devices"), 2);
}

/// Test that cancellation is observed only at batch boundaries
#[test]
fn test_cancellation_discards_in_flight_batch() {
    let storage = MemoryStorage::new();
    let token = CancellationToken::new();
    let mut loader = loader(storage.clone()).with_cancellation(token.clone());

    let cancel = token.clone();
    let rows = (0..30).map(move |i| {
        if i == 15 {
            cancel.cancel();
        }
        accepted(i, FILE)
    });

    let outcome = loader.load(FILE, FileType::Device, "device-34", rows, 10);
    assert_eq!(outcome.state, LoadState::Failed);
    assert_eq!(outcome.batches_flushed, 1);
    assert_eq!(storage.count("devices"), 10);
    assert!(outcome.entry.error.as_deref().unwrap_or("").contains("cancelled"));
}

#[test]
fn test_zero_batch_size_uses_default() {
    let storage = MemoryStorage::new();
    let mut loader = loader(storage.clone());
    let outcome = loader.load(FILE, FileType::Device, "device-34", device_rows(3, FILE), 0);
    assert_eq!(outcome.batches_flushed, 1);
}

/// Test that a resumed load appends instead of replacing the earlier rows
#[test]
fn test_resume_skips_generation_delete() {
    let storage = MemoryStorage::new();
    loader(storage.clone()).load(FILE, FileType::Device, "device-34", device_rows(10, FILE), 4);

    let mut resumed = BatchLoader::new(
        storage.clone(),
        LoadOptions {
            resume_from: 10,
            ..LoadOptions::default()
        },
    );
    let rows = (10..15).map(|i| accepted(i, FILE));
    let outcome = resumed.load(FILE, FileType::Device, "device-34", rows, 4);

    assert!(outcome.is_complete());
    assert_eq!(outcome.rows_deleted, 0);
    assert_eq!(outcome.entry.rows_accepted, 5);
    assert_eq!(outcome.entry.resumed_from, Some(10));
    assert_eq!(storage.count_for_source("devices", FILE), 15);

    let deletes = storage
        .operations()
        .iter()
        .filter(|op| matches!(op, StorageOp::Delete { .. }))
        .count();
    assert_eq!(deletes, 1);
}
