//! Batch loading of canonical records into storage
//!
//! [`BatchLoader`] drives one file's records through the load lifecycle
//! tracked by [`LoadJob`]: a single delete of the file's previous records
//! before the first write, fixed-size bulk inserts and a final checkpoint.

pub mod loader;
pub mod progress;
pub mod state;

#[cfg(test)]
pub mod tests;

pub use loader::{BatchLoader, LoadOptions, LoadOutcome, RowOutcome};
pub use progress::LoadProgress;
pub use state::{LoadJob, LoadState};
