//! Provenance sinks

use super::ProvenanceSink;
use crate::app::models::ProvenanceEntry;
use crate::{Error, Result};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// JSON-lines provenance log, one entry per line
#[derive(Debug, Clone)]
pub struct JsonlProvenanceLog {
    path: PathBuf,
}

impl JsonlProvenanceLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back every entry in append order
    pub fn read_all(&self) -> Result<Vec<ProvenanceEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.path).map_err(|e| {
            Error::io(format!("Failed to open provenance log {}", self.path.display()), e)
        })?;

        let mut entries = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            entries.push(serde_json::from_str(&line)?);
        }
        Ok(entries)
    }
}

impl ProvenanceSink for JsonlProvenanceLog {
    fn append(&mut self, entry: &ProvenanceEntry) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                Error::io(format!("Failed to open provenance log {}", self.path.display()), e)
            })?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

/// Provenance kept in memory; clones share the same entries
#[derive(Debug, Clone, Default)]
pub struct MemoryProvenanceLog {
    entries: Arc<Mutex<Vec<ProvenanceEntry>>>,
}

impl MemoryProvenanceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<ProvenanceEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl ProvenanceSink for MemoryProvenanceLog {
    fn append(&mut self, entry: &ProvenanceEntry) -> Result<()> {
        self.entries
            .lock()
            .map_err(|e| Error::storage(format!("Provenance log lock poisoned: {}", e)))?
            .push(entry.clone());
        Ok(())
    }
}
