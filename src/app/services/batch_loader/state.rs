//! Load job lifecycle

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage of a single file load
///
/// ```text
/// Pending -> SchemaDetected -> Streaming <-> Flushing
///                              Streaming -> Checkpointed -> Complete
/// any non-terminal state -> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    Pending,
    SchemaDetected,
    Streaming,
    Flushing,
    Checkpointed,
    Complete,
    Failed,
}

impl LoadState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadState::Complete | LoadState::Failed)
    }

    pub fn can_transition_to(&self, next: LoadState) -> bool {
        use LoadState::*;

        match (self, next) {
            (Complete | Failed, _) => false,
            (_, Failed) => true,
            (Pending, SchemaDetected)
            | (SchemaDetected, Streaming)
            | (Streaming, Flushing)
            | (Flushing, Streaming)
            | (Streaming, Checkpointed)
            | (Checkpointed, Complete) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoadState::Pending => "pending",
            LoadState::SchemaDetected => "schema_detected",
            LoadState::Streaming => "streaming",
            LoadState::Flushing => "flushing",
            LoadState::Checkpointed => "checkpointed",
            LoadState::Complete => "complete",
            LoadState::Failed => "failed",
        }
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State tracker for one load, refusing illegal transitions
#[derive(Debug, Clone)]
pub struct LoadJob {
    state: LoadState,
    history: Vec<LoadState>,
}

impl LoadJob {
    pub fn new() -> Self {
        Self {
            state: LoadState::Pending,
            history: vec![LoadState::Pending],
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Every state visited, including the current one
    pub fn history(&self) -> &[LoadState] {
        &self.history
    }

    pub fn transition(&mut self, next: LoadState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(Error::invalid_transition(self.state.as_str(), next.as_str()));
        }
        self.state = next;
        self.history.push(next);
        Ok(())
    }

    /// Move to `Failed` unless the job already finished
    pub fn fail(&mut self) {
        if !self.state.is_terminal() {
            self.state = LoadState::Failed;
            self.history.push(LoadState::Failed);
        }
    }
}

impl Default for LoadJob {
    fn default() -> Self {
        Self::new()
    }
}
