//! Run report: the per-run summary returned by the orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::result::Ledger;

/// Summary of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique identifier for this run
    pub id: Uuid,

    /// Name of the pipeline that was executed
    pub pipeline_name: String,

    /// Terminal state of the run
    pub state: RunState,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished (if it has)
    pub completed_at: Option<DateTime<Utc>>,

    /// Per-stage results in execution order
    pub ledger: Ledger,
}

impl RunReport {
    /// Start a new run record
    pub fn new(id: Uuid, pipeline_name: impl Into<String>) -> Self {
        Self {
            id,
            pipeline_name: pipeline_name.into(),
            state: RunState::Running,
            started_at: Utc::now(),
            completed_at: None,
            ledger: Ledger::new(),
        }
    }

    /// Mark the run as completed successfully
    pub fn complete(&mut self) {
        self.state = RunState::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Mark the run as failed with the given detail
    pub fn fail(&mut self, error: impl Into<String>) {
        self.state = RunState::Failed {
            error: error.into(),
        };
        self.completed_at = Some(Utc::now());
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.state, RunState::Completed)
    }

    /// Terminal output of the run: the last stage's text, only when the
    /// run completed. A failed run never yields partial output here.
    pub fn final_output(&self) -> Option<&str> {
        if !self.is_completed() {
            return None;
        }
        self.ledger
            .last()
            .filter(|r| r.is_success())
            .map(|r| r.output.as_str())
    }
}

/// State of a pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum RunState {
    /// Currently executing
    Running,

    /// Completed successfully
    Completed,

    /// Failed with error detail traceable to the failing stage
    Failed { error: String },
}
