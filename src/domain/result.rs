//! Per-stage execution records and the append-only run ledger.
//!
//! An `ExecutionResult` is created exactly once per stage per run and
//! never mutated. Downstream stages consume results by stage id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one stage execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Success,
    Failed,
}

/// Record of one stage's execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Stage that produced this record
    pub stage_id: String,

    /// Agent that executed the stage
    pub agent_id: String,

    /// Generated text (empty for failed stages)
    pub output: String,

    /// Success or failure
    pub status: StageStatus,

    /// Error detail for failed stages
    pub error: Option<String>,

    /// Wall-clock duration of the generation call
    pub duration_ms: Option<u64>,

    /// When the record was created
    pub created_at: DateTime<Utc>,
}

impl ExecutionResult {
    /// Record a successful stage
    pub fn success(
        stage_id: impl Into<String>,
        agent_id: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            stage_id: stage_id.into(),
            agent_id: agent_id.into(),
            output: output.into(),
            status: StageStatus::Success,
            error: None,
            duration_ms: None,
            created_at: Utc::now(),
        }
    }

    /// Record a failed stage
    pub fn failed(
        stage_id: impl Into<String>,
        agent_id: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            stage_id: stage_id.into(),
            agent_id: agent_id.into(),
            output: String::new(),
            status: StageStatus::Failed,
            error: Some(error.into()),
            duration_ms: None,
            created_at: Utc::now(),
        }
    }

    /// Attach the generation duration
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == StageStatus::Success
    }
}

/// Append-only record of stage results for one run.
///
/// Written by exactly one writer (the stage currently executing) and
/// read-only to everything else; no run shares a ledger with another.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    entries: Vec<ExecutionResult>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a result. Entries are never replaced or removed.
    pub fn push(&mut self, result: ExecutionResult) {
        self.entries.push(result);
    }

    /// Look up the result for a stage by id
    pub fn get(&self, stage_id: &str) -> Option<&ExecutionResult> {
        self.entries.iter().find(|r| r.stage_id == stage_id)
    }

    /// The last appended entry, if any
    pub fn last(&self) -> Option<&ExecutionResult> {
        self.entries.last()
    }

    /// The first failed entry, if any
    pub fn first_failure(&self) -> Option<&ExecutionResult> {
        self.entries.iter().find(|r| !r.is_success())
    }

    /// Entries in append order
    pub fn entries(&self) -> &[ExecutionResult] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
