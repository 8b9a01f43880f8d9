//! Domain types for the persflow orchestrator.
//!
//! - Agents: personas bound to the generation backend
//! - Stages: the fixed pipeline definition
//! - Context: the per-run input bundle
//! - Results: per-stage records and the append-only ledger
//! - Run: the per-run summary report

pub mod agent;
pub mod context;
pub mod result;
pub mod run;
pub mod stage;

// Re-export commonly used types
pub use agent::{AgentSet, AgentSpec};
pub use context::PipelineContext;
pub use result::{ExecutionResult, Ledger, StageStatus};
pub use run::{RunReport, RunState};
pub use stage::{PipelineSpec, StageSpec};
