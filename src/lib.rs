//! persflow - multi-agent press release pipeline orchestrator
//!
//! Turns a JSON corpus of press articles and a user brief into a
//! polished, HTML-formatted press release by running a fixed pipeline
//! of agent personas against a text-generation backend.
//!
//! # Architecture
//!
//! - Stages execute strictly in declared order; each stage's template
//!   is rendered with the shared run context plus the outputs of its
//!   declared upstream stages
//! - The run is fail-stop: a failed stage halts the pipeline and no
//!   downstream stage executes
//! - Per-stage results land in an append-only ledger; the terminal
//!   stage's output is the pipeline artifact
//!
//! # Modules
//!
//! - `adapters`: text-generation backends (Gemini)
//! - `core`: orchestration logic (Orchestrator, templates, topics)
//! - `domain`: data structures (agents, stages, context, results)
//! - `press`: the fixed seven-stage press-release pipeline
//! - `ingest`: project layout and context assembly
//! - `cli`: command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Run the pipeline against a project directory
//! persflow run ./publish_flow
//!
//! # Validate a project without calling the backend
//! persflow check ./publish_flow
//!
//! # Probe topic detection
//! persflow topic "Nieuwe regels rond registratierecht"
//! ```

pub mod adapters;
pub mod cli;
pub mod core;
pub mod domain;
pub mod ingest;
pub mod press;

// Re-export main types at crate root for convenience
pub use adapters::{GeneratedText, GenerationRequest, TextGenerator};
pub use core::{Orchestrator, PipelineError, TopicRuleset};
pub use domain::{
    AgentSet, AgentSpec, ExecutionResult, Ledger, PipelineContext, PipelineSpec, RunReport,
    RunState, StageSpec, StageStatus,
};
pub use ingest::{ContextLoader, LoadedContext, ProjectLayout};
