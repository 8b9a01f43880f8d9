//! Core orchestration logic.
//!
//! This module contains:
//! - Orchestrator: the sequential execution engine
//! - Template: placeholder rendering for stage descriptions
//! - Topic: keyword-based addendum selection
//! - Error: the closed failure taxonomy

pub mod error;
pub mod orchestrator;
pub mod template;
pub mod topic;

// Re-export commonly used types
pub use error::PipelineError;
pub use orchestrator::Orchestrator;
pub use topic::{TopicRule, TopicRuleset};
