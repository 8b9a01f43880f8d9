//! Error taxonomy for pipeline definition and execution.
//!
//! Definition-time errors (`EmptyPipeline`, `DuplicateStage`,
//! `ForwardReference`, `UnknownAgent`, `UnresolvedPlaceholder`) are
//! raised by [`crate::domain::PipelineSpec::validate`] before any run
//! starts. `Precondition` is the run gate; `DependencyUnmet` and
//! `Backend` halt a run at the failing stage.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// Required context field missing or empty; the run never starts
    #[error("required context field '{field}' is empty")]
    Precondition { field: &'static str },

    /// A stage's required upstream result is absent or failed
    #[error("stage '{stage}' depends on '{upstream}' which has {reason}")]
    DependencyUnmet {
        stage: String,
        upstream: String,
        reason: String,
    },

    /// A template references a name that is neither a context field nor
    /// a declared upstream output
    #[error("stage '{stage}' template references unknown placeholder '{{{placeholder}}}'")]
    UnresolvedPlaceholder { stage: String, placeholder: String },

    /// The generation backend raised, timed out, or returned empty or
    /// malformed output
    #[error("generation backend failed in stage '{stage}' (agent '{agent}'): {detail}")]
    Backend {
        stage: String,
        agent: String,
        detail: String,
    },

    /// Stage bound to an agent id that is not in the agent set
    #[error("stage '{stage}' is bound to unknown agent '{agent}'")]
    UnknownAgent { stage: String, agent: String },

    /// Two stages share an id
    #[error("duplicate stage id '{stage}'")]
    DuplicateStage { stage: String },

    /// A stage references an upstream that is not declared strictly
    /// earlier in pipeline order
    #[error("stage '{stage}' references '{upstream}' which is not declared earlier in the pipeline")]
    ForwardReference { stage: String, upstream: String },

    /// A pipeline with no stages
    #[error("pipeline has no stages")]
    EmptyPipeline,
}
