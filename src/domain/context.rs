//! Shared input bundle for one pipeline run.
//!
//! The context is assembled once (source corpus, user brief, system
//! prompt with any addenda already appended) and injected read-only
//! into every stage's template.

use serde::{Deserialize, Serialize};

use crate::core::error::PipelineError;

/// Immutable per-run input bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineContext {
    /// Raw reference dataset (JSON corpus of press articles)
    pub source_data: String,

    /// The requested topic/angle from the user
    pub user_brief: String,

    /// Assembled persona/behavioral instructions, including any
    /// hyperlink and topic addenda
    pub system_prompt: String,
}

impl PipelineContext {
    pub fn new(
        source_data: impl Into<String>,
        user_brief: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            source_data: source_data.into(),
            user_brief: user_brief.into(),
            system_prompt: system_prompt.into(),
        }
    }

    /// Precondition gate: all three fields must be non-empty for a run
    /// to start. Violation is fatal, not a per-stage error.
    pub fn ensure_complete(&self) -> Result<(), PipelineError> {
        for (field, value) in [
            ("source_data", &self.source_data),
            ("user_brief", &self.user_brief),
            ("system_prompt", &self.system_prompt),
        ] {
            if value.trim().is_empty() {
                return Err(PipelineError::Precondition { field });
            }
        }
        Ok(())
    }

    /// Render the whole bundle as one block, used by the `{context}`
    /// template placeholder.
    pub fn as_block(&self) -> String {
        format!(
            "Source data:\n{}\n\nUser brief:\n{}\n\nSystem instructions:\n{}",
            self.source_data, self.user_brief, self.system_prompt
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_context_passes() {
        let ctx = PipelineContext::new("[]", "brief", "prompt");
        assert!(ctx.ensure_complete().is_ok());
    }

    #[test]
    fn test_empty_field_is_precondition_failure() {
        let ctx = PipelineContext::new("[]", "   ", "prompt");
        match ctx.ensure_complete() {
            Err(PipelineError::Precondition { field }) => assert_eq!(field, "user_brief"),
            other => panic!("expected precondition failure, got {:?}", other),
        }
    }

    #[test]
    fn test_block_contains_all_fields() {
        let ctx = PipelineContext::new("DATA", "BRIEF", "PROMPT");
        let block = ctx.as_block();
        assert!(block.contains("DATA"));
        assert!(block.contains("BRIEF"));
        assert!(block.contains("PROMPT"));
    }
}
