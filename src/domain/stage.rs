//! Pipeline and stage definitions.
//!
//! A pipeline is a fixed, ordered sequence of stages. Each stage is
//! bound to one agent and declares which upstream outputs it consumes.
//! Everything that can go wrong with a definition is rejected at
//! construction time by [`PipelineSpec::validate`], not at run time.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::error::PipelineError;
use crate::core::template;

use super::agent::AgentSet;

/// One step of the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageSpec {
    /// Stage id, unique within the pipeline (e.g. "fact_check")
    pub id: String,

    /// Agent that executes this stage
    pub agent_id: String,

    /// Instruction template with `{name}` placeholders; `name` is a
    /// context field or `<upstream_id>.output`
    pub description_template: String,

    /// Stages whose output must be available before this one runs.
    /// Empty only for the first stage.
    pub upstream_ids: Vec<String>,

    /// Human-readable acceptance criterion, passed to the backend as a
    /// quality hint (not mechanically validated)
    pub expected_output: String,
}

impl StageSpec {
    pub fn new(
        id: impl Into<String>,
        agent_id: impl Into<String>,
        description_template: impl Into<String>,
        expected_output: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            agent_id: agent_id.into(),
            description_template: description_template.into(),
            upstream_ids: Vec::new(),
            expected_output: expected_output.into(),
        }
    }

    /// Declare the upstream stages this one consumes
    pub fn with_upstream(mut self, upstream_ids: &[&str]) -> Self {
        self.upstream_ids = upstream_ids.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// A complete pipeline definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSpec {
    /// Pipeline name (used in logs and the run report)
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// Ordered stages; execution follows declaration order
    pub stages: Vec<StageSpec>,
}

impl PipelineSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            stages: Vec::new(),
        }
    }

    pub fn with_stage(mut self, stage: StageSpec) -> Self {
        self.stages.push(stage);
        self
    }

    /// Get a stage by id
    pub fn get_stage(&self, id: &str) -> Option<&StageSpec> {
        self.stages.iter().find(|s| s.id == id)
    }

    /// The terminal stage, whose output is the pipeline result
    pub fn terminal_stage(&self) -> Option<&StageSpec> {
        self.stages.last()
    }

    /// Validate the definition before any run:
    ///
    /// - at least one stage, ids unique
    /// - upstream references point only to strictly earlier stages
    ///   (no forward references, hence no cycles)
    /// - every agent id resolves against the agent set
    /// - every template placeholder resolves to a context field or a
    ///   declared upstream output
    pub fn validate(&self, agents: &AgentSet) -> Result<(), PipelineError> {
        if self.stages.is_empty() {
            return Err(PipelineError::EmptyPipeline);
        }

        let mut seen: HashSet<&str> = HashSet::new();

        for stage in &self.stages {
            if !seen.insert(&stage.id) {
                return Err(PipelineError::DuplicateStage {
                    stage: stage.id.clone(),
                });
            }

            if !agents.contains(&stage.agent_id) {
                return Err(PipelineError::UnknownAgent {
                    stage: stage.id.clone(),
                    agent: stage.agent_id.clone(),
                });
            }

            for upstream in &stage.upstream_ids {
                // `seen` already contains this stage's own id
                if upstream == &stage.id || !seen.contains(upstream.as_str()) {
                    return Err(PipelineError::ForwardReference {
                        stage: stage.id.clone(),
                        upstream: upstream.clone(),
                    });
                }
            }

            template::validate_template(&stage.id, &stage.description_template, &stage.upstream_ids)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::AgentSpec;

    fn agents() -> AgentSet {
        AgentSet::new(vec![
            AgentSpec::new("strategist", "Strategist", "plan", "bg"),
            AgentSpec::new("writer", "Writer", "write", "bg"),
        ])
    }

    fn chain() -> PipelineSpec {
        PipelineSpec::new("test", "two-stage chain")
            .with_stage(StageSpec::new(
                "strategy",
                "strategist",
                "Plan from {context}.",
                "a plan",
            ))
            .with_stage(
                StageSpec::new(
                    "writing",
                    "writer",
                    "Write using {strategy.output} and {user_brief}.",
                    "a draft",
                )
                .with_upstream(&["strategy"]),
            )
    }

    #[test]
    fn test_valid_chain() {
        assert!(chain().validate(&agents()).is_ok());
    }

    #[test]
    fn test_empty_pipeline_rejected() {
        let pipeline = PipelineSpec::new("empty", "no stages");
        assert!(matches!(
            pipeline.validate(&agents()),
            Err(PipelineError::EmptyPipeline)
        ));
    }

    #[test]
    fn test_forward_reference_rejected() {
        let pipeline = PipelineSpec::new("bad", "forward ref")
            .with_stage(
                StageSpec::new("strategy", "strategist", "Plan {context}.", "plan")
                    .with_upstream(&["writing"]),
            )
            .with_stage(StageSpec::new("writing", "writer", "Write {context}.", "draft"));

        match pipeline.validate(&agents()) {
            Err(PipelineError::ForwardReference { stage, upstream }) => {
                assert_eq!(stage, "strategy");
                assert_eq!(upstream, "writing");
            }
            other => panic!("expected forward reference error, got {:?}", other),
        }
    }

    #[test]
    fn test_self_reference_rejected() {
        let pipeline = PipelineSpec::new("bad", "self ref").with_stage(
            StageSpec::new("strategy", "strategist", "Plan {context}.", "plan")
                .with_upstream(&["strategy"]),
        );
        assert!(matches!(
            pipeline.validate(&agents()),
            Err(PipelineError::ForwardReference { .. })
        ));
    }

    #[test]
    fn test_unknown_agent_rejected() {
        let pipeline = PipelineSpec::new("bad", "unknown agent")
            .with_stage(StageSpec::new("strategy", "ghost", "Plan {context}.", "plan"));
        assert!(matches!(
            pipeline.validate(&agents()),
            Err(PipelineError::UnknownAgent { .. })
        ));
    }

    #[test]
    fn test_duplicate_stage_rejected() {
        let pipeline = PipelineSpec::new("bad", "dup")
            .with_stage(StageSpec::new("strategy", "strategist", "A {context}.", "x"))
            .with_stage(StageSpec::new("strategy", "writer", "B {context}.", "y"));
        assert!(matches!(
            pipeline.validate(&agents()),
            Err(PipelineError::DuplicateStage { .. })
        ));
    }

    #[test]
    fn test_undeclared_upstream_placeholder_rejected() {
        // Template references a stage output that is not in upstream_ids
        let pipeline = PipelineSpec::new("bad", "undeclared placeholder")
            .with_stage(StageSpec::new("strategy", "strategist", "Plan {context}.", "plan"))
            .with_stage(StageSpec::new(
                "writing",
                "writer",
                "Write using {strategy.output}.",
                "draft",
            ));

        assert!(matches!(
            pipeline.validate(&agents()),
            Err(PipelineError::UnresolvedPlaceholder { .. })
        ));
    }
}
