//! Main orchestrator for pipeline execution.
//!
//! Executes stages strictly in declared order, resolving each stage's
//! upstream outputs from the run ledger before it starts. The system is
//! fail-stop: a failed stage halts the run and no downstream stage ever
//! executes, so a failed output is never fabricated or silently
//! skipped. Declared-order execution with a dependency-presence check
//! is sufficient because the graph is a chain with two fan-in joins;
//! a general topological scheduler would buy nothing here.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::adapters::{GenerationRequest, TextGenerator};
use crate::domain::{
    AgentSet, ExecutionResult, PipelineContext, PipelineSpec, RunReport, StageSpec,
};

use super::error::PipelineError;
use super::template;

const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(300);

/// Sequential pipeline executor bound to one generation backend
pub struct Orchestrator {
    generator: Arc<dyn TextGenerator>,
    stage_timeout: Duration,
}

impl Orchestrator {
    /// Create an orchestrator for the given backend
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            stage_timeout: DEFAULT_STAGE_TIMEOUT,
        }
    }

    /// Override the per-stage generation timeout (default: 5 minutes)
    pub fn with_stage_timeout(mut self, timeout: Duration) -> Self {
        self.stage_timeout = timeout;
        self
    }

    /// Execute a pipeline against a context and agent set.
    ///
    /// Precondition and definition errors return `Err` and the run
    /// never starts (no partial ledger). Stage-level failures return
    /// `Ok` with a report in `Failed` state carrying the ledger up to
    /// and including the failing stage.
    #[instrument(skip(self, pipeline, agents, context), fields(pipeline = %pipeline.name))]
    pub async fn run_pipeline(
        &self,
        pipeline: &PipelineSpec,
        agents: &AgentSet,
        context: &PipelineContext,
    ) -> Result<RunReport, PipelineError> {
        context.ensure_complete()?;
        pipeline.validate(agents)?;

        let run_id = Uuid::new_v4();
        info!(%run_id, backend = self.generator.name(), "Starting pipeline run");

        let mut report = RunReport::new(run_id, pipeline.name.clone());

        for stage in &pipeline.stages {
            // Resolve upstream outputs from the ledger. Under strict
            // sequential execution an unmet dependency means a broken
            // definition slipped through, but the check also guards any
            // future concurrent scheduling of independent branches.
            let upstream = match resolve_upstream(stage, &report) {
                Ok(upstream) => upstream,
                Err(err) => {
                    let detail = err.to_string();
                    report.ledger.push(ExecutionResult::failed(
                        &stage.id,
                        &stage.agent_id,
                        &detail,
                    ));
                    return Ok(self.halt(report, &stage.id, detail));
                }
            };

            let rendered =
                template::render(&stage.id, &stage.description_template, context, &upstream)?;

            let agent = agents
                .get(&stage.agent_id)
                .ok_or_else(|| PipelineError::UnknownAgent {
                    stage: stage.id.clone(),
                    agent: stage.agent_id.clone(),
                })?;

            debug!(stage = %stage.id, agent = %agent.id, "Executing stage");
            let request = GenerationRequest::for_agent(agent, rendered, &stage.expected_output);
            let started = Instant::now();

            let outcome = self.generator.generate(&request, self.stage_timeout).await;
            let duration_ms = started.elapsed().as_millis() as u64;

            match outcome {
                Ok(text) if !text.content.trim().is_empty() => {
                    info!(stage = %stage.id, duration_ms, "Stage completed");
                    report.ledger.push(
                        ExecutionResult::success(&stage.id, &agent.id, text.content)
                            .with_duration(duration_ms),
                    );
                }
                Ok(_) => {
                    let err = PipelineError::Backend {
                        stage: stage.id.clone(),
                        agent: agent.id.clone(),
                        detail: "backend returned empty output".to_string(),
                    };
                    let detail = err.to_string();
                    report.ledger.push(
                        ExecutionResult::failed(&stage.id, &agent.id, &detail)
                            .with_duration(duration_ms),
                    );
                    return Ok(self.halt(report, &stage.id, detail));
                }
                Err(backend_err) => {
                    let err = PipelineError::Backend {
                        stage: stage.id.clone(),
                        agent: agent.id.clone(),
                        detail: backend_err.to_string(),
                    };
                    let detail = err.to_string();
                    report.ledger.push(
                        ExecutionResult::failed(&stage.id, &agent.id, &detail)
                            .with_duration(duration_ms),
                    );
                    return Ok(self.halt(report, &stage.id, detail));
                }
            }
        }

        info!(%run_id, "Pipeline run completed");
        report.complete();
        Ok(report)
    }

    /// Fail-stop: mark the run failed at the given stage
    fn halt(&self, mut report: RunReport, stage_id: &str, detail: String) -> RunReport {
        error!(stage = %stage_id, %detail, "Run halted");
        report.fail(detail);
        report
    }
}

/// Collect the recorded outputs for a stage's upstream dependencies
fn resolve_upstream<'a>(
    stage: &'a StageSpec,
    report: &'a RunReport,
) -> Result<Vec<(&'a str, &'a str)>, PipelineError> {
    let mut upstream = Vec::with_capacity(stage.upstream_ids.len());

    for dep in &stage.upstream_ids {
        match report.ledger.get(dep) {
            Some(result) if result.is_success() => {
                upstream.push((dep.as_str(), result.output.as_str()));
            }
            Some(_) => {
                return Err(PipelineError::DependencyUnmet {
                    stage: stage.id.clone(),
                    upstream: dep.clone(),
                    reason: "a failed result".to_string(),
                });
            }
            None => {
                return Err(PipelineError::DependencyUnmet {
                    stage: stage.id.clone(),
                    upstream: dep.clone(),
                    reason: "no recorded result".to_string(),
                });
            }
        }
    }

    Ok(upstream)
}
