//! The fixed press-release pipeline: seven personas, seven stages.

pub mod agents;
pub mod stages;

pub use agents::agents;
pub use stages::pipeline;

use crate::domain::{AgentSet, PipelineSpec};

/// Build the press-release crew and pipeline for one run
pub fn build() -> (PipelineSpec, AgentSet) {
    (pipeline(), agents())
}
