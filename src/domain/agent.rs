//! Agent personas bound to the text-generation backend.
//!
//! An agent is a named role/goal/backstory configuration with a
//! generation temperature. Agents are built once per run and are
//! immutable afterwards.

use serde::{Deserialize, Serialize};

/// A named persona executed by the generation backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Unique identifier within a run (e.g. "fact_checker")
    pub id: String,

    /// Role presented to the backend (e.g. "Fact Checker")
    pub role: String,

    /// What this agent is trying to achieve
    pub goal: String,

    /// Background framing for the persona
    pub backstory: String,

    /// Generation temperature in [0, 1]; lower = more constrained
    pub temperature: f32,

    /// Whether this agent may hand off sub-work to another persona
    pub allow_delegation: bool,
}

impl AgentSpec {
    /// Create an agent with the default temperature (0.7) and no delegation
    pub fn new(
        id: impl Into<String>,
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            temperature: 0.7,
            allow_delegation: false,
        }
    }

    /// Set the generation temperature, clamped to [0, 1]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 1.0);
        self
    }

    /// Allow this agent to delegate sub-work
    pub fn with_delegation(mut self, allow: bool) -> Self {
        self.allow_delegation = allow;
        self
    }
}

/// The set of agents available to one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentSet {
    agents: Vec<AgentSpec>,
}

impl AgentSet {
    /// Build an agent set from a list of specs
    pub fn new(agents: Vec<AgentSpec>) -> Self {
        Self { agents }
    }

    /// Look up an agent by id
    pub fn get(&self, id: &str) -> Option<&AgentSpec> {
        self.agents.iter().find(|a| a.id == id)
    }

    /// Check whether an agent id exists
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Iterate over all agents in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &AgentSpec> {
        self.agents.iter()
    }

    /// Number of agents in the set
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
