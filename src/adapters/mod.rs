//! Text-generation capability interface.
//!
//! The orchestrator treats the language-generation backend as an opaque
//! collaborator behind the [`TextGenerator`] trait: a rendered prompt
//! plus persona parameters go in, accumulated text comes out. Streaming
//! backends accumulate chunks until exhausted before returning.

pub mod gemini;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::agent::AgentSpec;

pub use gemini::{resolve_api_key, GeminiGenerator};

/// One generation request: persona, creativity and prompt
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Persona role (e.g. "Fact Checker"); empty for bare requests
    pub role: String,

    /// What the persona is trying to achieve
    pub goal: String,

    /// Background framing for the persona
    pub backstory: String,

    /// Generation temperature in [0, 1]
    pub temperature: f32,

    /// The rendered stage description
    pub prompt: String,

    /// Acceptance criterion passed through as a quality hint
    pub expected_output: Option<String>,

    /// Explicit system instruction; overrides persona composition
    pub system_instruction: Option<String>,

    /// Whether the persona may hand off sub-work (invocation policy
    /// hint for backends that support it)
    pub allow_delegation: bool,
}

impl GenerationRequest {
    /// Build a request for one stage executed by an agent
    pub fn for_agent(agent: &AgentSpec, prompt: String, expected_output: &str) -> Self {
        Self {
            role: agent.role.clone(),
            goal: agent.goal.clone(),
            backstory: agent.backstory.clone(),
            temperature: agent.temperature,
            prompt,
            expected_output: Some(expected_output.to_string()),
            system_instruction: None,
            allow_delegation: agent.allow_delegation,
        }
    }

    /// Build a bare request with an explicit system instruction, used
    /// by the degraded single-shot path that bypasses the staged
    /// pipeline.
    pub fn single_shot(prompt: String, system_instruction: String, temperature: f32) -> Self {
        Self {
            role: String::new(),
            goal: String::new(),
            backstory: String::new(),
            temperature: temperature.clamp(0.0, 1.0),
            prompt,
            expected_output: None,
            system_instruction: Some(system_instruction),
            allow_delegation: false,
        }
    }

    /// The system instruction for the backend: the explicit override if
    /// set, otherwise the persona composed into one block.
    pub fn system_text(&self) -> Option<String> {
        if let Some(ref explicit) = self.system_instruction {
            return Some(explicit.clone());
        }
        if self.role.is_empty() {
            return None;
        }
        Some(format!(
            "You are {role}. {backstory}\nYour personal goal is: {goal}",
            role = self.role,
            backstory = self.backstory,
            goal = self.goal
        ))
    }

    /// The user-facing text: the prompt plus the expected-output hint
    pub fn user_text(&self) -> String {
        match self.expected_output {
            Some(ref expected) if !expected.is_empty() => {
                format!("{}\n\nExpected output:\n{}", self.prompt, expected)
            }
            _ => self.prompt.clone(),
        }
    }
}

/// Accumulated output from a generation call
#[derive(Debug, Clone)]
pub struct GeneratedText {
    /// The generated content
    pub content: String,

    /// Tokens used, when the backend reports it
    pub tokens_used: Option<u64>,
}

impl GeneratedText {
    pub fn new(content: String) -> Self {
        Self {
            content,
            tokens_used: None,
        }
    }
}

/// Trait for text-generation backends
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Generate text for a request, accumulating any streamed chunks.
    /// Must complete (or fail) within `timeout`.
    async fn generate(&self, request: &GenerationRequest, timeout: Duration)
        -> Result<GeneratedText>;

    /// Check that the backend is reachable
    async fn health_check(&self) -> Result<()>;
}
