//! Gemini backend for the Google Generative Language API.
//!
//! Supports both a single blocking `generateContent` call and the SSE
//! `streamGenerateContent` mode; streamed chunks are accumulated in
//! order and a request only completes when the stream is exhausted.
//! There is no automatic retry here; a failed call surfaces to the
//! orchestrator, which fail-stops the run.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{GeneratedText, GenerationRequest, TextGenerator};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Environment variables checked for an API key, in priority order
const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "AI_STUDIO_API", "GOOGLE_API_KEY"];

/// Resolve the API key from the environment with fallbacks:
/// env vars, then `~/.gemini_api_key`, then a local `.env` file.
pub fn resolve_api_key() -> Result<String> {
    for var in API_KEY_VARS {
        if let Ok(key) = std::env::var(var) {
            if !key.trim().is_empty() {
                debug!(source = var, "API key found in environment");
                return Ok(key.trim().to_string());
            }
        }
    }

    if let Some(home) = dirs::home_dir() {
        let key_file = home.join(".gemini_api_key");
        if let Ok(content) = std::fs::read_to_string(&key_file) {
            let key = content.trim();
            if !key.is_empty() {
                debug!(path = %key_file.display(), "API key found in key file");
                return Ok(key.to_string());
            }
        }
    }

    if let Some(key) = read_key_from_dotenv(&PathBuf::from(".env")) {
        debug!("API key found in .env file");
        return Ok(key);
    }

    anyhow::bail!(
        "No API key available. Set one of {} or create ~/.gemini_api_key",
        API_KEY_VARS.join(", ")
    )
}

/// Scan a dotenv-style file for one of the known key names
fn read_key_from_dotenv(path: &std::path::Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    for line in content.lines() {
        let Some((name, value)) = line.split_once('=') else {
            continue;
        };
        if API_KEY_VARS.contains(&name.trim()) {
            let key = value.trim().trim_matches('"').trim_matches('\'');
            if !key.is_empty() {
                return Some(key.to_string());
            }
        }
    }
    None
}

/// Gemini text-generation backend
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    streaming: bool,
    max_output_tokens: u32,
}

impl GeminiGenerator {
    /// Create a generator with an explicit API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            streaming: false,
            max_output_tokens: 8192,
        }
    }

    /// Create a generator resolving the API key from the environment
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(resolve_api_key()?))
    }

    /// Override the model id (default: gemini-2.0-flash)
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Use the SSE streaming endpoint instead of the blocking one
    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Override the API base URL (tests, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the request payload for a generation call
    fn build_request_body(&self, request: &GenerationRequest) -> Value {
        let mut body = json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": request.user_text() }]
                }
            ],
            "generationConfig": {
                "temperature": request.temperature,
                "topP": 0.95,
                "topK": 64,
                "maxOutputTokens": self.max_output_tokens,
            }
        });

        if let Some(system) = request.system_text() {
            body["system_instruction"] = json!({ "parts": [{ "text": system }] });
        }

        body
    }

    async fn generate_blocking(&self, request: &GenerationRequest) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.build_request_body(request))
            .send()
            .await
            .context("Failed to reach the Gemini API")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API returned {}: {}", status, detail.trim());
        }

        let payload: Value = response
            .json()
            .await
            .context("Gemini response is not valid JSON")?;

        extract_text(&payload)
    }

    async fn generate_streaming(&self, request: &GenerationRequest) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        );

        let mut response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.build_request_body(request))
            .send()
            .await
            .context("Failed to reach the Gemini API")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API returned {}: {}", status, detail.trim());
        }

        // Accumulate SSE events until the stream is exhausted. A line
        // may be split across network chunks, so keep a carry buffer.
        let mut output = String::new();
        let mut buffer = String::new();

        while let Some(chunk) = response
            .chunk()
            .await
            .context("Error while reading the Gemini stream")?
        {
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(newline) = buffer.find('\n') {
                let line: String = buffer.drain(..=newline).collect();
                if let Some(text) = parse_sse_line(line.trim_end())? {
                    output.push_str(&text);
                }
            }
        }

        if let Some(text) = parse_sse_line(buffer.trim_end())? {
            output.push_str(&text);
        }

        Ok(output)
    }
}

/// Parse one SSE line; returns the text fragment of a data event
fn parse_sse_line(line: &str) -> Result<Option<String>> {
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(None);
    };
    let data = data.trim();
    if data.is_empty() {
        return Ok(None);
    }

    let payload: Value =
        serde_json::from_str(data).context("Gemini stream chunk is not valid JSON")?;

    // Stream chunks may carry empty candidates between text fragments
    Ok(extract_text(&payload).ok())
}

/// Concatenate the text parts of the first candidate
fn extract_text(payload: &Value) -> Result<String> {
    let parts = payload
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .context("Gemini response has no candidate content")?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();

    if text.is_empty() {
        anyhow::bail!("Gemini response contained no text");
    }

    Ok(text)
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        timeout: Duration,
    ) -> Result<GeneratedText> {
        let call = async {
            if self.streaming {
                self.generate_streaming(request).await
            } else {
                self.generate_blocking(request).await
            }
        };

        let content = tokio::time::timeout(timeout, call)
            .await
            .with_context(|| {
                format!(
                    "Gemini call for model '{}' timed out after {:?}",
                    self.model, timeout
                )
            })??;

        Ok(GeneratedText::new(content))
    }

    async fn health_check(&self) -> Result<()> {
        let url = format!("{}/v1beta/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .context("Failed to run Gemini health check")?;

        if !response.status().is_success() {
            anyhow::bail!("Gemini health check failed: {}", response.status());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::AgentSpec;

    fn request() -> GenerationRequest {
        let agent = AgentSpec::new("writer", "Press Release Writer", "Write drafts", "You write.")
            .with_temperature(0.4);
        GenerationRequest::for_agent(&agent, "Write the release.".to_string(), "two drafts")
    }

    #[test]
    fn test_request_body_shape() {
        let generator = GeminiGenerator::new("test-key");
        let body = generator.build_request_body(&request());

        // f32 temperatures widen to f64 in the payload
        assert_eq!(
            body.pointer("/generationConfig/temperature").unwrap(),
            &json!(0.4f32)
        );
        let user_text = body
            .pointer("/contents/0/parts/0/text")
            .and_then(Value::as_str)
            .unwrap();
        assert!(user_text.contains("Write the release."));
        assert!(user_text.contains("Expected output:\ntwo drafts"));

        let system = body
            .pointer("/system_instruction/parts/0/text")
            .and_then(Value::as_str)
            .unwrap();
        assert!(system.contains("You are Press Release Writer."));
    }

    #[test]
    fn test_extract_text_concatenates_parts() {
        let payload = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello " }, { "text": "world" }] }
            }]
        });
        assert_eq!(extract_text(&payload).unwrap(), "Hello world");
    }

    #[test]
    fn test_extract_text_rejects_empty_response() {
        let payload = json!({ "candidates": [{ "content": { "parts": [] } }] });
        assert!(extract_text(&payload).is_err());
        assert!(extract_text(&json!({})).is_err());
    }

    #[test]
    fn test_parse_sse_line() {
        let line = r#"data: {"candidates":[{"content":{"parts":[{"text":"chunk"}]}}]}"#;
        assert_eq!(parse_sse_line(line).unwrap().as_deref(), Some("chunk"));

        // Non-data and empty-data lines are skipped
        assert_eq!(parse_sse_line("event: ping").unwrap(), None);
        assert_eq!(parse_sse_line("data:").unwrap(), None);
        assert_eq!(parse_sse_line("").unwrap(), None);
    }

    #[test]
    fn test_parse_sse_line_rejects_garbage_json() {
        assert!(parse_sse_line("data: not-json").is_err());
    }

    #[test]
    fn test_dotenv_key_parsing() {
        use std::io::Write;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "OTHER=1").unwrap();
        writeln!(file, "AI_STUDIO_API=\"sk-test\"").unwrap();

        assert_eq!(read_key_from_dotenv(&path).as_deref(), Some("sk-test"));
    }
}
