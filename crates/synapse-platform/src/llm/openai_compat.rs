//! OpenAI-compatible generation adapter.
//!
//! Works with DeepSeek, OpenAI, and any provider using the
//! OpenAI chat completions API format.
//! Uses browser `fetch()` via gloo-net for WASM compatibility.

use async_trait::async_trait;
use gloo_net::http::Request;
use serde::Deserialize;
use serde_json::{json, Value};

use synapse_core::ports::GenerationPort;
use synapse_types::{config::GenerationConfig, Result, SynapseError};

/// Sends each prompt as a single user message and returns the first choice.
/// Compatible with: DeepSeek, OpenAI, Groq, Together, Mistral, etc.
pub struct OpenAiCompatGenerator {
    config: GenerationConfig,
    base_url: String,
}

impl OpenAiCompatGenerator {
    pub fn new(config: GenerationConfig) -> Self {
        let base_url = config.endpoint.trim().trim_end_matches('/').to_string();
        Self { config, base_url }
    }

    pub fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    pub fn request_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
        })
    }
}

#[async_trait(?Send)]
impl GenerationPort for OpenAiCompatGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = self.request_body(prompt);

        let response = Request::post(&self.completions_url())
            .header("Content-Type", "application/json")
            .header("Authorization", &format!("Bearer {}", self.config.api_key))
            .json(&body)
            .map_err(|e| SynapseError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| SynapseError::Network(e.to_string()))?;

        if !response.ok() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(SynapseError::Generation(format!("HTTP {}: {}", status, text)));
        }

        let data: ApiResponse = response
            .json()
            .await
            .map_err(|e| SynapseError::Generation(e.to_string()))?;

        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SynapseError::Generation("No choices in response".to_string()))?;

        Ok(choice.message.content.unwrap_or_default().trim().to_string())
    }

    fn backend_name(&self) -> &str {
        "openai-compat"
    }
}

// ─── API response types ──────────────────────────────────────

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
}
