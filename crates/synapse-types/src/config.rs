use serde::{Deserialize, Serialize};

use crate::{Result, SynapseError};

/// Top-level simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub generation: GenerationConfig,
    pub retry: RetryConfig,
    pub pacing: PacingConfig,
    pub tick_interval_ms: u64,
    /// Delay between a restart's clear and the resumed run
    pub restart_settle_ms: u64,
    pub default_duration_secs: u64,
    pub max_agents: usize,
    /// Non-system messages considered when picking a reply target
    pub target_window: usize,
    pub reply_probability: f64,
    /// Non-system messages quoted in a turn prompt
    pub history_window: usize,
    /// Consolidate an agent's memory every N messages it authors
    pub memory_cadence: usize,
    /// Transcript entries handed to a consolidation
    pub memory_window: usize,
    pub memory_word_budget: usize,
    pub report_window: usize,
    pub min_report_messages: usize,
    pub report_word_budget: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            retry: RetryConfig::default(),
            pacing: PacingConfig::default(),
            tick_interval_ms: 1000,
            restart_settle_ms: 50,
            default_duration_secs: 300,
            max_agents: 10,
            target_window: 8,
            reply_probability: 0.8,
            history_window: 12,
            memory_cadence: 3,
            memory_window: 6,
            memory_word_budget: 80,
            report_window: 120,
            min_report_messages: 5,
            report_word_budget: 80,
        }
    }
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(SynapseError::Config("retry.max_attempts must be at least 1".to_string()));
        }
        if self.pacing.min_delay_ms > self.pacing.max_delay_ms {
            return Err(SynapseError::Config(format!(
                "pacing window is inverted: {}ms > {}ms",
                self.pacing.min_delay_ms, self.pacing.max_delay_ms
            )));
        }
        if !(0.0..=1.0).contains(&self.reply_probability) {
            return Err(SynapseError::Config(format!(
                "reply_probability must be within 0..=1, got {}",
                self.reply_probability
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(SynapseError::Config("tick_interval_ms must be positive".to_string()));
        }
        if self.memory_cadence == 0 || self.max_agents == 0 || self.default_duration_secs == 0 {
            return Err(SynapseError::Config(
                "memory_cadence, max_agents and default_duration_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub backend: GenerationBackend,
    /// Full URL for the form endpoint, base URL for OpenAI-compatible providers
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            backend: GenerationBackend::FormEndpoint,
            endpoint: String::new(),
            api_key: String::new(),
            model: "deepseek-chat".to_string(),
            max_tokens: 512,
            temperature: 0.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationBackend {
    /// `POST` a multipart form with a `prompt` field, read `{"response": ...}`
    FormEndpoint,
    /// OpenAI chat completions protocol
    OpenAiCompat,
}

impl GenerationBackend {
    pub fn label(&self) -> &str {
        match self {
            GenerationBackend::FormEndpoint => "Form endpoint",
            GenerationBackend::OpenAiCompat => "OpenAI-compatible",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            initial_delay_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 4000,
            max_delay_ms: 10000,
        }
    }
}
