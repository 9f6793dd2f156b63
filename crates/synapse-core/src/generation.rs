//! Generation client: turns, memory consolidation and report fields,
//! each wrapped in the retry adapter.

use std::rc::Rc;

use synapse_types::agent::Agent;
use synapse_types::message::Message;
use synapse_types::report::{clamp_words, to_plain_text, ReportField};
use synapse_types::{Result, SynapseError};

use crate::ports::{GenerationPort, TimerPort};
use crate::prompts::{self, TurnContext, SILENT_FILLER};
use crate::retry::{with_retry, RetryPolicy};

pub struct GenerationClient {
    port: Rc<dyn GenerationPort>,
    timer: Rc<dyn TimerPort>,
    policy: RetryPolicy,
}

impl GenerationClient {
    pub fn new(port: Rc<dyn GenerationPort>, timer: Rc<dyn TimerPort>, policy: RetryPolicy) -> Self {
        Self {
            port,
            timer,
            policy,
        }
    }

    pub fn backend_name(&self) -> &str {
        self.port.backend_name()
    }

    /// One agent statement. An empty response becomes the silent filler.
    pub async fn agent_reply(&self, ctx: &TurnContext) -> Result<String> {
        let prompt = prompts::turn_prompt(ctx);
        let text = self.call("agent reply", &prompt).await?;
        if text.is_empty() {
            Ok(SILENT_FILLER.to_string())
        } else {
            Ok(text)
        }
    }

    /// Fold `observations` into the agent's summary. With fewer than
    /// `min_observations` entries no call is made and the prior summary
    /// comes back unchanged.
    pub async fn consolidate_memory(
        &self,
        agent: &Agent,
        observations: &[Message],
        min_observations: usize,
        word_budget: usize,
    ) -> Result<String> {
        if observations.len() < min_observations {
            return Ok(agent.memory_summary.clone());
        }
        let prompt = prompts::memory_prompt(agent, observations, word_budget);
        let text = self.call("memory update", &prompt).await?;
        if text.is_empty() {
            Ok(agent.memory_summary.clone())
        } else {
            Ok(text)
        }
    }

    /// One analytical field, reduced to plain text within `word_budget` words.
    /// An empty answer counts as a failed attempt.
    pub async fn report_field(
        &self,
        field: ReportField,
        topic: &str,
        roster: &[String],
        transcript: &[Message],
        word_budget: usize,
    ) -> Result<String> {
        let prompt = prompts::report_prompt(field, topic, roster, transcript, word_budget);
        let port = &self.port;
        let prompt = prompt.as_str();
        let text = with_retry(&self.policy, self.timer.as_ref(), field.key(), || async move {
            let raw = port.generate(prompt).await?;
            let text = clamp_words(&to_plain_text(&raw), word_budget);
            if text.is_empty() {
                Err(SynapseError::Generation(format!("empty response for {}", field.key())))
            } else {
                Ok(text)
            }
        })
        .await?;
        log::debug!("report field {}: {}", field.key(), text);
        Ok(text)
    }

    async fn call(&self, label: &str, prompt: &str) -> Result<String> {
        let port = &self.port;
        with_retry(&self.policy, self.timer.as_ref(), label, || async move {
            port.generate(prompt).await.map(|text| text.trim().to_string())
        })
        .await
    }
}
