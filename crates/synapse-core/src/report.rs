//! Report synthesizer: six analytical fields generated concurrently over
//! one transcript snapshot.

use std::rc::Rc;

use futures::future::join_all;
use synapse_types::config::SimulationConfig;
use synapse_types::report::{ReportData, ReportField};
use synapse_types::session::SessionState;
use synapse_types::{Result, SynapseError};

use crate::generation::GenerationClient;

pub struct ReportSynthesizer {
    client: Rc<GenerationClient>,
    min_messages: usize,
    window: usize,
    word_budget: usize,
}

impl ReportSynthesizer {
    pub fn new(client: Rc<GenerationClient>, config: &SimulationConfig) -> Self {
        Self {
            client,
            min_messages: config.min_report_messages,
            window: config.report_window,
            word_budget: config.report_word_budget,
        }
    }

    /// Fails with `InsufficientData` before any request when the snapshot
    /// holds too few agent messages. Otherwise waits for all six fields to
    /// settle; one exhausted field fails the whole report.
    pub async fn synthesize(&self, snapshot: &SessionState) -> Result<ReportData> {
        let found = snapshot.non_system_count();
        if found < self.min_messages {
            return Err(SynapseError::InsufficientData {
                required: self.min_messages,
                found,
            });
        }

        let transcript = snapshot.recent_non_system(self.window);
        let roster = snapshot.agent_names();
        let requests = ReportField::all().iter().map(|&field| {
            let client = &self.client;
            let transcript = transcript.as_slice();
            let roster = roster.as_slice();
            let topic = snapshot.topic.as_str();
            let word_budget = self.word_budget;
            async move {
                let result = client
                    .report_field(field, topic, roster, transcript, word_budget)
                    .await;
                (field, result)
            }
        });
        let settled = join_all(requests).await;

        let mut data = ReportData::default();
        let mut failures = Vec::new();
        for (field, result) in settled {
            match result {
                Ok(text) => data.set_field(field, text),
                Err(e) => failures.push(format!("{}: {}", field.key(), e)),
            }
        }
        if !failures.is_empty() {
            return Err(SynapseError::Generation(format!(
                "report synthesis failed ({})",
                failures.join("; ")
            )));
        }
        Ok(data)
    }
}
