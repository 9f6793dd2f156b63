use serde::{Deserialize, Serialize};

use crate::{Result, SynapseError};

/// Summary every new agent starts with, before its first consolidation
pub const DEFAULT_MEMORY_SUMMARY: &str = "Subject initialized. Awaiting experiment start.";

/// Colors handed out by roster position
pub const AGENT_PALETTE: [&str; 10] = [
    "#3b82f6", "#ef4444", "#10b981", "#f59e0b", "#8b5cf6",
    "#ec4899", "#14b8a6", "#f43f5e", "#6366f1", "#a855f7",
];

/// A simulated discussion participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    /// Free-text instructions shaping the agent's statements
    pub behavior: String,
    /// Rolling belief state. Only memory consolidation writes it.
    pub memory_summary: String,
    /// Presentation only
    pub color: String,
}

impl Agent {
    pub fn new(draft: AgentDraft, roster_index: usize) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: draft.name.trim().to_string(),
            behavior: draft.behavior.trim().to_string(),
            memory_summary: DEFAULT_MEMORY_SUMMARY.to_string(),
            color: AGENT_PALETTE[roster_index % AGENT_PALETTE.len()].to_string(),
        }
    }
}

/// User-editable part of an agent, as submitted by the roster form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentDraft {
    pub name: String,
    pub behavior: String,
}

impl AgentDraft {
    pub fn new(name: impl Into<String>, behavior: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behavior: behavior.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SynapseError::Validation("agent name is required".to_string()));
        }
        if self.behavior.trim().is_empty() {
            return Err(SynapseError::Validation(
                "agent behavior profile is required".to_string(),
            ));
        }
        Ok(())
    }
}
