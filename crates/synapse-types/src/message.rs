use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Producer id used for topic banners and other non-agent announcements.
pub const SYSTEM_AGENT_ID: &str = "system";
pub const SYSTEM_AGENT_NAME: &str = "SYSTEM";

/// One utterance in the transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub agent_id: String,
    /// Snapshot of the agent's name when the message was emitted
    pub agent_name: String,
    pub timestamp: DateTime<Utc>,
    pub content: String,
    /// The message this one replies to. Never owns it.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub is_system: bool,
}

impl Message {
    pub fn system(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            agent_id: SYSTEM_AGENT_ID.to_string(),
            agent_name: SYSTEM_AGENT_NAME.to_string(),
            timestamp,
            content: content.into(),
            parent_id: None,
            is_system: true,
        }
    }

    pub fn agent(
        agent_id: impl Into<String>,
        agent_name: impl Into<String>,
        content: impl Into<String>,
        parent_id: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            agent_id: agent_id.into(),
            agent_name: agent_name.into(),
            timestamp,
            content: content.into(),
            parent_id,
            is_system: false,
        }
    }

    /// `[Name]: content`, the form used in turn prompts
    pub fn bracketed_line(&self) -> String {
        format!("[{}]: {}", self.agent_name, self.content)
    }

    /// `Name: content`, the form used in memory and report prompts
    pub fn plain_line(&self) -> String {
        format!("{}: {}", self.agent_name, self.content)
    }
}
