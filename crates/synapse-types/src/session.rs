use std::fmt;

use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::message::Message;

/// Lifecycle phase of the simulation clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Nothing elapsed yet, not playing
    Idle,
    Running,
    /// Stopped part-way through the duration budget
    Paused,
    /// Elapsed reached the duration budget
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::Paused => "paused",
            Phase::Finished => "finished",
        };
        f.write_str(label)
    }
}

/// The single shared aggregate: roster, transcript, and clock state
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub agents: Vec<Agent>,
    /// Append-only during a run, cleared only on restart
    pub messages: Vec<Message>,
    pub topic: String,
    /// Budget in clock units (seconds)
    pub duration: u64,
    pub elapsed: u64,
    pub phase: Phase,
    /// Bumped whenever a play period begins or ends. Async work captured
    /// under an older epoch must not commit.
    pub epoch: u64,
}

impl SessionState {
    pub fn new(duration: u64) -> Self {
        Self {
            agents: Vec::new(),
            messages: Vec::new(),
            topic: String::new(),
            duration,
            elapsed: 0,
            phase: Phase::Idle,
            epoch: 0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Still playing within the given epoch, with time left
    pub fn is_live(&self, epoch: u64) -> bool {
        self.is_playing() && self.epoch == epoch && self.elapsed < self.duration
    }

    pub fn agent(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn agent_names(&self) -> Vec<String> {
        self.agents.iter().map(|a| a.name.clone()).collect()
    }

    pub fn message(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Resolve a reply's parent by identity, never by position
    pub fn parent_of(&self, message: &Message) -> Option<&Message> {
        message.parent_id.as_deref().and_then(|id| self.message(id))
    }

    pub fn non_system(&self) -> impl DoubleEndedIterator<Item = &Message> {
        self.messages.iter().filter(|m| !m.is_system)
    }

    pub fn non_system_count(&self) -> usize {
        self.non_system().count()
    }

    /// The last `n` non-system messages, oldest first
    pub fn recent_non_system(&self, n: usize) -> Vec<Message> {
        let mut recent: Vec<Message> = self.non_system().rev().take(n).cloned().collect();
        recent.reverse();
        recent
    }

    /// The last `n` transcript entries, system messages included
    pub fn recent_entries(&self, n: usize) -> Vec<Message> {
        let start = self.messages.len().saturating_sub(n);
        self.messages[start..].to_vec()
    }

    /// Producer of the most recent non-system message
    pub fn last_speaker(&self) -> Option<&str> {
        self.non_system().next_back().map(|m| m.agent_id.as_str())
    }

    pub fn authored_count(&self, agent_id: &str) -> usize {
        self.messages.iter().filter(|m| m.agent_id == agent_id).count()
    }

    /// Transcript sorted by timestamp for display. The sort is stable, so
    /// equal timestamps keep append order.
    pub fn display_order(&self) -> Vec<&Message> {
        let mut ordered: Vec<&Message> = self.messages.iter().collect();
        ordered.sort_by_key(|m| m.timestamp);
        ordered
    }
}

/// Total seconds from an hours/minutes/seconds form
pub fn duration_from_hms(hours: u64, minutes: u64, seconds: u64) -> u64 {
    hours * 3600 + minutes * 60 + seconds
}

/// `HH:MM:SS`
pub fn format_hms(total_secs: u64) -> String {
    let h = total_secs / 3600;
    let m = (total_secs % 3600) / 60;
    let s = total_secs % 60;
    format!("{:02}:{:02}:{:02}", h, m, s)
}
