//! Session state store.
//!
//! The single shared mutable resource. Every writer goes through
//! [`SessionStore::update`], which applies a transition to the state as it
//! is at that moment. No borrow is ever held across an `.await`.

use std::cell::RefCell;
use std::rc::Rc;

use synapse_types::agent::{Agent, AgentDraft};
use synapse_types::message::Message;
use synapse_types::session::{Phase, SessionState};
use synapse_types::{Result, SynapseError};

/// Why a finished turn was not appended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// Paused, restarted or finished since the turn began
    Stale,
    SpeakerRemoved,
    ParentMissing,
    /// Another turn by the same agent landed first
    RepeatSpeaker,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnCommit {
    Appended {
        message: Message,
        /// Messages by this speaker in the transcript, this one included
        authored: usize,
    },
    Discarded(DiscardReason),
}

/// Shared handle to the session state, clone-cheap via Rc.
#[derive(Clone)]
pub struct SessionStore {
    inner: Rc<RefCell<SessionState>>,
}

impl SessionStore {
    pub fn new(duration: u64) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SessionState::new(duration))),
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&self.inner.borrow())
    }

    /// Apply one read-modify-write transition to the current state.
    pub fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }

    pub fn snapshot(&self) -> SessionState {
        self.inner.borrow().clone()
    }

    pub fn phase(&self) -> Phase {
        self.read(|s| s.phase)
    }

    pub fn is_live(&self, epoch: u64) -> bool {
        self.read(|s| s.is_live(epoch))
    }

    // ─── Roster & settings ───────────────────────────────────

    pub fn add_agent(&self, draft: AgentDraft, max_agents: usize) -> Result<Agent> {
        draft.validate()?;
        self.update(|s| {
            if s.agents.len() >= max_agents {
                return Err(SynapseError::RosterFull(max_agents));
            }
            let agent = Agent::new(draft, s.agents.len());
            s.agents.push(agent.clone());
            Ok(agent)
        })
    }

    /// Change name and behavior. Summary and color stay as they are.
    pub fn edit_agent(&self, id: &str, draft: AgentDraft) -> Result<Agent> {
        draft.validate()?;
        self.update(|s| {
            let agent = s
                .agents
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or_else(|| SynapseError::UnknownAgent(id.to_string()))?;
            agent.name = draft.name.trim().to_string();
            agent.behavior = draft.behavior.trim().to_string();
            Ok(agent.clone())
        })
    }

    pub fn remove_agent(&self, id: &str) -> Result<Agent> {
        self.update(|s| {
            let index = s
                .agents
                .iter()
                .position(|a| a.id == id)
                .ok_or_else(|| SynapseError::UnknownAgent(id.to_string()))?;
            Ok(s.agents.remove(index))
        })
    }

    pub fn set_topic(&self, topic: impl Into<String>) {
        let topic = topic.into();
        self.update(|s| s.topic = topic);
    }

    /// New duration budget. Resets elapsed; refused while running.
    pub fn set_duration(&self, secs: u64) -> Result<()> {
        if secs == 0 {
            return Err(SynapseError::Validation(
                "duration must be greater than 0".to_string(),
            ));
        }
        self.update(|s| {
            if s.is_playing() {
                return Err(SynapseError::InvalidTransition {
                    action: "change duration".to_string(),
                    phase: s.phase.to_string(),
                });
            }
            s.duration = secs;
            s.elapsed = 0;
            s.phase = if s.messages.is_empty() {
                Phase::Idle
            } else {
                Phase::Paused
            };
            Ok(())
        })
    }

    // ─── Transcript ──────────────────────────────────────────

    /// Append a finished turn if the world still permits it.
    ///
    /// Checked against the current state: the play period is still `epoch`,
    /// the speaker is still on the roster, the parent (if any) is in the log,
    /// and the latest agent message is not already this speaker's. The
    /// timestamp is clamped to keep emission order non-decreasing, and the
    /// speaker's current name is snapshotted.
    pub fn commit_turn(&self, epoch: u64, mut message: Message) -> TurnCommit {
        self.update(|s| {
            if !s.is_live(epoch) {
                return TurnCommit::Discarded(DiscardReason::Stale);
            }
            let Some(speaker) = s.agent(&message.agent_id) else {
                return TurnCommit::Discarded(DiscardReason::SpeakerRemoved);
            };
            message.agent_name = speaker.name.clone();
            if let Some(parent_id) = message.parent_id.as_deref() {
                if s.message(parent_id).is_none() {
                    return TurnCommit::Discarded(DiscardReason::ParentMissing);
                }
            }
            if s.agents.len() > 1 && s.last_speaker() == Some(message.agent_id.as_str()) {
                return TurnCommit::Discarded(DiscardReason::RepeatSpeaker);
            }
            if let Some(last) = s.messages.last() {
                if message.timestamp < last.timestamp {
                    message.timestamp = last.timestamp;
                }
            }
            s.messages.push(message.clone());
            let authored = s.authored_count(&message.agent_id);
            TurnCommit::Appended { message, authored }
        })
    }

    /// Replace an agent's summary. False when the agent is gone.
    pub fn apply_memory(&self, agent_id: &str, summary: String) -> bool {
        self.update(|s| match s.agents.iter_mut().find(|a| a.id == agent_id) {
            Some(agent) => {
                agent.memory_summary = summary;
                true
            }
            None => false,
        })
    }
}
