use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Events emitted by the simulation engine.
/// The view drains these for reactive updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimulationEvent {
    /// The clock began (or resumed) running
    Started { epoch: u64 },

    Paused { elapsed: u64 },

    Tick { elapsed: u64 },

    /// Elapsed reached the duration budget
    Finished { elapsed: u64 },

    /// Transcript cleared and topic re-announced
    Restarted,

    MessageAppended { message: Message },

    /// Generation failed after all retries; the turn was dropped
    TurnSkipped { agent_id: String, reason: String },

    /// A turn completed after its play period ended, or would have
    /// repeated the previous speaker
    TurnDiscarded { agent_id: String },

    MemoryUpdated { agent_id: String },

    MemoryUpdateFailed { agent_id: String, message: String },

    RosterChanged,

    ReportStarted,

    ReportReady,

    ReportFailed { message: String },
}
