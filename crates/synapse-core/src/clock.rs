//! Simulation clock: the lifecycle state machine.
//!
//! ```text
//! Idle ──start──▶ Running ──tick (elapsed == duration)──▶ Finished
//!                  │    ▲                                     │
//!               pause  start                               restart
//!                  ▼    │                                     │
//!                  Paused                      Idle ◀─────────┘
//!                                    (cleared, then Running after settling)
//! ```
//!
//! Every transition into or out of Running bumps the session epoch.

use chrono::{DateTime, Utc};
use synapse_types::event::SimulationEvent;
use synapse_types::message::Message;
use synapse_types::session::{Phase, SessionState};
use synapse_types::{Result, SynapseError};

use crate::event_bus::EventBus;
use crate::store::SessionStore;

/// Result of one clock tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Advanced(u64),
    /// This tick reached the duration budget
    Finished,
    /// Not running, or running under a newer epoch
    Stale,
}

pub struct SimulationClock {
    store: SessionStore,
    events: EventBus,
}

impl SimulationClock {
    pub fn new(store: SessionStore, events: EventBus) -> Self {
        Self { store, events }
    }

    /// Idle/Paused → Running. Returns the new epoch.
    ///
    /// Announces the topic when the transcript is still empty.
    pub fn start(&self, now: DateTime<Utc>) -> Result<u64> {
        let epoch = self.store.update(|s| {
            match s.phase {
                Phase::Idle | Phase::Paused => {}
                Phase::Running | Phase::Finished => return Err(invalid("start", s.phase)),
            }
            check_preconditions(s)?;
            if s.messages.is_empty() {
                s.messages.push(Message::system(s.topic.clone(), now));
            }
            s.phase = Phase::Running;
            s.epoch += 1;
            Ok(s.epoch)
        })?;
        log::info!("Simulation started (epoch {})", epoch);
        self.events.emit(SimulationEvent::Started { epoch });
        Ok(epoch)
    }

    /// Running → Paused.
    pub fn pause(&self) -> Result<()> {
        let elapsed = self.store.update(|s| {
            if s.phase != Phase::Running {
                return Err(invalid("pause", s.phase));
            }
            s.phase = Phase::Paused;
            s.epoch += 1;
            Ok(s.elapsed)
        })?;
        log::info!("Simulation paused at {}s", elapsed);
        self.events.emit(SimulationEvent::Paused { elapsed });
        Ok(())
    }

    /// Finished → Idle with a fresh transcript holding only the topic.
    /// Returns the settling epoch to hand to [`Self::resume_after_restart`].
    pub fn begin_restart(&self, now: DateTime<Utc>) -> Result<u64> {
        let epoch = self.store.update(|s| {
            if s.phase != Phase::Finished {
                return Err(invalid("restart", s.phase));
            }
            check_preconditions(s)?;
            s.messages.clear();
            s.messages.push(Message::system(s.topic.clone(), now));
            s.elapsed = 0;
            s.phase = Phase::Idle;
            s.epoch += 1;
            Ok(s.epoch)
        })?;
        log::info!("Simulation restarted");
        self.events.emit(SimulationEvent::Restarted);
        Ok(epoch)
    }

    /// Second half of a restart. No-op (None) if anything else moved the
    /// session since `settling_epoch`, or if the roster or topic no longer
    /// allow a start; the session then stays Idle.
    pub fn resume_after_restart(&self, settling_epoch: u64) -> Option<u64> {
        let epoch = self.store.update(|s| {
            if s.phase != Phase::Idle || s.epoch != settling_epoch {
                return None;
            }
            if let Err(e) = check_preconditions(s) {
                log::warn!("Restart not resumed: {}", e);
                return None;
            }
            s.phase = Phase::Running;
            s.epoch += 1;
            Some(s.epoch)
        })?;
        self.events.emit(SimulationEvent::Started { epoch });
        Some(epoch)
    }

    /// Advance elapsed by one unit. Flips to Finished exactly when elapsed
    /// reaches the duration; never goes past it.
    pub fn tick(&self, epoch: u64) -> TickOutcome {
        let outcome = self.store.update(|s| {
            if s.phase != Phase::Running || s.epoch != epoch {
                return TickOutcome::Stale;
            }
            if s.elapsed < s.duration {
                s.elapsed += 1;
            }
            if s.elapsed >= s.duration {
                s.phase = Phase::Finished;
                s.epoch += 1;
                TickOutcome::Finished
            } else {
                TickOutcome::Advanced(s.elapsed)
            }
        });
        match outcome {
            TickOutcome::Advanced(elapsed) => {
                self.events.emit(SimulationEvent::Tick { elapsed });
            }
            TickOutcome::Finished => {
                let elapsed = self.store.read(|s| s.elapsed);
                log::info!("Simulation finished at {}s", elapsed);
                self.events.emit(SimulationEvent::Tick { elapsed });
                self.events.emit(SimulationEvent::Finished { elapsed });
            }
            TickOutcome::Stale => {}
        }
        outcome
    }
}

fn check_preconditions(s: &SessionState) -> Result<()> {
    if s.topic.trim().is_empty() {
        return Err(SynapseError::Precondition(
            "define a discussion topic first".to_string(),
        ));
    }
    if s.agents.len() < 2 {
        return Err(SynapseError::Precondition(
            "add at least 2 agents to foster interaction".to_string(),
        ));
    }
    Ok(())
}

fn invalid(action: &str, phase: Phase) -> SynapseError {
    SynapseError::InvalidTransition {
        action: action.to_string(),
        phase: phase.to_string(),
    }
}
