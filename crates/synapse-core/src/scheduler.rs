//! Turn scheduler: who speaks, to whom, how often, and when memory is
//! consolidated.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use futures::task::{LocalSpawn, LocalSpawnExt};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use synapse_types::agent::Agent;
use synapse_types::config::SimulationConfig;
use synapse_types::event::SimulationEvent;
use synapse_types::message::Message;

use crate::event_bus::EventBus;
use crate::generation::GenerationClient;
use crate::ports::TimerPort;
use crate::prompts::TurnContext;
use crate::store::{DiscardReason, SessionStore, TurnCommit};

/// Per-agent runtime bookkeeping. Lives beside the roster, never on it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentActivity {
    pub turns_taken: u64,
    pub last_spoke_at: Option<DateTime<Utc>>,
    pub consolidations: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Spoke(Message),
    NoOp(NoOpReason),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NoOpReason {
    NotRunning,
    EmptyRoster,
    GenerationFailed(String),
    Discarded(DiscardReason),
}

/// Uniform pick among agents other than `last_speaker`; the whole roster
/// when that leaves nobody.
pub fn select_speaker<'a>(
    agents: &'a [Agent],
    last_speaker: Option<&str>,
    rng: &mut dyn RngCore,
) -> Option<&'a Agent> {
    let candidates: Vec<&Agent> = agents
        .iter()
        .filter(|a| Some(a.id.as_str()) != last_speaker)
        .collect();
    if candidates.is_empty() {
        agents.choose(rng)
    } else {
        candidates.choose(rng).copied()
    }
}

/// With probability `reply_probability`, a uniform pick among `recent`
/// messages not written by the speaker. None means an open turn.
pub fn select_target<'a>(
    speaker_id: &str,
    recent: &'a [Message],
    reply_probability: f64,
    rng: &mut dyn RngCore,
) -> Option<&'a Message> {
    let others: Vec<&Message> = recent
        .iter()
        .filter(|m| !m.is_system && m.agent_id != speaker_id)
        .collect();
    if others.is_empty() || !rng.gen_bool(reply_probability) {
        return None;
    }
    others.choose(rng).copied()
}

pub struct TurnScheduler {
    store: SessionStore,
    events: EventBus,
    client: Rc<GenerationClient>,
    timer: Rc<dyn TimerPort>,
    spawner: Rc<dyn LocalSpawn>,
    rng: RefCell<Box<dyn RngCore>>,
    config: SimulationConfig,
    activity: RefCell<HashMap<String, AgentActivity>>,
}

impl TurnScheduler {
    pub fn new(
        store: SessionStore,
        events: EventBus,
        client: Rc<GenerationClient>,
        timer: Rc<dyn TimerPort>,
        spawner: Rc<dyn LocalSpawn>,
        rng: Box<dyn RngCore>,
        config: SimulationConfig,
    ) -> Self {
        Self {
            store,
            events,
            client,
            timer,
            spawner,
            rng: RefCell::new(rng),
            config,
            activity: RefCell::new(HashMap::new()),
        }
    }

    // ─── Side-table lifecycle ────────────────────────────────

    pub fn track_agent(&self, agent_id: &str) {
        self.activity
            .borrow_mut()
            .insert(agent_id.to_string(), AgentActivity::default());
    }

    pub fn forget_agent(&self, agent_id: &str) {
        self.activity.borrow_mut().remove(agent_id);
    }

    /// Zero every entry, keeping the set of tracked agents
    pub fn reset_activity(&self) {
        for entry in self.activity.borrow_mut().values_mut() {
            *entry = AgentActivity::default();
        }
    }

    pub fn activity(&self, agent_id: &str) -> Option<AgentActivity> {
        self.activity.borrow().get(agent_id).cloned()
    }

    // ─── Turns ───────────────────────────────────────────────

    /// Inter-turn delay drawn uniformly from the pacing window
    pub fn pacing_delay(&self) -> u64 {
        let pacing = &self.config.pacing;
        self.rng
            .borrow_mut()
            .gen_range(pacing.min_delay_ms..=pacing.max_delay_ms)
    }

    /// Produce at most one message for the play period `epoch`.
    ///
    /// Generation failures are absorbed: the turn is dropped and reported,
    /// never retried here.
    pub async fn run_turn(self: &Rc<Self>, epoch: u64) -> TurnOutcome {
        let ctx = match self.plan_turn(epoch) {
            Ok(ctx) => ctx,
            Err(reason) => return TurnOutcome::NoOp(reason),
        };
        let speaker_id = ctx.speaker.id.clone();
        log::debug!(
            "{} speaks{}",
            ctx.speaker.name,
            ctx.target
                .as_ref()
                .map(|t| format!(" to {}", t.agent_name))
                .unwrap_or_default()
        );

        let text = match self.client.agent_reply(&ctx).await {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Turn for {} skipped: {}", ctx.speaker.name, e);
                self.events.emit(SimulationEvent::TurnSkipped {
                    agent_id: speaker_id,
                    reason: e.to_string(),
                });
                return TurnOutcome::NoOp(NoOpReason::GenerationFailed(e.to_string()));
            }
        };

        let message = Message::agent(
            &speaker_id,
            &ctx.speaker.name,
            text,
            ctx.target.as_ref().map(|t| t.id.clone()),
            self.timer.now(),
        );

        match self.store.commit_turn(epoch, message) {
            TurnCommit::Appended { message, authored } => {
                self.record_turn(&message);
                self.events.emit(SimulationEvent::MessageAppended {
                    message: message.clone(),
                });
                if authored % self.config.memory_cadence == 0 {
                    self.dispatch_consolidation(&speaker_id);
                }
                TurnOutcome::Spoke(message)
            }
            TurnCommit::Discarded(reason) => {
                log::info!("Turn for {} discarded: {:?}", ctx.speaker.name, reason);
                self.events.emit(SimulationEvent::TurnDiscarded {
                    agent_id: speaker_id,
                });
                TurnOutcome::NoOp(NoOpReason::Discarded(reason))
            }
        }
    }

    /// Pick speaker and target from the current state and copy out what the
    /// prompt needs.
    fn plan_turn(&self, epoch: u64) -> std::result::Result<TurnContext, NoOpReason> {
        let mut rng = self.rng.borrow_mut();
        let rng: &mut dyn RngCore = &mut **rng;
        self.store.read(|s| {
            if !s.is_live(epoch) {
                return Err(NoOpReason::NotRunning);
            }
            let speaker = select_speaker(&s.agents, s.last_speaker(), &mut *rng)
                .ok_or(NoOpReason::EmptyRoster)?;
            let recent = s.recent_non_system(self.config.target_window);
            let target = select_target(&speaker.id, &recent, self.config.reply_probability, rng)
                .cloned();
            Ok(TurnContext {
                speaker: speaker.clone(),
                topic: s.topic.clone(),
                history: s.recent_non_system(self.config.history_window),
                roster: s.agent_names(),
                target,
            })
        })
    }

    fn record_turn(&self, message: &Message) {
        if let Some(entry) = self.activity.borrow_mut().get_mut(&message.agent_id) {
            entry.turns_taken += 1;
            entry.last_spoke_at = Some(message.timestamp);
        }
    }

    /// Detached consolidation over the latest transcript entries. The turn
    /// loop never waits for it; its result lands whenever it completes.
    fn dispatch_consolidation(self: &Rc<Self>, agent_id: &str) {
        let observations = self
            .store
            .read(|s| s.recent_entries(self.config.memory_window));
        if let Some(entry) = self.activity.borrow_mut().get_mut(agent_id) {
            entry.consolidations += 1;
        }

        let scheduler = Rc::clone(self);
        let agent_id = agent_id.to_string();
        let spawned = self.spawner.spawn_local(async move {
            scheduler.consolidate(&agent_id, &observations).await;
        });
        if let Err(e) = spawned {
            log::error!("Could not dispatch memory update: {}", e);
        }
    }

    async fn consolidate(&self, agent_id: &str, observations: &[Message]) {
        let Some(agent) = self.store.read(|s| s.agent(agent_id).cloned()) else {
            return;
        };
        let result = self
            .client
            .consolidate_memory(
                &agent,
                observations,
                self.config.memory_cadence,
                self.config.memory_word_budget,
            )
            .await;
        match result {
            Ok(summary) => {
                if self.store.apply_memory(agent_id, summary) {
                    self.events.emit(SimulationEvent::MemoryUpdated {
                        agent_id: agent_id.to_string(),
                    });
                } else {
                    log::info!("Memory update for removed agent {} dropped", agent_id);
                }
            }
            Err(e) => {
                log::warn!("Memory update for {} skipped: {}", agent.name, e);
                self.events.emit(SimulationEvent::MemoryUpdateFailed {
                    agent_id: agent_id.to_string(),
                    message: e.to_string(),
                });
            }
        }
    }
}
