//! The engine facade: wires store, clock, scheduler and reports together and
//! drives the two cooperative loops (clock ticks, turns) for each play period.

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::future::{select, Either, FutureExt, Shared};
use futures::task::{LocalSpawn, LocalSpawnExt};
use rand::RngCore;
use synapse_types::agent::{Agent, AgentDraft};
use synapse_types::config::SimulationConfig;
use synapse_types::event::SimulationEvent;
use synapse_types::report::ExperimentReport;
use synapse_types::session::{Phase, SessionState};
use synapse_types::{Result, SynapseError};

use crate::clock::{SimulationClock, TickOutcome};
use crate::event_bus::EventBus;
use crate::generation::GenerationClient;
use crate::ports::{GenerationPort, TimerPort};
use crate::report::ReportSynthesizer;
use crate::retry::RetryPolicy;
use crate::scheduler::{AgentActivity, TurnOutcome, TurnScheduler};
use crate::store::SessionStore;

/// Resolves when the current play period is cancelled
type StopSignal = Shared<oneshot::Receiver<()>>;

/// Keeps a play period's loops alive. Dropping it wakes every pending
/// tick and pacing sleep of that period.
struct RunGuard {
    _stop: oneshot::Sender<()>,
}

struct Inner {
    config: SimulationConfig,
    store: SessionStore,
    events: EventBus,
    clock: SimulationClock,
    scheduler: Rc<TurnScheduler>,
    reports: ReportSynthesizer,
    timer: Rc<dyn TimerPort>,
    spawner: Rc<dyn LocalSpawn>,
    run: RefCell<Option<RunGuard>>,
}

/// Shared simulation handle, clone-cheap via Rc.
#[derive(Clone)]
pub struct Simulation {
    inner: Rc<Inner>,
}

impl Simulation {
    pub fn new(
        config: SimulationConfig,
        generation: Rc<dyn GenerationPort>,
        timer: Rc<dyn TimerPort>,
        spawner: Rc<dyn LocalSpawn>,
        rng: Box<dyn RngCore>,
    ) -> Result<Self> {
        config.validate()?;
        let store = SessionStore::new(config.default_duration_secs);
        let events = EventBus::new();
        let client = Rc::new(GenerationClient::new(
            generation,
            timer.clone(),
            RetryPolicy::from(&config.retry),
        ));
        let scheduler = Rc::new(TurnScheduler::new(
            store.clone(),
            events.clone(),
            client.clone(),
            timer.clone(),
            spawner.clone(),
            rng,
            config.clone(),
        ));
        log::info!("Simulation engine ready (backend: {})", client.backend_name());

        Ok(Self {
            inner: Rc::new(Inner {
                clock: SimulationClock::new(store.clone(), events.clone()),
                reports: ReportSynthesizer::new(client, &config),
                config,
                store,
                events,
                scheduler,
                timer,
                spawner,
                run: RefCell::new(None),
            }),
        })
    }

    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    pub fn store(&self) -> &SessionStore {
        &self.inner.store
    }

    pub fn snapshot(&self) -> SessionState {
        self.inner.store.snapshot()
    }

    pub fn phase(&self) -> Phase {
        self.inner.store.phase()
    }

    pub fn activity(&self, agent_id: &str) -> Option<AgentActivity> {
        self.inner.scheduler.activity(agent_id)
    }

    // ─── Roster, topic, duration ─────────────────────────────

    pub fn add_agent(&self, draft: AgentDraft) -> Result<Agent> {
        let agent = self.inner.store.add_agent(draft, self.inner.config.max_agents)?;
        self.inner.scheduler.track_agent(&agent.id);
        self.inner.events.emit(SimulationEvent::RosterChanged);
        Ok(agent)
    }

    pub fn edit_agent(&self, id: &str, draft: AgentDraft) -> Result<Agent> {
        let agent = self.inner.store.edit_agent(id, draft)?;
        self.inner.events.emit(SimulationEvent::RosterChanged);
        Ok(agent)
    }

    pub fn remove_agent(&self, id: &str) -> Result<Agent> {
        let agent = self.inner.store.remove_agent(id)?;
        self.inner.scheduler.forget_agent(id);
        self.inner.events.emit(SimulationEvent::RosterChanged);
        Ok(agent)
    }

    pub fn set_topic(&self, topic: impl Into<String>) {
        self.inner.store.set_topic(topic);
    }

    pub fn set_duration(&self, secs: u64) -> Result<()> {
        self.inner.store.set_duration(secs)
    }

    // ─── Lifecycle ───────────────────────────────────────────

    pub fn start(&self) -> Result<()> {
        let epoch = self.inner.clock.start(self.inner.timer.now())?;
        self.launch(epoch)
    }

    pub fn pause(&self) -> Result<()> {
        self.inner.clock.pause()?;
        self.cancel_run();
        Ok(())
    }

    /// Clear the transcript, re-announce the topic, and resume running once
    /// the settling delay has passed.
    pub fn restart(&self) -> Result<()> {
        let settling = self.inner.clock.begin_restart(self.inner.timer.now())?;
        self.cancel_run();
        self.inner.scheduler.reset_activity();

        let sim = self.clone();
        self.spawn(async move {
            sim.inner.timer.sleep(sim.inner.config.restart_settle_ms).await;
            if let Some(epoch) = sim.inner.clock.resume_after_restart(settling) {
                if let Err(e) = sim.launch(epoch) {
                    log::error!("Could not resume after restart: {}", e);
                }
            }
        })
    }

    /// The single play button: restart when finished, pause when running,
    /// start otherwise.
    pub fn toggle_play(&self) -> Result<()> {
        match self.phase() {
            Phase::Finished => self.restart(),
            Phase::Running => self.pause(),
            Phase::Idle | Phase::Paused => self.start(),
        }
    }

    // ─── Report ──────────────────────────────────────────────

    /// Synthesize the analytical report over the current transcript.
    pub async fn generate_report(&self) -> Result<ExperimentReport> {
        let snapshot = self.snapshot();
        self.inner.events.emit(SimulationEvent::ReportStarted);
        match self.inner.reports.synthesize(&snapshot).await {
            Ok(data) => {
                self.inner.events.emit(SimulationEvent::ReportReady);
                Ok(ExperimentReport {
                    topic: snapshot.topic,
                    generated_at: self.inner.timer.now(),
                    elapsed: snapshot.elapsed,
                    duration: snapshot.duration,
                    data,
                })
            }
            Err(e) => {
                log::error!("Report generation failed: {}", e);
                self.inner.events.emit(SimulationEvent::ReportFailed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    // ─── Play-period loops ───────────────────────────────────

    fn launch(&self, epoch: u64) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let stop: StopSignal = rx.shared();
        *self.inner.run.borrow_mut() = Some(RunGuard { _stop: tx });

        self.spawn(self.clone().clock_loop(epoch, stop.clone()))?;
        self.spawn(self.clone().turn_loop(epoch, stop))
    }

    fn cancel_run(&self) {
        self.inner.run.borrow_mut().take();
    }

    fn spawn(&self, fut: impl std::future::Future<Output = ()> + 'static) -> Result<()> {
        self.inner
            .spawner
            .spawn_local(fut)
            .map_err(|e| SynapseError::Other(format!("spawn failed: {}", e)))
    }

    async fn clock_loop(self, epoch: u64, stop: StopSignal) {
        loop {
            let tick = self.inner.timer.sleep(self.inner.config.tick_interval_ms);
            if let Either::Right(_) = select(tick, stop.clone()).await {
                break;
            }
            match self.inner.clock.tick(epoch) {
                TickOutcome::Advanced(_) => {}
                TickOutcome::Finished => {
                    self.cancel_run();
                    break;
                }
                TickOutcome::Stale => break,
            }
        }
    }

    async fn turn_loop(self, epoch: u64, stop: StopSignal) {
        while self.inner.store.is_live(epoch) {
            match self.inner.scheduler.run_turn(epoch).await {
                TurnOutcome::Spoke(message) => {
                    log::debug!("{}: {}", message.agent_name, message.content);
                }
                TurnOutcome::NoOp(reason) => log::debug!("No turn: {:?}", reason),
            }
            let delay = self.inner.scheduler.pacing_delay();
            let pause = self.inner.timer.sleep(delay);
            if let Either::Right(_) = select(pause, stop.clone()).await {
                break;
            }
        }
    }
}
