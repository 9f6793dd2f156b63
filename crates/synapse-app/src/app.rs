//! JavaScript-facing handle over the simulation engine.
//!
//! The view polls `drainEvents` and `snapshot` on each frame; every other
//! method is a user command. Errors cross the boundary as strings.

use std::rc::Rc;

use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use synapse_core::Simulation;
use synapse_platform::{build_generator, entropy_rng, BrowserSpawner, BrowserTimer};
use synapse_types::agent::AgentDraft;
use synapse_types::config::SimulationConfig;
use synapse_types::report::{ExperimentReport, ReportSection};
use synapse_types::session::{duration_from_hms, format_hms};
use synapse_types::SynapseError;

#[wasm_bindgen]
pub struct SynapseApp {
    sim: Simulation,
}

#[wasm_bindgen]
impl SynapseApp {
    /// Build the engine from an optional JSON config; defaults otherwise.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<SynapseApp, JsValue> {
        let config = match config_json {
            Some(json) => SimulationConfig::from_json(&json).map_err(to_js)?,
            None => SimulationConfig::default(),
        };
        let generator = build_generator(&config.generation).map_err(to_js)?;
        let sim = Simulation::new(
            config,
            generator,
            Rc::new(BrowserTimer),
            Rc::new(BrowserSpawner),
            entropy_rng(),
        )
        .map_err(to_js)?;
        Ok(Self { sim })
    }

    // ─── Roster ──────────────────────────────────────────

    /// Returns the new agent's id.
    #[wasm_bindgen(js_name = addAgent)]
    pub fn add_agent(&self, name: String, behavior: String) -> Result<String, JsValue> {
        let agent = self.sim.add_agent(AgentDraft::new(name, behavior)).map_err(to_js)?;
        Ok(agent.id)
    }

    #[wasm_bindgen(js_name = editAgent)]
    pub fn edit_agent(&self, id: &str, name: String, behavior: String) -> Result<(), JsValue> {
        self.sim
            .edit_agent(id, AgentDraft::new(name, behavior))
            .map(|_| ())
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = deleteAgent)]
    pub fn delete_agent(&self, id: &str) -> Result<(), JsValue> {
        self.sim.remove_agent(id).map(|_| ()).map_err(to_js)
    }

    // ─── Settings ────────────────────────────────────────

    #[wasm_bindgen(js_name = setTopic)]
    pub fn set_topic(&self, topic: String) {
        self.sim.set_topic(topic);
    }

    #[wasm_bindgen(js_name = setDuration)]
    pub fn set_duration(&self, hours: u32, minutes: u32, seconds: u32) -> Result<(), JsValue> {
        let secs = duration_from_hms(hours.into(), minutes.into(), seconds.into());
        self.sim.set_duration(secs).map_err(to_js)
    }

    // ─── Lifecycle ───────────────────────────────────────

    pub fn start(&self) -> Result<(), JsValue> {
        self.sim.start().map_err(to_js)
    }

    pub fn pause(&self) -> Result<(), JsValue> {
        self.sim.pause().map_err(to_js)
    }

    pub fn restart(&self) -> Result<(), JsValue> {
        self.sim.restart().map_err(to_js)
    }

    #[wasm_bindgen(js_name = togglePlay)]
    pub fn toggle_play(&self) -> Result<(), JsValue> {
        self.sim.toggle_play().map_err(to_js)
    }

    // ─── View polling ────────────────────────────────────

    pub fn phase(&self) -> String {
        self.sim.phase().to_string()
    }

    /// `HH:MM:SS / HH:MM:SS` progress label
    #[wasm_bindgen(js_name = clockLabel)]
    pub fn clock_label(&self) -> String {
        self.sim
            .store()
            .read(|s| format!("{} / {}", format_hms(s.elapsed), format_hms(s.duration)))
    }

    /// Full session state as JSON.
    pub fn snapshot(&self) -> Result<String, JsValue> {
        let state = self.sim.snapshot();
        serde_json::to_string(&state).map_err(|e| to_js(e.into()))
    }

    /// Transcript sorted for display, as JSON.
    pub fn transcript(&self) -> Result<String, JsValue> {
        let state = self.sim.snapshot();
        serde_json::to_string(&state.display_order()).map_err(|e| to_js(e.into()))
    }

    /// Pending engine events as a JSON array.
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&self) -> Result<String, JsValue> {
        let events = self.sim.events().drain();
        serde_json::to_string(&events).map_err(|e| to_js(e.into()))
    }

    // ─── Report ──────────────────────────────────────────

    /// Resolves to a JSON `ReportPayload`, rejects with the error text.
    #[wasm_bindgen(js_name = generateReport)]
    pub fn generate_report(&self) -> js_sys::Promise {
        let sim = self.sim.clone();
        future_to_promise(async move {
            let report = sim.generate_report().await.map_err(to_js)?;
            let payload = ReportPayload::from(report);
            let json = serde_json::to_string(&payload).map_err(|e| to_js(e.into()))?;
            Ok(JsValue::from_str(&json))
        })
    }
}

/// What the view needs to render and download a report
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportPayload {
    file_name: String,
    sections: Vec<ReportSection>,
    text: String,
    report: ExperimentReport,
}

impl From<ExperimentReport> for ReportPayload {
    fn from(report: ExperimentReport) -> Self {
        Self {
            file_name: format!("{}.txt", report.file_stem()),
            sections: report.sections(),
            text: report.to_plain_text(),
            report,
        }
    }
}

fn to_js(e: SynapseError) -> JsValue {
    log::warn!("{}", e);
    JsValue::from_str(&e.to_string())
}
