//! Synapse App — WASM entry point.
//!
//! This crate is the composition root (DI wiring layer).
//! It assembles the browser adapters, hands them to the simulation engine,
//! and exports the result to JavaScript as `SynapseApp`.

mod app;

use wasm_bindgen::prelude::*;

pub use app::SynapseApp;

/// Runs when the module is instantiated
#[wasm_bindgen(start)]
pub fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Synapse WASM starting...");
}
