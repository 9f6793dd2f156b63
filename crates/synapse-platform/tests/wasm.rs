//! WASM-target tests for synapse-platform (Node.js runtime).
//!
//! Covers adapter construction, the timer and the spawner under
//! wasm32-unknown-unknown via `wasm-pack test --node`. Network calls are
//! not exercised here.

use wasm_bindgen_test::*;

use futures::channel::oneshot;
use futures::task::LocalSpawnExt;
use synapse_core::ports::{GenerationPort, TimerPort};
use synapse_platform::llm::OpenAiCompatGenerator;
use synapse_platform::{build_generator, entropy_rng, BrowserSpawner, BrowserTimer};
use synapse_types::config::{GenerationBackend, GenerationConfig};
use synapse_types::SynapseError;

fn config(backend: GenerationBackend, endpoint: &str) -> GenerationConfig {
    GenerationConfig {
        backend,
        endpoint: endpoint.to_string(),
        ..GenerationConfig::default()
    }
}

// ─── Generator Factory Tests ─────────────────────────────

#[wasm_bindgen_test]
fn build_generator_requires_endpoint() {
    let result = build_generator(&config(GenerationBackend::FormEndpoint, "  "));
    assert!(matches!(result, Err(SynapseError::Config(_))));
}

#[wasm_bindgen_test]
fn build_generator_picks_backend() {
    let form = build_generator(&config(GenerationBackend::FormEndpoint, "https://example.test/gen")).unwrap();
    assert_eq!(form.backend_name(), "form-endpoint");
    let openai = build_generator(&config(GenerationBackend::OpenAiCompat, "https://api.example.test")).unwrap();
    assert_eq!(openai.backend_name(), "openai-compat");
}

#[wasm_bindgen_test]
fn openai_request_shape() {
    let generator = OpenAiCompatGenerator::new(config(GenerationBackend::OpenAiCompat, "https://api.example.test/"));
    assert_eq!(generator.completions_url(), "https://api.example.test/v1/chat/completions");
    let body = generator.request_body("hello");
    assert_eq!(body["model"], "deepseek-chat");
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(body["messages"][0]["content"], "hello");
    assert_eq!(body["max_tokens"], 512);
}

// ─── Timer & Spawner Tests ───────────────────────────────

#[wasm_bindgen_test]
async fn timer_sleep_advances_clock() {
    let timer = BrowserTimer;
    let before = timer.now();
    timer.sleep(20).await;
    assert!(timer.now() >= before);
}

#[wasm_bindgen_test]
async fn spawner_runs_task() {
    let (tx, rx) = oneshot::channel();
    BrowserSpawner
        .spawn_local(async move {
            let _ = tx.send(42);
        })
        .unwrap();
    assert_eq!(rx.await, Ok(42));
}

#[wasm_bindgen_test]
fn entropy_rng_produces_values() {
    let mut rng = entropy_rng();
    let a = rng.next_u64();
    let b = rng.next_u64();
    assert_ne!(a, b);
}
