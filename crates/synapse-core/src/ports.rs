//! Port traits — the hexagonal architecture boundary.
//!
//! These traits are defined here in `synapse-core` (pure Rust).
//! Implementations live in `synapse-platform` (browser adapters).
//! The core never imports platform code; it only depends on these traits.
//!
//! Task spawning is not a port of its own: the engine takes any
//! `futures::task::LocalSpawn`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use synapse_types::Result;

// ─── Generation Port ─────────────────────────────────────────

/// The opaque text-generation service.
#[async_trait(?Send)]
pub trait GenerationPort {
    /// One request/response round trip. Any transport failure is an error.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Name of this backend (for logging/debug)
    fn backend_name(&self) -> &str;
}

// ─── Timer Port ──────────────────────────────────────────────

#[async_trait(?Send)]
pub trait TimerPort {
    /// Resolve after `ms` milliseconds of real (or virtual) time
    async fn sleep(&self, ms: u64);

    /// Current instant, used to stamp messages
    fn now(&self) -> DateTime<Utc>;
}
