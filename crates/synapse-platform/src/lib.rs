//! Browser implementations of the synapse-core ports.

pub mod llm;
pub mod spawn;
pub mod timer;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

pub use llm::build_generator;
pub use spawn::BrowserSpawner;
pub use timer::BrowserTimer;

/// Engine RNG seeded from `crypto.getRandomValues`.
pub fn entropy_rng() -> Box<dyn RngCore> {
    Box::new(StdRng::from_entropy())
}
