//! Synapse simulation engine.
//!
//! Everything here is single-threaded: shared state lives in `Rc<RefCell<_>>`
//! and concurrency is the interleaving of tasks on one local executor.

pub mod ports;
pub mod event_bus;
pub mod retry;
pub mod prompts;
pub mod generation;
pub mod store;
pub mod clock;
pub mod scheduler;
pub mod report;
pub mod simulation;


pub use simulation::Simulation;
