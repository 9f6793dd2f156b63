pub mod agent;
pub mod message;
pub mod event;
pub mod session;
pub mod report;
pub mod config;
pub mod error;

#[cfg(test)]
mod tests;

pub use error::SynapseError;
pub type Result<T> = std::result::Result<T, SynapseError>;
