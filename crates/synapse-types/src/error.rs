use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynapseError {
    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Insufficient data: need at least {required} messages, found {found}")]
    InsufficientData { required: usize, found: usize },

    /// A generation call failed. The retry adapter absorbs these until its
    /// attempts run out.
    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Cannot {action} while {phase}")]
    InvalidTransition { action: String, phase: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Roster is full ({0} agents)")]
    RosterFull(usize),

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JS interop error: {0}")]
    JsInterop(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for SynapseError {
    fn from(e: serde_json::Error) -> Self {
        SynapseError::Serialization(e.to_string())
    }
}
