pub mod form_endpoint;
pub mod openai_compat;

use std::rc::Rc;

use synapse_core::ports::GenerationPort;
use synapse_types::config::{GenerationBackend, GenerationConfig};
use synapse_types::{Result, SynapseError};

pub use form_endpoint::FormEndpointGenerator;
pub use openai_compat::OpenAiCompatGenerator;

/// Build the generation adapter selected by `config.backend`.
pub fn build_generator(config: &GenerationConfig) -> Result<Rc<dyn GenerationPort>> {
    if config.endpoint.trim().is_empty() {
        return Err(SynapseError::Config("generation.endpoint is not set".to_string()));
    }
    log::info!("Using {} backend at {}", config.backend.label(), config.endpoint);
    let port: Rc<dyn GenerationPort> = match config.backend {
        GenerationBackend::FormEndpoint => {
            Rc::new(FormEndpointGenerator::new(config.endpoint.trim()))
        }
        GenerationBackend::OpenAiCompat => Rc::new(OpenAiCompatGenerator::new(config.clone())),
    };
    Ok(port)
}
