//! Form-post generation adapter.
//!
//! `POST`s a multipart form with a single `prompt` field and reads the
//! generated text from a JSON body of the form `{"response": "..."}`.

use async_trait::async_trait;
use gloo_net::http::Request;
use serde::Deserialize;
use web_sys::FormData;

use synapse_core::ports::GenerationPort;
use synapse_types::{Result, SynapseError};

pub struct FormEndpointGenerator {
    url: String,
}

impl FormEndpointGenerator {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    fn form(prompt: &str) -> Result<FormData> {
        let form = FormData::new().map_err(|e| SynapseError::JsInterop(format!("{:?}", e)))?;
        form.append_with_str("prompt", prompt)
            .map_err(|e| SynapseError::JsInterop(format!("{:?}", e)))?;
        Ok(form)
    }
}

#[async_trait(?Send)]
impl GenerationPort for FormEndpointGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = Request::post(&self.url)
            .body(Self::form(prompt)?)
            .map_err(|e| SynapseError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| SynapseError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(SynapseError::Generation(format!("HTTP {}", response.status())));
        }

        let data: FormResponse = response
            .json()
            .await
            .map_err(|e| SynapseError::Generation(e.to_string()))?;
        Ok(data.response.unwrap_or_default().trim().to_string())
    }

    fn backend_name(&self) -> &str {
        "form-endpoint"
    }
}

#[derive(Deserialize)]
struct FormResponse {
    #[serde(default)]
    response: Option<String>,
}
