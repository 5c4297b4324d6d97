// SPDX-License-Identifier: MIT

//! Model factory - picks a backend from settings and builds it

use crate::llm::error::{ModelError, Result};
use crate::llm::model::ollama::OllamaModel;
use crate::llm::model::openai::OpenAIModel;
use crate::llm::model::Model;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_MODEL_NAME: &str = "llama3:8b";

/// Supported reasoning backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Ollama,
    OpenAI,
}

impl FromStr for Provider {
    type Err = ModelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" | "" => Ok(Provider::Ollama),
            "openai" => Ok(Provider::OpenAI),
            _ => Err(ModelError::UnknownProvider(s.to_string())),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Ollama => write!(f, "Ollama"),
            Provider::OpenAI => write!(f, "OpenAI"),
        }
    }
}

/// Everything needed to construct a [`Model`]
#[derive(Debug, Clone)]
pub struct ModelSettings {
    /// Explicit provider; inferred from `model_name` when unset
    pub provider: Option<String>,
    pub model_name: String,
    pub ollama_base_url: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    /// Per-request timeout for the reasoning call
    pub timeout: Duration,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: None,
            model_name: DEFAULT_MODEL_NAME.to_string(),
            ollama_base_url: None,
            openai_api_key: None,
            openai_base_url: None,
            timeout: Duration::from_secs(120),
        }
    }
}

/// Infer the provider from the model name prefix
pub fn infer_provider_from_model(model_name: &str) -> Provider {
    let name = model_name.to_lowercase();
    if name.starts_with("gpt") || name.starts_with("o1") || name.starts_with("o3") {
        Provider::OpenAI
    } else {
        Provider::Ollama
    }
}

/// Build the configured model behind a trait object
pub fn create_model(settings: &ModelSettings) -> Result<Arc<dyn Model>> {
    let provider = match &settings.provider {
        Some(p) => p.parse::<Provider>()?,
        None => infer_provider_from_model(&settings.model_name),
    };

    log::info!(
        "Using provider '{}' with model '{}'",
        provider,
        settings.model_name
    );

    match provider {
        Provider::Ollama => Ok(Arc::new(OllamaModel::new(
            settings.model_name.clone(),
            settings.ollama_base_url.clone(),
            settings.timeout,
        )?)),
        Provider::OpenAI => Ok(Arc::new(OpenAIModel::new(
            settings.model_name.clone(),
            settings.openai_api_key.clone(),
            settings.openai_base_url.clone(),
            settings.timeout,
        )?)),
    }
}
