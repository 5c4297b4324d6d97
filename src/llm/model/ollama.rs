// SPDX-License-Identifier: MIT

//! Ollama Model - local `/api/chat` implementation

use super::{chat_role, Content, GenerationConfig, Model, Part};
use crate::llm::error::{ModelError, QualifierError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Ollama chat model implementation
pub struct OllamaModel {
    client: Client,
    model_name: String,
    base_url: String,
}

impl OllamaModel {
    /// Create a new OllamaModel talking to `base_url` (defaults to localhost)
    pub fn new(model_name: String, base_url: Option<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            model_name,
            base_url,
        })
    }

    fn content_to_ollama_message(content: &Content) -> serde_json::Value {
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                Part::Thinking(_) => None,
            })
            .collect();

        json!({
            "role": chat_role(&content.role),
            "content": text
        })
    }

    fn build_request_body(
        &self,
        history: &[Content],
        config: Option<&GenerationConfig>,
    ) -> serde_json::Value {
        let messages: Vec<serde_json::Value> = history
            .iter()
            .map(Self::content_to_ollama_message)
            .collect();

        let mut body = json!({
            "model": self.model_name,
            "messages": messages,
            "stream": false
        });

        if let Some(cfg) = config {
            if let Some(temp) = cfg.temperature {
                body["options"] = json!({ "temperature": temp });
            }

            // Ollama takes either the literal "json" or a full schema in `format`
            if let Some(schema) = &cfg.response_schema {
                body["format"] = schema.clone();
            } else if cfg.json_mode {
                body["format"] = json!("json");
            }
        }

        body
    }

    fn parse_ollama_response(response: &serde_json::Value) -> Result<Content> {
        let message = response
            .get("message")
            .ok_or_else(|| ModelError::InvalidResponse("No message in Ollama response".into()))?;

        let mut parts = Vec::new();
        if let Some(thinking) = message["thinking"].as_str() {
            if !thinking.is_empty() {
                parts.push(Part::Thinking(thinking.to_string()));
            }
        }
        if let Some(content) = message["content"].as_str() {
            if !content.is_empty() {
                parts.push(Part::Text(content.to_string()));
            }
        }

        Ok(Content {
            role: "model".to_string(),
            parts,
        })
    }
}

#[async_trait]
impl Model for OllamaModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn generate_content(
        &self,
        history: &[Content],
        config: Option<&GenerationConfig>,
    ) -> Result<Content> {
        let url = format!("{}/api/chat", self.base_url);
        let body = self.build_request_body(history, config);

        log::debug!(
            "Ollama request body: {}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );

        let resp = self.client.post(&url).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await?;
            return Err(QualifierError::api(
                "Ollama",
                format!("HTTP {}: {}", status, text),
            ));
        }

        let resp_json: serde_json::Value = resp.json().await?;
        log::debug!("Ollama response: {}", resp_json);

        Self::parse_ollama_response(&resp_json)
    }
}
