// SPDX-License-Identifier: MIT

//! OpenAI Model - chat completions API implementation

use super::{chat_role, Content, GenerationConfig, Model, Part};
use crate::llm::error::{ModelError, QualifierError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI ChatGPT model implementation
pub struct OpenAIModel {
    client: Client,
    api_key: String,
    model_name: String,
    base_url: String,
}

impl OpenAIModel {
    /// Create a new OpenAIModel
    ///
    /// `timeout` bounds the whole request, including reading the completion.
    pub fn new(
        model_name: String,
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = api_key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ModelError::ApiKeyMissing("OpenAI".to_string()))?;
        let base_url = base_url.unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());

        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            model_name,
            base_url,
        })
    }

    /// Convert internal Content to OpenAI message format
    fn content_to_openai_message(content: &Content) -> serde_json::Value {
        let mut text_content = String::new();
        for part in &content.parts {
            if let Part::Text(t) = part {
                text_content.push_str(t);
            }
        }

        json!({
            "role": chat_role(&content.role),
            "content": text_content
        })
    }

    /// Build the request body for a chat completion
    fn build_request_body(
        &self,
        history: &[Content],
        config: Option<&GenerationConfig>,
    ) -> serde_json::Value {
        let messages: Vec<serde_json::Value> = history
            .iter()
            .map(Self::content_to_openai_message)
            .collect();

        let mut body = json!({
            "model": self.model_name,
            "messages": messages
        });

        if let Some(cfg) = config {
            if let Some(temp) = cfg.temperature {
                body["temperature"] = json!(temp);
            }
            if let Some(schema) = &cfg.response_schema {
                body["response_format"] = json!({
                    "type": "json_schema",
                    "json_schema": {
                        "name": "response",
                        "schema": schema,
                        "strict": false
                    }
                });
            } else if cfg.json_mode {
                body["response_format"] = json!({ "type": "json_object" });
            }
        }

        body
    }

    /// Parse OpenAI response into Content
    fn parse_openai_response(response: &serde_json::Value) -> Result<Content> {
        let choice = response["choices"]
            .as_array()
            .and_then(|c| c.first())
            .ok_or_else(|| ModelError::InvalidResponse("No choices in OpenAI response".into()))?;

        let mut parts = Vec::new();
        if let Some(content) = choice["message"]["content"].as_str() {
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
impl Model for OpenAIModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn generate_content(
        &self,
        history: &[Content],
        config: Option<&GenerationConfig>,
    ) -> Result<Content> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_request_body(history, config);

        log::debug!(
            "OpenAI request body: {}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await?;
            return Err(QualifierError::api(
                "OpenAI",
                format!("HTTP {}: {}", status, text),
            ));
        }

        let resp_json: serde_json::Value = resp.json().await?;
        log::debug!("OpenAI response: {}", resp_json);

        Self::parse_openai_response(&resp_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model() -> OpenAIModel {
        OpenAIModel::new(
            "gpt-4o-mini".to_string(),
            Some("sk-test".to_string()),
            None,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let err = OpenAIModel::new("gpt-4o".into(), None, None, Duration::from_secs(1))
            .err()
            .unwrap();
        assert!(err.to_string().contains("API key not configured"));

        let err = OpenAIModel::new("gpt-4o".into(), Some(String::new()), None, Duration::from_secs(1))
            .err()
            .unwrap();
        assert!(err.to_string().contains("OpenAI"));
    }

    #[test]
    fn test_content_to_openai_user_message() {
        let msg = OpenAIModel::content_to_openai_message(&Content::user("Hello"));
        assert_eq!(msg["role"], "user");
        assert_eq!(msg["content"], "Hello");
    }

    #[test]
    fn test_content_to_openai_assistant_message() {
        let msg = OpenAIModel::content_to_openai_message(&Content::model("I can help"));
        assert_eq!(msg["role"], "assistant");
        assert_eq!(msg["content"], "I can help");
    }

    #[test]
    fn test_request_body_json_mode() {
        let cfg = GenerationConfig::json(None);
        let body = model().build_request_body(&[Content::user("hi")], Some(&cfg));
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["temperature"], json!(0.0));
        assert_eq!(body["response_format"]["type"], "json_object");

        let mut keys: Vec<_> = body.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, ["messages", "model", "response_format", "temperature"]);
    }

    #[test]
    fn test_request_body_with_schema() {
        let schema = json!({"type": "object", "properties": {"classification": {"type": "string"}}});
        let cfg = GenerationConfig::json(Some(schema.clone()));
        let body = model().build_request_body(&[Content::user("hi")], Some(&cfg));
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["schema"], schema);
    }

    #[test]
    fn test_request_body_without_config() {
        let body = model().build_request_body(&[Content::user("hi")], None);
        assert!(body.get("response_format").is_none());
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_parse_openai_text_response() {
        let response = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "{\"classification\": \"spam\"}"
                }
            }]
        });

        let content = OpenAIModel::parse_openai_response(&response).unwrap();
        assert_eq!(content.role, "model");
        assert_eq!(content.text(), "{\"classification\": \"spam\"}");
    }

    #[test]
    fn test_parse_openai_response_without_choices() {
        let err = OpenAIModel::parse_openai_response(&json!({"error": "boom"}))
            .err()
            .unwrap();
        assert!(err.to_string().contains("No choices"));
    }
}
