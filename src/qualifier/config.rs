// SPDX-License-Identifier: MIT

//! Runtime settings, read from the environment (and `.env` via dotenv)

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::llm::error::{QualifierError, Result};
use crate::llm::factory::{ModelSettings, DEFAULT_MODEL_NAME};
use crate::qualifier::store::sqlite::DEFAULT_DATABASE_URL;
use crate::qualifier::tools::website::DEFAULT_LOOKUP_TIMEOUT;

#[derive(Debug, Clone)]
pub struct Settings {
    pub model: ModelSettings,
    pub website_timeout: Duration,
    pub database_url: String,
    /// Also store leads that end after classification
    pub persist_non_sales: bool,
    pub host: IpAddr,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: ModelSettings::default(),
            website_timeout: DEFAULT_LOOKUP_TIMEOUT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            persist_non_sales: false,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 8000,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let model = ModelSettings {
            provider: get("MODEL_PROVIDER"),
            model_name: get("MODEL_NAME").unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string()),
            ollama_base_url: get("OLLAMA_BASE_URL"),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL"),
            timeout: match get("LLM_TIMEOUT_SECS") {
                Some(v) => Duration::from_secs(parse_number("LLM_TIMEOUT_SECS", &v)?),
                None => defaults.model.timeout,
            },
        };

        Ok(Self {
            model,
            website_timeout: match get("WEBSITE_TIMEOUT_SECS") {
                Some(v) => Duration::from_secs(parse_number("WEBSITE_TIMEOUT_SECS", &v)?),
                None => defaults.website_timeout,
            },
            database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
            persist_non_sales: match get("PERSIST_NON_SALES") {
                Some(v) => parse_bool("PERSIST_NON_SALES", &v)?,
                None => defaults.persist_non_sales,
            },
            host: match get("HOST") {
                Some(v) => v
                    .parse()
                    .map_err(|_| QualifierError::config(format!("HOST is not an IP address: {}", v)))?,
                None => defaults.host,
            },
            port: match get("PORT") {
                Some(v) => parse_number("PORT", &v)?,
                None => defaults.port,
            },
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| QualifierError::config(format!("{} must be a number, got '{}'", key, value)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(QualifierError::config(format!(
            "{} must be a boolean, got '{}'",
            key, value
        ))),
    }
}
