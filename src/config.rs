//! Configuration management for the campus agents service.
//!
//! Configuration can be set via environment variables:
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `8000`.
//! - `DEV_MODE` - Optional. Enables permissive CORS. Defaults to `true` in debug builds.
//! - `GENERATION_BACKEND` - Optional. `openai` or `hf_pipeline`. Defaults to `openai`.
//! - `GENERATION_URL` - Optional. Backend base URL. Defaults to `http://127.0.0.1:8080/v1`.
//! - `GENERATION_API_KEY` - Optional. Bearer token sent to the backend.
//! - `GENERATION_MODEL` - Optional. Defaults to `mistralai/Mistral-7B-Instruct-v0.3`.
//! - `MAX_NEW_TOKENS` - Optional. Cap on generated tokens.
//! - `MAX_LENGTH` - Optional. Cap on total sequence length. Defaults to `200`.
//! - `GENERATION_CONCURRENCY` - Optional. Concurrent generation calls. Defaults to `1`.
//! - `GENERATION_TIMEOUT_SECS` - Optional. Per-call timeout. Defaults to `120`.
//! - `INTENT_TIMEOUTS` - Optional. Per-intent overrides, e.g. `chat=30,infos=90`.
//! - `DOCUMENTS_PATH` - Optional. Reference documents file. Defaults to `data/documents.json`.
//! - `ERROR_POLICY` - Optional. `status` or `in_body`. Defaults to `status`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::agent::Intent;

pub const DEFAULT_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.3";
pub const DEFAULT_GENERATION_URL: &str = "http://127.0.0.1:8080/v1";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Which wire format the generation backend speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// OpenAI-compatible `/chat/completions` (vLLM, TGI, Ollama, ...)
    OpenAi,
    /// Hugging Face text-generation pipeline returning the full transcript
    HfPipeline,
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "openai_compatible" => Ok(Self::OpenAi),
            "hf_pipeline" | "pipeline" => Ok(Self::HfPipeline),
            other => Err(format!("expected `openai` or `hf_pipeline`, got: {}", other)),
        }
    }
}

/// How generation failures are reported to HTTP callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// `{error}` body with a status derived from the failure
    Status,
    /// `{error}` body with status 200
    InBody,
}

impl std::str::FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "status" => Ok(Self::Status),
            "in_body" | "legacy" => Ok(Self::InBody),
            other => Err(format!("expected `status` or `in_body`, got: {}", other)),
        }
    }
}

/// Generation backend configuration.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub backend: BackendKind,

    /// Base URL of the backend
    pub url: String,

    /// Optional bearer token
    pub api_key: Option<String>,

    /// Model identifier sent to the backend
    pub model: String,

    /// Cap on generated tokens
    pub max_new_tokens: Option<u32>,

    /// Cap on total sequence length (prompt + reply)
    pub max_length: u32,

    /// How many generation calls may run at once against the model
    pub concurrency: usize,

    /// Default timeout for one generation call, queue wait included
    pub timeout: Duration,

    /// Per-intent timeout overrides
    pub intent_timeouts: HashMap<Intent, Duration>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::OpenAi,
            url: DEFAULT_GENERATION_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_new_tokens: None,
            max_length: 200,
            concurrency: 1,
            timeout: Duration::from_secs(120),
            intent_timeouts: HashMap::new(),
        }
    }
}

impl GenerationConfig {
    /// Timeout that applies to a given intent.
    pub fn timeout_for(&self, intent: Intent) -> Duration {
        self.intent_timeouts
            .get(&intent)
            .copied()
            .unwrap_or(self.timeout)
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Development mode (permissive CORS)
    pub dev_mode: bool,

    /// Path to the static reference documents
    pub documents_path: PathBuf,

    /// Error reporting policy shared by every intent
    pub error_policy: ErrorPolicy,

    pub generation: GenerationConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = parse_env("PORT", 8000u16)?;

        let dev_mode = std::env::var("DEV_MODE")
            .ok()
            .map(|v| parse_bool(&v).map_err(|e| ConfigError::InvalidValue("DEV_MODE".to_string(), e)))
            .transpose()?
            // In debug builds, default to dev_mode=true; in release, default to false.
            .unwrap_or(cfg!(debug_assertions));

        let documents_path = std::env::var("DOCUMENTS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/documents.json"));

        let error_policy = parse_env("ERROR_POLICY", ErrorPolicy::Status)?;

        let concurrency = require_positive(
            "GENERATION_CONCURRENCY",
            parse_env::<usize>("GENERATION_CONCURRENCY", 1)?,
        )?;
        let timeout_secs = require_positive(
            "GENERATION_TIMEOUT_SECS",
            parse_env::<u64>("GENERATION_TIMEOUT_SECS", 120)?,
        )?;

        let intent_timeouts = std::env::var("INTENT_TIMEOUTS")
            .ok()
            .map(|v| {
                parse_intent_timeouts(&v)
                    .map_err(|e| ConfigError::InvalidValue("INTENT_TIMEOUTS".to_string(), e))
            })
            .transpose()?
            .unwrap_or_default();

        let generation = GenerationConfig {
            backend: parse_env("GENERATION_BACKEND", BackendKind::OpenAi)?,
            url: std::env::var("GENERATION_URL")
                .unwrap_or_else(|_| DEFAULT_GENERATION_URL.to_string()),
            api_key: std::env::var("GENERATION_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            model: std::env::var("GENERATION_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            max_new_tokens: std::env::var("MAX_NEW_TOKENS")
                .ok()
                .map(|v| {
                    v.parse::<u32>()
                        .map_err(|e| ConfigError::InvalidValue("MAX_NEW_TOKENS".to_string(), format!("{}", e)))
                })
                .transpose()?,
            max_length: parse_env("MAX_LENGTH", 200)?,
            concurrency,
            timeout: Duration::from_secs(timeout_secs),
            intent_timeouts,
        };

        Ok(Self {
            host,
            port,
            dev_mode,
            documents_path,
            error_policy,
            generation,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(documents_path: PathBuf, generation: GenerationConfig) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            dev_mode: true,
            documents_path,
            error_policy: ErrorPolicy::Status,
            generation,
        }
    }
}

/// Read an env var and parse it, falling back to `default` when unset.
fn parse_env<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        Err(_) => Ok(default),
    }
}

/// Reject a zero count or duration.
fn require_positive<T>(name: &str, value: T) -> Result<T, ConfigError>
where
    T: PartialEq + Default,
{
    if value == T::default() {
        return Err(ConfigError::InvalidValue(
            name.to_string(),
            "must be at least 1".to_string(),
        ));
    }
    Ok(value)
}

/// Parse `id=secs` pairs separated by commas. Zero seconds is rejected.
fn parse_intent_timeouts(value: &str) -> Result<HashMap<Intent, Duration>, String> {
    let mut timeouts = HashMap::new();
    for pair in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (id, secs) = pair
            .split_once('=')
            .ok_or_else(|| format!("expected `intent=seconds`, got: {}", pair))?;
        let intent = Intent::from_id(id.trim()).ok_or_else(|| format!("unknown intent: {}", id.trim()))?;
        let secs: u64 = secs
            .trim()
            .parse()
            .map_err(|e| format!("invalid seconds for {}: {}", id.trim(), e))?;
        if secs == 0 {
            return Err(format!("timeout for {} must be at least 1 second", id.trim()));
        }
        timeouts.insert(intent, Duration::from_secs(secs));
    }
    Ok(timeouts)
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Ok(false),
        other => Err(format!("expected boolean-like value, got: {}", other)),
    }
}
