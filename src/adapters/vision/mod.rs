// Vision backends: one `VisionBackend` implementation per provider.

pub mod claude;
pub mod gemini;
pub mod openai;

pub use claude::ClaudeBackend;
pub use gemini::GeminiBackend;
pub use openai::OpenAiCompatibleBackend;

use crate::domain::ports::VisionBackend;
use crate::utils::error::{DixitError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_url, Validate};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    OpenAi,
    Claude,
    Gemini,
    Groq,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Claude => "claude",
            Self::Gemini => "gemini",
            Self::Groq => "groq",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1/chat/completions",
            Self::Claude => "https://api.anthropic.com/v1/messages",
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta/models",
            Self::Groq => "https://api.groq.com/openai/v1/chat/completions",
        }
    }

    pub fn default_max_tokens(&self) -> u32 {
        match self {
            Self::OpenAi | Self::Claude => 50,
            Self::Gemini => 8192,
            Self::Groq => 1000,
        }
    }
}

/// 每個後端在建構時取得的明確設定；核心不讀取環境變數
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub backend: BackendKind,
    pub model: String,
    pub api_key: String,
    pub endpoint: Option<String>,
    pub max_tokens: Option<u32>,
    pub timeout_seconds: Option<u64>,
}

impl BackendConfig {
    pub fn new(backend: BackendKind, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
            api_key: api_key.into(),
            endpoint: None,
            max_tokens: None,
            timeout_seconds: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.backend.default_endpoint())
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
            .unwrap_or_else(|| self.backend.default_max_tokens())
    }

    fn http_client(&self) -> Result<Client> {
        let timeout = Duration::from_secs(self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS));
        Client::builder().timeout(timeout).build().map_err(|e| {
            DixitError::invalid_config("timeout_seconds", timeout.as_secs(), e.to_string())
        })
    }
}

impl Validate for BackendConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("players.model", &self.model)?;
        // An unset ${VAR} is left verbatim by the loader.
        if self.api_key.trim().is_empty() || self.api_key.starts_with("${") {
            return Err(DixitError::MissingConfig {
                field: format!("players.api_key ({})", self.backend.as_str()),
            });
        }
        validate_url("players.endpoint", self.endpoint())?;
        if self.max_tokens == Some(0) {
            return Err(DixitError::invalid_config(
                "players.max_tokens",
                0,
                "Value must be at least 1",
            ));
        }
        Ok(())
    }
}

/// 依設定建立對應的後端。這是唯一依後端種類分支的地方。
pub fn create_backend(config: &BackendConfig) -> Result<Arc<dyn VisionBackend>> {
    config.validate()?;
    let client = config.http_client()?;

    let backend: Arc<dyn VisionBackend> = match config.backend {
        BackendKind::OpenAi => Arc::new(OpenAiCompatibleBackend::openai(client, config)),
        BackendKind::Groq => Arc::new(OpenAiCompatibleBackend::groq(client, config)),
        BackendKind::Claude => Arc::new(ClaudeBackend::new(client, config)),
        BackendKind::Gemini => Arc::new(GeminiBackend::new(client, config)),
    };

    tracing::debug!(
        "Created {} backend for model {} at {}",
        backend.name(),
        backend.model(),
        config.endpoint()
    );
    Ok(backend)
}

/// Send a JSON request and map HTTP failures onto the evaluator error taxonomy.
pub(crate) async fn send_json(backend: &str, request: RequestBuilder) -> Result<serde_json::Value> {
    let response = request
        .send()
        .await
        .map_err(|e| DixitError::unavailable(backend, format!("request failed: {}", e)))?;

    let status = response.status();
    tracing::debug!("{} responded with {}", backend, status);

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get("retry-after")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok());
        return Err(DixitError::EvaluatorRateLimited {
            backend: backend.to_string(),
            retry_after_secs,
        });
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(200).collect();
        return Err(DixitError::unavailable(
            backend,
            format!("API request failed with status code {}: {}", status.as_u16(), snippet),
        ));
    }

    response
        .json()
        .await
        .map_err(|e| DixitError::malformed(backend, format!("invalid JSON body: {}", e)))
}

/// Follow a JSON pointer to a string field.
pub(crate) fn extract_text(backend: &str, body: &serde_json::Value, pointer: &str) -> Result<String> {
    body.pointer(pointer)
        .and_then(|value| value.as_str())
        .map(str::to_string)
        .ok_or_else(|| DixitError::malformed(backend, format!("missing {} in response", pointer)))
}
