use thiserror::Error;

#[derive(Error, Debug)]
pub enum DixitError {
    #[error("Not enough cards to deal: needed {needed}, deck holds {available}")]
    DeckExhausted { needed: usize, available: usize },

    #[error("Evaluator '{backend}' unavailable: {message}")]
    EvaluatorUnavailable { backend: String, message: String },

    #[error("Evaluator '{backend}' rate limited{}", retry_hint(.retry_after_secs))]
    EvaluatorRateLimited {
        backend: String,
        retry_after_secs: Option<u64>,
    },

    #[error("Evaluator '{backend}' returned a malformed response: {message}")]
    MalformedResponse { backend: String, message: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfiguration {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration field: {field}")]
    MissingConfig { field: String },

    #[error("Duplicate player name: {name}")]
    DuplicatePlayerName { name: String },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    #[error("Response cache error: {0}")]
    CacheError(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

fn retry_hint(retry_after_secs: &Option<u64>) -> String {
    retry_after_secs
        .map(|secs| format!(" (retry after {}s)", secs))
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Game,
    Upstream,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DixitError {
    pub fn unavailable(backend: &str, message: impl Into<String>) -> Self {
        Self::EvaluatorUnavailable {
            backend: backend.to_string(),
            message: message.into(),
        }
    }

    pub fn malformed(backend: &str, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            backend: backend.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_config(
        field: &str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfiguration {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidConfiguration { .. }
            | Self::MissingConfig { .. }
            | Self::DuplicatePlayerName { .. }
            | Self::ConfigParse { .. } => ErrorCategory::Configuration,
            Self::DeckExhausted { .. } => ErrorCategory::Game,
            Self::EvaluatorUnavailable { .. }
            | Self::EvaluatorRateLimited { .. }
            | Self::MalformedResponse { .. } => ErrorCategory::Upstream,
            Self::CacheError(_) | Self::IoError(_) | Self::SerializationError(_) => {
                ErrorCategory::Storage
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 上游暫時性錯誤，稍後重跑即可
            Self::EvaluatorUnavailable { .. } | Self::EvaluatorRateLimited { .. } => {
                ErrorSeverity::Medium
            }
            Self::CacheError(_) | Self::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// 提供給使用者的修復建議
    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::DeckExhausted { needed, .. } => format!(
                "Add more images to the image directory (at least {} are required) or reduce the number of players",
                needed
            ),
            Self::EvaluatorUnavailable { backend, .. } => format!(
                "Check the endpoint and API key configured for the '{}' backend, then rerun; cached responses are kept",
                backend
            ),
            Self::EvaluatorRateLimited { .. } => {
                "Increase evaluator.call_delay_ms or wait before rerunning".to_string()
            }
            Self::MalformedResponse { .. } => {
                "Verify the configured model supports image input".to_string()
            }
            Self::InvalidConfiguration { field, .. } => {
                format!("Fix the value of '{}' in the configuration file", field)
            }
            Self::MissingConfig { field } => {
                format!("Add '{}' to the configuration file", field)
            }
            Self::DuplicatePlayerName { .. } => "Give every player a unique name".to_string(),
            Self::ConfigParse { .. } => "Check the TOML syntax of the configuration file".to_string(),
            Self::CacheError(_) => {
                "Check that the cache database path is writable, or run with --no-cache".to_string()
            }
            Self::IoError(_) => "Check file paths and permissions".to_string(),
            Self::SerializationError(_) => "Check the round log output path".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Game => format!("The game could not be set up: {}", self),
            ErrorCategory::Upstream => format!("The game was aborted by a vision backend failure: {}", self),
            ErrorCategory::Storage => format!("Storage failure: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, DixitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_errors_are_retryable_severity() {
        let err = DixitError::unavailable("openai", "connection refused");
        assert_eq!(err.category(), ErrorCategory::Upstream);
        assert_eq!(err.severity(), ErrorSeverity::Medium);

        let err = DixitError::EvaluatorRateLimited {
            backend: "claude".to_string(),
            retry_after_secs: Some(3),
        };
        assert_eq!(err.to_string(), "Evaluator 'claude' rate limited (retry after 3s)");
    }

    #[test]
    fn test_deck_exhausted_message() {
        let err = DixitError::DeckExhausted {
            needed: 24,
            available: 10,
        };
        assert_eq!(err.category(), ErrorCategory::Game);
        assert!(err.recovery_suggestion().contains("24"));
    }
}
