//! Custom error types for translation operations

use thiserror::Error;

use crate::core::config::TranslatorConfig;

/// Which language field of a batch item failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageField {
    /// Source language
    From,
    /// Target language
    To,
}

impl std::fmt::Display for LanguageField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LanguageField::From => write!(f, "from"),
            LanguageField::To => write!(f, "to"),
        }
    }
}

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Language could not be resolved to an ISO code
    #[error(
        "{field} language {value} unsupported, bypass this with force_{field} if you're certain the iso is correct"
    )]
    UnsupportedLanguage {
        field: LanguageField,
        value: String,
    },

    /// Service answered with a non-OK status
    #[error("Transport error: {status_text} ({url})")]
    Transport {
        status_text: String,
        url: String,
        options: Box<TranslatorConfig>,
    },

    /// Response body did not follow the batchexecute grammar
    #[error("Decode error: {message}")]
    Decode {
        message: String,
    },

    /// No record in the response answered this input position
    #[error("Missing result for input at position {index}")]
    MissingResult {
        index: usize,
    },

    /// Network error
    #[error("Network error: {message}")]
    NetworkError {
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    /// Wrapper for anyhow errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl TranslationError {
    pub(crate) fn decode(message: impl Into<String>) -> Self {
        TranslationError::Decode {
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for TranslationError {
    fn from(err: anyhow::Error) -> Self {
        TranslationError::InternalError(err.to_string())
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;
