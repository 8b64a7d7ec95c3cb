//! Configuration management

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Scheme and host prefix of the web translator; the tld is appended
pub const TRANSLATE_PATH: &str = "https://translate.google.";

/// Content type forced on every batchexecute POST
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=UTF-8";

/// Options forwarded to the transport
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestOptions {
    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: IndexMap<String, String>,
    /// Per-request timeout, applied by the transport
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

/// Configuration for translator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub tld: String,
    pub from: String,
    pub to: String,
    pub force_from: bool,
    pub force_to: bool,
    pub auto_correct: bool,
    pub request_options: RequestOptions,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            tld: "com".to_string(),
            from: "auto".to_string(),
            to: "en".to_string(),
            force_from: false,
            force_to: false,
            auto_correct: false,
            request_options: RequestOptions::default(),
        }
    }
}

fn env_flag(name: &str) -> anyhow::Result<Option<bool>> {
    match std::env::var(name) {
        Ok(value) => Ok(Some(value.parse::<bool>().map_err(|_| {
            anyhow::anyhow!("{} must be true or false, got {:?}", name, value)
        })?)),
        Err(_) => Ok(None),
    }
}

impl TranslatorConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let tld = std::env::var("GTRANSLATE_TLD").unwrap_or(defaults.tld);
        let from = std::env::var("GTRANSLATE_FROM").unwrap_or(defaults.from);
        let to = std::env::var("GTRANSLATE_TO").unwrap_or(defaults.to);

        let auto_correct = env_flag("GTRANSLATE_AUTO_CORRECT")?.unwrap_or(defaults.auto_correct);

        let timeout_ms = match std::env::var("GTRANSLATE_TIMEOUT_MS") {
            Ok(value) => Some(value.parse::<u64>()?),
            Err(_) => None,
        };

        let config = Self {
            tld,
            from,
            to,
            auto_correct,
            request_options: RequestOptions {
                timeout_ms,
                ..Default::default()
            },
            ..defaults
        };

        info!("Loaded translator config for translate.google.{}", config.tld);
        Ok(config)
    }

    /// Load from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.tld.is_empty() {
            return Err(anyhow::anyhow!("tld is required"));
        }

        if self.from.is_empty() {
            return Err(anyhow::anyhow!("default source language is required"));
        }

        if self.to.is_empty() {
            return Err(anyhow::anyhow!("default target language is required"));
        }

        if self.request_options.timeout_ms == Some(0) {
            warn!("timeout_ms is 0, requests will time out immediately");
        }

        Ok(())
    }

    /// Root of the web translator for the configured tld
    pub fn base_url(&self) -> String {
        format!("{}{}", TRANSLATE_PATH, self.tld)
    }

    /// batchexecute endpoint, without query string
    pub fn batch_execute_url(&self) -> String {
        format!(
            "{}/_/TranslateWebserverUi/data/batchexecute",
            self.base_url()
        )
    }
}
