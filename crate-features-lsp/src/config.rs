//! Configuration for the feature completion server
//!
//! Read once from the LSP `initializationOptions`. Every field has a
//! default, and options that fail to deserialize fall back to defaults as a
//! whole rather than failing initialization.

use std::time::Duration;

use serde::Deserialize;

use crate::registries::crates_io::CRATES_IO_API_URL;

/// Default registry request timeout (5 seconds)
const DEFAULT_REGISTRY_TIMEOUT_SECS: u64 = 5;

/// LSP configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Completion configuration
    pub completion: CompletionConfig,
    /// Registry configuration
    pub registry: RegistryConfig,
    /// Crates for which no features are suggested (`*` wildcard allowed)
    #[serde(default)]
    pub ignore: Vec<String>,
}

/// Completion configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Offer feature completions at all
    pub enabled: bool,
    /// Show what each feature enables next to the suggestion
    pub show_enables: bool,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            show_enables: true,
        }
    }
}

/// Registry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Base URL of a crates.io-compatible web API
    pub url: String,
    /// Timeout for a single registry request, in seconds
    pub timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: CRATES_IO_API_URL.to_string(),
            timeout_secs: DEFAULT_REGISTRY_TIMEOUT_SECS,
        }
    }
}

impl RegistryConfig {
    /// Request timeout, never zero
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Config {
    /// Parse configuration from initialization options
    pub fn from_init_options(options: Option<serde_json::Value>) -> Self {
        match options {
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                tracing::warn!("Invalid initialization options, using defaults: {}", e);
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// Whether suggestions for `crate_name` are suppressed by `ignore`
    pub fn is_ignored(&self, crate_name: &str) -> bool {
        self.ignore.iter().any(|pattern| {
            if pattern.contains('*') {
                let parts: Vec<&str> = pattern.split('*').collect();
                if parts.len() == 2 {
                    crate_name.starts_with(parts[0]) && crate_name.ends_with(parts[1])
                } else {
                    crate_name.starts_with(parts[0])
                }
            } else {
                crate_name == pattern
            }
        })
    }
}
