//! Recording client configuration.

use std::path::PathBuf;

use httptap_models::DEFAULT_NAMESPACE;
use serde::{Deserialize, Serialize};

const NAMESPACE_ENV: &str = "HTTPTAP_NAMESPACE";
const ENABLED_ENV: &str = "HTTPTAP_ENABLED";

/// Configuration bundle for a [`RecordingClient`](crate::RecordingClient).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Label every captured record is filed under.
    pub namespace: String,
    /// Whether calls are captured at all.
    pub enabled: bool,
    /// Store base directory. Falls back to `HTTPTAP_DIR`, then `~/.config/httptap`.
    pub storage_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            enabled: false,
            storage_dir: None,
        }
    }
}

impl ClientConfig {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = Some(dir.into());
        self
    }

    /// Build from `HTTPTAP_NAMESPACE` and `HTTPTAP_ENABLED`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(namespace) = lookup(NAMESPACE_ENV) {
            config.namespace = namespace;
        }
        if let Some(enabled) = lookup(ENABLED_ENV) {
            config.enabled = parse_flag(&enabled);
        }
        config.normalized()
    }

    /// Replace a blank namespace with the default one.
    pub fn normalized(mut self) -> Self {
        let trimmed = self.namespace.trim();
        self.namespace = if trimmed.is_empty() {
            DEFAULT_NAMESPACE.to_string()
        } else {
            trimmed.to_string()
        };
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
