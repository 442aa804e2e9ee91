// Path: crates/types/src/config/mod.rs

//! Configuration for the TMPop application (`tmpop.toml`).

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_true() -> bool {
    true
}

fn default_name() -> String {
    "tmpop".to_string()
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_description() -> String {
    "Links anchored in a BFT replicated log".to_string()
}

fn default_max_pending_heights() -> usize {
    64
}

fn default_max_buffered_events() -> usize {
    256
}

/// Top-level application configuration.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TmpopConfig {
    /// Name reported by `GetInfo`.
    #[serde(default = "default_name")]
    pub name: String,
    /// Version reported by `GetInfo`.
    #[serde(default = "default_version")]
    pub version: String,
    /// Description reported by `GetInfo`.
    #[serde(default = "default_description")]
    pub description: String,
    /// Content ruleset settings.
    #[serde(default)]
    pub validation: ValidationConfig,
    /// Evidence production settings.
    #[serde(default)]
    pub evidence: EvidenceConfig,
    /// Store event buffer settings.
    #[serde(default)]
    pub events: EventsConfig,
}

impl Default for TmpopConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
            description: default_description(),
            validation: ValidationConfig::default(),
            evidence: EvidenceConfig::default(),
            events: EventsConfig::default(),
        }
    }
}

/// Settings for the hot-reloadable content ruleset.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct ValidationConfig {
    /// Path to a JSON process-rules file. No ruleset is active when unset.
    #[serde(default)]
    pub rules_path: Option<PathBuf>,
}

/// Settings for evidence production.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct EvidenceConfig {
    /// Whether BeginBlock builds evidence for committed links.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Maximum number of committed heights kept waiting for evidence.
    /// Older heights are dropped with a warning.
    #[serde(default = "default_max_pending_heights")]
    pub max_pending_heights: usize,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            max_pending_heights: default_max_pending_heights(),
        }
    }
}

/// Settings for the store events served by `PendingEvents`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct EventsConfig {
    /// Maximum number of undrained events. The oldest are dropped first.
    #[serde(default = "default_max_buffered_events")]
    pub max_buffered: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            max_buffered: default_max_buffered_events(),
        }
    }
}

impl TmpopConfig {
    /// Parses a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&s)
    }
}
