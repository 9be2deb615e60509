//! Tree settings with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Optional TOML file passed to [`Settings::load`]
//! 3. Environment variables: `RELTREE_*` prefix

use std::path::Path;

use config::{Config, ConfigError, Environment};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::errors::{TreeError, TreeResult};

/// Prefix of environment variable overrides, e.g. `RELTREE_VERIFY_LINKS=true`.
pub const ENV_PREFIX: &str = "RELTREE";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Run a full link consistency check after every public mutation
    pub verify_links: bool,
    /// Number of arena slots reserved up front
    pub initial_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            verify_links: false,
            initial_capacity: 64,
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub verify_links: Option<bool>,
    pub initial_capacity: Option<usize>,
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            verify_links: overlay.verify_links.unwrap_or(self.verify_links),
            initial_capacity: overlay.initial_capacity.unwrap_or(self.initial_capacity),
        }
    }

    /// Parses settings from TOML; keys not present keep their defaults.
    pub fn from_toml_str(content: &str) -> TreeResult<Self> {
        let raw: RawSettings =
            toml::from_str(content).map_err(|e| TreeError::Config(format!("parse: {}", e)))?;
        Ok(Self::default().merge_with(&raw))
    }

    /// Load settings with layered precedence.
    ///
    /// A missing `config_file` is not an error; an unreadable or malformed
    /// one is.
    #[instrument(level = "debug")]
    pub fn load(config_file: Option<&Path>) -> TreeResult<Self> {
        let mut current = Self::default();

        if let Some(path) = config_file.filter(|p| p.exists()) {
            let content = std::fs::read_to_string(path)
                .map_err(|e| TreeError::Config(format!("read {}: {}", path.display(), e)))?;
            let raw: RawSettings = toml::from_str(&content)
                .map_err(|e| TreeError::Config(format!("parse {}: {}", path.display(), e)))?;
            current = current.merge_with(&raw);
        }

        current = Self::apply_env_overrides(current)?;
        debug!(?current, "settings loaded");
        Ok(current)
    }

    /// Env vars replace values, they are explicit overrides.
    fn apply_env_overrides(settings: Self) -> TreeResult<Self> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let raw = RawSettings {
            verify_links: env_value(&config, "verify_links"),
            initial_capacity: env_value(&config, "initial_capacity"),
        };
        Ok(settings.merge_with(&raw))
    }
}

/// Absent keys are silent; present but unparsable ones are logged and ignored.
fn env_value<V: DeserializeOwned>(config: &Config, key: &str) -> Option<V> {
    match config.get::<V>(key) {
        Ok(value) => Some(value),
        Err(ConfigError::NotFound(_)) => None,
        Err(e) => {
            warn!(key, error = %e, "ignoring malformed {}_* override", ENV_PREFIX);
            None
        }
    }
}
