//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `lightpresets.toml` in the working directory, or the file named
//! by `LIGHTPRESETS_CONFIG`. Every field has a sensible default so the file
//! is optional. Environment variables take precedence over file values.

use std::collections::BTreeMap;

use serde::Deserialize;

use lightpresets_domain::error::PresetsError;
use lightpresets_domain::group::{GroupDefinition, is_slug};
use lightpresets_domain::preset::PresetSpec;
use lightpresets_domain::registry::GroupRegistry;
use lightpresets_domain::service::EntityTarget;

/// Default configuration file name.
pub const DEFAULT_PATH: &str = "lightpresets.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// In-memory host settings.
    pub host: HostConfig,
    /// Light groups keyed by their slug id.
    pub groups: BTreeMap<String, GroupConfig>,
    /// Entity values seeded into the host at startup.
    pub states: BTreeMap<String, String>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// In-memory host configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Capacity of the host event bus.
    pub event_capacity: usize,
}

/// One light group as written in the configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupConfig {
    /// Entity whose value selects the active preset.
    pub preset: String,
    /// Presets keyed by their slug name.
    #[serde(default)]
    pub presets: BTreeMap<String, PresetSpec>,
    /// A single light id or a list of them.
    pub lights: EntityTarget,
}

impl Config {
    /// Load configuration from `LIGHTPRESETS_CONFIG` or `lightpresets.toml`
    /// (if present) then apply environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed or invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var("LIGHTPRESETS_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Read and parse `path`; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => content.parse(),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("LIGHTPRESETS_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    /// Check everything that can be checked before building groups.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for a zero bus capacity, a group
    /// id or preset name that is not a slug, or an empty light list.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.event_capacity == 0 {
            return Err(ConfigError::Validation(
                "host.event_capacity must be non-zero".to_string(),
            ));
        }
        for (id, group) in &self.groups {
            if !is_slug(id) {
                return Err(ConfigError::Validation(format!(
                    "group id {id:?} must be a slug"
                )));
            }
            if let Some(name) = group.presets.keys().find(|name| !is_slug(name)) {
                return Err(ConfigError::Validation(format!(
                    "preset {name:?} of group {id} must be a slug"
                )));
            }
            if group.lights.ids().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "group {id} must list at least one light"
                )));
            }
        }
        Ok(())
    }

    /// Build the group registry, in group id order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Group`] when a group violates a domain invariant.
    /// Call [`validate`](Self::validate) first for friendlier messages.
    pub fn registry(&self) -> Result<GroupRegistry, ConfigError> {
        let groups = self
            .groups
            .iter()
            .map(|(id, group)| {
                group.to_definition(id).map_err(|source| ConfigError::Group {
                    id: id.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        GroupRegistry::new(groups).map_err(|err| ConfigError::Validation(err.to_string()))
    }
}

impl std::str::FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s).map_err(ConfigError::Parse)
    }
}

impl GroupConfig {
    /// Validated domain definition of this group, identified by `id`.
    ///
    /// # Errors
    ///
    /// Returns [`PresetsError::Validation`] if the definition is invalid.
    pub fn to_definition(&self, id: &str) -> Result<GroupDefinition, PresetsError> {
        self.presets
            .iter()
            .fold(
                GroupDefinition::builder()
                    .id(id)
                    .preset_selector(self.preset.as_str())
                    .lights(self.lights.ids()),
                |builder, (name, spec)| builder.preset(name, spec.clone()),
            )
            .build()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "lightpresetsd=info,lightpresets_app=info".to_string(),
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            event_capacity: lightpresets_adapter_memory::DEFAULT_BUS_CAPACITY,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
    /// A group could not be built.
    #[error("invalid group {id}")]
    Group {
        id: String,
        #[source]
        source: PresetsError,
    },
}
