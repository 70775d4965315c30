//! TOML-based application configuration.
//!
//! Stores:
//! - The decay policy used by the health engine
//! - The periodic health-check interval
//! - Defaults offered when creating a habit
//!
//! Configuration is stored at `~/.config/menagerie/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::ConfigError;
use crate::habit::animal::DEFAULT_ANIMAL;
use crate::habit::cadence::{DEFAULT_CADENCE_SECS, MIN_CADENCE_SECS};
use crate::habit::{DecayPolicy, HabitDraft, DEFAULT_DECREMENT, FULL_HEALTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    Halving,
    FixedDecrement,
}

/// Health engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_policy")]
    pub policy: PolicyKind,
    /// Only read by the fixed-decrement policy.
    #[serde(default = "default_decrement")]
    pub decrement: f64,
}

/// Periodic health-check configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickConfig {
    #[serde(default = "default_tick_interval")]
    pub interval_secs: u64,
}

/// Values pre-filled when creating a habit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_cadence")]
    pub cadence_secs: u64,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_animal")]
    pub animal: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/menagerie/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub tick: TickConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

// Default functions
fn default_policy() -> PolicyKind {
    PolicyKind::Halving
}
fn default_decrement() -> f64 {
    DEFAULT_DECREMENT
}
fn default_tick_interval() -> u64 {
    10
}
fn default_cadence() -> u64 {
    DEFAULT_CADENCE_SECS
}
fn default_color() -> String {
    "#88aaee".into()
}
fn default_animal() -> String {
    DEFAULT_ANIMAL.into()
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            policy: default_policy(),
            decrement: default_decrement(),
        }
    }
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_tick_interval(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            cadence_secs: default_cadence(),
            color: default_color(),
            animal: default_animal(),
        }
    }
}

impl HealthConfig {
    pub fn decay_policy(&self) -> DecayPolicy {
        match self.policy {
            PolicyKind::Halving => DecayPolicy::Halving,
            PolicyKind::FixedDecrement => DecayPolicy::FixedDecrement {
                decrement: self.decrement,
            },
        }
    }
}

impl TickConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else {
                        value
                            .parse::<f64>()
                            .ok()
                            .and_then(serde_json::Number::from_f64)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the data directory, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
    }

    /// Reject settings that would break health tracking.
    ///
    /// The tick must fire more often than the shortest cadence so no
    /// decay transition is skipped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick.interval_secs == 0 || self.tick.interval_secs >= MIN_CADENCE_SECS {
            return Err(ConfigError::InvalidValue {
                key: "tick.interval_secs".into(),
                message: format!("must be between 1 and {}", MIN_CADENCE_SECS - 1),
            });
        }
        if !(self.health.decrement > 0.0 && self.health.decrement <= FULL_HEALTH) {
            return Err(ConfigError::InvalidValue {
                key: "health.decrement".into(),
                message: format!("must be in (0, {FULL_HEALTH}]"),
            });
        }
        let draft = HabitDraft::new("defaults", self.defaults.color.clone(), self.defaults.cadence_secs)
            .with_animal(self.defaults.animal.clone());
        draft.validate().map_err(|e| ConfigError::InvalidValue {
            key: "defaults".into(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Change a value in memory by dot-separated key, validating the result.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and persist. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }
}
