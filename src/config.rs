//! Engine configuration.
//!
//! Every field has a default, so a JSON file only needs the values it
//! changes:
//!
//! ```json
//! { "midgame": "greedy", "profile": "positional", "move_time_ms": 500 }
//! ```
//!
//! `"move_time_ms": null` disables the per-move deadline.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::anneal::AnnealingSchedule;
use crate::engine::MidgameStrategy;
use crate::evaluator::EvalProfile;

/// Default per-move time budget in milliseconds.
pub const DEFAULT_MOVE_TIME_MS: u64 = 2_000;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read or written.
    #[error("Config I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON or unknown fields.
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Values outside their allowed range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Decision engine settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Midgame strategy.
    pub midgame: MidgameStrategy,
    /// Evaluation profile used by the midgame strategy.
    pub profile: EvalProfile,
    /// Annealing cooling schedule.
    pub schedule: AnnealingSchedule,
    /// Per-move time budget; `None` means unbounded.
    pub move_time_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            midgame: MidgameStrategy::Annealing,
            profile: EvalProfile::DiscCorner,
            schedule: AnnealingSchedule::default(),
            move_time_ms: Some(DEFAULT_MOVE_TIME_MS),
        }
    }
}

impl EngineConfig {
    /// Greedy one-ply midgame with corner, mobility and stability terms.
    pub fn positional() -> Self {
        Self {
            midgame: MidgameStrategy::Greedy,
            profile: EvalProfile::Positional,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Write as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// `ConfigError::Invalid` if the schedule could not cool to its minimum
    /// or the time budget is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.schedule;
        if !(s.min_temperature.is_finite() && s.min_temperature > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "min_temperature must be positive, got {}",
                s.min_temperature
            )));
        }
        if !(s.initial_temperature.is_finite() && s.initial_temperature > s.min_temperature) {
            return Err(ConfigError::Invalid(format!(
                "initial_temperature must exceed min_temperature ({}), got {}",
                s.min_temperature, s.initial_temperature
            )));
        }
        if !(s.cooling_rate > 0.0 && s.cooling_rate < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "cooling_rate must be in (0, 1), got {}",
                s.cooling_rate
            )));
        }
        if self.move_time_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "move_time_ms must be positive or null".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = EngineConfig::default();
        assert_eq!(config.midgame, MidgameStrategy::Annealing);
        assert_eq!(config.profile, EvalProfile::DiscCorner);
        assert_eq!(config.schedule.initial_temperature, 100.0);
        assert_eq!(config.schedule.cooling_rate, 0.95);
        assert_eq!(config.schedule.min_temperature, 1.0);
        assert_eq!(config.move_time_ms, Some(2_000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            EngineConfig::from_json(r#"{ "midgame": "greedy", "profile": "positional" }"#).unwrap();
        assert_eq!(config, EngineConfig::positional());

        let config = EngineConfig::from_json(r#"{ "schedule": { "cooling_rate": 0.9 } }"#).unwrap();
        assert_eq!(config.schedule.cooling_rate, 0.9);
        assert_eq!(config.schedule.initial_temperature, 100.0);
    }

    #[test]
    fn test_null_move_time_disables_deadline() {
        let config = EngineConfig::from_json(r#"{ "move_time_ms": null }"#).unwrap();
        assert_eq!(config.move_time_ms, None);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = EngineConfig::from_json(r#"{ "depth": 3 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_invalid_schedule_rejected() {
        for json in [
            r#"{ "schedule": { "cooling_rate": 1.0 } }"#,
            r#"{ "schedule": { "cooling_rate": 0.0 } }"#,
            r#"{ "schedule": { "min_temperature": 0.0 } }"#,
            r#"{ "schedule": { "initial_temperature": 0.5 } }"#,
            r#"{ "move_time_ms": 0 }"#,
        ] {
            let err = EngineConfig::from_json(json).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid(_)),
                "{json} should be invalid, got {err:?}"
            );
        }
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::from_file("/nonexistent/engine.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("engine.json"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<ConfigError>();
        assert_sync::<ConfigError>();
    }
}
