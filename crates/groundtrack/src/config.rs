//! Configuration management for groundtrack.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::frame::{Iteration, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE_RAD};
use crate::propagator::GravityModel;
use crate::track::offsets;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "groundtrack";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "tle.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `GROUNDTRACK_`)
/// 2. TOML config file at `~/.config/groundtrack/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Track sampling configuration.
    pub track: TrackConfig,
    /// Frame transform configuration.
    pub transform: TransformConfig,
    /// Propagator configuration.
    pub propagator: PropagatorConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
}

/// Which offsets around the reference instant are sampled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Minutes between consecutive samples.
    pub step_minutes: u32,
    /// How far ahead and behind to sample, in minutes.
    pub window_minutes: u32,
    /// Propagate the offsets on parallel tasks.
    pub concurrent: bool,
}

/// Latitude iteration settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Maximum refinement steps before reporting non-convergence.
    pub max_iterations: u32,
    /// Convergence threshold in radians.
    pub tolerance_rad: f64,
}

/// Propagator settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagatorConfig {
    /// Gravity model used to initialise SGP4.
    pub gravity_model: GravityModel,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the TLE database file.
    /// Defaults to `~/.local/share/groundtrack/tle.db`
    pub database_path: Option<PathBuf>,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            step_minutes: 5,
            window_minutes: 45,
            concurrent: false,
        }
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance_rad: DEFAULT_TOLERANCE_RAD,
        }
    }
}

impl TrackConfig {
    /// Offsets from now to the end of the window: `0, step, ..., window`.
    #[must_use]
    pub fn future_offsets(&self) -> Vec<i64> {
        offsets(0, i64::from(self.window_minutes), self.step_minutes)
    }

    /// Offsets from the start of the window up to just before now:
    /// `-window, ..., -step`.
    #[must_use]
    pub fn past_offsets(&self) -> Vec<i64> {
        if self.step_minutes == 0 || self.window_minutes < self.step_minutes {
            return Vec::new();
        }
        offsets(
            -i64::from(self.window_minutes),
            -i64::from(self.step_minutes),
            self.step_minutes,
        )
    }
}

impl From<&TransformConfig> for Iteration {
    fn from(config: &TransformConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            tolerance_rad: config.tolerance_rad,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("GROUNDTRACK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.track.step_minutes == 0 {
            return Err(Error::ConfigValidation {
                message: "step_minutes must be greater than 0".to_string(),
            });
        }

        if self.track.window_minutes % self.track.step_minutes != 0 {
            return Err(Error::ConfigValidation {
                message: format!(
                    "window_minutes ({}) must be a multiple of step_minutes ({})",
                    self.track.window_minutes, self.track.step_minutes
                ),
            });
        }

        if self.transform.max_iterations == 0 {
            return Err(Error::ConfigValidation {
                message: "max_iterations must be greater than 0".to_string(),
            });
        }

        if !(self.transform.tolerance_rad.is_finite() && self.transform.tolerance_rad > 0.0) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "tolerance_rad must be a positive finite number, got {}",
                    self.transform.tolerance_rad
                ),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Iteration settings for the frame transform.
    #[must_use]
    pub fn iteration(&self) -> Iteration {
        Iteration::from(&self.transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_track_config() {
        let track = TrackConfig::default();
        assert_eq!(track.step_minutes, 5);
        assert_eq!(track.window_minutes, 45);
        assert!(!track.concurrent);
    }

    #[test]
    fn test_default_offsets_match_reference_window() {
        let track = TrackConfig::default();
        assert_eq!(
            track.future_offsets(),
            vec![0, 5, 10, 15, 20, 25, 30, 35, 40, 45]
        );
        assert_eq!(
            track.past_offsets(),
            vec![-45, -40, -35, -30, -25, -20, -15, -10, -5]
        );
    }

    #[test]
    fn test_past_offsets_empty_when_window_shorter_than_step() {
        let track = TrackConfig {
            step_minutes: 10,
            window_minutes: 0,
            concurrent: false,
        };
        assert!(track.past_offsets().is_empty());
        assert_eq!(track.future_offsets(), vec![0]);
    }

    #[test]
    fn test_default_transform_config() {
        let transform = TransformConfig::default();
        assert_eq!(transform.max_iterations, 20);
        assert!((transform.tolerance_rad - 1e-10).abs() < f64::EPSILON);
    }

    #[test]
    fn test_iteration_from_config() {
        let config = Config::default();
        assert_eq!(config.iteration(), Iteration::default());
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_step() {
        let mut config = Config::default();
        config.track.step_minutes = 0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("step_minutes"));
    }

    #[test]
    fn test_validate_window_not_multiple() {
        let mut config = Config::default();
        config.track.window_minutes = 42;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("multiple"));
    }

    #[test]
    fn test_validate_zero_iterations() {
        let mut config = Config::default();
        config.transform.max_iterations = 0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("max_iterations"));
    }

    #[test]
    fn test_validate_bad_tolerance() {
        let mut config = Config::default();
        config.transform.tolerance_rad = f64::NAN;
        assert!(config.validate().is_err());
        config.transform.tolerance_rad = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        assert!(config.database_path().to_string_lossy().contains("tle.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/tle.sqlite"));
        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/tle.sqlite")
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("groundtrack"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!(
            "groundtrack_config_test_{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "[track]\nstep_minutes = 10\nwindow_minutes = 90\n\n[propagator]\ngravity_model = \"wgs72\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path.clone())).unwrap();
        assert_eq!(config.track.step_minutes, 10);
        assert_eq!(config.track.window_minutes, 90);
        assert_eq!(config.propagator.gravity_model, GravityModel::Wgs72);
        assert_eq!(config.transform, TransformConfig::default());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let path = std::env::temp_dir().join(format!(
            "groundtrack_config_invalid_{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[track]\nstep_minutes = 0\n").unwrap();

        let result = Config::load_from(Some(path.clone()));
        assert!(matches!(result, Err(Error::ConfigValidation { .. })));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_track_config_deserialize_partial() {
        let json = r#"{"window_minutes": 30}"#;
        let track: TrackConfig = serde_json::from_str(json).unwrap();
        assert_eq!(track.window_minutes, 30);
        assert_eq!(track.step_minutes, 5);
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("step_minutes"));
        assert!(json.contains("gravity_model"));
    }
}
