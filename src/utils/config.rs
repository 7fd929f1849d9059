//! Controller configuration
//!
//! The scene limit and scaling behavior used to be shared mutable state in
//! the original integration; here they are explicit configuration passed to
//! the controller at construction, with JSON persistence for integrators
//! that keep tuning values outside the binary.

use crate::core::constants::{
    DEFAULT_POLYLINE_ALTITUDE_OFFSET_M, DEFAULT_SCENE_LIMIT_M, DEFAULT_TICK_INTERVAL_MS,
};
use crate::estimates::EstimateMethod;
use crate::reconciler::scaling::ScalingScheme;
use crate::scene::SceneError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for a `SceneController`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Far-clamp, prune and confirmation radius (metres)
    pub scene_limit_m: f64,
    /// Reconciliation tick cadence (milliseconds)
    pub tick_interval_ms: u64,
    /// How the current device location is determined
    pub estimate_method: EstimateMethod,
    /// Scaling scheme applied to annotation objects added by the controller
    pub default_scaling_scheme: ScalingScheme,
    /// Altitude offset for polyline boxes relative to the device (metres)
    pub polyline_altitude_offset_m: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            scene_limit_m: DEFAULT_SCENE_LIMIT_M,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            estimate_method: EstimateMethod::default(),
            default_scaling_scheme: ScalingScheme::default(),
            polyline_altitude_offset_m: DEFAULT_POLYLINE_ALTITUDE_OFFSET_M,
        }
    }
}

impl SceneConfig {
    /// Validates the configuration, returning the first offending parameter.
    pub fn validate(&self) -> Result<(), SceneError> {
        if !(self.scene_limit_m > 0.0) {
            return Err(SceneError::InvalidParameter {
                parameter: "scene_limit_m".to_string(),
                value: self.scene_limit_m.to_string(),
                reason: "scene limit must be a positive distance".to_string(),
            });
        }

        if self.tick_interval_ms == 0 {
            return Err(SceneError::InvalidParameter {
                parameter: "tick_interval_ms".to_string(),
                value: self.tick_interval_ms.to_string(),
                reason: "tick interval must be non-zero".to_string(),
            });
        }

        Ok(())
    }

    /// Loads and validates a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SceneError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| SceneError::Io {
            message: format!("failed to read config file '{}': {}", path_str, e),
        })?;

        let config: SceneConfig =
            serde_json::from_str(&content).map_err(|e| SceneError::Serialization {
                message: format!("failed to parse config file '{}': {}", path_str, e),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration to a JSON file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SceneError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content =
            serde_json::to_string_pretty(self).map_err(|e| SceneError::Serialization {
                message: format!("failed to serialize config: {}", e),
            })?;

        fs::write(&path, content).map_err(|e| SceneError::Io {
            message: format!("failed to write config file '{}': {}", path_str, e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_defaults() {
        let config = SceneConfig::default();
        assert_eq!(config.scene_limit_m, 100.0);
        assert_eq!(config.tick_interval_ms, 500);
        assert_eq!(config.estimate_method, EstimateMethod::MostRelevant);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = SceneConfig::default();
        config.scene_limit_m = 0.0;
        assert!(matches!(
            config.validate(),
            Err(SceneError::InvalidParameter { .. })
        ));

        let mut config = SceneConfig::default();
        config.tick_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = SceneConfig::default();
        config.estimate_method = EstimateMethod::RawFixOnly;
        config.default_scaling_scheme = ScalingScheme::Tiered {
            threshold_m: 60.0,
            scale: 0.5,
        };

        let temp_path = PathBuf::from("test_scene_config.json");
        config.save_to_file(&temp_path).unwrap();
        let loaded = SceneConfig::from_file(&temp_path).unwrap();

        assert_eq!(loaded, config);

        let _ = fs::remove_file(temp_path);
    }
}
