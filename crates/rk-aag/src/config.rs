//! Recognition configuration
//!
//! Thresholds and tolerances shared by the recognizers. The configuration
//! can be stored next to a model as a RON file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{
    ANGULAR_TOLERANCE, CANCEL_CHECK_INTERVAL, DEFAULT_HOLE_RADIUS, LINEAR_TOLERANCE,
    MIN_SLOT_FACES,
};

/// Settings for a recognition run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Largest radius a cylindrical face may have to count as a hole
    pub hole_radius_threshold: f64,
    /// Smallest number of faces in an accepted slot
    pub min_slot_faces: usize,
    /// Distance tolerance for geometric comparisons
    pub linear_tolerance: f64,
    /// Angular tolerance for parallel and tangent checks
    pub angular_tolerance: f64,
    /// Growth steps between cancellation checks
    pub cancel_check_interval: usize,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            hole_radius_threshold: DEFAULT_HOLE_RADIUS,
            min_slot_faces: MIN_SLOT_FACES,
            linear_tolerance: LINEAR_TOLERANCE,
            angular_tolerance: ANGULAR_TOLERANCE,
            cancel_check_interval: CANCEL_CHECK_INTERVAL,
        }
    }
}

impl RecognitionConfig {
    /// Check that every value is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.hole_radius_threshold.is_finite() || self.hole_radius_threshold <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "hole_radius_threshold must be a positive number, got {}",
                self.hole_radius_threshold
            )));
        }
        if self.min_slot_faces < 3 {
            return Err(ConfigError::Invalid(format!(
                "min_slot_faces must be at least 3, got {}",
                self.min_slot_faces
            )));
        }
        for (name, value) in [
            ("linear_tolerance", self.linear_tolerance),
            ("angular_tolerance", self.angular_tolerance),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        if self.cancel_check_interval == 0 {
            return Err(ConfigError::Invalid(
                "cancel_check_interval must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Serialize to a RON string
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Parse and validate a RON string
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        let config: RecognitionConfig =
            ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = self.to_ron()?;
        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Load the configuration from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_ron(&content)
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for crate::graph::AagError {
    fn from(err: ConfigError) -> Self {
        crate::graph::AagError::InvalidConfig(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = RecognitionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.hole_radius_threshold, 5.0);
        assert_eq!(config.min_slot_faces, 3);
    }

    #[test]
    fn test_invalid_values() {
        let config = RecognitionConfig {
            hole_radius_threshold: -1.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = RecognitionConfig {
            min_slot_faces: 2,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RecognitionConfig {
            linear_tolerance: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ron_round_trip() {
        let config = RecognitionConfig {
            hole_radius_threshold: 2.5,
            min_slot_faces: 4,
            ..Default::default()
        };
        let text = config.to_ron().unwrap();
        assert_eq!(RecognitionConfig::from_ron(&text).unwrap(), config);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config = RecognitionConfig::from_ron("(hole_radius_threshold: 1.5)").unwrap();
        assert_eq!(config.hole_radius_threshold, 1.5);
        assert_eq!(config.cancel_check_interval, CANCEL_CHECK_INTERVAL);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recognition.ron");
        let config = RecognitionConfig::default();
        config.save(&path).unwrap();
        assert_eq!(RecognitionConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = RecognitionConfig::load(dir.path().join("absent.ron"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
