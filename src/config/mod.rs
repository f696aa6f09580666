//! Unified configuration.
//!
//! Every tunable in the crate is externally settable through
//! [`SlamConfig`], loadable from YAML. Validation happens at component
//! construction time: a bad value is a [`ConfigError`], never a silently
//! clamped default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::closure::LoopClosureConfig;
use crate::estimator::EstimatorConfig;
use crate::grid::MapConfig;
use crate::odometry::OdometryConfig;
use crate::sim::{SensorConfig, SimConfig};

/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML could not be parsed
    #[error("parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A field value is out of its valid range
    #[error("invalid {field}: {message}")]
    Invalid {
        /// Dotted path of the offending field
        field: &'static str,
        /// What was wrong with it
        message: &'static str,
    },
}

impl ConfigError {
    /// Shorthand for an out-of-range field.
    pub fn invalid(field: &'static str, message: &'static str) -> Self {
        Self::Invalid { field, message }
    }
}

/// Full crate configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SlamConfig {
    /// Occupancy grid settings
    #[serde(default)]
    pub map: MapConfig,

    /// Odometry noise settings
    #[serde(default)]
    pub odometry: OdometryConfig,

    /// Pose estimator uncertainty settings
    #[serde(default)]
    pub estimator: EstimatorConfig,

    /// Loop-closure settings
    #[serde(default)]
    pub loop_closure: LoopClosureConfig,

    /// Range sensor settings
    #[serde(default)]
    pub sensor: SensorConfig,

    /// Simulation driver settings
    #[serde(default)]
    pub sim: SimConfig,
}

impl SlamConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.map.validate()?;
        self.odometry.validate()?;
        self.estimator.validate()?;
        self.loop_closure.validate()?;
        self.sensor.validate()?;
        self.sim.validate()
    }
}
