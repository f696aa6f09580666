//! Simulated range sensor.
//!
//! Casts evenly spaced rays from a pose against the environment and
//! returns the hits in the local frame of that pose, tagged with its
//! frame identity. The returned scan is the only view of the environment
//! the SLAM core ever gets.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::core::{GridCoord, RangeBearing, RangeScan, StampedPose};

use super::environment::Environment;

/// Range sensor parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Maximum ray range in cells
    #[serde(default = "default_max_range")]
    pub max_range: u32,

    /// Number of rays spread evenly over 360 degrees
    #[serde(default = "default_num_rays")]
    pub num_rays: usize,
}

fn default_max_range() -> u32 {
    10
}
fn default_num_rays() -> usize {
    16
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            max_range: default_max_range(),
            num_rays: default_num_rays(),
        }
    }
}

impl SensorConfig {
    /// Validate range and ray count.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_range == 0 {
            return Err(ConfigError::invalid("sensor.max_range", "must be non-zero"));
        }
        if self.num_rays == 0 {
            return Err(ConfigError::invalid("sensor.num_rays", "must be non-zero"));
        }
        Ok(())
    }
}

/// Ray-casting range sensor.
pub struct RaySensor {
    config: SensorConfig,
}

impl RaySensor {
    /// Create a sensor from a validated configuration.
    pub fn new(config: SensorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The sensor parameters in effect.
    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Scan the environment from `origin`.
    ///
    /// Rays step outward cell by cell until they reach a blocked cell or
    /// the range limit; rays that reach the limit without hitting anything
    /// produce no measurement. Hits are reported in the local frame of
    /// `origin.pose` and the scan is tagged with `origin.id`.
    pub fn scan(&self, origin: &StampedPose, env: &Environment) -> RangeScan {
        let pose = origin.pose;
        let mut hits = Vec::new();

        for ray in 0..self.config.num_rays {
            let bearing =
                ray as f32 * (std::f32::consts::TAU / self.config.num_rays as f32);
            let world_angle = pose.theta + bearing;
            let (sin_a, cos_a) = world_angle.sin_cos();

            for step in 1..=self.config.max_range {
                let distance = step as f32;
                let cell = GridCoord::new(
                    (pose.x + cos_a * distance).floor() as i32,
                    (pose.y + sin_a * distance).floor() as i32,
                );
                if env.is_blocked(cell) {
                    hits.push(RangeBearing::new(distance, bearing));
                    break;
                }
            }
        }

        RangeScan::new(origin.id, hits)
    }
}
