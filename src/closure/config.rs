//! Loop-closure configuration.

use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_4;

use crate::config::ConfigError;

/// Loop-closure detection and correction parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoopClosureConfig {
    /// Maximum number of (pose, scan) history entries; oldest evicted first
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Maximum position distance for a spatial match, in world units
    #[serde(default = "default_distance_threshold")]
    pub distance_threshold: f32,

    /// Maximum heading difference for a spatial match, in radians
    #[serde(default = "default_heading_tolerance")]
    pub heading_tolerance: f32,

    /// Entries recorded fewer than this many ticks ago are never matched.
    /// Without this guard the entry recorded on the previous tick always
    /// matches the current pose.
    #[serde(default = "default_min_age_ticks")]
    pub min_age_ticks: u64,

    /// Fraction of the detected pose discrepancy eliminated per closure,
    /// in (0, 1].
    ///
    /// Governs convergence speed across repeated closures: a low value
    /// (say 0.3) needs many closures to remove a large offset and can be
    /// outpaced by ongoing drift; a value near 1 removes the offset in one
    /// shot but overcorrects on a spurious or noisy match.
    #[serde(default = "default_correction_factor")]
    pub correction_factor: f32,
}

fn default_history_capacity() -> usize {
    100
}
fn default_distance_threshold() -> f32 {
    0.5
}
fn default_heading_tolerance() -> f32 {
    FRAC_PI_4
}
fn default_min_age_ticks() -> u64 {
    10
}
fn default_correction_factor() -> f32 {
    0.5
}

impl Default for LoopClosureConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            distance_threshold: default_distance_threshold(),
            heading_tolerance: default_heading_tolerance(),
            min_age_ticks: default_min_age_ticks(),
            correction_factor: default_correction_factor(),
        }
    }
}

impl LoopClosureConfig {
    /// Validate capacity, thresholds, and correction factor.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.history_capacity == 0 {
            return Err(ConfigError::invalid(
                "loop_closure.history_capacity",
                "must be non-zero",
            ));
        }
        if !self.distance_threshold.is_finite() || self.distance_threshold <= 0.0 {
            return Err(ConfigError::invalid(
                "loop_closure.distance_threshold",
                "must be positive",
            ));
        }
        if !self.heading_tolerance.is_finite() || self.heading_tolerance <= 0.0 {
            return Err(ConfigError::invalid(
                "loop_closure.heading_tolerance",
                "must be positive",
            ));
        }
        if !self.correction_factor.is_finite()
            || self.correction_factor <= 0.0
            || self.correction_factor > 1.0
        {
            return Err(ConfigError::invalid(
                "loop_closure.correction_factor",
                "must lie in (0, 1]",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(LoopClosureConfig::default().validate().is_ok());
    }

    #[test]
    fn test_correction_factor_bounds() {
        for bad in [0.0, -0.5, 1.5, f32::NAN] {
            let config = LoopClosureConfig {
                correction_factor: bad,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "accepted {}", bad);
        }

        let config = LoopClosureConfig {
            correction_factor: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = LoopClosureConfig {
            history_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
