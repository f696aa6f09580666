//! Pose estimation with scalar uncertainty tracking.
//!
//! The estimator maintains the believed pose and a scalar uncertainty
//! bound. Two operations drive it:
//!
//! - **Predict** ([`PoseEstimator::apply_motion`]): composes a noisy
//!   displacement onto the pose and grows uncertainty with the motion
//!   magnitude, capped at a configured ceiling.
//! - **Correct** ([`PoseEstimator::fuse_observation`]): blends the pose
//!   toward an observed correction weighted by relative confidence and
//!   shrinks uncertainty, floored at a configured minimum.
//!
//! Pose value and uncertainty update independently: a correction with a
//! zero delta still shrinks uncertainty without moving the pose. Callers
//! must not read shrinking uncertainty as shrinking error.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::core::math::angle_lerp;
use crate::core::Pose2D;
use crate::error::{Result, SlamError};

/// Uncertainty dynamics parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Uncertainty at startup
    #[serde(default = "default_initial_uncertainty")]
    pub initial_uncertainty: f32,

    /// Floor: the minimum achievable uncertainty
    #[serde(default = "default_min_uncertainty")]
    pub min_uncertainty: f32,

    /// Ceiling: uncertainty never grows past this
    #[serde(default = "default_max_uncertainty")]
    pub max_uncertainty: f32,

    /// Uncertainty added per unit of translation during prediction
    #[serde(default = "default_growth_rate")]
    pub growth_rate: f32,

    /// Weight of rotation (radians) relative to translation when growing
    /// uncertainty
    #[serde(default = "default_rotation_weight")]
    pub rotation_weight: f32,

    /// Fraction of the confidence weight removed from uncertainty per
    /// correction
    #[serde(default = "default_decay_rate")]
    pub decay_rate: f32,
}

fn default_initial_uncertainty() -> f32 {
    0.1
}
fn default_min_uncertainty() -> f32 {
    0.01
}
fn default_max_uncertainty() -> f32 {
    5.0
}
fn default_growth_rate() -> f32 {
    0.1
}
fn default_rotation_weight() -> f32 {
    0.5
}
fn default_decay_rate() -> f32 {
    0.5
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            initial_uncertainty: default_initial_uncertainty(),
            min_uncertainty: default_min_uncertainty(),
            max_uncertainty: default_max_uncertainty(),
            growth_rate: default_growth_rate(),
            rotation_weight: default_rotation_weight(),
            decay_rate: default_decay_rate(),
        }
    }
}

impl EstimatorConfig {
    /// Validate bounds and rates.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !self.min_uncertainty.is_finite() || self.min_uncertainty <= 0.0 {
            return Err(ConfigError::invalid(
                "estimator.min_uncertainty",
                "must be positive",
            ));
        }
        if !self.max_uncertainty.is_finite() || self.max_uncertainty <= self.min_uncertainty {
            return Err(ConfigError::invalid(
                "estimator.max_uncertainty",
                "must exceed min_uncertainty",
            ));
        }
        if self.initial_uncertainty < self.min_uncertainty
            || self.initial_uncertainty > self.max_uncertainty
        {
            return Err(ConfigError::invalid(
                "estimator.initial_uncertainty",
                "must lie within [min_uncertainty, max_uncertainty]",
            ));
        }
        if !self.growth_rate.is_finite() || self.growth_rate <= 0.0 {
            return Err(ConfigError::invalid(
                "estimator.growth_rate",
                "must be positive",
            ));
        }
        if !self.rotation_weight.is_finite() || self.rotation_weight < 0.0 {
            return Err(ConfigError::invalid(
                "estimator.rotation_weight",
                "must be non-negative",
            ));
        }
        if !self.decay_rate.is_finite() || self.decay_rate <= 0.0 || self.decay_rate > 1.0 {
            return Err(ConfigError::invalid(
                "estimator.decay_rate",
                "must lie in (0, 1]",
            ));
        }
        Ok(())
    }
}

/// Believed pose plus scalar uncertainty.
pub struct PoseEstimator {
    pose: Pose2D,
    uncertainty: f32,
    config: EstimatorConfig,
}

impl PoseEstimator {
    /// Create an estimator at `initial_pose` from a validated configuration.
    pub fn new(
        initial_pose: Pose2D,
        config: EstimatorConfig,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            pose: initial_pose,
            uncertainty: config.initial_uncertainty,
            config,
        })
    }

    /// The current believed pose.
    #[inline]
    pub fn pose(&self) -> Pose2D {
        self.pose
    }

    /// The current uncertainty, always within the configured bounds.
    #[inline]
    pub fn uncertainty(&self) -> f32 {
        self.uncertainty
    }

    /// The configuration in effect.
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Predict: advance the pose by a displacement in its own frame.
    ///
    /// The displacement is rotated by the current heading, then translated;
    /// rotations add. Uncertainty grows with the motion magnitude, capped
    /// at the ceiling. Non-finite input is rejected without mutating state.
    pub fn apply_motion(&mut self, delta: &Pose2D) -> Result<()> {
        if !delta.is_finite() {
            return Err(SlamError::NonFiniteMotion("pose prediction"));
        }

        self.pose = self.pose.compose(delta);

        let translation = (delta.x * delta.x + delta.y * delta.y).sqrt();
        let magnitude = translation + self.config.rotation_weight * delta.theta.abs();
        self.uncertainty =
            (self.uncertainty + self.config.growth_rate * magnitude).min(self.config.max_uncertainty);

        Ok(())
    }

    /// Correct: blend the pose toward an observed correction.
    ///
    /// The weight is `confidence / (confidence + uncertainty)`; the pose
    /// moves by that fraction of `correction` (per coordinate, circularly
    /// for heading) and uncertainty shrinks toward the floor. A zero
    /// correction still shrinks uncertainty — only a non-zero correction
    /// delta moves the pose.
    pub fn fuse_observation(&mut self, correction: &Pose2D, confidence: f32) -> Result<()> {
        if !correction.is_finite() {
            return Err(SlamError::NonFinitePose("observation fusion"));
        }
        if !confidence.is_finite() || confidence <= 0.0 {
            return Err(SlamError::InvalidConfidence(confidence));
        }

        let weight = confidence / (confidence + self.uncertainty);

        self.pose = Pose2D::new(
            self.pose.x + weight * correction.x,
            self.pose.y + weight * correction.y,
            angle_lerp(self.pose.theta, self.pose.theta + correction.theta, weight),
        );

        self.uncertainty = (self.uncertainty * (1.0 - self.config.decay_rate * weight))
            .max(self.config.min_uncertainty);

        Ok(())
    }

    /// Replace the believed pose (used when a loop-closure correction
    /// supersedes the estimate). Uncertainty is untouched.
    pub fn set_pose(&mut self, pose: Pose2D) -> Result<()> {
        if !pose.is_finite() {
            return Err(SlamError::NonFinitePose("pose override"));
        }
        self.pose = pose;
        Ok(())
    }
}
