//! Noisy odometry model for simulated motion.
//!
//! Converts a commanded displacement into the displacement the wheel
//! encoders would report: translation perturbed by Gaussian noise
//! proportional to the commanded distance (applied along the motion
//! direction), rotation perturbed proportionally to the commanded turn.
//!
//! The model is a pure function of its inputs plus the random source; the
//! only state across calls is the generator's own. Randomness is isolated
//! behind [`NoiseGenerator`] so tests can seed it and assert exact outputs.

use rand::prelude::*;
use rand::rngs::SmallRng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::core::Pose2D;
use crate::error::{Result, SlamError};

/// Gaussian noise source with deterministic seeding support.
///
/// Seed 0 draws from entropy; any other seed is reproducible.
#[derive(Clone)]
pub struct NoiseGenerator {
    rng: SmallRng,
}

impl NoiseGenerator {
    /// Create a noise generator from a seed.
    pub fn new(seed: u64) -> Self {
        let rng = if seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(seed)
        };
        Self { rng }
    }

    /// Draw Gaussian noise with the given standard deviation.
    #[inline]
    pub fn gaussian(&mut self, stddev: f32) -> f32 {
        if stddev == 0.0 {
            return 0.0;
        }
        let n: f32 = self.rng.sample(StandardNormal);
        n * stddev
    }
}

/// Odometry noise parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OdometryConfig {
    /// Translation noise stddev as a fraction of the commanded distance
    #[serde(default = "default_translation_noise")]
    pub translation_noise: f32,

    /// Rotation noise stddev as a fraction of the commanded rotation
    #[serde(default = "default_rotation_noise")]
    pub rotation_noise: f32,

    /// RNG seed; 0 = entropy, anything else = deterministic
    #[serde(default)]
    pub seed: u64,
}

fn default_translation_noise() -> f32 {
    0.05
}
fn default_rotation_noise() -> f32 {
    0.02
}

impl Default for OdometryConfig {
    fn default() -> Self {
        Self {
            translation_noise: default_translation_noise(),
            rotation_noise: default_rotation_noise(),
            seed: 0,
        }
    }
}

impl OdometryConfig {
    /// Validate noise fractions.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !self.translation_noise.is_finite() || self.translation_noise < 0.0 {
            return Err(ConfigError::invalid(
                "odometry.translation_noise",
                "must be a non-negative finite fraction",
            ));
        }
        if !self.rotation_noise.is_finite() || self.rotation_noise < 0.0 {
            return Err(ConfigError::invalid(
                "odometry.rotation_noise",
                "must be a non-negative finite fraction",
            ));
        }
        Ok(())
    }
}

/// Simulated wheel-encoder odometry.
pub struct OdometryModel {
    config: OdometryConfig,
    noise: NoiseGenerator,
}

impl OdometryModel {
    /// Create a model from a validated configuration.
    pub fn new(config: OdometryConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let noise = NoiseGenerator::new(config.seed);
        Ok(Self { config, noise })
    }

    /// The noise parameters in effect.
    pub fn config(&self) -> &OdometryConfig {
        &self.config
    }

    /// Perturb a commanded displacement (robot frame) with encoder noise.
    ///
    /// Translation noise is drawn with stddev proportional to the commanded
    /// distance and applied along the motion direction; rotation noise with
    /// stddev proportional to the commanded turn. Non-finite inputs are
    /// rejected without consuming randomness.
    pub fn estimate_motion(&mut self, commanded: &Pose2D) -> Result<Pose2D> {
        if !commanded.is_finite() {
            return Err(SlamError::NonFiniteMotion("odometry"));
        }

        let distance = (commanded.x * commanded.x + commanded.y * commanded.y).sqrt();
        let (dx, dy) = if distance > 0.0 {
            let noise = self
                .noise
                .gaussian(self.config.translation_noise * distance);
            (
                commanded.x + noise * (commanded.x / distance),
                commanded.y + noise * (commanded.y / distance),
            )
        } else {
            (commanded.x, commanded.y)
        };

        let dtheta = commanded.theta
            + self
                .noise
                .gaussian(self.config.rotation_noise * commanded.theta.abs());

        Ok(Pose2D::new(dx, dy, dtheta))
    }
}
