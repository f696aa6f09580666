//! Tick-driven simulation loop.
//!
//! The driver owns the ground-truth pose and wires the components together
//! in a fixed per-tick order: execute motion → odometry → predict → sense →
//! fuse → close loop → map update. One tick completes fully before the next
//! begins; nothing here suspends or blocks.
//!
//! The driver is the only component that ever sees both the true pose and
//! the estimated pose, and therefore the only place where the two could be
//! conflated. Which one the map update uses is an explicit configuration
//! choice ([`MapReference`]), not whichever variable happens to be in
//! scope.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::closure::{ClosureMatch, LoopClosureCorrector};
use crate::config::{ConfigError, SlamConfig};
use crate::core::{FrameId, Pose2D, StampedPose};
use crate::error::Result;
use crate::estimator::PoseEstimator;
use crate::grid::{OccupancyGridMap, UpdateResult};
use crate::odometry::OdometryModel;

use super::environment::Environment;
use super::sensor::RaySensor;

/// Which pose the occupancy map update is referenced to.
///
/// This is the single most consequential integration choice in the system:
/// the scan is always taken at the true pose, so referencing the update to
/// anything else builds an offset map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapReference {
    /// Update with the stamped true pose through the frame-checked path.
    #[default]
    GroundTruth,
    /// Update with the current pose estimate through the pose-agnostic
    /// path. The scan's frame tag cannot match an estimate, so this mode
    /// bypasses the frame check; drift becomes visible in the map.
    Estimate,
}

/// Simulation driver settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimConfig {
    /// Reference frame for map updates
    #[serde(default)]
    pub map_reference: MapReference,

    /// Minimum scan hits before an observation is fused into the estimator
    #[serde(default = "default_min_hits_for_fusion")]
    pub min_hits_for_fusion: usize,

    /// Confidence assigned to a scan-derived observation
    #[serde(default = "default_observation_confidence")]
    pub observation_confidence: f32,
}

fn default_min_hits_for_fusion() -> usize {
    3
}
fn default_observation_confidence() -> f32 {
    0.5
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            map_reference: MapReference::default(),
            min_hits_for_fusion: default_min_hits_for_fusion(),
            observation_confidence: default_observation_confidence(),
        }
    }
}

impl SimConfig {
    /// Validate fusion parameters.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !self.observation_confidence.is_finite() || self.observation_confidence <= 0.0 {
            return Err(ConfigError::invalid(
                "sim.observation_confidence",
                "must be positive",
            ));
        }
        Ok(())
    }
}

/// What one tick produced.
#[derive(Clone, Debug)]
pub struct TickSummary {
    /// Tick number (1-based)
    pub tick: u64,
    /// Ground-truth pose after the motion
    pub true_pose: Pose2D,
    /// Believed pose after prediction, fusion, and any closure correction
    pub estimated_pose: Pose2D,
    /// Estimator uncertainty after the tick
    pub uncertainty: f32,
    /// Loop closure applied this tick, if any
    pub closure: Option<ClosureMatch>,
    /// Map cells touched this tick
    pub map_update: UpdateResult,
}

/// Aggregate of a full run.
#[derive(Clone, Debug, Default)]
pub struct RunSummary {
    /// Ticks executed
    pub ticks: u64,
    /// Loop closures applied
    pub closures: usize,
    /// Position error between the estimate and ground truth at the end
    pub final_position_error: f32,
    /// Absolute heading error at the end, radians
    pub final_heading_error: f32,
}

/// Owns the ground truth and drives the SLAM core tick by tick.
pub struct SimulationDriver {
    env: Environment,
    true_pose: Pose2D,
    odometry: OdometryModel,
    estimator: PoseEstimator,
    corrector: LoopClosureCorrector,
    map: OccupancyGridMap,
    sensor: RaySensor,
    config: SimConfig,
    tick: u64,
    next_frame: u64,
}

impl SimulationDriver {
    /// Build a driver with the agent starting at `start` (also the initial
    /// estimate) in `env`.
    pub fn new(
        env: Environment,
        start: Pose2D,
        config: &SlamConfig,
    ) -> std::result::Result<Self, ConfigError> {
        config.sim.validate()?;
        Ok(Self {
            env,
            true_pose: start,
            odometry: OdometryModel::new(config.odometry.clone())?,
            estimator: PoseEstimator::new(start, config.estimator.clone())?,
            corrector: LoopClosureCorrector::new(config.loop_closure.clone())?,
            map: OccupancyGridMap::new(config.map.clone())?,
            sensor: RaySensor::new(config.sensor.clone())?,
            config: config.sim.clone(),
            tick: 0,
            next_frame: 0,
        })
    }

    /// Ground-truth pose (known only to the driver).
    pub fn true_pose(&self) -> Pose2D {
        self.true_pose
    }

    /// Current pose estimate.
    pub fn estimated_pose(&self) -> Pose2D {
        self.estimator.pose()
    }

    /// Current estimator uncertainty.
    pub fn uncertainty(&self) -> f32 {
        self.estimator.uncertainty()
    }

    /// The occupancy map built so far.
    pub fn map(&self) -> &OccupancyGridMap {
        &self.map
    }

    /// Number of loop-closure history entries recorded.
    pub fn history_len(&self) -> usize {
        self.corrector.history_len()
    }

    /// Position and absolute heading error of the estimate.
    pub fn pose_error(&self) -> (f32, f32) {
        let estimate = self.estimator.pose();
        (
            estimate.distance_to(&self.true_pose),
            crate::core::math::angle_diff(estimate.theta, self.true_pose.theta).abs(),
        )
    }

    fn mint_frame(&mut self) -> FrameId {
        let id = FrameId(self.next_frame);
        self.next_frame += 1;
        id
    }

    /// Execute one tick with the given commanded displacement (robot
    /// frame).
    ///
    /// A commanded translation into a blocked cell is not executed: the
    /// rotation still happens, the translation does not, and odometry
    /// measures the motion that actually occurred.
    pub fn step(&mut self, commanded: &Pose2D) -> Result<TickSummary> {
        if !commanded.is_finite() {
            return Err(crate::error::SlamError::NonFiniteMotion("simulation step"));
        }
        self.tick += 1;

        // Execute the motion against the world
        let candidate = self.true_pose.compose(commanded);
        let executed = if self.env.is_free_at(candidate.position()) {
            *commanded
        } else {
            Pose2D::new(0.0, 0.0, commanded.theta)
        };
        self.true_pose = self.true_pose.compose(&executed);

        // Predict from noisy odometry
        let measured = self.odometry.estimate_motion(&executed)?;
        self.estimator.apply_motion(&measured)?;

        // Sense at the stamped true pose
        let stamped = StampedPose::new(self.mint_frame(), self.true_pose);
        let scan = self.sensor.scan(&stamped, &self.env);

        // Seeing enough structure firms up the belief without moving it;
        // only a correction delta ever moves the pose
        if scan.len() >= self.config.min_hits_for_fusion {
            self.estimator
                .fuse_observation(&Pose2D::identity(), self.config.observation_confidence)?;
        }

        // Loop closure against the recorded history
        let closure = self
            .corrector
            .detect(&self.estimator.pose(), &scan, self.tick);
        if let Some(ref m) = closure {
            let corrected = self
                .corrector
                .apply_correction(&self.estimator.pose(), &m.matched_pose);
            self.estimator.set_pose(corrected)?;
        }
        self.corrector
            .record(self.estimator.pose(), scan.clone(), self.tick);

        // Map update in the configured reference frame
        let map_update = if scan.is_empty() {
            UpdateResult::default()
        } else {
            match self.config.map_reference {
                MapReference::GroundTruth => self.map.integrate(&scan, &stamped)?,
                MapReference::Estimate => self.map.update(&scan, self.estimator.pose())?,
            }
        };

        let (position_error, heading_error) = self.pose_error();
        debug!(
            "tick {}: err pos {:.3} heading {:.3}, uncertainty {:.3}, {} cells",
            self.tick,
            position_error,
            heading_error,
            self.estimator.uncertainty(),
            map_update.cells_updated
        );

        Ok(TickSummary {
            tick: self.tick,
            true_pose: self.true_pose,
            estimated_pose: self.estimator.pose(),
            uncertainty: self.estimator.uncertainty(),
            closure,
            map_update,
        })
    }

    /// Execute a sequence of commanded displacements.
    pub fn run(&mut self, commands: &[Pose2D]) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for commanded in commands {
            let tick = self.step(commanded)?;
            summary.ticks = tick.tick;
            if tick.closure.is_some() {
                summary.closures += 1;
            }
        }
        let (position_error, heading_error) = self.pose_error();
        summary.final_position_error = position_error;
        summary.final_heading_error = heading_error;
        Ok(summary)
    }
}
