//! # kosha-slam
//!
//! 2D SLAM simulation for a single mobile agent: pose estimation from
//! noisy odometry, probabilistic occupancy grid mapping, and single-shot
//! loop-closure drift correction.
//!
//! ## Overview
//!
//! Per simulation tick the driver runs a fixed pipeline:
//!
//! ```text
//! true motion ─► Odometry (noise) ─► PoseEstimator.apply_motion
//! true pose ──► RaySensor ─► RangeScan (frame-tagged)
//!                               │
//!                               ├─► PoseEstimator.fuse_observation
//!                               ├─► LoopClosureCorrector (record/detect/correct)
//!                               └─► OccupancyGridMap.integrate(scan, stamped pose)
//! ```
//!
//! The binding contract throughout: a scan is always interpreted in the
//! frame of the pose it was measured from. Scans carry a [`FrameId`] tag
//! and the map's checked integration path rejects any other pose, so true
//! and estimated poses cannot be silently conflated.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use kosha_slam::{Environment, Pose2D, SimulationDriver, SlamConfig};
//!
//! let config = SlamConfig::default();
//! let env = Environment::warehouse_maze();
//! let mut driver = SimulationDriver::new(env, Pose2D::new(1.5, 1.5, 0.0), &config)?;
//!
//! for _ in 0..20 {
//!     let tick = driver.step(&Pose2D::new(1.0, 0.0, 0.0))?;
//!     println!("uncertainty {:.3}", tick.uncertainty);
//! }
//! ```
//!
//! ## Coordinate system
//!
//! ROS REP-103 convention:
//! - X: Forward (positive ahead of the agent)
//! - Y: Left (positive to the agent's left)
//! - Theta: CCW rotation in radians from the +X axis, normalized to [-π, π]

#![warn(missing_docs)]

// Fundamental types
pub mod core;

// Unified configuration
pub mod config;

// Error types
pub mod error;

// Occupancy grid mapping
pub mod grid;

// Pose estimation
pub mod estimator;

// Noisy odometry model
pub mod odometry;

// Loop-closure detection and correction
pub mod closure;

// Simulation harness (environment, sensor, driver)
pub mod sim;

pub use crate::core::{FrameId, GridCoord, Point2D, Pose2D, RangeBearing, RangeScan, StampedPose};

pub use config::{ConfigError, SlamConfig};

pub use error::{Result, SlamError};

pub use grid::{
    CellCounts, GridConfig, LogOddsConfig, MapConfig, OccupancyGridMap, UpdateResult,
};

pub use estimator::{EstimatorConfig, PoseEstimator};

pub use odometry::{NoiseGenerator, OdometryConfig, OdometryModel};

pub use closure::{
    ClosureMatch, ClosureMatcher, LoopClosureConfig, LoopClosureCorrector, ScanHistory,
    SpatialMatcher,
};

pub use sim::{
    Environment, MapReference, RaySensor, RunSummary, SensorConfig, SimConfig, SimulationDriver,
    TickSummary,
};
