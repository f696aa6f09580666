//! Loop-closure detection and drift correction.
//!
//! The corrector keeps a bounded history of (pose, scan) snapshots, detects
//! when the agent has returned near a previously recorded location, and
//! blends a one-shot correction into the current pose estimate. It is not a
//! global optimizer: each closure removes a configured fraction of the
//! detected discrepancy and nothing else is re-estimated.

mod config;
mod history;
mod matcher;

pub use config::LoopClosureConfig;
pub use history::{HistoryEntry, ScanHistory};
pub use matcher::{ClosureMatch, ClosureMatcher, SpatialMatcher};

use log::info;

use crate::config::ConfigError;
use crate::core::math::angle_lerp;
use crate::core::{Pose2D, RangeScan};

/// Detects revisits and applies blended pose corrections.
///
/// The history is owned exclusively by this type; other components only
/// see `record` and `detect`.
pub struct LoopClosureCorrector {
    history: ScanHistory,
    matcher: Box<dyn ClosureMatcher>,
    config: LoopClosureConfig,
}

impl LoopClosureCorrector {
    /// Create a corrector with the spatial-proximity matcher.
    pub fn new(config: LoopClosureConfig) -> Result<Self, ConfigError> {
        let matcher = Box::new(SpatialMatcher::new(&config));
        Self::with_matcher(config, matcher)
    }

    /// Create a corrector with a custom matching strategy.
    pub fn with_matcher(
        config: LoopClosureConfig,
        matcher: Box<dyn ClosureMatcher>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            history: ScanHistory::new(config.history_capacity),
            matcher,
            config,
        })
    }

    /// The configuration in effect.
    pub fn config(&self) -> &LoopClosureConfig {
        &self.config
    }

    /// Number of stored history entries.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Append a (pose, scan) snapshot to the bounded history.
    pub fn record(&mut self, pose: Pose2D, scan: RangeScan, tick: u64) {
        self.history.push(tick, pose, scan);
    }

    /// Search the history for a revisit of the current location.
    ///
    /// Returns `None` when the history is empty or nothing lies within the
    /// configured thresholds — the caller proceeds without correction.
    pub fn detect(
        &self,
        current_pose: &Pose2D,
        current_scan: &RangeScan,
        current_tick: u64,
    ) -> Option<ClosureMatch> {
        let found = self
            .matcher
            .find_match(current_pose, current_scan, &self.history, current_tick);
        if let Some(ref m) = found {
            info!(
                "loop closure: revisit of tick {} at distance {:.3}",
                m.tick, m.distance
            );
        }
        found
    }

    /// Blend the current pose toward a matched historical pose.
    ///
    /// Removes `correction_factor` of the displacement between the two
    /// poses: linear interpolation per coordinate, shortest-path
    /// interpolation for heading. With factor 1.0 the matched pose is
    /// returned exactly.
    pub fn apply_correction(&self, current: &Pose2D, matched: &Pose2D) -> Pose2D {
        let f = self.config.correction_factor;
        Pose2D::new(
            current.x + f * (matched.x - current.x),
            current.y + f * (matched.y - current.y),
            angle_lerp(current.theta, matched.theta, f),
        )
    }

    /// Drop all history entries.
    pub fn clear(&mut self) {
        self.history.clear();
    }
}
