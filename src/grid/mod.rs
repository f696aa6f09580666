//! Probabilistic occupancy grid mapping.
//!
//! The map holds per-cell occupancy belief as clamped log-odds and is
//! updated from range scans interpreted in a caller-supplied reference
//! frame:
//!
//! ```text
//! L(x) = log(P(x) / (1 - P(x)))    log-odds representation
//! L_new = clamp(L_old + L_obs)     additive Bayesian update
//! ```
//!
//! Two update paths exist:
//!
//! - [`OccupancyGridMap::update`] — pose-agnostic: trusts whatever
//!   reference pose it is given. The caller carries the burden of passing
//!   the pose that matches the scan's frame.
//! - [`OccupancyGridMap::integrate`] — checked: compares the reference
//!   pose's [`FrameId`](crate::core::FrameId) against the scan's origin tag
//!   and fails fast with
//!   [`SlamError::FrameMismatch`](crate::error::SlamError::FrameMismatch)
//!   instead of silently building an offset map.

mod config;
mod raycaster;
mod storage;
pub mod update;

pub use config::{GridConfig, LogOddsConfig, MapConfig};
pub use raycaster::BresenhamLine;
pub use storage::{CellCounts, GridStorage};

use crate::config::ConfigError;
use crate::core::{GridCoord, Point2D, Pose2D, RangeScan, StampedPose};
use crate::error::{Result, SlamError};

/// Statistics for one scan integration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateResult {
    /// Total cell observations applied
    pub cells_updated: usize,
    /// Cells newly classified free
    pub cells_free: usize,
    /// Cells newly classified occupied
    pub cells_occupied: usize,
}

impl UpdateResult {
    /// Merge another result into this one.
    pub fn merge(&mut self, other: &UpdateResult) {
        self.cells_updated += other.cells_updated;
        self.cells_free += other.cells_free;
        self.cells_occupied += other.cells_occupied;
    }
}

/// The occupancy grid map.
pub struct OccupancyGridMap {
    storage: GridStorage,
    config: MapConfig,
}

impl OccupancyGridMap {
    /// Create a map from a validated configuration.
    pub fn new(config: MapConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let origin = config.grid.effective_origin();
        let storage = GridStorage::new(
            config.grid.width,
            config.grid.height,
            config.grid.resolution,
            origin,
            config.log_odds.clone(),
        );
        Ok(Self { storage, config })
    }

    /// The underlying grid storage.
    pub fn storage(&self) -> &GridStorage {
        &self.storage
    }

    /// The map configuration.
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Grid dimensions (width, height) in cells.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.storage.width(), self.storage.height())
    }

    /// Convert world coordinates to grid coordinates.
    pub fn world_to_grid(&self, point: Point2D) -> GridCoord {
        self.storage.world_to_grid(point)
    }

    /// Convert grid coordinates to world coordinates (cell center).
    pub fn grid_to_world(&self, coord: GridCoord) -> Point2D {
        self.storage.grid_to_world(coord)
    }

    /// Occupancy probability of a cell; 0.5 for untouched cells.
    pub fn probability(&self, coord: GridCoord) -> f32 {
        self.storage.probability(coord)
    }

    /// Is this cell classified occupied?
    pub fn is_occupied(&self, coord: GridCoord) -> bool {
        self.storage.is_occupied(coord)
    }

    /// Is this cell classified free?
    pub fn is_free(&self, coord: GridCoord) -> bool {
        self.storage.is_free(coord)
    }

    /// Count cells by classification.
    pub fn count_cells(&self) -> CellCounts {
        self.storage.count_cells()
    }

    /// Reset every cell to unknown.
    pub fn clear(&mut self) {
        self.storage.clear();
    }

    /// Integrate a scan, interpreting its hits in the frame of
    /// `reference_pose`.
    ///
    /// Pose-agnostic: the map trusts the caller to supply the pose that
    /// matches the scan's frame. Prefer [`Self::integrate`] where a
    /// [`StampedPose`] is available.
    pub fn update(&mut self, scan: &RangeScan, reference_pose: Pose2D) -> Result<UpdateResult> {
        update::update_from_scan(&mut self.storage, scan, reference_pose)
    }

    /// Integrate a scan after verifying that `reference` carries the same
    /// frame identity the scan was measured in.
    ///
    /// Fails fast with [`SlamError::FrameMismatch`] when the scan was taken
    /// from a different pose than the one supplied — the conflation this
    /// check exists to catch turns up as a silently offset map otherwise.
    pub fn integrate(&mut self, scan: &RangeScan, reference: &StampedPose) -> Result<UpdateResult> {
        if scan.origin != reference.id {
            return Err(SlamError::FrameMismatch {
                scan: scan.origin,
                reference: reference.id,
            });
        }
        self.update(scan, reference.pose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FrameId, RangeBearing};
    use approx::assert_relative_eq;

    fn map() -> OccupancyGridMap {
        let config = MapConfig {
            grid: GridConfig::for_area(40.0, 40.0, 1.0),
            ..Default::default()
        };
        OccupancyGridMap::new(config).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = MapConfig::default();
        config.grid.resolution = -1.0;
        assert!(OccupancyGridMap::new(config).is_err());
    }

    #[test]
    fn test_untouched_probability_is_unknown() {
        let map = map();
        assert_relative_eq!(map.probability(GridCoord::new(3, 3)), 0.5);
    }

    #[test]
    fn test_integrate_accepts_matching_frame() {
        let mut map = map();
        let id = FrameId(42);
        let pose = StampedPose::new(id, Pose2D::new(0.5, 0.5, 0.0));
        let scan = RangeScan::new(id, vec![RangeBearing::new(3.0, 0.0)]);

        let result = map.integrate(&scan, &pose).unwrap();
        assert!(result.cells_updated > 0);
    }

    #[test]
    fn test_integrate_rejects_mismatched_frame() {
        let mut map = map();
        let scan = RangeScan::new(FrameId(1), vec![RangeBearing::new(3.0, 0.0)]);
        let reference = StampedPose::new(FrameId(2), Pose2D::identity());

        let err = map.integrate(&scan, &reference).unwrap_err();
        assert_eq!(
            err,
            SlamError::FrameMismatch {
                scan: FrameId(1),
                reference: FrameId(2),
            }
        );
        // Nothing was touched
        assert_eq!(map.count_cells().observed(), 0);
    }
}
