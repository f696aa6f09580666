//! Scan integration into the occupancy grid.
//!
//! For each hit in a scan:
//! - all cells along the ray from the reference cell receive a miss
//!   observation (evidence of free space),
//! - the terminal cell receives a hit observation (evidence of an obstacle),
//! - touched cells are clamped into the configured log-odds band.
//!
//! The functions here are pose-agnostic: they trust whatever reference pose
//! the caller supplies. Frame-tag enforcement lives one level up in
//! [`super::OccupancyGridMap::integrate`].

use crate::core::{Pose2D, RangeScan};
use crate::error::{Result, SlamError};

use super::raycaster::BresenhamLine;
use super::storage::GridStorage;
use super::UpdateResult;

/// Integrate a scan into the grid, interpreting its hits in the frame of
/// `reference_pose`.
///
/// Rejects empty scans, non-finite poses, and invalid range values without
/// touching any cell. Rays whose endpoint falls outside the grid are
/// skipped.
pub fn update_from_scan(
    storage: &mut GridStorage,
    scan: &RangeScan,
    reference_pose: Pose2D,
) -> Result<UpdateResult> {
    if scan.is_empty() {
        return Err(SlamError::EmptyScan);
    }
    if !reference_pose.is_finite() {
        return Err(SlamError::NonFinitePose("map update"));
    }
    scan.validate()?;

    let mut result = UpdateResult::default();
    let reference_coord = storage.world_to_grid(reference_pose.position());

    for hit in scan.iter() {
        let endpoint = reference_pose.transform_point(&hit.to_local());
        let endpoint_coord = storage.world_to_grid(endpoint);

        if !storage.is_valid_coord(endpoint_coord) {
            continue;
        }

        for coord in BresenhamLine::new(reference_coord, endpoint_coord) {
            if !storage.is_valid_coord(coord) {
                continue;
            }
            if coord == endpoint_coord {
                if storage.apply_hit(coord) {
                    result.cells_occupied += 1;
                }
            } else if storage.apply_miss(coord) {
                result.cells_free += 1;
            }
            result.cells_updated += 1;
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FrameId, GridCoord, Point2D, RangeBearing};
    use crate::grid::config::LogOddsConfig;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn storage() -> GridStorage {
        GridStorage::centered(40, 40, 1.0, LogOddsConfig::default())
    }

    fn scan_of(hits: Vec<RangeBearing>) -> RangeScan {
        RangeScan::new(FrameId(0), hits)
    }

    #[test]
    fn test_ray_marks_free_and_occupied() {
        let mut storage = storage();
        let scan = scan_of(vec![RangeBearing::new(5.0, 0.0)]);
        let pose = Pose2D::new(0.5, 0.5, 0.0);

        let result = update_from_scan(&mut storage, &scan, pose).unwrap();
        assert!(result.cells_updated > 0);

        // Endpoint cell gets obstacle evidence
        let end = storage.world_to_grid(Point2D::new(5.5, 0.5));
        assert!(storage.log_odds(end) > 0);

        // Cells along the ray get free-space evidence
        let mid = storage.world_to_grid(Point2D::new(2.5, 0.5));
        assert!(storage.log_odds(mid) < 0);
    }

    #[test]
    fn test_heading_rotates_hits() {
        let mut storage = storage();
        // Forward hit while facing +Y lands above the pose
        let scan = scan_of(vec![RangeBearing::new(3.0, 0.0)]);
        let pose = Pose2D::new(0.5, 0.5, FRAC_PI_2);

        update_from_scan(&mut storage, &scan, pose).unwrap();

        let end = storage.world_to_grid(Point2D::new(0.5, 3.5));
        assert!(storage.log_odds(end) > 0);
    }

    #[test]
    fn test_locality_far_cells_untouched() {
        let mut storage = storage();
        let scan = scan_of(vec![
            RangeBearing::new(4.0, 0.0),
            RangeBearing::new(4.0, FRAC_PI_2),
            RangeBearing::new(4.0, PI),
        ]);
        update_from_scan(&mut storage, &scan, Pose2D::identity()).unwrap();

        // A cell in the quadrant no ray passes through stays pristine
        let far = GridCoord::new(8, 8);
        assert!(!storage.is_observed(far));
        assert_eq!(storage.log_odds(far), 0);
    }

    #[test]
    fn test_repeated_updates_stay_clamped() {
        let mut storage = storage();
        let scan = scan_of(vec![RangeBearing::new(3.0, 0.0)]);
        let pose = Pose2D::new(0.5, 0.5, 0.0);

        for _ in 0..50 {
            update_from_scan(&mut storage, &scan, pose).unwrap();
        }

        let config = storage.log_odds_config().clone();
        let end = storage.world_to_grid(Point2D::new(3.5, 0.5));
        assert_eq!(storage.log_odds(end), config.l_max);
        let mid = storage.world_to_grid(Point2D::new(1.5, 0.5));
        assert_eq!(storage.log_odds(mid), config.l_min);
    }

    #[test]
    fn test_empty_scan_rejected() {
        let mut storage = storage();
        let scan = scan_of(vec![]);
        let err = update_from_scan(&mut storage, &scan, Pose2D::identity());
        assert_eq!(err, Err(SlamError::EmptyScan));
    }

    #[test]
    fn test_non_finite_pose_rejected_without_mutation() {
        let mut storage = storage();
        let scan = scan_of(vec![RangeBearing::new(2.0, 0.0)]);
        let bad = Pose2D {
            x: f32::NAN,
            y: 0.0,
            theta: 0.0,
        };
        assert!(update_from_scan(&mut storage, &scan, bad).is_err());
        assert_eq!(storage.count_cells().observed(), 0);
    }

    #[test]
    fn test_invalid_range_rejected_without_mutation() {
        let mut storage = storage();
        let scan = scan_of(vec![
            RangeBearing::new(2.0, 0.0),
            RangeBearing::new(f32::NAN, 0.0),
        ]);
        assert!(update_from_scan(&mut storage, &scan, Pose2D::identity()).is_err());
        assert_eq!(storage.count_cells().observed(), 0);
    }

    #[test]
    fn test_out_of_grid_endpoint_skipped() {
        let mut storage = storage();
        let scan = scan_of(vec![RangeBearing::new(500.0, 0.0)]);
        let result = update_from_scan(&mut storage, &scan, Pose2D::identity()).unwrap();
        assert_eq!(result.cells_updated, 0);
    }
}
