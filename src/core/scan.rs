//! Range scan types with reference-frame tagging.
//!
//! A scan is an ordered set of (range, bearing) hits measured in the local
//! frame of the pose it was taken from. A scan is meaningless without that
//! pose, so every scan carries the [`FrameId`] of its origin pose. The map's
//! checked integration path compares the tag against the supplied reference
//! pose and fails fast on a mismatch instead of silently building an offset
//! map.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SlamError};

use super::point::Point2D;
use super::pose::Pose2D;

/// Identity of the pose a scan was generated from.
///
/// Minted by whoever owns the pose (the simulation driver for ground-truth
/// poses); opaque to everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameId(pub u64);

/// A pose bound to the frame identity it was observed under.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StampedPose {
    /// Frame identity
    pub id: FrameId,
    /// Pose value
    pub pose: Pose2D,
}

impl StampedPose {
    /// Bind a pose to a frame identity.
    #[inline]
    pub fn new(id: FrameId, pose: Pose2D) -> Self {
        Self { id, pose }
    }
}

/// A single range measurement in the scan's local frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeBearing {
    /// Distance from the scan origin in world units
    pub range: f32,
    /// Bearing in radians relative to the origin pose's heading, CCW positive
    pub bearing: f32,
}

impl RangeBearing {
    /// Create a new measurement.
    #[inline]
    pub fn new(range: f32, bearing: f32) -> Self {
        Self { range, bearing }
    }

    /// Convert to a Cartesian offset in the scan's local frame.
    #[inline]
    pub fn to_local(&self) -> Point2D {
        let (sin_b, cos_b) = self.bearing.sin_cos();
        Point2D::new(self.range * cos_b, self.range * sin_b)
    }
}

/// An ordered sequence of range/bearing hits taken from one pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeScan {
    /// Identity of the pose the hits are relative to
    pub origin: FrameId,
    /// Hit measurements in the origin pose's local frame
    pub hits: Vec<RangeBearing>,
}

impl RangeScan {
    /// Create a scan from hits measured at the pose identified by `origin`.
    pub fn new(origin: FrameId, hits: Vec<RangeBearing>) -> Self {
        Self { origin, hits }
    }

    /// Number of hits.
    #[inline]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Check if the scan has no hits.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Iterate over hits.
    pub fn iter(&self) -> impl Iterator<Item = &RangeBearing> {
        self.hits.iter()
    }

    /// Hits converted to Cartesian offsets in the scan's local frame.
    pub fn local_points(&self) -> Vec<Point2D> {
        self.hits.iter().map(|h| h.to_local()).collect()
    }

    /// Hits projected into the world frame through `pose`.
    ///
    /// The caller is responsible for passing the pose matching
    /// `self.origin`; use the map's checked integration path when the
    /// binding must be enforced.
    pub fn world_points(&self, pose: &Pose2D) -> Vec<Point2D> {
        self.hits
            .iter()
            .map(|h| pose.transform_point(&h.to_local()))
            .collect()
    }

    /// Validate internal consistency: every range finite and non-negative,
    /// every bearing finite.
    pub fn validate(&self) -> Result<()> {
        for hit in &self.hits {
            if !hit.range.is_finite() || hit.range < 0.0 {
                return Err(SlamError::InvalidRange(hit.range));
            }
            if !hit.bearing.is_finite() {
                return Err(SlamError::InvalidRange(hit.bearing));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_range_bearing_to_local() {
        let hit = RangeBearing::new(2.0, FRAC_PI_2);
        let local = hit.to_local();
        assert_relative_eq!(local.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(local.y, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_world_points_through_pose() {
        let scan = RangeScan::new(FrameId(7), vec![RangeBearing::new(1.0, 0.0)]);
        // Facing +Y: a forward hit lands above the pose
        let pose = Pose2D::new(2.0, 3.0, FRAC_PI_2);
        let world = scan.world_points(&pose);
        assert_relative_eq!(world[0].x, 2.0, epsilon = 1e-6);
        assert_relative_eq!(world[0].y, 4.0, epsilon = 1e-6);
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let scan = RangeScan::new(FrameId(0), vec![RangeBearing::new(-1.0, 0.0)]);
        assert!(scan.validate().is_err());

        let scan = RangeScan::new(FrameId(0), vec![RangeBearing::new(f32::NAN, 0.0)]);
        assert!(scan.validate().is_err());

        let scan = RangeScan::new(FrameId(0), vec![RangeBearing::new(1.0, f32::INFINITY)]);
        assert!(scan.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_zero_range() {
        let scan = RangeScan::new(FrameId(0), vec![RangeBearing::new(0.0, 0.0)]);
        assert!(scan.validate().is_ok());
    }
}
