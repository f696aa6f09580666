//! Matching strategies for loop-closure detection.

use crate::core::math::angle_diff;
use crate::core::{Pose2D, RangeScan};

use super::config::LoopClosureConfig;
use super::history::ScanHistory;

/// A detected revisit of a previously recorded location.
#[derive(Clone, Debug, PartialEq)]
pub struct ClosureMatch {
    /// Index of the matched entry in the history (0 = oldest)
    pub entry_index: usize,
    /// Tick the matched entry was recorded at
    pub tick: u64,
    /// Pose recorded in the matched entry
    pub matched_pose: Pose2D,
    /// Position distance between the current pose and the match
    pub distance: f32,
}

/// Strategy for finding a revisited location in the history.
///
/// The shipped implementation matches on spatial proximity. Scan-similarity
/// matching is an open extension point: implement this trait and hand the
/// matcher to the corrector.
pub trait ClosureMatcher: Send + Sync {
    /// Search the history for an entry matching the current pose and scan.
    ///
    /// Returns `None` when nothing matches; that is the normal case, not
    /// an error.
    fn find_match(
        &self,
        current_pose: &Pose2D,
        current_scan: &RangeScan,
        history: &ScanHistory,
        current_tick: u64,
    ) -> Option<ClosureMatch>;
}

/// Spatial-proximity matcher.
///
/// An entry matches when its position lies within the distance threshold
/// AND its heading within the heading tolerance of the current pose, and
/// it is at least `min_age_ticks` old. The best match is the one with the
/// smallest position distance; on a tie, the most recently recorded entry
/// wins.
#[derive(Clone, Debug)]
pub struct SpatialMatcher {
    distance_threshold: f32,
    heading_tolerance: f32,
    min_age_ticks: u64,
}

impl SpatialMatcher {
    /// Build a matcher from the loop-closure configuration.
    pub fn new(config: &LoopClosureConfig) -> Self {
        Self {
            distance_threshold: config.distance_threshold,
            heading_tolerance: config.heading_tolerance,
            min_age_ticks: config.min_age_ticks,
        }
    }
}

impl ClosureMatcher for SpatialMatcher {
    fn find_match(
        &self,
        current_pose: &Pose2D,
        _current_scan: &RangeScan,
        history: &ScanHistory,
        current_tick: u64,
    ) -> Option<ClosureMatch> {
        let mut best: Option<ClosureMatch> = None;

        // Newest-first so that equal distances resolve toward the most
        // recently recorded entry
        for (index, entry) in history.iter().enumerate().rev() {
            if current_tick.saturating_sub(entry.tick) < self.min_age_ticks {
                continue;
            }

            let distance = current_pose.distance_to(&entry.pose);
            if distance > self.distance_threshold {
                continue;
            }
            if angle_diff(current_pose.theta, entry.pose.theta).abs() > self.heading_tolerance {
                continue;
            }

            let better = match &best {
                Some(b) => distance < b.distance,
                None => true,
            };
            if better {
                best = Some(ClosureMatch {
                    entry_index: index,
                    tick: entry.tick,
                    matched_pose: entry.pose,
                    distance,
                });
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FrameId;

    fn scan() -> RangeScan {
        RangeScan::new(FrameId(0), vec![])
    }

    fn matcher(distance_threshold: f32, min_age_ticks: u64) -> SpatialMatcher {
        SpatialMatcher::new(&LoopClosureConfig {
            distance_threshold,
            min_age_ticks,
            ..Default::default()
        })
    }

    #[test]
    fn test_empty_history_no_match() {
        let history = ScanHistory::new(10);
        let m = matcher(1.0, 0);
        assert!(m
            .find_match(&Pose2D::identity(), &scan(), &history, 100)
            .is_none());
    }

    #[test]
    fn test_match_within_threshold() {
        let mut history = ScanHistory::new(10);
        history.push(1, Pose2D::new(0.0, 0.0, 0.0), scan());

        let m = matcher(1.0, 0);
        let found = m
            .find_match(&Pose2D::new(0.3, 0.0, 0.0), &scan(), &history, 100)
            .unwrap();
        assert_eq!(found.tick, 1);
        assert!((found.distance - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_no_match_beyond_threshold() {
        let mut history = ScanHistory::new(10);
        history.push(1, Pose2D::new(0.0, 0.0, 0.0), scan());

        let m = matcher(1.0, 0);
        assert!(m
            .find_match(&Pose2D::new(5.0, 0.0, 0.0), &scan(), &history, 100)
            .is_none());
    }

    #[test]
    fn test_no_match_outside_heading_tolerance() {
        let mut history = ScanHistory::new(10);
        history.push(1, Pose2D::new(0.0, 0.0, std::f32::consts::PI), scan());

        let m = matcher(1.0, 0);
        assert!(m
            .find_match(&Pose2D::new(0.1, 0.0, 0.0), &scan(), &history, 100)
            .is_none());
    }

    #[test]
    fn test_min_age_guard_skips_recent_entries() {
        let mut history = ScanHistory::new(10);
        history.push(95, Pose2D::identity(), scan());

        let m = matcher(1.0, 10);
        assert!(m
            .find_match(&Pose2D::identity(), &scan(), &history, 100)
            .is_none());

        // Same entry matches once enough ticks have passed
        assert!(m
            .find_match(&Pose2D::identity(), &scan(), &history, 105)
            .is_some());
    }

    #[test]
    fn test_prefers_smallest_distance() {
        let mut history = ScanHistory::new(10);
        history.push(1, Pose2D::new(0.4, 0.0, 0.0), scan());
        history.push(2, Pose2D::new(0.1, 0.0, 0.0), scan());
        history.push(3, Pose2D::new(0.3, 0.0, 0.0), scan());

        let m = matcher(1.0, 0);
        let found = m
            .find_match(&Pose2D::identity(), &scan(), &history, 100)
            .unwrap();
        assert_eq!(found.tick, 2);
    }

    #[test]
    fn test_tie_breaks_toward_most_recent() {
        let mut history = ScanHistory::new(10);
        history.push(1, Pose2D::new(0.2, 0.0, 0.0), scan());
        history.push(2, Pose2D::new(0.2, 0.0, 0.0), scan());

        let m = matcher(1.0, 0);
        let found = m
            .find_match(&Pose2D::identity(), &scan(), &history, 100)
            .unwrap();
        assert_eq!(found.tick, 2);
    }
}
