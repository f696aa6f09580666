//! Dense grid storage with log-odds occupancy belief.

use crate::core::{GridCoord, Point2D};

use super::config::LogOddsConfig;

/// Per-classification cell counts for map statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellCounts {
    /// Cells classified occupied (log-odds above the occupied threshold)
    pub occupied: usize,
    /// Cells classified free (log-odds below the free threshold)
    pub free: usize,
    /// Cells touched by at least one observation but not yet classified
    pub undecided: usize,
    /// Cells never touched by any observation
    pub unobserved: usize,
}

impl CellCounts {
    /// Total cells touched by at least one observation.
    pub fn observed(&self) -> usize {
        self.occupied + self.free + self.undecided
    }
}

/// Bounded dense grid holding per-cell log-odds occupancy belief.
///
/// Coordinates: cell (0, 0) sits at `origin` in world coordinates; cell
/// (x, y) covers `[origin + x*resolution, origin + (x+1)*resolution)` on
/// each axis. Log-odds are fixed-point i16 (actual = value / 100), clamped
/// to the configured band on every update. Probability is always derived
/// through the logistic transform, never stored.
#[derive(Clone, Debug)]
pub struct GridStorage {
    log_odds: Vec<i16>,
    observation_counts: Vec<u16>,
    width: usize,
    height: usize,
    resolution: f32,
    inv_resolution: f32,
    origin: Point2D,
    config: LogOddsConfig,
}

impl GridStorage {
    /// Create a grid with the given dimensions and log-odds parameters.
    pub fn new(
        width: usize,
        height: usize,
        resolution: f32,
        origin: Point2D,
        config: LogOddsConfig,
    ) -> Self {
        let size = width * height;
        Self {
            log_odds: vec![0; size],
            observation_counts: vec![0; size],
            width,
            height,
            resolution,
            inv_resolution: 1.0 / resolution,
            origin,
            config,
        }
    }

    /// Create a grid centered at the world origin.
    pub fn centered(width: usize, height: usize, resolution: f32, config: LogOddsConfig) -> Self {
        let half_width = (width as f32 * resolution) / 2.0;
        let half_height = (height as f32 * resolution) / 2.0;
        Self::new(
            width,
            height,
            resolution,
            Point2D::new(-half_width, -half_height),
            config,
        )
    }

    /// Grid width in cells.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// World units per cell.
    #[inline]
    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    /// World coordinates of cell (0, 0)'s corner.
    #[inline]
    pub fn origin(&self) -> Point2D {
        self.origin
    }

    /// The log-odds parameters in effect.
    #[inline]
    pub fn log_odds_config(&self) -> &LogOddsConfig {
        &self.config
    }

    /// Convert world coordinates to grid coordinates.
    #[inline]
    pub fn world_to_grid(&self, point: Point2D) -> GridCoord {
        GridCoord::new(
            ((point.x - self.origin.x) * self.inv_resolution).floor() as i32,
            ((point.y - self.origin.y) * self.inv_resolution).floor() as i32,
        )
    }

    /// Convert grid coordinates to world coordinates (cell center).
    #[inline]
    pub fn grid_to_world(&self, coord: GridCoord) -> Point2D {
        Point2D::new(
            self.origin.x + (coord.x as f32 + 0.5) * self.resolution,
            self.origin.y + (coord.y as f32 + 0.5) * self.resolution,
        )
    }

    /// Check if grid coordinates are within bounds.
    #[inline]
    pub fn is_valid_coord(&self, coord: GridCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as usize) < self.width
            && (coord.y as usize) < self.height
    }

    #[inline]
    fn coord_to_index(&self, coord: GridCoord) -> Option<usize> {
        if self.is_valid_coord(coord) {
            Some(coord.y as usize * self.width + coord.x as usize)
        } else {
            None
        }
    }

    /// Apply a hit observation (evidence of an obstacle).
    ///
    /// Returns true if the cell crossed the occupied threshold with this
    /// observation. Out-of-bounds coordinates are ignored.
    pub fn apply_hit(&mut self, coord: GridCoord) -> bool {
        let Some(i) = self.coord_to_index(coord) else {
            return false;
        };
        let before = self.log_odds[i];
        let after = before
            .saturating_add(self.config.l_hit)
            .clamp(self.config.l_min, self.config.l_max);
        self.log_odds[i] = after;
        self.observation_counts[i] = self.observation_counts[i].saturating_add(1);
        before < self.config.l_occupied_threshold && after >= self.config.l_occupied_threshold
    }

    /// Apply a miss observation (evidence of free space).
    ///
    /// Returns true if the cell crossed the free threshold with this
    /// observation. Out-of-bounds coordinates are ignored.
    pub fn apply_miss(&mut self, coord: GridCoord) -> bool {
        let Some(i) = self.coord_to_index(coord) else {
            return false;
        };
        let before = self.log_odds[i];
        let after = before
            .saturating_add(self.config.l_miss)
            .clamp(self.config.l_min, self.config.l_max);
        self.log_odds[i] = after;
        self.observation_counts[i] = self.observation_counts[i].saturating_add(1);
        before > self.config.l_free_threshold && after <= self.config.l_free_threshold
    }

    /// Stored log-odds for a cell (0 for out-of-bounds or untouched cells).
    #[inline]
    pub fn log_odds(&self, coord: GridCoord) -> i16 {
        self.coord_to_index(coord)
            .map(|i| self.log_odds[i])
            .unwrap_or(0)
    }

    /// Occupancy probability for a cell via the logistic transform.
    ///
    /// Untouched cells report 0.5 (unknown).
    #[inline]
    pub fn probability(&self, coord: GridCoord) -> f32 {
        LogOddsConfig::log_odds_to_probability(self.log_odds(coord))
    }

    /// Has this cell received at least one observation?
    #[inline]
    pub fn is_observed(&self, coord: GridCoord) -> bool {
        self.coord_to_index(coord)
            .map(|i| self.observation_counts[i] > 0)
            .unwrap_or(false)
    }

    /// Is this cell classified occupied?
    #[inline]
    pub fn is_occupied(&self, coord: GridCoord) -> bool {
        self.log_odds(coord) >= self.config.l_occupied_threshold
    }

    /// Is this cell classified free?
    #[inline]
    pub fn is_free(&self, coord: GridCoord) -> bool {
        self.coord_to_index(coord)
            .map(|i| {
                self.observation_counts[i] > 0 && self.log_odds[i] <= self.config.l_free_threshold
            })
            .unwrap_or(false)
    }

    /// Count cells by classification.
    pub fn count_cells(&self) -> CellCounts {
        let mut counts = CellCounts::default();
        for (i, &l) in self.log_odds.iter().enumerate() {
            if self.observation_counts[i] == 0 {
                counts.unobserved += 1;
            } else if l >= self.config.l_occupied_threshold {
                counts.occupied += 1;
            } else if l <= self.config.l_free_threshold {
                counts.free += 1;
            } else {
                counts.undecided += 1;
            }
        }
        counts
    }

    /// Reset every cell to unknown.
    pub fn clear(&mut self) {
        self.log_odds.fill(0);
        self.observation_counts.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn storage() -> GridStorage {
        GridStorage::centered(20, 20, 1.0, LogOddsConfig::default())
    }

    #[test]
    fn test_world_grid_roundtrip() {
        let storage = storage();
        let coord = storage.world_to_grid(Point2D::new(0.0, 0.0));
        let back = storage.grid_to_world(coord);
        assert!((back.x - 0.0).abs() < storage.resolution());
        assert!((back.y - 0.0).abs() < storage.resolution());
    }

    #[test]
    fn test_untouched_cell_is_unknown() {
        let storage = storage();
        let coord = GridCoord::new(5, 5);
        assert_relative_eq!(storage.probability(coord), 0.5);
        assert!(!storage.is_observed(coord));
        assert!(!storage.is_occupied(coord));
        assert!(!storage.is_free(coord));
    }

    #[test]
    fn test_hit_raises_probability() {
        let mut storage = storage();
        let coord = GridCoord::new(3, 3);
        let crossed = storage.apply_hit(coord);
        assert!(crossed); // default l_hit crosses the threshold in one hit
        assert!(storage.probability(coord) > 0.5);
        assert!(storage.is_occupied(coord));
    }

    #[test]
    fn test_miss_lowers_probability() {
        let mut storage = storage();
        let coord = GridCoord::new(3, 3);
        storage.apply_miss(coord);
        assert!(storage.probability(coord) < 0.5);
        assert!(storage.is_observed(coord));
    }

    #[test]
    fn test_log_odds_clamped_at_bounds() {
        let mut storage = storage();
        let coord = GridCoord::new(1, 1);
        for _ in 0..100 {
            storage.apply_hit(coord);
        }
        assert_eq!(storage.log_odds(coord), storage.log_odds_config().l_max);

        for _ in 0..200 {
            storage.apply_miss(coord);
        }
        assert_eq!(storage.log_odds(coord), storage.log_odds_config().l_min);
    }

    #[test]
    fn test_out_of_bounds_ignored() {
        let mut storage = storage();
        let coord = GridCoord::new(-1, 100);
        assert!(!storage.apply_hit(coord));
        assert_eq!(storage.log_odds(coord), 0);
        assert_relative_eq!(storage.probability(coord), 0.5);
    }

    #[test]
    fn test_count_cells() {
        let mut storage = storage();
        storage.apply_hit(GridCoord::new(0, 0));
        storage.apply_miss(GridCoord::new(1, 0));
        storage.apply_miss(GridCoord::new(1, 0));

        let counts = storage.count_cells();
        assert_eq!(counts.occupied, 1);
        assert_eq!(counts.free, 1);
        assert_eq!(counts.observed(), 2);
        assert_eq!(counts.unobserved, 20 * 20 - 2);
    }

    #[test]
    fn test_clear() {
        let mut storage = storage();
        storage.apply_hit(GridCoord::new(0, 0));
        storage.clear();
        assert_eq!(storage.count_cells().observed(), 0);
    }
}
