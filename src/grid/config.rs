//! Configuration types for the occupancy grid.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::core::Point2D;

/// Grid dimensions and placement.
///
/// The grid is a bounded dense array: rays whose endpoint falls outside the
/// configured extent are skipped during updates rather than growing the
/// grid. Size the grid to cover the environment up front.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridConfig {
    /// World units per cell
    #[serde(default = "default_resolution")]
    pub resolution: f32,

    /// Grid width in cells
    #[serde(default = "default_width")]
    pub width: usize,

    /// Grid height in cells
    #[serde(default = "default_height")]
    pub height: usize,

    /// World coordinates of cell (0,0)'s corner.
    /// If None, the grid is centered at the world origin.
    #[serde(default)]
    pub origin: Option<Point2D>,
}

fn default_resolution() -> f32 {
    1.0
}
fn default_width() -> usize {
    64
}
fn default_height() -> usize {
    64
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            width: default_width(),
            height: default_height(),
            origin: None,
        }
    }
}

impl GridConfig {
    /// Create a configuration covering a specific area in world units.
    pub fn for_area(width_units: f32, height_units: f32, resolution: f32) -> Self {
        Self {
            resolution,
            width: (width_units / resolution).ceil() as usize,
            height: (height_units / resolution).ceil() as usize,
            origin: None,
        }
    }

    /// Origin for a grid centered at the world origin.
    pub fn centered_origin(&self) -> Point2D {
        let half_width = (self.width as f32 * self.resolution) / 2.0;
        let half_height = (self.height as f32 * self.resolution) / 2.0;
        Point2D::new(-half_width, -half_height)
    }

    /// Effective origin (centered when `origin` is None).
    pub fn effective_origin(&self) -> Point2D {
        self.origin.unwrap_or_else(|| self.centered_origin())
    }

    /// Validate dimensions and resolution.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(ConfigError::invalid("grid.resolution", "must be positive"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::invalid(
                "grid.width/height",
                "must be non-zero",
            ));
        }
        Ok(())
    }
}

/// Log-odds occupancy update parameters.
///
/// Occupancy belief is held as log-odds `L(x) = log(P(x) / (1 - P(x)))`,
/// stored as fixed-point i16 where actual = value / 100. Updates are
/// additive (`L_new = L_old + L_observation`) and clamped to
/// `[l_min, l_max]` so no amount of repeated identical observations can
/// pin a cell permanently at probability 0 or 1.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogOddsConfig {
    /// Log-odds increment for a hit (ray endpoint = occupied)
    #[serde(default = "default_l_hit")]
    pub l_hit: i16,

    /// Log-odds decrement for a miss (ray passes through = free).
    /// Asymmetric with `l_hit` to make obstacles stickier than free space.
    #[serde(default = "default_l_miss")]
    pub l_miss: i16,

    /// Threshold for classifying a cell occupied
    #[serde(default = "default_l_occupied")]
    pub l_occupied_threshold: i16,

    /// Threshold for classifying a cell free
    #[serde(default = "default_l_free")]
    pub l_free_threshold: i16,

    /// Minimum log-odds value (clamp floor)
    #[serde(default = "default_l_min")]
    pub l_min: i16,

    /// Maximum log-odds value (clamp ceiling)
    #[serde(default = "default_l_max")]
    pub l_max: i16,
}

fn default_l_hit() -> i16 {
    70
}
fn default_l_miss() -> i16 {
    -28
}
fn default_l_occupied() -> i16 {
    50
}
fn default_l_free() -> i16 {
    -50
}
fn default_l_min() -> i16 {
    -200
}
fn default_l_max() -> i16 {
    200
}

impl Default for LogOddsConfig {
    fn default() -> Self {
        Self {
            l_hit: default_l_hit(),
            l_miss: default_l_miss(),
            l_occupied_threshold: default_l_occupied(),
            l_free_threshold: default_l_free(),
            l_min: default_l_min(),
            l_max: default_l_max(),
        }
    }
}

impl LogOddsConfig {
    /// Conservative updates requiring several observations to establish an
    /// obstacle (Cartographer-style values).
    pub fn conservative() -> Self {
        Self {
            l_hit: 20,
            l_miss: -4,
            ..Default::default()
        }
    }

    /// Convert stored fixed-point log-odds to probability.
    /// `P = exp(L/100) / (1 + exp(L/100))`
    pub fn log_odds_to_probability(log_odds: i16) -> f32 {
        let l = log_odds as f32 / 100.0;
        let exp_l = l.exp();
        exp_l / (1.0 + exp_l)
    }

    /// Build hit/miss increments from observation probabilities.
    /// `L = 100 * log(p / (1 - p))`
    pub fn from_probability(hit_prob: f32, miss_prob: f32) -> Self {
        let l_hit = (100.0 * (hit_prob / (1.0 - hit_prob)).ln()) as i16;
        let l_miss = (100.0 * (miss_prob / (1.0 - miss_prob)).ln()) as i16;
        Self {
            l_hit,
            l_miss,
            ..Default::default()
        }
    }

    /// Validate increments and clamp bounds.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.l_hit <= 0 {
            return Err(ConfigError::invalid("log_odds.l_hit", "must be positive"));
        }
        if self.l_miss >= 0 {
            return Err(ConfigError::invalid("log_odds.l_miss", "must be negative"));
        }
        if self.l_min >= self.l_max {
            return Err(ConfigError::invalid(
                "log_odds.l_min/l_max",
                "clamp floor must be below ceiling",
            ));
        }
        Ok(())
    }
}

/// Combined grid + log-odds configuration for the map.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MapConfig {
    /// Grid dimensions and placement
    #[serde(default)]
    pub grid: GridConfig,
    /// Log-odds update parameters
    #[serde(default)]
    pub log_odds: LogOddsConfig,
}

impl MapConfig {
    /// Validate both sections.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.grid.validate()?;
        self.log_odds.validate()
    }
}
