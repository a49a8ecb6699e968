//! Mock device simulation configuration
//!
//! The simulated platform sits in a flat world of straight walls and round
//! posts. All distances are centimetres, headings are degrees CCW from +X.
//!
//! ```toml
//! [device]
//! type = "mock"
//! name = "Bench rover"
//!
//! [device.simulation]
//! start_heading = 90.0
//! step_per_poll = 5.0
//! random_seed = 42
//!
//! [[device.simulation.walls]]
//! from = [-400.0, 120.0]
//! to = [-90.0, 120.0]
//!
//! [[device.simulation.posts]]
//! center = [60.0, 200.0]
//! radius = 8.0
//! ```
//!
//! The default world is a 1000 x 500 box with a partition 120cm ahead of
//! the start and a doorway in it to the left of straight ahead.

use serde::{Deserialize, Serialize};

/// Straight wall between two points
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WallConfig {
    pub from: [f32; 2],
    pub to: [f32; 2],
}

/// Round post
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PostConfig {
    pub center: [f32; 2],
    pub radius: f32,
}

/// Range sensor noise and fault injection
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RangeNoiseConfig {
    /// Range noise standard deviation (cm)
    #[serde(default = "default_range_stddev")]
    pub range_stddev: f32,

    /// Probability of a negative (sensor error) reading
    #[serde(default)]
    pub error_rate: f32,

    /// Probability of a read timing out
    #[serde(default)]
    pub timeout_rate: f32,
}

fn default_range_stddev() -> f32 {
    0.5
}

impl Default for RangeNoiseConfig {
    fn default() -> Self {
        Self {
            range_stddev: default_range_stddev(),
            error_rate: 0.0,
            timeout_rate: 0.0,
        }
    }
}

impl RangeNoiseConfig {
    /// No noise and no faults
    pub fn ideal() -> Self {
        Self {
            range_stddev: 0.0,
            error_rate: 0.0,
            timeout_rate: 0.0,
        }
    }
}

/// Simulated world and platform
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub start_x: f32,

    #[serde(default)]
    pub start_y: f32,

    /// Initial heading (degrees CCW from +X)
    #[serde(default = "default_start_heading")]
    pub start_heading: f32,

    /// Distance covered between two polls while driving (cm)
    #[serde(default = "default_step_per_poll")]
    pub step_per_poll: f32,

    /// Value reported when nothing is hit (cm)
    #[serde(default = "default_max_range")]
    pub max_range: f32,

    /// 0 = random each run
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,

    #[serde(default)]
    pub noise: RangeNoiseConfig,

    #[serde(default = "default_walls")]
    pub walls: Vec<WallConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub posts: Vec<PostConfig>,
}

fn default_start_heading() -> f32 {
    90.0
}
fn default_step_per_poll() -> f32 {
    5.0
}
fn default_max_range() -> f32 {
    400.0
}
fn default_random_seed() -> u64 {
    42
}

fn wall(from: [f32; 2], to: [f32; 2]) -> WallConfig {
    WallConfig { from, to }
}

fn default_walls() -> Vec<WallConfig> {
    vec![
        // Outer box
        wall([-500.0, -100.0], [500.0, -100.0]),
        wall([500.0, -100.0], [500.0, 400.0]),
        wall([500.0, 400.0], [-500.0, 400.0]),
        wall([-500.0, 400.0], [-500.0, -100.0]),
        // Partition with a doorway from x = -90 to x = -8
        wall([-400.0, 120.0], [-90.0, 120.0]),
        wall([-8.0, 120.0], [400.0, 120.0]),
        // Short wall left of the start
        wall([-100.0, -50.0], [-100.0, 118.0]),
    ]
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_x: 0.0,
            start_y: 0.0,
            start_heading: default_start_heading(),
            step_per_poll: default_step_per_poll(),
            max_range: default_max_range(),
            random_seed: default_random_seed(),
            noise: RangeNoiseConfig::default(),
            walls: default_walls(),
            posts: Vec::new(),
        }
    }
}
