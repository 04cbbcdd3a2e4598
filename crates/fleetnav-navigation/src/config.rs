//! Tunable parameters for the controllers, the mapper, and the planner.
//!
//! Every struct has a `Default` carrying the values the simulated robots are
//! tuned for, so the core can run without a configuration file. With the
//! `serde` feature, missing keys fall back to those defaults.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Proportional, integral and derivative gains.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGains {
    /// Proportional gain.
    pub kp: f64,
    /// Integral gain.
    pub ki: f64,
    /// Derivative gain.
    pub kd: f64,
}

impl PidGains {
    /// Construct a gain set.
    pub const fn new(kp: f64, ki: f64, kd: f64) -> Self {
        PidGains { kp, ki, kd }
    }
}

/// Which sensor array drives the obstacle-avoidance heading.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorSource {
    /// The ordinary proximity readings.
    #[default]
    Proximity,
    /// The short-range infrared ring.
    Infrared,
}

/// Parameters of the steering behaviors and the arbiter.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct ControlConfig {
    /// Fixed tick interval in seconds.
    pub dt: f64,
    /// Linear velocity saturation, symmetric.
    pub max_linear_velocity: f64,
    /// Angular velocity saturation, symmetric.
    pub max_angular_velocity: f64,
    /// Gains of the go-to-goal controller.
    pub go_to_goal: PidGains,
    /// Gains of the obstacle-avoidance controller.
    pub avoid_obstacles: PidGains,
    /// Per-reading weights for the avoidance heading, by reading index.
    /// Readings arrive in the caller's order; the fleet simulator sends the
    /// nearest obstacle first.
    pub sensor_weights: Vec<f64>,
    /// Sensor array used by obstacle avoidance.
    pub sensor_source: SensorSource,
    /// A front distance below this switches to obstacle avoidance.
    pub obstacle_distance_threshold: f64,
    /// Ignore close obstacles while following a planned path.
    pub suppress_avoidance_when_navigating: bool,
    /// Multiplier applied to the reverse speed.
    pub reverse_boost: f64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        ControlConfig {
            dt: 0.03,
            max_linear_velocity: 0.813,
            max_angular_velocity: 2.5,
            go_to_goal: PidGains::new(5.0, 0.0, 0.0),
            avoid_obstacles: PidGains::new(4.0, 0.0, 0.0),
            // Nearest reading weighs most; negative weights push away.
            sensor_weights: vec![-1.0, -0.5, -0.5, -0.75, -0.75],
            sensor_source: SensorSource::Proximity,
            obstacle_distance_threshold: 30.0,
            suppress_avoidance_when_navigating: true,
            reverse_boost: 1.0,
        }
    }
}

impl ControlConfig {
    /// Weight of the reading at `index`; readings past the configured list weigh `1.0`.
    pub fn sensor_weight(&self, index: usize) -> f64 {
        self.sensor_weights.get(index).copied().unwrap_or(1.0)
    }
}

/// Parameters of the windowed grid search.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    /// Robot footprint radius in cells.
    pub robot_radius_px: usize,
    /// Extra clearance kept from mapped obstacles, in cells.
    pub clearance_px: usize,
    /// How much wider the path-cost window is than the validity window.
    pub cost_buffer_px: usize,
    /// Hard cap on node expansions per leg.
    pub max_iterations: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            robot_radius_px: 14,
            clearance_px: 3,
            cost_buffer_px: 4,
            max_iterations: 20_000,
        }
    }
}

impl PlannerConfig {
    /// Half side of the validity window.
    pub fn validity_half_window(&self) -> usize {
        self.robot_radius_px + self.clearance_px
    }

    /// Half side of the path-cost window.
    pub fn cost_half_window(&self) -> usize {
        self.validity_half_window() + self.cost_buffer_px
    }
}

/// Parameters of the morphological denoising pass.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct MappingConfig {
    /// Side of the square structuring element; must be odd.
    pub kernel_size: usize,
    /// Erosion passes, followed by the same number of dilation passes.
    pub iterations: usize,
}

impl Default for MappingConfig {
    fn default() -> Self {
        MappingConfig {
            kernel_size: 3,
            iterations: 1,
        }
    }
}

/// All navigation-core parameters.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NavigationConfig {
    /// Behavior and arbiter parameters.
    pub control: ControlConfig,
    /// Planner parameters.
    pub planner: PlannerConfig,
    /// Mapper parameters.
    pub mapping: MappingConfig,
}
