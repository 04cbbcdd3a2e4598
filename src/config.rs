use std::time::Duration;

use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use fleetnav_kinematics::{DifferentialDrive, Point, Pose};
use fleetnav_navigation::{NavigationConfig, NavigationError, Region, RegionGraph, RobotStatus};
use serde::Deserialize;
use tracing::{error, info};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Wheel geometry, in map pixels.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    pub wheel_radius: f64,
    pub wheel_base: f64,
}

impl Default for DriveConfig {
    fn default() -> Self {
        // 2.1 cm wheels on an 8.85 cm axle, at 2 px per cm.
        DriveConfig {
            wheel_radius: 0.042,
            wheel_base: 0.177,
        }
    }
}

impl DriveConfig {
    pub fn build(&self) -> anyhow::Result<DifferentialDrive> {
        DifferentialDrive::new(self.wheel_radius, self.wheel_base)
            .map_err(|e| anyhow::anyhow!("invalid drive geometry: {e}"))
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EnvironmentConfig {
    pub width: usize,
    pub height: usize,
}

/// A region in the positional form used by the fleet's map files.
#[derive(Debug, Clone, Deserialize)]
pub struct RegionConfig {
    pub id: usize,
    pub corners: [Point; 4],
    #[serde(default)]
    pub entry_points: Vec<Point>,
    #[serde(default)]
    pub connected_region_ids: Vec<usize>,
}

impl RegionConfig {
    pub fn to_region(&self) -> Result<Region, NavigationError> {
        Region::from_parallel_lists(
            self.id,
            self.corners,
            &self.entry_points,
            &self.connected_region_ids,
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RobotConfig {
    pub id: u32,
    pub pose: Pose,
    #[serde(default)]
    pub status: RobotStatus,
    #[serde(default)]
    pub goal: Option<Point>,
    #[serde(default)]
    pub mapping_goals: Vec<Point>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Wall-clock period of one tick.
    pub tick_ms: u64,
    /// Ticks to run before stopping.
    pub max_ticks: u64,
    /// Obstacles closer than this are reported by the proximity sensors.
    pub sensor_range: f64,
    /// Half-angle of the front-facing sensor cone, radians.
    pub front_half_angle: f64,
    /// Obstacles closer than this put a robot in collision.
    pub collision_distance: f64,
    /// A path point closer than this counts as reached.
    pub waypoint_tolerance: f64,
    /// Capacity of the telemetry topic.
    pub telemetry_capacity: usize,
    /// Simulated seconds per control period, as a multiple of `dt`.
    pub time_scale: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            tick_ms: 30,
            max_ticks: 2_000,
            sensor_range: 40.0,
            front_half_angle: std::f64::consts::FRAC_PI_4,
            collision_distance: 7.0,
            waypoint_tolerance: 2.0,
            telemetry_capacity: 16,
            time_scale: 1.0,
        }
    }
}

impl SimulationConfig {
    /// Wall-clock tick period. A zero period is rejected.
    pub fn tick_period(&self) -> anyhow::Result<Duration> {
        if self.tick_ms == 0 {
            anyhow::bail!("simulation.tick_ms must be non-zero");
        }
        Ok(Duration::from_millis(self.tick_ms))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub drive: DriveConfig,
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub regions: Vec<RegionConfig>,
    #[serde(default)]
    pub robots: Vec<RobotConfig>,
    /// Obstacle samples, world frame.
    #[serde(default)]
    pub obstacles: Vec<Point>,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl AppConfig {
    pub fn region_graph(&self) -> anyhow::Result<RegionGraph> {
        let regions = self
            .regions
            .iter()
            .map(RegionConfig::to_region)
            .collect::<Result<Vec<_>, _>>()
            .context("invalid region definition")?;
        RegionGraph::from_regions(regions).context("invalid region set")
    }
}

/// Load `config/default.toml`, overridden by `FLEETNAV__SECTION__KEY` variables.
pub fn load_config() -> anyhow::Result<AppConfig> {
    info!("Attempting to load configuration from {}", DEFAULT_CONFIG_PATH);

    let settings = Config::builder()
        .add_source(File::new(DEFAULT_CONFIG_PATH, FileFormat::Toml).required(true))
        .add_source(
            Environment::with_prefix("FLEETNAV")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .and_then(|c| c.try_deserialize::<AppConfig>());

    match settings {
        Ok(config) => {
            info!(
                regions = config.regions.len(),
                robots = config.robots.len(),
                obstacles = config.obstacles.len(),
                "Successfully loaded configuration"
            );
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e).context("loading configuration")
        }
    }
}
