//! Behavior arbitration and hierarchical path planning for a fleet of
//! differential-drive robots.
//!
//! The per-tick entry points are [`compute_decisions`] and
//! [`compute_single_decision`]; mapping goes through [`map::build_map`] and
//! planning through [`planner::plan`].

pub mod arbiter;
pub mod astar;
pub mod behavior;
pub mod config;
pub mod error;
pub mod map;
pub mod planner;
pub mod region;
pub mod snapshot;

pub use arbiter::{Arbiter, compute_decisions, compute_single_decision};
pub use config::{ControlConfig, MappingConfig, NavigationConfig, PidGains, PlannerConfig, SensorSource};
pub use error::{NavigationError, PlanningError};
pub use planner::{PlannedPath, plan};
pub use region::{Bounds, Region, RegionGraph};
pub use snapshot::{BehaviorKind, DecisionPayload, PidState, RobotSnapshot, RobotStatus};
