//! Per-tick robot input and the decision produced for it.

use core::fmt;

use fleetnav_kinematics::{ChassisSpeeds, Point, Pose, WheelSpeeds};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What the robot is currently doing, as reported by the caller.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RobotStatus {
    /// No special mode.
    #[default]
    Normal,
    /// The robot has hit something.
    Collision,
    /// Exploring; targets come from the mapping goals.
    Mapping,
    /// Rejoining the leader robot.
    FindLeader,
    /// Following a planned path.
    Navigation,
}

/// The steering behaviors the arbiter can activate.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorKind {
    /// Steer toward a target point.
    GoToGoal,
    /// Steer away from nearby obstacles.
    AvoidObstacles,
    /// Drive straight backward.
    Reverse,
}

impl BehaviorKind {
    /// All behaviors, in arbiter slot order.
    pub const ALL: [BehaviorKind; 3] = [
        BehaviorKind::GoToGoal,
        BehaviorKind::AvoidObstacles,
        BehaviorKind::Reverse,
    ];

    /// Slot of this behavior in the arbiter.
    pub const fn index(self) -> usize {
        match self {
            BehaviorKind::GoToGoal => 0,
            BehaviorKind::AvoidObstacles => 1,
            BehaviorKind::Reverse => 2,
        }
    }
}

impl fmt::Display for BehaviorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BehaviorKind::GoToGoal => write!(f, "GoToGoal"),
            BehaviorKind::AvoidObstacles => write!(f, "AvoidObstacles"),
            BehaviorKind::Reverse => write!(f, "Reverse"),
        }
    }
}

/// Controller memory carried between ticks by the caller.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PidState {
    /// Previous proportional error.
    pub prev_error: f64,
    /// Previous integral accumulator.
    pub prev_integral: f64,
}

impl PidState {
    /// Construct a state.
    pub const fn new(prev_error: f64, prev_integral: f64) -> Self {
        PidState {
            prev_error,
            prev_integral,
        }
    }

    /// The zeroed state.
    pub const fn zero() -> Self {
        PidState::new(0.0, 0.0)
    }
}

/// Immutable view of one robot for a single tick.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RobotSnapshot {
    /// Robot id.
    pub id: u32,
    /// World pose.
    pub pose: Pose,
    /// Proximity sensor hits, world frame.
    pub sensor_readings: Vec<Point>,
    /// Infrared sensor hits, world frame.
    pub infrared_readings: Vec<Point>,
    /// Distances reported by the front-facing sensors.
    pub front_distances: Vec<f64>,
    /// Explicit target, if any.
    pub current_goal: Option<Point>,
    /// Exploration targets, nearest first.
    pub mapping_goals: Vec<Point>,
    /// Remaining points of a planned path.
    pub path_points: Vec<Point>,
    /// Where the leader robot is.
    pub leader_position: Option<Point>,
    /// Reported status.
    pub status: RobotStatus,
    /// Behavior active on the previous tick.
    pub previous_behavior: Option<BehaviorKind>,
    /// PID state returned by the previous decision.
    pub pid_state: PidState,
}

impl RobotSnapshot {
    /// A snapshot with only an id and a pose.
    pub fn new(id: u32, pose: Pose) -> Self {
        RobotSnapshot {
            id,
            pose,
            ..Default::default()
        }
    }

    /// Set the status.
    pub fn with_status(mut self, status: RobotStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the explicit goal.
    pub fn with_goal(mut self, goal: Point) -> Self {
        self.current_goal = Some(goal);
        self
    }

    /// Set the mapping goals.
    pub fn with_mapping_goals(mut self, goals: Vec<Point>) -> Self {
        self.mapping_goals = goals;
        self
    }

    /// Set the remaining path points.
    pub fn with_path_points(mut self, points: Vec<Point>) -> Self {
        self.path_points = points;
        self
    }

    /// Set the leader position.
    pub fn with_leader(mut self, leader: Point) -> Self {
        self.leader_position = Some(leader);
        self
    }

    /// Set proximity readings and the front distances.
    pub fn with_readings(mut self, readings: Vec<Point>, front_distances: Vec<f64>) -> Self {
        self.sensor_readings = readings;
        self.front_distances = front_distances;
        self
    }

    /// Set infrared readings.
    pub fn with_infrared(mut self, readings: Vec<Point>) -> Self {
        self.infrared_readings = readings;
        self
    }

    /// Carry the previous tick's behavior and PID state.
    pub fn with_previous(mut self, behavior: Option<BehaviorKind>, pid_state: PidState) -> Self {
        self.previous_behavior = behavior;
        self.pid_state = pid_state;
        self
    }
}

/// The arbiter's output for one robot and one tick.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionPayload {
    /// Robot id.
    pub robot_id: u32,
    /// Active behavior, `None` when idle.
    pub behavior: Option<BehaviorKind>,
    /// Saturated unicycle command the wheel speeds were derived from.
    pub command: ChassisSpeeds,
    /// Wheel velocities to apply.
    pub wheel_speeds: WheelSpeeds,
    /// PID state to feed back next tick.
    pub pid_state: PidState,
}

impl DecisionPayload {
    /// A no-op decision that leaves the carried PID state untouched.
    pub fn idle(robot_id: u32, pid_state: PidState) -> Self {
        DecisionPayload {
            robot_id,
            behavior: None,
            command: ChassisSpeeds::stop(),
            wheel_speeds: WheelSpeeds::default(),
            pid_state,
        }
    }

    /// True when no behavior ran.
    pub fn is_idle(&self) -> bool {
        self.behavior.is_none()
    }
}

impl fmt::Display for DecisionPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.behavior {
            Some(kind) => write!(
                f,
                "robot {} {} {} -> {}",
                self.robot_id, kind, self.command, self.wheel_speeds
            ),
            None => write!(f, "robot {} idle", self.robot_id),
        }
    }
}
