//! Behavior selection.
//!
//! An [`Arbiter`] owns one robot's snapshot and one instance of every
//! behavior. Per tick it resolves the target, picks the behavior by priority,
//! resets PID memory on a switch, runs one step and converts the command to
//! wheel speeds.
//!
//! Priority, first match wins:
//!
//! 1. `COLLISION` status: [`BehaviorKind::Reverse`].
//! 2. A front distance below the threshold (unless navigating with
//!    avoidance suppressed): [`BehaviorKind::AvoidObstacles`].
//! 3. A target could be resolved: [`BehaviorKind::GoToGoal`].
//! 4. Otherwise idle.

use fleetnav_kinematics::{DifferentialDrive, Point};
use tracing::{debug, trace};

use crate::behavior::Behavior;
use crate::config::{ControlConfig, SensorSource};
use crate::snapshot::{BehaviorKind, DecisionPayload, RobotSnapshot, RobotStatus};

/// Per-robot, per-tick decision maker.
pub struct Arbiter<'a> {
    snapshot: RobotSnapshot,
    config: &'a ControlConfig,
    drive: DifferentialDrive,
    behaviors: [Behavior; 3],
    active: Option<BehaviorKind>,
}

impl<'a> Arbiter<'a> {
    /// Build an arbiter for one snapshot.
    pub fn new(snapshot: RobotSnapshot, config: &'a ControlConfig, drive: DifferentialDrive) -> Self {
        let behaviors = BehaviorKind::ALL.map(|kind| Behavior::new(kind, config));
        Arbiter {
            snapshot,
            config,
            drive,
            behaviors,
            active: None,
        }
    }

    /// The snapshot being decided on.
    pub fn snapshot(&self) -> &RobotSnapshot {
        &self.snapshot
    }

    /// Behavior chosen by the last [`Arbiter::decide`], if any.
    pub fn active(&self) -> Option<BehaviorKind> {
        self.active
    }

    /// Where the robot should be heading this tick.
    ///
    /// Status-specific sources win; the explicit goal is the fallback.
    pub fn resolve_goal(&self) -> Option<Point> {
        let s = &self.snapshot;
        let from_status = match s.status {
            RobotStatus::Mapping => s.mapping_goals.first().copied(),
            RobotStatus::FindLeader => s.leader_position,
            RobotStatus::Navigation => s.path_points.first().copied(),
            RobotStatus::Normal | RobotStatus::Collision => None,
        };
        from_status.or(s.current_goal)
    }

    /// Pick this tick's behavior, given whether a target was resolved.
    pub fn select_behavior(&self, has_goal: bool) -> Option<BehaviorKind> {
        let s = &self.snapshot;
        if s.status == RobotStatus::Collision {
            return Some(BehaviorKind::Reverse);
        }

        let suppressed =
            s.status == RobotStatus::Navigation && self.config.suppress_avoidance_when_navigating;
        let obstacle_close = s
            .front_distances
            .iter()
            .any(|d| *d < self.config.obstacle_distance_threshold);
        if obstacle_close && !suppressed {
            return Some(BehaviorKind::AvoidObstacles);
        }

        if has_goal {
            return Some(BehaviorKind::GoToGoal);
        }
        None
    }

    fn avoidance_readings(&self) -> &[Point] {
        match self.config.sensor_source {
            SensorSource::Proximity => &self.snapshot.sensor_readings,
            SensorSource::Infrared => &self.snapshot.infrared_readings,
        }
    }

    /// Run one tick and produce the decision.
    pub fn decide(&mut self) -> DecisionPayload {
        let goal = self.resolve_goal();
        if let Some(goal) = goal {
            if let Behavior::GoToGoal(gtg) = &mut self.behaviors[BehaviorKind::GoToGoal.index()] {
                gtg.update_goal(&self.snapshot.pose, goal);
            }
        }

        let selected = self.select_behavior(goal.is_some());
        self.active = selected;

        let Some(kind) = selected else {
            trace!(robot_id = self.snapshot.id, "No applicable behavior, idling");
            return DecisionPayload::idle(self.snapshot.id, self.snapshot.pid_state);
        };

        if kind == BehaviorKind::AvoidObstacles {
            let readings = self.avoidance_readings().to_vec();
            if let Behavior::AvoidObstacles(avoid) =
                &mut self.behaviors[BehaviorKind::AvoidObstacles.index()]
            {
                avoid.update_readings(&self.snapshot.pose, &readings, self.config);
            }
        }

        let behavior = &mut self.behaviors[kind.index()];
        if self.snapshot.previous_behavior == Some(kind) {
            behavior.load_pid(self.snapshot.pid_state);
        } else {
            debug!(
                robot_id = self.snapshot.id,
                from = ?self.snapshot.previous_behavior,
                to = %kind,
                "Behavior switch, resetting PID"
            );
            behavior.reset_pid();
        }

        let steering = behavior.compute_steering(self.config);
        let wheel_speeds = self.drive.inverse_kinematics(steering.command);

        DecisionPayload {
            robot_id: self.snapshot.id,
            behavior: Some(kind),
            command: steering.command,
            wheel_speeds,
            pid_state: steering.pid,
        }
    }
}

/// Decide for a single robot.
pub fn compute_single_decision(
    snapshot: RobotSnapshot,
    config: &ControlConfig,
    drive: DifferentialDrive,
) -> DecisionPayload {
    Arbiter::new(snapshot, config, drive).decide()
}

/// Decide for every robot independently, preserving input order.
pub fn compute_decisions(
    robots: &[RobotSnapshot],
    config: &ControlConfig,
    drive: DifferentialDrive,
) -> Vec<DecisionPayload> {
    robots
        .iter()
        .cloned()
        .map(|snapshot| compute_single_decision(snapshot, config, drive))
        .collect()
}
