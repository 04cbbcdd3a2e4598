use fleetnav_kinematics::{Point, Pose};

use super::Steering;
use super::pid::{HeadingPid, shape_command};
use crate::config::ControlConfig;

/// Steers toward a target point.
#[derive(Debug, Clone, PartialEq)]
pub struct GoToGoal {
    pid: HeadingPid,
    goal: Option<Point>,
    /// Goal in the robot's local frame.
    heading: Point,
}

impl GoToGoal {
    /// A controller with no goal yet.
    pub fn new(config: &ControlConfig) -> Self {
        GoToGoal {
            pid: HeadingPid::new(config.go_to_goal),
            goal: None,
            heading: Point::zero(),
        }
    }

    /// Retarget and recompute the cached heading vector.
    pub fn update_goal(&mut self, pose: &Pose, goal: Point) {
        self.goal = Some(goal);
        self.heading = pose.inverse().transform_point(goal);
    }

    /// Current target.
    pub fn goal(&self) -> Option<Point> {
        self.goal
    }

    /// Cached local-frame heading vector.
    pub fn heading(&self) -> Point {
        self.heading
    }

    pub(crate) fn pid_mut(&mut self) -> &mut HeadingPid {
        &mut self.pid
    }

    pub(crate) fn pid(&self) -> &HeadingPid {
        &self.pid
    }

    /// One PID step toward the cached heading.
    pub fn compute_steering(&mut self, config: &ControlConfig) -> Steering {
        let error = self.heading.angle();
        let omega = self.pid.step(error, config.dt);
        Steering {
            command: shape_command(config, omega),
            pid: self.pid.state(),
        }
    }
}
