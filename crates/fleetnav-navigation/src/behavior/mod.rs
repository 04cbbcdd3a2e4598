//! Steering behaviors.
//!
//! Each behavior owns its own PID memory and turns geometry into a saturated
//! unicycle command. [`Behavior`] is the closed set the arbiter switches over.

mod avoid_obstacles;
mod go_to_goal;
pub mod pid;
mod reverse;

pub use avoid_obstacles::AvoidObstacles;
pub use go_to_goal::GoToGoal;
pub use reverse::Reverse;

use fleetnav_kinematics::ChassisSpeeds;

use crate::config::ControlConfig;
use crate::snapshot::{BehaviorKind, PidState};

/// Output of one controller step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steering {
    /// Saturated unicycle command.
    pub command: ChassisSpeeds,
    /// Controller memory after the step.
    pub pid: PidState,
}

/// One steering behavior together with its PID memory.
#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    /// See [`GoToGoal`].
    GoToGoal(GoToGoal),
    /// See [`AvoidObstacles`].
    AvoidObstacles(AvoidObstacles),
    /// See [`Reverse`].
    Reverse(Reverse),
}

impl Behavior {
    /// A fresh behavior of the given kind.
    pub fn new(kind: BehaviorKind, config: &ControlConfig) -> Self {
        match kind {
            BehaviorKind::GoToGoal => Behavior::GoToGoal(GoToGoal::new(config)),
            BehaviorKind::AvoidObstacles => Behavior::AvoidObstacles(AvoidObstacles::new(config)),
            BehaviorKind::Reverse => Behavior::Reverse(Reverse::new()),
        }
    }

    /// Tag of this behavior.
    pub fn kind(&self) -> BehaviorKind {
        match self {
            Behavior::GoToGoal(_) => BehaviorKind::GoToGoal,
            Behavior::AvoidObstacles(_) => BehaviorKind::AvoidObstacles,
            Behavior::Reverse(_) => BehaviorKind::Reverse,
        }
    }

    /// Current PID memory.
    pub fn pid_state(&self) -> PidState {
        match self {
            Behavior::GoToGoal(b) => b.pid().state(),
            Behavior::AvoidObstacles(b) => b.pid().state(),
            Behavior::Reverse(b) => b.pid().state(),
        }
    }

    /// Continue from a carried-forward PID state.
    pub fn load_pid(&mut self, state: PidState) {
        match self {
            Behavior::GoToGoal(b) => b.pid_mut().load(state),
            Behavior::AvoidObstacles(b) => b.pid_mut().load(state),
            Behavior::Reverse(b) => b.pid_mut().load(state),
        }
    }

    /// Zero both PID accumulators.
    pub fn reset_pid(&mut self) {
        match self {
            Behavior::GoToGoal(b) => b.pid_mut().reset(),
            Behavior::AvoidObstacles(b) => b.pid_mut().reset(),
            Behavior::Reverse(b) => b.pid_mut().reset(),
        }
    }

    /// Run one controller step.
    pub fn compute_steering(&mut self, config: &ControlConfig) -> Steering {
        match self {
            Behavior::GoToGoal(b) => b.compute_steering(config),
            Behavior::AvoidObstacles(b) => b.compute_steering(config),
            Behavior::Reverse(b) => b.compute_steering(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_slot() {
        let config = ControlConfig::default();
        for kind in BehaviorKind::ALL {
            let behavior = Behavior::new(kind, &config);
            assert_eq!(behavior.kind(), kind);
            assert_eq!(BehaviorKind::ALL[kind.index()], kind);
        }
    }

    #[test]
    fn test_load_then_reset() {
        let config = ControlConfig::default();
        let mut behavior = Behavior::new(BehaviorKind::AvoidObstacles, &config);
        behavior.load_pid(PidState::new(0.3, -1.2));
        assert_eq!(behavior.pid_state(), PidState::new(0.3, -1.2));
        behavior.reset_pid();
        assert_eq!(behavior.pid_state(), PidState::zero());
    }
}
