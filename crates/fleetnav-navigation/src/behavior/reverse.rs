use fleetnav_kinematics::ChassisSpeeds;

use super::Steering;
use super::pid::{HeadingPid, shape_command};
use crate::config::{ControlConfig, PidGains};

/// Backs straight away from a collision.
///
/// The PID memory exists so every behavior shares one interface; no error
/// signal ever drives it, so its state stays zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Reverse {
    pid: HeadingPid,
}

impl Reverse {
    /// A reversing controller.
    pub fn new() -> Self {
        Reverse {
            pid: HeadingPid::new(PidGains::new(0.0, 0.0, 0.0)),
        }
    }

    pub(crate) fn pid_mut(&mut self) -> &mut HeadingPid {
        &mut self.pid
    }

    pub(crate) fn pid(&self) -> &HeadingPid {
        &self.pid
    }

    /// Full saturated speed, negated and boosted, with no rotation.
    pub fn compute_steering(&mut self, config: &ControlConfig) -> Steering {
        let forward = shape_command(config, 0.0);
        self.pid.reset();
        Steering {
            command: ChassisSpeeds::new(-forward.v * config.reverse_boost, 0.0),
            pid: self.pid.state(),
        }
    }
}

impl Default for Reverse {
    fn default() -> Self {
        Reverse::new()
    }
}
