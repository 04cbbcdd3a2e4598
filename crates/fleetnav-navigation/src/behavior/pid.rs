//! Heading PID and the shared velocity shaping.

use fleetnav_kinematics::ChassisSpeeds;

use crate::config::{ControlConfig, PidGains};
use crate::snapshot::PidState;

/// PID controller over a heading error.
///
/// All memory lives in a [`PidState`] so the caller can persist it between
/// ticks and hand it back.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingPid {
    gains: PidGains,
    state: PidState,
}

impl HeadingPid {
    /// A controller with zeroed memory.
    pub fn new(gains: PidGains) -> Self {
        HeadingPid {
            gains,
            state: PidState::zero(),
        }
    }

    /// Current memory.
    pub fn state(&self) -> PidState {
        self.state
    }

    /// Replace the memory with a carried-forward state.
    pub fn load(&mut self, state: PidState) {
        self.state = state;
    }

    /// Zero both accumulators.
    pub fn reset(&mut self) {
        self.state = PidState::zero();
    }

    /// Advance one tick with error `error` and return the angular velocity.
    ///
    /// With a non-positive `dt` the derivative term is dropped.
    pub fn step(&mut self, error: f64, dt: f64) -> f64 {
        let integral = self.state.prev_integral + error * dt;
        let derivative = if dt > 0.0 {
            (error - self.state.prev_error) / dt
        } else {
            0.0
        };
        self.state = PidState::new(error, integral);

        self.gains.kp * error + self.gains.ki * integral + self.gains.kd * derivative
    }
}

/// Linear speed that decays as the turn gets sharper: `V_MAX / sqrt(|w| + 1)`.
pub fn soft_linear_velocity(max_linear: f64, omega: f64) -> f64 {
    max_linear / (omega.abs() + 1.0).sqrt()
}

/// Shape an angular velocity into a saturated unicycle command.
///
/// The linear speed is derived from the unsaturated `omega`; both are then
/// clamped symmetrically.
pub fn shape_command(config: &ControlConfig, omega: f64) -> ChassisSpeeds {
    let v = soft_linear_velocity(config.max_linear_velocity, omega);
    ChassisSpeeds::new(
        v.clamp(-config.max_linear_velocity, config.max_linear_velocity),
        omega.clamp(-config.max_angular_velocity, config.max_angular_velocity),
    )
}
