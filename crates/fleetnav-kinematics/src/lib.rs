#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for 2D pose algebra and differential-drive robot kinematics."]
#![doc = ""]
#![doc = "This crate provides points and rigid poses, unicycle commands, and the"]
#![doc = "conversions between unicycle commands, wheel speeds, and odometry updates."]

use core::fmt;
use libm::{cos, sin};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod error;
pub mod geometry;

pub use error::KinematicsError;
pub use geometry::{Point, Pose};

/// Left and right wheel angular velocities.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelSpeeds {
    /// Left wheel angular velocity (rad/s).
    pub omega_l: f64,
    /// Right wheel angular velocity (rad/s).
    pub omega_r: f64,
}

impl WheelSpeeds {
    /// Construct wheel speeds.
    ///
    /// # Arguments
    ///
    /// * `omega_l`: Left wheel angular velocity (rad/s).
    /// * `omega_r`: Right wheel angular velocity (rad/s).
    pub const fn new(omega_l: f64, omega_r: f64) -> Self {
        WheelSpeeds { omega_l, omega_r }
    }
}

impl fmt::Display for WheelSpeeds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(ωL: {:.2} rad/s, ωR: {:.2} rad/s)", self.omega_l, self.omega_r)
    }
}

/// A unicycle command: linear and angular chassis velocities.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChassisSpeeds {
    /// Linear speed of the chassis center.
    pub v: f64,
    /// Angular speed of the chassis (rad/s).
    pub omega: f64,
}

impl ChassisSpeeds {
    /// Construct chassis speeds.
    ///
    /// # Arguments
    ///
    /// * `v`: Linear speed of the chassis center.
    /// * `omega`: Angular speed of the chassis (rad/s).
    pub const fn new(v: f64, omega: f64) -> Self {
        ChassisSpeeds { v, omega }
    }

    /// A command that keeps the robot still.
    pub const fn stop() -> Self {
        ChassisSpeeds { v: 0.0, omega: 0.0 }
    }
}

impl fmt::Display for ChassisSpeeds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(v: {:.2}, ω: {:.2} rad/s)", self.v, self.omega)
    }
}

/// Differential‑drive kinematics helper.
///
/// This struct encapsulates the physical parameters of a differential-drive robot
/// (wheel radius and wheel-base length) and converts between unicycle commands
/// and wheel speeds.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferentialDrive {
    /// Wheel radius.
    wheel_radius: f64,
    /// Distance between the two drive wheels.
    wheel_base: f64,
}

impl DifferentialDrive {
    /// Construct a new differential‑drive kinematics helper.
    ///
    /// # Arguments
    ///
    /// * `wheel_radius`: The radius of the robot's wheels.
    /// * `wheel_base`: The distance between the centers of the two drive wheels.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidWheelRadius)` if `wheel_radius` is not positive.
    /// Returns `Err(KinematicsError::InvalidWheelBase)` if `wheel_base` is not positive.
    pub const fn new(wheel_radius: f64, wheel_base: f64) -> Result<Self, KinematicsError> {
        if wheel_radius <= 0.0 {
            return Err(KinematicsError::InvalidWheelRadius("must be positive"));
        }
        if wheel_base <= 0.0 {
            return Err(KinematicsError::InvalidWheelBase("must be positive"));
        }
        Ok(DifferentialDrive {
            wheel_radius,
            wheel_base,
        })
    }

    /// Returns the wheel radius.
    pub fn wheel_radius(&self) -> f64 {
        self.wheel_radius
    }

    /// Returns the wheel-base length.
    pub fn wheel_base(&self) -> f64 {
        self.wheel_base
    }

    /// Calculates the unicycle command produced by the given wheel speeds.
    /// This is the forward kinematics problem.
    pub fn forward_kinematics(&self, wheel_speeds: WheelSpeeds) -> ChassisSpeeds {
        let v_l = wheel_speeds.omega_l * self.wheel_radius;
        let v_r = wheel_speeds.omega_r * self.wheel_radius;

        let v = (v_r + v_l) / 2.0;
        let omega = (v_r - v_l) / self.wheel_base;

        ChassisSpeeds::new(v, omega)
    }

    /// Converts a unicycle command into left and right wheel speeds.
    /// This is the inverse kinematics problem.
    ///
    /// `left = (2v - ωL) / 2r` and `right = (2v + ωL) / 2r`. No saturation is
    /// applied here; callers clamp `v` and `ω` beforehand.
    pub fn inverse_kinematics(&self, chassis_speeds: ChassisSpeeds) -> WheelSpeeds {
        let twice_v = 2.0 * chassis_speeds.v;
        let turn = chassis_speeds.omega * self.wheel_base;
        let denom = 2.0 * self.wheel_radius;

        WheelSpeeds::new((twice_v - turn) / denom, (twice_v + turn) / denom)
    }

    /// Updates the robot's pose given its current pose, chassis speeds, and time delta.
    ///
    /// This method performs odometry, integrating the chassis speeds over the time delta `dt`
    /// to estimate the new pose. It assumes constant chassis speeds over the interval `dt`.
    /// The final heading is normalized to `[-PI, PI)`.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::NegativeTimeDelta)` if `dt` is negative.
    pub fn update_pose(
        &self,
        current_pose: Pose,
        chassis_speeds: ChassisSpeeds,
        dt: f64,
    ) -> Result<Pose, KinematicsError> {
        if dt < 0.0 {
            return Err(KinematicsError::NegativeTimeDelta("must be non-negative"));
        }

        let delta = Point::new(
            chassis_speeds.v * cos(current_pose.theta) * dt,
            chassis_speeds.v * sin(current_pose.theta) * dt,
        );
        let delta_theta = chassis_speeds.omega * dt;

        Ok(Pose::from_position(
            current_pose.position + delta,
            Pose::normalize_angle(current_pose.theta + delta_theta),
        ))
    }

    /// Convenience function to update pose directly from wheel speeds and dt.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::NegativeTimeDelta)` if `dt` is negative (propagated from `update_pose`).
    pub fn update_pose_from_wheel_speeds(
        &self,
        current_pose: Pose,
        wheel_speeds: WheelSpeeds,
        dt: f64,
    ) -> Result<Pose, KinematicsError> {
        let chassis_speeds = self.forward_kinematics(wheel_speeds);
        self.update_pose(current_pose, chassis_speeds, dt)
    }
}

impl fmt::Display for DifferentialDrive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DifferentialDrive (r: {:.3}, L: {:.3})", self.wheel_radius, self.wheel_base)
    }
}
