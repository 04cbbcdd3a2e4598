//! Planar point and rigid-pose algebra.
//!
//! Every operation is pure and returns a new value. Angles are radians,
//! measured counter-clockwise from the x-axis.

use core::f64::consts::PI;
use core::fmt;
use core::ops::{Add, Mul, Neg, Sub};
use libm::{atan2, cos, sin, sqrt};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A 2-D point or free vector.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// x component.
    pub x: f64,
    /// y component.
    pub y: f64,
}

impl Point {
    /// Construct a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// The origin `(0, 0)`.
    pub const fn zero() -> Self {
        Point { x: 0.0, y: 0.0 }
    }

    /// Scale both components by `factor`.
    pub fn scale(self, factor: f64) -> Self {
        Point::new(self.x * factor, self.y * factor)
    }

    /// Euclidean length of the vector.
    pub fn norm(self) -> f64 {
        sqrt(self.x * self.x + self.y * self.y)
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Point) -> f64 {
        (self - other).norm()
    }

    /// Direction of the vector, `atan2(y, x)`.
    pub fn angle(self) -> f64 {
        atan2(self.y, self.x)
    }

    /// Rotate the vector by `theta` radians with the standard rotation matrix.
    pub fn rotate(self, theta: f64) -> Self {
        let (s, c) = (sin(theta), cos(theta));
        Point::new(self.x * c - self.y * s, self.x * s + self.y * c)
    }

    /// Rotate by `theta`, then translate by `origin`.
    ///
    /// Passing the fields of a pose expresses a local point in the world frame;
    /// passing the fields of the pose's [`Pose::inverse`] goes the other way.
    pub fn rotate_and_translate(self, origin: Point, theta: f64) -> Self {
        self.rotate(theta) + origin
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        self.scale(rhs)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// A 2-D rigid pose: position plus heading.
///
/// A pose maps points from its local frame into the world frame.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// World-frame position.
    pub position: Point,
    /// Heading (rad).
    pub theta: f64,
}

impl Pose {
    /// Construct a new pose.
    ///
    /// # Arguments
    ///
    /// * `x`: World-frame x position.
    /// * `y`: World-frame y position.
    /// * `theta`: Heading in radians.
    pub const fn new(x: f64, y: f64, theta: f64) -> Self {
        Pose {
            position: Point::new(x, y),
            theta,
        }
    }

    /// Construct a pose from an existing position.
    pub const fn from_position(position: Point, theta: f64) -> Self {
        Pose { position, theta }
    }

    /// The rigid-transform inverse.
    ///
    /// The translation is negated *and* rotated by the negated heading, so
    /// `pose.inverse().transform_point(w)` expresses the world point `w` in
    /// this pose's local frame.
    pub fn inverse(&self) -> Self {
        Pose {
            position: (-self.position).rotate(-self.theta),
            theta: -self.theta,
        }
    }

    /// Map a point from this pose's local frame into the world frame.
    pub fn transform_point(&self, local: Point) -> Point {
        local.rotate_and_translate(self.position, self.theta)
    }

    /// Normalize an angle to be within `[-PI, PI)`.
    ///
    /// Angles at `PI` will be normalized to `-PI`.
    pub fn normalize_angle(angle: f64) -> f64 {
        let a = angle % (2.0 * PI);
        if a >= PI {
            a - 2.0 * PI
        } else if a < -PI {
            a + 2.0 * PI
        } else {
            a
        }
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(x: {:.2}, y: {:.2}, θ: {:.2} rad)",
            self.position.x, self.position.y, self.theta
        )
    }
}
