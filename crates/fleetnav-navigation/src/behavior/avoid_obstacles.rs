use fleetnav_kinematics::{Point, Pose};

use super::Steering;
use super::pid::{HeadingPid, shape_command};
use crate::config::ControlConfig;

/// Steers along the weighted sum of local-frame sensor hits.
///
/// Negative weights turn a hit into a push away from it.
#[derive(Debug, Clone, PartialEq)]
pub struct AvoidObstacles {
    pid: HeadingPid,
    heading: Point,
}

impl AvoidObstacles {
    /// A controller with a zero heading vector.
    pub fn new(config: &ControlConfig) -> Self {
        AvoidObstacles {
            pid: HeadingPid::new(config.avoid_obstacles),
            heading: Point::zero(),
        }
    }

    /// Recompute the heading from world-frame `readings`.
    pub fn update_readings(&mut self, pose: &Pose, readings: &[Point], config: &ControlConfig) {
        let to_local = pose.inverse();
        self.heading = readings
            .iter()
            .enumerate()
            .fold(Point::zero(), |acc, (index, reading)| {
                acc + to_local.transform_point(*reading) * config.sensor_weight(index)
            });
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

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::PI;

    #[test]
    fn test_weighted_heading_in_local_frame() {
        let config = ControlConfig {
            sensor_weights: vec![-1.0, 0.5],
            ..Default::default()
        };
        let mut avoid = AvoidObstacles::new(&config);
        // Facing +y; a hit 2 ahead is local (2, 0), a hit 4 to the right is local (0, -4).
        let pose = Pose::new(10.0, 10.0, PI / 2.0);
        let readings = [Point::new(10.0, 12.0), Point::new(14.0, 10.0)];
        avoid.update_readings(&pose, &readings, &config);

        let heading = avoid.heading();
        assert!((heading.x - (-2.0)).abs() < 1e-6);
        assert!((heading.y - (-2.0)).abs() < 1e-6);
    }

    #[test]
    fn test_obstacle_ahead_turns_away() {
        let config = ControlConfig {
            sensor_weights: vec![-1.0, -1.0],
            ..Default::default()
        };
        let mut avoid = AvoidObstacles::new(&config);
        // Hits ahead and slightly to the right: the push points back and left.
        let readings = [Point::new(3.0, -0.5), Point::new(3.0, -1.0)];
        avoid.update_readings(&Pose::default(), &readings, &config);

        let steering = avoid.compute_steering(&config);
        assert!(steering.command.omega > 0.0);
        assert!(steering.pid.prev_error > PI / 2.0);
    }

    #[test]
    fn test_unweighted_readings_default_to_one() {
        let config = ControlConfig {
            sensor_weights: Vec::new(),
            ..Default::default()
        };
        let mut avoid = AvoidObstacles::new(&config);
        avoid.update_readings(&Pose::default(), &[Point::new(1.0, 2.0)], &config);
        assert_eq!(avoid.heading(), Point::new(1.0, 2.0));
    }
}
