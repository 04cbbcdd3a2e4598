use fleetnav_kinematics::*;

fn main() {
    // Wheel geometry of the simulated robots, in pixels.
    let wheel_radius = 0.042;
    let wheel_base = 0.177;
    let drive = match DifferentialDrive::new(wheel_radius, wheel_base) {
        Ok(drive) => drive,
        Err(e) => {
            eprintln!("Failed to initialize kinematics: {}", e);
            return;
        }
    };

    let mut pose = Pose::new(0.0, 0.0, 0.0);
    let command = ChassisSpeeds::new(0.813, 0.5);
    let wheels = drive.inverse_kinematics(command);
    let dt = 0.03;

    println!("{}", drive);
    println!("  Command:      {}", command);
    println!("  Wheel speeds: {}", wheels);

    for i in 0..10 {
        match drive.update_pose_from_wheel_speeds(pose, wheels, dt) {
            Ok(next) => {
                pose = next;
                println!("Step {:>2}: Pose: {}", i + 1, pose);
            }
            Err(e) => {
                eprintln!("Error during simulation step {}: {}", i + 1, e);
                break;
            }
        }
    }

    // The local-frame view of the start point from the final pose.
    let local = pose.inverse().transform_point(Point::zero());
    println!("Start seen from robot: {}", local);
}
