use fleetnav_kinematics::{DifferentialDrive, Point, Pose};
use fleetnav_navigation::{
    BehaviorKind, ControlConfig, PidState, RobotSnapshot, RobotStatus, compute_decisions,
    compute_single_decision,
};

fn drive() -> DifferentialDrive {
    DifferentialDrive::new(0.042, 0.177).unwrap()
}

#[test]
fn closed_loop_go_to_goal_reaches_target() {
    let config = ControlConfig::default();
    let drive = drive();
    let goal = Point::new(3.0, 2.0);

    let mut pose = Pose::new(0.0, 0.0, 0.0);
    let mut previous = None;
    let mut pid = PidState::zero();
    let mut closest = f64::INFINITY;

    for _ in 0..1_000 {
        let snapshot = RobotSnapshot::new(1, pose)
            .with_goal(goal)
            .with_previous(previous, pid);
        let decision = compute_single_decision(snapshot, &config, drive);
        assert_eq!(decision.behavior, Some(BehaviorKind::GoToGoal));

        pose = drive
            .update_pose_from_wheel_speeds(pose, decision.wheel_speeds, config.dt)
            .unwrap();
        previous = decision.behavior;
        pid = decision.pid_state;
        closest = closest.min(pose.position.distance(goal));
    }

    assert!(closest < 0.2, "closest approach {closest}");
}

#[test]
fn batch_mixes_behaviors_per_robot() {
    let config = ControlConfig::default();
    let robots = vec![
        RobotSnapshot::new(10, Pose::default()).with_status(RobotStatus::Collision),
        RobotSnapshot::new(11, Pose::default())
            .with_goal(Point::new(5.0, 0.0))
            .with_readings(vec![Point::new(2.0, 0.5)], vec![10.0]),
        RobotSnapshot::new(12, Pose::new(1.0, 1.0, 0.0))
            .with_status(RobotStatus::Mapping)
            .with_mapping_goals(vec![Point::new(1.0, 5.0)]),
        RobotSnapshot::new(13, Pose::default()),
    ];

    let decisions = compute_decisions(&robots, &config, drive());
    let tags: Vec<_> = decisions.iter().map(|d| (d.robot_id, d.behavior)).collect();
    assert_eq!(
        tags,
        vec![
            (10, Some(BehaviorKind::Reverse)),
            (11, Some(BehaviorKind::AvoidObstacles)),
            (12, Some(BehaviorKind::GoToGoal)),
            (13, None),
        ]
    );

    // Mapping goal straight to the left of the robot: turn left.
    assert!(decisions[2].command.omega > 0.0);
    assert!(decisions[2].wheel_speeds.omega_r > decisions[2].wheel_speeds.omega_l);
}

#[test]
fn avoidance_steers_away_from_obstacle() {
    let config = ControlConfig::default();
    // Obstacle ahead and slightly to the left; the negative front weight
    // flips it into a heading pointing back and to the right.
    let snapshot = RobotSnapshot::new(20, Pose::default())
        .with_readings(vec![Point::new(1.0, 0.2)], vec![5.0]);
    let decision = compute_single_decision(snapshot, &config, drive());
    assert_eq!(decision.behavior, Some(BehaviorKind::AvoidObstacles));
    assert!(decision.command.omega < 0.0);
}
