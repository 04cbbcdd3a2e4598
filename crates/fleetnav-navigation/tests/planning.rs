use fleetnav_kinematics::{Point, Pose};
use fleetnav_navigation::config::{MappingConfig, PlannerConfig};
use fleetnav_navigation::map::{GridPoint, OCCUPIED, RegionSamples, build_map};
use fleetnav_navigation::{PlanningError, Region, RegionGraph, plan};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> [Point; 4] {
    [
        Point::new(x0, y0),
        Point::new(x1, y0),
        Point::new(x1, y1),
        Point::new(x0, y1),
    ]
}

fn config() -> PlannerConfig {
    PlannerConfig {
        robot_radius_px: 1,
        clearance_px: 1,
        cost_buffer_px: 1,
        max_iterations: 10_000,
    }
}

/// Two rooms split by a wall at x = 25 with a doorway around y = 20.
fn walled_rooms() -> (RegionGraph, Vec<RegionSamples>) {
    let left = Region::from_parallel_lists(0, rect(0.0, 0.0, 25.0, 40.0), &[Point::new(25.0, 20.0)], &[1])
        .unwrap();
    let right = Region::from_parallel_lists(1, rect(25.0, 0.0, 50.0, 40.0), &[Point::new(25.0, 20.0)], &[0])
        .unwrap();

    let wall: Vec<Point> = (0..=40)
        .filter(|y| !(14..=26).contains(y))
        .map(|y| Point::new(25.0, y as f64))
        .collect();
    let samples = vec![
        RegionSamples {
            region_id: 0,
            bounds: left.bounds(),
            samples: wall.clone(),
        },
        RegionSamples {
            region_id: 1,
            bounds: right.bounds(),
            samples: Vec::new(),
        },
    ];
    (RegionGraph::from_regions(vec![left, right]).unwrap(), samples)
}

#[test]
fn plan_crosses_doorway_between_connected_regions() {
    init_tracing();
    let (graph, samples) = walled_rooms();
    let layers = build_map(50, 40, &samples, &MappingConfig::default()).unwrap();
    assert_eq!(layers.planning_grid().get(GridPoint::new(25, 5)), Some(OCCUPIED));

    let start = Pose::new(5.0, 5.0, 0.3);
    let goal = Point::new(45.0, 35.0);
    let path = plan(start, goal, &graph, layers.planning_grid(), &config()).unwrap();

    assert_eq!(path.regions, vec![0, 1]);
    assert_eq!(path.points.first(), Some(&start.position));
    assert_eq!(path.points.last(), Some(&goal));
    assert!(path.points.contains(&Point::new(25.0, 20.0)));
    for pair in path.points.windows(2) {
        let step = pair[1] - pair[0];
        assert!(step.x.abs() <= 1.0 && step.y.abs() <= 1.0);
        assert_ne!(pair[0], pair[1]);
    }
}

#[test]
fn same_region_plans_single_leg() {
    init_tracing();
    let (graph, samples) = walled_rooms();
    let layers = build_map(50, 40, &samples, &MappingConfig::default()).unwrap();

    let path = plan(
        Pose::new(5.0, 5.0, 0.0),
        Point::new(15.0, 30.0),
        &graph,
        layers.planning_grid(),
        &config(),
    )
    .unwrap();
    assert!(path.regions.is_empty());
    assert_eq!(path.waypoints.len(), 2);
    assert_eq!(path.points.last(), Some(&Point::new(15.0, 30.0)));
}

#[test]
fn goal_inside_wall_is_rejected() {
    init_tracing();
    let (graph, samples) = walled_rooms();
    let layers = build_map(50, 40, &samples, &MappingConfig::default()).unwrap();

    let err = plan(
        Pose::new(5.0, 5.0, 0.0),
        Point::new(26.0, 5.0),
        &graph,
        layers.planning_grid(),
        &config(),
    )
    .unwrap_err();
    assert!(matches!(err, PlanningError::InvalidGoal { x: 26, y: 5 }));
}

#[test]
fn closed_doorway_exhausts_search() {
    init_tracing();
    let (graph, mut samples) = walled_rooms();
    samples[0].samples = (0..=40).map(|y| Point::new(25.0, y as f64)).collect();
    let layers = build_map(50, 40, &samples, &MappingConfig::default()).unwrap();

    let err = plan(
        Pose::new(5.0, 5.0, 0.0),
        Point::new(45.0, 35.0),
        &graph,
        layers.planning_grid(),
        &config(),
    )
    .unwrap_err();
    assert!(err.is_exhaustion());
}
