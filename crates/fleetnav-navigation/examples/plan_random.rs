use fleetnav_kinematics::{Point, Pose};
use fleetnav_navigation::config::{MappingConfig, PlannerConfig};
use fleetnav_navigation::map::{RegionSamples, build_map};
use fleetnav_navigation::region::{Region, RegionGraph};
use fleetnav_navigation::planner::plan;
use rand::Rng;

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> [Point; 4] {
    [
        Point::new(x0, y0),
        Point::new(x1, y0),
        Point::new(x1, y1),
        Point::new(x0, y1),
    ]
}

fn main() {
    // Two 30x30 rooms side by side, joined at (30, 15).
    let left = Region::new(0, rect(0.0, 0.0, 30.0, 30.0)).with_entry_point(1, Point::new(30.0, 15.0));
    let right = Region::new(1, rect(30.0, 0.0, 60.0, 30.0)).with_entry_point(0, Point::new(30.0, 15.0));

    // Scatter random obstacle clusters, keeping clear of the start, door and goal.
    let mut rng = rand::rng();
    let keep_out = [Point::new(5.0, 5.0), Point::new(30.0, 15.0), Point::new(55.0, 25.0)];
    let mut samples: [Vec<Point>; 2] = [Vec::new(), Vec::new()];
    for _ in 0..12 {
        let center = Point::new(rng.random_range(0.0..60.0), rng.random_range(0.0..30.0));
        if keep_out.iter().any(|k| k.distance(center) < 8.0) {
            continue;
        }
        for _ in 0..6 {
            let p = center + Point::new(rng.random_range(-1.5..1.5), rng.random_range(-1.5..1.5));
            samples[usize::from(p.x >= 30.0)].push(p);
        }
    }

    let regions = [
        RegionSamples {
            region_id: 0,
            bounds: left.bounds(),
            samples: samples[0].clone(),
        },
        RegionSamples {
            region_id: 1,
            bounds: right.bounds(),
            samples: samples[1].clone(),
        },
    ];
    let layers = build_map(60, 30, &regions, &MappingConfig::default()).unwrap();
    println!("Opened map ({} occupied cells):", layers.opened.occupied_count());
    print!("{}", layers.opened);

    let graph = RegionGraph::from_regions(vec![left, right]).unwrap();
    let config = PlannerConfig {
        robot_radius_px: 1,
        clearance_px: 1,
        cost_buffer_px: 2,
        max_iterations: 20_000,
    };

    match plan(
        Pose::new(5.0, 5.0, 0.0),
        Point::new(55.0, 25.0),
        &graph,
        layers.planning_grid(),
        &config,
    ) {
        Ok(path) => {
            println!("\nRegion route: {:?}", path.regions);
            println!("Waypoints: {:?}", path.waypoints);
            println!(
                "{} points, {} expansions",
                path.points.len(),
                path.stats.expansions
            );
        }
        Err(e) => println!("\nPlanning failed: {}", e),
    }
}
