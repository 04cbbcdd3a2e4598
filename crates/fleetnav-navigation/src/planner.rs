//! Hierarchical path planning.
//!
//! A breadth-first search over the [`RegionGraph`] picks the sequence of
//! regions to cross; each crossing contributes the declared entry point as a
//! waypoint, and [`WindowedAStar`] connects consecutive waypoints on the grid.
//! Start or goal outside every region, or regions with no route between them,
//! degrade to a single direct leg.

use fleetnav_kinematics::{Point, Pose};
use tracing::debug;

use crate::astar::{SearchStats, WindowedAStar};
use crate::config::PlannerConfig;
use crate::error::PlanningError;
use crate::map::{GridPoint, OccupancyGrid};
use crate::region::RegionGraph;

/// A stitched route from the start pose to the goal.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedPath {
    /// Route points: the exact start, the grid cells between, the exact goal.
    pub points: Vec<Point>,
    /// Region route used; empty for a single-region or direct plan.
    pub regions: Vec<usize>,
    /// Start, entry points, goal.
    pub waypoints: Vec<Point>,
    /// Counters summed over every leg.
    pub stats: SearchStats,
}

fn to_cell(grid: &OccupancyGrid, p: Point) -> Result<GridPoint, PlanningError> {
    GridPoint::from_point(p)
        .filter(|cell| grid.contains(*cell))
        .ok_or(PlanningError::OutOfBounds { x: p.x, y: p.y })
}

/// Entry point on `from` toward `to`, else the one on `to` back toward `from`.
fn crossing(graph: &RegionGraph, from: usize, to: usize) -> Result<Point, PlanningError> {
    graph
        .region(from)
        .and_then(|r| r.entry_point_to(to))
        .or_else(|| graph.region(to).and_then(|r| r.entry_point_to(from)))
        .ok_or(PlanningError::MissingEntryPoint { from, to })
}

/// Region route between the regions containing `start` and `goal`.
fn macro_route(graph: &RegionGraph, start: Point, goal: Point) -> Vec<usize> {
    let (Some(from), Some(to)) = (graph.region_of(start), graph.region_of(goal)) else {
        debug!("Start or goal outside every region, planning a direct leg");
        return Vec::new();
    };
    graph.bfs(from, to).unwrap_or_else(|| {
        debug!(from, to, "No region route, planning a direct leg");
        Vec::new()
    })
}

/// Replace the snapped end cells with the exact start and goal.
fn pin_endpoints(points: &mut Vec<Point>, start: Point, goal: Point) {
    let Some(first) = points.first_mut() else {
        return;
    };
    *first = start;
    if points.len() == 1 {
        if start != goal {
            points.push(goal);
        }
    } else if let Some(last) = points.last_mut() {
        *last = goal;
    }
}

/// Plan from `start` to `goal`.
///
/// The goal is checked against the validity window before anything else, so
/// [`PlanningError::InvalidGoal`] is never preceded by a search. Any failing
/// leg fails the whole plan.
pub fn plan(
    start: Pose,
    goal: Point,
    graph: &RegionGraph,
    grid: &OccupancyGrid,
    config: &PlannerConfig,
) -> Result<PlannedPath, PlanningError> {
    let astar = WindowedAStar::new(grid, config);
    let goal_cell = to_cell(grid, goal)?;
    astar.validate_goal(goal_cell)?;

    let regions = macro_route(graph, start.position, goal);
    let mut waypoints = Vec::with_capacity(regions.len() + 1);
    waypoints.push(start.position);
    for pair in regions.windows(2) {
        waypoints.push(crossing(graph, pair[0], pair[1])?);
    }
    waypoints.push(goal);

    let mut cells: Vec<GridPoint> = Vec::new();
    let mut stats = SearchStats::default();
    for (leg, pair) in waypoints.windows(2).enumerate() {
        let from = to_cell(grid, pair[0])?;
        let to = to_cell(grid, pair[1])?;
        let result = astar.search(from, to)?;
        debug!(
            leg,
            from = ?from,
            to = ?to,
            length = result.points.len(),
            expansions = result.stats.expansions,
            "Leg planned"
        );
        stats.expansions += result.stats.expansions;
        stats.nodes_generated += result.stats.nodes_generated;

        let skip = usize::from(cells.last() == result.points.first());
        cells.extend(result.points.into_iter().skip(skip));
    }

    let mut points: Vec<Point> = cells.into_iter().map(GridPoint::to_point).collect();
    pin_endpoints(&mut points, start.position, goal);

    Ok(PlannedPath {
        points,
        regions,
        waypoints,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Region;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> [Point; 4] {
        [
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ]
    }

    fn small_config() -> PlannerConfig {
        PlannerConfig {
            robot_radius_px: 1,
            clearance_px: 0,
            cost_buffer_px: 1,
            max_iterations: 5_000,
        }
    }

    fn two_rooms() -> RegionGraph {
        let r0 = Region::new(0, rect(0.0, 0.0, 20.0, 20.0)).with_entry_point(1, Point::new(20.0, 10.0));
        let r1 = Region::new(1, rect(20.0, 0.0, 40.0, 20.0));
        RegionGraph::from_regions(vec![r0, r1]).unwrap()
    }

    #[test]
    fn test_crossing_falls_back_to_reverse_entry() {
        let graph = two_rooms();
        assert_eq!(crossing(&graph, 0, 1), Ok(Point::new(20.0, 10.0)));
        assert_eq!(crossing(&graph, 1, 0), Ok(Point::new(20.0, 10.0)));

        let bare = RegionGraph::from_regions(vec![
            Region::new(0, rect(0.0, 0.0, 1.0, 1.0)),
            Region::new(1, rect(1.0, 0.0, 2.0, 1.0)),
        ])
        .unwrap();
        assert_eq!(
            crossing(&bare, 0, 1),
            Err(PlanningError::MissingEntryPoint { from: 0, to: 1 })
        );
    }

    #[test]
    fn test_plan_through_entry_point() {
        let graph = two_rooms();
        let grid = OccupancyGrid::for_environment(40, 20).unwrap();
        let config = small_config();

        let path = plan(
            Pose::new(5.0, 5.0, 0.0),
            Point::new(35.0, 15.0),
            &graph,
            &grid,
            &config,
        )
        .unwrap();
        assert_eq!(path.regions, vec![0, 1]);
        assert_eq!(path.waypoints.len(), 3);
        assert_eq!(path.points.first(), Some(&Point::new(5.0, 5.0)));
        assert_eq!(path.points.last(), Some(&Point::new(35.0, 15.0)));
        assert!(path.points.contains(&Point::new(20.0, 10.0)));
        // No duplicated junction.
        assert!(path.points.windows(2).all(|w| w[0] != w[1]));
    }

    #[test]
    fn test_fractional_endpoints_are_kept() {
        let graph = two_rooms();
        let grid = OccupancyGrid::for_environment(40, 20).unwrap();
        let start = Pose::new(5.3, 4.8, 0.0);
        let goal = Point::new(35.4, 15.2);

        let path = plan(start, goal, &graph, &grid, &small_config()).unwrap();
        assert_eq!(path.points.first(), Some(&start.position));
        assert_eq!(path.points.last(), Some(&goal));
        // Interior points stay on grid cells.
        assert!(path.points[1..path.points.len() - 1]
            .iter()
            .all(|p| p.x.fract() == 0.0 && p.y.fract() == 0.0));
        assert!(path.points.contains(&Point::new(20.0, 10.0)));
    }

    #[test]
    fn test_same_cell_keeps_both_endpoints() {
        let graph = two_rooms();
        let grid = OccupancyGrid::for_environment(40, 20).unwrap();
        let path = plan(
            Pose::new(5.1, 5.1, 0.0),
            Point::new(4.9, 4.9),
            &graph,
            &grid,
            &small_config(),
        )
        .unwrap();
        assert_eq!(path.points, vec![Point::new(5.1, 5.1), Point::new(4.9, 4.9)]);
    }

    #[test]
    fn test_disconnected_regions_go_direct() {
        let r0 = Region::new(0, rect(0.0, 0.0, 20.0, 20.0));
        let r1 = Region::new(1, rect(20.0, 0.0, 40.0, 20.0));
        let graph = RegionGraph::from_regions(vec![r0, r1]).unwrap();
        assert_eq!(graph.bfs(0, 1), None);

        let grid = OccupancyGrid::for_environment(40, 20).unwrap();
        let goal = Point::new(35.0, 15.0);
        let path = plan(Pose::new(5.0, 5.0, 0.0), goal, &graph, &grid, &small_config()).unwrap();
        assert!(path.regions.is_empty());
        assert_eq!(path.waypoints, vec![Point::new(5.0, 5.0), goal]);
        assert_eq!(path.points.last(), Some(&goal));
    }

    #[test]
    fn test_invalid_goal_fails_before_search() {
        let graph = two_rooms();
        let mut grid = OccupancyGrid::for_environment(40, 20).unwrap();
        grid.mark_occupied(GridPoint::new(30, 10)).unwrap();
        let config = PlannerConfig {
            max_iterations: 0,
            ..small_config()
        };
        let err = plan(Pose::new(5.0, 5.0, 0.0), Point::new(31.0, 11.0), &graph, &grid, &config)
            .unwrap_err();
        assert_eq!(err, PlanningError::InvalidGoal { x: 31, y: 11 });
        assert!(!err.is_exhaustion());
    }

    #[test]
    fn test_outside_regions_goes_direct() {
        let graph = two_rooms();
        let grid = OccupancyGrid::for_environment(40, 30).unwrap();
        let path = plan(
            Pose::new(5.0, 5.0, 0.0),
            Point::new(10.0, 28.0),
            &graph,
            &grid,
            &small_config(),
        )
        .unwrap();
        assert!(path.regions.is_empty());
        assert_eq!(path.waypoints, vec![Point::new(5.0, 5.0), Point::new(10.0, 28.0)]);
        assert_eq!(path.points.last(), Some(&Point::new(10.0, 28.0)));
    }

    #[test]
    fn test_goal_off_grid() {
        let graph = two_rooms();
        let grid = OccupancyGrid::for_environment(40, 20).unwrap();
        assert!(matches!(
            plan(Pose::default(), Point::new(50.0, 5.0), &graph, &grid, &small_config()),
            Err(PlanningError::OutOfBounds { .. })
        ));
    }
}
