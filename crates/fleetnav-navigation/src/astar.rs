/*

Windowed A* over an occupancy grid.

f(n) = cost(n) + h(n)

Where:
    n = a grid cell
    cost(n) = mean inverted pixel value in a window around n, so cells far
              from obstacles are cheaper than cells grazing them
    h(n) = euclidean distance from n to the goal

A cell is only ever generated if the robot's footprint plus clearance,
centered on it, touches no occupied pixel.

Loop:
    - pop node with lowest f(n) (oldest first on ties)
    - if n is the goal, return path
    - stop if the expansion cap is reached
    - for each of the 8 neighbors of n:
        - skip if off the grid, not window-valid, or already seen
        - record n as parent, push with f(neighbor)

*/

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use tracing::{debug, trace};

use crate::config::PlannerConfig;
use crate::error::PlanningError;
use crate::map::{FREE, GridPoint, OccupancyGrid};

/// 8-connected moves, in expansion order.
const ACTIONS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
];

/// Counters from one search.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes popped and expanded.
    pub expansions: usize,
    /// Nodes pushed onto the frontier, start included.
    pub nodes_generated: usize,
}

/// A successful search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Cells from start to goal, both included.
    pub points: Vec<GridPoint>,
    /// Search counters.
    pub stats: SearchStats,
}

struct Node {
    point: GridPoint,
    parent: Option<usize>,
}

#[derive(Copy, Clone, PartialEq)]
struct State {
    cost: f64,
    seq: usize,
}

impl Eq for State {}

// The priority queue depends on `Ord`.
// Flip both comparisons so the heap pops the lowest cost first and,
// among equal costs, the node that was pushed first.
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* bound to one grid and one footprint configuration.
pub struct WindowedAStar<'a> {
    grid: &'a OccupancyGrid,
    config: &'a PlannerConfig,
}

impl<'a> WindowedAStar<'a> {
    /// Searcher over `grid`.
    pub fn new(grid: &'a OccupancyGrid, config: &'a PlannerConfig) -> Self {
        WindowedAStar { grid, config }
    }

    /// Calls `f` with every in-grid pixel of the square window of half-size
    /// `half` centered on `p`.
    fn window(&self, p: GridPoint, half: usize, mut f: impl FnMut(u8)) {
        let x0 = p.x.saturating_sub(half);
        let y0 = p.y.saturating_sub(half);
        let x1 = p.x.saturating_add(half).min(self.grid.cols() - 1);
        let y1 = p.y.saturating_add(half).min(self.grid.rows() - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                if let Some(v) = self.grid.get(GridPoint::new(x, y)) {
                    f(v);
                }
            }
        }
    }

    /// True if `p` is on the grid and its validity window holds no
    /// obstacle. Window pixels beyond the grid edge count as free.
    pub fn is_point_valid(&self, p: GridPoint) -> bool {
        if !self.grid.contains(p) {
            return false;
        }
        let mut blocked = false;
        self.window(p, self.config.validity_half_window(), |pixel| {
            blocked |= (!pixel) & FREE != 0;
        });
        !blocked
    }

    /// Mean inverted pixel value over the cost window around `p`:
    /// `0.0` in open space, up to `255.0` when surrounded.
    pub fn path_cost(&self, p: GridPoint) -> f64 {
        let mut sum = 0u64;
        let mut count = 0u64;
        self.window(p, self.config.cost_half_window(), |pixel| {
            sum += u64::from(!pixel);
            count += 1;
        });
        if count == 0 {
            return 0.0;
        }
        sum as f64 / count as f64
    }

    /// Fails with [`PlanningError::InvalidGoal`] if `goal` cannot host the robot.
    pub fn validate_goal(&self, goal: GridPoint) -> Result<(), PlanningError> {
        if self.is_point_valid(goal) {
            Ok(())
        } else {
            Err(PlanningError::InvalidGoal {
                x: goal.x,
                y: goal.y,
            })
        }
    }

    /// Search from `start` to `goal`.
    ///
    /// The start cell is accepted as is; the goal is only reached if it is
    /// window-valid. At most `max_iterations` nodes are expanded.
    pub fn search(&self, start: GridPoint, goal: GridPoint) -> Result<SearchResult, PlanningError> {
        for p in [start, goal] {
            if !self.grid.contains(p) {
                return Err(PlanningError::OutOfBounds {
                    x: p.x as f64,
                    y: p.y as f64,
                });
            }
        }

        let mut arena = vec![Node {
            point: start,
            parent: None,
        }];
        let mut seen = HashSet::from([start]);
        let mut frontier = BinaryHeap::from([State {
            cost: start.distance(goal),
            seq: 0,
        }]);
        let mut stats = SearchStats {
            expansions: 0,
            nodes_generated: 1,
        };

        while let Some(State { seq: current, .. }) = frontier.pop() {
            let point = arena[current].point;
            if point == goal {
                let points = Self::reconstruct_path(&arena, current);
                debug!(
                    expansions = stats.expansions,
                    nodes_generated = stats.nodes_generated,
                    length = points.len(),
                    "A* reached goal"
                );
                return Ok(SearchResult { points, stats });
            }
            if stats.expansions >= self.config.max_iterations {
                debug!(iterations = stats.expansions, "A* hit iteration cap");
                return Err(PlanningError::IterationLimit {
                    iterations: stats.expansions,
                });
            }
            stats.expansions += 1;
            trace!(x = point.x, y = point.y, "Expanding");

            for (dx, dy) in ACTIONS {
                let Some(next) = point.offset(dx, dy) else {
                    continue;
                };
                if seen.contains(&next) || !self.is_point_valid(next) {
                    continue;
                }
                seen.insert(next);
                arena.push(Node {
                    point: next,
                    parent: Some(current),
                });
                frontier.push(State {
                    cost: self.path_cost(next) + next.distance(goal),
                    seq: arena.len() - 1,
                });
                stats.nodes_generated += 1;
            }
        }

        debug!(expanded = stats.expansions, "A* frontier exhausted");
        Err(PlanningError::Unreachable {
            expanded: stats.expansions,
        })
    }

    fn reconstruct_path(arena: &[Node], mut current: usize) -> Vec<GridPoint> {
        let mut path = vec![arena[current].point];
        while let Some(parent) = arena[current].parent {
            path.push(arena[parent].point);
            current = parent;
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::OCCUPIED;

    const EPSILON: f64 = 1e-9;

    fn point_footprint() -> PlannerConfig {
        PlannerConfig {
            robot_radius_px: 0,
            clearance_px: 0,
            cost_buffer_px: 0,
            max_iterations: 20_000,
        }
    }

    /// Occupied square ring at Chebyshev distance `r` around `c`.
    fn ring(grid: &mut OccupancyGrid, c: GridPoint, r: usize) {
        for i in 0..=2 * r {
            for (x, y) in [
                (c.x - r + i, c.y - r),
                (c.x - r + i, c.y + r),
                (c.x - r, c.y - r + i),
                (c.x + r, c.y - r + i),
            ] {
                grid.mark_occupied(GridPoint::new(x, y)).unwrap();
            }
        }
    }

    #[test]
    fn test_astar_empty_grid_diagonal() {
        let grid = OccupancyGrid::new(10, 10).unwrap();
        let config = PlannerConfig::default();
        let astar = WindowedAStar::new(&grid, &config);

        let result = astar.search(GridPoint::new(0, 0), GridPoint::new(3, 3)).unwrap();
        assert_eq!(
            result.points,
            vec![
                GridPoint::new(0, 0),
                GridPoint::new(1, 1),
                GridPoint::new(2, 2),
                GridPoint::new(3, 3),
            ]
        );
        assert_eq!(result.stats.expansions, 3);
        for pair in result.points.windows(2) {
            assert_eq!(pair[1].x - pair[0].x, 1);
            assert_eq!(pair[1].y - pair[0].y, 1);
            assert!(astar.is_point_valid(pair[1]));
        }
    }

    #[test]
    fn test_astar_start_is_goal() {
        let grid = OccupancyGrid::new(5, 5).unwrap();
        let config = PlannerConfig {
            max_iterations: 0,
            ..point_footprint()
        };
        let astar = WindowedAStar::new(&grid, &config);
        let result = astar.search(GridPoint::new(2, 2), GridPoint::new(2, 2)).unwrap();
        assert_eq!(result.points, vec![GridPoint::new(2, 2)]);
        assert_eq!(result.stats.expansions, 0);
    }

    #[test]
    fn test_astar_enclosed_goal_fails() {
        let mut grid = OccupancyGrid::new(20, 20).unwrap();
        let goal = GridPoint::new(10, 10);
        ring(&mut grid, goal, 2);
        let start = GridPoint::new(0, 0);

        let config = point_footprint();
        let astar = WindowedAStar::new(&grid, &config);
        assert!(astar.validate_goal(goal).is_ok());
        let err = astar.search(start, goal).unwrap_err();
        // Outside the ring: 400 cells, minus 16 ring cells, minus 9 inside.
        assert_eq!(err, PlanningError::Unreachable { expanded: 375 });
        assert!(err.is_exhaustion());

        let capped = PlannerConfig {
            max_iterations: 50,
            ..point_footprint()
        };
        let astar = WindowedAStar::new(&grid, &capped);
        assert_eq!(
            astar.search(start, goal).unwrap_err(),
            PlanningError::IterationLimit { iterations: 50 }
        );
    }

    #[test]
    fn test_validity_window() {
        let mut grid = OccupancyGrid::new(30, 30).unwrap();
        grid.mark_occupied(GridPoint::new(15, 15)).unwrap();
        let config = PlannerConfig {
            robot_radius_px: 2,
            clearance_px: 1,
            cost_buffer_px: 2,
            max_iterations: 100,
        };
        let astar = WindowedAStar::new(&grid, &config);
        assert!(!astar.is_point_valid(GridPoint::new(15, 15)));
        assert!(!astar.is_point_valid(GridPoint::new(18, 12)));
        assert!(astar.is_point_valid(GridPoint::new(19, 15)));
        // Near the edge the window runs off the grid; that part counts as free.
        assert!(astar.is_point_valid(GridPoint::new(0, 0)));
        assert!(!astar.is_point_valid(GridPoint::new(30, 0)));
        assert!(matches!(
            astar.validate_goal(GridPoint::new(16, 16)),
            Err(PlanningError::InvalidGoal { x: 16, y: 16 })
        ));
    }

    #[test]
    fn test_path_cost_prefers_open_space() {
        let mut grid = OccupancyGrid::new(30, 30).unwrap();
        grid.set(GridPoint::new(10, 10), OCCUPIED).unwrap();
        let config = PlannerConfig {
            robot_radius_px: 1,
            clearance_px: 0,
            cost_buffer_px: 1,
            max_iterations: 100,
        };
        let astar = WindowedAStar::new(&grid, &config);
        // 5x5 window with one occupied pixel.
        assert!((astar.path_cost(GridPoint::new(11, 11)) - 255.0 / 25.0).abs() < EPSILON);
        assert!(astar.path_cost(GridPoint::new(20, 20)).abs() < EPSILON);
    }

    #[test]
    fn test_out_of_grid_endpoints() {
        let grid = OccupancyGrid::new(5, 5).unwrap();
        let config = point_footprint();
        let astar = WindowedAStar::new(&grid, &config);
        assert!(matches!(
            astar.search(GridPoint::new(0, 0), GridPoint::new(9, 0)),
            Err(PlanningError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_path_detours_around_wall() {
        let mut grid = OccupancyGrid::new(12, 12).unwrap();
        for y in 0..9 {
            grid.mark_occupied(GridPoint::new(6, y)).unwrap();
        }
        let config = point_footprint();
        let astar = WindowedAStar::new(&grid, &config);
        let result = astar.search(GridPoint::new(2, 2), GridPoint::new(10, 2)).unwrap();
        assert_eq!(result.points.first(), Some(&GridPoint::new(2, 2)));
        assert_eq!(result.points.last(), Some(&GridPoint::new(10, 2)));
        assert!(result.points.iter().all(|p| grid.is_free(*p)));
        assert!(result.points.iter().any(|p| p.y >= 9));
    }
}
