use std::collections::HashSet;

use fleetnav_navigation::astar::WindowedAStar;
use fleetnav_navigation::config::PlannerConfig;
use fleetnav_navigation::map::{GridPoint, OccupancyGrid};

fn main() {
    // 0 = walkable
    // 1 = blocked
    let layout = [
        [0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 1, 1, 0, 0, 0, 0, 1, 1, 0],
        [0, 0, 0, 0, 1, 0, 0, 0, 0, 0],
        [0, 0, 1, 1, 1, 1, 0, 1, 0, 0],
        [0, 0, 0, 0, 0, 1, 0, 1, 0, 0],
        [0, 1, 1, 1, 0, 1, 0, 1, 1, 0],
        [0, 0, 0, 1, 0, 0, 0, 0, 0, 0],
        [0, 1, 0, 1, 0, 1, 1, 1, 0, 0],
        [0, 1, 0, 0, 0, 0, 0, 0, 1, 0],
        [0, 0, 0, 1, 1, 1, 0, 0, 0, 0],
    ];

    let mut grid = OccupancyGrid::new(10, 10).unwrap();
    for (y, row) in layout.iter().enumerate() {
        for (x, &cell) in row.iter().enumerate() {
            if cell == 1 {
                grid.mark_occupied(GridPoint::new(x, y)).unwrap();
            }
        }
    }

    // Point-sized robot so single-cell gaps are passable.
    let config = PlannerConfig {
        robot_radius_px: 0,
        clearance_px: 0,
        cost_buffer_px: 1,
        max_iterations: 1_000,
    };
    let astar = WindowedAStar::new(&grid, &config);

    let start = GridPoint::new(0, 0);
    let goal = GridPoint::new(9, 9);

    println!("Grid:");
    print!("{}", grid);
    println!("\nStart: {:?}, Goal: {:?}", start, goal);

    match astar.search(start, goal) {
        Ok(result) => {
            println!("\nPath found: {:?}", result.points);
            println!(
                "Expanded {} nodes, generated {}",
                result.stats.expansions, result.stats.nodes_generated
            );

            let path_set: HashSet<GridPoint> = result.points.iter().copied().collect();

            println!("\nGrid with path:");
            for y in 0..grid.rows() {
                for x in 0..grid.cols() {
                    let p = GridPoint::new(x, y);
                    if p == start {
                        print!("S ");
                    } else if p == goal {
                        print!("G ");
                    } else if path_set.contains(&p) {
                        print!("* ");
                    } else if !grid.is_free(p) {
                        print!("X ");
                    } else {
                        print!(". ");
                    }
                }
                println!();
            }
        }
        Err(e) => println!("\nNo path found: {}", e),
    }
}
