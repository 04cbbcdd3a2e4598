//! Coarse regions and the graph used for macro routing.

use std::collections::{BTreeMap, VecDeque};

use fleetnav_kinematics::Point;
use tracing::warn;

use crate::error::NavigationError;

/// An axis-aligned rectangle, inclusive on every edge.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    /// Lower-left corner.
    pub min: Point,
    /// Upper-right corner.
    pub max: Point,
}

impl Bounds {
    /// The rectangle spanned by two opposite corners, in either order.
    pub fn new(a: Point, b: Point) -> Self {
        Bounds {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// A rectangular partition of the environment with one entry point per neighbor.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Region {
    /// Region id, also its row in the adjacency matrix.
    pub id: usize,
    /// Rectangle corners in winding order; 0 and 2 are opposite.
    pub corners: [Point; 4],
    /// Crossing point toward each connected region, keyed by neighbor id.
    pub entry_points: BTreeMap<usize, Point>,
}

impl Region {
    /// A region with no neighbors yet.
    pub fn new(id: usize, corners: [Point; 4]) -> Self {
        Region {
            id,
            corners,
            entry_points: BTreeMap::new(),
        }
    }

    /// Declare the crossing point toward `neighbor`.
    pub fn with_entry_point(mut self, neighbor: usize, point: Point) -> Self {
        self.entry_points.insert(neighbor, point);
        self
    }

    /// Build from the positional form where `entry_points[i]` leads to
    /// `connected_region_ids[i]`.
    pub fn from_parallel_lists(
        id: usize,
        corners: [Point; 4],
        entry_points: &[Point],
        connected_region_ids: &[usize],
    ) -> Result<Self, NavigationError> {
        if entry_points.len() != connected_region_ids.len() {
            return Err(NavigationError::EntryPointMismatch {
                region: id,
                entry_points: entry_points.len(),
                connected: connected_region_ids.len(),
            });
        }
        let entry_points = connected_region_ids
            .iter()
            .copied()
            .zip(entry_points.iter().copied())
            .collect();
        Ok(Region {
            id,
            corners,
            entry_points,
        })
    }

    /// Bounding rectangle from corners 0 and 2.
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.corners[0], self.corners[2])
    }

    /// Whether `p` lies inside the region, edges included.
    pub fn contains(&self, p: Point) -> bool {
        self.bounds().contains(p)
    }

    /// Entry point declared toward `neighbor`.
    pub fn entry_point_to(&self, neighbor: usize) -> Option<Point> {
        self.entry_points.get(&neighbor).copied()
    }

    /// Ids of the declared neighbors, ascending.
    pub fn connected_region_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.entry_points.keys().copied()
    }
}

/// Undirected adjacency over a set of regions.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionGraph {
    regions: Vec<Region>,
    adjacency: Vec<Vec<bool>>,
}

struct BfsNode {
    region: usize,
    parent: Option<usize>,
}

impl RegionGraph {
    /// Build the graph from each region's declared neighbors.
    ///
    /// Regions are sorted by id; an edge is added for every declared
    /// neighbor that exists, in both directions.
    pub fn from_regions(mut regions: Vec<Region>) -> Result<Self, NavigationError> {
        regions.sort_by_key(|r| r.id);
        let ids_dense = regions.iter().enumerate().all(|(i, r)| r.id == i);
        if !ids_dense {
            return Err(NavigationError::InvalidRegions(
                "region ids must be 0..n with no gaps or duplicates",
            ));
        }
        let n = regions.len();
        let mut graph = RegionGraph {
            adjacency: vec![vec![false; n]; n],
            regions,
        };
        let edges: Vec<(usize, usize)> = graph
            .regions
            .iter()
            .flat_map(|r| r.connected_region_ids().map(move |to| (r.id, to)))
            .collect();
        for (from, to) in edges {
            if !graph.add_edge(from, to) {
                warn!(from, to, "Ignoring entry point toward unknown region");
            }
        }
        Ok(graph)
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// True when the graph has no regions.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// All regions, by ascending id.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Region by id.
    pub fn region(&self, id: usize) -> Option<&Region> {
        self.regions.get(id)
    }

    /// Connect `a` and `b`. Returns false if either id is unknown.
    pub fn add_edge(&mut self, a: usize, b: usize) -> bool {
        self.set_edge(a, b, true)
    }

    /// Disconnect `a` and `b`. Returns false if either id is unknown.
    pub fn remove_edge(&mut self, a: usize, b: usize) -> bool {
        self.set_edge(a, b, false)
    }

    fn set_edge(&mut self, a: usize, b: usize, value: bool) -> bool {
        let n = self.len();
        if a >= n || b >= n {
            return false;
        }
        self.adjacency[a][b] = value;
        self.adjacency[b][a] = value;
        true
    }

    /// Whether `a` and `b` share an edge.
    pub fn is_connected(&self, a: usize, b: usize) -> bool {
        self.adjacency
            .get(a)
            .and_then(|row| row.get(b))
            .copied()
            .unwrap_or(false)
    }

    /// Neighbors of `id`, ascending.
    pub fn neighbors(&self, id: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency
            .get(id)
            .into_iter()
            .flat_map(|row| row.iter().enumerate().filter(|(_, c)| **c).map(|(i, _)| i))
    }

    /// First region, by ascending id, containing `p`.
    pub fn region_of(&self, p: Point) -> Option<usize> {
        self.regions.iter().find(|r| r.contains(p)).map(|r| r.id)
    }

    /// Fewest-hop region sequence from `start` to `goal`, both included.
    ///
    /// `Some(vec![])` when `start == goal`; `None` when no route exists.
    pub fn bfs(&self, start: usize, goal: usize) -> Option<Vec<usize>> {
        if start >= self.len() || goal >= self.len() {
            return None;
        }
        if start == goal {
            return Some(Vec::new());
        }

        let mut arena = vec![BfsNode {
            region: start,
            parent: None,
        }];
        let mut seen = vec![false; self.len()];
        seen[start] = true;
        let mut frontier = VecDeque::from([0usize]);

        while let Some(index) = frontier.pop_front() {
            let region = arena[index].region;
            for next in self.neighbors(region) {
                if seen[next] {
                    continue;
                }
                seen[next] = true;
                arena.push(BfsNode {
                    region: next,
                    parent: Some(index),
                });
                let child = arena.len() - 1;
                if next == goal {
                    return Some(Self::unwind(&arena, child));
                }
                frontier.push_back(child);
            }
        }
        None
    }

    fn unwind(arena: &[BfsNode], mut index: usize) -> Vec<usize> {
        let mut route = vec![arena[index].region];
        while let Some(parent) = arena[index].parent {
            route.push(arena[parent].region);
            index = parent;
        }
        route.reverse();
        route
    }
}
