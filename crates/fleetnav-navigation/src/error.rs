//! This module defines the error types used by the `fleetnav-navigation` crate.

use thiserror::Error;

/// Error type for map and region construction.
///
/// These are construction-time problems with caller-supplied data; the
/// per-tick decision path never produces them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NavigationError {
    /// Map width or height is unusable.
    #[error("Invalid map dimensions: {0}")]
    InvalidDimensions(&'static str),
    /// Two grids that must share a shape do not.
    #[error("Grid shape mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        /// `(cols, rows)` of the receiving grid.
        expected: (usize, usize),
        /// `(cols, rows)` of the other grid.
        actual: (usize, usize),
    },
    /// Attempt to access a cell outside the grid.
    #[error("Map access out of bounds: {0}")]
    OutOfBounds(&'static str),
    /// The morphology structuring element is unusable.
    #[error("Invalid structuring element: {0}")]
    InvalidKernel(&'static str),
    /// Region ids are not the dense range `0..n`.
    #[error("Invalid region set: {0}")]
    InvalidRegions(&'static str),
    /// A region declared a different number of entry points than neighbors.
    #[error(
        "Region {region} declares {entry_points} entry points for {connected} connected regions"
    )]
    EntryPointMismatch {
        /// Region id.
        region: usize,
        /// Number of entry points supplied.
        entry_points: usize,
        /// Number of connected region ids supplied.
        connected: usize,
    },
}

/// Why a path plan could not be produced.
///
/// [`PlanningError::InvalidGoal`] means the requested target itself is
/// impossible; the other search variants mean the target may be fine but
/// could not be reached.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanningError {
    /// The goal cell is blocked or too close to a mapped obstacle.
    #[error("Goal ({x}, {y}) is blocked or too close to a mapped obstacle")]
    InvalidGoal {
        /// Goal column.
        x: usize,
        /// Goal row.
        y: usize,
    },
    /// The search hit its expansion cap before reaching the goal.
    #[error("Search stopped at the iteration cap of {iterations} expansions")]
    IterationLimit {
        /// Expansions performed.
        iterations: usize,
    },
    /// Every reachable cell was explored without finding the goal.
    #[error("Frontier exhausted after {expanded} expansions without reaching the goal")]
    Unreachable {
        /// Expansions performed.
        expanded: usize,
    },
    /// A waypoint does not fall on the grid.
    #[error("Point ({x:.1}, {y:.1}) lies outside the occupancy grid")]
    OutOfBounds {
        /// World x.
        x: f64,
        /// World y.
        y: f64,
    },
    /// Two regions on the macro route share no declared entry point.
    #[error("No entry point declared between regions {from} and {to}")]
    MissingEntryPoint {
        /// Region being left.
        from: usize,
        /// Region being entered.
        to: usize,
    },
}

impl PlanningError {
    /// True for the failures caused by running out of search budget or
    /// frontier, as opposed to an impossible request.
    pub fn is_exhaustion(&self) -> bool {
        matches!(
            self,
            PlanningError::IterationLimit { .. } | PlanningError::Unreachable { .. }
        )
    }
}
