//! Builds the global occupancy grid from per-region point samples.

use fleetnav_kinematics::Point;
use tracing::debug;

use super::{GridPoint, OccupancyGrid, morphology};
use crate::config::MappingConfig;
use crate::error::NavigationError;
use crate::region::Bounds;

/// Raw samples observed inside one region.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionSamples {
    /// Region the samples were attributed to.
    pub region_id: usize,
    /// The region's rectangle. Samples outside it are dropped.
    pub bounds: Bounds,
    /// Obstacle samples in world coordinates.
    pub samples: Vec<Point>,
}

/// The two persisted variants of one mapping pass.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapLayers {
    /// AND-merge of every region bitmap.
    pub raw: OccupancyGrid,
    /// `raw` after morphological opening.
    pub opened: OccupancyGrid,
}

impl MapLayers {
    /// The grid the planner searches.
    pub fn planning_grid(&self) -> &OccupancyGrid {
        &self.opened
    }
}

/// Rasterize one region's samples onto a full-size, all-free grid.
fn region_bitmap(
    width: usize,
    height: usize,
    region: &RegionSamples,
) -> Result<OccupancyGrid, NavigationError> {
    let mut grid = OccupancyGrid::for_environment(width, height)?;
    let mut ignored = 0usize;
    for sample in &region.samples {
        let cell = GridPoint::from_point(*sample)
            .filter(|cell| region.bounds.contains(cell.to_point()) && grid.contains(*cell));
        match cell {
            Some(cell) => grid.mark_occupied(cell)?,
            None => ignored += 1,
        }
    }
    if ignored > 0 {
        debug!(
            region_id = region.region_id,
            ignored, "Dropped samples outside region bounds or map"
        );
    }
    Ok(grid)
}

/// Build a map of a `width` x `height` environment.
///
/// Each region marks its in-bounds samples on its own bitmap; the bitmaps are
/// AND-merged so any region's obstacle wins, then the result is opened.
/// A region with no samples contributes an all-free bitmap.
pub fn build_map(
    width: usize,
    height: usize,
    regions: &[RegionSamples],
    config: &MappingConfig,
) -> Result<MapLayers, NavigationError> {
    let mut raw = OccupancyGrid::for_environment(width, height)?;
    for region in regions {
        let bitmap = region_bitmap(width, height, region)?;
        raw.and_assign(&bitmap)?;
    }
    let opened = morphology::open(&raw, config.kernel_size, config.iterations)?;
    debug!(
        cols = raw.cols(),
        rows = raw.rows(),
        raw_occupied = raw.occupied_count(),
        opened_occupied = opened.occupied_count(),
        "Map built"
    );
    Ok(MapLayers { raw, opened })
}
