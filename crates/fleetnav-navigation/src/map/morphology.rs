//! Binary morphology over an [`OccupancyGrid`].
//!
//! Erosion takes the minimum over a square neighborhood, dilation the maximum.
//! With free = 255, an opening widens sparse obstacle samples into solid
//! blobs and then shrinks them back, which closes pinholes of free space
//! between nearby samples. Neighbors outside the grid are skipped.

use super::OccupancyGrid;
use crate::error::NavigationError;

fn check_kernel(kernel_size: usize) -> Result<isize, NavigationError> {
    if kernel_size == 0 || kernel_size % 2 == 0 {
        return Err(NavigationError::InvalidKernel("kernel size must be odd and non-zero"));
    }
    Ok((kernel_size / 2) as isize)
}

fn filter(grid: &OccupancyGrid, radius: isize, pick: fn(u8, u8) -> u8) -> OccupancyGrid {
    let (cols, rows) = (grid.cols(), grid.rows());
    let mut out = Vec::with_capacity(cols * rows);
    for y in 0..rows as isize {
        for x in 0..cols as isize {
            let mut acc = None;
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    if let Some(v) = grid.get_signed(x + dx, y + dy) {
                        acc = Some(acc.map_or(v, |a| pick(a, v)));
                    }
                }
            }
            // The center is always in bounds.
            out.push(acc.unwrap_or_default());
        }
    }
    OccupancyGrid::from_raw(cols, rows, out)
}

/// Square-kernel erosion.
pub fn erode(grid: &OccupancyGrid, kernel_size: usize) -> Result<OccupancyGrid, NavigationError> {
    let radius = check_kernel(kernel_size)?;
    Ok(filter(grid, radius, u8::min))
}

/// Square-kernel dilation.
pub fn dilate(grid: &OccupancyGrid, kernel_size: usize) -> Result<OccupancyGrid, NavigationError> {
    let radius = check_kernel(kernel_size)?;
    Ok(filter(grid, radius, u8::max))
}

/// `iterations` erosions followed by `iterations` dilations.
///
/// The noise removed is free space: pinholes of free cells narrower than the
/// kernel become occupied. An isolated occupied sample survives unchanged.
pub fn open(
    grid: &OccupancyGrid,
    kernel_size: usize,
    iterations: usize,
) -> Result<OccupancyGrid, NavigationError> {
    let radius = check_kernel(kernel_size)?;
    let mut out = grid.clone();
    for _ in 0..iterations {
        out = filter(&out, radius, u8::min);
    }
    for _ in 0..iterations {
        out = filter(&out, radius, u8::max);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{FREE, GridPoint, OCCUPIED};

    #[test]
    fn test_erode_grows_obstacles() {
        let mut grid = OccupancyGrid::new(5, 5).unwrap();
        grid.mark_occupied(GridPoint::new(2, 2)).unwrap();
        let eroded = erode(&grid, 3).unwrap();
        assert_eq!(eroded.occupied_count(), 9);
        assert_eq!(eroded.get(GridPoint::new(1, 1)), Some(OCCUPIED));
        assert_eq!(eroded.get(GridPoint::new(0, 0)), Some(FREE));
    }

    #[test]
    fn test_dilate_shrinks_obstacles() {
        let mut grid = OccupancyGrid::new(5, 5).unwrap();
        grid.mark_occupied(GridPoint::new(2, 2)).unwrap();
        let dilated = dilate(&grid, 3).unwrap();
        assert_eq!(dilated.occupied_count(), 0);
    }

    #[test]
    fn test_open_fills_gap_between_samples() {
        // Two samples with a one-cell free gap between them.
        let mut grid = OccupancyGrid::new(9, 5).unwrap();
        grid.mark_occupied(GridPoint::new(3, 2)).unwrap();
        grid.mark_occupied(GridPoint::new(5, 2)).unwrap();
        let opened = open(&grid, 3, 1).unwrap();
        assert_eq!(opened.get(GridPoint::new(3, 2)), Some(OCCUPIED));
        assert_eq!(opened.get(GridPoint::new(4, 2)), Some(OCCUPIED));
        assert_eq!(opened.get(GridPoint::new(5, 2)), Some(OCCUPIED));
        assert_eq!(opened.get(GridPoint::new(0, 0)), Some(FREE));
    }

    #[test]
    fn test_open_keeps_lone_sample_and_fills_pinhole() {
        let mut speck = OccupancyGrid::new(5, 5).unwrap();
        speck.mark_occupied(GridPoint::new(2, 2)).unwrap();
        assert_eq!(open(&speck, 3, 1).unwrap(), speck);

        let mut pinhole = OccupancyGrid::new(5, 5).unwrap();
        for y in 0..5 {
            for x in 0..5 {
                if (x, y) != (2, 2) {
                    pinhole.mark_occupied(GridPoint::new(x, y)).unwrap();
                }
            }
        }
        assert_eq!(open(&pinhole, 3, 1).unwrap().occupied_count(), 25);
    }

    #[test]
    fn test_open_zero_iterations_is_identity() {
        let mut grid = OccupancyGrid::new(4, 4).unwrap();
        grid.mark_occupied(GridPoint::new(1, 1)).unwrap();
        assert_eq!(open(&grid, 3, 0).unwrap(), grid);
    }

    #[test]
    fn test_even_kernel_rejected() {
        let grid = OccupancyGrid::new(4, 4).unwrap();
        assert!(matches!(open(&grid, 2, 1), Err(NavigationError::InvalidKernel(_))));
        assert!(matches!(erode(&grid, 0), Err(NavigationError::InvalidKernel(_))));
    }
}
