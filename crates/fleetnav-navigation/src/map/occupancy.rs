//! The binary obstacle grid shared by the mapper and the planner.

#![warn(missing_docs)]

use core::fmt;

use super::GridPoint;
use crate::error::NavigationError;

/// Byte value of a free cell.
pub const FREE: u8 = 255;
/// Byte value of an occupied cell.
pub const OCCUPIED: u8 = 0;

/// A binary obstacle bitmap, one byte per cell.
///
/// Cells hold [`FREE`] or [`OCCUPIED`]; storage is row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OccupancyGrid {
    /// Number of columns
    cols: usize,
    /// Number of rows
    rows: usize,
    /// Cell values, `y * cols + x`
    data: Vec<u8>,
}

impl OccupancyGrid {
    /// Creates an all-free grid of `cols` x `rows` cells.
    ///
    /// # Returns
    /// * `Result<Self, NavigationError>` - The grid, or an error for empty or overflowing dimensions
    pub fn new(cols: usize, rows: usize) -> Result<Self, NavigationError> {
        if cols == 0 || rows == 0 {
            return Err(NavigationError::InvalidDimensions("Width and height must be non-zero"));
        }
        let Some(len) = cols.checked_mul(rows) else {
            return Err(NavigationError::InvalidDimensions(
                "Map dimensions too large, would cause overflow",
            ));
        };
        Ok(OccupancyGrid {
            cols,
            rows,
            data: vec![FREE; len],
        })
    }

    /// Creates an all-free grid covering an environment of `width` x `height`
    /// with inclusive bounds, i.e. `(width + 1) x (height + 1)` cells.
    pub fn for_environment(width: usize, height: usize) -> Result<Self, NavigationError> {
        match (width.checked_add(1), height.checked_add(1)) {
            (Some(cols), Some(rows)) => Self::new(cols, rows),
            _ => Err(NavigationError::InvalidDimensions(
                "Map dimensions too large, would cause overflow",
            )),
        }
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Raw cell bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn index(&self, p: GridPoint) -> usize {
        p.y * self.cols + p.x
    }

    /// Whether `p` is a cell of this grid.
    pub fn contains(&self, p: GridPoint) -> bool {
        p.x < self.cols && p.y < self.rows
    }

    /// The cell value at `p`, or `None` outside the grid.
    pub fn get(&self, p: GridPoint) -> Option<u8> {
        self.contains(p).then(|| self.data[self.index(p)])
    }

    /// The cell value at signed coordinates, or `None` outside the grid.
    pub fn get_signed(&self, x: isize, y: isize) -> Option<u8> {
        if x < 0 || y < 0 {
            return None;
        }
        self.get(GridPoint::new(x as usize, y as usize))
    }

    /// Sets the cell at `p`.
    ///
    /// # Returns
    /// * `Result<(), NavigationError>` - Success or error if out of bounds
    pub fn set(&mut self, p: GridPoint, value: u8) -> Result<(), NavigationError> {
        if !self.contains(p) {
            return Err(NavigationError::OutOfBounds("Grid point outside map bounds"));
        }
        let index = self.index(p);
        self.data[index] = value;
        Ok(())
    }

    /// Marks the cell at `p` occupied.
    pub fn mark_occupied(&mut self, p: GridPoint) -> Result<(), NavigationError> {
        self.set(p, OCCUPIED)
    }

    /// True if `p` is inside the grid and free.
    pub fn is_free(&self, p: GridPoint) -> bool {
        self.get(p) == Some(FREE)
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.data.iter().filter(|&&v| v != FREE).count()
    }

    /// Cell-wise logical AND with `other`: a cell stays free only if both grids say free.
    pub fn and_assign(&mut self, other: &OccupancyGrid) -> Result<(), NavigationError> {
        if (self.cols, self.rows) != (other.cols, other.rows) {
            return Err(NavigationError::DimensionMismatch {
                expected: (self.cols, self.rows),
                actual: (other.cols, other.rows),
            });
        }
        for (cell, theirs) in self.data.iter_mut().zip(&other.data) {
            *cell &= *theirs;
        }
        Ok(())
    }

    pub(crate) fn from_raw(cols: usize, rows: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(cols * rows, data.len());
        OccupancyGrid { cols, rows, data }
    }
}

impl fmt::Display for OccupancyGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.data.chunks(self.cols) {
            for &cell in row {
                write!(f, "{}", if cell == FREE { '.' } else { '#' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_creation() {
        let grid = OccupancyGrid::for_environment(10, 5).unwrap();
        assert_eq!(grid.cols(), 11);
        assert_eq!(grid.rows(), 6);
        assert!(grid.data().iter().all(|&v| v == FREE));
    }

    #[test]
    fn test_invalid_creation() {
        assert!(matches!(
            OccupancyGrid::new(0, 10),
            Err(NavigationError::InvalidDimensions(_))
        ));
        assert!(matches!(
            OccupancyGrid::new(usize::MAX, 2),
            Err(NavigationError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn test_cell_operations() {
        let mut grid = OccupancyGrid::new(5, 5).unwrap();
        let p = GridPoint::new(2, 3);
        grid.mark_occupied(p).unwrap();
        assert_eq!(grid.get(p), Some(OCCUPIED));
        assert!(!grid.is_free(p));
        assert_eq!(grid.occupied_count(), 1);

        assert!(matches!(
            grid.set(GridPoint::new(5, 0), OCCUPIED),
            Err(NavigationError::OutOfBounds(_))
        ));
        assert_eq!(grid.get(GridPoint::new(0, 5)), None);
        assert_eq!(grid.get_signed(-1, 0), None);
        assert_eq!(grid.get_signed(2, 3), Some(OCCUPIED));
    }

    #[test]
    fn test_and_merge() {
        let mut a = OccupancyGrid::new(3, 3).unwrap();
        let mut b = OccupancyGrid::new(3, 3).unwrap();
        a.mark_occupied(GridPoint::new(0, 0)).unwrap();
        b.mark_occupied(GridPoint::new(2, 2)).unwrap();
        a.and_assign(&b).unwrap();
        assert_eq!(a.get(GridPoint::new(0, 0)), Some(OCCUPIED));
        assert_eq!(a.get(GridPoint::new(2, 2)), Some(OCCUPIED));
        assert_eq!(a.occupied_count(), 2);

        let c = OccupancyGrid::new(4, 3).unwrap();
        assert!(matches!(
            a.and_assign(&c),
            Err(NavigationError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_display() {
        let mut grid = OccupancyGrid::new(3, 2).unwrap();
        grid.mark_occupied(GridPoint::new(1, 0)).unwrap();
        assert_eq!(grid.to_string(), ".#.\n...\n");
    }
}
