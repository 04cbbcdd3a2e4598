use fleetnav_kinematics::Point;

/// Represents a point in grid coordinates (cell indices).
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPoint {
    /// The x-coordinate (column index) in the grid.
    pub x: usize,
    /// The y-coordinate (row index) in the grid.
    pub y: usize,
}

impl GridPoint {
    /// Creates a new `GridPoint`.
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Nearest cell to a world point, or `None` for negative coordinates.
    #[must_use]
    pub fn from_point(p: Point) -> Option<Self> {
        let (x, y) = (p.x.round(), p.y.round());
        if !(x >= 0.0 && y >= 0.0) {
            return None;
        }
        Some(Self::new(x as usize, y as usize))
    }

    /// The cell shifted by `(dx, dy)`, or `None` if that underflows.
    #[must_use]
    pub fn offset(self, dx: isize, dy: isize) -> Option<Self> {
        Some(Self::new(
            self.x.checked_add_signed(dx)?,
            self.y.checked_add_signed(dy)?,
        ))
    }

    /// Euclidean distance in cells.
    #[must_use]
    pub fn distance(self, other: GridPoint) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// The cell as a world point.
    #[must_use]
    pub fn to_point(self) -> Point {
        Point::new(self.x as f64, self.y as f64)
    }
}
