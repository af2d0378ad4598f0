//! Cell coordinates and rectangular selections.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// A `(y, x)` index into a [`MeshGrid`](crate::MeshGrid).
///
/// Ordering is row-major: cells compare by `y` first, then `x`.
///
/// # Example
///
/// ```
/// use bed_types::CellCoord;
///
/// let cell: CellCoord = "3,7".parse().unwrap();
/// assert_eq!(cell, CellCoord::new(3, 7));
/// assert!(CellCoord::new(0, 9) < CellCoord::new(1, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    /// Row (Y point index).
    pub y: usize,
    /// Column (X point index).
    pub x: usize,
}

impl CellCoord {
    /// Create a coordinate from a row and column index.
    #[inline]
    #[must_use]
    pub const fn new(y: usize, x: usize) -> Self {
        Self { y, x }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.y, self.x)
    }
}

impl From<(usize, usize)> for CellCoord {
    fn from((y, x): (usize, usize)) -> Self {
        Self::new(y, x)
    }
}

impl FromStr for CellCoord {
    type Err = GridError;

    /// Parse `"Y,X"` (whitespace around the numbers is allowed).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GridError::InvalidCoord {
            input: s.to_string(),
        };
        let (y, x) = s.split_once(',').ok_or_else(invalid)?;
        let y = y.trim().parse().map_err(|_| invalid())?;
        let x = x.trim().parse().map_err(|_| invalid())?;
        Ok(Self::new(y, x))
    }
}

/// An inclusive rectangle of cells spanned by two corners.
///
/// The corners may be given in any order; this mirrors a drag selection
/// where the user can start from any corner.
///
/// # Example
///
/// ```
/// use bed_types::{CellCoord, CellRegion};
///
/// let region = CellRegion::new(CellCoord::new(2, 3), CellCoord::new(1, 1));
/// assert_eq!(region.len(), 6);
/// assert!(region.contains(CellCoord::new(1, 3)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRegion {
    start: CellCoord,
    end: CellCoord,
}

impl CellRegion {
    /// Create a region from two opposite corners.
    #[must_use]
    pub fn new(a: CellCoord, b: CellCoord) -> Self {
        Self {
            start: CellCoord::new(a.y.min(b.y), a.x.min(b.x)),
            end: CellCoord::new(a.y.max(b.y), a.x.max(b.x)),
        }
    }

    /// A region holding exactly one cell.
    #[must_use]
    pub const fn single(cell: CellCoord) -> Self {
        Self {
            start: cell,
            end: cell,
        }
    }

    /// Top-left (lowest indices) corner.
    #[must_use]
    pub const fn start(&self) -> CellCoord {
        self.start
    }

    /// Bottom-right (highest indices) corner.
    #[must_use]
    pub const fn end(&self) -> CellCoord {
        self.end
    }

    /// Number of cells in the region.
    #[must_use]
    pub const fn len(&self) -> usize {
        (self.end.y - self.start.y + 1) * (self.end.x - self.start.x + 1)
    }

    /// A region always holds at least one cell.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Whether `cell` lies inside the region.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.y >= self.start.y
            && cell.y <= self.end.y
            && cell.x >= self.start.x
            && cell.x <= self.end.x
    }

    /// Iterate the cells row by row.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (self.start.y..=self.end.y)
            .flat_map(move |y| (self.start.x..=self.end.x).map(move |x| CellCoord::new(y, x)))
    }

    /// Collect the cells row by row.
    #[must_use]
    pub fn cells(&self) -> Vec<CellCoord> {
        self.iter().collect()
    }
}

impl FromStr for CellRegion {
    type Err = GridError;

    /// Parse `"Y0,X0:Y1,X1"`, or a single `"Y,X"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((a, b)) => {
                let a: CellCoord = a.parse().map_err(|_| GridError::InvalidCoord {
                    input: s.to_string(),
                })?;
                let b: CellCoord = b.parse().map_err(|_| GridError::InvalidCoord {
                    input: s.to_string(),
                })?;
                Ok(Self::new(a, b))
            }
            None => s.parse().map(Self::single),
        }
    }
}
