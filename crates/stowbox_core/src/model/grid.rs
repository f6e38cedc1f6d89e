//! Grid coordinates and box size classes.

use serde::{Deserialize, Serialize};

/// Box size partition of the allocation grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    Small,
    Large,
}

impl SizeClass {
    pub fn is_small(self) -> bool {
        matches!(self, Self::Small)
    }

    pub fn from_is_small(is_small: bool) -> Self {
        if is_small {
            Self::Small
        } else {
            Self::Large
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Large => "large",
        }
    }
}

/// Zero-based `(row, col)` address of one box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// One grid cell with its size class and occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub row: u32,
    pub col: u32,
    pub size: SizeClass,
    pub occupied: bool,
}

impl GridCell {
    pub fn cell_ref(&self) -> CellRef {
        CellRef::new(self.row, self.col)
    }
}
