//! Static grid partitioning between small and large boxes.

use crate::model::grid::{CellRef, SizeClass};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rows and columns are encoded as single letters `a..=z` on the wire.
pub const MAX_GRID_EXTENT: u32 = 26;

const DEFAULT_COLUMNS: u32 = 8;
const DEFAULT_SMALL_ROWS: RowRange = RowRange { start: 0, end: 4 };
const DEFAULT_LARGE_ROWS: RowRange = RowRange { start: 4, end: 6 };

/// Half-open row range `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RowRange {
    pub start: u32,
    pub end: u32,
}

impl RowRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, row: u32) -> bool {
        self.start <= row && row < self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    fn overlaps(&self, other: &RowRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Grid dimensions plus the row region of each size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridLayout {
    pub columns: u32,
    pub small_rows: RowRange,
    pub large_rows: RowRange,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            small_rows: DEFAULT_SMALL_ROWS,
            large_rows: DEFAULT_LARGE_ROWS,
        }
    }
}

/// Reasons a grid layout is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridLayoutError {
    NoColumns,
    EmptyRegion(SizeClass),
    OverlappingRegions,
    TooLarge { extent: u32 },
}

impl Display for GridLayoutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoColumns => write!(f, "grid must have at least one column"),
            Self::EmptyRegion(size) => write!(f, "{} box region has no rows", size.as_str()),
            Self::OverlappingRegions => write!(f, "small and large box regions overlap"),
            Self::TooLarge { extent } => write!(
                f,
                "grid extent {extent} exceeds the {MAX_GRID_EXTENT} letters available for coordinates"
            ),
        }
    }
}

impl Error for GridLayoutError {}

impl GridLayout {
    /// Checks that both regions are usable and addressable.
    pub fn validate(&self) -> Result<(), GridLayoutError> {
        if self.columns == 0 {
            return Err(GridLayoutError::NoColumns);
        }
        if self.small_rows.is_empty() {
            return Err(GridLayoutError::EmptyRegion(SizeClass::Small));
        }
        if self.large_rows.is_empty() {
            return Err(GridLayoutError::EmptyRegion(SizeClass::Large));
        }
        if self.small_rows.overlaps(&self.large_rows) {
            return Err(GridLayoutError::OverlappingRegions);
        }
        let extent = self
            .columns
            .max(self.small_rows.end)
            .max(self.large_rows.end);
        if extent > MAX_GRID_EXTENT {
            return Err(GridLayoutError::TooLarge { extent });
        }
        Ok(())
    }

    pub fn rows_for(&self, size: SizeClass) -> RowRange {
        match size {
            SizeClass::Small => self.small_rows,
            SizeClass::Large => self.large_rows,
        }
    }

    /// Size class of the region containing `cell`, if any.
    pub fn size_of(&self, cell: CellRef) -> Option<SizeClass> {
        if cell.col >= self.columns {
            return None;
        }
        if self.small_rows.contains(cell.row) {
            Some(SizeClass::Small)
        } else if self.large_rows.contains(cell.row) {
            Some(SizeClass::Large)
        } else {
            None
        }
    }

    /// Number of boxes in the region of `size`.
    pub fn capacity(&self, size: SizeClass) -> u32 {
        self.rows_for(size).len() * self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::{GridLayout, GridLayoutError, RowRange};
    use crate::model::grid::{CellRef, SizeClass};

    #[test]
    fn default_layout_is_valid() {
        let layout = GridLayout::default();
        layout.validate().unwrap();
        assert_eq!(layout.capacity(SizeClass::Small), 32);
        assert_eq!(layout.capacity(SizeClass::Large), 16);
    }

    #[test]
    fn size_of_follows_row_regions() {
        let layout = GridLayout::default();
        assert_eq!(layout.size_of(CellRef::new(0, 0)), Some(SizeClass::Small));
        assert_eq!(layout.size_of(CellRef::new(5, 7)), Some(SizeClass::Large));
        assert_eq!(layout.size_of(CellRef::new(6, 0)), None);
        assert_eq!(layout.size_of(CellRef::new(0, 8)), None);
    }

    #[test]
    fn validate_rejects_broken_layouts() {
        let overlapping = GridLayout {
            columns: 4,
            small_rows: RowRange::new(0, 3),
            large_rows: RowRange::new(2, 4),
        };
        assert_eq!(
            overlapping.validate(),
            Err(GridLayoutError::OverlappingRegions)
        );

        let empty_large = GridLayout {
            large_rows: RowRange::new(4, 4),
            ..GridLayout::default()
        };
        assert_eq!(
            empty_large.validate(),
            Err(GridLayoutError::EmptyRegion(SizeClass::Large))
        );

        let too_wide = GridLayout {
            columns: 27,
            ..GridLayout::default()
        };
        assert_eq!(
            too_wide.validate(),
            Err(GridLayoutError::TooLarge { extent: 27 })
        );
    }
}
