//! First-fit box allocation over a fixed layout.

use super::layout::GridLayout;
use crate::model::grid::{CellRef, GridCell, SizeClass};
use std::collections::HashSet;

/// Occupancy snapshot plus first-fit search.
///
/// Built from the coordinates of persisted items at scan time; it does not
/// watch storage afterwards.
#[derive(Debug, Clone)]
pub struct BoxAllocator {
    layout: GridLayout,
    occupied: HashSet<CellRef>,
}

impl BoxAllocator {
    pub fn new(layout: GridLayout) -> Self {
        Self {
            layout,
            occupied: HashSet::new(),
        }
    }

    /// Builds an allocator with `cells` already taken.
    ///
    /// Cells outside the layout are ignored.
    pub fn with_occupied(layout: GridLayout, cells: impl IntoIterator<Item = CellRef>) -> Self {
        let mut allocator = Self::new(layout);
        for cell in cells {
            allocator.mark_occupied(cell);
        }
        allocator
    }

    /// Marks a cell as taken. Returns `false` when it lies outside the grid.
    pub fn mark_occupied(&mut self, cell: CellRef) -> bool {
        if self.layout.size_of(cell).is_none() {
            return false;
        }
        self.occupied.insert(cell);
        true
    }

    pub fn is_occupied(&self, cell: CellRef) -> bool {
        self.occupied.contains(&cell)
    }

    /// All cells of the `size` region in scan order.
    pub fn cells(&self, size: SizeClass) -> impl Iterator<Item = GridCell> + '_ {
        let rows = self.layout.rows_for(size);
        let columns = self.layout.columns;
        (rows.start..rows.end).flat_map(move |row| {
            (0..columns).map(move |col| GridCell {
                row,
                col,
                size,
                occupied: self.is_occupied(CellRef::new(row, col)),
            })
        })
    }

    /// First free cell of `size`, or `None` when the region is full.
    pub fn next_free_cell(&self, size: SizeClass) -> Option<GridCell> {
        self.cells(size).find(|cell| !cell.occupied)
    }

    /// Like [`Self::next_free_cell`] but also marks the cell as taken.
    pub fn allocate(&mut self, size: SizeClass) -> Option<GridCell> {
        let cell = self.next_free_cell(size)?;
        self.occupied.insert(cell.cell_ref());
        Some(GridCell {
            occupied: true,
            ..cell
        })
    }
}
