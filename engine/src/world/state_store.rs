//! Cell Occupancy Store
//!
//! Per-cell build state for one terrain tile. Every cell starts [`Free`];
//! slope edits move cells to [`HeightSet`]; finalizing a line element moves
//! its footprint to [`Occupied`]. Destroying the element or undoing the slope
//! releases the cells back to [`Free`]. No other transitions are legal.
//!
//! [`Free`]: CellState::Free
//! [`HeightSet`]: CellState::HeightSet
//! [`Occupied`]: CellState::Occupied

use serde::{Deserialize, Serialize};

use super::grid::GridCell;

/// Opaque identity of a built line element, used to tag occupied cells.
///
/// An element may see through its own cells while being re-validated during
/// editing; everyone else treats them as blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub u32);

/// Build state of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    /// Untouched ground, can be built on or slope-edited.
    Free,
    /// Ground has been leveled or raised but nothing occupies it. Cannot be
    /// built over without replacing the edit.
    HeightSet,
    /// A placed element claims the cell.
    Occupied(ElementId),
}

impl Default for CellState {
    fn default() -> Self {
        Self::Free
    }
}

/// Errors from occupancy queries.
///
/// Out-of-range access is a programming error in the caller, never an
/// expected runtime condition; the grid mapper clamps before handing out
/// cells, so a bad cell here means a caller bypassed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccupancyError {
    OutOfRange { cell: GridCell, resolution: u32 },
}

impl std::fmt::Display for OccupancyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OccupancyError::OutOfRange { cell, resolution } => write!(
                f,
                "grid cell ({}, {}) outside [0, {})^2",
                cell.x, cell.z, resolution
            ),
        }
    }
}

impl std::error::Error for OccupancyError {}

/// `resolution x resolution` array of cell states, row-major.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    resolution: u32,
    states: Vec<CellState>,
}

impl OccupancyGrid {
    pub fn new(resolution: u32) -> Self {
        Self {
            resolution,
            states: vec![CellState::Free; (resolution * resolution) as usize],
        }
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    fn index(&self, cell: GridCell) -> Option<usize> {
        let res = self.resolution as i32;
        if cell.x < 0 || cell.z < 0 || cell.x >= res || cell.z >= res {
            None
        } else {
            Some(cell.z as usize * self.resolution as usize + cell.x as usize)
        }
    }

    /// State of a cell. Fails with [`OccupancyError::OutOfRange`] for cells
    /// outside the grid.
    pub fn state_at(&self, cell: GridCell) -> Result<CellState, OccupancyError> {
        self.index(cell)
            .map(|i| self.states[i])
            .ok_or(OccupancyError::OutOfRange {
                cell,
                resolution: self.resolution,
            })
    }

    /// Bulk overwrite a set of cells with one state.
    ///
    /// Out-of-range cells in the input are skipped: rasterized strips can
    /// graze tile boundaries and the stray samples carry no information.
    pub fn mark_as(&mut self, state: CellState, cells: impl IntoIterator<Item = GridCell>) {
        for cell in cells {
            if let Some(i) = self.index(cell) {
                self.states[i] = state;
            }
        }
    }

    /// Bulk reset a set of cells to [`CellState::Free`].
    pub fn unmark(&mut self, cells: impl IntoIterator<Item = GridCell>) {
        self.mark_as(CellState::Free, cells);
    }

    /// Whether a cell blocks building for a given requester.
    ///
    /// A cell occupied by `allowed_owner` counts as free (self-revalidation
    /// while an element is being edited); any other occupier, or a
    /// height-edited cell, blocks.
    pub fn blocks_building(&self, cell: GridCell, allowed_owner: Option<ElementId>) -> bool {
        match self.state_at(cell) {
            Ok(CellState::Free) => false,
            Ok(CellState::HeightSet) => true,
            Ok(CellState::Occupied(owner)) => Some(owner) != allowed_owner,
            // Out-of-range cells from a grazing strip carry no claim.
            Err(_) => false,
        }
    }

    /// Sparse list of all non-free cells with their states.
    pub fn non_free_cells(&self) -> Vec<(GridCell, CellState)> {
        let res = self.resolution as i32;
        let mut out = Vec::new();
        for z in 0..res {
            for x in 0..res {
                let cell = GridCell::new(x, z);
                if let Ok(state) = self.state_at(cell) {
                    if state != CellState::Free {
                        out.push((cell, state));
                    }
                }
            }
        }
        out
    }
}
