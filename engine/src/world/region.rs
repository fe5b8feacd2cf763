//! Heightmap Regions
//!
//! A region is a bounded, enumerable set of grid cells with a cached tight
//! bounding rectangle. Regions are built by rasterizing a rectangular strip
//! between two world points, from an explicit cell list, or by unioning two
//! regions, and they are the unit of bulk height writes.

use std::collections::HashSet;

use glam::Vec3;

use super::grid::{GridCell, TerrainGrid};
use super::heightfield::{HeightField, world_to_unit};

/// Tight axis-aligned bounding rectangle of a region, in cell indices.
/// `width`/`height` are cell counts, inclusive of both edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionBounds {
    pub start_x: i32,
    pub start_z: i32,
    pub width: i32,
    pub height: i32,
}

impl RegionBounds {
    fn single(cell: GridCell) -> Self {
        Self {
            start_x: cell.x,
            start_z: cell.z,
            width: 1,
            height: 1,
        }
    }

    fn grow(&mut self, cell: GridCell) {
        let end_x = (self.start_x + self.width - 1).max(cell.x);
        let end_z = (self.start_z + self.height - 1).max(cell.z);
        self.start_x = self.start_x.min(cell.x);
        self.start_z = self.start_z.min(cell.z);
        self.width = end_x - self.start_x + 1;
        self.height = end_z - self.start_z + 1;
    }

    fn union(&self, other: &Self) -> Self {
        let start_x = self.start_x.min(other.start_x);
        let start_z = self.start_z.min(other.start_z);
        let end_x = (self.start_x + self.width).max(other.start_x + other.width);
        let end_z = (self.start_z + self.height).max(other.start_z + other.height);
        Self {
            start_x,
            start_z,
            width: end_x - start_x,
            height: end_z - start_z,
        }
    }
}

/// Outcome of a region height write. Clamping is a recoverable warning the
/// caller surfaces to the user, not an error: the write still happens with
/// the clamped value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SetHeightOutcome {
    Applied { height: f32 },
    Clamped { requested: f32, applied: f32 },
}

impl SetHeightOutcome {
    /// The world height actually written.
    pub fn applied(&self) -> f32 {
        match *self {
            SetHeightOutcome::Applied { height } => height,
            SetHeightOutcome::Clamped { applied, .. } => applied,
        }
    }

    pub fn was_clamped(&self) -> bool {
        matches!(self, SetHeightOutcome::Clamped { .. })
    }
}

/// Visit every sample point of a rectangular strip between `start` and `end`
/// (XZ projection) of the given total width, stepping at `spacing`.
///
/// The visitor receives `(row, row_count, point)`; rows advance from `start`
/// to `end`, samples within a row sweep across the width, centered on the
/// segment. Degenerate segments collapse to a single row across the width.
pub fn for_each_strip_sample(
    start: Vec3,
    end: Vec3,
    width: f32,
    spacing: f32,
    mut visit: impl FnMut(u32, u32, Vec3),
) {
    let delta = Vec3::new(end.x - start.x, 0.0, end.z - start.z);
    let distance = delta.length();
    let dir = if distance > f32::EPSILON {
        delta / distance
    } else {
        Vec3::X
    };
    let perp = Vec3::new(-dir.z, 0.0, dir.x);

    let length_steps = (distance / spacing).ceil().max(0.0) as u32;
    let width_steps = (width / spacing).ceil().max(0.0) as u32;
    let row_count = length_steps + 1;

    for i in 0..row_count {
        let along = if length_steps == 0 {
            0.0
        } else {
            distance * i as f32 / length_steps as f32
        };
        let row_center = start + dir * along;
        for j in 0..=width_steps {
            let across = if width_steps == 0 {
                0.0
            } else {
                width * (j as f32 / width_steps as f32 - 0.5)
            };
            visit(i, row_count, row_center + perp * across);
        }
    }
}

/// A deduplicated set of grid cells with a cached bounding rectangle.
///
/// The rectangle is the minimal axis-aligned box containing all member
/// cells; an empty region has no rectangle.
#[derive(Debug, Clone, Default)]
pub struct HeightmapRegion {
    cells: HashSet<GridCell>,
    bounds: Option<RegionBounds>,
}

impl HeightmapRegion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rasterize the strip from `start` to `end` of the given width onto a
    /// grid. Sample points are deduplicated into the cell set.
    pub fn from_strip(grid: &TerrainGrid, start: Vec3, end: Vec3, width: f32) -> Self {
        let mut region = Self::new();
        for_each_strip_sample(start, end, width, grid.spacing(), |_, _, point| {
            region.add_cell(grid.world_to_grid(point));
        });
        region
    }

    pub fn from_cells(cells: impl IntoIterator<Item = GridCell>) -> Self {
        let mut region = Self::new();
        for cell in cells {
            region.add_cell(cell);
        }
        region
    }

    /// Insert a single cell, extending the bounding rectangle incrementally.
    pub fn add_cell(&mut self, cell: GridCell) {
        if self.cells.insert(cell) {
            match &mut self.bounds {
                Some(bounds) => bounds.grow(cell),
                None => self.bounds = Some(RegionBounds::single(cell)),
            }
        }
    }

    /// Set union with another region. The bounding rectangle becomes the
    /// union of both rectangles; an empty self adopts `other`'s verbatim.
    pub fn add_region(&mut self, other: &HeightmapRegion) {
        self.cells.extend(other.cells.iter().copied());
        self.bounds = match (self.bounds, other.bounds) {
            (Some(a), Some(b)) => Some(a.union(&b)),
            (None, b) => b,
            (a, None) => a,
        };
    }

    pub fn bounds(&self) -> Option<RegionBounds> {
        self.bounds
    }

    pub fn cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        self.cells.iter().copied()
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        self.cells.contains(&cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Level every member cell to one world height.
    ///
    /// Reads the minimal height sub-array covering the bounding rectangle,
    /// writes the converted height at every member offset, and commits the
    /// sub-array. Heights outside `[-max_height, +max_height]` are clamped
    /// and reported via [`SetHeightOutcome::Clamped`].
    pub fn set_height(&self, field: &mut HeightField, world_height: f32) -> SetHeightOutcome {
        let grid = *field.grid();
        let min = grid.origin.y;
        let max = grid.origin.y + grid.size.y;
        let applied = world_height.clamp(min, max);
        let outcome = if applied == world_height {
            SetHeightOutcome::Applied {
                height: world_height,
            }
        } else {
            SetHeightOutcome::Clamped {
                requested: world_height,
                applied,
            }
        };

        let Some(bounds) = self.bounds else {
            return outcome;
        };
        let mut patch = field.read_patch(bounds.start_x, bounds.start_z, bounds.width, bounds.height);
        let unit = world_to_unit(&grid, applied);
        for cell in self.cells() {
            patch.set_unit(cell, unit);
        }
        field.commit_patch(&patch);
        outcome
    }
}
