//! Height Field Storage
//!
//! Per-tile height data backing the terrain. Heights are stored normalized to
//! `[0, 1]` of the tile's vertical range; the world-unit conversion is
//! `world_height = unit * size.y + origin.y`.
//!
//! Bulk edits go through [`HeightPatch`]: read the minimal sub-array covering
//! a region, write offsets into it, commit it back. This keeps region edits a
//! single pass over the backing store.

use glam::Vec3;

use super::grid::{GridCell, TerrainGrid};

/// Row-major normalized height samples for one terrain tile.
///
/// Access pattern: `heights[z * resolution + x]`.
#[derive(Debug, Clone)]
pub struct HeightField {
    grid: TerrainGrid,
    heights: Vec<f32>,
}

impl HeightField {
    /// Create a height field leveled at a uniform world height.
    ///
    /// The requested height is clamped into the tile's vertical range.
    pub fn flat(grid: TerrainGrid, world_height: f32) -> Self {
        let unit = world_to_unit(&grid, world_height);
        let count = (grid.resolution * grid.resolution) as usize;
        Self {
            grid,
            heights: vec![unit; count],
        }
    }

    pub fn grid(&self) -> &TerrainGrid {
        &self.grid
    }

    fn index(&self, cell: GridCell) -> usize {
        cell.z as usize * self.grid.resolution as usize + cell.x as usize
    }

    /// Normalized height at a cell. Callers pass in-range cells; the grid
    /// mapper clamps, and the occupancy store rejects, before reaching here.
    pub fn unit_at(&self, cell: GridCell) -> f32 {
        self.heights[self.index(cell)]
    }

    /// World height at a cell.
    pub fn world_height_at(&self, cell: GridCell) -> f32 {
        unit_to_world(&self.grid, self.unit_at(cell))
    }

    /// Write a single cell's height in world units, clamped into range.
    pub fn set_world_height(&mut self, cell: GridCell, world_height: f32) {
        let unit = world_to_unit(&self.grid, world_height);
        let idx = self.index(cell);
        self.heights[idx] = unit;
    }

    /// Bilinearly interpolated world height at an arbitrary world position.
    ///
    /// Positions outside the tile sample the clamped border cells.
    pub fn sample_world_height(&self, position: Vec3) -> f32 {
        let max_index = (self.grid.resolution - 1) as f32;
        let fx = ((position.x - self.grid.origin.x) / self.grid.size.x * max_index)
            .clamp(0.0, max_index);
        let fz = ((position.z - self.grid.origin.z) / self.grid.size.z * max_index)
            .clamp(0.0, max_index);

        let x0 = fx.floor() as i32;
        let z0 = fz.floor() as i32;
        let x1 = (x0 + 1).min(self.grid.resolution as i32 - 1);
        let z1 = (z0 + 1).min(self.grid.resolution as i32 - 1);
        let tx = fx - x0 as f32;
        let tz = fz - z0 as f32;

        let h00 = self.unit_at(GridCell::new(x0, z0));
        let h10 = self.unit_at(GridCell::new(x1, z0));
        let h01 = self.unit_at(GridCell::new(x0, z1));
        let h11 = self.unit_at(GridCell::new(x1, z1));

        let unit = h00 * (1.0 - tx) * (1.0 - tz)
            + h10 * tx * (1.0 - tz)
            + h01 * (1.0 - tx) * tz
            + h11 * tx * tz;
        unit_to_world(&self.grid, unit)
    }

    /// Read the sub-array covering `[start_x, start_x + width) x
    /// [start_z, start_z + height)`. Bounds are clamped to the field.
    pub fn read_patch(&self, start_x: i32, start_z: i32, width: i32, height: i32) -> HeightPatch {
        let res = self.grid.resolution as i32;
        let start_x = start_x.clamp(0, res - 1);
        let start_z = start_z.clamp(0, res - 1);
        let width = width.clamp(0, res - start_x);
        let height = height.clamp(0, res - start_z);

        let mut data = Vec::with_capacity((width * height) as usize);
        for z in start_z..start_z + height {
            for x in start_x..start_x + width {
                data.push(self.unit_at(GridCell::new(x, z)));
            }
        }
        HeightPatch {
            start_x,
            start_z,
            width,
            height,
            data,
        }
    }

    /// Write a patch back into the backing store.
    pub fn commit_patch(&mut self, patch: &HeightPatch) {
        for dz in 0..patch.height {
            for dx in 0..patch.width {
                let idx = self.index(GridCell::new(patch.start_x + dx, patch.start_z + dz));
                self.heights[idx] = patch.data[(dz * patch.width + dx) as usize];
            }
        }
    }
}

/// Convert a world height to the normalized unit range, clamped to `[0, 1]`.
pub fn world_to_unit(grid: &TerrainGrid, world_height: f32) -> f32 {
    ((world_height - grid.origin.y) / grid.size.y).clamp(0.0, 1.0)
}

/// Convert a normalized height unit to world units.
pub fn unit_to_world(grid: &TerrainGrid, unit: f32) -> f32 {
    unit * grid.size.y + grid.origin.y
}

/// A rectangular sub-array of normalized heights, detached from the field.
#[derive(Debug, Clone)]
pub struct HeightPatch {
    start_x: i32,
    start_z: i32,
    width: i32,
    height: i32,
    data: Vec<f32>,
}

impl HeightPatch {
    /// Write a normalized height at a cell, addressed in field coordinates.
    /// Cells outside the patch are ignored.
    pub fn set_unit(&mut self, cell: GridCell, unit: f32) {
        let dx = cell.x - self.start_x;
        let dz = cell.z - self.start_z;
        if dx >= 0 && dz >= 0 && dx < self.width && dz < self.height {
            self.data[(dz * self.width + dx) as usize] = unit;
        }
    }
}
