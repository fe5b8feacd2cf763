//! Grid Coordinate Mapping
//!
//! Bidirectional mapping between world-space positions and integer height
//! field cells, plus the sampling spacing used when rasterizing ride paths
//! onto the grid.
//!
//! ## Units
//! 1 unit = 1 meter (SI units). A terrain tile spans `origin .. origin + size`
//! on the X and Z axes and holds `resolution x resolution` height samples.

use glam::Vec3;

/// Oversampling factor applied to the raw grid spacing when stepping along a
/// path. Thin strips sampled at the raw spacing can skip cells diagonally;
/// sampling five times denser guarantees every crossed cell is visited.
pub const RASTER_OVERSAMPLING: f32 = 5.0;

/// One discrete sample point of the height field, addressed by integer
/// `(x, z)` within `[0, resolution)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GridCell {
    pub x: i32,
    pub z: i32,
}

impl GridCell {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

/// Geometric configuration of one terrain tile: world origin, world size,
/// and height field resolution.
///
/// Pure mapping, no state. Height data lives in
/// [`HeightField`](crate::world::heightfield::HeightField).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TerrainGrid {
    /// World position of the tile's minimum corner. `origin.y` is the bottom
    /// of the vertical height range.
    pub origin: Vec3,
    /// World extent of the tile. `size.y` is the full vertical height range.
    pub size: Vec3,
    /// Number of height samples per horizontal axis.
    pub resolution: u32,
}

impl TerrainGrid {
    /// Create a tile grid whose vertical range is centered on zero, so world
    /// heights span `[-size.y / 2, +size.y / 2]`.
    pub fn centered(origin_x: f32, origin_z: f32, size: Vec3, resolution: u32) -> Self {
        Self {
            origin: Vec3::new(origin_x, -size.y * 0.5, origin_z),
            size,
            resolution,
        }
    }

    /// Convert a world position to the grid cell containing it.
    ///
    /// The position is normalized against the tile extent and floored. Results
    /// are clamped into `[0, resolution - 1]` so callers stay simple; the
    /// occupancy store is the layer that rejects out-of-range cells instead.
    pub fn world_to_grid(&self, position: Vec3) -> GridCell {
        let max_index = (self.resolution - 1) as f32;
        let nx = (position.x - self.origin.x) / self.size.x;
        let nz = (position.z - self.origin.z) / self.size.z;
        GridCell {
            x: ((nx * max_index).floor() as i32).clamp(0, self.resolution as i32 - 1),
            z: ((nz * max_index).floor() as i32).clamp(0, self.resolution as i32 - 1),
        }
    }

    /// Convert a grid cell back to its world position.
    ///
    /// The vertical component is not reconstructed here (returns `y = 0`);
    /// height is looked up separately from the height field.
    pub fn grid_to_world(&self, cell: GridCell) -> Vec3 {
        let max_index = (self.resolution - 1) as f32;
        Vec3::new(
            self.origin.x + (cell.x as f32 / max_index) * self.size.x,
            0.0,
            self.origin.z + (cell.z as f32 / max_index) * self.size.z,
        )
    }

    /// Sampling step in world units for rasterizing paths onto this grid.
    ///
    /// `min(size.x, size.z) / (resolution - 1)` divided by
    /// [`RASTER_OVERSAMPLING`].
    pub fn spacing(&self) -> f32 {
        let cell_size = self.size.x.min(self.size.z) / (self.resolution - 1) as f32;
        cell_size / RASTER_OVERSAMPLING
    }

    /// Whether a world position lies horizontally inside this tile.
    pub fn contains_world(&self, position: Vec3) -> bool {
        position.x >= self.origin.x
            && position.x <= self.origin.x + self.size.x
            && position.z >= self.origin.z
            && position.z <= self.origin.z + self.size.z
    }

    /// Whether a cell index lies inside `[0, resolution)^2`.
    pub fn contains_cell(&self, cell: GridCell) -> bool {
        cell.x >= 0
            && cell.z >= 0
            && cell.x < self.resolution as i32
            && cell.z < self.resolution as i32
    }

    /// Half the vertical extent. World heights are legal in
    /// `[-max_height, +max_height]` for a [`centered`](Self::centered) grid.
    pub fn max_height(&self) -> f32 {
        self.size.y * 0.5
    }
}
