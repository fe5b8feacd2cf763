//! Terrain Tiles
//!
//! Each tile owns its own height field and occupancy grid; a [`TerrainSet`]
//! maps tile identifiers to tiles and resolves which tile contains a world
//! position. Multi-tile terrains are first-class: a ride path may cross from
//! one tile into another mid-strip.

use std::collections::HashMap;

use glam::Vec3;

use super::grid::TerrainGrid;
use super::heightfield::HeightField;
use super::region::HeightmapRegion;
use super::state_store::{ElementId, OccupancyGrid};

/// Identifier of one terrain tile within a [`TerrainSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TileId(pub u32);

/// One terrain tile: a height field plus the occupancy state of its cells.
#[derive(Debug, Clone)]
pub struct TerrainTile {
    heightfield: HeightField,
    occupancy: OccupancyGrid,
}

impl TerrainTile {
    /// Create a tile leveled at `base_height` with all cells free.
    pub fn new(grid: TerrainGrid, base_height: f32) -> Self {
        Self {
            heightfield: HeightField::flat(grid, base_height),
            occupancy: OccupancyGrid::new(grid.resolution),
        }
    }

    pub fn grid(&self) -> &TerrainGrid {
        self.heightfield.grid()
    }

    pub fn heightfield(&self) -> &HeightField {
        &self.heightfield
    }

    pub fn heightfield_mut(&mut self) -> &mut HeightField {
        &mut self.heightfield
    }

    pub fn occupancy(&self) -> &OccupancyGrid {
        &self.occupancy
    }

    pub fn occupancy_mut(&mut self) -> &mut OccupancyGrid {
        &mut self.occupancy
    }

    /// Whether the strip from `start` to `end` of the given width can be
    /// built on.
    ///
    /// All four strip corners must lie inside the tile's world bounds, and no
    /// rasterized cell may be height-edited or occupied by anyone other than
    /// `allowed_owner`.
    pub fn is_area_free(
        &self,
        start: Vec3,
        end: Vec3,
        width: f32,
        allowed_owner: Option<ElementId>,
    ) -> bool {
        let grid = *self.grid();
        if !strip_corners(start, end, width)
            .iter()
            .all(|&corner| grid.contains_world(corner))
        {
            return false;
        }
        let region = HeightmapRegion::from_strip(&grid, start, end, width);
        region
            .cells()
            .all(|cell| !self.occupancy.blocks_building(cell, allowed_owner))
    }
}

/// The four world-space corners of a strip between `start` and `end` of the
/// given total width.
pub fn strip_corners(start: Vec3, end: Vec3, width: f32) -> [Vec3; 4] {
    let delta = Vec3::new(end.x - start.x, 0.0, end.z - start.z);
    let dir = delta.normalize_or_zero();
    let dir = if dir == Vec3::ZERO { Vec3::X } else { dir };
    let half = Vec3::new(-dir.z, 0.0, dir.x) * (width * 0.5);
    [start + half, start - half, end + half, end - half]
}

/// All terrain tiles of a session, keyed by [`TileId`].
#[derive(Debug, Default)]
pub struct TerrainSet {
    tiles: HashMap<TileId, TerrainTile>,
    next_id: u32,
}

impl TerrainSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tile(&mut self, tile: TerrainTile) -> TileId {
        let id = TileId(self.next_id);
        self.next_id += 1;
        self.tiles.insert(id, tile);
        id
    }

    pub fn tile(&self, id: TileId) -> Option<&TerrainTile> {
        self.tiles.get(&id)
    }

    pub fn tile_mut(&mut self, id: TileId) -> Option<&mut TerrainTile> {
        self.tiles.get_mut(&id)
    }

    /// Tile containing a world position, if any.
    pub fn tile_at(&self, position: Vec3) -> Option<(TileId, &TerrainTile)> {
        self.tiles
            .iter()
            .find(|(_, tile)| tile.grid().contains_world(position))
            .map(|(&id, tile)| (id, tile))
    }

    pub fn tile_at_mut(&mut self, position: Vec3) -> Option<(TileId, &mut TerrainTile)> {
        self.tiles
            .iter_mut()
            .find(|(_, tile)| tile.grid().contains_world(position))
            .map(|(&id, tile)| (id, tile))
    }

    /// Interpolated terrain height under a world position, if a tile
    /// contains it.
    pub fn sample_height(&self, position: Vec3) -> Option<f32> {
        self.tile_at(position)
            .map(|(_, tile)| tile.heightfield().sample_world_height(position))
    }

    pub fn iter(&self) -> impl Iterator<Item = (TileId, &TerrainTile)> {
        self.tiles.iter().map(|(&id, tile)| (id, tile))
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
