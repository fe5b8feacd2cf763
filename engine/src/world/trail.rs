//! Trail World
//!
//! Explicit owner of one editing session: the terrain tiles, the built line
//! elements, and the active slope changes. Everything the original engine
//! kept in scene singletons lives here and is passed by reference; there are
//! no hidden globals and no notification side channels, all effects are
//! return values.

use glam::Vec3;

use super::placement::{LineElement, RejectionReason, footprint_rejection};
use super::region::for_each_strip_sample;
use super::save::{LineSaveData, SavedCell, TerrainSaveState};
use super::slope::{SlopeChange, SlopeError};
use super::state_store::{CellState, ElementId};
use super::terrain::TerrainSet;

/// One ride line editing session.
#[derive(Debug, Default)]
pub struct TrailWorld {
    terrain: TerrainSet,
    /// Built elements by id; destroyed slots stay `None` so ids in occupancy
    /// tags and waypoint references stay stable.
    elements: Vec<Option<LineElement>>,
    slopes: Vec<SlopeChange>,
    /// Ground level assumed outside every tile, and the default level new
    /// tiles are created at.
    flat_height: f32,
}

impl TrailWorld {
    pub fn new(flat_height: f32) -> Self {
        Self {
            flat_height,
            ..Self::default()
        }
    }

    pub fn terrain(&self) -> &TerrainSet {
        &self.terrain
    }

    pub fn terrain_mut(&mut self) -> &mut TerrainSet {
        &mut self.terrain
    }

    pub fn flat_height(&self) -> f32 {
        self.flat_height
    }

    /// Terrain height under a position, falling back to the session's flat
    /// level outside every tile.
    pub fn sample_height(&self, position: Vec3) -> f32 {
        self.terrain
            .sample_height(position)
            .unwrap_or(self.flat_height)
    }

    // ------------------------------------------------------------------
    // Elements
    // ------------------------------------------------------------------

    pub fn element(&self, id: ElementId) -> Option<&LineElement> {
        self.elements.get(id.0 as usize).and_then(|e| e.as_ref())
    }

    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &LineElement)> {
        self.elements
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (ElementId(i as u32), e)))
    }

    pub fn has_takeoff(&self) -> bool {
        self.elements().any(|(_, e)| e.is_takeoff())
    }

    /// Finalize an element: claim its footprint cells as occupied.
    ///
    /// The caller is expected to have validated the placement; this re-checks
    /// only the footprint so a stale verdict cannot double-claim ground.
    pub fn build_element(&mut self, element: LineElement) -> Result<ElementId, RejectionReason> {
        let geo = *element.geometry();
        if let Some(reason) = footprint_rejection(
            &self.terrain,
            geo.start,
            geo.end,
            geo.bottom_width,
            None,
        ) {
            return Err(reason);
        }

        let id = ElementId(self.elements.len() as u32);
        self.elements.push(Some(element));
        mark_footprint(
            &mut self.terrain,
            geo.start,
            geo.end,
            geo.bottom_width,
            CellState::Occupied(id),
        );
        Ok(id)
    }

    /// Destroy a built element, releasing its footprint back to free ground.
    /// Returns whether the id referred to a live element.
    pub fn destroy_element(&mut self, id: ElementId) -> bool {
        let Some(slot) = self.elements.get_mut(id.0 as usize) else {
            return false;
        };
        let Some(element) = slot.take() else {
            return false;
        };
        let geo = element.geometry();
        mark_footprint(
            &mut self.terrain,
            geo.start,
            geo.end,
            geo.bottom_width,
            CellState::Free,
        );
        true
    }

    // ------------------------------------------------------------------
    // Slopes
    // ------------------------------------------------------------------

    pub fn add_slope(&mut self, slope: SlopeChange) -> usize {
        self.slopes.push(slope);
        self.slopes.len() - 1
    }

    pub fn slopes(&self) -> &[SlopeChange] {
        &self.slopes
    }

    /// Forward a waypoint to a slope, splitting the borrow so the slope can
    /// write through the terrain set it lives next to.
    pub fn add_slope_waypoint(
        &mut self,
        slope_index: usize,
        element: ElementId,
        end_position: Vec3,
        width: f32,
    ) -> Result<bool, SlopeError> {
        let slope = self
            .slopes
            .get_mut(slope_index)
            .ok_or(SlopeError::UnknownSlope { index: slope_index })?;
        slope.add_waypoint(&mut self.terrain, element, end_position, width)
    }

    /// Undo a slope's edits and remove it from the session.
    pub fn remove_slope(&mut self, slope_index: usize) -> Result<(), SlopeError> {
        if slope_index >= self.slopes.len() {
            return Err(SlopeError::UnknownSlope { index: slope_index });
        }
        let mut slope = self.slopes.remove(slope_index);
        slope.undo(&mut self.terrain);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Snapshot the session into its persisted shape: flat height level,
    /// slope states with waypoint snapshots, and the sparse non-free cells.
    pub fn capture_save(&self) -> LineSaveData {
        let mut cells = Vec::new();
        for (tile_id, tile) in self.terrain.iter() {
            for (cell, state) in tile.occupancy().non_free_cells() {
                cells.push(SavedCell {
                    tile: tile_id,
                    cell,
                    state,
                });
            }
        }
        // Tile iteration order is map order; sort for a stable file.
        cells.sort_by_key(|c| (c.tile.0, c.cell.z, c.cell.x));

        LineSaveData {
            terrain: TerrainSaveState {
                flat_height: self.flat_height,
                cells,
            },
            slopes: self.slopes.iter().map(|s| s.state().clone()).collect(),
        }
    }

    /// Re-apply a saved session onto already-configured tiles: cell states
    /// are marked back and slopes are rebuilt from their states. Saved cells
    /// referring to tiles this session does not have are skipped.
    pub fn restore_save(&mut self, data: &LineSaveData) {
        self.flat_height = data.terrain.flat_height;
        for saved in &data.terrain.cells {
            if let Some(tile) = self.terrain.tile_mut(saved.tile) {
                tile.occupancy_mut().mark_as(saved.state, [saved.cell]);
            }
        }
        self.slopes = data
            .slopes
            .iter()
            .cloned()
            .map(SlopeChange::from_state)
            .collect();
    }
}

/// Mark every cell of a footprint strip across all tiles it touches.
fn mark_footprint(terrain: &mut TerrainSet, start: Vec3, end: Vec3, width: f32, state: CellState) {
    let spacing = terrain
        .iter()
        .map(|(_, tile)| tile.grid().spacing())
        .fold(f32::INFINITY, f32::min);
    if !spacing.is_finite() {
        return;
    }
    for_each_strip_sample(start, end, width, spacing, |_, _, point| {
        if let Some((_, tile)) = terrain.tile_at_mut(point) {
            let cell = tile.grid().world_to_grid(point);
            tile.occupancy_mut().mark_as(state, [cell]);
        }
    });
}
