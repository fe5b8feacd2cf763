//! Terrain world module
//!
//! Everything about the deformable build surface: the world<->grid mapping,
//! per-tile height fields and occupancy state, rasterized cell regions,
//! incremental slope editing, placement validation, and session persistence.
//!
//! # Submodules
//!
//! - [`grid`] - World/grid coordinate mapping and spacing
//! - [`heightfield`] - Normalized per-tile height storage
//! - [`state_store`] - Per-cell build state (free / height-set / occupied)
//! - [`region`] - Cell sets with cached bounds, strip rasterization
//! - [`slope`] - Incremental height ramps with exact undo
//! - [`terrain`] - Tiles and the tile set
//! - [`placement`] - Element placement gating and rideable distance
//! - [`trail`] - The owning session struct
//! - [`save`] - .tline save/load

pub mod grid;
pub mod heightfield;
pub mod placement;
pub mod region;
pub mod save;
pub mod slope;
pub mod state_store;
pub mod terrain;
pub mod trail;

// Re-export commonly used types at the world module level
pub use grid::{GridCell, RASTER_OVERSAMPLING, TerrainGrid};
pub use heightfield::{HeightField, HeightPatch};
pub use placement::{
    Approach, ElementGeometry, LineElement, PlacementError, PlacementRules, PlacementVerdict,
    RejectionReason, footprint_rejection, rideable_distance, validate_placement,
};
pub use region::{HeightmapRegion, RegionBounds, SetHeightOutcome};
pub use save::{LineFileError, LineSaveData, SavedCell, TerrainSaveState, load_line, save_line};
pub use slope::{SlopeChange, SlopeError, SlopeState, SlopeWaypoint, WaypointSnapshot};
pub use state_store::{CellState, ElementId, OccupancyError, OccupancyGrid};
pub use terrain::{TerrainSet, TerrainTile, TileId};
pub use trail::TrailWorld;
