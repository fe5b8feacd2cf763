//! Trail Line Engine
//!
//! Core of a buildable ride line on deformable terrain: riders travel a
//! directed path of obstacles, the ground between obstacles can be raised or
//! lowered along linear ramps, and every placement is gated by ground
//! occupancy and rider physics.
//!
//! # Modules
//!
//! - [`world`] - Terrain grid occupancy, height fields, slope editing,
//!   placement validation, and session persistence
//! - [`physics`] - Rider point-mass simulation: ground speed integration and
//!   ballistic flight trajectories
//!
//! # Example
//!
//! ```ignore
//! use glam::Vec3;
//! use trail_line_engine::world::{
//!     PlacementRules, TerrainGrid, TerrainTile, TrailWorld,
//! };
//! use trail_line_engine::physics::RiderConfig;
//!
//! // One 100 m x 100 m tile, 60 m of vertical range, all cells free.
//! let mut world = TrailWorld::new(0.0);
//! let grid = TerrainGrid::centered(0.0, 0.0, Vec3::new(100.0, 60.0, 100.0), 101);
//! world.terrain_mut().add_tile(TerrainTile::new(grid, 0.0));
//!
//! let config = RiderConfig::default();
//! let rules = PlacementRules::default();
//!
//! // Validate and build elements, carve slopes, simulate flights...
//! ```

pub mod physics;
pub mod world;

// Re-export the most commonly used types at crate level for convenience
pub use physics::{RiderConfig, SlopeSpan, Trajectory, exit_speed, simulate_flight, speed_at_position};
pub use world::{
    CellState, ElementId, GridCell, HeightmapRegion, LineElement, PlacementRules, PlacementVerdict,
    SlopeChange, TerrainGrid, TerrainTile, TrailWorld,
};
