//! Grid Tests - Coordinate Mapping, Occupancy, and Region Height Writes
//!
//! Scenario coverage for the world<->grid mapping, the occupancy store's
//! exclusivity guarantees, and the area-free check with owner exceptions.

use glam::Vec3;
use trail_line_engine::world::{
    CellState, ElementId, GridCell, HeightmapRegion, TerrainGrid, TerrainTile,
};

fn tile() -> TerrainTile {
    // Tile spans -50..+50 on both axes so strips near the world origin keep
    // all four corners in bounds.
    let grid = TerrainGrid::centered(-50.0, -50.0, Vec3::new(100.0, 60.0, 100.0), 101);
    TerrainTile::new(grid, 0.0)
}

// ============================================================================
// Round Trip
// ============================================================================

#[test]
fn test_grid_round_trip_stays_within_one_spacing() {
    let t = tile();
    let grid = *t.grid();
    let cell_size = grid.size.x / (grid.resolution - 1) as f32;
    for &(x, z) in &[
        (-49.9, -49.9),
        (-0.5, 0.5),
        (0.0, 0.0),
        (17.3, -42.8),
        (49.9, 49.9),
    ] {
        let p = Vec3::new(x, 0.0, z);
        let back = grid.grid_to_world(grid.world_to_grid(p));
        assert!(
            (back.x - p.x).abs() <= cell_size,
            "x drift at ({x}, {z}): {} vs {}",
            back.x,
            p.x
        );
        assert!(
            (back.z - p.z).abs() <= cell_size,
            "z drift at ({x}, {z}): {} vs {}",
            back.z,
            p.z
        );
    }
}

// ============================================================================
// Occupancy Exclusivity
// ============================================================================

#[test]
fn test_marked_cells_never_report_free() {
    let mut t = tile();
    let region = HeightmapRegion::from_strip(
        t.grid(),
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 10.0),
        2.0,
    );
    let cells: Vec<GridCell> = region.cells().collect();
    t.occupancy_mut()
        .mark_as(CellState::Occupied(ElementId(1)), cells.iter().copied());

    for cell in &cells {
        let state = t.occupancy().state_at(*cell).expect("cell in range");
        assert_ne!(
            state,
            CellState::Free,
            "cell ({}, {}) still free after mark_as(Occupied)",
            cell.x,
            cell.z
        );
    }
}

// ============================================================================
// Area Check Scenario
// ============================================================================

#[test]
fn test_area_free_owner_exception_scenario() {
    let mut t = tile();
    let start = Vec3::new(0.0, 0.0, 0.0);
    let end = Vec3::new(0.0, 0.0, 10.0);
    let owner_a = ElementId(0);

    // One cell in the middle of the strip belongs to element A.
    let mid_cell = t.grid().world_to_grid(Vec3::new(0.0, 0.0, 5.0));
    t.occupancy_mut()
        .mark_as(CellState::Occupied(owner_a), [mid_cell]);

    assert!(
        t.is_area_free(start, end, 2.0, Some(owner_a)),
        "element A must see through its own cell"
    );
    assert!(
        !t.is_area_free(start, end, 2.0, None),
        "anonymous check must treat A's cell as blocked"
    );
    assert!(
        !t.is_area_free(start, end, 2.0, Some(ElementId(5))),
        "another element must treat A's cell as blocked"
    );
}

// ============================================================================
// Clamped Height Writes
// ============================================================================

#[test]
fn test_set_height_above_max_clamps_with_warning() {
    let mut t = tile();
    let max = t.grid().max_height();
    let region = HeightmapRegion::from_strip(
        t.grid(),
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(5.0, 0.0, 0.0),
        1.0,
    );

    let outcome = region.set_height(t.heightfield_mut(), max + 5.0);
    assert!(outcome.was_clamped(), "over-range height must warn");
    assert_eq!(outcome.applied(), max);

    for cell in region.cells() {
        let stored = t.heightfield().world_height_at(cell);
        assert!(
            (stored - max).abs() < 1e-3,
            "cell ({}, {}) stored {stored}, expected clamped {max}",
            cell.x,
            cell.z
        );
    }
}

#[test]
fn test_set_height_in_range_is_plain_success() {
    let mut t = tile();
    let region = HeightmapRegion::from_strip(
        t.grid(),
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(5.0, 0.0, 0.0),
        1.0,
    );
    let outcome = region.set_height(t.heightfield_mut(), 3.0);
    assert!(!outcome.was_clamped());
    assert_eq!(outcome.applied(), 3.0);
}
