//! Slope Tests - Length Conservation, Undo, and Multi-Tile Ramps
//!
//! Scenario coverage for incremental slope building: waypoints consuming
//! ramp length, exact undo over the affected footprint, and ramps that cross
//! from one terrain tile into another.

use glam::Vec3;
use trail_line_engine::world::{
    CellState, ElementId, SlopeChange, TerrainGrid, TerrainSet, TerrainTile,
};

fn single_tile() -> TerrainSet {
    let mut set = TerrainSet::new();
    let grid = TerrainGrid::centered(0.0, 0.0, Vec3::new(100.0, 60.0, 100.0), 101);
    set.add_tile(TerrainTile::new(grid, 0.0));
    set
}

// ============================================================================
// Length Conservation
// ============================================================================

#[test]
fn test_consumed_length_never_exceeds_total() {
    let mut terrain = single_tile();
    let total = 25.0;
    let mut slope = SlopeChange::new(Vec3::new(10.0, 0.0, 10.0), 8.0, total, 2.0);

    let mut consumed = 0.0;
    let mut z = 10.0;
    while !slope.finished() {
        z += 7.0;
        let before = slope.remaining_length();
        slope
            .add_waypoint(&mut terrain, ElementId(0), Vec3::new(10.0, 0.0, z), 2.0)
            .expect("slope still active");
        let after = slope.remaining_length();
        assert!(
            after <= before + 1e-6,
            "remaining length increased: {before} -> {after}"
        );
        assert!(after >= 0.0, "remaining length went negative: {after}");
        consumed += before - after;
    }
    assert!(
        consumed <= total + 1e-4,
        "consumed {consumed} exceeds total length {total}"
    );
    assert!((consumed - total).abs() < 1e-4, "finished ramp must consume everything");
}

// ============================================================================
// Undo
// ============================================================================

#[test]
fn test_undo_makes_footprint_buildable_again() {
    let mut terrain = single_tile();
    let start = Vec3::new(10.0, 0.0, 10.0);
    let end = Vec3::new(10.0, 0.0, 30.0);
    let mut slope = SlopeChange::new(start, 8.0, 20.0, 3.0);
    slope
        .add_waypoint(&mut terrain, ElementId(0), end, 3.0)
        .unwrap();

    {
        let (_, tile) = terrain.tile_at(start).unwrap();
        assert!(
            !tile.is_area_free(start, end, 3.0, None),
            "ramp footprint must be blocked while the slope stands"
        );
    }

    slope.undo(&mut terrain);

    let (_, tile) = terrain.tile_at(start).unwrap();
    assert!(
        tile.is_area_free(start, end, 3.0, None),
        "footprint must be free again after undo"
    );
}

#[test]
fn test_undo_flattens_to_slope_base_height() {
    let mut terrain = single_tile();
    let start = Vec3::new(10.0, 2.0, 10.0);
    let mut slope = SlopeChange::new(start, 12.0, 20.0, 3.0);
    slope
        .add_waypoint(&mut terrain, ElementId(0), Vec3::new(10.0, 0.0, 30.0), 3.0)
        .unwrap();

    let tile_id = slope.affected_tiles().next().unwrap();
    let cells: Vec<_> = slope.affected_region(tile_id).unwrap().cells().collect();
    slope.undo(&mut terrain);

    let tile = terrain.tile(tile_id).unwrap();
    for cell in cells {
        let h = tile.heightfield().world_height_at(cell);
        assert!(
            (h - 2.0).abs() < 1e-3,
            "undo restores the slope's own base height, got {h} at ({}, {})",
            cell.x,
            cell.z
        );
    }
}

// ============================================================================
// Multi-Tile Ramps
// ============================================================================

#[test]
fn test_slope_crossing_tile_border_affects_both_tiles() {
    let mut terrain = TerrainSet::new();
    let left = TerrainGrid::centered(0.0, 0.0, Vec3::new(100.0, 60.0, 100.0), 101);
    let right = TerrainGrid::centered(100.0, 0.0, Vec3::new(100.0, 60.0, 100.0), 101);
    let left_id = terrain.add_tile(TerrainTile::new(left, 0.0));
    let right_id = terrain.add_tile(TerrainTile::new(right, 0.0));

    // Ramp runs along +X through the shared border at x = 100.
    let mut slope = SlopeChange::new(Vec3::new(90.0, 0.0, 50.0), 6.0, 20.0, 2.0);
    slope
        .add_waypoint(&mut terrain, ElementId(0), Vec3::new(110.0, 0.0, 50.0), 2.0)
        .unwrap();

    let affected: Vec<_> = slope.affected_tiles().collect();
    assert!(
        affected.contains(&left_id) && affected.contains(&right_id),
        "a border-crossing ramp must touch both tiles, got {affected:?}"
    );

    // Both sides carry HeightSet cells from the same edit.
    for id in [left_id, right_id] {
        let region = slope.affected_region(id).unwrap();
        assert!(!region.is_empty());
        let tile = terrain.tile(id).unwrap();
        for cell in region.cells() {
            assert_eq!(tile.occupancy().state_at(cell), Ok(CellState::HeightSet));
        }
    }

    // Undo clears both tiles.
    slope.undo(&mut terrain);
    for id in [left_id, right_id] {
        let tile = terrain.tile(id).unwrap();
        assert!(tile.occupancy().non_free_cells().is_empty());
    }
}

// ============================================================================
// Waypoint Snapshots
// ============================================================================

#[test]
fn test_waypoint_snapshots_record_ramp_progression() {
    let mut terrain = single_tile();
    let mut slope = SlopeChange::new(Vec3::new(10.0, 0.0, 10.0), 10.0, 20.0, 2.0);
    slope
        .add_waypoint(&mut terrain, ElementId(3), Vec3::new(10.0, 0.0, 20.0), 2.5)
        .unwrap();
    slope
        .add_waypoint(&mut terrain, ElementId(4), Vec3::new(10.0, 0.0, 35.0), 2.0)
        .unwrap();

    let waypoints = slope.waypoints();
    assert_eq!(waypoints.len(), 2);
    assert_eq!(waypoints[0].element, ElementId(3));
    assert!(!waypoints[0].snapshot.finished);
    assert!((waypoints[0].snapshot.remaining_length - 10.0).abs() < 1e-4);
    // Width sticks to the max seen so far.
    assert_eq!(waypoints[0].snapshot.width, 2.5);
    assert_eq!(waypoints[1].snapshot.width, 2.5);
    assert!(waypoints[1].snapshot.finished);
    assert_eq!(waypoints[1].snapshot.remaining_length, 0.0);
    // Ramp surface height at the halfway waypoint is half the rise.
    assert!((waypoints[0].snapshot.end_point.y - 5.0).abs() < 1e-3);
}
