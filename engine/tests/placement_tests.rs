//! Placement Tests - Building a Line End to End
//!
//! Composed scenarios: validating and building a roll-in, takeoff, and
//! landing in sequence, self-revalidation through owned cells, and the
//! rideable distance query.

use glam::Vec3;
use trail_line_engine::physics::{RiderConfig, SlopeSpan};
use trail_line_engine::world::{
    Approach, ElementGeometry, ElementId, LineElement, PlacementError, PlacementRules,
    PlacementVerdict, RejectionReason, SlopeChange, TerrainGrid, TerrainTile, TrailWorld,
    rideable_distance, validate_placement,
};

fn world() -> TrailWorld {
    let mut world = TrailWorld::new(0.0);
    let grid = TerrainGrid::centered(0.0, 0.0, Vec3::new(200.0, 60.0, 200.0), 201);
    world.terrain_mut().add_tile(TerrainTile::new(grid, 0.0));
    world
}

fn element(kind: &str, start: Vec3) -> LineElement {
    let geometry = ElementGeometry {
        start,
        end: start + Vec3::new(0.0, 0.0, 3.0),
        ride_direction: Vec3::Z,
        bottom_width: 2.0,
        height: 1.5,
    };
    match kind {
        "roll-in" => LineElement::RollIn(geometry),
        "takeoff" => LineElement::Takeoff(geometry),
        _ => LineElement::Landing(geometry),
    }
}

// ============================================================================
// Line Building Scenario
// ============================================================================

#[test]
fn test_build_line_in_sequence() {
    let mut w = world();
    let config = RiderConfig::default();
    let rules = PlacementRules::default();

    // Roll-in starts the line; no approach to gate.
    let roll_in = element("roll-in", Vec3::new(100.0, 0.0, 20.0));
    let verdict = validate_placement(&w, &config, &rules, &roll_in, None, None, &[]).unwrap();
    assert_eq!(verdict, PlacementVerdict::Accepted);
    w.build_element(roll_in).unwrap();

    // Takeoff 15 m further, approached with drop-in speed.
    let takeoff = element("takeoff", Vec3::new(100.0, 0.0, 38.0));
    let approach = Approach {
        from: Vec3::new(100.0, 0.0, 23.0),
        speed: 10.0,
    };
    let verdict =
        validate_placement(&w, &config, &rules, &takeoff, None, Some(&approach), &[]).unwrap();
    assert_eq!(verdict, PlacementVerdict::Accepted);
    w.build_element(takeoff).unwrap();
    assert!(w.has_takeoff());

    // Landing is legal now that a takeoff exists.
    let landing = element("landing", Vec3::new(100.0, 0.0, 55.0));
    let approach = Approach {
        from: Vec3::new(100.0, 0.0, 41.0),
        speed: 9.0,
    };
    let verdict =
        validate_placement(&w, &config, &rules, &landing, None, Some(&approach), &[]).unwrap();
    assert_eq!(verdict, PlacementVerdict::Accepted);
    w.build_element(landing).unwrap();
}

#[test]
fn test_landing_first_fails_fast() {
    let w = world();
    let landing = element("landing", Vec3::new(100.0, 0.0, 20.0));
    let result = validate_placement(
        &w,
        &RiderConfig::default(),
        &PlacementRules::default(),
        &landing,
        None,
        None,
        &[],
    );
    assert_eq!(result, Err(PlacementError::LandingBeforeTakeoff));
}

// ============================================================================
// Self-Revalidation
// ============================================================================

#[test]
fn test_built_element_revalidates_over_its_own_cells() {
    let mut w = world();
    let config = RiderConfig::default();
    let rules = PlacementRules::default();

    let takeoff = element("takeoff", Vec3::new(100.0, 0.0, 30.0));
    let id = w.build_element(takeoff).unwrap();

    // Re-validating in place fails anonymously but passes as the owner.
    let anonymous =
        validate_placement(&w, &config, &rules, &takeoff, None, None, &[]).unwrap();
    assert_eq!(
        anonymous,
        PlacementVerdict::Rejected(RejectionReason::AreaOccupied)
    );
    let as_owner =
        validate_placement(&w, &config, &rules, &takeoff, Some(id), None, &[]).unwrap();
    assert_eq!(as_owner, PlacementVerdict::Accepted);
}

// ============================================================================
// Slope-Gated Approach
// ============================================================================

#[test]
fn test_downhill_slope_unlocks_far_placement() {
    let mut w = world();
    let config = RiderConfig::default();
    let rules = PlacementRules {
        min_speed: 8.0,
        ..PlacementRules::default()
    };

    // Carve a ramp descending 6 m between the previous element and the spot.
    let slope_index = w.add_slope(SlopeChange::new(Vec3::new(100.0, 6.0, 30.0), 0.0, 30.0, 3.0));
    w.add_slope_waypoint(slope_index, ElementId(0), Vec3::new(100.0, 0.0, 60.0), 3.0)
        .unwrap();
    let span = SlopeSpan::new(
        w.slopes()[slope_index].start(),
        w.slopes()[slope_index].end_point(),
    );

    let candidate = element("takeoff", Vec3::new(100.0, 0.0, 68.0));
    let approach = Approach {
        from: Vec3::new(100.0, 6.0, 25.0),
        speed: 7.0,
    };

    // The footprint at z=68 is past the ramp's HeightSet cells, but the
    // approach only clears the speed gate with the descent counted.
    let with_slope = validate_placement(
        &w,
        &config,
        &rules,
        &candidate,
        None,
        Some(&approach),
        &[span],
    )
    .unwrap();
    assert_eq!(with_slope, PlacementVerdict::Accepted);

    let without_slope =
        validate_placement(&w, &config, &rules, &candidate, None, Some(&approach), &[]).unwrap();
    assert!(matches!(
        without_slope,
        PlacementVerdict::Rejected(RejectionReason::InsufficientSpeed { .. })
    ));
}

// ============================================================================
// Rideable Distance
// ============================================================================

#[test]
fn test_rideable_distance_full_route() {
    let w = world();
    let d = rideable_distance(
        w.terrain(),
        Vec3::new(100.0, 0.0, 100.0),
        Vec3::new(0.0, 0.0, 1.0),
        30.0,
        None,
    );
    assert!((d - 30.0).abs() < 1e-3);
}

#[test]
fn test_rideable_distance_blocked_by_built_element() {
    let mut w = world();
    let id = w
        .build_element(element("takeoff", Vec3::new(100.0, 0.0, 120.0)))
        .unwrap();

    let d = rideable_distance(
        w.terrain(),
        Vec3::new(100.0, 0.0, 100.0),
        Vec3::new(0.0, 0.0, 1.0),
        50.0,
        None,
    );
    assert!(
        d < 20.0,
        "takeoff footprint at z=120 must stop the ride before 20 m, got {d}"
    );

    let through = rideable_distance(
        w.terrain(),
        Vec3::new(100.0, 0.0, 100.0),
        Vec3::new(0.0, 0.0, 1.0),
        50.0,
        Some(id),
    );
    assert!((through - 50.0).abs() < 1e-3, "owner rides through, got {through}");
}

#[test]
fn test_rideable_distance_outside_terrain_is_zero() {
    let w = world();
    let d = rideable_distance(
        w.terrain(),
        Vec3::new(500.0, 0.0, 500.0),
        Vec3::Z,
        30.0,
        None,
    );
    assert_eq!(d, 0.0);
}
