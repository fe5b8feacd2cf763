//! Placement Validation
//!
//! Gates every obstacle placement: the footprint must be free and inside the
//! terrain, the spot must sit at a rideable distance from the previous
//! element, and the rider must arrive with enough speed to survive it.
//!
//! Rejections are structured reasons with numeric context for the caller to
//! surface; programming errors (a landing placed before any takeoff exists)
//! are a separate fail-fast error, never a rejection.

use glam::Vec3;

use crate::physics::{RiderConfig, SlopeSpan, speed_at_position};

use super::grid::TerrainGrid;
use super::region::for_each_strip_sample;
use super::state_store::{CellState, ElementId};
use super::terrain::{TerrainSet, strip_corners};
use super::trail::TrailWorld;

/// Geometric fields of one line element, everything validation needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementGeometry {
    pub start: Vec3,
    pub end: Vec3,
    /// Normalized XZ direction the rider travels through the element.
    pub ride_direction: Vec3,
    /// Footprint width on the ground.
    pub bottom_width: f32,
    pub height: f32,
}

/// A line obstacle, tagged by kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineElement {
    /// Start ramp the rider drops in from.
    RollIn(ElementGeometry),
    /// Jump lip that launches the rider.
    Takeoff(ElementGeometry),
    /// Receiving ramp for a flight.
    Landing(ElementGeometry),
}

impl LineElement {
    pub fn geometry(&self) -> &ElementGeometry {
        match self {
            LineElement::RollIn(g) | LineElement::Takeoff(g) | LineElement::Landing(g) => g,
        }
    }

    pub fn is_takeoff(&self) -> bool {
        matches!(self, LineElement::Takeoff(_))
    }

    pub fn is_landing(&self) -> bool {
        matches!(self, LineElement::Landing(_))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            LineElement::RollIn(_) => "roll-in",
            LineElement::Takeoff(_) => "takeoff",
            LineElement::Landing(_) => "landing",
        }
    }
}

/// Placement constraints, configuration rather than hard-coded policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRules {
    /// Minimum XZ gap from the previous element's exit to the new start.
    pub min_distance: f32,
    /// Maximum XZ gap from the previous element's exit to the new start.
    pub max_distance: f32,
    /// Minimum arrival speed for the element to be survivable.
    pub min_speed: f32,
}

impl Default for PlacementRules {
    fn default() -> Self {
        Self {
            min_distance: 1.0,
            max_distance: 50.0,
            min_speed: 2.0,
        }
    }
}

/// Why a placement was turned down. Recoverable: the user adjusts and
/// re-issues.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RejectionReason {
    /// Part of the footprint lies outside every terrain tile.
    OutOfBounds,
    /// The footprint overlaps height-edited or occupied ground.
    AreaOccupied,
    TooClose { distance: f32, min: f32 },
    TooFar { distance: f32, max: f32 },
    InsufficientSpeed { available: f32, required: f32 },
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectionReason::OutOfBounds => write!(f, "placement outside terrain bounds"),
            RejectionReason::AreaOccupied => write!(f, "area already occupied or height-edited"),
            RejectionReason::TooClose { distance, min } => {
                write!(f, "placement too close: {distance:.2} m < {min:.2} m")
            }
            RejectionReason::TooFar { distance, max } => {
                write!(f, "placement too far: {distance:.2} m > {max:.2} m")
            }
            RejectionReason::InsufficientSpeed {
                available,
                required,
            } => write!(
                f,
                "cannot be reached: {available:.2} m/s available, {required:.2} m/s required"
            ),
        }
    }
}

/// Result of a placement check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementVerdict {
    Accepted,
    Rejected(RejectionReason),
}

impl PlacementVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, PlacementVerdict::Accepted)
    }
}

/// Programming errors in the placement request itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    /// A landing only makes sense after a takeoff exists in the line.
    LandingBeforeTakeoff,
}

impl std::fmt::Display for PlacementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlacementError::LandingBeforeTakeoff => {
                write!(f, "cannot build a landing before any takeoff exists")
            }
        }
    }
}

impl std::error::Error for PlacementError {}

/// Where the rider comes from when approaching the candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Approach {
    /// Exit point of the previous element.
    pub from: Vec3,
    /// Rider speed at that exit point.
    pub speed: f32,
}

/// Check a candidate element against the world.
///
/// `allowed_owner` lets an already-built element see through its own
/// occupied cells while being re-validated during editing. `approach` is
/// `None` for line-starting elements, which skips the distance and speed
/// gates. `slopes` are the ramp spans the approach route may cross.
pub fn validate_placement(
    world: &TrailWorld,
    config: &RiderConfig,
    rules: &PlacementRules,
    candidate: &LineElement,
    allowed_owner: Option<ElementId>,
    approach: Option<&Approach>,
    slopes: &[SlopeSpan],
) -> Result<PlacementVerdict, PlacementError> {
    if candidate.is_landing() && !world.has_takeoff() {
        return Err(PlacementError::LandingBeforeTakeoff);
    }

    let geo = candidate.geometry();
    if let Some(reason) = footprint_rejection(
        world.terrain(),
        geo.start,
        geo.end,
        geo.bottom_width,
        allowed_owner,
    ) {
        return Ok(PlacementVerdict::Rejected(reason));
    }

    if let Some(approach) = approach {
        let distance = Vec3::new(
            geo.start.x - approach.from.x,
            0.0,
            geo.start.z - approach.from.z,
        )
        .length();
        if distance < rules.min_distance {
            return Ok(PlacementVerdict::Rejected(RejectionReason::TooClose {
                distance,
                min: rules.min_distance,
            }));
        }
        if distance > rules.max_distance {
            return Ok(PlacementVerdict::Rejected(RejectionReason::TooFar {
                distance,
                max: rules.max_distance,
            }));
        }

        let available = speed_at_position(config, approach.speed, approach.from, geo.start, slopes);
        if available < rules.min_speed {
            return Ok(PlacementVerdict::Rejected(
                RejectionReason::InsufficientSpeed {
                    available,
                    required: rules.min_speed,
                },
            ));
        }
    }

    Ok(PlacementVerdict::Accepted)
}

/// Why a footprint strip cannot be built on, checked across every tile it
/// touches, or `None` when the area is free.
///
/// The multi-tile form of the per-tile area check: all four corners must
/// land on some tile, and no sampled cell may block the requester.
pub fn footprint_rejection(
    terrain: &TerrainSet,
    start: Vec3,
    end: Vec3,
    width: f32,
    allowed_owner: Option<ElementId>,
) -> Option<RejectionReason> {
    if !strip_corners(start, end, width)
        .iter()
        .all(|&corner| terrain.tile_at(corner).is_some())
    {
        return Some(RejectionReason::OutOfBounds);
    }
    let spacing = terrain
        .iter()
        .map(|(_, tile)| tile.grid().spacing())
        .fold(f32::INFINITY, f32::min);
    if !spacing.is_finite() {
        return Some(RejectionReason::OutOfBounds);
    }

    let mut outside = false;
    let mut blocked = false;
    for_each_strip_sample(start, end, width, spacing, |_, _, point| {
        match terrain.tile_at(point) {
            None => outside = true,
            Some((_, tile)) => {
                let cell = tile.grid().world_to_grid(point);
                if tile.occupancy().blocks_building(cell, allowed_owner) {
                    blocked = true;
                }
            }
        }
    });
    if outside {
        Some(RejectionReason::OutOfBounds)
    } else if blocked {
        Some(RejectionReason::AreaOccupied)
    } else {
        None
    }
}

/// Longest unobstructed straight-line ride from `from` along `direction`,
/// capped by `max_distance` and by the terrain boundary.
///
/// Steps at grid spacing; a cell occupied by anyone other than
/// `allowed_owner` stops the ride. Height-edited ground is still rideable.
/// Leaving every tile caps the result at the exact boundary intersection.
pub fn rideable_distance(
    terrain: &TerrainSet,
    from: Vec3,
    direction: Vec3,
    max_distance: f32,
    allowed_owner: Option<ElementId>,
) -> f32 {
    let dir = Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero();
    if dir == Vec3::ZERO {
        return 0.0;
    }
    let Some((_, start_tile)) = terrain.tile_at(from) else {
        return 0.0;
    };
    let spacing = start_tile.grid().spacing();

    let mut traveled = 0.0;
    let mut boundary_cap = boundary_exit_distance(start_tile.grid(), from, dir);
    loop {
        let next = traveled + spacing;
        if next > max_distance {
            return max_distance.min(boundary_cap);
        }
        let point = from + dir * next;
        match terrain.tile_at(point) {
            None => return boundary_cap.min(max_distance),
            Some((_, tile)) => {
                // Crossing into another tile extends the boundary cap.
                boundary_cap = boundary_cap.max(next + boundary_exit_distance(tile.grid(), point, dir));
                let cell = tile.grid().world_to_grid(point);
                let blocked = match tile.occupancy().state_at(cell) {
                    Ok(CellState::Occupied(owner)) => Some(owner) != allowed_owner,
                    _ => false,
                };
                if blocked {
                    return traveled;
                }
            }
        }
        traveled = next;
    }
}

/// Distance along `dir` at which a ray starting inside a tile leaves its XZ
/// bounds (slab method on the two horizontal axes).
fn boundary_exit_distance(grid: &TerrainGrid, from: Vec3, dir: Vec3) -> f32 {
    let exit_axis = |origin: f32, size: f32, pos: f32, d: f32| -> f32 {
        if d.abs() < 1e-10 {
            f32::INFINITY
        } else {
            let t1 = (origin - pos) / d;
            let t2 = (origin + size - pos) / d;
            t1.max(t2)
        }
    };
    let tx = exit_axis(grid.origin.x, grid.size.x, from.x, dir.x);
    let tz = exit_axis(grid.origin.z, grid.size.z, from.z, dir.z);
    tx.min(tz).max(0.0)
}
