//! Slope Changes
//!
//! A slope change is a user-authored linear height ramp between two world
//! heights over a fixed length, built incrementally as the ride path crosses
//! it: each confirmed obstacle placement ("waypoint") consumes length from
//! the ramp and levels the strip of terrain underneath it to the ramp's
//! interpolated height.
//!
//! The ramp is linear in height over its XZ-projected length. Every cell a
//! waypoint touches is recorded per terrain tile so the whole edit can be
//! undone exactly, and every waypoint stores a snapshot of the ramp state
//! after it was applied so a saved line can be replayed.

use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::grid::GridCell;
use super::region::{HeightmapRegion, for_each_strip_sample};
use super::state_store::{CellState, ElementId};
use super::terrain::{TerrainSet, TileId};

/// Errors from slope editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlopeError {
    /// The ramp has consumed its full length; no further waypoints accepted.
    AlreadyFinished,
    /// No slope exists at the given session index.
    UnknownSlope { index: usize },
}

impl std::fmt::Display for SlopeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlopeError::AlreadyFinished => write!(f, "slope change is already finished"),
            SlopeError::UnknownSlope { index } => write!(f, "no slope change at index {index}"),
        }
    }
}

impl std::error::Error for SlopeError {}

/// Ramp state captured after a waypoint was applied, for replay and undo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaypointSnapshot {
    pub finished: bool,
    pub remaining_length: f32,
    pub width: f32,
    /// World position of the ramp segment end, with the ramp surface height
    /// in `y`.
    pub end_point: Vec3,
    /// Normalized XZ travel direction of the segment.
    pub last_ride_direction: Vec3,
}

/// One confirmed waypoint: the element that consumed ramp length, plus the
/// resulting ramp state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlopeWaypoint {
    pub element: ElementId,
    pub snapshot: WaypointSnapshot,
}

/// The persisted shape of a slope change. Affected-cell sets are runtime
/// state rebuilt by replaying waypoints, not part of the save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlopeState {
    /// Ramp start position; `start.y` is the ramp's base height, which is
    /// also what [`SlopeChange::undo`] restores.
    pub start: Vec3,
    /// World height the ramp reaches after its full length.
    pub end_height: f32,
    /// Total XZ-projected length of the ramp.
    pub length: f32,
    /// Length not yet consumed by waypoints. Never negative.
    pub remaining_length: f32,
    /// Current ramp bottom width (the max of all widths seen so far).
    pub width: f32,
    pub finished: bool,
    pub waypoints: Vec<SlopeWaypoint>,
}

/// An editable terrain ramp being built incrementally.
///
/// State machine: accepting waypoints while `remaining_length > 0`, then
/// finished, terminal. [`add_waypoint`](Self::add_waypoint) on a finished
/// slope is a fail-fast error.
#[derive(Debug, Clone)]
pub struct SlopeChange {
    state: SlopeState,
    affected: HashMap<TileId, HeightmapRegion>,
}

impl SlopeChange {
    pub fn new(start: Vec3, end_height: f32, length: f32, width: f32) -> Self {
        Self {
            state: SlopeState {
                start,
                end_height,
                length,
                remaining_length: length,
                width,
                finished: false,
                waypoints: Vec::new(),
            },
            affected: HashMap::new(),
        }
    }

    /// Rebuild a slope from its persisted state. Affected-cell sets start
    /// empty; they refill as editing resumes.
    pub fn from_state(state: SlopeState) -> Self {
        Self {
            state,
            affected: HashMap::new(),
        }
    }

    pub fn state(&self) -> &SlopeState {
        &self.state
    }

    pub fn start(&self) -> Vec3 {
        self.state.start
    }

    pub fn start_height(&self) -> f32 {
        self.state.start.y
    }

    pub fn end_height(&self) -> f32 {
        self.state.end_height
    }

    pub fn length(&self) -> f32 {
        self.state.length
    }

    pub fn remaining_length(&self) -> f32 {
        self.state.remaining_length
    }

    pub fn width(&self) -> f32 {
        self.state.width
    }

    pub fn finished(&self) -> bool {
        self.state.finished
    }

    pub fn waypoints(&self) -> &[SlopeWaypoint] {
        &self.state.waypoints
    }

    /// Current end of the built ramp: the last waypoint's end point, or the
    /// ramp start if nothing has been built yet.
    pub fn end_point(&self) -> Vec3 {
        self.state
            .waypoints
            .last()
            .map(|w| w.snapshot.end_point)
            .unwrap_or(self.state.start)
    }

    /// Cells this slope has written on a given tile.
    pub fn affected_region(&self, tile: TileId) -> Option<&HeightmapRegion> {
        self.affected.get(&tile)
    }

    pub fn affected_tiles(&self) -> impl Iterator<Item = TileId> + '_ {
        self.affected.keys().copied()
    }

    /// Ramp surface height after `progress` meters of XZ travel from the
    /// start, linearly interpolated over the total length.
    fn height_at_progress(&self, progress: f32) -> f32 {
        if self.state.length <= f32::EPSILON {
            return self.state.end_height;
        }
        let t = (progress / self.state.length).clamp(0.0, 1.0);
        self.state.start.y + (self.state.end_height - self.state.start.y) * t
    }

    /// Consume ramp length up to `end_position` and level the terrain strip
    /// underneath to the interpolated ramp heights.
    ///
    /// The strip width is the max of the ramp's current width and
    /// `waypoint_width`. A waypoint whose distance meets or exceeds the
    /// remaining length is clamped to the remaining length and finishes the
    /// ramp. Returns whether the ramp is now finished.
    pub fn add_waypoint(
        &mut self,
        terrain: &mut TerrainSet,
        element: ElementId,
        end_position: Vec3,
        waypoint_width: f32,
    ) -> Result<bool, SlopeError> {
        if self.state.finished {
            return Err(SlopeError::AlreadyFinished);
        }

        let segment_start = self.end_point();
        let delta = Vec3::new(
            end_position.x - segment_start.x,
            0.0,
            end_position.z - segment_start.z,
        );
        let distance = delta.length();
        let dir = if distance > f32::EPSILON {
            delta / distance
        } else {
            Vec3::X
        };

        let (distance_to_modify, finished) = if distance >= self.state.remaining_length {
            (self.state.remaining_length, true)
        } else {
            (distance, false)
        };
        let segment_end = segment_start + dir * distance_to_modify;

        let progress_before = self.state.length - self.state.remaining_length;
        let current_height = self.height_at_progress(progress_before);
        let waypoint_height = self.height_at_progress(progress_before + distance_to_modify);

        let current_width = self.state.width.max(waypoint_width);
        self.state.width = current_width;

        self.write_ramp_strip(
            terrain,
            segment_start,
            segment_end,
            current_width,
            current_height,
            waypoint_height,
        );

        self.state.remaining_length = (self.state.remaining_length - distance_to_modify).max(0.0);
        self.state.finished = finished || self.state.remaining_length <= 0.0;

        self.state.waypoints.push(SlopeWaypoint {
            element,
            snapshot: WaypointSnapshot {
                finished: self.state.finished,
                remaining_length: self.state.remaining_length,
                width: current_width,
                end_point: Vec3::new(segment_end.x, waypoint_height, segment_end.z),
                last_ride_direction: dir,
            },
        });

        Ok(self.state.finished)
    }

    /// Rasterize one ramp segment into the height fields it crosses, with
    /// row heights interpolated `start_height -> end_height` along the
    /// segment, and mark every written cell `HeightSet`.
    fn write_ramp_strip(
        &mut self,
        terrain: &mut TerrainSet,
        segment_start: Vec3,
        segment_end: Vec3,
        width: f32,
        start_height: f32,
        end_height: f32,
    ) {
        // Spacing comes from the densest tile the strip touches so no tile
        // skips cells.
        let spacing = terrain
            .iter()
            .map(|(_, tile)| tile.grid().spacing())
            .fold(f32::INFINITY, f32::min);
        if !spacing.is_finite() {
            return;
        }

        let mut written: HashMap<TileId, Vec<GridCell>> = HashMap::new();
        for_each_strip_sample(segment_start, segment_end, width, spacing, |row, rows, point| {
            let t = if rows <= 1 {
                1.0
            } else {
                row as f32 / (rows - 1) as f32
            };
            let row_height = start_height + (end_height - start_height) * t;
            if let Some((tile_id, tile)) = terrain.tile_at_mut(point) {
                let cell = tile.grid().world_to_grid(point);
                tile.heightfield_mut().set_world_height(cell, row_height);
                written.entry(tile_id).or_default().push(cell);
            }
        });

        for (tile_id, cells) in written {
            if let Some(tile) = terrain.tile_mut(tile_id) {
                tile.occupancy_mut()
                    .mark_as(CellState::HeightSet, cells.iter().copied());
            }
            let region = self.affected.entry(tile_id).or_default();
            for cell in cells {
                region.add_cell(cell);
            }
        }
    }

    /// Flatten every affected cell back to the ramp's own start height and
    /// release the cells to `Free`, then reset the ramp to its initial state.
    ///
    /// This restores the slope's base height, not the pre-slope terrain
    /// height: it is only exact when the ramp was built on ground that was
    /// already flat at `start.y`. Known limitation, kept as-is.
    pub fn undo(&mut self, terrain: &mut TerrainSet) {
        for (tile_id, region) in self.affected.drain() {
            if let Some(tile) = terrain.tile_mut(tile_id) {
                region.set_height(tile.heightfield_mut(), self.state.start.y);
                tile.occupancy_mut().unmark(region.cells());
            }
        }
        self.state.remaining_length = self.state.length;
        self.state.finished = false;
        self.state.waypoints.clear();
    }
}
