//! Line Save/Load (.tline)
//!
//! Binary file format for persisting a ride line session to disk.
//! Layout: fixed 32-byte header | terrain state JSON | slope states JSON.
//!
//! The header carries magic bytes, version, counts, and byte offsets so each
//! section can be read independently. Both payload sections are JSON for
//! human-inspectability; the terrain section holds the global flat height
//! level and the sparse list of non-free cells, the slope section holds the
//! ordered slope states with their waypoint snapshots for replay.

use std::path::Path;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use super::grid::GridCell;
use super::slope::SlopeState;
use super::state_store::CellState;
use super::terrain::TileId;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Magic bytes identifying a .tline file.
pub const TLINE_MAGIC: [u8; 4] = *b"TLIN";

/// Current file format version.
const TLINE_VERSION: u32 = 1;

/// Size of the header in bytes. Must always be 32.
const HEADER_SIZE: u32 = 32;

// ============================================================================
// HEADER
// ============================================================================

/// Fixed-size binary header for the .tline format.
///
/// Total size: exactly 32 bytes.
/// - `magic` (4) + `version` (4) + `slope_count` (4) + `cell_count` (4)
///   + `terrain_offset` (4) + `slopes_offset` (4) + `_reserved` (8) = 32.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct TlineHeader {
    /// Magic bytes: always `b"TLIN"`.
    pub magic: [u8; 4],
    /// File format version (currently 1).
    pub version: u32,
    /// Number of persisted slope changes.
    pub slope_count: u32,
    /// Number of persisted non-free cells.
    pub cell_count: u32,
    /// Byte offset from the start of the file to the terrain JSON section.
    pub terrain_offset: u32,
    /// Byte offset from the start of the file to the slopes JSON section.
    pub slopes_offset: u32,
    /// Reserved for future use; must be zeroed.
    pub _reserved: [u8; 8],
}

static_assertions::assert_eq_size!(TlineHeader, [u8; 32]);

// ============================================================================
// PAYLOAD
// ============================================================================

/// One persisted non-free cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedCell {
    pub tile: TileId,
    pub cell: GridCell,
    /// The cell's state tag; `Occupied` carries the owning element's index.
    pub state: CellState,
}

/// The terrain JSON section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainSaveState {
    /// Global flat ground level of the session.
    pub flat_height: f32,
    /// Sparse list of every cell that is not `Free`.
    pub cells: Vec<SavedCell>,
}

/// Everything a saved line contains.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSaveData {
    pub terrain: TerrainSaveState,
    pub slopes: Vec<SlopeState>,
}

// ============================================================================
// ERROR TYPE
// ============================================================================

/// Errors that can occur during .tline save/load.
#[derive(Debug)]
pub enum LineFileError {
    /// File is smaller than the 32-byte header.
    FileTooShort,
    /// Magic bytes do not match `b"TLIN"`.
    InvalidMagic,
    /// File version is not supported.
    UnsupportedVersion(u32),
    /// Section offsets point outside the file.
    CorruptOffsets,
    /// Standard I/O error.
    IoError(std::io::Error),
    /// JSON serialization/deserialization error.
    JsonError(serde_json::Error),
}

impl std::fmt::Display for LineFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineFileError::FileTooShort => write!(f, "file too short for tline header"),
            LineFileError::InvalidMagic => write!(f, "invalid magic bytes (expected TLIN)"),
            LineFileError::UnsupportedVersion(v) => {
                write!(f, "unsupported tline version: {v}")
            }
            LineFileError::CorruptOffsets => write!(f, "section offsets outside file"),
            LineFileError::IoError(e) => write!(f, "IO error: {e}"),
            LineFileError::JsonError(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for LineFileError {}

impl From<std::io::Error> for LineFileError {
    fn from(e: std::io::Error) -> Self {
        LineFileError::IoError(e)
    }
}

impl From<serde_json::Error> for LineFileError {
    fn from(e: serde_json::Error) -> Self {
        LineFileError::JsonError(e)
    }
}

// ============================================================================
// SAVE
// ============================================================================

/// Write a .tline file to disk.
///
/// The file is written to a temporary sibling first and renamed into place,
/// so an interrupted save never clobbers the previous one.
pub fn save_line(path: &Path, data: &LineSaveData) -> Result<(), LineFileError> {
    use std::io::Write;

    let terrain_json = serde_json::to_vec(&data.terrain)?;
    let slopes_json = serde_json::to_vec(&data.slopes)?;

    let terrain_offset = HEADER_SIZE;
    let slopes_offset = terrain_offset + terrain_json.len() as u32;

    let header = TlineHeader {
        magic: TLINE_MAGIC,
        version: TLINE_VERSION,
        slope_count: data.slopes.len() as u32,
        cell_count: data.terrain.cells.len() as u32,
        terrain_offset,
        slopes_offset,
        _reserved: [0u8; 8],
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("tline.tmp");
    {
        let mut file = std::fs::File::create(&tmp)?;
        file.write_all(bytemuck::bytes_of(&header))?;
        file.write_all(&terrain_json)?;
        file.write_all(&slopes_json)?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp, path)?;
    Ok(())
}

// ============================================================================
// LOAD
// ============================================================================

/// Read a .tline file from disk, validating header and sections.
pub fn load_line(path: &Path) -> Result<LineSaveData, LineFileError> {
    let bytes = std::fs::read(path)?;
    if bytes.len() < HEADER_SIZE as usize {
        return Err(LineFileError::FileTooShort);
    }

    let header: TlineHeader = bytemuck::pod_read_unaligned(&bytes[..HEADER_SIZE as usize]);
    if header.magic != TLINE_MAGIC {
        return Err(LineFileError::InvalidMagic);
    }
    if header.version != TLINE_VERSION {
        return Err(LineFileError::UnsupportedVersion(header.version));
    }

    let terrain_start = header.terrain_offset as usize;
    let slopes_start = header.slopes_offset as usize;
    if terrain_start > slopes_start || slopes_start > bytes.len() {
        return Err(LineFileError::CorruptOffsets);
    }

    let terrain: TerrainSaveState = serde_json::from_slice(&bytes[terrain_start..slopes_start])?;
    let slopes: Vec<SlopeState> = serde_json::from_slice(&bytes[slopes_start..])?;

    if slopes.len() != header.slope_count as usize {
        println!(
            "[LineFile] slope count mismatch: header says {}, section has {}",
            header.slope_count,
            slopes.len()
        );
    }
    if terrain.cells.len() != header.cell_count as usize {
        println!(
            "[LineFile] cell count mismatch: header says {}, section has {}",
            header.cell_count,
            terrain.cells.len()
        );
    }

    Ok(LineSaveData { terrain, slopes })
}
