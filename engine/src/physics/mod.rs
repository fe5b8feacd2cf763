//! Rider physics simulation
//!
//! Custom point-mass physics for the ride line: ground-speed integration
//! and ballistic flight, with no external physics library dependencies.
//!
//! # Unit System
//!
//! **1 unit = 1 meter** (SI units throughout)
//!
//! - Distances in meters
//! - Velocities in m/s
//! - Accelerations in m/s²
//! - Mass in kg
//! - Air density in kg/m³
//!
//! # Submodules
//!
//! - [`types`] - Core mathematical types re-exported from glam
//! - [`config`] - Simulation constants ([`RiderConfig`])
//! - [`rider`] - Ground-speed integration: [`exit_speed`] and slope-aware
//!   [`speed_at_position`]
//! - [`trajectory`] - Ballistic flight sampling ([`simulate_flight`])
//!
//! All integration is deterministic for a fixed config and timestep, and
//! every loop is bounded: ground integration exits on distance covered or
//! stall, flight integration on terrain intersection or the sample cap.

pub mod config;
pub mod rider;
pub mod trajectory;
pub mod types;

// Re-export commonly used types at the physics module level
pub use config::RiderConfig;
pub use rider::{SlopeSpan, exit_speed, speed_at_position};
pub use trajectory::{MAX_FLIGHT_SAMPLES, Trajectory, TrajectorySample, simulate_flight};
pub use types::Vec3;
