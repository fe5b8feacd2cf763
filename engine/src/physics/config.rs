//! Rider Physics Configuration
//!
//! Simulation constants for the rider + bike point mass. Treated as
//! configuration passed explicitly to every simulation call, never derived
//! or stored globally.

/// Physical constants of the simulated rider.
///
/// All values in SI units (meters, kilograms, seconds).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiderConfig {
    /// Frontal area of rider + bike (m²).
    pub frontal_area: f32,
    /// Rolling resistance coefficient (dimensionless).
    pub rolling_coefficient: f32,
    /// Air drag coefficient (dimensionless).
    pub drag_coefficient: f32,
    /// Air density (kg/m³). Earth sea level: 1.225.
    pub air_density: f32,
    /// Gravity acceleration magnitude (m/s²).
    pub gravity: f32,
    /// Combined rider + bike mass (kg).
    pub mass: f32,
    /// Integration timestep (seconds).
    pub timestep: f32,
}

impl Default for RiderConfig {
    fn default() -> Self {
        Self {
            frontal_area: 0.6,
            rolling_coefficient: 0.02,
            drag_coefficient: 1.0,
            air_density: 1.225,
            gravity: 9.81,
            mass: 85.0,
            timestep: 0.005,
        }
    }
}

impl RiderConfig {
    /// A config with no drag and no rolling resistance. Gravity only;
    /// useful for closed-form comparisons.
    pub fn frictionless() -> Self {
        Self {
            rolling_coefficient: 0.0,
            drag_coefficient: 0.0,
            air_density: 0.0,
            ..Self::default()
        }
    }

    /// Override the integration timestep.
    pub fn with_timestep(mut self, timestep: f32) -> Self {
        self.timestep = timestep;
        self
    }
}
