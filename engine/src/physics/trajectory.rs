//! Flight Trajectories
//!
//! Ballistic flight of the rider after leaving a takeoff: fixed-timestep
//! integration under gravity and quadratic air drag until the flight path
//! intersects the terrain. The sampled path is kept for read-only queries
//! (closest point, point at a given height, point flying closest to a
//! direction).

use glam::Vec3;

use super::config::RiderConfig;

/// Hard cap on integration steps per flight.
///
/// The integration loop otherwise has no exit for launches that never
/// descend to the terrain height function (a perfectly horizontal launch
/// exactly at ground level can hover above the termination test within
/// float precision). At the default 5 ms timestep this is 100 seconds of
/// flight, far beyond any reachable jump.
pub const MAX_FLIGHT_SAMPLES: usize = 20_000;

/// One sampled point of a flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySample {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// An ordered, append-only record of one simulated flight.
///
/// Produced by [`simulate_flight`]; finite and not restartable, but safe to
/// query repeatedly. The highest and lowest samples are tracked at insertion
/// so height-range rejection is O(1).
#[derive(Debug, Clone)]
pub struct Trajectory {
    samples: Vec<TrajectorySample>,
    highest: usize,
    lowest: usize,
    truncated: bool,
}

impl Trajectory {
    fn new() -> Self {
        Self {
            samples: Vec::new(),
            highest: 0,
            lowest: 0,
            truncated: false,
        }
    }

    fn push(&mut self, position: Vec3, velocity: Vec3) {
        let index = self.samples.len();
        self.samples.push(TrajectorySample { position, velocity });
        if position.y > self.samples[self.highest].position.y {
            self.highest = index;
        }
        if position.y < self.samples[self.lowest].position.y {
            self.lowest = index;
        }
    }

    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Whether integration hit [`MAX_FLIGHT_SAMPLES`] before reaching the
    /// terrain.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// The landing sample: the last one integrated.
    pub fn last(&self) -> Option<&TrajectorySample> {
        self.samples.last()
    }

    pub fn highest(&self) -> Option<&TrajectorySample> {
        self.samples.get(self.highest)
    }

    pub fn lowest(&self) -> Option<&TrajectorySample> {
        self.samples.get(self.lowest)
    }

    /// Sample closest to a world position.
    pub fn closest_sample(&self, to: Vec3) -> Option<&TrajectorySample> {
        self.samples
            .iter()
            .min_by(|a, b| {
                a.position
                    .distance_squared(to)
                    .total_cmp(&b.position.distance_squared(to))
            })
    }

    /// Sample whose height is closest to `height`, or `None` when the height
    /// lies outside the sampled range (rejected without scanning).
    pub fn sample_at_height(&self, height: f32) -> Option<&TrajectorySample> {
        let (lowest, highest) = (self.lowest()?, self.highest()?);
        if height < lowest.position.y || height > highest.position.y {
            return None;
        }
        self.samples.iter().min_by(|a, b| {
            (a.position.y - height)
                .abs()
                .total_cmp(&(b.position.y - height).abs())
        })
    }

    /// Sample whose velocity points closest to `direction`.
    pub fn closest_velocity_direction(&self, direction: Vec3) -> Option<&TrajectorySample> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO {
            return None;
        }
        self.samples
            .iter()
            .filter(|s| s.velocity.length_squared() > f32::EPSILON)
            .max_by(|a, b| {
                a.velocity
                    .normalize()
                    .dot(dir)
                    .total_cmp(&b.velocity.normalize().dot(dir))
            })
    }
}

/// Integrate a ballistic flight from a launch state until the position drops
/// below the terrain height under it.
///
/// Semi-implicit Euler with quadratic drag:
/// `a = gravity - (0.5 * rho * A * Cd / m) * |v| * v`. Every integrated
/// sample is appended, including the final below-terrain one. Flights that
/// never intersect the terrain stop at [`MAX_FLIGHT_SAMPLES`] and are marked
/// [`Trajectory::truncated`].
pub fn simulate_flight(
    config: &RiderConfig,
    launch_position: Vec3,
    launch_velocity: Vec3,
    terrain_height: impl Fn(Vec3) -> f32,
) -> Trajectory {
    let mut trajectory = Trajectory::new();
    let mut position = launch_position;
    let mut velocity = launch_velocity;
    let dt = config.timestep;
    let drag_factor =
        0.5 * config.air_density * config.frontal_area * config.drag_coefficient / config.mass;

    trajectory.push(position, velocity);
    for _ in 0..MAX_FLIGHT_SAMPLES {
        let speed = velocity.length();
        let drag_accel = if speed > f32::EPSILON {
            -velocity * (drag_factor * speed)
        } else {
            Vec3::ZERO
        };
        let accel = Vec3::new(0.0, -config.gravity, 0.0) + drag_accel;

        velocity += accel * dt;
        position += velocity * dt;
        trajectory.push(position, velocity);

        if position.y < terrain_height(position) {
            return trajectory;
        }
    }
    trajectory.truncated = true;
    trajectory
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_ground(_: Vec3) -> f32 {
        0.0
    }

    #[test]
    fn test_flight_lands_on_flat_ground() {
        let config = RiderConfig::default();
        let trajectory = simulate_flight(
            &config,
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(0.0, 3.0, 6.0),
            flat_ground,
        );
        assert!(!trajectory.truncated());
        let landing = trajectory.last().unwrap();
        assert!(landing.position.y < 0.0, "flight must end below ground level");
        assert!(landing.position.z > 0.0, "flight should carry forward");
    }

    #[test]
    fn test_flight_without_drag_matches_kinematics() {
        let config = RiderConfig::frictionless().with_timestep(0.001);
        let trajectory = simulate_flight(
            &config,
            Vec3::new(0.0, 10.0, 0.0),
            Vec3::ZERO,
            flat_ground,
        );
        // Free fall from 10 m: t = sqrt(2h/g) ~ 1.43 s.
        let expected_samples = (2.0_f32 * 10.0 / config.gravity).sqrt() / config.timestep;
        let got = trajectory.len() as f32;
        assert!(
            (got - expected_samples).abs() < expected_samples * 0.02,
            "fall duration off: {got} samples vs ~{expected_samples}"
        );
    }

    #[test]
    fn test_drag_shortens_flight() {
        let launch_pos = Vec3::new(0.0, 1.0, 0.0);
        let launch_vel = Vec3::new(0.0, 8.0, 12.0);
        let with_drag = simulate_flight(&RiderConfig::default(), launch_pos, launch_vel, flat_ground);
        let without = simulate_flight(
            &RiderConfig::frictionless(),
            launch_pos,
            launch_vel,
            flat_ground,
        );
        let z_drag = with_drag.last().unwrap().position.z;
        let z_free = without.last().unwrap().position.z;
        assert!(
            z_drag < z_free,
            "drag should shorten the jump: {z_drag} vs {z_free}"
        );
    }

    #[test]
    fn test_never_landing_flight_is_truncated() {
        let config = RiderConfig::default();
        // Terrain that is always far below keeps the test above ground.
        let trajectory = simulate_flight(
            &config,
            Vec3::new(0.0, 10.0, 0.0),
            Vec3::new(0.0, 5.0, 5.0),
            |_| f32::NEG_INFINITY,
        );
        assert!(trajectory.truncated());
        assert_eq!(trajectory.len(), MAX_FLIGHT_SAMPLES + 1);
    }

    #[test]
    fn test_highest_and_lowest_tracking() {
        let config = RiderConfig::default();
        let trajectory = simulate_flight(
            &config,
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 6.0, 4.0),
            flat_ground,
        );
        let highest = trajectory.highest().unwrap().position.y;
        let lowest = trajectory.lowest().unwrap().position.y;
        assert!(highest > 1.0, "apex must rise above the launch point");
        assert!(lowest <= 0.0, "lowest sample is the landing");
        for s in trajectory.samples() {
            assert!(s.position.y <= highest + 1e-6);
            assert!(s.position.y >= lowest - 1e-6);
        }
    }

    #[test]
    fn test_sample_at_height_range_rejection() {
        let config = RiderConfig::default();
        let trajectory = simulate_flight(
            &config,
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 6.0, 4.0),
            flat_ground,
        );
        let apex = trajectory.highest().unwrap().position.y;
        assert!(trajectory.sample_at_height(apex + 10.0).is_none());
        let mid = trajectory.sample_at_height(apex * 0.5).unwrap();
        assert!((mid.position.y - apex * 0.5).abs() < 0.5);
    }

    #[test]
    fn test_closest_sample() {
        let config = RiderConfig::default();
        let trajectory = simulate_flight(
            &config,
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 6.0, 4.0),
            flat_ground,
        );
        let probe = Vec3::new(0.0, 1.0, 0.1);
        let closest = trajectory.closest_sample(probe).unwrap();
        assert!(closest.position.distance(probe) < 0.5);
    }

    #[test]
    fn test_closest_velocity_direction_finds_descent() {
        let config = RiderConfig::default();
        let trajectory = simulate_flight(
            &config,
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 6.0, 4.0),
            flat_ground,
        );
        // The sample flying most steeply downward is near the end of flight.
        let diving = trajectory
            .closest_velocity_direction(Vec3::new(0.0, -1.0, 0.0))
            .unwrap();
        assert!(diving.velocity.y < 0.0);
    }
}
