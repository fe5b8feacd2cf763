//! Rider Speed Integration
//!
//! Explicit Euler integration of the rider point mass along the ground:
//! quadratic air drag, rolling resistance, and the along-slope component of
//! gravity. Downhill slope angles are positive and assist; uphill angles are
//! negative and resist.
//!
//! This is intentionally a simplified point-mass model, not exact
//! aerodynamics, but it is deterministic for fixed constants and timestep.

use glam::Vec3;

use super::config::RiderConfig;

/// Speed at the end of a straight segment of the given length and constant
/// slope angle, starting at `init_speed`.
///
/// Integrates until the traveled distance covers `distance`. Zero distance
/// executes zero steps and returns `init_speed` exactly. A rider whose speed
/// drops to zero has stalled; the function returns 0 immediately.
pub fn exit_speed(config: &RiderConfig, init_speed: f32, distance: f32, slope_angle: f32) -> f32 {
    let mut speed = init_speed;
    let mut traveled = 0.0;
    let dt = config.timestep;

    while traveled < distance {
        let drag =
            0.5 * config.air_density * config.drag_coefficient * config.frontal_area * speed * speed;
        let rolling = config.rolling_coefficient * config.mass * config.gravity * slope_angle.cos();
        let slope_force = config.mass * config.gravity * slope_angle.sin();

        let accel = (slope_force - drag - rolling) / config.mass;
        speed += accel * dt;
        if speed <= 0.0 {
            return 0.0;
        }
        traveled += speed * dt;
    }
    speed
}

/// The 3D extent of one ramp surface the ride path can cross: world-space
/// start and end points with their surface heights in `y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlopeSpan {
    pub start: Vec3,
    pub end: Vec3,
}

impl SlopeSpan {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    /// XZ-projected length of the span.
    pub fn xz_length(&self) -> f32 {
        let dx = self.end.x - self.start.x;
        let dz = self.end.z - self.start.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Full 3D surface length of the span, accounting for the height ramp.
    pub fn length_3d(&self) -> f32 {
        let xz = self.xz_length();
        let dy = self.end.y - self.start.y;
        (xz * xz + dy * dy).sqrt()
    }
}

/// Rider speed at `target`, starting from `from` at `init_speed`, riding a
/// straight XZ path that may cross any number of slope spans.
///
/// Each span is projected onto the path and the route splits into flat and
/// on-slope stretches: flat stretches integrate at zero slope angle;
/// on-slope stretches integrate over the span's 3D surface distance (the XZ
/// window scaled by the ramp's rise) at the span's slope angle. Descending a
/// span assists; riding it in reverse resists. Returns 0 as soon as any
/// stretch stalls.
pub fn speed_at_position(
    config: &RiderConfig,
    init_speed: f32,
    from: Vec3,
    target: Vec3,
    slopes: &[SlopeSpan],
) -> f32 {
    let delta = Vec3::new(target.x - from.x, 0.0, target.z - from.z);
    let total = delta.length();
    if total <= f32::EPSILON {
        return init_speed;
    }
    let dir = delta / total;

    // Project every span onto the path and clamp to the traveled interval.
    // (entry, exit, height at entry, height at exit), ordered along travel.
    let mut windows: Vec<(f32, f32, f32, f32)> = Vec::new();
    for span in slopes {
        let sa = Vec3::new(span.start.x - from.x, 0.0, span.start.z - from.z).dot(dir);
        let sb = Vec3::new(span.end.x - from.x, 0.0, span.end.z - from.z).dot(dir);
        // Riding the span against its build direction flips which height
        // comes first, which flips the sign of the slope angle below.
        let (a, b, ha, hb) = if sa <= sb {
            (sa, sb, span.start.y, span.end.y)
        } else {
            (sb, sa, span.end.y, span.start.y)
        };
        if b - a <= f32::EPSILON {
            continue;
        }
        let wa = a.clamp(0.0, total);
        let wb = b.clamp(0.0, total);
        if wb - wa <= f32::EPSILON {
            continue;
        }
        // Heights at the clamped window ends, linear over the span.
        let h = |w: f32| ha + (hb - ha) * ((w - a) / (b - a));
        windows.push((wa, wb, h(wa), h(wb)));
    }
    windows.sort_by(|x, y| x.0.total_cmp(&y.0));

    let mut speed = init_speed;
    let mut pos = 0.0;
    for (wa, wb, ha, hb) in windows {
        let flat = wa - pos;
        if flat > 0.0 {
            speed = exit_speed(config, speed, flat, 0.0);
            if speed <= 0.0 {
                return 0.0;
            }
        }
        let xz = wb - wa;
        let drop = ha - hb;
        let angle = drop.atan2(xz);
        let surface = (xz * xz + drop * drop).sqrt();
        speed = exit_speed(config, speed, surface, angle);
        if speed <= 0.0 {
            return 0.0;
        }
        pos = wb.max(pos);
    }

    let tail = total - pos;
    if tail > 0.0 {
        speed = exit_speed(config, speed, tail, 0.0);
    }
    speed
}
