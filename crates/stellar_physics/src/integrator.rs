use stellar_core::constants::{CENTRAL_PULL, MIN_PULL_RADIUS};
use stellar_core::sanitize::sanitize_vectors;
use stellar_core::Vec3;

/// How many components each sanitization pass of a step replaced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub positions: usize,
    pub accelerations: usize,
    pub velocities: usize,
}

impl StepReport {
    pub fn total(&self) -> usize {
        self.positions + self.accelerations + self.velocities
    }
}

/// Pull toward the origin: -k * p / max(|p|, 1)^3.
///
/// This is a single central body, not pairwise gravity. It keeps the
/// reference step O(N); accelerated backends compute real N-body forces
/// and are not expected to match it.
pub fn central_acceleration(position: Vec3) -> Vec3 {
    let r = (position[0] * position[0] + position[1] * position[1] + position[2] * position[2])
        .sqrt()
        .max(MIN_PULL_RADIUS);
    let f = -CENTRAL_PULL / (r * r * r);
    position.map(|c| c * f)
}

/// One explicit Euler step under the central pull.
///
/// Positions advance with the old velocities, then the acceleration at the
/// new positions updates the velocities. Each intermediate is sanitized.
pub fn euler_step(positions: &mut [Vec3], velocities: &mut [Vec3], dt: f32) -> StepReport {
    debug_assert_eq!(positions.len(), velocities.len());
    let mut report = StepReport::default();

    for (p, v) in positions.iter_mut().zip(velocities.iter()) {
        for i in 0..3 {
            p[i] += v[i] * dt;
        }
    }
    report.positions = sanitize_vectors(positions);

    let mut accelerations: Vec<Vec3> = positions.iter().map(|p| central_acceleration(*p)).collect();
    report.accelerations = sanitize_vectors(&mut accelerations);

    for (v, a) in velocities.iter_mut().zip(&accelerations) {
        for i in 0..3 {
            v[i] += a[i] * dt;
        }
    }
    report.velocities = sanitize_vectors(velocities);

    report
}
