// Simulation units are arbitrary "world units" and "simulation time units".
// The reference engine works in f32 to match what renderers upload.

/// Default spatial scale when none is configured
pub const DEFAULT_SCALE: f32 = 50.0;

/// Largest accepted spatial scale. Uniform sampling over [-scale, scale]
/// needs the span 2 * scale to stay finite after rand's range widening.
pub const MAX_SCALE: f32 = f32::MAX / 4.0;

/// Default particle count for the headless driver
pub const DEFAULT_PARTICLE_COUNT: usize = 2_000;

/// Fixed tick rate of the driving loop (Hz)
pub const TICK_HZ: f64 = 60.0;

/// Simulation-time delta per tick at speed 1.0
pub const BASE_DT: f32 = 0.016;

/// Strength of the central pull used by the reference integrator
pub const CENTRAL_PULL: f32 = 0.5;

/// Radius floor for the central pull (avoids the singularity at the origin)
pub const MIN_PULL_RADIUS: f32 = 1.0;

/// Planar radius floor for orbital velocity seeding
pub const MIN_ORBIT_RADIUS: f32 = 0.1;

/// Orbital speed coefficient: v = ORBIT_SPEED / sqrt(r)
pub const ORBIT_SPEED: f32 = 2.0;

/// Standard deviation of the out-of-plane velocity jitter
pub const VERTICAL_JITTER: f32 = 0.1;

/// Log-normal mass distribution parameters (log space)
pub const MASS_LOG_MEAN: f32 = 0.0;
pub const MASS_LOG_SIGMA: f32 = 1.5;

/// Rejection-sampling rounds allowed per requested sphere point
pub const SPHERE_ROUNDS_PER_POINT: usize = 10;

/// Accelerated-backend defaults (ignored by the reference engine)
pub const DEFAULT_G: f32 = 1.0;
pub const DEFAULT_SOFTENING: f32 = 0.01;
pub const DEFAULT_THETA: f32 = 0.5;

/// Half-extent of the cube sandbox spawns land in
pub const SPAWN_EXTENT: f32 = 20.0;
