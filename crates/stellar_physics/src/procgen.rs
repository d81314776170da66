use rand::Rng;
use rand::distributions::Distribution as _;
use rand_distr::{Exp, Normal};
use stellar_core::constants::{MAX_SCALE, SPHERE_ROUNDS_PER_POINT};
use stellar_core::sanitize::sanitize_vectors;
use stellar_core::{Distribution, EngineError, Result, Severity, Stage, Telemetry, Vec3};

/// Fraction of galaxy particles placed in the central bulge
const BULGE_FRACTION: f32 = 0.3;
const BULGE_RADIUS: f32 = 0.3;
const ARM_SCALE_LENGTH: f32 = 0.4;
const ARM_TWIST_LENGTH: f32 = 0.2;
const ARM_THICKNESS: f32 = 0.03;
const DISK_SCALE_LENGTH: f32 = 0.3;
const DISK_THICKNESS: f32 = 0.05;

/// Reject scales that are not positive, not finite, or too large for the
/// generators to span without overflowing
pub fn check_scale(scale: f32) -> Result<()> {
    if !(scale.is_finite() && scale > 0.0 && scale <= MAX_SCALE) {
        return Err(EngineError::initialization(
            Stage::Configuration,
            format!("scale must be in (0, {MAX_SCALE:e}], got {scale}"),
        ));
    }
    Ok(())
}

/// Generate exactly `count` initial positions for `distribution`.
///
/// Fails with an initialization error for a zero count, a scale rejected by
/// [`check_scale`] or a count too large to allocate, and with a data
/// validation error if a generator comes back with the wrong number of
/// points. Samples that overflow to infinity are zeroed with a warning.
pub fn generate_positions<R: Rng + ?Sized>(
    distribution: Distribution,
    count: usize,
    scale: f32,
    rng: &mut R,
    telemetry: &dyn Telemetry,
) -> Result<Vec<Vec3>> {
    if count == 0 {
        return Err(EngineError::initialization(
            Stage::PositionGeneration,
            "particle count must be positive",
        ));
    }
    check_scale(scale)?;

    let mut positions = Vec::new();
    positions.try_reserve_exact(count).map_err(|e| {
        EngineError::initialization(
            Stage::PositionGeneration,
            format!("cannot allocate {count} positions"),
        )
        .with_source(e)
    })?;

    match distribution {
        Distribution::Sphere => fill_sphere(&mut positions, count, scale, rng, telemetry),
        Distribution::Disk => fill_disk(&mut positions, count, scale, rng)?,
        Distribution::Galaxy => fill_galaxy(&mut positions, count, scale, rng, telemetry)?,
        Distribution::Random => fill_random(&mut positions, count, scale, rng),
    }

    if positions.len() != count {
        return Err(EngineError::size_mismatch(
            Stage::PositionGeneration,
            &format!("{distribution} positions"),
            count,
            positions.len(),
        ));
    }

    let replaced = sanitize_vectors(&mut positions);
    if replaced > 0 {
        telemetry.record(
            Severity::Warning,
            "replaced non-finite generated positions",
            &[
                ("distribution", distribution.to_string()),
                ("replaced", replaced.to_string()),
            ],
        );
    }
    Ok(positions)
}

/// Uniform points inside a ball of radius `scale`, by rejection sampling.
///
/// The number of sampling rounds is bounded; if the bound is hit the
/// shortfall is recorded as a warning and only the points found so far are
/// appended.
fn fill_sphere<R: Rng + ?Sized>(
    positions: &mut Vec<Vec3>,
    count: usize,
    scale: f32,
    rng: &mut R,
    telemetry: &dyn Telemetry,
) {
    let target = positions.len() + count;
    let max_rounds = count.saturating_mul(SPHERE_ROUNDS_PER_POINT);
    let mut rounds = 0;

    while positions.len() < target && rounds < max_rounds {
        let remaining = target - positions.len();
        for _ in 0..remaining {
            let candidate = [
                rng.gen_range(-1.0f32..=1.0),
                rng.gen_range(-1.0f32..=1.0),
                rng.gen_range(-1.0f32..=1.0),
            ];
            if norm(candidate) <= 1.0 {
                positions.push(candidate.map(|c| c * scale));
            }
        }
        rounds += 1;
    }

    if positions.len() < target {
        let generated = count - (target - positions.len());
        telemetry.record(
            Severity::Warning,
            "could not generate enough sphere positions",
            &[
                ("requested", count.to_string()),
                ("generated", generated.to_string()),
                ("rounds", rounds.to_string()),
            ],
        );
    }
}

/// Thin disk: exponential radius, uniform angle, normal height
fn fill_disk<R: Rng + ?Sized>(
    positions: &mut Vec<Vec3>,
    count: usize,
    scale: f32,
    rng: &mut R,
) -> Result<()> {
    let radius = exponential(scale * DISK_SCALE_LENGTH)?;
    let height = normal(scale * DISK_THICKNESS)?;

    positions.extend((0..count).map(|_| {
        let r = radius.sample(rng);
        let theta = rng.gen_range(0.0..std::f32::consts::TAU);
        let z = height.sample(rng);
        [r * theta.cos(), r * theta.sin(), z]
    }));
    Ok(())
}

/// Spiral galaxy: a spherical bulge holding 30% of the particles and
/// logarithmic-looking spiral arms holding the rest
fn fill_galaxy<R: Rng + ?Sized>(
    positions: &mut Vec<Vec3>,
    count: usize,
    scale: f32,
    rng: &mut R,
    telemetry: &dyn Telemetry,
) -> Result<()> {
    let bulge_count = (count as f32 * BULGE_FRACTION) as usize;
    let arm_count = count - bulge_count;

    if bulge_count > 0 {
        fill_sphere(positions, bulge_count, scale * BULGE_RADIUS, rng, telemetry);
    }

    let radius = exponential(scale * ARM_SCALE_LENGTH)?;
    let height = normal(scale * ARM_THICKNESS)?;
    let twist_length = scale * ARM_TWIST_LENGTH;

    for _ in 0..arm_count {
        let r = radius.sample(rng);
        let base = rng.gen_range(0.0..2.0 * std::f32::consts::TAU);
        let theta = base + r / twist_length * std::f32::consts::PI;
        let z = height.sample(rng);
        positions.push([r * theta.cos(), r * theta.sin(), z]);
    }
    Ok(())
}

/// Uniform in the cube [-scale, scale]^3
fn fill_random<R: Rng + ?Sized>(positions: &mut Vec<Vec3>, count: usize, scale: f32, rng: &mut R) {
    positions.extend((0..count).map(|_| {
        [
            rng.gen_range(-scale..=scale),
            rng.gen_range(-scale..=scale),
            rng.gen_range(-scale..=scale),
        ]
    }));
}

fn exponential(mean: f32) -> Result<Exp<f32>> {
    Exp::new(1.0 / mean).map_err(|e| {
        EngineError::initialization(
            Stage::PositionGeneration,
            format!("bad exponential mean {mean}"),
        )
        .with_source(e)
    })
}

fn normal(std_dev: f32) -> Result<Normal<f32>> {
    Normal::new(0.0, std_dev).map_err(|e| {
        EngineError::initialization(
            Stage::PositionGeneration,
            format!("bad normal spread {std_dev}"),
        )
        .with_source(e)
    })
}

fn norm(v: Vec3) -> f32 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use stellar_core::sanitize::all_finite;
    use stellar_core::{ErrorKind, MemoryTelemetry};

    /// Always yields the largest possible value, so every sphere candidate
    /// lands in the cube corner and is rejected
    struct StuckRng;

    impl RngCore for StuckRng {
        fn next_u32(&mut self) -> u32 {
            u32::MAX
        }
        fn next_u64(&mut self) -> u64 {
            u64::MAX
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0xFF);
        }
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    const ALL: [Distribution; 4] = [
        Distribution::Sphere,
        Distribution::Disk,
        Distribution::Galaxy,
        Distribution::Random,
    ];

    fn generate(distribution: Distribution, count: usize, scale: f32, seed: u64) -> Vec<Vec3> {
        let sink = MemoryTelemetry::new();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        generate_positions(distribution, count, scale, &mut rng, &sink).unwrap()
    }

    #[test]
    fn test_exact_count_for_every_distribution() {
        let sink = MemoryTelemetry::new();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for distribution in ALL {
            for count in [1, 2, 3, 1000] {
                let positions =
                    generate_positions(distribution, count, 50.0, &mut rng, &sink).unwrap();
                assert_eq!(positions.len(), count, "{distribution} with {count}");
                assert!(all_finite(&positions));
            }
        }
        assert_eq!(sink.count(Severity::Warning), 0);
    }

    #[test]
    fn test_sphere_within_radius() {
        let scale = 25.0;
        let positions = generate(Distribution::Sphere, 5000, scale, 1);
        assert_eq!(positions.len(), 5000);
        for p in &positions {
            assert!(norm(*p) <= scale * (1.0 + 1e-5), "{p:?} outside sphere");
        }
    }

    #[test]
    fn test_disk_thickness() {
        let scale = 40.0;
        let positions = generate(Distribution::Disk, 10_000, scale, 7);
        let n = positions.len() as f64;
        let mean = positions.iter().map(|p| p[2] as f64).sum::<f64>() / n;
        let var = positions
            .iter()
            .map(|p| (p[2] as f64 - mean).powi(2))
            .sum::<f64>()
            / n;
        let std = var.sqrt();
        let expected = (scale * DISK_THICKNESS) as f64;
        assert!((std - expected).abs() < expected * 0.15, "std {std} vs {expected}");
    }

    #[test]
    fn test_galaxy_bulge_split() {
        let scale = 100.0;
        let positions = generate(Distribution::Galaxy, 1000, scale, 3);
        assert_eq!(positions.len(), 1000);
        // The first 300 points form the bulge
        for p in &positions[..300] {
            assert!(norm(*p) <= scale * BULGE_RADIUS * (1.0 + 1e-5));
        }
    }

    #[test]
    fn test_random_within_cube() {
        let positions = generate(Distribution::Random, 2000, 10.0, 9);
        assert!(positions.iter().flatten().all(|c| c.abs() <= 10.0));
    }

    #[test]
    fn test_seed_is_reproducible() {
        for distribution in ALL {
            let a = generate(distribution, 200, 30.0, 11);
            let b = generate(distribution, 200, 30.0, 11);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_rejects_bad_count_and_scale() {
        let sink = MemoryTelemetry::new();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = generate_positions(Distribution::Sphere, 0, 10.0, &mut rng, &sink).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Initialization);
        for scale in [0.0, -5.0, f32::NAN, f32::INFINITY] {
            let err =
                generate_positions(Distribution::Disk, 10, scale, &mut rng, &sink).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Initialization);
            assert_eq!(err.stage(), Stage::Configuration);
        }
    }

    #[test]
    fn test_overflowing_scale_is_rejected() {
        let sink = MemoryTelemetry::new();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for distribution in ALL {
            for scale in [f32::MAX, f32::MAX / 2.0] {
                let err = generate_positions(distribution, 10, scale, &mut rng, &sink)
                    .unwrap_err();
                assert_eq!(err.kind(), ErrorKind::Initialization, "{distribution}");
                assert_eq!(err.stage(), Stage::Configuration, "{distribution}");
            }
        }
    }

    #[test]
    fn test_largest_scale_stays_finite() {
        for distribution in ALL {
            let positions = generate(distribution, 1000, MAX_SCALE, 13);
            assert_eq!(positions.len(), 1000, "{distribution}");
            assert!(all_finite(&positions), "{distribution}");
        }
    }

    #[test]
    fn test_unallocatable_count_is_an_error() {
        let sink = MemoryTelemetry::new();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = generate_positions(Distribution::Random, usize::MAX, 1.0, &mut rng, &sink)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Initialization);
        assert_eq!(err.stage(), Stage::PositionGeneration);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_sphere_shortfall_is_logged_and_rejected() {
        let sink = MemoryTelemetry::new();
        let mut positions = Vec::new();
        fill_sphere(&mut positions, 3, 10.0, &mut StuckRng, &sink);
        assert!(positions.is_empty());
        let warnings: Vec<_> = sink
            .records()
            .into_iter()
            .filter(|r| r.severity == Severity::Warning)
            .collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].context_value("requested"), Some("3"));
        assert_eq!(warnings[0].context_value("generated"), Some("0"));
        assert_eq!(warnings[0].context_value("rounds"), Some("30"));

        let err = generate_positions(Distribution::Sphere, 3, 10.0, &mut StuckRng, &sink)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataValidation);
        assert!(err.message().contains("expected 3"));
        assert!(err.message().contains("got 0"));
    }
}
