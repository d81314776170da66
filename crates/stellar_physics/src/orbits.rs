use rand::Rng;
use rand::distributions::Distribution as _;
use rand_distr::Normal;
use stellar_core::constants::{MIN_ORBIT_RADIUS, ORBIT_SPEED, VERTICAL_JITTER};
use stellar_core::sanitize::sanitize_vectors;
use stellar_core::{EngineError, Result, Severity, Stage, Telemetry, Vec3};

/// Seed velocities for roughly circular motion about the z axis.
///
/// Speed follows a Keplerian 1/sqrt(r) law in the XY plane, with the planar
/// radius floored at `MIN_ORBIT_RADIUS`. A small normal jitter on z keeps
/// the system from being perfectly flat. Non-finite results are zeroed and
/// recorded as a warning.
pub fn orbital_velocities<R: Rng + ?Sized>(
    positions: &[Vec3],
    rng: &mut R,
    telemetry: &dyn Telemetry,
) -> Result<Vec<Vec3>> {
    if positions.is_empty() {
        return Err(EngineError::data_validation(
            Stage::VelocityGeneration,
            "positions array is empty",
        ));
    }

    let jitter = Normal::new(0.0, VERTICAL_JITTER).map_err(|e| {
        EngineError::initialization(Stage::VelocityGeneration, "bad vertical jitter").with_source(e)
    })?;

    let mut velocities: Vec<Vec3> = positions
        .iter()
        .map(|p| {
            let r = (p[0] * p[0] + p[1] * p[1]).sqrt().max(MIN_ORBIT_RADIUS);
            let speed = ORBIT_SPEED / r.sqrt();
            [-p[1] / r * speed, p[0] / r * speed, jitter.sample(rng)]
        })
        .collect();

    let replaced = sanitize_vectors(&mut velocities);
    if replaced > 0 {
        telemetry.record(
            Severity::Warning,
            "generated velocities contained non-finite values",
            &[("replaced", replaced.to_string())],
        );
    }
    Ok(velocities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use stellar_core::MemoryTelemetry;

    #[test]
    fn test_circular_speed_and_direction() {
        let sink = MemoryTelemetry::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let positions = vec![[4.0, 0.0, 1.0], [0.0, 9.0, -2.0], [3.0, 4.0, 0.0]];
        let velocities = orbital_velocities(&positions, &mut rng, &sink).unwrap();

        for (p, v) in positions.iter().zip(&velocities) {
            let r = (p[0] * p[0] + p[1] * p[1]).sqrt();
            let planar_speed = (v[0] * v[0] + v[1] * v[1]).sqrt();
            assert!((planar_speed - ORBIT_SPEED / r.sqrt()).abs() < 1e-5);
            // Perpendicular to the planar radius
            assert!((p[0] * v[0] + p[1] * v[1]).abs() < 1e-4);
            // Counter-clockwise seen from +z
            assert!(p[0] * v[1] - p[1] * v[0] > 0.0);
        }
    }

    #[test]
    fn test_origin_stays_finite() {
        let sink = MemoryTelemetry::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let positions = vec![[0.0, 0.0, 0.0], [0.0, 0.0, 12.0], [1e-9, -1e-9, 0.0]];
        let velocities = orbital_velocities(&positions, &mut rng, &sink).unwrap();
        assert!(stellar_core::sanitize::all_finite(&velocities));
        assert_eq!(velocities[0][0], 0.0);
        assert_eq!(velocities[0][1], 0.0);
        assert_eq!(sink.count(Severity::Warning), 0);
    }

    #[test]
    fn test_non_finite_input_is_sanitized() {
        let sink = MemoryTelemetry::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let positions = vec![[f32::NAN, 1.0, 0.0], [1.0, 1.0, 0.0]];
        let velocities = orbital_velocities(&positions, &mut rng, &sink).unwrap();
        assert!(stellar_core::sanitize::all_finite(&velocities));
        assert_eq!(sink.count(Severity::Warning), 1);
    }

    #[test]
    fn test_empty_positions_rejected() {
        let sink = MemoryTelemetry::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let err = orbital_velocities(&[], &mut rng, &sink).unwrap_err();
        assert_eq!(err.kind(), stellar_core::ErrorKind::DataValidation);
    }
}
