use stellar_core::{ParticleKind, ParticleState};

/// Summary numbers for info panels and the batch runner
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulationStats {
    pub particle_count: usize,
    pub stars: usize,
    pub planets: usize,
    pub black_holes: usize,
    pub total_mass: f64,
    /// Sum of 0.5 * m * v^2
    pub kinetic_energy: f64,
    pub mean_speed: f64,
    /// Largest distance of any particle from the origin
    pub max_radius: f64,
}

impl SimulationStats {
    pub fn measure(state: &ParticleState) -> Self {
        let mut stats = Self {
            particle_count: state.len(),
            ..Self::default()
        };
        if state.is_empty() {
            return stats;
        }

        for kind in state.kinds() {
            match kind {
                ParticleKind::Star => stats.stars += 1,
                ParticleKind::Planet => stats.planets += 1,
                ParticleKind::BlackHole => stats.black_holes += 1,
            }
        }

        let mut speed_sum = 0.0f64;
        for ((p, v), m) in state
            .positions()
            .iter()
            .zip(state.velocities())
            .zip(state.masses())
        {
            let v2 = v.iter().map(|c| (*c as f64).powi(2)).sum::<f64>();
            let r = p.iter().map(|c| (*c as f64).powi(2)).sum::<f64>().sqrt();
            stats.total_mass += *m as f64;
            stats.kinetic_energy += 0.5 * *m as f64 * v2;
            speed_sum += v2.sqrt();
            stats.max_radius = stats.max_radius.max(r);
        }
        stats.mean_speed = speed_sum / state.len() as f64;
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stellar_core::Particle;

    #[test]
    fn test_empty_state() {
        let stats = SimulationStats::measure(&ParticleState::new());
        assert_eq!(stats, SimulationStats::default());
    }

    #[test]
    fn test_measure() {
        let mut state = ParticleState::new();
        state.push(Particle {
            position: [3.0, 4.0, 0.0],
            velocity: [0.0, 2.0, 0.0],
            mass: 2.0,
            kind: ParticleKind::Star,
            color: [1.0; 3],
        });
        state.push(Particle {
            position: [0.0, 0.0, 1.0],
            velocity: [0.0, 0.0, 0.0],
            mass: 10.0,
            kind: ParticleKind::BlackHole,
            color: [0.8, 0.2, 0.8],
        });

        let stats = SimulationStats::measure(&state);
        assert_eq!(stats.particle_count, 2);
        assert_eq!(stats.stars, 1);
        assert_eq!(stats.black_holes, 1);
        assert_eq!(stats.planets, 0);
        assert!((stats.total_mass - 12.0).abs() < 1e-9);
        assert!((stats.kinetic_energy - 4.0).abs() < 1e-9);
        assert!((stats.mean_speed - 1.0).abs() < 1e-9);
        assert!((stats.max_radius - 5.0).abs() < 1e-9);
    }
}
