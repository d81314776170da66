use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result, Stage};
use crate::sanitize::all_finite;
use crate::types::ParticleKind;

pub type Vec3 = [f32; 3];

/// One particle, assembled from the parallel arrays
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub mass: f32,
    pub kind: ParticleKind,
    pub color: Vec3,
}

/// Particle population stored as parallel arrays.
///
/// All arrays always have the same length. Mutators that take caller data
/// check the length first and leave the state untouched when it is wrong.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticleState {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    masses: Vec<f32>,
    kinds: Vec<ParticleKind>,
    colors: Vec<Vec3>,
}

impl ParticleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a state from already-generated arrays
    pub fn from_parts(
        positions: Vec<Vec3>,
        velocities: Vec<Vec3>,
        masses: Vec<f32>,
        kinds: Vec<ParticleKind>,
        colors: Vec<Vec3>,
    ) -> Result<Self> {
        let n = positions.len();
        check_len(Stage::StateUpdate, "velocities", n, velocities.len())?;
        check_len(Stage::StateUpdate, "masses", n, masses.len())?;
        check_len(Stage::StateUpdate, "kinds", n, kinds.len())?;
        check_len(Stage::StateUpdate, "colors", n, colors.len())?;
        Ok(Self {
            positions,
            velocities,
            masses,
            kinds,
            colors,
        })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    pub fn masses(&self) -> &[f32] {
        &self.masses
    }

    pub fn kinds(&self) -> &[ParticleKind] {
        &self.kinds
    }

    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    pub fn particle(&self, index: usize) -> Option<Particle> {
        if index >= self.len() {
            return None;
        }
        Some(Particle {
            position: self.positions[index],
            velocity: self.velocities[index],
            mass: self.masses[index],
            kind: self.kinds[index],
            color: self.colors[index],
        })
    }

    pub fn push(&mut self, particle: Particle) {
        self.positions.push(particle.position);
        self.velocities.push(particle.velocity);
        self.masses.push(particle.mass);
        self.kinds.push(particle.kind);
        self.colors.push(particle.color);
    }

    /// Remove one particle, shifting the following ones down by one
    pub fn remove(&mut self, index: usize) -> Option<Particle> {
        let particle = self.particle(index)?;
        self.positions.remove(index);
        self.velocities.remove(index);
        self.masses.remove(index);
        self.kinds.remove(index);
        self.colors.remove(index);
        Some(particle)
    }

    pub fn replace_positions(&mut self, positions: &[Vec3]) -> Result<()> {
        check_len(Stage::StateUpdate, "positions", self.len(), positions.len())?;
        self.positions.copy_from_slice(positions);
        Ok(())
    }

    pub fn replace_velocities(&mut self, velocities: &[Vec3]) -> Result<()> {
        check_len(Stage::StateUpdate, "velocities", self.len(), velocities.len())?;
        self.velocities.copy_from_slice(velocities);
        Ok(())
    }

    pub fn replace_masses(&mut self, masses: &[f32]) -> Result<()> {
        check_len(Stage::StateUpdate, "masses", self.len(), masses.len())?;
        self.masses.copy_from_slice(masses);
        Ok(())
    }

    /// Replace kinds together with the colors derived from them
    pub fn replace_kinds(&mut self, kinds: &[ParticleKind], colors: &[Vec3]) -> Result<()> {
        check_len(Stage::StateUpdate, "kinds", self.len(), kinds.len())?;
        check_len(Stage::StateUpdate, "colors", self.len(), colors.len())?;
        self.kinds.copy_from_slice(kinds);
        self.colors.copy_from_slice(colors);
        Ok(())
    }

    pub fn replace_colors(&mut self, colors: &[Vec3]) -> Result<()> {
        check_len(Stage::StateUpdate, "colors", self.len(), colors.len())?;
        self.colors.copy_from_slice(colors);
        Ok(())
    }

    /// Mutable positions and velocities, borrowed together for integration
    pub fn kinematics_mut(&mut self) -> (&mut [Vec3], &mut [Vec3]) {
        (&mut self.positions, &mut self.velocities)
    }

    pub fn is_consistent(&self) -> bool {
        let n = self.positions.len();
        self.velocities.len() == n
            && self.masses.len() == n
            && self.kinds.len() == n
            && self.colors.len() == n
    }
}

impl ParticleState {
    /// Check everything a live engine guarantees about its state: equal
    /// array lengths, finite kinematics, positive finite masses and colors
    /// in [0, 1]. Used on data that did not come from an engine, such as a
    /// file read back from disk.
    pub fn validate(&self, stage: Stage) -> Result<()> {
        if !self.is_consistent() {
            return Err(EngineError::data_validation(
                stage,
                "particle arrays have mismatched lengths",
            ));
        }
        if !all_finite(&self.positions) || !all_finite(&self.velocities) {
            return Err(EngineError::data_validation(
                stage,
                "positions and velocities must be finite",
            ));
        }
        if let Some(i) = self.masses.iter().position(|m| !(m.is_finite() && *m > 0.0)) {
            return Err(EngineError::data_validation(
                stage,
                format!("mass {} at index {i} is not positive and finite", self.masses[i]),
            ));
        }
        let in_unit = |c: &f32| (0.0..=1.0).contains(c);
        if let Some(i) = self.colors.iter().position(|c| !c.iter().all(in_unit)) {
            return Err(EngineError::data_validation(
                stage,
                format!("color at index {i} is outside [0, 1]"),
            ));
        }
        Ok(())
    }
}

fn check_len(stage: Stage, what: &str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(EngineError::size_mismatch(stage, what, expected, actual));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn sample(n: usize) -> ParticleState {
        let mut state = ParticleState::new();
        for i in 0..n {
            let f = i as f32;
            state.push(Particle {
                position: [f, 0.0, 0.0],
                velocity: [0.0, f, 0.0],
                mass: 1.0 + f,
                kind: ParticleKind::Star,
                color: [1.0, 1.0, 1.0],
            });
        }
        state
    }

    #[test]
    fn test_from_parts_rejects_mismatch() {
        let err = ParticleState::from_parts(
            vec![[0.0; 3]; 3],
            vec![[0.0; 3]; 2],
            vec![1.0; 3],
            vec![ParticleKind::Star; 3],
            vec![[1.0; 3]; 3],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataValidation);
        assert!(err.message().contains("velocities"));
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut state = sample(5);
        let removed = state.remove(2).unwrap();
        assert_eq!(removed.mass, 3.0);
        assert_eq!(state.len(), 4);
        let xs: Vec<f32> = state.positions().iter().map(|p| p[0]).collect();
        assert_eq!(xs, vec![0.0, 1.0, 3.0, 4.0]);
        assert!(state.is_consistent());
        assert!(state.remove(4).is_none());
    }

    #[test]
    fn test_validate() {
        let stage = Stage::Snapshot;
        assert!(sample(4).validate(stage).is_ok());
        assert!(ParticleState::new().validate(stage).is_ok());

        let mut bad_mass = sample(3);
        bad_mass.replace_masses(&[1.0, -1.0, 2.0]).unwrap();
        let err = bad_mass.validate(stage).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataValidation);
        assert!(err.message().contains("index 1"));

        let mut bad_position = sample(2);
        bad_position.replace_positions(&[[0.0; 3], [f32::NAN, 0.0, 0.0]]).unwrap();
        assert!(bad_position.validate(stage).is_err());

        let mut bad_color = sample(2);
        bad_color.replace_colors(&[[1.0; 3], [0.5, 2.0, 0.5]]).unwrap();
        assert!(bad_color.validate(stage).is_err());
    }

    #[test]
    fn test_replace_checks_length_without_mutating() {
        let mut state = sample(3);
        let before = state.clone();
        assert!(state.replace_positions(&[[9.0; 3]; 2]).is_err());
        assert!(state.replace_masses(&[2.0; 4]).is_err());
        assert_eq!(state, before);

        state.replace_velocities(&[[7.0; 3]; 3]).unwrap();
        assert_eq!(state.velocities()[1], [7.0; 3]);
    }
}
