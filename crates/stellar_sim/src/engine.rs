use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stellar_core::{InitOptions, ParticleKind, ParticleState, Result, Severity, Telemetry, Vec3};

use crate::reference::ReferenceEngine;

/// Contract shared by every simulation backend.
///
/// Callers drive an engine through `initialize`, then `step` once per tick,
/// and read arrays back through the getters. Getters hand out copies and
/// return empty arrays on an engine that was never initialized; setters
/// copy the caller's data.
pub trait SimulationEngine: Send + Sync {
    fn name(&self) -> &'static str;

    /// Allocate and populate a fresh particle set, replacing any previous one.
    /// On failure the engine is left uninitialized.
    fn initialize(&mut self, count: usize, options: &InitOptions) -> Result<()>;

    fn is_ready(&self) -> bool;

    fn particle_count(&self) -> usize;

    /// Advance by `dt`. Fails without touching state if the engine is not
    /// ready, `dt` is negative, or the arrays are inconsistent.
    fn step(&mut self, dt: f32) -> Result<()>;

    fn positions(&self) -> Vec<Vec3>;
    fn velocities(&self) -> Vec<Vec3>;
    fn masses(&self) -> Vec<f32>;
    fn kinds(&self) -> Vec<ParticleKind>;
    fn colors(&self) -> Vec<Vec3>;

    fn set_positions(&mut self, positions: &[Vec3]) -> Result<()>;
    fn set_velocities(&mut self, velocities: &[Vec3]) -> Result<()>;
    fn set_masses(&mut self, masses: &[f32]) -> Result<()>;
    /// Replace kinds; colors are re-derived from the new kinds
    fn set_kinds(&mut self, kinds: &[ParticleKind]) -> Result<()>;
    /// Replace colors as given, components in [0, 1]. Kinds are untouched.
    fn set_colors(&mut self, colors: &[Vec3]) -> Result<()>;

    fn add_particle(
        &mut self,
        position: Vec3,
        velocity: Vec3,
        mass: f32,
        kind: ParticleKind,
    ) -> Result<()>;

    /// Remove the particle at `index`; later particles shift down by one
    fn remove_particle(&mut self, index: usize) -> Result<()>;

    /// Return positions and velocities to the state captured at initialization.
    /// No-op on an engine that was never initialized.
    fn reset(&mut self);

    /// Current arrays assembled into one state (empty if they disagree)
    fn snapshot(&self) -> ParticleState {
        ParticleState::from_parts(
            self.positions(),
            self.velocities(),
            self.masses(),
            self.kinds(),
            self.colors(),
        )
        .unwrap_or_default()
    }
}

/// Which engine implementation to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Backend {
    /// Pure-CPU fallback engine
    #[default]
    Reference,
    /// Native N-body engine (OpenMP/CUDA/compute shaders)
    Accelerated,
}

impl Backend {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "reference" | "mock" => Some(Self::Reference),
            "accelerated" | "single" | "openmp" | "cuda" | "opengl" => Some(Self::Accelerated),
            _ => None,
        }
    }

    /// Whether this build can construct the backend
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Reference)
    }
}

/// Construct an engine for `backend`, falling back to the reference engine
/// when the requested backend is not linked into this build
pub fn create_engine(
    backend: Backend,
    telemetry: Arc<dyn Telemetry>,
) -> Box<dyn SimulationEngine> {
    if !backend.is_available() {
        telemetry.record(
            Severity::Warning,
            "requested backend is unavailable, falling back to the reference engine",
            &[("backend", format!("{backend:?}"))],
        );
    }
    Box::new(ReferenceEngine::new(telemetry))
}
