use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use stellar_core::constants::SPAWN_EXTENT;
use stellar_core::{
    DriverConfig, EngineError, InitOptions, ParticleKind, RenderVertex, Result, SimulationMode,
};
use stellar_physics::SimulationStats;

use crate::engine::SimulationEngine;

/// Playback metadata that travels with a saved scenario
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playback {
    /// Simulation time elapsed since initialization
    pub elapsed: f64,
    pub speed: f32,
    pub mode: SimulationMode,
}

/// Owns the engine and the playback state of the fixed-tick loop,
/// tracked as a Bevy Resource
#[derive(Resource)]
pub struct SimulationDriver {
    engine: Box<dyn SimulationEngine>,
    config: DriverConfig,
    elapsed: f64,
    mode: SimulationMode,
    playing: bool,
    ticks: u64,
    /// Error that paused the loop, if any
    last_error: Option<EngineError>,
    /// Randomness for sandbox spawns
    rng: ChaCha8Rng,
}

impl SimulationDriver {
    pub fn new(engine: Box<dyn SimulationEngine>, config: DriverConfig) -> Self {
        Self {
            engine,
            config,
            elapsed: 0.0,
            mode: SimulationMode::Observation,
            playing: false,
            ticks: 0,
            last_error: None,
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    pub fn engine(&self) -> &dyn SimulationEngine {
        self.engine.as_ref()
    }

    pub fn engine_mut(&mut self) -> &mut dyn SimulationEngine {
        self.engine.as_mut()
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Start a new simulation. Playback stops and the clock restarts.
    pub fn start(&mut self, count: usize, options: &InitOptions) -> Result<()> {
        self.playing = false;
        self.elapsed = 0.0;
        self.ticks = 0;
        self.last_error = None;
        if let Some(seed) = options.seed {
            self.rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(7919));
        }
        self.engine.initialize(count, options)
    }

    pub fn play(&mut self) {
        if self.engine.is_ready() {
            self.playing = true;
            self.last_error = None;
        }
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn speed(&self) -> f32 {
        self.config.speed
    }

    /// Negative or non-finite speeds are clamped to 0
    pub fn set_speed(&mut self, speed: f32) {
        self.config.speed = if speed.is_finite() { speed.max(0.0) } else { 0.0 };
    }

    pub fn mode(&self) -> SimulationMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: SimulationMode) {
        if mode != self.mode {
            info!("Switched to {} mode", mode.name());
        }
        self.mode = mode;
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn last_error(&self) -> Option<&EngineError> {
        self.last_error.as_ref()
    }

    /// Advance one tick. Returns whether the engine was stepped.
    ///
    /// A failing step pauses playback and keeps the error for inspection;
    /// the loop does not retry on its own.
    pub fn tick(&mut self) -> bool {
        if !self.playing {
            return false;
        }

        let dt = self.config.base_dt * self.config.speed;
        match self.engine.step(dt) {
            Ok(()) => {
                self.elapsed += dt as f64;
                self.ticks += 1;
                true
            }
            Err(err) => {
                warn!("Simulation paused due to error: {err} ({})", err.kind().recovery_hint());
                self.playing = false;
                self.last_error = Some(err);
                false
            }
        }
    }

    /// Spawn a unit-mass body near the origin. Only honoured in sandbox mode;
    /// returns whether a body was added.
    pub fn spawn(&mut self, kind: ParticleKind) -> Result<bool> {
        if self.mode != SimulationMode::Sandbox {
            return Ok(false);
        }
        let position = [
            self.rng.gen_range(-SPAWN_EXTENT..=SPAWN_EXTENT),
            self.rng.gen_range(-SPAWN_EXTENT..=SPAWN_EXTENT),
            self.rng.gen_range(-SPAWN_EXTENT..=SPAWN_EXTENT),
        ];
        let velocity = [
            self.rng.gen_range(-1.0..=1.0),
            self.rng.gen_range(-1.0..=1.0),
            self.rng.gen_range(-1.0..=1.0),
        ];
        self.engine.add_particle(position, velocity, 1.0, kind)?;
        info!("Added {} (now {} particles)", kind.name(), self.engine.particle_count());
        Ok(true)
    }

    /// Back to the initial state; playback stops and the clock restarts
    pub fn reset(&mut self) {
        self.playing = false;
        self.elapsed = 0.0;
        self.ticks = 0;
        self.engine.reset();
    }

    pub fn playback(&self) -> Playback {
        Playback {
            elapsed: self.elapsed,
            speed: self.config.speed,
            mode: self.mode,
        }
    }

    pub fn restore_playback(&mut self, playback: Playback) {
        self.elapsed = playback.elapsed;
        self.set_speed(playback.speed);
        self.mode = playback.mode;
    }

    pub fn stats(&self) -> SimulationStats {
        SimulationStats::measure(&self.engine.snapshot())
    }

    /// One frame's worth of render data
    pub fn render_vertices(&self) -> Vec<RenderVertex> {
        RenderVertex::from_state(&self.engine.snapshot())
    }
}
