//! Pure-CPU reference engine.
//!
//! Integrates every particle under a single central pull toward the origin
//! (see [`stellar_physics::central_acceleration`]) rather than pairwise
//! gravity, so a step costs O(N). This is a known divergence from the
//! accelerated backends, which compute true N-body forces.

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use stellar_core::sanitize::{sanitize_vectors, sanitized};
use stellar_core::{
    EngineError, InitOptions, Particle, ParticleKind, ParticleState, PhysicsOptions, Result,
    Severity, Stage, Telemetry, TracingTelemetry, Vec3,
};
use stellar_physics::procgen::check_scale;
use stellar_physics::{
    StepReport, color_for, colors_for, euler_step, generate_positions, orbital_velocities,
    sample_kinds, sample_masses,
};

use crate::engine::SimulationEngine;

pub struct ReferenceEngine {
    /// `None` until an `initialize` succeeds
    state: Option<ParticleState>,
    /// Frozen copy taken right after initialization, used by `reset`
    initial: Option<ParticleState>,
    options: InitOptions,
    rng: ChaCha8Rng,
    telemetry: Arc<dyn Telemetry>,
    last_report: StepReport,
}

impl ReferenceEngine {
    pub fn new(telemetry: Arc<dyn Telemetry>) -> Self {
        Self {
            state: None,
            initial: None,
            options: InitOptions::default(),
            rng: ChaCha8Rng::from_entropy(),
            telemetry,
            last_report: StepReport::default(),
        }
    }

    /// Options of the last successful initialization
    pub fn options(&self) -> &InitOptions {
        &self.options
    }

    /// Sanitization counts from the most recent step
    pub fn last_step_report(&self) -> StepReport {
        self.last_report
    }

    pub fn state(&self) -> Option<&ParticleState> {
        self.state.as_ref()
    }

    fn record(&self, severity: Severity, message: &str, context: &[(&str, String)]) {
        self.telemetry.record(severity, message, context);
    }

    /// Log a failed generation stage and wrap it as an initialization error
    fn stage_failed(&self, stage: Stage, err: EngineError) -> EngineError {
        self.record(
            Severity::Error,
            "initialization stage failed",
            &[("stage", stage.to_string()), ("error", err.to_string())],
        );
        EngineError::initialization(stage, format!("failed during {stage}")).with_source(err)
    }

    fn populate(
        &self,
        count: usize,
        options: &InitOptions,
        rng: &mut ChaCha8Rng,
    ) -> Result<ParticleState> {
        let telemetry = self.telemetry.as_ref();

        let positions =
            generate_positions(options.distribution, count, options.scale, rng, telemetry)
                .map_err(|e| self.stage_failed(Stage::PositionGeneration, e))?;

        let velocities = orbital_velocities(&positions, rng, telemetry)
            .and_then(|v| expect_len(Stage::VelocityGeneration, "velocities", count, v))
            .map_err(|e| self.stage_failed(Stage::VelocityGeneration, e))?;

        let masses = sample_masses(count, rng)
            .and_then(|m| expect_len(Stage::MassGeneration, "masses", count, m))
            .map_err(|e| self.stage_failed(Stage::MassGeneration, e))?;

        let (kinds, colors) = sample_kinds(count, rng)
            .and_then(|kinds| {
                let colors = colors_for(&kinds, rng)?;
                Ok((kinds, colors))
            })
            .map_err(|e| self.stage_failed(Stage::TypeColorGeneration, e))?;

        ParticleState::from_parts(positions, velocities, masses, kinds, colors)
            .map_err(|e| self.stage_failed(Stage::Snapshot, e))
    }

    fn log_ignored_options(&self, options: &InitOptions) {
        for (key, value) in &options.extensions {
            let message = if PhysicsOptions::KEYS.contains(&key.as_str()) {
                "accelerated-only option ignored by the reference engine"
            } else {
                "unrecognized option ignored"
            };
            self.record(
                Severity::Debug,
                message,
                &[("key", key.clone()), ("value", value.to_string())],
            );
        }
    }

    fn ready_state(&mut self, stage: Stage) -> Result<&mut ParticleState> {
        self.state
            .as_mut()
            .ok_or_else(|| EngineError::simulation(stage, "engine not initialized"))
    }

    /// Copy caller vectors, zeroing non-finite components with a warning
    fn sanitized_copy(&self, what: &str, values: &[Vec3]) -> Vec<Vec3> {
        let mut copy = values.to_vec();
        let replaced = sanitize_vectors(&mut copy);
        if replaced > 0 {
            self.record(
                Severity::Warning,
                "replaced non-finite values in caller data",
                &[("array", what.to_string()), ("replaced", replaced.to_string())],
            );
        }
        copy
    }

    fn report_sanitized(&self, report: StepReport, dt: f32) {
        for (what, replaced) in [
            ("positions", report.positions),
            ("accelerations", report.accelerations),
            ("velocities", report.velocities),
        ] {
            if replaced > 0 {
                self.record(
                    Severity::Warning,
                    "non-finite values replaced during step",
                    &[
                        ("array", what.to_string()),
                        ("replaced", replaced.to_string()),
                        ("dt", dt.to_string()),
                    ],
                );
            }
        }
    }
}

impl Default for ReferenceEngine {
    fn default() -> Self {
        Self::new(Arc::new(TracingTelemetry::new("reference_engine")))
    }
}

fn expect_len<T>(stage: Stage, what: &str, expected: usize, values: Vec<T>) -> Result<Vec<T>> {
    if values.len() != expected {
        return Err(EngineError::size_mismatch(stage, what, expected, values.len()));
    }
    Ok(values)
}

fn check_mass(stage: Stage, mass: f32) -> Result<()> {
    if !(mass.is_finite() && mass > 0.0) {
        return Err(EngineError::data_validation(
            stage,
            format!("mass must be positive and finite, got {mass}"),
        ));
    }
    Ok(())
}

impl SimulationEngine for ReferenceEngine {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn initialize(&mut self, count: usize, options: &InitOptions) -> Result<()> {
        // Any previous population is discarded, even if this call fails
        self.state = None;
        self.initial = None;
        self.last_report = StepReport::default();

        if count == 0 {
            let err = EngineError::initialization(
                Stage::Configuration,
                "particle count must be positive",
            );
            self.record(
                Severity::Error,
                "invalid particle count",
                &[("particle_count", "0".to_string())],
            );
            return Err(err);
        }
        if let Err(err) = check_scale(options.scale) {
            self.record(
                Severity::Error,
                "invalid scale",
                &[("scale", options.scale.to_string())],
            );
            return Err(err);
        }

        self.log_ignored_options(options);

        let mut rng = match options.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let state = self.populate(count, options, &mut rng)?;

        self.initial = Some(state.clone());
        self.state = Some(state);
        self.rng = rng;
        self.options = options.clone();

        self.record(
            Severity::Info,
            "reference engine initialized",
            &[
                ("particle_count", count.to_string()),
                ("distribution", options.distribution.to_string()),
                ("scale", options.scale.to_string()),
            ],
        );
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.state.is_some()
    }

    fn particle_count(&self) -> usize {
        self.state.as_ref().map_or(0, ParticleState::len)
    }

    fn step(&mut self, dt: f32) -> Result<()> {
        if !(dt.is_finite() && dt >= 0.0) {
            return Err(EngineError::simulation(Stage::Step, format!("invalid time step {dt}")));
        }
        let state = self.ready_state(Stage::Step)?;
        if !state.is_consistent() {
            return Err(EngineError::simulation(
                Stage::Step,
                "particle arrays have mismatched lengths",
            ));
        }

        let (positions, velocities) = state.kinematics_mut();
        let report = euler_step(positions, velocities, dt);
        self.last_report = report;
        self.report_sanitized(report, dt);
        Ok(())
    }

    fn positions(&self) -> Vec<Vec3> {
        match &self.state {
            Some(state) => state.positions().to_vec(),
            None => {
                self.record(Severity::Warning, "positions requested before initialization", &[]);
                Vec::new()
            }
        }
    }

    fn velocities(&self) -> Vec<Vec3> {
        self.state.as_ref().map(|s| s.velocities().to_vec()).unwrap_or_default()
    }

    fn masses(&self) -> Vec<f32> {
        self.state.as_ref().map(|s| s.masses().to_vec()).unwrap_or_default()
    }

    fn kinds(&self) -> Vec<ParticleKind> {
        self.state.as_ref().map(|s| s.kinds().to_vec()).unwrap_or_default()
    }

    fn colors(&self) -> Vec<Vec3> {
        self.state.as_ref().map(|s| s.colors().to_vec()).unwrap_or_default()
    }

    fn set_positions(&mut self, positions: &[Vec3]) -> Result<()> {
        let copy = self.sanitized_copy("positions", positions);
        self.ready_state(Stage::StateUpdate)?.replace_positions(&copy)
    }

    fn set_velocities(&mut self, velocities: &[Vec3]) -> Result<()> {
        let copy = self.sanitized_copy("velocities", velocities);
        self.ready_state(Stage::StateUpdate)?.replace_velocities(&copy)
    }

    fn set_masses(&mut self, masses: &[f32]) -> Result<()> {
        let state = self.ready_state(Stage::StateUpdate)?;
        if state.len() != masses.len() {
            return Err(EngineError::size_mismatch(
                Stage::StateUpdate,
                "masses",
                state.len(),
                masses.len(),
            ));
        }
        for &mass in masses {
            check_mass(Stage::StateUpdate, mass)?;
        }
        state.replace_masses(masses)
    }

    fn set_kinds(&mut self, kinds: &[ParticleKind]) -> Result<()> {
        let expected = self.ready_state(Stage::StateUpdate)?.len();
        if expected != kinds.len() {
            return Err(EngineError::size_mismatch(
                Stage::StateUpdate,
                "kinds",
                expected,
                kinds.len(),
            ));
        }
        let colors = colors_for(kinds, &mut self.rng)?;
        self.ready_state(Stage::StateUpdate)?.replace_kinds(kinds, &colors)
    }

    fn set_colors(&mut self, colors: &[Vec3]) -> Result<()> {
        let state = self.ready_state(Stage::StateUpdate)?;
        if let Some(i) = colors
            .iter()
            .position(|c| !c.iter().all(|x| (0.0..=1.0).contains(x)))
        {
            return Err(EngineError::data_validation(
                Stage::StateUpdate,
                format!("color at index {i} is outside [0, 1]"),
            ));
        }
        state.replace_colors(colors)
    }

    fn add_particle(
        &mut self,
        position: Vec3,
        velocity: Vec3,
        mass: f32,
        kind: ParticleKind,
    ) -> Result<()> {
        if !self.is_ready() {
            return Err(EngineError::simulation(Stage::StateUpdate, "engine not initialized"));
        }
        check_mass(Stage::StateUpdate, mass)?;

        let clean_position = sanitized(position);
        let clean_velocity = sanitized(velocity);
        if clean_position != position || clean_velocity != velocity {
            self.record(Severity::Warning, "added particle had non-finite components", &[]);
        }

        let color = color_for(kind, &mut self.rng)?;
        self.ready_state(Stage::StateUpdate)?.push(Particle {
            position: clean_position,
            velocity: clean_velocity,
            mass,
            kind,
            color,
        });
        Ok(())
    }

    fn remove_particle(&mut self, index: usize) -> Result<()> {
        let state = self.ready_state(Stage::StateUpdate)?;
        let count = state.len();
        state.remove(index).map(|_| ()).ok_or_else(|| {
            EngineError::data_validation(
                Stage::StateUpdate,
                format!("particle index {index} out of range for {count} particles"),
            )
        })
    }

    fn reset(&mut self) {
        let (Some(state), Some(initial)) = (self.state.as_mut(), self.initial.as_ref()) else {
            self.telemetry.record(Severity::Debug, "reset ignored, engine not initialized", &[]);
            return;
        };

        // Particles added or removed since initialization are dropped along
        // with their kinematics so the arrays keep one length.
        let restored = state.len() == initial.len()
            && state.replace_positions(initial.positions()).is_ok()
            && state.replace_velocities(initial.velocities()).is_ok();
        if !restored {
            *state = initial.clone();
        }
        self.last_report = StepReport::default();
        self.telemetry.record(
            Severity::Info,
            "simulation reset to initial state",
            &[("particle_count", initial.len().to_string())],
        );
    }
}
