//! Engine error type.
//!
//! A single error carries the failure class, the stage it happened in and an
//! optional underlying cause, instead of one wrapper type per sub-stage.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad configuration or generation failure before the engine is usable
    Initialization,
    /// Failure during a step on a ready engine
    Simulation,
    /// Array shape, size or content mismatch
    DataValidation,
}

impl ErrorKind {
    /// Short suggestion for the driving application to surface to a user
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::Initialization => {
                "reduce the particle count or check the configured distribution and scale"
            }
            Self::Simulation => "reset the simulation or reload the last saved scenario",
            Self::DataValidation => "reload from file or start a new simulation",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initialization => "initialization error",
            Self::Simulation => "simulation error",
            Self::DataValidation => "data validation error",
        };
        f.write_str(name)
    }
}

/// Where in the engine lifecycle an error was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Configuration,
    PositionGeneration,
    VelocityGeneration,
    MassGeneration,
    TypeColorGeneration,
    Snapshot,
    Step,
    StateUpdate,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::PositionGeneration => "position_generation",
            Self::VelocityGeneration => "velocity_generation",
            Self::MassGeneration => "mass_generation",
            Self::TypeColorGeneration => "type_color_generation",
            Self::Snapshot => "snapshot",
            Self::Step => "step",
            Self::StateUpdate => "state_update",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
#[error("{kind} during {stage}: {message}")]
pub struct EngineError {
    kind: ErrorKind,
    stage: Stage,
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl EngineError {
    pub fn new(kind: ErrorKind, stage: Stage, message: impl Into<String>) -> Self {
        Self {
            kind,
            stage,
            message: message.into(),
            source: None,
        }
    }

    pub fn initialization(stage: Stage, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Initialization, stage, message)
    }

    pub fn simulation(stage: Stage, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Simulation, stage, message)
    }

    pub fn data_validation(stage: Stage, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DataValidation, stage, message)
    }

    /// Array length mismatch, reported with both counts
    pub fn size_mismatch(stage: Stage, what: &str, expected: usize, actual: usize) -> Self {
        Self::data_validation(
            stage,
            format!("{what}: expected {expected} entries, got {actual}"),
        )
    }

    /// Attach the underlying cause
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
    ) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
