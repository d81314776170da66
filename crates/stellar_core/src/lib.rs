pub mod config;
pub mod constants;
pub mod error;
pub mod sanitize;
pub mod state;
pub mod telemetry;
pub mod types;
pub mod vertex;

pub use config::{Distribution, DriverConfig, InitOptions, OptionValue, PhysicsOptions};
pub use constants::*;
pub use error::{EngineError, ErrorKind, Result, Stage};
pub use state::{Particle, ParticleState, Vec3};
pub use telemetry::{MemoryTelemetry, Record, Severity, Telemetry, TracingTelemetry};
pub use types::*;
pub use vertex::RenderVertex;
