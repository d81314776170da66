//! Simulation engines and the fixed-tick loop that drives them

pub mod driver;
pub mod engine;
pub mod pipeline;
pub mod reference;

pub use driver::{Playback, SimulationDriver};
pub use engine::{Backend, SimulationEngine, create_engine};
pub use pipeline::SimulationPlugin;
pub use reference::ReferenceEngine;
