pub mod diagnostics;
pub mod integrator;
pub mod orbits;
pub mod population;
pub mod procgen;

pub use diagnostics::SimulationStats;
pub use integrator::{StepReport, central_acceleration, euler_step};
pub use orbits::orbital_velocities;
pub use population::{color_for, colors_for, sample_kinds, sample_masses};
pub use procgen::generate_positions;
