use bevy::prelude::*;
use stellar_core::constants::TICK_HZ;

use crate::driver::SimulationDriver;

/// Ticks between two stats lines in the log
const STATS_INTERVAL: u64 = 600;

/// Bevy plugin that advances the `SimulationDriver` resource on a fixed clock
pub struct SimulationPlugin {
    pub tick_hz: f64,
}

impl Default for SimulationPlugin {
    fn default() -> Self {
        Self { tick_hz: TICK_HZ }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(self.tick_hz))
            .add_systems(FixedUpdate, simulation_tick.run_if(resource_exists::<SimulationDriver>));
    }
}

/// One fixed tick of the simulation
fn simulation_tick(mut driver: ResMut<SimulationDriver>) {
    let was_playing = driver.is_playing();
    if driver.tick() {
        if driver.ticks() % STATS_INTERVAL == 0 {
            let stats = driver.stats();
            info!(
                "t={:.2} particles={} KE={:.3e} max_r={:.1}",
                driver.elapsed(),
                stats.particle_count,
                stats.kinetic_energy,
                stats.max_radius
            );
        }
    } else if was_playing {
        if let Some(err) = driver.last_error() {
            error!("Simulation stopped: {err}");
        }
    }
}
