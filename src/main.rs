use bevy::log::LogPlugin;
use bevy::prelude::*;
use std::sync::Arc;
use stellar_core::constants::DEFAULT_PARTICLE_COUNT;
use stellar_core::{Distribution, DriverConfig, InitOptions, TracingTelemetry};
use stellar_sim::{Backend, SimulationDriver, SimulationPlugin, create_engine};

/// What to build at startup, taken from the command line:
/// `stellarforge [count] [distribution] [seed] [backend]`
#[derive(Resource, Clone)]
struct LaunchSettings {
    count: usize,
    options: InitOptions,
}

impl LaunchSettings {
    fn from_args() -> (Self, Backend) {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let count = args
            .first()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PARTICLE_COUNT);
        let distribution = args
            .get(1)
            .map(|s| Distribution::from_key(s))
            .unwrap_or_default();
        let mut options = InitOptions::default().with_distribution(distribution);
        if let Some(seed) = args.get(2).and_then(|s| s.parse().ok()) {
            options = options.with_seed(seed);
        }
        let backend = args
            .get(3)
            .and_then(|s| Backend::from_key(s))
            .unwrap_or_default();
        (Self { count, options }, backend)
    }
}

fn main() {
    let (settings, backend) = LaunchSettings::from_args();
    let config = DriverConfig::default();
    let engine = create_engine(backend, Arc::new(TracingTelemetry::new("engine")));

    App::new()
        .add_plugins(MinimalPlugins)
        .add_plugins(LogPlugin::default())
        .insert_resource(SimulationDriver::new(engine, config.clone()))
        .insert_resource(settings)
        .add_plugins(SimulationPlugin {
            tick_hz: config.tick_hz,
        })
        .add_systems(Startup, start_simulation)
        .run();
}

fn start_simulation(
    mut driver: ResMut<SimulationDriver>,
    settings: Res<LaunchSettings>,
    mut exit: EventWriter<AppExit>,
) {
    match driver.start(settings.count, &settings.options) {
        Ok(()) => {
            info!(
                "Started {} particles ({}) on the {} engine",
                driver.engine().particle_count(),
                settings.options.distribution,
                driver.engine().name()
            );
            driver.play();
        }
        Err(err) => {
            error!("Failed to start simulation: {err} ({})", err.kind().recovery_hint());
            exit.send(AppExit::error());
        }
    }
}
