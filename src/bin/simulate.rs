//! Batch run: evolve one population per distribution and seed,
//! print summary statistics, and save the final state of each run.

use std::error::Error;
use std::sync::Arc;
use stellar_core::{Distribution, DriverConfig, InitOptions, TracingTelemetry};
use stellar_physics::SimulationStats;
use stellar_sim::{Backend, SimulationDriver, create_engine};
use stellar_storage::{ScenarioSnapshot, ScenarioStore};

const PARTICLES: usize = 1000;
const STEPS: u64 = 1000;
const RUNS_PER_DISTRIBUTION: u64 = 5;
const DISTRIBUTIONS: [Distribution; 4] = [
    Distribution::Sphere,
    Distribution::Disk,
    Distribution::Galaxy,
    Distribution::Random,
];

struct RunResult {
    distribution: Distribution,
    seed: u64,
    start: SimulationStats,
    end: SimulationStats,
    /// Steps completed before the run stopped
    steps: u64,
}

fn run(
    distribution: Distribution,
    seed: u64,
    store: &ScenarioStore,
) -> Result<RunResult, Box<dyn Error>> {
    let options = InitOptions::default()
        .with_distribution(distribution)
        .with_seed(seed);
    let engine = create_engine(Backend::Reference, Arc::new(TracingTelemetry::new("batch")));
    let mut driver = SimulationDriver::new(engine, DriverConfig::default());
    driver.start(PARTICLES, &options)?;
    let start = driver.stats();

    driver.play();
    while driver.ticks() < STEPS && driver.tick() {}
    if let Some(err) = driver.last_error() {
        eprintln!("  {distribution} seed {seed} stopped early: {err}");
    }

    let name = format!("{}_{seed}", distribution.key());
    let snapshot = ScenarioSnapshot::capture(name, driver.engine(), driver.playback(), &options)?;
    store.save(&snapshot)?;

    Ok(RunResult {
        distribution,
        seed,
        start,
        end: driver.stats(),
        steps: driver.ticks(),
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    let store = ScenarioStore::new("scenarios");
    let total = DISTRIBUTIONS.len() as u64 * RUNS_PER_DISTRIBUTION;

    eprintln!("Running {total} simulations of {PARTICLES} particles for {STEPS} steps...");

    let mut results = Vec::new();
    for (d, distribution) in DISTRIBUTIONS.into_iter().enumerate() {
        for r in 0..RUNS_PER_DISTRIBUTION {
            let seed = 1000 + r * 7919;
            results.push(run(distribution, seed, &store)?);
            let done = d as u64 * RUNS_PER_DISTRIBUTION + r + 1;
            eprint!("  {done}/{total}...\r");
        }
    }
    eprintln!("Done. Scenarios saved to {}", store.root().display());

    println!(
        "{:<8} {:>6} {:>6} {:>6} {:>6} {:>4} {:>12} {:>12} {:>9} {:>9}",
        "dist", "seed", "steps", "stars", "planet", "bh", "KE start", "KE end", "r start", "r end"
    );
    for result in &results {
        println!(
            "{:<8} {:>6} {:>6} {:>6} {:>6} {:>4} {:>12.4e} {:>12.4e} {:>9.2} {:>9.2}",
            result.distribution.key(),
            result.seed,
            result.steps,
            result.end.stars,
            result.end.planets,
            result.end.black_holes,
            result.start.kinetic_energy,
            result.end.kinetic_energy,
            result.start.max_radius,
            result.end.max_radius,
        );
    }

    for distribution in DISTRIBUTIONS {
        let runs: Vec<_> = results.iter().filter(|r| r.distribution == distribution).collect();
        let mean_speed = runs.iter().map(|r| r.end.mean_speed).sum::<f64>() / runs.len() as f64;
        println!("{distribution}: mean final speed {mean_speed:.3} over {} runs", runs.len());
    }
    Ok(())
}
