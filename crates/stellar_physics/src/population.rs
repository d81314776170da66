use rand::Rng;
use rand::distributions::{Distribution as _, WeightedIndex};
use rand_distr::LogNormal;
use stellar_core::constants::{MASS_LOG_MEAN, MASS_LOG_SIGMA};
use stellar_core::{EngineError, ParticleKind, Result, Stage, StarTemperature, Vec3};

/// Log-normal masses: mostly light bodies with rare heavy outliers
pub fn sample_masses<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Result<Vec<f32>> {
    let dist = LogNormal::new(MASS_LOG_MEAN, MASS_LOG_SIGMA).map_err(|e| {
        EngineError::initialization(Stage::MassGeneration, "bad mass distribution").with_source(e)
    })?;
    Ok((0..count).map(|_| dist.sample(rng)).collect())
}

/// Draw kinds with the fixed star/planet/black-hole weights
pub fn sample_kinds<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Result<Vec<ParticleKind>> {
    let weights = ParticleKind::ALL.map(|k| k.spawn_weight());
    let index = WeightedIndex::new(weights).map_err(|e| {
        EngineError::initialization(Stage::TypeColorGeneration, "bad kind weights").with_source(e)
    })?;
    Ok((0..count)
        .map(|_| ParticleKind::ALL[index.sample(rng)])
        .collect())
}

fn temperature_index() -> Result<WeightedIndex<f64>> {
    let weights = StarTemperature::ALL.map(|t| t.weight());
    WeightedIndex::new(weights).map_err(|e| {
        EngineError::initialization(Stage::TypeColorGeneration, "bad temperature weights")
            .with_source(e)
    })
}

/// Colors for a batch of kinds; each star draws its own temperature bucket
pub fn colors_for<R: Rng + ?Sized>(kinds: &[ParticleKind], rng: &mut R) -> Result<Vec<Vec3>> {
    let temperatures = temperature_index()?;
    Ok(kinds
        .iter()
        .map(|kind| match kind {
            ParticleKind::Star => StarTemperature::ALL[temperatures.sample(rng)].color(),
            other => other.color(StarTemperature::Yellow),
        })
        .collect())
}

pub fn color_for<R: Rng + ?Sized>(kind: ParticleKind, rng: &mut R) -> Result<Vec3> {
    let colors = colors_for(&[kind], rng)?;
    Ok(colors[0])
}
