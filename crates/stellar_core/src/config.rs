use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    BASE_DT, DEFAULT_G, DEFAULT_SCALE, DEFAULT_SOFTENING, DEFAULT_THETA, TICK_HZ,
};
use crate::error::{EngineError, Result, Stage};

/// Spatial pattern used to seed initial positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Distribution {
    /// Uniform inside a ball
    #[default]
    Sphere,
    /// Thin exponential disk
    Disk,
    /// Spherical bulge plus spiral arms
    Galaxy,
    /// Uniform inside a cube
    Random,
}

impl Distribution {
    /// Unrecognized keys fall back to `Random`
    pub fn from_key(key: &str) -> Self {
        match key {
            "sphere" => Self::Sphere,
            "disk" => Self::Disk,
            "galaxy" => Self::Galaxy,
            _ => Self::Random,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Sphere => "sphere",
            Self::Disk => "disk",
            Self::Galaxy => "galaxy",
            Self::Random => "random",
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Value of a named configuration option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl OptionValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// Configuration passed to `initialize`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitOptions {
    pub distribution: Distribution,
    /// Spatial scale in world units; must be positive
    pub scale: f32,
    /// Seed for reproducible generation; `None` draws from entropy
    pub seed: Option<u64>,
    /// Backend-specific options, ignored by the reference engine
    pub extensions: BTreeMap<String, OptionValue>,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            distribution: Distribution::Sphere,
            scale: DEFAULT_SCALE,
            seed: None,
            extensions: BTreeMap::new(),
        }
    }
}

impl InitOptions {
    pub fn with_distribution(mut self, distribution: Distribution) -> Self {
        self.distribution = distribution;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    /// Build options from a named key/value surface.
    ///
    /// `distribution`, `scale` and `seed` are interpreted; every other key is
    /// kept verbatim in `extensions`.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, OptionValue)>,
    {
        let mut options = Self::default();
        for (key, value) in pairs {
            match key {
                "distribution" => match &value {
                    OptionValue::Text(name) => options.distribution = Distribution::from_key(name),
                    other => return Err(bad_option(key, other)),
                },
                "scale" => match value.as_f64() {
                    Some(scale) => options.scale = scale as f32,
                    None => return Err(bad_option(key, &value)),
                },
                "seed" => match value {
                    OptionValue::Int(seed) if seed >= 0 => options.seed = Some(seed as u64),
                    other => return Err(bad_option(key, &other)),
                },
                _ => {
                    options.extensions.insert(key.to_string(), value);
                }
            }
        }
        Ok(options)
    }

    /// Typed view over the accelerated-backend extension keys
    pub fn physics(&self) -> PhysicsOptions {
        PhysicsOptions::from_extensions(&self.extensions)
    }
}

fn bad_option(key: &str, value: &OptionValue) -> EngineError {
    EngineError::initialization(
        Stage::Configuration,
        format!("invalid value for option '{key}': {value}"),
    )
}

/// Physics parameters understood by accelerated backends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsOptions {
    pub gravitational_constant: f32,
    pub softening: f32,
    /// Barnes-Hut opening angle
    pub theta: f32,
    pub enable_collisions: bool,
}

impl Default for PhysicsOptions {
    fn default() -> Self {
        Self {
            gravitational_constant: DEFAULT_G,
            softening: DEFAULT_SOFTENING,
            theta: DEFAULT_THETA,
            enable_collisions: false,
        }
    }
}

impl PhysicsOptions {
    pub const KEYS: [&'static str; 5] = ["G", "softening", "theta", "enable_collisions", "backend"];

    pub fn from_extensions(extensions: &BTreeMap<String, OptionValue>) -> Self {
        let mut physics = Self::default();
        if let Some(g) = extensions.get("G").and_then(OptionValue::as_f64) {
            physics.gravitational_constant = g as f32;
        }
        if let Some(eps) = extensions.get("softening").and_then(OptionValue::as_f64) {
            physics.softening = eps as f32;
        }
        if let Some(theta) = extensions.get("theta").and_then(OptionValue::as_f64) {
            physics.theta = theta as f32;
        }
        if let Some(on) = extensions.get("enable_collisions").and_then(OptionValue::as_bool) {
            physics.enable_collisions = on;
        }
        physics
    }
}

/// Settings for the fixed-tick driving loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Simulation-time delta per tick at speed 1.0
    pub base_dt: f32,
    /// Speed multiplier applied before the delta reaches the engine
    pub speed: f32,
    /// Ticks per wall-clock second
    pub tick_hz: f64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            base_dt: BASE_DT,
            speed: 1.0,
            tick_hz: TICK_HZ,
        }
    }
}
