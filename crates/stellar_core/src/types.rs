use serde::{Deserialize, Serialize};

/// Kinds of bodies in the simulation
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticleKind {
    Star = 0,
    Planet = 1,
    BlackHole = 2,
}

impl ParticleKind {
    pub const ALL: [ParticleKind; 3] = [Self::Star, Self::Planet, Self::BlackHole];

    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::Star),
            1 => Some(Self::Planet),
            2 => Some(Self::BlackHole),
            _ => None,
        }
    }

    /// Parse the spawn-menu key ("star", "planet", "black_hole")
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "star" => Some(Self::Star),
            "planet" => Some(Self::Planet),
            "black_hole" => Some(Self::BlackHole),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Star => "Star",
            Self::Planet => "Planet",
            Self::BlackHole => "Black Hole",
        }
    }

    /// Probability of drawing this kind for a generated particle
    pub fn spawn_weight(&self) -> f64 {
        match self {
            Self::Star => 0.85,
            Self::Planet => 0.14,
            Self::BlackHole => 0.01,
        }
    }

    /// Render color [r, g, b]. Stars take the color of their temperature
    /// bucket; planets and black holes have a fixed color.
    pub fn color(&self, temperature: StarTemperature) -> [f32; 3] {
        match self {
            Self::Star => temperature.color(),
            Self::Planet => [0.35, 0.45, 0.65],
            Self::BlackHole => [0.8, 0.2, 0.8],
        }
    }
}

/// Color-temperature bucket for stars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StarTemperature {
    Blue,
    White,
    Yellow,
    Orange,
    Red,
}

impl StarTemperature {
    pub const ALL: [StarTemperature; 5] = [
        Self::Blue,
        Self::White,
        Self::Yellow,
        Self::Orange,
        Self::Red,
    ];

    pub fn weight(&self) -> f64 {
        match self {
            Self::Blue => 0.1,
            Self::White => 0.2,
            Self::Yellow => 0.4,
            Self::Orange => 0.2,
            Self::Red => 0.1,
        }
    }

    pub fn color(&self) -> [f32; 3] {
        match self {
            Self::Blue => [0.5, 0.7, 1.0],
            Self::White => [1.0, 1.0, 1.0],
            Self::Yellow => [1.0, 1.0, 0.6],
            Self::Orange => [1.0, 0.7, 0.3],
            Self::Red => [1.0, 0.3, 0.2],
        }
    }
}

/// Interaction mode of the driving application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SimulationMode {
    /// Watch only
    #[default]
    Observation,
    /// User may spawn bodies
    Sandbox,
}

impl SimulationMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Observation => "Observation",
            Self::Sandbox => "Sandbox",
        }
    }
}
