//! Scenario persistence: a full particle population plus the options and
//! playback state needed to pick a run back up, stored as bincode.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use stellar_core::{EngineError, InitOptions, ParticleState, Stage};
use stellar_sim::{Playback, SimulationEngine};
use thiserror::Error;
use uuid::Uuid;

/// File extension of saved scenarios
pub const SCENARIO_EXTENSION: &str = "scenario";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),
    #[error("no scenario named {0:?}")]
    NotFound(String),
    #[error("invalid scenario name {0:?}")]
    InvalidName(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Complete scenario for save/load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSnapshot {
    pub id: Uuid,
    pub name: String,
    pub playback: Playback,
    /// Options the population was originally generated with
    pub options: InitOptions,
    pub state: ParticleState,
}

impl ScenarioSnapshot {
    /// Capture the current population of `engine`. An empty population is
    /// refused, since it could not be initialized again on load.
    pub fn capture(
        name: impl Into<String>,
        engine: &dyn SimulationEngine,
        playback: Playback,
        options: &InitOptions,
    ) -> Result<Self> {
        if !engine.is_ready() {
            return Err(
                EngineError::simulation(Stage::Snapshot, "engine is not initialized").into(),
            );
        }
        let state = engine.snapshot();
        if state.len() != engine.particle_count() {
            return Err(EngineError::size_mismatch(
                Stage::Snapshot,
                "snapshot particles",
                engine.particle_count(),
                state.len(),
            )
            .into());
        }
        let snapshot = Self {
            id: Uuid::new_v4(),
            name: name.into(),
            playback,
            options: options.clone(),
            state,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Everything `restore_into` needs to succeed once it starts touching
    /// an engine
    pub fn validate(&self) -> Result<()> {
        if self.state.is_empty() {
            return Err(EngineError::data_validation(
                Stage::Snapshot,
                format!("scenario {:?} has no particles", self.name),
            )
            .into());
        }
        self.state.validate(Stage::Snapshot)?;
        Ok(())
    }

    /// Re-initialize `engine` from the stored options, then overwrite its
    /// arrays with the stored population. The snapshot is validated first,
    /// so an invalid one leaves `engine` as it was.
    pub fn restore_into(&self, engine: &mut dyn SimulationEngine) -> Result<Playback> {
        self.validate()?;
        engine.initialize(self.state.len(), &self.options)?;
        engine.set_positions(self.state.positions())?;
        engine.set_velocities(self.state.velocities())?;
        engine.set_masses(self.state.masses())?;
        engine.set_kinds(self.state.kinds())?;
        engine.set_colors(self.state.colors())?;
        Ok(self.playback)
    }
}

/// Save a snapshot to disk as bincode
pub fn save_snapshot(snapshot: &ScenarioSnapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = bincode::serialize(snapshot)?;
    fs::write(path, data)?;
    Ok(())
}

/// Load a snapshot from disk
pub fn load_snapshot(path: &Path) -> Result<ScenarioSnapshot> {
    let data = fs::read(path)?;
    let snapshot: ScenarioSnapshot = bincode::deserialize(&data)?;
    snapshot.validate()?;
    Ok(snapshot)
}

/// Directory of named scenarios, one file per name
#[derive(Debug, Clone)]
pub struct ScenarioStore {
    root: PathBuf,
}

impl ScenarioStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `snapshot` under its name, replacing any earlier save
    pub fn save(&self, snapshot: &ScenarioSnapshot) -> Result<PathBuf> {
        let path = self.path_for(&snapshot.name)?;
        save_snapshot(snapshot, &path)?;
        Ok(path)
    }

    pub fn load(&self, name: &str) -> Result<ScenarioSnapshot> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(StorageError::NotFound(name.to_string()));
        }
        load_snapshot(&path)
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(StorageError::NotFound(name.to_string()));
        }
        fs::remove_file(path)?;
        Ok(())
    }

    /// Names of all saved scenarios, sorted. A missing directory holds none.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SCENARIO_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(format!("{name}.{SCENARIO_EXTENSION}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use stellar_core::{Distribution, MemoryTelemetry, ParticleKind, SimulationMode};
    use stellar_sim::ReferenceEngine;

    fn engine() -> ReferenceEngine {
        ReferenceEngine::new(Arc::new(MemoryTelemetry::new()))
    }

    fn options() -> InitOptions {
        InitOptions::default()
            .with_distribution(Distribution::Galaxy)
            .with_scale(30.0)
            .with_seed(42)
    }

    fn playback() -> Playback {
        Playback {
            elapsed: 3.5,
            speed: 2.0,
            mode: SimulationMode::Sandbox,
        }
    }

    #[test]
    fn test_save_load_restore() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScenarioStore::new(dir.path());

        let mut source = engine();
        source.initialize(40, &options()).unwrap();
        for _ in 0..10 {
            source.step(0.016).unwrap();
        }
        source
            .add_particle([1.0, 2.0, 3.0], [0.0, 0.5, 0.0], 4.0, ParticleKind::BlackHole)
            .unwrap();

        let snapshot =
            ScenarioSnapshot::capture("orbit-test", &source, playback(), &options()).unwrap();
        let path = store.save(&snapshot).unwrap();
        assert!(path.ends_with("orbit-test.scenario"));

        let loaded = store.load("orbit-test").unwrap();
        assert_eq!(loaded, snapshot);

        let mut target = engine();
        let restored = loaded.restore_into(&mut target).unwrap();
        assert_eq!(restored, playback());
        assert_eq!(target.particle_count(), 41);
        assert_eq!(target.positions(), source.positions());
        assert_eq!(target.velocities(), source.velocities());
        assert_eq!(target.masses(), source.masses());
        assert_eq!(target.kinds(), source.kinds());
        assert_eq!(target.colors(), source.colors());
    }

    #[test]
    fn test_empty_population_is_not_saved() {
        let mut source = engine();
        source.initialize(2, &options()).unwrap();
        source.remove_particle(1).unwrap();
        source.remove_particle(0).unwrap();
        assert!(source.is_ready());

        let err = ScenarioSnapshot::capture("empty", &source, playback(), &options()).unwrap_err();
        assert!(matches!(err, StorageError::Engine(_)));
    }

    #[test]
    fn test_invalid_snapshot_leaves_engine_untouched() {
        let mut source = engine();
        source.initialize(3, &options()).unwrap();
        let mut snapshot =
            ScenarioSnapshot::capture("bad", &source, playback(), &options()).unwrap();
        snapshot.state.replace_positions(&[[9.0; 3]; 3]).unwrap();
        snapshot.state.replace_masses(&[1.0, -1.0, 1.0]).unwrap();

        let mut target = engine();
        target.initialize(5, &options().with_seed(7)).unwrap();
        let before = target.snapshot();

        let err = snapshot.restore_into(&mut target).unwrap_err();
        assert!(matches!(err, StorageError::Engine(_)));
        assert!(target.is_ready());
        assert_eq!(target.snapshot(), before);

        let mut fresh = engine();
        assert!(snapshot.restore_into(&mut fresh).is_err());
        assert!(!fresh.is_ready());
    }

    #[test]
    fn test_load_rejects_invalid_contents() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScenarioStore::new(dir.path());
        let mut source = engine();
        source.initialize(3, &options()).unwrap();
        let mut snapshot =
            ScenarioSnapshot::capture("nan", &source, playback(), &options()).unwrap();
        snapshot
            .state
            .replace_velocities(&[[0.0; 3], [f32::NAN, 0.0, 0.0], [0.0; 3]])
            .unwrap();
        save_snapshot(&snapshot, &dir.path().join("nan.scenario")).unwrap();

        assert!(matches!(store.load("nan"), Err(StorageError::Engine(_))));
    }

    #[test]
    fn test_capture_requires_ready_engine() {
        let err =
            ScenarioSnapshot::capture("empty", &engine(), playback(), &options()).unwrap_err();
        assert!(matches!(err, StorageError::Engine(_)));
    }

    #[test]
    fn test_list_sorted_and_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = ScenarioStore::new(dir.path().join("nope"));
        assert!(missing.list().unwrap().is_empty());

        let store = ScenarioStore::new(dir.path());
        let mut source = engine();
        source.initialize(5, &options()).unwrap();
        for name in ["zeta", "alpha", "mid_1"] {
            let snapshot =
                ScenarioSnapshot::capture(name, &source, playback(), &options()).unwrap();
            store.save(&snapshot).unwrap();
        }
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        assert_eq!(store.list().unwrap(), vec!["alpha", "mid_1", "zeta"]);

        store.delete("mid_1").unwrap();
        assert_eq!(store.list().unwrap(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_missing_and_invalid_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScenarioStore::new(dir.path());
        assert!(matches!(store.load("ghost"), Err(StorageError::NotFound(_))));
        assert!(matches!(store.load("../etc"), Err(StorageError::InvalidName(_))));
        assert!(matches!(store.delete(""), Err(StorageError::InvalidName(_))));
    }

    #[test]
    fn test_corrupt_file_is_codec_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScenarioStore::new(dir.path());
        fs::write(dir.path().join("broken.scenario"), [1u8, 2, 3]).unwrap();
        assert!(matches!(store.load("broken"), Err(StorageError::Codec(_))));
    }
}
