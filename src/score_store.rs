use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;
use thiserror::Error;

/// Where the binary keeps the best score
pub const BEST_SCORE_FILE: &str = "data/bigfish_best.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed score file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistence for the best score across runs
pub trait ScoreStore: Send + Sync + 'static {
    /// Best score recorded so far; 0 when nothing has been saved yet
    fn load_best(&self) -> Result<u32, StoreError>;

    fn save_best(&mut self, best: u32) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct BestScoreRecord {
    best_score: u32,
}

/// Best score kept as a small JSON document on disk
#[derive(Debug, Clone)]
pub struct JsonScoreStore {
    path: PathBuf,
}

impl JsonScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ScoreStore for JsonScoreStore {
    fn load_best(&self) -> Result<u32, StoreError> {
        if !self.path.exists() {
            return Ok(0);
        }
        let file = File::open(&self.path)?;
        let record: BestScoreRecord = serde_json::from_reader(BufReader::new(file))?;
        Ok(record.best_score)
    }

    fn save_best(&mut self, best: u32) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.path)?;
        serde_json::to_writer_pretty(file, &BestScoreRecord { best_score: best })?;
        Ok(())
    }
}

/// Store that forgets everything when the process exits
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    best: u32,
}

impl ScoreStore for MemoryScoreStore {
    fn load_best(&self) -> Result<u32, StoreError> {
        Ok(self.best)
    }

    fn save_best(&mut self, best: u32) -> Result<(), StoreError> {
        self.best = best;
        Ok(())
    }
}

/// The store backing [`crate::game::BestScore`]
#[derive(Resource)]
pub struct HighScoreStore(pub Box<dyn ScoreStore>);

impl HighScoreStore {
    pub fn new(store: impl ScoreStore) -> Self {
        Self(Box::new(store))
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryScoreStore::default())
    }
}
