//! High score leaderboard system
//!
//! Tracks the top 10 runs. The host decides where the list lives; a JSON
//! file store is provided for native runs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::settings::ConfigError;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Where finished runs are reported
pub trait ScoreStore {
    /// Best score recorded so far (0 when empty)
    fn best(&self) -> u64;

    /// Record a finished run. Returns true if it set a new best.
    fn submit(&mut self, score: u64, wave: u32) -> bool;
}

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Wave reached
    pub wave: u32,
}

/// High score leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Add a score (if it qualifies).
    /// Returns the rank achieved (1-indexed).
    pub fn add_score(&mut self, score: u64, wave: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        // Sorted descending; ties keep the older run first
        let pos = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, HighScoreEntry { score, wave });
        self.entries.truncate(MAX_HIGH_SCORES);

        Some(pos + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load a leaderboard from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let mut scores: HighScores = serde_json::from_str(&json)?;
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        log::info!("Loaded {} high scores", scores.entries.len());
        Ok(scores)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

impl ScoreStore for HighScores {
    fn best(&self) -> u64 {
        self.top_score().unwrap_or(0)
    }

    fn submit(&mut self, score: u64, wave: u32) -> bool {
        let best = self.best();
        self.add_score(score, wave);
        score > best
    }
}

/// Leaderboard persisted to a JSON file after every submission
#[derive(Debug)]
pub struct ScoreFile {
    path: PathBuf,
    scores: HighScores,
}

impl ScoreFile {
    /// Open `path`, starting fresh if it is missing or unreadable
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let scores = match HighScores::load(&path) {
            Ok(scores) => scores,
            Err(e) => {
                log::warn!("Starting a fresh leaderboard: {}", e);
                HighScores::new()
            }
        };
        Self { path, scores }
    }

    pub fn scores(&self) -> &HighScores {
        &self.scores
    }
}

impl ScoreStore for ScoreFile {
    fn best(&self) -> u64 {
        self.scores.best()
    }

    fn submit(&mut self, score: u64, wave: u32) -> bool {
        let record = self.scores.submit(score, wave);
        if let Err(e) = self.scores.save(&self.path) {
            log::warn!("Could not save high scores to {}: {}", self.path.display(), e);
        }
        record
    }
}
