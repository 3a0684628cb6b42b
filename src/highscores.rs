//! High score leaderboard system
//!
//! Persisted as a JSON file, tracks top 10 scores.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player's name
    pub name: String,
    /// Player's score
    pub score: u64,
    /// Level reached
    #[serde(default = "default_level")]
    pub level: u32,
    /// Date achieved (YYYY-MM-DD), absent for seeded entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

fn default_level() -> u32 {
    1
}

/// High score leaderboard, sorted by score descending
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Placeholder board shown before anyone has played
    pub fn with_defaults() -> Self {
        let seeded = [
            ("AAA", 5000, 3),
            ("BBB", 4000, 2),
            ("CCC", 3000, 2),
            ("DDD", 2000, 1),
            ("EEE", 1000, 1),
        ];
        Self {
            entries: seeded
                .into_iter()
                .map(|(name, score, level)| HighScoreEntry {
                    name: name.to_string(),
                    score,
                    level,
                    date: None,
                })
                .collect(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(
        &mut self,
        name: impl Into<String>,
        score: u64,
        level: u32,
        date: Option<String>,
    ) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            name: name.into(),
            score,
            level,
            date,
        };

        // Ties keep the earlier entry ahead
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load from a JSON file, falling back to the seeded board if missing
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No high scores at {}, using defaults", path.display());
            return Ok(Self::with_defaults());
        }
        let json = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut scores: Self = serde_json::from_str(&json)?;
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        log::info!("Loaded {} high scores", scores.entries.len());
        Ok(scores)
    }

    /// Save to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| Error::io(path, e))?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}
