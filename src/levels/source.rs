//! Level storage backends
//!
//! The engine asks a `LevelSource` for a stored layout at every level start
//! and generates one when nothing usable comes back.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::format::{Level, level_id, parse_level_number};
use super::generator::generate_level;
use crate::error::{Error, Result};

/// Listing entry for a stored level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSummary {
    pub id: String,
    pub name: String,
    /// Parsed from the id, 0 when the id has no number
    pub level_num: u32,
    pub is_editor_level: bool,
    pub brick_count: usize,
}

impl LevelSummary {
    pub fn of(level: &Level) -> Self {
        Self {
            id: level.id.clone(),
            name: level.name.clone(),
            level_num: level.number().unwrap_or(0),
            is_editor_level: level.editor_version,
            brick_count: level.bricks.len(),
        }
    }
}

/// Storage for level layouts
pub trait LevelSource: Debug {
    /// Stored layout for `number`, `Ok(None)` if there is none
    fn load(&self, number: u32) -> Result<Option<Level>>;

    /// Store `level` as-is under `number`
    fn store(&mut self, number: u32, level: &Level) -> Result<()>;

    /// Every stored level, ordered by level number
    fn list(&self) -> Result<Vec<LevelSummary>>;
}

/// Normalize `level` for `number` and store it
pub fn save_level<S, R>(
    source: &mut S,
    mut level: Level,
    number: u32,
    editor_mode: bool,
    rng: &mut R,
) -> Result<Level>
where
    S: LevelSource + ?Sized,
    R: Rng + ?Sized,
{
    level.prepare_for_save(number, editor_mode, rng);
    source.store(number, &level)?;
    log::info!(
        "Saved {} ({} bricks, editor: {})",
        level.id,
        level.bricks.len(),
        level.editor_version
    );
    Ok(level)
}

/// Generate and store levels `1..=count`
pub fn create_sample_levels<S, R>(
    source: &mut S,
    count: u32,
    screen_width: f32,
    rng: &mut R,
) -> Result<()>
where
    S: LevelSource + ?Sized,
    R: Rng + ?Sized,
{
    for number in 1..=count {
        let level = generate_level(number, screen_width, rng);
        source.store(number, &level)?;
    }
    log::info!("Created {count} sample levels");
    Ok(())
}

/// No storage: every level is generated
#[derive(Debug, Clone, Copy, Default)]
pub struct Procedural;

impl LevelSource for Procedural {
    fn load(&self, _number: u32) -> Result<Option<Level>> {
        Ok(None)
    }

    fn store(&mut self, number: u32, _level: &Level) -> Result<()> {
        log::debug!("Procedural source discards level {number}");
        Ok(())
    }

    fn list(&self) -> Result<Vec<LevelSummary>> {
        Ok(Vec::new())
    }
}

/// In-process storage holding serialized levels
///
/// Levels go through JSON on the way in and out, so a load sees exactly what
/// a file-backed store would.
#[derive(Debug, Clone, Default)]
pub struct MemoryLevels {
    levels: BTreeMap<u32, String>,
}

impl MemoryLevels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert raw JSON, valid or not
    pub fn insert_raw(&mut self, number: u32, json: impl Into<String>) {
        self.levels.insert(number, json.into());
    }

    /// Stored JSON for `number`
    pub fn raw(&self, number: u32) -> Option<&str> {
        self.levels.get(&number).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl LevelSource for MemoryLevels {
    fn load(&self, number: u32) -> Result<Option<Level>> {
        self.levels
            .get(&number)
            .map(|json| Level::from_json_str(json))
            .transpose()
    }

    fn store(&mut self, number: u32, level: &Level) -> Result<()> {
        self.levels.insert(number, serde_json::to_string(level)?);
        Ok(())
    }

    fn list(&self) -> Result<Vec<LevelSummary>> {
        Ok(self
            .levels
            .iter()
            .filter_map(|(number, json)| match Level::from_json_str(json) {
                Ok(level) => Some(LevelSummary::of(&level)),
                Err(e) => {
                    log::warn!("Skipping unreadable level {number}: {e}");
                    None
                }
            })
            .collect())
    }
}

/// A directory of `level-N.json` files
#[derive(Debug, Clone)]
pub struct LevelDir {
    dir: PathBuf,
}

impl LevelDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, number: u32) -> PathBuf {
        self.dir.join(format!("{}.json", level_id(number)))
    }

    /// Load by id (`level-N` or `level-N_suffix`)
    pub fn load_by_id(&self, id: &str) -> Result<Option<Level>> {
        let number = parse_level_number(id).ok_or_else(|| Error::InvalidLevelId(id.to_string()))?;
        self.load(number)
    }

    fn read(path: &Path) -> Result<Level> {
        let json = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Level::from_json_str(&json)
    }
}

impl LevelSource for LevelDir {
    fn load(&self, number: u32) -> Result<Option<Level>> {
        let path = self.path_for(number);
        if !path.exists() {
            return Ok(None);
        }
        let level = Self::read(&path)?;
        log::debug!("Loaded {} from {}", level.id, path.display());
        Ok(Some(level))
    }

    fn store(&mut self, number: u32, level: &Level) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| Error::io(&self.dir, e))?;
        let path = self.path_for(number);
        let json = level.to_json_pretty()?;
        std::fs::write(&path, json).map_err(|e| Error::io(&path, e))?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<LevelSummary>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&self.dir).map_err(|e| Error::io(&self.dir, e))?;

        let mut levels = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| Error::io(&self.dir, e))?.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            match Self::read(&path) {
                Ok(level) => levels.push(LevelSummary::of(&level)),
                Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
            }
        }
        levels.sort_by(|a, b| a.level_num.cmp(&b.level_num).then_with(|| a.id.cmp(&b.id)));
        Ok(levels)
    }
}
