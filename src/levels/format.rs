//! Stored level format
//!
//! `{id, name, editor_version, bricks: [{x, y, strength, has_powerup, powerup_type}]}`.
//! Powerup fields are optional: an absent value stays absent when the level
//! is written back, so editor-authored data survives any number of round trips.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};

use crate::consts::{BRICK_MAX_STRENGTH, POWERUP_CHANCE};
use crate::error::Result;
use crate::sim::state::{Brick, PowerupKind};

fn default_strength() -> i32 {
    1
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// One brick as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrickSpec {
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_strength")]
    pub strength: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_powerup: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub powerup_type: Option<i32>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub editor_placed: bool,
}

impl BrickSpec {
    pub fn new(x: f32, y: f32, strength: i32) -> Self {
        Self {
            x,
            y,
            strength,
            has_powerup: None,
            powerup_type: None,
            editor_placed: false,
        }
    }

    /// Spec with explicit powerup fields
    pub fn with_powerup(mut self, has_powerup: bool, powerup_type: i32) -> Self {
        self.has_powerup = Some(has_powerup);
        self.powerup_type = Some(powerup_type);
        self
    }

    /// Describe a live brick (current strength, as the editor would save it)
    pub fn from_brick(brick: &Brick) -> Self {
        Self {
            x: brick.pos.x,
            y: brick.pos.y,
            strength: brick.strength,
            has_powerup: Some(brick.has_powerup),
            powerup_type: Some(if brick.has_powerup {
                brick.powerup_type as i32
            } else {
                0
            }),
            editor_placed: brick.editor_placed,
        }
    }

    /// Build the live brick, or `None` if this spec is unusable
    ///
    /// Unusable means a non-finite position, strength below 1, or a powerup
    /// flag pointing at an unknown kind. Strength above the maximum is clamped.
    pub fn to_brick(&self, editor_level: bool) -> Option<Brick> {
        if !self.x.is_finite() || !self.y.is_finite() || self.strength < 1 {
            return None;
        }
        let has_powerup = self.has_powerup.unwrap_or(false);
        let raw_type = self.powerup_type.unwrap_or(0);
        let powerup_type = match u8::try_from(raw_type).ok().and_then(PowerupKind::from_index) {
            Some(kind) => kind.index(),
            None if has_powerup => return None,
            None => 0,
        };

        let mut brick = Brick::new(
            Vec2::new(self.x, self.y),
            self.strength.min(BRICK_MAX_STRENGTH),
        )
        .with_powerup(has_powerup, powerup_type);
        brick.editor_placed = editor_level || self.editor_placed;
        Some(brick)
    }
}

/// A complete level layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Authored in the level editor; powerup fields are never re-rolled
    #[serde(default)]
    pub editor_version: bool,
    /// Entries that fail to decode are dropped on load; the rest are kept
    #[serde(default, deserialize_with = "bricks_skipping_corrupt")]
    pub bricks: Vec<BrickSpec>,
}

/// Decode each brick entry on its own so one bad entry costs only itself
fn bricks_skipping_corrupt<'de, D>(deserializer: D) -> std::result::Result<Vec<BrickSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Vec::<serde_json::Value>::deserialize(deserializer)?;
    let total = entries.len();
    let bricks: Vec<BrickSpec> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, entry)| match serde_json::from_value(entry) {
            Ok(spec) => Some(spec),
            Err(e) => {
                log::warn!("Dropping brick entry {i}: {e}");
                None
            }
        })
        .collect();
    if bricks.len() < total {
        log::warn!("Kept {} of {} brick entries", bricks.len(), total);
    }
    Ok(bricks)
}

/// Canonical id for a level number
pub fn level_id(number: u32) -> String {
    format!("level-{number}")
}

/// Extract N from `level-N` or `level-N_suffix`
pub fn parse_level_number(id: &str) -> Option<u32> {
    let rest = id.strip_prefix("level-")?;
    let digits = rest.split(['_', '-']).next()?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl Level {
    /// Empty, non-editor level with the canonical id and name
    pub fn new(number: u32) -> Self {
        Self {
            id: level_id(number),
            name: format!("Level {number}"),
            editor_version: false,
            bricks: Vec::new(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Level number from the id, if it follows the `level-N` scheme
    pub fn number(&self) -> Option<u32> {
        parse_level_number(&self.id)
    }

    /// Mark as editor-authored and make every powerup field explicit
    ///
    /// Missing `has_powerup` becomes false; a powerup with no type becomes
    /// type 0. Existing values are never touched.
    pub fn normalize_for_editor(&mut self) {
        self.editor_version = true;
        for brick in &mut self.bricks {
            brick.editor_placed = true;
            let has_powerup = *brick.has_powerup.get_or_insert(false);
            if has_powerup && brick.powerup_type.is_none() {
                brick.powerup_type = Some(0);
            }
        }
    }

    /// Roll powerups for generated bricks that have none recorded
    ///
    /// Editor levels and editor-placed bricks are left exactly as they are.
    pub fn fill_missing_powerups<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.editor_version {
            return;
        }
        for brick in self.bricks.iter_mut().filter(|b| !b.editor_placed) {
            if brick.has_powerup.is_none() {
                brick.has_powerup = Some(rng.random::<f64>() < POWERUP_CHANCE);
            }
            if brick.has_powerup == Some(true) && brick.powerup_type.is_none() {
                brick.powerup_type = Some(rng.random_range(0..=7));
            }
        }
    }

    /// Normalize before writing to storage
    ///
    /// The id is forced to `level-N`. Editor saves become editor levels;
    /// other saves get any missing powerups rolled.
    pub fn prepare_for_save<R: Rng + ?Sized>(&mut self, number: u32, editor_mode: bool, rng: &mut R) {
        self.id = level_id(number);
        if self.name.is_empty() {
            self.name = format!("Level {number}");
        }
        if editor_mode {
            self.normalize_for_editor();
        } else {
            self.fill_missing_powerups(rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_parse_level_number() {
        assert_eq!(parse_level_number("level-3"), Some(3));
        assert_eq!(parse_level_number("level-12_custom"), Some(12));
        assert_eq!(parse_level_number("level-"), None);
        assert_eq!(parse_level_number("level-x1"), None);
        assert_eq!(parse_level_number("stage-1"), None);
    }

    #[test]
    fn test_missing_fields_default() {
        let level = Level::from_json_str(r#"{"bricks": [{"x": 10, "y": 20}]}"#).unwrap();
        assert!(!level.editor_version);
        assert_eq!(level.bricks[0].strength, 1);
        assert_eq!(level.bricks[0].has_powerup, None);
    }

    #[test]
    fn test_malformed_brick_entries_are_dropped_alone() {
        let json = r#"{"editor_version": true, "bricks": [
            {"x": 10, "y": 20, "strength": 2},
            {"y": 10, "strength": 1},
            {"x": "oops", "y": 10},
            7,
            {"x": 90, "y": 20, "has_powerup": "yes"},
            {"x": 170, "y": 20}
        ]}"#;
        let level = Level::from_json_str(json).unwrap();
        assert!(level.editor_version);
        let xs: Vec<f32> = level.bricks.iter().map(|b| b.x).collect();
        assert_eq!(xs, vec![10.0, 170.0]);
    }

    #[test]
    fn test_bricks_not_a_list_is_an_error() {
        assert!(Level::from_json_str(r#"{"bricks": 12}"#).is_err());
        assert!(Level::from_json_str(r#"{"bricks": {"x": 1}}"#).is_err());
    }

    #[test]
    fn test_absent_fields_stay_absent() {
        let json = r#"{"id":"level-1","name":"Level 1","editor_version":false,"bricks":[{"x":1.0,"y":2.0,"strength":2}]}"#;
        let level = Level::from_json_str(json).unwrap();
        assert_eq!(serde_json::to_string(&level).unwrap(), json);
    }

    #[test]
    fn test_editor_normalization_never_rerolls() {
        let mut level = Level::new(4);
        level.bricks = vec![
            BrickSpec::new(0.0, 0.0, 1),
            BrickSpec::new(80.0, 0.0, 2).with_powerup(true, 6),
            BrickSpec {
                has_powerup: Some(true),
                ..BrickSpec::new(160.0, 0.0, 3)
            },
        ];
        level.normalize_for_editor();
        assert!(level.editor_version);
        assert!(level.bricks.iter().all(|b| b.editor_placed));
        assert_eq!(level.bricks[0].has_powerup, Some(false));
        assert_eq!(level.bricks[0].powerup_type, None);
        assert_eq!(level.bricks[1].powerup_type, Some(6));
        assert_eq!(level.bricks[2].powerup_type, Some(0));

        let before = level.clone();
        let mut rng = Pcg32::seed_from_u64(3);
        level.fill_missing_powerups(&mut rng);
        assert_eq!(level, before);
    }

    #[test]
    fn test_fill_missing_powerups_only_fills_gaps() {
        let mut level = Level::new(5);
        level.bricks = (0..50).map(|i| BrickSpec::new(i as f32, 0.0, 1)).collect();
        level.bricks[0] = BrickSpec::new(0.0, 0.0, 1).with_powerup(false, 3);
        let mut rng = Pcg32::seed_from_u64(11);
        level.fill_missing_powerups(&mut rng);
        assert_eq!(level.bricks[0].has_powerup, Some(false));
        assert_eq!(level.bricks[0].powerup_type, Some(3));
        for brick in &level.bricks[1..] {
            match brick.has_powerup {
                Some(true) => assert!((0..=7).contains(&brick.powerup_type.unwrap())),
                Some(false) => assert_eq!(brick.powerup_type, None),
                None => panic!("has_powerup left unset"),
            }
        }
    }

    #[test]
    fn test_to_brick_validation() {
        assert!(BrickSpec::new(f32::NAN, 0.0, 1).to_brick(false).is_none());
        assert!(BrickSpec::new(0.0, 0.0, 0).to_brick(false).is_none());
        assert!(BrickSpec::new(0.0, 0.0, 1).with_powerup(true, 8).to_brick(true).is_none());

        let brick = BrickSpec::new(0.0, 0.0, 9).to_brick(false).unwrap();
        assert_eq!(brick.strength, 4);
        assert_eq!(brick.max_strength, 4);

        // Unknown type without the flag is harmless
        let brick = BrickSpec::new(0.0, 0.0, 1).with_powerup(false, 42).to_brick(true).unwrap();
        assert!(!brick.has_powerup);
        assert!(brick.editor_placed);
    }

    #[test]
    fn test_prepare_for_save_sets_id() {
        let mut level = Level::new(1);
        level.bricks.push(BrickSpec::new(0.0, 0.0, 1));
        let mut rng = Pcg32::seed_from_u64(0);
        level.prepare_for_save(7, true, &mut rng);
        assert_eq!(level.id, "level-7");
        assert!(level.editor_version);
        assert_eq!(level.number(), Some(7));
    }
}
