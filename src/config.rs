//! Engine configuration
//!
//! Loaded from JSON. Accepts both snake_case keys and the upper-case
//! `SCREEN_WIDTH`/`SCREEN_HEIGHT`/`FPS` keys used by older game settings.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{FPS, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::error::{Error, Result};

/// Playfield size and tick rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Playfield width in units
    #[serde(alias = "SCREEN_WIDTH")]
    pub screen_width: f32,
    /// Playfield height in units
    #[serde(alias = "SCREEN_HEIGHT")]
    pub screen_height: f32,
    /// Ticks per second (used to convert particle lifetimes)
    #[serde(alias = "FPS")]
    pub fps: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            fps: FPS,
        }
    }
}

impl EngineConfig {
    pub fn new(screen_width: f32, screen_height: f32, fps: u32) -> Self {
        Self {
            screen_width,
            screen_height,
            fps,
        }
        .sanitized()
    }

    /// Replace unusable values with defaults
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let dim = |v: f32, fallback: f32| if v.is_finite() && v > 0.0 { v } else { fallback };
        Self {
            screen_width: dim(self.screen_width, defaults.screen_width),
            screen_height: dim(self.screen_height, defaults.screen_height),
            fps: if self.fps == 0 { defaults.fps } else { self.fps },
        }
    }

    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config = Self::from_json_str(&json)?;
        log::info!(
            "Loaded config from {}: {}x{} @ {} fps",
            path.display(),
            config.screen_width,
            config.screen_height,
            config.fps
        );
        Ok(config)
    }
}
