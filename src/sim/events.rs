//! Game events
//!
//! Lifecycle signals recorded during a tick, drained by the presentation
//! layer for sound and effects.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::PowerupKind;

/// Something noteworthy that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A new level layout was installed
    LevelStarted { level: u32, editor: bool, bricks: usize },
    /// A brick lost all its strength
    BrickDestroyed {
        center: Vec2,
        max_strength: i32,
        points: u64,
    },
    /// A destroyed brick released a powerup
    PowerupSpawned { kind: PowerupKind, pos: Vec2 },
    /// The paddle caught a powerup
    PowerupCollected { kind: PowerupKind },
    /// A laser volley left the paddle
    LaserFired,
    /// A ball fell off the bottom while others remain
    BallLost,
    /// The last ball fell off the bottom
    LifeLost { lives_left: u32 },
    /// Every brick is gone
    LevelComplete { level: u32, bonus: u64 },
    /// No lives remain
    GameOver { score: u64, high_score: u64 },
}
