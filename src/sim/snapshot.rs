//! Read-only state projection for renderers and remote clients

use serde::{Deserialize, Serialize};

use super::state::{GamePhase, GameState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaddleView {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub laser_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallView {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub active: bool,
    pub thru: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrickView {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub strength: i32,
    pub max_strength: i32,
    pub has_powerup: bool,
    pub powerup_type: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerupView {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    #[serde(rename = "type")]
    pub kind: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaserView {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleView {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: [u8; 3],
    pub lifetime: f32,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub lives: u32,
    pub score: u64,
    pub level: u32,
    pub high_score: u64,
    pub game_over: bool,
    pub level_complete: bool,
    pub paused: bool,
    pub is_editor_level: bool,
    pub paddle: PaddleView,
    pub balls: Vec<BallView>,
    pub bricks: Vec<BrickView>,
    pub powerups: Vec<PowerupView>,
    pub lasers: Vec<LaserView>,
    pub particles: Vec<ParticleView>,
}

impl StateSnapshot {
    pub fn from_state(state: &GameState) -> Self {
        let paddle = &state.paddle;
        Self {
            lives: state.lives,
            score: state.score,
            level: state.level,
            high_score: state.high_score,
            game_over: state.phase == GamePhase::GameOver,
            level_complete: state.phase == GamePhase::LevelComplete,
            paused: state.phase == GamePhase::Paused,
            is_editor_level: state.is_editor_level,
            paddle: PaddleView {
                x: paddle.pos.x,
                y: paddle.pos.y,
                width: paddle.width,
                height: paddle.height,
                laser_active: paddle.laser.active,
            },
            balls: state
                .balls
                .iter()
                .map(|b| BallView {
                    x: b.pos.x,
                    y: b.pos.y,
                    size: b.size,
                    active: b.active,
                    thru: b.thru,
                })
                .collect(),
            bricks: state
                .bricks
                .iter()
                .map(|b| BrickView {
                    x: b.pos.x,
                    y: b.pos.y,
                    width: b.width,
                    height: b.height,
                    strength: b.strength,
                    max_strength: b.max_strength,
                    has_powerup: b.has_powerup,
                    powerup_type: b.powerup_type,
                })
                .collect(),
            powerups: state
                .powerups
                .iter()
                .map(|p| PowerupView {
                    x: p.pos.x,
                    y: p.pos.y,
                    size: p.size,
                    kind: p.kind.index(),
                })
                .collect(),
            lasers: state
                .lasers
                .iter()
                .map(|l| LaserView {
                    x: l.pos.x,
                    y: l.pos.y,
                    width: l.width,
                    height: l.height,
                })
                .collect(),
            particles: state
                .particles
                .iter()
                .map(|p| ParticleView {
                    x: p.pos.x,
                    y: p.pos.y,
                    size: p.size,
                    color: p.color,
                    lifetime: p.lifetime,
                })
                .collect(),
        }
    }
}
