//! Brick Breaker - a deterministic arcade simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, engine lifecycle)
//! - `levels`: Procedural level generation and the stored level format
//! - `config`: Engine configuration
//! - `highscores`: Persistent leaderboard

pub mod config;
pub mod error;
pub mod highscores;
pub mod levels;
pub mod sim;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use highscores::HighScores;
pub use sim::{Engine, GameEvent, GamePhase, StateSnapshot, TickInput};

use glam::Vec2;

/// Game configuration constants
///
/// All velocities are expressed in units per tick, not per second.
pub mod consts {
    /// Default playfield dimensions
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;
    pub const FPS: u32 = 60;

    /// Lives at the start of a run
    pub const START_LIVES: u32 = 3;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 100.0;
    pub const PADDLE_HEIGHT: f32 = 20.0;
    pub const PADDLE_SPEED: f32 = 10.0;
    /// Distance from the bottom of the screen to the paddle top
    pub const PADDLE_BOTTOM_OFFSET: f32 = 50.0;
    /// Floor applied by the shrink powerup
    pub const PADDLE_MIN_WIDTH: f32 = 30.0;

    /// Laser mode (seconds)
    pub const LASER_DURATION: f32 = 10.0;
    pub const LASER_COOLDOWN: f32 = 0.5;
    /// Horizontal inset of each laser muzzle from the paddle edge
    pub const LASER_MUZZLE_INSET: f32 = 12.0;
    /// Lasers spawn this far above the paddle top
    pub const LASER_MUZZLE_RISE: f32 = 10.0;
    pub const LASER_WIDTH: f32 = 3.0;
    pub const LASER_HEIGHT: f32 = 15.0;
    pub const LASER_SPEED: f32 = 10.0;

    /// Ball defaults
    pub const BALL_SIZE: f32 = 15.0;
    pub const BALL_SPAWN_MIN_SPEED: f32 = 4.0;
    pub const BALL_SPAWN_MAX_SPEED: f32 = 5.0;
    /// Hard speed envelope for any ball
    pub const BALL_MIN_SPEED: f32 = 2.0;
    pub const BALL_MAX_SPEED: f32 = 12.0;
    /// Ceiling applied by the fast powerup
    pub const BALL_FAST_CAP: f32 = 10.0;
    /// Speed multiplier on each paddle bounce
    pub const PADDLE_BOOST: f32 = 1.05;
    pub const SLOW_FACTOR: f32 = 0.7;
    pub const FAST_FACTOR: f32 = 1.5;
    /// Multi-ball velocity jitter range
    pub const MULTI_BALL_JITTER: (f32, f32) = (0.8, 1.2);

    /// Brick defaults
    pub const BRICK_WIDTH: f32 = 75.0;
    pub const BRICK_HEIGHT: f32 = 20.0;
    pub const BRICK_GAP: f32 = 2.0;
    pub const BRICK_MAX_STRENGTH: i32 = 4;

    /// Powerup defaults
    pub const POWERUP_SIZE: f32 = 30.0;
    pub const POWERUP_SPEED: f32 = 3.0;
    pub const POWERUP_CHANCE: f64 = 0.3;

    /// Particles spawned per destroyed brick
    pub const PARTICLES_PER_BURST: usize = 10;

    /// Scoring
    pub const BRICK_SCORE: u64 = 10;
    pub const LEVEL_BONUS: u64 = 100;
}

/// Rescale a velocity to `speed`, keeping its direction.
///
/// A zero vector stays zero.
#[inline]
pub fn with_speed(vel: Vec2, speed: f32) -> Vec2 {
    vel.normalize_or_zero() * speed
}

/// Clamp a velocity's magnitude into `[min, max]`, keeping its direction
#[inline]
pub fn clamp_speed(vel: Vec2, min: f32, max: f32) -> Vec2 {
    let speed = vel.length();
    if speed == 0.0 {
        return vel;
    }
    with_speed(vel, speed.clamp(min, max))
}
