//! Game state and core simulation types
//!
//! Entities own their position, size, velocity and per-type state. They move
//! themselves and react to explicit events; the engine decides everything
//! that involves more than one entity.

use std::f32::consts::{FRAC_PI_4, TAU};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::config::EngineConfig;
use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay (a resting ball still counts as playing)
    Playing,
    /// Game is paused, ticks are ignored
    Paused,
    /// Every brick is gone, waiting for an explicit advance
    LevelComplete,
    /// Out of lives, waiting for a full reset
    GameOver,
}

/// How the paddle reads input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ControlMode {
    /// Paddle centers itself under the pointer
    #[default]
    Pointer,
    /// Paddle moves by a fixed step per held direction key
    Keys,
}

impl ControlMode {
    pub fn toggled(self) -> Self {
        match self {
            ControlMode::Pointer => ControlMode::Keys,
            ControlMode::Keys => ControlMode::Pointer,
        }
    }
}

/// Laser mode bookkeeping (times in seconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaserState {
    pub active: bool,
    pub remaining_time: f32,
    pub cooldown: f32,
    /// Engine clock at the last volley, `None` before the first
    pub last_shot_time: Option<f32>,
}

impl Default for LaserState {
    fn default() -> Self {
        Self {
            active: false,
            remaining_time: 0.0,
            cooldown: LASER_COOLDOWN,
            last_shot_time: None,
        }
    }
}

/// The player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Keyboard step per tick
    pub speed: f32,
    /// Baseline for expand/shrink so effects never compound
    pub original_width: f32,
    pub control: ControlMode,
    pub laser: LaserState,
    pub move_left: bool,
    pub move_right: bool,
    screen_width: f32,
}

impl Paddle {
    /// Centered horizontally, near the bottom of the screen
    pub fn new(screen_width: f32, screen_height: f32) -> Self {
        let width = PADDLE_WIDTH;
        Self {
            pos: Vec2::new(
                (screen_width / 2.0).floor() - (width / 2.0).floor(),
                screen_height - PADDLE_BOTTOM_OFFSET,
            ),
            width,
            height: PADDLE_HEIGHT,
            speed: PADDLE_SPEED,
            original_width: width,
            control: ControlMode::Pointer,
            laser: LaserState::default(),
            move_left: false,
            move_right: false,
            screen_width,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    pub fn center_x(&self) -> f32 {
        self.pos.x + self.width / 2.0
    }

    /// Record which direction keys are held
    pub fn set_direction(&mut self, left: bool, right: bool) {
        self.move_left = left;
        self.move_right = right;
    }

    /// Keep the paddle fully on screen
    pub fn clamp_to_screen(&mut self) {
        let max_x = (self.screen_width - self.width).max(0.0);
        self.pos.x = self.pos.x.clamp(0.0, max_x);
    }

    /// Advance one tick
    ///
    /// In pointer mode with a pointer sample the paddle centers under it;
    /// otherwise the held direction keys move it by `speed`.
    pub fn update(&mut self, dt: f32, pointer_x: Option<f32>) {
        match (self.control, pointer_x.filter(|x| x.is_finite())) {
            (ControlMode::Pointer, Some(x)) => {
                self.pos.x = x - self.width / 2.0;
            }
            _ => {
                if self.move_left {
                    self.pos.x -= self.speed;
                }
                if self.move_right {
                    self.pos.x += self.speed;
                }
            }
        }
        self.clamp_to_screen();

        // Already-fired lasers are unaffected by expiry
        if self.laser.active {
            self.laser.remaining_time -= dt;
            if self.laser.remaining_time <= 0.0 {
                self.laser.active = false;
                self.laser.remaining_time = 0.0;
            }
        }
    }

    /// Fire a pair of lasers from the front corners if laser mode allows it
    ///
    /// Returns an empty list (and changes nothing) while inactive or cooling down.
    pub fn shoot_laser(&mut self, now: f32) -> Vec<Laser> {
        if !self.laser.active {
            return Vec::new();
        }
        if let Some(last) = self.laser.last_shot_time {
            if now - last < self.laser.cooldown {
                return Vec::new();
            }
        }
        self.laser.last_shot_time = Some(now);
        let y = self.pos.y - LASER_MUZZLE_RISE;
        vec![
            Laser::new(Vec2::new(self.pos.x + LASER_MUZZLE_INSET, y)),
            Laser::new(Vec2::new(self.pos.x + self.width - LASER_MUZZLE_INSET, y)),
        ]
    }

    /// Double the baseline width, capped at half the screen
    pub fn expand(&mut self) {
        self.width = (self.original_width * 2.0).min(self.screen_width / 2.0);
        self.clamp_to_screen();
    }

    /// Halve the baseline width, floored at the minimum
    pub fn shrink(&mut self) {
        self.width = (self.original_width / 2.0).max(PADDLE_MIN_WIDTH);
        self.clamp_to_screen();
    }

    /// Start (or restart) laser mode; duration resets rather than stacks
    pub fn activate_laser(&mut self) {
        self.laser.active = true;
        self.laser.remaining_time = LASER_DURATION;
    }
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    /// Top-left corner of the bounding square
    pub pos: Vec2,
    /// Units per tick
    pub vel: Vec2,
    /// Diameter
    pub size: f32,
    /// False while resting on the paddle
    pub active: bool,
    /// Destroys bricks without bouncing off them
    pub thru: bool,
}

impl Ball {
    pub fn with_velocity(pos: Vec2, vel: Vec2) -> Self {
        Self {
            pos,
            vel,
            size: BALL_SIZE,
            active: false,
            thru: false,
        }
    }

    /// Inactive ball with a random upward launch velocity
    ///
    /// Angle is uniform in [45°, 135°] from horizontal, speed uniform in [4, 5].
    pub fn spawn<R: Rng + ?Sized>(pos: Vec2, rng: &mut R) -> Self {
        let angle = rng.random_range(FRAC_PI_4..=3.0 * FRAC_PI_4);
        let speed = rng.random_range(BALL_SPAWN_MIN_SPEED..=BALL_SPAWN_MAX_SPEED);
        Self::with_velocity(pos, Vec2::new(speed * angle.cos(), -speed * angle.sin()))
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size, self.size)
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Advance one tick. Motion is per tick; `dt` does not scale it.
    pub fn update(&mut self) {
        if self.active {
            self.pos += self.vel;
        }
    }

    /// Rest the ball on top of the paddle, centered
    pub fn stick_to(&mut self, paddle: &Paddle) {
        self.pos = Vec2::new(
            paddle.center_x() - self.size / 2.0,
            paddle.pos.y - self.size,
        );
    }

    pub fn is_lost(&self, screen_height: f32) -> bool {
        self.pos.y >= screen_height
    }
}

/// Powerup kinds, stored as 0..=7 in level data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PowerupKind {
    Expand,
    Shrink,
    Multi,
    Slow,
    Fast,
    Laser,
    Life,
    Thru,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 8] = [
        PowerupKind::Expand,
        PowerupKind::Shrink,
        PowerupKind::Multi,
        PowerupKind::Slow,
        PowerupKind::Fast,
        PowerupKind::Laser,
        PowerupKind::Life,
        PowerupKind::Thru,
    ];

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn index(self) -> u8 {
        self as u8
    }
}

impl From<PowerupKind> for u8 {
    fn from(kind: PowerupKind) -> u8 {
        kind.index()
    }
}

impl TryFrom<u8> for PowerupKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_index(value).ok_or_else(|| format!("unknown powerup type {value}"))
    }
}

/// A brick entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Hits remaining
    pub strength: i32,
    /// Strength at creation, used for scoring
    pub max_strength: i32,
    pub broken: bool,
    pub has_powerup: bool,
    /// Raw powerup index, meaningful only when `has_powerup`
    pub powerup_type: u8,
    /// Powerup fields were authored, not rolled
    pub editor_placed: bool,
}

impl Brick {
    pub fn new(pos: Vec2, strength: i32) -> Self {
        Self {
            pos,
            width: BRICK_WIDTH,
            height: BRICK_HEIGHT,
            strength,
            max_strength: strength,
            broken: false,
            has_powerup: false,
            powerup_type: 0,
            editor_placed: false,
        }
    }

    pub fn with_powerup(mut self, has_powerup: bool, powerup_type: u8) -> Self {
        self.has_powerup = has_powerup;
        self.powerup_type = powerup_type;
        self
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        self.rect().center()
    }

    /// Powerup this brick drops when destroyed
    pub fn powerup(&self) -> Option<PowerupKind> {
        if self.has_powerup {
            PowerupKind::from_index(self.powerup_type)
        } else {
            None
        }
    }

    /// Take one hit; a thru ball destroys outright. Returns true if destroyed.
    pub fn hit(&mut self, thru: bool) -> bool {
        if thru {
            self.strength = 0;
        } else {
            self.strength -= 1;
        }
        if self.strength <= 0 {
            self.strength = 0;
            self.broken = true;
        }
        self.broken
    }
}

/// A falling powerup capsule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Powerup {
    pub pos: Vec2,
    pub kind: PowerupKind,
    pub size: f32,
    /// Units per tick, downward
    pub speed: f32,
    pub collected: bool,
}

impl Powerup {
    pub fn new(pos: Vec2, kind: PowerupKind) -> Self {
        Self {
            pos,
            kind,
            size: POWERUP_SIZE,
            speed: POWERUP_SPEED,
            collected: false,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size, self.size)
    }

    pub fn update(&mut self) {
        if !self.collected {
            self.pos.y += self.speed;
        }
    }
}

/// A laser bolt fired upward from the paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Laser {
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
}

impl Laser {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            width: LASER_WIDTH,
            height: LASER_HEIGHT,
            speed: LASER_SPEED,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    pub fn update(&mut self) {
        self.pos.y -= self.speed;
    }
}

/// A particle for visual effects (never affects gameplay)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub color: [u8; 3],
    /// Ticks remaining
    pub lifetime: f32,
}

impl Particle {
    /// Random burst around `center`
    pub fn burst<R: Rng + ?Sized>(center: Vec2, count: usize, fps: u32, rng: &mut R) -> Vec<Self> {
        (0..count)
            .map(|_| {
                let angle = rng.random_range(0.0..TAU);
                let speed = rng.random_range(1.0..=5.0f32);
                Particle {
                    pos: center,
                    vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                    size: rng.random_range(2..=6) as f32,
                    color: [
                        rng.random_range(150..=255),
                        rng.random_range(150..=255),
                        rng.random_range(150..=255),
                    ],
                    lifetime: rng.random_range(0.5..=2.0f32) * fps as f32,
                }
            })
            .collect()
    }

    pub fn update(&mut self) {
        self.pos += self.vel;
        self.lifetime -= 1.0;
    }

    pub fn expired(&self) -> bool {
        self.lifetime <= 0.0
    }
}

/// Complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub lives: u32,
    pub score: u64,
    /// 1-based level number
    pub level: u32,
    pub high_score: u64,
    pub phase: GamePhase,
    /// Current layout came from the level editor
    pub is_editor_level: bool,
    /// Seconds of simulated play, drives the laser cooldown
    pub clock: f32,
    pub paddle: Paddle,
    pub balls: Vec<Ball>,
    pub bricks: Vec<Brick>,
    pub powerups: Vec<Powerup>,
    pub lasers: Vec<Laser>,
    pub particles: Vec<Particle>,
}

impl GameState {
    /// Fresh run at level 1 with no bricks yet
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            lives: START_LIVES,
            score: 0,
            level: 1,
            high_score: 0,
            phase: GamePhase::Playing,
            is_editor_level: false,
            clock: 0.0,
            paddle: Paddle::new(config.screen_width, config.screen_height),
            balls: Vec::new(),
            bricks: Vec::new(),
            powerups: Vec::new(),
            lasers: Vec::new(),
            particles: Vec::new(),
        }
    }
}
