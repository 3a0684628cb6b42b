//! Engine: owns the game state and drives the level lifecycle
//!
//! The per-tick update lives in `tick.rs`; this file holds construction,
//! level loading, resets, and the effects that several stages share
//! (brick destruction, powerup application, life loss).

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::events::GameEvent;
use super::rect::Rect;
use super::snapshot::StateSnapshot;
use super::state::{Ball, GamePhase, GameState, Paddle, Particle, Powerup, PowerupKind};
use crate::config::EngineConfig;
use crate::consts::*;
use crate::levels::{BrickSpec, Level, LevelSource, Procedural, generate_level};
use crate::{clamp_speed, with_speed};

/// The simulation engine
#[derive(Debug)]
pub struct Engine {
    pub(super) config: EngineConfig,
    pub(super) state: GameState,
    pub(super) rng: Pcg32,
    pub(super) events: Vec<GameEvent>,
    levels: Box<dyn LevelSource>,
}

impl Engine {
    /// Engine with a random seed and procedural levels
    pub fn new(config: EngineConfig) -> Self {
        Self::with_seed(config, rand::random())
    }

    /// Engine with a fixed seed and procedural levels
    pub fn with_seed(config: EngineConfig, seed: u64) -> Self {
        Self::with_source(config, seed, Box::new(Procedural))
    }

    /// Engine reading levels from `levels`; loads level 1 immediately
    pub fn with_source(config: EngineConfig, seed: u64, levels: Box<dyn LevelSource>) -> Self {
        let config = config.sanitized();
        let mut engine = Self {
            config,
            state: GameState::new(&config),
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            levels,
        };
        log::info!(
            "Engine started: {}x{} @ {} fps, seed {}",
            config.screen_width,
            config.screen_height,
            config.fps,
            seed
        );
        engine.reset_level();
        engine
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct state access for drivers and scripted scenarios
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Take every event recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Flip between playing and paused; other phases are unaffected
    pub fn toggle_pause(&mut self) {
        self.state.phase = match self.state.phase {
            GamePhase::Playing => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Playing,
            other => other,
        };
        log::debug!("Pause toggled: {:?}", self.state.phase);
    }

    /// Read-only projection for rendering
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::from_state(&self.state)
    }

    /// Start over from level 1 with full lives; the high score is kept
    pub fn reset_game(&mut self) {
        self.state.lives = START_LIVES;
        self.state.score = 0;
        self.state.level = 1;
        log::info!("New game");
        self.reset_level();
    }

    /// Rebuild the current level from scratch
    pub fn reset_level(&mut self) {
        let ball = self.fresh_ball();
        let state = &mut self.state;
        state.phase = GamePhase::Playing;
        state.paddle = Paddle::new(self.config.screen_width, self.config.screen_height);
        state.balls = vec![ball];
        state.bricks.clear();
        state.powerups.clear();
        state.lasers.clear();
        state.particles.clear();
        self.load_level(self.state.level);
    }

    /// Move on to the next level
    pub fn advance_to_next_level(&mut self) {
        self.state.level = self.state.level.saturating_add(1);
        log::info!("Advancing to level {}", self.state.level);
        self.reset_level();
    }

    /// Install the stored layout for `number`, generating one if storage
    /// has nothing usable
    pub fn load_level(&mut self, number: u32) {
        let level = match self.levels.load(number) {
            // Absent powerup fields read as no powerup; rolling happens at save time
            Ok(Some(mut level)) => {
                if level.editor_version {
                    level.normalize_for_editor();
                }
                level
            }
            Ok(None) => generate_level(number, self.config.screen_width, &mut self.rng),
            Err(e) => {
                log::warn!("Level {number} unreadable, generating instead: {e}");
                generate_level(number, self.config.screen_width, &mut self.rng)
            }
        };
        self.install_level(&level);
    }

    /// Replace the bricks with `level`'s layout
    ///
    /// Corrupt or off-screen brick specs are skipped.
    pub fn install_level(&mut self, level: &Level) {
        let playfield = Rect::new(0.0, 0.0, self.config.screen_width, self.config.screen_height);
        let editor = level.editor_version;

        let mut skipped = 0usize;
        self.state.bricks = level
            .bricks
            .iter()
            .filter_map(|spec| {
                let brick = spec.to_brick(editor).filter(|b| b.rect().overlaps(&playfield));
                if brick.is_none() {
                    skipped += 1;
                }
                brick
            })
            .collect();
        self.state.is_editor_level = editor;

        if skipped > 0 {
            log::warn!("Level {}: skipped {} unusable bricks", self.state.level, skipped);
        }
        log::info!(
            "Level {} ready: {} bricks{}",
            self.state.level,
            self.state.bricks.len(),
            if editor { " (editor)" } else { "" }
        );
        self.events.push(GameEvent::LevelStarted {
            level: self.state.level,
            editor,
            bricks: self.state.bricks.len(),
        });
    }

    /// The live brick layout as a storable level
    pub fn current_level(&self) -> Level {
        let mut level = Level::new(self.state.level);
        level.editor_version = self.state.is_editor_level;
        level.bricks = self.state.bricks.iter().map(BrickSpec::from_brick).collect();
        level
    }

    /// Inactive ball at the screen center with a random launch velocity
    pub(super) fn fresh_ball(&mut self) -> Ball {
        let center = Vec2::new(
            (self.config.screen_width / 2.0).floor(),
            (self.config.screen_height / 2.0).floor(),
        );
        Ball::spawn(center, &mut self.rng)
    }

    /// Effects of the brick at `index` breaking: particles, a possible
    /// powerup drop, and score. The brick itself is removed later.
    pub(super) fn destroy_brick(&mut self, index: usize) {
        let Some(brick) = self.state.bricks.get(index) else {
            return;
        };
        let center = brick.center();
        let drop_pos = Vec2::new(center.x - POWERUP_SIZE / 2.0, brick.pos.y + brick.height);
        let drop = brick.powerup();
        let max_strength = brick.max_strength;

        let particles = Particle::burst(center, PARTICLES_PER_BURST, self.config.fps, &mut self.rng);
        self.state.particles.extend(particles);

        if let Some(kind) = drop {
            self.state.powerups.push(Powerup::new(drop_pos, kind));
            self.events.push(GameEvent::PowerupSpawned { kind, pos: drop_pos });
        }

        let points = BRICK_SCORE * max_strength.max(0) as u64;
        self.state.score += points;
        self.events.push(GameEvent::BrickDestroyed {
            center,
            max_strength,
            points,
        });
    }

    /// Apply a collected powerup
    pub fn apply_powerup(&mut self, kind: PowerupKind) {
        log::debug!("Powerup collected: {:?}", kind);
        match kind {
            PowerupKind::Expand => self.state.paddle.expand(),
            PowerupKind::Shrink => self.state.paddle.shrink(),
            PowerupKind::Multi => self.split_ball(),
            PowerupKind::Slow => self.rescale_balls(|speed| (speed * SLOW_FACTOR).max(BALL_MIN_SPEED)),
            PowerupKind::Fast => self.rescale_balls(|speed| (speed * FAST_FACTOR).min(BALL_FAST_CAP)),
            PowerupKind::Laser => self.state.paddle.activate_laser(),
            PowerupKind::Life => self.state.lives += 1,
            PowerupKind::Thru => self.state.balls.iter_mut().for_each(|b| b.thru = true),
        }
        self.events.push(GameEvent::PowerupCollected { kind });
    }

    /// Two extra active balls from the first ball, with jittered velocity
    fn split_ball(&mut self) {
        let Some(source) = self.state.balls.first() else {
            return;
        };
        let (pos, vel) = (source.pos, source.vel);
        let (lo, hi) = MULTI_BALL_JITTER;

        for _ in 0..2 {
            let jitter = Vec2::new(self.rng.random_range(lo..=hi), self.rng.random_range(lo..=hi));
            let mut ball = Ball::with_velocity(pos, clamp_speed(vel * jitter, BALL_MIN_SPEED, BALL_MAX_SPEED));
            ball.active = true;
            self.state.balls.push(ball);
        }
    }

    /// Rescale every moving ball's speed, then clamp to the envelope
    fn rescale_balls(&mut self, new_speed: impl Fn(f32) -> f32) {
        for ball in &mut self.state.balls {
            let speed = ball.speed();
            if speed > 0.0 {
                ball.vel = clamp_speed(with_speed(ball.vel, new_speed(speed)), BALL_MIN_SPEED, BALL_MAX_SPEED);
            }
        }
    }

    /// The last ball fell: lose a life, then respawn or end the game
    pub(super) fn lose_life(&mut self) {
        self.state.lives = self.state.lives.saturating_sub(1);
        if self.state.lives > 0 {
            log::info!("Life lost, {} remaining", self.state.lives);
            let ball = self.fresh_ball();
            self.state.balls = vec![ball];
            self.events.push(GameEvent::LifeLost {
                lives_left: self.state.lives,
            });
        } else {
            self.state.balls.clear();
            self.state.phase = GamePhase::GameOver;
            self.state.high_score = self.state.high_score.max(self.state.score);
            log::info!(
                "Game over at level {}: score {}, high score {}",
                self.state.level,
                self.state.score,
                self.state.high_score
            );
            self.events.push(GameEvent::LifeLost { lives_left: 0 });
            self.events.push(GameEvent::GameOver {
                score: self.state.score,
                high_score: self.state.high_score,
            });
        }
    }
}
