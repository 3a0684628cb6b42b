//! Per-tick simulation update
//!
//! Stage order: input, paddle, laser volley, lasers, balls, powerups,
//! particles, level-complete check. Lasers resolve before balls, and broken
//! bricks are removed at the end of each stage, so a brick is credited once.

use serde::{Deserialize, Serialize};

use super::collision::{brick_bounce, paddle_bounce, wall_bounce};
use super::engine::Engine;
use super::events::GameEvent;
use super::state::{Ball, Brick, GamePhase};
use crate::consts::LEVEL_BONUS;

/// Input for a single tick
///
/// Every field is optional; an absent held-key flag keeps its previous value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickInput {
    /// Pointer x in playfield units
    #[serde(alias = "mouse_x")]
    pub pointer_x: Option<f32>,
    /// Left key held
    pub left_pressed: Option<bool>,
    /// Right key held
    pub right_pressed: Option<bool>,
    /// Release resting balls
    pub launch_pressed: bool,
    /// Toggle pause
    pub pause_pressed: bool,
    /// Switch between pointer and key control
    pub toggle_control_pressed: bool,
    /// Demo mode: the paddle tracks the ball and launches by itself
    pub autopilot: bool,
}

impl Engine {
    /// Advance the simulation by one tick
    ///
    /// Motion is per tick; `dt` (seconds) only drives the laser timers.
    pub fn update(&mut self, dt: f32, input: &TickInput) {
        if input.pause_pressed {
            match self.state.phase {
                GamePhase::Playing => {
                    self.toggle_pause();
                    return;
                }
                GamePhase::Paused => self.toggle_pause(),
                _ => {}
            }
        }

        if self.state.phase != GamePhase::Playing {
            return;
        }

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.state.clock += dt;

        let pointer_x = self.apply_input(input);
        self.state.paddle.update(dt, pointer_x);
        self.fire_lasers();
        self.update_lasers();
        self.update_balls();
        if self.state.phase == GamePhase::GameOver {
            return;
        }
        self.update_powerups();
        self.update_particles();
        self.check_level_complete();
    }

    /// Apply one-shot presses and held keys; returns the pointer to follow
    fn apply_input(&mut self, input: &TickInput) -> Option<f32> {
        let paddle = &mut self.state.paddle;
        if input.toggle_control_pressed {
            paddle.control = paddle.control.toggled();
            log::debug!("Control mode: {:?}", paddle.control);
        }
        if let Some(left) = input.left_pressed {
            paddle.move_left = left;
        }
        if let Some(right) = input.right_pressed {
            paddle.move_right = right;
        }

        let mut launch = input.launch_pressed;
        let mut pointer_x = input.pointer_x;
        if input.autopilot {
            launch = true;
            pointer_x = self.autopilot_target().or(pointer_x);
        }

        if launch {
            self.state.balls.iter_mut().for_each(|b| b.active = true);
        }
        pointer_x
    }

    /// Where the demo paddle should center: under the lowest falling ball,
    /// else under the lowest ball at all
    fn autopilot_target(&self) -> Option<f32> {
        let lowest = |a: &&Ball, b: &&Ball| a.pos.y.total_cmp(&b.pos.y);
        let balls = &self.state.balls;
        balls
            .iter()
            .filter(|b| b.active && b.vel.y > 0.0)
            .max_by(lowest)
            .or_else(|| balls.iter().max_by(lowest))
            .map(|b| b.pos.x + b.size / 2.0)
    }

    fn fire_lasers(&mut self) {
        let volley = self.state.paddle.shoot_laser(self.state.clock);
        if !volley.is_empty() {
            self.state.lasers.extend(volley);
            self.events.push(GameEvent::LaserFired);
        }
    }

    /// Move lasers up; each one breaks against the first brick it touches
    fn update_lasers(&mut self) {
        let bricks = &mut self.state.bricks;
        let mut destroyed = Vec::new();

        self.state.lasers.retain_mut(|laser| {
            laser.update();
            if laser.pos.y < 0.0 {
                return false;
            }
            let rect = laser.rect();
            match bricks
                .iter_mut()
                .enumerate()
                .find(|(_, b)| !b.broken && b.rect().overlaps(&rect))
            {
                Some((index, brick)) => {
                    if brick.hit(false) {
                        destroyed.push(index);
                    }
                    false
                }
                None => true,
            }
        });

        for index in destroyed {
            self.destroy_brick(index);
        }
        self.state.bricks.retain(|b| !b.broken);
    }

    fn update_balls(&mut self) {
        let screen_width = self.config.screen_width;
        let screen_height = self.config.screen_height;
        let mut lost = vec![false; self.state.balls.len()];
        let mut remaining = self.state.balls.len();
        let mut out_of_balls = false;

        for i in 0..self.state.balls.len() {
            let paddle = &self.state.paddle;
            let ball = &mut self.state.balls[i];

            if !ball.active {
                ball.stick_to(paddle);
                continue;
            }

            ball.update();

            if ball.is_lost(screen_height) {
                if remaining > 1 {
                    lost[i] = true;
                    remaining -= 1;
                    log::debug!("Ball lost, {remaining} still in play");
                    self.events.push(GameEvent::BallLost);
                    continue;
                }
                out_of_balls = true;
                break;
            }

            wall_bounce(ball, screen_width);
            paddle_bounce(ball, paddle);

            let destroyed = hit_bricks(ball, &mut self.state.bricks);
            for index in destroyed {
                self.destroy_brick(index);
            }
        }

        if out_of_balls {
            self.lose_life();
        } else {
            let mut flags = lost.into_iter();
            self.state.balls.retain(|_| !flags.next().unwrap_or(false));
        }
        self.state.bricks.retain(|b| !b.broken);
    }

    /// Drop powerups; the paddle collects the ones it touches
    fn update_powerups(&mut self) {
        let screen_height = self.config.screen_height;
        let paddle_rect = self.state.paddle.rect();
        let mut collected = Vec::new();

        self.state.powerups.retain_mut(|powerup| {
            powerup.update();
            if powerup.pos.y > screen_height {
                return false;
            }
            if !powerup.collected && powerup.rect().overlaps(&paddle_rect) {
                powerup.collected = true;
                collected.push(powerup.kind);
                return false;
            }
            true
        });

        for kind in collected {
            self.apply_powerup(kind);
        }
    }

    fn update_particles(&mut self) {
        for particle in &mut self.state.particles {
            particle.update();
        }
        self.state.particles.retain(|p| !p.expired());
    }

    fn check_level_complete(&mut self) {
        if self.state.phase != GamePhase::Playing || !self.state.bricks.is_empty() {
            return;
        }
        let level = self.state.level;
        let bonus = LEVEL_BONUS * level as u64;
        self.state.score += bonus;
        self.state.phase = GamePhase::LevelComplete;
        log::info!("Level {} complete, bonus {}, score {}", level, bonus, self.state.score);
        self.events.push(GameEvent::LevelComplete { level, bonus });
    }
}

/// Resolve a ball against the bricks; returns indices of bricks destroyed
///
/// A normal ball bounces off the first brick it overlaps and stops checking.
/// A thru ball destroys every brick it overlaps without bouncing.
fn hit_bricks(ball: &mut Ball, bricks: &mut [Brick]) -> Vec<usize> {
    let mut destroyed = Vec::new();
    for (index, brick) in bricks.iter_mut().enumerate() {
        if brick.broken || !ball.rect().overlaps(&brick.rect()) {
            continue;
        }
        if !ball.thru {
            brick_bounce(ball, brick);
        }
        if brick.hit(ball.thru) {
            destroyed.push(index);
        }
        if !ball.thru {
            break;
        }
    }
    destroyed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineConfig;
    use crate::consts::*;
    use crate::sim::state::{ControlMode, Powerup, PowerupKind};
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn engine() -> Engine {
        let mut engine = Engine::with_seed(EngineConfig::default(), 12345);
        engine.drain_events();
        engine
    }

    fn launch() -> TickInput {
        TickInput {
            launch_pressed: true,
            ..Default::default()
        }
    }

    fn moving_ball(x: f32, y: f32, vx: f32, vy: f32) -> Ball {
        let mut ball = Ball::with_velocity(Vec2::new(x, y), Vec2::new(vx, vy));
        ball.active = true;
        ball
    }

    #[test]
    fn test_resting_ball_follows_paddle() {
        let mut engine = engine();
        engine.update(DT, &TickInput::default());
        let ball = &engine.state().balls[0];
        assert!(!ball.active);
        assert_eq!(ball.pos, Vec2::new(392.5, 535.0));

        engine.update(
            DT,
            &TickInput {
                pointer_x: Some(200.0),
                ..Default::default()
            },
        );
        assert_eq!(engine.state().balls[0].pos.x, 200.0 - 7.5);
    }

    #[test]
    fn test_launch_moves_ball() {
        let mut engine = engine();
        engine.update(DT, &TickInput::default());
        let before = engine.state().balls[0].pos;
        engine.update(DT, &launch());
        let ball = &engine.state().balls[0];
        assert!(ball.active);
        assert_eq!(ball.pos, before + ball.vel);
    }

    #[test]
    fn test_pause_freezes_everything() {
        let mut engine = engine();
        engine.update(DT, &launch());
        let pause = TickInput {
            pause_pressed: true,
            ..Default::default()
        };
        engine.update(DT, &pause);
        assert_eq!(engine.phase(), GamePhase::Paused);

        let frozen = engine.state().balls[0].pos;
        for _ in 0..10 {
            engine.update(DT, &launch());
        }
        assert_eq!(engine.state().balls[0].pos, frozen);

        // Unpausing resumes in the same tick
        engine.update(DT, &pause);
        assert_eq!(engine.phase(), GamePhase::Playing);
        assert_ne!(engine.state().balls[0].pos, frozen);
    }

    #[test]
    fn test_held_keys_persist_until_released() {
        let mut engine = engine();
        engine.update(
            DT,
            &TickInput {
                toggle_control_pressed: true,
                right_pressed: Some(true),
                ..Default::default()
            },
        );
        assert_eq!(engine.state().paddle.control, ControlMode::Keys);
        assert_eq!(engine.state().paddle.pos.x, 360.0);

        engine.update(DT, &TickInput::default());
        assert_eq!(engine.state().paddle.pos.x, 370.0);

        engine.update(
            DT,
            &TickInput {
                right_pressed: Some(false),
                ..Default::default()
            },
        );
        assert_eq!(engine.state().paddle.pos.x, 370.0);
    }

    #[test]
    fn test_laser_breaks_brick_before_ball_sees_it() {
        let mut engine = engine();
        let state = engine.state_mut();
        state.bricks = vec![
            Brick::new(Vec2::new(340.0, 515.0), 1),
            Brick::new(Vec2::new(0.0, 0.0), 1),
        ];
        state.balls = vec![moving_ball(355.0, 520.0, 0.0, -1.0)];
        state.paddle.activate_laser();

        engine.update(DT, &TickInput::default());
        let state = engine.state();
        // One laser hit the low brick, the other flew on
        assert_eq!(state.bricks.len(), 1);
        assert_eq!(state.score, 10);
        assert_eq!(state.lasers.len(), 1);
        // The ball passed through the spot without a second credit
        assert_eq!(state.balls[0].vel, Vec2::new(0.0, -1.0));
        assert_eq!(state.lasers[0].pos.y, 530.0);
    }

    #[test]
    fn test_laser_cooldown_between_volleys() {
        let mut engine = engine();
        engine.state_mut().bricks = vec![Brick::new(Vec2::new(0.0, 0.0), 1)];
        engine.state_mut().paddle.activate_laser();
        engine.update(DT, &TickInput::default());
        assert_eq!(engine.state().lasers.len(), 2);
        engine.update(DT, &TickInput::default());
        assert_eq!(engine.state().lasers.len(), 2);
        for _ in 0..30 {
            engine.update(DT, &TickInput::default());
        }
        assert_eq!(engine.state().lasers.len(), 4);
    }

    #[test]
    fn test_fired_lasers_outlive_laser_mode() {
        let mut engine = engine();
        engine.state_mut().bricks = vec![Brick::new(Vec2::new(0.0, 0.0), 1)];
        engine.state_mut().paddle.activate_laser();
        engine.state_mut().paddle.laser.remaining_time = 1.5 * DT;

        engine.update(DT, &TickInput::default());
        assert!(engine.state().paddle.laser.active);
        assert_eq!(engine.state().lasers.len(), 2);
        let fired_at = engine.state().lasers[0].pos.y;

        engine.update(DT, &TickInput::default());
        let state = engine.state();
        assert!(!state.paddle.laser.active);
        assert_eq!(state.lasers.len(), 2);
        assert_eq!(state.lasers[0].pos.y, fired_at - LASER_SPEED);
    }

    #[test]
    fn test_normal_ball_hits_one_brick_per_tick() {
        let mut engine = engine();
        let state = engine.state_mut();
        // Two overlapping bricks under the ball's next position
        state.bricks = vec![
            Brick::new(Vec2::new(100.0, 100.0), 1),
            Brick::new(Vec2::new(110.0, 100.0), 1),
            Brick::new(Vec2::new(600.0, 20.0), 1),
        ];
        state.balls = vec![moving_ball(120.0, 122.0, 0.0, -4.0)];
        engine.update(DT, &TickInput::default());

        let state = engine.state();
        assert_eq!(state.bricks.len(), 2);
        assert_eq!(state.score, 10);
        assert_eq!(state.balls[0].vel, Vec2::new(0.0, 4.0));
    }

    #[test]
    fn test_thru_ball_clears_overlapping_bricks_without_bouncing() {
        let mut engine = engine();
        let state = engine.state_mut();
        state.bricks = vec![
            Brick::new(Vec2::new(100.0, 100.0), 4),
            Brick::new(Vec2::new(110.0, 100.0), 3),
            Brick::new(Vec2::new(600.0, 20.0), 1),
        ];
        let mut ball = moving_ball(120.0, 122.0, 0.0, -4.0);
        ball.thru = true;
        state.balls = vec![ball];
        engine.update(DT, &TickInput::default());

        let state = engine.state();
        assert_eq!(state.bricks.len(), 1);
        assert_eq!(state.score, 70);
        assert_eq!(state.balls[0].vel, Vec2::new(0.0, -4.0));
    }

    #[test]
    fn test_extra_ball_loss_keeps_life() {
        let mut engine = engine();
        engine.state_mut().balls = vec![
            moving_ball(100.0, SCREEN_HEIGHT - 1.0, 0.0, 5.0),
            moving_ball(300.0, 200.0, 0.0, -5.0),
        ];
        engine.update(DT, &TickInput::default());
        assert_eq!(engine.state().balls.len(), 1);
        assert_eq!(engine.state().lives, 3);
        assert!(engine.drain_events().contains(&GameEvent::BallLost));
    }

    #[test]
    fn test_last_ball_loss_costs_life_and_respawns() {
        let mut engine = engine();
        engine.state_mut().balls = vec![moving_ball(100.0, SCREEN_HEIGHT - 1.0, 0.0, 5.0)];
        engine.update(DT, &TickInput::default());
        let state = engine.state();
        assert_eq!(state.lives, 2);
        assert_eq!(state.balls.len(), 1);
        assert!(!state.balls[0].active);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_powerup_collected_once() {
        let mut engine = engine();
        let paddle = engine.state().paddle.rect();
        engine.state_mut().powerups = vec![Powerup::new(
            Vec2::new(paddle.x + 10.0, paddle.y - POWERUP_SIZE),
            PowerupKind::Life,
        )];
        engine.update(DT, &TickInput::default());
        assert_eq!(engine.state().lives, 4);
        assert!(engine.state().powerups.is_empty());
        engine.update(DT, &TickInput::default());
        assert_eq!(engine.state().lives, 4);
    }

    #[test]
    fn test_missed_powerup_falls_away() {
        let mut engine = engine();
        engine.state_mut().powerups = vec![Powerup::new(
            Vec2::new(10.0, SCREEN_HEIGHT - 1.0),
            PowerupKind::Expand,
        )];
        engine.update(DT, &TickInput::default());
        assert!(engine.state().powerups.is_empty());
        assert_eq!(engine.state().paddle.width, PADDLE_WIDTH);
    }

    #[test]
    fn test_level_complete_awards_bonus_once() {
        let mut engine = engine();
        engine.state_mut().bricks = vec![Brick::new(Vec2::new(100.0, 100.0), 2)];
        engine.state_mut().balls = vec![moving_ball(120.0, 122.0, 0.0, -4.0)];
        engine.state_mut().bricks[0].strength = 1;
        engine.update(DT, &TickInput::default());

        let state = engine.state();
        assert_eq!(state.phase, GamePhase::LevelComplete);
        assert_eq!(state.score, 20 + 100);

        let ball = state.balls[0].pos;
        engine.update(DT, &TickInput::default());
        assert_eq!(engine.state().score, 120);
        assert_eq!(engine.state().balls[0].pos, ball);
    }

    #[test]
    fn test_empty_level_completes_immediately() {
        let mut engine = engine();
        engine.state_mut().bricks.clear();
        engine.update(DT, &TickInput::default());
        assert_eq!(engine.phase(), GamePhase::LevelComplete);
        assert_eq!(engine.state().score, 100);
    }

    #[test]
    fn test_autopilot_tracks_falling_ball() {
        let mut engine = engine();
        engine.state_mut().balls = vec![moving_ball(600.0, 300.0, 0.0, 3.0)];
        engine.update(
            DT,
            &TickInput {
                autopilot: true,
                ..Default::default()
            },
        );
        let paddle = &engine.state().paddle;
        assert!((paddle.center_x() - 607.5).abs() < 1e-3);
    }

    #[test]
    fn test_input_json_accepts_partial_fields() {
        let input: TickInput = serde_json::from_str(r#"{"mouse_x": 12.5, "launch_pressed": true}"#).unwrap();
        assert_eq!(input.pointer_x, Some(12.5));
        assert!(input.launch_pressed);
        assert_eq!(input.left_pressed, None);
    }
}
