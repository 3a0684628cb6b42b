//! Collision response for the ball against walls, paddle and bricks
//!
//! Detection is plain rectangle overlap; the interesting part is deciding
//! which velocity component to reflect and how the paddle steers the ball.

use std::f32::consts::PI;

use glam::Vec2;

use super::state::{Ball, Brick, Paddle};
use crate::consts::{BALL_MAX_SPEED, BALL_MIN_SPEED, PADDLE_BOOST};

/// Maximum launch angle off vertical after a paddle hit (±60°)
const PADDLE_SPREAD: f32 = 2.0 * PI / 3.0;

/// Axis a collision reflected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Side hit, horizontal velocity flipped
    X,
    /// Top/bottom hit, vertical velocity flipped
    Y,
}

/// Bounce off the left, right and top walls
///
/// Only a component heading out of the playfield is flipped, and the ball is
/// pushed back inside, so a ball can never jitter along a wall. The bottom is
/// open. Returns true if any wall was hit.
pub fn wall_bounce(ball: &mut Ball, screen_width: f32) -> bool {
    let mut hit = false;
    let max_x = (screen_width - ball.size).max(0.0);

    if ball.pos.x <= 0.0 {
        ball.pos.x = 0.0;
        ball.vel.x = ball.vel.x.abs();
        hit = true;
    } else if ball.pos.x >= max_x {
        ball.pos.x = max_x;
        ball.vel.x = -ball.vel.x.abs();
        hit = true;
    }

    if ball.pos.y <= 0.0 {
        ball.pos.y = 0.0;
        ball.vel.y = ball.vel.y.abs();
        hit = true;
    }

    hit
}

/// Velocity after striking the paddle
///
/// The contact point across the paddle (0 = left edge, 1 = right edge) maps
/// linearly to a launch angle of ±60° from vertical. A ball overlapping the
/// paddle's end lands slightly outside that range and launches a little
/// flatter. Speed grows by the paddle boost and stays inside the speed envelope.
pub fn paddle_launch_velocity(ball: &Ball, paddle: &Paddle) -> Vec2 {
    let hit_ratio = if paddle.width > 0.0 {
        (ball.pos.x + ball.size / 2.0 - paddle.pos.x) / paddle.width
    } else {
        0.5
    };
    let angle = (hit_ratio - 0.5) * PADDLE_SPREAD;
    let speed = (ball.speed() * PADDLE_BOOST).clamp(BALL_MIN_SPEED, BALL_MAX_SPEED);
    Vec2::new(speed * angle.sin(), -speed * angle.cos())
}

/// Bounce off the paddle if falling onto it. Returns true on a hit.
pub fn paddle_bounce(ball: &mut Ball, paddle: &Paddle) -> bool {
    if ball.vel.y > 0.0 && ball.rect().overlaps(&paddle.rect()) {
        ball.vel = paddle_launch_velocity(ball, paddle);
        true
    } else {
        false
    }
}

/// Which face of `brick` the ball entered through
///
/// Entry depth on each axis is measured from the side the ball is travelling
/// toward; the shallower axis is the one that was crossed last.
pub fn brick_entry_axis(ball: &Ball, brick: &Brick) -> Axis {
    let b = ball.rect();
    let r = brick.rect();
    let dx_entry = if ball.vel.x > 0.0 {
        b.right() - r.x
    } else {
        r.right() - b.x
    };
    let dy_entry = if ball.vel.y > 0.0 {
        b.bottom() - r.y
    } else {
        r.bottom() - b.y
    };

    if dx_entry < dy_entry { Axis::X } else { Axis::Y }
}

/// Reflect off a brick face
pub fn brick_bounce(ball: &mut Ball, brick: &Brick) -> Axis {
    let axis = brick_entry_axis(ball, brick);
    match axis {
        Axis::X => ball.vel.x = -ball.vel.x,
        Axis::Y => ball.vel.y = -ball.vel.y,
    }
    axis
}
