//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - One `Engine::update` call is exactly one tick
//! - Every random draw comes from the engine's seeded RNG
//! - No rendering, input devices or I/O during a tick

pub mod collision;
pub mod engine;
pub mod events;
pub mod rect;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use collision::{Axis, brick_bounce, paddle_bounce, paddle_launch_velocity, wall_bounce};
pub use engine::Engine;
pub use events::GameEvent;
pub use rect::Rect;
pub use snapshot::StateSnapshot;
pub use state::{
    Ball, Brick, ControlMode, GamePhase, GameState, Laser, LaserState, Paddle, Particle, Powerup,
    PowerupKind,
};
pub use tick::TickInput;
