//! # `grapple_core`
//!
//! Simulation core for a local-multiplayer 2D grapple-hook platformer.
//!
//! This crate provides a deterministic, headless match simulation that:
//! - Runs run-and-jump locomotion on rotation-locked avatar bodies
//! - Fires a tethered claw projectile that hooks the first thing it hits
//! - Models the rope as a distance limit with reel-in, reel-out, and
//!   tension relief
//! - Senses ground support with a query strip rebuilt under the feet
//!   every tick
//! - Defers hook attachment by one tick through a mutation queue
//!
//! ## Architecture
//!
//! Everything advances through [`Game::update`], one fixed tick at a time:
//! 1. Hook hits recorded during the previous tick's physics step are
//!    realized as pivot joints
//! 2. Input snapshots drive aim, locomotion impulses, and claw buttons
//! 3. The tether controller moves each rope's length limit
//! 4. The physics world steps once, recording new claw hits
//! 5. Ground support is recounted under every avatar
//!
//! The world is y-down and pixel-scaled: gravity is positive y, and
//! positions read naturally as screen coordinates.
//!
//! ## Usage
//!
//! ```rust
//! use grapple_core::prelude::*;
//!
//! let mut game = Game::new(GameConfig::default());
//! game.load_level(&test_arena()).unwrap();
//!
//! // Player 0 fires the claw straight ahead.
//! let mut inputs = [PlayerInput::new(); MAX_PLAYERS];
//! inputs[0].fire = true;
//! game.update(&inputs);
//!
//! assert_eq!(game.player_view(0).unwrap().claw_state, ClawState::Air);
//! ```
//!
//! [`Game::update`]: crate::game::Game::update

pub mod claw;
pub mod config;
pub mod game;
pub mod input;
pub mod level;
pub mod physics;

mod locomotion;
mod player;
mod queue;
mod sensor;
mod tether;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::claw::ClawState;
    pub use crate::config::{GameConfig, MAX_PLAYERS};
    pub use crate::game::{ClawView, Game, PlayerView};
    pub use crate::input::PlayerInput;
    pub use crate::level::{test_arena, LevelDesc, LevelError, LevelObject};
}
