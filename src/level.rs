//! Level descriptions.
//!
//! A level is a flat list of objects: static platforms and player start
//! points. The session ingests the list in order and rejects anything that
//! cannot be realized, so a bad level fails loudly at load time instead of
//! misbehaving mid-match.

use glam::Vec2;
use thiserror::Error;

use crate::config::MAX_PLAYERS;

/// One object in a level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LevelObject {
    /// A static box, given by its center and full extents.
    Platform { position: Vec2, size: Vec2 },
    /// Where a player's avatar spawns.
    Start { player: usize, position: Vec2 },
}

/// An ordered list of level objects.
///
/// # Example
///
/// ```
/// use glam::Vec2;
/// use grapple_core::prelude::*;
///
/// let level = LevelDesc::new()
///     .with_platform(Vec2::new(400.0, 500.0), Vec2::new(800.0, 40.0))
///     .with_start(0, Vec2::new(400.0, 400.0));
/// assert_eq!(level.objects.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelDesc {
    pub objects: Vec<LevelObject>,
}

impl LevelDesc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_platform(mut self, position: Vec2, size: Vec2) -> Self {
        self.objects.push(LevelObject::Platform { position, size });
        self
    }

    pub fn with_start(mut self, player: usize, position: Vec2) -> Self {
        self.objects.push(LevelObject::Start { player, position });
        self
    }
}

/// Why a level was rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum LevelError {
    #[error("player index {index} is out of range, the session holds at most {MAX_PLAYERS} players")]
    PlayerIndexOutOfRange { index: usize },
    #[error("player {index} has more than one start point")]
    DuplicateStart { index: usize },
    #[error("platform at ({x}, {y}) has a non-positive size")]
    DegeneratePlatform { x: f32, y: f32 },
}

/// A closed 1600 x 900 arena with two facing start points.
///
/// Floor, ceiling, and both side walls are solid, so every claw shot
/// eventually hits something. Handy for tests and quick experiments.
pub fn test_arena() -> LevelDesc {
    LevelDesc::new()
        .with_platform(Vec2::new(800.0, 880.0), Vec2::new(1600.0, 40.0))
        .with_platform(Vec2::new(800.0, 20.0), Vec2::new(1600.0, 40.0))
        .with_platform(Vec2::new(20.0, 450.0), Vec2::new(40.0, 900.0))
        .with_platform(Vec2::new(1580.0, 450.0), Vec2::new(40.0, 900.0))
        .with_start(0, Vec2::new(400.0, 830.0))
        .with_start(1, Vec2::new(1200.0, 830.0))
}
