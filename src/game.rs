//! Game session.
//!
//! [`Game`] owns the physics world, the players, and the attach queue, and
//! drives them through a fixed per-tick pipeline:
//!
//! 1. realize hook hits queued during the previous tick
//! 2. take this tick's input snapshots and refresh aims
//! 3. locomotion impulses
//! 4. claw buttons: fire and unhook
//! 5. tether length control, including hauling detached claws home
//! 6. one physics step, collecting claw hits
//! 7. queue the first qualifying hit per player for the next tick
//! 8. recount ground support under every avatar
//!
//! Hits attach one tick after they land: the physics step borrows the world
//! while it runs, so the step only records hits and the queue realizes them
//! at the top of the next tick, before anything else moves.

use glam::Vec2;

use crate::claw::ClawState;
use crate::config::{GameConfig, MAX_PLAYERS};
use crate::input::PlayerInput;
use crate::level::{LevelDesc, LevelError, LevelObject};
use crate::locomotion;
use crate::physics::{BodyDesc, Material, PhysicsWorld, ShapeDesc, ShapeTag};
use crate::player::Player;
use crate::queue::{AttachQueue, PendingAttach};
use crate::sensor;
use crate::tether::{self, TetherVerdict};

/// Read-back of one player's claw, present whenever a claw exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClawView {
    pub position: Vec2,
    pub rotation: f32,
    pub velocity: Vec2,
    /// Current rope length limit; the free-flight maximum while unattached.
    pub rope_max: f32,
}

/// Read-back of one player, taken after the latest tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerView {
    pub position: Vec2,
    pub rotation: f32,
    pub velocity: Vec2,
    pub grounded: bool,
    /// Shapes under the feet; zero exactly when airborne.
    pub foot_contacts: u32,
    pub aim: Vec2,
    pub claw_state: ClawState,
    pub claw: Option<ClawView>,
}

/// A running match: world, players, and the claw attach queue.
///
/// # Example
///
/// ```
/// use grapple_core::prelude::*;
///
/// let mut game = Game::new(GameConfig::default());
/// game.load_level(&test_arena()).unwrap();
/// game.update(&[PlayerInput::new(); MAX_PLAYERS]);
/// let view = game.player_view(0).unwrap();
/// assert_eq!(view.claw_state, ClawState::Retracted);
/// ```
pub struct Game {
    config: GameConfig,
    world: PhysicsWorld,
    players: [Option<Player>; MAX_PLAYERS],
    queue: AttachQueue,
    tick: u64,
}

impl Game {
    /// Create an empty session with the given tuning.
    pub fn new(config: GameConfig) -> Self {
        config.validate();
        Self {
            world: PhysicsWorld::new(config.gravity, config.time_step),
            config,
            players: std::array::from_fn(|_| None),
            queue: AttachQueue::new(),
            tick: 0,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Ticks simulated so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Add one static platform, given by center and full extents.
    pub fn add_platform(&mut self, position: Vec2, size: Vec2) -> Result<(), LevelError> {
        if size.x <= 0.0 || size.y <= 0.0 {
            return Err(LevelError::DegeneratePlatform {
                x: position.x,
                y: position.y,
            });
        }
        self.world.create_body(
            ShapeTag::Platform,
            &BodyDesc::fixed(ShapeDesc::Cuboid {
                half_width: size.x * 0.5,
                half_height: size.y * 0.5,
            })
            .with_position(position),
            Material {
                friction: self.config.platform_friction,
                ..Material::default()
            },
        );
        Ok(())
    }

    /// Spawn the avatar for `index` at `position`.
    pub fn init_player(&mut self, index: usize, position: Vec2) -> Result<(), LevelError> {
        if index >= MAX_PLAYERS {
            return Err(LevelError::PlayerIndexOutOfRange { index });
        }
        if self.players[index].is_some() {
            return Err(LevelError::DuplicateStart { index });
        }
        self.players[index] = Some(Player::spawn(&mut self.world, &self.config, index, position));
        log::debug!("player {index} spawned at {position:?}");
        Ok(())
    }

    /// Ingest a level description, object by object, in order.
    pub fn load_level(&mut self, level: &LevelDesc) -> Result<(), LevelError> {
        let mut platforms = 0usize;
        let mut starts = 0usize;
        for object in &level.objects {
            match *object {
                LevelObject::Platform { position, size } => {
                    self.add_platform(position, size)?;
                    platforms += 1;
                }
                LevelObject::Start { player, position } => {
                    self.init_player(player, position)?;
                    starts += 1;
                }
            }
        }
        log::info!("loaded level: {platforms} platforms, {starts} players");
        Ok(())
    }

    /// Advance the match by one fixed tick.
    ///
    /// `inputs` is indexed by player; slots without a player are ignored.
    pub fn update(&mut self, inputs: &[PlayerInput; MAX_PLAYERS]) {
        self.flush_pending();

        for (slot, input) in self.players.iter_mut().zip(inputs) {
            if let Some(player) = slot {
                player.apply_input(*input, self.config.dead_zone);
            }
        }

        for slot in self.players.iter_mut() {
            if let Some(player) = slot {
                let grounded = player.grounded();
                locomotion::drive(
                    &mut self.world,
                    &self.config,
                    player.body.body,
                    &player.input,
                    grounded,
                    &mut player.jump_frames,
                );
            }
        }

        for slot in self.players.iter_mut() {
            if let Some(player) = slot {
                player.claw_input(&mut self.world, &self.config);
            }
        }

        for slot in self.players.iter_mut() {
            if let Some(player) = slot {
                let reel_out = player.input.reel_out;
                let verdict = match player.claw.as_ref() {
                    Some(claw) => tether::control_length(
                        &mut self.world,
                        &self.config,
                        player.body.body,
                        claw,
                        reel_out,
                    ),
                    None => TetherVerdict::Keep,
                };
                if verdict == TetherVerdict::Retract {
                    player.retract_claw(&mut self.world);
                }
            }
        }

        let hits = self.world.step();
        for hit in hits {
            let can_attach = self.players[hit.owner]
                .as_ref()
                .and_then(|p| p.claw.as_ref())
                .is_some_and(|claw| claw.can_attach());
            if can_attach && self.queue.enqueue(PendingAttach::from_hit(&hit)) {
                log::debug!(
                    "player {} claw hit {:?} at {:?}, attach queued",
                    hit.owner,
                    hit.other_tag,
                    hit.world_point
                );
            }
        }

        for slot in self.players.iter_mut() {
            if let Some(player) = slot {
                let (pos, _) = self.world.body_position(player.body.body);
                player.foot_contacts =
                    sensor::count_supports(&self.world, &self.config, pos, player.body.shape);
            }
        }

        self.tick += 1;
    }

    /// Destroy a player's claw immediately, whatever its state.
    pub fn force_retract(&mut self, index: usize) {
        self.queue.cancel(index);
        if let Some(player) = self.players.get_mut(index).and_then(Option::as_mut) {
            player.retract_claw(&mut self.world);
        }
    }

    /// Snapshot one player for rendering or assertions.
    pub fn player_view(&self, index: usize) -> Option<PlayerView> {
        let player = self.players.get(index)?.as_ref()?;
        let (position, rotation) = self.world.body_position(player.body.body);
        let claw = player.claw.as_ref().map(|claw| {
            let (claw_pos, claw_rot) = self.world.body_position(claw.body.body);
            ClawView {
                position: claw_pos,
                rotation: claw_rot,
                velocity: self.world.velocity(claw.body.body),
                rope_max: self
                    .world
                    .tether_limits(claw.tether)
                    .map_or(self.config.tether_free_max, |(_, max)| max),
            }
        });
        Some(PlayerView {
            position,
            rotation,
            velocity: self.world.velocity(player.body.body),
            grounded: player.grounded(),
            foot_contacts: player.foot_contacts,
            aim: player.aim,
            claw_state: player.claw_state(),
            claw,
        })
    }

    /// Realize the attach commands queued during the previous tick.
    ///
    /// A command can go stale in the gap: the claw may have been retracted
    /// or the struck body removed. Stale commands are dropped silently; the
    /// claw just keeps flying.
    fn flush_pending(&mut self) {
        for command in self.queue.drain() {
            let Some(player) = self.players[command.player].as_mut() else {
                continue;
            };
            if !self.world.body_exists(command.other_body) {
                log::debug!(
                    "player {} hook target vanished before the attach",
                    command.player
                );
                continue;
            }
            let Some(claw) = player.claw.as_mut() else {
                continue;
            };
            if !claw.can_attach() {
                continue;
            }
            claw.attach(&mut self.world, player.body.body, &command, &self.config);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::test_arena;

    fn idle() -> [PlayerInput; MAX_PLAYERS] {
        [PlayerInput::new(); MAX_PLAYERS]
    }

    #[test]
    fn an_empty_session_has_no_views() {
        let game = Game::new(GameConfig::default());
        assert_eq!(game.tick(), 0);
        assert!(game.player_view(0).is_none());
        assert!(game.player_view(MAX_PLAYERS + 1).is_none());
    }

    #[test]
    fn loading_the_arena_spawns_both_players() {
        let mut game = Game::new(GameConfig::default());
        game.load_level(&test_arena()).expect("arena loads");
        assert!(game.player_view(0).is_some());
        assert!(game.player_view(1).is_some());
        assert!(game.player_view(2).is_none());
        assert_eq!(game.tick(), 0, "loading does not simulate");
    }

    #[test]
    fn out_of_range_start_is_rejected() {
        let mut game = Game::new(GameConfig::default());
        let level = LevelDesc::new().with_start(MAX_PLAYERS, Vec2::ZERO);
        assert_eq!(
            game.load_level(&level),
            Err(LevelError::PlayerIndexOutOfRange { index: MAX_PLAYERS })
        );
    }

    #[test]
    fn a_second_start_for_the_same_player_is_rejected() {
        let mut game = Game::new(GameConfig::default());
        let level = LevelDesc::new()
            .with_start(0, Vec2::ZERO)
            .with_start(0, Vec2::new(100.0, 0.0));
        assert_eq!(
            game.load_level(&level),
            Err(LevelError::DuplicateStart { index: 0 })
        );
    }

    #[test]
    fn a_flat_platform_is_rejected() {
        let mut game = Game::new(GameConfig::default());
        assert_eq!(
            game.add_platform(Vec2::new(5.0, 6.0), Vec2::new(100.0, 0.0)),
            Err(LevelError::DegeneratePlatform { x: 5.0, y: 6.0 })
        );
    }

    #[test]
    fn players_settle_onto_the_floor() {
        let mut game = Game::new(GameConfig::default());
        game.load_level(&test_arena()).expect("arena loads");
        for _ in 0..30 {
            game.update(&idle());
        }
        assert_eq!(game.tick(), 30);
        let view = game.player_view(0).expect("player exists");
        assert!(view.grounded, "the arena floor carries the player");
        assert!(view.foot_contacts > 0);
        assert!(view.velocity.length() < 5.0, "settled, not sliding");
    }

    #[test]
    fn force_retract_is_safe_in_every_state() {
        let mut game = Game::new(GameConfig::default());
        game.load_level(&test_arena()).expect("arena loads");

        game.force_retract(0);
        game.force_retract(MAX_PLAYERS + 7);

        let mut inputs = idle();
        inputs[0].fire = true;
        game.update(&inputs);
        assert_eq!(game.player_view(0).unwrap().claw_state, ClawState::Air);

        game.force_retract(0);
        let view = game.player_view(0).unwrap();
        assert_eq!(view.claw_state, ClawState::Retracted);
        assert!(view.claw.is_none());
    }
}
