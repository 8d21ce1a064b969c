//! Player avatars.
//!
//! A player owns a rotation-locked box body, the latest input snapshot, the
//! persistent aim direction, the jump hold counter, the ground sensor's
//! support count, and at most one claw. `claw: None` is the retracted state,
//! so a tether can only exist while a claw does.

use glam::Vec2;

use crate::claw::{Claw, ClawState};
use crate::config::GameConfig;
use crate::input::PlayerInput;
use crate::physics::{BodyDesc, Material, PhysicsBody, PhysicsWorld, ShapeDesc, ShapeTag};

pub(crate) struct Player {
    pub(crate) index: usize,
    pub(crate) body: PhysicsBody,
    pub(crate) input: PlayerInput,
    /// Unit aim direction; persists while the stick is in the dead zone.
    pub(crate) aim: Vec2,
    /// Frames the current jump has boosted; zero when no jump is in progress.
    pub(crate) jump_frames: u32,
    /// Shapes under the feet, recounted after every physics step.
    pub(crate) foot_contacts: u32,
    pub(crate) claw: Option<Claw>,
}

impl Player {
    /// Create the avatar body at `at` and an otherwise idle player.
    pub(crate) fn spawn(
        world: &mut PhysicsWorld,
        config: &GameConfig,
        index: usize,
        at: Vec2,
    ) -> Self {
        let half = config.player_half_extents();
        let body = world.create_body(
            ShapeTag::Avatar { player: index },
            &BodyDesc::dynamic(ShapeDesc::Cuboid {
                half_width: half.x,
                half_height: half.y,
            })
            .with_position(at)
            .with_locked_rotation(true),
            Material {
                friction: config.player_friction,
                restitution: config.player_restitution,
                mass: config.player_mass,
            },
        );
        Self {
            index,
            body,
            input: PlayerInput::default(),
            aim: Vec2::X,
            jump_frames: 0,
            foot_contacts: 0,
            claw: None,
        }
    }

    /// Take this tick's input and refresh the aim from it.
    pub(crate) fn apply_input(&mut self, input: PlayerInput, dead_zone: f32) {
        self.aim = input.updated_aim(self.aim, dead_zone);
        self.input = input;
    }

    pub(crate) fn grounded(&self) -> bool {
        self.foot_contacts > 0
    }

    pub(crate) fn claw_state(&self) -> ClawState {
        self.claw.as_ref().map_or(ClawState::Retracted, Claw::state)
    }

    /// Act on this tick's claw buttons.
    ///
    /// Firing while a claw exists is a no-op, as is unhooking a claw that is
    /// not attached; the buttons only mean something in the right state.
    pub(crate) fn claw_input(&mut self, world: &mut PhysicsWorld, config: &GameConfig) {
        if self.input.fire && self.claw.is_none() {
            let (pos, _) = world.body_position(self.body.body);
            let vel = world.velocity(self.body.body);
            self.claw = Some(Claw::fire(
                world,
                config,
                self.index,
                self.body.body,
                pos,
                vel,
                self.aim,
            ));
        }
        if self.input.unhook {
            if let Some(claw) = self.claw.as_mut() {
                if claw.is_attached() {
                    claw.release(world);
                }
            }
        }
    }

    /// Destroy the claw if there is one. Safe to call in any state.
    pub(crate) fn retract_claw(&mut self, world: &mut PhysicsWorld) {
        if let Some(claw) = self.claw.take() {
            claw.destroy(world);
        }
    }
}
