//! Claw lifecycle and state machine.
//!
//! A fired claw is an owning aggregate: projectile body, collider, the tether
//! back to the player, and (while hooked) the pivot pinning it to whatever it
//! struck. The aggregate is created by [`Claw::fire`] and disposed of only
//! through [`Claw::destroy`], which consumes it and tears the physics objects
//! down in the one safe order.

use glam::Vec2;

use crate::config::GameConfig;
use crate::physics::{
    BodyDesc, JointHandle, Material, PhysicsBody, PhysicsWorld, RigidBodyHandle, ShapeDesc,
    ShapeTag,
};
use crate::queue::PendingAttach;

/// Claw state as seen from outside, including the no-claw case.
///
/// `Retracted` means no claw aggregate exists at all; the other three map
/// onto a live claw's phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClawState {
    /// No claw exists; the player may fire.
    #[default]
    Retracted,
    /// Flying out, tether trailing, nothing hooked yet.
    Air,
    /// Pinned to the struck body by a pivot.
    Attached,
    /// Pivot released; flying free again but unable to re-attach.
    Detached,
}

/// Phase of a live claw. The pivot handle lives inside `Attached`, so an
/// attachment constraint exists exactly while the claw is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClawPhase {
    Air,
    Attached { pivot: JointHandle },
    Detached,
}

/// A live claw and every physics object it owns.
#[derive(Debug)]
pub struct Claw {
    pub(crate) owner: usize,
    pub(crate) body: PhysicsBody,
    pub(crate) tether: JointHandle,
    pub(crate) phase: ClawPhase,
}

impl Claw {
    /// Spawn a claw for `owner`: projectile body launched from the player's
    /// arm along `aim`, plus the tether joint with its free-flight maximum.
    ///
    /// `aim` must be a unit vector.
    pub(crate) fn fire(
        world: &mut PhysicsWorld,
        config: &GameConfig,
        owner: usize,
        player_body: RigidBodyHandle,
        player_pos: Vec2,
        player_vel: Vec2,
        aim: Vec2,
    ) -> Self {
        let (position, velocity, angle) = spawn_kinematics(player_pos, player_vel, aim, config);
        let body = world.create_body(
            ShapeTag::Claw { player: owner },
            &BodyDesc::dynamic(ShapeDesc::Ball { radius: config.claw_radius })
                .with_position(position)
                .with_rotation(angle)
                .with_velocity(velocity)
                .with_ccd(true),
            Material {
                friction: config.claw_friction,
                restitution: config.claw_restitution,
                mass: config.claw_mass,
            },
        );
        let tether = world.create_tether(
            player_body,
            body.body,
            config.min_claw_dist,
            config.tether_free_max,
        );
        log::debug!("player {owner} fired claw at {position:?}, velocity {velocity:?}");
        Self {
            owner,
            body,
            tether,
            phase: ClawPhase::Air,
        }
    }

    /// Externally visible state of this claw.
    pub fn state(&self) -> ClawState {
        match self.phase {
            ClawPhase::Air => ClawState::Air,
            ClawPhase::Attached { .. } => ClawState::Attached,
            ClawPhase::Detached => ClawState::Detached,
        }
    }

    /// Whether this claw may still hook something.
    pub fn can_attach(&self) -> bool {
        matches!(self.phase, ClawPhase::Air)
    }

    /// Whether this claw is currently pinned.
    pub fn is_attached(&self) -> bool {
        matches!(self.phase, ClawPhase::Attached { .. })
    }

    /// Realize a queued attachment: create the pivot at the recorded anchors
    /// and let the rope catch at its current length.
    ///
    /// Panics if the claw is not in flight; the caller's state tracking has
    /// desynchronized if it gets here otherwise.
    pub(crate) fn attach(
        &mut self,
        world: &mut PhysicsWorld,
        player_body: RigidBodyHandle,
        command: &PendingAttach,
        config: &GameConfig,
    ) {
        assert!(
            self.can_attach(),
            "attach requires a claw in flight, phase was {:?}",
            self.phase
        );
        let pivot = world.create_pivot(
            self.body.body,
            command.other_body,
            command.anchor_claw,
            command.anchor_other,
        );
        // The rope catches at the distance it had when the hook bit; with
        // the free-flight maximum left in place the limit would never engage.
        let caught = world
            .body_distance(player_body, self.body.body)
            .max(config.min_claw_dist);
        world.set_tether_limits(self.tether, config.min_claw_dist, caught);
        self.phase = ClawPhase::Attached { pivot };
        log::debug!(
            "player {} claw attached at {:?}, rope caught at {caught:.1}",
            self.owner,
            command.world_point
        );
    }

    /// Unhook: remove the pivot, keep tether and body, and mark the claw so
    /// it cannot re-attach.
    ///
    /// Panics if the claw is not attached.
    pub(crate) fn release(&mut self, world: &mut PhysicsWorld) {
        let ClawPhase::Attached { pivot } = self.phase else {
            panic!("release requires an attached claw, phase was {:?}", self.phase);
        };
        world.remove_joint(pivot);
        self.phase = ClawPhase::Detached;
        log::debug!("player {} claw detached", self.owner);
    }

    /// Destroy every physics object this claw owns.
    ///
    /// Teardown order is fixed: pivot (if present), tether, shape, body. The
    /// body must outlive the constraints that reference it.
    pub(crate) fn destroy(self, world: &mut PhysicsWorld) {
        if let ClawPhase::Attached { pivot } = self.phase {
            world.remove_joint(pivot);
        }
        world.remove_joint(self.tether);
        world.remove_shape(self.body.shape);
        world.remove_body(self.body.body);
        log::debug!("player {} claw retracted", self.owner);
    }
}

/// Where a fired claw starts and how fast it leaves.
///
/// Returns (position, velocity, angle): the claw spawns one arm length from
/// the player along the aim, inherits the player's velocity plus the shoot
/// speed along the aim, and faces the aim direction.
pub(crate) fn spawn_kinematics(
    player_pos: Vec2,
    player_vel: Vec2,
    aim: Vec2,
    config: &GameConfig,
) -> (Vec2, Vec2, f32) {
    let position = player_pos + aim * config.arm_length;
    let velocity = player_vel + aim * config.claw_shoot_speed;
    (position, velocity, aim.to_angle())
}
