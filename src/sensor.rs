//! Ground sensing.
//!
//! Grounded-ness is decided by a thin axis-aligned strip just under the
//! avatar's feet. The strip is rebuilt from the body's current position and
//! queried fresh every tick, so the support count never goes stale. Anything
//! solid intersecting the strip counts as support, except the avatar's own
//! collider, whose box touches the strip's top edge by construction.

use glam::Vec2;

use crate::config::GameConfig;
use crate::physics::{ColliderHandle, PhysicsWorld};

/// The query strip under the feet, as an AABB `(min, max)`.
///
/// The strip spans the avatar's width minus an inset on each side, so
/// brushing a wall with a shoulder does not read as standing on it, and
/// reaches `depth` below the soles.
pub(crate) fn foot_box(
    position: Vec2,
    half_extents: Vec2,
    inset: f32,
    depth: f32,
) -> (Vec2, Vec2) {
    let feet = position.y + half_extents.y;
    (
        Vec2::new(position.x - half_extents.x + inset, feet),
        Vec2::new(position.x + half_extents.x - inset, feet + depth),
    )
}

/// Count the shapes currently supporting an avatar at `position`.
///
/// `own_shape` is the avatar's collider and is never counted.
pub(crate) fn count_supports(
    world: &PhysicsWorld,
    config: &GameConfig,
    position: Vec2,
    own_shape: ColliderHandle,
) -> u32 {
    let (min, max) = foot_box(
        position,
        config.player_half_extents(),
        config.foot_sensor_inset,
        config.foot_sensor_depth,
    );
    let mut count = 0;
    world.for_each_in_aabb(min, max, |handle| {
        if handle != own_shape {
            count += 1;
        }
        true
    });
    count
}
