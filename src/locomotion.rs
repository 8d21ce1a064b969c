//! Run-and-jump locomotion.
//!
//! Horizontal movement and jumping are both impulse driven so they compose
//! with whatever the rope is doing to the avatar. The decisions are pure
//! functions; [`drive`] applies them to the body once per tick.

use glam::Vec2;

use crate::config::GameConfig;
use crate::input::PlayerInput;
use crate::physics::{PhysicsWorld, RigidBodyHandle};

/// Horizontal move impulse for one tick, or `None` when no push is wanted.
///
/// `axis` is the dead-zone-filtered stick value. The speed cap scales with
/// the axis and is checked before the push: once the avatar already moves
/// at least that fast in the commanded direction, no further impulse is
/// applied that tick. Pushing against current motion is always allowed, so
/// braking stays responsive.
pub(crate) fn move_impulse(
    axis: f32,
    vel_x: f32,
    grounded: bool,
    config: &GameConfig,
) -> Option<Vec2> {
    if axis == 0.0 {
        return None;
    }
    let cap = axis.abs() * config.max_move_speed;
    if vel_x * axis.signum() >= cap {
        return None;
    }
    let magnitude = if grounded {
        config.ground_move_impulse
    } else {
        config.air_move_impulse
    };
    Some(Vec2::new(axis * magnitude, 0.0))
}

/// Jump impulse for one tick, or `None`.
///
/// A jump starts only from the ground and then keeps pushing while the
/// button is held, for at most `jump_frame_cap` frames. `frames` is the
/// per-player hold counter: zero when no jump is in progress, otherwise the
/// number of frames already boosted. Releasing the button or running out
/// the cap resets it, so a fresh jump needs fresh ground contact; the
/// button may stay held, and a landing with jump still down springs again.
pub(crate) fn jump_step(
    held: bool,
    grounded: bool,
    frames: &mut u32,
    config: &GameConfig,
) -> Option<Vec2> {
    if !held {
        *frames = 0;
        return None;
    }
    if *frames == 0 {
        if !grounded {
            return None;
        }
    } else if *frames >= config.jump_frame_cap {
        *frames = 0;
        return None;
    }
    *frames += 1;
    Some(Vec2::new(0.0, -config.jump_impulse))
}

/// Apply one tick of locomotion to a player's body.
pub(crate) fn drive(
    world: &mut PhysicsWorld,
    config: &GameConfig,
    body: RigidBodyHandle,
    input: &PlayerInput,
    grounded: bool,
    jump_frames: &mut u32,
) {
    let axis = input.effective_axes(config.dead_zone).x;
    let vel = world.velocity(body);
    if let Some(push) = move_impulse(axis, vel.x, grounded, config) {
        world.apply_impulse(body, push);
    }
    if let Some(boost) = jump_step(input.jump, grounded, jump_frames, config) {
        world.apply_impulse(body, boost);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_axis_pushes_nothing() {
        let config = GameConfig::default();
        assert_eq!(move_impulse(0.0, 0.0, true, &config), None);
    }

    #[test]
    fn ground_and_air_pushes_differ() {
        let config = GameConfig::default();
        assert_eq!(
            move_impulse(1.0, 0.0, true, &config),
            Some(Vec2::new(config.ground_move_impulse, 0.0))
        );
        assert_eq!(
            move_impulse(1.0, 0.0, false, &config),
            Some(Vec2::new(config.air_move_impulse, 0.0))
        );
    }

    #[test]
    fn push_scales_with_the_axis() {
        let config = GameConfig::default();
        assert_eq!(
            move_impulse(-0.5, 0.0, true, &config),
            Some(Vec2::new(-0.5 * config.ground_move_impulse, 0.0))
        );
    }

    #[test]
    fn speed_cap_is_checked_before_the_push() {
        let config = GameConfig::default();
        let cap = config.max_move_speed;
        assert_eq!(move_impulse(1.0, cap, true, &config), None);
        assert!(move_impulse(1.0, cap - 1.0, true, &config).is_some());
        assert_eq!(move_impulse(-1.0, -cap, true, &config), None);
    }

    #[test]
    fn speed_cap_scales_with_a_partial_axis() {
        let config = GameConfig::default();
        let half_cap = 0.5 * config.max_move_speed;
        assert_eq!(move_impulse(0.5, half_cap, true, &config), None);
        assert!(move_impulse(0.5, half_cap - 1.0, true, &config).is_some());
    }

    #[test]
    fn braking_against_motion_is_always_allowed() {
        let config = GameConfig::default();
        // Moving fast to the left, pushing right: the cap never blocks it.
        assert!(move_impulse(1.0, -500.0, true, &config).is_some());
    }

    #[test]
    fn jump_starts_only_from_the_ground() {
        let config = GameConfig::default();
        let mut frames = 0;
        assert_eq!(jump_step(true, false, &mut frames, &config), None);
        assert_eq!(frames, 0);
        assert!(jump_step(true, true, &mut frames, &config).is_some());
        assert_eq!(frames, 1);
    }

    #[test]
    fn jump_hold_keeps_boosting_after_leaving_the_ground() {
        let config = GameConfig::default();
        let mut frames = 0;
        assert!(jump_step(true, true, &mut frames, &config).is_some());
        // Airborne from here on; the hold still boosts.
        for expected in 2..=config.jump_frame_cap {
            assert!(jump_step(true, false, &mut frames, &config).is_some());
            assert_eq!(frames, expected);
        }
        assert_eq!(
            jump_step(true, false, &mut frames, &config),
            None,
            "the hold runs out after the frame cap"
        );
        assert_eq!(frames, 0, "running out the cap resets the counter");
    }

    #[test]
    fn landing_with_jump_still_held_starts_a_fresh_jump() {
        let config = GameConfig::default();
        let mut frames = 0;
        assert!(jump_step(true, true, &mut frames, &config).is_some());
        for _ in 1..config.jump_frame_cap {
            jump_step(true, false, &mut frames, &config);
        }
        assert_eq!(jump_step(true, false, &mut frames, &config), None);
        assert_eq!(frames, 0);
        // Still airborne with the button down: no restart in the air.
        assert_eq!(jump_step(true, false, &mut frames, &config), None);
        // Back on the ground, button never released: a new jump starts.
        assert!(jump_step(true, true, &mut frames, &config).is_some());
        assert_eq!(frames, 1);
    }

    #[test]
    fn releasing_the_button_ends_the_hold() {
        let config = GameConfig::default();
        let mut frames = 0;
        assert!(jump_step(true, true, &mut frames, &config).is_some());
        assert_eq!(jump_step(false, false, &mut frames, &config), None);
        assert_eq!(frames, 0);
        // Pressing again in the air must not start a second jump.
        assert_eq!(jump_step(true, false, &mut frames, &config), None);
    }

    #[test]
    fn jump_pushes_opposite_to_gravity() {
        let config = GameConfig::default();
        let mut frames = 0;
        let boost = jump_step(true, true, &mut frames, &config).expect("jump starts");
        assert!(boost.y < 0.0, "up is negative y");
        assert_eq!(boost.x, 0.0);
    }
}
