//! Tether length control.
//!
//! The rope between player and claw is a distance limit, and this module is
//! the policy that moves that limit: winding it in while a detached claw is
//! hauled home, paying it out while the reel-out button is held, and easing
//! it when the accumulated constraint impulse spikes past the tension
//! threshold. The decisions are pure functions over lengths and impulses;
//! [`control_length`] applies them to the live joint once per tick.

use glam::Vec2;

use crate::claw::{Claw, ClawPhase};
use crate::config::GameConfig;
use crate::physics::{PhysicsWorld, RigidBodyHandle};

/// One reel-in decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ReelOutcome {
    /// Close enough to the player and asked to stay: leave the limit alone.
    Hold,
    /// Close enough and asked to finish: the claw should be destroyed.
    Retract,
    /// Still out on the rope: tighten the limit to this value.
    NewMax(f32),
}

/// What the length controller decided this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TetherVerdict {
    /// Leave the claw alive.
    Keep,
    /// The claw has been wound all the way home; retract it.
    Retract,
}

/// Wind the rope in by one tick.
///
/// Slack is taken up for free: the limit snaps down to the actual distance
/// when that is the larger move. A taut rope shortens by one reel increment.
/// Once the claw is within `retract_claw_dist` of the player the rope stops
/// winding and the outcome depends on whether the caller wants the claw
/// held at arm's reach or taken away entirely.
pub(crate) fn reel_step(
    cur_max: f32,
    dist: f32,
    finish: bool,
    reel_speed: f32,
    dt: f32,
    config: &GameConfig,
) -> ReelOutcome {
    if dist <= config.retract_claw_dist {
        return if finish {
            ReelOutcome::Retract
        } else {
            ReelOutcome::Hold
        };
    }
    let target = dist.max(config.retract_claw_dist);
    let step = (cur_max - target).max(reel_speed * dt);
    ReelOutcome::NewMax((cur_max - step).max(config.min_claw_dist))
}

/// Pay the rope out by one tick, never past the free-flight maximum.
pub(crate) fn reel_out_step(cur_max: f32, reel_speed: f32, dt: f32, free_max: f32) -> f32 {
    (cur_max + reel_speed * dt).min(free_max)
}

/// Tension relief.
///
/// The joint stores the impulse it accumulated while holding the limit; a
/// value below `jn_acc_min` means the rope is being yanked hard enough that
/// the solver would start to ring. Give it one reel increment of extra
/// length. Returns the eased maximum, or `None` while tension is tolerable.
pub(crate) fn relief_step(
    tension: f32,
    cur_max: f32,
    reel_speed: f32,
    dt: f32,
    jn_acc_min: f32,
) -> Option<f32> {
    (tension < jn_acc_min).then(|| cur_max + reel_speed * dt)
}

/// Run tension relief against the live joint. When the threshold is
/// crossed, the eased maximum is written back, the stored impulse is capped
/// so the next step cannot warm-start past the threshold, and the eased
/// value is returned; otherwise the maximum passes through untouched.
fn relieve_live(
    world: &mut PhysicsWorld,
    config: &GameConfig,
    claw: &Claw,
    min: f32,
    cur_max: f32,
    attached: bool,
) -> f32 {
    let tension = world.rope_tension(claw.tether);
    let Some(eased) = relief_step(
        tension,
        cur_max,
        config.reel_in_speed(attached),
        config.time_step,
        config.jn_acc_min,
    ) else {
        return cur_max;
    };
    let eased = eased.min(config.tether_free_max);
    world.set_tether_limits(claw.tether, min, eased);
    world.clamp_rope_tension(claw.tether, config.jn_acc_min);
    log::debug!(
        "player {} rope tension {tension:.0} past threshold, eased max to {eased:.1}",
        claw.owner
    );
    eased
}

/// Run the per-tick length policy for one player's claw.
///
/// `Air` claws fly on the free-flight limit and are left alone. `Attached`
/// claws get tension relief plus manual reel-out. `Detached` claws get the
/// same relief and are hauled home automatically; the verdict says when
/// they arrive.
pub(crate) fn control_length(
    world: &mut PhysicsWorld,
    config: &GameConfig,
    player_body: RigidBodyHandle,
    claw: &Claw,
    reel_out_held: bool,
) -> TetherVerdict {
    let Some((min, max)) = world.tether_limits(claw.tether) else {
        return TetherVerdict::Keep;
    };
    match claw.phase {
        ClawPhase::Air => TetherVerdict::Keep,
        ClawPhase::Attached { .. } => {
            let cur_max = relieve_live(world, config, claw, min, max, true);
            if reel_out_held {
                let paid_out = reel_out_step(
                    cur_max,
                    config.reel_out_speed,
                    config.time_step,
                    config.tether_free_max,
                );
                world.set_tether_limits(claw.tether, min, paid_out);
            }
            TetherVerdict::Keep
        }
        ClawPhase::Detached => {
            // A wedged claw can load the rope just like a hooked one; relief
            // runs here too so winding in cannot spring-load the limit.
            let cur_max = relieve_live(world, config, claw, min, max, false);
            let dist = world.body_distance(player_body, claw.body.body);
            match reel_step(
                cur_max,
                dist,
                true,
                config.reel_in_speed(false),
                config.time_step,
                config,
            ) {
                ReelOutcome::Retract => TetherVerdict::Retract,
                ReelOutcome::Hold => TetherVerdict::Keep,
                ReelOutcome::NewMax(new_max) => {
                    world.set_tether_limits(claw.tether, min, new_max);
                    TetherVerdict::Keep
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{BodyDesc, Material, ShapeDesc, ShapeTag};

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn reel_takes_slack_for_free() {
        let config = GameConfig::default();
        // Limit way out at 500 with the claw only 200 away: the limit snaps
        // straight down to the distance instead of creeping.
        let outcome = reel_step(500.0, 200.0, true, 900.0, DT, &config);
        assert_eq!(outcome, ReelOutcome::NewMax(200.0));
    }

    #[test]
    fn reel_shortens_a_taut_rope_one_increment() {
        let config = GameConfig::default();
        let outcome = reel_step(200.0, 200.0, true, 900.0, DT, &config);
        assert_eq!(outcome, ReelOutcome::NewMax(200.0 - 900.0 * DT));
    }

    #[test]
    fn reel_never_goes_below_the_minimum() {
        let config = GameConfig::default();
        let outcome = reel_step(32.0, 31.0, true, 900.0, DT, &config);
        assert_eq!(outcome, ReelOutcome::NewMax(config.min_claw_dist));
    }

    #[test]
    fn reel_stops_at_arms_reach() {
        let config = GameConfig::default();
        let dist = config.retract_claw_dist - 5.0;
        assert_eq!(reel_step(40.0, dist, false, 900.0, DT, &config), ReelOutcome::Hold);
        assert_eq!(reel_step(40.0, dist, true, 900.0, DT, &config), ReelOutcome::Retract);
    }

    #[test]
    fn reel_boundary_distance_counts_as_home() {
        let config = GameConfig::default();
        let outcome = reel_step(40.0, config.retract_claw_dist, true, 900.0, DT, &config);
        assert_eq!(outcome, ReelOutcome::Retract);
    }

    #[test]
    fn reel_out_is_capped_at_the_free_limit() {
        assert_eq!(reel_out_step(100.0, 240.0, DT, 1.0e6), 100.0 + 240.0 * DT);
        assert_eq!(reel_out_step(1.0e6 - 1.0, 240.0, DT, 1.0e6), 1.0e6);
    }

    #[test]
    fn relief_fires_only_past_the_threshold() {
        assert_eq!(
            relief_step(-3001.0, 100.0, 180.0, DT, -3000.0),
            Some(100.0 + 180.0 * DT)
        );
        assert_eq!(relief_step(-3000.0, 100.0, 180.0, DT, -3000.0), None);
        assert_eq!(relief_step(-2999.0, 100.0, 180.0, DT, -3000.0), None);
        assert_eq!(relief_step(0.0, 100.0, 180.0, DT, -3000.0), None);
    }

    #[test]
    fn relief_adds_exactly_one_increment() {
        let eased = relief_step(-9000.0, 250.0, 180.0, DT, -3000.0).expect("relief fires");
        assert_eq!(
            eased,
            250.0 + 180.0 * DT,
            "one increment regardless of how far past the threshold"
        );
    }

    fn fixed_player(world: &mut PhysicsWorld, config: &GameConfig) -> crate::physics::PhysicsBody {
        let half = config.player_half_extents();
        world.create_body(
            ShapeTag::Avatar { player: 0 },
            &BodyDesc::fixed(ShapeDesc::Cuboid {
                half_width: half.x,
                half_height: half.y,
            }),
            Material::default(),
        )
    }

    /// A player hanging on a taut rope from a claw pinned to the ceiling,
    /// settled long enough that the rope carries the full body weight.
    fn hanging_rig(config: &GameConfig) -> (PhysicsWorld, crate::physics::PhysicsBody, Claw) {
        let mut world = PhysicsWorld::new(config.gravity, config.time_step);
        let half = config.player_half_extents();
        let player = world.create_body(
            ShapeTag::Avatar { player: 0 },
            &BodyDesc::dynamic(ShapeDesc::Cuboid {
                half_width: half.x,
                half_height: half.y,
            })
            .with_position(Vec2::new(400.0, 300.0))
            .with_locked_rotation(true),
            Material { mass: config.player_mass, ..Material::default() },
        );
        let ceiling = world.create_body(
            ShapeTag::Platform,
            &BodyDesc::fixed(ShapeDesc::Cuboid { half_width: 400.0, half_height: 20.0 })
                .with_position(Vec2::new(400.0, 100.0)),
            Material::default(),
        );
        let mut claw = Claw::fire(
            &mut world,
            config,
            0,
            player.body,
            Vec2::new(400.0, 300.0),
            Vec2::ZERO,
            Vec2::new(0.0, -1.0),
        );
        let (claw_pos, _) = world.body_position(claw.body.body);
        let command = crate::queue::PendingAttach {
            player: 0,
            other_body: ceiling.body,
            anchor_claw: Vec2::ZERO,
            anchor_other: claw_pos - Vec2::new(400.0, 100.0),
            world_point: claw_pos,
        };
        claw.attach(&mut world, player.body, &command, config);
        for _ in 0..60 {
            world.step();
        }
        (world, player, claw)
    }

    #[test]
    fn live_relief_pays_out_one_increment_and_caps_the_pull() {
        // A threshold under the hanging weight, so relief must fire.
        let config = GameConfig::default().with_tension_threshold(-1000.0);
        let (mut world, player, claw) = hanging_rig(&config);

        let tension = world.rope_tension(claw.tether);
        assert!(
            tension < config.jn_acc_min,
            "hanging full body weight outruns the threshold, tension={tension}"
        );
        let (_, max_before) = world.tether_limits(claw.tether).expect("tether is live");

        let verdict = control_length(&mut world, &config, player.body, &claw, false);
        assert_eq!(verdict, TetherVerdict::Keep);

        let (_, max_after) = world.tether_limits(claw.tether).expect("tether is live");
        let increment = config.reel_in_speed(true) * config.time_step;
        assert!(
            (max_after - max_before - increment).abs() < 1e-3,
            "relief pays out exactly one increment: {max_before} -> {max_after}"
        );
        let capped = world.rope_tension(claw.tether);
        assert!(
            capped >= config.jn_acc_min - 1e-3 && capped < 0.0,
            "the stored pull is capped at the threshold, got {capped}"
        );
    }

    #[test]
    fn detached_relief_caps_the_pull_before_reeling() {
        let config = GameConfig::default().with_tension_threshold(-1000.0);
        let (mut world, player, mut claw) = hanging_rig(&config);
        claw.release(&mut world);

        // The unhook leaves the last step's accumulated pull on the joint.
        let tension = world.rope_tension(claw.tether);
        assert!(tension < config.jn_acc_min);

        let verdict = control_length(&mut world, &config, player.body, &claw, false);
        assert_eq!(verdict, TetherVerdict::Keep, "still out on the rope");
        let capped = world.rope_tension(claw.tether);
        assert!(
            capped >= config.jn_acc_min - 1e-3,
            "winding in must not keep the spring loaded, got {capped}"
        );

        claw.destroy(&mut world);
        assert_eq!(world.joint_count(), 0);
    }

    #[test]
    fn reel_out_widens_the_live_joint() {
        let config = GameConfig::default();
        let mut world = PhysicsWorld::new(config.gravity, config.time_step);
        let player = fixed_player(&mut world, &config);
        let wall = world.create_body(
            ShapeTag::Platform,
            &BodyDesc::fixed(ShapeDesc::Cuboid { half_width: 10.0, half_height: 100.0 })
                .with_position(Vec2::new(300.0, 0.0)),
            Material::default(),
        );
        let mut claw = Claw::fire(&mut world, &config, 0, player.body, Vec2::ZERO, Vec2::ZERO, Vec2::X);
        let command = crate::queue::PendingAttach {
            player: 0,
            other_body: wall.body,
            anchor_claw: Vec2::ZERO,
            anchor_other: Vec2::ZERO,
            world_point: Vec2::ZERO,
        };
        claw.attach(&mut world, player.body, &command, &config);
        let (_, caught) = world.tether_limits(claw.tether).expect("tether is live");

        let verdict = control_length(&mut world, &config, player.body, &claw, true);
        assert_eq!(verdict, TetherVerdict::Keep);
        let (_, widened) = world.tether_limits(claw.tether).expect("tether is live");
        assert_eq!(widened, caught + config.reel_out_speed * config.time_step);
    }

    #[test]
    fn detached_claw_is_wound_all_the_way_home() {
        let config = GameConfig::default();
        let mut world = PhysicsWorld::new(config.gravity, config.time_step);
        let player = fixed_player(&mut world, &config);
        let wall = world.create_body(
            ShapeTag::Platform,
            &BodyDesc::fixed(ShapeDesc::Cuboid { half_width: 10.0, half_height: 100.0 })
                .with_position(Vec2::new(300.0, 0.0)),
            Material::default(),
        );
        let mut claw = Claw::fire(&mut world, &config, 0, player.body, Vec2::ZERO, Vec2::ZERO, Vec2::X);
        let (claw_pos, _) = world.body_position(claw.body.body);
        let command = crate::queue::PendingAttach {
            player: 0,
            other_body: wall.body,
            anchor_claw: Vec2::ZERO,
            anchor_other: claw_pos - Vec2::new(300.0, 0.0),
            world_point: claw_pos,
        };
        claw.attach(&mut world, player.body, &command, &config);
        // Let the pivot absorb the muzzle velocity before unhooking.
        for _ in 0..10 {
            world.step();
        }
        claw.release(&mut world);

        let mut retracted = false;
        for _ in 0..240 {
            if control_length(&mut world, &config, player.body, &claw, false)
                == TetherVerdict::Retract
            {
                retracted = true;
                break;
            }
            world.step();
        }
        assert!(retracted, "a detached claw must wind home within a few seconds");
        claw.destroy(&mut world);
        assert_eq!(world.joint_count(), 0);
    }
}
