//! Game tuning configuration.
//!
//! This module defines every tunable constant of the simulation: world scale
//! and gravity, avatar and claw physical properties, tether behavior, and
//! locomotion feel. Defaults reproduce the game's shipped tuning.

use glam::Vec2;

/// Maximum number of simultaneous players in a session.
pub const MAX_PLAYERS: usize = 4;

/// Simulation tuning parameters.
///
/// Coordinates are y-down screen pixels sized for a 1920x1080 arena; all
/// speeds are px/s, all per-frame impulses are in impulse units (mass *
/// px/s). Construct with [`GameConfig::default`] and adjust through the
/// `with_*` builders.
///
/// # Example
///
/// ```
/// use grapple_core::prelude::*;
///
/// let config = GameConfig::default()
///     .with_gravity(glam::Vec2::new(0.0, 1500.0))
///     .with_reel_speeds(600.0, 120.0, 200.0);
/// assert!(config.reel_in_detached > config.reel_in_attached);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct GameConfig {
    // === World ===
    /// Fixed simulation timestep in seconds.
    pub time_step: f32,

    /// Gravity vector in px/s^2. Positive y points down (screen coordinates).
    pub gravity: Vec2,

    // === Avatar ===
    /// Avatar box size (width, height) in px.
    pub player_size: Vec2,

    /// Avatar mass. Locomotion impulses below are tuned against this.
    pub player_mass: f32,

    /// Avatar surface friction. Kept low so per-frame move impulses are not
    /// eaten by contact friction against platforms.
    pub player_friction: f32,

    /// Avatar restitution (bounciness).
    pub player_restitution: f32,

    // === Claw ===
    /// Claw ball radius in px.
    pub claw_radius: f32,

    /// Claw mass. Light relative to the avatar so the rope yanks the player,
    /// not the other way around, only when taut.
    pub claw_mass: f32,

    /// Claw surface friction.
    pub claw_friction: f32,

    /// Claw restitution.
    pub claw_restitution: f32,

    /// Distance from the avatar center at which a fired claw spawns, along
    /// the aim direction.
    pub arm_length: f32,

    /// Speed added to the player's velocity along the aim direction when the
    /// claw is fired, in px/s.
    pub claw_shoot_speed: f32,

    // === Tether ===
    /// Fixed minimum tether length. The maximum is never reeled below this.
    pub min_claw_dist: f32,

    /// Claw-to-player distance at or under which a requested reel-in retracts
    /// the claw entirely.
    pub retract_claw_dist: f32,

    /// Tether maximum while the claw flies free. Large enough to never engage.
    pub tether_free_max: f32,

    /// Reel-in speed while the claw is detached and winding home, in px/s.
    pub reel_in_detached: f32,

    /// Reel-in speed while attached, in px/s. Also the increment tension
    /// relief uses to pay out rope while hooked.
    pub reel_in_attached: f32,

    /// Reel-out speed while attached, in px/s.
    pub reel_out_speed: f32,

    /// Tension relief threshold on the tether's accumulated impulse, signed;
    /// more negative = more tension tolerated before rope pays out.
    pub jn_acc_min: f32,

    // === Locomotion ===
    /// Input axis magnitudes at or below this snap to zero.
    pub dead_zone: f32,

    /// Horizontal speed cap in px/s, scaled by the axis value.
    pub max_move_speed: f32,

    /// Per-frame horizontal impulse while grounded.
    pub ground_move_impulse: f32,

    /// Per-frame horizontal impulse while airborne.
    pub air_move_impulse: f32,

    /// Per-frame upward impulse while a jump is being sustained.
    pub jump_impulse: f32,

    /// Number of frames a held jump keeps applying [`Self::jump_impulse`].
    pub jump_frame_cap: u32,

    // === Ground sensor ===
    /// Horizontal inset of the foot strip from the avatar's left/right edges,
    /// so brushing a wall does not read as standing on it.
    pub foot_sensor_inset: f32,

    /// Vertical depth of the foot strip below the avatar's feet.
    pub foot_sensor_depth: f32,

    // === Level ===
    /// Platform surface friction.
    pub platform_friction: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            // World
            time_step: 1.0 / 60.0,
            gravity: Vec2::new(0.0, 2000.0),

            // Avatar
            player_size: Vec2::new(30.0, 60.0),
            player_mass: 60.0,
            player_friction: 0.2,
            player_restitution: 0.0,

            // Claw
            claw_radius: 6.0,
            claw_mass: 6.0,
            claw_friction: 0.9,
            claw_restitution: 0.1,
            arm_length: 50.0,
            claw_shoot_speed: 2500.0,

            // Tether
            min_claw_dist: 20.0,
            retract_claw_dist: 30.0,
            tether_free_max: 1.0e6,
            reel_in_detached: 900.0,
            reel_in_attached: 180.0,
            reel_out_speed: 240.0,
            jn_acc_min: -3000.0,

            // Locomotion
            dead_zone: 0.2,
            max_move_speed: 360.0,
            ground_move_impulse: 3600.0,
            air_move_impulse: 1200.0,
            jump_impulse: 9000.0,
            jump_frame_cap: 8,

            // Ground sensor
            foot_sensor_inset: 3.0,
            foot_sensor_depth: 4.0,

            // Level
            platform_friction: 0.8,
        }
    }
}

impl GameConfig {
    /// Avatar half extents (half width, half height).
    #[inline]
    pub fn player_half_extents(&self) -> Vec2 {
        self.player_size * 0.5
    }

    /// Reel-in speed for the current hook situation.
    #[inline]
    pub fn reel_in_speed(&self, attached: bool) -> f32 {
        if attached {
            self.reel_in_attached
        } else {
            self.reel_in_detached
        }
    }

    /// Sanity-check tunables that the simulation assumes.
    ///
    /// Reel speeds must be positive and finite, the retract threshold must
    /// not sit under the minimum tether length, and the timestep must be
    /// positive. Debug builds assert; release builds trust the caller.
    pub fn validate(&self) {
        debug_assert!(
            self.time_step > 0.0 && self.time_step.is_finite(),
            "time_step must be positive and finite"
        );
        debug_assert!(
            self.reel_in_detached > 0.0 && self.reel_in_detached.is_finite(),
            "reel_in_detached must be positive and finite"
        );
        debug_assert!(
            self.reel_in_attached > 0.0 && self.reel_in_attached.is_finite(),
            "reel_in_attached must be positive and finite"
        );
        debug_assert!(
            self.reel_out_speed > 0.0 && self.reel_out_speed.is_finite(),
            "reel_out_speed must be positive and finite"
        );
        debug_assert!(
            self.retract_claw_dist >= self.min_claw_dist,
            "retract_claw_dist must not be below min_claw_dist"
        );
        debug_assert!(
            self.min_claw_dist > 0.0,
            "min_claw_dist must be positive"
        );
        debug_assert!(
            (0.0..1.0).contains(&self.dead_zone),
            "dead_zone must be in [0, 1)"
        );
    }

    /// Builder: set the fixed timestep.
    pub fn with_time_step(mut self, dt: f32) -> Self {
        self.time_step = dt;
        self
    }

    /// Builder: set the gravity vector (y-down).
    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    /// Builder: set the avatar box size.
    pub fn with_player_size(mut self, size: Vec2) -> Self {
        self.player_size = size;
        self
    }

    /// Builder: set claw spawn arm length.
    pub fn with_arm_length(mut self, length: f32) -> Self {
        self.arm_length = length;
        self
    }

    /// Builder: set claw launch speed.
    pub fn with_claw_shoot_speed(mut self, speed: f32) -> Self {
        self.claw_shoot_speed = speed;
        self
    }

    /// Builder: set the tether's fixed minimum and the retract threshold.
    pub fn with_tether_limits(mut self, min_dist: f32, retract_dist: f32) -> Self {
        self.min_claw_dist = min_dist;
        self.retract_claw_dist = retract_dist;
        self
    }

    /// Builder: set reel speeds (detached in, attached in, out).
    pub fn with_reel_speeds(mut self, detached: f32, attached: f32, out: f32) -> Self {
        self.reel_in_detached = detached;
        self.reel_in_attached = attached;
        self.reel_out_speed = out;
        self
    }

    /// Builder: set the tension relief threshold (signed, negative).
    pub fn with_tension_threshold(mut self, jn_acc_min: f32) -> Self {
        self.jn_acc_min = jn_acc_min;
        self
    }

    /// Builder: set the input dead-zone.
    pub fn with_dead_zone(mut self, dead_zone: f32) -> Self {
        self.dead_zone = dead_zone;
        self
    }

    /// Builder: set horizontal movement parameters.
    pub fn with_movement(mut self, max_speed: f32, ground_impulse: f32, air_impulse: f32) -> Self {
        self.max_move_speed = max_speed;
        self.ground_move_impulse = ground_impulse;
        self.air_move_impulse = air_impulse;
        self
    }

    /// Builder: set jump impulse and sustain cap.
    pub fn with_jump(mut self, impulse: f32, frame_cap: u32) -> Self {
        self.jump_impulse = impulse;
        self.jump_frame_cap = frame_cap;
        self
    }

    /// Builder: set foot sensor geometry.
    pub fn with_foot_sensor(mut self, inset: f32, depth: f32) -> Self {
        self.foot_sensor_inset = inset;
        self.foot_sensor_depth = depth;
        self
    }
}
