//! Per-player input snapshots.
//!
//! The core never talks to input devices. Each tick the embedding layer hands
//! the session one [`PlayerInput`] per player: two axis values in [-1, 1] and
//! the discrete action buttons. The snapshot is consumed whole and replaced
//! every frame.

use glam::Vec2;

/// One tick's worth of input for one player.
///
/// Axes follow world coordinates: positive x is right, positive y is down,
/// so "push up" arrives as a negative `y_axis`. Values outside [-1, 1] are
/// clamped by [`PlayerInput::set_axes`].
///
/// # Example
///
/// ```
/// use grapple_core::prelude::*;
///
/// let mut input = PlayerInput::new();
/// input.set_axes(1.0, 0.0);
/// input.fire = true;
/// assert!(!input.is_neutral(0.2));
///
/// input.clear();
/// assert!(input.is_neutral(0.2));
/// assert!(!input.fire);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// Horizontal axis (-1.0 = left, 1.0 = right).
    pub x_axis: f32,
    /// Vertical axis (-1.0 = up, 1.0 = down, matching y-down world space).
    pub y_axis: f32,
    /// Jump button held.
    pub jump: bool,
    /// Fire-claw button pressed.
    pub fire: bool,
    /// Unhook button pressed.
    pub unhook: bool,
    /// Reel-out button held.
    pub reel_out: bool,
}

impl PlayerInput {
    /// Create a neutral snapshot (all axes zero, no buttons).
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset every axis and button to neutral.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Set both axes, clamping each to [-1, 1].
    pub fn set_axes(&mut self, x: f32, y: f32) {
        self.x_axis = x.clamp(-1.0, 1.0);
        self.y_axis = y.clamp(-1.0, 1.0);
    }

    /// Both axes as a vector, with the dead-zone applied per axis: any axis
    /// whose magnitude is under `dead_zone` snaps to zero.
    pub fn effective_axes(&self, dead_zone: f32) -> Vec2 {
        Vec2::new(
            snap_dead_zone(self.x_axis, dead_zone),
            snap_dead_zone(self.y_axis, dead_zone),
        )
    }

    /// Whether both axes sit inside the dead-zone.
    pub fn is_neutral(&self, dead_zone: f32) -> bool {
        self.effective_axes(dead_zone) == Vec2::ZERO
    }

    /// Aim direction for this snapshot: the normalized effective axes when
    /// they point anywhere, otherwise `current_aim` unchanged. Aim therefore
    /// persists across neutral frames, so a claw can still be fired in the
    /// last direction held.
    pub fn updated_aim(&self, current_aim: Vec2, dead_zone: f32) -> Vec2 {
        let axes = self.effective_axes(dead_zone);
        if axes == Vec2::ZERO {
            current_aim
        } else {
            axes.normalize()
        }
    }
}

/// Snap a single axis value to zero inside the dead-zone. The boundary is
/// exclusive: a magnitude of exactly `dead_zone` passes through.
#[inline]
fn snap_dead_zone(value: f32, dead_zone: f32) -> f32 {
    if value.abs() < dead_zone {
        0.0
    } else {
        value
    }
}
