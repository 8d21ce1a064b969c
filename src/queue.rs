//! Deferred attachment commands.
//!
//! Structural changes to the physics world requested from inside a collision
//! callback cannot happen mid-solve, so a qualifying claw hit becomes a small
//! command value here and is executed at the start of the next tick, before
//! that tick's step. The queue also carries the one-attachment guard: only
//! the first qualifying hit per player is kept.

use glam::Vec2;

use crate::physics::{ClawHit, RigidBodyHandle};

/// A pivot-constraint request captured from a claw hit.
#[derive(Debug, Clone, Copy)]
pub struct PendingAttach {
    /// Player whose claw is to be pinned.
    pub player: usize,
    /// Body the claw struck.
    pub other_body: RigidBodyHandle,
    /// Mean contact point in the claw body's local space.
    pub anchor_claw: Vec2,
    /// Mean contact point in the struck body's local space.
    pub anchor_other: Vec2,
    /// Mean contact point in world space, kept for diagnostics.
    pub world_point: Vec2,
}

impl PendingAttach {
    /// Build a command from a hit observation.
    pub fn from_hit(hit: &ClawHit) -> Self {
        Self {
            player: hit.owner,
            other_body: hit.other_body,
            anchor_claw: hit.anchor_claw,
            anchor_other: hit.anchor_other,
            world_point: hit.world_point,
        }
    }
}

/// Commands waiting for the next tick's pre-step flush.
#[derive(Debug, Default)]
pub struct AttachQueue {
    commands: Vec<PendingAttach>,
}

impl AttachQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a command unless that player already has one pending.
    /// Returns whether the command was accepted.
    pub fn enqueue(&mut self, command: PendingAttach) -> bool {
        if self.is_pending(command.player) {
            return false;
        }
        self.commands.push(command);
        true
    }

    /// Whether a player already has an attachment queued.
    pub fn is_pending(&self, player: usize) -> bool {
        self.commands.iter().any(|c| c.player == player)
    }

    /// Drop any queued command for a player (used when the claw is force
    /// destroyed between the hit and the flush).
    pub fn cancel(&mut self, player: usize) {
        self.commands.retain(|c| c.player != player);
    }

    /// Take every queued command, oldest first, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<PendingAttach> {
        std::mem::take(&mut self.commands)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::RigidBodyHandle;

    fn command(player: usize) -> PendingAttach {
        PendingAttach {
            player,
            other_body: RigidBodyHandle::invalid(),
            anchor_claw: Vec2::ZERO,
            anchor_other: Vec2::new(1.0, 2.0),
            world_point: Vec2::new(3.0, 4.0),
        }
    }

    #[test]
    fn first_command_per_player_wins() {
        let mut queue = AttachQueue::new();
        assert!(queue.enqueue(command(0)));
        assert!(!queue.enqueue(command(0)), "duplicate for the same player is refused");
        assert!(queue.enqueue(command(1)));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn drain_empties_in_order() {
        let mut queue = AttachQueue::new();
        queue.enqueue(command(2));
        queue.enqueue(command(0));
        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].player, 2);
        assert_eq!(drained[1].player, 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn cancel_removes_only_that_player() {
        let mut queue = AttachQueue::new();
        queue.enqueue(command(0));
        queue.enqueue(command(3));
        queue.cancel(0);
        assert!(!queue.is_pending(0));
        assert!(queue.is_pending(3));
    }
}
