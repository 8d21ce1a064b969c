//! Physics engine adapter.
//!
//! Wraps the consumed `rapier2d` engine behind the operations the simulation
//! needs: body/shape lifecycle, the tether (a coupled-axis distance limit
//! with a mutable maximum and a readable impulse accumulator), the pivot
//! attachment, a fixed step that collects claw hits from collision events,
//! and the foot-strip AABB query. The rest of the crate never sees a rapier
//! type except the opaque handles re-exported here.

use glam::Vec2;
use rapier2d::parry::bounding_volume::Aabb;
use rapier2d::prelude::*;
use std::sync::Mutex;

pub use rapier2d::prelude::{ColliderHandle, RigidBodyHandle};

// ---------------------------------------------------------------------------
// Conversion helpers (private): glam <-> nalgebra
// ---------------------------------------------------------------------------

fn vec2_to_na(v: Vec2) -> nalgebra::Vector2<f32> {
    nalgebra::Vector2::new(v.x, v.y)
}

fn na_to_vec2(v: &nalgebra::Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

fn na_iso_to_pos_rot(iso: &nalgebra::Isometry2<f32>) -> (Vec2, f32) {
    let pos = Vec2::new(iso.translation.x, iso.translation.y);
    let rot = iso.rotation.angle();
    (pos, rot)
}

// ---------------------------------------------------------------------------
// Shape identity tags
// ---------------------------------------------------------------------------

/// Identity tag attached to every collider at creation time.
///
/// Collision handling and the foot query dispatch on this tag instead of
/// guessing from handles. It round-trips through the collider's `user_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeTag {
    /// A player's avatar box. `player` is the owning player index.
    Avatar { player: usize },
    /// A player's claw projectile. `player` is the owning player index.
    Claw { player: usize },
    /// Static level geometry.
    Platform,
}

const TAG_KIND_AVATAR: u128 = 1;
const TAG_KIND_CLAW: u128 = 2;
const TAG_KIND_PLATFORM: u128 = 3;

impl ShapeTag {
    fn to_user_data(self) -> u128 {
        match self {
            ShapeTag::Avatar { player } => TAG_KIND_AVATAR | (player as u128) << 8,
            ShapeTag::Claw { player } => TAG_KIND_CLAW | (player as u128) << 8,
            ShapeTag::Platform => TAG_KIND_PLATFORM,
        }
    }

    fn from_user_data(data: u128) -> Option<Self> {
        let player = (data >> 8) as usize;
        match data & 0xff {
            TAG_KIND_AVATAR => Some(ShapeTag::Avatar { player }),
            TAG_KIND_CLAW => Some(ShapeTag::Claw { player }),
            TAG_KIND_PLATFORM => Some(ShapeTag::Platform),
            _ => None,
        }
    }

    /// Collision groups for this tag. An avatar and its own claw share a
    /// membership bit that each filters away, so a fired claw never collides
    /// with the player holding its rope; everything else collides normally.
    fn interaction_groups(self) -> InteractionGroups {
        match self {
            ShapeTag::Avatar { player } | ShapeTag::Claw { player } => {
                let own = Group::from_bits_truncate(1 << (player as u32 % 8));
                InteractionGroups::new(own, !own)
            }
            ShapeTag::Platform => {
                let platforms = Group::from_bits_truncate(1 << 31);
                InteractionGroups::new(platforms, Group::ALL)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Body and shape descriptions
// ---------------------------------------------------------------------------

/// Shape description for a collider.
#[derive(Debug, Clone, Copy)]
pub enum ShapeDesc {
    Ball { radius: f32 },
    Cuboid { half_width: f32, half_height: f32 },
    Segment { a: Vec2, b: Vec2 },
}

impl ShapeDesc {
    fn build_collider(&self) -> ColliderBuilder {
        match *self {
            ShapeDesc::Ball { radius } => ColliderBuilder::ball(radius),
            ShapeDesc::Cuboid { half_width, half_height } => {
                ColliderBuilder::cuboid(half_width, half_height)
            }
            ShapeDesc::Segment { a, b } => {
                ColliderBuilder::segment(point![a.x, a.y], point![b.x, b.y])
            }
        }
    }
}

/// Surface and mass properties for a collider.
#[derive(Debug, Clone, Copy)]
pub struct Material {
    pub friction: f32,
    pub restitution: f32,
    /// Explicit collider mass. Ignored by fixed bodies.
    pub mass: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            friction: 0.5,
            restitution: 0.0,
            mass: 1.0,
        }
    }
}

/// Description of a rigid body before creation.
#[derive(Debug, Clone, Copy)]
pub struct BodyDesc {
    pub fixed: bool,
    pub position: Vec2,
    pub rotation: f32,
    pub velocity: Vec2,
    pub lock_rotation: bool,
    pub ccd: bool,
    pub shape: ShapeDesc,
}

impl BodyDesc {
    /// A dynamic body with the given collider shape.
    pub fn dynamic(shape: ShapeDesc) -> Self {
        Self {
            fixed: false,
            position: Vec2::ZERO,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            lock_rotation: false,
            ccd: false,
            shape,
        }
    }

    /// A fixed (static) body with the given collider shape.
    pub fn fixed(shape: ShapeDesc) -> Self {
        Self {
            fixed: true,
            position: Vec2::ZERO,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            lock_rotation: true,
            ccd: false,
            shape,
        }
    }

    pub fn with_position(mut self, pos: Vec2) -> Self {
        self.position = pos;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.velocity = vel;
        self
    }

    pub fn with_locked_rotation(mut self, locked: bool) -> Self {
        self.lock_rotation = locked;
        self
    }

    pub fn with_ccd(mut self, enabled: bool) -> Self {
        self.ccd = enabled;
        self
    }
}

/// Handle pair referencing one body and its single collider.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsBody {
    pub body: RigidBodyHandle,
    pub shape: ColliderHandle,
}

/// Handle to a constraint (tether or pivot) in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointHandle(pub(crate) ImpulseJointHandle);

// ---------------------------------------------------------------------------
// Claw hit collection
// ---------------------------------------------------------------------------

/// One observed claw-on-something contact, captured during the step.
///
/// Anchors are local to each body at event time, `world_point` is the mean
/// of the pair's contact points. Whether the hit becomes an attachment is
/// decided outside the step, where player state is visible.
#[derive(Debug, Clone, Copy)]
pub struct ClawHit {
    /// Index of the player owning the claw.
    pub owner: usize,
    /// The claw's body.
    pub claw_body: RigidBodyHandle,
    /// The struck body.
    pub other_body: RigidBodyHandle,
    /// What the claw hit.
    pub other_tag: ShapeTag,
    /// Mean contact point, world space.
    pub world_point: Vec2,
    /// Mean contact point in the claw body's local space.
    pub anchor_claw: Vec2,
    /// Mean contact point in the struck body's local space.
    pub anchor_other: Vec2,
}

/// Collects claw hits from collision events fired inside the step.
///
/// The handler trait only hands out shared references, so nothing here can
/// mutate the world mid-solve; observations go into a `Mutex`ed buffer that
/// the step drains afterwards.
struct ClawHitCollector {
    hits: Mutex<Vec<ClawHit>>,
}

impl ClawHitCollector {
    fn new() -> Self {
        Self {
            hits: Mutex::new(Vec::new()),
        }
    }

    fn drain(&self) -> Vec<ClawHit> {
        std::mem::take(&mut *self.hits.lock().unwrap())
    }
}

impl EventHandler for ClawHitCollector {
    fn handle_collision_event(
        &self,
        bodies: &RigidBodySet,
        colliders: &ColliderSet,
        event: CollisionEvent,
        contact_pair: Option<&ContactPair>,
    ) {
        let CollisionEvent::Started(h1, h2, _) = event else {
            return;
        };

        let tag1 = collider_tag(colliders, h1);
        let tag2 = collider_tag(colliders, h2);
        // A claw hitting a non-claw shape is the only pairing that matters.
        let (claw_collider, other_collider, owner, other_tag) = match (tag1, tag2) {
            (Some(ShapeTag::Claw { player }), Some(other))
                if !matches!(other, ShapeTag::Claw { .. }) =>
            {
                (h1, h2, player, other)
            }
            (Some(other), Some(ShapeTag::Claw { player }))
                if !matches!(other, ShapeTag::Claw { .. }) =>
            {
                (h2, h1, player, other)
            }
            _ => return,
        };

        let (Some(claw_body), Some(other_body)) = (
            colliders.get(claw_collider).and_then(Collider::parent),
            colliders.get(other_collider).and_then(Collider::parent),
        ) else {
            return;
        };

        // Mean of the pair's contact points; a CCD impact can report an
        // empty manifold, in which case the claw's own center stands in.
        let world_point = contact_pair
            .and_then(|pair| mean_contact_point(colliders, pair))
            .or_else(|| {
                colliders
                    .get(claw_collider)
                    .map(|c| Vec2::new(c.translation().x, c.translation().y))
            });
        let Some(world_point) = world_point else {
            return;
        };

        self.hits.lock().unwrap().push(ClawHit {
            owner,
            claw_body,
            other_body,
            other_tag,
            world_point,
            anchor_claw: body_local_point(bodies, claw_body, world_point),
            anchor_other: body_local_point(bodies, other_body, world_point),
        });
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: f32,
    ) {
        // Contact force events are unused.
    }
}

fn collider_tag(colliders: &ColliderSet, handle: ColliderHandle) -> Option<ShapeTag> {
    colliders
        .get(handle)
        .and_then(|c| ShapeTag::from_user_data(c.user_data))
}

fn mean_contact_point(colliders: &ColliderSet, pair: &ContactPair) -> Option<Vec2> {
    // Manifold points are local to the pair's first collider.
    let first = colliders.get(pair.collider1)?;
    let pos1 = first.position();
    let mut sum = Vec2::ZERO;
    let mut count = 0u32;
    for manifold in &pair.manifolds {
        for contact in &manifold.points {
            let world = pos1.transform_point(&contact.local_p1);
            sum += Vec2::new(world.x, world.y);
            count += 1;
        }
    }
    (count > 0).then(|| sum / count as f32)
}

fn body_local_point(bodies: &RigidBodySet, body: RigidBodyHandle, world: Vec2) -> Vec2 {
    bodies
        .get(body)
        .map(|rb| {
            let local = rb
                .position()
                .inverse_transform_point(&point![world.x, world.y]);
            Vec2::new(local.x, local.y)
        })
        .unwrap_or(world)
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// Owns every rapier resource behind the operations the game needs.
///
/// Y-down coordinates throughout: downward gravity is positive y.
pub struct PhysicsWorld {
    gravity: nalgebra::Vector2<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    hit_collector: ClawHitCollector,
}

impl PhysicsWorld {
    /// Create a world with the given gravity and fixed timestep.
    pub fn new(gravity: Vec2, dt: f32) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = dt;
        Self {
            gravity: vec2_to_na(gravity),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            hit_collector: ClawHitCollector::new(),
        }
    }

    /// Create a rigid body + collider tagged with `tag`; collision groups
    /// derive from the tag (see [`ShapeTag`]).
    pub fn create_body(&mut self, tag: ShapeTag, desc: &BodyDesc, material: Material) -> PhysicsBody {
        let kind = if desc.fixed {
            RigidBodyType::Fixed
        } else {
            RigidBodyType::Dynamic
        };
        let rb = RigidBodyBuilder::new(kind)
            .translation(vec2_to_na(desc.position))
            .rotation(desc.rotation)
            .linvel(vec2_to_na(desc.velocity))
            .locked_axes(if desc.lock_rotation {
                LockedAxes::ROTATION_LOCKED
            } else {
                LockedAxes::empty()
            })
            .ccd_enabled(desc.ccd)
            .build();
        let body = self.bodies.insert(rb);

        let collider = desc
            .shape
            .build_collider()
            .friction(material.friction)
            .restitution(material.restitution)
            .mass(material.mass)
            .collision_groups(tag.interaction_groups())
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .user_data(tag.to_user_data())
            .build();
        let shape = self
            .colliders
            .insert_with_parent(collider, body, &mut self.bodies);

        PhysicsBody { body, shape }
    }

    /// Remove a collider, leaving its body in place.
    pub fn remove_shape(&mut self, shape: ColliderHandle) {
        self.colliders
            .remove(shape, &mut self.island_manager, &mut self.bodies, true);
    }

    /// Remove a body together with anything still attached to it.
    pub fn remove_body(&mut self, body: RigidBodyHandle) {
        self.bodies.remove(
            body,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Step the simulation once and return the claw hits observed during the
    /// step, in event order.
    pub fn step(&mut self) -> Vec<ClawHit> {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.hit_collector,
        );
        self.hit_collector.drain()
    }

    /// Apply an instantaneous impulse to a body.
    pub fn apply_impulse(&mut self, body: RigidBodyHandle, impulse: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body) {
            rb.apply_impulse(vec2_to_na(impulse), true);
        }
    }

    /// Current linear velocity of a body.
    pub fn velocity(&self, body: RigidBodyHandle) -> Vec2 {
        self.bodies
            .get(body)
            .map(|rb| na_to_vec2(rb.linvel()))
            .unwrap_or(Vec2::ZERO)
    }

    /// Current position and rotation of a body.
    pub fn body_position(&self, body: RigidBodyHandle) -> (Vec2, f32) {
        self.bodies
            .get(body)
            .map(|rb| na_iso_to_pos_rot(rb.position()))
            .unwrap_or((Vec2::ZERO, 0.0))
    }

    /// Whether a body handle still refers to a live body.
    pub fn body_exists(&self, body: RigidBodyHandle) -> bool {
        self.bodies.get(body).is_some()
    }

    /// Distance between two bodies' centers.
    pub fn body_distance(&self, a: RigidBodyHandle, b: RigidBodyHandle) -> f32 {
        let (pa, _) = self.body_position(a);
        let (pb, _) = self.body_position(b);
        pa.distance(pb)
    }

    /// Identity tag of a collider, if it carries one.
    pub fn shape_tag(&self, shape: ColliderHandle) -> Option<ShapeTag> {
        collider_tag(&self.colliders, shape)
    }

    /// Visit every collider whose AABB intersects the axis-aligned box
    /// `[min, max]`. The visitor returns `false` to stop early.
    ///
    /// The underlying acceleration structure is refreshed by [`Self::step`],
    /// so results reflect post-step positions.
    pub fn for_each_in_aabb(&self, min: Vec2, max: Vec2, mut visit: impl FnMut(ColliderHandle) -> bool) {
        let aabb = Aabb::new(point![min.x, min.y], point![max.x, max.y]);
        self.query_pipeline
            .colliders_with_aabb_intersecting_aabb(&aabb, |handle| visit(*handle));
    }

    // -- Constraints --

    /// Create the tether between player and claw: a coupled-linear-axes
    /// distance limit `[min, max]` anchored at both body centers. The same
    /// construction as the engine's rope joint, kept explicit so the maximum
    /// can be rewritten while live.
    pub fn create_tether(
        &mut self,
        player: RigidBodyHandle,
        claw: RigidBodyHandle,
        min: f32,
        max: f32,
    ) -> JointHandle {
        let joint = GenericJointBuilder::new(JointAxesMask::empty())
            .coupled_axes(JointAxesMask::LIN_AXES)
            .limits(JointAxis::LinX, [min, max])
            .local_anchor1(point![0.0, 0.0])
            .local_anchor2(point![0.0, 0.0])
            .build();
        JointHandle(self.impulse_joints.insert(player, claw, joint, true))
    }

    /// Create the pivot pinning the claw to the struck body at the given
    /// local anchors.
    pub fn create_pivot(
        &mut self,
        claw: RigidBodyHandle,
        other: RigidBodyHandle,
        anchor_claw: Vec2,
        anchor_other: Vec2,
    ) -> JointHandle {
        let joint = RevoluteJointBuilder::new()
            .local_anchor1(point![anchor_claw.x, anchor_claw.y])
            .local_anchor2(point![anchor_other.x, anchor_other.y])
            .build();
        JointHandle(self.impulse_joints.insert(claw, other, joint, true))
    }

    /// Remove a constraint.
    pub fn remove_joint(&mut self, joint: JointHandle) {
        self.impulse_joints.remove(joint.0, true);
    }

    /// Current `[min, max]` limits of a tether.
    pub fn tether_limits(&self, joint: JointHandle) -> Option<(f32, f32)> {
        self.impulse_joints
            .get(joint.0)
            .and_then(|j| j.data.limits(JointAxis::LinX))
            .map(|l| (l.min, l.max))
    }

    /// Rewrite a tether's `[min, max]` limits in place, leaving the limit's
    /// impulse accumulator untouched.
    pub fn set_tether_limits(&mut self, joint: JointHandle, min: f32, max: f32) {
        if let Some(j) = self.joint_mut(joint) {
            let limits = &mut j.data.limits[JointAxis::LinX as usize];
            limits.min = min;
            limits.max = max;
        }
    }

    /// Tension currently carried by a tether's length limit, signed: zero
    /// when slack, increasingly negative the harder the rope tugs its
    /// endpoints together. The engine accumulates the limit's corrective
    /// impulse with the opposite sign, so the read negates it.
    pub fn rope_tension(&self, joint: JointHandle) -> f32 {
        self.impulse_joints
            .get(joint.0)
            .and_then(|j| j.data.limits(JointAxis::LinX))
            .map(|l| -l.impulse)
            .unwrap_or(0.0)
    }

    /// Cap the tension a tether carries into the next step at `min_tension`
    /// (a negative bound). The solver warm-starts from the stored impulse,
    /// so the cap rewrites the accumulator down to the bound's magnitude.
    pub fn clamp_rope_tension(&mut self, joint: JointHandle, min_tension: f32) {
        if let Some(j) = self.joint_mut(joint) {
            let limits = &mut j.data.limits[JointAxis::LinX as usize];
            if limits.impulse > -min_tension {
                limits.impulse = -min_tension;
            }
        }
    }

    /// Number of rigid bodies in the simulation.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of colliders in the simulation.
    pub fn shape_count(&self) -> usize {
        self.colliders.len()
    }

    /// Number of constraints in the simulation.
    pub fn joint_count(&self) -> usize {
        self.impulse_joints.len()
    }

    // -- private helpers --

    // Single funnel for joint mutation. The joint getter does not wake the
    // attached bodies, so do it here or a rewritten limit would not take
    // effect on a sleeping pair.
    fn joint_mut(&mut self, joint: JointHandle) -> Option<&mut ImpulseJoint> {
        if let Some(j) = self.impulse_joints.get(joint.0) {
            for handle in [j.body1, j.body2] {
                if let Some(rb) = self.bodies.get_mut(handle) {
                    rb.wake_up(true);
                }
            }
        }
        self.impulse_joints.get_mut(joint.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
