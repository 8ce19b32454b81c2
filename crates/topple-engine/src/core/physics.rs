use glam::{Quat, Vec3};
use rapier3d::prelude::*;
use std::sync::Mutex;

use crate::api::types::EntityId;

// ---------------------------------------------------------------------------
// Conversion helpers (private): glam to nalgebra and back
// ---------------------------------------------------------------------------

fn vec3_to_na(v: Vec3) -> nalgebra::Vector3<f32> {
    nalgebra::Vector3::new(v.x, v.y, v.z)
}

fn quat_to_na(q: Quat) -> nalgebra::UnitQuaternion<f32> {
    nalgebra::UnitQuaternion::from_quaternion(nalgebra::Quaternion::new(q.w, q.x, q.y, q.z))
}

fn na_iso_to_pos_rot(iso: &nalgebra::Isometry3<f32>) -> (Vec3, Quat) {
    let t = iso.translation.vector;
    let q = iso.rotation.quaternion();
    (Vec3::new(t.x, t.y, t.z), Quat::from_xyzw(q.i, q.j, q.k, q.w))
}

fn pos_rot_to_na_iso(pos: Vec3, rot: Quat) -> nalgebra::Isometry3<f32> {
    nalgebra::Isometry3::from_parts(
        nalgebra::Translation3::new(pos.x, pos.y, pos.z),
        quat_to_na(rot),
    )
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The kind of rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    Dynamic,
    Fixed,
    KinematicPositionBased,
    KinematicVelocityBased,
}

impl BodyType {
    fn to_rapier(self) -> RigidBodyType {
        match self {
            BodyType::Dynamic => RigidBodyType::Dynamic,
            BodyType::Fixed => RigidBodyType::Fixed,
            BodyType::KinematicPositionBased => RigidBodyType::KinematicPositionBased,
            BodyType::KinematicVelocityBased => RigidBodyType::KinematicVelocityBased,
        }
    }

    fn from_rapier(ty: RigidBodyType) -> Self {
        match ty {
            RigidBodyType::Dynamic => BodyType::Dynamic,
            RigidBodyType::Fixed => BodyType::Fixed,
            RigidBodyType::KinematicPositionBased => BodyType::KinematicPositionBased,
            RigidBodyType::KinematicVelocityBased => BodyType::KinematicVelocityBased,
        }
    }
}

/// Shape description for a collider. Extents are half-sizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderDesc {
    Ball { radius: f32 },
    Cuboid { half_extents: Vec3 },
    /// Upright cylinder along Y (cans).
    Cylinder { half_height: f32, radius: f32 },
}

impl ColliderDesc {
    fn build_collider(&self) -> ColliderBuilder {
        match *self {
            ColliderDesc::Ball { radius } => ColliderBuilder::ball(radius),
            ColliderDesc::Cuboid { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            ColliderDesc::Cylinder { half_height, radius } => {
                ColliderBuilder::cylinder(half_height, radius)
            }
        }
    }

    /// Half of the shape's vertical extent when upright.
    pub fn half_height(&self) -> f32 {
        match *self {
            ColliderDesc::Ball { radius } => radius,
            ColliderDesc::Cuboid { half_extents } => half_extents.y,
            ColliderDesc::Cylinder { half_height, .. } => half_height,
        }
    }

    /// Half of the shape's footprint along X.
    pub fn half_width(&self) -> f32 {
        match *self {
            ColliderDesc::Ball { radius } => radius,
            ColliderDesc::Cuboid { half_extents } => half_extents.x,
            ColliderDesc::Cylinder { radius, .. } => radius,
        }
    }
}

/// Physical material properties for a collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderMaterial {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
}

impl Default for ColliderMaterial {
    fn default() -> Self {
        Self {
            restitution: 0.3,
            friction: 0.5,
            density: 1.0,
        }
    }
}

/// Builder for describing a rigid body before creation.
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub body_type: BodyType,
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub gravity_scale: f32,
    pub fixed_rotation: bool,
    pub ccd: bool,
    pub collider: ColliderDesc,
}

impl BodyDesc {
    /// Create a body description of the given type with default tuning.
    pub fn new(body_type: BodyType, collider: ColliderDesc) -> Self {
        let fixed = body_type == BodyType::Fixed;
        Self {
            body_type,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            gravity_scale: if fixed { 0.0 } else { 1.0 },
            fixed_rotation: fixed,
            ccd: false,
            collider,
        }
    }

    /// Create a dynamic body description with the given collider shape.
    pub fn dynamic(collider: ColliderDesc) -> Self {
        Self::new(BodyType::Dynamic, collider)
    }

    /// Create a fixed (static) body description with the given collider shape.
    pub fn fixed(collider: ColliderDesc) -> Self {
        Self::new(BodyType::Fixed, collider)
    }

    /// Create a position-driven kinematic body (held objects, no gravity).
    pub fn kinematic(collider: ColliderDesc) -> Self {
        Self::new(BodyType::KinematicPositionBased, collider)
    }

    pub fn with_position(mut self, pos: Vec3) -> Self {
        self.position = pos;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_velocity(mut self, vel: Vec3) -> Self {
        self.velocity = vel;
        self
    }

    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    pub fn with_fixed_rotation(mut self, fixed: bool) -> Self {
        self.fixed_rotation = fixed;
        self
    }

    pub fn with_ccd(mut self, enabled: bool) -> Self {
        self.ccd = enabled;
        self
    }
}

/// Handle pair stored on an Entity, referencing Rapier internals.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsBody {
    pub body_handle: RigidBodyHandle,
    pub collider_handle: ColliderHandle,
}

/// A collision event between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPair {
    pub entity_a: EntityId,
    pub entity_b: EntityId,
    /// `true` when the collision just started, `false` when it ended.
    pub started: bool,
}

// ---------------------------------------------------------------------------
// WASM-safe event collector (no crossbeam)
// ---------------------------------------------------------------------------

struct DirectEventCollector {
    collisions: Mutex<Vec<CollisionEvent>>,
}

impl DirectEventCollector {
    fn new() -> Self {
        Self {
            collisions: Mutex::new(Vec::new()),
        }
    }

    fn drain_collisions(&self) -> Vec<CollisionEvent> {
        let mut guard = self
            .collisions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::take(&mut *guard)
    }
}

impl EventHandler for DirectEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        self.collisions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: f32,
    ) {
        // Contact forces are not reported; the trait still requires the hook.
    }
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// Wraps the Rapier3D pipeline into a single struct.
pub struct PhysicsWorld {
    gravity: nalgebra::Vector3<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    pub(crate) bodies: RigidBodySet,
    pub(crate) colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    event_collector: DirectEventCollector,
}

impl PhysicsWorld {
    /// Create a new physics world with the given gravity vector.
    /// The world is Y-up, so Earth gravity is `Vec3::new(0.0, -9.81, 0.0)`.
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity: vec3_to_na(gravity),
            integration_parameters: IntegrationParameters::default(),
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
            event_collector: DirectEventCollector::new(),
        }
    }

    /// Set the integration timestep.
    pub fn set_dt(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
    }

    /// Create a rigid body + collider and return handles.
    /// The EntityId is stored in the body's `user_data` for collision lookups.
    pub fn create_body(
        &mut self,
        entity_id: EntityId,
        desc: &BodyDesc,
        material: ColliderMaterial,
    ) -> PhysicsBody {
        let rb = RigidBodyBuilder::new(desc.body_type.to_rapier())
            .position(pos_rot_to_na_iso(desc.position, desc.rotation))
            .linvel(vec3_to_na(desc.velocity))
            .gravity_scale(desc.gravity_scale)
            .locked_axes(if desc.fixed_rotation {
                LockedAxes::ROTATION_LOCKED
            } else {
                LockedAxes::empty()
            })
            .ccd_enabled(desc.ccd)
            .user_data(entity_id.0 as u128)
            .build();

        let body_handle = self.bodies.insert(rb);

        let collider = desc
            .collider
            .build_collider()
            .restitution(material.restitution)
            .friction(material.friction)
            .density(material.density)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();

        let collider_handle =
            self.colliders
                .insert_with_parent(collider, body_handle, &mut self.bodies);

        PhysicsBody {
            body_handle,
            collider_handle,
        }
    }

    /// Remove a body and all its colliders from the simulation.
    pub fn remove_body(&mut self, body: &PhysicsBody) {
        self.bodies.remove(
            body.body_handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Step the simulation and collect collision events into the provided Vec.
    pub fn step_into(&mut self, collision_events: &mut Vec<CollisionPair>) {
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
            &self.event_collector,
        );

        for event in self.event_collector.drain_collisions() {
            let (h1, h2, started) = match event {
                CollisionEvent::Started(h1, h2, _) => (h1, h2, true),
                CollisionEvent::Stopped(h1, h2, _) => (h1, h2, false),
            };

            // Collider handles → body handles → entity IDs. Stopped events for
            // bodies removed this frame resolve to None and are dropped.
            let entity_a = self.collider_to_entity(h1);
            let entity_b = self.collider_to_entity(h2);

            if let (Some(a), Some(b)) = (entity_a, entity_b) {
                collision_events.push(CollisionPair {
                    entity_a: a,
                    entity_b: b,
                    started,
                });
            }
        }
    }

    /// Switch a body between fixed, kinematic and dynamic simulation.
    pub fn set_body_type(&mut self, body: &PhysicsBody, body_type: BodyType) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_body_type(body_type.to_rapier(), true);
            if body_type == BodyType::Dynamic {
                if rb.gravity_scale() == 0.0 {
                    rb.set_gravity_scale(1.0, true);
                }
                // Impulses applied before the next step need real mass.
                rb.recompute_mass_properties_from_colliders(&self.colliders);
            }
        }
    }

    /// Current simulation type of a body, if it still exists.
    pub fn body_type(&self, body: &PhysicsBody) -> Option<BodyType> {
        self.bodies
            .get(body.body_handle)
            .map(|rb| BodyType::from_rapier(rb.body_type()))
    }

    /// Apply an instantaneous impulse to a body.
    pub fn apply_impulse(&mut self, body: &PhysicsBody, impulse: Vec3) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.apply_impulse(vec3_to_na(impulse), true);
        }
    }

    /// Get the current position and rotation of a body.
    pub fn body_position(&self, body: &PhysicsBody) -> Option<(Vec3, Quat)> {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_iso_to_pos_rot(rb.position()))
    }

    /// Number of rigid bodies in the simulation.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    // -- private helpers --

    fn collider_to_entity(&self, collider_handle: ColliderHandle) -> Option<EntityId> {
        let collider = self.colliders.get(collider_handle)?;
        let body_handle = collider.parent()?;
        let body = self.bodies.get(body_handle)?;
        Some(EntityId(body.user_data as u32))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const EARTH: Vec3 = Vec3::new(0.0, -9.81, 0.0);

    fn unit_ball() -> ColliderDesc {
        ColliderDesc::Ball { radius: 0.05 }
    }

    #[test]
    fn create_and_remove_body() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        let body = world.create_body(
            EntityId(1),
            &BodyDesc::dynamic(unit_ball()),
            ColliderMaterial::default(),
        );
        assert_eq!(world.body_count(), 1);
        world.remove_body(&body);
        assert_eq!(world.body_count(), 0);
        assert!(world.body_position(&body).is_none());
    }

    #[test]
    fn gravity_pulls_dynamic_body_down() {
        let mut world = PhysicsWorld::new(EARTH);
        world.set_dt(1.0 / 60.0);
        let body = world.create_body(
            EntityId(1),
            &BodyDesc::dynamic(unit_ball()).with_position(Vec3::new(0.0, 1.0, 0.0)),
            ColliderMaterial::default(),
        );

        let mut events = Vec::new();
        for _ in 0..30 {
            world.step_into(&mut events);
        }
        let (pos, _) = world.body_position(&body).unwrap();
        assert!(pos.y < 1.0, "body should fall: y={}", pos.y);
    }

    #[test]
    fn fixed_body_ignores_gravity() {
        let mut world = PhysicsWorld::new(EARTH);
        world.set_dt(1.0 / 60.0);
        let body = world.create_body(
            EntityId(1),
            &BodyDesc::fixed(ColliderDesc::Cuboid {
                half_extents: Vec3::new(0.2, 0.01, 0.2),
            })
            .with_position(Vec3::new(0.0, 0.5, 0.0)),
            ColliderMaterial::default(),
        );

        let mut events = Vec::new();
        for _ in 0..30 {
            world.step_into(&mut events);
        }
        let (pos, _) = world.body_position(&body).unwrap();
        assert!((pos.y - 0.5).abs() < 1e-5, "fixed body moved: y={}", pos.y);
    }

    #[test]
    fn fixed_body_starts_falling_once_dynamic() {
        let mut world = PhysicsWorld::new(EARTH);
        world.set_dt(1.0 / 60.0);
        let body = world.create_body(
            EntityId(1),
            &BodyDesc::fixed(ColliderDesc::Cuboid {
                half_extents: Vec3::splat(0.05),
            }),
            ColliderMaterial::default(),
        );
        assert_eq!(world.body_type(&body), Some(BodyType::Fixed));

        world.set_body_type(&body, BodyType::Dynamic);
        assert_eq!(world.body_type(&body), Some(BodyType::Dynamic));

        let mut events = Vec::new();
        for _ in 0..30 {
            world.step_into(&mut events);
        }
        let (pos, _) = world.body_position(&body).unwrap();
        assert!(pos.y < 0.0, "released body should fall: y={}", pos.y);
    }

    #[test]
    fn kinematic_body_holds_still_until_released() {
        let mut world = PhysicsWorld::new(EARTH);
        world.set_dt(1.0 / 60.0);
        let body = world.create_body(
            EntityId(1),
            &BodyDesc::kinematic(unit_ball()).with_position(Vec3::new(0.0, 1.0, 0.0)),
            ColliderMaterial::default(),
        );

        let mut events = Vec::new();
        for _ in 0..10 {
            world.step_into(&mut events);
        }
        let (held, _) = world.body_position(&body).unwrap();
        assert!((held.y - 1.0).abs() < 1e-5);

        world.set_body_type(&body, BodyType::Dynamic);
        world.apply_impulse(&body, Vec3::new(0.0, 0.0, -0.01));
        for _ in 0..10 {
            world.step_into(&mut events);
        }
        let (moved, _) = world.body_position(&body).unwrap();
        assert!(moved.z < 0.0);
        assert!(moved.y < 1.0);
    }

    #[test]
    fn collision_events_between_converging_bodies() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        world.set_dt(1.0 / 60.0);

        world.create_body(
            EntityId(1),
            &BodyDesc::dynamic(ColliderDesc::Ball { radius: 0.1 })
                .with_velocity(Vec3::new(2.0, 0.0, 0.0)),
            ColliderMaterial::default(),
        );
        world.create_body(
            EntityId(2),
            &BodyDesc::dynamic(ColliderDesc::Ball { radius: 0.1 })
                .with_position(Vec3::new(0.5, 0.0, 0.0))
                .with_velocity(Vec3::new(-2.0, 0.0, 0.0)),
            ColliderMaterial::default(),
        );

        let mut all_events = Vec::new();
        for _ in 0..60 {
            world.step_into(&mut all_events);
        }

        let first = all_events
            .iter()
            .find(|e| e.started)
            .expect("expected a collision start event");
        let mut pair = [first.entity_a.0, first.entity_b.0];
        pair.sort_unstable();
        assert_eq!(pair, [1, 2]);
    }

    #[test]
    fn body_position_keeps_rotation() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        let rot = Quat::from_rotation_y(0.75);
        let body = world.create_body(
            EntityId(1),
            &BodyDesc::dynamic(unit_ball())
                .with_position(Vec3::new(1.0, 2.0, 3.0))
                .with_rotation(rot),
            ColliderMaterial::default(),
        );

        let (pos, got) = world.body_position(&body).unwrap();
        assert!((pos - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-5);
        assert!(got.angle_between(rot) < 1e-4);
    }

    #[test]
    fn shape_extents() {
        let cube = ColliderDesc::Cuboid {
            half_extents: Vec3::new(0.05, 0.07, 0.05),
        };
        assert!((cube.half_height() - 0.07).abs() < 1e-6);
        assert!((cube.half_width() - 0.05).abs() < 1e-6);
        let can = ColliderDesc::Cylinder { half_height: 0.06, radius: 0.033 };
        assert!((can.half_height() - 0.06).abs() < 1e-6);
        assert!((can.half_width() - 0.033).abs() < 1e-6);
    }
}
