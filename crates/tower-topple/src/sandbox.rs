//! In-memory collaborators.
//!
//! [`InMemoryPhysics`] records bodies without simulating them; tests move
//! bodies by hand with [`InMemoryPhysics::drop_to`]. [`FixedTracker`] answers
//! hit tests from a script. Both are handy for driving a round without the
//! engine.

use std::collections::BTreeMap;

use glam::{Vec2, Vec3};
use topple_engine::{EntityId, Pose};

use crate::ports::{BodyKind, BodyMode, BodySpec, PhysicsPort, SurfaceTracker};

#[derive(Debug, Clone, PartialEq)]
pub struct SandboxBody {
    pub spec: BodySpec,
    pub position: Vec3,
    pub mode: BodyMode,
    pub impulses: Vec<Vec3>,
}

/// Bookkeeping physics: bodies stay where they are put.
#[derive(Debug, Default)]
pub struct InMemoryPhysics {
    bodies: BTreeMap<EntityId, SandboxBody>,
    next_id: u32,
    created: usize,
}

impl InMemoryPhysics {
    pub fn kind(&self, id: EntityId) -> Option<BodyKind> {
        self.bodies.get(&id).map(|b| b.spec.kind)
    }

    pub fn mode(&self, id: EntityId) -> Option<BodyMode> {
        self.bodies.get(&id).map(|b| b.mode)
    }

    pub fn impulses(&self, id: EntityId) -> &[Vec3] {
        self.bodies.get(&id).map(|b| b.impulses.as_slice()).unwrap_or(&[])
    }

    /// Bodies created and not yet destroyed.
    pub fn live_count(&self) -> usize {
        self.bodies.len()
    }

    /// Bodies ever created.
    pub fn created_count(&self) -> usize {
        self.created
    }

    pub fn live_of(&self, pred: impl Fn(BodyKind) -> bool) -> usize {
        self.bodies.values().filter(|b| pred(b.spec.kind)).count()
    }

    /// Move a body to height `y`, as if it had fallen there.
    pub fn drop_to(&mut self, id: EntityId, y: f32) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.position.y = y;
        }
    }
}

impl PhysicsPort for InMemoryPhysics {
    fn create_body(&mut self, spec: &BodySpec) -> EntityId {
        self.next_id += 1;
        self.created += 1;
        let id = EntityId(self.next_id);
        self.bodies.insert(
            id,
            SandboxBody {
                spec: spec.clone(),
                position: spec.position,
                mode: spec.mode,
                impulses: Vec::new(),
            },
        );
        id
    }

    fn destroy_body(&mut self, id: EntityId) {
        self.bodies.remove(&id);
    }

    fn set_mode(&mut self, id: EntityId, mode: BodyMode) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.mode = mode;
        }
    }

    fn apply_impulse(&mut self, id: EntityId, impulse: Vec3) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.impulses.push(impulse);
        }
    }

    fn position(&self, id: EntityId) -> Option<Vec3> {
        self.bodies.get(&id).map(|b| b.position)
    }
}

/// Tracker with a fixed viewer and an optional fixed surface hit.
#[derive(Debug, Clone)]
pub struct FixedTracker {
    pub viewer: Pose,
    pub hit: Option<Pose>,
}

impl FixedTracker {
    pub fn new(viewer: Pose) -> Self {
        Self { viewer, hit: None }
    }

    pub fn with_hit(mut self, position: Vec3) -> Self {
        self.hit = Some(Pose::from_position(position));
        self
    }
}

impl SurfaceTracker for FixedTracker {
    fn hit_test(&self, _screen: Vec2) -> Option<Pose> {
        self.hit
    }

    fn viewer(&self) -> Pose {
        self.viewer
    }
}
