//! Capabilities the round core needs from its collaborators.
//!
//! The coordinator never touches a concrete physics world or tracking
//! session. It talks to a [`SurfaceTracker`] for placement and aiming and to
//! a [`PhysicsPort`] for body lifecycle. Both are implemented over the engine
//! for real play and in memory for tests.

use glam::{Vec2, Vec3};
use topple_engine::{BodyType, ColliderDesc, EntityId, Pose};

use crate::structure::TargetId;

/// What a body is, fixed when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKind {
    Target(TargetId),
    Projectile,
    /// The static slab under the tower. Never scores.
    Support,
}

impl BodyKind {
    /// Scene label for debugging and inspector views.
    pub fn label(&self) -> String {
        match self {
            BodyKind::Target(id) => format!("target_{}", id.0),
            BodyKind::Projectile => "projectile".to_string(),
            BodyKind::Support => "support".to_string(),
        }
    }
}

/// How the physics collaborator should move a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    /// Never moves.
    Static,
    /// Moved only by the game, ignores gravity.
    Kinematic,
    /// Fully simulated.
    Dynamic,
}

impl BodyMode {
    pub fn body_type(self) -> BodyType {
        match self {
            BodyMode::Static => BodyType::Fixed,
            BodyMode::Kinematic => BodyType::KinematicPositionBased,
            BodyMode::Dynamic => BodyType::Dynamic,
        }
    }
}

/// Everything needed to create one body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodySpec {
    pub kind: BodyKind,
    pub shape: ColliderDesc,
    pub mode: BodyMode,
    pub position: Vec3,
    pub density: f32,
}

/// Surface detection and viewer pose.
pub trait SurfaceTracker {
    /// World pose of the surface under a screen point, if any.
    fn hit_test(&self, screen: Vec2) -> Option<Pose>;

    /// Current pose of the player's viewpoint.
    fn viewer(&self) -> Pose;
}

/// Rigid body lifecycle.
pub trait PhysicsPort {
    fn create_body(&mut self, spec: &BodySpec) -> EntityId;

    fn destroy_body(&mut self, id: EntityId);

    fn set_mode(&mut self, id: EntityId, mode: BodyMode);

    fn apply_impulse(&mut self, id: EntityId, impulse: Vec3);

    /// World position, or `None` once the body is gone.
    fn position(&self, id: EntityId) -> Option<Vec3>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_keep_the_familiar_prefixes() {
        assert_eq!(BodyKind::Target(TargetId(4)).label(), "target_4");
        assert_eq!(BodyKind::Projectile.label(), "projectile");
        assert_eq!(BodyKind::Support.label(), "support");
    }

    #[test]
    fn modes_map_onto_engine_body_types() {
        assert_eq!(BodyMode::Static.body_type(), BodyType::Fixed);
        assert_eq!(BodyMode::Kinematic.body_type(), BodyType::KinematicPositionBased);
        assert_eq!(BodyMode::Dynamic.body_type(), BodyType::Dynamic);
    }
}
