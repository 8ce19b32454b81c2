//! The engine's rapier world behind [`PhysicsPort`].

use glam::Vec3;
use topple_engine::{
    BodyDesc, ColliderDesc, ColliderMaterial, EngineContext, Entity, EntityId,
};

use crate::ports::{BodyKind, BodyMode, BodySpec, PhysicsPort};

/// Full size of a collider, used as the entity's scale.
fn extents(shape: &ColliderDesc) -> Vec3 {
    match *shape {
        ColliderDesc::Cuboid { half_extents } => half_extents * 2.0,
        _ => Vec3::new(
            shape.half_width() * 2.0,
            shape.half_height() * 2.0,
            shape.half_width() * 2.0,
        ),
    }
}

fn material(kind: BodyKind, density: f32) -> ColliderMaterial {
    match kind {
        BodyKind::Projectile => ColliderMaterial {
            restitution: 0.2,
            friction: 0.4,
            density,
        },
        BodyKind::Target(_) | BodyKind::Support => ColliderMaterial {
            restitution: 0.05,
            friction: 0.7,
            density,
        },
    }
}

impl PhysicsPort for EngineContext {
    fn create_body(&mut self, spec: &BodySpec) -> EntityId {
        let id = self.next_id();
        // Static pieces become dynamic later; keep them free to tip over then.
        let desc = BodyDesc::new(spec.mode.body_type(), spec.shape)
            .with_position(spec.position)
            .with_gravity_scale(1.0)
            .with_fixed_rotation(false)
            .with_ccd(spec.kind == BodyKind::Projectile);
        let entity = Entity::new(id)
            .with_label(spec.kind.label())
            .with_scale(extents(&spec.shape));
        self.spawn_with_body(entity, desc, material(spec.kind, spec.density))
    }

    fn destroy_body(&mut self, id: EntityId) {
        if !self.despawn(id) {
            log::warn!("destroy of unknown body {:?}", id);
        }
    }

    fn set_mode(&mut self, id: EntityId, mode: BodyMode) {
        self.set_body_type(id, mode.body_type());
    }

    fn apply_impulse(&mut self, id: EntityId, impulse: Vec3) {
        EngineContext::apply_impulse(self, id, impulse);
    }

    fn position(&self, id: EntityId) -> Option<Vec3> {
        EngineContext::position(self, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::TargetId;
    use topple_engine::BodyType;

    fn spec(kind: BodyKind, mode: BodyMode, position: Vec3) -> BodySpec {
        BodySpec {
            kind,
            shape: ColliderDesc::Cuboid {
                half_extents: Vec3::splat(0.05),
            },
            mode,
            position,
            density: 300.0,
        }
    }

    #[test]
    fn bodies_are_labelled_and_scaled() {
        let mut ctx = EngineContext::new();
        let id = PhysicsPort::create_body(
            &mut ctx,
            &spec(BodyKind::Target(TargetId(3)), BodyMode::Static, Vec3::new(0.0, 1.0, 0.0)),
        );
        let entity = ctx.scene.get(id).unwrap();
        assert_eq!(entity.label, "target_3");
        assert_eq!(entity.scale, Vec3::splat(0.1));
        assert_eq!(ctx.body_type(id), Some(BodyType::Fixed));
        assert_eq!(PhysicsPort::position(&ctx, id), Some(Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn static_body_falls_once_released() {
        let mut ctx = EngineContext::new();
        let id = PhysicsPort::create_body(
            &mut ctx,
            &spec(BodyKind::Target(TargetId(0)), BodyMode::Static, Vec3::new(0.0, 1.0, 0.0)),
        );
        for _ in 0..10 {
            ctx.step_physics();
        }
        assert_eq!(PhysicsPort::position(&ctx, id).map(|p| p.y), Some(1.0));

        ctx.set_mode(id, BodyMode::Dynamic);
        for _ in 0..10 {
            ctx.step_physics();
        }
        assert!(PhysicsPort::position(&ctx, id).unwrap().y < 1.0);
    }

    #[test]
    fn thrown_projectile_moves_forward() {
        let mut ctx = EngineContext::new();
        let id = PhysicsPort::create_body(
            &mut ctx,
            &BodySpec {
                kind: BodyKind::Projectile,
                shape: ColliderDesc::Ball { radius: 0.03 },
                mode: BodyMode::Kinematic,
                position: Vec3::new(0.0, 1.0, 0.0),
                density: 1000.0,
            },
        );
        ctx.set_mode(id, BodyMode::Dynamic);
        PhysicsPort::apply_impulse(&mut ctx, id, Vec3::new(0.0, 0.0, -0.35));
        for _ in 0..10 {
            ctx.step_physics();
        }
        assert!(PhysicsPort::position(&ctx, id).unwrap().z < -0.1);
    }

    #[test]
    fn destroyed_bodies_have_no_position() {
        let mut ctx = EngineContext::new();
        let id = PhysicsPort::create_body(
            &mut ctx,
            &spec(BodyKind::Support, BodyMode::Static, Vec3::ZERO),
        );
        ctx.destroy_body(id);
        assert!(PhysicsPort::position(&ctx, id).is_none());
        assert_eq!(ctx.physics.body_count(), 0);
    }
}
