use crate::api::types::EntityId;
use crate::components::entity::Entity;

/// Flat entity storage kept in spawn order.
/// Sized for a handful of bodies per round, so linear lookups are fine.
pub struct Scene {
    entities: Vec<Entity>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            entities: Vec::with_capacity(32),
        }
    }

    /// Add an entity to the scene.
    pub fn spawn(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    /// Remove an entity by ID, keeping the order of the rest.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let idx = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(idx))
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn spawn_and_get() {
        let mut scene = Scene::new();
        scene.spawn(Entity::new(EntityId(7)).with_pos(Vec3::new(0.1, 0.2, -0.9)));
        let e = scene.get(EntityId(7)).unwrap();
        assert_eq!(e.pos, Vec3::new(0.1, 0.2, -0.9));
        assert!(scene.contains(EntityId(7)));
        assert!(!scene.contains(EntityId(8)));
    }

    #[test]
    fn despawn_keeps_spawn_order() {
        let mut scene = Scene::new();
        for i in 1..=4 {
            scene.spawn(Entity::new(EntityId(i)));
        }
        let removed = scene.despawn(EntityId(2)).unwrap();
        assert_eq!(removed.id, EntityId(2));
        let ids: Vec<EntityId> = scene.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![EntityId(1), EntityId(3), EntityId(4)]);
        assert!(scene.despawn(EntityId(2)).is_none());
    }
}
