use crate::core::scene::Scene;
use crate::api::types::{EntityId, SoundEvent, GameEvent};
use crate::input::queue::InputQueue;
#[cfg(feature = "physics")]
use crate::core::physics::{
    PhysicsWorld, BodyDesc, BodyType, ColliderMaterial, CollisionPair,
};
#[cfg(feature = "physics")]
use crate::components::entity::Entity;
#[cfg(feature = "physics")]
use glam::Vec3;

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Maximum fixed steps run for one frame (default: 10).
    pub max_steps_per_frame: u32,
    /// Maximum number of sound events per frame (default: 32).
    pub max_sounds: usize,
    /// Maximum number of game events per frame (default: 32).
    pub max_events: usize,
    /// Gravity vector for physics simulation. Default: Earth gravity, Y-up.
    #[cfg(feature = "physics")]
    pub gravity: glam::Vec3,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_steps_per_frame: 10,
            max_sounds: 32,
            max_events: 32,
            #[cfg(feature = "physics")]
            gravity: glam::Vec3::new(0.0, -9.81, 0.0),
        }
    }
}

/// The core contract every game must fulfill.
pub trait Game {
    /// Return engine configuration. Called once before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Setup initial state, spawn entities, configure the scene.
    fn init(&mut self, ctx: &mut EngineContext);

    /// One fixed tick. Read input, advance timers, check win conditions,
    /// spawn/despawn entities. Physics is stepped by the runner afterwards.
    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue);
}

/// Mutable access to engine state, passed to Game::init and Game::update.
pub struct EngineContext {
    pub scene: Scene,
    pub sounds: Vec<SoundEvent>,
    pub events: Vec<GameEvent>,
    next_id: u32,
    max_sounds: usize,
    max_events: usize,
    #[cfg(feature = "physics")]
    pub physics: PhysicsWorld,
    #[cfg(feature = "physics")]
    collision_events: Vec<CollisionPair>,
}

impl EngineContext {
    pub fn new() -> Self {
        Self::from_config(&GameConfig::default())
    }

    /// Create an EngineContext sized and tuned by `config`.
    pub fn from_config(config: &GameConfig) -> Self {
        #[cfg(feature = "physics")]
        let physics = {
            let mut world = PhysicsWorld::new(config.gravity);
            world.set_dt(config.fixed_dt);
            world
        };
        Self {
            scene: Scene::new(),
            sounds: Vec::new(),
            events: Vec::new(),
            next_id: 1,
            max_sounds: config.max_sounds,
            max_events: config.max_events,
            #[cfg(feature = "physics")]
            physics,
            #[cfg(feature = "physics")]
            collision_events: Vec::new(),
        }
    }

    /// Generate the next unique entity ID.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Emit a sound event for the presentation layer.
    pub fn emit_sound(&mut self, event: SoundEvent) {
        if self.sounds.len() >= self.max_sounds {
            log::warn!("sound queue full, dropping {:?}", event);
            return;
        }
        self.sounds.push(event);
    }

    /// Emit a game event for the presentation layer.
    pub fn emit_event(&mut self, event: GameEvent) {
        if self.events.len() >= self.max_events {
            log::warn!("event queue full, dropping kind {}", event.kind);
            return;
        }
        self.events.push(event);
    }

    /// Clear per-frame transient data (sounds, events).
    /// Collision events survive until the next physics step so the game can
    /// read the pairs produced by the previous step.
    pub fn clear_frame_data(&mut self) {
        self.sounds.clear();
        self.events.clear();
    }

    // -- Physics convenience methods --

    /// Spawn an entity with a physics body. Returns the EntityId.
    /// The entity's position is set from the BodyDesc.
    #[cfg(feature = "physics")]
    pub fn spawn_with_body(
        &mut self,
        entity: Entity,
        desc: BodyDesc,
        material: ColliderMaterial,
    ) -> EntityId {
        let id = entity.id;
        let body = self.physics.create_body(id, &desc, material);
        let entity = entity
            .with_pos(desc.position)
            .with_rotation(desc.rotation)
            .with_body(body);
        self.scene.spawn(entity);
        id
    }

    /// Despawn an entity, cleaning up its physics body if present.
    /// Returns false if no such entity existed.
    #[cfg(feature = "physics")]
    pub fn despawn(&mut self, id: EntityId) -> bool {
        match self.scene.despawn(id) {
            Some(entity) => {
                if let Some(body) = &entity.body {
                    self.physics.remove_body(body);
                }
                true
            }
            None => false,
        }
    }

    /// Switch an entity's body between fixed, kinematic and dynamic.
    #[cfg(feature = "physics")]
    pub fn set_body_type(&mut self, id: EntityId, body_type: BodyType) {
        if let Some(body) = self.scene.get(id).and_then(|e| e.body) {
            self.physics.set_body_type(&body, body_type);
        }
    }

    /// Current body type of an entity, if it has a body.
    #[cfg(feature = "physics")]
    pub fn body_type(&self, id: EntityId) -> Option<BodyType> {
        let body = self.scene.get(id)?.body?;
        self.physics.body_type(&body)
    }

    /// Apply an instantaneous impulse to an entity's physics body.
    #[cfg(feature = "physics")]
    pub fn apply_impulse(&mut self, id: EntityId, impulse: Vec3) {
        if let Some(body) = self.scene.get(id).and_then(|e| e.body) {
            self.physics.apply_impulse(&body, impulse);
        }
    }

    /// World position of an entity as of the last physics sync.
    pub fn position(&self, id: EntityId) -> Option<glam::Vec3> {
        self.scene.get(id).map(|e| e.pos)
    }

    /// Get collision events from the most recent physics step.
    #[cfg(feature = "physics")]
    pub fn collisions(&self) -> &[CollisionPair] {
        &self.collision_events
    }

    /// Step the physics simulation and sync positions back to entities.
    /// Called automatically by the game runner after `Game::update()`.
    #[cfg(feature = "physics")]
    pub fn step_physics(&mut self) {
        self.collision_events.clear();
        self.physics.step_into(&mut self.collision_events);

        for entity in self.scene.iter_mut() {
            if let Some(body) = &entity.body {
                if let Some((pos, rot)) = self.physics.body_position(body) {
                    entity.pos = pos;
                    entity.rotation = rot;
                }
            }
        }
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}
