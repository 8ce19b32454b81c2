//! Headless 3D engine core for small physics games.
//!
//! A game implements [`Game`]; a [`GameRunner`] drives it at a fixed timestep,
//! stepping the rapier3d-backed [`PhysicsWorld`] after every update and
//! syncing body poses back into the [`Scene`].

pub mod api;
pub mod core;
pub mod components;
pub mod input;
pub mod runner;

// Re-export key types at crate root for convenience
pub use api::game::{Game, GameConfig, EngineContext};
pub use api::types::{EntityId, SoundEvent, GameEvent, Pose};
pub use components::entity::Entity;
pub use core::scene::Scene;
pub use core::time::FixedTimestep;
pub use core::viewer::{Ray, Viewer};
pub use input::queue::{GesturePhase, InputEvent, InputQueue};
pub use runner::GameRunner;

#[cfg(feature = "physics")]
pub use core::physics::{
    PhysicsWorld, PhysicsBody, BodyDesc, BodyType,
    ColliderDesc, ColliderMaterial, CollisionPair,
};
