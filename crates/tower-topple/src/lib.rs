//! Tower topple: anchor a small stack of pieces on a surface, throw
//! projectiles at it, and knock every piece off to win.
//!
//! The round logic lives in [`round::RoundCoordinator`] and only talks to the
//! outside world through the traits in [`ports`]. [`game::ToppleGame`] wires
//! it into the engine's fixed-step loop.

pub mod config;
pub mod error;
pub mod game;
pub mod notice;
pub mod physics;
pub mod placement;
pub mod ports;
pub mod round;
pub mod sandbox;
pub mod schedule;
pub mod structure;
pub mod tracking;

pub use config::{PlayMode, RoundConfig, Theme};
pub use error::{ConfigError, Rejection};
pub use game::ToppleGame;
pub use notice::Notice;
pub use round::{Outcome, Phase, RoundCoordinator, RoundEvent, RoundState};
pub use tracking::PlaneTracker;
