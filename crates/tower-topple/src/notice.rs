//! Outbound notifications for presentation, audio and haptics.

use serde::Serialize;
use topple_engine::{GameEvent, SoundEvent};

use crate::round::{Outcome, Phase};
use crate::structure::TargetId;

/// Something presentation may want to show or play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    PlacementRejected,
    AlreadyPlaced,
    ProjectileHit,
    TargetHit { target: TargetId },
    ScoreChanged { score: u32 },
    RoundOver { outcome: Outcome },
    PhaseChanged { phase: Phase },
}

/// `GameEvent::kind` values used when notices cross into the engine.
pub mod kinds {
    pub const PLACEMENT_REJECTED: f32 = 1.0;
    pub const ALREADY_PLACED: f32 = 2.0;
    pub const PROJECTILE_HIT: f32 = 3.0;
    pub const TARGET_HIT: f32 = 4.0;
    pub const SCORE_CHANGED: f32 = 5.0;
    pub const ROUND_OVER: f32 = 6.0;
    pub const PHASE_CHANGED: f32 = 7.0;
}

/// Audio/haptic cues.
pub mod sounds {
    use topple_engine::SoundEvent;

    pub const PROJECTILE_HIT: SoundEvent = SoundEvent(1);
    pub const TARGET_HIT: SoundEvent = SoundEvent(2);
    pub const WON: SoundEvent = SoundEvent(3);
    pub const LOST: SoundEvent = SoundEvent(4);
    pub const REJECTED: SoundEvent = SoundEvent(5);
}

impl Notice {
    pub fn to_game_event(&self) -> GameEvent {
        match *self {
            Notice::PlacementRejected => GameEvent::new(kinds::PLACEMENT_REJECTED, 0.0),
            Notice::AlreadyPlaced => GameEvent::new(kinds::ALREADY_PLACED, 0.0),
            Notice::ProjectileHit => GameEvent::new(kinds::PROJECTILE_HIT, 0.0),
            Notice::TargetHit { target } => GameEvent::new(kinds::TARGET_HIT, target.0 as f32),
            Notice::ScoreChanged { score } => GameEvent::new(kinds::SCORE_CHANGED, score as f32),
            Notice::RoundOver { outcome } => GameEvent::new(kinds::ROUND_OVER, outcome.code()),
            Notice::PhaseChanged { phase } => GameEvent::new(kinds::PHASE_CHANGED, phase.code()),
        }
    }

    /// Cue to play alongside this notice, if any.
    pub fn sound(&self) -> Option<SoundEvent> {
        match *self {
            Notice::ProjectileHit => Some(sounds::PROJECTILE_HIT),
            Notice::TargetHit { .. } => Some(sounds::TARGET_HIT),
            Notice::RoundOver { outcome: Outcome::Won } => Some(sounds::WON),
            Notice::RoundOver { outcome: Outcome::Lost } => Some(sounds::LOST),
            Notice::PlacementRejected | Notice::AlreadyPlaced => Some(sounds::REJECTED),
            Notice::ScoreChanged { .. } | Notice::PhaseChanged { .. } => None,
        }
    }
}
