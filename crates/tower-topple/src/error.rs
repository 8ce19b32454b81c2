use thiserror::Error;

use crate::round::Phase;

/// Why a gesture or message did not change the round.
///
/// None of these are fatal: the coordinator turns them into notices (or
/// drops them silently) and keeps the round where it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The tracker found no surface under the placement gesture.
    #[error("no surface under the placement gesture")]
    PlacementRejected,
    /// A tower is already standing for this round.
    #[error("tower already placed for this round")]
    AlreadyPlaced,
    /// The event means nothing in the current phase.
    #[error("{event} has no effect while {}", .phase.name())]
    InvalidTransition { event: &'static str, phase: Phase },
}

impl Rejection {
    /// Whether presentation should hear about this rejection.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, Rejection::InvalidTransition { .. })
    }
}

/// Problems loading or validating a [`RoundConfig`](crate::config::RoundConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed round config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tower layout has no pieces")]
    EmptyTower,
    #[error("a round needs at least one projectile")]
    NoProjectiles,
    #[error("{0} must be positive")]
    NonPositive(&'static str),
    #[error("{0} must not be negative")]
    Negative(&'static str),
}
