//! Tower topple as an engine [`Game`].
//!
//! Gestures arrive as engine input, collisions come from the last physics
//! step, and every fixed step ends with a round tick. Notices go back out as
//! engine events and sounds, and are also kept for callers that want them
//! typed.

use glam::Vec2;
use topple_engine::{EngineContext, EntityId, Game, GameConfig, GesturePhase, InputEvent, InputQueue};

use crate::config::RoundConfig;
use crate::notice::Notice;
use crate::ports::SurfaceTracker;
use crate::round::{RoundCoordinator, RoundEvent};

/// Custom input kinds from the UI layer.
pub mod commands {
    pub const RESET: u32 = 1;
}

pub struct ToppleGame<T: SurfaceTracker> {
    coordinator: RoundCoordinator,
    tracker: T,
    engine: GameConfig,
    notices: Vec<Notice>,
}

impl<T: SurfaceTracker> ToppleGame<T> {
    pub fn new(round: RoundConfig, tracker: T) -> Self {
        Self {
            coordinator: RoundCoordinator::new(round),
            tracker,
            engine: GameConfig::default(),
            notices: Vec::new(),
        }
    }

    pub fn with_engine_config(mut self, engine: GameConfig) -> Self {
        self.engine = engine;
        self
    }

    pub fn coordinator(&self) -> &RoundCoordinator {
        &self.coordinator
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut T {
        &mut self.tracker
    }

    /// Notices produced since the last call, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn translate(event: &InputEvent) -> Option<RoundEvent> {
        match *event {
            InputEvent::Tap { x, y } => Some(RoundEvent::Place {
                screen: Vec2::new(x, y),
            }),
            InputEvent::Pan {
                phase: GesturePhase::Ended,
                ..
            } => Some(RoundEvent::Throw),
            InputEvent::Custom { kind, .. } if kind == commands::RESET => Some(RoundEvent::Reset),
            _ => None,
        }
    }
}

impl<T: SurfaceTracker> Game for ToppleGame<T> {
    fn config(&self) -> GameConfig {
        self.engine.clone()
    }

    fn init(&mut self, _ctx: &mut EngineContext) {
        let round = self.coordinator.config();
        log::info!(
            "tower topple ready: {} pieces, {} projectiles per round",
            round.tower.target_count(),
            round.projectiles_per_round
        );
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
        for event in input.iter().filter_map(Self::translate) {
            self.coordinator.handle(event, &self.tracker, &mut *ctx);
        }

        let contacts: Vec<(EntityId, EntityId)> = ctx
            .collisions()
            .iter()
            .filter(|c| c.started)
            .map(|c| (c.entity_a, c.entity_b))
            .collect();
        for (a, b) in contacts {
            self.coordinator
                .handle(RoundEvent::Collision { a, b }, &self.tracker, &mut *ctx);
        }

        let dt = self.engine.fixed_dt;
        self.coordinator
            .handle(RoundEvent::Tick { dt }, &self.tracker, &mut *ctx);

        for notice in self.coordinator.take_notices() {
            ctx.emit_event(notice.to_game_event());
            if let Some(sound) = notice.sound() {
                ctx.emit_sound(sound);
            }
            self.notices.push(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::kinds;
    use crate::round::Phase;
    use crate::sandbox::FixedTracker;
    use glam::Vec3;
    use topple_engine::{GameRunner, Pose};

    fn runner() -> GameRunner<ToppleGame<FixedTracker>> {
        let tracker = FixedTracker::new(Pose::from_position(Vec3::new(0.0, 0.8, 0.0)))
            .with_hit(Vec3::new(0.0, -0.6, -1.2));
        let mut runner = GameRunner::new(ToppleGame::new(RoundConfig::default(), tracker));
        runner.init();
        runner
    }

    #[test]
    fn tap_places_the_tower() {
        let mut runner = runner();
        runner.push_input(InputEvent::Tap { x: 200.0, y: 400.0 });
        runner.run_steps(1);

        assert_eq!(runner.game().coordinator().phase(), Phase::Armed);
        assert_eq!(runner.context().scene.len(), 7);
        assert!(runner
            .events()
            .iter()
            .any(|e| e.kind == kinds::PHASE_CHANGED && e.a == Phase::Armed.code()));
    }

    #[test]
    fn only_ended_pans_throw() {
        let mut runner = runner();
        runner.push_input(InputEvent::Tap { x: 200.0, y: 400.0 });
        runner.run_steps(40);
        assert_eq!(runner.game().coordinator().phase(), Phase::AwaitingProjectile);

        runner.push_input(InputEvent::Pan { phase: GesturePhase::Changed, x: 0.0, y: 0.0 });
        runner.run_steps(1);
        assert_eq!(runner.game().coordinator().projectiles_remaining(), 3);

        runner.push_input(InputEvent::Pan { phase: GesturePhase::Ended, x: 0.0, y: 0.0 });
        runner.run_steps(1);
        assert_eq!(runner.game().coordinator().phase(), Phase::ProjectileInFlight);
        assert_eq!(runner.game().coordinator().projectiles_remaining(), 2);
    }

    #[test]
    fn round_timers_follow_the_engine_step() {
        let tracker = FixedTracker::new(Pose::from_position(Vec3::new(0.0, 0.8, 0.0)))
            .with_hit(Vec3::new(0.0, -0.6, -1.2));
        let engine = GameConfig {
            fixed_dt: 0.25,
            ..GameConfig::default()
        };
        let game = ToppleGame::new(RoundConfig::default(), tracker).with_engine_config(engine);
        let mut runner = GameRunner::new(game);
        runner.init();
        assert_eq!(runner.config().fixed_dt, 0.25);

        runner.push_input(InputEvent::Tap { x: 200.0, y: 400.0 });
        runner.run_steps(1);
        assert_eq!(runner.game().coordinator().phase(), Phase::Armed);
        runner.run_steps(1);
        assert_eq!(runner.game().coordinator().phase(), Phase::AwaitingProjectile);
    }

    #[test]
    fn reset_command_clears_the_scene() {
        let mut runner = runner();
        runner.push_input(InputEvent::Tap { x: 200.0, y: 400.0 });
        runner.run_steps(40);
        runner.push_input(InputEvent::Custom { kind: commands::RESET, a: 0.0, b: 0.0 });
        runner.run_steps(1);

        assert_eq!(runner.game().coordinator().phase(), Phase::AwaitingPlacement);
        assert_eq!(runner.context().scene.len(), 0);
        assert_eq!(runner.context().physics.body_count(), 0);
    }

    #[test]
    fn notices_are_kept_for_callers() {
        let mut runner = runner();
        runner.push_input(InputEvent::Tap { x: 200.0, y: 400.0 });
        runner.push_input(InputEvent::Tap { x: 200.0, y: 400.0 });
        runner.run_steps(1);

        let notices = runner.game_mut().take_notices();
        assert_eq!(
            notices,
            vec![Notice::PhaseChanged { phase: Phase::Armed }, Notice::AlreadyPlaced]
        );
        assert!(runner.game_mut().take_notices().is_empty());
    }
}
