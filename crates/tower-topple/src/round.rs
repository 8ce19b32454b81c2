//! Round Coordinator: the phase machine, projectile lifecycle and scoring.
//!
//! Everything that changes a round goes through [`RoundCoordinator::handle`].
//! Gestures, ticks and collisions arrive as [`RoundEvent`]s on one thread;
//! timers come back through the coordinator's [`Schedule`] on later ticks.
//! The coordinator owns the tower and every projectile it spawned and tears
//! them all down on reset.

use std::collections::HashMap;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use topple_engine::EntityId;

use crate::config::RoundConfig;
use crate::error::Rejection;
use crate::notice::Notice;
use crate::placement::PlacementResolver;
use crate::ports::{BodyKind, BodyMode, BodySpec, PhysicsPort, SurfaceTracker};
use crate::schedule::{Deferred, RoundToken, Schedule};
use crate::structure::{build_tower, Tower};

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Won,
    Lost,
}

impl Outcome {
    /// Numeric code for engine events.
    pub fn code(self) -> f32 {
        match self {
            Outcome::Won => 1.0,
            Outcome::Lost => 2.0,
        }
    }
}

/// Where the round is. A finished round carries its outcome, so there is no
/// outcome without `RoundOver` and no `RoundOver` without an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AwaitingPlacement,
    /// Tower placed and still static.
    Armed,
    /// A projectile is held and ready.
    AwaitingProjectile,
    ProjectileInFlight,
    RoundOver { outcome: Outcome },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::AwaitingPlacement => "awaiting placement",
            Phase::Armed => "armed",
            Phase::AwaitingProjectile => "awaiting projectile",
            Phase::ProjectileInFlight => "projectile in flight",
            Phase::RoundOver { .. } => "round over",
        }
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Phase::RoundOver { outcome } => Some(*outcome),
            _ => None,
        }
    }

    pub fn is_round_over(&self) -> bool {
        matches!(self, Phase::RoundOver { .. })
    }

    /// Numeric code for engine events.
    pub fn code(&self) -> f32 {
        match self {
            Phase::AwaitingPlacement => 0.0,
            Phase::Armed => 1.0,
            Phase::AwaitingProjectile => 2.0,
            Phase::ProjectileInFlight => 3.0,
            Phase::RoundOver { .. } => 4.0,
        }
    }
}

/// The round's score sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundState {
    phase: Phase,
    score: u32,
    projectiles_remaining: u32,
}

impl RoundState {
    pub fn new(projectiles: u32) -> Self {
        Self {
            phase: Phase::AwaitingPlacement,
            score: 0,
            projectiles_remaining: projectiles,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn projectiles_remaining(&self) -> u32 {
        self.projectiles_remaining
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.phase.outcome()
    }
}

/// Messages the coordinator reacts to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoundEvent {
    /// Placement gesture at a screen point.
    Place { screen: Vec2 },
    /// Throw gesture ended.
    Throw,
    /// Simulation time passed.
    Tick { dt: f32 },
    /// Two bodies started touching.
    Collision { a: EntityId, b: EntityId },
    /// Abandon the round and start over.
    Reset,
}

/// The projectile in the player's hand. It stops being one on throw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projectile {
    pub body: EntityId,
}

pub struct RoundCoordinator {
    config: RoundConfig,
    resolver: PlacementResolver,
    state: RoundState,
    round: RoundToken,
    schedule: Schedule,
    tower: Option<Tower>,
    /// The one held projectile, until it is thrown.
    projectile: Option<Projectile>,
    /// Thrown projectiles, still in the world until reset.
    spent: Vec<EntityId>,
    spawn_point: Option<Vec3>,
    kinds: HashMap<EntityId, BodyKind>,
    notices: Vec<Notice>,
}

impl RoundCoordinator {
    pub fn new(config: RoundConfig) -> Self {
        Self {
            resolver: PlacementResolver::new(config.min_placement_distance),
            state: RoundState::new(config.projectiles_per_round),
            round: RoundToken::default(),
            schedule: Schedule::new(),
            tower: None,
            projectile: None,
            spent: Vec::new(),
            spawn_point: None,
            kinds: HashMap::new(),
            notices: Vec::new(),
            config,
        }
    }

    /// Feed one message through the state machine. Rejections become notices
    /// or, for events that mean nothing in the current phase, are dropped.
    pub fn handle(
        &mut self,
        event: RoundEvent,
        tracker: &impl SurfaceTracker,
        physics: &mut impl PhysicsPort,
    ) {
        let result = match event {
            RoundEvent::Place { screen } => self.place(screen, tracker, physics),
            RoundEvent::Throw => self.throw(tracker, physics),
            RoundEvent::Tick { dt } => {
                self.tick(dt, tracker, physics);
                Ok(())
            }
            RoundEvent::Collision { a, b } => {
                self.collision(a, b);
                Ok(())
            }
            RoundEvent::Reset => {
                self.reset(physics);
                Ok(())
            }
        };
        if let Err(rejection) = result {
            self.reject(rejection);
        }
    }

    /// Anchor and build the tower, then arm the round.
    pub fn place(
        &mut self,
        screen: Vec2,
        tracker: &impl SurfaceTracker,
        physics: &mut impl PhysicsPort,
    ) -> Result<(), Rejection> {
        if self.tower.is_some() || self.state.phase != Phase::AwaitingPlacement {
            return Err(Rejection::AlreadyPlaced);
        }

        let hit = tracker.hit_test(screen);
        let anchor = self.resolver.resolve(hit.as_ref(), &tracker.viewer())?;
        let tower = build_tower(anchor, &self.config.tower, physics);

        for target in tower.targets() {
            self.kinds.insert(target.body, BodyKind::Target(target.id));
        }
        self.kinds.insert(tower.support(), BodyKind::Support);
        self.tower = Some(tower);

        self.schedule
            .after(self.config.timing.activation_delay, self.round, Deferred::Activate);
        self.set_phase(Phase::Armed);
        Ok(())
    }

    /// Launch the held projectile along the viewer's heading.
    pub fn throw(
        &mut self,
        tracker: &impl SurfaceTracker,
        physics: &mut impl PhysicsPort,
    ) -> Result<(), Rejection> {
        let invalid = Rejection::InvalidTransition {
            event: "throw",
            phase: self.state.phase,
        };
        if self.state.phase != Phase::AwaitingProjectile || self.state.projectiles_remaining == 0 {
            return Err(invalid);
        }
        let Some(projectile) = self.projectile.take() else {
            return Err(invalid);
        };

        physics.set_mode(projectile.body, BodyMode::Dynamic);
        let impulse = tracker.viewer().forward() * self.config.projectile.impulse;
        physics.apply_impulse(projectile.body, impulse);
        self.spent.push(projectile.body);
        self.state.projectiles_remaining -= 1;
        log::info!(
            "projectile thrown, {} left",
            self.state.projectiles_remaining
        );

        self.schedule
            .after(self.config.timing.settle_delay, self.round, Deferred::Settle);
        self.set_phase(Phase::ProjectileInFlight);
        Ok(())
    }

    /// Score fallen pieces, then run any timers that came due.
    pub fn tick(&mut self, dt: f32, tracker: &impl SurfaceTracker, physics: &mut impl PhysicsPort) {
        self.score_fallen(physics);

        for fired in self.schedule.advance(dt) {
            if fired.round != self.round {
                log::debug!("dropping {:?} from round {}", fired.message, fired.round.0);
                continue;
            }
            match fired.message {
                Deferred::Activate => self.activate(tracker, physics),
                Deferred::Settle => self.settle(tracker, physics),
                Deferred::Verdict => self.verdict(),
            }
        }
    }

    /// Turn a contact into hit notices. Never changes the round.
    pub fn collision(&mut self, a: EntityId, b: EntityId) {
        if a == b {
            return;
        }
        let kind_a = self.kinds.get(&a).copied();
        let kind_b = self.kinds.get(&b).copied();

        if kind_a == Some(BodyKind::Projectile) || kind_b == Some(BodyKind::Projectile) {
            self.notices.push(Notice::ProjectileHit);
        }
        for kind in [kind_a, kind_b].into_iter().flatten() {
            if let BodyKind::Target(target) = kind {
                self.notices.push(Notice::TargetHit { target });
            }
        }
    }

    /// Destroy everything this round created and start a fresh one.
    pub fn reset(&mut self, physics: &mut impl PhysicsPort) {
        if let Some(tower) = self.tower.take() {
            tower.dismantle(physics);
        }
        if let Some(projectile) = self.projectile.take() {
            physics.destroy_body(projectile.body);
        }
        for body in self.spent.drain(..) {
            physics.destroy_body(body);
        }
        self.kinds.clear();
        self.spawn_point = None;
        self.round = self.round.next();

        let previous = self.state.phase;
        self.state = RoundState::new(self.config.projectiles_per_round);
        log::info!("round reset (round {})", self.round.0);
        if previous != Phase::AwaitingPlacement {
            self.notices.push(Notice::PhaseChanged {
                phase: Phase::AwaitingPlacement,
            });
        }
    }

    fn activate(&mut self, tracker: &impl SurfaceTracker, physics: &mut impl PhysicsPort) {
        if self.state.phase != Phase::Armed {
            log::debug!("activation ignored while {}", self.state.phase.name());
            return;
        }
        let Some(tower) = self.tower.as_mut() else {
            log::warn!("armed without a tower");
            return;
        };
        tower.release(physics);
        self.spawn_projectile(tracker, physics);
        self.set_phase(Phase::AwaitingProjectile);
    }

    fn settle(&mut self, tracker: &impl SurfaceTracker, physics: &mut impl PhysicsPort) {
        if self.state.phase != Phase::ProjectileInFlight {
            log::debug!("settle ignored while {}", self.state.phase.name());
            return;
        }
        if self.state.projectiles_remaining > 0 {
            self.spawn_projectile(tracker, physics);
            self.set_phase(Phase::AwaitingProjectile);
        } else {
            self.schedule
                .after(self.config.timing.grace_delay, self.round, Deferred::Verdict);
        }
    }

    fn verdict(&mut self) {
        if self.state.phase != Phase::ProjectileInFlight {
            log::debug!("verdict ignored while {}", self.state.phase.name());
            return;
        }
        let outcome = if self.all_down() {
            Outcome::Won
        } else {
            Outcome::Lost
        };
        self.finish(outcome);
    }

    fn score_fallen(&mut self, physics: &mut impl PhysicsPort) {
        if self.state.phase.is_round_over() {
            return;
        }
        let Some(tower) = self.tower.as_mut() else {
            return;
        };

        for id in tower.collect_fallen(self.config.floor_height, physics) {
            if let Some(target) = tower.targets().get(id.0 as usize) {
                self.kinds.remove(&target.body);
            }
            self.state.score += 1;
            log::info!("target {} down, score {}", id.0, self.state.score);
            self.notices.push(Notice::ScoreChanged {
                score: self.state.score,
            });
        }

        if self.all_down() {
            self.finish(Outcome::Won);
        }
    }

    fn spawn_projectile(&mut self, tracker: &impl SurfaceTracker, physics: &mut impl PhysicsPort) {
        let spec = &self.config.projectile;
        let point = match self.spawn_point {
            Some(point) => point,
            None => {
                let viewer = tracker.viewer();
                let point =
                    viewer.position + viewer.forward() * spec.forward_offset + Vec3::Y * spec.lift;
                self.spawn_point = Some(point);
                point
            }
        };

        let body = physics.create_body(&BodySpec {
            kind: BodyKind::Projectile,
            shape: spec.collider(),
            mode: BodyMode::Kinematic,
            position: point,
            density: spec.density,
        });
        self.kinds.insert(body, BodyKind::Projectile);
        self.projectile = Some(Projectile { body });
    }

    fn finish(&mut self, outcome: Outcome) {
        self.set_phase(Phase::RoundOver { outcome });
        log::info!(
            "round over: {:?} with {} of {}",
            outcome,
            self.state.score,
            self.win_threshold()
        );
        self.notices.push(Notice::RoundOver { outcome });
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.state.phase == phase {
            return;
        }
        log::info!("{} -> {}", self.state.phase.name(), phase.name());
        self.state.phase = phase;
        self.notices.push(Notice::PhaseChanged { phase });
    }

    fn reject(&mut self, rejection: Rejection) {
        if !rejection.is_user_facing() {
            log::debug!("{}", rejection);
            return;
        }
        log::info!("{}", rejection);
        let notice = match rejection {
            Rejection::PlacementRejected => Notice::PlacementRejected,
            Rejection::AlreadyPlaced => Notice::AlreadyPlaced,
            Rejection::InvalidTransition { .. } => return,
        };
        self.notices.push(notice);
    }

    fn all_down(&self) -> bool {
        let threshold = self.win_threshold();
        threshold > 0 && self.state.score as usize >= threshold
    }

    // -- Queries --

    /// Score needed to win: the number of pieces in the tower.
    pub fn win_threshold(&self) -> usize {
        self.tower.as_ref().map_or(0, Tower::target_count)
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn projectiles_remaining(&self) -> u32 {
        self.state.projectiles_remaining
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.state.outcome()
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    pub fn round(&self) -> RoundToken {
        self.round
    }

    pub fn tower(&self) -> Option<&Tower> {
        self.tower.as_ref()
    }

    /// The held projectile, if one is waiting to be thrown.
    pub fn projectile(&self) -> Option<Projectile> {
        self.projectile
    }

    pub fn spent_projectiles(&self) -> &[EntityId] {
        &self.spent
    }

    pub fn spawn_point(&self) -> Option<Vec3> {
        self.spawn_point
    }

    /// What a body is, if this round created it and it is still live.
    pub fn kind_of(&self, body: EntityId) -> Option<BodyKind> {
        self.kinds.get(&body).copied()
    }

    /// Targets whose bodies are still in the world.
    pub fn live_targets(&self) -> usize {
        self.tower.as_ref().map_or(0, |t| t.standing().count())
    }

    /// Held plus spent projectiles still in the world.
    pub fn live_projectiles(&self) -> usize {
        self.spent.len() + usize::from(self.projectile.is_some())
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
