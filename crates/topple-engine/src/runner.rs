use crate::api::game::{EngineContext, Game, GameConfig};
use crate::api::types::{GameEvent, SoundEvent};
use crate::core::time::FixedTimestep;
use crate::input::queue::{InputEvent, InputQueue};

/// Headless game runner that wires up the engine loop.
///
/// Platform glue owns one runner per game, forwards input with
/// [`push_input`](Self::push_input), calls [`tick`](Self::tick) with the frame
/// delta and then reads back the frame's events and sounds.
pub struct GameRunner<G: Game> {
    game: G,
    ctx: EngineContext,
    input: InputQueue,
    timestep: FixedTimestep,
    config: GameConfig,
    initialized: bool,
    frame: u64,
}

impl<G: Game> GameRunner<G> {
    pub fn new(game: G) -> Self {
        let config = game.config();
        let timestep = FixedTimestep::with_max_steps(config.fixed_dt, config.max_steps_per_frame);
        let ctx = EngineContext::from_config(&config);

        Self {
            game,
            ctx,
            input: InputQueue::new(),
            timestep,
            config,
            initialized: false,
            frame: 0,
        }
    }

    /// Initialize the game. Call once after construction.
    pub fn init(&mut self) {
        self.game.init(&mut self.ctx);
        self.initialized = true;
        log::info!("runner initialized (fixed_dt={:.4}s)", self.config.fixed_dt);
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Run one frame: as many fixed game/physics steps as the frame time buys.
    /// Input is delivered to the first fixed step only, then dropped.
    pub fn tick(&mut self, dt: f32) {
        if !self.initialized {
            return;
        }

        self.ctx.clear_frame_data();
        self.frame += 1;

        let steps = self.timestep.accumulate(dt);
        for _ in 0..steps {
            self.game.update(&mut self.ctx, &self.input);
            self.input.drain();
            #[cfg(feature = "physics")]
            self.ctx.step_physics();
        }
    }

    /// Advance by exactly `steps` fixed steps, regardless of wall time.
    pub fn run_steps(&mut self, steps: u32) {
        for _ in 0..steps {
            self.tick(self.config.fixed_dt);
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    /// Game events emitted during the last frame.
    pub fn events(&self) -> &[GameEvent] {
        &self.ctx.events
    }

    /// Sound events emitted during the last frame.
    pub fn sounds(&self) -> &[SoundEvent] {
        &self.ctx.sounds
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn elapsed(&self) -> f64 {
        self.timestep.elapsed()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingGame {
        inits: u32,
        updates: u32,
        taps_seen: u32,
    }

    impl Game for CountingGame {
        fn init(&mut self, _ctx: &mut EngineContext) {
            self.inits += 1;
        }

        fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
            self.updates += 1;
            self.taps_seen += input.len() as u32;
            ctx.emit_event(GameEvent::new(1.0, self.updates as f32));
        }
    }

    #[test]
    fn tick_before_init_is_ignored() {
        let mut runner = GameRunner::new(CountingGame::default());
        runner.tick(1.0);
        assert_eq!(runner.game().updates, 0);
    }

    #[test]
    fn input_reaches_only_first_step() {
        let mut runner = GameRunner::new(CountingGame::default());
        runner.init();
        runner.push_input(InputEvent::Tap { x: 1.0, y: 2.0 });
        // Three fixed steps in one frame.
        runner.tick(3.0 / 60.0 + 1e-4);
        assert_eq!(runner.game().updates, 3);
        assert_eq!(runner.game().taps_seen, 1);
        assert_eq!(runner.events().len(), 3);
    }

    #[test]
    fn run_steps_advances_fixed_time() {
        let mut runner = GameRunner::new(CountingGame::default());
        runner.init();
        runner.run_steps(6);
        assert_eq!(runner.frame(), 6);
        assert!(runner.game().updates >= 5);
        assert!((runner.elapsed() - runner.game().updates as f64 / 60.0).abs() < 1e-6);
    }
}
