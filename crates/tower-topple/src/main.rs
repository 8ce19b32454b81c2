//! Headless demo: place a tower, throw every projectile at it and print the
//! notices as JSON lines.
//!
//! ```text
//! tower-topple [--config round.json] [--theme cubes|cans] [--room-scale]
//! ```

use std::{env, fs, path::PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use glam::Vec3;
use topple_engine::{GameRunner, GesturePhase, InputEvent, Viewer};
use tower_topple::{PlaneTracker, PlayMode, RoundConfig, Theme, ToppleGame};

const VIEWPORT: (f32, f32) = (390.0, 844.0);
const EYE: Vec3 = Vec3::new(0.0, 0.0, 0.0);
const SURFACE_HEIGHT: f32 = -0.6;
const LOOK_TARGET: Vec3 = Vec3::new(0.0, -0.6, -1.2);
/// Aim this far above the anchor to make up for the drop in flight.
const AIM_LIFT: f32 = 0.6;
const STEPS_BETWEEN_THROWS: u32 = 90;
const MAX_STEPS: u32 = 1200;

#[derive(Debug)]
struct Cli {
    config: Option<PathBuf>,
    theme: Theme,
    mode: PlayMode,
}

impl Cli {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let mut cli = Cli {
            config: None,
            theme: Theme::Cubes,
            mode: PlayMode::Tabletop,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--config requires a file path"))?;
                    cli.config = Some(PathBuf::from(value));
                }
                "--theme" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--theme requires cubes or cans"))?;
                    cli.theme = match value.as_str() {
                        "cubes" => Theme::Cubes,
                        "cans" => Theme::Cans,
                        other => bail!("unknown theme: {other}"),
                    };
                }
                "--room-scale" => cli.mode = PlayMode::RoomScale,
                other => bail!("unknown argument: {other}"),
            }
        }
        Ok(cli)
    }

    fn round_config(&self) -> Result<RoundConfig> {
        match &self.config {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                RoundConfig::from_json(&json).with_context(|| format!("loading {}", path.display()))
            }
            None => Ok(RoundConfig::preset(self.theme, self.mode)),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse()?;
    let round = cli.round_config()?;

    let mut viewer = Viewer::new(VIEWPORT.0, VIEWPORT.1);
    viewer.look_at(EYE, LOOK_TARGET);
    let tracker = PlaneTracker::new(viewer).with_surface(SURFACE_HEIGHT);

    let mut runner = GameRunner::new(ToppleGame::new(round, tracker));
    runner.init();

    runner.push_input(InputEvent::Tap {
        x: VIEWPORT.0 * 0.5,
        y: VIEWPORT.1 * 0.5,
    });
    runner.run_steps(1);
    let anchor = runner
        .game()
        .coordinator()
        .tower()
        .map(|t| t.anchor())
        .ok_or_else(|| anyhow!("placement gesture did not hit the surface"))?;

    let mut steps = 1;
    while !runner.game().coordinator().phase().is_round_over() && steps < MAX_STEPS {
        if runner.game().coordinator().projectile().is_some() {
            runner
                .game_mut()
                .tracker_mut()
                .look_at(EYE, anchor + Vec3::Y * AIM_LIFT);
            runner.push_input(InputEvent::Pan {
                phase: GesturePhase::Ended,
                x: VIEWPORT.0 * 0.5,
                y: VIEWPORT.1 * 0.5,
            });
        }
        runner.run_steps(STEPS_BETWEEN_THROWS.min(MAX_STEPS - steps));
        steps += STEPS_BETWEEN_THROWS;

        for notice in runner.game_mut().take_notices() {
            println!("{}", serde_json::to_string(&notice)?);
        }
    }

    let coordinator = runner.game().coordinator();
    match coordinator.outcome() {
        Some(outcome) => log::info!(
            "{:?}: {} of {} pieces down after {:.1}s",
            outcome,
            coordinator.score(),
            coordinator.win_threshold(),
            runner.elapsed()
        ),
        None => log::warn!("round still running after {:.1}s", runner.elapsed()),
    }
    Ok(())
}
