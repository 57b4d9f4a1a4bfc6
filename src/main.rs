//! Headless demo run
//!
//! Plays one run on autopilot as fast as the CPU allows and logs the result.
//!
//! Usage: `soldier-frontline [settings.json] [scores.json]`

use soldier_frontline::renderer::NullRenderer;
use soldier_frontline::sim::TickInput;
use soldier_frontline::{LogHud, Runner, ScoreFile, ScoreStore, Settings};

/// Give up after this many simulated minutes
const MAX_MINUTES: u64 = 30;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load_or_default(path),
        None => Settings::default(),
    };
    let scores = ScoreFile::open(args.next().unwrap_or_else(|| "scores.json".to_string()));

    let seed = settings.seed.unwrap_or_else(rand::random);
    log::info!("Soldier Frontline (headless) starting, seed {}", seed);

    let mut runner = Runner::new(&settings, seed, LogHud::default(), NullRenderer, scores);
    runner.set_input(TickInput {
        idle_mode: true,
        ..Default::default()
    });

    // Feed exactly one tick's worth of time per frame
    let frame_ms = 1000.0 / f64::from(settings.tick_hz.max(1));
    let limit = MAX_MINUTES * 60 * u64::from(settings.tick_hz);
    while !runner.is_over() && runner.state().frame < limit {
        runner.frame(frame_ms);
    }

    let state = runner.state();
    if runner.is_over() {
        log::info!(
            "Run over after {} ticks: score {}, wave {}, best {}",
            state.frame,
            state.score,
            state.wave,
            runner.scores().best()
        );
    } else {
        log::warn!(
            "Stopped after {} minutes: score {}, wave {}",
            MAX_MINUTES,
            state.score,
            state.wave
        );
    }
}
