//! Real-time driver
//!
//! Turns wall-clock frames into fixed simulation ticks and hands the
//! results to the host's collaborators: the HUD, the renderer and the score
//! store.

use crate::highscores::ScoreStore;
use crate::hud::HudSnapshot;
use crate::renderer::{RenderSink, Scene};
use crate::settings::Settings;
use crate::sim::state::{GameEvent, GamePhase, GameState, Notice, Viewport};
use crate::sim::tick::{TickInput, tick};

/// Fixed-timestep accumulator
#[derive(Debug, Clone, PartialEq)]
pub struct FixedStep {
    /// Unconsumed real time in milliseconds
    accumulator: f64,
    /// Milliseconds per tick
    interval: f64,
    max_substeps: u32,
}

impl FixedStep {
    pub fn new(tick_hz: u32, max_substeps: u32) -> Self {
        Self {
            accumulator: 0.0,
            interval: 1000.0 / f64::from(tick_hz.max(1)),
            max_substeps: max_substeps.max(1),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.tick_hz, settings.max_substeps)
    }

    /// Add `elapsed_ms` of real time and return how many ticks to run.
    /// Anything beyond `max_substeps` ticks is dropped so a stall never
    /// turns into a burst of catch-up frames.
    pub fn advance(&mut self, elapsed_ms: f64) -> u32 {
        self.accumulator += elapsed_ms.max(0.0);

        let mut ticks = 0;
        while self.accumulator >= self.interval && ticks < self.max_substeps {
            self.accumulator -= self.interval;
            ticks += 1;
        }

        if self.accumulator >= self.interval {
            let dropped = (self.accumulator / self.interval).floor();
            log::debug!("Dropping {} ticks of backlog", dropped);
            self.accumulator %= self.interval;
        }
        ticks
    }

    /// Leftover time as a fraction of a tick (for interpolation)
    pub fn alpha(&self) -> f64 {
        self.accumulator / self.interval
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// Consumer of HUD updates and per-frame events
pub trait HudSink {
    fn update(&mut self, hud: &HudSnapshot, events: &[GameEvent]);
}

/// HUD that writes notices to the log (headless runs)
#[derive(Debug, Default)]
pub struct LogHud {
    last_wave: u32,
}

impl HudSink for LogHud {
    fn update(&mut self, hud: &HudSnapshot, events: &[GameEvent]) {
        for event in events {
            if let GameEvent::Notify(notice) = event {
                match notice {
                    Notice::BossSpawned
                    | Notice::BossEngaged
                    | Notice::WeatherWarning(_)
                    | Notice::WeatherCleared => {
                        log::info!("{}", notice.text())
                    }
                    _ => log::debug!("{}", notice.text()),
                }
            }
        }
        if hud.wave != self.last_wave {
            self.last_wave = hud.wave;
            log::info!("{} | score {} | hp {}", hud.wave_label, hud.score, hud.hp);
        }
    }
}

/// One run wired to its collaborators
pub struct Runner<H, R, S> {
    state: GameState,
    clock: FixedStep,
    input: TickInput,
    events: Vec<GameEvent>,
    submitted: bool,
    hud: H,
    renderer: R,
    scores: S,
}

impl<H: HudSink, R: RenderSink, S: ScoreStore> Runner<H, R, S> {
    pub fn new(settings: &Settings, seed: u64, hud: H, renderer: R, scores: S) -> Self {
        let mut state = GameState::from_settings(settings, seed);
        // Opening wave announcement goes out with the first frame
        let events = std::mem::take(&mut state.events);
        Self {
            state,
            clock: FixedStep::from_settings(settings),
            input: TickInput::default(),
            events,
            submitted: false,
            hud,
            renderer,
            scores,
        }
    }

    /// Input used for every tick until replaced
    pub fn set_input(&mut self, input: TickInput) {
        self.input = input;
    }

    /// Handle one real frame. Returns the number of ticks simulated.
    pub fn frame(&mut self, elapsed_ms: f64) -> u32 {
        let ticks = self.clock.advance(elapsed_ms);
        for _ in 0..ticks {
            tick(&mut self.state, &self.input);
            self.events.append(&mut self.state.events);
        }

        if !self.submitted {
            let ended = self.events.iter().find_map(|e| match e {
                GameEvent::RunEnded { score, wave } => Some((*score, *wave)),
                _ => None,
            });
            if let Some((score, wave)) = ended {
                self.submitted = true;
                if self.scores.submit(score, wave) {
                    log::info!("New best score: {}", score);
                }
            }
        }

        self.hud
            .update(&HudSnapshot::capture(&self.state), &self.events);
        self.renderer.draw(&Scene::capture(&self.state));
        self.events.clear();
        ticks
    }

    /// Throw the run away and start over with `seed`
    pub fn restart(&mut self, seed: u64) {
        let viewport = self.state.viewport;
        let mut state = GameState::with_tuning(seed, viewport, self.state.tuning.clone());
        state.fx.set_cap(self.state.fx.cap());
        state.tick_hz = self.state.tick_hz;
        self.events = std::mem::take(&mut state.events);
        self.state = state;
        self.clock.reset();
        self.input = TickInput::default();
        self.submitted = false;
    }

    /// Host canvas changed size
    pub fn resize(&mut self, viewport: Viewport) {
        self.state.resize(viewport);
    }

    pub fn is_over(&self) -> bool {
        self.state.phase == GamePhase::GameOver
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn hud(&self) -> &H {
        &self.hud
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn scores(&self) -> &S {
        &self.scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::HighScores;

    #[derive(Default)]
    struct RecordingHud {
        frames: usize,
        events: Vec<GameEvent>,
        last: Option<HudSnapshot>,
    }

    impl HudSink for RecordingHud {
        fn update(&mut self, hud: &HudSnapshot, events: &[GameEvent]) {
            self.frames += 1;
            self.events.extend_from_slice(events);
            self.last = Some(hud.clone());
        }
    }

    #[derive(Default)]
    struct CountingRenderer {
        draws: usize,
        last_frame: u64,
    }

    impl RenderSink for CountingRenderer {
        fn draw(&mut self, scene: &Scene) {
            self.draws += 1;
            self.last_frame = scene.frame;
        }
    }

    #[derive(Default)]
    struct CountingStore {
        inner: HighScores,
        submissions: usize,
    }

    impl ScoreStore for CountingStore {
        fn best(&self) -> u64 {
            self.inner.best()
        }

        fn submit(&mut self, score: u64, wave: u32) -> bool {
            self.submissions += 1;
            self.inner.submit(score, wave)
        }
    }

    fn settings() -> Settings {
        // 20 ms ticks keep the arithmetic exact
        Settings {
            tick_hz: 50,
            max_substeps: 4,
            ..Settings::default()
        }
    }

    fn runner() -> Runner<RecordingHud, CountingRenderer, CountingStore> {
        Runner::new(
            &settings(),
            42,
            RecordingHud::default(),
            CountingRenderer::default(),
            CountingStore::default(),
        )
    }

    #[test]
    fn test_fixed_step_carries_remainder() {
        let mut clock = FixedStep::new(50, 4);
        assert_eq!(clock.advance(10.0), 0);
        assert_eq!(clock.advance(15.0), 1);
        assert!((clock.alpha() - 0.25).abs() < 1e-9);
        assert_eq!(clock.advance(15.0), 1);
    }

    #[test]
    fn test_fixed_step_drops_backlog() {
        let mut clock = FixedStep::new(50, 4);
        assert_eq!(clock.advance(1010.0), 4);
        assert!((clock.alpha() - 0.5).abs() < 1e-9);
        assert_eq!(clock.advance(10.0), 1);
    }

    #[test]
    fn test_negative_elapsed_is_ignored() {
        let mut clock = FixedStep::new(50, 4);
        assert_eq!(clock.advance(-100.0), 0);
        assert_eq!(clock.advance(20.0), 1);
    }

    #[test]
    fn test_frame_feeds_collaborators() {
        let mut r = runner();
        assert_eq!(r.frame(40.0), 2);
        assert_eq!(r.state().frame, 2);
        assert_eq!(r.hud().frames, 1);
        assert_eq!(r.renderer().draws, 1);
        assert_eq!(r.renderer().last_frame, 2);

        // Idle frame still refreshes the projections
        assert_eq!(r.frame(5.0), 0);
        assert_eq!(r.hud().frames, 2);
        assert_eq!(r.renderer().draws, 2);
    }

    #[test]
    fn test_run_end_submitted_once() {
        let mut r = runner();
        r.state_mut().score = 700;
        r.state_mut().player.hp = 0.0;
        r.frame(20.0);
        assert!(r.is_over());
        assert_eq!(r.scores().submissions, 1);
        assert_eq!(r.scores().best(), 700);
        assert!(
            r.hud()
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::RunEnded { score: 700, .. }))
        );

        for _ in 0..10 {
            r.frame(20.0);
        }
        assert_eq!(r.scores().submissions, 1);
        assert!(r.hud().last.as_ref().is_some_and(|h| h.game_over));
    }

    #[test]
    fn test_restart_allows_another_submission() {
        let mut r = runner();
        r.state_mut().player.hp = 0.0;
        r.frame(20.0);
        r.restart(7);
        assert!(!r.is_over());
        assert_eq!(r.state().frame, 0);
        r.state_mut().player.hp = 0.0;
        r.frame(20.0);
        assert_eq!(r.scores().submissions, 2);
    }

    fn wave_starts(hud: &RecordingHud) -> usize {
        hud.events
            .iter()
            .filter(|e| matches!(e, GameEvent::WaveStarted { wave: 1 }))
            .count()
    }

    #[test]
    fn test_opening_wave_reaches_hud() {
        let mut r = runner();
        r.frame(20.0);
        assert_eq!(wave_starts(r.hud()), 1);
        r.frame(20.0);
        assert_eq!(wave_starts(r.hud()), 1);

        r.restart(9);
        assert_eq!(r.state().tick_hz, 50);
        r.frame(5.0);
        assert_eq!(wave_starts(r.hud()), 2);
    }
}
