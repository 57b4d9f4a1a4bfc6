//! HUD projection
//!
//! A pull-based snapshot of every scalar and string the heads-up display
//! shows. Capturing never mutates the state, so two captures with no tick in
//! between are identical.

use serde::Serialize;

use crate::sim::state::{GamePhase, GameState};

/// Boss health bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BossBar {
    pub label: &'static str,
    pub hp: f32,
    pub max_hp: f32,
    /// 0-100
    pub percent: f32,
    /// "hp/max" with hp rounded up
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    /// Rounded up so a sliver of health never reads as 0
    pub hp: u32,
    pub max_hp: f32,
    /// 0-100
    pub hp_percent: f32,
    pub shield: f32,
    pub score: u64,
    pub gun_level: u32,
    pub damage: f32,
    pub wave: u32,
    /// "WAVE n (ss)" or "BOSS: NAME"
    pub wave_label: String,
    pub wave_seconds_left: u32,
    pub boss: Option<BossBar>,
    /// 0 right after use, 100 when ready
    pub ult_percent: f32,
    /// "READY" or the seconds left, e.g. "12s"
    pub ult_text: String,
    pub poisoned: bool,
    pub weather: &'static str,
    pub paused: bool,
    pub game_over: bool,
}

impl HudSnapshot {
    pub fn capture(state: &GameState) -> Self {
        let p = &state.player;
        let wave_seconds_left = state.wave_timer.div_ceil(state.tick_hz.max(1));

        let boss = state.boss.as_ref().map(|b| BossBar {
            label: b.kind.label(),
            hp: b.hp,
            max_hp: b.max_hp,
            percent: (b.hp / b.max_hp * 100.0).max(0.0),
            text: format!("{}/{}", b.hp.max(0.0).ceil(), b.max_hp),
        });
        let wave_label = match &boss {
            Some(bar) => format!("BOSS: {}", bar.label),
            None => format!("WAVE {} ({}s)", state.wave, wave_seconds_left),
        };

        let ult_text = if p.ult_timer == 0 {
            "READY".to_string()
        } else {
            format!("{}s", p.ult_seconds_left(state.tick_hz))
        };

        Self {
            hp: p.hp.max(0.0).ceil() as u32,
            max_hp: p.max_hp,
            hp_percent: (p.hp / p.max_hp * 100.0).max(0.0),
            shield: p.shield,
            score: state.score,
            gun_level: p.gun_level,
            damage: p.damage,
            wave: state.wave,
            wave_label,
            wave_seconds_left,
            boss,
            ult_percent: p.ult_ready_percent(),
            ult_text,
            poisoned: p.poison_timer > 0,
            weather: state.weather.label(),
            paused: state.phase == GamePhase::Paused,
            game_over: state.phase == GamePhase::GameOver,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::boss::Boss;
    use crate::settings::Settings;
    use crate::sim::state::Viewport;

    fn state() -> GameState {
        GameState::new(6, Viewport::new(1280.0, 800.0))
    }

    #[test]
    fn test_wave_label_counts_down() {
        let mut s = state();
        assert_eq!(HudSnapshot::capture(&s).wave_label, "WAVE 1 (40s)");
        s.wave_timer = 61;
        assert_eq!(HudSnapshot::capture(&s).wave_label, "WAVE 1 (2s)");
    }

    #[test]
    fn test_seconds_follow_configured_tick_rate() {
        let settings = Settings {
            tick_hz: 30,
            ..Settings::default()
        };
        let mut s = GameState::from_settings(&settings, 6);
        s.wave_timer = 61;
        s.player.ult_timer = 90;
        let hud = HudSnapshot::capture(&s);
        assert_eq!(hud.wave_label, "WAVE 1 (3s)");
        assert_eq!(hud.ult_text, "3s");
    }

    #[test]
    fn test_boss_replaces_wave_label() {
        let mut s = state();
        let mut boss = Boss::spawn(&s);
        boss.hp = 1234.5;
        s.boss = Some(boss);
        let hud = HudSnapshot::capture(&s);
        assert_eq!(hud.wave_label, "BOSS: IRON CLAD");
        let bar = hud.boss.unwrap();
        assert_eq!(bar.text, "1235/2500");
        assert!((bar.percent - 49.38).abs() < 1e-3);
    }

    #[test]
    fn test_ult_text() {
        let mut s = state();
        assert_eq!(HudSnapshot::capture(&s).ult_text, "READY");
        s.player.ult_timer = 601;
        let hud = HudSnapshot::capture(&s);
        assert_eq!(hud.ult_text, "11s");
        assert!(hud.ult_percent < 100.0);
    }

    #[test]
    fn test_capture_is_idempotent() {
        let mut s = state();
        s.player.ult_timer = 1000;
        s.player.hp = 42.3;
        let a = HudSnapshot::capture(&s);
        let b = HudSnapshot::capture(&s);
        assert_eq!(a, b);
        assert_eq!(a.hp, 43);
    }
}
