//! Environmental hazards on a fixed cycle
//!
//! Every [`WEATHER_CYCLE`] frames the sky clears; at [`WEATHER_ONSET`] into
//! the cycle one of three hazards rolls in. A live boss keeps the sky clear.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GameState, Hazard, HazardKind, Notice, Player, palette};
use crate::consts::{WEATHER_CYCLE, WEATHER_ONSET};

/// Acid rain damage cadence
pub const ACID_INTERVAL: u64 = 12;
pub const ACID_DAMAGE: f32 = 1.0;
/// Frames between storm strikes
pub const STORM_INTERVAL: u64 = 60;
/// Delay before the lava floor becomes dangerous
pub const LAVA_WARMUP: u64 = 60;
pub const LAVA_HEIGHT: f32 = 110.0;
/// Feet must sink this far into the band before it burns
pub const LAVA_GRACE: f32 = 10.0;
pub const LAVA_INTERVAL: u64 = 45;
pub const LAVA_DAMAGE: f32 = 60.0;

/// Current weather
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Weather {
    #[default]
    Clear,
    AcidRain,
    Storm,
    /// Lava floor; `since` is the frame it started rising
    Lava { since: u64 },
}

impl Weather {
    pub fn label(&self) -> &'static str {
        match self {
            Weather::Clear => "CLEAR",
            Weather::AcidRain => "ACID_RAIN",
            Weather::Storm => "THUNDERSTORM",
            Weather::Lava { .. } => "LAVA",
        }
    }

    /// Whether the lava band is up and burning at `frame`
    pub fn lava_active(&self, frame: u64) -> bool {
        match self {
            Weather::Lava { since } => frame.saturating_sub(*since) > LAVA_WARMUP,
            Weather::Clear | Weather::AcidRain | Weather::Storm => false,
        }
    }
}

/// Top of the lava band above the floor line
pub fn lava_top(floor_y: f32) -> f32 {
    floor_y - LAVA_HEIGHT
}

/// Below a platform: center inside its span and top edge beneath it
fn sheltered(state: &GameState) -> bool {
    let center_x = state.player.center().x;
    let top = state.player.pos.y;
    state
        .platforms
        .iter()
        .any(|p| center_x > p.rect.left() && center_x < p.rect.right() && top > p.rect.top())
}

fn in_lava(player: &Player, floor_y: f32) -> bool {
    player.feet() > lava_top(floor_y) + LAVA_GRACE
}

/// Switch weather, dropping any pending strikes
pub fn set_weather(state: &mut GameState, weather: Weather) {
    if state.weather == weather {
        return;
    }
    state.weather = weather;
    state.hazards.retain(|h| h.kind != HazardKind::Lightning);
    state.events.push(GameEvent::WeatherChanged { weather });
    match weather {
        Weather::Clear => state.notify(Notice::WeatherCleared),
        Weather::AcidRain | Weather::Storm | Weather::Lava { .. } => {
            state.notify(Notice::WeatherWarning(weather))
        }
    }
    log::info!("Weather: {}", weather.label());
}

/// Advance the cycle and apply this frame's weather damage
pub fn update(state: &mut GameState) {
    if state.boss.is_some() {
        set_weather(state, Weather::Clear);
        return;
    }

    let frame = state.frame;
    match frame % WEATHER_CYCLE {
        WEATHER_ONSET => {
            let roll = state.rng.random::<f32>();
            let next = if roll < 0.33 {
                Weather::AcidRain
            } else if roll < 0.66 {
                Weather::Storm
            } else {
                Weather::Lava { since: frame }
            };
            set_weather(state, next);
        }
        0 => set_weather(state, Weather::Clear),
        _ => {}
    }

    match state.weather {
        Weather::Clear => {}
        Weather::AcidRain => {
            if frame % ACID_INTERVAL == 0 && !sheltered(state) {
                state.player.take_damage(ACID_DAMAGE);
                let top = state.player.center().with_y(state.player.pos.y);
                state.fx.burst(top, 1, palette::ACID);
            }
        }
        Weather::Storm => {
            if frame % STORM_INTERVAL == 0 {
                let offset = 10.0 + state.rng.random::<f32>() * 10.0;
                let dir = if state.rng.random_bool(0.5) { -1.0 } else { 1.0 };
                let width = state.viewport.width;
                let x = (state.player.center().x + offset * dir).clamp(20.0, (width - 20.0).max(20.0));
                state.hazards.push(Hazard::lightning(x, state.viewport.height));
            }
        }
        Weather::Lava { .. } => {
            if state.weather.lava_active(frame)
                && in_lava(&state.player, state.viewport.floor_y)
                && frame % LAVA_INTERVAL == 0
            {
                state.player.take_damage(LAVA_DAMAGE);
                let feet = state.player.center().with_y(state.player.feet());
                state.fx.burst(feet, 8, palette::FIRE);
            }
        }
    }
}
