//! Autopilot for idle/demo mode and soak runs
//!
//! Reads the state and produces the input a cautious player would: aim at
//! the closest threat, keep some distance, hop over incoming fire.

use glam::Vec2;

use super::state::GameState;
use super::tick::TickInput;

/// Preferred horizontal gap to the nearest threat
const KEEP_AWAY: f32 = 250.0;
/// Hostile rounds closer than this trigger a hop
const DODGE_RANGE: f32 = 120.0;

/// Choose this tick's input for the player
pub fn autopilot(state: &GameState) -> TickInput {
    let me = state.player.center();
    let width = state.viewport.width;

    let threat = state.boss.as_ref().map(|b| b.center()).or_else(|| {
        state
            .enemies
            .iter()
            .filter(|e| e.can_fire(width))
            .map(|e| e.center())
            .min_by(|a, b| a.distance_squared(me).total_cmp(&b.distance_squared(me)))
    });

    let incoming = state.enemy_bullets.iter().any(|b| {
        let to_me = me - b.pos;
        to_me.length() < DODGE_RANGE && to_me.dot(b.vel) > 0.0
    });
    let floor_burning = state.weather.lava_active(state.frame);

    let (left, right) = match threat {
        Some(t) if (t.x - me.x).abs() < KEEP_AWAY => {
            // Back off, unless cornered against a wall
            let flee_left = t.x > me.x && me.x > KEEP_AWAY / 2.0;
            let flee_right = !flee_left && me.x < width - KEEP_AWAY / 2.0;
            (flee_left, flee_right)
        }
        Some(_) | None => (false, false),
    };

    // Jump is a level; pulse it so every hop is a fresh press
    let pulse = state.frame % 10 < 5;
    let jump = (incoming || floor_burning) && pulse;

    TickInput {
        left,
        right,
        crouch: false,
        jump,
        fire: threat.is_some(),
        ultimate: threat.is_some() && state.player.ult_timer == 0 && pulse,
        pause: false,
        aim: threat.unwrap_or(me + Vec2::new(200.0, 0.0)),
        idle_mode: true,
    }
}
