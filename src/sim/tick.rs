//! Fixed timestep simulation tick
//!
//! One call advances every subsystem in a fixed order. There is no `dt`:
//! every speed and timer in the simulation is expressed per tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{self, Detonation};
use super::state::{GameEvent, GamePhase, GameState};
use super::{boss, demo, enemy, player, spawn, weather};

/// Input snapshot for a single tick (deterministic)
///
/// Buttons are levels; the simulation derives press edges by comparing with
/// the previous tick's snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub crouch: bool,
    pub jump: bool,
    /// Fire held
    pub fire: bool,
    pub ultimate: bool,
    /// Pause toggle
    pub pause: bool,
    /// Aim target in world coordinates
    pub aim: Vec2,
    /// Idle/demo mode - the autopilot plays the game
    pub idle_mode: bool,
}

/// Advance the game state by one tick
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.events.clear();
    state.player.hp_lost_this_tick = 0.0;

    // Handle pause toggle on the press edge
    if input.pause && !state.prev_input.pause {
        match state.phase {
            GamePhase::Playing => state.phase = GamePhase::Paused,
            GamePhase::Paused => state.phase = GamePhase::Playing,
            GamePhase::GameOver => {}
        }
    }

    // Don't tick if paused or game over
    match state.phase {
        GamePhase::Paused | GamePhase::GameOver => {
            state.prev_input = input.clone();
            return;
        }
        GamePhase::Playing => {}
    }

    let input = if input.idle_mode {
        TickInput {
            pause: input.pause,
            idle_mode: true,
            ..demo::autopilot(state)
        }
    } else {
        input.clone()
    };

    state.frame += 1;
    spawn::advance_wave_timer(state);

    player::update(state, &input);

    let mut detonations = Vec::new();
    let viewport = state.viewport;
    for b in &mut state.player_bullets {
        if let Some(pos) = b.update(&viewport) {
            detonations.push(Detonation {
                pos,
                damage: b.damage,
            });
        }
    }
    for b in &mut state.enemy_bullets {
        b.update(&viewport);
    }

    enemy::update_all(state);
    enemy::run_deferred(state);

    let floor_y = viewport.floor_y;
    for item in &mut state.items {
        item.update(floor_y);
    }
    state.fx.update();

    if state.boss.is_some() {
        boss::update(state);
    } else {
        spawn::spawn_enemies(state);
    }
    spawn::special_events(state);
    weather::update(state);

    let player = &mut state.player;
    state.hazards.retain_mut(|h| h.update(player, floor_y));

    collision::resolve(state, detonations);

    state.player_bullets.retain(|b| b.active);
    state.enemy_bullets.retain(|b| b.active);

    let lost = state.player.hp_lost_this_tick;
    if lost > 0.0 {
        state.events.push(GameEvent::PlayerDamaged { amount: lost });
    }

    if !state.player.is_alive() {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::RunEnded {
            score: state.score,
            wave: state.wave,
        });
        log::info!(
            "Run ended at frame {}: score {} on wave {}",
            state.frame,
            state.score,
            state.wave
        );
    }

    state.prev_input = input;
}
