//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (particles draw from their own stream)
//! - Stable iteration order (spawn order, by entity ID)
//! - No rendering or platform dependencies

pub mod boss;
pub mod collision;
pub mod demo;
pub mod enemy;
pub mod geom;
pub mod player;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod weather;

pub use boss::{Beam, Boss, BossKind, BossPhase, Reactor, Ultimate};
pub use collision::{Detonation, damage_boss};
pub use demo::autopilot;
pub use enemy::{Enemy, EnemyKind};
pub use geom::Rect;
pub use spawn::{SpawnBudget, WaveSchedule, init_wave};
pub use state::{
    Bullet, GameEvent, GamePhase, GameState, Hazard, HazardKind, HazardStage, Item, ItemKind,
    Notice, Platform, Player, Viewport,
};
pub use tick::{TickInput, tick};
pub use weather::Weather;
