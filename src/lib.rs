//! Soldier Frontline - A side-view survival shooter simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, AI, waves, weather, collisions)
//! - `renderer`: Read-only scene projection for any 2D drawing backend
//! - `hud`: Scalar/string snapshot for HUD consumers
//! - `runner`: Real-time clock gate and collaborator plumbing
//! - `settings` / `tuning`: Run configuration and data-driven game balance

pub mod highscores;
pub mod hud;
pub mod renderer;
pub mod runner;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::{HighScores, ScoreFile, ScoreStore};
pub use hud::HudSnapshot;
pub use renderer::{RenderSink, Scene};
pub use runner::{FixedStep, HudSink, LogHud, Runner};
pub use settings::{ConfigError, QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (ticks per second)
    pub const TICK_HZ: u32 = 60;
    /// Maximum ticks run for a single real frame (prevents spiral of death)
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Downward acceleration applied to the player and falling items (px/tick²)
    pub const GRAVITY: f32 = 0.6;
    /// Distance between the bottom of the viewport and the floor line
    pub const FLOOR_INSET: f32 = 100.0;

    /// Player body
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_STAND_HEIGHT: f32 = 70.0;
    pub const PLAYER_CROUCH_HEIGHT: f32 = 40.0;
    pub const PLAYER_START_X: f32 = 100.0;
    /// Horizontal velocity multiplier per tick with no direction held
    pub const MOVE_DAMPING: f32 = 0.8;
    pub const CROUCH_SPEED_FACTOR: f32 = 0.4;
    /// Feet may sink this far below a platform top and still land on it
    pub const PLATFORM_LANDING_TOLERANCE: f32 = 10.0;
    pub const PLATFORM_HEIGHT: f32 = 20.0;

    /// Bullets
    pub const BULLET_RADIUS: f32 = 5.0;
    pub const EXPLOSIVE_RADIUS: f32 = 10.0;
    pub const SPLASH_RADIUS: f32 = 150.0;
    /// Bullets further than this outside the field are discarded
    pub const OFFSCREEN_MARGIN: f32 = 50.0;

    /// Items
    pub const ITEM_SIZE: f32 = 30.0;
    pub const HEAL_DROP_CHANCE: f64 = 0.15;

    /// Waves
    pub const SUPPLY_DROP_INTERVAL: u64 = 900;
    pub const MAX_HEAL_DROPS_PER_WAVE: u32 = 8;
    pub const MAX_FIRE_RATE_DROPS_PER_WAVE: u32 = 2;

    /// Weather
    pub const WEATHER_CYCLE: u64 = 900;
    pub const WEATHER_ONSET: u64 = 600;

    /// Particles fade by this much each tick
    pub const PARTICLE_FADE: f32 = 0.05;
}

/// Angle (radians) of the direction from `from` to `to`
#[inline]
pub fn angle_to(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Unit vector for an angle, scaled by `speed`
#[inline]
pub fn velocity_at(angle: f32, speed: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin()) * speed
}

/// Velocity of a projectile fired from `from` toward `to` at `speed`
#[inline]
pub fn aim_velocity(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    velocity_at(angle_to(from, to), speed)
}
