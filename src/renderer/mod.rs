//! Rendering boundary
//!
//! The simulation never draws. Each frame the runner captures a [`Scene`]
//! and hands it to whatever backend is plugged in.

pub mod scene;

pub use scene::{
    BossSprite, BulletSprite, EnemySprite, HazardSprite, ItemSprite, ParticleSprite,
    PlayerSprite, Scene, WeatherOverlay, rgba,
};

/// A drawing backend
pub trait RenderSink {
    fn draw(&mut self, scene: &Scene);
}

/// Backend that draws nothing (headless runs)
#[derive(Debug, Default)]
pub struct NullRenderer;

impl RenderSink for NullRenderer {
    fn draw(&mut self, _scene: &Scene) {}
}
