//! Drawable snapshot of the field
//!
//! Everything a 2D backend needs to draw one frame, with the state flags
//! (stunned, poisoned, shielded, boss sub-state) already resolved.

use glam::Vec2;
use serde::Serialize;

use crate::sim::boss::{BURST_RADIUS, Beam, BossPhase, TremorStage, Ultimate};
use crate::sim::enemy::EnemyKind;
use crate::sim::geom::Rect;
use crate::sim::state::{GameState, Hazard, HazardKind, HazardStage, ItemKind};
use crate::sim::weather::{self, Weather};

/// Convert 0xRRGGBB to linear-free RGBA floats for GPU-style backends
pub fn rgba(color: u32, alpha: f32) -> [f32; 4] {
    let r = ((color >> 16) & 0xff) as f32 / 255.0;
    let g = ((color >> 8) & 0xff) as f32 / 255.0;
    let b = (color & 0xff) as f32 / 255.0;
    [r, g, b, alpha.clamp(0.0, 1.0)]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSprite {
    pub rect: Rect,
    pub crouching: bool,
    pub poisoned: bool,
    pub shielded: bool,
    /// Crosshair position
    pub aim: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnemySprite {
    pub rect: Rect,
    pub kind: EnemyKind,
    pub color: u32,
    pub shielded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BossSprite {
    pub rect: Rect,
    pub label: &'static str,
    pub color: u32,
    /// Sub-state name for overlays
    pub state: &'static str,
    pub stunned: bool,
    /// Burst ring drawn around the center while overheating
    pub burst_radius: Option<f32>,
    /// Charge bar fill 0-1, hidden while the ultimate runs
    pub charge: Option<f32>,
    pub beams: Vec<Beam>,
    /// Where the next tremor spike will erupt
    pub telegraph: Option<Rect>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulletSprite {
    pub pos: Vec2,
    pub radius: f32,
    pub hostile: bool,
    pub poison: bool,
    pub explosive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSprite {
    pub rect: Rect,
    pub kind: ItemKind,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HazardSprite {
    pub rect: Rect,
    pub kind: HazardKind,
    /// Telegraph only
    pub warning: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticleSprite {
    pub pos: Vec2,
    pub color: u32,
    pub alpha: f32,
}

/// Full-screen weather effect
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherOverlay {
    pub label: &'static str,
    /// Burning band once lava is up
    pub lava: Option<Rect>,
}

/// One frame's drawable content
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub frame: u64,
    pub width: f32,
    pub height: f32,
    pub floor_y: f32,
    pub platforms: Vec<Rect>,
    pub player: PlayerSprite,
    pub enemies: Vec<EnemySprite>,
    pub boss: Option<BossSprite>,
    pub bullets: Vec<BulletSprite>,
    pub items: Vec<ItemSprite>,
    pub hazards: Vec<HazardSprite>,
    pub particles: Vec<ParticleSprite>,
    pub weather: WeatherOverlay,
}

impl Scene {
    pub fn capture(state: &GameState) -> Self {
        let vp = state.viewport;
        let p = &state.player;

        let player = PlayerSprite {
            rect: p.rect(),
            crouching: p.crouching,
            poisoned: p.poison_timer > 0,
            shielded: p.shield > 0.0,
            aim: state.prev_input.aim,
        };

        let enemies = state
            .enemies
            .iter()
            .map(|e| EnemySprite {
                rect: e.rect(),
                kind: e.kind,
                color: e.kind.profile().color,
                shielded: e.shield > 0.0,
            })
            .collect();

        let boss = state.boss.as_ref().map(|b| {
            let telegraph = match b.phase {
                BossPhase::Ultimate(Ultimate::Tremor {
                    stage: TremorStage::Warn { x },
                    ..
                }) => Some(Rect::new(
                    x,
                    vp.floor_y - Hazard::SPIKE_HEIGHT,
                    Hazard::SPIKE_WIDTH,
                    Hazard::SPIKE_HEIGHT,
                )),
                BossPhase::Ultimate(_) | BossPhase::Enter | BossPhase::Action { .. } => None,
            };
            let charge = match b.phase {
                BossPhase::Ultimate(_) => None,
                BossPhase::Enter | BossPhase::Action { .. } => {
                    Some(b.ult_charge as f32 / state.tuning.boss_charge_cap.max(1) as f32)
                }
            };
            BossSprite {
                rect: b.rect(),
                label: b.kind.label(),
                color: b.color,
                state: b.state_label(),
                stunned: b.is_stunned(),
                burst_radius: b.is_overheating().then_some(BURST_RADIUS),
                charge,
                beams: b.beams(&state.platforms),
                telegraph,
            }
        });

        let friendly = state.player_bullets.iter().map(|b| (b, false));
        let hostile = state.enemy_bullets.iter().map(|b| (b, true));
        let bullets = friendly
            .chain(hostile)
            .filter(|(b, _)| b.active)
            .map(|(b, hostile)| BulletSprite {
                pos: b.pos,
                radius: b.radius,
                hostile,
                poison: b.poison,
                explosive: b.explosive,
            })
            .collect();

        let items = state
            .items
            .iter()
            .map(|i| ItemSprite {
                rect: i.rect(),
                kind: i.kind,
                label: i.kind.label(),
            })
            .collect();

        let hazards = state
            .hazards
            .iter()
            .map(|h| HazardSprite {
                rect: h.rect(vp.floor_y),
                kind: h.kind,
                warning: h.stage == HazardStage::Warn,
            })
            .collect();

        let particles = state
            .fx
            .particles
            .iter()
            .map(|pt| ParticleSprite {
                pos: pt.pos,
                color: pt.color,
                alpha: pt.life.clamp(0.0, 1.0),
            })
            .collect();

        let lava = match state.weather {
            Weather::Lava { .. } if state.weather.lava_active(state.frame) => {
                let top = weather::lava_top(vp.floor_y);
                Some(Rect::new(0.0, top, vp.width, weather::LAVA_HEIGHT))
            }
            Weather::Lava { .. } | Weather::Clear | Weather::AcidRain | Weather::Storm => None,
        };

        Self {
            frame: state.frame,
            width: vp.width,
            height: vp.height,
            floor_y: vp.floor_y,
            platforms: state.platforms.iter().map(|pl| pl.rect).collect(),
            player,
            enemies,
            boss,
            bullets,
            items,
            hazards,
            particles,
            weather: WeatherOverlay {
                label: state.weather.label(),
                lava,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::boss::{BEAM_CHARGE_FRAMES, BeamStage, Boss};
    use crate::sim::state::{Bullet, Platform, Viewport};

    fn state() -> GameState {
        GameState::new(13, Viewport::new(1280.0, 800.0))
    }

    #[test]
    fn test_rgba() {
        assert_eq!(rgba(0xff0000, 1.0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(rgba(0x00ff00, 2.0)[3], 1.0);
    }

    #[test]
    fn test_bullets_tagged_by_owner() {
        let mut s = state();
        s.player_bullets.push(Bullet::new(Vec2::ZERO, Vec2::X, 1.0));
        s.enemy_bullets
            .push(Bullet::new(Vec2::ONE, Vec2::X, 1.0).poisoned());
        let scene = Scene::capture(&s);
        assert_eq!(scene.bullets.len(), 2);
        assert!(!scene.bullets[0].hostile);
        assert!(scene.bullets[1].hostile && scene.bullets[1].poison);
    }

    #[test]
    fn test_locked_beam_drawn_clipped() {
        let mut s = state();
        s.wave = 3;
        let mut boss = Boss::spawn(&s);
        boss.pos = Vec2::new(800.0, 300.0);
        let center = boss.center();
        boss.phase = BossPhase::Ultimate(Ultimate::LockedBeam {
            stage: BeamStage::Charge,
            angle: std::f32::consts::PI,
            timer: BEAM_CHARGE_FRAMES,
        });
        s.boss = Some(boss);
        s.platforms = vec![Platform::new(500.0, center.y - 50.0, 20.0)];
        s.platforms[0].rect.size.y = 100.0;

        let scene = Scene::capture(&s);
        let sprite = scene.boss.unwrap();
        assert_eq!(sprite.beams.len(), 1);
        let beam = sprite.beams[0];
        assert!(!beam.lethal);
        assert!((beam.end.x - 520.0).abs() < 1e-2);
        assert_eq!(sprite.charge, None);
    }

    #[test]
    fn test_lava_band_only_when_active() {
        let mut s = state();
        s.weather = Weather::Lava { since: 0 };
        s.frame = 30;
        assert!(Scene::capture(&s).weather.lava.is_none());
        s.frame = 100;
        let band = Scene::capture(&s).weather.lava.unwrap();
        assert_eq!(band.top(), s.viewport.floor_y - weather::LAVA_HEIGHT);
    }
}
