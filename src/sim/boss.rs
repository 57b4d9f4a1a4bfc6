//! Boss archetypes and their state machine
//!
//! A boss slides in ([`BossPhase::Enter`]), then cycles through randomly
//! picked actions while charging its ultimate. A full charge runs the
//! archetype's scripted [`Ultimate`] to completion before the picker resumes.
//! IronClad also carries a reactor that overheats after enough hits, bursts,
//! and leaves the boss stunned.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geom::{Rect, clip_ray, segment_hits_rect};
use super::state::{Bullet, GameState, Hazard, Notice, Platform, palette};
use crate::{angle_to, velocity_at};

/// Horizontal slide speed while entering
pub const ENTRY_SPEED: f32 = 2.0;
/// Frames between volleys while attacking
pub const ATTACK_CADENCE: u64 = 30;
/// Distance kept from the field edges while moving
pub const EDGE_MARGIN: f32 = 50.0;
/// Height of the resting line above the floor
pub const HOVER_GAP: f32 = 50.0;

/// IronClad hit cap while its reactor is running
pub const ARMOR_CAP: f32 = 20.0;
/// Flat damage every hit deals to a stunned IronClad
pub const STUNNED_HIT: f32 = 50.0;
pub const OVERHEAT_HITS: u32 = 30;
pub const OVERHEAT_FRAMES: u32 = 120;
pub const BURST_RADIUS: f32 = 200.0;
pub const BURST_DAMAGE: f32 = 9999.0;
pub const STUN_FRAMES: u32 = 300;

pub const TREMOR_WARN_FRAMES: u32 = 60;
pub const TREMOR_COOLDOWN_FRAMES: u32 = 120;
pub const TREMOR_SPIKES: u32 = 3;

pub const WINDMILL_FRAMES: u32 = 300;
pub const WINDMILL_BEAMS: usize = 5;
pub const WINDMILL_SPIN: f32 = 0.03;
/// Beams only bite every this many frames
pub const WINDMILL_CADENCE: u64 = 6;
pub const WINDMILL_DAMAGE: f32 = 1.0;

pub const BEAM_CHARGE_FRAMES: u32 = 90;
pub const BEAM_LINGER_FRAMES: u32 = 30;
/// Beams start this far out from the boss center
pub const BEAM_START_OFFSET: f32 = 10.0;
pub const BEAM_RANGE: f32 = 1000.0;

/// IronClad reactor state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reactor {
    Normal { hits: u32 },
    /// Counting down to the burst; the boss does nothing else
    Overheating { timer: u32 },
    /// Defenseless; every hit deals [`STUNNED_HIT`]
    Stunned { timer: u32 },
}

/// Boss archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossKind {
    /// Heavy walker with ground tremors and a reactor
    IronClad(Reactor),
    /// Fast flyer with the rotating laser windmill
    Viper,
    /// Orb with the locked targeting beam
    Nexus,
}

impl BossKind {
    /// Archetype for `wave` (cycles IronClad, Viper, Nexus)
    pub fn for_wave(wave: u32) -> Self {
        match wave % 3 {
            1 => BossKind::IronClad(Reactor::Normal { hits: 0 }),
            2 => BossKind::Viper,
            _ => BossKind::Nexus,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BossKind::IronClad(_) => "IRON CLAD",
            BossKind::Viper => "VIPER",
            BossKind::Nexus => "NEXUS",
        }
    }

    /// (size, speed, color)
    fn frame(&self) -> (Vec2, f32, u32) {
        match self {
            BossKind::IronClad(_) => (Vec2::new(200.0, 150.0), 1.0, 0x2e4053),
            BossKind::Viper => (Vec2::new(120.0, 80.0), 4.0, 0xc0392b),
            BossKind::Nexus => (Vec2::new(140.0, 140.0), 2.0, 0x8e44ad),
        }
    }
}

/// What the boss does between ultimates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Move,
    Attack,
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TremorStage {
    /// Telegraph under the player; the spike erupts wherever they stand at 0
    Warn { x: f32 },
    Cooldown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BeamStage {
    /// Warning line shown, beam not yet fired
    Charge,
    /// Beam fired, lingering for display
    Linger,
}

/// Scripted ultimate, one per archetype
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Ultimate {
    Tremor {
        stage: TremorStage,
        timer: u32,
        /// Spikes still to raise, including the one being telegraphed
        remaining: u32,
    },
    Windmill {
        angle: f32,
        timer: u32,
    },
    LockedBeam {
        stage: BeamStage,
        /// Aimed once, on entry
        angle: f32,
        timer: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BossPhase {
    Enter,
    Action { action: Action, timer: u32 },
    Ultimate(Ultimate),
}

/// A laser segment, already clipped by platforms
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Beam {
    pub start: Vec2,
    pub end: Vec2,
    /// False for the locked beam's warning line
    pub lethal: bool,
}

impl Beam {
    /// Beam leaving `center` along `angle`, stopped by the nearest platform
    pub fn cast(center: Vec2, angle: f32, platforms: &[Platform], lethal: bool) -> Self {
        let dir = Vec2::from_angle(angle);
        let start = center + dir * BEAM_START_OFFSET;
        let end = clip_ray(
            start,
            dir,
            BEAM_RANGE - BEAM_START_OFFSET,
            platforms.iter().map(|p| &p.rect),
        );
        Self { start, end, lethal }
    }

    pub fn hits(&self, rect: &Rect) -> bool {
        segment_hits_rect(self.start, self.end, rect)
    }
}

/// The wave's boss
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub kind: BossKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
    pub color: u32,
    pub hp: f32,
    pub max_hp: f32,
    pub phase: BossPhase,
    pub ult_charge: u32,
    pub move_dir: f32,
    /// Where the entry slide stops
    pub target_x: f32,
    /// Resting y that floating bosses bob around
    pub base_y: f32,
}

impl Boss {
    /// Boss for the current wave, just off the right edge
    pub fn spawn(state: &GameState) -> Self {
        let kind = BossKind::for_wave(state.wave);
        let (size, speed, color) = kind.frame();
        let vp = state.viewport;
        let base_y = vp.floor_y - size.y - HOVER_GAP;
        let max_hp = 1500.0 + 1000.0 * state.wave as f32;
        Self {
            kind,
            pos: Vec2::new(vp.width + 100.0, base_y),
            size,
            speed,
            color,
            hp: max_hp,
            max_hp,
            phase: BossPhase::Enter,
            ult_charge: 0,
            move_dir: -1.0,
            target_x: vp.width - 250.0,
            base_y,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    pub fn is_stunned(&self) -> bool {
        matches!(self.kind, BossKind::IronClad(Reactor::Stunned { .. }))
    }

    pub fn is_overheating(&self) -> bool {
        matches!(self.kind, BossKind::IronClad(Reactor::Overheating { .. }))
    }

    /// Volley damage at `wave`
    pub fn shot_damage(wave: u32) -> f32 {
        15.0 + wave as f32
    }

    /// Apply a hit. Returns the damage actually dealt and any reactor notice.
    pub fn take_damage(&mut self, amount: f32) -> (f32, Option<Notice>) {
        let mut notice = None;
        let dealt = match &mut self.kind {
            BossKind::IronClad(reactor) => match *reactor {
                Reactor::Stunned { .. } => STUNNED_HIT,
                Reactor::Overheating { .. } => amount.min(ARMOR_CAP),
                Reactor::Normal { hits } => {
                    let hits = hits + 1;
                    *reactor = if hits >= OVERHEAT_HITS {
                        notice = Some(Notice::Overheating);
                        Reactor::Overheating {
                            timer: OVERHEAT_FRAMES,
                        }
                    } else {
                        Reactor::Normal { hits }
                    };
                    amount.min(ARMOR_CAP)
                }
            },
            BossKind::Viper | BossKind::Nexus => amount,
        };
        let dealt = dealt.max(0.0);
        self.hp = (self.hp - dealt).max(0.0);
        (dealt, notice)
    }

    /// Beams currently on screen, clipped by `platforms`
    pub fn beams(&self, platforms: &[Platform]) -> Vec<Beam> {
        let center = self.center();
        match self.phase {
            BossPhase::Ultimate(Ultimate::Windmill { angle, .. }) => (0..WINDMILL_BEAMS)
                .map(|i| {
                    let theta = angle + i as f32 * TAU / WINDMILL_BEAMS as f32;
                    Beam::cast(center, theta, platforms, true)
                })
                .collect(),
            BossPhase::Ultimate(Ultimate::LockedBeam { stage, angle, .. }) => {
                let lethal = match stage {
                    BeamStage::Charge => false,
                    BeamStage::Linger => true,
                };
                vec![Beam::cast(center, angle, platforms, lethal)]
            }
            BossPhase::Ultimate(Ultimate::Tremor { .. })
            | BossPhase::Enter
            | BossPhase::Action { .. } => Vec::new(),
        }
    }

    /// Short state name for overlays and logs
    pub fn state_label(&self) -> &'static str {
        match self.kind {
            BossKind::IronClad(Reactor::Overheating { .. }) => return "OVERHEATING",
            BossKind::IronClad(Reactor::Stunned { .. }) => return "STUNNED",
            BossKind::IronClad(Reactor::Normal { .. }) | BossKind::Viper | BossKind::Nexus => {}
        }
        match self.phase {
            BossPhase::Enter => "ENTER",
            BossPhase::Action { action, .. } => match action {
                Action::Move => "MOVE",
                Action::Attack => "ATTACK",
                Action::Idle => "IDLE",
            },
            BossPhase::Ultimate(ult) => match ult {
                Ultimate::Tremor {
                    stage: TremorStage::Warn { .. },
                    ..
                } => "SPIKE_WARN",
                Ultimate::Tremor {
                    stage: TremorStage::Cooldown,
                    ..
                } => "SPIKE_COOLDOWN",
                Ultimate::Windmill { .. } => "LASER_WINDMILL",
                Ultimate::LockedBeam {
                    stage: BeamStage::Charge,
                    ..
                } => "BEAM_CHARGE",
                Ultimate::LockedBeam {
                    stage: BeamStage::Linger,
                    ..
                } => "BEAM_LINGER",
            },
        }
    }
}

/// Roll the next action; moves head toward the player
fn pick_action(boss: &mut Boss, rng: &mut impl Rng, player_x: f32) -> BossPhase {
    let roll = rng.random::<f32>();
    let (action, timer) = if roll < 0.4 {
        boss.move_dir = if player_x < boss.pos.x { -1.0 } else { 1.0 };
        (Action::Move, rng.random_range(60..180))
    } else if roll < 0.9 {
        (Action::Attack, rng.random_range(60..120))
    } else {
        (Action::Idle, 30)
    };
    BossPhase::Action { action, timer }
}

/// Fire this archetype's normal volley at the player
fn perform_attack(boss: &Boss, target: Vec2, wave: u32) -> Vec<Bullet> {
    let muzzle = Vec2::new(boss.pos.x, boss.pos.y + boss.size.y / 2.0);
    let angle = angle_to(muzzle, target);
    let dmg = Boss::shot_damage(wave);
    match boss.kind {
        BossKind::IronClad(_) => vec![Bullet::new(muzzle, velocity_at(angle, 6.0), dmg * 1.5)],
        BossKind::Viper => vec![Bullet::new(muzzle, velocity_at(angle, 12.0), dmg)],
        BossKind::Nexus => (0..6)
            .map(|i| {
                let a = angle + i as f32 * (PI / 3.0);
                Bullet::new(boss.center(), velocity_at(a, 5.0), dmg)
            })
            .collect(),
    }
}

/// Begin the archetype's ultimate and reset the charge
fn start_ultimate(boss: &mut Boss, state: &mut GameState) {
    boss.ult_charge = 0;
    let (ult, notice) = match boss.kind {
        BossKind::IronClad(_) => (
            Ultimate::Tremor {
                stage: TremorStage::Warn {
                    x: state.player.pos.x,
                },
                timer: TREMOR_WARN_FRAMES,
                remaining: TREMOR_SPIKES,
            },
            Notice::GroundTremor,
        ),
        BossKind::Viper => (
            Ultimate::Windmill {
                angle: 0.0,
                timer: WINDMILL_FRAMES,
            },
            Notice::LaserSystem,
        ),
        BossKind::Nexus => (
            Ultimate::LockedBeam {
                stage: BeamStage::Charge,
                angle: angle_to(boss.center(), state.player.center()),
                timer: BEAM_CHARGE_FRAMES,
            },
            Notice::BeamLocked,
        ),
    };
    log::info!("Boss {} ultimate: {:?}", boss.kind.label(), ult);
    boss.phase = BossPhase::Ultimate(ult);
    state.notify(notice);
}

/// Advance a running ultimate by one tick; returns the next phase
fn run_ultimate(boss: &mut Boss, ult: Ultimate, state: &mut GameState) -> BossPhase {
    match ult {
        Ultimate::Tremor {
            stage,
            timer,
            remaining,
        } => {
            let timer = timer.saturating_sub(1);
            match stage {
                TremorStage::Warn { .. } => {
                    let x = state.player.pos.x;
                    if timer == 0 {
                        state.hazards.push(Hazard::spike(x));
                        state.fx.burst(
                            Vec2::new(x + Hazard::SPIKE_WIDTH / 2.0, state.viewport.floor_y),
                            10,
                            palette::SPARK,
                        );
                        BossPhase::Ultimate(Ultimate::Tremor {
                            stage: TremorStage::Cooldown,
                            timer: TREMOR_COOLDOWN_FRAMES,
                            remaining: remaining.saturating_sub(1),
                        })
                    } else {
                        BossPhase::Ultimate(Ultimate::Tremor {
                            stage: TremorStage::Warn { x },
                            timer,
                            remaining,
                        })
                    }
                }
                TremorStage::Cooldown => {
                    if timer > 0 {
                        BossPhase::Ultimate(Ultimate::Tremor {
                            stage,
                            timer,
                            remaining,
                        })
                    } else if remaining > 0 {
                        BossPhase::Ultimate(Ultimate::Tremor {
                            stage: TremorStage::Warn {
                                x: state.player.pos.x,
                            },
                            timer: TREMOR_WARN_FRAMES,
                            remaining,
                        })
                    } else {
                        pick_action(boss, &mut state.rng, state.player.pos.x)
                    }
                }
            }
        }
        Ultimate::Windmill { angle, timer } => {
            let timer = timer.saturating_sub(1);
            let angle = angle + WINDMILL_SPIN;
            boss.phase = BossPhase::Ultimate(Ultimate::Windmill { angle, timer });
            if state.frame % WINDMILL_CADENCE == 0 {
                let body = state.player.rect();
                let touching = boss
                    .beams(&state.platforms)
                    .iter()
                    .filter(|b| b.hits(&body))
                    .count();
                for _ in 0..touching {
                    state.player.take_damage(WINDMILL_DAMAGE);
                }
            }
            if timer == 0 {
                pick_action(boss, &mut state.rng, state.player.pos.x)
            } else {
                boss.phase
            }
        }
        Ultimate::LockedBeam {
            stage,
            angle,
            timer,
        } => {
            let timer = timer.saturating_sub(1);
            match stage {
                BeamStage::Charge if timer == 0 => {
                    let beam = Beam::cast(boss.center(), angle, &state.platforms, true);
                    if beam.hits(&state.player.rect()) {
                        state.player.take_damage(state.tuning.locked_beam_damage);
                    }
                    state.fx.burst(beam.end, 15, palette::SPARK);
                    BossPhase::Ultimate(Ultimate::LockedBeam {
                        stage: BeamStage::Linger,
                        angle,
                        timer: BEAM_LINGER_FRAMES,
                    })
                }
                BeamStage::Linger if timer == 0 => {
                    pick_action(boss, &mut state.rng, state.player.pos.x)
                }
                BeamStage::Charge | BeamStage::Linger => {
                    BossPhase::Ultimate(Ultimate::LockedBeam {
                        stage,
                        angle,
                        timer,
                    })
                }
            }
        }
    }
}

/// Step the reactor. Returns true while it suspends the boss's other behavior.
fn run_reactor(boss: &mut Boss, state: &mut GameState) -> bool {
    let BossKind::IronClad(reactor) = boss.kind else {
        return false;
    };
    match reactor {
        Reactor::Normal { .. } => false,
        Reactor::Stunned { timer } => {
            let timer = timer.saturating_sub(1);
            if timer == 0 {
                boss.kind = BossKind::IronClad(Reactor::Normal { hits: 0 });
                boss.phase = pick_action(boss, &mut state.rng, state.player.pos.x);
            } else {
                boss.kind = BossKind::IronClad(Reactor::Stunned { timer });
            }
            true
        }
        Reactor::Overheating { timer } => {
            let timer = timer.saturating_sub(1);
            if timer > 0 {
                boss.kind = BossKind::IronClad(Reactor::Overheating { timer });
                return true;
            }
            let center = boss.center();
            state.fx.burst(center, 50, palette::FIRE);
            if center.distance(state.player.center()) < BURST_RADIUS {
                state.player.take_damage(BURST_DAMAGE);
            }
            boss.kind = BossKind::IronClad(Reactor::Stunned { timer: STUN_FRAMES });
            state.notify(Notice::BossStunned);
            log::info!("IronClad reactor burst; stunned for {} frames", STUN_FRAMES);
            true
        }
    }
}

fn step(boss: &mut Boss, state: &mut GameState) {
    match boss.phase {
        BossPhase::Enter => {
            if boss.pos.x > boss.target_x {
                boss.pos.x -= ENTRY_SPEED;
            } else {
                boss.phase = pick_action(boss, &mut state.rng, state.player.pos.x);
            }
        }
        BossPhase::Ultimate(ult) => {
            if !run_reactor(boss, state) {
                boss.phase = run_ultimate(boss, ult, state);
            }
        }
        BossPhase::Action { action, timer } => {
            if !run_reactor(boss, state) {
                act(boss, state, action, timer);
            }
        }
    }
}

/// Charge toward the ultimate, then carry out the current action
fn act(boss: &mut Boss, state: &mut GameState, action: Action, timer: u32) {
    let cap = state.tuning.boss_charge_cap;
    if boss.ult_charge < cap {
        boss.ult_charge = (boss.ult_charge + state.tuning.boss_charge_rate).min(cap);
    } else {
        start_ultimate(boss, state);
        return;
    }

    let timer = timer.saturating_sub(1);
    match action {
        Action::Move => {
            boss.pos.x += boss.speed * boss.move_dir;
            let width = state.viewport.width;
            if boss.pos.x <= EDGE_MARGIN {
                boss.move_dir = 1.0;
            }
            if boss.pos.x >= width - boss.size.x - EDGE_MARGIN {
                boss.move_dir = -1.0;
            }
            match boss.kind {
                BossKind::IronClad(_) => {}
                BossKind::Viper | BossKind::Nexus => {
                    boss.pos.y = boss.base_y + (state.frame as f32 * 0.05).sin() * 50.0;
                }
            }
        }
        Action::Attack => {
            if state.frame % ATTACK_CADENCE == 0 {
                let volley = perform_attack(boss, state.player.center(), state.wave);
                state.enemy_bullets.extend(volley);
            }
        }
        Action::Idle => {}
    }

    boss.phase = if timer == 0 {
        pick_action(boss, &mut state.rng, state.player.pos.x)
    } else {
        BossPhase::Action { action, timer }
    };
}

/// Advance the live boss, if any
pub fn update(state: &mut GameState) {
    let Some(mut boss) = state.boss.take() else {
        return;
    };
    step(&mut boss, state);
    state.boss = Some(boss);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{HazardKind, Viewport};

    fn state_at_wave(wave: u32) -> GameState {
        let mut s = GameState::new(5, Viewport::new(1280.0, 800.0));
        s.wave = wave;
        s
    }

    fn engaged(wave: u32) -> GameState {
        let mut s = state_at_wave(wave);
        let mut boss = Boss::spawn(&s);
        boss.pos.x = boss.target_x;
        boss.phase = BossPhase::Action {
            action: Action::Idle,
            timer: 30,
        };
        s.boss = Some(boss);
        s
    }

    #[test]
    fn test_kind_cycles_with_wave() {
        assert_eq!(BossKind::for_wave(1).label(), "IRON CLAD");
        assert_eq!(BossKind::for_wave(2).label(), "VIPER");
        assert_eq!(BossKind::for_wave(3).label(), "NEXUS");
        assert_eq!(BossKind::for_wave(4).label(), "IRON CLAD");
    }

    #[test]
    fn test_hp_scales_with_wave() {
        let s = state_at_wave(2);
        let boss = Boss::spawn(&s);
        assert_eq!(boss.max_hp, 3500.0);
        assert_eq!(boss.hp, boss.max_hp);
    }

    #[test]
    fn test_entry_slides_then_picks_action() {
        let mut s = state_at_wave(2);
        s.boss = Some(Boss::spawn(&s));
        // 1380 -> 1030 at 2 px per tick
        for _ in 0..175 {
            update(&mut s);
        }
        let boss = s.boss.as_ref().unwrap();
        assert_eq!(boss.pos.x, boss.target_x);
        assert!(matches!(boss.phase, BossPhase::Enter));
        update(&mut s);
        assert!(!matches!(s.boss.as_ref().unwrap().phase, BossPhase::Enter));
    }

    #[test]
    fn test_armor_caps_and_overheats() {
        let mut boss = Boss::spawn(&state_at_wave(1));
        let (dealt, _) = boss.take_damage(100.0);
        assert_eq!(dealt, ARMOR_CAP);
        for _ in 1..OVERHEAT_HITS - 1 {
            assert_eq!(boss.take_damage(5.0).1, None);
        }
        let (_, notice) = boss.take_damage(5.0);
        assert_eq!(notice, Some(Notice::Overheating));
        assert!(boss.is_overheating());
    }

    #[test]
    fn test_stunned_hits_are_flat() {
        let mut boss = Boss::spawn(&state_at_wave(1));
        boss.kind = BossKind::IronClad(Reactor::Stunned { timer: 10 });
        assert_eq!(boss.take_damage(1.0).0, STUNNED_HIT);
        assert_eq!(boss.take_damage(500.0).0, STUNNED_HIT);
    }

    #[test]
    fn test_overheat_burst_kills_nearby_player_then_stuns() {
        let mut s = engaged(1);
        let center = s.boss.as_ref().unwrap().center();
        s.player.pos = center - Vec2::new(s.player.width, s.player.height) * 0.5;
        s.boss.as_mut().unwrap().kind = BossKind::IronClad(Reactor::Overheating { timer: 1 });
        update(&mut s);
        assert!(!s.player.is_alive());
        assert!(s.boss.as_ref().unwrap().is_stunned());
        assert!(s.events.contains(&crate::sim::state::GameEvent::Notify(Notice::BossStunned)));
    }

    #[test]
    fn test_stun_recovery_resets_hits() {
        let mut s = engaged(1);
        s.boss.as_mut().unwrap().kind = BossKind::IronClad(Reactor::Stunned { timer: 2 });
        update(&mut s);
        assert!(s.boss.as_ref().unwrap().is_stunned());
        update(&mut s);
        let boss = s.boss.as_ref().unwrap();
        assert_eq!(boss.kind, BossKind::IronClad(Reactor::Normal { hits: 0 }));
        assert!(matches!(boss.phase, BossPhase::Action { .. }));
    }

    #[test]
    fn test_full_charge_starts_ultimate() {
        let mut s = engaged(2);
        s.boss.as_mut().unwrap().ult_charge = s.tuning.boss_charge_cap;
        update(&mut s);
        let boss = s.boss.as_ref().unwrap();
        assert_eq!(boss.ult_charge, 0);
        assert!(matches!(boss.phase, BossPhase::Ultimate(Ultimate::Windmill { .. })));
        assert_eq!(boss.beams(&s.platforms).len(), WINDMILL_BEAMS);
    }

    #[test]
    fn test_tremor_raises_three_spikes() {
        let mut s = engaged(1);
        s.boss.as_mut().unwrap().ult_charge = s.tuning.boss_charge_cap;
        update(&mut s);
        let mut spikes = 0;
        for _ in 0..3 * (TREMOR_WARN_FRAMES + TREMOR_COOLDOWN_FRAMES) {
            let before = s.hazards.len();
            update(&mut s);
            if s.hazards.len() > before {
                spikes += 1;
                assert_eq!(s.hazards.last().unwrap().kind, HazardKind::Spike);
                assert_eq!(s.hazards.last().unwrap().x, s.player.pos.x);
            }
        }
        assert_eq!(spikes, 3);
        assert!(matches!(
            s.boss.as_ref().unwrap().phase,
            BossPhase::Action { .. }
        ));
    }

    #[test]
    fn test_locked_beam_fires_once_along_locked_angle() {
        let mut s = engaged(3);
        s.platforms.clear();
        s.boss.as_mut().unwrap().ult_charge = s.tuning.boss_charge_cap;
        update(&mut s);
        let hp = s.player.hp;
        for _ in 0..BEAM_CHARGE_FRAMES - 1 {
            update(&mut s);
        }
        assert_eq!(s.player.hp, hp);
        update(&mut s);
        assert_eq!(s.player.hp, hp - s.tuning.locked_beam_damage);
        for _ in 0..BEAM_LINGER_FRAMES {
            update(&mut s);
        }
        assert_eq!(s.player.hp, hp - s.tuning.locked_beam_damage);
        assert!(matches!(s.boss.as_ref().unwrap().phase, BossPhase::Action { .. }));
    }

    #[test]
    fn test_beam_stops_at_platform() {
        let center = Vec2::new(600.0, 300.0);
        let wall = Platform { rect: Rect::new(700.0, 250.0, 20.0, 100.0) };
        let beam = Beam::cast(center, 0.0, &[wall], true);
        assert!((beam.end.x - 700.0).abs() < 1e-3);
        assert!((beam.start.x - 610.0).abs() < 1e-3);

        let open = Beam::cast(center, 0.0, &[], true);
        assert!((open.end.x - (center.x + BEAM_RANGE)).abs() < 1e-2);
    }

    #[test]
    fn test_viper_fires_single_fast_shot() {
        let s = state_at_wave(2);
        let boss = Boss::spawn(&s);
        let shots = perform_attack(&boss, s.player.center(), 2);
        assert_eq!(shots.len(), 1);
        assert!((shots[0].vel.length() - 12.0).abs() < 1e-3);
        assert_eq!(shots[0].damage, 17.0);
    }

    #[test]
    fn test_windmill_chips_on_cadence() {
        let mut s = engaged(2);
        s.platforms.clear();
        let boss = s.boss.as_mut().unwrap();
        boss.phase = BossPhase::Ultimate(Ultimate::Windmill {
            angle: 0.0,
            timer: WINDMILL_FRAMES,
        });
        // Straddle the first beam just right of the boss center
        let center = boss.center();
        let size = Vec2::new(s.player.width, s.player.height);
        s.player.pos = center + Vec2::new(80.0, 0.0) - size * 0.5;

        for f in 1..=12 {
            s.frame = f;
            let hp = s.player.hp;
            update(&mut s);
            if f % WINDMILL_CADENCE == 0 {
                assert_eq!(s.player.hp, hp - WINDMILL_DAMAGE, "frame {f}");
            } else {
                assert_eq!(s.player.hp, hp, "frame {f}");
            }
        }

        let boss = s.boss.as_mut().unwrap();
        boss.phase = BossPhase::Ultimate(Ultimate::Windmill { angle: 0.0, timer: 1 });
        update(&mut s);
        assert!(matches!(s.boss.as_ref().unwrap().phase, BossPhase::Action { .. }));
    }

    #[test]
    fn test_overheat_interrupts_tremor() {
        let mut s = engaged(1);
        let boss = s.boss.as_mut().unwrap();
        boss.kind = BossKind::IronClad(Reactor::Overheating { timer: 1 });
        boss.phase = BossPhase::Ultimate(Ultimate::Tremor {
            stage: TremorStage::Warn { x: s.player.pos.x },
            timer: 1,
            remaining: TREMOR_SPIKES,
        });

        update(&mut s);
        assert!(s.player.is_alive());
        assert!(s.boss.as_ref().unwrap().is_stunned());
        for _ in 0..STUN_FRAMES - 1 {
            update(&mut s);
            assert!(s.boss.as_ref().unwrap().is_stunned());
            assert!(s.hazards.is_empty());
        }

        update(&mut s);
        let boss = s.boss.as_ref().unwrap();
        assert_eq!(boss.kind, BossKind::IronClad(Reactor::Normal { hits: 0 }));
        assert!(matches!(boss.phase, BossPhase::Action { .. }));
        assert!(s.hazards.is_empty());
    }
}
