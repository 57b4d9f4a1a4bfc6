//! Game state and core simulation types
//!
//! Everything a tick reads or writes lives in [`GameState`]. Subsystems get
//! the state passed in; none of them keep their own copy of a collection.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boss::Boss;
use super::enemy::{Enemy, EnemyKind};
use super::geom::Rect;
use super::spawn::{self, WaveSchedule};
use super::tick::TickInput;
use super::weather::Weather;
use crate::consts::*;
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Particle and sprite colors (0xRRGGBB)
pub mod palette {
    pub const WHITE: u32 = 0xffffff;
    pub const BLOOD: u32 = 0xff0000;
    pub const TOXIC: u32 = 0x00ff00;
    pub const SHIELD: u32 = 0x00ffff;
    pub const SPARK: u32 = 0xffffaa;
    pub const FIRE: u32 = 0xff4500;
    pub const GOLD: u32 = 0xffa500;
    pub const ACID: u32 = 0xa569bd;
}

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Simulation frozen until unpaused
    Paused,
    /// Player died, run ended
    GameOver,
}

/// Field bounds supplied by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// Y of the ground line
    pub floor_y: f32,
}

impl Viewport {
    /// Viewport with the floor line inset from the bottom edge
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            floor_y: height - FLOOR_INSET,
        }
    }
}

/// Absorb `amount` with `shield` first, then `hp`.
///
/// Returns the hp actually lost. `shield` ends at zero whenever the hit
/// overflows it and `hp` never drops below zero.
pub fn absorb_damage(shield: &mut f32, hp: &mut f32, amount: f32) -> f32 {
    let amount = amount.max(0.0);
    let absorbed = amount.min(shield.max(0.0));
    *shield = (*shield - absorbed).max(0.0);
    let overflow = amount - absorbed;
    let before = *hp;
    *hp = (*hp - overflow).max(0.0);
    before - *hp
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub width: f32,
    pub height: f32,
    pub crouching: bool,
    pub grounded: bool,
    pub jump_count: u32,
    pub max_jumps: u32,
    /// Current horizontal speed cap (reduced while crouching)
    pub speed: f32,
    pub base_speed: f32,

    pub hp: f32,
    pub max_hp: f32,
    pub shield: f32,
    pub damage: f32,
    pub gun_level: u32,
    /// Frames between shots
    pub fire_rate: u32,
    pub last_shot: Option<u64>,

    pub poison_timer: u32,
    pub poison_tick: u32,

    /// Frames until the ultimate is ready again (0 = ready)
    pub ult_timer: u32,
    pub ult_max_cooldown: u32,

    /// HP lost during the current tick (feeds the damage event)
    #[serde(skip)]
    pub hp_lost_this_tick: f32,
}

impl Player {
    pub fn new(viewport: &Viewport, tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(PLAYER_START_X, viewport.floor_y - PLAYER_STAND_HEIGHT),
            vel: Vec2::ZERO,
            width: PLAYER_WIDTH,
            height: PLAYER_STAND_HEIGHT,
            crouching: false,
            grounded: true,
            jump_count: 0,
            max_jumps: tuning.max_jumps,
            speed: tuning.player_speed,
            base_speed: tuning.player_speed,
            hp: tuning.player_max_hp,
            max_hp: tuning.player_max_hp,
            shield: 0.0,
            damage: tuning.player_damage,
            gun_level: 1,
            fire_rate: tuning.player_fire_rate,
            last_shot: None,
            poison_timer: 0,
            poison_tick: 0,
            ult_timer: 0,
            ult_max_cooldown: tuning.ult_cooldown,
            hp_lost_this_tick: 0.0,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: Vec2::new(self.width, self.height),
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::new(self.width, self.height) * 0.5
    }

    /// Y of the player's feet
    #[inline]
    pub fn feet(&self) -> f32 {
        self.pos.y + self.height
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    /// Apply damage shield-first. Returns hp lost.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let lost = absorb_damage(&mut self.shield, &mut self.hp, amount);
        self.hp_lost_this_tick += lost;
        lost
    }

    /// Start (or refresh) poison; an active shield blocks it entirely
    pub fn apply_poison(&mut self, duration: u32) -> bool {
        if self.shield > 0.0 {
            return false;
        }
        self.poison_timer = duration;
        true
    }

    /// Shorten the ultimate cooldown by a fraction of its maximum
    pub fn gain_ult(&mut self, fraction: f32) {
        let reduction = (self.ult_max_cooldown as f32 * fraction.max(0.0)).round() as u32;
        self.ult_timer = self.ult_timer.saturating_sub(reduction);
    }

    /// Ultimate readiness for the HUD: 0 right after use, 100 when ready
    pub fn ult_ready_percent(&self) -> f32 {
        if self.ult_timer == 0 {
            100.0
        } else {
            100.0 - (self.ult_timer as f32 / self.ult_max_cooldown as f32) * 100.0
        }
    }

    /// Whole seconds left on the ultimate cooldown
    pub fn ult_seconds_left(&self, tick_hz: u32) -> u32 {
        self.ult_timer.div_ceil(tick_hz.max(1))
    }

    /// Switch between standing and crouching, keeping the feet in place
    pub fn set_crouch(&mut self, crouch: bool) {
        if crouch == self.crouching {
            return;
        }
        let feet = self.feet();
        self.crouching = crouch;
        self.height = if crouch {
            PLAYER_CROUCH_HEIGHT
        } else {
            PLAYER_STAND_HEIGHT
        };
        self.speed = if crouch {
            self.base_speed * CROUCH_SPEED_FACTOR
        } else {
            self.base_speed
        };
        self.pos.y = feet - self.height;
    }
}

/// A projectile. Which collection holds it decides whom it can hurt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    /// Poisons the player on hit
    pub poison: bool,
    /// Detonates into a splash instead of dealing direct damage
    pub explosive: bool,
    pub active: bool,
}

impl Bullet {
    pub fn new(pos: Vec2, vel: Vec2, damage: f32) -> Self {
        Self {
            pos,
            vel,
            radius: BULLET_RADIUS,
            damage,
            poison: false,
            explosive: false,
            active: true,
        }
    }

    pub fn poisoned(mut self) -> Self {
        self.poison = true;
        self
    }

    pub fn explosive(mut self) -> Self {
        self.explosive = true;
        self.radius = EXPLOSIVE_RADIUS;
        self
    }

    /// Advance one tick. Returns the detonation point if an explosive round
    /// reached the floor or a field edge.
    pub fn update(&mut self, viewport: &Viewport) -> Option<Vec2> {
        self.pos += self.vel;

        if self.explosive
            && (self.pos.y > viewport.floor_y || self.pos.x < 0.0 || self.pos.x > viewport.width)
        {
            self.active = false;
            return Some(self.pos);
        }

        if self.pos.x < -OFFSCREEN_MARGIN
            || self.pos.x > viewport.width + OFFSCREEN_MARGIN
            || self.pos.y < -OFFSCREEN_MARGIN
            || self.pos.y > viewport.height + OFFSCREEN_MARGIN
        {
            self.active = false;
        }
        None
    }
}

/// Pickup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Heal,
    Upgrade,
    Shield,
    Score,
    MaxHp,
    FireRate,
}

impl ItemKind {
    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Heal => "HEAL",
            ItemKind::Upgrade => "UPGRADE",
            ItemKind::Shield => "SHIELD",
            ItemKind::Score => "SCORE",
            ItemKind::MaxHp => "MAXHP",
            ItemKind::FireRate => "FIRERATE",
        }
    }
}

/// A pickup falling to (or resting on) the floor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
    pub pos: Vec2,
    pub vel_y: f32,
    pub grounded: bool,
}

impl Item {
    pub fn new(kind: ItemKind, pos: Vec2) -> Self {
        Self {
            kind,
            pos,
            vel_y: 0.0,
            grounded: false,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: Vec2::splat(ITEM_SIZE),
        }
    }

    /// Fall under gravity until the floor line
    pub fn update(&mut self, floor_y: f32) {
        if self.grounded {
            return;
        }
        self.vel_y += GRAVITY;
        self.pos.y += self.vel_y;
        if self.pos.y + ITEM_SIZE > floor_y {
            self.pos.y = floor_y - ITEM_SIZE;
            self.vel_y = 0.0;
            self.grounded = true;
        }
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    pub life: f32, // 0-1, decreases over time
}

/// Cosmetic particle pool with its own RNG stream, so the particle cap and
/// effect density never perturb gameplay randomness
#[derive(Debug, Clone)]
pub struct Effects {
    pub particles: Vec<Particle>,
    rng: Pcg32,
    cap: usize,
}

impl Effects {
    pub fn new(seed: u64, cap: usize) -> Self {
        Self {
            particles: Vec::new(),
            rng: Pcg32::seed_from_u64(seed ^ 0x5eed_f00d),
            cap,
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn set_cap(&mut self, cap: usize) {
        self.cap = cap;
        self.particles.truncate(cap);
    }

    /// Spawn up to `count` particles scattering from `pos`
    pub fn burst(&mut self, pos: Vec2, count: usize, color: u32) {
        let room = self.cap.saturating_sub(self.particles.len());
        for _ in 0..count.min(room) {
            let vel = Vec2::new(
                (self.rng.random::<f32>() - 0.5) * 10.0,
                (self.rng.random::<f32>() - 0.5) * 10.0,
            );
            self.particles.push(Particle {
                pos,
                vel,
                color,
                life: 1.0,
            });
        }
    }

    pub fn update(&mut self) {
        for p in &mut self.particles {
            p.pos += p.vel;
            p.life -= PARTICLE_FADE;
        }
        self.particles.retain(|p| p.life > 0.0);
    }
}

/// Static one-way floor segment that also blocks beams
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Rect,
}

impl Platform {
    pub fn new(x: f32, y: f32, w: f32) -> Self {
        Self {
            rect: Rect::new(x, y, w, PLATFORM_HEIGHT),
        }
    }

    /// Standard three-zone layout scaled to the viewport width
    pub fn layout(viewport: &Viewport) -> Vec<Platform> {
        let w = viewport.width;
        let f = viewport.floor_y;
        vec![
            // Left zone
            Platform::new(w * 0.05, f - 120.0, 180.0),
            Platform::new(w * 0.02, f - 350.0, 250.0),
            Platform::new(w * 0.08, f - 520.0, 150.0),
            // Middle zone
            Platform::new(w * 0.35, f - 220.0, 200.0),
            Platform::new(w * 0.50, f - 420.0, 180.0),
            Platform::new(w * 0.45, f - 600.0, 150.0),
            // Right zone
            Platform::new(w * 0.70, f - 300.0, 200.0),
            Platform::new(w * 0.82, f - 500.0, 180.0),
            Platform::new(w * 0.75, f - 150.0, 180.0),
        ]
    }
}

/// Position-anchored hazard types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardKind {
    /// Ground spike raised by the tremor ultimate
    Spike,
    /// Storm lightning column
    Lightning,
}

/// Hazard lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HazardStage {
    /// Telegraphed, harmless
    Warn,
    /// Dangerous; `spent` once it has hurt the player
    Active { spent: bool },
}

/// A timed hazard that damages the player at most once
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hazard {
    pub kind: HazardKind,
    /// Left edge
    pub x: f32,
    pub width: f32,
    /// Spikes rise this far above the floor; lightning spans the field
    pub height: f32,
    pub stage: HazardStage,
    /// Frames left in the current stage
    pub timer: u32,
    pub damage: f32,
}

impl Hazard {
    pub const SPIKE_WIDTH: f32 = 40.0;
    pub const SPIKE_HEIGHT: f32 = 100.0;
    pub const SPIKE_FRAMES: u32 = 30;
    pub const SPIKE_DAMAGE: f32 = 20.0;
    pub const STRIKE_WIDTH: f32 = 40.0;
    pub const STRIKE_WARN_FRAMES: u32 = 18;
    pub const STRIKE_FRAMES: u32 = 10;
    pub const STRIKE_DAMAGE: f32 = 30.0;

    /// Spike erupting at `x`, immediately active
    pub fn spike(x: f32) -> Self {
        Self {
            kind: HazardKind::Spike,
            x,
            width: Self::SPIKE_WIDTH,
            height: Self::SPIKE_HEIGHT,
            stage: HazardStage::Active { spent: false },
            timer: Self::SPIKE_FRAMES,
            damage: Self::SPIKE_DAMAGE,
        }
    }

    /// Lightning column centered on `center_x`, starting with a warning
    pub fn lightning(center_x: f32, field_height: f32) -> Self {
        Self {
            kind: HazardKind::Lightning,
            x: center_x - Self::STRIKE_WIDTH / 2.0,
            width: Self::STRIKE_WIDTH,
            height: field_height,
            stage: HazardStage::Warn,
            timer: Self::STRIKE_WARN_FRAMES,
            damage: Self::STRIKE_DAMAGE,
        }
    }

    /// Area the hazard covers
    pub fn rect(&self, floor_y: f32) -> Rect {
        match self.kind {
            HazardKind::Spike => Rect::new(self.x, floor_y - self.height, self.width, self.height),
            HazardKind::Lightning => Rect::new(self.x, 0.0, self.width, self.height),
        }
    }

    /// Advance one tick and hit `player` if the hazard is live and overlaps.
    /// Returns false once the hazard has expired.
    pub fn update(&mut self, player: &mut Player, floor_y: f32) -> bool {
        self.timer = self.timer.saturating_sub(1);
        match self.stage {
            HazardStage::Warn => {
                if self.timer == 0 {
                    self.stage = HazardStage::Active { spent: false };
                    self.timer = Self::STRIKE_FRAMES;
                    self.strike(player, floor_y);
                }
                true
            }
            HazardStage::Active { .. } => {
                if self.timer == 0 {
                    return false;
                }
                self.strike(player, floor_y);
                true
            }
        }
    }

    fn strike(&mut self, player: &mut Player, floor_y: f32) {
        if let HazardStage::Active { spent: false } = self.stage {
            let area = self.rect(floor_y);
            let body = player.rect();
            let hit = match self.kind {
                // Lightning only cares about the column
                HazardKind::Lightning => {
                    body.left() < area.right() && body.right() > area.left()
                }
                HazardKind::Spike => body.overlaps(&area),
            };
            if hit {
                player.take_damage(self.damage);
                self.stage = HazardStage::Active { spent: true };
            }
        }
    }
}

/// Player-facing notifications (the host decides how to show them)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    UltimateReleased,
    Poisoned,
    Healed,
    WeaponUpgrade,
    ShieldEquipped,
    MaxHpIncreased,
    RapidFire,
    SuppliesIncoming,
    WeaponDrop,
    BossSpawned,
    BossEngaged,
    GroundTremor,
    LaserSystem,
    BeamLocked,
    Overheating,
    BossStunned,
    Zapped,
    WeatherWarning(Weather),
    WeatherCleared,
}

impl Notice {
    pub fn text(&self) -> &'static str {
        match self {
            Notice::UltimateReleased => "ULTIMATE RELEASED!",
            Notice::Poisoned => "POISONED!",
            Notice::Healed => "HEALED!",
            Notice::WeaponUpgrade => "WEAPON UPGRADE!",
            Notice::ShieldEquipped => "SHIELD EQUIPPED!",
            Notice::MaxHpIncreased => "MAX HP INCREASED!",
            Notice::RapidFire => "RAPID FIRE!",
            Notice::SuppliesIncoming => "SUPPLIES INCOMING!",
            Notice::WeaponDrop => "WEAPON DROP!",
            Notice::BossSpawned => "WARNING: BOSS SPAWNED!",
            Notice::BossEngaged => "BOSS ENGAGED - WEATHER CLEARED",
            Notice::GroundTremor => "GROUND TREMOR DETECTED!",
            Notice::LaserSystem => "LASER SYSTEM ACTIVATED!",
            Notice::BeamLocked => "TARGET LOCKED - MOVE!",
            Notice::Overheating => "BOSS OVERHEATING! GET BACK!",
            Notice::BossStunned => "BOSS STUNNED! ATTACK NOW!",
            Notice::Zapped => "ZAPPED!",
            Notice::WeatherWarning(Weather::AcidRain) => "WARNING: ACID RAIN DETECTED!",
            Notice::WeatherWarning(Weather::Storm) => "WARNING: THUNDERSTORM DETECTED!",
            Notice::WeatherWarning(Weather::Lava { .. }) => "WARNING: LAVA DETECTED!",
            Notice::WeatherWarning(Weather::Clear) | Notice::WeatherCleared => "WEATHER CLEARED",
        }
    }
}

/// Effects emitted during a tick, forwarded to collaborators afterwards
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    Notify(Notice),
    PlayerDamaged { amount: f32 },
    EnemyKilled { kind: EnemyKind, pos: Vec2 },
    ItemPicked { kind: ItemKind },
    BossSpawned { kind: &'static str },
    BossDamaged { hp: f32, max_hp: f32 },
    BossDefeated { kind: &'static str, wave: u32 },
    WaveStarted { wave: u32 },
    WeatherChanged { weather: Weather },
    RunEnded { score: u64, wave: u32 },
}

/// Work deferred to a future frame (keeps delayed shots deterministic)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Deferred {
    /// A drone's follow-up shot, re-aimed from wherever the drone is then
    DroneFollowUp { enemy_id: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledAction {
    /// Absolute frame at which the action runs
    pub at: u64,
    pub action: Deferred,
}

/// Complete simulation state for one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Gameplay RNG
    pub rng: Pcg32,
    /// Monotonic tick counter (resets with the run)
    pub frame: u64,
    pub phase: GamePhase,
    pub score: u64,
    /// Current wave (1-based)
    pub wave: u32,
    /// Frames left before the boss of this wave arrives
    pub wave_timer: u32,
    pub viewport: Viewport,
    pub tuning: Tuning,
    /// Ticks per second, for turning frame counts into seconds
    pub tick_hz: u32,

    pub player: Player,
    pub player_bullets: Vec<Bullet>,
    pub enemy_bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub boss: Option<Boss>,
    pub items: Vec<Item>,
    pub platforms: Vec<Platform>,
    pub hazards: Vec<Hazard>,
    pub weather: Weather,
    pub schedule: WaveSchedule,
    /// Deferred actions, drained by absolute frame
    pub pending: Vec<ScheduledAction>,
    /// Visual particles (not gameplay-affecting)
    pub fx: Effects,
    /// Events emitted by the latest tick; after construction, the opening
    /// `WaveStarted` until the first tick runs
    pub events: Vec<GameEvent>,
    /// Input seen on the previous tick (for edge detection)
    pub prev_input: TickInput,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Start a run with default balance
    pub fn new(seed: u64, viewport: Viewport) -> Self {
        Self::with_tuning(seed, viewport, Tuning::default())
    }

    /// Start a run from host settings
    pub fn from_settings(settings: &Settings, seed: u64) -> Self {
        let viewport = Viewport::new(settings.width, settings.height);
        let mut state = Self::with_tuning(seed, viewport, settings.tuning.clone());
        state.fx.set_cap(settings.max_particles());
        state.tick_hz = settings.tick_hz.max(1);
        state
    }

    pub fn with_tuning(seed: u64, viewport: Viewport, tuning: Tuning) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            frame: 0,
            phase: GamePhase::Playing,
            score: 0,
            wave: 1,
            wave_timer: tuning.wave_duration,
            viewport,
            player: Player::new(&viewport, &tuning),
            player_bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            enemies: Vec::new(),
            boss: None,
            items: Vec::new(),
            platforms: Platform::layout(&viewport),
            hazards: Vec::new(),
            weather: Weather::Clear,
            schedule: WaveSchedule::default(),
            pending: Vec::new(),
            fx: Effects::new(seed, 500),
            events: Vec::new(),
            prev_input: TickInput::default(),
            next_id: 1,
            tuning,
            tick_hz: TICK_HZ,
        };
        spawn::init_wave(&mut state);
        log::info!("Run started: seed={} viewport={}x{}", seed, viewport.width, viewport.height);
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Host resized the field: re-anchor the floor and the platform layout
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.platforms = Platform::layout(&viewport);
        let p = &mut self.player;
        p.pos.x = p.pos.x.clamp(0.0, (viewport.width - p.width).max(0.0));
        if p.feet() > viewport.floor_y {
            p.pos.y = viewport.floor_y - p.height;
        }
    }

    /// Queue a deferred action `delay` frames from now
    pub fn schedule_in(&mut self, delay: u64, action: Deferred) {
        self.pending.push(ScheduledAction {
            at: self.frame + delay,
            action,
        });
    }

    /// Remove and return every action due at or before the current frame,
    /// in the order they were scheduled
    pub fn take_due_actions(&mut self) -> Vec<Deferred> {
        let frame = self.frame;
        let (due, later): (Vec<_>, Vec<_>) = self.pending.drain(..).partition(|a| a.at <= frame);
        self.pending = later;
        due.into_iter().map(|a| a.action).collect()
    }

    pub fn notify(&mut self, notice: Notice) {
        self.events.push(GameEvent::Notify(notice));
    }

    /// Drop an item into the world
    pub fn drop_item(&mut self, kind: ItemKind, pos: Vec2) {
        log::debug!("Item drop {:?} at ({:.0}, {:.0})", kind, pos.x, pos.y);
        self.items.push(Item::new(kind, pos));
    }

    /// Random x for an airdrop, kept 50px away from either edge
    pub fn random_drop_x(&mut self) -> f32 {
        50.0 + self.rng.random::<f32>() * (self.viewport.width - 100.0).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GameState {
        GameState::new(42, Viewport::new(1280.0, 800.0))
    }

    #[test]
    fn test_shield_absorbs_before_hp() {
        let mut p = state().player;
        p.shield = 50.0;
        assert_eq!(p.take_damage(30.0), 0.0);
        assert_eq!(p.shield, 20.0);
        assert_eq!(p.hp, 100.0);

        // Overflow: 35 - 20 = 15 off hp
        assert_eq!(p.take_damage(35.0), 15.0);
        assert_eq!(p.shield, 0.0);
        assert_eq!(p.hp, 85.0);
    }

    #[test]
    fn test_hp_clamps_at_zero() {
        let mut p = state().player;
        p.take_damage(9999.0);
        assert_eq!(p.hp, 0.0);
        assert!(!p.is_alive());
    }

    #[test]
    fn test_poison_blocked_by_shield() {
        let mut p = state().player;
        p.shield = 1.0;
        assert!(!p.apply_poison(300));
        assert_eq!(p.poison_timer, 0);
        p.shield = 0.0;
        assert!(p.apply_poison(300));
        assert_eq!(p.poison_timer, 300);
    }

    #[test]
    fn test_crouch_preserves_feet() {
        let mut p = state().player;
        let feet = p.feet();
        p.set_crouch(true);
        assert_eq!(p.height, PLAYER_CROUCH_HEIGHT);
        assert_eq!(p.feet(), feet);
        assert!((p.speed - 4.0 * CROUCH_SPEED_FACTOR).abs() < 1e-6);
        p.set_crouch(false);
        assert_eq!(p.height, PLAYER_STAND_HEIGHT);
        assert_eq!(p.feet(), feet);
        assert_eq!(p.speed, 4.0);
    }

    #[test]
    fn test_gain_ult_never_below_zero() {
        let mut p = state().player;
        p.ult_timer = 30;
        p.gain_ult(0.5);
        assert_eq!(p.ult_timer, 0);
        assert_eq!(p.ult_ready_percent(), 100.0);
    }

    #[test]
    fn test_ult_readiness_fraction() {
        let mut p = state().player;
        p.ult_timer = p.ult_max_cooldown;
        assert_eq!(p.ult_ready_percent(), 0.0);
        assert_eq!(p.ult_seconds_left(TICK_HZ), 40);
        p.ult_timer = 1200;
        assert!((p.ult_ready_percent() - 50.0).abs() < 1e-4);
        p.ult_timer = 61;
        assert_eq!(p.ult_seconds_left(TICK_HZ), 2);
        assert_eq!(p.ult_seconds_left(30), 3);
    }

    #[test]
    fn test_explosive_bullet_detonates_at_floor() {
        let vp = Viewport::new(800.0, 600.0);
        let mut b = Bullet::new(Vec2::new(400.0, vp.floor_y - 2.0), Vec2::new(0.0, 8.0), 100.0)
            .explosive();
        let hit = b.update(&vp);
        assert!(hit.is_some());
        assert!(!b.active);
    }

    #[test]
    fn test_bullet_offscreen_margin() {
        let vp = Viewport::new(800.0, 600.0);
        let mut b = Bullet::new(Vec2::new(845.0, 100.0), Vec2::new(10.0, 0.0), 5.0);
        assert!(b.update(&vp).is_none());
        assert!(!b.active);
    }

    #[test]
    fn test_item_lands_on_floor() {
        let mut item = Item::new(ItemKind::Heal, Vec2::new(100.0, -50.0));
        for _ in 0..200 {
            item.update(700.0);
        }
        assert!(item.grounded);
        assert_eq!(item.pos.y, 700.0 - ITEM_SIZE);
    }

    #[test]
    fn test_spike_hits_once() {
        let mut s = state();
        let floor = s.viewport.floor_y;
        let mut spike = Hazard::spike(s.player.pos.x);
        let mut alive = true;
        while alive {
            alive = spike.update(&mut s.player, floor);
        }
        assert_eq!(s.player.hp, 100.0 - Hazard::SPIKE_DAMAGE);
    }

    #[test]
    fn test_lightning_warns_then_strikes_once() {
        let mut s = state();
        let floor = s.viewport.floor_y;
        let mut strike = Hazard::lightning(s.player.center().x, s.viewport.height);
        for _ in 0..Hazard::STRIKE_WARN_FRAMES - 1 {
            assert!(strike.update(&mut s.player, floor));
        }
        assert_eq!(s.player.hp, 100.0);
        assert!(strike.update(&mut s.player, floor));
        assert_eq!(s.player.hp, 100.0 - Hazard::STRIKE_DAMAGE);
        let mut ticks = 0;
        while strike.update(&mut s.player, floor) {
            ticks += 1;
        }
        assert_eq!(ticks, Hazard::STRIKE_FRAMES - 1);
        assert_eq!(s.player.hp, 100.0 - Hazard::STRIKE_DAMAGE);
    }

    #[test]
    fn test_scheduled_actions_drain_in_order() {
        let mut s = state();
        s.schedule_in(2, Deferred::DroneFollowUp { enemy_id: 1 });
        s.schedule_in(1, Deferred::DroneFollowUp { enemy_id: 2 });
        s.frame += 1;
        assert_eq!(s.take_due_actions(), vec![Deferred::DroneFollowUp { enemy_id: 2 }]);
        assert!(s.take_due_actions().is_empty());
        s.frame += 1;
        assert_eq!(s.take_due_actions(), vec![Deferred::DroneFollowUp { enemy_id: 1 }]);
        assert!(s.pending.is_empty());
    }

    #[test]
    fn test_particle_cap() {
        let mut fx = Effects::new(1, 10);
        fx.burst(Vec2::ZERO, 50, palette::WHITE);
        assert_eq!(fx.particles.len(), 10);
        for _ in 0..20 {
            fx.update();
        }
        assert!(fx.particles.is_empty());
    }

    #[test]
    fn test_resize_keeps_player_on_field() {
        let mut s = state();
        s.player.pos.x = 1200.0;
        s.resize(Viewport::new(800.0, 600.0));
        assert_eq!(s.player.pos.x, 800.0 - s.player.width);
        assert_eq!(s.player.feet(), s.viewport.floor_y);
        assert_eq!(s.platforms.len(), Platform::layout(&s.viewport).len());
    }
}
