//! Wave scheduler: per-archetype spawn budgets, timed drops and the boss trigger

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::boss::Boss;
use super::enemy::{Enemy, EnemyKind};
use super::state::{GameEvent, GameState, ItemKind, Notice};
use super::weather::{self, Weather};
use crate::consts::{MAX_FIRE_RATE_DROPS_PER_WAVE, MAX_HEAL_DROPS_PER_WAVE, SUPPLY_DROP_INTERVAL};

/// Upgrade drops never land this close to either end of a wave
const UPGRADE_MARGIN: u32 = 200;
/// Airdrops start above the top edge
const DROP_HEIGHT: f32 = -50.0;

/// Spawn allowance for one archetype during one wave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpawnBudget {
    /// Spawned so far this wave
    pub count: u32,
    pub max: u32,
    /// Frames until the next spawn attempt
    pub timer: u32,
}

impl SpawnBudget {
    fn new(max: u32, timer: u32) -> Self {
        Self { count: 0, max, timer }
    }

    pub fn exhausted(&self) -> bool {
        self.count >= self.max
    }
}

/// Per-wave schedule, rebuilt by [`init_wave`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveSchedule {
    /// Indexed in [`EnemyKind::ALL`] order
    budgets: [SpawnBudget; 5],
    /// Wave-timer values at which a weapon upgrade drops
    pub upgrade_frames: Vec<u32>,
    pub heal_drops: u32,
    pub fire_rate_drops: u32,
}

fn slot(kind: EnemyKind) -> usize {
    match kind {
        EnemyKind::Soldier => 0,
        EnemyKind::Drone => 1,
        EnemyKind::Tank => 2,
        EnemyKind::Toxic => 3,
        EnemyKind::Shielded => 4,
    }
}

impl WaveSchedule {
    pub fn budget(&self, kind: EnemyKind) -> &SpawnBudget {
        &self.budgets[slot(kind)]
    }

    fn budget_mut(&mut self, kind: EnemyKind) -> &mut SpawnBudget {
        &mut self.budgets[slot(kind)]
    }
}

/// Budget for `kind` at the start of `wave`
fn opening_budget(kind: EnemyKind, wave: u32) -> SpawnBudget {
    let extra = wave.saturating_sub(1);
    match kind {
        EnemyKind::Soldier => SpawnBudget::new(14 + 3 * extra, 60),
        EnemyKind::Drone => SpawnBudget::new(2 + extra, 120),
        EnemyKind::Tank => SpawnBudget::new(if wave >= 2 { 3 } else { 0 }, 600),
        EnemyKind::Toxic => SpawnBudget::new(if wave >= 3 { 7 } else { 0 }, 240),
        EnemyKind::Shielded => SpawnBudget::new(if wave >= 5 { 2 } else { 0 }, 720),
    }
}

/// Frames until the next spawn of `kind` after one has just appeared
fn respawn_delay(kind: EnemyKind, rng: &mut impl Rng) -> u32 {
    match kind {
        EnemyKind::Soldier => rng.random_range(60..180),
        EnemyKind::Drone => rng.random_range(180..300),
        EnemyKind::Tank => 600,
        EnemyKind::Toxic => 240,
        EnemyKind::Shielded => 720,
    }
}

/// Reset the wave clock, drop counters and spawn budgets for `state.wave`
pub fn init_wave(state: &mut GameState) {
    let duration = state.tuning.wave_duration;
    state.wave_timer = duration;

    let upper = duration.saturating_sub(UPGRADE_MARGIN).max(UPGRADE_MARGIN + 1);
    let upgrade_frames = (0..state.tuning.upgrade_drops_per_wave)
        .map(|_| state.rng.random_range(UPGRADE_MARGIN..upper))
        .collect();

    let wave = state.wave;
    state.schedule = WaveSchedule {
        budgets: EnemyKind::ALL.map(|kind| opening_budget(kind, wave)),
        upgrade_frames,
        heal_drops: 0,
        fire_rate_drops: 0,
    };
    state.events.push(GameEvent::WaveStarted { wave });
    log::info!("Wave {} started ({} frames)", wave, duration);
}

/// Count down the wave clock; spawn the boss when it runs out.
/// The clock is frozen while a boss is alive.
pub fn advance_wave_timer(state: &mut GameState) {
    if state.boss.is_some() {
        return;
    }
    state.wave_timer = state.wave_timer.saturating_sub(1);
    if state.wave_timer == 0 {
        spawn_boss(state);
    }
}

fn spawn_boss(state: &mut GameState) {
    let boss = Boss::spawn(state);
    let label = boss.kind.label();
    log::info!("Boss {} spawned on wave {} ({} hp)", label, state.wave, boss.max_hp);
    state.boss = Some(boss);
    state.notify(Notice::BossSpawned);
    state.notify(Notice::BossEngaged);
    state.events.push(GameEvent::BossSpawned { kind: label });
    weather::set_weather(state, Weather::Clear);
}

/// Tick each archetype's budget and spawn whatever is due
pub fn spawn_enemies(state: &mut GameState) {
    if state.boss.is_some() {
        return;
    }
    for kind in EnemyKind::ALL {
        let budget = state.schedule.budget_mut(kind);
        if budget.exhausted() {
            continue;
        }
        budget.timer = budget.timer.saturating_sub(1);
        if budget.timer > 0 {
            continue;
        }
        budget.count += 1;

        let delay = respawn_delay(kind, &mut state.rng);
        state.schedule.budget_mut(kind).timer = delay;
        let enemy = Enemy::spawn(state, kind);
        log::debug!("Spawned {} #{} (wave {})", kind.name(), enemy.id, state.wave);
        state.enemies.push(enemy);
    }
}

/// Roll the contents of a supply crate, honoring per-wave caps
fn supply_kind(state: &mut GameState) -> ItemKind {
    let roll = state.rng.random::<f32>();
    let schedule = &mut state.schedule;
    if roll < 0.35 {
        if schedule.heal_drops < MAX_HEAL_DROPS_PER_WAVE {
            schedule.heal_drops += 1;
            ItemKind::Heal
        } else {
            ItemKind::Score
        }
    } else if roll < 0.70 {
        ItemKind::Shield
    } else if roll < 0.90 {
        if schedule.fire_rate_drops < MAX_FIRE_RATE_DROPS_PER_WAVE {
            schedule.fire_rate_drops += 1;
            ItemKind::FireRate
        } else {
            ItemKind::Score
        }
    } else {
        ItemKind::Score
    }
}

/// Periodic supply crates and the scheduled weapon upgrades
pub fn special_events(state: &mut GameState) {
    if state.boss.is_some() {
        return;
    }

    if state.frame > 0 && state.frame % SUPPLY_DROP_INTERVAL == 0 {
        let kind = supply_kind(state);
        let x = state.random_drop_x();
        state.drop_item(kind, Vec2::new(x, DROP_HEIGHT));
        state.notify(Notice::SuppliesIncoming);
    }

    if state.schedule.upgrade_frames.contains(&state.wave_timer) {
        let x = state.random_drop_x();
        state.drop_item(ItemKind::Upgrade, Vec2::new(x, DROP_HEIGHT));
        state.notify(Notice::WeaponDrop);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Viewport;

    fn state() -> GameState {
        GameState::new(11, Viewport::new(1280.0, 800.0))
    }

    #[test]
    fn test_wave_one_budgets() {
        let s = state();
        assert_eq!(s.schedule.budget(EnemyKind::Soldier).max, 14);
        assert_eq!(s.schedule.budget(EnemyKind::Drone).max, 2);
        assert_eq!(s.schedule.budget(EnemyKind::Tank).max, 0);
        assert_eq!(s.schedule.budget(EnemyKind::Toxic).max, 0);
        assert_eq!(s.schedule.budget(EnemyKind::Shielded).max, 0);
        assert_eq!(s.wave_timer, 2400);
    }

    #[test]
    fn test_later_waves_unlock_archetypes() {
        let mut s = state();
        s.wave = 5;
        init_wave(&mut s);
        assert_eq!(s.schedule.budget(EnemyKind::Soldier).max, 26);
        assert_eq!(s.schedule.budget(EnemyKind::Drone).max, 6);
        assert_eq!(s.schedule.budget(EnemyKind::Tank).max, 3);
        assert_eq!(s.schedule.budget(EnemyKind::Toxic).max, 7);
        assert_eq!(s.schedule.budget(EnemyKind::Shielded).max, 2);
        assert!(s.events.contains(&GameEvent::WaveStarted { wave: 5 }));
    }

    #[test]
    fn test_upgrade_frames_inside_wave() {
        for seed in 0..50 {
            let s = GameState::new(seed, Viewport::new(1280.0, 800.0));
            assert_eq!(s.schedule.upgrade_frames.len(), 3);
            assert!(s.schedule.upgrade_frames.iter().all(|f| (200..2200).contains(f)));
        }
    }

    #[test]
    fn test_first_soldier_after_sixty_frames() {
        let mut s = state();
        for _ in 0..59 {
            spawn_enemies(&mut s);
        }
        assert!(s.enemies.is_empty());
        spawn_enemies(&mut s);
        assert_eq!(s.enemies.len(), 1);
        assert_eq!(s.enemies[0].kind, EnemyKind::Soldier);
    }

    #[test]
    fn test_budget_never_exceeded() {
        let mut s = state();
        for _ in 0..10_000 {
            spawn_enemies(&mut s);
        }
        let soldiers = s.enemies.iter().filter(|e| e.kind == EnemyKind::Soldier).count();
        let drones = s.enemies.iter().filter(|e| e.kind == EnemyKind::Drone).count();
        assert_eq!(soldiers, 14);
        assert_eq!(drones, 2);
    }

    #[test]
    fn test_boss_spawns_when_clock_runs_out() {
        let mut s = state();
        s.wave_timer = 1;
        s.weather = Weather::Storm;
        advance_wave_timer(&mut s);
        assert!(s.boss.is_some());
        assert_eq!(s.weather, Weather::Clear);
        assert!(s.events.contains(&GameEvent::BossSpawned { kind: "IRON CLAD" }));

        // Clock frozen, normal spawns suspended
        advance_wave_timer(&mut s);
        assert_eq!(s.wave_timer, 0);
        for _ in 0..200 {
            spawn_enemies(&mut s);
        }
        assert!(s.enemies.is_empty());
    }

    #[test]
    fn test_supply_drop_every_interval() {
        let mut s = state();
        s.schedule.upgrade_frames.clear();
        s.frame = SUPPLY_DROP_INTERVAL - 1;
        special_events(&mut s);
        assert!(s.items.is_empty());
        s.frame = SUPPLY_DROP_INTERVAL;
        special_events(&mut s);
        assert_eq!(s.items.len(), 1);
        assert!(s.items[0].pos.x >= 50.0 && s.items[0].pos.x <= 1230.0);
        assert_eq!(s.items[0].pos.y, DROP_HEIGHT);
    }

    #[test]
    fn test_supply_caps_fall_back_to_score() {
        let mut s = state();
        s.schedule.heal_drops = MAX_HEAL_DROPS_PER_WAVE;
        s.schedule.fire_rate_drops = MAX_FIRE_RATE_DROPS_PER_WAVE;
        for _ in 0..200 {
            let kind = supply_kind(&mut s);
            assert!(matches!(kind, ItemKind::Shield | ItemKind::Score));
        }
    }

    #[test]
    fn test_upgrade_drop_on_schedule() {
        let mut s = state();
        s.frame = 1;
        s.schedule.upgrade_frames = vec![1000];
        s.wave_timer = 1000;
        special_events(&mut s);
        assert_eq!(s.items.len(), 1);
        assert_eq!(s.items[0].kind, ItemKind::Upgrade);
        assert!(s.events.contains(&GameEvent::Notify(Notice::WeaponDrop)));
    }
}
