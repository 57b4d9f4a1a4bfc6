//! Enemy archetypes, movement and fire control

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::state::{Bullet, Deferred, GameState, absorb_damage};
use crate::aim_velocity;

/// Enemy archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Basic ground shooter
    Soldier,
    /// Flying, bobbing, fires an aimed pair
    Drone,
    /// Slow, heavy, three-way spread
    Tank,
    /// Poison rounds
    Toxic,
    /// Carries a shield that absorbs damage before hp
    Shielded,
}

/// Fixed per-archetype profile before wave scaling
#[derive(Debug, Clone, Copy)]
pub struct Profile {
    pub base_hp: f32,
    pub base_speed: f32,
    pub size: Vec2,
    pub score: u64,
    pub color: u32,
}

/// Frames between a drone's first and second shot
pub const DRONE_FOLLOW_UP_DELAY: u64 = 12;
/// Extra random frames added to every enemy's fire cooldown
pub const FIRE_JITTER: u32 = 20;

impl EnemyKind {
    pub const ALL: [EnemyKind; 5] = [
        EnemyKind::Soldier,
        EnemyKind::Drone,
        EnemyKind::Tank,
        EnemyKind::Toxic,
        EnemyKind::Shielded,
    ];

    pub fn profile(&self) -> Profile {
        match self {
            EnemyKind::Soldier => Profile {
                base_hp: 40.0,
                base_speed: 1.0,
                size: Vec2::new(40.0, 70.0),
                score: 50,
                color: 0x2ecc71,
            },
            EnemyKind::Drone => Profile {
                base_hp: 30.0,
                base_speed: 2.0,
                size: Vec2::new(30.0, 30.0),
                score: 80,
                color: 0xe74c3c,
            },
            EnemyKind::Tank => Profile {
                base_hp: 400.0,
                base_speed: 0.5,
                size: Vec2::new(60.0, 90.0),
                score: 300,
                color: 0x555555,
            },
            EnemyKind::Toxic => Profile {
                base_hp: 50.0,
                base_speed: 1.5,
                size: Vec2::new(40.0, 70.0),
                score: 150,
                color: 0x006400,
            },
            EnemyKind::Shielded => Profile {
                base_hp: 80.0,
                base_speed: 1.2,
                size: Vec2::new(45.0, 75.0),
                score: 200,
                color: 0x34495e,
            },
        }
    }

    /// Starting shield for this archetype at `wave`
    pub fn shield(&self, wave: u32) -> f32 {
        match self {
            EnemyKind::Shielded => 150.0 + wave as f32 * 50.0,
            EnemyKind::Soldier | EnemyKind::Drone | EnemyKind::Tank | EnemyKind::Toxic => 0.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EnemyKind::Soldier => "SOLDIER",
            EnemyKind::Drone => "DRONE",
            EnemyKind::Tank => "TANK",
            EnemyKind::Toxic => "POISON",
            EnemyKind::Shielded => "SHIELDED",
        }
    }
}

/// A live enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub vel_x: f32,
    pub speed: f32,
    pub hp: f32,
    pub shield: f32,
    /// Frames between volleys
    pub fire_rate: u32,
    /// Frame of the next volley
    pub next_shot: u64,
    /// Fully inside the field at least once; switches entry to patrol
    pub entered: bool,
    pub score: u64,
}

impl Enemy {
    /// Spawn an enemy of `kind` scaled to the state's current wave
    pub fn spawn(state: &mut GameState, kind: EnemyKind) -> Enemy {
        let profile = kind.profile();
        let wave = state.wave as f32;
        let speed = profile.base_speed + wave * 0.05;
        let vp = state.viewport;

        let (x, vel_x) = if state.rng.random_bool(0.5) {
            (-50.0, speed)
        } else {
            (vp.width + 50.0, -speed)
        };
        let y = match kind {
            EnemyKind::Drone => 50.0 + state.rng.random::<f32>() * (vp.floor_y - 250.0).max(0.0),
            EnemyKind::Soldier | EnemyKind::Tank | EnemyKind::Toxic | EnemyKind::Shielded => {
                vp.floor_y - profile.size.y
            }
        };
        let fire_rate = 160u32.saturating_sub(state.wave * 5).max(50);
        let first_shot_delay = state.rng.random_range(0..100u64);

        Enemy {
            id: state.next_entity_id(),
            kind,
            pos: Vec2::new(x, y),
            size: profile.size,
            vel_x,
            speed,
            hp: profile.base_hp + wave * 15.0,
            shield: kind.shield(state.wave),
            fire_rate,
            next_shot: state.frame + fire_rate as u64 + first_shot_delay,
            entered: false,
            score: profile.score,
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

    /// Muzzle: front edge at mid height
    pub fn muzzle(&self) -> Vec2 {
        Vec2::new(self.pos.x, self.pos.y + self.size.y / 2.0)
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    /// Shield-first damage, identical to the player's
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        absorb_damage(&mut self.shield, &mut self.hp, amount)
    }

    /// Shot damage at `wave`
    pub fn shot_damage(wave: u32) -> f32 {
        10.0 + wave as f32 * 2.0
    }

    /// Move one tick: inward until entered, then bounce between the edges
    pub fn advance(&mut self, field_width: f32, frame: u64) {
        self.vel_x = self.speed.copysign(self.vel_x);
        self.pos.x += self.vel_x;

        let max_x = field_width - self.size.x;
        if !self.entered {
            if self.pos.x > 0.0 && self.pos.x < max_x {
                self.entered = true;
            }
        } else if self.pos.x <= 0.0 {
            self.vel_x = self.speed.abs();
        } else if self.pos.x >= max_x {
            self.vel_x = -self.speed.abs();
        }

        match self.kind {
            EnemyKind::Drone => self.pos.y += (frame as f32 * 0.1).sin() * 2.0,
            EnemyKind::Soldier | EnemyKind::Tank | EnemyKind::Toxic | EnemyKind::Shielded => {}
        }
    }

    /// Whether the muzzle is inside the field horizontally
    pub fn can_fire(&self, field_width: f32) -> bool {
        self.pos.x > 0.0 && self.pos.x < field_width
    }
}

/// Emit this archetype's volley toward `target`
fn fire(enemy: &Enemy, target: Vec2, wave: u32) -> Vec<Bullet> {
    let origin = enemy.muzzle();
    let dmg = Enemy::shot_damage(wave);
    let angle = crate::angle_to(origin, target);
    match enemy.kind {
        EnemyKind::Tank => (-1..=1)
            .map(|i| {
                let a = angle + i as f32 * 0.2;
                Bullet::new(origin, crate::velocity_at(a, 5.0), dmg)
            })
            .collect(),
        EnemyKind::Drone => vec![Bullet::new(origin, crate::velocity_at(angle, 6.0), dmg)],
        EnemyKind::Toxic => vec![Bullet::new(origin, crate::velocity_at(angle, 5.0), dmg).poisoned()],
        EnemyKind::Shielded => vec![Bullet::new(origin, crate::velocity_at(angle, 10.0), dmg + 5.0)],
        EnemyKind::Soldier => vec![Bullet::new(origin, crate::velocity_at(angle, 5.0), dmg)],
    }
}

/// Move every enemy and run its fire control
pub fn update_all(state: &mut GameState) {
    let target = state.player.center();
    let width = state.viewport.width;
    let frame = state.frame;
    let wave = state.wave;

    let mut enemies = std::mem::take(&mut state.enemies);
    for enemy in &mut enemies {
        enemy.advance(width, frame);

        if enemy.can_fire(width) && frame >= enemy.next_shot {
            state.enemy_bullets.extend(fire(enemy, target, wave));
            if enemy.kind == EnemyKind::Drone {
                state.schedule_in(
                    DRONE_FOLLOW_UP_DELAY,
                    Deferred::DroneFollowUp { enemy_id: enemy.id },
                );
            }
            let jitter = state.rng.random_range(0..=FIRE_JITTER);
            enemy.next_shot = frame + (enemy.fire_rate + jitter) as u64;
        }
    }
    state.enemies = enemies;
}

/// Run deferred enemy actions that fall due this frame
pub fn run_deferred(state: &mut GameState) {
    for action in state.take_due_actions() {
        match action {
            Deferred::DroneFollowUp { enemy_id } => {
                // The drone may have died in the meantime
                let Some(drone) = state.enemies.iter().find(|e| e.id == enemy_id) else {
                    continue;
                };
                let origin = drone.muzzle();
                let vel = aim_velocity(origin, state.player.center(), 6.0);
                let bullet = Bullet::new(origin, vel, Enemy::shot_damage(state.wave));
                state.enemy_bullets.push(bullet);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Viewport;

    fn state() -> GameState {
        GameState::new(7, Viewport::new(1280.0, 800.0))
    }

    #[test]
    fn test_stats_scale_with_wave() {
        let mut s = state();
        let w1 = Enemy::spawn(&mut s, EnemyKind::Soldier);
        s.wave = 6;
        let w6 = Enemy::spawn(&mut s, EnemyKind::Soldier);
        assert!(w6.hp > w1.hp);
        assert!(w6.speed > w1.speed);
        assert!(w6.fire_rate < w1.fire_rate);
        assert_eq!(w1.hp, 40.0 + 15.0);
        assert_eq!(w6.fire_rate, 130);
    }

    #[test]
    fn test_fire_rate_floor() {
        let mut s = state();
        s.wave = 40;
        assert_eq!(Enemy::spawn(&mut s, EnemyKind::Tank).fire_rate, 50);
    }

    #[test]
    fn test_spawns_offscreen_moving_inward() {
        let mut s = state();
        for _ in 0..20 {
            let e = Enemy::spawn(&mut s, EnemyKind::Toxic);
            if e.pos.x < 0.0 {
                assert!(e.vel_x > 0.0);
            } else {
                assert!(e.pos.x > s.viewport.width);
                assert!(e.vel_x < 0.0);
            }
            assert_eq!(e.pos.y + e.size.y, s.viewport.floor_y);
        }
    }

    #[test]
    fn test_only_shielded_carries_shield() {
        let mut s = state();
        s.wave = 5;
        assert_eq!(Enemy::spawn(&mut s, EnemyKind::Shielded).shield, 400.0);
        assert_eq!(Enemy::spawn(&mut s, EnemyKind::Soldier).shield, 0.0);
    }

    #[test]
    fn test_shield_absorbs_then_overflows() {
        let mut s = state();
        let mut e = Enemy::spawn(&mut s, EnemyKind::Shielded);
        let hp = e.hp;
        e.shield = 30.0;
        e.take_damage(20.0);
        assert_eq!(e.hp, hp);
        e.take_damage(20.0);
        assert_eq!(e.shield, 0.0);
        assert_eq!(e.hp, hp - 10.0);
    }

    #[test]
    fn test_patrol_bounces_instead_of_leaving() {
        let mut s = state();
        let mut e = Enemy::spawn(&mut s, EnemyKind::Drone);
        let width = s.viewport.width;
        for frame in 0..5000 {
            e.advance(width, frame);
        }
        assert!(e.entered);
        assert!(e.pos.x > -e.speed - 1.0 && e.pos.x < width);
    }

    #[test]
    fn test_tank_fires_three_way_spread() {
        let mut s = state();
        let e = Enemy::spawn(&mut s, EnemyKind::Tank);
        let shots = fire(&e, Vec2::new(640.0, 600.0), 1);
        assert_eq!(shots.len(), 3);
        assert!(shots.iter().all(|b| (b.vel.length() - 5.0).abs() < 1e-4));
    }

    #[test]
    fn test_toxic_rounds_poison() {
        let mut s = state();
        let e = Enemy::spawn(&mut s, EnemyKind::Toxic);
        let shots = fire(&e, Vec2::ZERO, 1);
        assert!(shots.iter().all(|b| b.poison));
    }

    #[test]
    fn test_drone_follow_up_is_scheduled_and_fired() {
        let mut s = state();
        let mut drone = Enemy::spawn(&mut s, EnemyKind::Drone);
        drone.pos.x = 600.0;
        drone.entered = true;
        drone.next_shot = 0;
        s.enemies.push(drone);

        s.frame = 10;
        update_all(&mut s);
        assert_eq!(s.enemy_bullets.len(), 1);
        assert_eq!(s.pending.len(), 1);

        s.frame = 10 + DRONE_FOLLOW_UP_DELAY - 1;
        run_deferred(&mut s);
        assert_eq!(s.enemy_bullets.len(), 1);

        s.frame = 10 + DRONE_FOLLOW_UP_DELAY;
        run_deferred(&mut s);
        assert_eq!(s.enemy_bullets.len(), 2);
        assert!(s.pending.is_empty());
    }

    #[test]
    fn test_drone_follow_up_dropped_when_drone_dead() {
        let mut s = state();
        s.schedule_in(0, Deferred::DroneFollowUp { enemy_id: 999 });
        run_deferred(&mut s);
        assert!(s.enemy_bullets.is_empty());
    }
}
