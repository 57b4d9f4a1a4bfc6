//! Collision detection and resolution
//!
//! Runs after every entity has moved. Bullets are points tested against
//! bodies; the player and pickups are boxes. Splash damage is resolved here
//! from detonation points, so projectiles never need to see the enemy list.

use glam::Vec2;
use rand::Rng;

use super::spawn;
use super::state::{GameEvent, GameState, ItemKind, Notice, palette};
use crate::consts::{HEAL_DROP_CHANCE, SPLASH_RADIUS};

/// An explosive round going off
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detonation {
    pub pos: Vec2,
    pub damage: f32,
}

/// Resolve every contact for this tick. `detonations` holds explosions
/// already triggered by bullet movement (floor or field edge).
pub fn resolve(state: &mut GameState, mut detonations: Vec<Detonation>) {
    player_bullets(state, &mut detonations);
    for blast in detonations {
        splash(state, blast);
    }
    reap_enemies(state);
    hostile_bullets(state);
    pickups(state);
}

/// Player rounds against the boss first, then the first enemy they touch
fn player_bullets(state: &mut GameState, detonations: &mut Vec<Detonation>) {
    let mut bullets = std::mem::take(&mut state.player_bullets);
    for b in bullets.iter_mut().filter(|b| b.active) {
        let on_boss = state
            .boss
            .as_ref()
            .is_some_and(|boss| boss.rect().contains(b.pos));
        if on_boss {
            b.active = false;
            if b.explosive {
                detonations.push(Detonation {
                    pos: b.pos,
                    damage: b.damage,
                });
            } else {
                damage_boss(state, b.damage);
                state.fx.burst(b.pos, 3, palette::SPARK);
            }
            continue;
        }

        let Some(enemy) = state
            .enemies
            .iter_mut()
            .find(|e| !e.is_dead() && e.rect().contains(b.pos))
        else {
            continue;
        };
        b.active = false;
        if b.explosive {
            detonations.push(Detonation {
                pos: b.pos,
                damage: b.damage,
            });
        } else {
            enemy.take_damage(b.damage);
            state.fx.burst(b.pos, 3, palette::BLOOD);
        }
    }
    state.player_bullets = bullets;
}

/// Damage the boss and every enemy whose center is within the blast radius
fn splash(state: &mut GameState, blast: Detonation) {
    state.fx.burst(blast.pos, 30, palette::FIRE);
    for enemy in &mut state.enemies {
        if enemy.center().distance(blast.pos) < SPLASH_RADIUS {
            enemy.take_damage(blast.damage);
        }
    }
    let boss_in_range = state
        .boss
        .as_ref()
        .is_some_and(|boss| boss.center().distance(blast.pos) < SPLASH_RADIUS);
    if boss_in_range {
        damage_boss(state, blast.damage);
    }
}

/// Remove dead enemies and pay out their kill rewards
fn reap_enemies(state: &mut GameState) {
    let (dead, alive): (Vec<_>, Vec<_>) = std::mem::take(&mut state.enemies)
        .into_iter()
        .partition(|e| e.is_dead());
    state.enemies = alive;

    for enemy in dead {
        if state.rng.random_bool(HEAL_DROP_CHANCE) {
            state.drop_item(ItemKind::Heal, enemy.pos);
        }
        state.score += enemy.score;
        state.player.gain_ult(state.tuning.ult_kill_gain);
        state.fx.burst(enemy.center(), 10, palette::BLOOD);
        state.events.push(GameEvent::EnemyKilled {
            kind: enemy.kind,
            pos: enemy.center(),
        });
        log::debug!("Killed {} #{} (+{})", enemy.kind.name(), enemy.id, enemy.score);
    }
}

/// Enemy and boss rounds against the player
fn hostile_bullets(state: &mut GameState) {
    let body = state.player.rect();
    let poison = state.tuning.poison_duration;
    for b in state.enemy_bullets.iter_mut().filter(|b| b.active) {
        if !body.contains(b.pos) {
            continue;
        }
        b.active = false;
        state.player.take_damage(b.damage);
        if b.poison && state.player.apply_poison(poison) {
            state.events.push(GameEvent::Notify(Notice::Poisoned));
        }
    }
}

/// Apply and remove every item the player is touching
fn pickups(state: &mut GameState) {
    let body = state.player.rect();
    let (taken, left): (Vec<_>, Vec<_>) = std::mem::take(&mut state.items)
        .into_iter()
        .partition(|item| body.overlaps(&item.rect()));
    state.items = left;
    for item in taken {
        apply_pickup(state, item.kind);
    }
}

fn apply_pickup(state: &mut GameState, kind: ItemKind) {
    let tuning = &state.tuning;
    let player = &mut state.player;
    let notice = match kind {
        ItemKind::Heal => {
            player.hp = (player.hp + tuning.heal_amount).min(player.max_hp);
            Some(Notice::Healed)
        }
        ItemKind::Upgrade => {
            player.damage += tuning.upgrade_damage;
            player.gun_level += 1;
            Some(Notice::WeaponUpgrade)
        }
        ItemKind::Shield => {
            player.shield = tuning.shield_amount;
            Some(Notice::ShieldEquipped)
        }
        ItemKind::Score => {
            state.score += tuning.score_pickup;
            None
        }
        ItemKind::MaxHp => {
            player.max_hp += tuning.max_hp_gain;
            player.hp = (player.hp + tuning.max_hp_gain).min(player.max_hp);
            Some(Notice::MaxHpIncreased)
        }
        ItemKind::FireRate => {
            player.fire_rate = player
                .fire_rate
                .saturating_sub(tuning.fire_rate_step)
                .max(tuning.fire_rate_floor);
            Some(Notice::RapidFire)
        }
    };
    state.events.push(GameEvent::ItemPicked { kind });
    if let Some(notice) = notice {
        state.notify(notice);
    }
}

/// Damage the live boss; kills are settled immediately
pub fn damage_boss(state: &mut GameState, amount: f32) {
    let Some(boss) = state.boss.as_mut() else {
        return;
    };
    let (_, notice) = boss.take_damage(amount);
    let (hp, max_hp) = (boss.hp, boss.max_hp);
    let dead = boss.is_dead();
    state.events.push(GameEvent::BossDamaged { hp, max_hp });
    if let Some(notice) = notice {
        state.notify(notice);
    }
    if dead {
        defeat_boss(state);
    }
}

/// Pay out the boss rewards and roll over to the next wave
fn defeat_boss(state: &mut GameState) {
    let Some(boss) = state.boss.take() else {
        return;
    };
    let wave = state.wave;
    state.fx.burst(boss.center(), 100, palette::GOLD);
    state.score += 1000 + 500 * wave as u64;
    state.events.push(GameEvent::BossDefeated {
        kind: boss.kind.label(),
        wave,
    });
    log::info!("Boss {} defeated on wave {}, score {}", boss.kind.label(), wave, state.score);

    let y = state.viewport.floor_y - 30.0;
    let x = boss.pos.x;
    state.drop_item(ItemKind::Heal, Vec2::new(x, y));
    state.drop_item(ItemKind::Score, Vec2::new(x + 40.0, y));
    state.drop_item(ItemKind::MaxHp, Vec2::new(x + 80.0, y));

    state.wave += 1;
    spawn::init_wave(state);
}
