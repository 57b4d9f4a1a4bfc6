//! Player controller: movement, jumping, platforms, poison and weapons

use glam::Vec2;

use super::state::{Bullet, GameState, Notice, palette};
use super::tick::TickInput;
use crate::aim_velocity;
use crate::consts::{GRAVITY, MOVE_DAMPING, PLATFORM_LANDING_TOLERANCE};

/// Advance the player one tick from this frame's input
pub fn update(state: &mut GameState, input: &TickInput) {
    let prev = state.prev_input.clone();

    // Ultimate cooldown, then the rising edge that can trigger it
    let player = &mut state.player;
    player.ult_timer = player.ult_timer.saturating_sub(1);
    if input.ultimate && !prev.ultimate && player.ult_timer == 0 {
        release_ultimate(state, input.aim);
    }

    tick_poison(state);

    let tuning = &state.tuning;
    let player = &mut state.player;
    player.set_crouch(input.crouch);

    if input.left {
        player.vel.x = -player.speed;
    } else if input.right {
        player.vel.x = player.speed;
    } else {
        player.vel.x *= MOVE_DAMPING;
    }

    let mut jumped = false;
    if input.jump && !prev.jump && !player.crouching && player.jump_count < player.max_jumps {
        player.vel.y = if player.jump_count == 0 {
            -tuning.jump_power
        } else {
            -tuning.double_jump_power
        };
        player.grounded = false;
        player.jump_count += 1;
        jumped = true;
    }

    player.vel.y += GRAVITY;
    player.pos += player.vel;

    let floor_y = state.viewport.floor_y;
    if player.feet() > floor_y {
        player.pos.y = floor_y - player.height;
        player.vel.y = 0.0;
        player.grounded = true;
        player.jump_count = 0;
    }

    let mut on_platform = false;
    for platform in &state.platforms {
        let r = platform.rect;
        let feet = player.feet();
        if player.vel.y >= 0.0
            && feet >= r.top()
            && feet <= r.bottom() + PLATFORM_LANDING_TOLERANCE
            && player.pos.x + player.width > r.left()
            && player.pos.x < r.right()
        {
            player.pos.y = r.top() - player.height;
            player.vel.y = 0.0;
            player.grounded = true;
            player.jump_count = 0;
            on_platform = true;
        }
    }

    if player.feet() >= floor_y {
        player.grounded = true;
    } else if !on_platform {
        player.grounded = false;
    }

    let max_x = (state.viewport.width - player.width).max(0.0);
    player.pos.x = player.pos.x.clamp(0.0, max_x);

    if jumped {
        let feet = Vec2::new(player.center().x, player.feet());
        state.fx.burst(feet, 5, palette::WHITE);
    }

    if input.fire {
        shoot(state, input.aim);
    }
}

/// Count down poison, biting every `poison_interval` frames
fn tick_poison(state: &mut GameState) {
    let interval = state.tuning.poison_interval;
    let damage = state.tuning.poison_damage;
    let player = &mut state.player;
    if player.poison_timer == 0 {
        player.poison_tick = 0;
        return;
    }
    player.poison_timer -= 1;
    player.poison_tick += 1;
    if player.poison_tick >= interval {
        player.take_damage(damage);
        player.poison_tick = 0;
        let head = player.center().with_y(player.pos.y);
        state.fx.burst(head, 5, palette::TOXIC);
    }
}

/// Fire a regular shot if the weapon has cooled down
fn shoot(state: &mut GameState, aim: Vec2) {
    let frame = state.frame;
    let player = &mut state.player;
    let ready = match player.last_shot {
        None => true,
        Some(last) => frame.saturating_sub(last) >= player.fire_rate as u64,
    };
    if !ready {
        return;
    }
    player.last_shot = Some(frame);
    let origin = player.center();
    let vel = aim_velocity(origin, aim, state.tuning.player_bullet_speed);
    state
        .player_bullets
        .push(Bullet::new(origin, vel, player.damage));
}

/// Launch the explosive ultimate round and start the cooldown
fn release_ultimate(state: &mut GameState, aim: Vec2) {
    let player = &mut state.player;
    player.ult_timer = player.ult_max_cooldown;
    let origin = player.center();
    let vel = aim_velocity(origin, aim, state.tuning.ult_speed);
    state
        .player_bullets
        .push(Bullet::new(origin, vel, state.tuning.ult_damage).explosive());
    state.notify(Notice::UltimateReleased);
    log::debug!("Ultimate released at frame {}", state.frame);
}
