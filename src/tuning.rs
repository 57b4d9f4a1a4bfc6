//! Data-driven game balance
//!
//! Every number a designer would reasonably tweak between builds lives here.
//! Geometry and timing that the simulation depends on structurally stay in
//! [`crate::consts`].

use serde::{Deserialize, Serialize};

use crate::settings::ConfigError;

/// Balance parameters for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    pub player_max_hp: f32,
    pub player_speed: f32,
    /// Upward velocity of the first jump (positive = up)
    pub jump_power: f32,
    /// Upward velocity of the second (air) jump
    pub double_jump_power: f32,
    pub max_jumps: u32,
    pub player_damage: f32,
    /// Frames between player shots
    pub player_fire_rate: u32,
    pub player_bullet_speed: f32,

    // === Ultimate ===
    /// Cooldown after activation, in frames
    pub ult_cooldown: u32,
    pub ult_damage: f32,
    pub ult_speed: f32,
    /// Fraction of the full cooldown removed per enemy kill
    pub ult_kill_gain: f32,

    // === Poison ===
    pub poison_duration: u32,
    pub poison_interval: u32,
    pub poison_damage: f32,

    // === Pickups ===
    pub heal_amount: f32,
    pub shield_amount: f32,
    pub score_pickup: u64,
    pub max_hp_gain: f32,
    pub upgrade_damage: f32,
    /// Frames removed from the player's fire cooldown per FIRERATE pickup
    pub fire_rate_step: u32,
    /// Fastest allowed player fire cooldown
    pub fire_rate_floor: u32,

    // === Waves ===
    pub wave_duration: u32,
    pub upgrade_drops_per_wave: u32,

    // === Boss ===
    pub boss_charge_cap: u32,
    pub boss_charge_rate: u32,
    pub locked_beam_damage: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_max_hp: 100.0,
            player_speed: 4.0,
            jump_power: 13.0,
            double_jump_power: 12.0,
            max_jumps: 2,
            player_damage: 20.0,
            player_fire_rate: 15,
            player_bullet_speed: 10.0,

            ult_cooldown: 40 * 60,
            ult_damage: 100.0,
            ult_speed: 8.0,
            ult_kill_gain: 0.02,

            poison_duration: 300,
            poison_interval: 60,
            poison_damage: 2.0,

            heal_amount: 30.0,
            shield_amount: 50.0,
            score_pickup: 500,
            max_hp_gain: 5.0,
            upgrade_damage: 5.0,
            fire_rate_step: 5,
            fire_rate_floor: 5,

            wave_duration: 40 * 60,
            upgrade_drops_per_wave: 3,

            boss_charge_cap: 1000,
            boss_charge_rate: 2,
            locked_beam_damage: 40.0,
        }
    }
}

impl Tuning {
    /// Parse and validate a tuning table from JSON (missing keys keep defaults)
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.player_max_hp <= 0.0 {
            return Err(ConfigError::Invalid("player_max_hp must be positive".into()));
        }
        if self.fire_rate_floor == 0 || self.player_fire_rate < self.fire_rate_floor {
            return Err(ConfigError::Invalid(
                "player_fire_rate must be at least fire_rate_floor (>= 1)".into(),
            ));
        }
        if self.ult_cooldown == 0 {
            return Err(ConfigError::Invalid("ult_cooldown must be non-zero".into()));
        }
        if !(0.0..=1.0).contains(&self.ult_kill_gain) {
            return Err(ConfigError::Invalid("ult_kill_gain must be within 0..=1".into()));
        }
        if self.poison_interval == 0 {
            return Err(ConfigError::Invalid("poison_interval must be non-zero".into()));
        }
        // Upgrade drops are rolled inside [200, wave_duration - 200)
        if self.wave_duration <= 400 {
            return Err(ConfigError::Invalid("wave_duration must exceed 400 frames".into()));
        }
        if self.boss_charge_rate == 0 {
            return Err(ConfigError::Invalid("boss_charge_rate must be non-zero".into()));
        }
        if self.boss_charge_cap == 0 {
            return Err(ConfigError::Invalid("boss_charge_cap must be non-zero".into()));
        }
        if self.max_jumps == 0 {
            return Err(ConfigError::Invalid("max_jumps must be at least 1".into()));
        }
        Ok(())
    }
}
