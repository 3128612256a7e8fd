//! Data-driven game balance
//!
//! Every simulation component is built from one of these structs. Defaults come
//! from [`crate::consts`]; a JSON file may override any subset of fields.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::Result;

/// Player movement and survival parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub speed: f32,
    pub sprint_multiplier: f32,
    pub max_health: f32,
    pub lives: u32,
    pub size: f32,
    pub lightning_bonus: f32,
    pub lightning_duration: f32,
    pub shield_duration: f32,
    pub trap_damage: f32,
    pub mob_speed: f32,
    pub mob_health: f32,
    pub mob_contact_damage: f32,
    pub mob_kill_score: u32,
    pub movable_wall_speed: f32,
    pub mob_hitbox_scale: f32,
    pub movable_wall_hitbox_scale: f32,
    pub pickup_hitbox_scale: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            speed: PLAYER_SPEED,
            sprint_multiplier: PLAYER_SPRINT_MULTIPLIER,
            max_health: PLAYER_MAX_HEALTH,
            lives: PLAYER_LIVES,
            size: PLAYER_SIZE,
            lightning_bonus: LIGHTNING_SPEED_BONUS,
            lightning_duration: LIGHTNING_DURATION,
            shield_duration: SHIELD_DURATION,
            trap_damage: TRAP_DAMAGE,
            mob_speed: MOB_SPEED,
            mob_health: MOB_HEALTH,
            mob_contact_damage: MOB_CONTACT_DAMAGE,
            mob_kill_score: MOB_KILL_SCORE,
            movable_wall_speed: MOVABLE_WALL_SPEED,
            mob_hitbox_scale: MOB_HITBOX_SCALE,
            movable_wall_hitbox_scale: MOVABLE_WALL_HITBOX_SCALE,
            pickup_hitbox_scale: PICKUP_HITBOX_SCALE,
        }
    }
}

/// Energy projectile physics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub speed: f32,
    pub radius: f32,
    pub max_bounces: i32,
    pub lifetime: f32,
    pub pool_size: usize,
    pub fire_cooldown: f32,
    pub step_fraction: f32,
    pub max_substeps: u32,
    pub max_scatter: f32,
    pub boss_damage: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            speed: PROJECTILE_SPEED,
            radius: PROJECTILE_RADIUS,
            max_bounces: PROJECTILE_MAX_BOUNCES,
            lifetime: PROJECTILE_LIFETIME,
            pool_size: PROJECTILE_POOL_SIZE,
            fire_cooldown: PROJECTILE_FIRE_COOLDOWN,
            step_fraction: PROJECTILE_STEP_FRACTION,
            max_substeps: PROJECTILE_MAX_SUBSTEPS,
            max_scatter: PROJECTILE_MAX_SCATTER,
            boss_damage: PROJECTILE_BOSS_DAMAGE,
        }
    }
}

/// Orbiting light saber
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaberTuning {
    pub active_duration: f32,
    pub cooldown_duration: f32,
    pub rot_speed_deg: f32,
    pub orbit_radius: f32,
    pub blade_length: f32,
    pub blade_width: f32,
    pub trail_damage: f32,
    pub hit_cooldown: f32,
    pub boss_hit_cooldown: f32,
    pub boss_damage: f32,
    pub spark_pool_size: usize,
    pub spark_life: f32,
    pub sparks_per_sec: f32,
    pub spark_speed_min: f32,
    pub spark_speed_max: f32,
    pub spark_drag: f32,
}

impl Default for SaberTuning {
    fn default() -> Self {
        Self {
            active_duration: SABER_ACTIVE_DURATION,
            cooldown_duration: SABER_COOLDOWN_DURATION,
            rot_speed_deg: SABER_ROT_SPEED_DEG,
            orbit_radius: SABER_ORBIT_RADIUS,
            blade_length: SABER_BLADE_LENGTH,
            blade_width: SABER_BLADE_WIDTH,
            trail_damage: SABER_TRAIL_DAMAGE,
            hit_cooldown: SABER_HIT_COOLDOWN,
            boss_hit_cooldown: SABER_BOSS_HIT_COOLDOWN,
            boss_damage: SABER_BOSS_DAMAGE,
            spark_pool_size: SABER_SPARK_POOL_SIZE,
            spark_life: SABER_SPARK_LIFE,
            sparks_per_sec: SABER_SPARKS_PER_SEC,
            spark_speed_min: SABER_SPARK_SPEED_MIN,
            spark_speed_max: SABER_SPARK_SPEED_MAX,
            spark_drag: SABER_SPARK_DRAG,
        }
    }
}

/// Skull boss timings, speeds and damage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossTuning {
    pub max_health: f32,
    pub return_heal_fraction: f32,
    pub first_spawn_delay: f32,
    pub respawn_delay: f32,
    pub size: f32,
    pub enter_speed: f32,
    pub orbit_distance: f32,
    pub orbit_margin: f32,
    pub orbit_speed_min: f32,
    pub orbit_speed_max: f32,
    pub orbit_ramp: f32,
    pub orbit_decay: f32,
    pub contact_damage: f32,
    pub contact_interval: f32,
    pub charge_duration: f32,
    pub charge_ramp_time: f32,
    pub charge_reaim_time: f32,
    pub charge_min_speed: f32,
    pub charge_max_speed: f32,
    pub charge_damage: f32,
    pub charge_cooldown: f32,
    pub charge_aim_jitter: f32,
    pub laser_cooldown: f32,
    pub laser_min_idle: f32,
    pub laser_chance: f32,
    pub laser_duration: f32,
    pub laser_speed: f32,
    pub laser_steer: f32,
    pub laser_damage: f32,
    pub laser_radius: f32,
    pub laser_pool_size: usize,
    pub laser_burst_min: usize,
    pub laser_burst_max: usize,
    pub laser_spread: f32,
    pub bounds_margin: f32,
    pub exit_speed: f32,
    pub exit_distance: f32,
    pub stay_duration: f32,
    pub death_duration: f32,
    pub death_score: u32,
    pub explosion_interval_min: f32,
    pub explosion_interval_max: f32,
    pub debris_pool_size: usize,
    pub debris_per_explosion: usize,
    pub debris_speed: f32,
    pub debris_life: f32,
    pub debris_speed_floor: f32,
    pub debris_life_floor: f32,
    pub debris_spin: f32,
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            max_health: BOSS_MAX_HEALTH,
            return_heal_fraction: BOSS_RETURN_HEAL_FRACTION,
            first_spawn_delay: BOSS_FIRST_SPAWN_DELAY,
            respawn_delay: BOSS_RESPAWN_DELAY,
            size: BOSS_SIZE,
            enter_speed: BOSS_ENTER_SPEED,
            orbit_distance: BOSS_ORBIT_DISTANCE,
            orbit_margin: BOSS_ORBIT_MARGIN,
            orbit_speed_min: BOSS_ORBIT_SPEED_MIN,
            orbit_speed_max: BOSS_ORBIT_SPEED_MAX,
            orbit_ramp: BOSS_ORBIT_RAMP,
            orbit_decay: BOSS_ORBIT_DECAY,
            contact_damage: BOSS_CONTACT_DAMAGE,
            contact_interval: BOSS_CONTACT_INTERVAL,
            charge_duration: BOSS_CHARGE_DURATION,
            charge_ramp_time: BOSS_CHARGE_RAMP_TIME,
            charge_reaim_time: BOSS_CHARGE_REAIM_TIME,
            charge_min_speed: BOSS_CHARGE_MIN_SPEED,
            charge_max_speed: BOSS_CHARGE_MAX_SPEED,
            charge_damage: BOSS_CHARGE_DAMAGE,
            charge_cooldown: BOSS_CHARGE_COOLDOWN,
            charge_aim_jitter: BOSS_CHARGE_AIM_JITTER,
            laser_cooldown: BOSS_LASER_COOLDOWN,
            laser_min_idle: BOSS_LASER_MIN_IDLE,
            laser_chance: BOSS_LASER_CHANCE,
            laser_duration: BOSS_LASER_DURATION,
            laser_speed: BOSS_LASER_SPEED,
            laser_steer: BOSS_LASER_STEER,
            laser_damage: BOSS_LASER_DAMAGE,
            laser_radius: BOSS_LASER_RADIUS,
            laser_pool_size: BOSS_LASER_POOL_SIZE,
            laser_burst_min: BOSS_LASER_BURST_MIN,
            laser_burst_max: BOSS_LASER_BURST_MAX,
            laser_spread: BOSS_LASER_SPREAD,
            bounds_margin: BOSS_BOUNDS_MARGIN,
            exit_speed: BOSS_EXIT_SPEED,
            exit_distance: BOSS_EXIT_DISTANCE,
            stay_duration: BOSS_STAY_DURATION,
            death_duration: BOSS_DEATH_DURATION,
            death_score: BOSS_DEATH_SCORE,
            explosion_interval_min: BOSS_EXPLOSION_INTERVAL_MIN,
            explosion_interval_max: BOSS_EXPLOSION_INTERVAL_MAX,
            debris_pool_size: BOSS_DEBRIS_POOL_SIZE,
            debris_per_explosion: BOSS_DEBRIS_PER_EXPLOSION,
            debris_speed: BOSS_DEBRIS_SPEED,
            debris_life: BOSS_DEBRIS_LIFE,
            debris_speed_floor: BOSS_DEBRIS_SPEED_FLOOR,
            debris_life_floor: BOSS_DEBRIS_LIFE_FLOOR,
            debris_spin: BOSS_DEBRIS_SPIN,
        }
    }
}

/// Arcade mini-game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcadeTuning {
    pub width: f32,
    pub height: f32,
    pub ship_speed: f32,
    pub ship_health: f32,
    pub fire_cooldown: f32,
    pub heat_per_shot: f32,
    pub heat_cool_rate: f32,
    pub overheat_lockout: f32,
    pub bullet_speed: f32,
    pub bullet_capacity: usize,
    pub enemy_capacity: usize,
    pub enemy_bullet_capacity: usize,
    pub asteroid_capacity: usize,
    pub explosion_capacity: usize,
    pub enemy_spawn_min: f32,
    pub enemy_spawn_max: f32,
    pub enemy_score: u32,
    pub boss_time: f32,
    pub boss_health: f32,
    pub boss_score: u32,

    pub ship_half: Vec2,
    pub ship_start_inset: f32,
    pub ship_invuln_time: f32,
    pub bullet_half: Vec2,
    pub bullet_damage: f32,
    pub cull_margin: f32,

    pub enemy_half: Vec2,
    pub enemy_drift_min: f32,
    pub enemy_drift_max: f32,
    pub enemy_strafe_min: f32,
    pub enemy_strafe_max: f32,
    pub enemy_fire_min: f32,
    pub enemy_fire_max: f32,
    pub enemy_contact_damage: f32,
    pub enemy_bullet_half: Vec2,
    pub enemy_bullet_speed: f32,
    pub enemy_bullet_damage: f32,

    pub asteroid_spawn_min: f32,
    pub asteroid_spawn_max: f32,
    pub asteroid_radius_min: f32,
    pub asteroid_radius_max: f32,
    pub asteroid_drift_x: f32,
    pub asteroid_fall_min: f32,
    pub asteroid_fall_max: f32,
    pub asteroid_spin: f32,
    pub asteroid_hits: u32,
    pub asteroid_damage: f32,
    pub asteroid_score: u32,

    pub boss_half: Vec2,
    pub boss_enter_speed: f32,
    pub boss_hover_y: f32,
    pub boss_drift_speed: f32,
    pub boss_dwell_min: f32,
    pub boss_dwell_max: f32,
    pub boss_charge_speed: f32,
    pub boss_charge_tolerance: f32,
    pub boss_charge_timeout: f32,
    pub boss_burst_pairs: u32,
    pub boss_burst_interval: f32,
    pub boss_pair_spread: f32,
    pub boss_bullet_speed: f32,
    pub boss_cooldown: f32,
    pub boss_contact_damage: f32,

    pub death_duration: f32,
    pub death_burst_interval: f32,
    pub death_burst_size: usize,
    pub explosion_life: f32,
}

impl Default for ArcadeTuning {
    fn default() -> Self {
        Self {
            width: ARCADE_WIDTH,
            height: ARCADE_HEIGHT,
            ship_speed: ARCADE_SHIP_SPEED,
            ship_health: ARCADE_SHIP_HEALTH,
            fire_cooldown: ARCADE_FIRE_COOLDOWN,
            heat_per_shot: ARCADE_HEAT_PER_SHOT,
            heat_cool_rate: ARCADE_HEAT_COOL_RATE,
            overheat_lockout: ARCADE_OVERHEAT_LOCKOUT,
            bullet_speed: ARCADE_BULLET_SPEED,
            bullet_capacity: ARCADE_BULLET_CAPACITY,
            enemy_capacity: ARCADE_ENEMY_CAPACITY,
            enemy_bullet_capacity: ARCADE_ENEMY_BULLET_CAPACITY,
            asteroid_capacity: ARCADE_ASTEROID_CAPACITY,
            explosion_capacity: ARCADE_EXPLOSION_CAPACITY,
            enemy_spawn_min: ARCADE_ENEMY_SPAWN_MIN,
            enemy_spawn_max: ARCADE_ENEMY_SPAWN_MAX,
            enemy_score: ARCADE_ENEMY_SCORE,
            boss_time: ARCADE_BOSS_TIME,
            boss_health: ARCADE_BOSS_HEALTH,
            boss_score: ARCADE_BOSS_SCORE,
            ship_half: ARCADE_SHIP_HALF,
            ship_start_inset: ARCADE_SHIP_START_INSET,
            ship_invuln_time: ARCADE_SHIP_INVULN_TIME,
            bullet_half: ARCADE_BULLET_HALF,
            bullet_damage: ARCADE_BULLET_DAMAGE,
            cull_margin: ARCADE_CULL_MARGIN,
            enemy_half: ARCADE_ENEMY_HALF,
            enemy_drift_min: ARCADE_ENEMY_DRIFT_MIN,
            enemy_drift_max: ARCADE_ENEMY_DRIFT_MAX,
            enemy_strafe_min: ARCADE_ENEMY_STRAFE_MIN,
            enemy_strafe_max: ARCADE_ENEMY_STRAFE_MAX,
            enemy_fire_min: ARCADE_ENEMY_FIRE_MIN,
            enemy_fire_max: ARCADE_ENEMY_FIRE_MAX,
            enemy_contact_damage: ARCADE_ENEMY_CONTACT_DAMAGE,
            enemy_bullet_half: ARCADE_ENEMY_BULLET_HALF,
            enemy_bullet_speed: ARCADE_ENEMY_BULLET_SPEED,
            enemy_bullet_damage: ARCADE_ENEMY_BULLET_DAMAGE,
            asteroid_spawn_min: ARCADE_ASTEROID_SPAWN_MIN,
            asteroid_spawn_max: ARCADE_ASTEROID_SPAWN_MAX,
            asteroid_radius_min: ARCADE_ASTEROID_RADIUS_MIN,
            asteroid_radius_max: ARCADE_ASTEROID_RADIUS_MAX,
            asteroid_drift_x: ARCADE_ASTEROID_DRIFT_X,
            asteroid_fall_min: ARCADE_ASTEROID_FALL_MIN,
            asteroid_fall_max: ARCADE_ASTEROID_FALL_MAX,
            asteroid_spin: ARCADE_ASTEROID_SPIN,
            asteroid_hits: ARCADE_ASTEROID_HITS,
            asteroid_damage: ARCADE_ASTEROID_DAMAGE,
            asteroid_score: ARCADE_ASTEROID_SCORE,
            boss_half: ARCADE_BOSS_HALF,
            boss_enter_speed: ARCADE_BOSS_ENTER_SPEED,
            boss_hover_y: ARCADE_BOSS_HOVER_Y,
            boss_drift_speed: ARCADE_BOSS_DRIFT_SPEED,
            boss_dwell_min: ARCADE_BOSS_DWELL_MIN,
            boss_dwell_max: ARCADE_BOSS_DWELL_MAX,
            boss_charge_speed: ARCADE_BOSS_CHARGE_SPEED,
            boss_charge_tolerance: ARCADE_BOSS_CHARGE_TOLERANCE,
            boss_charge_timeout: ARCADE_BOSS_CHARGE_TIMEOUT,
            boss_burst_pairs: ARCADE_BOSS_BURST_PAIRS,
            boss_burst_interval: ARCADE_BOSS_BURST_INTERVAL,
            boss_pair_spread: ARCADE_BOSS_PAIR_SPREAD,
            boss_bullet_speed: ARCADE_BOSS_BULLET_SPEED,
            boss_cooldown: ARCADE_BOSS_COOLDOWN,
            boss_contact_damage: ARCADE_BOSS_CONTACT_DAMAGE,
            death_duration: ARCADE_DEATH_DURATION,
            death_burst_interval: ARCADE_DEATH_BURST_INTERVAL,
            death_burst_size: ARCADE_DEATH_BURST_SIZE,
            explosion_life: ARCADE_EXPLOSION_LIFE,
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub projectile: ProjectileTuning,
    pub saber: SaberTuning,
    pub boss: BossTuning,
    pub arcade: ArcadeTuning,
}

impl Tuning {
    /// Parse tuning from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON (for writing a template file)
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load tuning from a JSON file on disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MazeError;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "boss": { "max_health": 350.0 } }"#).unwrap();
        assert_eq!(tuning.boss.max_health, 350.0);
        assert_eq!(tuning.boss.charge_damage, BOSS_CHARGE_DAMAGE);
        assert_eq!(tuning.saber, SaberTuning::default());
    }

    #[test]
    fn test_json_round_trip() {
        let tuning = Tuning::default();
        let json = tuning.to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), tuning);
    }

    #[test]
    fn test_bad_json_is_error() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, MazeError::Json(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Tuning::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, MazeError::Io(_)));
    }
}
