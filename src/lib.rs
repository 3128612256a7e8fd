//! Maze Escape - real-time maze exploration simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (tile grid, collisions, weapons, boss, arcade mini-game)
//! - `tuning`: Data-driven game balance
//! - `audio`: Handle-based sound contract consumed by weapons and the boss
//! - `score`: Score accumulator and high score table
//!
//! Rendering, screens, asset loading and real audio playback live outside this crate.
//! They read simulation state and feed decoded input intents in.

pub mod audio;
pub mod error;
pub mod score;
pub mod sim;
pub mod tuning;

pub use error::{MazeError, Result};
pub use score::{HighScores, ScoreBoard, ScoreSink};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    use glam::Vec2;

    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum fixed steps per rendered frame to prevent spiral of death
    pub const MAX_FRAME_STEPS: u32 = 8;

    /// Default tile edge length in world units
    pub const TILE_SIZE: f32 = 32.0;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 120.0;
    pub const PLAYER_SPRINT_MULTIPLIER: f32 = 1.6;
    pub const PLAYER_MAX_HEALTH: f32 = 100.0;
    pub const PLAYER_LIVES: u32 = 3;
    pub const PLAYER_SIZE: f32 = 20.0;
    /// Lightning power-up: flat speed bonus and duration
    pub const LIGHTNING_SPEED_BONUS: f32 = 100.0;
    pub const LIGHTNING_DURATION: f32 = 10.0;
    pub const SHIELD_DURATION: f32 = 10.0;
    pub const TRAP_DAMAGE: f32 = 10.0;

    /// Mob defaults
    pub const MOB_SPEED: f32 = 60.0;
    pub const MOB_HEALTH: f32 = 30.0;
    pub const MOB_CONTACT_DAMAGE: f32 = 10.0;
    pub const MOB_KILL_SCORE: u32 = 100;
    pub const MOVABLE_WALL_SPEED: f32 = 40.0;
    /// Hitbox edges as a fraction of the cell size
    pub const MOB_HITBOX_SCALE: f32 = 0.6;
    pub const MOVABLE_WALL_HITBOX_SCALE: f32 = 0.9;
    pub const PICKUP_HITBOX_SCALE: f32 = 0.5;

    /// Energy projectile defaults
    pub const PROJECTILE_SPEED: f32 = 260.0;
    pub const PROJECTILE_RADIUS: f32 = 4.0;
    pub const PROJECTILE_MAX_BOUNCES: i32 = 3;
    pub const PROJECTILE_LIFETIME: f32 = 3.0;
    pub const PROJECTILE_POOL_SIZE: usize = 32;
    pub const PROJECTILE_FIRE_COOLDOWN: f32 = 0.3;
    /// Substep length as a fraction of a tile
    pub const PROJECTILE_STEP_FRACTION: f32 = 0.20;
    pub const PROJECTILE_MAX_SUBSTEPS: u32 = 8;
    /// Max scatter rotation (radians) applied after a glancing bounce
    pub const PROJECTILE_MAX_SCATTER: f32 = 0.35;
    pub const PROJECTILE_BOSS_DAMAGE: f32 = 20.0;

    /// Light saber defaults
    pub const SABER_ACTIVE_DURATION: f32 = 5.0;
    pub const SABER_COOLDOWN_DURATION: f32 = 5.0;
    pub const SABER_ROT_SPEED_DEG: f32 = 360.0;
    pub const SABER_ORBIT_RADIUS: f32 = 28.0;
    pub const SABER_BLADE_LENGTH: f32 = 24.0;
    pub const SABER_BLADE_WIDTH: f32 = 6.0;
    pub const SABER_TRAIL_DAMAGE: f32 = 4.0;
    pub const SABER_HIT_COOLDOWN: f32 = 0.08;
    pub const SABER_BOSS_HIT_COOLDOWN: f32 = 0.25;
    pub const SABER_BOSS_DAMAGE: f32 = 5.0;
    pub const SABER_SPARK_POOL_SIZE: usize = 96;
    pub const SABER_SPARK_LIFE: f32 = 0.35;
    pub const SABER_SPARKS_PER_SEC: f32 = 90.0;
    pub const SABER_SPARK_SPEED_MIN: f32 = 10.0;
    pub const SABER_SPARK_SPEED_MAX: f32 = 40.0;
    /// Fraction of spark velocity kept after one second
    pub const SABER_SPARK_DRAG: f32 = 0.0018;

    /// Skull boss defaults
    pub const BOSS_MAX_HEALTH: f32 = 200.0;
    pub const BOSS_RETURN_HEAL_FRACTION: f32 = 0.30;
    pub const BOSS_FIRST_SPAWN_DELAY: f32 = 20.0;
    pub const BOSS_RESPAWN_DELAY: f32 = 45.0;
    pub const BOSS_SIZE: f32 = 48.0;
    pub const BOSS_ENTER_SPEED: f32 = 180.0;
    pub const BOSS_ORBIT_DISTANCE: f32 = 120.0;
    pub const BOSS_ORBIT_MARGIN: f32 = 20.0;
    pub const BOSS_ORBIT_SPEED_MIN: f32 = 0.8;
    pub const BOSS_ORBIT_SPEED_MAX: f32 = 3.0;
    pub const BOSS_ORBIT_RAMP: f32 = 0.35;
    pub const BOSS_ORBIT_DECAY: f32 = 0.8;
    pub const BOSS_CONTACT_DAMAGE: f32 = 2.0;
    pub const BOSS_CONTACT_INTERVAL: f32 = 0.5;
    pub const BOSS_CHARGE_DURATION: f32 = 1.2;
    pub const BOSS_CHARGE_RAMP_TIME: f32 = 0.6;
    pub const BOSS_CHARGE_REAIM_TIME: f32 = 0.25;
    pub const BOSS_CHARGE_MIN_SPEED: f32 = 150.0;
    pub const BOSS_CHARGE_MAX_SPEED: f32 = 520.0;
    pub const BOSS_CHARGE_DAMAGE: f32 = 20.0;
    pub const BOSS_CHARGE_COOLDOWN: f32 = 1.5;
    /// Max distance of the charge aim point from the player
    pub const BOSS_CHARGE_AIM_JITTER: f32 = 24.0;
    pub const BOSS_LASER_COOLDOWN: f32 = 4.0;
    pub const BOSS_LASER_MIN_IDLE: f32 = 2.0;
    pub const BOSS_LASER_CHANCE: f32 = 0.01;
    pub const BOSS_LASER_DURATION: f32 = 1.2;
    pub const BOSS_LASER_SPEED: f32 = 200.0;
    pub const BOSS_LASER_STEER: f32 = 2.5;
    pub const BOSS_LASER_DAMAGE: f32 = 10.0;
    pub const BOSS_LASER_RADIUS: f32 = 5.0;
    pub const BOSS_LASER_POOL_SIZE: usize = 16;
    pub const BOSS_LASER_BURST_MIN: usize = 3;
    pub const BOSS_LASER_BURST_MAX: usize = 4;
    /// Max launch angle off the aim line (radians)
    pub const BOSS_LASER_SPREAD: f32 = 0.8;
    pub const BOSS_BOUNDS_MARGIN: f32 = 100.0;
    pub const BOSS_EXIT_SPEED: f32 = 220.0;
    pub const BOSS_EXIT_DISTANCE: f32 = 150.0;
    /// Seconds of fighting before the boss flies off on its own
    pub const BOSS_STAY_DURATION: f32 = 35.0;
    pub const BOSS_DEATH_DURATION: f32 = 3.0;
    pub const BOSS_DEATH_SCORE: u32 = 5000;
    pub const BOSS_EXPLOSION_INTERVAL_MIN: f32 = 0.1;
    pub const BOSS_EXPLOSION_INTERVAL_MAX: f32 = 0.35;
    pub const BOSS_DEBRIS_POOL_SIZE: usize = 128;
    pub const BOSS_DEBRIS_PER_EXPLOSION: usize = 6;
    pub const BOSS_DEBRIS_SPEED: f32 = 160.0;
    pub const BOSS_DEBRIS_LIFE: f32 = 1.2;
    /// Slowest / shortest-lived debris as a fraction of the maximum
    pub const BOSS_DEBRIS_SPEED_FLOOR: f32 = 0.3;
    pub const BOSS_DEBRIS_LIFE_FLOOR: f32 = 0.5;
    /// Max debris spin (radians per second)
    pub const BOSS_DEBRIS_SPIN: f32 = 8.0;

    /// Arcade mini-game defaults
    pub const ARCADE_WIDTH: f32 = 480.0;
    pub const ARCADE_HEIGHT: f32 = 640.0;
    pub const ARCADE_SHIP_SPEED: f32 = 260.0;
    pub const ARCADE_SHIP_HEALTH: f32 = 100.0;
    pub const ARCADE_FIRE_COOLDOWN: f32 = 0.12;
    pub const ARCADE_HEAT_PER_SHOT: f32 = 0.08;
    pub const ARCADE_HEAT_COOL_RATE: f32 = 0.35;
    pub const ARCADE_OVERHEAT_LOCKOUT: f32 = 1.5;
    pub const ARCADE_BULLET_SPEED: f32 = 520.0;
    pub const ARCADE_BULLET_CAPACITY: usize = 64;
    pub const ARCADE_ENEMY_CAPACITY: usize = 24;
    pub const ARCADE_ENEMY_BULLET_CAPACITY: usize = 96;
    pub const ARCADE_ASTEROID_CAPACITY: usize = 16;
    pub const ARCADE_EXPLOSION_CAPACITY: usize = 48;
    pub const ARCADE_ENEMY_SPAWN_MIN: f32 = 0.6;
    pub const ARCADE_ENEMY_SPAWN_MAX: f32 = 1.6;
    pub const ARCADE_ENEMY_SCORE: u32 = 150;
    pub const ARCADE_BOSS_TIME: f32 = 60.0;
    pub const ARCADE_BOSS_HEALTH: f32 = 600.0;
    pub const ARCADE_BOSS_SCORE: u32 = 10_000;

    /// Arcade ship and weapons
    pub const ARCADE_SHIP_HALF: Vec2 = Vec2::new(14.0, 14.0);
    /// Ship start height above the bottom edge
    pub const ARCADE_SHIP_START_INSET: f32 = 60.0;
    pub const ARCADE_SHIP_INVULN_TIME: f32 = 1.0;
    pub const ARCADE_BULLET_HALF: Vec2 = Vec2::new(2.0, 6.0);
    pub const ARCADE_BULLET_DAMAGE: f32 = 10.0;
    /// Shots this far outside the screen are culled
    pub const ARCADE_CULL_MARGIN: f32 = 8.0;

    /// Arcade enemies
    pub const ARCADE_ENEMY_HALF: Vec2 = Vec2::new(14.0, 12.0);
    pub const ARCADE_ENEMY_DRIFT_MIN: f32 = 60.0;
    pub const ARCADE_ENEMY_DRIFT_MAX: f32 = 110.0;
    pub const ARCADE_ENEMY_STRAFE_MIN: f32 = 30.0;
    pub const ARCADE_ENEMY_STRAFE_MAX: f32 = 90.0;
    pub const ARCADE_ENEMY_FIRE_MIN: f32 = 0.8;
    pub const ARCADE_ENEMY_FIRE_MAX: f32 = 2.0;
    pub const ARCADE_ENEMY_CONTACT_DAMAGE: f32 = 25.0;
    pub const ARCADE_ENEMY_BULLET_HALF: Vec2 = Vec2::new(3.0, 3.0);
    pub const ARCADE_ENEMY_BULLET_SPEED: f32 = 220.0;
    pub const ARCADE_ENEMY_BULLET_DAMAGE: f32 = 10.0;

    /// Arcade asteroids
    pub const ARCADE_ASTEROID_SPAWN_MIN: f32 = 2.5;
    pub const ARCADE_ASTEROID_SPAWN_MAX: f32 = 5.0;
    pub const ARCADE_ASTEROID_RADIUS_MIN: f32 = 12.0;
    pub const ARCADE_ASTEROID_RADIUS_MAX: f32 = 24.0;
    pub const ARCADE_ASTEROID_DRIFT_X: f32 = 20.0;
    pub const ARCADE_ASTEROID_FALL_MIN: f32 = 40.0;
    pub const ARCADE_ASTEROID_FALL_MAX: f32 = 90.0;
    pub const ARCADE_ASTEROID_SPIN: f32 = 2.0;
    pub const ARCADE_ASTEROID_HITS: u32 = 3;
    pub const ARCADE_ASTEROID_DAMAGE: f32 = 20.0;
    pub const ARCADE_ASTEROID_SCORE: u32 = 50;

    /// Arcade boss attack pattern
    pub const ARCADE_BOSS_HALF: Vec2 = Vec2::new(48.0, 28.0);
    pub const ARCADE_BOSS_ENTER_SPEED: f32 = 80.0;
    pub const ARCADE_BOSS_HOVER_Y: f32 = 110.0;
    pub const ARCADE_BOSS_DRIFT_SPEED: f32 = 60.0;
    pub const ARCADE_BOSS_DWELL_MIN: f32 = 1.5;
    pub const ARCADE_BOSS_DWELL_MAX: f32 = 3.0;
    pub const ARCADE_BOSS_CHARGE_SPEED: f32 = 320.0;
    pub const ARCADE_BOSS_CHARGE_TOLERANCE: f32 = 4.0;
    pub const ARCADE_BOSS_CHARGE_TIMEOUT: f32 = 1.5;
    pub const ARCADE_BOSS_BURST_PAIRS: u32 = 6;
    pub const ARCADE_BOSS_BURST_INTERVAL: f32 = 0.15;
    pub const ARCADE_BOSS_PAIR_SPREAD: f32 = 22.0;
    pub const ARCADE_BOSS_BULLET_SPEED: f32 = 260.0;
    pub const ARCADE_BOSS_COOLDOWN: f32 = 1.2;
    pub const ARCADE_BOSS_CONTACT_DAMAGE: f32 = 40.0;

    /// Arcade boss death sequence
    pub const ARCADE_DEATH_DURATION: f32 = 3.0;
    pub const ARCADE_DEATH_BURST_INTERVAL: f32 = 0.25;
    pub const ARCADE_DEATH_BURST_SIZE: usize = 3;
    pub const ARCADE_EXPLOSION_LIFE: f32 = 0.5;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Move `current` toward `target` by at most `max_delta`
#[inline]
pub fn approach(current: f32, target: f32, max_delta: f32) -> f32 {
    if current < target {
        (current + max_delta).min(target)
    } else {
        (current - max_delta).max(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(3.0 * PI + 0.5) - (-PI + 0.5)).abs() < 1e-4);
        assert!((normalize_angle(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_approach_never_overshoots() {
        assert_eq!(approach(1.0, 2.0, 5.0), 2.0);
        assert_eq!(approach(3.0, 2.0, 0.5), 2.5);
    }
}
