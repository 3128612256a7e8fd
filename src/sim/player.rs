//! The maze player: hitbox, health/lives and power-up timers

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::Health;
use super::geom::{Direction, Rect};
use crate::tuning::PlayerTuning;

/// Temporary flat speed modifier, reverted when it expires
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedBuff {
    pub amount: f32,
    pub remaining: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub hitbox: Rect,
    pub health: Health,
    pub lives: u32,
    pub base_speed: f32,
    pub sprint_multiplier: f32,
    pub speed_buffs: Vec<SpeedBuff>,
    /// Seconds of damage immunity left
    pub shield_timer: f32,
    pub facing: Direction,
    pub has_key: bool,
    /// Cell the player's center was in last frame (arrival tracking)
    pub cell: Option<(u32, u32)>,
    pub defeated: bool,
}

impl Player {
    /// Player centered on `center`
    pub fn new(center: Vec2, tuning: &PlayerTuning) -> Self {
        Self {
            hitbox: Rect::centered(center, Vec2::splat(tuning.size)),
            health: Health::full(tuning.max_health),
            lives: tuning.lives,
            base_speed: tuning.speed,
            sprint_multiplier: tuning.sprint_multiplier,
            speed_buffs: Vec::new(),
            shield_timer: 0.0,
            facing: Direction::Down,
            has_key: false,
            cell: None,
            defeated: false,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.hitbox.center()
    }

    /// Base speed plus active buffs, times sprint when held
    pub fn current_speed(&self, sprinting: bool) -> f32 {
        let buffed = self.base_speed + self.speed_buffs.iter().map(|b| b.amount).sum::<f32>();
        if sprinting {
            buffed * self.sprint_multiplier
        } else {
            buffed
        }
    }

    pub fn add_speed_buff(&mut self, amount: f32, duration: f32) {
        self.speed_buffs.push(SpeedBuff {
            amount,
            remaining: duration,
        });
    }

    pub fn is_shielded(&self) -> bool {
        self.shield_timer > 0.0
    }

    /// Count down buffs and shield
    pub fn tick_timers(&mut self, dt: f32) {
        for buff in &mut self.speed_buffs {
            buff.remaining -= dt;
        }
        self.speed_buffs.retain(|b| b.remaining > 0.0);
        if self.shield_timer > 0.0 {
            self.shield_timer = (self.shield_timer - dt).max(0.0);
        }
    }

    /// Take damage unless shielded. Returns true if health was reduced.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.defeated || self.is_shielded() || amount <= 0.0 {
            return false;
        }
        if self.health.modify(-amount) {
            self.on_empty_health();
        }
        true
    }

    /// A life is spent; with none left the player is defeated
    fn on_empty_health(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        if self.lives > 0 {
            log::info!("player lost a life ({} left)", self.lives);
            self.health.refill();
        } else {
            log::info!("player defeated");
            self.defeated = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(Vec2::new(50.0, 50.0), &PlayerTuning::default())
    }

    #[test]
    fn test_lightning_buff_reverts() {
        let mut p = player();
        let base = p.current_speed(false);
        p.add_speed_buff(100.0, 10.0);
        assert_eq!(p.current_speed(false), base + 100.0);
        for _ in 0..599 {
            p.tick_timers(1.0 / 60.0);
        }
        assert_eq!(p.current_speed(false), base + 100.0);
        p.tick_timers(0.1);
        assert_eq!(p.current_speed(false), base);
    }

    #[test]
    fn test_sprint_multiplies_buffed_speed() {
        let mut p = player();
        p.add_speed_buff(100.0, 1.0);
        let expected = (p.base_speed + 100.0) * p.sprint_multiplier;
        assert!((p.current_speed(true) - expected).abs() < 1e-4);
    }

    #[test]
    fn test_empty_health_costs_a_life() {
        let mut p = player();
        let lives = p.lives;
        assert!(p.take_damage(1000.0));
        assert_eq!(p.lives, lives - 1);
        assert_eq!(p.health.value, p.health.max);
    }

    #[test]
    fn test_last_life_defeats() {
        let mut p = player();
        p.lives = 1;
        p.take_damage(p.health.max);
        assert!(p.defeated);
        assert!(!p.take_damage(10.0));
    }

    #[test]
    fn test_shield_blocks_damage() {
        let mut p = player();
        p.shield_timer = 1.0;
        assert!(!p.take_damage(50.0));
        assert_eq!(p.health.value, p.health.max);
    }
}
