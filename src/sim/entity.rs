//! Maze entities and collision dispatch
//!
//! Entities are plain data tagged by [`EntityKind`]. Behavior that differs per
//! kind (player contact, blocking) is a `match` on the tag, not a class hierarchy.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::{Direction, Rect};

/// Stable identifier assigned when an entity is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Hit points. Damage may push the value below zero; death is checked with `<= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub value: f32,
    pub max: f32,
}

impl Health {
    pub fn full(max: f32) -> Self {
        Self { value: max, max }
    }

    /// Apply a delta (negative = damage). Healing is capped at max.
    /// Returns true when the health is now empty.
    pub fn modify(&mut self, delta: f32) -> bool {
        self.value += delta;
        if self.value > self.max {
            self.value = self.max;
        }
        self.is_empty()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.value <= 0.0
    }

    pub fn refill(&mut self) {
        self.value = self.max;
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    /// Extra life
    Lives,
    /// Temporary damage immunity
    Shield,
    /// Temporary speed boost
    Lightning,
    /// Leaves the maze for the arcade stage
    Spaceship,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MobKind {
    Skeleton,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Mob(MobKind),
    MovableWall,
    Pickup(PickupKind),
}

/// What happens when the player's hitbox overlaps an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactEffect {
    /// Solid: the move is refused
    Block,
    /// Player loses health (every overlapping frame)
    Damage(f32),
    /// Pickup is consumed
    Collect(PickupKind),
}

/// A dynamic maze object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub hitbox: Rect,
    /// Sprite offset from the hitbox (render only)
    pub visual_offset: Vec2,
    pub facing: Direction,
    pub speed: f32,
    pub health: Health,
    /// Cleared when the entity is destroyed; removed at end of frame
    pub alive: bool,
}

impl Entity {
    pub fn new(id: EntityId, kind: EntityKind, hitbox: Rect, speed: f32, max_health: f32) -> Self {
        Self {
            id,
            kind,
            hitbox,
            visual_offset: Vec2::ZERO,
            facing: Direction::default(),
            speed,
            health: Health::full(max_health),
            alive: true,
        }
    }

    pub fn is_mob(&self) -> bool {
        matches!(self.kind, EntityKind::Mob(_))
    }

    /// Solid for other movers (player, mobs, walls, projectiles)
    pub fn is_solid(&self) -> bool {
        self.kind == EntityKind::MovableWall
    }

    /// Geometric overlap, gated by liveness
    pub fn overlaps(&self, rect: &Rect) -> bool {
        self.alive && self.hitbox.overlaps(rect)
    }

    /// Player contact rule for this kind
    pub fn on_collision(&self, mob_contact_damage: f32) -> ContactEffect {
        match self.kind {
            EntityKind::Mob(_) => ContactEffect::Damage(mob_contact_damage),
            EntityKind::MovableWall => ContactEffect::Block,
            EntityKind::Pickup(kind) => ContactEffect::Collect(kind),
        }
    }

    /// Apply damage; a mob whose health empties is destroyed.
    /// Returns true if this call killed it.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.alive || !self.is_mob() {
            return false;
        }
        if self.health.modify(-amount) {
            self.alive = false;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_can_go_negative() {
        let mut health = Health::full(30.0);
        assert!(!health.modify(-10.0));
        assert!(health.modify(-1000.0));
        assert!(health.value < 0.0);
        health.modify(5000.0);
        assert_eq!(health.value, 30.0);
    }

    #[test]
    fn test_only_mobs_take_damage() {
        let rect = Rect::new(0.0, 0.0, 16.0, 16.0);
        let mut wall = Entity::new(EntityId(1), EntityKind::MovableWall, rect, 40.0, 1.0);
        assert!(!wall.take_damage(100.0));
        assert!(wall.alive);

        let skeleton = EntityKind::Mob(MobKind::Skeleton);
        let mut mob = Entity::new(EntityId(2), skeleton, rect, 60.0, 30.0);
        assert!(!mob.take_damage(10.0));
        assert!(mob.take_damage(f32::MAX));
        assert!(!mob.alive);
        assert!(!mob.take_damage(1.0));
    }

    #[test]
    fn test_contact_rules() {
        let rect = Rect::new(0.0, 0.0, 16.0, 16.0);
        let mob = Entity::new(EntityId(1), EntityKind::Mob(MobKind::Skeleton), rect, 0.0, 1.0);
        let shield_kind = EntityKind::Pickup(PickupKind::Shield);
        let shield = Entity::new(EntityId(2), shield_kind, rect, 0.0, 1.0);
        assert_eq!(mob.on_collision(10.0), ContactEffect::Damage(10.0));
        assert_eq!(shield.on_collision(10.0), ContactEffect::Collect(PickupKind::Shield));
    }
}
