//! Frame-delta movement
//!
//! Displacement itself never checks collisions. Callers test the candidate
//! hitbox first and only call [`perform_movement`] when the way is clear.

use glam::Vec2;

use super::entity::Entity;
use super::geom::{Direction, Rect};
use super::rng::SimRng;

/// Distance covered this frame
#[inline]
pub fn move_distance(speed: f32, dt: f32) -> f32 {
    speed * dt
}

/// Unconditionally translate a hitbox
#[inline]
pub fn perform_movement(hitbox: &mut Rect, delta: Vec2) {
    hitbox.pos += delta;
}

/// Move one axis at a time so a blocked axis still lets the other slide.
/// Returns the displacement actually applied.
pub fn slide(hitbox: &mut Rect, delta: Vec2, mut blocked: impl FnMut(&Rect) -> bool) -> Vec2 {
    let mut applied = Vec2::ZERO;

    if delta.x != 0.0 {
        let step = Vec2::new(delta.x, 0.0);
        if !blocked(&hitbox.translated(step)) {
            perform_movement(hitbox, step);
            applied.x = delta.x;
        }
    }

    if delta.y != 0.0 {
        let step = Vec2::new(0.0, delta.y);
        if !blocked(&hitbox.translated(step)) {
            perform_movement(hitbox, step);
            applied.y = delta.y;
        }
    }

    applied
}

/// Flip a patrolling entity around
pub fn change_direction(entity: &mut Entity) {
    entity.facing = entity.facing.opposite();
}

/// Movable wall patrol: advance along the facing direction, reverse when blocked
pub fn step_movable_wall(entity: &mut Entity, dt: f32, blocked: impl FnOnce(&Rect) -> bool) {
    let delta = entity.facing.vector() * move_distance(entity.speed, dt);
    if blocked(&entity.hitbox.translated(delta)) {
        change_direction(entity);
    } else {
        perform_movement(&mut entity.hitbox, delta);
    }
}

/// Mob wander: advance along the facing direction, pick another direction when blocked
pub fn step_mob(
    entity: &mut Entity,
    dt: f32,
    rng: &mut dyn SimRng,
    blocked: impl FnOnce(&Rect) -> bool,
) {
    let delta = entity.facing.vector() * move_distance(entity.speed, dt);
    if blocked(&entity.hitbox.translated(delta)) {
        let others: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|d| *d != entity.facing)
            .collect();
        entity.facing = others[rng.index(others.len())];
    } else {
        perform_movement(&mut entity.hitbox, delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{EntityId, EntityKind, MobKind};
    use crate::sim::rng::SequenceRng;

    #[test]
    fn test_slide_keeps_free_axis() {
        let mut hitbox = Rect::new(0.0, 0.0, 10.0, 10.0);
        let wall = Rect::new(12.0, -100.0, 10.0, 200.0);
        let applied = slide(&mut hitbox, Vec2::new(5.0, 3.0), |r| r.overlaps(&wall));
        assert_eq!(applied, Vec2::new(0.0, 3.0));
        assert_eq!(hitbox.pos, Vec2::new(0.0, 3.0));
    }

    #[test]
    fn test_movable_wall_reverses_on_block() {
        let rect = Rect::new(0.0, 0.0, 32.0, 32.0);
        let mut wall = Entity::new(EntityId(1), EntityKind::MovableWall, rect, 40.0, 1.0);
        wall.facing = Direction::Right;

        step_movable_wall(&mut wall, 0.5, |_| false);
        assert_eq!(wall.hitbox.pos, Vec2::new(20.0, 0.0));

        step_movable_wall(&mut wall, 0.5, |_| true);
        assert_eq!(wall.facing, Direction::Left);
        assert_eq!(wall.hitbox.pos, Vec2::new(20.0, 0.0));
    }

    #[test]
    fn test_blocked_mob_picks_new_direction() {
        let rect = Rect::new(0.0, 0.0, 16.0, 16.0);
        let skeleton = EntityKind::Mob(MobKind::Skeleton);
        let mut mob = Entity::new(EntityId(1), skeleton, rect, 60.0, 30.0);
        mob.facing = Direction::Up;
        let mut rng = SequenceRng::constant(0.0);
        step_mob(&mut mob, 0.1, &mut rng, |_| true);
        assert_ne!(mob.facing, Direction::Up);
        assert_eq!(mob.hitbox.pos, Vec2::ZERO);
    }
}
