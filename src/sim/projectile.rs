//! Bouncing energy projectiles
//!
//! Projectiles are integrated in substeps no longer than a fraction of a tile, so
//! they cannot tunnel through walls or mobs. Each substep moves X and Y
//! separately; a blocked axis flips its velocity component (all geometry is
//! axis-aligned, so this is an exact mirror reflection).

use glam::Vec2;

use super::boss::SkullBoss;
use super::entity::{Entity, EntityId};
use super::geom::Rect;
use super::grid::TileGrid;
use super::pool::{Pool, Reset};
use super::rng::SimRng;
use crate::audio::{AudioSink, SoundEffect};
use crate::score::ScoreSink;
use crate::tuning::ProjectileTuning;

/// Everything a projectile can hit this frame
pub struct ProjectileTargets<'a> {
    pub grid: &'a TileGrid,
    pub entities: &'a mut [Entity],
    pub boss: Option<&'a mut SkullBoss>,
    pub score: &'a mut dyn ScoreSink,
}

impl ProjectileTargets<'_> {
    /// Walls, out-of-grid space and movable walls reflect projectiles
    fn is_solid(&self, rect: &Rect) -> bool {
        self.grid.collides(rect)
            || self
                .entities
                .iter()
                .any(|e| e.is_solid() && e.overlaps(rect))
    }
}

/// What a projectile struck
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectileHit {
    Mob(EntityId),
    Boss,
}

/// Result of one projectile update
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProjectileStep {
    pub bounces: u32,
    pub hit: Option<ProjectileHit>,
}

/// A pooled energy shot
#[derive(Debug, Clone, Default)]
pub struct EnergyProjectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Remaining wall bounces; the shot dies when this goes negative
    pub bounces_left: i32,
    /// Seconds until the shot fizzles
    pub lifetime: f32,
    alive: bool,
}

impl Reset for EnergyProjectile {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

impl EnergyProjectile {
    /// Reset a pooled instance into a live shot
    pub fn init(
        &mut self,
        pos: Vec2,
        dir: Vec2,
        speed: f32,
        radius: f32,
        max_bounces: i32,
        lifetime: f32,
    ) {
        self.pos = pos;
        self.vel = dir.normalize_or_zero() * speed;
        self.radius = radius;
        self.bounces_left = max_bounces;
        self.lifetime = lifetime;
        self.alive = true;
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn hitbox(&self) -> Rect {
        Rect::around_circle(self.pos, self.radius)
    }

    /// Advance by `dt`, bouncing off solids and striking mobs or the boss
    pub fn update(
        &mut self,
        dt: f32,
        targets: &mut ProjectileTargets<'_>,
        tuning: &ProjectileTuning,
        rng: &mut dyn SimRng,
    ) -> ProjectileStep {
        let mut step = ProjectileStep::default();
        if !self.alive {
            return step;
        }

        // Expiry is silent
        self.lifetime -= dt;
        if self.lifetime <= 0.0 {
            self.alive = false;
            return step;
        }

        let frame_distance = self.vel.length() * dt;
        let step_length = targets.grid.cell_size() * tuning.step_fraction;
        let substeps =
            ((frame_distance / step_length).ceil() as u32).clamp(1, tuning.max_substeps.max(1));
        let sub_dt = dt / substeps as f32;

        for _ in 0..substeps {
            for axis in [Vec2::X, Vec2::Y] {
                let component = self.vel.dot(axis);
                if component == 0.0 {
                    continue;
                }
                let delta = axis * component * sub_dt;
                let moved = Rect::around_circle(self.pos + delta, self.radius);
                if targets.is_solid(&moved) {
                    step.bounces += 1;
                    if !self.bounce(axis, tuning.max_scatter, rng) {
                        log::debug!("energy projectile out of bounces");
                        return step;
                    }
                } else {
                    self.pos += delta;
                }
            }

            if let Some(hit) = self.strike(targets, tuning.boss_damage) {
                step.hit = Some(hit);
                self.alive = false;
                return step;
            }
        }

        step
    }

    /// Mirror the velocity along `axis` and scatter it. Returns false if the
    /// bounce budget is spent (the projectile is dead).
    fn bounce(&mut self, axis: Vec2, max_scatter: f32, rng: &mut dyn SimRng) -> bool {
        let speed = self.vel.length();
        // 1.0 for a perpendicular hit, ~0 for a grazing one
        let head_on = if speed > 0.0 {
            self.vel.dot(axis).abs() / speed
        } else {
            1.0
        };

        self.vel -= 2.0 * self.vel.dot(axis) * axis;
        self.bounces_left -= 1;
        if self.bounces_left < 0 {
            self.alive = false;
            return false;
        }

        // Glancing bounces get more jitter than head-on ones; rotation keeps speed
        let away = self.vel.dot(axis);
        let jitter = rng.signed() * max_scatter * (1.0 - head_on);
        if jitter != 0.0 {
            self.vel = Vec2::from_angle(jitter).rotate(self.vel);
            // Never scatter back into the surface that was just hit
            let along = self.vel.dot(axis);
            if along * away < 0.0 {
                self.vel -= 2.0 * along * axis;
            }
        }
        true
    }

    /// Mobs die to a single hit; the boss takes fixed damage
    fn strike(
        &self,
        targets: &mut ProjectileTargets<'_>,
        boss_damage: f32,
    ) -> Option<ProjectileHit> {
        let hitbox = self.hitbox();

        if let Some(mob) = targets
            .entities
            .iter_mut()
            .find(|e| e.is_mob() && e.overlaps(&hitbox))
        {
            mob.take_damage(f32::MAX);
            return Some(ProjectileHit::Mob(mob.id));
        }

        if let Some(boss) = targets.boss.as_deref_mut() {
            if boss.damage_hitbox().is_some_and(|b| b.overlaps(&hitbox)) {
                boss.apply_damage(boss_damage, &mut *targets.score);
                return Some(ProjectileHit::Boss);
            }
        }

        None
    }
}

/// Player's energy weapon: a fixed pool of shots plus a fire-rate cooldown
#[derive(Debug, Clone)]
pub struct EnergyCannon {
    pub tuning: ProjectileTuning,
    pub projectiles: Pool<EnergyProjectile>,
    pub cooldown: f32,
}

impl EnergyCannon {
    pub fn new(tuning: ProjectileTuning) -> Self {
        Self {
            projectiles: Pool::new(tuning.pool_size),
            tuning,
            cooldown: 0.0,
        }
    }

    /// Launch a shot. Returns false when cooling down or the pool is exhausted.
    pub fn fire(&mut self, origin: Vec2, dir: Vec2, audio: &mut dyn AudioSink) -> bool {
        if self.cooldown > 0.0 || dir == Vec2::ZERO {
            return false;
        }
        let Some(shot) = self.projectiles.spawn() else {
            return false;
        };
        let t = &self.tuning;
        shot.init(origin, dir, t.speed, t.radius, t.max_bounces, t.lifetime);
        self.cooldown = t.fire_cooldown;
        audio.play(SoundEffect::EnergyShot);
        true
    }

    /// Advance every live shot; dead shots go back to the pool
    pub fn update(
        &mut self,
        dt: f32,
        targets: &mut ProjectileTargets<'_>,
        rng: &mut dyn SimRng,
        audio: &mut dyn AudioSink,
    ) -> Vec<ProjectileHit> {
        self.cooldown = (self.cooldown - dt).max(0.0);
        let mut hits = Vec::new();
        let tuning = &self.tuning;
        self.projectiles.retain_mut(|shot| {
            let step = shot.update(dt, targets, tuning, rng);
            if step.bounces > 0 {
                audio.play(SoundEffect::EnergyBounce);
            }
            if let Some(hit) = step.hit {
                hits.push(hit);
            }
            shot.is_alive()
        });
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullAudio;
    use crate::score::ScoreBoard;
    use crate::sim::boss::BossState;
    use crate::sim::entity::{EntityKind, MobKind};
    use crate::sim::grid::BlockKind;
    use crate::sim::player::Player;
    use crate::sim::rng::SequenceRng;
    use crate::tuning::{BossTuning, PlayerTuning};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const DT: f32 = 1.0 / 60.0;

    /// 3 columns x 3 rows of 32px cells with origin (-32, -32); column 2 (x >= 32) is wall
    fn wall_at_32() -> TileGrid {
        let mut grid = TileGrid::new(3, 3, 32.0, Vec2::new(-32.0, -32.0)).unwrap();
        for row in 0..3 {
            grid.set_block(2, row, BlockKind::Wall);
        }
        grid
    }

    fn tuning() -> ProjectileTuning {
        ProjectileTuning::default()
    }

    #[test]
    fn test_head_on_bounce_flips_once_and_stays_left_of_wall() {
        let grid = wall_at_32();
        let mut score = ScoreBoard::new();
        let mut entities: Vec<Entity> = Vec::new();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut shot = EnergyProjectile::default();
        shot.init(Vec2::ZERO, Vec2::X, 260.0, 4.0, 3, 10.0);

        let mut flips = 0;
        let mut last_sign = shot.vel.x.signum();
        // Run until the shot has come back past x = 0 (second wall is at x = -32)
        for _ in 0..40 {
            let mut targets = ProjectileTargets {
                grid: &grid,
                entities: &mut entities,
                boss: None,
                score: &mut score,
            };
            shot.update(DT, &mut targets, &tuning(), &mut rng);
            assert!(shot.is_alive());
            assert!(shot.pos.x + shot.radius <= 32.0);
            assert_eq!(shot.vel.y, 0.0);
            if shot.vel.x.signum() != last_sign {
                flips += 1;
                last_sign = shot.vel.x.signum();
            }
            if shot.vel.x < 0.0 && shot.pos.x < 0.0 {
                break;
            }
        }
        assert_eq!(flips, 1);
        assert!(shot.vel.x < 0.0);
        assert_eq!(shot.bounces_left, 2);
    }

    #[test]
    fn test_bounce_preserves_speed_and_spends_one() {
        let grid = wall_at_32();
        let mut score = ScoreBoard::new();
        let mut entities: Vec<Entity> = Vec::new();
        // Worst-case jitter
        let mut rng = SequenceRng::constant(0.999);
        let mut shot = EnergyProjectile::default();
        let speed = 260.0;
        shot.init(Vec2::new(24.0, 0.0), Vec2::new(1.0, 0.3), speed, 4.0, 3, 10.0);

        let mut targets = ProjectileTargets {
            grid: &grid,
            entities: &mut entities,
            boss: None,
            score: &mut score,
        };
        let step = shot.update(DT, &mut targets, &tuning(), &mut rng);

        assert_eq!(step.bounces, 1);
        assert_eq!(shot.bounces_left, 2);
        assert!(shot.vel.x < 0.0);
        assert!((shot.vel.length() - speed).abs() < 1e-3);
    }

    #[test]
    fn test_grazing_bounce_never_scatters_back_into_wall() {
        let grid = wall_at_32();
        let mut score = ScoreBoard::new();
        let mut entities: Vec<Entity> = Vec::new();
        // Full jitter toward the wall side
        let mut rng = SequenceRng::constant(0.0);
        let mut shot = EnergyProjectile::default();
        let speed = 260.0;
        shot.init(Vec2::new(27.8, 0.0), Vec2::new(0.1, 1.0), speed, 4.0, 4, 10.0);

        let mut total = 0;
        for _ in 0..10 {
            let mut targets = ProjectileTargets {
                grid: &grid,
                entities: &mut entities,
                boss: None,
                score: &mut score,
            };
            total += shot.update(DT, &mut targets, &tuning(), &mut rng).bounces;
            assert!(shot.pos.x + shot.radius <= 32.0);
        }

        assert_eq!(total, 1);
        assert_eq!(shot.bounces_left, 3);
        assert!(shot.is_alive());
        assert!(shot.vel.x < 0.0);
        assert!((shot.vel.length() - speed).abs() < 1e-3);
    }

    #[test]
    fn test_bounce_budget_allows_exactly_n_plus_one_hits() {
        // Single-cell corridor: every cell edge is solid (outside the grid)
        let grid = TileGrid::new(3, 1, 32.0, Vec2::ZERO).unwrap();
        let mut score = ScoreBoard::new();
        let mut entities: Vec<Entity> = Vec::new();
        let mut rng = Pcg32::seed_from_u64(9);
        let max_bounces = 4;
        let mut shot = EnergyProjectile::default();
        shot.init(Vec2::new(48.0, 16.0), Vec2::X, 400.0, 4.0, max_bounces, 100.0);

        let mut collisions = 0;
        for _ in 0..10_000 {
            if !shot.is_alive() {
                break;
            }
            let mut targets = ProjectileTargets {
                grid: &grid,
                entities: &mut entities,
                boss: None,
                score: &mut score,
            };
            collisions += shot.update(DT, &mut targets, &tuning(), &mut rng).bounces;
        }
        assert!(!shot.is_alive());
        assert_eq!(collisions, max_bounces as u32 + 1);
    }

    #[test]
    fn test_lifetime_expiry_is_silent() {
        let grid = TileGrid::new(10, 10, 32.0, Vec2::ZERO).unwrap();
        let mut score = ScoreBoard::new();
        let mut entities: Vec<Entity> = Vec::new();
        let mut rng = Pcg32::seed_from_u64(2);
        let mut shot = EnergyProjectile::default();
        shot.init(Vec2::new(160.0, 160.0), Vec2::Y, 10.0, 4.0, 3, 0.05);
        let mut targets = ProjectileTargets {
            grid: &grid,
            entities: &mut entities,
            boss: None,
            score: &mut score,
        };
        for _ in 0..4 {
            let step = shot.update(DT, &mut targets, &tuning(), &mut rng);
            assert_eq!(step.hit, None);
        }
        assert!(!shot.is_alive());
    }

    #[test]
    fn test_mob_dies_in_one_hit_and_consumes_shot() {
        let grid = TileGrid::new(10, 3, 32.0, Vec2::ZERO).unwrap();
        let mut score = ScoreBoard::new();
        let mob_box = Rect::new(100.0, 40.0, 16.0, 16.0);
        let mut entities = vec![Entity::new(
            EntityId(7),
            EntityKind::Mob(MobKind::Skeleton),
            mob_box,
            0.0,
            1_000.0,
        )];
        let mut rng = Pcg32::seed_from_u64(3);
        let mut shot = EnergyProjectile::default();
        shot.init(Vec2::new(40.0, 48.0), Vec2::X, 260.0, 4.0, 3, 5.0);

        let mut hit = None;
        for _ in 0..60 {
            let mut targets = ProjectileTargets {
                grid: &grid,
                entities: &mut entities,
                boss: None,
                score: &mut score,
            };
            let step = shot.update(DT, &mut targets, &tuning(), &mut rng);
            if step.hit.is_some() {
                hit = step.hit;
                break;
            }
        }
        assert_eq!(hit, Some(ProjectileHit::Mob(EntityId(7))));
        assert!(!shot.is_alive());
        assert!(!entities[0].alive);
    }

    #[test]
    fn test_movable_wall_reflects() {
        let grid = TileGrid::new(10, 3, 32.0, Vec2::ZERO).unwrap();
        let mut score = ScoreBoard::new();
        let wall_box = Rect::new(100.0, 32.0, 32.0, 32.0);
        let wall = Entity::new(EntityId(1), EntityKind::MovableWall, wall_box, 0.0, 1.0);
        let mut entities = vec![wall];
        let mut rng = Pcg32::seed_from_u64(4);
        let mut shot = EnergyProjectile::default();
        shot.init(Vec2::new(60.0, 48.0), Vec2::X, 260.0, 4.0, 3, 5.0);
        for _ in 0..20 {
            let mut targets = ProjectileTargets {
                grid: &grid,
                entities: &mut entities,
                boss: None,
                score: &mut score,
            };
            shot.update(DT, &mut targets, &tuning(), &mut rng);
        }
        assert!(shot.vel.x < 0.0);
        assert!(shot.pos.x + shot.radius <= 100.0);
    }

    #[test]
    fn test_cannon_cooldown_and_pool_limit() {
        let mut t = tuning();
        t.pool_size = 2;
        t.fire_cooldown = 0.0;
        let mut cannon = EnergyCannon::new(t);
        let mut audio = NullAudio::default();
        assert!(cannon.fire(Vec2::ZERO, Vec2::X, &mut audio));
        assert!(cannon.fire(Vec2::ZERO, Vec2::X, &mut audio));
        assert!(!cannon.fire(Vec2::ZERO, Vec2::X, &mut audio));
        assert_eq!(cannon.projectiles.len(), 2);

        let mut cannon = EnergyCannon::new(tuning());
        assert!(cannon.fire(Vec2::ZERO, Vec2::X, &mut audio));
        assert!(!cannon.fire(Vec2::ZERO, Vec2::X, &mut audio));
    }

    #[test]
    fn test_boss_takes_fixed_damage_and_consumes_shot() {
        let grid = TileGrid::new(10, 3, 32.0, Vec2::ZERO).unwrap();
        let mut score = ScoreBoard::new();
        let mut entities: Vec<Entity> = Vec::new();
        let mut rng = Pcg32::seed_from_u64(5);

        // First update spawns it straight into the hittable entering state
        let mut boss = SkullBoss::new(BossTuning {
            first_spawn_delay: 0.0,
            ..BossTuning::default()
        });
        let mut player = Player::new(Vec2::new(900.0, 900.0), &PlayerTuning::default());
        let arena = Rect::new(0.0, 0.0, 320.0, 96.0);
        boss.update(DT, &mut player, arena, &mut rng, &mut NullAudio::default(), &mut score);
        assert_eq!(boss.state(), BossState::Entering);
        boss.pos = Vec2::new(150.0, 48.0);
        let full = boss.health.value;

        let mut shot = EnergyProjectile::default();
        shot.init(Vec2::new(40.0, 48.0), Vec2::X, 260.0, 4.0, 3, 5.0);
        let mut hit = None;
        for _ in 0..60 {
            let mut targets = ProjectileTargets {
                grid: &grid,
                entities: &mut entities,
                boss: Some(&mut boss),
                score: &mut score,
            };
            let step = shot.update(DT, &mut targets, &tuning(), &mut rng);
            if step.hit.is_some() {
                hit = step.hit;
                break;
            }
        }

        assert_eq!(hit, Some(ProjectileHit::Boss));
        assert!(!shot.is_alive());
        assert_eq!(boss.health.value, full - tuning().boss_damage);
        assert_eq!(tuning().boss_damage, 20.0);
    }
}
