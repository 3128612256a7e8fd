//! Arcade shoot-'em-up stage
//!
//! A vertical shooter reached from the maze by the spaceship pickup. Every
//! moving object lives in a fixed-capacity [`Pool`]; spawns beyond capacity are
//! dropped. All hit tests are center-distance against per-object half extents.
//!
//! After surviving long enough a boss appears. It cycles
//! Entering -> Drifting -> Charging -> BurstFiring -> Cooldown -> Drifting
//! until destroyed, which plays a short explosion sequence before the stage
//! is won.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::Health;
use super::pool::{Pool, Reset};
use super::rng::SimRng;
use crate::audio::{AudioSink, SoundEffect};
use crate::score::ScoreSink;
use crate::tuning::ArcadeTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArcadeStatus {
    Playing,
    Won,
    Lost,
}

/// Decoded per-frame input
#[derive(Debug, Clone, Copy, Default)]
pub struct ArcadeInput {
    pub move_dir: Vec2,
    pub fire: bool,
}

/// Bullet (player or enemy)
#[derive(Debug, Clone, Default)]
pub struct Shot {
    pub pos: Vec2,
    pub vel: Vec2,
}

#[derive(Debug, Clone, Default)]
pub struct Enemy {
    pub pos: Vec2,
    pub vel: Vec2,
    pub fire_timer: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Asteroid {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub angle: f32,
    pub spin: f32,
    pub hits_left: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Explosion {
    pub pos: Vec2,
    pub life: f32,
    pub scale: f32,
}

macro_rules! reset_to_default {
    ($($ty:ty),*) => {
        $(impl Reset for $ty {
            fn reset(&mut self) {
                *self = Self::default();
            }
        })*
    };
}

reset_to_default!(Shot, Enemy, Asteroid, Explosion);

#[derive(Debug, Clone)]
pub struct Ship {
    pub pos: Vec2,
    pub health: Health,
    /// Post-hit grace period
    pub invuln_timer: f32,
    fire_cooldown: f32,
    /// 0..=1, reaching 1 locks the guns
    pub heat: f32,
    pub overheat_timer: f32,
}

impl Ship {
    pub fn is_overheated(&self) -> bool {
        self.overheat_timer > 0.0
    }

    /// Blinks while invulnerable
    pub fn is_visible(&self) -> bool {
        self.invuln_timer <= 0.0 || (self.invuln_timer * 10.0) as i32 % 2 == 0
    }

    /// Returns true if the hit landed; a landed hit starts `grace` seconds
    /// of invulnerability
    fn hit(&mut self, damage: f32, grace: f32) -> bool {
        if self.invuln_timer > 0.0 {
            return false;
        }
        self.health.modify(-damage);
        self.invuln_timer = grace;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArcadeBossState {
    Entering,
    Drifting,
    Charging,
    BurstFiring,
    Cooldown,
}

#[derive(Debug, Clone)]
pub struct ArcadeBoss {
    pub pos: Vec2,
    pub health: Health,
    pub state: ArcadeBossState,
    timer: f32,
    dwell: f32,
    drift_vx: f32,
    target_x: f32,
    pairs_fired: u32,
}

impl ArcadeBoss {
    fn start_drift(&mut self, t: &ArcadeTuning, rng: &mut dyn SimRng) {
        self.state = ArcadeBossState::Drifting;
        self.timer = 0.0;
        self.dwell = rng.range(t.boss_dwell_min, t.boss_dwell_max);
        self.drift_vx = rng.sign() * t.boss_drift_speed;
    }
}

#[derive(Debug, Clone, Copy)]
struct DeathCinematic {
    center: Vec2,
    timer: f32,
    next_burst: f32,
}

#[inline]
fn overlaps(a: Vec2, a_half: Vec2, b: Vec2, b_half: Vec2) -> bool {
    let d = (a - b).abs();
    d.x < a_half.x + b_half.x && d.y < a_half.y + b_half.y
}

fn spawn_shot(pool: &mut Pool<Shot>, pos: Vec2, vel: Vec2) -> bool {
    match pool.spawn() {
        Some(shot) => {
            shot.pos = pos;
            shot.vel = vel;
            true
        }
        None => false,
    }
}

fn spawn_explosion(pool: &mut Pool<Explosion>, pos: Vec2, scale: f32, life: f32) {
    if let Some(boom) = pool.spawn() {
        boom.pos = pos;
        boom.life = life;
        boom.scale = scale;
    }
}

/// The whole arcade stage
#[derive(Debug, Clone)]
pub struct Arcade {
    pub tuning: ArcadeTuning,
    status: ArcadeStatus,
    /// Seconds survived
    pub elapsed: f32,
    pub ship: Ship,
    pub bullets: Pool<Shot>,
    pub enemies: Pool<Enemy>,
    pub enemy_bullets: Pool<Shot>,
    pub asteroids: Pool<Asteroid>,
    pub explosions: Pool<Explosion>,
    pub boss: Option<ArcadeBoss>,
    boss_spawned: bool,
    enemy_spawn_timer: f32,
    asteroid_spawn_timer: f32,
    death: Option<DeathCinematic>,
}

impl Arcade {
    pub fn new(tuning: ArcadeTuning) -> Self {
        let ship = Ship {
            pos: Vec2::new(tuning.width * 0.5, tuning.height - tuning.ship_start_inset),
            health: Health::full(tuning.ship_health),
            invuln_timer: 0.0,
            fire_cooldown: 0.0,
            heat: 0.0,
            overheat_timer: 0.0,
        };
        Self {
            status: ArcadeStatus::Playing,
            elapsed: 0.0,
            ship,
            bullets: Pool::new(tuning.bullet_capacity),
            enemies: Pool::new(tuning.enemy_capacity),
            enemy_bullets: Pool::new(tuning.enemy_bullet_capacity),
            asteroids: Pool::new(tuning.asteroid_capacity),
            explosions: Pool::new(tuning.explosion_capacity),
            boss: None,
            boss_spawned: false,
            enemy_spawn_timer: tuning.enemy_spawn_min,
            asteroid_spawn_timer: tuning.asteroid_spawn_max,
            death: None,
            tuning,
        }
    }

    #[inline]
    pub fn status(&self) -> ArcadeStatus {
        self.status
    }

    /// True while the boss explosion sequence is playing
    pub fn is_boss_dying(&self) -> bool {
        self.death.is_some()
    }

    /// Advance one frame
    pub fn update(
        &mut self,
        dt: f32,
        input: ArcadeInput,
        rng: &mut dyn SimRng,
        audio: &mut dyn AudioSink,
        score: &mut dyn ScoreSink,
    ) -> ArcadeStatus {
        if self.status != ArcadeStatus::Playing {
            return self.status;
        }
        self.elapsed += dt;

        self.update_ship(dt, input, audio);
        self.update_shots(dt);
        self.spawn_enemies(dt, rng);
        self.spawn_asteroids(dt, rng);
        self.update_enemies(dt, rng);
        self.update_asteroids(dt);

        if !self.boss_spawned && self.elapsed >= self.tuning.boss_time {
            self.spawn_boss();
        }
        self.update_boss(dt, rng, audio);

        self.resolve_collisions(score, audio);
        self.explosions.retain_mut(|boom| {
            boom.life -= dt;
            boom.life > 0.0
        });
        self.update_death(dt, rng, audio);

        if self.status == ArcadeStatus::Playing && self.ship.health.is_empty() {
            log::info!("arcade lost after {:.1}s", self.elapsed);
            self.status = ArcadeStatus::Lost;
        }
        self.status
    }

    fn update_ship(&mut self, dt: f32, input: ArcadeInput, audio: &mut dyn AudioSink) {
        let t = &self.tuning;
        let ship = &mut self.ship;

        ship.invuln_timer = (ship.invuln_timer - dt).max(0.0);
        ship.fire_cooldown = (ship.fire_cooldown - dt).max(0.0);
        ship.overheat_timer = (ship.overheat_timer - dt).max(0.0);
        ship.heat = (ship.heat - t.heat_cool_rate * dt).max(0.0);

        ship.pos += input.move_dir.clamp_length_max(1.0) * t.ship_speed * dt;
        ship.pos = ship
            .pos
            .clamp(t.ship_half, Vec2::new(t.width, t.height) - t.ship_half);

        if !input.fire || ship.fire_cooldown > 0.0 || ship.is_overheated() {
            return;
        }
        let muzzle = ship.pos - Vec2::new(0.0, t.ship_half.y);
        if !spawn_shot(&mut self.bullets, muzzle, Vec2::new(0.0, -t.bullet_speed)) {
            return;
        }
        ship.fire_cooldown = t.fire_cooldown;
        ship.heat += t.heat_per_shot;
        audio.play(SoundEffect::ArcadeShot);

        if ship.heat >= 1.0 {
            ship.heat = 1.0;
            ship.overheat_timer = t.overheat_lockout;
            audio.play(SoundEffect::ArcadeOverheat);
            log::debug!("arcade guns overheated");
        }
    }

    fn update_shots(&mut self, dt: f32) {
        let margin = Vec2::splat(self.tuning.cull_margin);
        let (lo, hi) = (-margin, Vec2::new(self.tuning.width, self.tuning.height) + margin);
        let on_screen = |pos: Vec2| pos.cmpgt(lo).all() && pos.cmplt(hi).all();
        self.bullets.retain_mut(|shot| {
            shot.pos += shot.vel * dt;
            on_screen(shot.pos)
        });
        self.enemy_bullets.retain_mut(|shot| {
            shot.pos += shot.vel * dt;
            on_screen(shot.pos)
        });
    }

    fn spawn_enemies(&mut self, dt: f32, rng: &mut dyn SimRng) {
        // The boss fight has the screen to itself
        if self.boss_spawned {
            return;
        }
        self.enemy_spawn_timer -= dt;
        if self.enemy_spawn_timer > 0.0 {
            return;
        }
        let t = &self.tuning;
        self.enemy_spawn_timer = rng.range(t.enemy_spawn_min, t.enemy_spawn_max);

        let Some(enemy) = self.enemies.spawn() else {
            log::debug!("enemy pool full, spawn dropped");
            return;
        };
        let half = t.enemy_half;
        enemy.pos = Vec2::new(rng.range(half.x, t.width - half.x), -half.y);
        enemy.vel = Vec2::new(
            rng.sign() * rng.range(t.enemy_strafe_min, t.enemy_strafe_max),
            rng.range(t.enemy_drift_min, t.enemy_drift_max),
        );
        enemy.fire_timer = rng.range(t.enemy_fire_min, t.enemy_fire_max);
    }

    fn spawn_asteroids(&mut self, dt: f32, rng: &mut dyn SimRng) {
        self.asteroid_spawn_timer -= dt;
        if self.asteroid_spawn_timer > 0.0 {
            return;
        }
        let t = &self.tuning;
        self.asteroid_spawn_timer = rng.range(t.asteroid_spawn_min, t.asteroid_spawn_max);

        let Some(rock) = self.asteroids.spawn() else {
            return;
        };
        rock.radius = rng.range(t.asteroid_radius_min, t.asteroid_radius_max);
        rock.pos = Vec2::new(rng.range(rock.radius, t.width - rock.radius), -rock.radius);
        rock.vel = Vec2::new(
            rng.signed() * t.asteroid_drift_x,
            rng.range(t.asteroid_fall_min, t.asteroid_fall_max),
        );
        rock.spin = rng.signed() * t.asteroid_spin;
        rock.hits_left = t.asteroid_hits;
    }

    /// Drift down, strafe between the side walls, shoot on a per-enemy timer
    fn update_enemies(&mut self, dt: f32, rng: &mut dyn SimRng) {
        let t = &self.tuning;
        let half = t.enemy_half;
        let enemy_bullets = &mut self.enemy_bullets;

        self.enemies.retain_mut(|enemy| {
            enemy.pos += enemy.vel * dt;
            if enemy.pos.x < half.x {
                enemy.pos.x = half.x;
                enemy.vel.x = enemy.vel.x.abs();
            } else if enemy.pos.x > t.width - half.x {
                enemy.pos.x = t.width - half.x;
                enemy.vel.x = -enemy.vel.x.abs();
            }

            enemy.fire_timer -= dt;
            if enemy.fire_timer <= 0.0 {
                let muzzle = enemy.pos + Vec2::new(0.0, half.y);
                spawn_shot(enemy_bullets, muzzle, Vec2::new(0.0, t.enemy_bullet_speed));
                enemy.fire_timer = rng.range(t.enemy_fire_min, t.enemy_fire_max);
            }

            enemy.pos.y < t.height + half.y
        });
    }

    fn update_asteroids(&mut self, dt: f32) {
        let height = self.tuning.height;
        self.asteroids.retain_mut(|rock| {
            rock.pos += rock.vel * dt;
            rock.angle += rock.spin * dt;
            rock.pos.y < height + rock.radius
        });
    }

    fn spawn_boss(&mut self) {
        self.boss_spawned = true;
        self.boss = Some(ArcadeBoss {
            pos: Vec2::new(self.tuning.width * 0.5, -self.tuning.boss_half.y),
            health: Health::full(self.tuning.boss_health),
            state: ArcadeBossState::Entering,
            timer: 0.0,
            dwell: 0.0,
            drift_vx: 0.0,
            target_x: 0.0,
            pairs_fired: 0,
        });
        log::info!("arcade boss incoming after {:.1}s", self.elapsed);
    }

    fn update_boss(&mut self, dt: f32, rng: &mut dyn SimRng, audio: &mut dyn AudioSink) {
        let Some(boss) = self.boss.as_mut() else {
            return;
        };
        if boss.health.is_empty() {
            return;
        }
        let t = &self.tuning;
        let (lo, hi) = (t.boss_half.x, t.width - t.boss_half.x);
        boss.timer += dt;

        match boss.state {
            ArcadeBossState::Entering => {
                boss.pos.y += t.boss_enter_speed * dt;
                if boss.pos.y >= t.boss_hover_y {
                    boss.pos.y = t.boss_hover_y;
                    boss.start_drift(t, rng);
                }
            }
            ArcadeBossState::Drifting => {
                boss.pos.x += boss.drift_vx * dt;
                if boss.pos.x < lo || boss.pos.x > hi {
                    boss.pos.x = boss.pos.x.clamp(lo, hi);
                    boss.drift_vx = -boss.drift_vx;
                }
                if boss.timer >= boss.dwell {
                    boss.state = ArcadeBossState::Charging;
                    boss.timer = 0.0;
                    boss.target_x = self.ship.pos.x.clamp(lo, hi);
                }
            }
            ArcadeBossState::Charging => {
                let step = t.boss_charge_speed * dt;
                boss.pos.x += (boss.target_x - boss.pos.x).clamp(-step, step);
                let arrived = (boss.target_x - boss.pos.x).abs() <= t.boss_charge_tolerance;
                if arrived || boss.timer >= t.boss_charge_timeout {
                    boss.state = ArcadeBossState::BurstFiring;
                    boss.timer = 0.0;
                    boss.pairs_fired = 0;
                }
            }
            ArcadeBossState::BurstFiring => {
                while boss.pairs_fired < t.boss_burst_pairs
                    && boss.timer >= boss.pairs_fired as f32 * t.boss_burst_interval
                {
                    let muzzle = boss.pos + Vec2::new(0.0, t.boss_half.y);
                    let vel = Vec2::new(0.0, t.boss_bullet_speed);
                    for side in [-1.0, 1.0] {
                        let gun = muzzle + Vec2::new(side * t.boss_pair_spread, 0.0);
                        spawn_shot(&mut self.enemy_bullets, gun, vel);
                    }
                    boss.pairs_fired += 1;
                    audio.play(SoundEffect::ArcadeShot);
                }
                if boss.pairs_fired >= t.boss_burst_pairs
                    && boss.timer >= t.boss_burst_pairs as f32 * t.boss_burst_interval
                {
                    boss.state = ArcadeBossState::Cooldown;
                    boss.timer = 0.0;
                }
            }
            ArcadeBossState::Cooldown => {
                if boss.timer >= t.boss_cooldown {
                    boss.start_drift(t, rng);
                }
            }
        }
    }

    fn resolve_collisions(&mut self, score: &mut dyn ScoreSink, audio: &mut dyn AudioSink) {
        let t = &self.tuning;
        let life = t.explosion_life;
        let enemies = &mut self.enemies;
        let asteroids = &mut self.asteroids;
        let explosions = &mut self.explosions;
        let boss = &mut self.boss;
        let mut boss_killed = false;

        // Player bullets
        self.bullets.retain_mut(|shot| {
            if let Some(i) = enemies
                .iter()
                .position(|e| overlaps(shot.pos, t.bullet_half, e.pos, t.enemy_half))
            {
                let pos = enemies.as_slice()[i].pos;
                enemies.swap_remove(i);
                spawn_explosion(explosions, pos, 1.0, life);
                score.add_score(t.enemy_score);
                audio.play(SoundEffect::ArcadeExplosion);
                return false;
            }
            if let Some(rock) = asteroids.iter_mut().find(|a| {
                a.hits_left > 0 && overlaps(shot.pos, t.bullet_half, a.pos, Vec2::splat(a.radius))
            }) {
                rock.hits_left -= 1;
                return false;
            }
            if let Some(b) = boss.as_mut().filter(|b| !b.health.is_empty()) {
                if overlaps(shot.pos, t.bullet_half, b.pos, t.boss_half) {
                    boss_killed |= b.health.modify(-t.bullet_damage);
                    return false;
                }
            }
            true
        });

        asteroids.retain_mut(|rock| {
            if rock.hits_left > 0 {
                return true;
            }
            spawn_explosion(explosions, rock.pos, rock.radius / 16.0, life);
            score.add_score(t.asteroid_score);
            audio.play(SoundEffect::ArcadeExplosion);
            false
        });

        if boss_killed {
            if let Some(b) = boss.as_ref() {
                self.death = Some(DeathCinematic {
                    center: b.pos,
                    timer: 0.0,
                    next_burst: 0.0,
                });
            }
            self.enemy_bullets.clear();
            score.add_score(t.boss_score);
            log::info!("arcade boss destroyed");
        }

        // Ship takes the worst single hit this frame
        let (ship_pos, ship_half) = (self.ship.pos, t.ship_half);
        let mut incoming: f32 = 0.0;
        self.enemy_bullets.retain_mut(|shot| {
            if overlaps(shot.pos, t.enemy_bullet_half, ship_pos, ship_half) {
                incoming = incoming.max(t.enemy_bullet_damage);
                return false;
            }
            true
        });
        enemies.retain_mut(|enemy| {
            if overlaps(enemy.pos, t.enemy_half, ship_pos, ship_half) {
                incoming = incoming.max(t.enemy_contact_damage);
                spawn_explosion(explosions, enemy.pos, 1.0, life);
                return false;
            }
            true
        });
        asteroids.retain_mut(|rock| {
            if overlaps(rock.pos, Vec2::splat(rock.radius), ship_pos, ship_half) {
                incoming = incoming.max(t.asteroid_damage);
                spawn_explosion(explosions, rock.pos, rock.radius / 16.0, life);
                return false;
            }
            true
        });
        if let Some(b) = boss.as_ref().filter(|b| !b.health.is_empty()) {
            if overlaps(b.pos, t.boss_half, ship_pos, ship_half) {
                incoming = incoming.max(t.boss_contact_damage);
            }
        }

        if incoming > 0.0 && self.ship.hit(incoming, t.ship_invuln_time) {
            audio.play(SoundEffect::PlayerHurt);
        }
    }

    /// Timed explosion bursts over the wreck, then victory
    fn update_death(&mut self, dt: f32, rng: &mut dyn SimRng, audio: &mut dyn AudioSink) {
        let Some(death) = self.death.as_mut() else {
            return;
        };
        let t = &self.tuning;
        death.timer += dt;
        death.next_burst -= dt;
        if death.next_burst <= 0.0 {
            for _ in 0..t.death_burst_size {
                let offset = Vec2::new(rng.signed(), rng.signed()) * t.boss_half;
                let (at, scale) = (death.center + offset, rng.range(1.0, 2.5));
                spawn_explosion(&mut self.explosions, at, scale, t.explosion_life);
            }
            audio.play(SoundEffect::ArcadeExplosion);
            death.next_burst = t.death_burst_interval;
        }
        if death.timer >= t.death_duration {
            self.death = None;
            self.boss = None;
            self.status = ArcadeStatus::Won;
            log::info!("arcade won after {:.1}s", self.elapsed);
        }
    }
}
