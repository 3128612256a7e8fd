//! Skull boss
//!
//! State flow:
//! ```text
//! Inactive -> Entering -> Idle <-> {Charging, FiringLaser}
//!                           |
//!                           v
//!                        Exiting -> Inactive
//! ```
//! Any state that takes damage drops into `Dying` once health reaches zero;
//! `Dying` always ends in `Inactive`.
//!
//! The boss remembers the health it left with and heals part of it back on
//! each return, so damage carries over between encounters.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::Health;
use super::geom::Rect;
use super::player::Player;
use super::pool::{Pool, Reset};
use super::rng::SimRng;
use crate::audio::{AudioSink, SoundEffect};
use crate::score::ScoreSink;
use crate::tuning::BossTuning;
use crate::{approach, polar_to_cartesian};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BossState {
    #[default]
    Inactive,
    Entering,
    Idle,
    Charging,
    FiringLaser,
    Dying,
    Exiting,
}

impl BossState {
    /// States in which hits register
    pub fn takes_damage(self) -> bool {
        matches!(
            self,
            Self::Entering | Self::Idle | Self::Charging | Self::FiringLaser | Self::Exiting
        )
    }

    /// States that count toward the stay timer
    fn is_fighting(self) -> bool {
        matches!(self, Self::Idle | Self::Charging | Self::FiringLaser)
    }
}

/// Homing shot fired during [`BossState::FiringLaser`]
#[derive(Debug, Clone, Default)]
pub struct HomingLaser {
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Reset for HomingLaser {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Wreckage thrown out while the boss dies
#[derive(Debug, Clone, Default)]
pub struct Debris {
    pub pos: Vec2,
    pub vel: Vec2,
    pub angle: f32,
    pub spin: f32,
    pub life: f32,
    pub max_life: f32,
}

impl Reset for Debris {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone)]
pub struct SkullBoss {
    pub tuning: BossTuning,
    state: BossState,
    /// Center position
    pub pos: Vec2,
    pub health: Health,
    first_spawn: bool,
    saved_health: f32,
    spawn_timer: f32,
    /// Time spent fighting since the last entry
    encounter_timer: f32,

    // Idle
    pub orbit_angle: f32,
    pub orbit_speed: f32,
    orbit_radius: f32,
    idle_time: f32,
    pub charge_cooldown: f32,
    laser_cooldown: f32,
    contact_timer: f32,

    // Charging
    charge_timer: f32,
    charge_dir: Vec2,
    /// Aim point relative to the player, picked when the charge starts
    charge_offset: Vec2,
    charge_hit: bool,

    // FiringLaser
    laser_timer: f32,
    laser_count: usize,
    lasers_fired: usize,

    // Dying
    dying_timer: f32,
    next_explosion: f32,

    pub lasers: Pool<HomingLaser>,
    pub debris: Pool<Debris>,
}

impl SkullBoss {
    pub fn new(tuning: BossTuning) -> Self {
        Self {
            state: BossState::Inactive,
            pos: Vec2::ZERO,
            health: Health::full(tuning.max_health),
            first_spawn: true,
            saved_health: tuning.max_health,
            spawn_timer: tuning.first_spawn_delay,
            encounter_timer: 0.0,
            orbit_angle: 0.0,
            orbit_speed: tuning.orbit_speed_min,
            orbit_radius: tuning.orbit_distance,
            idle_time: 0.0,
            charge_cooldown: 0.0,
            laser_cooldown: 0.0,
            contact_timer: 0.0,
            charge_timer: 0.0,
            charge_dir: Vec2::X,
            charge_offset: Vec2::ZERO,
            charge_hit: false,
            laser_timer: 0.0,
            laser_count: 0,
            lasers_fired: 0,
            dying_timer: 0.0,
            next_explosion: 0.0,
            lasers: Pool::new(tuning.laser_pool_size),
            debris: Pool::new(tuning.debris_pool_size),
            tuning,
        }
    }

    #[inline]
    pub fn state(&self) -> BossState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != BossState::Inactive
    }

    /// Seconds until the next entry (only meaningful while inactive)
    pub fn spawn_timer(&self) -> f32 {
        self.spawn_timer
    }

    pub fn hitbox(&self) -> Rect {
        Rect::centered(self.pos, Vec2::splat(self.tuning.size))
    }

    /// Hitbox for weapons, None while the boss cannot be hurt
    pub fn damage_hitbox(&self) -> Option<Rect> {
        self.state.takes_damage().then(|| self.hitbox())
    }

    /// Apply weapon damage. Reaching zero health starts the death sequence and
    /// pays out the kill bonus immediately. Returns false if the hit was ignored.
    pub fn apply_damage(&mut self, amount: f32, score: &mut dyn ScoreSink) -> bool {
        if !self.state.takes_damage() {
            return false;
        }
        if self.health.modify(-amount) {
            self.enter_dying(score);
        }
        true
    }

    /// Leave the fight early (e.g. the player escaped)
    pub fn begin_exit(&mut self) {
        if matches!(
            self.state,
            BossState::Entering | BossState::Idle | BossState::Charging | BossState::FiringLaser
        ) {
            log::info!("skull boss leaving with {:.0} health", self.health.value);
            self.state = BossState::Exiting;
        }
    }

    /// Advance one frame. `arena` is the world rectangle of the maze.
    pub fn update(
        &mut self,
        dt: f32,
        player: &mut Player,
        arena: Rect,
        rng: &mut dyn SimRng,
        audio: &mut dyn AudioSink,
        score: &mut dyn ScoreSink,
    ) {
        self.update_lasers(dt, player, arena);
        self.update_debris(dt);

        if self.state.takes_damage() && self.health.is_empty() {
            self.enter_dying(score);
        }
        if self.state.is_fighting() {
            self.encounter_timer += dt;
        }

        match self.state {
            BossState::Inactive => self.update_inactive(dt, arena, rng, audio),
            BossState::Entering => self.update_entering(dt, player),
            BossState::Idle => self.update_idle(dt, player, rng, audio),
            BossState::Charging => self.update_charging(dt, player, arena),
            BossState::FiringLaser => self.update_firing(dt, player, rng, audio),
            BossState::Dying => self.update_dying(dt, rng, audio),
            BossState::Exiting => self.update_exiting(dt, arena),
        }
    }

    fn update_inactive(
        &mut self,
        dt: f32,
        arena: Rect,
        rng: &mut dyn SimRng,
        audio: &mut dyn AudioSink,
    ) {
        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 {
            self.begin_entering(arena, rng, audio);
        }
    }

    fn begin_entering(&mut self, arena: Rect, rng: &mut dyn SimRng, audio: &mut dyn AudioSink) {
        let max = self.tuning.max_health;
        let value = if self.first_spawn {
            max
        } else {
            (self.saved_health + self.tuning.return_heal_fraction * max).min(max)
        };
        self.health = Health { value, max };
        self.first_spawn = false;

        // Just outside a random edge
        let (lo, hi) = (arena.min(), arena.max());
        let off = self.tuning.size;
        let x = rng.range(lo.x, hi.x);
        let y = rng.range(lo.y, hi.y);
        self.pos = match rng.index(4) {
            0 => Vec2::new(x, lo.y - off),
            1 => Vec2::new(x, hi.y + off),
            2 => Vec2::new(lo.x - off, y),
            _ => Vec2::new(hi.x + off, y),
        };

        self.encounter_timer = 0.0;
        self.charge_cooldown = 0.0;
        self.laser_cooldown = self.tuning.laser_cooldown;
        self.contact_timer = 0.0;
        self.state = BossState::Entering;
        audio.play(SoundEffect::BossRoar);
        log::info!("skull boss entering with {:.0}/{:.0} health", value, max);
    }

    fn update_entering(&mut self, dt: f32, player: &Player) {
        // Re-aimed every frame at the player's current position
        let to_player = player.center() - self.pos;
        let dist = to_player.length();
        if dist > 0.0 {
            self.pos += to_player / dist * (self.tuning.enter_speed * dt).min(dist);
        }
        let reach = self.tuning.orbit_distance + self.tuning.orbit_margin;
        if self.pos.distance(player.center()) <= reach {
            self.enter_idle(player);
        }
    }

    fn enter_idle(&mut self, player: &Player) {
        let offset = self.pos - player.center();
        self.orbit_angle = offset.y.atan2(offset.x);
        self.orbit_radius = offset.length();
        self.orbit_speed = self.tuning.orbit_speed_min;
        self.idle_time = 0.0;
        self.state = BossState::Idle;
    }

    fn update_idle(
        &mut self,
        dt: f32,
        player: &mut Player,
        rng: &mut dyn SimRng,
        audio: &mut dyn AudioSink,
    ) {
        let t = &self.tuning;
        self.idle_time += dt;
        self.charge_cooldown = (self.charge_cooldown - dt).max(0.0);
        self.laser_cooldown = (self.laser_cooldown - dt).max(0.0);
        self.contact_timer = (self.contact_timer - dt).max(0.0);

        // Spin up while a charge is allowed, wind down while it is not
        if self.charge_cooldown <= 0.0 {
            self.orbit_speed = (self.orbit_speed + t.orbit_ramp * dt).min(t.orbit_speed_max);
        } else {
            self.orbit_speed = approach(self.orbit_speed, t.orbit_speed_min, t.orbit_decay * dt);
        }

        self.orbit_angle += self.orbit_speed * dt;
        self.orbit_radius = approach(self.orbit_radius, t.orbit_distance, t.enter_speed * dt);
        self.pos = player.center() + polar_to_cartesian(self.orbit_radius, self.orbit_angle);

        if self.contact_timer <= 0.0 && self.hitbox().overlaps(&player.hitbox) {
            player.take_damage(t.contact_damage);
            self.contact_timer = t.contact_interval;
        }

        if self.encounter_timer >= t.stay_duration {
            self.begin_exit();
        } else if self.orbit_speed >= t.orbit_speed_max {
            self.begin_charge(player, rng, audio);
        } else if self.laser_cooldown <= 0.0
            && self.idle_time >= t.laser_min_idle
            && rng.chance(t.laser_chance)
        {
            self.begin_laser(rng);
        }
    }

    fn begin_charge(&mut self, player: &Player, rng: &mut dyn SimRng, audio: &mut dyn AudioSink) {
        self.charge_offset = rng.direction() * rng.range(0.0, self.tuning.charge_aim_jitter);
        let target = player.center() + self.charge_offset;
        self.charge_dir = (target - self.pos).normalize_or(Vec2::X);
        self.charge_timer = 0.0;
        self.charge_hit = false;
        self.state = BossState::Charging;
        audio.play(SoundEffect::BossCharge);
        log::debug!("skull boss charging");
    }

    fn update_charging(&mut self, dt: f32, player: &mut Player, arena: Rect) {
        let t = &self.tuning;
        self.charge_timer += dt;

        if self.charge_timer <= t.charge_reaim_time {
            let target = player.center() + self.charge_offset;
            self.charge_dir = (target - self.pos).normalize_or(self.charge_dir);
        }
        let ramp = if t.charge_ramp_time > 0.0 {
            (self.charge_timer / t.charge_ramp_time).min(1.0)
        } else {
            1.0
        };
        let speed = t.charge_min_speed + (t.charge_max_speed - t.charge_min_speed) * ramp;
        self.pos += self.charge_dir * speed * dt;

        // One hit per charge
        if !self.charge_hit && self.hitbox().overlaps(&player.hitbox) {
            player.take_damage(t.charge_damage);
            self.charge_hit = true;
        }

        if self.charge_timer >= t.charge_duration {
            self.pos = arena.expanded(t.bounds_margin).clamp_point(self.pos);
            self.charge_cooldown = t.charge_cooldown;
            self.enter_idle(player);
        }
    }

    fn begin_laser(&mut self, rng: &mut dyn SimRng) {
        self.laser_timer = 0.0;
        let (lo, hi) = (self.tuning.laser_burst_min, self.tuning.laser_burst_max);
        self.laser_count = lo + rng.index(hi.saturating_sub(lo) + 1);
        self.lasers_fired = 0;
        self.state = BossState::FiringLaser;
        log::debug!("skull boss firing {} lasers", self.laser_count);
    }

    fn update_firing(
        &mut self,
        dt: f32,
        player: &Player,
        rng: &mut dyn SimRng,
        audio: &mut dyn AudioSink,
    ) {
        let duration = self.tuning.laser_duration;
        self.laser_timer += dt;

        // Shots go out at evenly spaced marks within the burst
        while self.lasers_fired < self.laser_count
            && self.laser_timer >= duration * self.lasers_fired as f32 / self.laser_count as f32
        {
            self.fire_laser(player, rng, audio);
            self.lasers_fired += 1;
        }

        if self.laser_timer >= duration {
            self.laser_cooldown = self.tuning.laser_cooldown;
            self.enter_idle(player);
        }
    }

    fn fire_laser(&mut self, player: &Player, rng: &mut dyn SimRng, audio: &mut dyn AudioSink) {
        let aim = (player.center() - self.pos).normalize_or(Vec2::Y);
        let dir = Vec2::from_angle(rng.signed() * self.tuning.laser_spread).rotate(aim);
        let (pos, speed) = (self.pos, self.tuning.laser_speed);
        let Some(laser) = self.lasers.spawn() else {
            return;
        };
        laser.pos = pos;
        laser.vel = dir * speed;
        audio.play(SoundEffect::BossLaser);
    }

    /// Steer every laser toward the player at constant speed
    fn update_lasers(&mut self, dt: f32, player: &mut Player, arena: Rect) {
        let t = &self.tuning;
        let target = player.center();
        let player_box = player.hitbox;
        let bounds = arena.expanded(t.bounds_margin);
        let steer = (t.laser_steer * dt).min(1.0);
        let mut hits = 0;

        self.lasers.retain_mut(|laser| {
            let ideal = (target - laser.pos).normalize_or_zero() * t.laser_speed;
            let current = laser.vel.normalize_or(Vec2::Y);
            laser.vel = laser.vel.lerp(ideal, steer).normalize_or(current) * t.laser_speed;
            laser.pos += laser.vel * dt;

            if Rect::around_circle(laser.pos, t.laser_radius).overlaps(&player_box) {
                hits += 1;
                return false;
            }
            bounds.contains(laser.pos)
        });

        for _ in 0..hits {
            player.take_damage(t.laser_damage);
        }
    }

    fn enter_dying(&mut self, score: &mut dyn ScoreSink) {
        self.state = BossState::Dying;
        self.dying_timer = self.tuning.death_duration;
        self.next_explosion = 0.0;
        self.lasers.clear();
        // A defeated boss comes back fresh
        self.saved_health = self.tuning.max_health;
        score.add_score(self.tuning.death_score);
        log::info!("skull boss destroyed");
    }

    fn update_dying(&mut self, dt: f32, rng: &mut dyn SimRng, audio: &mut dyn AudioSink) {
        self.dying_timer -= dt;
        if self.dying_timer > 0.0 {
            self.next_explosion -= dt;
            if self.next_explosion <= 0.0 {
                self.explode(rng, audio);
                let t = &self.tuning;
                self.next_explosion = rng.range(t.explosion_interval_min, t.explosion_interval_max);
            }
        } else if self.debris.is_empty() {
            self.state = BossState::Inactive;
            self.spawn_timer = self.tuning.respawn_delay;
            log::info!("skull boss gone, back in {:.0}s", self.spawn_timer);
        }
    }

    fn explode(&mut self, rng: &mut dyn SimRng, audio: &mut dyn AudioSink) {
        let t = &self.tuning;
        let at = self.pos + rng.direction() * rng.range(0.0, t.size * 0.5);
        let slowest = t.debris_speed * t.debris_speed_floor;
        let shortest = t.debris_life * t.debris_life_floor;
        for _ in 0..t.debris_per_explosion {
            let Some(piece) = self.debris.spawn() else {
                break;
            };
            piece.pos = at;
            piece.vel = rng.direction() * rng.range(slowest, t.debris_speed);
            piece.spin = rng.signed() * t.debris_spin;
            piece.life = rng.range(shortest, t.debris_life);
            piece.max_life = piece.life;
        }
        audio.play(SoundEffect::BossExplosion);
    }

    fn update_debris(&mut self, dt: f32) {
        self.debris.retain_mut(|piece| {
            piece.life -= dt;
            piece.pos += piece.vel * dt;
            piece.angle += piece.spin * dt;
            piece.life > 0.0
        });
    }

    fn update_exiting(&mut self, dt: f32, arena: Rect) {
        let away = (self.pos - arena.center()).normalize_or(Vec2::NEG_Y);
        self.pos += away * self.tuning.exit_speed * dt;
        if !arena.expanded(self.tuning.exit_distance).contains(self.pos) {
            self.saved_health = self.health.value;
            self.state = BossState::Inactive;
            self.spawn_timer = self.tuning.respawn_delay;
            log::info!("skull boss left, saved {:.0} health", self.saved_health);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullAudio;
    use crate::score::ScoreBoard;
    use crate::tuning::PlayerTuning;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const DT: f32 = 1.0 / 60.0;

    struct Harness {
        boss: SkullBoss,
        player: Player,
        arena: Rect,
        rng: Pcg32,
        audio: NullAudio,
        score: ScoreBoard,
    }

    impl Harness {
        fn new(tuning: BossTuning) -> Self {
            let arena = Rect::new(0.0, 0.0, 640.0, 640.0);
            let mut player_tuning = PlayerTuning::default();
            player_tuning.max_health = 1.0e6;
            Self {
                boss: SkullBoss::new(tuning),
                player: Player::new(arena.center(), &player_tuning),
                arena,
                rng: Pcg32::seed_from_u64(11),
                audio: NullAudio::default(),
                score: ScoreBoard::new(),
            }
        }

        fn step(&mut self) {
            self.boss.update(
                DT,
                &mut self.player,
                self.arena,
                &mut self.rng,
                &mut self.audio,
                &mut self.score,
            );
        }

        /// Step until `state` or the frame budget runs out
        fn run_until(&mut self, state: BossState, max_frames: usize) -> bool {
            for _ in 0..max_frames {
                if self.boss.state() == state {
                    return true;
                }
                self.step();
            }
            self.boss.state() == state
        }

        fn spawn_now(&mut self) {
            self.boss.spawn_timer = 0.0;
            self.step();
            assert_eq!(self.boss.state(), BossState::Entering);
        }
    }

    fn calm_tuning() -> BossTuning {
        BossTuning {
            laser_chance: 0.0,
            stay_duration: 1.0e6,
            ..BossTuning::default()
        }
    }

    #[test]
    fn test_first_spawn_at_full_health_outside_arena() {
        let mut h = Harness::new(calm_tuning());
        h.spawn_now();
        assert_eq!(h.boss.health.value, 200.0);
        assert!(!h.arena.contains(h.boss.pos));
    }

    #[test]
    fn test_respawn_heals_part_of_saved_health() {
        let mut h = Harness::new(calm_tuning());
        h.spawn_now();
        h.boss.health.value = 50.0;
        h.boss.begin_exit();
        assert!(h.run_until(BossState::Inactive, 600));
        assert_eq!(h.boss.saved_health, 50.0);

        assert!(h.run_until(BossState::Entering, 60 * 50));
        assert!((h.boss.health.value - 110.0).abs() < 1e-3);
    }

    #[test]
    fn test_entering_reaches_idle_near_player() {
        let mut h = Harness::new(calm_tuning());
        h.spawn_now();
        assert!(h.run_until(BossState::Idle, 600));
        let reach = h.boss.tuning.orbit_distance + h.boss.tuning.orbit_margin;
        assert!(h.boss.pos.distance(h.player.center()) <= reach + 1e-3);
    }

    #[test]
    fn test_idle_spins_up_into_charge() {
        let mut h = Harness::new(calm_tuning());
        h.spawn_now();
        assert!(h.run_until(BossState::Idle, 600));
        assert!(h.boss.charge_cooldown <= 0.0);

        let mut last = h.boss.orbit_speed;
        for _ in 0..60 * 20 {
            h.step();
            if h.boss.state() != BossState::Idle {
                break;
            }
            assert!(h.boss.orbit_speed >= last);
            last = h.boss.orbit_speed;
        }
        assert_eq!(h.boss.state(), BossState::Charging);
    }

    #[test]
    fn test_charge_hits_player_once() {
        let mut h = Harness::new(calm_tuning());
        h.spawn_now();
        h.boss.state = BossState::Idle;
        h.boss.pos = h.player.center() - Vec2::new(80.0, 0.0);
        h.boss.begin_charge(&h.player, &mut h.rng, &mut h.audio);

        let before = h.player.health.value;
        while h.boss.state() == BossState::Charging {
            h.step();
        }
        assert_eq!(h.player.health.value, before - h.boss.tuning.charge_damage);
        assert!(h.boss.charge_cooldown > 0.0);
    }

    #[test]
    fn test_zero_health_dies_in_same_update() {
        let mut h = Harness::new(calm_tuning());
        h.spawn_now();
        h.boss.health.value = 0.0;
        h.step();
        assert_eq!(h.boss.state(), BossState::Dying);
        assert_eq!(h.score.total, 5000);
        assert!(h.boss.damage_hitbox().is_none());

        assert!(h.run_until(BossState::Inactive, 60 * 10));
        assert!(h.boss.debris.is_empty());
        assert_eq!(h.score.total, 5000);
    }

    #[test]
    fn test_lethal_hit_awards_score_on_entry() {
        let mut h = Harness::new(calm_tuning());
        h.spawn_now();
        assert!(h.boss.apply_damage(150.0, &mut h.score));
        assert_eq!(h.score.total, 0);
        assert!(h.boss.apply_damage(60.0, &mut h.score));
        assert_eq!(h.boss.state(), BossState::Dying);
        assert_eq!(h.score.total, 5000);
        assert!(!h.boss.apply_damage(10.0, &mut h.score));
    }

    #[test]
    fn test_homing_laser_turns_toward_player() {
        let mut h = Harness::new(calm_tuning());
        let start = h.player.center() + Vec2::new(200.0, 0.0);
        let speed = h.boss.tuning.laser_speed;
        let laser = h.boss.lasers.spawn().unwrap();
        laser.pos = start;
        laser.vel = Vec2::new(0.0, speed);

        for _ in 0..30 {
            h.boss.update_lasers(DT, &mut h.player, h.arena);
        }
        let laser = h.boss.lasers.get(0).unwrap();
        assert!((laser.vel.length() - speed).abs() < 1e-2);
        let to_player = (h.player.center() - laser.pos).normalize();
        assert!(laser.vel.normalize().dot(to_player) > 0.5);
    }

    #[test]
    fn test_stay_timer_sends_boss_away() {
        let tuning = BossTuning {
            stay_duration: 1.0,
            ..calm_tuning()
        };
        let mut h = Harness::new(tuning);
        h.spawn_now();
        assert!(h.run_until(BossState::Exiting, 60 * 10));
        assert!(h.run_until(BossState::Inactive, 60 * 10));
        assert!((h.boss.spawn_timer() - h.boss.tuning.respawn_delay).abs() < 0.1);
    }

    #[test]
    fn test_laser_burst_fires_three_or_four_then_idles() {
        let mut counts = Vec::new();
        for seed in 0..20 {
            let mut h = Harness::new(calm_tuning());
            h.rng = Pcg32::seed_from_u64(seed);
            h.spawn_now();
            assert!(h.run_until(BossState::Idle, 600));

            h.boss.begin_laser(&mut h.rng);
            assert_eq!(h.boss.state(), BossState::FiringLaser);
            let mut frames = 0;
            while h.boss.state() == BossState::FiringLaser {
                h.step();
                frames += 1;
                assert!(frames <= 80);
            }

            assert_eq!(h.boss.state(), BossState::Idle);
            assert_eq!(h.boss.lasers_fired, h.boss.laser_count);
            assert!(h.boss.laser_cooldown > 0.0);
            counts.push(h.boss.laser_count);
        }
        assert!(counts.iter().all(|c| (3..=4).contains(c)));
        assert!(counts.contains(&3) && counts.contains(&4));
    }

    #[test]
    fn test_charge_ends_clamped_inside_expanded_arena() {
        let mut h = Harness::new(calm_tuning());
        h.spawn_now();
        h.boss.state = BossState::Charging;
        h.boss.pos = Vec2::new(40.0, 320.0);
        h.boss.charge_dir = Vec2::NEG_X;
        h.boss.charge_hit = true;
        // Past the re-aim window, so the boss keeps flying left
        h.boss.charge_timer = h.boss.tuning.charge_reaim_time + 0.01;

        while h.boss.state() == BossState::Charging {
            h.step();
        }
        let bounds = h.arena.expanded(h.boss.tuning.bounds_margin);
        assert_eq!(h.boss.state(), BossState::Idle);
        assert!((h.boss.pos.x - bounds.min().x).abs() < 1e-3);
        assert!(bounds.contains(h.boss.pos));
    }

    #[test]
    fn test_charge_reaim_keeps_offset_from_player() {
        let mut h = Harness::new(calm_tuning());
        h.spawn_now();
        h.boss.state = BossState::Idle;
        h.boss.pos = h.player.center() + Vec2::new(80.0, 0.0);
        h.boss.begin_charge(&h.player, &mut h.rng, &mut h.audio);
        h.boss.charge_offset = Vec2::new(0.0, 20.0);

        let start = h.boss.pos;
        h.step();
        let expected = (h.player.center() + Vec2::new(0.0, 20.0) - start).normalize();
        assert!((h.boss.charge_dir - expected).length() < 1e-4);
        assert!(h.boss.charge_dir.y > 0.1);
    }
}
