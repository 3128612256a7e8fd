//! Orbiting light saber
//!
//! A timed melee weapon: while active, a blade circles the anchor point the
//! caller supplies each frame (the player's center) and leaves a spark trail.
//! Both the blade and the trail damage whatever they overlap, gated per target
//! by a short hit cooldown. Once active time runs out, the cooldown counts down
//! before the saber can be used again.

use std::collections::HashMap;

use glam::Vec2;

use super::boss::SkullBoss;
use super::entity::{Entity, EntityId};
use super::geom::Rect;
use super::pool::{Pool, Reset};
use super::rng::SimRng;
use crate::audio::{AudioSink, SoundEffect, SoundHandle};
use crate::score::ScoreSink;
use crate::tuning::SaberTuning;
use crate::{normalize_angle, polar_to_cartesian};

/// Spark left behind by the blade
#[derive(Debug, Clone, Default)]
pub struct Spark {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds remaining
    pub life: f32,
    pub max_life: f32,
}

impl Reset for Spark {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

impl Spark {
    /// Opacity in [0, 1] for rendering
    pub fn alpha(&self) -> f32 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }
}

/// Things the saber can cut this frame
pub struct SaberTargets<'a> {
    pub entities: &'a mut [Entity],
    pub boss: Option<&'a mut SkullBoss>,
    pub score: &'a mut dyn ScoreSink,
}

#[derive(Debug, Clone)]
pub struct LightSaber {
    pub tuning: SaberTuning,
    active: bool,
    active_timer: f32,
    /// Counts down only while inactive
    cooldown_timer: f32,
    /// Blade angle in radians
    pub angle: f32,
    /// +1 or -1
    pub spin: f32,
    pub sparks: Pool<Spark>,
    spark_accum: f32,
    hit_cooldowns: HashMap<EntityId, f32>,
    boss_cooldown: f32,
    hum: Option<SoundHandle>,
    /// Damage boxes from the last update (render/debug)
    pub blade: Option<Rect>,
    pub trail: Option<Rect>,
}

impl LightSaber {
    pub fn new(tuning: SaberTuning) -> Self {
        Self {
            sparks: Pool::new(tuning.spark_pool_size),
            tuning,
            active: false,
            active_timer: 0.0,
            cooldown_timer: 0.0,
            angle: 0.0,
            spin: 1.0,
            spark_accum: 0.0,
            hit_cooldowns: HashMap::new(),
            boss_cooldown: 0.0,
            hum: None,
            blade: None,
            trail: None,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn can_activate(&self) -> bool {
        !self.active && self.cooldown_timer <= 0.0
    }

    pub fn active_remaining(&self) -> f32 {
        self.active_timer.max(0.0)
    }

    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown_timer.max(0.0)
    }

    /// Ignite the saber. Does nothing while active or cooling down.
    pub fn try_activate(&mut self, rng: &mut dyn SimRng, audio: &mut dyn AudioSink) -> bool {
        if !self.can_activate() {
            return false;
        }
        self.active = true;
        self.active_timer = self.tuning.active_duration;
        self.cooldown_timer = self.tuning.cooldown_duration;
        self.angle = rng.range(-std::f32::consts::PI, std::f32::consts::PI);
        self.spin = rng.sign();
        self.spark_accum = 0.0;
        self.hit_cooldowns.clear();
        self.boss_cooldown = 0.0;

        audio.play(SoundEffect::SaberOn);
        self.hum = Some(audio.play_looping(SoundEffect::SaberHum));
        log::debug!("light saber on (spin {})", self.spin);
        true
    }

    fn deactivate(&mut self, audio: &mut dyn AudioSink) {
        self.active = false;
        self.active_timer = 0.0;
        self.blade = None;
        self.trail = None;
        if let Some(handle) = self.hum.take() {
            audio.stop(handle);
        }
        audio.play(SoundEffect::SaberOff);
        log::debug!("light saber off");
    }

    /// Blade AABB at the current angle around `anchor`
    pub fn blade_rect(&self, anchor: Vec2) -> Rect {
        let center = anchor + polar_to_cartesian(self.tuning.orbit_radius, self.angle);
        let (sin, cos) = self.angle.sin_cos();
        let half_len = self.tuning.blade_length * 0.5;
        let half_width = self.tuning.blade_width * 0.5;
        // Bounding box of the blade rotated to lie along the radius
        let half = Vec2::new(
            cos.abs() * half_len + sin.abs() * half_width,
            sin.abs() * half_len + cos.abs() * half_width,
        );
        Rect::centered(center, half * 2.0)
    }

    /// AABB spanning every live spark, padded by half a blade width
    pub fn trail_rect(&self) -> Option<Rect> {
        let pad = self.tuning.blade_width * 0.5;
        self.sparks
            .iter()
            .map(|s| Rect::around_circle(s.pos, pad))
            .reduce(|a, b| a.union(&b))
    }

    /// Advance one frame. `anchor` is where the saber orbits this frame.
    pub fn update(
        &mut self,
        dt: f32,
        anchor: Vec2,
        targets: &mut SaberTargets<'_>,
        rng: &mut dyn SimRng,
        audio: &mut dyn AudioSink,
    ) {
        // Sparks fade out even after the blade is gone
        let drag = self.tuning.spark_drag.powf(dt);
        self.sparks.retain_mut(|spark| {
            spark.life -= dt;
            spark.pos += spark.vel * dt;
            spark.vel *= drag;
            spark.life > 0.0
        });
        for cooldown in self.hit_cooldowns.values_mut() {
            *cooldown -= dt;
        }
        self.hit_cooldowns.retain(|_, cooldown| *cooldown > 0.0);
        self.boss_cooldown = (self.boss_cooldown - dt).max(0.0);

        if !self.active {
            self.cooldown_timer = (self.cooldown_timer - dt).max(0.0);
            return;
        }

        self.active_timer -= dt;
        if self.active_timer <= 0.0 {
            self.deactivate(audio);
            return;
        }

        let rot_speed = self.tuning.rot_speed_deg.to_radians();
        self.angle = normalize_angle(self.angle + self.spin * rot_speed * dt);

        let blade = self.blade_rect(anchor);
        self.emit_sparks(dt, blade.center(), rng);
        let trail = self.trail_rect();

        self.strike_mobs(Some(blade), trail, targets.entities);
        if let Some(boss) = targets.boss.as_deref_mut() {
            self.strike_boss(boss, Some(blade), trail, &mut *targets.score);
        }

        self.blade = Some(blade);
        self.trail = trail;
    }

    fn emit_sparks(&mut self, dt: f32, at: Vec2, rng: &mut dyn SimRng) {
        self.spark_accum += self.tuning.sparks_per_sec * dt;
        while self.spark_accum >= 1.0 {
            self.spark_accum -= 1.0;
            // Pool full: drop the spark
            let Some(spark) = self.sparks.spawn() else {
                continue;
            };
            spark.pos = at;
            let (lo, hi) = (self.tuning.spark_speed_min, self.tuning.spark_speed_max);
            spark.vel = rng.direction() * rng.range(lo, hi);
            spark.life = self.tuning.spark_life;
            spark.max_life = self.tuning.spark_life;
        }
    }

    /// Blade kills mobs outright; the trail chips at them
    fn strike_mobs(&mut self, blade: Option<Rect>, trail: Option<Rect>, entities: &mut [Entity]) {
        for mob in entities.iter_mut().filter(|e| e.is_mob() && e.alive) {
            if self.hit_cooldowns.contains_key(&mob.id) {
                continue;
            }
            let damage = if blade.is_some_and(|b| mob.overlaps(&b)) {
                f32::MAX
            } else if trail.is_some_and(|t| mob.overlaps(&t)) {
                self.tuning.trail_damage
            } else {
                continue;
            };
            mob.take_damage(damage);
            self.hit_cooldowns.insert(mob.id, self.tuning.hit_cooldown);
        }
    }

    fn strike_boss(
        &mut self,
        boss: &mut SkullBoss,
        blade: Option<Rect>,
        trail: Option<Rect>,
        score: &mut dyn ScoreSink,
    ) {
        if self.boss_cooldown > 0.0 {
            return;
        }
        let Some(hitbox) = boss.damage_hitbox() else {
            return;
        };
        let touching = blade.is_some_and(|b| b.overlaps(&hitbox))
            || trail.is_some_and(|t| t.overlaps(&hitbox));
        if touching && boss.apply_damage(self.tuning.boss_damage, score) {
            self.boss_cooldown = self.tuning.boss_hit_cooldown;
        }
    }
}
