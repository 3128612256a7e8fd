//! Maze world
//!
//! Owns the grid, the player, every entity and the weapons, and advances them
//! in a fixed order once per frame:
//!
//! 1. Player timers, movement and facing
//! 2. Tile arrival (key, trap, exit)
//! 3. Entity movement (movable walls, mobs)
//! 4. Player contact with entities
//! 5. Energy cannon, light saber and skull boss
//! 6. Removal of destroyed entities

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::boss::SkullBoss;
use super::entity::{ContactEffect, Entity, EntityId, EntityKind, MobKind, PickupKind};
use super::geom::{Direction, Rect};
use super::grid::{BlockKind, MazeLayout, SpawnKind, TileGrid};
use super::movement::{move_distance, slide, step_mob, step_movable_wall};
use super::player::Player;
use super::projectile::{EnergyCannon, ProjectileTargets};
use super::rng::SimRng;
use super::saber::{LightSaber, SaberTargets};
use crate::audio::{AudioSink, SoundEffect};
use crate::score::ScoreSink;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MazeStatus {
    Playing,
    /// Reached the exit holding the key
    Escaped,
    /// Picked up the spaceship
    LaunchArcade,
    /// Out of lives
    Defeated,
}

/// Decoded input for one frame
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    pub move_dir: Vec2,
    pub sprint: bool,
    pub fire: bool,
    pub activate_saber: bool,
}

#[derive(Debug, Clone)]
pub struct Maze {
    pub tuning: Tuning,
    pub grid: TileGrid,
    pub player: Player,
    pub entities: Vec<Entity>,
    pub boss: SkullBoss,
    pub saber: LightSaber,
    pub cannon: EnergyCannon,
    next_id: u32,
    status: MazeStatus,
    /// Seconds simulated
    pub elapsed: f32,
}

impl Maze {
    /// Place the player on the entry cell and spawn every entity in the layout
    pub fn new(layout: MazeLayout, tuning: Tuning) -> Self {
        let MazeLayout {
            grid,
            spawns,
            entry,
        } = layout;
        let mut player = Player::new(grid.cell_center(entry.0, entry.1), &tuning.player);
        player.cell = Some(entry);

        let mut maze = Self {
            player,
            entities: Vec::with_capacity(spawns.len()),
            boss: SkullBoss::new(tuning.boss.clone()),
            saber: LightSaber::new(tuning.saber.clone()),
            cannon: EnergyCannon::new(tuning.projectile.clone()),
            grid,
            tuning,
            next_id: 1,
            status: MazeStatus::Playing,
            elapsed: 0.0,
        };
        for spawn in spawns {
            maze.spawn_entity(spawn.kind, spawn.col, spawn.row);
        }
        log::info!(
            "maze ready: {}x{} cells, {} entities",
            maze.grid.width(),
            maze.grid.height(),
            maze.entities.len()
        );
        maze
    }

    /// Add an entity centered on a cell. Ids are never reused.
    pub fn spawn_entity(&mut self, kind: SpawnKind, col: u32, row: u32) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;

        let center = self.grid.cell_center(col, row);
        let cell = self.grid.cell_size();
        let p = &self.tuning.player;
        let mut entity = match kind {
            SpawnKind::Skeleton => Entity::new(
                id,
                EntityKind::Mob(MobKind::Skeleton),
                Rect::centered(center, Vec2::splat(cell * p.mob_hitbox_scale)),
                p.mob_speed,
                p.mob_health,
            ),
            SpawnKind::MovableWall => Entity::new(
                id,
                EntityKind::MovableWall,
                Rect::centered(center, Vec2::splat(cell * p.movable_wall_hitbox_scale)),
                p.movable_wall_speed,
                1.0,
            ),
            SpawnKind::Pickup(pickup) => Entity::new(
                id,
                EntityKind::Pickup(pickup),
                Rect::centered(center, Vec2::splat(cell * p.pickup_hitbox_scale)),
                0.0,
                1.0,
            ),
        };
        if kind == SpawnKind::MovableWall {
            entity.facing = Direction::Right;
        }
        self.entities.push(entity);
        id
    }

    #[inline]
    pub fn status(&self) -> MazeStatus {
        self.status
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Advance one frame. Once the maze is no longer `Playing` this does nothing.
    pub fn on_frame(
        &mut self,
        dt: f32,
        input: &FrameInput,
        rng: &mut dyn SimRng,
        audio: &mut dyn AudioSink,
        score: &mut dyn ScoreSink,
    ) -> MazeStatus {
        if self.status != MazeStatus::Playing {
            return self.status;
        }
        self.elapsed += dt;

        self.player.tick_timers(dt);
        self.move_player(dt, input);
        self.track_arrival(audio);
        self.update_entities(dt, rng);
        self.apply_contacts(audio);

        if input.fire {
            self.cannon
                .fire(self.player.center(), self.player.facing.vector(), audio);
        }
        let mut targets = ProjectileTargets {
            grid: &self.grid,
            entities: &mut self.entities,
            boss: Some(&mut self.boss),
            score: &mut *score,
        };
        self.cannon.update(dt, &mut targets, rng, audio);

        if input.activate_saber {
            self.saber.try_activate(rng, audio);
        }
        let mut targets = SaberTargets {
            entities: &mut self.entities,
            boss: Some(&mut self.boss),
            score: &mut *score,
        };
        self.saber
            .update(dt, self.player.center(), &mut targets, rng, audio);

        let arena = self.grid.bounds();
        self.boss
            .update(dt, &mut self.player, arena, rng, audio, &mut *score);

        self.remove_destroyed(score, audio);

        if self.player.defeated {
            self.finish(MazeStatus::Defeated);
        }
        self.status
    }

    fn finish(&mut self, status: MazeStatus) {
        if self.status == MazeStatus::Playing {
            log::info!("maze finished: {:?} after {:.1}s", status, self.elapsed);
            self.status = status;
        }
    }

    /// Slide the player; walls, the grid edge and movable walls block
    fn move_player(&mut self, dt: f32, input: &FrameInput) {
        let dir = input.move_dir.normalize_or_zero();
        if dir == Vec2::ZERO {
            return;
        }
        let delta = dir * move_distance(self.player.current_speed(input.sprint), dt);
        let grid = &self.grid;
        let entities = &self.entities;
        slide(&mut self.player.hitbox, delta, |r| {
            grid.collides(r) || entities.iter().any(|e| e.is_solid() && e.overlaps(r))
        });
        if let Some(facing) = Direction::from_delta(dir) {
            self.player.facing = facing;
        }
    }

    /// Fire tile effects when the player's center enters a new cell
    fn track_arrival(&mut self, audio: &mut dyn AudioSink) {
        let cell = self.grid.cell_of(self.player.center());
        if cell == self.player.cell {
            return;
        }
        self.player.cell = cell;
        if let Some((col, row)) = cell {
            self.on_arrival(col, row, audio);
        }
    }

    fn on_arrival(&mut self, col: u32, row: u32, audio: &mut dyn AudioSink) {
        let Some(block) = self.grid.block(col as i64, row as i64) else {
            return;
        };
        match block.kind {
            BlockKind::Key => {
                self.player.has_key = true;
                self.grid.set_block(col, row, BlockKind::Path);
                audio.play(SoundEffect::Pickup);
                log::debug!("key collected at ({col}, {row})");
            }
            BlockKind::Trap => {
                if self.player.take_damage(self.tuning.player.trap_damage) {
                    audio.play(SoundEffect::PlayerHurt);
                }
            }
            BlockKind::Exit => {
                if self.player.has_key {
                    self.finish(MazeStatus::Escaped);
                }
            }
            BlockKind::Wall | BlockKind::Path | BlockKind::Entry => {}
        }
    }

    /// Walls patrol and reverse when blocked; mobs wander
    fn update_entities(&mut self, dt: f32, rng: &mut dyn SimRng) {
        let grid = &self.grid;
        let player_box = self.player.hitbox;

        for i in 0..self.entities.len() {
            let (before, rest) = self.entities.split_at_mut(i);
            let Some((entity, after)) = rest.split_first_mut() else {
                break;
            };
            if !entity.alive {
                continue;
            }
            let mut others = before.iter().chain(after.iter());
            match entity.kind {
                EntityKind::MovableWall => step_movable_wall(entity, dt, move |r| {
                    grid.collides(r)
                        || player_box.overlaps(r)
                        || others.any(|o| o.is_solid() && o.overlaps(r))
                }),
                EntityKind::Mob(_) => step_mob(entity, dt, rng, move |r| {
                    grid.collides(r) || others.any(|o| o.is_solid() && o.overlaps(r))
                }),
                EntityKind::Pickup(_) => {}
            }
        }
    }

    /// Contact rules for every entity touching the player
    fn apply_contacts(&mut self, audio: &mut dyn AudioSink) {
        let player_box = self.player.hitbox;
        let mob_damage = self.tuning.player.mob_contact_damage;

        for i in 0..self.entities.len() {
            let entity = &self.entities[i];
            if !entity.overlaps(&player_box) {
                continue;
            }
            match entity.on_collision(mob_damage) {
                ContactEffect::Block => {}
                ContactEffect::Damage(amount) => {
                    if self.player.take_damage(amount) {
                        audio.play(SoundEffect::PlayerHurt);
                    }
                }
                ContactEffect::Collect(kind) => {
                    self.entities[i].alive = false;
                    self.collect(kind, audio);
                }
            }
        }
    }

    fn collect(&mut self, kind: PickupKind, audio: &mut dyn AudioSink) {
        let p = &self.tuning.player;
        match kind {
            PickupKind::Lives => self.player.lives += 1,
            PickupKind::Shield => self.player.shield_timer = p.shield_duration,
            PickupKind::Lightning => {
                self.player.add_speed_buff(p.lightning_bonus, p.lightning_duration);
            }
            PickupKind::Spaceship => self.finish(MazeStatus::LaunchArcade),
        }
        audio.play(SoundEffect::Pickup);
        log::debug!("collected {:?}", kind);
    }

    /// Drop dead mobs (scoring each) and consumed pickups
    fn remove_destroyed(&mut self, score: &mut dyn ScoreSink, audio: &mut dyn AudioSink) {
        let kill_score = self.tuning.player.mob_kill_score;
        self.entities.retain(|e| {
            if e.alive {
                return true;
            }
            if e.is_mob() {
                score.add_score(kill_score);
                audio.play(SoundEffect::MobDeath);
            }
            false
        });
    }
}
