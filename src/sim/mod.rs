//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied frame delta only
//! - Injected RNG only
//! - Stable iteration order (entities keep spawn order)
//! - No rendering or platform dependencies

pub mod arcade;
pub mod boss;
pub mod entity;
pub mod geom;
pub mod grid;
pub mod maze;
pub mod movement;
pub mod player;
pub mod pool;
pub mod projectile;
pub mod rng;
pub mod saber;

pub use arcade::{Arcade, ArcadeBossState, ArcadeInput, ArcadeStatus};
pub use boss::{BossState, SkullBoss};
pub use entity::{ContactEffect, Entity, EntityId, EntityKind, Health, MobKind, PickupKind};
pub use geom::{Direction, Rect};
pub use grid::{Block, BlockKind, MazeLayout, Spawn, SpawnKind, TileGrid};
pub use maze::{FrameInput, Maze, MazeStatus};
pub use player::Player;
pub use pool::{Pool, Reset};
pub use projectile::{EnergyCannon, EnergyProjectile, ProjectileHit, ProjectileTargets};
pub use rng::{RngState, SequenceRng, SimRng};
pub use saber::{LightSaber, SaberTargets};
