//! # Tick Core
//!
//! Deterministic tick-synchronized tile combat simulation.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No unseeded randomness
//! - No floating-point math (uses fixed-point)
//!
//! This separation enables:
//! - Headless runs and scripted scenarios
//! - Reproducible fights from a seed
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`ecs`] - Entity/component store and system membership
//! - [`components`] - ECS component definitions
//! - [`systems`] - Per-tick and per-frame systems
//! - [`engine`] - The tick loop, input application and wave instance driver
//! - [`combat`] - Accuracy and damage formulas
//! - [`pathfinding`] / [`line_of_sight`] - Grid queries
//! - [`data`] - Item, monster, wave and player tables
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combat;
pub mod components;
pub mod data;
pub mod ecs;
pub mod engine;
pub mod error;
pub mod input;
pub mod instance;
pub mod line_of_sight;
pub mod math;
pub mod pathfinding;
pub mod rng;
pub mod signature;
pub mod snapshot;
pub mod systems;
pub mod tile_map;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::combat::{AttackStyle, DamageSubType, StyleBonuses};
    pub use crate::components::*;
    pub use crate::data::{ItemCatalog, ItemId, MonsterCatalog, MonsterKind, PlayerTemplate};
    pub use crate::ecs::{Entity, World};
    pub use crate::engine::{Engine, TICK_DURATION_MS};
    pub use crate::error::{GameError, Result};
    pub use crate::input::InputQueue;
    pub use crate::instance::WaveInstance;
    pub use crate::math::{Fixed, TilePos, Vec2Fixed};
    pub use crate::rng::{FixedRandom, RandomSource, SeededRandom};
    pub use crate::snapshot::CombatSnapshot;
    pub use crate::systems::TickEvents;
    pub use crate::tile_map::{TileMap, TileMapData};
}
