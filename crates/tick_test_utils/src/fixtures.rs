//! Test fixtures and helpers.
//!
//! Pre-built maps, stat records, random sources and engines
//! for consistent testing.

use std::collections::VecDeque;

use fixed::types::I32F32;
use tick_core::combat::StyleBonuses;
use tick_core::components::{DefensiveStats, OffensiveStats};
use tick_core::data::{ItemId, MonsterKind, PlayerTemplate};
use tick_core::ecs::Entity;
use tick_core::engine::Engine;
use tick_core::error::Result;
use tick_core::math::{Fixed, TilePos};
use tick_core::rng::RandomSource;
use tick_core::systems::equip_item;
use tick_core::tile_map::{TileCode, TileMap, TileMapData};

/// Tile code treated as a wall by [`TileMapData::open`] grids.
pub const WALL: TileCode = 2;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

// ============================================================================
// Maps
// ============================================================================

/// Fully pathable `cols` x `rows` map.
///
/// # Panics
///
/// Panics if the dimensions are zero.
#[must_use]
pub fn open_map(cols: u32, rows: u32) -> TileMap {
    TileMap::new(TileMapData::open(cols, rows)).expect("open map dimensions are valid")
}

/// Open map with a wall on each of `walls`.
///
/// # Panics
///
/// Panics if the dimensions are zero.
#[must_use]
pub fn walled_map(cols: u32, rows: u32, walls: &[TilePos]) -> TileMap {
    let mut data = TileMapData::open(cols, rows);
    for &wall in walls {
        data.set_tile(wall, WALL);
    }
    TileMap::new(data).expect("walled map dimensions are valid")
}

// ============================================================================
// Stat records
// ============================================================================

/// Maxed ranger with a strong bow's worth of bonuses.
#[must_use]
pub fn ranger_offense() -> OffensiveStats {
    OffensiveStats {
        attack_level: 99,
        strength_level: 99,
        ranged_level: 99,
        magic_level: 99,
        attack_bonuses: StyleBonuses {
            ranged: 100,
            ..StyleBonuses::default()
        },
        ranged_strength: 50,
        ..OffensiveStats::default()
    }
}

/// Defender with the given defence level and flat bonuses in every style.
#[must_use]
pub fn defender(defence_level: i32, magic_level: i32, bonus: i32) -> DefensiveStats {
    DefensiveStats {
        defence_level,
        magic_level,
        defence_bonuses: StyleBonuses {
            stab: bonus,
            slash: bonus,
            crush: bonus,
            ranged: bonus,
            magic: bonus,
        },
    }
}

// ============================================================================
// Random sources
// ============================================================================

/// Random source replaying scripted draws.
///
/// Each queue is consumed front to back; once exhausted it keeps returning
/// its fallback.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    units: VecDeque<Fixed>,
    ints: VecDeque<u32>,
}

impl ScriptedRandom {
    /// Source with no scripted draws.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue accuracy draws.
    #[must_use]
    pub fn with_units(mut self, units: impl IntoIterator<Item = Fixed>) -> Self {
        self.units.extend(units);
        self
    }

    /// Queue integer draws. Each is clamped into the requested range.
    #[must_use]
    pub fn with_ints(mut self, ints: impl IntoIterator<Item = u32>) -> Self {
        self.ints.extend(ints);
        self
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> Fixed {
        self.units.pop_front().unwrap_or(Fixed::ZERO)
    }

    fn range_inclusive(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        self.ints.pop_front().map_or(low, |n| n.clamp(low, high))
    }
}

// ============================================================================
// Engines
// ============================================================================

/// Seeded engine on an open map with the player at `(1, 1)`.
///
/// # Panics
///
/// Panics if the engine cannot be built.
#[must_use]
pub fn player_engine(cols: u32, rows: u32, seed: u64) -> Engine {
    let mut engine = Engine::with_seed(open_map(cols, rows), seed).expect("engine builds");
    engine
        .spawn_player(TilePos::new(1, 1), &PlayerTemplate::default())
        .expect("player spawns");
    engine
}

/// A geared player facing one monster across an open arena.
///
/// Returns the engine and the monster entity.
///
/// # Errors
///
/// Returns an error if spawning or equipping fails.
pub fn duel(
    seed: u64,
    kind: MonsterKind,
    distance: i32,
    gear: &[ItemId],
) -> Result<(Engine, Entity)> {
    let cols = u32::try_from(distance + 12).unwrap_or(24);
    let mut engine = Engine::with_seed(open_map(cols, 12), seed)?;
    let player = engine.spawn_player(TilePos::new(1, 1), &PlayerTemplate::default())?;

    let items = engine.items().clone();
    for &item in gear {
        let entity = engine.give_player_item(item)?;
        equip_item(engine.world_mut(), &items, player, entity)?;
    }

    let monster = engine.spawn_monster(kind, TilePos::new(1 + distance, 1))?;
    Ok((engine, monster))
}
