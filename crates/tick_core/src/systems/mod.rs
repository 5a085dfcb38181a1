//! Simulation systems.
//!
//! Each system declares the components it needs and is handed its member
//! entities, in ascending order, once per tick and once per frame. The
//! engine runs them in registration order:
//!
//! 1. [`StaminaSystem`]
//! 2. [`MovementSystem`]
//! 3. [`DamageReceiverSystem`]
//! 4. [`BehaviourSystem`]
//! 5. [`ProjectileSystem`]
//! 6. [`CooldownSystem`]
//! 7. [`AttackCommandSystem`]
//!
//! Player actions that are not per-tick processes (equipping, drinking,
//! praying) live here as plain functions over the [`World`].

use std::fmt::Debug;

use crate::data::MonsterKind;
use crate::ecs::{Entity, World};
use crate::error::Result;
use crate::math::Fixed;
use crate::rng::RandomSource;
use crate::signature::Signature;
use crate::tile_map::{TileMap, TileOccupancy};

mod attack_command;
mod behaviour;
mod cooldown;
mod damage_receiver;
pub mod equipment;
pub mod inventory;
mod movement;
mod prayer;
mod projectile;
mod stamina;

pub use attack_command::{create_attack, AttackCommandSystem};
pub use behaviour::BehaviourSystem;
pub use cooldown::CooldownSystem;
pub use damage_receiver::DamageReceiverSystem;
pub use equipment::{add_equipment_stats, equip_item, subtract_equipment_stats, unequip_item};
pub use inventory::{consume_item, drop_item, pickup_item};
pub use movement::{move_now, MovementSystem};
pub use prayer::toggle_prayer;
pub use projectile::ProjectileSystem;
pub use stamina::{toggle_run, StaminaSystem};

/// A unit of per-tick logic over the entities matching its signature.
pub trait System: Debug + Send {
    /// Unique registration name.
    fn name(&self) -> &'static str;

    /// Components an entity must hold to be a member.
    fn required_components(&self, world: &World) -> Result<Signature>;

    /// Advance authoritative state by one tick.
    fn tick(&mut self, ctx: &mut TickContext<'_>, entities: &[Entity]) -> Result<()>;

    /// Ease presentation state toward authoritative state.
    fn update(&mut self, _ctx: &mut UpdateContext<'_>, _entities: &[Entity]) -> Result<()> {
        Ok(())
    }
}

/// Everything a system may touch during a tick.
#[derive(Debug)]
pub struct TickContext<'a> {
    /// Entity/component store.
    pub world: &'a mut World,
    /// Static terrain.
    pub map: &'a TileMap,
    /// Tiles currently blocked by occupants.
    pub occupancy: &'a mut TileOccupancy,
    /// Source for combat rolls.
    pub rng: &'a mut dyn RandomSource,
    /// The player entity, once spawned.
    pub player: Option<Entity>,
    /// Tick number being processed.
    pub tick: u64,
    /// Events collected so far this tick.
    pub events: &'a mut TickEvents,
}

/// Everything a system may touch during a frame update.
#[derive(Debug)]
pub struct UpdateContext<'a> {
    /// Entity/component store.
    pub world: &'a mut World,
    /// Frame time expressed in ticks (`delta_ms / TICK_DURATION_MS`).
    pub delta_ticks: Fixed,
}

// ============================================================================
// Events
// ============================================================================

/// Hitpoints removed from an entity by the damage receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageApplied {
    /// Entity that dealt the damage.
    pub source: Entity,
    /// Entity that lost hitpoints.
    pub target: Entity,
    /// Damage rolled (may exceed the hitpoints actually lost).
    pub amount: u32,
}

/// A projectile reaching its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectileImpact {
    /// Entity that fired it.
    pub source: Entity,
    /// Entity it hit.
    pub target: Entity,
    /// Damage pushed onto the target's receiver.
    pub damage: u32,
}

/// Events generated during a single tick.
///
/// These let the caller drive effects, logs and test assertions without
/// diffing the world.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickEvents {
    /// Damage applied by the damage receiver.
    pub damage: Vec<DamageApplied>,
    /// Entities whose health reached zero.
    pub deaths: Vec<Entity>,
    /// Dead NPCs removed from the world at the end of the tick, with their
    /// kind.
    pub npcs_removed: Vec<(Entity, MonsterKind)>,
    /// Projectiles spawned by attacks.
    pub projectiles_fired: Vec<Entity>,
    /// Projectiles that landed.
    pub impacts: Vec<ProjectileImpact>,
    /// Melee hits pushed straight onto a receiver.
    pub melee_hits: Vec<DamageApplied>,
    /// Wave number started this tick.
    pub wave_started: Option<u32>,
    /// Set on the tick the final wave is cleared.
    pub instance_complete: bool,
}

impl TickEvents {
    /// Whether nothing happened.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The standard systems in dispatch order.
#[must_use]
pub fn standard_systems() -> Vec<Box<dyn System>> {
    vec![
        Box::new(StaminaSystem),
        Box::new(MovementSystem),
        Box::new(DamageReceiverSystem),
        Box::new(BehaviourSystem),
        Box::new(ProjectileSystem),
        Box::new(CooldownSystem),
        Box::new(AttackCommandSystem),
    ]
}

#[cfg(test)]
pub(crate) mod test_support {
    //! A small world with every component registered, for system tests.

    use crate::components::register_all;
    use crate::ecs::World;
    use crate::rng::FixedRandom;
    use crate::tile_map::{TileMap, TileMapData, TileOccupancy};

    use super::{TickContext, TickEvents};

    pub struct Harness {
        pub world: World,
        pub map: TileMap,
        pub occupancy: TileOccupancy,
        pub rng: FixedRandom,
        pub events: TickEvents,
    }

    impl Harness {
        pub fn open(cols: u32, rows: u32) -> Self {
            let map = TileMap::new(TileMapData::open(cols, rows)).unwrap();
            let occupancy = TileOccupancy::for_map(&map);
            let mut world = World::new();
            register_all(&mut world).unwrap();
            Self {
                world,
                map,
                occupancy,
                rng: FixedRandom::always_hit(),
                events: TickEvents::default(),
            }
        }

        pub fn ctx(&mut self, player: Option<crate::ecs::Entity>) -> TickContext<'_> {
            TickContext {
                world: &mut self.world,
                map: &self.map,
                occupancy: &mut self.occupancy,
                rng: &mut self.rng,
                player,
                tick: 0,
                events: &mut self.events,
            }
        }
    }
}
