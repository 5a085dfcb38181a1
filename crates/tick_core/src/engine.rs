//! The combat engine: owns the world and drives ticks and frames.
//!
//! The engine runs at a fixed tick rate and processes all combat logic
//! deterministically. Between ticks, presentation state is eased by
//! [`Engine::update`].
//!
//! # Determinism
//!
//! - No floating-point math (uses fixed-point via [`Fixed`])
//! - All randomness comes from the injected [`RandomSource`]
//! - Systems visit their members in ascending entity order
//! - Same seed and inputs always produce the same [`Engine::state_hash`]
//!
//! # Example
//!
//! ```
//! use tick_core::engine::Engine;
//! use tick_core::data::PlayerTemplate;
//! use tick_core::math::TilePos;
//! use tick_core::tile_map::{TileMap, TileMapData};
//!
//! let map = TileMap::new(TileMapData::open(10, 10)).unwrap();
//! let mut engine = Engine::with_seed(map, 7).unwrap();
//! engine.spawn_player(TilePos::new(1, 1), &PlayerTemplate::default()).unwrap();
//!
//! engine.input_mut().queue_movement(TilePos::new(5, 1));
//! engine.tick().unwrap();
//! assert_eq!(engine.current_tick(), 1);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::combat::AttackStyle;
use crate::components::{
    register_all, AttackCommand, DamageReceiver, DefensiveStats, Health, HitSplats,
    HomingProjectile, Inventory, ItemDetails, Movement, Npc, OffensiveStats, Pathing, Player,
    PlayerEquipment, Prayer, SimpleBehaviour, Stamina, Transform,
};
use crate::data::{ItemCatalog, ItemId, MonsterCatalog, MonsterKind, PlayerTemplate};
use crate::ecs::{Entity, SystemId, World};
use crate::error::{GameError, Result};
use crate::input::{InputQueue, TickInput};
use crate::instance::WaveInstance;
use crate::math::{Fixed, TilePos};
use crate::pathfinding::{find_tile_path, PathingStrategy};
use crate::rng::{RandomSource, SeededRandom};
use crate::snapshot::CombatSnapshot;
use crate::systems::{
    consume_item, equip_item, pickup_item, standard_systems, toggle_prayer, toggle_run,
    unequip_item, System, TickContext, TickEvents, UpdateContext,
};
use crate::tile_map::{TileMap, TileMapData, TileOccupancy};

/// Length of one tick in milliseconds.
pub const TICK_DURATION_MS: u32 = 600;

// ============================================================================
// Frame clock
// ============================================================================

/// Wall-clock accumulator deciding when a frame also runs a tick.
///
/// At most one tick runs per frame; the remainder carries over, so a slow
/// frame rate lets the simulation fall behind rather than burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameClock {
    #[serde(with = "crate::math::fixed_serde")]
    accumulated_ms: Fixed,
}

impl FrameClock {
    /// Clock with nothing accumulated.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            accumulated_ms: Fixed::ZERO,
        }
    }

    /// Add `delta_ms` and report whether a tick is due.
    pub fn advance(&mut self, delta_ms: Fixed) -> bool {
        self.accumulated_ms += delta_ms;
        let tick = Fixed::from_num(TICK_DURATION_MS);
        if self.accumulated_ms > tick {
            self.accumulated_ms -= tick;
            true
        } else {
            false
        }
    }

    /// Time carried toward the next tick.
    #[must_use]
    pub const fn accumulated_ms(&self) -> Fixed {
        self.accumulated_ms
    }
}

// ============================================================================
// Engine
// ============================================================================

/// The combat simulation.
///
/// # Tick Order
///
/// 1. Player input (prayers, unequips, equips, consumable, attack,
///    movement, run)
/// 2. Systems in registration order: stamina, movement, damage receiver,
///    behaviour, projectile, cooldown, attack command
/// 3. Wave instance
/// 4. Dead NPC cleanup
#[derive(Debug)]
pub struct Engine {
    tick: u64,
    world: World,
    systems: Vec<(SystemId, Box<dyn System>)>,
    map: TileMap,
    occupancy: TileOccupancy,
    rng: Box<dyn RandomSource>,
    items: ItemCatalog,
    monsters: MonsterCatalog,
    input: InputQueue,
    player: Option<Entity>,
    npcs: Vec<Entity>,
    instance: Option<WaveInstance>,
    clock: FrameClock,
}

impl Engine {
    /// Engine on `map` with every component type and the standard systems
    /// registered, and the shipped item and monster tables.
    pub fn new(map: TileMap, rng: Box<dyn RandomSource>) -> Result<Self> {
        let occupancy = TileOccupancy::for_map(&map);
        let mut world = World::new();
        register_all(&mut world)?;

        let mut engine = Self {
            tick: 0,
            world,
            systems: Vec::new(),
            map,
            occupancy,
            rng,
            items: ItemCatalog::standard(),
            monsters: MonsterCatalog::standard(),
            input: InputQueue::new(),
            player: None,
            npcs: Vec::new(),
            instance: None,
            clock: FrameClock::new(),
        };
        for system in standard_systems() {
            engine.register_system(system)?;
        }
        Ok(engine)
    }

    /// Engine driven by a [`SeededRandom`].
    pub fn with_seed(map: TileMap, seed: u64) -> Result<Self> {
        Self::new(map, Box::new(SeededRandom::new(seed)))
    }

    /// Replace the item table.
    #[must_use]
    pub fn with_items(mut self, items: ItemCatalog) -> Self {
        self.items = items;
        self
    }

    /// Replace the monster table.
    #[must_use]
    pub fn with_monsters(mut self, monsters: MonsterCatalog) -> Self {
        self.monsters = monsters;
        self
    }

    /// Append a system to the dispatch order.
    pub fn register_system(&mut self, system: Box<dyn System>) -> Result<SystemId> {
        let signature = system.required_components(&self.world)?;
        let id = self.world.register_system(system.name(), signature)?;
        self.systems.push((id, system));
        Ok(id)
    }

    /// Start a wave instance.
    pub fn set_instance(&mut self, instance: WaveInstance) {
        self.instance = Some(instance);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Number of ticks run so far.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Entity/component store.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Mutable store, for external spawners and tests.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Static terrain.
    #[must_use]
    pub const fn map(&self) -> &TileMap {
        &self.map
    }

    /// Occupancy overlay.
    #[must_use]
    pub const fn occupancy(&self) -> &TileOccupancy {
        &self.occupancy
    }

    /// Item table.
    #[must_use]
    pub const fn items(&self) -> &ItemCatalog {
        &self.items
    }

    /// Monster table.
    #[must_use]
    pub const fn monsters(&self) -> &MonsterCatalog {
        &self.monsters
    }

    /// The player, once spawned.
    #[must_use]
    pub const fn player(&self) -> Option<Entity> {
        self.player
    }

    /// Live NPCs in spawn order.
    #[must_use]
    pub fn npcs(&self) -> &[Entity] {
        &self.npcs
    }

    /// Wave instance, if one is running.
    #[must_use]
    pub const fn instance(&self) -> Option<&WaveInstance> {
        self.instance.as_ref()
    }

    /// Input applied at the start of the next tick.
    pub fn input_mut(&mut self) -> &mut InputQueue {
        &mut self.input
    }

    /// Frame accumulator.
    #[must_use]
    pub const fn clock(&self) -> &FrameClock {
        &self.clock
    }

    // ========================================================================
    // Terrain
    // ========================================================================

    /// Whether `tile` is walkable terrain and unoccupied.
    #[must_use]
    pub fn can_path(&self, tile: TilePos) -> bool {
        self.map.is_pathable(tile) && !self.occupancy.is_blocked(tile)
    }

    /// Mark `tiles` occupied.
    pub fn block_tiles(&mut self, tiles: &[TilePos]) {
        self.occupancy.block(tiles);
    }

    /// Release one occupant's hold on `tiles`.
    pub fn unblock_tiles(&mut self, tiles: &[TilePos]) {
        self.occupancy.unblock(tiles);
    }

    /// Swap in a new map. The overlay is rebuilt from the player's and NPCs'
    /// footprints.
    pub fn set_tile_map(&mut self, map: TileMap) {
        self.occupancy = TileOccupancy::for_map(&map);
        self.map = map;
        for occupant in self.player.iter().chain(&self.npcs) {
            if let Some(transform) = self.world.try_get_component::<Transform>(*occupant) {
                self.occupancy.block(&transform.all_tiles());
            }
        }
    }

    // ========================================================================
    // Spawning
    // ========================================================================

    /// Create the player at `at`.
    pub fn spawn_player(&mut self, at: TilePos, template: &PlayerTemplate) -> Result<Entity> {
        if self.player.is_some() {
            return Err(GameError::InvalidState("player already spawned".to_string()));
        }
        if !self.map.in_bounds(at) {
            return Err(GameError::InvalidState(format!("player start {at} is off the map")));
        }

        let levels = template.levels;
        let mut movement = Movement::new(template.base_speed);
        if template.running {
            movement.current_speed = template.base_speed * 2;
        }

        let player = self.world.create_entity()?;
        let transform = Transform::single(at);
        self.occupancy.block(&transform.all_tiles());
        self.world.add_component(player, Player)?;
        self.world.add_component(player, transform)?;
        self.world.add_component(player, movement)?;
        self.world.add_component(
            player,
            Pathing {
                strategy: PathingStrategy::FullBfs,
            },
        )?;
        self.world.add_component(
            player,
            Stamina {
                running: template.running,
                current: template.stamina,
                max: template.stamina,
                regen_rate: template.stamina_regen,
            },
        )?;
        self.world.add_component(player, Health::new(template.health))?;
        self.world.add_component(player, HitSplats::default())?;
        self.world.add_component(player, DamageReceiver::default())?;
        self.world.add_component(player, Inventory::new())?;
        self.world.add_component(player, PlayerEquipment::default())?;
        self.world.add_component(player, Prayer::new(template.prayer))?;
        self.world.add_component(
            player,
            OffensiveStats {
                attack_level: levels.attack,
                strength_level: levels.strength,
                magic_level: levels.magic,
                ranged_level: levels.ranged,
                attack_style: AttackStyle::RANGED,
                ..OffensiveStats::default()
            },
        )?;
        self.world.add_component(
            player,
            DefensiveStats {
                defence_level: levels.defence,
                magic_level: levels.magic,
                ..DefensiveStats::default()
            },
        )?;

        self.player = Some(player);
        tracing::debug!(%player, position = %at, "Player spawned");
        Ok(player)
    }

    /// Create an aggressive monster with its NW tile at `at`.
    pub fn spawn_monster(&mut self, kind: MonsterKind, at: TilePos) -> Result<Entity> {
        let data = self.monsters.get(kind)?;
        let transform = Transform::new(at, data.size, data.size);
        let offense = data.offensive_stats();
        let defense = data.defensive_stats();
        let health = Health::new(data.health);

        let npc = self.world.create_entity()?;
        self.occupancy.block(&transform.all_tiles());
        self.world.add_component(npc, Npc { kind })?;
        self.world.add_component(npc, SimpleBehaviour)?;
        self.world.add_component(npc, transform)?;
        self.world.add_component(npc, Movement::new(1))?;
        self.world.add_component(
            npc,
            Pathing {
                strategy: PathingStrategy::DirectApproach,
            },
        )?;
        self.world.add_component(npc, health)?;
        self.world.add_component(npc, HitSplats::default())?;
        self.world.add_component(npc, DamageReceiver::default())?;
        self.world.add_component(npc, offense)?;
        self.world.add_component(npc, defense)?;

        self.npcs.push(npc);
        tracing::debug!(%npc, ?kind, position = %at, "Monster spawned");
        Ok(npc)
    }

    /// Create an item lying on `at`, or floating (no position) when `None`.
    pub fn spawn_item(&mut self, item: ItemId, at: Option<TilePos>) -> Result<Entity> {
        self.items.get(item)?;
        let entity = self.world.create_entity()?;
        self.world.add_component(entity, ItemDetails { item })?;
        if let Some(tile) = at {
            self.world.add_component(entity, Transform::single(tile))?;
        }
        Ok(entity)
    }

    /// Create an item straight into the player's inventory.
    pub fn give_player_item(&mut self, item: ItemId) -> Result<Entity> {
        let player = self.require_player()?;
        let entity = self.spawn_item(item, None)?;
        if let Err(err) = pickup_item(&mut self.world, player, entity) {
            self.world.destroy_entity(entity)?;
            return Err(err);
        }
        Ok(entity)
    }

    /// Remove an NPC: free its footprint, drop projectiles and attack
    /// commands aimed at it, and destroy it.
    pub fn destroy_npc(&mut self, npc: Entity) -> Result<()> {
        if let Some(transform) = self.world.try_get_component::<Transform>(npc) {
            self.occupancy.unblock(&transform.all_tiles());
        }

        for projectile in self.world.entities_with::<HomingProjectile>() {
            if self.world.get_component::<HomingProjectile>(projectile)?.target == npc {
                self.world.destroy_entity(projectile)?;
            }
        }
        for attacker in self.world.entities_with::<AttackCommand>() {
            if self.world.get_component::<AttackCommand>(attacker)?.target == npc {
                self.world.remove_component::<AttackCommand>(attacker)?;
            }
        }

        self.world.destroy_entity(npc)?;
        self.npcs.retain(|&other| other != npc);
        Ok(())
    }

    fn require_player(&self) -> Result<Entity> {
        self.player
            .ok_or_else(|| GameError::InvalidState("no player spawned".to_string()))
    }

    // ========================================================================
    // Tick and frame
    // ========================================================================

    /// Advance the simulation by one tick.
    ///
    /// Store errors raised by a system abort the tick. Rejected player input
    /// is logged and dropped.
    pub fn tick(&mut self) -> Result<TickEvents> {
        let mut events = TickEvents::default();

        let input = self.input.take();
        self.apply_input(input)?;

        for (id, system) in &mut self.systems {
            let members = self.world.system_members(*id)?;
            let mut ctx = TickContext {
                world: &mut self.world,
                map: &self.map,
                occupancy: &mut self.occupancy,
                rng: self.rng.as_mut(),
                player: self.player,
                tick: self.tick,
                events: &mut events,
            };
            system.tick(&mut ctx, &members)?;
        }

        self.tick_instance(&mut events)?;
        self.remove_dead_npcs(&mut events)?;

        self.tick += 1;

        #[cfg(feature = "debug-validation")]
        self.validate_state()?;

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(tick = self.tick, state_hash = hash, "Simulation state hash");
        }

        Ok(events)
    }

    /// Ease presentation state by `delta_ms` of wall-clock time.
    pub fn update(&mut self, delta_ms: Fixed) -> Result<()> {
        let delta_ticks = delta_ms / Fixed::from_num(TICK_DURATION_MS);
        for (id, system) in &mut self.systems {
            let members = self.world.system_members(*id)?;
            let mut ctx = UpdateContext {
                world: &mut self.world,
                delta_ticks,
            };
            system.update(&mut ctx, &members)?;
        }
        Ok(())
    }

    /// One frame: run a tick if enough time has built up, then update.
    pub fn frame(&mut self, delta_ms: Fixed) -> Result<Option<TickEvents>> {
        let events = if self.clock.advance(delta_ms) {
            Some(self.tick()?)
        } else {
            None
        };
        self.update(delta_ms)?;
        Ok(events)
    }

    fn apply_input(&mut self, input: TickInput) -> Result<()> {
        let Some(player) = self.player else {
            return Ok(());
        };

        for prayer in input.prayer_toggles {
            toggle_prayer(&mut self.world, player, prayer)?;
        }
        for slot in input.unequips {
            if let Err(err) = unequip_item(&mut self.world, &self.items, player, slot) {
                tracing::warn!(%err, ?slot, "Unequip rejected");
            }
        }
        for item in input.equips {
            if let Err(err) = equip_item(&mut self.world, &self.items, player, item) {
                tracing::warn!(%err, %item, "Equip rejected");
            }
        }
        if let Some(request) = input.consume {
            if let Err(err) =
                consume_item(&mut self.world, &self.items, player, request.item, request.slot)
            {
                tracing::warn!(%err, item = %request.item, "Consume rejected");
            }
        }

        if let Some(target) = input.attack {
            let attackable = target != player
                && self.world.is_alive(target)
                && self.world.has_component::<Health>(target)
                && self.world.has_component::<Transform>(target);
            if attackable {
                if self.world.has_component::<AttackCommand>(player) {
                    self.world.remove_component::<AttackCommand>(player)?;
                }
                self.world.add_component(player, AttackCommand { target })?;
            } else {
                tracing::warn!(%target, "Attack rejected: not a valid target");
            }
        }

        if let Some(goal) = input.movement {
            let start = self.world.get_component::<Transform>(player)?.position;
            let mut path = find_tile_path(&self.map, &self.occupancy, start, goal);
            if self.occupancy.is_blocked(goal) && path.last() == Some(&goal) {
                path.pop();
            }
            self.world.get_component_mut::<Movement>(player)?.set_path(path);
            if self.world.has_component::<AttackCommand>(player) {
                self.world.remove_component::<AttackCommand>(player)?;
            }
        }

        if input.toggle_run {
            toggle_run(&mut self.world, player)?;
        }
        Ok(())
    }

    fn tick_instance(&mut self, events: &mut TickEvents) -> Result<()> {
        let Some(instance) = self.instance.as_mut() else {
            return Ok(());
        };
        let progress = instance.tick(self.npcs.len(), self.rng.as_mut());

        events.instance_complete = progress.complete;
        if let Some(spawn) = progress.spawn {
            events.wave_started = Some(spawn.wave);
            for (kind, at) in spawn.monsters {
                self.spawn_monster(kind, at)?;
            }
        }
        Ok(())
    }

    fn remove_dead_npcs(&mut self, events: &mut TickEvents) -> Result<()> {
        let dead: Vec<Entity> = self
            .npcs
            .iter()
            .copied()
            .filter(|&npc| {
                self.world
                    .try_get_component::<Health>(npc)
                    .map_or(true, Health::is_dead)
            })
            .collect();
        for npc in dead {
            if let Some(tag) = self.world.try_get_component::<Npc>(npc) {
                events.npcs_removed.push((npc, tag.kind));
            }
            self.destroy_npc(npc)?;
        }
        Ok(())
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Health, stamina, prayer, inventory and equipment of the player.
    pub fn combat_snapshot(&self) -> Result<CombatSnapshot> {
        CombatSnapshot::capture(&self.world, &self.items, self.require_player()?)
    }

    /// Check that the player and every listed NPC are alive and block
    /// each tile of their footprint.
    ///
    /// Runs after every tick with the `debug-validation` feature.
    pub fn validate_state(&self) -> Result<()> {
        for &unit in self.player.iter().chain(&self.npcs) {
            if !self.world.is_alive(unit) {
                return Err(GameError::InvalidState(format!("{unit} is listed but dead")));
            }
            let transform = self.world.get_component::<Transform>(unit)?;
            if let Some(tile) = transform
                .all_tiles()
                .into_iter()
                .find(|&tile| !self.occupancy.is_blocked(tile))
            {
                return Err(GameError::InvalidState(format!(
                    "{unit} stands on unblocked tile {tile}"
                )));
            }
        }
        Ok(())
    }

    /// Hash of the authoritative state.
    ///
    /// Two engines fed the same seed and inputs produce identical hashes.
    /// Render positions are excluded.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);
        self.occupancy.hash(&mut hasher);
        self.npcs.hash(&mut hasher);
        self.instance
            .as_ref()
            .map(|instance| (instance.wave(), instance.cooldown_remaining()))
            .hash(&mut hasher);

        let entities = self.world.living_entities();
        entities.len().hash(&mut hasher);
        for entity in entities {
            entity.hash(&mut hasher);

            if let Some(transform) = self.world.try_get_component::<Transform>(entity) {
                transform.position.hash(&mut hasher);
            }
            if let Some(movement) = self.world.try_get_component::<Movement>(entity) {
                movement.path.hash(&mut hasher);
                movement.current_speed.hash(&mut hasher);
            }
            if let Some(health) = self.world.try_get_component::<Health>(entity) {
                health.current.hash(&mut hasher);
            }
            if let Some(stamina) = self.world.try_get_component::<Stamina>(entity) {
                stamina.current.hash(&mut hasher);
                stamina.running.hash(&mut hasher);
            }
            if let Some(stats) = self.world.try_get_component::<OffensiveStats>(entity) {
                stats.ticks_until_can_attack.hash(&mut hasher);
                stats.attack_range.hash(&mut hasher);
            }
            if let Some(command) = self.world.try_get_component::<AttackCommand>(entity) {
                command.target.hash(&mut hasher);
            }
            if let Some(projectile) = self.world.try_get_component::<HomingProjectile>(entity) {
                projectile.target.hash(&mut hasher);
                projectile.ticks_until_impact.hash(&mut hasher);
                projectile.damage.hash(&mut hasher);
                projectile.position.hash(&mut hasher);
            }
            if let Some(receiver) = self.world.try_get_component::<DamageReceiver>(entity) {
                for hit in &receiver.pending {
                    hit.source.hash(&mut hasher);
                    hit.amount.hash(&mut hasher);
                }
            }
            if let Some(inventory) = self.world.try_get_component::<Inventory>(entity) {
                inventory.slots.hash(&mut hasher);
            }
            if let Some(details) = self.world.try_get_component::<ItemDetails>(entity) {
                details.item.hash(&mut hasher);
            }
            if let Some(prayer) = self.world.try_get_component::<Prayer>(entity) {
                prayer.active.hash(&mut hasher);
            }
        }

        hasher.finish()
    }

    /// Serialize the authoritative state for save/compare.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn snapshot_bytes(&self) -> Result<Vec<u8>> {
        let snapshot = EngineSnapshot::capture(self);
        bincode::serialize(&snapshot)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize engine: {e}")))
    }
}

// ============================================================================
// Serialized form
// ============================================================================

/// Every component of one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// The entity.
    pub entity: Entity,
    /// Footprint.
    pub transform: Option<Transform>,
    /// Path and speed.
    pub movement: Option<Movement>,
    /// Run energy.
    pub stamina: Option<Stamina>,
    /// Hitpoints.
    pub health: Option<Health>,
    /// Pending damage.
    pub damage_receiver: Option<DamageReceiver>,
    /// Offensive stats.
    pub offense: Option<OffensiveStats>,
    /// Defensive stats.
    pub defense: Option<DefensiveStats>,
    /// Attack target.
    pub attack_command: Option<AttackCommand>,
    /// Projectile state.
    pub projectile: Option<HomingProjectile>,
    /// Prayers.
    pub prayer: Option<Prayer>,
    /// Inventory.
    pub inventory: Option<Inventory>,
    /// Worn items.
    pub equipment: Option<PlayerEquipment>,
    /// Item identity.
    pub item: Option<ItemDetails>,
    /// Monster kind.
    pub npc: Option<Npc>,
}

/// Authoritative engine state in serializable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Ticks run.
    pub tick: u64,
    /// Terrain.
    pub map: TileMapData,
    /// Occupancy overlay.
    pub occupancy: TileOccupancy,
    /// The player.
    pub player: Option<Entity>,
    /// Live NPCs.
    pub npcs: Vec<Entity>,
    /// Wave state.
    pub instance: Option<WaveInstance>,
    /// Pending input.
    pub input: InputQueue,
    /// Every live entity.
    pub entities: Vec<EntityRecord>,
}

impl EngineSnapshot {
    /// Copy the authoritative state out of `engine`.
    #[must_use]
    pub fn capture(engine: &Engine) -> Self {
        let world = &engine.world;
        let entities = world
            .living_entities()
            .into_iter()
            .map(|entity| EntityRecord {
                entity,
                transform: world.try_get_component(entity).copied(),
                movement: world.try_get_component(entity).cloned(),
                stamina: world.try_get_component(entity).copied(),
                health: world.try_get_component(entity).copied(),
                damage_receiver: world.try_get_component(entity).cloned(),
                offense: world.try_get_component(entity).cloned(),
                defense: world.try_get_component(entity).cloned(),
                attack_command: world.try_get_component(entity).copied(),
                projectile: world.try_get_component(entity).copied(),
                prayer: world.try_get_component(entity).cloned(),
                inventory: world.try_get_component(entity).cloned(),
                equipment: world.try_get_component(entity).cloned(),
                item: world.try_get_component(entity).copied(),
                npc: world.try_get_component(entity).copied(),
            })
            .collect();

        Self {
            tick: engine.tick,
            map: engine.map.to_data(),
            occupancy: engine.occupancy.clone(),
            player: engine.player,
            npcs: engine.npcs.clone(),
            instance: engine.instance.clone(),
            input: engine.input.clone(),
            entities,
        }
    }

    /// Decode bytes from [`Engine::snapshot_bytes`].
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize engine: {e}")))
    }
}
