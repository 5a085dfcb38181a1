//! Scripted player for unattended runs.
//!
//! The autopilot reads the engine once per tick and queues the same inputs
//! a cautious human would: wear everything wearable, pray against whatever
//! is closest, drink when low and keep shooting the nearest monster.

use serde::{Deserialize, Serialize};
use tick_core::components::{
    AttackCommand, Health, Inventory, ItemDetails, Npc, Prayer, PrayerKind, Transform,
};
use tick_core::data::{ConsumableEffect, ItemKind};
use tick_core::ecs::Entity;
use tick_core::engine::Engine;
use tick_core::error::{GameError, Result};

/// Inputs queued by one [`Autopilot::plan`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// Items queued for equipping.
    pub equips: Vec<Entity>,
    /// Potion queued for drinking.
    pub drink: Option<Entity>,
    /// Prayer toggled on.
    pub prayer: Option<PrayerKind>,
    /// New attack target.
    pub target: Option<Entity>,
}

/// Autopilot tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Autopilot {
    /// Drink a health potion when hitpoints fall below this.
    pub potion_threshold: u32,
    /// Switch protection prayers to match the nearest monster.
    pub use_prayers: bool,
    #[serde(skip)]
    geared: bool,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::new(50)
    }
}

impl Autopilot {
    /// Autopilot that drinks below `potion_threshold` hitpoints.
    #[must_use]
    pub const fn new(potion_threshold: u32) -> Self {
        Self {
            potion_threshold,
            use_prayers: true,
            geared: false,
        }
    }

    /// Same autopilot without prayer switching.
    #[must_use]
    pub const fn without_prayers(mut self) -> Self {
        self.use_prayers = false;
        self
    }

    /// Queue this tick's inputs. Call before [`Engine::tick`].
    pub fn plan(&mut self, engine: &mut Engine) -> Result<Plan> {
        let player = engine
            .player()
            .ok_or_else(|| GameError::InvalidState("autopilot needs a player".to_string()))?;

        let mut plan = Plan::default();
        if !self.geared {
            plan.equips = wearable_items(engine, player)?;
            for &item in &plan.equips {
                engine.input_mut().queue_equip(item);
            }
            self.geared = true;
        }

        let health = engine.world().get_component::<Health>(player)?.current;
        if health < self.potion_threshold {
            if let Some((item, slot)) = healing_item(engine, player)? {
                engine.input_mut().queue_consume(item, slot);
                plan.drink = Some(item);
            }
        }

        let Some(nearest) = nearest_npc(engine, player)? else {
            return Ok(plan);
        };

        if self.use_prayers {
            let kind = engine.world().get_component::<Npc>(nearest)?.kind;
            let wanted = engine
                .monsters()
                .get(kind)?
                .attack_style
                .sub_type()
                .protection();
            let active = engine
                .world()
                .try_get_component::<Prayer>(player)
                .is_some_and(|p| p.is_active(wanted));
            if !active {
                engine.input_mut().queue_prayer_toggle(wanted);
                plan.prayer = Some(wanted);
            }
        }

        if !engine.world().has_component::<AttackCommand>(player) {
            engine.input_mut().queue_attack(nearest);
            plan.target = Some(nearest);
        }
        Ok(plan)
    }
}

/// Inventory items that can be worn, in slot order.
fn wearable_items(engine: &Engine, player: Entity) -> Result<Vec<Entity>> {
    let world = engine.world();
    let mut wearable = Vec::new();
    for &item in world.get_component::<Inventory>(player)?.slots.iter().flatten() {
        let id = world.get_component::<ItemDetails>(item)?.item;
        if matches!(engine.items().get(id)?.kind, ItemKind::Equipment(_)) {
            wearable.push(item);
        }
    }
    Ok(wearable)
}

/// First inventory item that restores hitpoints, with its slot.
fn healing_item(engine: &Engine, player: Entity) -> Result<Option<(Entity, usize)>> {
    let world = engine.world();
    for (slot, item) in world.get_component::<Inventory>(player)?.slots.iter().enumerate() {
        let Some(item) = *item else { continue };
        let id = world.get_component::<ItemDetails>(item)?.item;
        let heals = engine
            .items()
            .consumable(id)?
            .is_some_and(|c| matches!(c.effect, ConsumableEffect::RestoreHealth(_)));
        if heals {
            return Ok(Some((item, slot)));
        }
    }
    Ok(None)
}

/// Closest live NPC by Chebyshev distance between NW tiles. Ties go to the
/// earliest spawned.
fn nearest_npc(engine: &Engine, player: Entity) -> Result<Option<Entity>> {
    let world = engine.world();
    let from = world.get_component::<Transform>(player)?.position;
    let mut best: Option<(u32, Entity)> = None;
    for &npc in engine.npcs() {
        if world.get_component::<Health>(npc)?.current == 0 {
            continue;
        }
        let distance = from.chebyshev_distance(world.get_component::<Transform>(npc)?.position);
        if best.map_or(true, |(d, _)| distance < d) {
            best = Some((distance, npc));
        }
    }
    Ok(best.map(|(_, npc)| npc))
}
