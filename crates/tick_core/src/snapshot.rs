//! UI-facing view of the player's combat state.

use serde::{Deserialize, Serialize};

use crate::components::{
    EquipmentSlot, Health, Inventory, ItemDetails, PlayerEquipment, Prayer, PrayerKind, Stamina,
};
use crate::data::{ItemCatalog, ItemId};
use crate::ecs::{Entity, World};
use crate::error::Result;

/// One held or worn item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSummary {
    /// Item entity.
    pub entity: Entity,
    /// Catalog id.
    pub item: ItemId,
    /// Display name.
    pub name: String,
}

/// Player combat state, as shown by health/stamina/prayer orbs and the
/// inventory and equipment panels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatSnapshot {
    /// Current hitpoints.
    pub current_health: u32,
    /// Maximum hitpoints.
    pub max_health: u32,
    /// Current run energy.
    pub current_stamina: u32,
    /// Maximum run energy.
    pub max_stamina: u32,
    /// Whether run is on.
    pub running: bool,
    /// Current prayer points.
    pub current_prayer: u32,
    /// Maximum prayer points.
    pub max_prayer: u32,
    /// Active prayers.
    pub active_prayers: Vec<PrayerKind>,
    /// The 28 inventory slots.
    pub inventory: Vec<Option<ItemSummary>>,
    /// Filled equipment slots.
    pub equipment: Vec<(EquipmentSlot, ItemSummary)>,
}

impl CombatSnapshot {
    /// Read the snapshot for `player`.
    pub fn capture(world: &World, catalog: &ItemCatalog, player: Entity) -> Result<Self> {
        let health = world.get_component::<Health>(player)?;
        let stamina = world.get_component::<Stamina>(player)?;
        let prayer = world.try_get_component::<Prayer>(player);

        let summarize = |entity: Entity| -> Result<ItemSummary> {
            let item = world.get_component::<ItemDetails>(entity)?.item;
            Ok(ItemSummary {
                entity,
                item,
                name: catalog.get(item)?.name.clone(),
            })
        };

        let inventory = world
            .get_component::<Inventory>(player)?
            .slots
            .iter()
            .map(|slot| slot.map(&summarize).transpose())
            .collect::<Result<Vec<_>>>()?;

        let equipment = match world.try_get_component::<PlayerEquipment>(player) {
            Some(worn) => worn
                .iter()
                .map(|(slot, entity)| Ok((slot, summarize(entity)?)))
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(Self {
            current_health: health.current,
            max_health: health.max,
            current_stamina: stamina.current,
            max_stamina: stamina.max,
            running: stamina.running,
            current_prayer: prayer.map_or(0, |p| p.current),
            max_prayer: prayer.map_or(0, |p| p.max),
            active_prayers: prayer
                .map(|p| p.active.iter().copied().collect())
                .unwrap_or_default(),
            inventory,
            equipment,
        })
    }

    /// First inventory slot holding `item`.
    #[must_use]
    pub fn find_item(&self, item: ItemId) -> Option<(usize, &ItemSummary)> {
        self.inventory
            .iter()
            .enumerate()
            .find_map(|(slot, held)| held.as_ref().filter(|s| s.item == item).map(|s| (slot, s)))
    }
}
