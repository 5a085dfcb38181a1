//! Picking up, dropping and using items.
//!
//! Items are entities with [`ItemDetails`]. On the ground they also have a
//! [`Transform`]; in an inventory they have none.

use crate::components::{Health, Inventory, ItemDetails, Prayer, Transform};
use crate::data::{ConsumableEffect, ItemCatalog};
use crate::ecs::{Entity, World};
use crate::error::{GameError, Result};

/// Put `item` into the first free slot of `holder`'s inventory, lifting it
/// off the ground. Returns the slot used.
///
/// An item already held by `holder` is rejected.
pub fn pickup_item(world: &mut World, holder: Entity, item: Entity) -> Result<usize> {
    let inventory = world.get_component_mut::<Inventory>(holder)?;
    if let Some(held) = inventory.slot_of(item) {
        return Err(GameError::InvalidState(format!(
            "{item} is already in slot {held}"
        )));
    }
    let slot = inventory.first_free().ok_or(GameError::InventoryFull {
        needed: 1,
        free: 0,
    })?;
    inventory.slots[slot] = Some(item);

    if world.has_component::<Transform>(item) {
        world.remove_component::<Transform>(item)?;
    }
    Ok(slot)
}

/// Drop `item` on the tile `holder` stands on.
pub fn drop_item(world: &mut World, holder: Entity, item: Entity) -> Result<()> {
    let position = world.get_component::<Transform>(holder)?.position;
    let inventory = world.get_component_mut::<Inventory>(holder)?;
    let slot = inventory
        .slot_of(item)
        .ok_or(GameError::ItemNotInInventory { holder, item })?;
    inventory.slots[slot] = None;

    world.add_component(item, Transform::single(position))
}

/// Use the consumable `item` held in `slot`.
///
/// The effect is clamped to the holder's maximum. The item then becomes its
/// next dose (or an empty vial) in place, or disappears if it has no
/// successor.
pub fn consume_item(
    world: &mut World,
    catalog: &ItemCatalog,
    holder: Entity,
    item: Entity,
    slot: usize,
) -> Result<()> {
    let held = world
        .get_component::<Inventory>(holder)?
        .slots
        .get(slot)
        .copied()
        .flatten();
    if held != Some(item) {
        return Err(GameError::ItemNotInInventory { holder, item });
    }

    let item_id = world.get_component::<ItemDetails>(item)?.item;
    let consumable = catalog
        .consumable(item_id)?
        .ok_or_else(|| GameError::InvalidState(format!("item {item_id} cannot be consumed")))?;

    match consumable.effect {
        ConsumableEffect::RestoreHealth(amount) => {
            let health = world.get_component_mut::<Health>(holder)?;
            health.current = (health.current + amount).min(health.max);
        }
        ConsumableEffect::RestorePrayer(amount) => {
            let prayer = world.get_component_mut::<Prayer>(holder)?;
            prayer.current = (prayer.current + amount).min(prayer.max);
        }
    }

    match consumable.becomes {
        Some(next) => world.get_component_mut::<ItemDetails>(item)?.item = next,
        None => {
            world.get_component_mut::<Inventory>(holder)?.slots[slot] = None;
            world.destroy_entity(item)?;
        }
    }
    Ok(())
}
