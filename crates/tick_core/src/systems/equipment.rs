//! Wearing and removing equipment.
//!
//! An equipped item lives in the first of its catalog slots; its other
//! slots are covered but stay empty. Its bonuses are folded into the
//! wearer's [`OffensiveStats`] and [`DefensiveStats`] while worn.

use crate::components::{
    DefensiveStats, EquipmentSlot, Inventory, ItemDetails, OffensiveStats, PlayerEquipment,
};
use crate::data::{EquipmentData, ItemCatalog};
use crate::ecs::{Entity, World};
use crate::error::{GameError, Result};

/// Fold `data`'s bonuses into the wearer's stats.
///
/// A main-hand weapon also sets range and cooldown from its first style.
pub fn add_equipment_stats(
    offense: &mut OffensiveStats,
    defense: &mut DefensiveStats,
    data: &EquipmentData,
) {
    offense.attack_bonuses.add(&data.attack_bonuses);
    offense.melee_strength += data.melee_strength;
    offense.ranged_strength += data.ranged_strength;
    offense.magic_damage += data.magic_damage;
    offense.prayer_bonus += data.prayer_bonus;
    defense.defence_bonuses.add(&data.defence_bonuses);

    if let Some(style) = data.attack_styles.first() {
        offense.attack_range = style.range;
        offense.attack_cooldown = style.speed;
    }
}

/// Exact inverse of [`add_equipment_stats`].
///
/// Removing a main-hand weapon restores the unarmed range and cooldown.
pub fn subtract_equipment_stats(
    offense: &mut OffensiveStats,
    defense: &mut DefensiveStats,
    data: &EquipmentData,
) {
    offense.attack_bonuses.subtract(&data.attack_bonuses);
    offense.melee_strength -= data.melee_strength;
    offense.ranged_strength -= data.ranged_strength;
    offense.magic_damage -= data.magic_damage;
    offense.prayer_bonus -= data.prayer_bonus;
    defense.defence_bonuses.subtract(&data.defence_bonuses);

    if data.is_weapon() {
        offense.attack_range = offense.base_attack_range;
        offense.attack_cooldown = offense.base_attack_cooldown;
    }
}

fn apply_stats(
    world: &mut World,
    wearer: Entity,
    data: &EquipmentData,
    change: fn(&mut OffensiveStats, &mut DefensiveStats, &EquipmentData),
) -> Result<()> {
    let mut offense = world.get_component::<OffensiveStats>(wearer)?.clone();
    let mut defense = world.get_component::<DefensiveStats>(wearer)?.clone();
    change(&mut offense, &mut defense, data);
    *world.get_component_mut::<OffensiveStats>(wearer)? = offense;
    *world.get_component_mut::<DefensiveStats>(wearer)? = defense;
    Ok(())
}

/// Wear `item` from `wearer`'s inventory.
///
/// Fails, leaving everything untouched, when the item is not in the
/// inventory, is not equipment, has unmet requirements, or displaces more
/// worn items than the inventory can take back.
pub fn equip_item(
    world: &mut World,
    catalog: &ItemCatalog,
    wearer: Entity,
    item: Entity,
) -> Result<()> {
    let inventory = world.get_component::<Inventory>(wearer)?;
    let inventory_slot = inventory
        .slot_of(item)
        .ok_or(GameError::ItemNotInInventory {
            holder: wearer,
            item,
        })?;
    let free_after_lift = inventory.free_slots() + 1;

    let item_id = world.get_component::<ItemDetails>(item)?.item;
    let data = catalog.equipment(item_id)?;
    let offense = world.get_component::<OffensiveStats>(wearer)?;
    let defense = world.get_component::<DefensiveStats>(wearer)?;
    if !data.requirements.met_by(offense, defense) {
        return Err(GameError::RequirementsNotMet(item_id));
    }
    let Some(&home_slot) = data.equip_slots.first() else {
        return Err(GameError::NotEquippable(item_id));
    };

    let mut displaced = Vec::new();
    for (slot, worn) in world.get_component::<PlayerEquipment>(wearer)?.iter() {
        let worn_id = world.get_component::<ItemDetails>(worn)?.item;
        let covers = &catalog.equipment(worn_id)?.equip_slots;
        if covers.iter().any(|covered| data.equip_slots.contains(covered)) {
            displaced.push(slot);
        }
    }
    if displaced.len() > free_after_lift {
        return Err(GameError::InventoryFull {
            needed: displaced.len(),
            free: free_after_lift,
        });
    }

    world.get_component_mut::<Inventory>(wearer)?.slots[inventory_slot] = None;
    for slot in displaced {
        unequip_item(world, catalog, wearer, slot)?;
    }
    world
        .get_component_mut::<PlayerEquipment>(wearer)?
        .set(home_slot, Some(item));
    apply_stats(world, wearer, data, add_equipment_stats)?;

    tracing::debug!(%wearer, item = %item_id, slot = ?home_slot, "Equipped");
    Ok(())
}

/// Move whatever is worn in `slot` to the first free inventory slot.
/// Returns the item entity.
pub fn unequip_item(
    world: &mut World,
    catalog: &ItemCatalog,
    wearer: Entity,
    slot: EquipmentSlot,
) -> Result<Entity> {
    let item = world
        .get_component::<PlayerEquipment>(wearer)?
        .get(slot)
        .ok_or(GameError::EmptyEquipmentSlot(slot))?;
    let item_id = world.get_component::<ItemDetails>(item)?.item;
    let data = catalog.equipment(item_id)?;

    let inventory = world.get_component_mut::<Inventory>(wearer)?;
    let free = inventory.first_free().ok_or(GameError::InventoryFull {
        needed: 1,
        free: 0,
    })?;
    inventory.slots[free] = Some(item);

    world
        .get_component_mut::<PlayerEquipment>(wearer)?
        .set(slot, None);
    apply_stats(world, wearer, data, subtract_equipment_stats)?;
    Ok(item)
}
