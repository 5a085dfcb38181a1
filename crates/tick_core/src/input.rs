//! Pending player intents.
//!
//! Input arrives between ticks (from a UI, a script or the headless
//! protocol) and is applied at the start of the next tick in a fixed order:
//!
//! 1. prayer toggles
//! 2. unequips
//! 3. equips
//! 4. one consumable
//! 5. one attack
//! 6. one movement
//! 7. run toggle
//!
//! Attack and movement are mutually exclusive: queueing one drops the other.

use serde::{Deserialize, Serialize};

use crate::components::{EquipmentSlot, PrayerKind};
use crate::ecs::Entity;
use crate::math::TilePos;

/// A consumable to use: the item entity and the inventory slot it was
/// clicked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumeRequest {
    /// Item entity.
    pub item: Entity,
    /// Inventory slot.
    pub slot: usize,
}

/// Intents waiting for the next tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputQueue {
    prayer_toggles: Vec<PrayerKind>,
    unequips: Vec<EquipmentSlot>,
    equips: Vec<Entity>,
    consume: Option<ConsumeRequest>,
    attack: Option<Entity>,
    movement: Option<TilePos>,
    toggle_run: bool,
}

/// Everything drained from an [`InputQueue`] for one tick, in apply order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Prayers to toggle, oldest first.
    pub prayer_toggles: Vec<PrayerKind>,
    /// Slots to empty, oldest first.
    pub unequips: Vec<EquipmentSlot>,
    /// Items to wear, oldest first.
    pub equips: Vec<Entity>,
    /// Consumable to use.
    pub consume: Option<ConsumeRequest>,
    /// Entity to attack.
    pub attack: Option<Entity>,
    /// Tile to walk to.
    pub movement: Option<TilePos>,
    /// Whether to flip run.
    pub toggle_run: bool,
}

impl InputQueue {
    /// Empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a prayer toggle. Toggles stack.
    pub fn queue_prayer_toggle(&mut self, prayer: PrayerKind) {
        self.prayer_toggles.push(prayer);
    }

    /// Queue taking off whatever is in `slot`.
    pub fn queue_unequip(&mut self, slot: EquipmentSlot) {
        self.unequips.push(slot);
    }

    /// Queue wearing `item`.
    pub fn queue_equip(&mut self, item: Entity) {
        self.equips.push(item);
    }

    /// Queue using `item` from `slot`. Replaces any queued consumable.
    pub fn queue_consume(&mut self, item: Entity, slot: usize) {
        self.consume = Some(ConsumeRequest { item, slot });
    }

    /// Queue an attack on `target`, dropping any queued movement.
    pub fn queue_attack(&mut self, target: Entity) {
        self.movement = None;
        self.attack = Some(target);
    }

    /// Queue a walk to `tile`, dropping any queued attack.
    pub fn queue_movement(&mut self, tile: TilePos) {
        self.attack = None;
        self.movement = Some(tile);
    }

    /// Queue flipping run. Two toggles before a tick cancel out.
    pub fn queue_toggle_run(&mut self) {
        self.toggle_run = !self.toggle_run;
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Drain everything for this tick.
    pub fn take(&mut self) -> TickInput {
        let queue = std::mem::take(self);
        TickInput {
            prayer_toggles: queue.prayer_toggles,
            unequips: queue.unequips,
            equips: queue.equips,
            consume: queue.consume,
            attack: queue.attack,
            movement: queue.movement,
            toggle_run: queue.toggle_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attack_and_movement_exclusive() {
        let mut queue = InputQueue::new();
        queue.queue_movement(TilePos::new(3, 3));
        queue.queue_attack(Entity::from_raw(4));
        let input = queue.take();
        assert_eq!(input.attack, Some(Entity::from_raw(4)));
        assert_eq!(input.movement, None);

        queue.queue_attack(Entity::from_raw(4));
        queue.queue_movement(TilePos::new(1, 1));
        let input = queue.take();
        assert_eq!(input.attack, None);
        assert_eq!(input.movement, Some(TilePos::new(1, 1)));
    }

    #[test]
    fn test_take_drains() {
        let mut queue = InputQueue::new();
        queue.queue_prayer_toggle(PrayerKind::ProtectMagic);
        queue.queue_prayer_toggle(PrayerKind::ProtectRange);
        queue.queue_equip(Entity::from_raw(9));
        queue.queue_consume(Entity::from_raw(10), 3);
        queue.queue_consume(Entity::from_raw(11), 4);
        assert!(!queue.is_empty());

        let input = queue.take();
        assert_eq!(input.prayer_toggles.len(), 2);
        assert_eq!(input.equips, vec![Entity::from_raw(9)]);
        assert_eq!(
            input.consume,
            Some(ConsumeRequest {
                item: Entity::from_raw(11),
                slot: 4
            })
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_double_run_toggle_cancels() {
        let mut queue = InputQueue::new();
        queue.queue_toggle_run();
        queue.queue_toggle_run();
        assert!(!queue.take().toggle_run);
    }
}
