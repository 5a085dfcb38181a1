//! ECS component definitions.
//!
//! Components are pure data with no behavior beyond small accessors.
//! All game entities are composed of these components.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::combat::{AttackStyle, StyleBonuses};
use crate::data::ItemId;
use crate::ecs::{Component, Entity, World};
use crate::error::Result;
use crate::math::{fixed_serde, Fixed, TilePos, Vec2Fixed, HALF};
use crate::pathfinding::PathingStrategy;

macro_rules! components {
    ($($ty:ty),+ $(,)?) => {
        $(impl Component for $ty {})+

        /// Register every simulation component type with `world`.
        pub fn register_all(world: &mut World) -> Result<()> {
            $(world.register_component::<$ty>()?;)+
            Ok(())
        }
    };
}

components!(
    Transform,
    Movement,
    Pathing,
    Stamina,
    OffensiveStats,
    DefensiveStats,
    AttackCommand,
    HomingProjectile,
    DamageReceiver,
    Health,
    HitSplats,
    Prayer,
    SimpleBehaviour,
    Player,
    Npc,
    Inventory,
    ItemDetails,
    PlayerEquipment,
);

// ============================================================================
// Position
// ============================================================================

/// Footprint on the grid plus its presentation-side position.
///
/// `position` is authoritative and only changes on tick. `render_position`
/// is eased toward it every frame and is never read by tick systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transform {
    /// North-west tile of the footprint.
    pub position: TilePos,
    /// Interpolated north-west corner for drawing.
    pub render_position: Vec2Fixed,
    /// Footprint width in tiles.
    pub width: u32,
    /// Footprint height in tiles.
    pub height: u32,
}

impl Transform {
    /// Footprint at `position`, rendered where it stands.
    #[must_use]
    pub fn new(position: TilePos, width: u32, height: u32) -> Self {
        Self {
            position,
            render_position: position.to_vec(),
            width,
            height,
        }
    }

    /// A single tile.
    #[must_use]
    pub fn single(position: TilePos) -> Self {
        Self::new(position, 1, 1)
    }

    const fn w(&self) -> i32 {
        self.width as i32
    }

    const fn h(&self) -> i32 {
        self.height as i32
    }

    /// North-east tile.
    #[must_use]
    pub const fn north_east(&self) -> TilePos {
        self.position.offset(self.w() - 1, 0)
    }

    /// South-west tile.
    #[must_use]
    pub const fn south_west(&self) -> TilePos {
        self.position.offset(0, self.h() - 1)
    }

    /// Every tile of the footprint, row by row.
    #[must_use]
    pub fn all_tiles(&self) -> Vec<TilePos> {
        let mut tiles = Vec::with_capacity((self.width * self.height) as usize);
        for dy in 0..self.h() {
            for dx in 0..self.w() {
                tiles.push(self.position.offset(dx, dy));
            }
        }
        tiles
    }

    /// Perimeter tiles, row by row from the north-west corner.
    #[must_use]
    pub fn edge_tiles(&self) -> Vec<TilePos> {
        let mut tiles = Vec::new();
        for dy in 0..self.h() {
            if dy == 0 || dy == self.h() - 1 {
                for dx in 0..self.w() {
                    tiles.push(self.position.offset(dx, dy));
                }
            } else {
                tiles.push(self.position.offset(0, dy));
                if self.width > 1 {
                    tiles.push(self.position.offset(self.w() - 1, dy));
                }
            }
        }
        tiles
    }

    /// West column, north to south.
    #[must_use]
    pub fn west_edge(&self) -> Vec<TilePos> {
        (0..self.h()).map(|dy| self.position.offset(0, dy)).collect()
    }

    /// East column, north to south.
    #[must_use]
    pub fn east_edge(&self) -> Vec<TilePos> {
        (0..self.h()).map(|dy| self.north_east().offset(0, dy)).collect()
    }

    /// North row, west to east.
    #[must_use]
    pub fn north_edge(&self) -> Vec<TilePos> {
        (0..self.w()).map(|dx| self.position.offset(dx, 0)).collect()
    }

    /// South row, west to east.
    #[must_use]
    pub fn south_edge(&self) -> Vec<TilePos> {
        (0..self.w()).map(|dx| self.south_west().offset(dx, 0)).collect()
    }

    /// Whether `tile` lies inside the footprint.
    #[must_use]
    pub const fn contains(&self, tile: TilePos) -> bool {
        tile.x >= self.position.x
            && tile.x < self.position.x + self.w()
            && tile.y >= self.position.y
            && tile.y < self.position.y + self.h()
    }

    fn half_extent(&self) -> Vec2Fixed {
        Vec2Fixed::new(
            Fixed::from_num(self.width) * HALF,
            Fixed::from_num(self.height) * HALF,
        )
    }

    /// Centre of the authoritative footprint.
    #[must_use]
    pub fn centre(&self) -> Vec2Fixed {
        self.position.to_vec() + self.half_extent()
    }

    /// Centre of the rendered footprint.
    #[must_use]
    pub fn render_centre(&self) -> Vec2Fixed {
        self.render_position + self.half_extent()
    }
}

// ============================================================================
// Movement
// ============================================================================

/// Maximum pending render steps per mover.
pub const MAX_RENDER_STEPS: usize = 2;

/// One pending render interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderStep {
    /// Tile the render position is easing toward.
    pub target: TilePos,
    /// Ticks of easing left.
    #[serde(with = "fixed_serde")]
    pub remaining_ticks: Fixed,
}

/// Queued path and speed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    /// Walking speed in tiles per tick.
    pub base_speed: u32,
    /// Speed in effect now (doubled while running).
    pub current_speed: u32,
    /// Tiles still to walk, nearest first.
    pub path: VecDeque<TilePos>,
    /// How long a render step takes, in ticks.
    #[serde(with = "fixed_serde")]
    pub render_time_ticks: Fixed,
    /// Pending render interpolations, oldest first.
    pub render_queue: VecDeque<RenderStep>,
}

impl Movement {
    /// Mover with the given walking speed.
    #[must_use]
    pub fn new(base_speed: u32) -> Self {
        Self {
            base_speed,
            current_speed: base_speed,
            path: VecDeque::new(),
            render_time_ticks: HALF,
            render_queue: VecDeque::new(),
        }
    }

    /// Replace the queued path.
    pub fn set_path(&mut self, path: impl IntoIterator<Item = TilePos>) {
        self.path = path.into_iter().collect();
    }
}

/// How this entity chooses where to go when chasing a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pathing {
    /// Strategy used by the attack-command system.
    pub strategy: PathingStrategy,
}

/// Run energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamina {
    /// Whether run is toggled on.
    pub running: bool,
    /// Current run energy.
    pub current: u32,
    /// Maximum run energy.
    pub max: u32,
    /// Energy regained per idle tick.
    pub regen_rate: u32,
}

// ============================================================================
// Combat
// ============================================================================

/// Levels and bonuses used when attacking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffensiveStats {
    /// Melee accuracy level.
    pub attack_level: i32,
    /// Melee damage level.
    pub strength_level: i32,
    /// Magic level.
    pub magic_level: i32,
    /// Ranged level.
    pub ranged_level: i32,
    /// Accuracy bonuses.
    pub attack_bonuses: StyleBonuses,
    /// Melee strength bonus.
    pub melee_strength: i32,
    /// Ranged strength bonus.
    pub ranged_strength: i32,
    /// Magic damage bonus.
    pub magic_damage: i32,
    /// Prayer bonus.
    pub prayer_bonus: i32,
    /// Maximum Chebyshev distance to attack from.
    pub attack_range: u32,
    /// Ticks between attacks.
    pub attack_cooldown: u32,
    /// Ticks left before the next attack may fire.
    pub ticks_until_can_attack: u32,
    /// Range restored when the main-hand weapon comes off.
    pub base_attack_range: u32,
    /// Cooldown restored when the main-hand weapon comes off.
    pub base_attack_cooldown: u32,
    /// How attacks are delivered.
    pub attack_style: AttackStyle,
}

impl Default for OffensiveStats {
    fn default() -> Self {
        Self {
            attack_level: 1,
            strength_level: 1,
            magic_level: 1,
            ranged_level: 1,
            attack_bonuses: StyleBonuses::default(),
            melee_strength: 0,
            ranged_strength: 0,
            magic_damage: 0,
            prayer_bonus: 0,
            attack_range: UNARMED_ATTACK_RANGE,
            attack_cooldown: UNARMED_ATTACK_COOLDOWN,
            ticks_until_can_attack: 0,
            base_attack_range: UNARMED_ATTACK_RANGE,
            base_attack_cooldown: UNARMED_ATTACK_COOLDOWN,
            attack_style: AttackStyle::default(),
        }
    }
}

/// Attack range without a weapon.
pub const UNARMED_ATTACK_RANGE: u32 = 1;
/// Attack cooldown without a weapon.
pub const UNARMED_ATTACK_COOLDOWN: u32 = 4;

/// Levels and bonuses used when defending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefensiveStats {
    /// Defence level.
    pub defence_level: i32,
    /// Magic level (blended into magic defence).
    pub magic_level: i32,
    /// Defence bonuses.
    pub defence_bonuses: StyleBonuses,
}

impl Default for DefensiveStats {
    fn default() -> Self {
        Self {
            defence_level: 1,
            magic_level: 1,
            defence_bonuses: StyleBonuses::default(),
        }
    }
}

/// Intent to attack `target`; drives the attack-command state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackCommand {
    /// Entity being attacked.
    pub target: Entity,
}

/// A projectile homing on its target.
///
/// Has no [`Transform`]: it never occupies tiles and is not pathed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomingProjectile {
    /// Who fired it.
    pub source: Entity,
    /// Who it will hit.
    pub target: Entity,
    /// Ticks until it lands.
    pub ticks_until_impact: u32,
    /// Damage delivered on impact.
    pub damage: u32,
    /// Authoritative centre, advanced on tick.
    pub position: Vec2Fixed,
    /// Drawn centre, eased every frame.
    pub render_position: Vec2Fixed,
}

/// One pending hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageEvent {
    /// Entity that dealt it.
    pub source: Entity,
    /// Hitpoints to remove.
    pub amount: u32,
}

/// Damage waiting to be applied this tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageReceiver {
    /// Pending hits, oldest first.
    pub pending: Vec<DamageEvent>,
}

/// Hitpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    /// Current hitpoints.
    pub current: u32,
    /// Maximum hitpoints.
    pub max: u32,
}

impl Health {
    /// Full health.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Whether hitpoints have run out.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.current == 0
    }
}

/// A damage number shown over an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitSplat {
    /// Damage dealt.
    pub damage: u32,
    /// Ticks before it disappears.
    pub ticks_left: u32,
}

/// Hit splats currently shown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitSplats {
    /// Active splats, oldest first.
    pub splats: Vec<HitSplat>,
}

// ============================================================================
// Prayer
// ============================================================================

/// Protection prayers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrayerKind {
    /// Blocks stab, slash and crush.
    ProtectMelee,
    /// Blocks ranged.
    ProtectRange,
    /// Blocks magic.
    ProtectMagic,
}

/// Prayer points and active prayers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prayer {
    /// Current points.
    pub current: u32,
    /// Maximum points.
    pub max: u32,
    /// Prayers switched on.
    pub active: BTreeSet<PrayerKind>,
}

impl Prayer {
    /// Full points, nothing active.
    #[must_use]
    pub fn new(max: u32) -> Self {
        Self {
            current: max,
            max,
            active: BTreeSet::new(),
        }
    }

    /// Whether `kind` is on.
    #[must_use]
    pub fn is_active(&self, kind: PrayerKind) -> bool {
        self.active.contains(&kind)
    }

    /// Switch `kind` off if it is on; otherwise make it the only active prayer.
    pub fn toggle(&mut self, kind: PrayerKind) {
        if !self.active.remove(&kind) {
            self.active.clear();
            self.active.insert(kind);
        }
    }
}

// ============================================================================
// Tags
// ============================================================================

/// Attacks the player as soon as it is ticked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleBehaviour;

/// The player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player;

/// A hostile non-player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Npc {
    /// Which monster this is.
    pub kind: crate::data::MonsterKind,
}

// ============================================================================
// Items
// ============================================================================

/// Number of inventory slots.
pub const INVENTORY_SIZE: usize = 28;

/// Carried item entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    /// One entry per slot.
    pub slots: Vec<Option<Entity>>,
}

impl Inventory {
    /// Empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: vec![None; INVENTORY_SIZE],
        }
    }

    /// First empty slot.
    #[must_use]
    pub fn first_free(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Number of empty slots.
    #[must_use]
    pub fn free_slots(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_none()).count()
    }

    /// Slot holding `item`.
    #[must_use]
    pub fn slot_of(&self, item: Entity) -> Option<usize> {
        self.slots.iter().position(|&slot| slot == Some(item))
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

/// Which catalog entry an item entity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDetails {
    /// Catalog id.
    pub item: ItemId,
}

/// Equipment slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EquipmentSlot {
    /// Helmets.
    Head,
    /// Body armour.
    Chest,
    /// Leg armour.
    Legs,
    /// Weapons.
    MainHand,
    /// Shields; also claimed by two-handed weapons.
    OffHand,
    /// Boots.
    Boots,
    /// Gloves.
    Gloves,
    /// Rings.
    Ring,
    /// Amulets.
    Neck,
    /// Capes.
    Cape,
    /// Arrows and bolts.
    Ammo,
}

impl EquipmentSlot {
    /// Every slot, in storage order.
    pub const ALL: [Self; 11] = [
        Self::Head,
        Self::Chest,
        Self::Legs,
        Self::MainHand,
        Self::OffHand,
        Self::Boots,
        Self::Gloves,
        Self::Ring,
        Self::Neck,
        Self::Cape,
        Self::Ammo,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

/// Worn item entities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerEquipment {
    slots: [Option<Entity>; 11],
}

impl PlayerEquipment {
    /// Item in `slot`.
    #[must_use]
    pub const fn get(&self, slot: EquipmentSlot) -> Option<Entity> {
        self.slots[slot.index()]
    }

    /// Put `item` into `slot`, returning what was there.
    pub fn set(&mut self, slot: EquipmentSlot, item: Option<Entity>) -> Option<Entity> {
        std::mem::replace(&mut self.slots[slot.index()], item)
    }

    /// Filled slots.
    pub fn iter(&self) -> impl Iterator<Item = (EquipmentSlot, Entity)> + '_ {
        EquipmentSlot::ALL
            .iter()
            .filter_map(|&slot| self.get(slot).map(|item| (slot, item)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_tile_edges() {
        let transform = Transform::single(TilePos::new(4, 5));
        assert_eq!(transform.edge_tiles(), vec![TilePos::new(4, 5)]);
        assert_eq!(transform.all_tiles(), vec![TilePos::new(4, 5)]);
    }

    #[test]
    fn test_three_by_three_edges() {
        let transform = Transform::new(TilePos::new(0, 0), 3, 3);
        let edges = transform.edge_tiles();
        assert_eq!(edges.len(), 8);
        assert!(!edges.contains(&TilePos::new(1, 1)));
        assert_eq!(edges[0], TilePos::new(0, 0));
        assert_eq!(edges[3], TilePos::new(0, 1));
        assert_eq!(edges[4], TilePos::new(2, 1));
        assert_eq!(transform.all_tiles().len(), 9);
    }

    #[test]
    fn test_directional_edges() {
        let transform = Transform::new(TilePos::new(2, 3), 2, 3);
        assert_eq!(
            transform.west_edge(),
            vec![TilePos::new(2, 3), TilePos::new(2, 4), TilePos::new(2, 5)]
        );
        assert_eq!(transform.east_edge()[0], TilePos::new(3, 3));
        assert_eq!(transform.north_edge(), vec![TilePos::new(2, 3), TilePos::new(3, 3)]);
        assert_eq!(transform.south_edge(), vec![TilePos::new(2, 5), TilePos::new(3, 5)]);
    }

    #[test]
    fn test_contains_and_centre() {
        let transform = Transform::new(TilePos::new(1, 1), 2, 2);
        assert!(transform.contains(TilePos::new(2, 2)));
        assert!(!transform.contains(TilePos::new(3, 1)));
        assert_eq!(transform.centre(), Vec2Fixed::from_ints(2, 2));
    }

    #[test]
    fn test_prayer_toggle() {
        let mut prayer = Prayer::new(99);
        prayer.toggle(PrayerKind::ProtectMelee);
        assert!(prayer.is_active(PrayerKind::ProtectMelee));

        prayer.toggle(PrayerKind::ProtectMagic);
        assert!(prayer.is_active(PrayerKind::ProtectMagic));
        assert!(!prayer.is_active(PrayerKind::ProtectMelee));

        prayer.toggle(PrayerKind::ProtectMagic);
        assert!(prayer.active.is_empty());
    }

    #[test]
    fn test_inventory_slots() {
        let mut inventory = Inventory::new();
        assert_eq!(inventory.free_slots(), INVENTORY_SIZE);
        inventory.slots[0] = Some(Entity::from_raw(9));
        assert_eq!(inventory.first_free(), Some(1));
        assert_eq!(inventory.slot_of(Entity::from_raw(9)), Some(0));
    }

    #[test]
    fn test_equipment_set_returns_previous() {
        let mut equipment = PlayerEquipment::default();
        let bow = Entity::from_raw(3);
        assert_eq!(equipment.set(EquipmentSlot::MainHand, Some(bow)), None);
        assert_eq!(equipment.get(EquipmentSlot::MainHand), Some(bow));
        assert_eq!(equipment.iter().count(), 1);
        assert_eq!(equipment.set(EquipmentSlot::MainHand, None), Some(bow));
    }
}
