//! Item definitions: equipment bonuses, requirements and consumables.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::combat::StyleBonuses;
use crate::components::{DefensiveStats, EquipmentSlot, OffensiveStats};
use crate::error::{GameError, Result};

/// Catalog key for an item type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl ItemId {
    /// Twisted bow.
    pub const TWISTED_BOW: Self = Self(1);
    /// Fortified masori body.
    pub const MASORI_BODY: Self = Self(2);
    /// Fortified masori chaps.
    pub const MASORI_CHAPS: Self = Self(3);
    /// Health potion, four doses.
    pub const HEALTH_POTION_4: Self = Self(4);
    /// Health potion, three doses.
    pub const HEALTH_POTION_3: Self = Self(5);
    /// Health potion, two doses.
    pub const HEALTH_POTION_2: Self = Self(6);
    /// Health potion, one dose.
    pub const HEALTH_POTION_1: Self = Self(7);
    /// Prayer potion, four doses.
    pub const PRAYER_POTION_4: Self = Self(8);
    /// Prayer potion, three doses.
    pub const PRAYER_POTION_3: Self = Self(9);
    /// Prayer potion, two doses.
    pub const PRAYER_POTION_2: Self = Self(10);
    /// Prayer potion, one dose.
    pub const PRAYER_POTION_1: Self = Self(11);
    /// What a potion leaves behind.
    pub const EMPTY_VIAL: Self = Self(12);
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Minimum levels needed to equip an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirements {
    /// Attack level.
    #[serde(default = "min_level")]
    pub attack: i32,
    /// Strength level.
    #[serde(default = "min_level")]
    pub strength: i32,
    /// Defence level.
    #[serde(default = "min_level")]
    pub defence: i32,
    /// Ranged level.
    #[serde(default = "min_level")]
    pub ranged: i32,
    /// Magic level.
    #[serde(default = "min_level")]
    pub magic: i32,
}

const fn min_level() -> i32 {
    1
}

impl Default for Requirements {
    fn default() -> Self {
        Self {
            attack: 1,
            strength: 1,
            defence: 1,
            ranged: 1,
            magic: 1,
        }
    }
}

impl Requirements {
    /// Whether the wearer's levels meet every requirement.
    #[must_use]
    pub const fn met_by(&self, offense: &OffensiveStats, defense: &DefensiveStats) -> bool {
        offense.attack_level >= self.attack
            && offense.strength_level >= self.strength
            && offense.magic_level >= self.magic
            && offense.ranged_level >= self.ranged
            && defense.defence_level >= self.defence
    }
}

/// One selectable attack style of a weapon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponStyle {
    /// Display name.
    pub name: String,
    /// Ticks between attacks.
    pub speed: u32,
    /// Attack range in tiles.
    pub range: u32,
}

/// Stats and slots of a wearable item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentData {
    /// Levels needed to wear it.
    #[serde(default)]
    pub requirements: Requirements,
    /// Accuracy bonuses.
    #[serde(default)]
    pub attack_bonuses: StyleBonuses,
    /// Defence bonuses.
    #[serde(default)]
    pub defence_bonuses: StyleBonuses,
    /// Melee strength bonus.
    #[serde(default)]
    pub melee_strength: i32,
    /// Ranged strength bonus.
    #[serde(default)]
    pub ranged_strength: i32,
    /// Magic damage bonus.
    #[serde(default)]
    pub magic_damage: i32,
    /// Prayer bonus.
    #[serde(default)]
    pub prayer_bonus: i32,
    /// Slots it occupies. The first one holds the item.
    pub equip_slots: Vec<EquipmentSlot>,
    /// Attack styles. Non-empty only for main-hand weapons.
    #[serde(default)]
    pub attack_styles: Vec<WeaponStyle>,
}

impl EquipmentData {
    /// Whether this is a main-hand weapon.
    #[must_use]
    pub fn is_weapon(&self) -> bool {
        !self.attack_styles.is_empty()
    }
}

/// What drinking or eating an item does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsumableEffect {
    /// Heal up to max health.
    RestoreHealth(u32),
    /// Restore prayer points up to max.
    RestorePrayer(u32),
}

/// A usable item and what replaces it once used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumableData {
    /// Effect on the user.
    pub effect: ConsumableEffect,
    /// Item left in the slot afterwards (next dose or an empty vial).
    pub becomes: Option<ItemId>,
}

/// Item category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// Can be worn.
    Equipment(EquipmentData),
    /// Can be used from the inventory.
    Consumable(ConsumableData),
    /// Neither.
    Other,
}

/// One catalog entry.
///
/// # Example RON
///
/// ```ron
/// ItemData(
///     name: "Empty vial",
///     description: "An empty vial.",
///     kind: Other,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemData {
    /// Display name.
    pub name: String,
    /// Examine text.
    #[serde(default)]
    pub description: String,
    /// Category and category-specific data.
    pub kind: ItemKind,
}

/// Static item lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCatalog {
    items: BTreeMap<ItemId, ItemData>,
}

impl ItemCatalog {
    /// Empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, id: ItemId, data: ItemData) {
        self.items.insert(id, data);
    }

    /// Entry for `id`.
    pub fn get(&self, id: ItemId) -> Result<&ItemData> {
        self.items.get(&id).ok_or(GameError::UnknownItem(id))
    }

    /// Equipment data for `id`.
    pub fn equipment(&self, id: ItemId) -> Result<&EquipmentData> {
        match &self.get(id)?.kind {
            ItemKind::Equipment(data) => Ok(data),
            _ => Err(GameError::NotEquippable(id)),
        }
    }

    /// Consumable data for `id`, if it is usable.
    pub fn consumable(&self, id: ItemId) -> Result<Option<&ConsumableData>> {
        match &self.get(id)?.kind {
            ItemKind::Consumable(data) => Ok(Some(data)),
            _ => Ok(None),
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &ItemData)> {
        self.items.iter().map(|(&id, data)| (id, data))
    }

    /// Parse a catalog from RON (a map of id to entry).
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let items: BTreeMap<ItemId, ItemData> =
            ron::from_str(source).map_err(|e| GameError::DataParseError {
                source_name: "item catalog".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self { items })
    }

    /// The shipped items.
    #[must_use]
    pub fn standard() -> Self {
        let mut catalog = Self::new();

        catalog.insert(
            ItemId::TWISTED_BOW,
            ItemData {
                name: "Twisted bow".to_string(),
                description: "A mystical bow carved from the twisted remains of the Great Olm."
                    .to_string(),
                kind: ItemKind::Equipment(EquipmentData {
                    requirements: Requirements {
                        ranged: 85,
                        ..Requirements::default()
                    },
                    attack_bonuses: StyleBonuses {
                        ranged: 70,
                        ..StyleBonuses::default()
                    },
                    ranged_strength: 20,
                    equip_slots: vec![EquipmentSlot::MainHand, EquipmentSlot::OffHand],
                    attack_styles: vec![
                        weapon_style("Accurate", 6, 10),
                        weapon_style("Rapid", 5, 10),
                        weapon_style("Longrange", 6, 10),
                    ],
                    ..EquipmentData::default()
                }),
            },
        );

        catalog.insert(
            ItemId::MASORI_BODY,
            ItemData {
                name: "Masori body (f)".to_string(),
                description: "Fortified armour worn by the elite archers of the desert."
                    .to_string(),
                kind: ItemKind::Equipment(EquipmentData {
                    requirements: Requirements {
                        ranged: 80,
                        defence: 80,
                        ..Requirements::default()
                    },
                    attack_bonuses: StyleBonuses {
                        magic: -4,
                        ranged: 43,
                        ..StyleBonuses::default()
                    },
                    defence_bonuses: StyleBonuses {
                        stab: 59,
                        slash: 52,
                        crush: 64,
                        ranged: 60,
                        magic: 74,
                    },
                    ranged_strength: 4,
                    prayer_bonus: 1,
                    equip_slots: vec![EquipmentSlot::Chest],
                    ..EquipmentData::default()
                }),
            },
        );

        catalog.insert(
            ItemId::MASORI_CHAPS,
            ItemData {
                name: "Masori chaps (f)".to_string(),
                description: "Fortified leg armour worn by the elite archers of the desert."
                    .to_string(),
                kind: ItemKind::Equipment(EquipmentData {
                    requirements: Requirements {
                        ranged: 80,
                        defence: 80,
                        ..Requirements::default()
                    },
                    attack_bonuses: StyleBonuses {
                        magic: -2,
                        ranged: 27,
                        ..StyleBonuses::default()
                    },
                    defence_bonuses: StyleBonuses {
                        stab: 26,
                        slash: 24,
                        crush: 29,
                        ranged: 22,
                        magic: 19,
                    },
                    ranged_strength: 2,
                    equip_slots: vec![EquipmentSlot::Legs],
                    ..EquipmentData::default()
                }),
            },
        );

        let health_doses = [
            ItemId::HEALTH_POTION_4,
            ItemId::HEALTH_POTION_3,
            ItemId::HEALTH_POTION_2,
            ItemId::HEALTH_POTION_1,
        ];
        let prayer_doses = [
            ItemId::PRAYER_POTION_4,
            ItemId::PRAYER_POTION_3,
            ItemId::PRAYER_POTION_2,
            ItemId::PRAYER_POTION_1,
        ];
        catalog.insert_potion_doses("Health potion", &health_doses, ConsumableEffect::RestoreHealth(20));
        catalog.insert_potion_doses("Prayer potion", &prayer_doses, ConsumableEffect::RestorePrayer(20));

        catalog.insert(
            ItemId::EMPTY_VIAL,
            ItemData {
                name: "Vial".to_string(),
                description: "An empty vial.".to_string(),
                kind: ItemKind::Other,
            },
        );

        catalog
    }

    /// `doses` runs from most to fewest; the last dose leaves an empty vial.
    fn insert_potion_doses(&mut self, name: &str, doses: &[ItemId; 4], effect: ConsumableEffect) {
        for (i, &id) in doses.iter().enumerate() {
            let remaining = doses.len() - i;
            let becomes = doses.get(i + 1).copied().unwrap_or(ItemId::EMPTY_VIAL);
            self.insert(
                id,
                ItemData {
                    name: format!("{name} ({remaining})"),
                    description: format!("{remaining} doses of {}.", name.to_lowercase()),
                    kind: ItemKind::Consumable(ConsumableData {
                        effect,
                        becomes: Some(becomes),
                    }),
                },
            );
        }
    }
}

fn weapon_style(name: &str, speed: u32, range: u32) -> WeaponStyle {
    WeaponStyle {
        name: name.to_string(),
        speed,
        range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_contents() {
        let catalog = ItemCatalog::standard();
        assert_eq!(catalog.len(), 12);

        let bow = catalog.equipment(ItemId::TWISTED_BOW).unwrap();
        assert!(bow.is_weapon());
        assert_eq!(bow.equip_slots, vec![EquipmentSlot::MainHand, EquipmentSlot::OffHand]);
        assert_eq!(bow.attack_styles[0].speed, 6);
        assert_eq!(bow.attack_styles[0].range, 10);

        let body = catalog.equipment(ItemId::MASORI_BODY).unwrap();
        assert!(!body.is_weapon());
        assert_eq!(body.prayer_bonus, 1);
    }

    #[test]
    fn test_potion_dose_chain() {
        let catalog = ItemCatalog::standard();
        let mut id = ItemId::HEALTH_POTION_4;
        let mut drinks = 0;
        while let Some(data) = catalog.consumable(id).unwrap() {
            assert_eq!(data.effect, ConsumableEffect::RestoreHealth(20));
            id = data.becomes.unwrap();
            drinks += 1;
        }
        assert_eq!(drinks, 4);
        assert_eq!(id, ItemId::EMPTY_VIAL);
    }

    #[test]
    fn test_lookup_errors() {
        let catalog = ItemCatalog::standard();
        assert_eq!(catalog.get(ItemId(99)).unwrap_err(), GameError::UnknownItem(ItemId(99)));
        assert_eq!(
            catalog.equipment(ItemId::EMPTY_VIAL).unwrap_err(),
            GameError::NotEquippable(ItemId::EMPTY_VIAL)
        );
    }

    #[test]
    fn test_requirements() {
        let requirements = Requirements {
            ranged: 85,
            ..Requirements::default()
        };
        let mut offense = OffensiveStats {
            ranged_level: 84,
            ..OffensiveStats::default()
        };
        let defense = DefensiveStats::default();
        assert!(!requirements.met_by(&offense, &defense));
        offense.ranged_level = 85;
        assert!(requirements.met_by(&offense, &defense));
    }

    #[test]
    fn test_catalog_from_ron() {
        let source = r#"{
            12: (name: "Vial", kind: Other),
            40: (
                name: "Cape",
                kind: Equipment((
                    defence_bonuses: (stab: 1, slash: 1, crush: 1, ranged: 1, magic: 1),
                    equip_slots: [Cape],
                )),
            ),
        }"#;
        let catalog = ItemCatalog::from_ron_str(source).unwrap();
        assert_eq!(catalog.len(), 2);
        let cape = catalog.equipment(ItemId(40)).unwrap();
        assert_eq!(cape.requirements, Requirements::default());
        assert_eq!(cape.equip_slots, vec![EquipmentSlot::Cape]);
    }
}
