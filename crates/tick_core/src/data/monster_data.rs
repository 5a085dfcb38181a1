//! Monster definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::combat::{AttackStyle, DamageSubType, StyleBonuses};
use crate::components::{DefensiveStats, OffensiveStats};
use crate::error::{GameError, Result};

/// The monster types the wave instance can spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MonsterKind {
    /// Small, fast-firing ranged flyer.
    Bat,
    /// 3x3 long-range brawler.
    SmallMelee,
    /// 4x4 melee bruiser.
    BigMelee,
    /// 3x3 archer.
    BigRanged,
    /// 4x4 mage.
    BigMage,
}

impl MonsterKind {
    /// Every kind, in spawn-table order.
    pub const ALL: [Self; 5] = [
        Self::Bat,
        Self::SmallMelee,
        Self::BigMelee,
        Self::BigRanged,
        Self::BigMage,
    ];
}

/// Static stats of one monster kind.
///
/// # Example RON
///
/// ```ron
/// MonsterData(
///     name: "Bat",
///     size: 2,
///     health: 25,
///     levels: (attack: 0, strength: 0, defence: 55, ranged: 120, magic: 120),
///     attack_bonuses: (stab: 0, slash: 0, crush: 0, ranged: 30, magic: 0),
///     ranged_strength: 30,
///     defence_bonuses: (stab: 30, slash: 30, crush: 30, ranged: 45, magic: -20),
///     attack_range: 4,
///     attack_cooldown: 3,
///     attack_style: Ranged(projectile_ticks: 3),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterData {
    /// Display name.
    pub name: String,
    /// Footprint edge length in tiles (footprints are square).
    pub size: u32,
    /// Hitpoints.
    pub health: u32,
    /// Combat levels.
    pub levels: CombatLevels,
    /// Accuracy bonuses.
    #[serde(default)]
    pub attack_bonuses: StyleBonuses,
    /// Melee strength bonus.
    #[serde(default)]
    pub melee_strength: i32,
    /// Ranged strength bonus.
    #[serde(default)]
    pub ranged_strength: i32,
    /// Magic damage bonus.
    #[serde(default)]
    pub magic_damage: i32,
    /// Defence bonuses.
    #[serde(default)]
    pub defence_bonuses: StyleBonuses,
    /// Attack range in tiles.
    pub attack_range: u32,
    /// Ticks between attacks.
    pub attack_cooldown: u32,
    /// How attacks are delivered.
    pub attack_style: AttackStyle,
}

/// Combat levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatLevels {
    /// Attack level.
    pub attack: i32,
    /// Strength level.
    pub strength: i32,
    /// Defence level.
    pub defence: i32,
    /// Ranged level.
    pub ranged: i32,
    /// Magic level.
    pub magic: i32,
}

impl MonsterData {
    /// Offensive stats for a freshly spawned monster.
    #[must_use]
    pub fn offensive_stats(&self) -> OffensiveStats {
        OffensiveStats {
            attack_level: self.levels.attack,
            strength_level: self.levels.strength,
            magic_level: self.levels.magic,
            ranged_level: self.levels.ranged,
            attack_bonuses: self.attack_bonuses,
            melee_strength: self.melee_strength,
            ranged_strength: self.ranged_strength,
            magic_damage: self.magic_damage,
            prayer_bonus: 0,
            attack_range: self.attack_range,
            attack_cooldown: self.attack_cooldown,
            ticks_until_can_attack: 0,
            base_attack_range: self.attack_range,
            base_attack_cooldown: self.attack_cooldown,
            attack_style: self.attack_style,
        }
    }

    /// Defensive stats for a freshly spawned monster.
    #[must_use]
    pub fn defensive_stats(&self) -> DefensiveStats {
        DefensiveStats {
            defence_level: self.levels.defence,
            magic_level: self.levels.magic,
            defence_bonuses: self.defence_bonuses,
        }
    }
}

/// Static monster lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterCatalog {
    monsters: BTreeMap<MonsterKind, MonsterData>,
}

impl MonsterCatalog {
    /// Data for `kind`.
    pub fn get(&self, kind: MonsterKind) -> Result<&MonsterData> {
        self.monsters
            .get(&kind)
            .ok_or_else(|| GameError::InvalidState(format!("no monster data for {kind:?}")))
    }

    /// Parse from RON (a map of kind to data).
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let monsters = ron::from_str(source).map_err(|e| GameError::DataParseError {
            source_name: "monster catalog".to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { monsters })
    }

    /// The five shipped monsters.
    #[must_use]
    pub fn standard() -> Self {
        let monsters = BTreeMap::from([
            (
                MonsterKind::Bat,
                MonsterData {
                    name: "Bat".to_string(),
                    size: 2,
                    health: 25,
                    levels: CombatLevels {
                        attack: 0,
                        strength: 0,
                        defence: 55,
                        ranged: 120,
                        magic: 120,
                    },
                    attack_bonuses: StyleBonuses {
                        ranged: 30,
                        ..StyleBonuses::default()
                    },
                    melee_strength: 0,
                    ranged_strength: 30,
                    magic_damage: 0,
                    defence_bonuses: StyleBonuses {
                        stab: 30,
                        slash: 30,
                        crush: 30,
                        ranged: 45,
                        magic: -20,
                    },
                    attack_range: 4,
                    attack_cooldown: 3,
                    attack_style: AttackStyle::RANGED,
                },
            ),
            (
                MonsterKind::SmallMelee,
                MonsterData {
                    name: "Small melee".to_string(),
                    size: 3,
                    health: 40,
                    levels: CombatLevels {
                        attack: 160,
                        strength: 160,
                        defence: 95,
                        ranged: 160,
                        magic: 160,
                    },
                    attack_bonuses: StyleBonuses {
                        ranged: 45,
                        magic: 45,
                        ..StyleBonuses::default()
                    },
                    melee_strength: 45,
                    ranged_strength: 45,
                    magic_damage: 45,
                    defence_bonuses: StyleBonuses::uniform(25),
                    attack_range: 10,
                    attack_cooldown: 6,
                    attack_style: AttackStyle::RANGED,
                },
            ),
            (
                MonsterKind::BigMelee,
                MonsterData {
                    name: "Big melee".to_string(),
                    size: 4,
                    health: 75,
                    levels: CombatLevels {
                        attack: 210,
                        strength: 290,
                        defence: 95,
                        ranged: 220,
                        magic: 120,
                    },
                    attack_bonuses: StyleBonuses {
                        magic: 45,
                        ..StyleBonuses::default()
                    },
                    melee_strength: 40,
                    ranged_strength: 0,
                    magic_damage: 0,
                    defence_bonuses: StyleBonuses {
                        stab: 65,
                        slash: 65,
                        crush: 65,
                        ranged: 50,
                        magic: 30,
                    },
                    attack_range: 1,
                    attack_cooldown: 4,
                    attack_style: AttackStyle::Melee(DamageSubType::Crush),
                },
            ),
            (
                MonsterKind::BigRanged,
                MonsterData {
                    name: "Big ranged".to_string(),
                    size: 3,
                    health: 125,
                    levels: CombatLevels {
                        attack: 140,
                        strength: 180,
                        defence: 60,
                        ranged: 250,
                        magic: 90,
                    },
                    attack_bonuses: StyleBonuses {
                        ranged: 40,
                        ..StyleBonuses::default()
                    },
                    melee_strength: 0,
                    ranged_strength: 50,
                    magic_damage: 0,
                    defence_bonuses: StyleBonuses::default(),
                    attack_range: 15,
                    attack_cooldown: 4,
                    attack_style: AttackStyle::RANGED,
                },
            ),
            (
                MonsterKind::BigMage,
                MonsterData {
                    name: "Big mage".to_string(),
                    size: 4,
                    health: 220,
                    levels: CombatLevels {
                        attack: 370,
                        strength: 510,
                        defence: 260,
                        ranged: 510,
                        magic: 300,
                    },
                    attack_bonuses: StyleBonuses {
                        magic: 80,
                        ..StyleBonuses::default()
                    },
                    melee_strength: 0,
                    ranged_strength: 0,
                    magic_damage: 0,
                    defence_bonuses: StyleBonuses::default(),
                    attack_range: 15,
                    attack_cooldown: 4,
                    attack_style: AttackStyle::MAGIC,
                },
            ),
        ]);
        Self { monsters }
    }
}

impl Default for MonsterCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
