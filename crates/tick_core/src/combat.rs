//! Accuracy and damage formulas.
//!
//! Everything here is a pure function of stat records plus an injected
//! [`RandomSource`]:
//! - attack roll: `(level + 8) * (bonus + 64)`
//! - defence roll: same shape, magic defence blends 30% defence with 70% magic
//! - hit chance from the two rolls
//! - max hit: `floor(((level + 8) * (strength + 64) + 320) / 640)`
//! - damage: 0 on a miss or a matching protection prayer, else uniform in
//!   `[1, max_hit]`

use serde::{Deserialize, Serialize};

use crate::components::{DefensiveStats, OffensiveStats, Prayer, PrayerKind};
use crate::math::Fixed;
use crate::rng::RandomSource;

/// Ticks a projectile spends in flight unless the style says otherwise.
pub const DEFAULT_PROJECTILE_TICKS: u32 = 3;

/// The five damage sub-types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageSubType {
    /// Melee stab.
    Stab,
    /// Melee slash.
    Slash,
    /// Melee crush.
    Crush,
    /// Ranged.
    Ranged,
    /// Magic.
    Magic,
}

impl DamageSubType {
    /// All sub-types in declaration order.
    pub const ALL: [Self; 5] = [Self::Stab, Self::Slash, Self::Crush, Self::Ranged, Self::Magic];

    /// Whether this is one of the melee sub-types.
    #[must_use]
    pub const fn is_melee(self) -> bool {
        matches!(self, Self::Stab | Self::Slash | Self::Crush)
    }

    /// The protection prayer that blocks this sub-type.
    #[must_use]
    pub const fn protection(self) -> PrayerKind {
        match self {
            Self::Stab | Self::Slash | Self::Crush => PrayerKind::ProtectMelee,
            Self::Ranged => PrayerKind::ProtectRange,
            Self::Magic => PrayerKind::ProtectMagic,
        }
    }
}

/// One bonus per damage sub-type. Used for both attack and defence bonuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StyleBonuses {
    /// Stab bonus.
    pub stab: i32,
    /// Slash bonus.
    pub slash: i32,
    /// Crush bonus.
    pub crush: i32,
    /// Ranged bonus.
    pub ranged: i32,
    /// Magic bonus.
    pub magic: i32,
}

impl StyleBonuses {
    /// The same bonus for every sub-type.
    #[must_use]
    pub const fn uniform(value: i32) -> Self {
        Self {
            stab: value,
            slash: value,
            crush: value,
            ranged: value,
            magic: value,
        }
    }

    /// Bonus for `sub_type`.
    #[must_use]
    pub const fn get(&self, sub_type: DamageSubType) -> i32 {
        match sub_type {
            DamageSubType::Stab => self.stab,
            DamageSubType::Slash => self.slash,
            DamageSubType::Crush => self.crush,
            DamageSubType::Ranged => self.ranged,
            DamageSubType::Magic => self.magic,
        }
    }

    /// Add `other` component-wise.
    pub fn add(&mut self, other: &Self) {
        self.stab += other.stab;
        self.slash += other.slash;
        self.crush += other.crush;
        self.ranged += other.ranged;
        self.magic += other.magic;
    }

    /// Subtract `other` component-wise.
    pub fn subtract(&mut self, other: &Self) {
        self.stab -= other.stab;
        self.slash -= other.slash;
        self.crush -= other.crush;
        self.ranged -= other.ranged;
        self.magic -= other.magic;
    }
}

/// How an entity's attacks are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackStyle {
    /// Damage lands on the target's receiver immediately.
    Melee(DamageSubType),
    /// Fires a ranged projectile.
    Ranged {
        /// Flight time in ticks.
        projectile_ticks: u32,
    },
    /// Fires a magic projectile.
    Magic {
        /// Flight time in ticks.
        projectile_ticks: u32,
    },
}

impl AttackStyle {
    /// Ranged with the default flight time.
    pub const RANGED: Self = Self::Ranged {
        projectile_ticks: DEFAULT_PROJECTILE_TICKS,
    };

    /// Magic with the default flight time.
    pub const MAGIC: Self = Self::Magic {
        projectile_ticks: DEFAULT_PROJECTILE_TICKS,
    };

    /// Sub-type used for both rolls.
    #[must_use]
    pub const fn sub_type(self) -> DamageSubType {
        match self {
            Self::Melee(sub_type) => sub_type,
            Self::Ranged { .. } => DamageSubType::Ranged,
            Self::Magic { .. } => DamageSubType::Magic,
        }
    }

    /// Flight time, or `None` for melee.
    #[must_use]
    pub const fn projectile_ticks(self) -> Option<u32> {
        match self {
            Self::Melee(_) => None,
            Self::Ranged { projectile_ticks } | Self::Magic { projectile_ticks } => {
                Some(projectile_ticks)
            }
        }
    }
}

impl Default for AttackStyle {
    fn default() -> Self {
        Self::Melee(DamageSubType::Crush)
    }
}

/// Offensive level read for accuracy.
const fn accuracy_level(sub_type: DamageSubType, offense: &OffensiveStats) -> i32 {
    match sub_type {
        DamageSubType::Stab | DamageSubType::Slash | DamageSubType::Crush => offense.attack_level,
        DamageSubType::Ranged => offense.ranged_level,
        DamageSubType::Magic => offense.magic_level,
    }
}

/// Offensive level and strength bonus read for max hit.
const fn damage_level_and_bonus(sub_type: DamageSubType, offense: &OffensiveStats) -> (i32, i32) {
    match sub_type {
        DamageSubType::Stab | DamageSubType::Slash | DamageSubType::Crush => {
            (offense.strength_level, offense.melee_strength)
        }
        DamageSubType::Ranged => (offense.ranged_level, offense.ranged_strength),
        DamageSubType::Magic => (offense.magic_level, offense.magic_damage),
    }
}

/// Attacker's accuracy roll.
#[must_use]
pub fn attack_roll(sub_type: DamageSubType, offense: &OffensiveStats) -> Fixed {
    let effective_level = accuracy_level(sub_type, offense) + 8;
    let bonus = offense.attack_bonuses.get(sub_type) + 64;
    Fixed::from_num(i64::from(effective_level) * i64::from(bonus))
}

/// Defender's evasion roll.
#[must_use]
pub fn defence_roll(sub_type: DamageSubType, defense: &DefensiveStats) -> Fixed {
    let effective_level = match sub_type {
        DamageSubType::Magic => {
            let blended = 3 * i64::from(defense.defence_level) + 7 * i64::from(defense.magic_level);
            Fixed::from_num(blended) / Fixed::from_num(10)
        }
        _ => Fixed::from_num(defense.defence_level),
    } + Fixed::from_num(8);
    let bonus = defense.defence_bonuses.get(sub_type) + 64;
    effective_level * Fixed::from_num(bonus)
}

/// Probability that an attack with `attack` roll lands against `defence`.
///
/// Always within `[0, 1)`.
#[must_use]
pub fn hit_chance(attack: Fixed, defence: Fixed) -> Fixed {
    let one = Fixed::ONE;
    let two = Fixed::from_num(2);
    let chance = if attack > defence {
        one - (defence + two) / (two * (attack + one))
    } else {
        attack / (two * (defence + one))
    };
    chance.clamp(Fixed::ZERO, one)
}

/// Largest damage a successful hit can do. Never negative.
#[must_use]
pub fn max_hit(sub_type: DamageSubType, offense: &OffensiveStats) -> u32 {
    let (level, strength) = damage_level_and_bonus(sub_type, offense);
    let numerator = i64::from(level + 8) * i64::from(strength + 64) + 320;
    u32::try_from(numerator.div_euclid(640).max(0)).unwrap_or(u32::MAX)
}

/// Inputs to [`resolve_damage`].
#[derive(Debug, Clone, Copy)]
pub struct AttackContext<'a> {
    /// Attacker's stats.
    pub offense: &'a OffensiveStats,
    /// Defender's stats.
    pub defense: &'a DefensiveStats,
    /// Sub-type used for the accuracy roll and max hit.
    pub attack_sub_type: DamageSubType,
    /// Sub-type used for the defence roll.
    pub defence_sub_type: DamageSubType,
    /// Defender's prayers, if it has any.
    pub defender_prayer: Option<&'a Prayer>,
}

/// Roll one attack.
pub fn resolve_damage(rng: &mut dyn RandomSource, ctx: &AttackContext<'_>) -> u32 {
    let attack = attack_roll(ctx.attack_sub_type, ctx.offense);
    let defence = defence_roll(ctx.defence_sub_type, ctx.defense);
    let chance = hit_chance(attack, defence);

    let landed = rng.next_unit() < chance;
    let protected = ctx
        .defender_prayer
        .is_some_and(|prayer| prayer.is_active(ctx.attack_sub_type.protection()));

    if !landed || protected {
        return 0;
    }

    let max = max_hit(ctx.attack_sub_type, ctx.offense);
    if max == 0 {
        return 0;
    }
    rng.range_inclusive(1, max)
}
