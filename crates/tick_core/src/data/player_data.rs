//! Starting stats of the player character.

use serde::{Deserialize, Serialize};

use super::monster_data::CombatLevels;

/// Stats the player spawns with, before any equipment.
///
/// # Example RON
///
/// ```ron
/// PlayerTemplate(
///     health: 99,
///     prayer: 99,
///     stamina: 100,
///     stamina_regen: 1,
///     running: true,
///     base_speed: 1,
///     levels: (attack: 99, strength: 99, defence: 99, ranged: 99, magic: 99),
/// )
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerTemplate {
    /// Hitpoints.
    #[serde(default = "default_health")]
    pub health: u32,
    /// Prayer points.
    #[serde(default = "default_prayer")]
    pub prayer: u32,
    /// Run energy.
    #[serde(default = "default_stamina")]
    pub stamina: u32,
    /// Run energy regained per idle tick.
    #[serde(default = "default_stamina_regen")]
    pub stamina_regen: u32,
    /// Whether run starts switched on.
    #[serde(default = "default_running")]
    pub running: bool,
    /// Walking speed in tiles per tick.
    #[serde(default = "default_base_speed")]
    pub base_speed: u32,
    /// Combat levels.
    #[serde(default = "default_levels")]
    pub levels: CombatLevels,
}

const fn default_health() -> u32 {
    99
}

const fn default_prayer() -> u32 {
    99
}

const fn default_stamina() -> u32 {
    100
}

const fn default_stamina_regen() -> u32 {
    1
}

const fn default_running() -> bool {
    true
}

const fn default_base_speed() -> u32 {
    1
}

const fn default_levels() -> CombatLevels {
    CombatLevels {
        attack: 99,
        strength: 99,
        defence: 99,
        ranged: 99,
        magic: 99,
    }
}

impl Default for PlayerTemplate {
    fn default() -> Self {
        Self {
            health: default_health(),
            prayer: default_prayer(),
            stamina: default_stamina(),
            stamina_regen: default_stamina_regen(),
            running: default_running(),
            base_speed: default_base_speed(),
            levels: default_levels(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_ron_uses_defaults() {
        let template: PlayerTemplate = ron::from_str("(health: 50, running: false)").unwrap();
        assert_eq!(template.health, 50);
        assert!(!template.running);
        assert_eq!(template.prayer, 99);
        assert_eq!(template.levels.ranged, 99);
    }
}
