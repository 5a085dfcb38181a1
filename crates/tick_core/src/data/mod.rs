//! Static data tables: items, monsters, waves and the player template.
//!
//! Every table is a plain serde type with a built-in `standard()` set
//! matching the shipped content, and can also be parsed from RON.
//!
//! **Note:** This module contains no IO. Callers read files and hand the
//! text to the `from_ron_str` constructors.

mod item_data;
mod monster_data;
mod player_data;
mod wave_data;

pub use item_data::{
    ConsumableData, ConsumableEffect, EquipmentData, ItemCatalog, ItemData, ItemId, ItemKind,
    Requirements, WeaponStyle,
};
pub use monster_data::{CombatLevels, MonsterCatalog, MonsterData, MonsterKind};
pub use player_data::PlayerTemplate;
pub use wave_data::{WaveConfig, WaveTable};
