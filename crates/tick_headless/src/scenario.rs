//! Scenario loading and engine setup.
//!
//! A scenario fixes everything about a game except the seed: the map, where
//! the player starts, what they carry and the wave table.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tick_core::data::{ItemId, PlayerTemplate, WaveConfig};
use tick_core::engine::Engine;
use tick_core::error::GameError;
use tick_core::instance::WaveInstance;
use tick_core::math::TilePos;
use tick_core::tile_map::{TileMap, TileMapData};

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// The engine rejected the scenario contents.
    #[error("Invalid scenario: {0}")]
    Engine(#[from] GameError),
}

/// A complete scenario configuration.
///
/// # Example RON
///
/// ```ron
/// Scenario(
///     name: "Bat practice",
///     description: "One bat in an open room",
///     seed: 7,
///     tile_map: TileMapData(cols: 10, rows: 10, tile_size: 64, tiles: [...], tile_info: {...}),
///     player_start: (x: 1, y: 1),
///     starting_items: [1, 4],
///     waves: WaveConfig(cooldown_ticks: 5, spawn_points: [(x: 7, y: 7)], waves: [(spawns: [(Bat, 1)])]),
///     max_ticks: 500,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Seed used when the caller does not pick one.
    #[serde(default)]
    pub seed: u64,
    /// Terrain.
    pub tile_map: TileMapData,
    /// Player NW tile.
    pub player_start: TilePos,
    /// Player stats.
    #[serde(default)]
    pub player: PlayerTemplate,
    /// Items placed in the inventory before the first tick, in slot order.
    #[serde(default)]
    pub starting_items: Vec<ItemId>,
    /// Wave table.
    pub waves: WaveConfig,
    /// Ticks before the game is called a timeout.
    pub max_ticks: u64,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::wave_test()
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        scenario.waves.validate()?;
        Ok(scenario)
    }

    /// Serialize to pretty RON.
    pub fn to_ron_string(&self) -> Result<String, ScenarioError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()).map_err(|e| {
            ScenarioError::Engine(GameError::DataParseError {
                source_name: "scenario".to_string(),
                message: e.to_string(),
            })
        })
    }

    /// The standard five-wave run in the test cave, fully geared.
    #[must_use]
    pub fn wave_test() -> Self {
        Self {
            name: "Wave Test".to_string(),
            description: "Five waves in the test cave with a twisted bow, masori and potions"
                .to_string(),
            seed: 0,
            tile_map: TileMapData::test_cave(),
            player_start: TilePos::new(14, 13),
            player: PlayerTemplate::default(),
            starting_items: vec![
                ItemId::TWISTED_BOW,
                ItemId::MASORI_BODY,
                ItemId::MASORI_CHAPS,
                ItemId::HEALTH_POTION_4,
                ItemId::HEALTH_POTION_4,
                ItemId::HEALTH_POTION_4,
            ],
            waves: WaveConfig::standard(),
            max_ticks: 3000,
        }
    }

    /// Build an engine ready for its first tick.
    ///
    /// The player is spawned, the starting items are placed in the
    /// inventory and the wave instance is armed.
    pub fn build_engine(&self, seed: u64) -> Result<Engine, ScenarioError> {
        let map = TileMap::new(self.tile_map.clone())?;
        let mut engine = Engine::with_seed(map, seed)?;
        engine.spawn_player(self.player_start, &self.player)?;
        for &item in &self.starting_items {
            engine.give_player_item(item)?;
        }
        engine.set_instance(WaveInstance::new(self.waves.clone())?);

        tracing::debug!(
            scenario = %self.name,
            seed,
            items = self.starting_items.len(),
            "Scenario loaded"
        );
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tick_core::components::Inventory;
    use tick_core::data::{MonsterKind, WaveTable};

    fn bat_room() -> Scenario {
        Scenario {
            name: "Bat room".to_string(),
            description: String::new(),
            seed: 3,
            tile_map: TileMapData::open(10, 10),
            player_start: TilePos::new(1, 1),
            player: PlayerTemplate::default(),
            starting_items: vec![ItemId::TWISTED_BOW],
            waves: WaveConfig {
                cooldown_ticks: 2,
                spawn_points: vec![TilePos::new(7, 7)],
                waves: vec![WaveTable {
                    spawns: vec![(MonsterKind::Bat, 1)],
                }],
            },
            max_ticks: 200,
        }
    }

    #[test]
    fn test_wave_test_builds() {
        let scenario = Scenario::wave_test();
        let engine = scenario.build_engine(scenario.seed).unwrap();
        let player = engine.player().unwrap();
        let inventory = engine.world().get_component::<Inventory>(player).unwrap();
        assert_eq!(
            inventory.slots.iter().filter(|s| s.is_some()).count(),
            scenario.starting_items.len()
        );
        assert_eq!(engine.instance().unwrap().wave_count(), 5);
    }

    #[test]
    fn test_ron_roundtrip() {
        let scenario = bat_room();
        let text = scenario.to_ron_string().unwrap();
        let parsed = Scenario::from_ron_str(&text).unwrap();
        assert_eq!(parsed, scenario);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bat_room.ron");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(bat_room().to_ron_string().unwrap().as_bytes())
            .unwrap();

        let loaded = Scenario::load(&path).unwrap();
        assert_eq!(loaded.name, "Bat room");
        assert_eq!(loaded.max_ticks, 200);
    }

    #[test]
    fn test_missing_file() {
        let err = Scenario::load("/definitely/not/here.ron").unwrap_err();
        assert!(matches!(err, ScenarioError::FileNotFound(_)));
    }

    #[test]
    fn test_bad_ron() {
        let err = Scenario::from_ron_str("Scenario(name: ").unwrap_err();
        assert!(matches!(err, ScenarioError::ParseError(_)));
    }

    #[test]
    fn test_too_few_spawn_points_rejected() {
        let mut scenario = bat_room();
        scenario.waves.waves[0].spawns = vec![(MonsterKind::Bat, 3)];
        let text = scenario.to_ron_string().unwrap();

        assert!(matches!(
            Scenario::from_ron_str(&text),
            Err(ScenarioError::Engine(GameError::DataParseError { .. }))
        ));
        assert!(matches!(
            scenario.build_engine(0),
            Err(ScenarioError::Engine(GameError::DataParseError { .. }))
        ));
    }

    #[test]
    fn test_player_outside_map_rejected() {
        let mut scenario = bat_room();
        scenario.player_start = TilePos::new(40, 40);
        assert!(matches!(
            scenario.build_engine(0),
            Err(ScenarioError::Engine(_))
        ));
    }
}
