//! Wave tables for the wave instance.

use serde::{Deserialize, Serialize};

use super::monster_data::MonsterKind;
use crate::error::{GameError, Result};
use crate::math::TilePos;

/// Monsters spawned by one wave, in spawn order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveTable {
    /// `(kind, count)` pairs.
    pub spawns: Vec<(MonsterKind, u32)>,
}

impl WaveTable {
    /// Total monsters in the wave.
    #[must_use]
    pub fn monster_count(&self) -> u32 {
        self.spawns.iter().map(|&(_, count)| count).sum()
    }

    /// Kinds to spawn, one entry per monster.
    pub fn kinds(&self) -> impl Iterator<Item = MonsterKind> + '_ {
        self.spawns
            .iter()
            .flat_map(|&(kind, count)| std::iter::repeat(kind).take(count as usize))
    }
}

/// Wave instance configuration.
///
/// # Example RON
///
/// ```ron
/// WaveConfig(
///     cooldown_ticks: 10,
///     spawn_points: [(x: 2, y: 3), (x: 23, y: 3)],
///     waves: [
///         (spawns: [(Bat, 1)]),
///         (spawns: [(Bat, 1), (SmallMelee, 1)]),
///     ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveConfig {
    /// Ticks between clearing a wave and spawning the next (also before the first).
    pub cooldown_ticks: u32,
    /// NW tiles monsters may spawn on. Shuffled each wave.
    pub spawn_points: Vec<TilePos>,
    /// Waves in order.
    pub waves: Vec<WaveTable>,
}

impl WaveConfig {
    /// The shipped five-wave table for the test cave.
    #[must_use]
    pub fn standard() -> Self {
        use MonsterKind::{Bat, BigMage, BigMelee, BigRanged, SmallMelee};

        let everything = WaveTable {
            spawns: vec![(Bat, 1), (SmallMelee, 1), (BigMelee, 1), (BigRanged, 1), (BigMage, 1)],
        };
        Self {
            cooldown_ticks: 10,
            spawn_points: vec![
                TilePos::new(2, 3),
                TilePos::new(23, 3),
                TilePos::new(4, 9),
                TilePos::new(24, 10),
                TilePos::new(17, 15),
                TilePos::new(6, 18),
                TilePos::new(2, 20),
                TilePos::new(24, 17),
            ],
            waves: vec![
                WaveTable {
                    spawns: vec![(Bat, 1)],
                },
                WaveTable {
                    spawns: vec![(Bat, 1), (SmallMelee, 1)],
                },
                WaveTable {
                    spawns: vec![(Bat, 1), (SmallMelee, 1), (BigMelee, 1)],
                },
                everything.clone(),
                everything,
            ],
        }
    }

    /// Check that every wave fits on the spawn points.
    pub fn validate(&self) -> Result<()> {
        for (i, wave) in self.waves.iter().enumerate() {
            if wave.monster_count() as usize > self.spawn_points.len() {
                return Err(GameError::DataParseError {
                    source_name: "wave config".to_string(),
                    message: format!(
                        "wave {} spawns {} monsters but there are only {} spawn points",
                        i + 1,
                        wave.monster_count(),
                        self.spawn_points.len()
                    ),
                });
            }
        }
        Ok(())
    }

    /// Parse from RON and validate.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let config: Self = ron::from_str(source).map_err(|e| GameError::DataParseError {
            source_name: "wave config".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self::standard()
    }
}
