//! The wave instance: spawn a wave, wait for it to be cleared, cool down,
//! spawn the next.
//!
//! The instance is a pure state machine. It decides *what* to spawn and
//! *where*; the engine creates the entities.

use serde::{Deserialize, Serialize};

use crate::data::{MonsterKind, WaveConfig};
use crate::error::Result;
use crate::math::TilePos;
use crate::rng::{shuffle, RandomSource};

/// Monsters to create this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveSpawn {
    /// Wave number, starting at 1.
    pub wave: u32,
    /// Kind and NW tile of each monster.
    pub monsters: Vec<(MonsterKind, TilePos)>,
}

/// Outcome of one instance tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaveProgress {
    /// Wave that was just cleared.
    pub cleared: Option<u32>,
    /// Wave to spawn now.
    pub spawn: Option<WaveSpawn>,
    /// Set on the tick the last wave is cleared.
    pub complete: bool,
}

/// Wave progression state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveInstance {
    config: WaveConfig,
    /// Current (or next, while cooling down) wave number.
    wave: u32,
    cooldown_remaining: u32,
    /// Current wave is cleared and the cooldown is running.
    finished: bool,
    complete: bool,
}

impl WaveInstance {
    /// Fresh instance. The first wave spawns once the cooldown has elapsed.
    ///
    /// Fails when a wave has more monsters than there are spawn points.
    pub fn new(config: WaveConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::armed(config))
    }

    fn armed(config: WaveConfig) -> Self {
        let cooldown_remaining = config.cooldown_ticks;
        let complete = config.waves.is_empty();
        Self {
            config,
            wave: 1,
            cooldown_remaining,
            finished: true,
            complete,
        }
    }

    /// Current wave number.
    #[must_use]
    pub const fn wave(&self) -> u32 {
        self.wave
    }

    /// Number of waves in the instance.
    #[must_use]
    pub fn wave_count(&self) -> usize {
        self.config.waves.len()
    }

    /// Ticks until the next wave spawns, if cooling down.
    #[must_use]
    pub const fn cooldown_remaining(&self) -> Option<u32> {
        if self.finished && !self.complete {
            Some(self.cooldown_remaining)
        } else {
            None
        }
    }

    /// Whether every wave has been cleared.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &WaveConfig {
        &self.config
    }

    /// Advance by one tick given how many NPCs are still alive.
    pub fn tick(&mut self, npcs_alive: usize, rng: &mut dyn RandomSource) -> WaveProgress {
        let mut progress = WaveProgress::default();
        if self.complete {
            return progress;
        }

        if !self.finished && npcs_alive == 0 {
            progress.cleared = Some(self.wave);
            self.finished = true;
            self.wave += 1;
            if self.wave as usize > self.config.waves.len() {
                self.complete = true;
                progress.complete = true;
                tracing::debug!(waves = self.config.waves.len(), "Instance complete");
                return progress;
            }
        }

        if self.finished {
            self.cooldown_remaining = self.cooldown_remaining.saturating_sub(1);
            if self.cooldown_remaining == 0 {
                progress.spawn = Some(self.start_wave(rng));
            }
        }
        progress
    }

    fn start_wave(&mut self, rng: &mut dyn RandomSource) -> WaveSpawn {
        self.cooldown_remaining = self.config.cooldown_ticks;
        self.finished = false;

        let mut points = self.config.spawn_points.clone();
        shuffle(rng, &mut points);

        let monsters = self
            .config
            .waves
            .get(self.wave as usize - 1)
            .map(|table| table.kinds().zip(points).collect())
            .unwrap_or_default();
        tracing::debug!(wave = self.wave, "Wave started");
        WaveSpawn {
            wave: self.wave,
            monsters,
        }
    }
}

impl Default for WaveInstance {
    fn default() -> Self {
        Self::armed(WaveConfig::standard())
    }
}
