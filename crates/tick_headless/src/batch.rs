//! Batch game runner for wave-run statistics.
//!
//! Runs many autopiloted games in parallel using rayon and folds their
//! metrics into a [`BatchSummary`].

use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tick_core::components::ItemDetails;
use tracing::{debug, info, warn};

use crate::autopilot::Autopilot;
use crate::metrics::{BatchSummary, GameMetrics, MetricsCollector};
use crate::runner::game_result;
use crate::scenario::{Scenario, ScenarioError};

/// Configuration for a batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of games to run
    pub game_count: u32,
    /// Maximum parallel games (0 = use rayon default)
    pub parallel_games: u32,
    /// Starting seed for deterministic runs
    pub seed_start: u64,
    /// Autopilot used by every game
    pub autopilot: Autopilot,
    /// Output directory for results
    pub output_dir: Option<PathBuf>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            game_count: 100,
            parallel_games: 0,
            seed_start: 0,
            autopilot: Autopilot::default(),
            output_dir: None,
        }
    }
}

impl BatchConfig {
    /// Config for `game_count` games
    #[must_use]
    pub fn new(game_count: u32) -> Self {
        Self {
            game_count,
            ..Default::default()
        }
    }

    /// Set seed start
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set output directory
    #[must_use]
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = Some(dir);
        self
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Scenario name
    pub scenario: String,
    /// Configuration used
    pub config: BatchConfig,
    /// Individual game metrics, in seed order
    pub games: Vec<GameMetrics>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Error during batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Seed used
    pub seed: u64,
    /// Error message
    pub message: String,
}

/// Play one autopiloted game of `scenario` with `seed` to the end.
pub fn run_game(
    scenario: &Scenario,
    seed: u64,
    autopilot: Autopilot,
) -> Result<GameMetrics, ScenarioError> {
    let mut engine = scenario.build_engine(seed)?;
    let mut pilot = autopilot;
    let mut collector = MetricsCollector::new();

    let result = loop {
        if let Some(result) = game_result(&engine, scenario.max_ticks) {
            break result;
        }

        let plan = pilot.plan(&mut engine)?;
        let drink = plan
            .drink
            .map(|item| engine.world().get_component::<ItemDetails>(item).map(|d| (item, d.item)))
            .transpose()?;

        let events = engine.tick()?;
        collector.record_tick(&engine, &events);

        if let Some((item, before)) = drink {
            let after = engine.world().try_get_component::<ItemDetails>(item).map(|d| d.item);
            if after != Some(before) {
                collector.record_potion();
            }
        }
    };

    let metrics = collector.finish(
        &engine,
        format!("game_{seed}"),
        scenario.name.clone(),
        seed,
        result,
    );
    debug!(
        seed,
        %result,
        ticks = metrics.duration_ticks,
        waves = metrics.waves_cleared,
        "Game finished"
    );
    Ok(metrics)
}

/// Run a batch of games
pub fn run_batch(scenario: &Scenario, config: BatchConfig) -> BatchResults {
    let start = Instant::now();
    info!(
        "Starting batch run: {} games of '{}'",
        config.game_count, scenario.name
    );

    // Configure thread pool if specified
    if config.parallel_games > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_games as usize)
            .build_global()
            .ok(); // Ignore if already set
    }

    let results: Vec<Result<GameMetrics, BatchError>> = (0..config.game_count)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed_start.wrapping_add(u64::from(i));
            run_game(scenario, seed, config.autopilot).map_err(|e| {
                warn!("Game with seed {} failed: {}", seed, e);
                BatchError {
                    seed,
                    message: e.to_string(),
                }
            })
        })
        .collect();

    let (games, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let games: Vec<GameMetrics> = games.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_games(&games);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} games in {:.1}s ({:.1} games/sec)",
        games.len(),
        duration_seconds,
        games.len() as f64 / duration_seconds.max(f64::EPSILON)
    );

    BatchResults {
        scenario: scenario.name.clone(),
        config,
        games,
        summary,
        duration_seconds,
        errors,
    }
}

/// Verify determinism by running the same seed several times.
///
/// Every run must end with the same result, duration and state hash.
pub fn verify_determinism(
    scenario: &Scenario,
    seed: u64,
    runs: u32,
) -> Result<bool, ScenarioError> {
    let results = (0..runs.max(1))
        .map(|_| run_game(scenario, seed, Autopilot::default()))
        .collect::<Result<Vec<_>, _>>()?;

    let first = &results[0];
    Ok(results.iter().all(|r| {
        r.result == first.result
            && r.duration_ticks == first.duration_ticks
            && r.final_state_hash == first.final_state_hash
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::GameResult;
    use tick_core::data::{ItemId, MonsterKind, WaveConfig, WaveTable};
    use tick_core::math::TilePos;
    use tick_core::tile_map::TileMapData;

    /// One bat in an open room against a fully geared player.
    fn bat_room() -> Scenario {
        Scenario {
            name: "Bat room".to_string(),
            tile_map: TileMapData::open(12, 12),
            player_start: TilePos::new(1, 1),
            starting_items: vec![ItemId::TWISTED_BOW, ItemId::HEALTH_POTION_4],
            waves: WaveConfig {
                cooldown_ticks: 2,
                spawn_points: vec![TilePos::new(8, 8)],
                waves: vec![WaveTable {
                    spawns: vec![(MonsterKind::Bat, 1)],
                }],
            },
            max_ticks: 300,
            ..Scenario::wave_test()
        }
    }

    #[test]
    fn test_batch_config_builder() {
        let config = BatchConfig::new(500)
            .with_output(PathBuf::from("/tmp/results"))
            .with_seed(12345);

        assert_eq!(config.game_count, 500);
        assert_eq!(config.seed_start, 12345);
        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/results")));
    }

    #[test]
    fn test_run_game_wins_bat_room() {
        let metrics = run_game(&bat_room(), 3, Autopilot::default()).unwrap();
        assert_eq!(metrics.result, GameResult::Victory);
        assert_eq!(metrics.kills[&MonsterKind::Bat], 1);
        assert_eq!(metrics.waves_cleared, 1);
        assert!(metrics.damage_dealt >= 25);
        assert!(metrics.duration_ticks < 300);
    }

    #[test]
    fn test_run_batch_small() {
        let results = run_batch(&bat_room(), BatchConfig::new(8).with_seed(100));

        assert_eq!(results.games.len(), 8);
        assert!(results.errors.is_empty());
        assert_eq!(results.summary.total_games, 8);
        assert_eq!(results.summary.victories, 8);
        let seeds: Vec<u64> = results.games.iter().map(|g| g.seed).collect();
        assert_eq!(seeds, (100..108).collect::<Vec<_>>());
    }

    #[test]
    fn test_bad_scenario_is_reported() {
        let scenario = Scenario {
            player_start: TilePos::new(-5, 0),
            ..bat_room()
        };
        let results = run_batch(&scenario, BatchConfig::new(2));
        assert!(results.games.is_empty());
        assert_eq!(results.errors.len(), 2);
    }

    #[test]
    fn test_verify_determinism() {
        assert!(verify_determinism(&bat_room(), 12345, 3).unwrap());
    }

    #[test]
    fn test_batch_results_save_load() {
        let results = run_batch(&bat_room(), BatchConfig::new(3));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("results.json");

        results.save(&path).unwrap();
        assert!(path.exists());

        let loaded = BatchResults::load(&path).unwrap();
        assert_eq!(loaded.games, results.games);
        assert_eq!(loaded.scenario, "Bat room");
    }
}
