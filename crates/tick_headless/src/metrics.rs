//! Game metrics collection for wave-run statistics.
//!
//! A [`MetricsCollector`] watches the events of every tick of one game and
//! produces [`GameMetrics`]; [`BatchSummary`] folds many of those.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tick_core::components::Health;
use tick_core::data::MonsterKind;
use tick_core::engine::Engine;
use tick_core::systems::TickEvents;

use crate::protocol::GameResult;

/// Complete metrics for a single game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMetrics {
    /// Unique game identifier.
    pub game_id: String,
    /// Scenario name.
    pub scenario: String,
    /// Random seed used.
    pub seed: u64,
    /// How the game ended.
    pub result: GameResult,
    /// Total game duration in ticks.
    pub duration_ticks: u64,
    /// Highest wave started.
    pub waves_reached: u32,
    /// Waves cleared.
    pub waves_cleared: u32,
    /// Monsters killed, by kind.
    pub kills: BTreeMap<MonsterKind, u32>,
    /// Damage rolls the player landed on monsters.
    pub damage_dealt: u64,
    /// Damage rolls monsters landed on the player.
    pub damage_taken: u64,
    /// Projectiles fired by anyone.
    pub projectiles_fired: u32,
    /// Health potion doses drunk.
    pub potions_used: u32,
    /// Player hitpoints at the end.
    pub final_health: u32,
    /// Final simulation state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl GameMetrics {
    /// Total monsters killed.
    #[must_use]
    pub fn total_kills(&self) -> u32 {
        self.kills.values().sum()
    }
}

/// Accumulates metrics tick by tick.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    waves_reached: u32,
    waves_cleared: u32,
    kills: BTreeMap<MonsterKind, u32>,
    damage_dealt: u64,
    damage_taken: u64,
    projectiles_fired: u32,
    potions_used: u32,
}

impl MetricsCollector {
    /// Empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Note a potion drunk by the player.
    pub fn record_potion(&mut self) {
        self.potions_used += 1;
    }

    /// Fold one tick's events.
    pub fn record_tick(&mut self, engine: &Engine, events: &TickEvents) {
        let player = engine.player();

        for hit in &events.damage {
            if Some(hit.source) == player {
                self.damage_dealt += u64::from(hit.amount);
            } else if Some(hit.target) == player {
                self.damage_taken += u64::from(hit.amount);
            }
        }
        for &(_, kind) in &events.npcs_removed {
            *self.kills.entry(kind).or_default() += 1;
        }
        self.projectiles_fired += u32::try_from(events.projectiles_fired.len()).unwrap_or(0);

        if let Some(wave) = events.wave_started {
            if wave > 1 {
                self.waves_cleared = self.waves_cleared.max(wave - 1);
            }
            self.waves_reached = self.waves_reached.max(wave);
        }
        if events.instance_complete {
            self.waves_cleared = self.waves_reached;
        }
    }

    /// Close out the game.
    #[must_use]
    pub fn finish(
        self,
        engine: &Engine,
        game_id: impl Into<String>,
        scenario: impl Into<String>,
        seed: u64,
        result: GameResult,
    ) -> GameMetrics {
        let final_health = engine
            .player()
            .and_then(|p| engine.world().try_get_component::<Health>(p))
            .map_or(0, |h| h.current);
        GameMetrics {
            game_id: game_id.into(),
            scenario: scenario.into(),
            seed,
            result,
            duration_ticks: engine.current_tick(),
            waves_reached: self.waves_reached,
            waves_cleared: self.waves_cleared,
            kills: self.kills,
            damage_dealt: self.damage_dealt,
            damage_taken: self.damage_taken,
            projectiles_fired: self.projectiles_fired,
            potions_used: self.potions_used,
            final_health,
            final_state_hash: engine.state_hash(),
        }
    }
}

/// Summary statistics for a batch of games.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total games played.
    pub total_games: u32,
    /// Games where every wave was cleared.
    pub victories: u32,
    /// Games where the player died.
    pub defeats: u32,
    /// Games that ran out of ticks.
    pub timeouts: u32,
    /// Average game duration in ticks.
    pub avg_duration_ticks: f64,
    /// Shortest game.
    pub min_duration_ticks: u64,
    /// Longest game.
    pub max_duration_ticks: u64,
    /// Average waves cleared.
    pub avg_waves_cleared: f64,
    /// Average damage dealt per game.
    pub avg_damage_dealt: f64,
    /// Average damage taken per game.
    pub avg_damage_taken: f64,
    /// Average potion doses per game.
    pub avg_potions_used: f64,
    /// Kills per game by monster kind.
    pub avg_kills: BTreeMap<MonsterKind, f64>,
}

impl BatchSummary {
    /// Calculate summary from a list of game metrics.
    #[must_use]
    pub fn from_games(games: &[GameMetrics]) -> Self {
        if games.is_empty() {
            return Self::default();
        }
        let n = games.len() as f64;
        let count = |result: GameResult| {
            u32::try_from(games.iter().filter(|g| g.result == result).count()).unwrap_or(u32::MAX)
        };
        let mean = |f: &dyn Fn(&GameMetrics) -> f64| games.iter().map(f).sum::<f64>() / n;

        let mut kill_totals: BTreeMap<MonsterKind, u32> = BTreeMap::new();
        for game in games {
            for (&kind, &kills) in &game.kills {
                *kill_totals.entry(kind).or_default() += kills;
            }
        }

        Self {
            total_games: u32::try_from(games.len()).unwrap_or(u32::MAX),
            victories: count(GameResult::Victory),
            defeats: count(GameResult::Defeat),
            timeouts: count(GameResult::Timeout),
            avg_duration_ticks: mean(&|g| g.duration_ticks as f64),
            min_duration_ticks: games.iter().map(|g| g.duration_ticks).min().unwrap_or(0),
            max_duration_ticks: games.iter().map(|g| g.duration_ticks).max().unwrap_or(0),
            avg_waves_cleared: mean(&|g| f64::from(g.waves_cleared)),
            avg_damage_dealt: mean(&|g| g.damage_dealt as f64),
            avg_damage_taken: mean(&|g| g.damage_taken as f64),
            avg_potions_used: mean(&|g| f64::from(g.potions_used)),
            avg_kills: kill_totals
                .into_iter()
                .map(|(kind, total)| (kind, f64::from(total) / n))
                .collect(),
        }
    }

    /// Fraction of games won (0.0 to 1.0).
    #[must_use]
    pub fn victory_rate(&self) -> f64 {
        if self.total_games == 0 {
            return 0.0;
        }
        f64::from(self.victories) / f64::from(self.total_games)
    }

    /// Print a human-readable report to stderr.
    pub fn print_report(&self) {
        eprintln!("{}", "=".repeat(50));
        eprintln!("BATCH SUMMARY ({} games)", self.total_games);
        eprintln!("{}", "=".repeat(50));
        eprintln!(
            "Victories: {} ({:.1}%)",
            self.victories,
            self.victory_rate() * 100.0
        );
        eprintln!("Defeats:   {}", self.defeats);
        eprintln!("Timeouts:  {}", self.timeouts);
        eprintln!(
            "Duration:  avg {:.0} ticks (min {}, max {})",
            self.avg_duration_ticks, self.min_duration_ticks, self.max_duration_ticks
        );
        eprintln!("Waves cleared: {:.2} avg", self.avg_waves_cleared);
        eprintln!(
            "Damage:    {:.0} dealt / {:.0} taken avg",
            self.avg_damage_dealt, self.avg_damage_taken
        );
        eprintln!("Potions:   {:.2} avg", self.avg_potions_used);
        for (kind, kills) in &self.avg_kills {
            eprintln!("  {kind:?}: {kills:.2} kills/game");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tick_core::systems::DamageApplied;
    use tick_test_utils::fixtures::player_engine;

    fn game(result: GameResult, ticks: u64, waves: u32) -> GameMetrics {
        GameMetrics {
            game_id: format!("game_{ticks}"),
            scenario: "test".to_string(),
            seed: ticks,
            result,
            duration_ticks: ticks,
            waves_reached: waves,
            waves_cleared: waves,
            kills: [(MonsterKind::Bat, waves)].into_iter().collect(),
            damage_dealt: 100,
            damage_taken: 20,
            projectiles_fired: 10,
            potions_used: 1,
            final_health: 50,
            final_state_hash: 0,
        }
    }

    #[test]
    fn test_summary_from_games() {
        let games = [
            game(GameResult::Victory, 100, 5),
            game(GameResult::Defeat, 50, 2),
            game(GameResult::Timeout, 300, 2),
            game(GameResult::Victory, 150, 5),
        ];
        let summary = BatchSummary::from_games(&games);
        assert_eq!(summary.total_games, 4);
        assert_eq!(
            (summary.victories, summary.defeats, summary.timeouts),
            (2, 1, 1)
        );
        assert_eq!(summary.min_duration_ticks, 50);
        assert_eq!(summary.max_duration_ticks, 300);
        assert!((summary.avg_duration_ticks - 150.0).abs() < 1e-9);
        assert!((summary.avg_waves_cleared - 3.5).abs() < 1e-9);
        assert!((summary.avg_kills[&MonsterKind::Bat] - 3.5).abs() < 1e-9);
        assert!((summary.victory_rate() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchSummary::from_games(&[]);
        assert_eq!(summary.total_games, 0);
        assert_eq!(summary.victory_rate(), 0.0);
    }

    #[test]
    fn test_collector_splits_damage() {
        let mut engine = player_engine(10, 10, 0);
        let player = engine.player().unwrap();
        let bat = engine
            .spawn_monster(MonsterKind::Bat, tick_core::math::TilePos::new(6, 6))
            .unwrap();

        let events = TickEvents {
            damage: vec![
                DamageApplied {
                    source: player,
                    target: bat,
                    amount: 12,
                },
                DamageApplied {
                    source: bat,
                    target: player,
                    amount: 4,
                },
            ],
            deaths: vec![bat],
            npcs_removed: vec![(bat, MonsterKind::Bat)],
            wave_started: Some(2),
            ..TickEvents::default()
        };
        let mut collector = MetricsCollector::new();
        collector.record_tick(&engine, &events);
        collector.record_potion();

        let metrics = collector.finish(&engine, "g", "s", 9, GameResult::Timeout);
        assert_eq!(metrics.damage_dealt, 12);
        assert_eq!(metrics.damage_taken, 4);
        assert_eq!(metrics.kills[&MonsterKind::Bat], 1);
        assert_eq!(metrics.total_kills(), 1);
        assert_eq!((metrics.waves_reached, metrics.waves_cleared), (2, 1));
        assert_eq!(metrics.potions_used, 1);
        assert_eq!(metrics.final_health, 99);
        assert_eq!(metrics.final_state_hash, engine.state_hash());
    }
}
