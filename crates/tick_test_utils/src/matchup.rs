//! Matchup statistics for headless duels.
//!
//! Runs many seeded player-versus-monster duels to measure how a gear set
//! fares against each monster kind, and offers a closed-form expected
//! damage per tick for comparison.

use tick_core::combat::{attack_roll, defence_roll, hit_chance, max_hit, AttackStyle};
use tick_core::components::{DefensiveStats, Health, OffensiveStats, PrayerKind};
use tick_core::data::{ItemId, MonsterKind};
use tick_core::error::{GameError, Result};

use crate::fixtures::duel;

/// Result of one simulated duel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuelResult {
    /// Whether the monster died.
    pub player_won: bool,
    /// Whether the player died.
    pub player_died: bool,
    /// Ticks elapsed.
    pub ticks: u64,
    /// Player health left.
    pub player_health_left: u32,
}

/// Statistics for a set of duels.
#[derive(Debug, Clone, Default)]
pub struct MatchupStats {
    /// Total duels run.
    pub total: u32,
    /// Duels the player won.
    pub wins: u32,
    /// Duels the player died in.
    pub losses: u32,
    /// Duels that hit the tick limit.
    pub timeouts: u32,
    /// Average ticks to resolution.
    pub avg_ticks: f64,
    /// Average player health left after a win.
    pub avg_health_left: f64,
}

impl MatchupStats {
    /// Fold a batch of results.
    #[must_use]
    pub fn from_results(results: &[DuelResult]) -> Self {
        let total = u32::try_from(results.len()).unwrap_or(u32::MAX);
        if results.is_empty() {
            return Self::default();
        }
        let wins: Vec<&DuelResult> = results.iter().filter(|r| r.player_won).collect();
        let losses = results.iter().filter(|r| r.player_died).count();
        let timeouts = results
            .iter()
            .filter(|r| !r.player_won && !r.player_died)
            .count();

        let avg_ticks = results.iter().map(|r| r.ticks as f64).sum::<f64>() / results.len() as f64;
        let avg_health_left = if wins.is_empty() {
            0.0
        } else {
            wins.iter().map(|r| f64::from(r.player_health_left)).sum::<f64>() / wins.len() as f64
        };

        Self {
            total,
            wins: u32::try_from(wins.len()).unwrap_or(u32::MAX),
            losses: u32::try_from(losses).unwrap_or(u32::MAX),
            timeouts: u32::try_from(timeouts).unwrap_or(u32::MAX),
            avg_ticks,
            avg_health_left,
        }
    }

    /// Player win rate (0.0 to 1.0).
    pub fn win_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.wins) / f64::from(self.total)
    }
}

/// One matchup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuelSetup {
    /// Opponent.
    pub kind: MonsterKind,
    /// Tiles between the player and the monster's NW corner.
    pub distance: i32,
    /// Items equipped before the first tick.
    pub gear: Vec<ItemId>,
    /// Protection prayer switched on at the first tick.
    pub prayer: Option<PrayerKind>,
    /// Tick limit.
    pub max_ticks: u64,
}

impl DuelSetup {
    /// Unprayed duel with `gear` against `kind` from five tiles.
    #[must_use]
    pub fn new(kind: MonsterKind, gear: &[ItemId]) -> Self {
        Self {
            kind,
            distance: 5,
            gear: gear.to_vec(),
            prayer: None,
            max_ticks: 500,
        }
    }

    /// Same duel with `prayer` on.
    #[must_use]
    pub fn with_prayer(mut self, prayer: PrayerKind) -> Self {
        self.prayer = Some(prayer);
        self
    }
}

/// Run one duel: the player attacks the monster until one side dies or the
/// tick limit passes.
pub fn simulate_duel(seed: u64, setup: &DuelSetup) -> Result<DuelResult> {
    let (mut engine, monster) = duel(seed, setup.kind, setup.distance, &setup.gear)?;
    let player = engine
        .player()
        .ok_or_else(|| GameError::InvalidState("duel has no player".to_string()))?;
    engine.input_mut().queue_attack(monster);
    if let Some(prayer) = setup.prayer {
        engine.input_mut().queue_prayer_toggle(prayer);
    }

    while engine.current_tick() < setup.max_ticks {
        engine.tick()?;
        let monster_dead = !engine.world().is_alive(monster);
        let player_health = engine.world().get_component::<Health>(player)?.current;
        if monster_dead || player_health == 0 {
            return Ok(DuelResult {
                player_won: monster_dead,
                player_died: player_health == 0,
                ticks: engine.current_tick(),
                player_health_left: player_health,
            });
        }
    }

    Ok(DuelResult {
        player_won: false,
        player_died: false,
        ticks: engine.current_tick(),
        player_health_left: engine.world().get_component::<Health>(player)?.current,
    })
}

/// Run one duel per seed and summarise them.
pub fn run_matchup(
    setup: &DuelSetup,
    seeds: impl IntoIterator<Item = u64>,
) -> Result<MatchupStats> {
    let results = seeds
        .into_iter()
        .map(|seed| simulate_duel(seed, setup))
        .collect::<Result<Vec<_>>>()?;
    Ok(MatchupStats::from_results(&results))
}

/// Expected damage per attack: hit chance times the mean of `[1, max_hit]`.
pub fn expected_damage(
    style: AttackStyle,
    offense: &OffensiveStats,
    defense: &DefensiveStats,
) -> f64 {
    let sub_type = style.sub_type();
    let chance: f64 = hit_chance(attack_roll(sub_type, offense), defence_roll(sub_type, defense))
        .to_num();
    let max = max_hit(sub_type, offense);
    if max == 0 {
        return 0.0;
    }
    chance * (f64::from(max) + 1.0) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{defender, ranger_offense};

    #[test]
    fn test_stats_fold() {
        let results = [
            DuelResult {
                player_won: true,
                player_died: false,
                ticks: 10,
                player_health_left: 80,
            },
            DuelResult {
                player_won: false,
                player_died: true,
                ticks: 30,
                player_health_left: 0,
            },
            DuelResult {
                player_won: false,
                player_died: false,
                ticks: 50,
                player_health_left: 40,
            },
        ];
        let stats = MatchupStats::from_results(&results);
        assert_eq!(stats.total, 3);
        assert_eq!((stats.wins, stats.losses, stats.timeouts), (1, 1, 1));
        assert!((stats.avg_ticks - 30.0).abs() < 1e-9);
        assert!((stats.avg_health_left - 80.0).abs() < 1e-9);
        assert!((stats.win_rate() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_expected_damage_drops_with_defence() {
        let offense = ranger_offense();
        let soft = expected_damage(AttackStyle::RANGED, &offense, &defender(1, 1, 0));
        let hard = expected_damage(AttackStyle::RANGED, &offense, &defender(300, 300, 200));
        assert!(soft > hard);
        assert!(hard > 0.0);
    }

    #[test]
    fn test_protected_bow_always_beats_bat() {
        let setup = DuelSetup::new(MonsterKind::Bat, &[ItemId::TWISTED_BOW])
            .with_prayer(PrayerKind::ProtectRange);
        let stats = run_matchup(&setup, 0..10).unwrap();
        assert_eq!(stats.total, 10);
        assert_eq!(stats.wins, 10);
        assert!((stats.avg_health_left - 99.0).abs() < 1e-9);
    }

    #[test]
    fn test_every_duel_resolves_one_way() {
        let setup = DuelSetup::new(MonsterKind::Bat, &[]);
        let stats = run_matchup(&setup, 0..5).unwrap();
        assert_eq!(stats.wins + stats.losses + stats.timeouts, 5);
    }
}
