//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the engine
//! produces identical results given identical seeds and inputs.
//!
//! # Testing Strategy
//!
//! A fight must replay exactly from its seed. Sources of non-determinism
//! include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   We use fixed-point arithmetic via [`tick_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Systems always visit members in ascending entity order.
//!
//! - **System randomness**: Every draw goes through the engine's injected
//!   [`tick_core::rng::RandomSource`].
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual system determinism (movement, combat, etc.)
//! 2. **Property tests**: Random inputs must still produce deterministic outputs
//! 3. **Integration tests**: Full wave runs are reproducible
//! 4. **Parallel tests**: Running N engines on separate threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use tick_core::engine::Engine;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic engine).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Engine is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Result of parallel engine runs.
#[derive(Debug, Clone)]
pub struct ParallelRunResult {
    /// Final state hash from each engine.
    pub hashes: Vec<u64>,
    /// Number of ticks each engine ran.
    pub ticks: u64,
    /// Number of engines run.
    pub num_engines: usize,
}

impl ParallelRunResult {
    /// Check if all engines produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all engines matched.
    ///
    /// # Panics
    ///
    /// Panics if engines produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel engines diverged!\n\
                 Engines: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_engines,
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `ticks` - Number of steps per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance by one step
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```
/// use tick_test_utils::determinism::verify_determinism;
/// use tick_test_utils::fixtures::player_engine;
///
/// let result = verify_determinism(
///     3,
///     20,
///     || player_engine(10, 10, 7),
///     |engine| { engine.tick().unwrap(); },
///     |engine| engine.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run an engine twice with identical setup and compare final hashes.
///
/// A tick that returns an error counts as divergence.
pub fn verify_engine_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Engine,
{
    let run = || -> Option<u64> {
        let mut engine = setup_fn();
        for _ in 0..num_ticks {
            engine.tick().ok()?;
        }
        Some(engine.state_hash())
    };
    match (run(), run()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Run N engines on scoped threads and collect final hashes.
///
/// Useful for catching non-determinism that only manifests under thread
/// scheduling or memory layout differences.
///
/// # Panics
///
/// Panics if a worker thread panics or a tick fails.
pub fn run_parallel_engines<F>(setup_fn: F, num_engines: usize, num_ticks: u64) -> ParallelRunResult
where
    F: Fn() -> Engine + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_engines)
            .map(|_| {
                s.spawn(|| {
                    let mut engine = setup_fn();
                    for _ in 0..num_ticks {
                        engine.tick().expect("tick succeeds");
                    }
                    engine.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("engine thread panicked"))
            .collect()
    });

    ParallelRunResult {
        hashes,
        ticks: num_ticks,
        num_engines,
    }
}

/// Compare two engine runs tick-by-tick, finding first divergence.
///
/// # Returns
///
/// `None` if the runs agree, `Some(tick)` at the first tick whose state
/// hash differs or whose tick call fails.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Engine,
{
    let mut a = setup_fn();
    let mut b = setup_fn();

    if a.state_hash() != b.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        if a.tick().is_err() || b.tick().is_err() {
            return Some(tick);
        }
        if a.state_hash() != b.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Verify that two identical runs serialize to identical bytes.
pub fn verify_snapshot_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Engine,
{
    let run = || -> Option<Vec<u8>> {
        let mut engine = setup_fn();
        for _ in 0..num_ticks {
            engine.tick().ok()?;
        }
        engine.snapshot_bytes().ok()
    };
    match (run(), run()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for combat and engine testing.
pub mod strategies {
    use proptest::prelude::*;
    use tick_core::combat::StyleBonuses;
    use tick_core::components::{DefensiveStats, OffensiveStats};
    use tick_core::math::TilePos;

    /// Tile inside a `cols` x `rows` grid.
    pub fn arb_tile(cols: i32, rows: i32) -> impl Strategy<Value = TilePos> {
        (0..cols, 0..rows).prop_map(|(x, y)| TilePos::new(x, y))
    }

    /// Combat level in the range monsters use.
    pub fn arb_level() -> impl Strategy<Value = i32> {
        1i32..600i32
    }

    /// Equipment bonus, negative bonuses included.
    pub fn arb_bonus() -> impl Strategy<Value = i32> {
        -64i32..300i32
    }

    /// Bonuses across all five sub-types.
    pub fn arb_style_bonuses() -> impl Strategy<Value = StyleBonuses> {
        (arb_bonus(), arb_bonus(), arb_bonus(), arb_bonus(), arb_bonus()).prop_map(
            |(stab, slash, crush, ranged, magic)| StyleBonuses {
                stab,
                slash,
                crush,
                ranged,
                magic,
            },
        )
    }

    /// Attacker stat record.
    pub fn arb_offense() -> impl Strategy<Value = OffensiveStats> {
        (
            (arb_level(), arb_level(), arb_level(), arb_level()),
            arb_style_bonuses(),
            (0i32..200i32, 0i32..200i32, 0i32..200i32),
        )
            .prop_map(
                |((attack, strength, ranged, magic), attack_bonuses, (melee, range, mage))| {
                    OffensiveStats {
                        attack_level: attack,
                        strength_level: strength,
                        ranged_level: ranged,
                        magic_level: magic,
                        attack_bonuses,
                        melee_strength: melee,
                        ranged_strength: range,
                        magic_damage: mage,
                        ..OffensiveStats::default()
                    }
                },
            )
    }

    /// Defender stat record.
    pub fn arb_defense() -> impl Strategy<Value = DefensiveStats> {
        (arb_level(), arb_level(), arb_style_bonuses()).prop_map(
            |(defence_level, magic_level, defence_bonuses)| DefensiveStats {
                defence_level,
                magic_level,
                defence_bonuses,
            },
        )
    }

    /// Seed for an engine run.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{duel, player_engine};
    use proptest::prelude::*;
    use tick_core::data::{ItemId, MonsterKind};
    use tick_core::instance::WaveInstance;
    use tick_core::math::TilePos;

    // =========================================================================
    // Basic determinism tests
    // =========================================================================

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 100, || 0u64, |n| *n += 1, |n| *n);

        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
    }

    #[test]
    fn test_idle_player_determinism() {
        assert!(verify_engine_determinism(|| player_engine(10, 10, 1), 50));
    }

    fn bat_duel() -> Engine {
        let (mut engine, bat) = duel(99, MonsterKind::Bat, 6, &[ItemId::TWISTED_BOW]).unwrap();
        engine.input_mut().queue_attack(bat);
        engine
    }

    #[test]
    fn test_duel_determinism() {
        assert!(verify_engine_determinism(bat_duel, 40));
        assert_eq!(find_first_divergence(bat_duel, 40), None);
        assert!(verify_snapshot_determinism(bat_duel, 40));
    }

    #[test]
    fn test_parallel_duels_match() {
        run_parallel_engines(bat_duel, 4, 40).assert_deterministic();
    }

    #[test]
    fn test_wave_run_determinism() {
        let setup = || {
            let mut engine = player_engine(29, 30, 3);
            engine.set_instance(WaveInstance::default());
            engine
        };
        run_parallel_engines(setup, 3, 120).assert_deterministic();
    }

    #[test]
    fn test_different_seeds_usually_diverge() {
        let hash_for = |seed| {
            let mut engine = player_engine(29, 30, seed);
            engine.set_instance(WaveInstance::default());
            for _ in 0..12 {
                engine.tick().unwrap();
            }
            engine.state_hash()
        };
        let hashes: Vec<u64> = (0..8).map(hash_for).collect();
        let unique = DeterminismResult {
            is_deterministic: false,
            hashes,
            ticks: 12,
        }
        .unique_hashes();
        assert!(unique.len() > 1, "spawn shuffles should depend on the seed");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_walks_are_replayable(
            seed in strategies::arb_seed(),
            goal in strategies::arb_tile(12, 12),
        ) {
            let setup = || {
                let mut engine = player_engine(12, 12, seed);
                engine.input_mut().queue_movement(goal);
                engine
            };
            prop_assert!(verify_engine_determinism(setup, 15));
        }

        #[test]
        fn prop_duels_are_replayable(seed in strategies::arb_seed(), distance in 2i32..9) {
            let setup = || {
                let (mut engine, bat) =
                    duel(seed, MonsterKind::Bat, distance, &[ItemId::TWISTED_BOW]).unwrap();
                engine.input_mut().queue_attack(bat);
                engine
            };
            prop_assert_eq!(find_first_divergence(setup, 30), None);
        }
    }

    #[test]
    fn test_compute_hash_stable() {
        assert_eq!(
            compute_hash(&TilePos::new(3, 4)),
            compute_hash(&TilePos::new(3, 4))
        );
    }
}
