//! Headless wave runner.
//!
//! This binary runs the game without graphics, controlled via JSON on stdin/stdout.
//! Designed for scripted controllers, CI testing and batch statistics.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - read commands from stdin
//! cargo run -p tick_headless
//!
//! # Autopilot a single game of a scenario file
//! cargo run -p tick_headless -- run --scenario my_scenario.ron --autopilot
//!
//! # Run a batch of autopiloted games
//! cargo run -p tick_headless -- batch --count 1000 --output results/
//!
//! # Check that a seed replays identically
//! cargo run -p tick_headless -- verify --seed 12345 --runs 5
//! ```
//!
//! # Protocol
//!
//! Input (stdin): JSON commands, one per line
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): Debug information
//!
//! See the protocol module for command/response format.

use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tick_headless::{
    batch::{run_batch, run_game, verify_determinism, BatchConfig},
    runner::HeadlessRunner,
    scenario::Scenario,
    Autopilot,
};

#[derive(Parser)]
#[command(name = "tick_headless")]
#[command(about = "Headless wave runner for scripted play and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single game
    Run {
        /// Scenario file to load (default: built-in wave test)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Seed (default: the scenario's own)
        #[arg(long)]
        seed: Option<u64>,

        /// Let the autopilot play instead of reading stdin
        #[arg(long)]
        autopilot: bool,

        /// Autopilot drinks below this many hitpoints
        #[arg(long, default_value = "50")]
        potion_threshold: u32,
    },

    /// Run batch of autopiloted games
    Batch {
        /// Scenario file to load (default: built-in wave test)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Number of games to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel games (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Autopilot drinks below this many hitpoints
        #[arg(long, default_value = "50")]
        potion_threshold: u32,

        /// Do not switch protection prayers
        #[arg(long)]
        no_prayers: bool,
    },

    /// Verify determinism by running same seed multiple times
    Verify {
        /// Scenario file to load (default: built-in wave test)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },

    /// Run N ticks for benchmarking
    Benchmark {
        /// Number of ticks to run
        #[arg(short, long, default_value = "10000")]
        ticks: u64,

        /// Scenario file to load (default: built-in wave test)
        #[arg(short, long)]
        scenario: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Some(Commands::Run {
            scenario,
            seed,
            autopilot,
            potion_threshold,
        }) => {
            cmd_run(scenario.as_deref(), seed, autopilot, potion_threshold);
        }
        Some(Commands::Batch {
            scenario,
            count,
            parallel,
            output,
            seed,
            potion_threshold,
            no_prayers,
        }) => {
            let mut autopilot = Autopilot::new(potion_threshold);
            if no_prayers {
                autopilot = autopilot.without_prayers();
            }
            let config = BatchConfig {
                game_count: count,
                parallel_games: parallel,
                seed_start: seed,
                autopilot,
                output_dir: output,
            };
            cmd_batch(scenario.as_deref(), config);
        }
        Some(Commands::Verify {
            scenario,
            seed,
            runs,
        }) => {
            cmd_verify(scenario.as_deref(), seed, runs);
        }
        Some(Commands::Benchmark { ticks, scenario }) => {
            cmd_benchmark(ticks, scenario.as_deref());
        }
        None => {
            // Default: interactive mode
            cmd_run(None, None, false, 50);
        }
    }
}

/// Load a scenario file, or the built-in wave test. Exits on failure.
fn load_scenario(path: Option<&Path>) -> Scenario {
    let Some(path) = path else {
        return Scenario::wave_test();
    };
    tracing::info!("Using scenario: {}", path.display());
    match Scenario::load(path) {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("Failed to load scenario: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run a single game, interactive or autopiloted
fn cmd_run(scenario: Option<&Path>, seed: Option<u64>, autopilot: bool, potion_threshold: u32) {
    let scenario = load_scenario(scenario);
    let seed = seed.unwrap_or(scenario.seed);

    if autopilot {
        tracing::info!("Autopiloting '{}' with seed {}", scenario.name, seed);
        match run_game(&scenario, seed, Autopilot::new(potion_threshold)) {
            Ok(metrics) => {
                eprintln!("\n{}", "=".repeat(50));
                eprintln!("GAME OVER: {}", metrics.result);
                eprintln!("{}", "=".repeat(50));
                eprintln!("Ticks: {}", metrics.duration_ticks);
                eprintln!(
                    "Waves cleared: {}/{}",
                    metrics.waves_cleared,
                    scenario.waves.waves.len()
                );
                eprintln!("Kills: {}", metrics.total_kills());
                eprintln!(
                    "Damage: {} dealt / {} taken",
                    metrics.damage_dealt, metrics.damage_taken
                );
                eprintln!("Potions: {}", metrics.potions_used);
                eprintln!("Final health: {}", metrics.final_health);
                eprintln!("State hash: {:016x}", metrics.final_state_hash);
            }
            Err(e) => {
                eprintln!("Game failed: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    tracing::info!("Starting interactive session");
    let stdin = io::stdin();
    let runner = HeadlessRunner::from_scenario(&scenario, seed, stdin.lock(), io::stdout());
    let mut runner = match runner {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("Failed to start game: {}", e);
            std::process::exit(1);
        }
    };
    match runner.run() {
        Ok(Some(result)) => tracing::info!(%result, "Session ended"),
        Ok(None) => tracing::info!("Session ended without a result"),
        Err(e) => {
            eprintln!("I/O error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run batch of autopiloted games
fn cmd_batch(scenario: Option<&Path>, config: BatchConfig) {
    let scenario = load_scenario(scenario);
    let num_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);

    tracing::info!(
        scenario = %scenario.name,
        count = config.game_count,
        parallel = config.parallel_games,
        seed = config.seed_start,
        cpus_available = num_cpus,
        max_ticks = scenario.max_ticks,
        "Batch configuration"
    );

    let output = config.output_dir.clone();
    let results = run_batch(&scenario, config);

    results.summary.print_report();
    if !results.errors.is_empty() {
        eprintln!("\nGAME FAILURES:");
        for error in results.errors.iter().take(10) {
            eprintln!("  seed {}: {}", error.seed, error.message);
        }
        if results.errors.len() > 10 {
            eprintln!("  ... and {} more failures", results.errors.len() - 10);
        }
    }
    eprintln!(
        "\nThroughput: {:.1} games/sec",
        results.games.len() as f64 / results.duration_seconds.max(0.001)
    );

    if let Some(output) = output {
        let results_path = output.join("batch_results.json");
        if let Err(e) = results.save(&results_path) {
            tracing::error!(error = %e, path = %results_path.display(), "Failed to save results");
            eprintln!("FATAL: Failed to save results: {}", e);
            std::process::exit(1);
        }
        eprintln!("Results saved to: {}", results_path.display());
    }
}

/// Verify determinism by running same seed multiple times
fn cmd_verify(scenario: Option<&Path>, seed: u64, runs: u32) {
    let scenario = load_scenario(scenario);
    tracing::info!(
        "Verifying determinism: {} with seed {} ({} runs)",
        scenario.name,
        seed,
        runs
    );

    match verify_determinism(&scenario, seed, runs) {
        Ok(true) => eprintln!("PASS: All {} runs produced identical results", runs),
        Ok(false) => {
            eprintln!("FAIL: Non-determinism detected!");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Verification failed to run: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run N ticks for benchmarking
fn cmd_benchmark(ticks: u64, scenario: Option<&Path>) {
    use std::time::Instant;

    let scenario = load_scenario(scenario);
    tracing::info!("Running {} tick benchmark", ticks);

    let mut engine = match scenario.build_engine(scenario.seed) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Failed to build scenario: {}", e);
            std::process::exit(1);
        }
    };
    let mut pilot = Autopilot::default();

    eprintln!("Running {} ticks...", ticks);

    let mut step = |engine: &mut tick_core::engine::Engine| {
        pilot.plan(engine).and_then(|_| engine.tick())
    };

    // Warmup
    for _ in 0..100 {
        if let Err(e) = step(&mut engine) {
            eprintln!("Tick failed: {}", e);
            std::process::exit(1);
        }
    }

    // Benchmark
    let start = Instant::now();
    for _ in 0..ticks {
        if let Err(e) = step(&mut engine) {
            eprintln!("Tick failed: {}", e);
            std::process::exit(1);
        }
    }
    let elapsed = start.elapsed();

    let tps = ticks as f64 / elapsed.as_secs_f64();

    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BENCHMARK RESULTS");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Ticks: {}", ticks);
    eprintln!("Duration: {:.3}s", elapsed.as_secs_f64());
    eprintln!("Ticks/second: {:.1}", tps);
    eprintln!("ms/tick: {:.4}", elapsed.as_millis() as f64 / ticks.max(1) as f64);
    eprintln!("Final NPCs: {}", engine.npcs().len());
    eprintln!("State hash: {:016x}", engine.state_hash());
}
