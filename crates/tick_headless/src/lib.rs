//! Headless wave runner for scripted play and CI verification.
//!
//! This crate runs the tick engine without any frontend. It can be
//! controlled via JSON commands on stdin, with game state output on stdout.
//! This enables:
//!
//! - **Scripted play**: An external controller plays the waves without graphics
//! - **CI verification**: Automated checks of game logic and determinism
//! - **Batch statistics**: Many autopiloted games folded into a summary
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: Commands from the controller (tick, attack, move, etc.)
//! - **stdout**: State updates and responses (JSON)
//! - **stderr**: Debug logs (human-readable)
//!
//! See [`protocol`] module for the full command/response specification.
//!
//! # Example
//!
//! ```bash
//! # Play interactively
//! echo '{"cmd":"tick","count":10}' | cargo run -p tick_headless -- run
//!
//! # Autopilot a scenario
//! cargo run -p tick_headless -- run --scenario my_scenario.ron --autopilot
//!
//! # 200 autopiloted games in parallel
//! cargo run -p tick_headless -- batch --count 200
//! ```

pub mod autopilot;
pub mod batch;
pub mod metrics;
pub mod protocol;
pub mod runner;
pub mod scenario;

pub use autopilot::{Autopilot, Plan};
pub use batch::{run_batch, run_game, verify_determinism, BatchConfig, BatchResults};
pub use metrics::{BatchSummary, GameMetrics, MetricsCollector};
pub use protocol::{Command, GameResult, Response};
pub use runner::{HeadlessConfig, HeadlessRunner};
pub use scenario::{Scenario, ScenarioError};
