//! JSON protocol for headless game communication.
//!
//! The headless runner communicates via JSON lines (one JSON object per line):
//!
//! **Input (stdin):** Commands from the controller
//! **Output (stdout):** Game state updates and responses
//!
//! # Protocol Flow
//!
//! 1. Runner starts, outputs `{"type":"ready","version":"1.0","tick":0}`
//! 2. Controller sends commands as JSON lines
//! 3. Runner outputs state after each `tick` (or on `query`)
//! 4. On game end, outputs `{"type":"game_over","result":"victory"|"defeat"|"timeout"}`
//!
//! Player commands are queued and take effect at the start of the next tick.
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","tick":0}
//! -> {"cmd":"equip","item":1}
//! <- {"type":"ack","cmd":"equip"}
//! -> {"cmd":"tick","count":12}
//! <- {"type":"state","tick":12,"snapshot":{...},"entities":[...],"wave":{...},"hash":...}
//! -> {"cmd":"attack","target":9}
//! <- {"type":"ack","cmd":"attack"}
//! -> {"cmd":"prayer","prayer":"ProtectRange"}
//! <- {"type":"ack","cmd":"prayer"}
//! ```

use serde::{Deserialize, Serialize};
use tick_core::components::{EquipmentSlot, PrayerKind};
use tick_core::data::MonsterKind;
use tick_core::snapshot::CombatSnapshot;

/// Protocol version reported in `ready`.
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Input Commands (controller -> runner)
// ============================================================================

/// Commands that can be sent to the headless runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Advance simulation by N ticks (default: 1).
    Tick {
        #[serde(default = "default_tick_count")]
        count: u32,
    },

    /// Query current game state without advancing time.
    Query,

    /// Attack an NPC by entity id.
    Attack { target: u32 },

    /// Walk to a tile.
    Move { x: i32, y: i32 },

    /// Toggle a protection prayer.
    Prayer { prayer: PrayerKind },

    /// Equip an inventory item by entity id.
    Equip { item: u32 },

    /// Move a worn item back to the inventory.
    Unequip { slot: EquipmentSlot },

    /// Use an inventory item by entity id and slot.
    Consume { item: u32, slot: usize },

    /// Toggle run.
    ToggleRun,

    /// Report the state hash (for determinism verification).
    Hash,

    /// Quit the game.
    Quit,
}

fn default_tick_count() -> u32 {
    1
}

// ============================================================================
// Output Responses (runner -> controller)
// ============================================================================

/// Responses sent from the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready { version: String, tick: u64 },

    /// Acknowledgment of a command.
    Ack { cmd: String },

    /// Error processing a command.
    Error {
        message: String,
        cmd: Option<String>,
    },

    /// Current game state.
    State {
        tick: u64,
        snapshot: Option<CombatSnapshot>,
        entities: Vec<EntityState>,
        wave: Option<WaveState>,
        hash: u64,
    },

    /// Game has ended.
    GameOver { result: GameResult, ticks: u64 },

    /// State hash for determinism verification.
    StateHash { tick: u64, hash: u64 },

    /// Goodbye message before shutdown.
    Bye,
}

// ============================================================================
// State Types
// ============================================================================

/// State of a single entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub id: u32,
    pub kind: EntityKind,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<HealthState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
}

/// Type of entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Player,
    Npc { monster: MonsterKind },
    Projectile,
}

/// Health state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthState {
    pub current: u32,
    pub max: u32,
}

/// Wave instance progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveState {
    pub wave: u32,
    pub total: u32,
    pub cooldown_remaining: Option<u32>,
    pub complete: bool,
}

/// Game result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    /// Every wave cleared.
    Victory,
    /// Player died.
    Defeat,
    /// Tick limit reached first.
    Timeout,
}

impl std::fmt::Display for GameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Victory => "victory",
            Self::Defeat => "defeat",
            Self::Timeout => "timeout",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create a ready response.
    pub fn ready(tick: u64) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            tick,
        }
    }

    /// Create an acknowledgment.
    pub fn ack(cmd: &str) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"type":"error","message":"Serialization failed: {}"}}"#,
                e
            )
        });
        json.push('\n');
        json
    }
}

impl Command {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get command name for acknowledgment.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tick { .. } => "tick",
            Self::Query => "query",
            Self::Attack { .. } => "attack",
            Self::Move { .. } => "move",
            Self::Prayer { .. } => "prayer",
            Self::Equip { .. } => "equip",
            Self::Unequip { .. } => "unequip",
            Self::Consume { .. } => "consume",
            Self::ToggleRun => "toggle_run",
            Self::Hash => "hash",
            Self::Quit => "quit",
        }
    }
}
