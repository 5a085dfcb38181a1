//! Headless game runner implementation.
//!
//! The runner owns an [`Engine`] and speaks the JSON-lines protocol over any
//! reader/writer pair, so tests drive it with in-memory buffers and the CLI
//! drives it with stdin/stdout.

use std::io::{self, BufRead, Write};

use tick_core::components::{
    AttackCommand, Health, HomingProjectile, Npc, Player, Transform,
};
use tick_core::ecs::Entity;
use tick_core::engine::Engine;
use tick_core::math::TilePos;

use crate::protocol::{
    Command, EntityKind, EntityState, GameResult, HealthState, Response, WaveState,
};
use crate::scenario::{Scenario, ScenarioError};

/// Headless runner configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessConfig {
    /// Ticks before the game is called a timeout.
    pub max_ticks: u64,
    /// Include projectiles in state entity lists.
    pub report_projectiles: bool,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            max_ticks: Scenario::wave_test().max_ticks,
            report_projectiles: true,
        }
    }
}

/// Headless runner for externally controlled play.
pub struct HeadlessRunner<R, W> {
    engine: Engine,
    config: HeadlessConfig,
    reader: R,
    writer: W,
    result: Option<GameResult>,
}

impl<R: BufRead, W: Write> HeadlessRunner<R, W> {
    /// Wrap a ready engine.
    pub fn new(engine: Engine, config: HeadlessConfig, reader: R, writer: W) -> Self {
        Self {
            engine,
            config,
            reader,
            writer,
            result: None,
        }
    }

    /// Build the engine for `scenario` with `seed` and wrap it.
    pub fn from_scenario(
        scenario: &Scenario,
        seed: u64,
        reader: R,
        writer: W,
    ) -> Result<Self, ScenarioError> {
        let engine = scenario.build_engine(seed)?;
        let config = HeadlessConfig {
            max_ticks: scenario.max_ticks,
            ..HeadlessConfig::default()
        };
        Ok(Self::new(engine, config, reader, writer))
    }

    /// The simulated game.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// How the game ended, once it has.
    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    /// Give back the writer, e.g. to inspect a test buffer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Run until `quit`, end of input or game over.
    ///
    /// Unparseable lines produce an `error` response and are skipped.
    pub fn run(&mut self) -> io::Result<Option<GameResult>> {
        self.send(&Response::ready(self.engine.current_tick()))?;

        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                tracing::debug!("Input closed");
                break;
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let command = match Command::from_json(trimmed) {
                Ok(command) => command,
                Err(e) => {
                    self.send(&Response::error(format!("Parse error: {e}"), None))?;
                    continue;
                }
            };

            let quit = matches!(command, Command::Quit);
            for response in self.handle(command) {
                self.send(&response)?;
            }
            if quit || self.result.is_some() {
                break;
            }
        }
        self.writer.flush()?;
        Ok(self.result)
    }

    /// Apply one command and return the responses it produces.
    pub fn handle(&mut self, command: Command) -> Vec<Response> {
        let name = command.name();
        if let Some(result) = self.result {
            if !matches!(command, Command::Query | Command::Hash | Command::Quit) {
                return vec![Response::error(
                    format!("Game is over ({result})"),
                    Some(name),
                )];
            }
        }

        match command {
            Command::Tick { count } => self.advance(count),
            Command::Query => vec![build_state(&self.engine, self.config.report_projectiles)],
            Command::Hash => vec![Response::StateHash {
                tick: self.engine.current_tick(),
                hash: self.engine.state_hash(),
            }],
            Command::Attack { target } => match self.live_entity(target) {
                Some(entity) if self.engine.world().has_component::<Npc>(entity) => {
                    self.engine.input_mut().queue_attack(entity);
                    vec![Response::ack(name)]
                }
                _ => vec![Response::error(format!("No NPC with id {target}"), Some(name))],
            },
            Command::Move { x, y } => {
                let tile = TilePos::new(x, y);
                if self.engine.map().in_bounds(tile) {
                    self.engine.input_mut().queue_movement(tile);
                    vec![Response::ack(name)]
                } else {
                    vec![Response::error(format!("Tile {tile} is off the map"), Some(name))]
                }
            }
            Command::Prayer { prayer } => {
                self.engine.input_mut().queue_prayer_toggle(prayer);
                vec![Response::ack(name)]
            }
            Command::Equip { item } => match self.live_entity(item) {
                Some(entity) => {
                    self.engine.input_mut().queue_equip(entity);
                    vec![Response::ack(name)]
                }
                None => vec![Response::error(format!("No item with id {item}"), Some(name))],
            },
            Command::Unequip { slot } => {
                self.engine.input_mut().queue_unequip(slot);
                vec![Response::ack(name)]
            }
            Command::Consume { item, slot } => match self.live_entity(item) {
                Some(entity) => {
                    self.engine.input_mut().queue_consume(entity, slot);
                    vec![Response::ack(name)]
                }
                None => vec![Response::error(format!("No item with id {item}"), Some(name))],
            },
            Command::ToggleRun => {
                self.engine.input_mut().queue_toggle_run();
                vec![Response::ack(name)]
            }
            Command::Quit => vec![Response::Bye],
        }
    }

    fn advance(&mut self, count: u32) -> Vec<Response> {
        let mut responses = Vec::new();
        for _ in 0..count {
            if let Err(e) = self.engine.tick() {
                tracing::error!(%e, tick = self.engine.current_tick(), "Tick failed");
                responses.push(Response::error(e.to_string(), Some("tick")));
                return responses;
            }
            self.result = game_result(&self.engine, self.config.max_ticks);
            if self.result.is_some() {
                break;
            }
        }

        responses.push(build_state(&self.engine, self.config.report_projectiles));
        if let Some(result) = self.result {
            tracing::info!(%result, ticks = self.engine.current_tick(), "Game over");
            responses.push(Response::GameOver {
                result,
                ticks: self.engine.current_tick(),
            });
        }
        responses
    }

    fn live_entity(&self, id: u32) -> Option<Entity> {
        let entity = Entity::from_raw(id);
        self.engine.world().is_alive(entity).then_some(entity)
    }

    fn send(&mut self, response: &Response) -> io::Result<()> {
        self.writer.write_all(response.to_json_line().as_bytes())?;
        self.writer.flush()
    }
}

/// Decide whether the game has ended.
///
/// Defeat wins over victory when both happen on the same tick.
#[must_use]
pub fn game_result(engine: &Engine, max_ticks: u64) -> Option<GameResult> {
    let player_dead = engine
        .player()
        .and_then(|p| engine.world().try_get_component::<Health>(p))
        .map_or(true, |h| h.current == 0);
    if player_dead {
        return Some(GameResult::Defeat);
    }
    if engine.instance().is_some_and(|i| i.is_complete()) {
        return Some(GameResult::Victory);
    }
    (engine.current_tick() >= max_ticks).then_some(GameResult::Timeout)
}

/// Build a state response from the engine.
///
/// Entities are listed player first, then NPCs in spawn order, then
/// projectiles.
#[must_use]
pub fn build_state(engine: &Engine, report_projectiles: bool) -> Response {
    let world = engine.world();
    let mut entities = Vec::new();

    let unit_state = |entity: Entity, kind: EntityKind| -> Option<EntityState> {
        let transform = world.try_get_component::<Transform>(entity)?;
        Some(EntityState {
            id: entity.id(),
            kind,
            x: transform.position.x,
            y: transform.position.y,
            width: transform.width,
            height: transform.height,
            health: world.try_get_component::<Health>(entity).map(|h| HealthState {
                current: h.current,
                max: h.max,
            }),
            target: world
                .try_get_component::<AttackCommand>(entity)
                .map(|c| c.target.id()),
        })
    };

    if let Some(player) = engine.player() {
        if world.has_component::<Player>(player) {
            entities.extend(unit_state(player, EntityKind::Player));
        }
    }
    for &npc in engine.npcs() {
        if let Some(tag) = world.try_get_component::<Npc>(npc) {
            entities.extend(unit_state(npc, EntityKind::Npc { monster: tag.kind }));
        }
    }
    if report_projectiles {
        for entity in world.entities_with::<HomingProjectile>() {
            let Some(projectile) = world.try_get_component::<HomingProjectile>(entity) else {
                continue;
            };
            let tile = TilePos::new(
                projectile.position.x.floor().to_num(),
                projectile.position.y.floor().to_num(),
            );
            entities.push(EntityState {
                id: entity.id(),
                kind: EntityKind::Projectile,
                x: tile.x,
                y: tile.y,
                width: 1,
                height: 1,
                health: None,
                target: Some(projectile.target.id()),
            });
        }
    }

    Response::State {
        tick: engine.current_tick(),
        snapshot: engine.combat_snapshot().ok(),
        entities,
        wave: engine.instance().map(|i| WaveState {
            wave: i.wave(),
            total: u32::try_from(i.wave_count()).unwrap_or(u32::MAX),
            cooldown_remaining: i.cooldown_remaining(),
            complete: i.is_complete(),
        }),
        hash: engine.state_hash(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tick_core::data::WaveConfig;
    use tick_test_utils::fixtures::player_engine;

    fn run_session(scenario: &Scenario, input: &str) -> (Option<GameResult>, Vec<Response>) {
        let mut runner =
            HeadlessRunner::from_scenario(scenario, 1, Cursor::new(input.to_string()), Vec::new())
                .unwrap();
        let result = runner.run().unwrap();
        let output = String::from_utf8(runner.into_writer()).unwrap();
        let responses = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        (result, responses)
    }

    fn no_waves() -> Scenario {
        Scenario {
            waves: WaveConfig {
                cooldown_ticks: 1,
                spawn_points: Vec::new(),
                waves: Vec::new(),
            },
            ..Scenario::wave_test()
        }
    }

    #[test]
    fn test_ready_query_quit() {
        let (result, responses) = run_session(
            &Scenario::wave_test(),
            "{\"cmd\":\"query\"}\n{\"cmd\":\"quit\"}\n{\"cmd\":\"query\"}\n",
        );
        assert_eq!(result, None);
        assert_eq!(responses.len(), 3);
        assert!(matches!(responses[0], Response::Ready { tick: 0, .. }));
        let Response::State {
            tick,
            snapshot,
            entities,
            wave,
            ..
        } = &responses[1]
        else {
            panic!("expected state, got {:?}", responses[1]);
        };
        assert_eq!(*tick, 0);
        assert_eq!(snapshot.as_ref().unwrap().current_health, 99);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].kind, EntityKind::Player);
        assert_eq!(wave.unwrap().total, 5);
        assert_eq!(responses[2], Response::Bye);
    }

    #[test]
    fn test_parse_error_keeps_running() {
        let (_, responses) = run_session(&Scenario::wave_test(), "garbage\n\n{\"cmd\":\"hash\"}\n");
        assert_eq!(responses.len(), 3);
        assert!(matches!(responses[1], Response::Error { cmd: None, .. }));
        assert!(matches!(responses[2], Response::StateHash { tick: 0, .. }));
    }

    #[test]
    fn test_tick_stops_at_timeout() {
        let scenario = Scenario {
            max_ticks: 3,
            ..Scenario::wave_test()
        };
        let (result, responses) = run_session(&scenario, "{\"cmd\":\"tick\",\"count\":10}\n");
        assert_eq!(result, Some(GameResult::Timeout));
        assert!(matches!(responses[1], Response::State { tick: 3, .. }));
        assert_eq!(
            responses[2],
            Response::GameOver {
                result: GameResult::Timeout,
                ticks: 3
            }
        );
    }

    #[test]
    fn test_empty_wave_table_is_victory() {
        let (result, _) = run_session(&no_waves(), "{\"cmd\":\"tick\"}\n");
        assert_eq!(result, Some(GameResult::Victory));
    }

    #[test]
    fn test_commands_rejected_after_game_over() {
        let mut runner =
            HeadlessRunner::from_scenario(&no_waves(), 0, Cursor::new(String::new()), Vec::new())
                .unwrap();
        runner.handle(Command::Tick { count: 1 });
        assert_eq!(runner.result(), Some(GameResult::Victory));

        assert!(matches!(
            runner.handle(Command::Tick { count: 1 })[0],
            Response::Error { .. }
        ));
        assert!(matches!(
            runner.handle(Command::Query)[0],
            Response::State { .. }
        ));
    }

    #[test]
    fn test_attack_needs_live_npc() {
        let mut runner = HeadlessRunner::from_scenario(
            &Scenario::wave_test(),
            0,
            Cursor::new(String::new()),
            Vec::new(),
        )
        .unwrap();
        let player = runner.engine().player().unwrap().id();
        assert!(matches!(
            runner.handle(Command::Attack { target: player })[0],
            Response::Error { .. }
        ));
        assert!(matches!(
            runner.handle(Command::Attack { target: 4999 })[0],
            Response::Error { .. }
        ));
        assert!(matches!(
            runner.handle(Command::Move { x: -1, y: 0 })[0],
            Response::Error { .. }
        ));
        assert_eq!(
            runner.handle(Command::Move { x: 14, y: 15 }),
            vec![Response::ack("move")]
        );
    }

    #[test]
    fn test_dead_player_is_defeat() {
        let mut engine = player_engine(5, 5, 0);
        let player = engine.player().unwrap();
        assert_eq!(game_result(&engine, 100), None);
        engine.world_mut().get_component_mut::<Health>(player).unwrap().current = 0;
        assert_eq!(game_result(&engine, 100), Some(GameResult::Defeat));
    }
}
