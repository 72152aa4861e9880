//! Simulation worker that owns the authoritative [`Battlefield`].
//!
//! Ticks the [`BattlescapeGame`] on a timer, applies commands from
//! [`RuntimeHandle`](crate::api::RuntimeHandle) between ticks, and publishes
//! the engine's events to the [`EventBus`].

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use battle_core::{BattleEvent, Battlefield, BattlescapeGame, Faction};

use crate::api::{BattleSnapshot, PlayerCommand, Result, RuntimeError};
use crate::events::{Event, EventBus};
use crate::oracle::OracleBundle;

/// Commands that can be sent to the simulation worker.
pub enum Command {
    Player {
        command: PlayerCommand,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Run this many ticks immediately.
    Advance {
        ticks: u32,
        reply: oneshot::Sender<()>,
    },
    /// Query the current session (read-only).
    Query { reply: oneshot::Sender<BattleSnapshot> },
    Shutdown,
}

/// Background task that drives one battle.
pub struct SimulationWorker {
    game: BattlescapeGame,
    battle: Battlefield,
    oracles: OracleBundle,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    tick_interval: Option<Duration>,
    tick: u64,
}

impl SimulationWorker {
    pub fn new(
        game: BattlescapeGame,
        battle: Battlefield,
        oracles: OracleBundle,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
        tick_interval: Option<Duration>,
    ) -> Self {
        info!(
            target: "runtime::worker",
            units = battle.units.len(),
            side = %battle.side,
            turn = battle.turn,
            "simulation worker initialized"
        );
        Self {
            game,
            battle,
            oracles,
            command_rx,
            event_bus,
            tick_interval,
            tick: 0,
        }
    }

    /// Main worker loop. Without a tick interval the battle only advances on
    /// [`Command::Advance`].
    pub async fn run(mut self) {
        let Some(period) = self.tick_interval else {
            while let Some(command) = self.command_rx.recv().await {
                if !self.handle_command(command) {
                    break;
                }
            }
            info!(target: "runtime::worker", tick = self.tick, "simulation worker stopped");
            return;
        };

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(command) => {
                        if !self.handle_command(command) {
                            break;
                        }
                    }
                    None => break,
                },
                _ = ticker.tick() => self.step(),
            }
        }
        info!(target: "runtime::worker", tick = self.tick, "simulation worker stopped");
    }

    /// Returns `false` once the worker should stop.
    fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Player { command, reply } => {
                let result = self.apply(command);
                self.publish_events();
                if reply.send(result).is_err() {
                    warn!(target: "runtime::worker", "player command reply dropped");
                }
            }
            Command::Advance { ticks, reply } => {
                for _ in 0..ticks {
                    self.step();
                }
                let _ = reply.send(());
            }
            Command::Query { reply } => {
                let _ = reply.send(self.snapshot());
            }
            Command::Shutdown => return false,
        }
        true
    }

    fn step(&mut self) {
        if self.game.outcome().is_some() {
            return;
        }
        self.tick += 1;
        let env = self.oracles.as_env();
        self.game.think(&mut self.battle, &env);
        self.publish_events();
    }

    fn publish_events(&mut self) {
        for event in self.game.drain_events() {
            match &event {
                BattleEvent::TurnEnded { side, turn } => {
                    info!(target: "runtime::worker", side = %side, turn, "turn ended");
                }
                BattleEvent::BattleFinished { outcome } => {
                    info!(target: "runtime::worker", outcome = %outcome, "battle finished");
                }
                _ => {}
            }
            self.event_bus.publish(Event {
                tick: self.tick,
                event,
            });
        }
    }

    fn apply(&mut self, command: PlayerCommand) -> Result<()> {
        if let Some(outcome) = self.game.outcome() {
            return Err(RuntimeError::BattleFinished(outcome));
        }
        debug!(target: "runtime::worker", ?command, "player command");
        let env = self.oracles.as_env();
        let battle = &mut self.battle;
        let game = &mut self.game;
        match command {
            PlayerCommand::Click(position) => game.primary_action(battle, &env, position),
            PlayerCommand::RightClick(position) => game.secondary_action(battle, &env, position),
            PlayerCommand::SelectAction {
                kind,
                weapon,
                value,
            } => game.select_action(battle, &env, kind, weapon, value),
            PlayerCommand::Kneel => {
                if game.is_busy() || !game.playable_unit_selected(battle) {
                    return Ok(());
                }
                if let Some(unit) = battle.selected {
                    game.kneel(battle, &env, unit)?;
                }
            }
            PlayerCommand::NextUnit => {
                game.select_next_player_unit(battle, &env, true);
            }
            PlayerCommand::MoveUpDown(direction) => {
                if !game.is_busy()
                    && game.playable_unit_selected(battle)
                    && let Some(unit) = battle.selected
                {
                    game.move_up_down(battle, &env, unit, direction);
                }
            }
            PlayerCommand::SetReserve(kind) => game.set_tu_reserved(kind),
            PlayerCommand::Cancel => {
                game.cancel_current_action(battle, &env, false);
            }
            PlayerCommand::EndTurn => {
                if battle.side == Faction::Player {
                    game.request_end_turn();
                }
            }
        }
        Ok(())
    }

    fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot {
            tick: self.tick,
            battlefield: self.battle.clone(),
            phase: self.game.phase(),
            outcome: self.game.outcome(),
            current_action: self.game.current_action().clone(),
            tu_reserved: self.game.tu_reserved(),
            cursor: self.game.cursor(),
            queue: self.game.queued_states(),
        }
    }
}
