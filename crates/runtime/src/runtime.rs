//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up command/event channels,
//! and exposes a builder-based API for clients to drive a battle.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use battle_core::{AiStrategy, BattleConfig, Battlefield, BattlescapeGame, RulesetOracle};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::{Event, EventBus, Topic};
use crate::oracle::{OracleBundle, StaticRuleset};
use crate::scenario::Scenario;
use crate::workers::{Command, SimulationWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub battle: BattleConfig,
    /// Scheduler period; `None` advances only on explicit requests.
    pub tick_interval: Option<Duration>,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Lets the player command every side without time-unit costs until
    /// the first turn ends.
    pub debug_play: bool,
}

impl RuntimeConfig {
    pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);

    /// Ticks only on request and animates nothing; for tests and tools.
    pub fn manual() -> Self {
        Self {
            battle: BattleConfig::instant(),
            tick_interval: None,
            ..Self::default()
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            battle: BattleConfig::default(),
            tick_interval: Some(Self::DEFAULT_TICK_INTERVAL),
            event_buffer_size: 100,
            command_buffer_size: 32,
            debug_play: false,
        }
    }
}

/// Main runtime that drives one battle.
///
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    sim_worker_handle: JoinHandle<()>,
}

impl Runtime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Stops the worker and waits for it to finish.
    pub async fn shutdown(self) -> Result<()> {
        // The worker may already be gone when every sender was dropped.
        let _ = self.handle.shutdown().await;
        drop(self.handle);
        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`].
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    battlefield: Option<Battlefield>,
    scenario: Option<Scenario>,
    ruleset: Option<Arc<dyn RulesetOracle>>,
    ai: Option<Arc<dyn AiStrategy>>,
    oracles: Option<OracleBundle>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            battlefield: None,
            scenario: None,
            ruleset: None,
            ai: None,
            oracles: None,
        }
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Start from a ready battlefield instead of a scenario.
    pub fn battlefield(mut self, battlefield: Battlefield) -> Self {
        self.battlefield = Some(battlefield);
        self
    }

    pub fn scenario(mut self, scenario: Scenario) -> Self {
        self.scenario = Some(scenario);
        self
    }

    /// Item rules; defaults to the embedded ones.
    pub fn ruleset(mut self, ruleset: Arc<dyn RulesetOracle>) -> Self {
        self.ruleset = Some(ruleset);
        self
    }

    pub fn ai(mut self, ai: Arc<dyn AiStrategy>) -> Self {
        self.ai = Some(ai);
        self
    }

    /// Replaces every collaborator at once; `ruleset` and `ai` are ignored.
    pub fn oracles(mut self, oracles: OracleBundle) -> Self {
        self.oracles = Some(oracles);
        self
    }

    /// Build the runtime and spawn its worker. Must run inside a tokio runtime.
    pub fn build(self) -> Result<Runtime> {
        let oracles = match self.oracles {
            Some(oracles) => oracles,
            None => {
                let ruleset = match self.ruleset {
                    Some(ruleset) => ruleset,
                    None => Arc::new(StaticRuleset::embedded()?),
                };
                let bundle = OracleBundle::new(ruleset);
                match self.ai {
                    Some(ai) => bundle.with_ai(ai),
                    None => bundle,
                }
            }
        };

        let battlefield = match (self.battlefield, self.scenario) {
            (Some(battlefield), _) => battlefield,
            (None, Some(scenario)) => scenario.build(oracles.ruleset.as_ref())?,
            (None, None) => return Err(RuntimeError::MissingBattlefield),
        };

        let mut game = BattlescapeGame::new(self.config.battle.clone());
        game.set_debug_play(self.config.debug_play);

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        let sim_worker = SimulationWorker::new(
            game,
            battlefield,
            oracles,
            command_rx,
            event_bus,
            self.config.tick_interval,
        );
        let sim_worker_handle = tokio::spawn(async move {
            sim_worker.run().await;
        });

        Ok(Runtime {
            handle,
            sim_worker_handle,
        })
    }
}
