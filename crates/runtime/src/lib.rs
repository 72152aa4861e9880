//! Runtime orchestration for battlescape sessions.
//!
//! This crate wires the [`battle_core`] engine to default collaborators,
//! scenario files, and a tokio worker that ticks the battle. Consumers embed
//! [`Runtime`] to run a battle, subscribe to its events, and send player
//! commands through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`oracle`] and [`scenario`] provide data adapters reused by other crates
//! - `workers` keeps the simulation task internal to the crate
pub mod api;
pub mod events;
pub mod oracle;
pub mod runtime;
pub mod scenario;

mod workers;

pub use api::{BattleSnapshot, PlayerCommand, Result, RuntimeError, RuntimeHandle};
pub use events::{Event, EventBus, Topic};
pub use oracle::{
    GridPathfinding, GridTileEngine, OracleBundle, StaticRuleset, TracingAudio, TracingView,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use scenario::{CarriedItem, ItemPlacement, Scenario, UnitPlacement};
