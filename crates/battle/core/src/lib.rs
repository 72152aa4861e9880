//! Turn and action engine for squad battles on a tile map.
//!
//! `battle-core` holds the battlefield model and the [`engine::BattlescapeGame`]
//! orchestrator that sequences every unit of activity (walking, turning,
//! shooting, explosions, deaths, panic) through a queue of
//! [`states::BattleState`]s. Rules, pathfinding, line of sight, randomness and
//! presentation are consulted through the traits in [`env`], so the crate has
//! no I/O of its own and replays deterministically from a seed.
pub mod action;
pub mod ai;
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod state;
pub mod states;

pub use action::{ActionError, BattleAction, BattleActionType};
pub use ai::{AiContext, AiStrategy, TacticalAi};
pub use config::BattleConfig;
pub use engine::{BattleEvent, BattleOutcome, BattlescapeGame, GamePhase, ItemDrop, QueuedState};
pub use env::{
    AudioSink, BattleEnv, BattleType, CursorMode, DamageType, ItemRule, OracleError, Path,
    Pathfinding, PcgRng, RngOracle, RulesetOracle, SoundCue, TileEngine, ViewSink,
};
pub use error::{ErrorSeverity, GameError};
pub use state::{
    BattleItem, BattleUnit, Battlefield, BattlefieldError, Faction, Gender, ItemId, MapSize,
    Position, SpecialAbility, Tile, UnitCategory, UnitFlags, UnitId, UnitStats, UnitStatus,
};
pub use states::{BattleState, StateContext, StateKind};
