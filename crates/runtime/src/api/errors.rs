use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::oneshot;

use battle_core::{ActionError, BattleOutcome, BattlefieldError};

/// Errors surfaced by the runtime orchestrator and its public API.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker task failed to join")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires a battlefield or scenario before building")]
    MissingBattlefield,

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {origin}")]
    Parse {
        origin: String,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error(transparent)]
    Battlefield(#[from] BattlefieldError),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("battle already finished: {0}")]
    BattleFinished(BattleOutcome),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
