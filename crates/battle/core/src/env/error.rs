use crate::error::{ErrorSeverity, GameError};

/// A collaborator the engine needs is missing, or it lacks the data asked for.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    #[error("RulesetOracle not available")]
    RulesetNotAvailable,

    #[error("Pathfinding not available")]
    PathfindingNotAvailable,

    #[error("TileEngine not available")]
    TileEngineNotAvailable,

    #[error("item rule '{0}' not found")]
    UnknownItemRule(String),
}

impl GameError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            OracleError::RulesetNotAvailable
            | OracleError::PathfindingNotAvailable
            | OracleError::TileEngineNotAvailable => ErrorSeverity::Fatal,
            OracleError::UnknownItemRule(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            OracleError::RulesetNotAvailable => "ORACLE_RULESET_NOT_AVAILABLE",
            OracleError::PathfindingNotAvailable => "ORACLE_PATHFINDING_NOT_AVAILABLE",
            OracleError::TileEngineNotAvailable => "ORACLE_TILE_ENGINE_NOT_AVAILABLE",
            OracleError::UnknownItemRule(_) => "ORACLE_UNKNOWN_ITEM_RULE",
        }
    }
}
