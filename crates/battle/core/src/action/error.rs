//! Rejections raised while validating a [`BattleAction`](super::BattleAction).

use crate::env::OracleError;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{Position, UnitId};

use super::BattleActionType;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("malformed action: {kind} with actor present = {has_actor}")]
    MalformedAction {
        kind: BattleActionType,
        has_actor: bool,
    },

    #[error("unit {0} is not on the battlefield")]
    ActorNotFound(UnitId),

    #[error("unit {0} cannot act")]
    ActorIncapacitated(UnitId),

    #[error("not enough time units")]
    NotEnoughTimeUnits { required: u32, available: u32 },

    #[error("time units reserved")]
    TimeUnitsReserved,

    #[error("no weapon in hand")]
    NoWeapon,

    #[error("no ammunition loaded")]
    NoAmmo,

    #[error("weapon cannot {0}")]
    ModeUnavailable(BattleActionType),

    #[error("target {0:?} is off the map")]
    TargetOutOfBounds(Position),

    #[error("no route to {0:?}")]
    NoPath(Position),

    #[error("target is out of reach")]
    OutOfReach,

    #[error("unit cannot kneel")]
    CannotKneel,

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

impl GameError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            ActionError::NotEnoughTimeUnits { .. }
            | ActionError::TimeUnitsReserved
            | ActionError::NoAmmo
            | ActionError::NoPath(_)
            | ActionError::OutOfReach => ErrorSeverity::Recoverable,
            ActionError::MalformedAction { .. }
            | ActionError::ActorNotFound(_)
            | ActionError::ActorIncapacitated(_)
            | ActionError::NoWeapon
            | ActionError::ModeUnavailable(_)
            | ActionError::TargetOutOfBounds(_)
            | ActionError::CannotKneel => ErrorSeverity::Validation,
            ActionError::Oracle(error) => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ActionError::MalformedAction { .. } => "STR_MALFORMED_ACTION",
            ActionError::ActorNotFound(_) => "STR_UNIT_NOT_FOUND",
            ActionError::ActorIncapacitated(_) => "STR_UNIT_INCAPACITATED",
            ActionError::NotEnoughTimeUnits { .. } => "STR_NOT_ENOUGH_TIME_UNITS",
            ActionError::TimeUnitsReserved => "STR_TIME_UNITS_RESERVED",
            ActionError::NoWeapon => "STR_NO_WEAPON",
            ActionError::NoAmmo => "STR_NO_AMMUNITION_LOADED",
            ActionError::ModeUnavailable(_) => "STR_ACTION_NOT_ALLOWED",
            ActionError::TargetOutOfBounds(_) => "STR_OUT_OF_BOUNDS",
            ActionError::NoPath(_) => "STR_NO_ROUTE",
            ActionError::OutOfReach => "STR_OUT_OF_RANGE",
            ActionError::CannotKneel => "STR_CANNOT_KNEEL",
            ActionError::Oracle(error) => error.error_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_unit_shortage_is_recoverable() {
        let error = ActionError::NotEnoughTimeUnits {
            required: 35,
            available: 30,
        };
        assert_eq!(error.error_code(), "STR_NOT_ENOUGH_TIME_UNITS");
        assert!(error.severity().is_recoverable());
        assert_eq!(error.to_string(), "not enough time units");
    }

    #[test]
    fn missing_ruleset_is_fatal() {
        let error = ActionError::from(OracleError::RulesetNotAvailable);
        assert!(error.severity().is_internal());
    }
}
