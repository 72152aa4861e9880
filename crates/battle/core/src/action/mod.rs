//! Player and AI intents.
//!
//! A [`BattleAction`] is created fresh for each decision, validated by
//! [`BattlescapeGame::commit_action`](crate::engine::BattlescapeGame::commit_action),
//! carried by the state that executes it, and discarded afterwards.
mod error;

pub use error::ActionError;

use crate::state::{ItemId, Position, UnitId};

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleActionType {
    #[default]
    None,
    Turn,
    Walk,
    Prime,
    Throw,
    Autoshot,
    Snapshot,
    Aimedshot,
    Stun,
    Hit,
    Use,
}

impl BattleActionType {
    pub fn is_shot(self) -> bool {
        matches!(
            self,
            BattleActionType::Autoshot | BattleActionType::Snapshot | BattleActionType::Aimedshot
        )
    }

    pub fn is_melee(self) -> bool {
        matches!(self, BattleActionType::Hit | BattleActionType::Stun)
    }

    /// Whether the player has to pick a tile before the action runs.
    pub fn needs_target(self) -> bool {
        !matches!(
            self,
            BattleActionType::None | BattleActionType::Prime | BattleActionType::Use
        )
    }

    /// Shots fired per action: a burst for autoshot, one otherwise.
    pub fn shot_count(self) -> u32 {
        match self {
            BattleActionType::Autoshot => 3,
            _ => 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleAction {
    pub kind: BattleActionType,
    pub actor: Option<UnitId>,
    pub weapon: Option<ItemId>,
    pub target: Position,
    /// Cost; computed during validation when left at 0.
    pub time_units: u32,
    /// The player is picking a target tile for this action.
    pub targeting: bool,
    /// Auxiliary parameter (fuse delay for priming).
    pub value: i32,
    /// Message for the player; empty means success.
    pub result: String,
}

impl BattleAction {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(kind: BattleActionType, actor: UnitId, target: Position) -> Self {
        Self {
            kind,
            actor: Some(actor),
            target,
            ..Self::default()
        }
    }

    pub fn with_weapon(mut self, weapon: ItemId) -> Self {
        self.weapon = Some(weapon);
        self
    }

    pub fn with_time_units(mut self, time_units: u32) -> Self {
        self.time_units = time_units;
        self
    }

    pub fn with_value(mut self, value: i32) -> Self {
        self.value = value;
        self
    }

    pub fn is_none(&self) -> bool {
        self.kind == BattleActionType::None
    }

    /// Checks that `kind` and `actor` agree: only the empty action has no actor.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::MalformedAction` for any other combination.
    pub fn validate_shape(&self) -> Result<(), ActionError> {
        match (self.kind, self.actor) {
            (BattleActionType::None, None) => Ok(()),
            (BattleActionType::None, Some(_)) | (_, None) => Err(ActionError::MalformedAction {
                kind: self.kind,
                has_actor: self.actor.is_some(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn only_the_empty_action_lacks_an_actor() {
        for kind in BattleActionType::iter() {
            let without = BattleAction {
                kind,
                ..BattleAction::none()
            };
            let with = BattleAction {
                kind,
                actor: Some(UnitId(1)),
                ..BattleAction::none()
            };
            let is_none = kind == BattleActionType::None;
            assert_eq!(without.validate_shape().is_ok(), is_none, "{kind} without actor");
            assert_eq!(with.validate_shape().is_ok(), !is_none, "{kind} with actor");
        }
    }

    #[test]
    fn kinds_parse_from_snake_case() {
        assert_eq!(
            BattleActionType::from_str("aimedshot"),
            Ok(BattleActionType::Aimedshot)
        );
        assert!(BattleActionType::Autoshot.is_shot());
        assert!(!BattleActionType::Prime.needs_target());
        assert_eq!(BattleActionType::Autoshot.shot_count(), 3);
    }
}
