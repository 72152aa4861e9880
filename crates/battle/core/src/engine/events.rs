use crate::action::BattleActionType;
use crate::state::{Faction, ItemId, Position, UnitId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleOutcome {
    Victory,
    Defeat,
}

/// Observable things that happened during a tick. Drained by the session
/// and published to subscribers; the engine never reads them back.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleEvent {
    ActionRejected {
        actor: Option<UnitId>,
        kind: BattleActionType,
        code: String,
        message: String,
    },
    /// Result message of a finished action (walk interrupted, grenade primed).
    ActionMessage { actor: UnitId, message: String },
    UnitMoved { unit: UnitId, to: Position },
    ShotFired {
        actor: UnitId,
        target: Position,
        hit: bool,
    },
    GrenadePrimed {
        actor: UnitId,
        item: ItemId,
        fuse: i32,
    },
    ItemDropped { item: ItemId, position: Position },
    Explosion {
        center: Position,
        power: u32,
        radius: u32,
    },
    UnitKilled {
        unit: UnitId,
        killer: Option<UnitId>,
    },
    UnitKnockedOut { unit: UnitId },
    CorpseCreated {
        unit: UnitId,
        item: ItemId,
        position: Position,
    },
    UnitPanicked { unit: UnitId, berserk: bool },
    UnitRevived { unit: UnitId },
    TurnEnded { side: Faction, turn: u32 },
    BattleFinished { outcome: BattleOutcome },
}

impl BattleEvent {
    /// Turn bookkeeping as opposed to in-battle activity.
    pub fn is_turn_event(&self) -> bool {
        matches!(
            self,
            BattleEvent::TurnEnded { .. } | BattleEvent::BattleFinished { .. }
        )
    }
}
