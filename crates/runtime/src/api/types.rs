use serde::Serialize;

use battle_core::{
    BattleAction, BattleActionType, BattleOutcome, Battlefield, CursorMode, GamePhase, ItemId,
    Position, QueuedState, UnitId,
};

/// Player intents accepted by the simulation worker between ticks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayerCommand {
    /// Left click on a tile.
    Click(Position),
    /// Right click on a tile.
    RightClick(Position),
    SelectAction {
        kind: BattleActionType,
        weapon: Option<ItemId>,
        value: i32,
    },
    Kneel,
    NextUnit,
    /// `+1` climbs a level, `-1` descends.
    MoveUpDown(i32),
    SetReserve(BattleActionType),
    Cancel,
    EndTurn,
}

/// Read-only copy of the session, taken between ticks.
#[derive(Clone, Debug, Serialize)]
pub struct BattleSnapshot {
    pub tick: u64,
    pub battlefield: Battlefield,
    #[serde(serialize_with = "serialize_display")]
    pub phase: GamePhase,
    pub outcome: Option<BattleOutcome>,
    pub current_action: BattleAction,
    pub tu_reserved: BattleActionType,
    pub cursor: CursorMode,
    #[serde(skip)]
    pub queue: Vec<QueuedState>,
}

impl BattleSnapshot {
    pub fn selected_unit(&self) -> Option<UnitId> {
        self.battlefield.selected
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn serialize_display<S, T>(value: &T, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
    T: std::fmt::Display,
{
    serializer.collect_str(value)
}
