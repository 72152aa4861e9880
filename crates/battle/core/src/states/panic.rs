use tracing::debug;

use crate::state::UnitId;

use super::{BattleState, StateContext, StateKind};

/// Closes a panic episode: the unit loses whatever time units it had left.
#[derive(Debug)]
pub struct UnitPanicState {
    unit: UnitId,
}

impl UnitPanicState {
    pub fn new(unit: UnitId) -> Self {
        Self { unit }
    }
}

impl BattleState for UnitPanicState {
    fn kind(&self) -> StateKind {
        StateKind::UnitPanic
    }

    fn think(&mut self, cx: &mut StateContext<'_>) {
        if let Some(unit) = cx.battle.unit_mut(self.unit) {
            unit.abort_turn();
            unit.time_units = 0;
            debug!(target: "battle::state", unit = %self.unit, status = %unit.status, "panic resolved");
        }
        cx.pop_state();
    }
}
