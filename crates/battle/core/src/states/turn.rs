use crate::action::BattleAction;
use crate::config::BattleConfig;
use crate::state::{Faction, UnitId, UnitStatus};

use super::{BattleState, Pacing, StateContext, StateKind};

/// Rotates a unit to face a tile, one eighth per step.
#[derive(Debug)]
pub struct UnitTurnState {
    action: BattleAction,
    stop_requested: bool,
    pacing: Pacing,
}

impl UnitTurnState {
    pub fn new(action: BattleAction, config: &BattleConfig) -> Self {
        Self {
            action,
            stop_requested: false,
            pacing: Pacing::new(config.anim_interval),
        }
    }

    fn actor(&self) -> Option<UnitId> {
        self.action.actor
    }

    fn stop(&mut self, cx: &mut StateContext<'_>) {
        if let Some(actor) = self.actor() {
            if let Some(unit) = cx.battle.unit_mut(actor)
                && unit.status == UnitStatus::Turning
            {
                unit.abort_turn();
            }
            cx.env.cache_unit(actor);
        }
        cx.pop_state();
    }
}

impl BattleState for UnitTurnState {
    fn kind(&self) -> StateKind {
        StateKind::UnitTurn
    }

    fn action(&self) -> Option<&BattleAction> {
        Some(&self.action)
    }

    fn interruptible(&self) -> bool {
        true
    }

    fn init(&mut self, cx: &mut StateContext<'_>) {
        if self.stop_requested {
            self.stop(cx);
            return;
        }
        let target = self.action.target;
        let turning = self
            .actor()
            .and_then(|actor| cx.battle.unit_mut(actor))
            .filter(|unit| !unit.is_out())
            .map(|unit| {
                unit.look_at_position(target);
                unit.status == UnitStatus::Turning
            })
            .unwrap_or(false);
        if !turning {
            self.stop(cx);
        }
    }

    fn think(&mut self, cx: &mut StateContext<'_>) {
        if self.stop_requested {
            self.stop(cx);
            return;
        }
        if !self.pacing.tick() {
            return;
        }
        let Some(actor) = self.actor() else {
            cx.pop_state();
            return;
        };
        let charged = cx
            .battle
            .unit(actor)
            .is_some_and(|unit| unit.faction == Faction::Player);
        if charged && !cx.spend_time_units(actor, 1) {
            self.action.result = "not enough time units".to_owned();
            self.stop(cx);
            return;
        }
        let Some(unit) = cx.battle.unit_mut(actor) else {
            cx.pop_state();
            return;
        };
        unit.turn();
        let done = unit.status != UnitStatus::Turning;
        cx.env.recompute_fov(cx.battle, actor);
        cx.env.cache_unit(actor);
        if done {
            cx.pop_state();
        }
    }

    fn cancel(&mut self, cx: &mut StateContext<'_>) -> bool {
        if let Some(unit) = self.actor().and_then(|actor| cx.battle.unit_mut(actor)) {
            unit.abort_turn();
        }
        self.stop_requested = true;
        true
    }
}
