//! Player-facing operations: clicks, action selection, cancel.

use tracing::debug;

use crate::action::{BattleAction, BattleActionType};
use crate::env::BattleEnv;
use crate::state::{Battlefield, ItemId, Position, UnitId};

use super::BattlescapeGame;

impl BattlescapeGame {
    /// Left click on a tile: confirm the target of the current action,
    /// select a friendly unit, or walk the selected unit there.
    pub fn primary_action(
        &mut self,
        battle: &mut Battlefield,
        env: &BattleEnv<'_>,
        position: Position,
    ) {
        if self.is_busy() || self.outcome.is_some() {
            return;
        }
        let side = battle.side;
        let clicked = battle
            .unit_at(position)
            .filter(|id| battle.unit(*id).is_some_and(|unit| unit.faction == side));

        if self.current_action.targeting && self.playable_unit_selected(battle) {
            let mut action = self.current_action.clone();
            action.target = position;
            action.time_units = 0;
            let kind = action.kind;
            match self.commit_action(battle, env, &mut action) {
                Ok(()) => {
                    self.current_action.result.clear();
                    if kind != BattleActionType::Throw {
                        return;
                    }
                    self.current_action.targeting = false;
                    self.hide_cursor(env);
                }
                Err(_) => self.current_action.result = action.result,
            }
            return;
        }

        match (clicked, battle.selected) {
            (Some(unit), selected) if selected != Some(unit) => {
                debug!(target: "battle::engine", unit = %unit, "unit selected");
                battle.selected = Some(unit);
                self.cancel_current_action(battle, env, true);
                env.cache_unit(unit);
            }
            (_, Some(selected)) if self.playable_unit_selected(battle) => {
                let mut action = BattleAction::new(BattleActionType::Walk, selected, position);
                if self.commit_action(battle, env, &mut action).is_err() {
                    self.current_action.result = action.result;
                }
            }
            _ => {}
        }
    }

    /// Right click: abort targeting, otherwise turn the selected unit to
    /// face the tile.
    pub fn secondary_action(
        &mut self,
        battle: &mut Battlefield,
        env: &BattleEnv<'_>,
        position: Position,
    ) {
        if self.current_action.targeting {
            self.cancel_current_action(battle, env, false);
            return;
        }
        if self.is_busy() || !self.playable_unit_selected(battle) {
            return;
        }
        let Some(selected) = battle.selected else {
            return;
        };
        let mut action = BattleAction::new(BattleActionType::Turn, selected, position);
        if self.commit_action(battle, env, &mut action).is_err() {
            self.current_action.result = action.result;
        }
    }

    /// Picks an action for the selected unit from its inventory menu.
    /// Actions without a target tile resolve immediately.
    pub fn select_action(
        &mut self,
        battle: &mut Battlefield,
        env: &BattleEnv<'_>,
        kind: BattleActionType,
        weapon: Option<ItemId>,
        value: i32,
    ) {
        if self.is_busy() || !self.playable_unit_selected(battle) {
            return;
        }
        let Some(selected) = battle.selected else {
            return;
        };
        let weapon = weapon.or_else(|| battle.unit(selected).and_then(|unit| unit.main_hand()));
        self.current_action = BattleAction {
            kind,
            actor: (kind != BattleActionType::None).then_some(selected),
            weapon,
            targeting: kind.needs_target(),
            value,
            ..BattleAction::none()
        };
        if kind.needs_target() {
            self.setup_cursor(env);
        } else {
            self.handle_non_target_action(battle, env);
        }
    }

    /// Moves a unit one level up (`+1`) or down (`-1`).
    pub fn move_up_down(
        &mut self,
        battle: &mut Battlefield,
        env: &BattleEnv<'_>,
        unit: UnitId,
        direction: i32,
    ) {
        let Some(position) = battle.unit(unit).map(|actor| actor.position) else {
            return;
        };
        let mut action = BattleAction::new(
            BattleActionType::Walk,
            unit,
            position.offset(0, 0, direction.signum()),
        );
        if self.commit_action(battle, env, &mut action).is_err() {
            self.current_action.result = action.result;
        }
    }

    /// Cancels what the player is doing.
    ///
    /// With nothing running (or `force`), only targeting can be cancelled.
    /// Otherwise the running state decides; consequences such as deaths
    /// and explosions refuse. When it accepts, not-yet-started follow-ups of
    /// the same unit are dropped.
    pub fn cancel_current_action(
        &mut self,
        battle: &mut Battlefield,
        env: &BattleEnv<'_>,
        force: bool,
    ) -> bool {
        if self.queue.is_empty() || force {
            if self.current_action.targeting {
                self.current_action.targeting = false;
                self.current_action.kind = BattleActionType::None;
                self.current_action.actor = None;
                self.current_action.weapon = None;
                self.setup_cursor(env);
                return true;
            }
            return false;
        }

        let Some(front) = self.queue.front().filter(|slot| !slot.is_end_turn()) else {
            return false;
        };
        let (id, actor) = (front.id, front.actor);
        let accepted = self
            .with_state(id, battle, env, |state, cx| state.cancel(cx))
            .unwrap_or(false);
        if accepted {
            debug!(target: "battle::engine", actor = ?actor, "action cancelled");
            if let Some(actor) = actor {
                self.queue.retain_after_front(|slot| {
                    slot.actor != Some(actor)
                        || slot.started
                        || slot.state().is_none_or(|state| !state.interruptible())
                });
            }
        }
        accepted
    }
}
