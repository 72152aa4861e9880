//! Turn flow: AI activation, unit rotation, and the end-of-turn sequence.

use tracing::{debug, info};

use crate::action::BattleAction;
use crate::env::BattleEnv;
use crate::state::{Battlefield, Faction, UnitFlags, UnitId};
use crate::states::ExplosionState;

use super::{BattleEvent, BattleOutcome, BattlescapeGame};

impl BattlescapeGame {
    /// Queues an end-of-turn marker behind everything pending. Repeated
    /// requests before the turn ends are ignored.
    pub fn request_end_turn(&mut self) {
        if self.end_turn_requested {
            return;
        }
        debug!(target: "battle::engine", "end of turn requested");
        self.end_turn_requested = true;
        self.queue.push_back_end_turn();
    }

    /// Selects the next unit of the moving side for the player.
    pub fn select_next_player_unit(
        &mut self,
        battle: &mut Battlefield,
        env: &BattleEnv<'_>,
        check_reselect: bool,
    ) -> Option<UnitId> {
        if self.is_busy() {
            return battle.selected;
        }
        let next = battle.select_next_unit(battle.side, check_reselect, false);
        if let Some(position) = next.and_then(|id| battle.unit(id)).map(|unit| unit.position) {
            env.center_on(position);
        }
        self.cancel_current_action(battle, env, true);
        next
    }

    /// Lets the AI act with `unit`, or moves on to the next unit once this
    /// one has used its actions.
    pub fn handle_ai(&mut self, battle: &mut Battlefield, env: &BattleEnv<'_>, unit: UnitId) {
        let Some(actor) = battle.unit_mut(unit) else {
            self.advance_ai_unit(battle, env);
            return;
        };
        if actor.time_units <= self.config.ai_min_time_units {
            actor.flags.insert(UnitFlags::DONT_RESELECT);
        }
        let position = actor.position;
        if self.ai_action_counter >= self.config.ai_actions_per_unit || !actor.reselect_allowed() {
            self.advance_ai_unit(battle, env);
            return;
        }

        self.ai_action_counter += 1;
        if self.ai_action_counter == 1 {
            env.center_on(position);
        }

        let mut action = env
            .ai()
            .map_or_else(BattleAction::none, |ai| ai.decide(unit, battle, env));
        debug!(
            target: "battle::engine",
            unit = %unit,
            kind = %action.kind,
            target = ?action.target,
            counter = self.ai_action_counter,
            "ai decision"
        );
        if action.is_none() {
            self.advance_ai_unit(battle, env);
            return;
        }
        if self.commit_action(battle, env, &mut action).is_err() {
            debug!(target: "battle::engine", unit = %unit, result = %action.result, "ai action refused");
        }
    }

    /// Passes control to the next AI unit, or ends the turn when none is left.
    pub(crate) fn advance_ai_unit(&mut self, battle: &mut Battlefield, env: &BattleEnv<'_>) {
        self.ai_action_counter = 0;
        match battle.select_next_unit(battle.side, true, true) {
            Some(next) => {
                if let Some(unit) = battle.unit(next) {
                    env.center_on(unit.position);
                }
            }
            None => self.request_end_turn(),
        }
    }

    /// Closes the current side's turn and opens the next one.
    pub fn end_turn(&mut self, battle: &mut Battlefield, env: &BattleEnv<'_>) {
        self.debug_play = false;
        self.current_action = BattleAction::none();

        let primed = battle.items.iter().find_map(|item| {
            let position = item.position?;
            let rule = env.item_rule(&item.rule).ok()?;
            (item.fuse_timer == Some(0) && rule.battle_type.is_grenade())
                .then(|| (item.id, position, rule, item.previous_owner))
        });
        if let Some((item, position, rule, owner)) = primed {
            info!(target: "battle::engine", item = %item, ?position, "grenade goes off");
            let explosion =
                ExplosionState::from_item(position, item, rule, owner, &self.config).consuming_item();
            self.state_push_next(Box::new(explosion));
            battle.detach_item(item);
            self.queue.push_back_end_turn();
            return;
        }

        if battle.side != Faction::Neutral {
            for item in battle.items.iter_mut() {
                if let Some(fuse) = item.fuse_timer.as_mut()
                    && *fuse > 0
                {
                    *fuse -= 1;
                }
            }
        }

        let side = battle.advance_side();
        for unit in battle.units.iter_mut().filter(|unit| unit.faction == side) {
            unit.prepare_new_turn();
        }
        for unit in battle.revive_unconscious_units() {
            info!(target: "battle::engine", unit = %unit, "unit regains consciousness");
            self.emit(BattleEvent::UnitRevived { unit });
        }
        let movers: Vec<UnitId> = battle
            .units
            .iter()
            .filter(|unit| unit.faction == side && !unit.is_out())
            .map(|unit| unit.id)
            .collect();
        for unit in movers {
            self.check_for_panic(battle, env, unit);
        }

        self.check_for_casualties(battle, env, None, None, false, false);
        env.recompute_lighting(battle);

        let (players, hostiles) = battle.tally();
        if players == 0 || hostiles == 0 {
            let outcome = if hostiles == 0 && players > 0 {
                BattleOutcome::Victory
            } else {
                BattleOutcome::Defeat
            };
            info!(target: "battle::engine", %outcome, turn = battle.turn, "battle finished");
            self.outcome = Some(outcome);
            self.end_turn_requested = false;
            battle.selected = None;
            self.emit(BattleEvent::BattleFinished { outcome });
            return;
        }

        info!(target: "battle::engine", %side, turn = battle.turn, "turn started");
        self.emit(BattleEvent::TurnEnded {
            side,
            turn: battle.turn,
        });
        self.end_turn_requested = false;
        self.ai_action_counter = 0;
        battle.selected = None;
        battle.select_next_unit(side, false, false);

        if side == Faction::Player {
            self.player_panic_handled = false;
            self.setup_cursor(env);
        } else {
            self.hide_cursor(env);
        }
    }
}
