//! Single validation path for player and AI actions.
//!
//! Every intent goes through [`BattlescapeGame::commit_action`]: shape,
//! actor, cost, time units, reservation, then kind-specific checks. Only an
//! accepted action is turned into a queued state; a rejected one leaves the
//! battlefield untouched and carries its message in `action.result`.

use tracing::{debug, info};

use crate::action::{ActionError, BattleAction, BattleActionType};
use crate::ai::reserve_time_units;
use crate::env::{BattleEnv, BattleType, DamageType, ItemRule};
use crate::error::GameError;
use crate::state::{BattleUnit, Battlefield, Faction, UnitCategory, UnitFlags, UnitId};
use crate::states::{BattleState, ProjectileState, UnitTurnState, UnitWalkState};

use super::{BattleEvent, BattlescapeGame};

impl BattlescapeGame {
    /// Validates `action` and queues the state executing it.
    ///
    /// # Errors
    ///
    /// Returns the first failed check. The error message is also written to
    /// `action.result` and an `ActionRejected` event is emitted.
    pub fn commit_action(
        &mut self,
        battle: &mut Battlefield,
        env: &BattleEnv<'_>,
        action: &mut BattleAction,
    ) -> Result<(), ActionError> {
        let outcome = match action.kind {
            BattleActionType::Prime | BattleActionType::Use => {
                self.apply_non_target_action(battle, env, action)
            }
            _ => self.validate_action(battle, env, action).map(|state| {
                if let Some(state) = state {
                    self.state_push_back(state);
                }
            }),
        };

        match outcome {
            Ok(()) => {
                debug!(
                    target: "battle::engine",
                    kind = %action.kind,
                    actor = ?action.actor,
                    time_units = action.time_units,
                    "action committed"
                );
                Ok(())
            }
            Err(error) => {
                debug!(
                    target: "battle::engine",
                    kind = %action.kind,
                    actor = ?action.actor,
                    code = error.error_code(),
                    %error,
                    "action rejected"
                );
                action.result = error.to_string();
                self.emit(BattleEvent::ActionRejected {
                    actor: action.actor,
                    kind: action.kind,
                    code: error.error_code().to_owned(),
                    message: action.result.clone(),
                });
                Err(error)
            }
        }
    }

    fn validate_action(
        &self,
        battle: &Battlefield,
        env: &BattleEnv<'_>,
        action: &mut BattleAction,
    ) -> Result<Option<Box<dyn BattleState>>, ActionError> {
        action.validate_shape()?;
        let Some(actor_id) = action.actor else {
            return Ok(None);
        };
        let actor = battle
            .unit(actor_id)
            .ok_or(ActionError::ActorNotFound(actor_id))?;
        if actor.is_out() {
            return Err(ActionError::ActorIncapacitated(actor_id));
        }
        if !battle.in_bounds(action.target) {
            return Err(ActionError::TargetOutOfBounds(action.target));
        }

        let mut path = None;
        let computed = match action.kind {
            BattleActionType::None => return Ok(None),
            BattleActionType::Walk => {
                let route = env
                    .pathfinding()?
                    .calculate(battle, actor_id, action.target)
                    .filter(|route| !route.is_empty())
                    .ok_or(ActionError::NoPath(action.target))?;
                let cost = route.cost;
                path = Some(route);
                cost
            }
            BattleActionType::Turn => turn_cost(actor, action),
            BattleActionType::Throw => {
                let weapon = action.weapon.ok_or(ActionError::NoWeapon)?;
                if battle.item(weapon).is_none_or(|item| item.owner != Some(actor_id)) {
                    return Err(ActionError::NoWeapon);
                }
                actor.action_time_units(BattleActionType::Throw, None)
            }
            kind => {
                let weapon = action
                    .weapon
                    .or_else(|| actor.main_hand())
                    .ok_or(ActionError::NoWeapon)?;
                let item = battle.item(weapon).ok_or(ActionError::NoWeapon)?;
                let rule = env.item_rule(&item.rule)?;
                check_weapon_mode(kind, rule, item.ammo)?;
                if kind.is_melee() && actor.position.distance_to(action.target) > 1 {
                    return Err(ActionError::OutOfReach);
                }
                action.weapon = Some(weapon);
                actor.action_time_units(kind, Some(rule))
            }
        };

        let cost = if action.time_units > 0 {
            action.time_units
        } else {
            computed
        };
        if actor.time_units < cost {
            return Err(ActionError::NotEnoughTimeUnits {
                required: cost,
                available: actor.time_units,
            });
        }
        if !self.check_reserved_tu(battle, env, actor_id, cost) {
            return Err(ActionError::TimeUnitsReserved);
        }
        action.time_units = cost;
        action.result.clear();

        let state: Box<dyn BattleState> = match (action.kind, path) {
            (BattleActionType::Walk, Some(path)) => {
                Box::new(UnitWalkState::with_path(action.clone(), path, &self.config))
            }
            (BattleActionType::Turn, _) => Box::new(UnitTurnState::new(action.clone(), &self.config)),
            _ => Box::new(ProjectileState::new(action.clone(), &self.config)),
        };
        Ok(Some(state))
    }

    /// Whether `unit` can spend `time_units` and still keep the reserve of
    /// its side.
    ///
    /// The reserve only applies to units of the side that is moving, and
    /// never on the neutral side's turn.
    pub fn check_reserved_tu(
        &self,
        battle: &Battlefield,
        env: &BattleEnv<'_>,
        unit: UnitId,
        time_units: u32,
    ) -> bool {
        let Some(actor) = battle.unit(unit) else {
            return false;
        };
        if actor.faction != battle.side || battle.side == Faction::Neutral {
            return time_units <= actor.time_units;
        }

        let reserved = if battle.side == Faction::Hostile && !self.debug_play {
            let mode = env
                .ai()
                .map_or(BattleActionType::None, |ai| ai.reserve_mode(unit, battle));
            reserve_time_units(mode, actor.stats.time_units)
        } else {
            self.player_reserve(battle, env, actor)
        };
        time_units + reserved <= actor.time_units
    }

    /// Cost of the reserved fire mode with the unit's main weapon, falling
    /// back to the next mode the weapon supports.
    fn player_reserve(&self, battle: &Battlefield, env: &BattleEnv<'_>, actor: &BattleUnit) -> u32 {
        let Some(rule) = actor.main_hand().and_then(|id| env.rule_of(battle, id)) else {
            return 0;
        };
        let cost = |kind| actor.action_time_units(kind, Some(rule));

        let mut mode = self.tu_reserved;
        if mode == BattleActionType::Autoshot && cost(mode) == 0 {
            mode = BattleActionType::Snapshot;
        }
        if mode == BattleActionType::Snapshot && cost(mode) == 0 {
            mode = BattleActionType::Aimedshot;
        }
        if mode == BattleActionType::Aimedshot && cost(mode) == 0 {
            mode = BattleActionType::None;
        }
        match mode {
            BattleActionType::Autoshot
            | BattleActionType::Snapshot
            | BattleActionType::Aimedshot => cost(mode),
            _ => 0,
        }
    }

    /// Resolves the current action when it needs no target tile (priming,
    /// using an item) and resets it.
    pub fn handle_non_target_action(&mut self, battle: &mut Battlefield, env: &BattleEnv<'_>) {
        if self.current_action.targeting {
            return;
        }
        let mut action = std::mem::take(&mut self.current_action);
        if matches!(action.kind, BattleActionType::Prime | BattleActionType::Use) {
            let _ = self.commit_action(battle, env, &mut action);
        }
        self.current_action = BattleAction {
            result: action.result,
            ..BattleAction::none()
        };
        self.setup_cursor(env);
    }

    fn apply_non_target_action(
        &mut self,
        battle: &mut Battlefield,
        env: &BattleEnv<'_>,
        action: &mut BattleAction,
    ) -> Result<(), ActionError> {
        action.validate_shape()?;
        let Some(actor_id) = action.actor else {
            return Ok(());
        };
        let actor = battle
            .unit(actor_id)
            .ok_or(ActionError::ActorNotFound(actor_id))?;
        if actor.is_out() {
            return Err(ActionError::ActorIncapacitated(actor_id));
        }
        let weapon = action
            .weapon
            .or_else(|| actor.main_hand())
            .ok_or(ActionError::NoWeapon)?;
        let item = battle.item(weapon).ok_or(ActionError::NoWeapon)?;
        let rule = env.item_rule(&item.rule)?;
        if action.kind == BattleActionType::Prime && !rule.battle_type.is_grenade() {
            return Err(ActionError::ModeUnavailable(action.kind));
        }
        let cost = actor.action_time_units(action.kind, Some(rule));
        if action.kind == BattleActionType::Use && cost == 0 {
            return Err(ActionError::ModeUnavailable(action.kind));
        }
        if actor.time_units < cost {
            return Err(ActionError::NotEnoughTimeUnits {
                required: cost,
                available: actor.time_units,
            });
        }
        if !self.check_reserved_tu(battle, env, actor_id, cost) {
            return Err(ActionError::TimeUnitsReserved);
        }

        if !self.dont_spend_tus()
            && let Some(actor) = battle.unit_mut(actor_id)
        {
            actor.spend_time_units(cost);
        }
        action.time_units = cost;
        action.weapon = Some(weapon);

        if action.kind == BattleActionType::Prime {
            if let Some(item) = battle.item_mut(weapon) {
                item.fuse_timer = Some(action.value);
            }
            action.result = "grenade is activated".to_owned();
            info!(target: "battle::engine", unit = %actor_id, item = %weapon, fuse = action.value, "grenade primed");
            self.emit(BattleEvent::GrenadePrimed {
                actor: actor_id,
                item: weapon,
                fuse: action.value,
            });
        } else {
            action.result.clear();
        }
        Ok(())
    }

    /// Toggles kneeling for a soldier, charging the kneel or stand cost.
    ///
    /// # Errors
    ///
    /// Returns an error for units that cannot kneel or cannot pay the cost.
    pub fn kneel(
        &mut self,
        battle: &mut Battlefield,
        env: &BattleEnv<'_>,
        unit: UnitId,
    ) -> Result<(), ActionError> {
        let actor = battle.unit(unit).ok_or(ActionError::ActorNotFound(unit))?;
        if actor.is_out() {
            return Err(ActionError::ActorIncapacitated(unit));
        }
        if !matches!(actor.category, UnitCategory::Soldier(_)) || actor.size > 1 {
            return Err(ActionError::CannotKneel);
        }
        let cost = if actor.is_kneeling() {
            self.config.stand_cost
        } else {
            self.config.kneel_cost
        };
        let spend = !self.dont_spend_tus();
        if spend && actor.time_units < cost {
            return Err(ActionError::NotEnoughTimeUnits {
                required: cost,
                available: actor.time_units,
            });
        }
        if !self.check_reserved_tu(battle, env, unit, cost) {
            return Err(ActionError::TimeUnitsReserved);
        }
        let actor = battle
            .unit_mut(unit)
            .ok_or(ActionError::ActorNotFound(unit))?;
        if spend {
            actor.spend_time_units(cost);
        }
        actor.flags.toggle(UnitFlags::KNEELING);
        debug!(target: "battle::engine", unit = %unit, kneeling = actor.is_kneeling(), "kneel toggled");
        env.cache_unit(unit);
        Ok(())
    }
}

/// One time unit per facing step, charged to player units only.
fn turn_cost(actor: &BattleUnit, action: &BattleAction) -> u32 {
    if actor.faction != Faction::Player {
        return 0;
    }
    let Some(target) = actor.position.direction_to(action.target) else {
        return 0;
    };
    let clockwise = (target + 8 - actor.direction) % 8;
    u32::from(clockwise.min(8 - clockwise))
}

fn check_weapon_mode(kind: BattleActionType, rule: &ItemRule, ammo: u32) -> Result<(), ActionError> {
    let available = match kind {
        BattleActionType::Snapshot => rule.tu_snap > 0,
        BattleActionType::Autoshot => rule.tu_auto > 0,
        BattleActionType::Aimedshot => rule.tu_aimed > 0,
        BattleActionType::Hit => rule.tu_melee > 0,
        BattleActionType::Stun => rule.tu_melee > 0 && rule.damage_type == DamageType::Stun,
        _ => false,
    };
    if !available {
        return Err(ActionError::ModeUnavailable(kind));
    }
    if kind.is_shot() && rule.battle_type == BattleType::Firearm && ammo == 0 {
        return Err(ActionError::NoAmmo);
    }
    Ok(())
}
