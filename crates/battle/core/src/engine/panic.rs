//! Morale breaks: panic rolls and the scripted behaviour that follows.

use tracing::info;

use crate::action::{BattleAction, BattleActionType};
use crate::env::BattleEnv;
use crate::state::{Battlefield, Faction, Position, UnitId, UnitStatus};
use crate::states::{ProjectileState, UnitPanicState, UnitTurnState, UnitWalkState};

use super::{BattleEvent, BattlescapeGame, ItemDrop};

const PANIC_ROLL: u32 = 0;
const PANIC_KIND_ROLL: u32 = 1;
const FLEE_ROLL: u32 = 2;
const TARGET_ROLL: u32 = 3;

impl BattlescapeGame {
    /// Rolls the unit's morale at the start of its turn. A failed roll makes
    /// it panic (or go berserk) and queues the forced behaviour.
    pub fn check_for_panic(
        &mut self,
        battle: &mut Battlefield,
        env: &BattleEnv<'_>,
        unit: UnitId,
    ) -> bool {
        let Some(morale) = battle
            .unit(unit)
            .filter(|candidate| !candidate.is_out())
            .map(|candidate| candidate.morale)
        else {
            return false;
        };
        let chance = 100 - 2 * morale as i32;
        if chance <= 0 {
            return false;
        }
        let roll = env.rng().roll_d100(battle.next_seed(unit.0, PANIC_ROLL));
        if roll as i32 > chance {
            return false;
        }

        let berserk = env
            .rng()
            .range(battle.next_seed(unit.0, PANIC_KIND_ROLL), 0, 100)
            <= 33;
        if let Some(panicking) = battle.unit_mut(unit) {
            panicking.status = if berserk {
                UnitStatus::Berserk
            } else {
                UnitStatus::Panicking
            };
        }
        info!(target: "battle::engine", unit = %unit, morale, berserk, "unit panicked");
        self.emit(BattleEvent::UnitPanicked { unit, berserk });
        self.handle_panicking_unit(battle, env, unit);
        true
    }

    /// Queues the forced behaviour of a panicking or berserk unit. Returns
    /// `false` when the unit is neither.
    pub fn handle_panicking_unit(
        &mut self,
        battle: &mut Battlefield,
        env: &BattleEnv<'_>,
        unit: UnitId,
    ) -> bool {
        let Some(panicking) = battle.unit_mut(unit) else {
            return false;
        };
        let status = panicking.status;
        if !matches!(status, UnitStatus::Panicking | UnitStatus::Berserk) {
            return false;
        }
        let position = panicking.position;
        panicking.abort_turn();
        env.center_on(position);
        battle.selected = Some(unit);

        match status {
            UnitStatus::Panicking => self.queue_flight(battle, env, unit, position),
            _ => self.queue_berserk(battle, env, unit, position),
        }

        self.state_push_back(Box::new(UnitPanicState::new(unit)));
        let bonus = self.config.panic_morale_bonus;
        if let Some(panicking) = battle.unit_mut(unit) {
            panicking.morale_change(bonus);
        }
        true
    }

    /// Half the time the unit drops what it holds and runs; otherwise it
    /// freezes.
    fn queue_flight(
        &mut self,
        battle: &mut Battlefield,
        env: &BattleEnv<'_>,
        unit: UnitId,
        position: Position,
    ) {
        let flee = env.rng().range(battle.next_seed(unit.0, FLEE_ROLL), 0, 100);
        if flee > 50 {
            return;
        }
        let held: Vec<_> = battle
            .unit(unit)
            .map(|panicking| panicking.inventory.iter().take(2).copied().collect())
            .unwrap_or_default();
        for item in held {
            self.drop_item(battle, env, position, ItemDrop::Existing(item));
        }

        let target = self.random_nearby(battle, env, unit, position);
        let Ok(pathfinding) = env.pathfinding() else {
            return;
        };
        if let Some(path) = pathfinding
            .calculate(battle, unit, target)
            .filter(|path| !path.is_empty())
        {
            let action = BattleAction::new(BattleActionType::Walk, unit, target)
                .with_time_units(path.cost);
            self.state_push_back(Box::new(UnitWalkState::with_path(action, path, &self.config)));
        }
    }

    /// Four random turns, then snap shots until time units or ammo run out.
    fn queue_berserk(
        &mut self,
        battle: &mut Battlefield,
        env: &BattleEnv<'_>,
        unit: UnitId,
        position: Position,
    ) {
        for _ in 0..4 {
            let target = self.random_nearby(battle, env, unit, position);
            let action = BattleAction::new(BattleActionType::Turn, unit, target);
            self.state_push_back(Box::new(UnitTurnState::new(action, &self.config)));
        }

        let Some(berserk) = battle.unit(unit) else {
            return;
        };
        let Some(weapon) = berserk.main_hand() else {
            return;
        };
        let Some(rule) = env.rule_of(battle, weapon) else {
            return;
        };
        let cost = berserk.action_time_units(BattleActionType::Snapshot, Some(rule));
        if cost == 0 {
            return;
        }
        let shots = (berserk.time_units / cost).min(self.config.max_berserk_shots);
        let enemy = nearest_visible_enemy(battle, env, unit);
        for _ in 0..shots {
            let target = match enemy {
                Some(target) => target,
                None => self.random_nearby(battle, env, unit, position),
            };
            let action = BattleAction::new(BattleActionType::Snapshot, unit, target)
                .with_weapon(weapon)
                .with_time_units(cost);
            self.state_push_back(Box::new(ProjectileState::new(action, &self.config)));
        }
    }

    fn random_nearby(
        &self,
        battle: &mut Battlefield,
        env: &BattleEnv<'_>,
        unit: UnitId,
        position: Position,
    ) -> Position {
        let radius = self.config.panic_flee_radius;
        let dx = env
            .rng()
            .range_i32(battle.next_seed(unit.0, TARGET_ROLL), -radius, radius);
        let dy = env
            .rng()
            .range_i32(battle.next_seed(unit.0, TARGET_ROLL), -radius, radius);
        battle.clamp(position.offset(dx, dy, 0))
    }

    /// Runs the forced behaviour of the next panicking player unit. Returns
    /// `true` once no player unit is left panicking.
    pub fn handle_panicking_player(
        &mut self,
        battle: &mut Battlefield,
        env: &BattleEnv<'_>,
    ) -> bool {
        let panicking = battle
            .units
            .iter()
            .filter(|unit| {
                unit.faction == Faction::Player && unit.original_faction == Faction::Player
            })
            .filter(|unit| matches!(unit.status, UnitStatus::Panicking | UnitStatus::Berserk))
            .map(|unit| unit.id)
            .next();
        match panicking {
            Some(unit) => !self.handle_panicking_unit(battle, env, unit),
            None => true,
        }
    }
}

fn nearest_visible_enemy(battle: &Battlefield, env: &BattleEnv<'_>, unit: UnitId) -> Option<Position> {
    let shooter = battle.unit(unit)?;
    env.visible_units(battle, unit)
        .into_iter()
        .filter_map(|id| battle.unit(id))
        .filter(|other| !other.is_out() && shooter.faction.is_hostile_to(other.faction))
        .min_by_key(|other| shooter.position.distance_to(other.position))
        .map(|other| other.position)
}
