//! Conditions and actions for the tactical AI.
//!
//! Conditions only read the [`AiContext`]; actions store the chosen
//! [`BattleAction`] in it and succeed.

use crate::action::{BattleAction, BattleActionType};
use crate::state::Position;

use super::AiContext;
use super::tree::{Behavior, Status};

/// Beyond this range an aimed shot is preferred over a snap shot.
const AIMED_RANGE: u32 = 6;

/// Tiles covered by one advance.
const ADVANCE_STEP: i32 = 4;

fn status(condition: bool) -> Status {
    if condition {
        Status::Success
    } else {
        Status::Failure
    }
}

pub struct HasVisibleEnemy;

impl Behavior<AiContext> for HasVisibleEnemy {
    fn tick(&self, ctx: &mut AiContext) -> Status {
        status(!ctx.enemies.is_empty())
    }
}

/// The unit holds a loaded weapon and can afford at least one attack while
/// keeping its reserve.
pub struct HasUsableWeapon;

impl Behavior<AiContext> for HasUsableWeapon {
    fn tick(&self, ctx: &mut AiContext) -> Status {
        let Some(weapon) = ctx.weapon else {
            return Status::Failure;
        };
        let usable = [weapon.snap_cost, weapon.aimed_cost, weapon.melee_cost]
            .into_iter()
            .any(|cost| cost > 0 && ctx.affords(cost));
        status(weapon.loaded && usable)
    }
}

/// Hits an adjacent enemy, otherwise shoots the nearest one.
pub struct ShootNearestEnemy;

impl Behavior<AiContext> for ShootNearestEnemy {
    fn tick(&self, ctx: &mut AiContext) -> Status {
        let (Some(weapon), Some(&(_, target))) = (ctx.weapon, ctx.enemies.first()) else {
            return Status::Failure;
        };
        let distance = ctx.position.distance_to(target);
        let fits = |cost: u32| cost > 0 && ctx.affords(cost);

        let (kind, cost) = if distance <= 1 && fits(weapon.melee_cost) {
            (BattleActionType::Hit, weapon.melee_cost)
        } else if distance >= AIMED_RANGE && fits(weapon.aimed_cost) {
            (BattleActionType::Aimedshot, weapon.aimed_cost)
        } else if fits(weapon.snap_cost) {
            (BattleActionType::Snapshot, weapon.snap_cost)
        } else if fits(weapon.aimed_cost) {
            (BattleActionType::Aimedshot, weapon.aimed_cost)
        } else {
            return Status::Failure;
        };
        let action = BattleAction::new(kind, ctx.unit, target)
            .with_weapon(weapon.item)
            .with_time_units(cost);
        ctx.set_action(action);
        Status::Success
    }
}

/// Walks part of the way toward the nearest enemy, stopping short of its tile.
pub struct AdvanceTowardEnemy;

impl Behavior<AiContext> for AdvanceTowardEnemy {
    fn tick(&self, ctx: &mut AiContext) -> Status {
        let Some(&(_, enemy)) = ctx.enemies.first() else {
            return Status::Failure;
        };
        if ctx.position.distance_to(enemy) <= 1 {
            return Status::Failure;
        }
        let delta = enemy - ctx.position;
        let step = |d: i32| d.clamp(-ADVANCE_STEP, ADVANCE_STEP);
        let mut target = ctx.position.offset(step(delta.x), step(delta.y), 0);
        if target == enemy {
            target = target.offset(-delta.x.signum(), -delta.y.signum(), 0);
        }
        if target == ctx.position {
            return Status::Failure;
        }
        ctx.set_action(BattleAction::new(BattleActionType::Walk, ctx.unit, target));
        Status::Success
    }
}

/// Wanders to a random nearby tile.
pub struct Patrol;

impl Behavior<AiContext> for Patrol {
    fn tick(&self, ctx: &mut AiContext) -> Status {
        if ctx.wander == ctx.position {
            return Status::Failure;
        }
        ctx.set_action(BattleAction::new(BattleActionType::Walk, ctx.unit, ctx.wander));
        Status::Success
    }
}

/// Ends the unit's activation.
pub struct Idle;

impl Behavior<AiContext> for Idle {
    fn tick(&self, ctx: &mut AiContext) -> Status {
        ctx.set_action(BattleAction::none());
        Status::Success
    }
}
