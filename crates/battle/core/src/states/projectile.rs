//! Shots, melee blows and throws.
//!
//! The flight itself is not animated; each think resolves one shot. Time
//! units are charged on the first think, after which the action can no
//! longer be cancelled.

use tracing::{debug, info};

use crate::action::{BattleAction, BattleActionType};
use crate::combat;
use crate::config::BattleConfig;
use crate::engine::{BattleEvent, ItemDrop};
use crate::env::{BattleType, ItemRule};
use crate::state::{ItemId, Position, UnitId, UnitStatus};

use super::{BattleState, ExplosionState, Pacing, StateContext, StateKind};

const HIT_ROLL: u32 = 0;
const DAMAGE_ROLL: u32 = 1;
const DEVIATION_ROLL: u32 = 2;

/// Tiles a missed shot or throw may land away from the aimed tile.
const MAX_DEVIATION: i32 = 2;

#[derive(Debug)]
pub struct ProjectileState {
    action: BattleAction,
    shots_left: u32,
    committed: bool,
    cancelled: bool,
    pacing: Pacing,
}

impl ProjectileState {
    pub fn new(action: BattleAction, config: &BattleConfig) -> Self {
        Self {
            shots_left: action.kind.shot_count(),
            action,
            committed: false,
            cancelled: false,
            pacing: Pacing::new(config.anim_interval),
        }
    }

    fn finish(&mut self, cx: &mut StateContext<'_>, actor: UnitId, result: Option<&str>) {
        if let Some(result) = result {
            self.action.result = result.to_owned();
        }
        if let Some(unit) = cx.battle.unit_mut(actor)
            && unit.status == UnitStatus::Aiming
        {
            unit.status = UnitStatus::Standing;
        }
        cx.env.cache_unit(actor);
        cx.pop_state();
    }

    /// Where a shot or throw lands: on target when it hits, otherwise a
    /// clamped random offset around it.
    fn landing(&self, cx: &mut StateContext<'_>, actor: UnitId, hit: bool) -> Position {
        if hit {
            return self.action.target;
        }
        let rng = cx.env.rng();
        let dx = rng.range_i32(
            cx.battle.next_seed(actor.0, DEVIATION_ROLL),
            -MAX_DEVIATION,
            MAX_DEVIATION,
        );
        let dy = rng.range_i32(
            cx.battle.next_seed(actor.0, DEVIATION_ROLL),
            -MAX_DEVIATION,
            MAX_DEVIATION,
        );
        cx.battle.clamp(self.action.target.offset(dx, dy, 0))
    }

    fn roll_hit(&self, cx: &mut StateContext<'_>, actor: UnitId, rule: Option<&ItemRule>) -> bool {
        let Some(shooter) = cx.battle.unit(actor) else {
            return false;
        };
        let chance = combat::hit_chance(shooter, self.action.kind, rule);
        let roll = cx.env.rng().roll_d100(cx.battle.next_seed(actor.0, HIT_ROLL));
        roll <= chance
    }

    fn throw(&mut self, cx: &mut StateContext<'_>, actor: UnitId, item: ItemId) {
        let hit = self.roll_hit(cx, actor, None);
        let landing = self.landing(cx, actor, hit);
        if !cx.drop_item(landing, ItemDrop::Existing(item)) {
            self.action.result = "cannot throw there".to_owned();
            return;
        }
        let Some(landed) = cx.battle.item(item).and_then(|thrown| thrown.position) else {
            return;
        };
        info!(target: "battle::state", unit = %actor, item = %item, position = ?landed, "item thrown");

        let fuse = cx.battle.item(item).and_then(|thrown| thrown.fuse_timer);
        if fuse == Some(0)
            && let Some(rule) = cx.env.rule_of(cx.battle, item)
            && rule.battle_type.is_grenade()
        {
            let explosion =
                ExplosionState::from_item(landed, item, rule, Some(actor), cx.config()).consuming_item();
            cx.push_front(Box::new(explosion));
        }
    }

    /// One shot or blow. Returns `false` when the action cannot go on.
    fn fire(&mut self, cx: &mut StateContext<'_>, actor: UnitId, weapon: ItemId) -> bool {
        let Some(rule) = cx.env.rule_of(cx.battle, weapon) else {
            self.action.result = "weapon unavailable".to_owned();
            return false;
        };
        let kind = self.action.kind;
        if kind.is_shot() && rule.battle_type == BattleType::Firearm {
            let Some(item) = cx.battle.item_mut(weapon).filter(|item| item.ammo > 0) else {
                self.action.result = "no ammunition loaded".to_owned();
                return false;
            };
            item.ammo -= 1;
        }

        let hit = self.roll_hit(cx, actor, Some(rule));
        let landing = if kind.is_melee() {
            self.action.target
        } else {
            self.landing(cx, actor, hit)
        };
        debug!(target: "battle::state", unit = %actor, %kind, hit, position = ?landing, "shot resolved");
        cx.emit(BattleEvent::ShotFired {
            actor,
            target: landing,
            hit,
        });

        if rule.is_explosive() && !kind.is_melee() {
            let explosion = ExplosionState::from_item(landing, weapon, rule, Some(actor), cx.config());
            cx.push_front(Box::new(explosion));
            return true;
        }
        if kind.is_melee() && !hit {
            return true;
        }
        let Some(victim) = cx.battle.unit_at(landing).filter(|victim| *victim != actor) else {
            return true;
        };
        let amount = combat::roll_damage(
            cx.env.rng(),
            cx.battle.next_seed(actor.0, DAMAGE_ROLL),
            rule.power,
        );
        if let Some(unit) = cx.battle.unit_mut(victim) {
            let dealt = unit.damage(amount, rule.damage_type);
            debug!(target: "battle::state", unit = %victim, dealt, damage = %rule.damage_type, "unit hit");
        }
        cx.env.cache_unit(victim);
        cx.check_for_casualties(Some(weapon), Some(actor), false, false);
        true
    }
}

impl BattleState for ProjectileState {
    fn kind(&self) -> StateKind {
        StateKind::Projectile
    }

    fn action(&self) -> Option<&BattleAction> {
        Some(&self.action)
    }

    fn interruptible(&self) -> bool {
        !self.committed
    }

    fn init(&mut self, cx: &mut StateContext<'_>) {
        if self.cancelled {
            return;
        }
        let target = self.action.target;
        if let Some(shooter) = self
            .action
            .actor
            .and_then(|actor| cx.battle.unit_mut(actor))
            .filter(|shooter| !shooter.is_out())
        {
            if let Some(direction) = shooter.position.direction_to(target) {
                shooter.direction = direction;
                shooter.target_direction = direction;
            }
            shooter.status = UnitStatus::Aiming;
            let position = shooter.position;
            cx.env.center_on(position);
        }
    }

    fn think(&mut self, cx: &mut StateContext<'_>) {
        if self.cancelled {
            match self.action.actor {
                Some(actor) => self.finish(cx, actor, None),
                None => cx.pop_state(),
            }
            return;
        }
        if !self.pacing.tick() {
            return;
        }
        let Some(actor) = self.action.actor else {
            cx.pop_state();
            return;
        };
        if cx.battle.unit(actor).is_none_or(|unit| unit.is_out()) {
            debug!(target: "battle::state", unit = %actor, "shooter went down");
            cx.pop_state();
            return;
        }

        if !self.committed {
            if !cx.spend_time_units(actor, self.action.time_units) {
                self.finish(cx, actor, Some("not enough time units"));
                return;
            }
            self.committed = true;
        }

        let weapon = self
            .action
            .weapon
            .or_else(|| cx.battle.unit(actor).and_then(|unit| unit.main_hand()));
        let Some(weapon) = weapon else {
            self.finish(cx, actor, Some("no weapon"));
            return;
        };

        if self.action.kind == BattleActionType::Throw {
            self.throw(cx, actor, weapon);
            self.finish(cx, actor, None);
            return;
        }

        let fired = self.fire(cx, actor, weapon);
        self.shots_left = self.shots_left.saturating_sub(1);
        if !fired || self.shots_left == 0 {
            self.finish(cx, actor, None);
        }
    }

    fn cancel(&mut self, _cx: &mut StateContext<'_>) -> bool {
        if self.committed {
            return false;
        }
        self.cancelled = true;
        true
    }
}
