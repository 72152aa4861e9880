//! Decision making for computer-controlled units.
//!
//! The engine asks an [`AiStrategy`] for one [`BattleAction`] at a time and
//! validates it like any player intent. [`TacticalAi`] is the stock strategy:
//! a small behavior tree over an [`AiContext`] snapshot of what the unit
//! knows.
pub mod nodes;
pub mod tree;

use crate::action::{BattleAction, BattleActionType};
use crate::env::{BattleEnv, BattleType};
use crate::state::{Battlefield, Faction, ItemId, Position, UnitId};

use nodes::{AdvanceTowardEnemy, HasUsableWeapon, HasVisibleEnemy, Idle, Patrol, ShootNearestEnemy};
use tree::{Behavior, Node, inverter, selector, sequence};

const WANDER_ROLL_X: u32 = 20;
const WANDER_ROLL_Y: u32 = 21;

pub trait AiStrategy: Send + Sync {
    /// Next action for `unit`. `BattleAction::none()` ends its activation.
    fn decide(&self, unit: UnitId, battle: &Battlefield, env: &BattleEnv<'_>) -> BattleAction;

    /// Fire mode whose cost the unit keeps in reserve while acting.
    fn reserve_mode(&self, _unit: UnitId, _battle: &Battlefield) -> BattleActionType {
        BattleActionType::None
    }
}

/// Time units withheld for `mode` from a unit with `max` time units.
pub fn reserve_time_units(mode: BattleActionType, max: u32) -> u32 {
    match mode {
        BattleActionType::Snapshot => max / 3,
        BattleActionType::Autoshot => max / 5 * 2,
        BattleActionType::Aimedshot => max / 2,
        _ => 0,
    }
}

/// Costs of the unit's main weapon. A cost of 0 means the mode is missing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeaponProfile {
    pub item: ItemId,
    pub snap_cost: u32,
    pub aimed_cost: u32,
    pub melee_cost: u32,
    /// Firearms need ammunition; everything else counts as loaded.
    pub loaded: bool,
}

/// Blackboard for one decision.
#[derive(Debug)]
pub struct AiContext {
    pub unit: UnitId,
    pub faction: Faction,
    pub position: Position,
    pub time_units: u32,
    pub reserved: u32,
    /// Visible live enemies, nearest first.
    pub enemies: Vec<(UnitId, Position)>,
    pub weapon: Option<WeaponProfile>,
    /// Random nearby tile for wandering.
    pub wander: Position,
    action: Option<BattleAction>,
}

impl AiContext {
    /// Snapshot of what `unit` knows, or `None` when it cannot act.
    pub fn gather(
        unit: UnitId,
        battle: &Battlefield,
        env: &BattleEnv<'_>,
        reserve: BattleActionType,
        wander_radius: i32,
    ) -> Option<Self> {
        let actor = battle.unit(unit).filter(|actor| !actor.is_out())?;

        let mut enemies: Vec<(UnitId, Position)> = env
            .visible_units(battle, unit)
            .into_iter()
            .filter_map(|id| battle.unit(id))
            .filter(|other| !other.is_out() && actor.faction.is_hostile_to(other.faction))
            .map(|other| (other.id, other.position))
            .collect();
        enemies.sort_by_key(|(id, position)| (actor.position.distance_to(*position), *id));

        let weapon = actor.main_hand().and_then(|item| {
            let rule = env.rule_of(battle, item)?;
            let ammo = battle.item(item).map_or(0, |weapon| weapon.ammo);
            Some(WeaponProfile {
                item,
                snap_cost: actor.action_time_units(BattleActionType::Snapshot, Some(rule)),
                aimed_cost: actor.action_time_units(BattleActionType::Aimedshot, Some(rule)),
                melee_cost: actor.action_time_units(BattleActionType::Hit, Some(rule)),
                loaded: rule.battle_type != BattleType::Firearm || ammo > 0,
            })
        });

        let rng = env.rng();
        let dx = rng.range_i32(battle.peek_seed(unit.0, WANDER_ROLL_X), -wander_radius, wander_radius);
        let dy = rng.range_i32(battle.peek_seed(unit.0, WANDER_ROLL_Y), -wander_radius, wander_radius);

        Some(Self {
            unit,
            faction: actor.faction,
            position: actor.position,
            time_units: actor.time_units,
            reserved: reserve_time_units(reserve, actor.stats.time_units),
            enemies,
            weapon,
            wander: battle.clamp(actor.position.offset(dx, dy, 0)),
            action: None,
        })
    }

    /// Whether `cost` can be paid without dipping into the reserve.
    pub fn affords(&self, cost: u32) -> bool {
        cost + self.reserved <= self.time_units
    }

    /// Stores the decision; the first action set wins.
    pub fn set_action(&mut self, action: BattleAction) {
        if self.action.is_none() {
            self.action = Some(action);
        }
    }

    pub fn take_action(&mut self) -> Option<BattleAction> {
        self.action.take()
    }
}

/// Shoots what it sees, closes in when it cannot, wanders otherwise.
pub struct TacticalAi {
    reserve: BattleActionType,
    wander_radius: i32,
    tree: Node<AiContext>,
}

impl TacticalAi {
    pub const DEFAULT_WANDER_RADIUS: i32 = 4;

    pub fn new() -> Self {
        Self::with_reserve(BattleActionType::Snapshot)
    }

    pub fn with_reserve(reserve: BattleActionType) -> Self {
        Self {
            reserve,
            wander_radius: Self::DEFAULT_WANDER_RADIUS,
            tree: Self::tree(),
        }
    }

    fn tree() -> Node<AiContext> {
        selector::<AiContext>(vec![
            sequence::<AiContext>(vec![
                Box::new(HasVisibleEnemy),
                Box::new(HasUsableWeapon),
                Box::new(ShootNearestEnemy),
            ]),
            sequence::<AiContext>(vec![Box::new(HasVisibleEnemy), Box::new(AdvanceTowardEnemy)]),
            sequence::<AiContext>(vec![inverter(Box::new(HasVisibleEnemy)), Box::new(Patrol)]),
            Box::new(Idle),
        ])
    }
}

impl Default for TacticalAi {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TacticalAi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TacticalAi")
            .field("reserve", &self.reserve)
            .field("wander_radius", &self.wander_radius)
            .finish_non_exhaustive()
    }
}

impl AiStrategy for TacticalAi {
    fn decide(&self, unit: UnitId, battle: &Battlefield, env: &BattleEnv<'_>) -> BattleAction {
        let Some(mut ctx) = AiContext::gather(unit, battle, env, self.reserve, self.wander_radius)
        else {
            return BattleAction::none();
        };
        self.tree.tick(&mut ctx);
        ctx.take_action().unwrap_or_default()
    }

    fn reserve_mode(&self, _unit: UnitId, _battle: &Battlefield) -> BattleActionType {
        self.reserve
    }
}
