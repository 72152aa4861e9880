use std::collections::VecDeque;

use tracing::debug;

use crate::action::BattleAction;
use crate::config::BattleConfig;
use crate::engine::BattleEvent;
use crate::env::Path;
use crate::state::{Position, UnitId, UnitStatus};

use super::{BattleState, Pacing, StateContext, StateKind};

/// Moves a unit along a path, one tile per animation step.
#[derive(Debug)]
pub struct UnitWalkState {
    action: BattleAction,
    path: Option<VecDeque<Position>>,
    /// Enemies the walker could already see when it set off.
    seen: Vec<UnitId>,
    stop_requested: bool,
    pacing: Pacing,
}

impl UnitWalkState {
    /// The route is computed when the state first runs.
    pub fn new(action: BattleAction, config: &BattleConfig) -> Self {
        Self {
            action,
            path: None,
            seen: Vec::new(),
            stop_requested: false,
            pacing: Pacing::new(config.anim_interval),
        }
    }

    pub fn with_path(action: BattleAction, path: Path, config: &BattleConfig) -> Self {
        Self {
            path: Some(path.steps.into()),
            ..Self::new(action, config)
        }
    }

    fn actor(&self) -> Option<UnitId> {
        self.action.actor
    }

    fn visible_enemies(&self, cx: &StateContext<'_>) -> Vec<UnitId> {
        let Some(walker) = self.actor().and_then(|id| cx.battle.unit(id)) else {
            return Vec::new();
        };
        cx.env
            .visible_units(cx.battle, walker.id)
            .into_iter()
            .filter(|id| {
                cx.battle
                    .unit(*id)
                    .is_some_and(|other| !other.is_out() && walker.faction.is_hostile_to(other.faction))
            })
            .collect()
    }

    fn finish(&mut self, cx: &mut StateContext<'_>, result: Option<&str>) {
        if let Some(result) = result {
            self.action.result = result.to_owned();
        }
        if let Some(walker) = self.actor().and_then(|id| cx.battle.unit_mut(id))
            && walker.status == UnitStatus::Walking
        {
            walker.status = UnitStatus::Standing;
        }
        if let Some(actor) = self.actor() {
            cx.env.cache_unit(actor);
        }
        cx.pop_state();
    }
}

impl BattleState for UnitWalkState {
    fn kind(&self) -> StateKind {
        StateKind::UnitWalk
    }

    fn action(&self) -> Option<&BattleAction> {
        Some(&self.action)
    }

    fn interruptible(&self) -> bool {
        true
    }

    fn init(&mut self, cx: &mut StateContext<'_>) {
        let Some(actor) = self.actor() else {
            return;
        };
        if self.path.is_none() {
            let route = cx
                .env
                .pathfinding()
                .ok()
                .and_then(|pathfinding| pathfinding.calculate(cx.battle, actor, self.action.target));
            self.path = Some(route.map(|route| route.steps.into()).unwrap_or_default());
        }
        self.seen = self.visible_enemies(cx);
        if let Some(walker) = cx.battle.unit_mut(actor)
            && !walker.is_out()
        {
            walker.status = UnitStatus::Walking;
            let position = walker.position;
            cx.env.center_on(position);
        }
    }

    fn think(&mut self, cx: &mut StateContext<'_>) {
        if !self.pacing.tick() {
            return;
        }
        let Some(actor) = self.actor() else {
            cx.pop_state();
            return;
        };
        let Some(walker) = cx.battle.unit(actor).filter(|walker| !walker.is_out()) else {
            debug!(target: "battle::state", unit = %actor, "walker no longer able to move");
            cx.pop_state();
            return;
        };
        let (from, size) = (walker.position, walker.size);
        if self.stop_requested {
            self.finish(cx, None);
            return;
        }
        let Some(next) = self.path.as_ref().and_then(|path| path.front().copied()) else {
            self.finish(cx, None);
            return;
        };

        let Some(cost) = cx
            .env
            .pathfinding()
            .ok()
            .and_then(|pathfinding| pathfinding.step_cost(cx.battle, actor, from, next))
        else {
            self.finish(cx, Some("path blocked"));
            return;
        };
        if !cx.battle.footprint_free(next, size, Some(actor)) {
            self.finish(cx, Some("path blocked"));
            return;
        }
        if !cx.check_reserved_tu(actor, cost) {
            self.finish(cx, Some("time units reserved"));
            return;
        }
        if !cx.spend_time_units(actor, cost) {
            self.finish(cx, Some("not enough time units"));
            return;
        }

        if let Some(direction) = from.direction_to(next)
            && let Some(walker) = cx.battle.unit_mut(actor)
        {
            walker.direction = direction;
            walker.target_direction = direction;
        }
        cx.battle.move_unit(actor, next);
        if let Some(path) = self.path.as_mut() {
            path.pop_front();
        }
        cx.emit(BattleEvent::UnitMoved {
            unit: actor,
            to: next,
        });
        cx.env.recompute_lighting(cx.battle);
        cx.env.recompute_fov(cx.battle, actor);
        cx.env.cache_unit(actor);

        let spotted = self
            .visible_enemies(cx)
            .into_iter()
            .any(|enemy| !self.seen.contains(&enemy));
        if spotted {
            debug!(target: "battle::state", unit = %actor, "walk interrupted by a new sighting");
            self.finish(cx, Some("enemy spotted"));
        } else if self.path.as_ref().is_none_or(|path| path.is_empty()) {
            self.finish(cx, None);
        }
    }

    fn cancel(&mut self, _cx: &mut StateContext<'_>) -> bool {
        self.stop_requested = true;
        true
    }
}
