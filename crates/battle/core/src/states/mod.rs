//! Units of sequenced battle activity.
//!
//! Each [`BattleState`] is one step of the battle: a unit dying, an explosion
//! resolving, a walk, a turn, a shot. The orchestrator advances the state at
//! the front of its queue one [`think`](BattleState::think) per scheduler
//! tick. States reach the rest of the battle through a [`StateContext`] and
//! finish by calling [`StateContext::pop_state`].
mod die;
mod explosion;
mod panic;
mod projectile;
mod turn;
mod walk;

pub use die::UnitDieState;
pub use explosion::ExplosionState;
pub use panic::UnitPanicState;
pub use projectile::ProjectileState;
pub use turn::UnitTurnState;
pub use walk::UnitWalkState;

use std::fmt::Debug;

use crate::action::BattleAction;
use crate::config::BattleConfig;
use crate::engine::{BattleEvent, BattlescapeGame, ItemDrop};
use crate::env::BattleEnv;
use crate::state::{Battlefield, ItemId, Position, UnitId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StateKind {
    UnitDie,
    Explosion,
    UnitWalk,
    UnitTurn,
    Projectile,
    UnitPanic,
}

pub trait BattleState: Debug + Send {
    fn kind(&self) -> StateKind;

    /// The action this state executes; consequences (deaths, explosions,
    /// panic resolution) carry none.
    fn action(&self) -> Option<&BattleAction> {
        None
    }

    /// The unit going down, for death states.
    fn casualty(&self) -> Option<UnitId> {
        None
    }

    /// Whether a player cancel may stop this state.
    fn interruptible(&self) -> bool {
        false
    }

    /// Runs each time the state reaches the front of the queue, right before
    /// its first `think` of that activation.
    fn init(&mut self, _cx: &mut StateContext<'_>) {}

    fn think(&mut self, cx: &mut StateContext<'_>);

    /// Asks the state to stop. Returns whether the request was accepted.
    fn cancel(&mut self, _cx: &mut StateContext<'_>) -> bool {
        false
    }
}

/// Everything a running state may touch, borrowed for one call.
pub struct StateContext<'a> {
    pub game: &'a mut BattlescapeGame,
    pub battle: &'a mut Battlefield,
    pub env: &'a BattleEnv<'a>,
}

impl StateContext<'_> {
    pub fn config(&self) -> &BattleConfig {
        self.game.config()
    }

    /// Removes the calling state from the queue.
    pub fn pop_state(&mut self) {
        self.game.pop_state(self.battle, self.env);
    }

    pub fn push_front(&mut self, state: Box<dyn BattleState>) {
        self.game.state_push_front(state);
    }

    pub fn push_next(&mut self, state: Box<dyn BattleState>) {
        self.game.state_push_next(state);
    }

    pub fn push_back(&mut self, state: Box<dyn BattleState>) {
        self.game.state_push_back(state);
    }

    pub fn emit(&mut self, event: BattleEvent) {
        self.game.emit(event);
    }

    pub fn check_for_casualties(
        &mut self,
        weapon: Option<ItemId>,
        killer: Option<UnitId>,
        hidden_explosion: bool,
        terrain_explosion: bool,
    ) -> bool {
        self.game.check_for_casualties(
            self.battle,
            self.env,
            weapon,
            killer,
            hidden_explosion,
            terrain_explosion,
        )
    }

    pub fn drop_item(&mut self, position: Position, item: ItemDrop) -> bool {
        self.game.drop_item(self.battle, self.env, position, item)
    }

    /// Charges time units unless the session plays without TU costs.
    pub fn spend_time_units(&mut self, unit: UnitId, amount: u32) -> bool {
        if self.game.dont_spend_tus() {
            return true;
        }
        self.battle
            .unit_mut(unit)
            .is_some_and(|unit| unit.spend_time_units(amount))
    }

    pub fn check_reserved_tu(&self, unit: UnitId, amount: u32) -> bool {
        self.game
            .check_reserved_tu(self.battle, self.env, unit, amount)
    }
}

/// Animation pacing in scheduler ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pacing {
    interval: u32,
    remaining: u32,
}

impl Pacing {
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            remaining: 0,
        }
    }

    /// Advances one tick; returns `true` on ticks where the state should step.
    /// The first tick always steps.
    pub fn tick(&mut self) -> bool {
        if self.remaining > 0 {
            self.remaining -= 1;
            return false;
        }
        self.remaining = self.interval - 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pacing_steps_every_interval() {
        let mut pacing = Pacing::new(3);
        let steps: Vec<bool> = (0..7).map(|_| pacing.tick()).collect();
        assert_eq!(steps, [true, false, false, true, false, false, true]);

        let mut instant = Pacing::new(0);
        assert!(instant.tick() && instant.tick());
    }
}
