//! The battlescape orchestrator.
//!
//! [`BattlescapeGame`] owns the queue of pending [`BattleState`]s and advances
//! the front one per [`think`](BattlescapeGame::think). With an empty queue it
//! drives the AI on enemy turns and resolves panicking units on the player's
//! turn. All battlefield mutation flows through the states it runs or the
//! operations below; the battlefield itself and every collaborator are
//! borrowed per call.
mod casualties;
mod events;
mod input;
mod panic;
mod pipeline;
mod queue;
mod turns;

pub use casualties::ItemDrop;
pub use events::{BattleEvent, BattleOutcome};
pub use queue::QueuedState;

use std::fmt;

use tracing::{debug, trace};

use crate::action::{BattleAction, BattleActionType};
use crate::config::BattleConfig;
use crate::env::{BattleEnv, CursorMode};
use crate::state::{Battlefield, Faction, UnitId};
use crate::states::{BattleState, StateContext};

use queue::{SlotId, StateQueue};

/// Coarse view of what the orchestrator is doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum GamePhase {
    /// Nothing queued; waiting for input or the AI.
    Idle,
    Executing,
    /// An interrupt runs ahead of a state that already started.
    Interrupted,
    /// An end of turn is pending.
    TurnEnding,
}

pub struct BattlescapeGame {
    config: BattleConfig,
    queue: StateQueue,
    /// States currently inside `init`/`think`/`cancel`, innermost last.
    running: Vec<SlotId>,
    current_action: BattleAction,
    tu_reserved: BattleActionType,
    debug_play: bool,
    player_panic_handled: bool,
    ai_action_counter: u32,
    end_turn_requested: bool,
    outcome: Option<BattleOutcome>,
    cursor: CursorMode,
    events: Vec<BattleEvent>,
}

impl fmt::Debug for BattlescapeGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BattlescapeGame")
            .field("queue", &self.queue.snapshot())
            .field("current_action", &self.current_action)
            .field("tu_reserved", &self.tu_reserved)
            .field("ai_action_counter", &self.ai_action_counter)
            .field("end_turn_requested", &self.end_turn_requested)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

impl Default for BattlescapeGame {
    fn default() -> Self {
        Self::new(BattleConfig::default())
    }
}

impl BattlescapeGame {
    pub fn new(config: BattleConfig) -> Self {
        Self {
            config,
            queue: StateQueue::default(),
            running: Vec::new(),
            current_action: BattleAction::none(),
            tu_reserved: BattleActionType::None,
            debug_play: false,
            player_panic_handled: true,
            ai_action_counter: 0,
            end_turn_requested: false,
            outcome: None,
            cursor: CursorMode::Normal,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn current_action(&self) -> &BattleAction {
        &self.current_action
    }

    pub fn tu_reserved(&self) -> BattleActionType {
        self.tu_reserved
    }

    pub fn set_tu_reserved(&mut self, kind: BattleActionType) {
        self.tu_reserved = kind;
    }

    pub fn cursor(&self) -> CursorMode {
        self.cursor
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        self.outcome
    }

    /// Lets the player steer the non-player sides without time-unit costs.
    ///
    /// Cleared by [`end_turn`](Self::end_turn); it lasts one turn.
    pub fn set_debug_play(&mut self, enabled: bool) {
        self.debug_play = enabled;
    }

    /// Whether states should skip charging time units.
    pub fn dont_spend_tus(&self) -> bool {
        self.debug_play
    }

    pub fn ai_action_counter(&self) -> u32 {
        self.ai_action_counter
    }

    pub fn end_turn_requested(&self) -> bool {
        self.end_turn_requested
    }

    pub fn is_busy(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn queued_states(&self) -> Vec<QueuedState> {
        self.queue.snapshot()
    }

    pub fn phase(&self) -> GamePhase {
        if self.end_turn_requested || self.queue.iter().any(|slot| slot.is_end_turn()) {
            GamePhase::TurnEnding
        } else if self.queue.is_empty() {
            GamePhase::Idle
        } else if self.queue.iter().skip(1).any(|slot| slot.started) {
            GamePhase::Interrupted
        } else {
            GamePhase::Executing
        }
    }

    pub fn drain_events(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: BattleEvent) {
        trace!(target: "battle::engine", ?event, "event");
        self.events.push(event);
    }

    /// Whether no queued state acts on behalf of `unit`.
    pub fn no_actions_pending(&self, unit: UnitId) -> bool {
        !self.queue.iter().any(|slot| slot.actor == Some(unit))
    }

    pub(crate) fn has_pending_death(&self, unit: UnitId) -> bool {
        self.queue.iter().any(|slot| slot.casualty == Some(unit))
    }

    /// The selected unit belongs to the side the player controls right now.
    pub fn playable_unit_selected(&self, battle: &Battlefield) -> bool {
        battle
            .selected
            .and_then(|id| battle.unit(id))
            .is_some_and(|unit| {
                unit.faction == battle.side && (battle.side == Faction::Player || self.debug_play)
            })
    }

    /// One scheduler tick.
    pub fn think(&mut self, battle: &mut Battlefield, env: &BattleEnv<'_>) {
        if self.outcome.is_some() {
            return;
        }
        if !self.queue.is_empty() {
            self.handle_state(battle, env);
            return;
        }

        if battle.side != Faction::Player {
            if self.debug_play {
                return;
            }
            let side = battle.side;
            let selected = battle.selected.filter(|id| {
                battle
                    .unit(*id)
                    .is_some_and(|unit| !unit.is_out() && unit.faction == side)
            });
            match selected {
                Some(unit) => {
                    if !self.handle_panicking_unit(battle, env, unit) {
                        self.handle_ai(battle, env, unit);
                    }
                }
                None => {
                    if battle.select_next_unit(side, true, false).is_none() {
                        self.request_end_turn();
                    }
                }
            }
        } else if !self.player_panic_handled {
            self.player_panic_handled = self.handle_panicking_player(battle, env);
        }
    }

    /// Advances the front of the queue by one step.
    pub fn handle_state(&mut self, battle: &mut Battlefield, env: &BattleEnv<'_>) {
        let Some(front) = self.queue.front_mut() else {
            return;
        };
        if front.is_end_turn() {
            self.queue.pop_front();
            self.end_turn(battle, env);
            return;
        }

        let id = front.id;
        let needs_init = !front.initialized;
        front.initialized = true;
        front.started = true;
        let Some(mut state) = self.queue.take(id) else {
            return;
        };

        self.running.push(id);
        {
            let mut cx = StateContext {
                game: self,
                battle,
                env,
            };
            if needs_init {
                trace!(target: "battle::state", kind = %state.kind(), "init");
                state.init(&mut cx);
            }
            if cx.game.queue.front().is_some_and(|slot| slot.id == id) {
                state.think(&mut cx);
            }
        }
        self.running.pop();

        if let Err(state) = self.queue.restore(id, state) {
            let action = state.action().cloned();
            drop(state);
            self.finish_pop(battle, env, action);
        }
    }

    /// Interrupt: the state runs before everything else.
    pub fn state_push_front(&mut self, state: Box<dyn BattleState>) {
        debug!(target: "battle::engine", kind = %state.kind(), "push front");
        self.queue.push_front(state);
    }

    /// Runs right after the current front state; becomes the front of an
    /// empty queue.
    pub fn state_push_next(&mut self, state: Box<dyn BattleState>) {
        debug!(target: "battle::engine", kind = %state.kind(), "push next");
        self.queue.insert_next(state);
    }

    /// Several states after the front, in the given order.
    pub fn state_push_next_batch(&mut self, states: Vec<Box<dyn BattleState>>) {
        if states.is_empty() {
            return;
        }
        debug!(target: "battle::engine", count = states.len(), "push next batch");
        self.queue.insert_next_batch(states);
    }

    /// Runs after everything already queued.
    pub fn state_push_back(&mut self, state: Box<dyn BattleState>) {
        debug!(target: "battle::engine", kind = %state.kind(), "push back");
        self.queue.push_back(state);
    }

    /// Removes the calling state (or the front one when called from outside
    /// a state) and performs the follow-up bookkeeping.
    pub fn pop_state(&mut self, battle: &mut Battlefield, env: &BattleEnv<'_>) {
        if let Some(&id) = self.running.last() {
            // Bookkeeping runs once the state's own call returns.
            self.queue.remove(id);
            return;
        }
        let Some(slot) = self.queue.pop_front() else {
            return;
        };
        let action = slot.state().and_then(|state| state.action()).cloned();
        drop(slot);
        self.finish_pop(battle, env, action);
    }

    fn finish_pop(
        &mut self,
        battle: &mut Battlefield,
        env: &BattleEnv<'_>,
        action: Option<BattleAction>,
    ) {
        if let Some(action) = &action
            && let Some(actor) = action.actor
        {
            if !action.result.is_empty() {
                debug!(target: "battle::engine", unit = %actor, result = %action.result, "action finished");
                self.emit(BattleEvent::ActionMessage {
                    actor,
                    message: action.result.clone(),
                });
            }
            if self.no_actions_pending(actor) {
                self.after_actor_done(battle, env, action, actor);
            }
        }

        if self.queue.front_is_end_turn() {
            while self.queue.front_is_end_turn() {
                self.queue.pop_front();
            }
            if self.queue.is_empty() {
                self.end_turn(battle, env);
                return;
            }
            self.queue.push_back_end_turn();
        }

        if let Some(front) = self.queue.front_mut() {
            front.initialized = false;
        }

        if let Some(selected) = battle.selected
            && battle.unit(selected).is_none_or(|unit| unit.is_out())
        {
            self.cancel_current_action(battle, env, true);
            battle.selected = None;
        }

        if self.queue.is_empty() {
            env.recompute_lighting(battle);
            if battle.side == Faction::Player || self.debug_play {
                self.setup_cursor(env);
            }
        }
    }

    fn after_actor_done(
        &mut self,
        battle: &mut Battlefield,
        env: &BattleEnv<'_>,
        action: &BattleAction,
        actor: UnitId,
    ) {
        let faction = battle.unit(actor).map(|unit| unit.faction);
        if faction == Some(Faction::Player) {
            if battle.side == Faction::Player {
                if action.kind == BattleActionType::Throw && action.result.is_empty() {
                    self.cancel_current_action(battle, env, true);
                }
                self.setup_cursor(env);
            }
        } else if battle.side != Faction::Player && !self.debug_play {
            let selected_out = battle
                .selected
                .and_then(|id| battle.unit(id))
                .is_none_or(|unit| unit.is_out());
            if selected_out {
                self.advance_ai_unit(battle, env);
            }
        }
    }

    /// Runs `f` against the state in slot `id` with a full context.
    fn with_state<R>(
        &mut self,
        id: SlotId,
        battle: &mut Battlefield,
        env: &BattleEnv<'_>,
        f: impl FnOnce(&mut dyn BattleState, &mut StateContext<'_>) -> R,
    ) -> Option<R> {
        let mut state = self.queue.take(id)?;
        self.running.push(id);
        let result = {
            let mut cx = StateContext {
                game: self,
                battle,
                env,
            };
            f(state.as_mut(), &mut cx)
        };
        self.running.pop();
        if let Err(state) = self.queue.restore(id, state) {
            let action = state.action().cloned();
            drop(state);
            self.finish_pop(battle, env, action);
        }
        Some(result)
    }

    /// Points the view's cursor at what the current action needs.
    pub fn setup_cursor(&mut self, env: &BattleEnv<'_>) {
        self.cursor = match (self.current_action.targeting, self.current_action.kind) {
            (true, BattleActionType::Throw) => CursorMode::Throw,
            (true, _) => CursorMode::Aim,
            (false, _) => CursorMode::Normal,
        };
        env.set_cursor(self.cursor);
    }

    pub(crate) fn hide_cursor(&mut self, env: &BattleEnv<'_>) {
        self.cursor = CursorMode::None;
        env.set_cursor(self.cursor);
    }
}
