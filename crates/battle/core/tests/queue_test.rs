mod common;

use std::sync::{Arc, Mutex};

use battle_core::{BattleState, GamePhase, StateContext, StateKind};

use common::Harness;

type Log = Arc<Mutex<Vec<String>>>;

/// Logs its activations and steps; may interrupt itself once or queue a
/// follow-up before finishing.
#[derive(Debug)]
struct Probe {
    name: &'static str,
    log: Log,
    interrupt: Option<Box<dyn BattleState>>,
    follow_up: Option<Box<dyn BattleState>>,
}

impl Probe {
    fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            log: Arc::clone(log),
            interrupt: None,
            follow_up: None,
        }
    }

    fn interrupted_by(mut self, state: Probe) -> Self {
        self.interrupt = Some(Box::new(state));
        self
    }

    fn followed_by(mut self, state: Probe) -> Self {
        self.follow_up = Some(Box::new(state));
        self
    }

    fn boxed(self) -> Box<dyn BattleState> {
        Box::new(self)
    }
}

impl BattleState for Probe {
    fn kind(&self) -> StateKind {
        StateKind::UnitTurn
    }

    fn init(&mut self, _cx: &mut StateContext<'_>) {
        self.log.lock().unwrap().push(format!("{} init", self.name));
    }

    fn think(&mut self, cx: &mut StateContext<'_>) {
        if let Some(urgent) = self.interrupt.take() {
            cx.push_front(urgent);
            return;
        }
        self.log.lock().unwrap().push(self.name.to_owned());
        if let Some(next) = self.follow_up.take() {
            cx.push_next(next);
        }
        cx.pop_state();
    }
}

fn steps(log: &Log) -> Vec<String> {
    log.lock()
        .unwrap()
        .iter()
        .filter(|entry| !entry.ends_with(" init"))
        .cloned()
        .collect()
}

#[test]
fn front_next_and_back_insertions_keep_their_places() {
    let mut h = Harness::new();
    let log = Log::default();

    h.game.state_push_back(Probe::new("a", &log).boxed());
    h.game.state_push_back(Probe::new("b", &log).boxed());
    h.game.state_push_next(Probe::new("c", &log).boxed());
    h.game.state_push_front(Probe::new("d", &log).boxed());
    assert_eq!(h.game.queue_len(), 4);
    assert_eq!(h.game.phase(), GamePhase::Executing);

    assert_eq!(h.run_until_idle(), 4);
    assert_eq!(steps(&log), ["d", "a", "c", "b"]);
    assert_eq!(h.game.phase(), GamePhase::Idle);
}

#[test]
fn push_next_on_an_empty_queue_becomes_the_front() {
    let mut h = Harness::new();
    let log = Log::default();

    h.game.state_push_next(Probe::new("only", &log).boxed());
    h.tick();

    assert_eq!(steps(&log), ["only"]);
    assert!(!h.game.is_busy());
}

#[test]
fn follow_up_runs_before_states_queued_earlier() {
    let mut h = Harness::new();
    let log = Log::default();

    h.game.state_push_back(
        Probe::new("parent", &log)
            .followed_by(Probe::new("child", &log))
            .boxed(),
    );
    h.game.state_push_back(Probe::new("later", &log).boxed());
    h.run_until_idle();

    assert_eq!(steps(&log), ["parent", "child", "later"]);
}

#[test]
fn interrupted_state_resumes_and_reinitialises() {
    let mut h = Harness::new();
    let log = Log::default();

    h.game.state_push_back(
        Probe::new("walk", &log)
            .interrupted_by(Probe::new("reaction", &log))
            .boxed(),
    );
    h.tick();
    assert_eq!(h.game.queue_len(), 2);
    assert_eq!(h.game.phase(), GamePhase::Interrupted);

    h.run_until_idle();
    assert_eq!(
        *log.lock().unwrap(),
        ["walk init", "reaction init", "reaction", "walk init", "walk"]
    );
}

#[test]
fn end_turn_marker_waits_for_pending_states() {
    let mut h = Harness::new();
    h.place(common::soldier(1, battle_core::Position::new(1, 1, 0)));
    h.place(common::alien(2, battle_core::Position::new(8, 8, 0)));
    let log = Log::default();

    h.game.state_push_back(Probe::new("first", &log).boxed());
    h.game.request_end_turn();
    h.game.request_end_turn();
    h.game.state_push_back(Probe::new("second", &log).boxed());
    assert_eq!(h.game.phase(), GamePhase::TurnEnding);
    assert_eq!(h.game.queue_len(), 3);

    h.tick();
    assert_eq!(h.battle.side, battle_core::Faction::Player);
    h.run_until_idle();

    assert_eq!(steps(&log), ["first", "second"]);
    assert_eq!(h.battle.side, battle_core::Faction::Hostile);
    assert!(!h.game.end_turn_requested());
}
