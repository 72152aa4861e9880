mod common;

use battle_core::{
    ActionError, BattleAction, BattleActionType, BattleEvent, CursorMode, Position, UnitFlags,
    UnitId, UnitStatus,
};

use common::{Harness, alien, soldier};

fn squad() -> (Harness, UnitId) {
    let mut h = Harness::new();
    let ana = h.place(soldier(1, Position::new(1, 1, 0)));
    h.place(alien(9, Position::new(10, 10, 0)));
    h.battle.selected = Some(ana);
    (h, ana)
}

fn commit(h: &mut Harness, action: &mut BattleAction) -> Result<(), ActionError> {
    let env = h.world.env();
    h.game.commit_action(&mut h.battle, &env, action)
}

#[test]
fn walk_beyond_time_units_is_rejected_without_side_effects() {
    let (mut h, ana) = squad();
    h.world.grid.step = 7;
    h.unit_mut(ana).time_units = 30;

    let mut walk = BattleAction::new(BattleActionType::Walk, ana, Position::new(6, 1, 0));
    let error = commit(&mut h, &mut walk).unwrap_err();

    assert_eq!(
        error,
        ActionError::NotEnoughTimeUnits {
            required: 35,
            available: 30
        }
    );
    assert_eq!(walk.result, "not enough time units");
    assert_eq!(h.unit(ana).time_units, 30);
    assert_eq!(h.unit(ana).position, Position::new(1, 1, 0));
    assert!(!h.game.is_busy());
    assert!(h.events().iter().any(|event| matches!(
        event,
        BattleEvent::ActionRejected { code, kind: BattleActionType::Walk, .. }
            if code == "STR_NOT_ENOUGH_TIME_UNITS"
    )));
}

#[test]
fn walk_spends_time_units_step_by_step() {
    let (mut h, ana) = squad();

    let mut walk = BattleAction::new(BattleActionType::Walk, ana, Position::new(4, 1, 0));
    commit(&mut h, &mut walk).unwrap();
    assert_eq!(walk.time_units, 12);

    h.tick();
    assert_eq!(h.unit(ana).position, Position::new(2, 1, 0));
    assert_eq!(h.unit(ana).time_units, 56);
    assert_eq!(h.unit(ana).status, UnitStatus::Walking);

    h.run_until_idle();
    assert_eq!(h.unit(ana).position, Position::new(4, 1, 0));
    assert_eq!(h.unit(ana).time_units, 48);
    assert_eq!(h.unit(ana).status, UnitStatus::Standing);
    assert_eq!(h.battle.unit_at(Position::new(1, 1, 0)), None);
    assert_eq!(h.battle.unit_at(Position::new(4, 1, 0)), Some(ana));
}

#[test]
fn reserved_shot_limits_movement() {
    let (mut h, ana) = squad();
    h.give(ana, "rifle", 10);
    h.game.set_tu_reserved(BattleActionType::Aimedshot);

    let mut short = BattleAction::new(BattleActionType::Walk, ana, Position::new(6, 1, 0));
    commit(&mut h, &mut short).unwrap();

    let mut long = BattleAction::new(BattleActionType::Walk, ana, Position::new(9, 1, 0));
    assert_eq!(
        commit(&mut h, &mut long),
        Err(ActionError::TimeUnitsReserved)
    );
    assert_eq!(long.result, "time units reserved");

    // The reserve binds the moving side only.
    let env = h.world.env();
    assert!(h.game.check_reserved_tu(&h.battle, &env, UnitId(9), 50));
    assert!(!h.game.check_reserved_tu(&h.battle, &env, UnitId(9), 51));
}

#[test]
fn reserve_falls_back_to_a_mode_the_weapon_has() {
    let (mut h, ana) = squad();
    h.give(ana, "rifle", 10);
    let env = h.world.env();

    // No autoshot on the rifle: the snap shot cost (15) is kept instead.
    h.game.set_tu_reserved(BattleActionType::Autoshot);
    assert!(h.game.check_reserved_tu(&h.battle, &env, ana, 45));
    assert!(!h.game.check_reserved_tu(&h.battle, &env, ana, 46));

    h.game.set_tu_reserved(BattleActionType::None);
    assert!(h.game.check_reserved_tu(&h.battle, &env, ana, 60));
}

#[test]
fn kneeling_costs_differ_and_aliens_cannot_kneel() {
    let (mut h, ana) = squad();
    let env = h.world.env();

    h.game.kneel(&mut h.battle, &env, ana).unwrap();
    assert!(h.battle.unit(ana).unwrap().flags.contains(UnitFlags::KNEELING));
    assert_eq!(h.battle.unit(ana).unwrap().time_units, 56);

    h.game.kneel(&mut h.battle, &env, ana).unwrap();
    assert!(!h.battle.unit(ana).unwrap().is_kneeling());
    assert_eq!(h.battle.unit(ana).unwrap().time_units, 48);

    assert_eq!(
        h.game.kneel(&mut h.battle, &env, UnitId(9)),
        Err(ActionError::CannotKneel)
    );
}

#[test]
fn priming_resolves_without_a_target() {
    let (mut h, ana) = squad();
    let grenade = h.give(ana, "grenade", 0);
    let env = h.world.env();

    h.game
        .select_action(&mut h.battle, &env, BattleActionType::Prime, Some(grenade), 2);

    assert!(!h.game.is_busy());
    assert_eq!(h.battle.item(grenade).unwrap().fuse_timer, Some(2));
    assert_eq!(h.battle.unit(ana).unwrap().time_units, 30);
    assert_eq!(h.game.current_action().result, "grenade is activated");
    assert!(!h.game.current_action().targeting);
    assert!(h.game.drain_events().contains(&BattleEvent::GrenadePrimed {
        actor: ana,
        item: grenade,
        fuse: 2,
    }));
}

#[test]
fn priming_a_rifle_is_refused() {
    let (mut h, ana) = squad();
    let rifle = h.give(ana, "rifle", 10);
    let mut prime = BattleAction::new(BattleActionType::Prime, ana, Position::ORIGIN).with_weapon(rifle);

    assert_eq!(
        commit(&mut h, &mut prime),
        Err(ActionError::ModeUnavailable(BattleActionType::Prime))
    );
    assert_eq!(h.unit(ana).time_units, 60);
}

#[test]
fn empty_rifle_cannot_fire() {
    let (mut h, ana) = squad();
    h.give(ana, "rifle", 0);
    let mut shot = BattleAction::new(BattleActionType::Snapshot, ana, Position::new(10, 10, 0));

    assert_eq!(commit(&mut h, &mut shot), Err(ActionError::NoAmmo));
    assert_eq!(shot.result, "no ammunition loaded");
}

#[test]
fn snap_shot_kills_through_the_targeting_flow() {
    let (h, ana) = squad();
    let mut h = h.with_rng(0);
    let rifle = h.give(ana, "rifle", 10);
    let target = Position::new(10, 10, 0);

    let env = h.world.env();
    h.game
        .select_action(&mut h.battle, &env, BattleActionType::Snapshot, None, 0);
    assert!(h.game.current_action().targeting);
    assert_eq!(h.game.cursor(), CursorMode::Aim);

    h.game.primary_action(&mut h.battle, &env, target);
    assert!(h.game.is_busy());
    h.run_until_idle();

    let downed = h.unit(UnitId(9));
    assert_eq!(downed.health, 0);
    assert_eq!(downed.status, UnitStatus::Dead);
    assert_eq!(h.unit(ana).time_units, 45);
    assert_eq!(h.unit(ana).kills, 1);
    assert_eq!(h.battle.item(rifle).unwrap().ammo, 9);

    let events = h.events();
    assert!(events.contains(&BattleEvent::ShotFired {
        actor: ana,
        target,
        hit: true,
    }));
    assert!(events.contains(&BattleEvent::UnitKilled {
        unit: UnitId(9),
        killer: Some(ana),
    }));
}

#[test]
fn cancelling_targeting_restores_the_normal_cursor() {
    let (mut h, ana) = squad();
    h.give(ana, "rifle", 10);
    let env = h.world.env();

    assert!(!h.game.cancel_current_action(&mut h.battle, &env, false));

    h.game
        .select_action(&mut h.battle, &env, BattleActionType::Aimedshot, None, 0);
    assert!(h.game.cancel_current_action(&mut h.battle, &env, false));
    assert_eq!(h.game.cursor(), CursorMode::Normal);
    assert_eq!(h.game.current_action().kind, BattleActionType::None);
    assert_eq!(
        *h.world.recorder.cursors.lock().unwrap(),
        [CursorMode::Aim, CursorMode::Normal]
    );
}

#[test]
fn cancelling_a_walk_stops_it_and_drops_queued_follow_ups() {
    let (mut h, ana) = squad();

    let mut walk = BattleAction::new(BattleActionType::Walk, ana, Position::new(6, 1, 0));
    commit(&mut h, &mut walk).unwrap();
    let mut turn = BattleAction::new(BattleActionType::Turn, ana, Position::new(1, 5, 0));
    commit(&mut h, &mut turn).unwrap();
    assert_eq!(h.game.queue_len(), 2);

    h.tick();
    let env = h.world.env();
    assert!(h.game.cancel_current_action(&mut h.battle, &env, false));
    assert_eq!(h.game.queue_len(), 1);

    h.run_until_idle();
    assert_eq!(h.unit(ana).position, Position::new(2, 1, 0));
    assert_eq!(h.unit(ana).time_units, 56);
    assert_eq!(h.unit(ana).status, UnitStatus::Standing);
}

#[test]
fn cancelled_shot_never_fires() {
    let (mut h, ana) = squad();
    let rifle = h.give(ana, "rifle", 10);

    let mut shot = BattleAction::new(BattleActionType::Snapshot, ana, Position::new(10, 10, 0));
    commit(&mut h, &mut shot).unwrap();
    let env = h.world.env();
    assert!(h.game.cancel_current_action(&mut h.battle, &env, false));

    assert_eq!(h.run_until_idle(), 1);
    assert_eq!(h.unit(ana).time_units, 60);
    assert_eq!(h.unit(ana).direction, 0);
    assert_eq!(h.unit(ana).status, UnitStatus::Standing);
    assert_eq!(h.battle.item(rifle).unwrap().ammo, 10);
    assert_eq!(h.unit(UnitId(9)).health, 15);
    assert!(
        !h.events()
            .iter()
            .any(|event| matches!(event, BattleEvent::ShotFired { .. }))
    );
}

#[test]
fn turn_cancelled_before_it_starts_keeps_the_old_facing() {
    let (mut h, ana) = squad();

    let mut turn = BattleAction::new(BattleActionType::Turn, ana, Position::new(1, 5, 0));
    commit(&mut h, &mut turn).unwrap();
    let env = h.world.env();
    assert!(h.game.cancel_current_action(&mut h.battle, &env, false));

    h.run_until_idle();
    assert!(!h.game.is_busy());
    assert_eq!(h.unit(ana).direction, 0);
    assert_eq!(h.unit(ana).time_units, 60);
    assert_eq!(h.unit(ana).status, UnitStatus::Standing);
}

#[test]
fn turn_cancelled_midway_stops_after_the_current_step() {
    let (mut h, ana) = squad();

    let mut turn = BattleAction::new(BattleActionType::Turn, ana, Position::new(1, 5, 0));
    commit(&mut h, &mut turn).unwrap();
    h.tick();
    assert_eq!(h.unit(ana).direction, 1);
    assert_eq!(h.unit(ana).time_units, 59);

    let env = h.world.env();
    assert!(h.game.cancel_current_action(&mut h.battle, &env, false));
    h.run_until_idle();
    assert_eq!(h.unit(ana).direction, 1);
    assert_eq!(h.unit(ana).time_units, 59);
    assert_eq!(h.unit(ana).status, UnitStatus::Standing);
}

#[test]
fn kneeling_without_time_units_reports_the_shortfall() {
    let (mut h, ana) = squad();
    h.unit_mut(ana).time_units = 2;
    let env = h.world.env();

    assert_eq!(
        h.game.kneel(&mut h.battle, &env, ana),
        Err(ActionError::NotEnoughTimeUnits {
            required: 4,
            available: 2
        })
    );
    assert!(!h.battle.unit(ana).unwrap().is_kneeling());
}
