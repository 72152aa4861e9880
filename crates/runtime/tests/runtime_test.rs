use std::io::Write;

use battle_core::{BattleEvent, BattleUnit, Faction, Position, UnitFlags, UnitId};
use battle_runtime::{
    BattleSnapshot, PlayerCommand, Runtime, RuntimeConfig, RuntimeError, Scenario, Topic,
};

fn start(scenario: Scenario) -> Runtime {
    Runtime::builder()
        .config(RuntimeConfig::manual())
        .scenario(scenario)
        .build()
        .expect("runtime should start")
}

fn skirmish() -> Scenario {
    Scenario::embedded_skirmish().expect("embedded scenario parses")
}

fn unit(snapshot: &BattleSnapshot, id: u32) -> &BattleUnit {
    snapshot.battlefield.unit(UnitId(id)).expect("unit exists")
}

#[tokio::test]
async fn walking_moves_the_selected_soldier() {
    let runtime = start(skirmish());
    let handle = runtime.handle();
    let mut battle_events = handle.subscribe(Topic::Battle);

    let before = handle.query().await.unwrap();
    assert_eq!(before.selected_unit(), Some(UnitId(1)));

    handle
        .send(PlayerCommand::Click(Position::new(4, 1, 0)))
        .await
        .unwrap();
    handle.advance(20).await.unwrap();

    let after = handle.query().await.unwrap();
    let soldier = unit(&after, 1);
    assert_eq!(soldier.position, Position::new(4, 1, 0));
    // Two diagonal steps around the squad and one straight step.
    assert_eq!(soldier.time_units, 60 - 16);
    assert!(after.queue.is_empty());

    let mut moves = 0;
    while let Ok(event) = battle_events.try_recv() {
        if matches!(event.event, BattleEvent::UnitMoved { unit, .. } if unit == UnitId(1)) {
            moves += 1;
        }
    }
    assert_eq!(moves, 3);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn unaffordable_walk_is_rejected_without_side_effects() {
    let runtime = start(skirmish());
    let handle = runtime.handle();
    let mut battle_events = handle.subscribe(Topic::Battle);

    handle
        .send(PlayerCommand::Click(Position::new(1, 28, 0)))
        .await
        .unwrap();

    let event = battle_events.try_recv().expect("rejection published");
    match event.event {
        BattleEvent::ActionRejected { code, actor, .. } => {
            assert_eq!(code, "STR_NOT_ENOUGH_TIME_UNITS");
            assert_eq!(actor, Some(UnitId(1)));
        }
        other => panic!("unexpected event {other:?}"),
    }

    let snapshot = handle.query().await.unwrap();
    assert_eq!(unit(&snapshot, 1).time_units, 60);
    assert_eq!(unit(&snapshot, 1).position, Position::new(1, 1, 0));
    assert_eq!(snapshot.current_action.result, "not enough time units");

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn kneeling_and_standing_charge_time_units() {
    let runtime = start(skirmish());
    let handle = runtime.handle();

    handle.send(PlayerCommand::Kneel).await.unwrap();
    let kneeling = handle.query().await.unwrap();
    assert!(unit(&kneeling, 1).flags.contains(UnitFlags::KNEELING));
    assert_eq!(unit(&kneeling, 1).time_units, 56);

    handle.send(PlayerCommand::Kneel).await.unwrap();
    let standing = handle.query().await.unwrap();
    assert!(!unit(&standing, 1).flags.contains(UnitFlags::KNEELING));
    assert_eq!(unit(&standing, 1).time_units, 48);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn ending_the_turn_hands_control_to_the_hostiles() {
    let runtime = start(skirmish());
    let handle = runtime.handle();
    let mut turn_events = handle.subscribe(Topic::Turn);

    handle.send(PlayerCommand::EndTurn).await.unwrap();
    handle.advance(1).await.unwrap();

    let event = turn_events.try_recv().expect("turn event published");
    assert_eq!(
        event.event,
        BattleEvent::TurnEnded {
            side: Faction::Hostile,
            turn: 1
        }
    );
    let snapshot = handle.query().await.unwrap();
    assert_eq!(snapshot.battlefield.side, Faction::Hostile);
    let selected = snapshot.selected_unit().expect("an alien is selected");
    assert_eq!(unit(&snapshot, selected.0).faction, Faction::Hostile);

    // Player commands are ignored while the aliens move.
    handle
        .send(PlayerCommand::Click(Position::new(3, 3, 0)))
        .await
        .unwrap();
    let unchanged = handle.query().await.unwrap();
    assert_eq!(unit(&unchanged, 1).position, Position::new(1, 1, 0));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn the_ai_sides_eventually_pass_the_turn_back() {
    let runtime = start(skirmish());
    let handle = runtime.handle();

    handle.send(PlayerCommand::EndTurn).await.unwrap();
    let mut snapshot = handle.query().await.unwrap();
    for _ in 0..200 {
        handle.advance(50).await.unwrap();
        snapshot = handle.query().await.unwrap();
        if snapshot.outcome.is_some() || snapshot.battlefield.turn > 1 {
            break;
        }
    }

    if snapshot.outcome.is_none() {
        assert_eq!(snapshot.battlefield.side, Faction::Player);
        assert_eq!(snapshot.battlefield.turn, 2);
        assert!(unit(&snapshot, 1).time_units > 0);
    }

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn scenario_files_load_from_disk() {
    let scenario = skirmish();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(scenario.to_ron_string().unwrap().as_bytes())
        .unwrap();

    let loaded = Scenario::load(file.path()).unwrap();
    assert_eq!(loaded, scenario);

    let runtime = start(loaded);
    let snapshot = runtime.handle().query().await.unwrap();
    assert_eq!(snapshot.battlefield.units.len(), scenario.units.len());
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn missing_scenario_files_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = Scenario::load(dir.path().join("absent.ron")).unwrap_err();
    assert!(matches!(err, RuntimeError::Io { .. }));
}

#[tokio::test]
async fn building_without_a_battlefield_fails() {
    let err = Runtime::builder()
        .config(RuntimeConfig::manual())
        .build()
        .err()
        .expect("build should fail");
    assert!(matches!(err, RuntimeError::MissingBattlefield));
}
