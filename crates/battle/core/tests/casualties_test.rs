mod common;

use battle_core::states::{ExplosionState, UnitDieState};
use battle_core::{
    BattleConfig, BattleEvent, DamageType, Position, QueuedState, SoundCue, StateKind, UnitId,
    UnitStatus,
};

use common::{Harness, alien, soldier};

fn check(h: &mut Harness, terrain: bool) -> bool {
    let env = h.world.env();
    h.game
        .check_for_casualties(&mut h.battle, &env, None, None, false, terrain)
}

fn corpses_of(h: &Harness, unit: UnitId) -> Vec<(String, Position)> {
    h.battle
        .items
        .iter()
        .filter(|item| item.body_of == Some(unit))
        .filter_map(|item| Some((item.rule.clone(), item.position?)))
        .collect()
}

#[test]
fn explosive_death_is_instant_and_shakes_morale() {
    let mut h = Harness::new();
    let ana = h.place(soldier(1, Position::new(1, 1, 0)));
    let victim = h.place(alien(2, Position::new(5, 5, 0)));
    let witness = h.place(alien(3, Position::new(8, 8, 0)));
    h.unit_mut(ana).morale = 50;
    h.unit_mut(victim).health = 0;

    assert!(check(&mut h, true));
    assert_eq!(h.unit(victim).status, UnitStatus::Dead);
    assert_eq!(
        h.game.queued_states(),
        [QueuedState {
            kind: Some(StateKind::UnitDie),
            actor: None,
            casualty: Some(victim),
        }]
    );
    assert!(!check(&mut h, true), "a pending death is not queued twice");

    // Bravery 50 costs the witness 12 morale; the other side gains 10.
    assert_eq!(h.unit(witness).morale, 88);
    assert_eq!(h.unit(ana).morale, 60);

    h.tick();
    assert!(!h.game.is_busy());
    assert_eq!(h.battle.unit_at(Position::new(5, 5, 0)), None);
    assert_eq!(
        corpses_of(&h, victim),
        [("alien_corpse".to_owned(), Position::new(5, 5, 0))]
    );
    assert!(
        h.world
            .recorder
            .sounds
            .lock()
            .unwrap()
            .contains(&SoundCue::battle(10))
    );

    let events = h.events();
    assert_eq!(
        events[0],
        BattleEvent::UnitKilled {
            unit: victim,
            killer: None
        }
    );
    assert!(matches!(
        events.last(),
        Some(BattleEvent::CorpseCreated { unit, .. }) if *unit == victim
    ));
}

#[test]
fn ordinary_death_turns_and_falls_before_leaving_a_corpse() {
    let mut h = Harness::new();
    h.place(soldier(1, Position::new(1, 1, 0)));
    let victim = h.place(alien(2, Position::new(5, 5, 0)));
    h.unit_mut(victim).health = 0;

    assert!(check(&mut h, false));
    assert_eq!(h.unit(victim).status, UnitStatus::Turning);

    h.tick();
    assert!(!h.unit(victim).is_out());

    let env = h.world.env();
    assert!(
        !h.game.cancel_current_action(&mut h.battle, &env, false),
        "deaths cannot be cancelled"
    );
    assert_eq!(h.game.queue_len(), 1);

    // Two more facing steps, three fall frames.
    assert_eq!(h.run_until_idle(), 6);
    let dead = h.unit(victim);
    assert_eq!(dead.status, UnitStatus::Dead);
    assert_eq!(dead.direction, 3);
    assert_eq!(corpses_of(&h, victim).len(), 1);
}

#[test]
fn fallen_soldier_spills_inventory_beside_the_corpse() {
    let mut h = Harness::new();
    let ana = h.place(soldier(1, Position::new(5, 5, 0)));
    h.place(alien(2, Position::new(9, 9, 0)));
    let rifle = h.give(ana, "rifle", 10);
    let grenade = h.give(ana, "grenade", 0);
    h.unit_mut(ana).health = 0;

    assert!(check(&mut h, true));
    h.run_until_idle();

    let tile = h.battle.tile(Position::new(5, 5, 0)).unwrap();
    assert_eq!(tile.items.len(), 2 + 1);
    assert!(tile.items.contains(&rifle) && tile.items.contains(&grenade));
    assert!(h.unit(ana).inventory.is_empty());
    assert_eq!(h.battle.item(rifle).unwrap().previous_owner, Some(ana));
    assert_eq!(corpses_of(&h, ana).len(), 1);
}

#[test]
fn large_unit_leaves_one_corpse_per_tile_and_loses_its_inventory() {
    let mut h = Harness::new();
    h.place(soldier(1, Position::new(1, 1, 0)));
    let disc = h.place(alien(2, Position::new(4, 4, 0)).with_size(2).with_corpse("disc_corpse"));
    let cannon = h.give(disc, "rifle", 10);
    h.unit_mut(disc).health = 0;

    assert!(check(&mut h, true));
    h.run_until_idle();

    assert_eq!(
        corpses_of(&h, disc),
        [
            ("disc_corpse1".to_owned(), Position::new(4, 4, 0)),
            ("disc_corpse2".to_owned(), Position::new(5, 4, 0)),
            ("disc_corpse3".to_owned(), Position::new(4, 5, 0)),
            ("disc_corpse4".to_owned(), Position::new(5, 5, 0)),
        ]
    );
    assert!(h.battle.item(cannon).is_none());
    assert_eq!(h.battle.unit_at(Position::new(5, 5, 0)), None);
}

#[test]
fn death_explosion_chains_into_new_casualties() {
    let mut h = Harness::new();
    let ana = h.place(soldier(1, Position::new(6, 4, 0)));
    h.place(soldier(3, Position::new(11, 11, 0)));
    h.place(alien(4, Position::new(11, 0, 0)));
    let disc = h.place(
        alien(2, Position::new(4, 4, 0))
            .with_size(2)
            .with_corpse("disc_corpse")
            .exploding_on_death(60),
    );
    h.unit_mut(disc).health = 0;

    assert!(check(&mut h, true));
    h.tick();
    assert_eq!(
        h.game.queued_states().first().and_then(|queued| queued.kind),
        Some(StateKind::Explosion)
    );

    h.run_until_idle();
    assert_eq!(h.unit(ana).health, 0);
    assert_eq!(h.unit(ana).status, UnitStatus::Dead);
    assert_eq!(h.unit(UnitId(3)).health, 30);
    assert_eq!(h.unit(UnitId(4)).health, 15);

    let milestones: Vec<BattleEvent> = h
        .events()
        .into_iter()
        .filter(|event| {
            matches!(
                event,
                BattleEvent::UnitKilled { .. } | BattleEvent::Explosion { .. }
            )
        })
        .collect();
    assert_eq!(
        milestones,
        [
            BattleEvent::UnitKilled {
                unit: disc,
                killer: None
            },
            BattleEvent::Explosion {
                center: Position::new(4, 4, 0),
                power: 60,
                radius: 6
            },
            BattleEvent::UnitKilled {
                unit: ana,
                killer: Some(disc)
            },
        ]
    );
}

#[test]
fn casualties_queue_behind_the_running_state_in_discovery_order() {
    let mut h = Harness::new();
    h.place(soldier(1, Position::new(0, 0, 0)));
    let first = h.place(alien(2, Position::new(2, 2, 0)));
    h.place(alien(3, Position::new(3, 3, 0)));
    let last = h.place(alien(4, Position::new(4, 4, 0)));
    h.unit_mut(last).health = 0;
    h.unit_mut(first).health = 0;

    let config = BattleConfig::instant();
    h.game
        .state_push_back(Box::new(ExplosionState::new(Position::new(9, 9, 0), 1, 1, &config).hidden()));
    assert!(check(&mut h, false));

    let casualties: Vec<Option<UnitId>> = h
        .game
        .queued_states()
        .iter()
        .map(|queued| queued.casualty)
        .collect();
    assert_eq!(casualties, [None, Some(first), Some(last)]);
}

#[test]
fn death_state_built_by_hand_reports_its_casualty() {
    let mut h = Harness::new();
    let victim = h.place(alien(2, Position::new(2, 2, 0)));
    h.unit_mut(victim).health = 0;

    let state = UnitDieState::new(victim, DamageType::Plasma, true, &mut h.battle, h.game.config());
    assert_eq!(state.unit(), victim);
    assert_eq!(state.damage(), DamageType::Plasma);
    h.game.state_push_front(Box::new(state));

    h.run_until_idle();
    assert_eq!(h.unit(victim).status, UnitStatus::Dead);
    assert!(h.world.recorder.sounds.lock().unwrap().is_empty());
}

#[test]
fn knocked_out_unit_lies_as_a_body_and_wakes_up_later() {
    let mut h = Harness::new();
    h.place(soldier(1, Position::new(1, 1, 0)));
    h.place(alien(3, Position::new(9, 9, 0)));
    let stunned = h.place(alien(2, Position::new(5, 5, 0)));
    h.unit_mut(stunned).stun_level = 20;

    assert!(check(&mut h, false));
    h.run_until_idle();

    assert_eq!(h.unit(stunned).status, UnitStatus::Unconscious);
    assert_eq!(h.unit(stunned).health, 15);
    assert_eq!(
        corpses_of(&h, stunned),
        [("alien_corpse".to_owned(), Position::new(5, 5, 0))]
    );
    assert_eq!(h.battle.unit_at(Position::new(5, 5, 0)), None);
    let events = h.events();
    assert!(events.contains(&BattleEvent::UnitKnockedOut { unit: stunned }));
    assert!(!events.iter().any(|event| matches!(event, BattleEvent::UnitKilled { .. })));

    h.unit_mut(stunned).stun_level = 0;
    let env = h.world.env();
    h.game.end_turn(&mut h.battle, &env);

    assert_eq!(h.unit(stunned).status, UnitStatus::Standing);
    assert!(corpses_of(&h, stunned).is_empty());
    assert_eq!(h.battle.unit_at(Position::new(5, 5, 0)), Some(stunned));
    assert!(h.events().contains(&BattleEvent::UnitRevived { unit: stunned }));
}
