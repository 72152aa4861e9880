//! Terminal front end for battlescape sessions.
//!
//! Reads one command per line from stdin, forwards it to the runtime, and
//! prints what happens on the battlefield. Logs go to a file; see
//! [`config::CliConfig`] for the environment variables.
mod commands;
mod config;
mod logging;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};

use battle_core::BattleEvent;
use battle_runtime::{BattleSnapshot, Event, Runtime, Scenario, Topic};

use commands::Input;
use config::CliConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = CliConfig::from_env();
    let _log_guard = logging::setup_logging(&config)?;

    let scenario = match &config.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::embedded_skirmish()?,
    };
    tracing::info!(scenario = %scenario.name, tick = ?config.tick, "starting battle");
    println!("{}", scenario.name);

    let runtime = Runtime::builder()
        .config(config.runtime_config())
        .scenario(scenario)
        .build()?;
    let handle = runtime.handle();

    let printer = tokio::spawn(print_events(
        handle.subscribe(Topic::Battle),
        handle.subscribe(Topic::Turn),
    ));

    print_status(&handle.query().await?);
    println!("type `help` for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match commands::parse(&line) {
            Ok(None) => {}
            Ok(Some(Input::Quit)) => break,
            Ok(Some(Input::Help)) => println!("{}", commands::HELP),
            Ok(Some(Input::Status)) => print_status(&handle.query().await?),
            Ok(Some(Input::Json)) => println!("{}", handle.query().await?.to_json()?),
            Ok(Some(Input::Command(command))) => {
                if let Err(error) = handle.send(command).await {
                    println!("! {error}");
                }
            }
            Err(error) => println!("? {error}"),
        }
    }

    printer.abort();
    runtime.shutdown().await?;
    tracing::info!("battle closed");
    Ok(())
}

async fn print_events(mut battle: broadcast::Receiver<Event>, mut turn: broadcast::Receiver<Event>) {
    loop {
        let received = tokio::select! {
            event = battle.recv() => event,
            event = turn.recv() => event,
        };
        match received {
            Ok(event) => println!("[{:>5}] {}", event.tick, describe(&event.event)),
            Err(RecvError::Lagged(missed)) => {
                tracing::warn!(missed, "event printer lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn describe(event: &BattleEvent) -> String {
    match event {
        BattleEvent::ActionRejected { kind, message, .. } => format!("{kind} refused: {message}"),
        BattleEvent::ActionMessage { actor, message } => format!("unit {actor}: {message}"),
        BattleEvent::UnitMoved { unit, to } => {
            format!("unit {unit} moves to ({}, {}, {})", to.x, to.y, to.z)
        }
        BattleEvent::ShotFired { actor, target, hit } => format!(
            "unit {actor} fires at ({}, {}, {}): {}",
            target.x,
            target.y,
            target.z,
            if *hit { "hit" } else { "miss" }
        ),
        BattleEvent::GrenadePrimed { actor, item, fuse } => {
            format!("unit {actor} primes item {item} ({fuse} turns)")
        }
        BattleEvent::ItemDropped { item, position } => {
            format!("item {item} lands at ({}, {}, {})", position.x, position.y, position.z)
        }
        BattleEvent::Explosion { center, power, radius } => format!(
            "explosion at ({}, {}, {}), power {power}, radius {radius}",
            center.x, center.y, center.z
        ),
        BattleEvent::UnitKilled { unit, killer } => match killer {
            Some(killer) => format!("unit {unit} killed by {killer}"),
            None => format!("unit {unit} killed"),
        },
        BattleEvent::UnitKnockedOut { unit } => format!("unit {unit} knocked out"),
        BattleEvent::CorpseCreated { unit, item, .. } => format!("unit {unit} leaves corpse {item}"),
        BattleEvent::UnitPanicked { unit, berserk } => {
            if *berserk {
                format!("unit {unit} has gone berserk")
            } else {
                format!("unit {unit} has panicked")
            }
        }
        BattleEvent::UnitRevived { unit } => format!("unit {unit} regains consciousness"),
        BattleEvent::TurnEnded { side, turn } => format!("turn {turn}: {side} side moves"),
        BattleEvent::BattleFinished { outcome } => format!("battle over: {outcome}"),
    }
}

fn print_status(snapshot: &BattleSnapshot) {
    let battle = &snapshot.battlefield;
    println!(
        "turn {} | {} side | {} | reserve {}",
        battle.turn, battle.side, snapshot.phase, snapshot.tu_reserved
    );
    if let Some(outcome) = snapshot.outcome {
        println!("battle over: {outcome}");
    }
    for unit in &battle.units {
        let marker = if battle.selected == Some(unit.id) { '>' } else { ' ' };
        let hand = unit
            .main_hand()
            .and_then(|id| battle.item(id))
            .map_or_else(|| "-".to_owned(), |item| format!("{} {} [{}]", item.id, item.rule, item.ammo));
        println!(
            "{marker} {:<4} {:<18} {:<8} ({:>2}, {:>2}, {}) tu {:>3}/{:<3} hp {:>3} morale {:>3} {:<11} {hand}",
            unit.id.to_string(),
            unit.name,
            unit.faction.to_string(),
            unit.position.x,
            unit.position.y,
            unit.position.z,
            unit.time_units,
            unit.stats.time_units,
            unit.health,
            unit.morale,
            unit.status.to_string(),
        );
    }
    if !snapshot.current_action.result.is_empty() {
        println!("! {}", snapshot.current_action.result);
    }
}
