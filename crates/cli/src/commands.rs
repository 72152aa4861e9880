//! Line-oriented command parsing.

use std::str::FromStr;

use battle_core::{BattleActionType, ItemId, Position};
use battle_runtime::PlayerCommand;
use thiserror::Error;

pub const HELP: &str = "\
commands:
  click X Y [Z]          select a unit, walk there, or confirm the target
  turn X Y [Z]           face a tile (right click); cancels targeting
  action KIND [ITEM] [N] pick an action: snapshot, aimedshot, autoshot, hit,
                         stun, throw, prime (N = fuse), use
  kneel                  kneel or stand up
  next                   select the next unit
  up | down              change level
  reserve KIND           keep time units for a shot (none to clear)
  cancel                 cancel targeting or the running action
  end                    end the turn
  status | json          show the battle
  help | quit";

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
enum Verb {
    #[strum(serialize = "click", serialize = "c")]
    Click,
    #[strum(serialize = "turn", serialize = "t")]
    Turn,
    #[strum(serialize = "action", serialize = "a")]
    Action,
    Kneel,
    #[strum(serialize = "next", serialize = "n")]
    Next,
    Up,
    Down,
    Reserve,
    Cancel,
    #[strum(serialize = "end", serialize = "endturn")]
    End,
    #[strum(serialize = "status", serialize = "s")]
    Status,
    Json,
    #[strum(serialize = "help", serialize = "?")]
    Help,
    #[strum(serialize = "quit", serialize = "q", serialize = "exit")]
    Quit,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Command(PlayerCommand),
    Status,
    Json,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command `{0}`, try `help`")]
    UnknownCommand(String),

    #[error("`{command}` expects {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("`{0}` is not a number")]
    NotANumber(String),

    #[error("unknown action `{0}`")]
    UnknownAction(String),
}

/// Parses one input line; blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Input>, ParseError> {
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return Ok(None);
    };
    let verb = Verb::from_str(&first.to_ascii_lowercase())
        .map_err(|_| ParseError::UnknownCommand(first.to_owned()))?;
    let args: Vec<&str> = words.collect();

    let input = match verb {
        Verb::Click => Input::Command(PlayerCommand::Click(position("click", &args)?)),
        Verb::Turn => Input::Command(PlayerCommand::RightClick(position("turn", &args)?)),
        Verb::Action => {
            let kind = args.first().ok_or(ParseError::MissingArgument {
                command: "action",
                expected: "an action kind",
            })?;
            let kind = action_kind(kind)?;
            let weapon = args.get(1).map(|id| number::<u32>(id)).transpose()?.map(ItemId);
            let value = args.get(2).map(|value| number::<i32>(value)).transpose()?;
            Input::Command(PlayerCommand::SelectAction {
                kind,
                weapon,
                value: value.unwrap_or(0),
            })
        }
        Verb::Kneel => Input::Command(PlayerCommand::Kneel),
        Verb::Next => Input::Command(PlayerCommand::NextUnit),
        Verb::Up => Input::Command(PlayerCommand::MoveUpDown(1)),
        Verb::Down => Input::Command(PlayerCommand::MoveUpDown(-1)),
        Verb::Reserve => {
            let kind = args.first().ok_or(ParseError::MissingArgument {
                command: "reserve",
                expected: "a shot kind or none",
            })?;
            Input::Command(PlayerCommand::SetReserve(action_kind(kind)?))
        }
        Verb::Cancel => Input::Command(PlayerCommand::Cancel),
        Verb::End => Input::Command(PlayerCommand::EndTurn),
        Verb::Status => Input::Status,
        Verb::Json => Input::Json,
        Verb::Help => Input::Help,
        Verb::Quit => Input::Quit,
    };
    Ok(Some(input))
}

fn position(command: &'static str, args: &[&str]) -> Result<Position, ParseError> {
    let missing = ParseError::MissingArgument {
        command,
        expected: "X Y [Z]",
    };
    let (Some(x), Some(y)) = (args.first(), args.get(1)) else {
        return Err(missing);
    };
    let z = args.get(2).map(|z| number::<i32>(z)).transpose()?.unwrap_or(0);
    Ok(Position::new(number(x)?, number(y)?, z))
}

fn number<T: FromStr>(word: &str) -> Result<T, ParseError> {
    word.parse()
        .map_err(|_| ParseError::NotANumber(word.to_owned()))
}

fn action_kind(word: &str) -> Result<BattleActionType, ParseError> {
    BattleActionType::from_str(&word.to_ascii_lowercase())
        .map_err(|_| ParseError::UnknownAction(word.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clicks_with_optional_level() {
        assert_eq!(
            parse("click 3 4").unwrap(),
            Some(Input::Command(PlayerCommand::Click(Position::new(3, 4, 0))))
        );
        assert_eq!(
            parse("  T 1 2 1 ").unwrap(),
            Some(Input::Command(PlayerCommand::RightClick(Position::new(1, 2, 1))))
        );
        assert_eq!(parse("").unwrap(), None);
    }

    #[test]
    fn parses_action_selection() {
        assert_eq!(
            parse("action prime 4 2").unwrap(),
            Some(Input::Command(PlayerCommand::SelectAction {
                kind: BattleActionType::Prime,
                weapon: Some(ItemId(4)),
                value: 2,
            }))
        );
        assert_eq!(
            parse("a AimedShot").unwrap(),
            Some(Input::Command(PlayerCommand::SelectAction {
                kind: BattleActionType::Aimedshot,
                weapon: None,
                value: 0,
            }))
        );
        assert_eq!(
            parse("reserve snapshot").unwrap(),
            Some(Input::Command(PlayerCommand::SetReserve(BattleActionType::Snapshot)))
        );
    }

    #[test]
    fn reports_bad_input() {
        assert_eq!(
            parse("dance").unwrap_err(),
            ParseError::UnknownCommand("dance".to_owned())
        );
        assert_eq!(parse("click 3 x").unwrap_err(), ParseError::NotANumber("x".to_owned()));
        assert!(matches!(
            parse("click 3").unwrap_err(),
            ParseError::MissingArgument { .. }
        ));
        assert_eq!(
            parse("action fly").unwrap_err(),
            ParseError::UnknownAction("fly".to_owned())
        );
    }
}
