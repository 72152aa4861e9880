//! Fire-and-forget presentation collaborators. Missing sinks are skipped.

use crate::state::{Position, UnitId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CursorMode {
    /// Hidden while the engine is busy or the AI moves.
    None,
    #[default]
    Normal,
    Aim,
    Throw,
}

/// A sound from a named sound set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SoundCue {
    pub set: &'static str,
    pub index: u32,
}

impl SoundCue {
    pub const BATTLE_SET: &'static str = "BATTLE.CAT";

    pub const fn battle(index: u32) -> Self {
        Self {
            set: Self::BATTLE_SET,
            index,
        }
    }
}

pub trait ViewSink: Send + Sync {
    fn center_on(&self, position: Position);

    /// Invalidates the cached sprite of a unit.
    fn cache_unit(&self, unit: UnitId);

    fn set_cursor(&self, mode: CursorMode);
}

pub trait AudioSink: Send + Sync {
    /// Returns `false` when the cue is not available.
    fn play(&self, cue: SoundCue) -> bool;
}
