//! Collaborators the engine consults but does not own.
//!
//! Rules, pathfinding, line of sight, randomness, AI decisions, and the
//! presentation sinks (camera, sprites, audio) are all reached through traits.
//! The [`BattleEnv`] aggregate bundles borrowed implementations so the engine
//! stays decoupled from concrete backends. Required collaborators surface an
//! [`OracleError`] when absent; presentation sinks are skipped silently.
mod error;
mod pathfinding;
mod rng;
mod ruleset;
mod sinks;
mod tile_engine;

pub use error::OracleError;
pub use pathfinding::{Path, Pathfinding};
pub use rng::{PcgRng, RngOracle, compute_seed};
pub use ruleset::{BattleType, DamageType, ItemRule, RulesetOracle};
pub use sinks::{AudioSink, CursorMode, SoundCue, ViewSink};
pub use tile_engine::TileEngine;

use crate::ai::AiStrategy;
use crate::state::{Battlefield, ItemId, Position, UnitId};

#[derive(Clone, Copy, Default)]
pub struct BattleEnv<'a> {
    ruleset: Option<&'a dyn RulesetOracle>,
    tile_engine: Option<&'a dyn TileEngine>,
    pathfinding: Option<&'a dyn Pathfinding>,
    rng: Option<&'a dyn RngOracle>,
    ai: Option<&'a dyn AiStrategy>,
    view: Option<&'a dyn ViewSink>,
    audio: Option<&'a dyn AudioSink>,
}

impl<'a> BattleEnv<'a> {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_ruleset(mut self, ruleset: &'a dyn RulesetOracle) -> Self {
        self.ruleset = Some(ruleset);
        self
    }

    pub fn with_tile_engine(mut self, tile_engine: &'a dyn TileEngine) -> Self {
        self.tile_engine = Some(tile_engine);
        self
    }

    pub fn with_pathfinding(mut self, pathfinding: &'a dyn Pathfinding) -> Self {
        self.pathfinding = Some(pathfinding);
        self
    }

    pub fn with_rng(mut self, rng: &'a dyn RngOracle) -> Self {
        self.rng = Some(rng);
        self
    }

    pub fn with_ai(mut self, ai: &'a dyn AiStrategy) -> Self {
        self.ai = Some(ai);
        self
    }

    pub fn with_view(mut self, view: &'a dyn ViewSink) -> Self {
        self.view = Some(view);
        self
    }

    pub fn with_audio(mut self, audio: &'a dyn AudioSink) -> Self {
        self.audio = Some(audio);
        self
    }

    /// # Errors
    ///
    /// Returns `OracleError::RulesetNotAvailable` if no ruleset was provided.
    pub fn ruleset(&self) -> Result<&'a dyn RulesetOracle, OracleError> {
        self.ruleset.ok_or(OracleError::RulesetNotAvailable)
    }

    /// # Errors
    ///
    /// Returns `OracleError::TileEngineNotAvailable` if no tile engine was provided.
    pub fn tile_engine(&self) -> Result<&'a dyn TileEngine, OracleError> {
        self.tile_engine.ok_or(OracleError::TileEngineNotAvailable)
    }

    /// # Errors
    ///
    /// Returns `OracleError::PathfindingNotAvailable` if no pathfinding was provided.
    pub fn pathfinding(&self) -> Result<&'a dyn Pathfinding, OracleError> {
        self.pathfinding.ok_or(OracleError::PathfindingNotAvailable)
    }

    /// Falls back to [`PcgRng`] so rolls stay deterministic without wiring.
    pub fn rng(&self) -> &'a dyn RngOracle {
        self.rng.unwrap_or(&PcgRng)
    }

    pub fn ai(&self) -> Option<&'a dyn AiStrategy> {
        self.ai
    }

    /// # Errors
    ///
    /// Returns an error when the ruleset is missing or lacks the rule.
    pub fn item_rule(&self, id: &str) -> Result<&'a ItemRule, OracleError> {
        self.ruleset()?
            .item(id)
            .ok_or_else(|| OracleError::UnknownItemRule(id.to_owned()))
    }

    /// Rule of a battlefield item, if both the item and its rule exist.
    pub fn rule_of(&self, battle: &Battlefield, item: ItemId) -> Option<&'a ItemRule> {
        let item = battle.item(item)?;
        self.item_rule(&item.rule).ok()
    }

    pub fn center_on(&self, position: Position) {
        if let Some(view) = self.view {
            view.center_on(position);
        }
    }

    pub fn cache_unit(&self, unit: UnitId) {
        if let Some(view) = self.view {
            view.cache_unit(unit);
        }
    }

    pub fn set_cursor(&self, mode: CursorMode) {
        if let Some(view) = self.view {
            view.set_cursor(mode);
        }
    }

    /// Plays a cue; returns `false` when there is no audio or the cue is missing.
    pub fn play(&self, cue: SoundCue) -> bool {
        self.audio.is_some_and(|audio| audio.play(cue))
    }

    pub fn recompute_lighting(&self, battle: &Battlefield) {
        if let Some(tile_engine) = self.tile_engine {
            tile_engine.calculate_unit_lighting(battle);
        }
    }

    pub fn recompute_fov(&self, battle: &Battlefield, unit: UnitId) {
        if let Some(tile_engine) = self.tile_engine {
            tile_engine.calculate_fov(battle, unit);
        }
    }

    /// Units visible to `unit`; empty without a tile engine.
    pub fn visible_units(&self, battle: &Battlefield, unit: UnitId) -> Vec<UnitId> {
        self.tile_engine
            .map(|tile_engine| tile_engine.visible_units(battle, unit))
            .unwrap_or_default()
    }
}
