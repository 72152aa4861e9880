//! Default collaborators for headless battles.
//!
//! [`OracleBundle`] owns one implementation of every trait the engine
//! consults and lends them out as a [`BattleEnv`] per tick.
mod grid;
mod ruleset;
mod sinks;

pub use grid::{GridPathfinding, GridTileEngine};
pub use ruleset::StaticRuleset;
pub use sinks::{TracingAudio, TracingView};

use std::sync::Arc;

use battle_core::{
    AiStrategy, BattleEnv, Pathfinding, PcgRng, RngOracle, RulesetOracle, TacticalAi, TileEngine,
};

#[derive(Clone)]
pub struct OracleBundle {
    pub ruleset: Arc<dyn RulesetOracle>,
    pub pathfinding: Arc<dyn Pathfinding>,
    pub tile_engine: Arc<dyn TileEngine>,
    pub rng: Arc<dyn RngOracle>,
    pub ai: Arc<dyn AiStrategy>,
    pub view: Arc<TracingView>,
    pub audio: Arc<TracingAudio>,
}

impl OracleBundle {
    /// Grid movement, range sight, PCG rolls and the tactical AI around
    /// `ruleset`.
    pub fn new(ruleset: Arc<dyn RulesetOracle>) -> Self {
        Self {
            ruleset,
            pathfinding: Arc::new(GridPathfinding::new()),
            tile_engine: Arc::new(GridTileEngine::default()),
            rng: Arc::new(PcgRng),
            ai: Arc::new(TacticalAi::new()),
            view: Arc::new(TracingView::default()),
            audio: Arc::new(TracingAudio),
        }
    }

    pub fn with_ai(mut self, ai: Arc<dyn AiStrategy>) -> Self {
        self.ai = ai;
        self
    }

    pub fn with_pathfinding(mut self, pathfinding: Arc<dyn Pathfinding>) -> Self {
        self.pathfinding = pathfinding;
        self
    }

    pub fn with_tile_engine(mut self, tile_engine: Arc<dyn TileEngine>) -> Self {
        self.tile_engine = tile_engine;
        self
    }

    pub fn with_rng(mut self, rng: Arc<dyn RngOracle>) -> Self {
        self.rng = rng;
        self
    }

    pub fn as_env(&self) -> BattleEnv<'_> {
        BattleEnv::empty()
            .with_ruleset(self.ruleset.as_ref())
            .with_pathfinding(self.pathfinding.as_ref())
            .with_tile_engine(self.tile_engine.as_ref())
            .with_rng(self.rng.as_ref())
            .with_ai(self.ai.as_ref())
            .with_view(self.view.as_ref())
            .with_audio(self.audio.as_ref())
    }
}
