//! Scenario files: map extents, unit placements and loose items.
//!
//! A scenario is plain data in RON. [`Scenario::build`] turns it into a
//! [`Battlefield`], resolving item rules through the ruleset so magazines
//! start full unless the file says otherwise.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use battle_core::{
    BattleItem, BattleUnit, Battlefield, Faction, MapSize, Position, RulesetOracle, UnitCategory,
    UnitId, UnitStats,
};

use crate::api::{Result, RuntimeError};

const EMBEDDED_SKIRMISH: &str = include_str!("../../data/skirmish.ron");

/// Item in a unit's inventory. The first one goes to the main hand.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarriedItem {
    pub rule: String,
    /// Defaults to a full magazine.
    #[serde(default)]
    pub ammo: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPlacement {
    pub id: u32,
    pub name: String,
    pub faction: Faction,
    pub category: UnitCategory,
    pub position: Position,
    pub stats: UnitStats,
    #[serde(default)]
    pub armor: u32,
    #[serde(default = "default_size")]
    pub size: u8,
    #[serde(default)]
    pub direction: u8,
    #[serde(default = "default_morale")]
    pub morale: u32,
    /// Corpse rule; large units get one numbered rule per footprint tile.
    #[serde(default)]
    pub corpse: String,
    /// Blast power released on death; 0 for none.
    #[serde(default)]
    pub death_explosion: u32,
    #[serde(default)]
    pub inventory: Vec<CarriedItem>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPlacement {
    pub rule: String,
    pub position: Position,
    #[serde(default)]
    pub ammo: Option<u32>,
    /// Primed grenades lying around.
    #[serde(default)]
    pub fuse: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub size: MapSize,
    pub seed: u64,
    /// Upper-level tiles with a floor; the ground level always has one.
    #[serde(default)]
    pub floors: Vec<Position>,
    #[serde(default)]
    pub units: Vec<UnitPlacement>,
    #[serde(default)]
    pub items: Vec<ItemPlacement>,
}

fn default_size() -> u8 {
    1
}

fn default_morale() -> u32 {
    100
}

impl Scenario {
    pub fn from_ron_str(content: &str, origin: &str) -> Result<Self> {
        ron::from_str(content).map_err(|source| RuntimeError::Parse {
            origin: origin.to_owned(),
            source,
        })
    }

    /// Load scenario from a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| RuntimeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&content, &path.display().to_string())
    }

    /// The skirmish shipped with the crate.
    pub fn embedded_skirmish() -> Result<Self> {
        Self::from_ron_str(EMBEDDED_SKIRMISH, "embedded skirmish.ron")
    }

    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|error| RuntimeError::InvalidScenario(error.to_string()))
    }

    /// Lays out the battlefield. The first player unit starts selected.
    pub fn build(&self, ruleset: &dyn RulesetOracle) -> Result<Battlefield> {
        if self.size.tile_count() == 0 {
            return Err(RuntimeError::InvalidScenario(format!(
                "scenario {} has an empty map",
                self.name
            )));
        }
        let mut battle = Battlefield::new(self.size, self.seed);
        for floor in &self.floors {
            if !battle.in_bounds(*floor) {
                return Err(RuntimeError::InvalidScenario(format!(
                    "floor {floor:?} is off the map"
                )));
            }
            battle.set_floor(*floor, true);
        }

        for placement in &self.units {
            let unit = placement.to_unit();
            if placement.corpse.is_empty() {
                warn!(target: "runtime::worker", unit = %unit.id, "unit leaves no corpse");
            }
            battle.place_unit(unit)?;
            for carried in &placement.inventory {
                let rule = ruleset.item(&carried.rule).ok_or_else(|| {
                    RuntimeError::InvalidScenario(format!(
                        "unit {} carries unknown item {}",
                        placement.id, carried.rule
                    ))
                })?;
                let id = battle.next_item_id();
                let mut item = BattleItem::new(id, &carried.rule)
                    .with_ammo(carried.ammo.unwrap_or(rule.clip_size));
                item.owner = Some(UnitId(placement.id));
                battle.add_item(item)?;
            }
        }

        for placement in &self.items {
            let rule = ruleset.item(&placement.rule).ok_or_else(|| {
                RuntimeError::InvalidScenario(format!("unknown item {}", placement.rule))
            })?;
            let id = battle.next_item_id();
            let mut item = BattleItem::new(id, &placement.rule)
                .with_ammo(placement.ammo.unwrap_or(rule.clip_size));
            item.position = Some(placement.position);
            item.fuse_timer = placement.fuse;
            battle.add_item(item)?;
        }

        battle.selected = battle
            .units
            .iter()
            .find(|unit| unit.faction == Faction::Player && !unit.is_out())
            .map(|unit| unit.id);
        debug!(
            target: "runtime::worker",
            scenario = %self.name,
            units = battle.units.len(),
            items = battle.items.len(),
            "scenario built"
        );
        Ok(battle)
    }
}

impl UnitPlacement {
    fn to_unit(&self) -> BattleUnit {
        let mut unit = BattleUnit::new(
            UnitId(self.id),
            &self.name,
            self.faction,
            self.category,
            self.stats,
            self.position,
        )
        .with_size(self.size)
        .with_direction(self.direction)
        .with_corpse(&self.corpse);
        unit.armor = self.armor;
        unit.morale = self.morale.min(100);
        if self.death_explosion > 0 {
            unit = unit.exploding_on_death(self.death_explosion);
        }
        unit
    }
}
