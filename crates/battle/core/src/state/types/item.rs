//! Item instances placed on the battlefield.
//!
//! An item lives in exactly one place: a unit's inventory (`owner`), a tile
//! (`position`), or nowhere yet (freshly spawned, waiting to be dropped).

use super::{ItemId, Position, UnitId};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleItem {
    pub id: ItemId,
    /// Rule identifier resolved through the ruleset oracle.
    pub rule: String,
    pub owner: Option<UnitId>,
    pub position: Option<Position>,
    /// Set on corpses and unconscious bodies.
    pub body_of: Option<UnitId>,
    /// `Some` once primed; explodes when it reaches 0 at the end of a turn.
    pub fuse_timer: Option<i32>,
    pub ammo: u32,
    pub previous_owner: Option<UnitId>,
}

impl BattleItem {
    pub fn new(id: ItemId, rule: impl Into<String>) -> Self {
        Self {
            id,
            rule: rule.into(),
            owner: None,
            position: None,
            body_of: None,
            fuse_timer: None,
            ammo: 0,
            previous_owner: None,
        }
    }

    pub fn with_ammo(mut self, ammo: u32) -> Self {
        self.ammo = ammo;
        self
    }

    pub fn body_of(mut self, unit: UnitId) -> Self {
        self.body_of = Some(unit);
        self
    }

    pub fn is_primed(&self) -> bool {
        self.fuse_timer.is_some()
    }
}
