mod common;
mod item;
mod tile;
mod unit;

pub use common::{Faction, ItemId, Position, UnitId};
pub use item::BattleItem;
pub use tile::{MapSize, Tile};
pub use unit::{
    BattleUnit, FALL_FRAMES, Gender, Inventory, SpecialAbility, UnitCategory, UnitFlags,
    UnitStats, UnitStatus,
};
