//! Authoritative battlefield representation.
//!
//! The [`Battlefield`] owns the tile grid, every unit, and every item. The
//! engine borrows it mutably for the duration of a call and never keeps
//! references across ticks; runtime layers clone it for snapshots.
pub mod types;

use crate::env::compute_seed;

pub use types::{
    BattleItem, BattleUnit, FALL_FRAMES, Faction, Gender, Inventory, ItemId, MapSize, Position,
    SpecialAbility, Tile, UnitCategory, UnitFlags, UnitId, UnitStats, UnitStatus,
};

/// Errors raised while laying out a battlefield.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BattlefieldError {
    #[error("position {0:?} is out of map bounds")]
    OutOfBounds(Position),

    #[error("tile {0:?} is already occupied")]
    TileOccupied(Position),

    #[error("unit {0} is already on the battlefield")]
    DuplicateUnit(UnitId),

    #[error("unit {0} is not on the battlefield")]
    UnknownUnit(UnitId),

    #[error("item {0} is already on the battlefield")]
    DuplicateItem(ItemId),

    #[error("unit {unit} has no free inventory slot for item {item}")]
    InventoryFull { unit: UnitId, item: ItemId },
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Battlefield {
    size: MapSize,
    tiles: Vec<Tile>,
    pub units: Vec<BattleUnit>,
    pub items: Vec<BattleItem>,
    /// Faction currently moving.
    pub side: Faction,
    pub turn: u32,
    pub selected: Option<UnitId>,
    /// Base seed for every random roll of the battle.
    pub seed: u64,
    nonce: u64,
    next_item_id: u32,
}

impl Battlefield {
    /// Creates an empty map. Only the ground level has floors.
    pub fn new(size: MapSize, seed: u64) -> Self {
        let mut tiles = Vec::with_capacity(size.tile_count());
        for z in 0..size.height as i32 {
            for y in 0..size.length as i32 {
                for x in 0..size.width as i32 {
                    tiles.push(Tile::new(Position::new(x, y, z), z == 0));
                }
            }
        }
        Self {
            size,
            tiles,
            units: Vec::new(),
            items: Vec::new(),
            side: Faction::Player,
            turn: 1,
            selected: None,
            seed,
            nonce: 0,
            next_item_id: 1,
        }
    }

    pub fn size(&self) -> MapSize {
        self.size
    }

    pub fn in_bounds(&self, position: Position) -> bool {
        self.size.contains(position)
    }

    fn index(&self, position: Position) -> Option<usize> {
        if !self.in_bounds(position) {
            return None;
        }
        let (w, l) = (self.size.width as usize, self.size.length as usize);
        Some(position.z as usize * w * l + position.y as usize * w + position.x as usize)
    }

    pub fn tile(&self, position: Position) -> Option<&Tile> {
        self.index(position).map(|index| &self.tiles[index])
    }

    pub fn tile_mut(&mut self, position: Position) -> Option<&mut Tile> {
        self.index(position).map(move |index| &mut self.tiles[index])
    }

    pub fn set_floor(&mut self, position: Position, has_floor: bool) {
        if let Some(tile) = self.tile_mut(position) {
            tile.has_floor = has_floor;
        }
    }

    /// Clamps a position into the map bounds.
    pub fn clamp(&self, position: Position) -> Position {
        Position::new(
            position.x.clamp(0, self.size.width as i32 - 1),
            position.y.clamp(0, self.size.length as i32 - 1),
            position.z.clamp(0, self.size.height as i32 - 1),
        )
    }

    /// Lowers a position until it rests on a floor or the ground level.
    pub fn apply_gravity(&self, position: Position) -> Position {
        let mut landing = position;
        while landing.z > 0 && self.tile(landing).is_some_and(|tile| !tile.has_floor) {
            landing.z -= 1;
        }
        landing
    }

    pub fn unit(&self, id: UnitId) -> Option<&BattleUnit> {
        self.units.iter().find(|unit| unit.id == id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut BattleUnit> {
        self.units.iter_mut().find(|unit| unit.id == id)
    }

    pub fn unit_at(&self, position: Position) -> Option<UnitId> {
        self.tile(position).and_then(|tile| tile.unit)
    }

    pub fn unit_ids(&self) -> Vec<UnitId> {
        self.units.iter().map(|unit| unit.id).collect()
    }

    pub fn item(&self, id: ItemId) -> Option<&BattleItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut BattleItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Whether every tile of a `size`-wide footprint at `position` is on the
    /// map and free of units other than `ignore`.
    pub fn footprint_free(&self, position: Position, size: u8, ignore: Option<UnitId>) -> bool {
        let size = i32::from(size);
        (0..size).all(|y| {
            (0..size).all(|x| {
                self.tile(position.offset(x, y, 0))
                    .is_some_and(|tile| tile.unit.is_none() || tile.unit == ignore)
            })
        })
    }

    /// Adds a unit and links it to every tile of its footprint.
    pub fn place_unit(&mut self, unit: BattleUnit) -> Result<(), BattlefieldError> {
        if self.unit(unit.id).is_some() {
            return Err(BattlefieldError::DuplicateUnit(unit.id));
        }
        for position in unit.footprint() {
            let tile = self
                .tile(position)
                .ok_or(BattlefieldError::OutOfBounds(position))?;
            if tile.unit.is_some() {
                return Err(BattlefieldError::TileOccupied(position));
            }
        }
        let id = unit.id;
        let footprint = if unit.is_out() { Vec::new() } else { unit.footprint() };
        self.units.push(unit);
        for position in footprint {
            if let Some(tile) = self.tile_mut(position) {
                tile.unit = Some(id);
            }
        }
        Ok(())
    }

    /// Removes the unit's links from every tile it occupies.
    pub fn clear_unit_tiles(&mut self, id: UnitId) {
        for tile in self.tiles.iter_mut().filter(|tile| tile.unit == Some(id)) {
            tile.unit = None;
        }
    }

    /// Relocates a unit, relinking its footprint. The caller checks the
    /// destination is free.
    pub fn move_unit(&mut self, id: UnitId, to: Position) -> bool {
        self.clear_unit_tiles(id);
        let Some(unit) = self.unit_mut(id) else {
            return false;
        };
        unit.position = to;
        let footprint = unit.footprint();
        for position in footprint {
            if let Some(tile) = self.tile_mut(position) {
                tile.unit = Some(id);
            }
        }
        true
    }

    /// Allocates a fresh item id.
    pub fn next_item_id(&mut self) -> ItemId {
        let id = ItemId(self.next_item_id);
        self.next_item_id += 1;
        id
    }

    /// Registers an item. Owned items are appended to their owner's inventory,
    /// positioned ones to their tile.
    pub fn add_item(&mut self, item: BattleItem) -> Result<(), BattlefieldError> {
        if self.item(item.id).is_some() {
            return Err(BattlefieldError::DuplicateItem(item.id));
        }
        let (id, owner, position) = (item.id, item.owner, item.position);
        if let Some(owner) = owner {
            let unit = self
                .unit_mut(owner)
                .ok_or(BattlefieldError::UnknownUnit(owner))?;
            unit.inventory
                .try_push(id)
                .map_err(|_| BattlefieldError::InventoryFull { unit: owner, item: id })?;
        } else if let Some(position) = position {
            self.tile_mut(position)
                .ok_or(BattlefieldError::OutOfBounds(position))?
                .items
                .push(id);
        }
        self.next_item_id = self.next_item_id.max(id.0 + 1);
        self.items.push(item);
        Ok(())
    }

    /// Unlinks an item from its owner's inventory and its tile, keeping it registered.
    pub fn detach_item(&mut self, id: ItemId) {
        let Some(item) = self.item_mut(id) else {
            return;
        };
        let (owner, position) = (item.owner.take(), item.position.take());
        if owner.is_some() {
            item.previous_owner = owner;
        }
        if let Some(unit) = owner.and_then(|owner| self.unit_mut(owner)) {
            unit.inventory.retain(|carried| *carried != id);
        }
        if let Some(tile) = position.and_then(|position| self.tile_mut(position)) {
            tile.items.retain(|lying| *lying != id);
        }
    }

    /// Places a registered, detached item on a tile.
    pub fn put_item(&mut self, id: ItemId, position: Position) -> bool {
        let Some(tile) = self.tile_mut(position) else {
            return false;
        };
        tile.items.push(id);
        match self.item_mut(id) {
            Some(item) => {
                item.position = Some(position);
                true
            }
            None => false,
        }
    }

    /// Removes an item from the battle entirely.
    pub fn remove_item(&mut self, id: ItemId) -> Option<BattleItem> {
        self.detach_item(id);
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Removes the body item left by an unconscious unit, if any.
    pub fn remove_unconscious_body_item(&mut self, unit: UnitId) -> Option<BattleItem> {
        let body = self
            .items
            .iter()
            .find(|item| item.body_of == Some(unit))?
            .id;
        self.remove_item(body)
    }

    /// Selects the next unit of `side` after the current selection, wrapping.
    ///
    /// With `check_reselect`, units flagged as done for the turn are skipped.
    /// With `mark_current`, the previously selected unit is flagged as done.
    pub fn select_next_unit(
        &mut self,
        side: Faction,
        check_reselect: bool,
        mark_current: bool,
    ) -> Option<UnitId> {
        let selected = self.selected;
        if mark_current && let Some(current) = selected.and_then(|id| self.unit_mut(id)) {
            current.flags.insert(UnitFlags::DONT_RESELECT);
        }
        let count = self.units.len();
        let start = selected
            .and_then(|id| self.units.iter().position(|unit| unit.id == id))
            .map_or(0, |index| index + 1);
        let next = (0..count)
            .map(|offset| &self.units[(start + offset) % count])
            .find(|unit| {
                unit.faction == side
                    && !unit.is_out()
                    && (!check_reselect || unit.reselect_allowed())
            })
            .map(|unit| unit.id);
        self.selected = next;
        next
    }

    /// Live (not out) units per side: `(player, hostile)`.
    pub fn tally(&self) -> (usize, usize) {
        self.units
            .iter()
            .filter(|unit| !unit.is_out())
            .fold((0, 0), |(player, hostile), unit| match unit.faction {
                Faction::Player => (player + 1, hostile),
                Faction::Hostile => (player, hostile + 1),
                Faction::Neutral => (player, hostile),
            })
    }

    /// Hands the move to the next side, bumping the turn counter when the
    /// player moves again.
    pub fn advance_side(&mut self) -> Faction {
        self.side = self.side.next();
        if self.side == Faction::Player {
            self.turn += 1;
        }
        self.side
    }

    /// Derives a fresh seed for a random roll and advances the roll counter.
    pub fn next_seed(&mut self, actor: u32, context: u32) -> u64 {
        let seed = compute_seed(self.seed, self.nonce, actor, context);
        self.nonce += 1;
        seed
    }

    /// Seed for read-only planners; does not advance the roll counter.
    pub fn peek_seed(&self, actor: u32, context: u32) -> u64 {
        compute_seed(self.seed, self.nonce, actor, context)
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Stands up unconscious units whose stun has worn off, on the spot their
    /// body lies. Returns the revived units.
    pub fn revive_unconscious_units(&mut self) -> Vec<UnitId> {
        let candidates: Vec<UnitId> = self
            .units
            .iter()
            .filter(|unit| {
                unit.status == UnitStatus::Unconscious
                    && unit.health > 0
                    && unit.stun_level < unit.health
            })
            .map(|unit| unit.id)
            .collect();

        let mut revived = Vec::new();
        for id in candidates {
            let body_position = self
                .items
                .iter()
                .find(|item| item.body_of == Some(id))
                .and_then(|item| item.position);
            let Some(unit) = self.unit(id) else {
                continue;
            };
            let position = body_position.unwrap_or(unit.position);
            if !self.footprint_free(position, unit.size, Some(id)) {
                continue;
            }
            self.remove_unconscious_body_item(id);
            if let Some(unit) = self.unit_mut(id) {
                unit.status = UnitStatus::Standing;
                unit.fall_phase = 0;
            }
            self.move_unit(id, position);
            revived.push(id);
        }
        revived
    }
}
