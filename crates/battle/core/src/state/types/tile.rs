use super::{ItemId, Position, UnitId};

/// Battlefield extents in tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapSize {
    pub width: u32,
    pub length: u32,
    pub height: u32,
}

impl MapSize {
    pub const fn new(width: u32, length: u32, height: u32) -> Self {
        Self {
            width,
            length,
            height,
        }
    }

    pub fn contains(&self, position: Position) -> bool {
        (0..self.width as i32).contains(&position.x)
            && (0..self.length as i32).contains(&position.y)
            && (0..self.height as i32).contains(&position.z)
    }

    pub fn tile_count(&self) -> usize {
        self.width as usize * self.length as usize * self.height as usize
    }
}

/// One map cell with its dynamic occupants.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    pub position: Position,
    pub has_floor: bool,
    pub unit: Option<UnitId>,
    pub items: Vec<ItemId>,
}

impl Tile {
    pub fn new(position: Position, has_floor: bool) -> Self {
        Self {
            position,
            has_floor,
            unit: None,
            items: Vec::new(),
        }
    }
}
