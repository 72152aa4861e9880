use std::fmt;
use std::ops::{Add, Sub};

/// Unique identifier of a unit on the battlefield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Unique identifier of an item instance (carried, on the ground, or a corpse).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Tile coordinate. `z` is the level, 0 being the ground floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0, z: 0 };

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Chebyshev distance on the horizontal plane.
    pub fn distance_to(self, other: Self) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        dx.max(dy)
    }

    /// Facing (0 = north, clockwise) that points from `self` toward `other`.
    ///
    /// Returns `None` when both positions share the same column.
    pub fn direction_to(self, other: Self) -> Option<u8> {
        let dx = (other.x - self.x).signum();
        let dy = (other.y - self.y).signum();
        match (dx, dy) {
            (0, -1) => Some(0),
            (1, -1) => Some(1),
            (1, 0) => Some(2),
            (1, 1) => Some(3),
            (0, 1) => Some(4),
            (-1, 1) => Some(5),
            (-1, 0) => Some(6),
            (-1, -1) => Some(7),
            _ => None,
        }
    }
}

impl Add for Position {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.offset(rhs.x, rhs.y, rhs.z)
    }
}

impl Sub for Position {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.offset(-rhs.x, -rhs.y, -rhs.z)
    }
}

/// Battlefield allegiance. Sides move in declaration order.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Faction {
    #[default]
    Player,
    Hostile,
    Neutral,
}

impl Faction {
    /// The side that moves after this one.
    pub fn next(self) -> Self {
        match self {
            Faction::Player => Faction::Hostile,
            Faction::Hostile => Faction::Neutral,
            Faction::Neutral => Faction::Player,
        }
    }

    /// Whether units of `self` treat units of `other` as enemies.
    pub fn is_hostile_to(self, other: Faction) -> bool {
        matches!(
            (self, other),
            (Faction::Player, Faction::Hostile)
                | (Faction::Hostile, Faction::Player)
                | (Faction::Hostile, Faction::Neutral)
                | (Faction::Neutral, Faction::Hostile)
        )
    }
}
