//! Unit entity and its animation/status mechanics.

use arrayvec::ArrayVec;
use bitflags::bitflags;

use crate::action::BattleActionType;
use crate::config::BattleConfig;
use crate::env::{DamageType, ItemRule};

use super::{Faction, ItemId, Position, UnitId};

pub type Inventory = ArrayVec<ItemId, { BattleConfig::MAX_INVENTORY_SLOTS }>;

/// Number of animation steps between the start of a fall and the unit lying down.
pub const FALL_FRAMES: u8 = 3;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitStatus {
    #[default]
    Standing,
    Walking,
    Turning,
    Aiming,
    Falling,
    Unconscious,
    Dead,
    Panicking,
    Berserk,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Gender {
    Male,
    Female,
}

/// What kind of body a unit has. Drives death sounds and kneeling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitCategory {
    Soldier(Gender),
    Civilian(Gender),
    Alien,
    Vehicle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpecialAbility {
    #[default]
    None,
    ExplodeOnDeath,
    BurnFloor,
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct UnitFlags: u8 {
        const KNEELING = 1 << 0;
        const DONT_RESELECT = 1 << 1;
        const VISIBLE = 1 << 2;
    }
}

/// Base statistics; the live pools (`time_units`, `health`) start from these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitStats {
    pub time_units: u32,
    pub health: u32,
    pub bravery: u32,
    pub reactions: u32,
    pub firing_accuracy: u32,
    pub throwing_accuracy: u32,
    pub strength: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleUnit {
    pub id: UnitId,
    pub name: String,
    pub faction: Faction,
    pub original_faction: Faction,
    pub category: UnitCategory,
    pub status: UnitStatus,
    pub position: Position,
    pub direction: u8,
    pub target_direction: u8,
    pub size: u8,
    pub time_units: u32,
    pub stats: UnitStats,
    pub health: u32,
    pub stun_level: u32,
    pub morale: u32,
    pub armor: u32,
    /// Slot 0 is the main hand.
    pub inventory: Inventory,
    pub corpse_item: String,
    pub special_ability: SpecialAbility,
    /// Explosion power released when the unit dies with `ExplodeOnDeath`.
    pub death_explosion: u32,
    pub kills: u32,
    pub killed_by: Option<Faction>,
    pub flags: UnitFlags,
    pub fall_phase: u8,
}

impl BattleUnit {
    pub fn new(
        id: UnitId,
        name: impl Into<String>,
        faction: Faction,
        category: UnitCategory,
        stats: UnitStats,
        position: Position,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            faction,
            original_faction: faction,
            category,
            status: UnitStatus::Standing,
            position,
            direction: 0,
            target_direction: 0,
            size: 1,
            time_units: stats.time_units,
            stats,
            health: stats.health,
            stun_level: 0,
            morale: 100,
            armor: 0,
            inventory: Inventory::new(),
            corpse_item: String::new(),
            special_ability: SpecialAbility::None,
            death_explosion: 0,
            kills: 0,
            killed_by: None,
            flags: UnitFlags::empty(),
            fall_phase: 0,
        }
    }

    pub fn with_size(mut self, size: u8) -> Self {
        self.size = size.max(1);
        self
    }

    pub fn with_corpse(mut self, corpse_item: impl Into<String>) -> Self {
        self.corpse_item = corpse_item.into();
        self
    }

    pub fn with_direction(mut self, direction: u8) -> Self {
        self.direction = direction % 8;
        self.target_direction = self.direction;
        self
    }

    pub fn exploding_on_death(mut self, power: u32) -> Self {
        self.special_ability = SpecialAbility::ExplodeOnDeath;
        self.death_explosion = power;
        self
    }

    pub fn is_out(&self) -> bool {
        matches!(self.status, UnitStatus::Dead | UnitStatus::Unconscious)
    }

    pub fn is_kneeling(&self) -> bool {
        self.flags.contains(UnitFlags::KNEELING)
    }

    pub fn reselect_allowed(&self) -> bool {
        !self.flags.contains(UnitFlags::DONT_RESELECT)
    }

    pub fn main_hand(&self) -> Option<ItemId> {
        self.inventory.first().copied()
    }

    /// Sets the facing to reach; the unit starts turning when it differs.
    pub fn look_at(&mut self, direction: u8) {
        self.target_direction = direction % 8;
        if self.target_direction != self.direction {
            self.status = UnitStatus::Turning;
        }
    }

    pub fn look_at_position(&mut self, target: Position) {
        if let Some(direction) = self.position.direction_to(target) {
            self.look_at(direction);
        }
    }

    /// One facing step along the shortest rotation.
    pub fn turn(&mut self) {
        if self.direction != self.target_direction {
            let clockwise = (self.target_direction + 8 - self.direction) % 8;
            self.direction = if clockwise <= 4 {
                (self.direction + 1) % 8
            } else {
                (self.direction + 7) % 8
            };
        }
        if self.direction == self.target_direction {
            self.status = UnitStatus::Standing;
        }
    }

    pub fn start_falling(&mut self) {
        self.status = UnitStatus::Falling;
        self.fall_phase = 0;
    }

    /// Advances the fall; the last frame leaves the unit dead or unconscious.
    pub fn keep_falling(&mut self) {
        if self.status != UnitStatus::Falling {
            return;
        }
        self.fall_phase += 1;
        if self.fall_phase >= FALL_FRAMES {
            self.fall_phase = FALL_FRAMES - 1;
            self.status = if self.health == 0 {
                UnitStatus::Dead
            } else {
                UnitStatus::Unconscious
            };
        }
    }

    /// Cancels whatever the unit was doing this turn.
    pub fn abort_turn(&mut self) {
        if !self.is_out() {
            self.status = UnitStatus::Standing;
        }
    }

    pub fn spend_time_units(&mut self, amount: u32) -> bool {
        if amount > self.time_units {
            return false;
        }
        self.time_units -= amount;
        true
    }

    pub fn morale_change(&mut self, delta: i32) {
        let morale = self.morale as i32 + delta;
        self.morale = morale.clamp(0, 100) as u32;
    }

    /// Applies damage after armor and returns what got through.
    pub fn damage(&mut self, amount: u32, kind: DamageType) -> u32 {
        let dealt = amount.saturating_sub(self.armor);
        match kind {
            DamageType::Stun => self.stun_level += dealt,
            _ => self.health = self.health.saturating_sub(dealt),
        }
        dealt
    }

    /// Time-unit cost of `kind` with the given weapon; 0 means unavailable.
    pub fn action_time_units(&self, kind: BattleActionType, weapon: Option<&ItemRule>) -> u32 {
        let percent = match (kind, weapon) {
            (BattleActionType::Throw, _) => 25,
            (BattleActionType::Prime, Some(rule)) => rule.tu_prime,
            (BattleActionType::Autoshot, Some(rule)) => rule.tu_auto,
            (BattleActionType::Snapshot, Some(rule)) => rule.tu_snap,
            (BattleActionType::Aimedshot, Some(rule)) => rule.tu_aimed,
            (BattleActionType::Hit | BattleActionType::Stun, Some(rule)) => rule.tu_melee,
            (BattleActionType::Use, Some(rule)) => rule.tu_use,
            _ => 0,
        };
        self.stats.time_units * percent / 100
    }

    /// Tiles covered by the unit, row-major with `x` varying fastest.
    pub fn footprint(&self) -> Vec<Position> {
        let size = i32::from(self.size);
        (0..size)
            .flat_map(|y| (0..size).map(move |x| (x, y)))
            .map(|(x, y)| self.position.offset(x, y, 0))
            .collect()
    }

    pub fn footprint_center(&self) -> Position {
        let half = (i32::from(self.size) - 1) / 2;
        self.position.offset(half, half, 0)
    }

    /// Restores the unit at the start of its side's turn.
    pub fn prepare_new_turn(&mut self) {
        self.faction = self.original_faction;
        self.time_units = self.stats.time_units;
        self.stun_level = self.stun_level.saturating_sub(1);
        self.flags.remove(UnitFlags::DONT_RESELECT);
        if !self.is_out() && !matches!(self.status, UnitStatus::Panicking | UnitStatus::Berserk)
        {
            self.status = UnitStatus::Standing;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soldier() -> BattleUnit {
        BattleUnit::new(
            UnitId(1),
            "Rookie",
            Faction::Player,
            UnitCategory::Soldier(Gender::Female),
            UnitStats {
                time_units: 60,
                health: 30,
                bravery: 50,
                ..UnitStats::default()
            },
            Position::new(2, 2, 0),
        )
    }

    #[test]
    fn turning_takes_the_short_way_round() {
        let mut unit = soldier();
        unit.look_at(6);
        assert_eq!(unit.status, UnitStatus::Turning);
        unit.turn();
        assert_eq!(unit.direction, 7);
        unit.turn();
        assert_eq!(unit.direction, 6);
        assert_eq!(unit.status, UnitStatus::Standing);
    }

    #[test]
    fn fall_ends_dead_or_unconscious() {
        let mut unit = soldier();
        unit.health = 0;
        unit.start_falling();
        for _ in 0..FALL_FRAMES {
            assert!(!unit.is_out());
            unit.keep_falling();
        }
        assert_eq!(unit.status, UnitStatus::Dead);

        let mut stunned = soldier();
        stunned.start_falling();
        for _ in 0..FALL_FRAMES {
            stunned.keep_falling();
        }
        assert_eq!(stunned.status, UnitStatus::Unconscious);
    }

    #[test]
    fn large_footprint_is_row_major() {
        let unit = soldier().with_size(2);
        assert_eq!(
            unit.footprint(),
            vec![
                Position::new(2, 2, 0),
                Position::new(3, 2, 0),
                Position::new(2, 3, 0),
                Position::new(3, 3, 0),
            ]
        );
    }

    #[test]
    fn morale_is_clamped() {
        let mut unit = soldier();
        unit.morale_change(40);
        assert_eq!(unit.morale, 100);
        unit.morale_change(-250);
        assert_eq!(unit.morale, 0);
    }

    #[test]
    fn stun_damage_does_not_touch_health() {
        let mut unit = soldier();
        unit.armor = 2;
        assert_eq!(unit.damage(10, DamageType::Stun), 8);
        assert_eq!(unit.health, 30);
        assert_eq!(unit.stun_level, 8);
    }
}
