//! Item rules: weapon modes, time-unit costs, damage.

/// How an item is used in combat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleType {
    #[default]
    None,
    Firearm,
    Melee,
    Grenade,
    ProximityGrenade,
    Medikit,
    Corpse,
}

impl BattleType {
    pub fn is_grenade(self) -> bool {
        matches!(self, BattleType::Grenade | BattleType::ProximityGrenade)
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageType {
    /// No weapon involved (fatal wounds, scripted deaths).
    #[default]
    None,
    ArmorPiercing,
    Incendiary,
    Explosive,
    Laser,
    Plasma,
    Stun,
    Melee,
}

/// Static definition of an item. Time-unit costs are percentages of the
/// user's maximum time units; 0 marks the mode as unavailable.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ItemRule {
    pub id: String,
    pub battle_type: BattleType,
    pub damage_type: DamageType,
    pub power: u32,
    /// Explosion radius in tiles; 0 derives it from `power`.
    pub blast_radius: u32,
    pub accuracy_snap: u32,
    pub accuracy_auto: u32,
    pub accuracy_aimed: u32,
    pub accuracy_melee: u32,
    pub tu_snap: u32,
    pub tu_auto: u32,
    pub tu_aimed: u32,
    pub tu_melee: u32,
    pub tu_prime: u32,
    pub tu_use: u32,
    pub clip_size: u32,
    /// Built-in weapons (tank turrets) never leave their owner.
    pub fixed: bool,
}

impl ItemRule {
    pub fn new(id: impl Into<String>, battle_type: BattleType) -> Self {
        Self {
            id: id.into(),
            battle_type,
            ..Self::default()
        }
    }

    pub fn explosion_radius(&self) -> u32 {
        if self.blast_radius > 0 {
            self.blast_radius
        } else {
            (self.power / 10).max(1)
        }
    }

    pub fn is_explosive(&self) -> bool {
        self.damage_type == DamageType::Explosive
    }
}

/// Rule lookups by identifier.
pub trait RulesetOracle: Send + Sync {
    fn item(&self, id: &str) -> Option<&ItemRule>;
}
