//! Hit, damage, and blast arithmetic shared by the combat states.

use crate::action::BattleActionType;
use crate::env::{DamageType, ItemRule, RngOracle};
use crate::state::{BattleUnit, Battlefield, Position, UnitId, UnitStatus};

/// Bonus (percent of the base chance) for firing from a kneeling stance.
const KNEEL_BONUS: u32 = 15;

/// Chance in percent that `shooter` hits with `kind` using `weapon`.
pub fn hit_chance(shooter: &BattleUnit, kind: BattleActionType, weapon: Option<&ItemRule>) -> u32 {
    let (skill, accuracy) = match (kind, weapon) {
        (BattleActionType::Throw, _) => (shooter.stats.throwing_accuracy, 100),
        (BattleActionType::Snapshot, Some(rule)) => (shooter.stats.firing_accuracy, rule.accuracy_snap),
        (BattleActionType::Autoshot, Some(rule)) => (shooter.stats.firing_accuracy, rule.accuracy_auto),
        (BattleActionType::Aimedshot, Some(rule)) => {
            (shooter.stats.firing_accuracy, rule.accuracy_aimed)
        }
        (BattleActionType::Hit | BattleActionType::Stun, Some(rule)) => (100, rule.accuracy_melee),
        _ => (0, 0),
    };
    let mut chance = skill * accuracy / 100;
    if shooter.is_kneeling() && kind.is_shot() {
        chance += chance * KNEEL_BONUS / 100;
    }
    chance.min(100)
}

/// Damage roll in `[power / 2, power * 3 / 2]`.
pub fn roll_damage(rng: &dyn RngOracle, seed: u64, power: u32) -> u32 {
    rng.range(seed, power / 2, power * 3 / 2)
}

/// Blast damage at `distance` tiles from the centre, fading linearly to the edge.
pub fn blast_damage(power: u32, radius: u32, distance: u32) -> u32 {
    if distance > radius {
        return 0;
    }
    power * (radius + 1 - distance) / (radius + 1)
}

/// Applies a blast to every unit with a footprint tile in range and returns
/// the units that took damage, in battlefield order.
pub fn apply_blast(
    battle: &mut Battlefield,
    center: Position,
    power: u32,
    radius: u32,
    damage: DamageType,
) -> Vec<UnitId> {
    let mut hit = Vec::new();
    for unit in battle
        .units
        .iter_mut()
        .filter(|unit| unit.status != UnitStatus::Dead)
    {
        let distance = unit
            .footprint()
            .into_iter()
            .filter(|tile| (tile.z - center.z).abs() <= 1)
            .map(|tile| tile.distance_to(center))
            .min();
        let Some(distance) = distance else {
            continue;
        };
        let amount = blast_damage(power, radius, distance);
        if amount > 0 {
            unit.damage(amount, damage);
            hit.push(unit.id);
        }
    }
    hit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blast_fades_to_the_edge() {
        assert_eq!(blast_damage(60, 2, 0), 60);
        assert_eq!(blast_damage(60, 2, 1), 40);
        assert_eq!(blast_damage(60, 2, 2), 20);
        assert_eq!(blast_damage(60, 2, 3), 0);
    }
}
