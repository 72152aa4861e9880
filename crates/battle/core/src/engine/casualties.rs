//! Death and knock-out detection, morale fallout, and item dropping.

use tracing::{debug, info};

use crate::env::{BattleEnv, DamageType};
use crate::state::{BattleItem, Battlefield, Faction, ItemId, Position, UnitId, UnitStatus};
use crate::states::{BattleState, UnitDieState};

use super::{BattleEvent, BattlescapeGame};

/// What [`BattlescapeGame::drop_item`] places on the ground.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemDrop {
    /// An item already on the battlefield (carried or lying elsewhere).
    Existing(ItemId),
    /// A freshly created item (corpse, body) not registered yet.
    New(BattleItem),
}

impl BattlescapeGame {
    /// Queues a death state for every unit that just died or fell
    /// unconscious, in the order they are found. Returns whether any was
    /// queued.
    pub fn check_for_casualties(
        &mut self,
        battle: &mut Battlefield,
        env: &BattleEnv<'_>,
        weapon: Option<ItemId>,
        killer: Option<UnitId>,
        hidden_explosion: bool,
        terrain_explosion: bool,
    ) -> bool {
        let weapon_damage = weapon
            .and_then(|id| env.rule_of(battle, id))
            .map(|rule| rule.damage_type);

        let mut deaths: Vec<Box<dyn BattleState>> = Vec::new();
        for id in battle.unit_ids() {
            if self.has_pending_death(id) {
                continue;
            }
            let Some(unit) = battle.unit(id) else {
                continue;
            };
            let (health, stun, status) = (unit.health, unit.stun_level, unit.status);

            if health == 0 && status != UnitStatus::Dead {
                self.apply_casualty_morale(battle, id, killer);
                let (damage, no_sound) = if weapon.is_some() {
                    (weapon_damage.unwrap_or_default(), false)
                } else if hidden_explosion {
                    (DamageType::Explosive, true)
                } else if terrain_explosion {
                    (DamageType::Explosive, false)
                } else {
                    (DamageType::None, false)
                };
                info!(target: "battle::engine", unit = %id, killer = ?killer, %damage, "unit killed");
                self.emit(BattleEvent::UnitKilled { unit: id, killer });
                deaths.push(Box::new(UnitDieState::new(
                    id,
                    damage,
                    no_sound,
                    battle,
                    &self.config,
                )));
            } else if stun >= health && !matches!(status, UnitStatus::Dead | UnitStatus::Unconscious)
            {
                info!(target: "battle::engine", unit = %id, "unit knocked out");
                self.emit(BattleEvent::UnitKnockedOut { unit: id });
                deaths.push(Box::new(UnitDieState::new(
                    id,
                    DamageType::Stun,
                    true,
                    battle,
                    &self.config,
                )));
            }
        }

        let queued = !deaths.is_empty();
        self.state_push_next_batch(deaths);
        queued
    }

    /// Kill credit and the morale swing a death causes on both sides.
    fn apply_casualty_morale(&self, battle: &mut Battlefield, victim: UnitId, killer: Option<UnitId>) {
        let config_modifier = self.config.morale_modifier.max(1) as i32;
        let Some(victim_unit) = battle.unit(victim) else {
            return;
        };
        let (victim_faction, victim_original) = (victim_unit.faction, victim_unit.original_faction);

        if let Some(killer) = killer.filter(|killer| *killer != victim)
            && let Some(killer_unit) = battle.unit_mut(killer)
        {
            killer_unit.kills += 1;
            let modifier = if killer_unit.faction == Faction::Player {
                config_modifier
            } else {
                100
            };
            let killer_original = killer_unit.original_faction;
            let opposing = matches!(
                (victim_original, killer_original),
                (Faction::Player, Faction::Hostile) | (Faction::Hostile, Faction::Player)
            );
            if opposing {
                killer_unit.morale_change(20 * modifier / 100);
            } else if victim_original == killer_original {
                killer_unit.morale_change(-(2000 / modifier));
            } else if victim_original == Faction::Neutral {
                if killer_original == Faction::Player {
                    killer_unit.morale_change(-(1000 / modifier));
                } else {
                    killer_unit.morale_change(10);
                }
            }
            let killer_faction = killer_unit.faction;
            if let Some(victim_unit) = battle.unit_mut(victim) {
                victim_unit.killed_by = Some(killer_faction);
            }
        }

        if victim_faction == Faction::Neutral {
            return;
        }
        let (loser_modifier, winner_modifier) = if victim_faction == Faction::Hostile {
            (100, config_modifier)
        } else {
            (config_modifier, 100)
        };
        for unit in battle
            .units
            .iter_mut()
            .filter(|unit| unit.id != victim && !unit.is_out() && unit.size == 1)
        {
            if unit.original_faction == victim_original {
                let bravery = (110 - unit.stats.bravery.min(110) as i32) / 10;
                unit.morale_change(-(config_modifier * 200 * bravery / loser_modifier / 100));
            } else {
                unit.morale_change(10 * winner_modifier / 100);
            }
        }
    }

    /// Drops an item at `position`, letting it fall to the nearest floor.
    /// Fixed items and drops off the map are refused.
    pub fn drop_item(
        &mut self,
        battle: &mut Battlefield,
        env: &BattleEnv<'_>,
        position: Position,
        item: ItemDrop,
    ) -> bool {
        if !battle.in_bounds(position) {
            debug!(target: "battle::engine", ?position, "drop outside the map ignored");
            return false;
        }
        let rule = match &item {
            ItemDrop::Existing(id) => battle.item(*id).map(|item| item.rule.clone()),
            ItemDrop::New(item) => Some(item.rule.clone()),
        };
        let Some(rule) = rule else {
            debug!(target: "battle::engine", "drop of an unknown item ignored");
            return false;
        };
        if env.item_rule(&rule).is_ok_and(|rule| rule.fixed) {
            return false;
        }

        let landing = battle.apply_gravity(position);
        let id = match item {
            ItemDrop::Existing(id) => {
                battle.detach_item(id);
                id
            }
            ItemDrop::New(mut item) => {
                let id = item.id;
                item.owner = None;
                item.position = None;
                if battle.add_item(item).is_err() {
                    debug!(target: "battle::engine", item = %id, "new item clashes with an existing id");
                    return false;
                }
                id
            }
        };
        battle.put_item(id, landing);

        let body_of = battle.item(id).and_then(|item| item.body_of);
        if let Some(unit) = body_of.and_then(|unit| battle.unit_mut(unit)) {
            unit.position = landing;
        }
        self.emit(BattleEvent::ItemDropped {
            item: id,
            position: landing,
        });
        true
    }
}
