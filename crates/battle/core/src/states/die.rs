//! A unit going down: turn, fall, then leave a corpse behind.

use tracing::{debug, warn};

use crate::config::BattleConfig;
use crate::engine::{BattleEvent, ItemDrop};
use crate::env::{DamageType, SoundCue};
use crate::state::{
    BattleItem, Battlefield, Gender, Position, SpecialAbility, UnitCategory, UnitFlags, UnitId,
    UnitStatus,
};

use super::{BattleState, ExplosionState, Pacing, StateContext, StateKind};

/// Facing a dying unit turns to before it falls.
const DEATH_FACING: u8 = 3;

const SOUND_ROLL: u32 = 10;

#[derive(Debug)]
pub struct UnitDieState {
    unit: UnitId,
    damage: DamageType,
    no_sound: bool,
    /// Explosive deaths and already unconscious units skip the animation.
    instant: bool,
    pacing: Pacing,
}

impl UnitDieState {
    /// Explosive deaths (and units already unconscious) resolve the whole
    /// fall here, so the unit is out before the state ever thinks.
    pub fn new(
        unit: UnitId,
        damage: DamageType,
        no_sound: bool,
        battle: &mut Battlefield,
        config: &BattleConfig,
    ) -> Self {
        let mut instant = false;
        if let Some(dying) = battle.unit_mut(unit) {
            dying.flags.insert(UnitFlags::VISIBLE);
            if damage == DamageType::Explosive || dying.status == UnitStatus::Unconscious {
                instant = true;
                dying.start_falling();
                while dying.status == UnitStatus::Falling {
                    dying.keep_falling();
                }
            } else {
                dying.abort_turn();
                dying.look_at(DEATH_FACING);
            }
        }
        Self {
            unit,
            damage,
            no_sound,
            instant,
            pacing: Pacing::new(config.anim_interval),
        }
    }

    pub fn unit(&self) -> UnitId {
        self.unit
    }

    pub fn damage(&self) -> DamageType {
        self.damage
    }

    fn death_cue(&self, cx: &mut StateContext<'_>) -> Option<SoundCue> {
        let dying = cx.battle.unit(self.unit)?;
        let (category, size) = (dying.category, dying.size);
        let seed = cx.battle.next_seed(self.unit.0, SOUND_ROLL);
        let index = match category {
            UnitCategory::Soldier(Gender::Male) => cx.env.rng().range(seed, 41, 43),
            UnitCategory::Soldier(Gender::Female) => cx.env.rng().range(seed, 44, 46),
            _ if size > 1 => 23,
            _ => 10,
        };
        Some(SoundCue::battle(index))
    }

    /// Replaces the unit with its corpse item(s) and frees its tiles.
    fn convert_to_corpse(&self, cx: &mut StateContext<'_>) {
        cx.battle.remove_unconscious_body_item(self.unit);
        let Some(dying) = cx.battle.unit_mut(self.unit) else {
            return;
        };
        let (position, size, corpse) = (dying.position, dying.size, dying.corpse_item.clone());
        let inventory: Vec<_> = dying.inventory.drain(..).collect();
        for item in &inventory {
            if let Some(carried) = cx.battle.item_mut(*item) {
                carried.previous_owner = carried.owner.take().or(carried.previous_owner);
            }
        }

        if size == 1 {
            for item in inventory {
                cx.drop_item(position, ItemDrop::Existing(item));
            }
            cx.battle.clear_unit_tiles(self.unit);
            self.spawn_corpse(cx, &corpse, position);
        } else {
            for item in inventory {
                cx.battle.remove_item(item);
            }
            let size = i32::from(size);
            let mut index = 1;
            for y in 0..size {
                for x in 0..size {
                    cx.battle.clear_unit_tiles(self.unit);
                    self.spawn_corpse(cx, &format!("{corpse}{index}"), position.offset(x, y, 0));
                    index += 1;
                }
            }
        }
    }

    fn spawn_corpse(&self, cx: &mut StateContext<'_>, rule: &str, position: Position) {
        if let Err(error) = cx.env.item_rule(rule) {
            warn!(target: "battle::state", unit = %self.unit, %error, "corpse skipped");
            return;
        }
        let id = cx.battle.next_item_id();
        let corpse = BattleItem::new(id, rule).body_of(self.unit);
        if cx.drop_item(position, ItemDrop::New(corpse))
            && let Some(landed) = cx.battle.item(id).and_then(|item| item.position)
        {
            cx.emit(BattleEvent::CorpseCreated {
                unit: self.unit,
                item: id,
                position: landed,
            });
        }
    }
}

impl BattleState for UnitDieState {
    fn kind(&self) -> StateKind {
        StateKind::UnitDie
    }

    fn casualty(&self) -> Option<UnitId> {
        Some(self.unit)
    }

    fn init(&mut self, cx: &mut StateContext<'_>) {
        if !self.instant
            && let Some(dying) = cx.battle.unit(self.unit)
        {
            cx.env.center_on(dying.position);
        }
        if !self.no_sound
            && let Some(cue) = self.death_cue(cx)
            && !cx.env.play(cue)
        {
            debug!(target: "battle::state", unit = %self.unit, index = cue.index, "death sound unavailable");
        }
    }

    fn think(&mut self, cx: &mut StateContext<'_>) {
        if !self.instant && !self.pacing.tick() {
            return;
        }
        let Some(dying) = cx.battle.unit_mut(self.unit) else {
            debug!(target: "battle::state", unit = %self.unit, "dying unit vanished");
            cx.pop_state();
            return;
        };
        match dying.status {
            UnitStatus::Turning => dying.turn(),
            UnitStatus::Standing => dying.start_falling(),
            UnitStatus::Falling => dying.keep_falling(),
            _ => {}
        }

        if dying.is_out() {
            let explodes = dying.special_ability == SpecialAbility::ExplodeOnDeath;
            let center = dying.footprint_center();
            let power = dying.death_explosion;
            debug!(target: "battle::state", unit = %self.unit, status = %dying.status, "unit down");

            self.convert_to_corpse(cx);
            cx.env.recompute_lighting(cx.battle);
            cx.pop_state();
            if explodes {
                let explosion =
                    ExplosionState::unit_death(center, power, self.unit, cx.config());
                cx.push_next(Box::new(explosion));
            }
        }
        cx.env.cache_unit(self.unit);
    }
}
