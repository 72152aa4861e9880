use tracing::info;

use crate::combat;
use crate::config::BattleConfig;
use crate::engine::BattleEvent;
use crate::env::{DamageType, ItemRule, SoundCue};
use crate::state::{ItemId, Position, UnitId};

use super::{BattleState, Pacing, StateContext, StateKind};

const EXPLOSION_SOUND: u32 = 12;

/// A blast: plays out over a few frames, damages everything in range, then
/// checks for casualties.
#[derive(Debug)]
pub struct ExplosionState {
    center: Position,
    power: u32,
    radius: u32,
    damage: DamageType,
    item: Option<ItemId>,
    owner: Option<UnitId>,
    /// The source item is used up (grenades), not just fired (launchers).
    consume_item: bool,
    hidden: bool,
    terrain: bool,
    frames_left: u32,
    pacing: Pacing,
}

impl ExplosionState {
    pub fn new(center: Position, power: u32, radius: u32, config: &BattleConfig) -> Self {
        Self {
            center,
            power,
            radius,
            damage: DamageType::Explosive,
            item: None,
            owner: None,
            consume_item: false,
            hidden: false,
            terrain: false,
            frames_left: config.explosion_frames,
            pacing: Pacing::new(config.anim_interval),
        }
    }

    /// Explosion of a grenade or explosive round.
    pub fn from_item(
        center: Position,
        item: ItemId,
        rule: &ItemRule,
        owner: Option<UnitId>,
        config: &BattleConfig,
    ) -> Self {
        Self {
            item: Some(item),
            owner,
            damage: rule.damage_type,
            ..Self::new(center, rule.power, rule.explosion_radius(), config)
        }
    }

    /// Blast released by a unit that explodes on death.
    pub fn unit_death(center: Position, power: u32, unit: UnitId, config: &BattleConfig) -> Self {
        Self {
            owner: Some(unit),
            ..Self::new(center, power, (power / 10).max(1), config)
        }
    }

    /// Removes the source item from the battle once the blast resolves.
    pub fn consuming_item(mut self) -> Self {
        self.consume_item = true;
        self
    }

    /// Resolves on the first think, silently.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Caused by the terrain (fuel tanks, burning debris).
    pub fn terrain(mut self) -> Self {
        self.terrain = true;
        self
    }

    pub fn center(&self) -> Position {
        self.center
    }
}

impl BattleState for ExplosionState {
    fn kind(&self) -> StateKind {
        StateKind::Explosion
    }

    fn init(&mut self, cx: &mut StateContext<'_>) {
        if !self.hidden {
            cx.env.center_on(self.center);
            cx.env.play(SoundCue::battle(EXPLOSION_SOUND));
        }
    }

    fn think(&mut self, cx: &mut StateContext<'_>) {
        if !self.hidden && self.frames_left > 0 {
            if self.pacing.tick() {
                self.frames_left -= 1;
            }
            if self.frames_left > 0 {
                return;
            }
        }

        let hit = combat::apply_blast(cx.battle, self.center, self.power, self.radius, self.damage);
        info!(
            target: "battle::state",
            center = ?self.center,
            power = self.power,
            radius = self.radius,
            units_hit = hit.len(),
            "explosion"
        );
        cx.emit(BattleEvent::Explosion {
            center: self.center,
            power: self.power,
            radius: self.radius,
        });
        for unit in hit {
            cx.env.cache_unit(unit);
        }

        // Casualties go right behind this state; they become the front once it pops.
        cx.check_for_casualties(self.item, self.owner, self.hidden, self.terrain);
        if self.consume_item
            && let Some(item) = self.item
        {
            cx.battle.remove_item(item);
        }
        cx.pop_state();
    }
}
