//! Deterministic collaborators and a small harness for engine tests.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use battle_core::{
    AiStrategy, AudioSink, BattleAction, BattleConfig, BattleEnv, BattleEvent, BattleItem,
    BattleType, BattleUnit, Battlefield, BattlescapeGame, CursorMode, DamageType, Faction, Gender,
    ItemId, ItemRule, MapSize, Path, Pathfinding, Position, RngOracle, RulesetOracle, SoundCue,
    TileEngine, UnitCategory, UnitId, UnitStats, ViewSink,
};

pub struct Rules {
    items: HashMap<String, ItemRule>,
}

impl Rules {
    pub fn standard() -> Self {
        let mut rules = Self {
            items: HashMap::new(),
        };
        rules.insert(ItemRule {
            damage_type: DamageType::ArmorPiercing,
            power: 30,
            accuracy_snap: 60,
            accuracy_aimed: 110,
            tu_snap: 25,
            tu_aimed: 50,
            clip_size: 10,
            ..ItemRule::new("rifle", BattleType::Firearm)
        });
        rules.insert(ItemRule {
            damage_type: DamageType::Explosive,
            power: 50,
            blast_radius: 2,
            tu_prime: 50,
            ..ItemRule::new("grenade", BattleType::Grenade)
        });
        rules.insert(ItemRule::new("alien_corpse", BattleType::Corpse));
        rules.insert(ItemRule::new("soldier_corpse", BattleType::Corpse));
        for index in 1..=4 {
            rules.insert(ItemRule::new(format!("disc_corpse{index}"), BattleType::Corpse));
        }
        rules
    }

    pub fn insert(&mut self, rule: ItemRule) {
        self.items.insert(rule.id.clone(), rule);
    }
}

impl RulesetOracle for Rules {
    fn item(&self, id: &str) -> Option<&ItemRule> {
        self.items.get(id)
    }
}

/// No obstacles: walks straight (diagonals first), every step costs `step`.
pub struct OpenGrid {
    pub step: u32,
}

impl Pathfinding for OpenGrid {
    fn calculate(&self, battle: &Battlefield, unit: UnitId, target: Position) -> Option<Path> {
        let mut at = battle.unit(unit)?.position;
        let mut steps = Vec::new();
        while at != target {
            at = at.offset(
                (target.x - at.x).signum(),
                (target.y - at.y).signum(),
                (target.z - at.z).signum(),
            );
            steps.push(at);
        }
        let cost = self.step * steps.len() as u32;
        Some(Path { steps, cost })
    }

    fn step_cost(
        &self,
        _battle: &Battlefield,
        _unit: UnitId,
        _from: Position,
        _to: Position,
    ) -> Option<u32> {
        Some(self.step)
    }
}

/// Every unit sees every other live unit.
pub struct SeeAll;

impl TileEngine for SeeAll {
    fn calculate_unit_lighting(&self, _battle: &Battlefield) {}

    fn calculate_fov(&self, _battle: &Battlefield, _unit: UnitId) {}

    fn visible_units(&self, battle: &Battlefield, unit: UnitId) -> Vec<UnitId> {
        battle
            .units
            .iter()
            .filter(|other| other.id != unit && !other.is_out())
            .map(|other| other.id)
            .collect()
    }

    fn has_line_of_sight(&self, _battle: &Battlefield, _from: Position, _to: Position) -> bool {
        true
    }
}

/// Returns the same raw value for every seed.
pub struct FixedRng(pub u32);

impl RngOracle for FixedRng {
    fn next_u32(&self, _seed: u64) -> u32 {
        self.0
    }
}

#[derive(Default)]
pub struct Recorder {
    pub cursors: Mutex<Vec<CursorMode>>,
    pub sounds: Mutex<Vec<SoundCue>>,
}

impl ViewSink for Recorder {
    fn center_on(&self, _position: Position) {}

    fn cache_unit(&self, _unit: UnitId) {}

    fn set_cursor(&self, mode: CursorMode) {
        self.cursors.lock().unwrap().push(mode);
    }
}

impl AudioSink for Recorder {
    fn play(&self, cue: SoundCue) -> bool {
        self.sounds.lock().unwrap().push(cue);
        true
    }
}

/// Plays back queued actions per unit, then idles.
#[derive(Default)]
pub struct Scripted {
    plans: Mutex<HashMap<UnitId, VecDeque<BattleAction>>>,
}

impl Scripted {
    pub fn plan(&self, unit: UnitId, action: BattleAction) {
        self.plans
            .lock()
            .unwrap()
            .entry(unit)
            .or_default()
            .push_back(action);
    }
}

impl AiStrategy for Scripted {
    fn decide(&self, unit: UnitId, _battle: &Battlefield, _env: &BattleEnv<'_>) -> BattleAction {
        self.plans
            .lock()
            .unwrap()
            .get_mut(&unit)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(BattleAction::none)
    }
}

pub struct World {
    pub rules: Rules,
    pub grid: OpenGrid,
    pub eyes: SeeAll,
    pub rng: Option<FixedRng>,
    pub ai: Scripted,
    pub recorder: Recorder,
}

impl World {
    pub fn env(&self) -> BattleEnv<'_> {
        let env = BattleEnv::empty()
            .with_ruleset(&self.rules)
            .with_pathfinding(&self.grid)
            .with_tile_engine(&self.eyes)
            .with_ai(&self.ai)
            .with_view(&self.recorder)
            .with_audio(&self.recorder);
        match &self.rng {
            Some(rng) => env.with_rng(rng),
            None => env,
        }
    }
}

pub struct Harness {
    pub game: BattlescapeGame,
    pub battle: Battlefield,
    pub world: World,
}

impl Harness {
    /// A 12x12x2 map with instant pacing and 4 TU steps.
    pub fn new() -> Self {
        Self {
            game: BattlescapeGame::new(BattleConfig::instant()),
            battle: Battlefield::new(MapSize::new(12, 12, 2), 7),
            world: World {
                rules: Rules::standard(),
                grid: OpenGrid { step: 4 },
                eyes: SeeAll,
                rng: None,
                ai: Scripted::default(),
                recorder: Recorder::default(),
            },
        }
    }

    pub fn with_rng(mut self, value: u32) -> Self {
        self.world.rng = Some(FixedRng(value));
        self
    }

    pub fn place(&mut self, unit: BattleUnit) -> UnitId {
        let id = unit.id;
        self.battle.place_unit(unit).unwrap();
        id
    }

    /// Puts a new item in the unit's inventory.
    pub fn give(&mut self, unit: UnitId, rule: &str, ammo: u32) -> ItemId {
        let id = self.battle.next_item_id();
        let mut item = BattleItem::new(id, rule).with_ammo(ammo);
        item.owner = Some(unit);
        self.battle.add_item(item).unwrap();
        id
    }

    pub fn drop_on(&mut self, position: Position, rule: &str) -> ItemId {
        let id = self.battle.next_item_id();
        let mut item = BattleItem::new(id, rule);
        item.position = Some(position);
        self.battle.add_item(item).unwrap();
        id
    }

    pub fn tick(&mut self) {
        let env = self.world.env();
        self.game.think(&mut self.battle, &env);
    }

    /// Ticks until the queue drains; returns the number of ticks.
    pub fn run_until_idle(&mut self) -> usize {
        let mut ticks = 0;
        while self.game.is_busy() {
            assert!(ticks < 500, "queue never drained: {:?}", self.game.queued_states());
            self.tick();
            ticks += 1;
        }
        ticks
    }

    pub fn events(&mut self) -> Vec<BattleEvent> {
        self.game.drain_events()
    }

    pub fn unit(&self, id: UnitId) -> &BattleUnit {
        self.battle.unit(id).unwrap()
    }

    pub fn unit_mut(&mut self, id: UnitId) -> &mut BattleUnit {
        self.battle.unit_mut(id).unwrap()
    }
}

pub fn soldier(id: u32, position: Position) -> BattleUnit {
    BattleUnit::new(
        UnitId(id),
        format!("soldier-{id}"),
        Faction::Player,
        UnitCategory::Soldier(Gender::Female),
        UnitStats {
            time_units: 60,
            health: 30,
            bravery: 50,
            firing_accuracy: 60,
            throwing_accuracy: 60,
            ..UnitStats::default()
        },
        position,
    )
    .with_corpse("soldier_corpse")
}

pub fn alien(id: u32, position: Position) -> BattleUnit {
    BattleUnit::new(
        UnitId(id),
        format!("alien-{id}"),
        Faction::Hostile,
        UnitCategory::Alien,
        UnitStats {
            time_units: 50,
            health: 15,
            bravery: 50,
            ..UnitStats::default()
        },
        position,
    )
    .with_corpse("alien_corpse")
}
