/// Engine tuning: animation pacing, AI budget, kneeling costs, morale rules.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleConfig {
    /// Scheduler ticks between two animation steps of a state.
    pub anim_interval: u32,
    /// Animation steps an explosion lasts before its damage resolves.
    pub explosion_frames: u32,
    /// Actions an AI unit may commit before control passes to the next unit.
    pub ai_actions_per_unit: u32,
    /// AI units at or below this many time units are not reselected.
    pub ai_min_time_units: u32,
    pub kneel_cost: u32,
    pub stand_cost: u32,
    /// Percentage scaling morale swings caused by the player's side.
    pub morale_modifier: u32,
    pub panic_morale_bonus: i32,
    pub max_berserk_shots: u32,
    /// Max tile offset of the spot a panicking unit runs to.
    pub panic_flee_radius: i32,
}

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_INVENTORY_SLOTS: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_ANIM_INTERVAL: u32 = 2;
    pub const DEFAULT_EXPLOSION_FRAMES: u32 = 4;
    pub const DEFAULT_AI_ACTIONS_PER_UNIT: u32 = 2;
    pub const DEFAULT_AI_MIN_TIME_UNITS: u32 = 5;
    pub const DEFAULT_KNEEL_COST: u32 = 4;
    pub const DEFAULT_STAND_COST: u32 = 8;
    pub const DEFAULT_MORALE_MODIFIER: u32 = 100;
    pub const DEFAULT_PANIC_MORALE_BONUS: i32 = 15;
    pub const DEFAULT_MAX_BERSERK_SHOTS: u32 = 10;
    pub const DEFAULT_PANIC_FLEE_RADIUS: i32 = 5;

    pub fn new() -> Self {
        Self {
            anim_interval: Self::DEFAULT_ANIM_INTERVAL,
            explosion_frames: Self::DEFAULT_EXPLOSION_FRAMES,
            ai_actions_per_unit: Self::DEFAULT_AI_ACTIONS_PER_UNIT,
            ai_min_time_units: Self::DEFAULT_AI_MIN_TIME_UNITS,
            kneel_cost: Self::DEFAULT_KNEEL_COST,
            stand_cost: Self::DEFAULT_STAND_COST,
            morale_modifier: Self::DEFAULT_MORALE_MODIFIER,
            panic_morale_bonus: Self::DEFAULT_PANIC_MORALE_BONUS,
            max_berserk_shots: Self::DEFAULT_MAX_BERSERK_SHOTS,
            panic_flee_radius: Self::DEFAULT_PANIC_FLEE_RADIUS,
        }
    }

    /// Every state steps on every tick; handy for tests and headless runs.
    pub fn instant() -> Self {
        Self {
            anim_interval: 1,
            explosion_frames: 1,
            ..Self::new()
        }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
