use crate::state::{Battlefield, Position, UnitId};

/// Route from a unit's position to a target. `steps` excludes the start.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Path {
    pub steps: Vec<Position>,
    /// Total time units of every step.
    pub cost: u32,
}

impl Path {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

pub trait Pathfinding: Send + Sync {
    fn calculate(&self, battle: &Battlefield, unit: UnitId, target: Position) -> Option<Path>;

    /// Cost of moving `unit` one step; `None` when the step is impossible.
    fn step_cost(
        &self,
        battle: &Battlefield,
        unit: UnitId,
        from: Position,
        to: Position,
    ) -> Option<u32>;
}
