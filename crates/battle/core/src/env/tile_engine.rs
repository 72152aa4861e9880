use crate::state::{Battlefield, Position, UnitId};

/// Lighting and line-of-sight queries.
pub trait TileEngine: Send + Sync {
    /// Refreshes light levels around units after movement or deaths.
    fn calculate_unit_lighting(&self, battle: &Battlefield);

    /// Refreshes what `unit` can see after it moved or turned.
    fn calculate_fov(&self, battle: &Battlefield, unit: UnitId);

    /// Units currently visible to `unit`, in battlefield order.
    fn visible_units(&self, battle: &Battlefield, unit: UnitId) -> Vec<UnitId>;

    fn has_line_of_sight(&self, battle: &Battlefield, from: Position, to: Position) -> bool;
}
