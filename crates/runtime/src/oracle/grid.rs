//! Default pathfinding and line of sight over the battlefield grid.
//!
//! Neither model knows about walls: a tile is passable when it has a floor
//! (or is on the ground level) and no other unit stands on it.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use battle_core::{Battlefield, Path, Pathfinding, Position, TileEngine, UnitId};

/// Dijkstra search with fixed costs per step kind.
#[derive(Clone, Copy, Debug)]
pub struct GridPathfinding {
    pub straight_cost: u32,
    pub diagonal_cost: u32,
    pub vertical_cost: u32,
}

impl GridPathfinding {
    pub const STRAIGHT_COST: u32 = 4;
    pub const DIAGONAL_COST: u32 = 6;
    pub const VERTICAL_COST: u32 = 8;

    pub fn new() -> Self {
        Self {
            straight_cost: Self::STRAIGHT_COST,
            diagonal_cost: Self::DIAGONAL_COST,
            vertical_cost: Self::VERTICAL_COST,
        }
    }

    fn neighbours(from: Position) -> impl Iterator<Item = Position> {
        let horizontal = (-1..=1)
            .flat_map(move |dy| (-1..=1).map(move |dx| from.offset(dx, dy, 0)))
            .filter(move |to| *to != from);
        horizontal.chain([from.offset(0, 0, 1), from.offset(0, 0, -1)])
    }
}

impl Default for GridPathfinding {
    fn default() -> Self {
        Self::new()
    }
}

impl Pathfinding for GridPathfinding {
    fn calculate(&self, battle: &Battlefield, unit: UnitId, target: Position) -> Option<Path> {
        let start = battle.unit(unit)?.position;
        if start == target || !battle.in_bounds(target) {
            return None;
        }

        let mut best: HashMap<Position, (u32, Position)> = HashMap::new();
        let mut open = BinaryHeap::new();
        best.insert(start, (0, start));
        open.push(Reverse((0u32, start)));

        while let Some(Reverse((cost, position))) = open.pop() {
            if position == target {
                break;
            }
            if best.get(&position).is_some_and(|(known, _)| *known < cost) {
                continue;
            }
            for next in Self::neighbours(position) {
                let Some(step) = self.step_cost(battle, unit, position, next) else {
                    continue;
                };
                let total = cost + step;
                if best.get(&next).is_none_or(|(known, _)| total < *known) {
                    best.insert(next, (total, position));
                    open.push(Reverse((total, next)));
                }
            }
        }

        let (cost, _) = *best.get(&target)?;
        let mut steps = vec![target];
        let mut cursor = target;
        while let Some(&(_, previous)) = best.get(&cursor) {
            if previous == start {
                break;
            }
            steps.push(previous);
            cursor = previous;
        }
        steps.reverse();
        Some(Path { steps, cost })
    }

    fn step_cost(
        &self,
        battle: &Battlefield,
        unit: UnitId,
        from: Position,
        to: Position,
    ) -> Option<u32> {
        let delta = to - from;
        if delta.x.abs() > 1 || delta.y.abs() > 1 || delta.z.abs() > 1 || to == from {
            return None;
        }
        // Levels change only straight up or down.
        if delta.z != 0 && (delta.x != 0 || delta.y != 0) {
            return None;
        }
        let size = battle.unit(unit)?.size;
        let supported = to.z == 0 || battle.tile(to).is_some_and(|tile| tile.has_floor);
        if !supported || !battle.footprint_free(to, size, Some(unit)) {
            return None;
        }
        Some(match (delta.x != 0, delta.y != 0, delta.z != 0) {
            (_, _, true) => self.vertical_cost,
            (true, true, _) => self.diagonal_cost,
            _ => self.straight_cost,
        })
    }
}

/// Range-limited sight with no obstacles on the way.
#[derive(Clone, Copy, Debug)]
pub struct GridTileEngine {
    /// Tiles a unit sees in every direction.
    pub sight_range: u32,
}

impl GridTileEngine {
    pub const DEFAULT_SIGHT_RANGE: u32 = 20;

    pub fn new(sight_range: u32) -> Self {
        Self { sight_range }
    }
}

impl Default for GridTileEngine {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIGHT_RANGE)
    }
}

impl TileEngine for GridTileEngine {
    fn calculate_unit_lighting(&self, _battle: &Battlefield) {}

    fn calculate_fov(&self, battle: &Battlefield, unit: UnitId) {
        tracing::trace!(
            target: "runtime::worker",
            unit = %unit,
            visible = self.visible_units(battle, unit).len(),
            "field of view"
        );
    }

    fn visible_units(&self, battle: &Battlefield, unit: UnitId) -> Vec<UnitId> {
        let Some(viewer) = battle.unit(unit).filter(|viewer| !viewer.is_out()) else {
            return Vec::new();
        };
        battle
            .units
            .iter()
            .filter(|other| other.id != unit && !other.is_out())
            .filter(|other| self.has_line_of_sight(battle, viewer.position, other.position))
            .map(|other| other.id)
            .collect()
    }

    fn has_line_of_sight(&self, battle: &Battlefield, from: Position, to: Position) -> bool {
        battle.in_bounds(from)
            && battle.in_bounds(to)
            && from.distance_to(to) <= self.sight_range
            && (from.z - to.z).unsigned_abs() <= self.sight_range
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{BattleUnit, Faction, MapSize, UnitCategory, UnitStats};

    fn unit(id: u32, faction: Faction, position: Position) -> BattleUnit {
        let stats = UnitStats {
            time_units: 60,
            health: 40,
            ..UnitStats::default()
        };
        BattleUnit::new(UnitId(id), format!("u{id}"), faction, UnitCategory::Alien, stats, position)
    }

    fn battlefield() -> Battlefield {
        let mut battle = Battlefield::new(MapSize::new(8, 8, 2), 1);
        battle
            .place_unit(unit(1, Faction::Player, Position::new(0, 0, 0)))
            .unwrap();
        battle
    }

    #[test]
    fn straight_and_diagonal_steps_have_their_costs() {
        let battle = battlefield();
        let pathfinding = GridPathfinding::new();
        let path = pathfinding
            .calculate(&battle, UnitId(1), Position::new(3, 0, 0))
            .unwrap();
        assert_eq!(path.steps.len(), 3);
        assert_eq!(path.cost, 12);
        assert_eq!(path.steps.last(), Some(&Position::new(3, 0, 0)));

        let diagonal = pathfinding
            .calculate(&battle, UnitId(1), Position::new(2, 2, 0))
            .unwrap();
        assert_eq!(diagonal.cost, 12);
        assert_eq!(diagonal.steps, vec![Position::new(1, 1, 0), Position::new(2, 2, 0)]);
    }

    #[test]
    fn occupied_tiles_and_missing_floors_block() {
        let mut battle = battlefield();
        battle
            .place_unit(unit(2, Faction::Hostile, Position::new(1, 0, 0)))
            .unwrap();
        let pathfinding = GridPathfinding::new();
        let from = Position::new(0, 0, 0);
        assert_eq!(pathfinding.step_cost(&battle, UnitId(1), from, Position::new(1, 0, 0)), None);
        assert_eq!(pathfinding.step_cost(&battle, UnitId(1), from, from.offset(0, 0, 1)), None);
        assert!(pathfinding.calculate(&battle, UnitId(1), Position::new(1, 0, 0)).is_none());

        battle.set_floor(from.offset(0, 0, 1), true);
        assert_eq!(
            pathfinding.step_cost(&battle, UnitId(1), from, from.offset(0, 0, 1)),
            Some(GridPathfinding::VERTICAL_COST)
        );
    }

    #[test]
    fn sight_is_limited_by_range() {
        let mut battle = battlefield();
        battle
            .place_unit(unit(2, Faction::Hostile, Position::new(3, 3, 0)))
            .unwrap();
        battle
            .place_unit(unit(3, Faction::Hostile, Position::new(7, 7, 0)))
            .unwrap();
        let engine = GridTileEngine::new(4);
        assert_eq!(engine.visible_units(&battle, UnitId(1)), vec![UnitId(2)]);
    }
}
