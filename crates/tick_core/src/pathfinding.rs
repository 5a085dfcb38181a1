//! Grid pathfinding.
//!
//! Breadth-first search over 8 directions with diagonal corner blocking,
//! plus the per-entity [`PathingStrategy`] used when chasing a target.
//! All move costs are uniform, so first discovery is always a shortest
//! path. An unreachable goal yields an empty path, never an error.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::components::Transform;
use crate::math::TilePos;
use crate::tile_map::{TileMap, TileOccupancy};

/// Expansion order. Ties between equal-length paths resolve in this order.
const DIRECTIONS: [Direction; 8] = [
    Direction::West,
    Direction::East,
    Direction::South,
    Direction::North,
    Direction::SouthWest,
    Direction::SouthEast,
    Direction::NorthWest,
    Direction::NorthEast,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    West,
    East,
    South,
    North,
    SouthWest,
    SouthEast,
    NorthWest,
    NorthEast,
}

impl Direction {
    const fn delta(self) -> (i32, i32) {
        match self {
            Self::West => (-1, 0),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::North => (0, -1),
            Self::SouthWest => (-1, 1),
            Self::SouthEast => (1, 1),
            Self::NorthWest => (-1, -1),
            Self::NorthEast => (1, -1),
        }
    }

    /// Orthogonal directions a diagonal cuts between.
    const fn constituents(self) -> Option<(Self, Self)> {
        match self {
            Self::SouthWest => Some((Self::South, Self::West)),
            Self::SouthEast => Some((Self::South, Self::East)),
            Self::NorthWest => Some((Self::North, Self::West)),
            Self::NorthEast => Some((Self::North, Self::East)),
            _ => None,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Shortest 8-directional path from `start` (exclusive) to `goal` (inclusive).
///
/// `is_traversable` decides whether a tile may be entered; it must return
/// `false` outside the grid so the search stays bounded. A diagonal step is
/// only taken when both of its orthogonal neighbours were traversable in
/// the same expansion.
pub fn find_path(
    start: TilePos,
    goal: TilePos,
    mut is_traversable: impl FnMut(TilePos) -> bool,
) -> Vec<TilePos> {
    if start == goal {
        return Vec::new();
    }

    let mut came_from: HashMap<TilePos, TilePos> = HashMap::new();
    let mut queue = VecDeque::from([start]);
    came_from.insert(start, start);

    while let Some(current) = queue.pop_front() {
        let mut open = [false; 8];

        for direction in DIRECTIONS {
            let (dx, dy) = direction.delta();
            let next = current.offset(dx, dy);
            let traversable = is_traversable(next);
            open[direction.index()] = traversable;

            if !traversable || came_from.contains_key(&next) {
                continue;
            }
            if let Some((a, b)) = direction.constituents() {
                if !open[a.index()] || !open[b.index()] {
                    continue;
                }
            }

            came_from.insert(next, current);
            if next == goal {
                return reconstruct(&came_from, start, goal);
            }
            queue.push_back(next);
        }
    }

    Vec::new()
}

fn reconstruct(came_from: &HashMap<TilePos, TilePos>, start: TilePos, goal: TilePos) -> Vec<TilePos> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&previous) = came_from.get(&current) {
        if previous == start {
            break;
        }
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}

/// BFS on a live map: a tile is traversable when it is statically pathable
/// and either unoccupied or the goal itself.
#[must_use]
pub fn find_tile_path(
    map: &TileMap,
    occupancy: &TileOccupancy,
    start: TilePos,
    goal: TilePos,
) -> Vec<TilePos> {
    find_path(start, goal, |tile| {
        map.is_pathable(tile) && (tile == goal || !occupancy.is_blocked(tile))
    })
}

// ============================================================================
// Strategies
// ============================================================================

/// How an entity closes distance on its attack target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PathingStrategy {
    /// Full BFS to the target, stopping outside its footprint.
    #[default]
    FullBfs,
    /// One greedy step: horizontal first, then vertical.
    DirectApproach,
}

impl PathingStrategy {
    /// Path for `mover` toward `target`. May be empty.
    #[must_use]
    pub fn compute_path(
        self,
        mover: &Transform,
        target: &Transform,
        map: &TileMap,
        occupancy: &TileOccupancy,
    ) -> Vec<TilePos> {
        match self {
            Self::FullBfs => {
                let mut path = find_tile_path(map, occupancy, mover.position, target.position);
                if let Some(inside) = path.iter().position(|&tile| target.contains(tile)) {
                    path.truncate(inside);
                }
                path
            }
            Self::DirectApproach => vec![direct_approach_step(mover, target, map, occupancy)],
        }
    }
}

fn can_path(map: &TileMap, occupancy: &TileOccupancy, tile: TilePos) -> bool {
    map.is_pathable(tile) && !occupancy.is_blocked(tile)
}

/// NW tile the mover ends on after one greedy step toward `target`.
///
/// Stops short as soon as a leading edge tile is next to the target's NW
/// tile along the axis being tried.
fn direct_approach_step(
    mover: &Transform,
    target: &Transform,
    map: &TileMap,
    occupancy: &TileOccupancy,
) -> TilePos {
    let goal = target.position;
    let dx = (goal.x - mover.position.x).clamp(-1, 1);
    let dy = (goal.y - mover.position.y).clamp(-1, 1);
    let mut moved = *mover;

    if dx != 0 {
        let edge = if dx < 0 { moved.west_edge() } else { moved.east_edge() };
        let mut clear = true;
        for tile in edge {
            let ahead = tile.offset(dx, 0);
            if ahead == goal {
                return moved.position;
            }
            if !can_path(map, occupancy, ahead) {
                clear = false;
                break;
            }
        }
        if clear {
            moved.position = moved.position.offset(dx, 0);
        }
    }

    if dy != 0 {
        let edge = if dy < 0 { moved.north_edge() } else { moved.south_edge() };
        let mut clear = true;
        for tile in edge {
            let ahead = tile.offset(0, dy);
            if ahead == goal {
                return moved.position;
            }
            if !can_path(map, occupancy, ahead) {
                clear = false;
                break;
            }
        }
        if clear {
            moved.position = moved.position.offset(0, dy);
        }
    }

    moved.position
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile_map::TileMapData;

    fn open_map(cols: u32, rows: u32) -> TileMap {
        TileMap::new(TileMapData::open(cols, rows)).unwrap()
    }

    fn map_with_walls(cols: u32, rows: u32, walls: &[(i32, i32)]) -> TileMap {
        let mut data = TileMapData::open(cols, rows);
        for &(x, y) in walls {
            data.set_tile(TilePos::new(x, y), 2);
        }
        TileMap::new(data).unwrap()
    }

    fn path(map: &TileMap, start: (i32, i32), goal: (i32, i32)) -> Vec<TilePos> {
        let occupancy = TileOccupancy::for_map(map);
        find_tile_path(
            map,
            &occupancy,
            TilePos::new(start.0, start.1),
            TilePos::new(goal.0, goal.1),
        )
    }

    #[test]
    fn test_straight_line_path() {
        let map = open_map(10, 10);
        assert_eq!(
            path(&map, (0, 0), (3, 0)),
            vec![TilePos::new(1, 0), TilePos::new(2, 0), TilePos::new(3, 0)]
        );
    }

    #[test]
    fn test_start_equals_goal_is_empty() {
        let map = open_map(5, 5);
        assert!(path(&map, (2, 2), (2, 2)).is_empty());
    }

    #[test]
    fn test_diagonal_path_length_is_chebyshev() {
        let map = open_map(10, 10);
        let route = path(&map, (0, 0), (4, 7));
        assert_eq!(route.len(), 7);
        assert_eq!(route.last(), Some(&TilePos::new(4, 7)));
    }

    #[test]
    fn test_unreachable_goal_is_empty() {
        let map = map_with_walls(5, 5, &[(2, 0), (2, 1), (2, 2), (2, 3), (2, 4)]);
        assert!(path(&map, (0, 0), (4, 4)).is_empty());
    }

    #[test]
    fn test_no_corner_cutting() {
        // Walls east and south of the start: the SE diagonal is closed.
        let map = map_with_walls(5, 5, &[(1, 0), (0, 1)]);
        assert!(path(&map, (0, 0), (1, 1)).is_empty());

        // One wall only: the diagonal is still closed, route goes around.
        let map = map_with_walls(5, 5, &[(1, 0)]);
        let route = path(&map, (0, 0), (1, 1));
        assert_eq!(route, vec![TilePos::new(0, 1), TilePos::new(1, 1)]);
    }

    #[test]
    fn test_tie_break_follows_direction_order() {
        let map = open_map(5, 5);
        let route = path(&map, (2, 2), (4, 2));
        assert_eq!(route, vec![TilePos::new(3, 2), TilePos::new(4, 2)]);
    }

    #[test]
    fn test_occupied_tiles_are_avoided_but_goal_is_allowed() {
        let map = open_map(5, 1);
        let mut occupancy = TileOccupancy::for_map(&map);
        occupancy.block(&[TilePos::new(4, 0)]);
        let route = find_tile_path(&map, &occupancy, TilePos::new(0, 0), TilePos::new(4, 0));
        assert_eq!(route.len(), 4);

        occupancy.block(&[TilePos::new(2, 0)]);
        let route = find_tile_path(&map, &occupancy, TilePos::new(0, 0), TilePos::new(4, 0));
        assert!(route.is_empty());
    }

    #[test]
    fn test_full_bfs_stops_outside_target() {
        let map = open_map(10, 10);
        let occupancy = TileOccupancy::for_map(&map);
        let mover = Transform::single(TilePos::new(0, 0));
        let target = Transform::new(TilePos::new(5, 0), 2, 2);
        let route = PathingStrategy::FullBfs.compute_path(&mover, &target, &map, &occupancy);
        assert_eq!(route.last(), Some(&TilePos::new(4, 0)));
        assert!(route.iter().all(|&tile| !target.contains(tile)));
    }

    #[test]
    fn test_direct_approach_steps_diagonally() {
        let map = open_map(10, 10);
        let occupancy = TileOccupancy::for_map(&map);
        let mover = Transform::single(TilePos::new(5, 5));
        let target = Transform::single(TilePos::new(1, 1));
        let route = PathingStrategy::DirectApproach.compute_path(&mover, &target, &map, &occupancy);
        assert_eq!(route, vec![TilePos::new(4, 4)]);
    }

    #[test]
    fn test_direct_approach_stops_when_adjacent() {
        let map = open_map(10, 10);
        let occupancy = TileOccupancy::for_map(&map);
        let mover = Transform::single(TilePos::new(2, 1));
        let target = Transform::single(TilePos::new(1, 1));
        let route = PathingStrategy::DirectApproach.compute_path(&mover, &target, &map, &occupancy);
        assert_eq!(route, vec![TilePos::new(2, 1)]);
    }

    #[test]
    fn test_direct_approach_blocked_horizontally_still_moves_vertically() {
        let map = map_with_walls(10, 10, &[(4, 5)]);
        let occupancy = TileOccupancy::for_map(&map);
        let mover = Transform::single(TilePos::new(5, 5));
        let target = Transform::single(TilePos::new(1, 1));
        let route = PathingStrategy::DirectApproach.compute_path(&mover, &target, &map, &occupancy);
        assert_eq!(route, vec![TilePos::new(5, 4)]);
    }

    #[test]
    fn test_direct_approach_large_mover_checks_whole_edge() {
        let map = open_map(12, 12);
        let mut occupancy = TileOccupancy::for_map(&map);
        occupancy.block(&[TilePos::new(4, 7)]);
        let mover = Transform::new(TilePos::new(5, 5), 3, 3);
        let target = Transform::single(TilePos::new(0, 6));
        let route = PathingStrategy::DirectApproach.compute_path(&mover, &target, &map, &occupancy);
        // West edge is blocked at (4,7); only the southward step is taken.
        assert_eq!(route, vec![TilePos::new(5, 6)]);
    }
}
