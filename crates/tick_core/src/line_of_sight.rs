//! Line of sight between tiles and the engageability test built on it.
//!
//! The ray runs between tile centres. Crossing times to the next vertical
//! and horizontal grid lines are compared in integer form, so the walk is
//! exact and platform independent.

use crate::components::Transform;
use crate::math::TilePos;
use crate::tile_map::TileMap;

/// Crossings closer together than `1 / CORNER_EPSILON_INVERSE` of a tile
/// count as passing through the corner.
const CORNER_EPSILON_INVERSE: i64 = 100;

/// Whether the straight line between the centres of `from` and `to` is
/// unobstructed.
///
/// Every tile entered along the way, `to` included, must be statically
/// pathable. When the ray passes through a grid corner, at least one of the
/// two tiles beside that corner must be pathable.
#[must_use]
pub fn has_line_of_sight(from: TilePos, to: TilePos, map: &TileMap) -> bool {
    if from == to {
        return true;
    }

    let sx = if to.x < from.x { -1 } else { 1 };
    let sy = if to.y < from.y { -1 } else { 1 };
    let adx = i64::from(to.x.abs_diff(from.x));
    let ady = i64::from(to.y.abs_diff(from.y));

    let mut current = from;
    let (mut kx, mut ky) = (0_i64, 0_i64);

    // Each step crosses at least one grid line
    for _ in 0..(adx + ady) {
        if current == to {
            break;
        }

        // Time to the next x-crossing is (2kx+1)/2; to the next y-crossing
        // (2ky+1)/2 * adx/ady. Both are scaled by 2*ady.
        let x_time = (2 * kx + 1) * ady;
        let y_time = (2 * ky + 1) * adx;

        if CORNER_EPSILON_INVERSE * (x_time - y_time).abs() < 2 * ady {
            let beside_vertical = current.offset(0, sy);
            let beside_horizontal = current.offset(sx, 0);
            if !map.is_pathable(beside_vertical) && !map.is_pathable(beside_horizontal) {
                return false;
            }
            current = current.offset(sx, sy);
            kx += 1;
            ky += 1;
        } else if x_time < y_time {
            current = current.offset(sx, 0);
            kx += 1;
        } else {
            current = current.offset(0, sy);
            ky += 1;
        }

        if !map.is_pathable(current) {
            return false;
        }
    }

    current == to
}

/// Whether `attacker` can hit `target` from where it stands: some pair of
/// their edge tiles is within `range` (Chebyshev) and in line of sight.
#[must_use]
pub fn is_engageable(attacker: &Transform, target: &Transform, range: u32, map: &TileMap) -> bool {
    let target_edges = target.edge_tiles();
    attacker.edge_tiles().into_iter().any(|from| {
        target_edges
            .iter()
            .any(|&to| from.chebyshev_distance(to) <= range && has_line_of_sight(from, to, map))
    })
}
