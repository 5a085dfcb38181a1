//! Tile grid, static pathability and the occupancy overlay.
//!
//! [`TileMap`] is immutable once built; it is swapped wholesale when a new
//! instance loads. [`TileOccupancy`] counts the entities standing on each
//! tile and is updated every time something moves.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::TilePos;

/// Numeric tile code. `0` means "no tile".
pub type TileCode = u16;

/// Code returned for reads outside the grid.
pub const NO_TILE: TileCode = 0;

/// Static properties of one tile code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileInfo {
    /// Whether entities may stand on (and see through) this tile.
    pub pathable: bool,
}

/// Serializable description of a tile map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMapData {
    /// Width in tiles.
    pub cols: u32,
    /// Height in tiles.
    pub rows: u32,
    /// Tile edge length in pixels; presentation only.
    pub tile_size: u32,
    /// Row-major tile codes.
    pub tiles: Vec<TileCode>,
    /// Properties per tile code.
    pub tile_info: BTreeMap<TileCode, TileInfo>,
}

impl TileMapData {
    /// Open grid where every tile is pathable code `1`.
    #[must_use]
    pub fn open(cols: u32, rows: u32) -> Self {
        let mut tile_info = BTreeMap::new();
        tile_info.insert(1, TileInfo { pathable: true });
        tile_info.insert(2, TileInfo { pathable: false });
        Self {
            cols,
            rows,
            tile_size: 64,
            tiles: vec![1; (cols * rows) as usize],
            tile_info,
        }
    }

    /// Overwrite one tile code. Out-of-bounds writes are ignored.
    pub fn set_tile(&mut self, pos: TilePos, code: TileCode) {
        if pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.cols && (pos.y as u32) < self.rows {
            let index = pos.y as usize * self.cols as usize + pos.x as usize;
            self.tiles[index] = code;
        }
    }

    /// The 29x30 cave used by the wave instance.
    ///
    /// Codes 1-9 are floor and walls-you-can-stand-beside; 10-13 are the
    /// impassable pillar tiles.
    #[must_use]
    pub fn test_cave() -> Self {
        let mut data = Self::cave_shell(29, 30);
        for corner in [TilePos::new(17, 5), TilePos::new(0, 7), TilePos::new(10, 21)] {
            data.stamp(corner, &[[10, 10, 11], [10, 10, 11], [12, 13, 13]]);
        }
        data
    }

    /// The small 10x10 cave with two 2x2 pillars.
    #[must_use]
    pub fn fire_cave() -> Self {
        let mut data = Self::cave_shell(10, 10);
        for corner in [TilePos::new(3, 3), TilePos::new(5, 5)] {
            data.stamp(corner, &[[10, 11], [12, 13]]);
        }
        data
    }

    fn cave_shell(cols: u32, rows: u32) -> Self {
        let (last_col, last_row) = (cols - 1, rows - 1);
        let mut tiles = Vec::with_capacity((cols * rows) as usize);
        for y in 0..rows {
            for x in 0..cols {
                let code = match (x, y) {
                    (0, 0) => 5,
                    (x, 0) if x == last_col => 6,
                    (0, y) if y == last_row => 7,
                    (x, y) if x == last_col && y == last_row => 8,
                    (_, 0) => 3,
                    (_, y) if y == last_row => 4,
                    (0, _) => 1,
                    (x, _) if x == last_col => 2,
                    _ => 9,
                };
                tiles.push(code);
            }
        }

        let tile_info = (1..=13)
            .map(|code| (code, TileInfo { pathable: code <= 9 }))
            .collect();

        Self {
            cols,
            rows,
            tile_size: 64,
            tiles,
            tile_info,
        }
    }

    fn stamp<const W: usize>(&mut self, corner: TilePos, pattern: &[[TileCode; W]]) {
        for (dy, row) in pattern.iter().enumerate() {
            for (dx, &code) in row.iter().enumerate() {
                self.set_tile(corner.offset(dx as i32, dy as i32), code);
            }
        }
    }

    /// Parse from RON.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| GameError::DataParseError {
            source_name: "tile map".to_string(),
            message: e.to_string(),
        })
    }
}

/// Immutable tile grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMap {
    cols: u32,
    rows: u32,
    tile_size: u32,
    tiles: Vec<TileCode>,
    tile_info: BTreeMap<TileCode, TileInfo>,
}

impl TileMap {
    /// Build a map, checking that the tile array matches the dimensions.
    pub fn new(data: TileMapData) -> Result<Self> {
        let expected = data.cols as usize * data.rows as usize;
        if data.tiles.len() != expected {
            return Err(GameError::DataParseError {
                source_name: "tile map".to_string(),
                message: format!(
                    "{}x{} map needs {expected} tiles, got {}",
                    data.cols,
                    data.rows,
                    data.tiles.len()
                ),
            });
        }
        Ok(Self {
            cols: data.cols,
            rows: data.rows,
            tile_size: data.tile_size,
            tiles: data.tiles,
            tile_info: data.tile_info,
        })
    }

    /// Width in tiles.
    #[must_use]
    pub const fn cols(&self) -> u32 {
        self.cols
    }

    /// Height in tiles.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Tile edge length in pixels.
    #[must_use]
    pub const fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Whether `pos` lies on the grid.
    #[must_use]
    pub fn in_bounds(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.cols && (pos.y as u32) < self.rows
    }

    /// Row-major index of an in-bounds tile.
    #[must_use]
    pub fn index(&self, pos: TilePos) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.y as usize * self.cols as usize + pos.x as usize)
    }

    /// Tile code at `pos`, or [`NO_TILE`] outside the grid.
    #[must_use]
    pub fn tile_at(&self, pos: TilePos) -> TileCode {
        self.index(pos).map_or(NO_TILE, |i| self.tiles[i])
    }

    /// Static pathability. Unknown codes and [`NO_TILE`] are not pathable.
    #[must_use]
    pub fn is_pathable(&self, pos: TilePos) -> bool {
        self.tile_info
            .get(&self.tile_at(pos))
            .is_some_and(|info| info.pathable)
    }

    /// Back to serializable form.
    #[must_use]
    pub fn to_data(&self) -> TileMapData {
        TileMapData {
            cols: self.cols,
            rows: self.rows,
            tile_size: self.tile_size,
            tiles: self.tiles.clone(),
            tile_info: self.tile_info.clone(),
        }
    }
}

/// Per-tile count of entities currently standing there.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileOccupancy {
    cols: u32,
    rows: u32,
    counts: Vec<u16>,
}

impl TileOccupancy {
    /// Empty overlay sized for `map`.
    #[must_use]
    pub fn for_map(map: &TileMap) -> Self {
        Self {
            cols: map.cols,
            rows: map.rows,
            counts: vec![0; map.cols as usize * map.rows as usize],
        }
    }

    fn index(&self, pos: TilePos) -> Option<usize> {
        (pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.cols && (pos.y as u32) < self.rows)
            .then(|| pos.y as usize * self.cols as usize + pos.x as usize)
    }

    /// Mark each tile as occupied once more.
    pub fn block(&mut self, tiles: &[TilePos]) {
        for &tile in tiles {
            if let Some(i) = self.index(tile) {
                self.counts[i] = self.counts[i].saturating_add(1);
            }
        }
    }

    /// Release one occupant from each tile.
    pub fn unblock(&mut self, tiles: &[TilePos]) {
        for &tile in tiles {
            if let Some(i) = self.index(tile) {
                self.counts[i] = self.counts[i].saturating_sub(1);
            }
        }
    }

    /// Whether anything stands on `pos`. Off-grid tiles are never blocked.
    #[must_use]
    pub fn is_blocked(&self, pos: TilePos) -> bool {
        self.index(pos).is_some_and(|i| self.counts[i] > 0)
    }

    /// Occupant count at `pos`.
    #[must_use]
    pub fn count(&self, pos: TilePos) -> u16 {
        self.index(pos).map_or(0, |i| self.counts[i])
    }

    /// Clear every counter.
    pub fn clear(&mut self) {
        self.counts.iter_mut().for_each(|c| *c = 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_is_no_tile() {
        let map = TileMap::new(TileMapData::open(4, 3)).unwrap();
        assert_eq!(map.tile_at(TilePos::new(-1, 0)), NO_TILE);
        assert_eq!(map.tile_at(TilePos::new(4, 0)), NO_TILE);
        assert_eq!(map.tile_at(TilePos::new(0, 3)), NO_TILE);
        assert!(!map.is_pathable(TilePos::new(0, 3)));
        assert!(map.is_pathable(TilePos::new(3, 2)));
    }

    #[test]
    fn test_unknown_code_is_unpathable() {
        let mut data = TileMapData::open(3, 3);
        data.set_tile(TilePos::new(1, 1), 99);
        let map = TileMap::new(data).unwrap();
        assert!(!map.is_pathable(TilePos::new(1, 1)));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let mut data = TileMapData::open(3, 3);
        data.tiles.pop();
        assert!(matches!(
            TileMap::new(data),
            Err(GameError::DataParseError { .. })
        ));
    }

    #[test]
    fn test_cave_layout() {
        let map = TileMap::new(TileMapData::test_cave()).unwrap();
        assert_eq!((map.cols(), map.rows()), (29, 30));
        assert_eq!(map.tile_at(TilePos::new(0, 0)), 5);
        assert_eq!(map.tile_at(TilePos::new(28, 29)), 8);
        assert_eq!(map.tile_at(TilePos::new(0, 7)), 10);
        assert_eq!(map.tile_at(TilePos::new(19, 7)), 13);
        assert!(!map.is_pathable(TilePos::new(11, 22)));
        assert!(map.is_pathable(TilePos::new(4, 5)));
        // Border tiles are floor
        assert!(map.is_pathable(TilePos::new(0, 1)));
    }

    #[test]
    fn test_fire_cave_layout() {
        let map = TileMap::new(TileMapData::fire_cave()).unwrap();
        assert_eq!(map.tile_at(TilePos::new(3, 3)), 10);
        assert_eq!(map.tile_at(TilePos::new(6, 6)), 13);
        assert_eq!(map.tile_at(TilePos::new(9, 9)), 8);
    }

    #[test]
    fn test_occupancy_counts() {
        let map = TileMap::new(TileMapData::open(5, 5)).unwrap();
        let mut occupancy = TileOccupancy::for_map(&map);
        let tile = TilePos::new(2, 2);

        occupancy.block(&[tile, tile]);
        assert_eq!(occupancy.count(tile), 2);
        occupancy.unblock(&[tile]);
        assert!(occupancy.is_blocked(tile));
        occupancy.unblock(&[tile, tile]);
        assert_eq!(occupancy.count(tile), 0);

        // Off-grid updates are ignored
        occupancy.block(&[TilePos::new(-1, 9)]);
        assert!(!occupancy.is_blocked(TilePos::new(-1, 9)));
    }

    #[test]
    fn test_ron_roundtrip_of_tile_map_data() {
        let data = TileMapData::fire_cave();
        let text = ron::to_string(&data).unwrap();
        assert_eq!(TileMapData::from_ron_str(&text).unwrap(), data);
    }
}
