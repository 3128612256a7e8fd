//! Tile grid and level layout parsing
//!
//! The grid has a fixed shape and a world-space origin. Rows grow downward.
//! Anything outside the grid counts as solid for collision.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::PickupKind;
use super::geom::Rect;
use crate::error::{MazeError, Result};

/// Tile variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlockKind {
    Wall,
    #[default]
    Path,
    Key,
    Entry,
    Exit,
    Trap,
}

impl BlockKind {
    /// Only walls block movement
    #[inline]
    pub fn is_obstacle(self) -> bool {
        self == BlockKind::Wall
    }
}

/// A tile resolved to its world rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    pub col: u32,
    pub row: u32,
    pub rect: Rect,
}

impl Block {
    pub fn is_obstacle(&self) -> bool {
        self.kind.is_obstacle()
    }

    /// Obstacle-gated overlap: non-obstacles never overlap anything
    pub fn overlaps(&self, rect: &Rect) -> bool {
        self.is_obstacle() && self.rect.overlaps(rect)
    }
}

/// Fixed-size tile map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGrid {
    origin: Vec2,
    cell_size: f32,
    width: u32,
    height: u32,
    cells: Vec<BlockKind>,
}

impl TileGrid {
    /// All-path grid
    pub fn new(width: u32, height: u32, cell_size: f32, origin: Vec2) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(MazeError::EmptyGrid { width, height });
        }
        if !(cell_size > 0.0) {
            return Err(MazeError::InvalidCellSize(cell_size));
        }
        Ok(Self {
            origin,
            cell_size,
            width,
            height,
            cells: vec![BlockKind::Path; (width * height) as usize],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// World-space rectangle covered by the grid
    pub fn bounds(&self) -> Rect {
        Rect {
            pos: self.origin,
            size: Vec2::new(self.width as f32, self.height as f32) * self.cell_size,
        }
    }

    fn index(&self, col: i64, row: i64) -> Option<usize> {
        if col < 0 || row < 0 || col >= self.width as i64 || row >= self.height as i64 {
            return None;
        }
        Some(row as usize * self.width as usize + col as usize)
    }

    /// Signed cell coordinates of a world position (may lie outside the grid)
    pub fn cell_coords(&self, world: Vec2) -> (i64, i64) {
        let local = (world - self.origin) / self.cell_size;
        (local.x.floor() as i64, local.y.floor() as i64)
    }

    /// Cell containing a world position, if inside the grid
    pub fn cell_of(&self, world: Vec2) -> Option<(u32, u32)> {
        let (col, row) = self.cell_coords(world);
        self.index(col, row).map(|_| (col as u32, row as u32))
    }

    /// World rectangle of a cell (valid for out-of-range indices too)
    pub fn cell_rect(&self, col: i64, row: i64) -> Rect {
        Rect {
            pos: self.origin + Vec2::new(col as f32, row as f32) * self.cell_size,
            size: Vec2::splat(self.cell_size),
        }
    }

    /// Center of a cell in world space
    pub fn cell_center(&self, col: u32, row: u32) -> Vec2 {
        self.cell_rect(col as i64, row as i64).center()
    }

    /// Block at grid indices, None when out of bounds
    pub fn block(&self, col: i64, row: i64) -> Option<Block> {
        let idx = self.index(col, row)?;
        Some(Block {
            kind: self.cells[idx],
            col: col as u32,
            row: row as u32,
            rect: self.cell_rect(col, row),
        })
    }

    /// Block under a world position, None when out of bounds
    pub fn get_block(&self, world: Vec2) -> Option<Block> {
        let (col, row) = self.cell_coords(world);
        self.block(col, row)
    }

    /// Replace a cell. Returns false (and changes nothing) when out of bounds.
    pub fn set_block(&mut self, col: u32, row: u32, kind: BlockKind) -> bool {
        match self.index(col as i64, row as i64) {
            Some(idx) => {
                self.cells[idx] = kind;
                true
            }
            None => false,
        }
    }

    /// Inclusive cell-index range covered by a rectangle.
    /// Edges that exactly touch a cell boundary do not include the next cell.
    pub fn cell_span(&self, rect: &Rect) -> (i64, i64, i64, i64) {
        let min = (rect.min() - self.origin) / self.cell_size;
        let max = (rect.max() - self.origin) / self.cell_size;
        let col_min = min.x.floor() as i64;
        let row_min = min.y.floor() as i64;
        let col_max = (max.x.ceil() as i64 - 1).max(col_min);
        let row_max = (max.y.ceil() as i64 - 1).max(row_min);
        (col_min, row_min, col_max, row_max)
    }

    /// True when the rectangle touches a wall or leaves the grid.
    /// Every cell under the rectangle is tested so thin walls cannot be skipped.
    pub fn collides(&self, rect: &Rect) -> bool {
        let (col_min, row_min, col_max, row_max) = self.cell_span(rect);
        for row in row_min..=row_max {
            for col in col_min..=col_max {
                match self.block(col, row) {
                    Some(block) => {
                        if block.overlaps(rect) {
                            return true;
                        }
                    }
                    // Outside the grid is solid
                    None => return true,
                }
            }
        }
        false
    }

    /// First cell of a given kind in row-major order
    pub fn find(&self, kind: BlockKind) -> Option<(u32, u32)> {
        self.cells
            .iter()
            .position(|k| *k == kind)
            .map(|idx| ((idx as u32) % self.width, (idx as u32) / self.width))
    }

    /// Number of cells of a given kind
    pub fn count(&self, kind: BlockKind) -> usize {
        self.cells.iter().filter(|k| **k == kind).count()
    }
}

/// Dynamic objects placed by the level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnKind {
    Skeleton,
    MovableWall,
    Pickup(PickupKind),
}

/// Entity spawn point from the level data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spawn {
    pub kind: SpawnKind,
    pub col: u32,
    pub row: u32,
}

/// Meaning of a map cell code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellCode {
    Tile(BlockKind),
    Entity(SpawnKind),
}

impl CellCode {
    fn from_code(code: i32) -> Option<Self> {
        let cell = match code {
            0 => CellCode::Tile(BlockKind::Wall),
            1 => CellCode::Tile(BlockKind::Entry),
            2 => CellCode::Tile(BlockKind::Exit),
            3 => CellCode::Tile(BlockKind::Trap),
            4 => CellCode::Entity(SpawnKind::Skeleton),
            5 => CellCode::Tile(BlockKind::Key),
            6 => CellCode::Entity(SpawnKind::MovableWall),
            7 => CellCode::Entity(SpawnKind::Pickup(PickupKind::Lives)),
            8 => CellCode::Entity(SpawnKind::Pickup(PickupKind::Shield)),
            9 => CellCode::Entity(SpawnKind::Pickup(PickupKind::Lightning)),
            10 => CellCode::Entity(SpawnKind::Pickup(PickupKind::Spaceship)),
            _ => return None,
        };
        Some(cell)
    }

    fn from_glyph(glyph: char) -> Option<Self> {
        let cell = match glyph {
            '#' => CellCode::Tile(BlockKind::Wall),
            '.' | ' ' => CellCode::Tile(BlockKind::Path),
            'E' => CellCode::Tile(BlockKind::Entry),
            'X' => CellCode::Tile(BlockKind::Exit),
            'T' => CellCode::Tile(BlockKind::Trap),
            'K' => CellCode::Tile(BlockKind::Key),
            's' => CellCode::Entity(SpawnKind::Skeleton),
            'm' => CellCode::Entity(SpawnKind::MovableWall),
            'l' => CellCode::Entity(SpawnKind::Pickup(PickupKind::Lives)),
            'h' => CellCode::Entity(SpawnKind::Pickup(PickupKind::Shield)),
            'z' => CellCode::Entity(SpawnKind::Pickup(PickupKind::Lightning)),
            'p' => CellCode::Entity(SpawnKind::Pickup(PickupKind::Spaceship)),
            _ => return None,
        };
        Some(cell)
    }
}

/// Parsed level: tiles, entity spawns and the entry cell
#[derive(Debug, Clone)]
pub struct MazeLayout {
    pub grid: TileGrid,
    pub spawns: Vec<Spawn>,
    pub entry: (u32, u32),
}

impl MazeLayout {
    /// Build from the flat `"col,row" -> code` property mapping.
    /// Cells without a property are paths.
    pub fn from_properties<K, V>(
        width: u32,
        height: u32,
        cell_size: f32,
        origin: Vec2,
        properties: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut grid = TileGrid::new(width, height, cell_size, origin)?;
        let mut spawns = Vec::new();

        for (key, value) in properties {
            let (key, value) = (key.as_ref(), value.as_ref());
            let (col, row) = parse_key(key)?;
            if col >= width || row >= height {
                return Err(MazeError::CellOutOfBounds {
                    col,
                    row,
                    width,
                    height,
                });
            }
            let code: i32 = value
                .trim()
                .parse()
                .map_err(|_| MazeError::MalformedValue {
                    key: key.to_string(),
                    value: value.to_string(),
                })?;
            let cell = CellCode::from_code(code).ok_or(MazeError::UnknownCode { code, col, row })?;
            place(&mut grid, &mut spawns, cell, col, row);
        }

        Self::finish(grid, spawns)
    }

    /// Build from ASCII art, one character per cell.
    /// `#` wall, `.` path, `E` entry, `X` exit, `T` trap, `K` key,
    /// `s` skeleton, `m` movable wall, `l` lives, `h` shield, `z` lightning, `p` spaceship.
    pub fn from_ascii(text: &str, cell_size: f32, origin: Vec2) -> Result<Self> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        let height = rows.len() as u32;
        let width = rows.first().map(|r| r.chars().count() as u32).unwrap_or(0);
        let mut grid = TileGrid::new(width, height, cell_size, origin)?;
        let mut spawns = Vec::new();

        for (row, line) in rows.iter().enumerate() {
            let row = row as u32;
            let found = line.chars().count() as u32;
            if found != width {
                return Err(MazeError::RaggedRow {
                    row,
                    found,
                    expected: width,
                });
            }
            for (col, glyph) in line.chars().enumerate() {
                let col = col as u32;
                let cell =
                    CellCode::from_glyph(glyph).ok_or(MazeError::UnknownGlyph { glyph, col, row })?;
                place(&mut grid, &mut spawns, cell, col, row);
            }
        }

        Self::finish(grid, spawns)
    }

    fn finish(grid: TileGrid, mut spawns: Vec<Spawn>) -> Result<Self> {
        let entry = grid.find(BlockKind::Entry).ok_or(MazeError::MissingEntry)?;
        if grid.count(BlockKind::Exit) == 0 || grid.count(BlockKind::Key) == 0 {
            log::warn!("layout has no exit or no key; it cannot be escaped");
        }
        // Property maps have no inherent order
        spawns.sort_by_key(|s| (s.row, s.col));
        log::debug!(
            "layout {}x{}: {} spawns, entry at {:?}",
            grid.width(),
            grid.height(),
            spawns.len(),
            entry
        );
        Ok(Self {
            grid,
            spawns,
            entry,
        })
    }
}

fn parse_key(key: &str) -> Result<(u32, u32)> {
    let malformed = || MazeError::MalformedKey(key.to_string());
    let (col, row) = key.split_once(',').ok_or_else(malformed)?;
    let col = col.trim().parse().map_err(|_| malformed())?;
    let row = row.trim().parse().map_err(|_| malformed())?;
    Ok((col, row))
}

fn place(grid: &mut TileGrid, spawns: &mut Vec<Spawn>, cell: CellCode, col: u32, row: u32) {
    match cell {
        CellCode::Tile(kind) => {
            grid.set_block(col, row, kind);
        }
        CellCode::Entity(kind) => {
            grid.set_block(col, row, BlockKind::Path);
            spawns.push(Spawn { kind, col, row });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn walled(width: u32, height: u32) -> TileGrid {
        let mut grid = TileGrid::new(width, height, 32.0, Vec2::ZERO).unwrap();
        for col in 0..width {
            grid.set_block(col, 0, BlockKind::Wall);
            grid.set_block(col, height - 1, BlockKind::Wall);
        }
        grid
    }

    #[test]
    fn test_get_block_converts_world_to_cell() {
        let mut grid = TileGrid::new(4, 3, 32.0, Vec2::new(100.0, 50.0)).unwrap();
        grid.set_block(2, 1, BlockKind::Key);
        let block = grid.get_block(Vec2::new(100.0 + 70.0, 50.0 + 40.0)).unwrap();
        assert_eq!((block.col, block.row, block.kind), (2, 1, BlockKind::Key));
        assert!(grid.get_block(Vec2::new(99.0, 60.0)).is_none());
        assert!(grid.get_block(Vec2::new(100.0 + 128.0, 60.0)).is_none());
    }

    #[test]
    fn test_set_block_out_of_bounds_is_ignored() {
        let mut grid = walled(3, 3);
        assert!(!grid.set_block(3, 0, BlockKind::Path));
        assert!(grid.set_block(1, 1, BlockKind::Trap));
        assert_eq!(grid.block(1, 1).unwrap().kind, BlockKind::Trap);
    }

    #[test]
    fn test_collides_spans_every_covered_cell() {
        let mut grid = TileGrid::new(5, 5, 32.0, Vec2::ZERO).unwrap();
        grid.set_block(2, 2, BlockKind::Wall);
        // Wide box whose corners are on paths but whose middle covers the wall
        let rect = Rect::new(40.0, 70.0, 90.0, 10.0);
        assert!(grid.collides(&rect));
        // Box exactly touching the wall's left edge
        let touching = Rect::new(40.0, 70.0, 24.0, 10.0);
        assert!(!grid.collides(&touching));
    }

    #[test]
    fn test_outside_grid_is_solid() {
        let grid = TileGrid::new(3, 3, 32.0, Vec2::ZERO).unwrap();
        assert!(grid.collides(&Rect::new(-2.0, 10.0, 8.0, 8.0)));
        assert!(grid.collides(&Rect::new(90.0, 10.0, 8.0, 8.0)));
        assert!(!grid.collides(&Rect::new(10.0, 10.0, 8.0, 8.0)));
    }

    #[test]
    fn test_from_properties() {
        let props = [("0,0", "1"), ("1,0", "0"), ("2,1", "4"), ("2,0", "2"), ("1,1", "5")];
        let layout = MazeLayout::from_properties(3, 2, 16.0, Vec2::ZERO, props).unwrap();
        assert_eq!(layout.entry, (0, 0));
        assert_eq!(layout.grid.block(1, 0).unwrap().kind, BlockKind::Wall);
        assert_eq!(layout.grid.block(2, 1).unwrap().kind, BlockKind::Path);
        assert_eq!(layout.grid.block(1, 1).unwrap().kind, BlockKind::Key);
        assert_eq!(
            layout.spawns,
            vec![Spawn {
                kind: SpawnKind::Skeleton,
                col: 2,
                row: 1
            }]
        );
    }

    #[test]
    fn test_from_properties_errors() {
        let bad_key = MazeLayout::from_properties(2, 2, 16.0, Vec2::ZERO, [("0;0", "1")]);
        assert!(matches!(bad_key, Err(MazeError::MalformedKey(_))));

        let bad_code = MazeLayout::from_properties(2, 2, 16.0, Vec2::ZERO, [("0,0", "42")]);
        assert!(matches!(bad_code, Err(MazeError::UnknownCode { code: 42, .. })));

        let outside = MazeLayout::from_properties(2, 2, 16.0, Vec2::ZERO, [("5,0", "1")]);
        assert!(matches!(outside, Err(MazeError::CellOutOfBounds { .. })));

        let no_entry = MazeLayout::from_properties(2, 2, 16.0, Vec2::ZERO, [("0,0", "0")]);
        assert!(matches!(no_entry, Err(MazeError::MissingEntry)));

        let empty = TileGrid::new(0, 4, 16.0, Vec2::ZERO);
        assert!(matches!(empty, Err(MazeError::EmptyGrid { .. })));
    }

    #[test]
    fn test_from_ascii() {
        let layout = MazeLayout::from_ascii(
            "#####\n\
             #E.s#\n\
             #K#X#\n\
             #####\n",
            32.0,
            Vec2::ZERO,
        )
        .unwrap();
        assert_eq!(layout.grid.width(), 5);
        assert_eq!(layout.grid.height(), 4);
        assert_eq!(layout.entry, (1, 1));
        assert_eq!(layout.grid.find(BlockKind::Exit), Some((3, 2)));
        assert_eq!(layout.spawns.len(), 1);

        let ragged = MazeLayout::from_ascii("###\n#E\n", 32.0, Vec2::ZERO);
        assert!(matches!(ragged, Err(MazeError::RaggedRow { row: 1, .. })));
    }

    proptest! {
        #[test]
        fn prop_block_lookup_respects_bounds(col in -10i64..20, row in -10i64..20) {
            let grid = walled(8, 6);
            let inside = (0..8).contains(&col) && (0..6).contains(&row);
            prop_assert_eq!(grid.block(col, row).is_some(), inside);
        }

        #[test]
        fn prop_wall_overlaps_any_intersecting_box(
            x in 0.5f32..31.5, y in 0.5f32..31.5, w in 0.5f32..40.0, h in 0.5f32..40.0
        ) {
            let mut grid = TileGrid::new(1, 1, 32.0, Vec2::ZERO).unwrap();
            let rect = Rect::new(x, y, w, h);
            grid.set_block(0, 0, BlockKind::Wall);
            prop_assert!(grid.block(0, 0).unwrap().overlaps(&rect));
            grid.set_block(0, 0, BlockKind::Path);
            prop_assert!(!grid.block(0, 0).unwrap().overlaps(&rect));
        }
    }
}
