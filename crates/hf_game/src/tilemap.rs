//! ASCII level grids.
//!
//! A map is a list of equal-length rows over the alphabet `B` (wall), `E`
//! (enemy spawn), `P` (player spawn) and `.` (empty). Parsing yields
//! placements in row-major order, top to bottom and left to right, so spawn
//! order (and with it the order enemies draw from the RNG) is reproducible.

use std::fs;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    Wall,
    EnemySpawn,
    PlayerSpawn,
    Empty,
}

impl TileKind {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            'B' => Some(Self::Wall),
            'E' => Some(Self::EnemySpawn),
            'P' => Some(Self::PlayerSpawn),
            '.' => Some(Self::Empty),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub row: usize,
    pub col: usize,
    pub kind: TileKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMap {
    pub rows: usize,
    pub cols: usize,
    /// Non-empty cells only, in scan order.
    pub placements: Vec<Placement>,
}

impl TileMap {
    pub fn player_spawn(&self) -> Option<Placement> {
        self.placements
            .iter()
            .copied()
            .find(|p| p.kind == TileKind::PlayerSpawn)
    }

    pub fn count(&self, kind: TileKind) -> usize {
        self.placements.iter().filter(|p| p.kind == kind).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("map has no rows")]
    Empty,
    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown tile '{ch}' at row {row}, column {col}")]
    UnknownTile { row: usize, col: usize, ch: char },
    #[error("map has no player spawn 'P'")]
    MissingPlayerSpawn,
    #[error("map has {count} player spawns, expected exactly one")]
    MultiplePlayerSpawns { count: usize },
    #[error("failed to read map {path}: {message}")]
    Io { path: String, message: String },
}

pub fn parse_tile_map<S: AsRef<str>>(rows: &[S]) -> Result<TileMap, MapError> {
    let first = rows.first().ok_or(MapError::Empty)?;
    let cols = first.as_ref().chars().count();
    if cols == 0 {
        return Err(MapError::Empty);
    }

    let mut placements = Vec::new();
    for (row, line) in rows.iter().enumerate() {
        let line = line.as_ref();
        let found = line.chars().count();
        if found != cols {
            return Err(MapError::RaggedRow {
                row,
                expected: cols,
                found,
            });
        }
        for (col, ch) in line.chars().enumerate() {
            let kind = TileKind::from_char(ch).ok_or(MapError::UnknownTile { row, col, ch })?;
            if kind != TileKind::Empty {
                placements.push(Placement { row, col, kind });
            }
        }
    }

    let map = TileMap {
        rows: rows.len(),
        cols,
        placements,
    };
    match map.count(TileKind::PlayerSpawn) {
        0 => Err(MapError::MissingPlayerSpawn),
        1 => Ok(map),
        count => Err(MapError::MultiplePlayerSpawns { count }),
    }
}

/// Loads a map from a text file, one row per line. Blank lines and trailing
/// whitespace are ignored.
pub fn load_tile_map_file(path: &Path) -> Result<TileMap, MapError> {
    let raw = fs::read_to_string(path).map_err(|e| MapError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let rows: Vec<&str> = raw
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect();
    parse_tile_map(&rows)
}
