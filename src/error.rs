//! Construction-time error types
//!
//! Only level/tuning loading can fail. Once a [`crate::sim::Maze`] exists the
//! simulation never returns errors.

use thiserror::Error;

/// Errors surfaced while building a maze or loading tuning data.
#[derive(Debug, Error)]
pub enum MazeError {
    #[error("maze grid must be at least 1x1 (got {width}x{height})")]
    EmptyGrid { width: u32, height: u32 },

    #[error("cell size must be positive (got {0})")]
    InvalidCellSize(f32),

    #[error("cell ({col}, {row}) lies outside the {width}x{height} grid")]
    CellOutOfBounds {
        col: u32,
        row: u32,
        width: u32,
        height: u32,
    },

    #[error("malformed map key {0:?} (expected \"col,row\")")]
    MalformedKey(String),

    #[error("malformed map value {value:?} for key {key:?}")]
    MalformedValue { key: String, value: String },

    #[error("unknown cell code {code} at ({col}, {row})")]
    UnknownCode { code: i32, col: u32, row: u32 },

    #[error("unknown layout glyph {glyph:?} at ({col}, {row})")]
    UnknownGlyph { glyph: char, col: u32, row: u32 },

    #[error("layout row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        row: u32,
        found: u32,
        expected: u32,
    },

    #[error("maze has no entry cell")]
    MissingEntry,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MazeError>;
