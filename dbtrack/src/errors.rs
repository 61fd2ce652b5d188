use std::path::PathBuf;

use thiserror::Error;

use crate::dfmap::ShapeError;

/// Failures around persisted map-notation files (diff history, pieces, pickups).
///
/// Every variant carries the offending file path so the caller can report
/// exactly which file broke.
#[derive(Debug, Error)]
pub enum MapFileError {
    /// File could not be read.
    #[error("failed to read map file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File content does not parse as the map notation.
    #[error("malformed map file {path} at line {line}: {reason}")]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// File parsed but does not have the expected nested shape.
    #[error("map file {path}: {source}")]
    Shape {
        path: PathBuf,
        #[source]
        source: ShapeError,
    },

    /// File could not be written to completion.
    #[error("failed to write map file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures while computing or persisting schema diffs.
#[derive(Debug, Error)]
pub enum DiffError {
    /// The same name appears twice within one snapshot collection.
    ///
    /// Snapshots with duplicate table/constraint/column names are a data
    /// quality bug on the provider side and are never silently resolved.
    #[error("duplicate {kind} name '{name}' within one schema snapshot")]
    DuplicateName { kind: &'static str, name: String },

    /// The history file already holds an entry for this datetime.
    #[error("diff history already contains an entry for '{datetime}'")]
    DuplicateHistoryEntry { datetime: String },

    /// Schema snapshot file could not be read.
    #[error("failed to read schema snapshot {path}: {source}")]
    SnapshotRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Schema snapshot file is not valid JSON of the expected shape.
    #[error("failed to parse schema snapshot {path}: {source}")]
    SnapshotParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Underlying history file failed to read or write.
    #[error(transparent)]
    MapFile(#[from] MapFileError),
}

/// Failures while authoring, reading, merging, or clearing annotation pieces.
#[derive(Debug, Error)]
pub enum PickupError {
    /// A file in the piece directory does not follow the piece naming convention.
    #[error("unrecognized piece file name '{name}' in {dir}")]
    InvalidPieceFileName { dir: PathBuf, name: String },

    /// A piece was authored with no comment text.
    #[error("empty comment for {target}: a piece must carry comment text")]
    EmptyComment { target: String },

    /// Piece directory could not be listed.
    #[error("failed to list piece directory {dir}: {source}")]
    ListDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A consumed piece file could not be deleted after pickup.
    #[error("failed to delete consumed piece {path}: {source}")]
    DeletePiece {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Underlying piece/pickup file failed to read or write.
    #[error(transparent)]
    MapFile(#[from] MapFileError),
}
