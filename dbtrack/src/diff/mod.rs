//! Structural schema diffing.
//!
//! Compares two schema snapshots and produces a tree of differences: the
//! schema level composes per-table diffs, a table composes primary key,
//! unique key, index, and column diffs. The tree serializes to the map
//! notation for the reverse-chronological history file.

mod history;
mod kinds;
mod serialize;
mod table;
mod types;

pub use history::{DiffHistory, HistoryEntry};
pub use serialize::{schema_diff_from_value, schema_diff_to_value};
pub use table::diff_schemas;
pub use types::{DiffType, ElementDiff, NextPrevious, SchemaDiff, TableDiff};
