//! Schema snapshot model and loading.
//!
//! A snapshot is the structural description of one database schema at one
//! point in time: tables with their columns, primary key, unique keys, and
//! indexes. Snapshots are produced by an external metadata provider and
//! consumed here from JSON files.

mod loader;
mod model;

pub use loader::load_snapshot;
pub use model::{ColumnMeta, ConstraintMeta, IndexMeta, SchemaSnapshot, TableMeta};
