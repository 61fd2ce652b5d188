//! Generic nested map/list notation used by all persisted dbtrack files.
//!
//! The notation is a flat-text, human-diffable structure of ordered
//! string-keyed maps and ordered lists:
//!
//! ```text
//! map:{
//!     ; formatVersion = 1.0
//!     ; tableList = list:{
//!         ; map:{
//!             ; tableName = MEMBER
//!         }
//!     }
//! }
//! ```
//!
//! Key iteration order is insertion order, exactly as written, so successive
//! snapshots stay visually comparable under version control.

mod parser;
mod value;
mod writer;

use std::path::Path;

pub use parser::{ParseError, parse};
pub use value::{MapValue, ShapeError, Value};
pub use writer::render;

use crate::errors::MapFileError;

/// Read a file expected to contain a top-level `map:{ ... }`.
pub fn read_map_file(path: &Path) -> Result<MapValue, MapFileError> {
    let content = std::fs::read_to_string(path).map_err(|source| MapFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value = parse(&content).map_err(|err| MapFileError::Parse {
        path: path.to_path_buf(),
        line: err.line,
        reason: err.reason,
    })?;
    match value {
        Value::Map(map) => Ok(map),
        other => Err(MapFileError::Shape {
            path: path.to_path_buf(),
            source: ShapeError::WrongType {
                key: "<root>".to_string(),
                expected: "map",
                found: other.type_name(),
            },
        }),
    }
}

/// Write a top-level map to a file, to completion or not at all.
///
/// The content lands in a sibling temp file first and is moved into place
/// with a rename, so readers never observe a half-written file.
pub fn write_map_file(path: &Path, map: &MapValue) -> Result<(), MapFileError> {
    let rendered = render(&Value::Map(map.clone()));
    let tmp_path = path.with_extension("dfmap.tmp");
    let write_err = |source| MapFileError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(&tmp_path, rendered).map_err(write_err)?;
    std::fs::rename(&tmp_path, path).map_err(write_err)
}

/// Wrap a shape error with the file it came from.
pub fn shape_error(path: &Path, source: ShapeError) -> MapFileError {
    MapFileError::Shape {
        path: path.to_path_buf(),
        source,
    }
}
