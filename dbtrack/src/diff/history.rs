//! Reverse-chronological diff history file.
//!
//! The file is one map whose keys are diff datetimes, most recent first.
//! Appending a new diff prepends it; older entries are carried over
//! untouched, so the file behaves as an append-only log even though it is
//! physically rewritten as a whole.

use std::path::{Path, PathBuf};

use crate::dfmap::{self, MapValue, ShapeError, Value};
use crate::errors::DiffError;
use crate::timestamp;

use super::serialize::{schema_diff_from_value, schema_diff_to_value};
use super::types::SchemaDiff;

/// One history entry: the datetime key and the diff map under it.
///
/// The diff map is kept in its persisted form so rewriting the file never
/// alters older entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub datetime: String,
    pub diff_map: MapValue,
}

impl HistoryEntry {
    /// Decode this entry back into a diff tree.
    pub fn schema_diff(&self) -> Result<SchemaDiff, ShapeError> {
        schema_diff_from_value(&self.diff_map)
    }
}

/// In-memory view of one history file.
#[derive(Debug)]
pub struct DiffHistory {
    path: PathBuf,
    entries: Vec<HistoryEntry>,
}

impl DiffHistory {
    /// Load the history file; an absent file is an empty history.
    pub fn load(path: &Path) -> Result<Self, DiffError> {
        if !path.exists() {
            return Ok(Self {
                path: path.to_path_buf(),
                entries: Vec::new(),
            });
        }
        let root = dfmap::read_map_file(path)?;
        let mut entries = Vec::with_capacity(root.len());
        for (datetime, value) in root.iter() {
            let diff_map = value
                .as_map()
                .ok_or_else(|| {
                    dfmap::shape_error(
                        path,
                        ShapeError::WrongType {
                            key: datetime.to_string(),
                            expected: "map",
                            found: value.type_name(),
                        },
                    )
                })?
                .clone();
            entries.push(HistoryEntry {
                datetime: datetime.to_string(),
                diff_map,
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Entries in file order: most recent first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Prepend a new diff keyed by its datetime.
    ///
    /// A datetime collision is a caller error, never silently overwritten.
    pub fn prepend(&mut self, diff: &SchemaDiff) -> Result<(), DiffError> {
        let datetime = timestamp::format_display(diff.diff_datetime);
        if self.entries.iter().any(|e| e.datetime == datetime) {
            return Err(DiffError::DuplicateHistoryEntry { datetime });
        }
        self.entries.insert(
            0,
            HistoryEntry {
                datetime,
                diff_map: schema_diff_to_value(diff),
            },
        );
        Ok(())
    }

    /// Rewrite the whole file in current entry order.
    pub fn save(&self) -> Result<(), DiffError> {
        let mut root = MapValue::new();
        for entry in &self.entries {
            root.insert(&entry.datetime, Value::Map(entry.diff_map.clone()));
        }
        dfmap::write_map_file(&self.path, &root)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::types::TableDiff;
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn diff_at(day: u32) -> SchemaDiff {
        let diff_datetime: NaiveDateTime = NaiveDate::from_ymd_opt(2026, 8, day)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        SchemaDiff {
            diff_datetime,
            table_diffs: vec![TableDiff::added("PURCHASE")],
        }
    }

    #[test]
    fn test_prepend_keeps_most_recent_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diff-history.dfmap");

        let mut history = DiffHistory::load(&path).unwrap();
        assert!(history.is_empty());
        history.prepend(&diff_at(1)).unwrap();
        history.prepend(&diff_at(2)).unwrap();
        history.save().unwrap();

        let reloaded = DiffHistory::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.entries()[0].datetime, "2026/08/02 09:30:00.000");
        assert_eq!(reloaded.entries()[1].datetime, "2026/08/01 09:30:00.000");
    }

    #[test]
    fn test_older_entries_survive_rewrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diff-history.dfmap");

        let mut history = DiffHistory::load(&path).unwrap();
        history.prepend(&diff_at(1)).unwrap();
        history.save().unwrap();
        let first_entry = DiffHistory::load(&path).unwrap().entries()[0].clone();

        let mut history = DiffHistory::load(&path).unwrap();
        history.prepend(&diff_at(2)).unwrap();
        history.save().unwrap();

        let reloaded = DiffHistory::load(&path).unwrap();
        assert_eq!(reloaded.entries()[1], first_entry);
        let decoded = reloaded.entries()[1].schema_diff().unwrap();
        assert_eq!(decoded.table_diffs[0].table_name, "PURCHASE");
    }

    #[test]
    fn test_duplicate_datetime_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diff-history.dfmap");

        let mut history = DiffHistory::load(&path).unwrap();
        history.prepend(&diff_at(1)).unwrap();
        let err = history.prepend(&diff_at(1)).unwrap_err();
        assert!(matches!(err, DiffError::DuplicateHistoryEntry { .. }));
    }

    #[test]
    fn test_malformed_history_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diff-history.dfmap");
        std::fs::write(&path, "map:{ ; broken").unwrap();

        let err = DiffHistory::load(&path).unwrap_err();
        assert!(err.to_string().contains("diff-history.dfmap"), "{err}");
    }
}
