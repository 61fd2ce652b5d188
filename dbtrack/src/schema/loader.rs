//! Snapshot loading from provider-written JSON files.

use std::path::Path;

use crate::errors::DiffError;

use super::model::SchemaSnapshot;

/// Load one schema snapshot from a JSON file.
pub fn load_snapshot(path: &Path) -> Result<SchemaSnapshot, DiffError> {
    let content = std::fs::read_to_string(path).map_err(|source| DiffError::SnapshotRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| DiffError::SnapshotParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("previous.json");
        std::fs::write(
            &path,
            r#"{
                "tables": [
                    {
                        "name": "MEMBER",
                        "columns": [
                            { "name": "MEMBER_ID", "type": "INTEGER", "not_null": true }
                        ],
                        "primary_key": { "name": "PK_MEMBER", "columns": ["MEMBER_ID"] }
                    }
                ]
            }"#,
        )
        .unwrap();

        let snapshot = load_snapshot(&path).unwrap();
        assert_eq!(snapshot.tables.len(), 1);
        assert!(snapshot.tables[0].columns[0].not_null);
    }

    #[test]
    fn test_load_snapshot_names_file_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_snapshot(&path).unwrap_err();
        assert!(err.to_string().contains("broken.json"), "{err}");
    }
}
