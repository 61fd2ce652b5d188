//! Table and schema level composition of the per-kind differs.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::errors::DiffError;
use crate::schema::{SchemaSnapshot, TableMeta};

use super::kinds::{ColumnKind, IndexKind, UniqueKeyKind, diff_elements, diff_primary_key};
use super::types::{NextPrevious, SchemaDiff, TableDiff};

/// Diff two schema snapshots.
///
/// Tables only in the next snapshot become whole-table ADDs, tables only in
/// the previous become whole-table DELETEs, tables in both are compared
/// kind by kind and included only when something differs. Renames are not
/// detected; a renamed table diffs as DELETE plus ADD.
pub fn diff_schemas(
    previous: &SchemaSnapshot,
    next: &SchemaSnapshot,
    diff_datetime: NaiveDateTime,
) -> Result<SchemaDiff, DiffError> {
    let previous_by_name = index_tables(&previous.tables)?;
    let next_by_name = index_tables(&next.tables)?;

    let mut table_diffs = Vec::new();
    for table in &next.tables {
        match previous_by_name.get(table.name.as_str()) {
            None => table_diffs.push(TableDiff::added(&table.name)),
            Some(previous_table) => {
                let diff = diff_table(previous_table, table)?;
                if diff.has_diff() {
                    table_diffs.push(diff);
                }
            }
        }
    }
    for table in &previous.tables {
        if !next_by_name.contains_key(table.name.as_str()) {
            table_diffs.push(TableDiff::deleted(&table.name));
        }
    }

    Ok(SchemaDiff {
        diff_datetime,
        table_diffs,
    })
}

fn index_tables(tables: &[TableMeta]) -> Result<HashMap<&str, &TableMeta>, DiffError> {
    let mut by_name = HashMap::with_capacity(tables.len());
    for table in tables {
        if by_name.insert(table.name.as_str(), table).is_some() {
            return Err(DiffError::DuplicateName {
                kind: "table",
                name: table.name.clone(),
            });
        }
    }
    Ok(by_name)
}

fn diff_table(previous: &TableMeta, next: &TableMeta) -> Result<TableDiff, DiffError> {
    let mut diff = TableDiff::changed(&next.name);

    if previous.schema != next.schema {
        diff.attributes.push(NextPrevious::new(
            "schemaName",
            previous.schema.clone().unwrap_or_default(),
            next.schema.clone().unwrap_or_default(),
        ));
    }
    if previous.comment != next.comment {
        diff.attributes.push(NextPrevious::new(
            "comment",
            previous.comment.clone().unwrap_or_default(),
            next.comment.clone().unwrap_or_default(),
        ));
    }

    diff.primary_key_diff = diff_primary_key(previous.primary_key.as_ref(), next.primary_key.as_ref());
    diff.unique_key_diffs = diff_elements::<UniqueKeyKind>(&previous.unique_keys, &next.unique_keys)?;
    diff.index_diffs = diff_elements::<IndexKind>(&previous.indexes, &next.indexes)?;
    diff.column_diffs = diff_elements::<ColumnKind>(&previous.columns, &next.columns)?;

    Ok(diff)
}

#[cfg(test)]
mod tests {
    use super::super::types::DiffType;
    use super::*;
    use crate::schema::{ColumnMeta, ConstraintMeta};
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 6)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn member_table() -> TableMeta {
        let mut id = ColumnMeta::new("MEMBER_ID", "INTEGER");
        id.not_null = true;
        let mut account = ColumnMeta::new("MEMBER_ACCOUNT", "VARCHAR");
        account.column_size = Some(50);
        let mut table = TableMeta::new("MEMBER", vec![id, account]);
        table.primary_key = Some(ConstraintMeta::new("PK_MEMBER", vec!["MEMBER_ID".to_string()]));
        table.unique_keys = vec![ConstraintMeta::new(
            "UQ_MEMBER_ACCOUNT",
            vec!["MEMBER_ACCOUNT".to_string()],
        )];
        table
    }

    #[test]
    fn test_self_diff_has_no_diff() {
        let snapshot = SchemaSnapshot::new(vec![member_table()]);
        let diff = diff_schemas(&snapshot, &snapshot, at()).unwrap();
        assert!(!diff.has_diff());
        assert!(diff.table_diffs.is_empty());
    }

    #[test]
    fn test_table_add_and_delete_detection() {
        let previous = SchemaSnapshot::new(vec![
            TableMeta::new("MEMBER", vec![]),
            TableMeta::new("WITHDRAWAL", vec![]),
        ]);
        let next = SchemaSnapshot::new(vec![
            TableMeta::new("MEMBER", vec![]),
            TableMeta::new("PURCHASE", vec![]),
        ]);

        let diff = diff_schemas(&previous, &next, at()).unwrap();
        assert_eq!(diff.table_diffs.len(), 2);
        assert_eq!(diff.table_diffs[0].table_name, "PURCHASE");
        assert_eq!(diff.table_diffs[0].diff_type, DiffType::Add);
        assert_eq!(diff.table_diffs[1].table_name, "WITHDRAWAL");
        assert_eq!(diff.table_diffs[1].diff_type, DiffType::Delete);
        assert_eq!(diff.added_count(), 1);
        assert_eq!(diff.deleted_count(), 1);
        assert_eq!(diff.changed_count(), 0);
    }

    #[test]
    fn test_unique_key_widened_in_place() {
        let previous = SchemaSnapshot::new(vec![member_table()]);
        let mut widened = member_table();
        widened.unique_keys[0].columns.push("MEMBER_NAME".to_string());
        let next = SchemaSnapshot::new(vec![widened]);

        let diff = diff_schemas(&previous, &next, at()).unwrap();
        assert_eq!(diff.table_diffs.len(), 1);
        let table_diff = &diff.table_diffs[0];
        assert_eq!(table_diff.diff_type, DiffType::Change);
        assert_eq!(table_diff.unique_key_diffs.len(), 1);
        let uq = &table_diff.unique_key_diffs[0];
        assert_eq!(uq.key_name, "UQ_MEMBER_ACCOUNT");
        assert_eq!(uq.pairs[0].previous, "MEMBER_ACCOUNT");
        assert_eq!(uq.pairs[0].next, "MEMBER_ACCOUNT, MEMBER_NAME");
    }

    #[test]
    fn test_column_size_change_bubbles_to_schema() {
        let previous = SchemaSnapshot::new(vec![member_table()]);
        let mut next_table = member_table();
        next_table.columns[1].column_size = Some(100);
        let next = SchemaSnapshot::new(vec![next_table]);

        let diff = diff_schemas(&previous, &next, at()).unwrap();
        assert!(diff.has_diff());
        let table_diff = &diff.table_diffs[0];
        assert_eq!(table_diff.column_diffs.len(), 1);
        assert_eq!(table_diff.column_diffs[0].key_name, "MEMBER_ACCOUNT");
    }

    #[test]
    fn test_table_comment_change_is_an_attribute_pair() {
        let previous = SchemaSnapshot::new(vec![member_table()]);
        let mut next_table = member_table();
        next_table.comment = Some("registered members".to_string());
        let next = SchemaSnapshot::new(vec![next_table]);

        let diff = diff_schemas(&previous, &next, at()).unwrap();
        let table_diff = &diff.table_diffs[0];
        assert_eq!(table_diff.attributes.len(), 1);
        assert_eq!(table_diff.attributes[0].attribute, "comment");
        assert_eq!(table_diff.attributes[0].next, "registered members");
    }

    #[test]
    fn test_duplicate_table_name_fails_fast() {
        let doubled = SchemaSnapshot::new(vec![
            TableMeta::new("MEMBER", vec![]),
            TableMeta::new("MEMBER", vec![]),
        ]);
        let err = diff_schemas(&doubled, &SchemaSnapshot::new(vec![]), at()).unwrap_err();
        assert!(matches!(
            err,
            DiffError::DuplicateName { kind: "table", ref name } if name == "MEMBER"
        ));
    }
}
