//! One generic pairwise diff over same-kind named collections.
//!
//! Unique keys, indexes, and columns all diff the same way: match by name,
//! ADD what only the next snapshot has, DELETE what only the previous has,
//! CHANGE with per-attribute pairs when both sides differ. Each kind plugs
//! in its name accessor and attribute comparison.

use std::collections::HashMap;

use crate::errors::DiffError;
use crate::schema::{ColumnMeta, ConstraintMeta, IndexMeta};

use super::types::{ElementDiff, NextPrevious};

pub(crate) trait DiffKind {
    type Item;

    /// Kind label used in duplicate-name errors.
    const KIND: &'static str;

    fn name(item: &Self::Item) -> &str;

    /// Attribute pairs for two same-named items; empty means no difference.
    fn compare(previous: &Self::Item, next: &Self::Item) -> Vec<NextPrevious>;
}

/// Diff two same-kind collections.
///
/// Emission order: ADDs and CHANGEs in next-snapshot iteration order, then
/// orphan DELETEs in previous-snapshot iteration order. Unchanged elements
/// emit nothing. A duplicate name within one collection fails fast.
pub(crate) fn diff_elements<K: DiffKind>(
    previous: &[K::Item],
    next: &[K::Item],
) -> Result<Vec<ElementDiff>, DiffError> {
    let previous_by_name = index_by_name::<K>(previous)?;
    let next_by_name = index_by_name::<K>(next)?;

    let mut diffs = Vec::new();
    for item in next {
        let name = K::name(item);
        match previous_by_name.get(name) {
            None => diffs.push(ElementDiff::added(name)),
            Some(previous_item) => {
                let pairs = K::compare(previous_item, item);
                if !pairs.is_empty() {
                    diffs.push(ElementDiff::changed(name, pairs));
                }
            }
        }
    }
    for item in previous {
        let name = K::name(item);
        if !next_by_name.contains_key(name) {
            diffs.push(ElementDiff::deleted(name));
        }
    }
    Ok(diffs)
}

fn index_by_name<K: DiffKind>(items: &[K::Item]) -> Result<HashMap<&str, &K::Item>, DiffError> {
    let mut by_name = HashMap::with_capacity(items.len());
    for item in items {
        let name = K::name(item);
        if by_name.insert(name, item).is_some() {
            return Err(DiffError::DuplicateName {
                kind: K::KIND,
                name: name.to_string(),
            });
        }
    }
    Ok(by_name)
}

/// Compare the single primary-key slot of a table.
///
/// The slot is positional: a renamed key is a CHANGE with a name pair, not a
/// DELETE plus ADD, so a table never carries more than one primary key diff.
pub(crate) fn diff_primary_key(
    previous: Option<&ConstraintMeta>,
    next: Option<&ConstraintMeta>,
) -> Option<ElementDiff> {
    match (previous, next) {
        (None, None) => None,
        (None, Some(added)) => Some(ElementDiff::added(&added.name)),
        (Some(deleted), None) => Some(ElementDiff::deleted(&deleted.name)),
        (Some(previous), Some(next)) => {
            let mut pairs = Vec::new();
            if previous.name != next.name {
                pairs.push(NextPrevious::new("name", &previous.name, &next.name));
            }
            if previous.columns != next.columns {
                pairs.push(NextPrevious::new(
                    "columnList",
                    previous.column_expression(),
                    next.column_expression(),
                ));
            }
            if pairs.is_empty() {
                None
            } else {
                Some(ElementDiff::changed(&next.name, pairs))
            }
        }
    }
}

pub(crate) struct UniqueKeyKind;

impl DiffKind for UniqueKeyKind {
    type Item = ConstraintMeta;
    const KIND: &'static str = "unique key";

    fn name(item: &Self::Item) -> &str {
        &item.name
    }

    fn compare(previous: &Self::Item, next: &Self::Item) -> Vec<NextPrevious> {
        if previous.columns == next.columns {
            Vec::new()
        } else {
            vec![NextPrevious::new(
                "columnList",
                previous.column_expression(),
                next.column_expression(),
            )]
        }
    }
}

pub(crate) struct IndexKind;

impl DiffKind for IndexKind {
    type Item = IndexMeta;
    const KIND: &'static str = "index";

    fn name(item: &Self::Item) -> &str {
        &item.name
    }

    fn compare(previous: &Self::Item, next: &Self::Item) -> Vec<NextPrevious> {
        let mut pairs = Vec::new();
        if previous.columns != next.columns {
            pairs.push(NextPrevious::new(
                "columnList",
                previous.column_expression(),
                next.column_expression(),
            ));
        }
        if previous.unique != next.unique {
            pairs.push(NextPrevious::new(
                "unique",
                previous.unique.to_string(),
                next.unique.to_string(),
            ));
        }
        pairs
    }
}

pub(crate) struct ColumnKind;

impl DiffKind for ColumnKind {
    type Item = ColumnMeta;
    const KIND: &'static str = "column";

    fn name(item: &Self::Item) -> &str {
        &item.name
    }

    fn compare(previous: &Self::Item, next: &Self::Item) -> Vec<NextPrevious> {
        let mut pairs = Vec::new();
        if previous.type_name != next.type_name {
            pairs.push(NextPrevious::new(
                "typeName",
                &previous.type_name,
                &next.type_name,
            ));
        }
        if previous.size_expression() != next.size_expression() {
            pairs.push(NextPrevious::new(
                "columnSize",
                previous.size_expression(),
                next.size_expression(),
            ));
        }
        if previous.not_null != next.not_null {
            pairs.push(NextPrevious::new(
                "notNull",
                previous.not_null.to_string(),
                next.not_null.to_string(),
            ));
        }
        if previous.default_value != next.default_value {
            pairs.push(NextPrevious::new(
                "defaultValue",
                previous.default_value.clone().unwrap_or_default(),
                next.default_value.clone().unwrap_or_default(),
            ));
        }
        if previous.comment != next.comment {
            pairs.push(NextPrevious::new(
                "comment",
                previous.comment.clone().unwrap_or_default(),
                next.comment.clone().unwrap_or_default(),
            ));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::super::types::DiffType;
    use super::*;

    fn uq(name: &str, columns: &[&str]) -> ConstraintMeta {
        ConstraintMeta::new(name, columns.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn test_self_diff_is_empty() {
        let keys = vec![uq("UQ_A", &["A"]), uq("UQ_B", &["B", "C"])];
        let diffs = diff_elements::<UniqueKeyKind>(&keys, &keys).unwrap();
        assert!(diffs.is_empty());
    }

    #[test]
    fn test_added_and_deleted_detection() {
        let previous = vec![uq("UQ_OLD", &["A"])];
        let next = vec![uq("UQ_NEW", &["B"])];
        let diffs = diff_elements::<UniqueKeyKind>(&previous, &next).unwrap();
        assert_eq!(diffs.len(), 2);
        assert_eq!(diffs[0].diff_type, DiffType::Add);
        assert_eq!(diffs[0].key_name, "UQ_NEW");
        assert_eq!(diffs[1].diff_type, DiffType::Delete);
        assert_eq!(diffs[1].key_name, "UQ_OLD");
    }

    #[test]
    fn test_adds_and_changes_come_before_orphan_deletes() {
        let previous = vec![uq("UQ_GONE", &["A"]), uq("UQ_KEPT", &["B"])];
        let next = vec![uq("UQ_KEPT", &["B", "C"]), uq("UQ_FRESH", &["D"])];
        let diffs = diff_elements::<UniqueKeyKind>(&previous, &next).unwrap();
        let kinds: Vec<DiffType> = diffs.iter().map(|d| d.diff_type).collect();
        assert_eq!(kinds, vec![DiffType::Change, DiffType::Add, DiffType::Delete]);
    }

    #[test]
    fn test_unique_key_column_list_change() {
        let previous = vec![uq("UQ_MEMBER_ACCOUNT", &["MEMBER_ACCOUNT"])];
        let next = vec![uq("UQ_MEMBER_ACCOUNT", &["MEMBER_ACCOUNT", "MEMBER_NAME"])];
        let diffs = diff_elements::<UniqueKeyKind>(&previous, &next).unwrap();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].diff_type, DiffType::Change);
        assert_eq!(
            diffs[0].pairs,
            vec![NextPrevious::new(
                "columnList",
                "MEMBER_ACCOUNT",
                "MEMBER_ACCOUNT, MEMBER_NAME"
            )]
        );
    }

    #[test]
    fn test_duplicate_name_fails_fast() {
        let doubled = vec![uq("UQ_DUP", &["A"]), uq("UQ_DUP", &["B"])];
        let err = diff_elements::<UniqueKeyKind>(&doubled, &[]).unwrap_err();
        assert!(matches!(
            err,
            DiffError::DuplicateName { kind: "unique key", ref name } if name == "UQ_DUP"
        ));
    }

    #[test]
    fn test_column_attribute_pairs() {
        let mut previous = ColumnMeta::new("MEMBER_NAME", "VARCHAR");
        previous.column_size = Some(10);
        let mut next = previous.clone();
        next.column_size = Some(20);
        next.not_null = true;

        let pairs = ColumnKind::compare(&previous, &next);
        assert_eq!(
            pairs,
            vec![
                NextPrevious::new("columnSize", "10", "20"),
                NextPrevious::new("notNull", "false", "true"),
            ]
        );
    }

    #[test]
    fn test_primary_key_rename_is_a_single_change() {
        let previous = uq("PK_MEMBER_OLD", &["MEMBER_ID"]);
        let next = uq("PK_MEMBER", &["MEMBER_ID"]);
        let diff = diff_primary_key(Some(&previous), Some(&next)).unwrap();
        assert_eq!(diff.diff_type, DiffType::Change);
        assert_eq!(
            diff.pairs,
            vec![NextPrevious::new("name", "PK_MEMBER_OLD", "PK_MEMBER")]
        );
    }

    #[test]
    fn test_primary_key_identical_emits_nothing() {
        let pk = uq("PK_MEMBER", &["MEMBER_ID"]);
        assert_eq!(diff_primary_key(Some(&pk), Some(&pk.clone())), None);
        assert_eq!(diff_primary_key(None, None), None);
    }

    #[test]
    fn test_index_unique_flag_change() {
        let previous = IndexMeta::new("IX_MEMBER_NAME", vec!["MEMBER_NAME".to_string()]);
        let mut next = previous.clone();
        next.unique = true;
        let pairs = IndexKind::compare(&previous, &next);
        assert_eq!(pairs, vec![NextPrevious::new("unique", "false", "true")]);
    }
}
