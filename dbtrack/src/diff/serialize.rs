//! Diff tree to/from the persisted map notation.
//!
//! The written key order mirrors the order the differs produced, so
//! successive history entries stay line-comparable under version control.
//! Changed attributes serialize as `<attribute> = map:{ previous, next }`
//! entries inline with the fixed keys.

use crate::dfmap::{MapValue, ShapeError, Value};
use crate::timestamp;

use super::types::{DiffType, ElementDiff, NextPrevious, SchemaDiff, TableDiff};

const KEY_DIFF_DATE: &str = "diffDate";
const KEY_TABLE_COUNT: &str = "tableCount";
const KEY_TABLE_DIFF: &str = "tableDiff";
const KEY_TABLE_NAME: &str = "tableName";
const KEY_KEY_NAME: &str = "keyName";
const KEY_DIFF_TYPE: &str = "diffType";
const KEY_PRIMARY_KEY_DIFF: &str = "primaryKeyDiff";
const KEY_UNIQUE_KEY_DIFF: &str = "uniqueKeyDiff";
const KEY_INDEX_DIFF: &str = "indexDiff";
const KEY_COLUMN_DIFF: &str = "columnDiff";
const KEY_PREVIOUS: &str = "previous";
const KEY_NEXT: &str = "next";

pub fn schema_diff_to_value(diff: &SchemaDiff) -> MapValue {
    let mut root = MapValue::new();
    root.insert(
        KEY_DIFF_DATE,
        Value::str(timestamp::format_display(diff.diff_datetime)),
    );

    let mut counts = MapValue::new();
    counts.insert("added", Value::str(diff.added_count().to_string()));
    counts.insert("changed", Value::str(diff.changed_count().to_string()));
    counts.insert("deleted", Value::str(diff.deleted_count().to_string()));
    root.insert(KEY_TABLE_COUNT, Value::Map(counts));

    if !diff.table_diffs.is_empty() {
        let tables = diff
            .table_diffs
            .iter()
            .map(|t| Value::Map(table_diff_to_map(t)))
            .collect();
        root.insert(KEY_TABLE_DIFF, Value::List(tables));
    }
    root
}

fn table_diff_to_map(diff: &TableDiff) -> MapValue {
    let mut map = MapValue::new();
    map.insert(KEY_TABLE_NAME, Value::str(&diff.table_name));
    map.insert(KEY_DIFF_TYPE, Value::str(diff.diff_type.code()));
    for pair in &diff.attributes {
        map.insert(&pair.attribute, Value::Map(pair_to_map(pair)));
    }
    if let Some(pk) = &diff.primary_key_diff {
        map.insert(KEY_PRIMARY_KEY_DIFF, Value::Map(element_diff_to_map(pk)));
    }
    insert_element_list(&mut map, KEY_UNIQUE_KEY_DIFF, &diff.unique_key_diffs);
    insert_element_list(&mut map, KEY_INDEX_DIFF, &diff.index_diffs);
    insert_element_list(&mut map, KEY_COLUMN_DIFF, &diff.column_diffs);
    map
}

fn insert_element_list(map: &mut MapValue, key: &str, diffs: &[ElementDiff]) {
    if diffs.is_empty() {
        return;
    }
    let items = diffs
        .iter()
        .map(|d| Value::Map(element_diff_to_map(d)))
        .collect();
    map.insert(key, Value::List(items));
}

fn element_diff_to_map(diff: &ElementDiff) -> MapValue {
    let mut map = MapValue::new();
    map.insert(KEY_KEY_NAME, Value::str(&diff.key_name));
    map.insert(KEY_DIFF_TYPE, Value::str(diff.diff_type.code()));
    for pair in &diff.pairs {
        map.insert(&pair.attribute, Value::Map(pair_to_map(pair)));
    }
    map
}

fn pair_to_map(pair: &NextPrevious) -> MapValue {
    let mut map = MapValue::new();
    map.insert(KEY_PREVIOUS, Value::str(&pair.previous));
    map.insert(KEY_NEXT, Value::str(&pair.next));
    map
}

pub fn schema_diff_from_value(root: &MapValue) -> Result<SchemaDiff, ShapeError> {
    let date_raw = root.required_str(KEY_DIFF_DATE)?;
    let diff_datetime =
        timestamp::parse_display(date_raw).map_err(|err| ShapeError::InvalidValue {
            key: KEY_DIFF_DATE.to_string(),
            reason: err.to_string(),
        })?;

    let mut table_diffs = Vec::new();
    if let Some(items) = root.opt_list(KEY_TABLE_DIFF)? {
        for item in items {
            let map = item.as_map().ok_or_else(|| ShapeError::WrongType {
                key: KEY_TABLE_DIFF.to_string(),
                expected: "map",
                found: item.type_name(),
            })?;
            table_diffs.push(table_diff_from_map(map)?);
        }
    }

    Ok(SchemaDiff {
        diff_datetime,
        table_diffs,
    })
}

fn table_diff_from_map(map: &MapValue) -> Result<TableDiff, ShapeError> {
    let table_name = map.required_str(KEY_TABLE_NAME)?.to_string();
    let diff_type = parse_diff_type(map)?;

    let mut diff = TableDiff {
        diff_type,
        table_name,
        attributes: Vec::new(),
        primary_key_diff: None,
        unique_key_diffs: Vec::new(),
        index_diffs: Vec::new(),
        column_diffs: Vec::new(),
    };

    for (key, value) in map.iter() {
        match key {
            KEY_TABLE_NAME | KEY_DIFF_TYPE => {}
            KEY_PRIMARY_KEY_DIFF => {
                let pk = value.as_map().ok_or_else(|| ShapeError::WrongType {
                    key: key.to_string(),
                    expected: "map",
                    found: value.type_name(),
                })?;
                diff.primary_key_diff = Some(element_diff_from_map(pk)?);
            }
            KEY_UNIQUE_KEY_DIFF => diff.unique_key_diffs = element_list_from_value(key, value)?,
            KEY_INDEX_DIFF => diff.index_diffs = element_list_from_value(key, value)?,
            KEY_COLUMN_DIFF => diff.column_diffs = element_list_from_value(key, value)?,
            attribute => diff.attributes.push(pair_from_value(attribute, value)?),
        }
    }
    Ok(diff)
}

fn element_list_from_value(key: &str, value: &Value) -> Result<Vec<ElementDiff>, ShapeError> {
    let items = value.as_list().ok_or_else(|| ShapeError::WrongType {
        key: key.to_string(),
        expected: "list",
        found: value.type_name(),
    })?;
    let mut diffs = Vec::with_capacity(items.len());
    for item in items {
        let map = item.as_map().ok_or_else(|| ShapeError::WrongType {
            key: key.to_string(),
            expected: "map",
            found: item.type_name(),
        })?;
        diffs.push(element_diff_from_map(map)?);
    }
    Ok(diffs)
}

fn element_diff_from_map(map: &MapValue) -> Result<ElementDiff, ShapeError> {
    let key_name = map.required_str(KEY_KEY_NAME)?.to_string();
    let diff_type = parse_diff_type(map)?;
    let mut pairs = Vec::new();
    for (key, value) in map.iter() {
        if key == KEY_KEY_NAME || key == KEY_DIFF_TYPE {
            continue;
        }
        pairs.push(pair_from_value(key, value)?);
    }
    Ok(ElementDiff {
        diff_type,
        key_name,
        pairs,
    })
}

fn parse_diff_type(map: &MapValue) -> Result<DiffType, ShapeError> {
    let code = map.required_str(KEY_DIFF_TYPE)?;
    DiffType::from_code(code).ok_or_else(|| ShapeError::InvalidValue {
        key: KEY_DIFF_TYPE.to_string(),
        reason: format!("unknown diff type '{code}'"),
    })
}

fn pair_from_value(attribute: &str, value: &Value) -> Result<NextPrevious, ShapeError> {
    let map = value.as_map().ok_or_else(|| ShapeError::WrongType {
        key: attribute.to_string(),
        expected: "map",
        found: value.type_name(),
    })?;
    Ok(NextPrevious {
        attribute: attribute.to_string(),
        previous: map.required_str(KEY_PREVIOUS)?.to_string(),
        next: map.required_str(KEY_NEXT)?.to_string(),
    })
}
