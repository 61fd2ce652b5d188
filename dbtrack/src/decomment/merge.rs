//! Conflict resolution: fold pieces and mapping overrides into a pickup.

use chrono::NaiveDateTime;

use super::mapping::DecommentMapping;
use super::piece::{DecommentPiece, FORMAT_VERSION};
use super::pickup::{DecommentPickup, DecommentProperty, PickupColumn, PickupTable};

/// Merge engine for the decomment stream.
///
/// Pure function of its inputs plus the injected clock; no file I/O and no
/// hidden state, so every conflict scenario is testable in memory.
pub struct DecommentMerger<C>
where
    C: Fn() -> NaiveDateTime,
{
    clock: C,
}

impl<C> DecommentMerger<C>
where
    C: Fn() -> NaiveDateTime,
{
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Produce the next pickup from the previous one, new pieces, and
    /// mapping overrides.
    ///
    /// Mappings re-key existing entries first; pieces then fold in, in
    /// file-read order, each replacing the current entry for its identity
    /// (last writer wins). Untouched entries keep their relative order; new
    /// identities append at the end.
    pub fn merge(
        &self,
        existing: Option<DecommentPickup>,
        pieces: &[DecommentPiece],
        mappings: &[DecommentMapping],
    ) -> DecommentPickup {
        let mut tables = existing.map(|p| p.tables).unwrap_or_default();

        for mapping in mappings {
            apply_mapping(&mut tables, mapping);
        }
        for piece in pieces {
            apply_piece(&mut tables, piece);
        }
        // Mappings can drain a table entry completely; drop the shells.
        tables.retain(|t| !t.is_empty());

        DecommentPickup {
            format_version: FORMAT_VERSION.to_string(),
            pickup_datetime: (self.clock)(),
            tables,
        }
    }
}

fn apply_piece(tables: &mut Vec<PickupTable>, piece: &DecommentPiece) {
    let property = DecommentProperty::from_piece(piece);
    let table = find_or_append_table(tables, &piece.table_name);
    match &piece.column_name {
        None => table.properties = vec![property],
        Some(column_name) => {
            let column = find_or_append_column(table, column_name);
            column.properties = vec![property];
        }
    }
}

fn apply_mapping(tables: &mut Vec<PickupTable>, mapping: &DecommentMapping) {
    match &mapping.old_column_name {
        Some(old_column) => {
            let Some(properties) = take_column_properties(tables, &mapping.old_table_name, old_column)
            else {
                return;
            };
            let new_column = mapping
                .new_column_name
                .clone()
                .unwrap_or_else(|| old_column.clone());
            let table = find_or_append_table(tables, &mapping.new_table_name);
            find_or_append_column(table, &new_column).properties = properties;
        }
        None => {
            let Some(index) = tables
                .iter()
                .position(|t| t.table_name == mapping.old_table_name)
            else {
                return;
            };
            let moved = tables.remove(index);
            match &mapping.new_column_name {
                // Table-level comments re-homed onto a column of the new table.
                Some(new_column) => {
                    if !moved.properties.is_empty() {
                        let table = find_or_append_table(tables, &mapping.new_table_name);
                        find_or_append_column(table, new_column).properties = moved.properties;
                    }
                }
                // Plain table rename: the whole entry follows the new name.
                None => match tables
                    .iter_mut()
                    .find(|t| t.table_name == mapping.new_table_name)
                {
                    Some(target) => {
                        if !moved.properties.is_empty() {
                            target.properties = moved.properties;
                        }
                        for column in moved.columns {
                            match target
                                .columns
                                .iter_mut()
                                .find(|c| c.column_name == column.column_name)
                            {
                                Some(existing) => *existing = column,
                                None => target.columns.push(column),
                            }
                        }
                    }
                    None => {
                        let mut renamed = moved;
                        renamed.table_name = mapping.new_table_name.clone();
                        tables.insert(index, renamed);
                    }
                },
            }
        }
    }
}

fn take_column_properties(
    tables: &mut Vec<PickupTable>,
    table_name: &str,
    column_name: &str,
) -> Option<Vec<DecommentProperty>> {
    let table = tables.iter_mut().find(|t| t.table_name == table_name)?;
    let index = table
        .columns
        .iter()
        .position(|c| c.column_name == column_name)?;
    Some(table.columns.remove(index).properties)
}

fn find_or_append_table<'a>(tables: &'a mut Vec<PickupTable>, name: &str) -> &'a mut PickupTable {
    let index = match tables.iter().position(|t| t.table_name == name) {
        Some(index) => index,
        None => {
            tables.push(PickupTable::new(name));
            tables.len() - 1
        }
    };
    &mut tables[index]
}

fn find_or_append_column<'a>(table: &'a mut PickupTable, name: &str) -> &'a mut PickupColumn {
    let index = match table.columns.iter().position(|c| c.column_name == name) {
        Some(index) => index,
        None => {
            table.columns.push(PickupColumn::new(name));
            table.columns.len() - 1
        }
    };
    &mut table.columns[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn fixed_clock() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 6)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap()
    }

    fn piece(table: &str, column: Option<&str>, text: &str, code: &str) -> DecommentPiece {
        DecommentPiece {
            table_name: table.to_string(),
            column_name: column.map(str::to_string),
            decomment: text.to_string(),
            database_comment: None,
            comment_version: 1,
            authors: vec!["cabos".to_string()],
            piece_code: code.to_string(),
            piece_datetime: NaiveDate::from_ymd_opt(2026, 8, 5)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            piece_owner: "cabos".to_string(),
            previous_pieces: Vec::new(),
        }
    }

    fn mapping(
        old: (&str, Option<&str>),
        new: (&str, Option<&str>),
    ) -> DecommentMapping {
        DecommentMapping {
            old_table_name: old.0.to_string(),
            old_column_name: old.1.map(str::to_string),
            new_table_name: new.0.to_string(),
            new_column_name: new.1.map(str::to_string),
            authors: vec!["hadem".to_string()],
            mapping_code: "MP00XX11".to_string(),
            mapping_datetime: fixed_clock(),
            mapping_owner: "hadem".to_string(),
        }
    }

    fn merger() -> DecommentMerger<fn() -> NaiveDateTime> {
        DecommentMerger::new(fixed_clock)
    }

    #[test]
    fn test_first_run_with_nothing_yields_empty_pickup() {
        let merged = merger().merge(None, &[], &[]);
        assert!(merged.is_empty());
        assert_eq!(merged.pickup_datetime, fixed_clock());
    }

    #[test]
    fn test_merge_without_input_is_idempotent() {
        let base = merger().merge(
            None,
            &[
                piece("MEMBER", None, "Core table.", "AA00AA00"),
                piece("MEMBER", Some("MEMBER_NAME"), "Display name.", "BB11BB11"),
            ],
            &[],
        );
        let remerged = merger().merge(Some(base.clone()), &[], &[]);
        assert_eq!(remerged.tables, base.tables);
        assert_eq!(remerged.pickup_datetime, fixed_clock());
    }

    #[test]
    fn test_later_piece_replaces_same_identity() {
        let base = merger().merge(
            None,
            &[piece("MEMBER", Some("MEMBER_NAME"), "Old text.", "AA00AA00")],
            &[],
        );
        let merged = merger().merge(
            Some(base),
            &[piece("MEMBER", Some("MEMBER_NAME"), "New text.", "BB11BB11")],
            &[],
        );

        assert_eq!(merged.tables.len(), 1);
        let column = &merged.tables[0].columns[0];
        assert_eq!(column.properties.len(), 1);
        assert_eq!(column.properties[0].decomment, "New text.");
        assert_eq!(column.properties[0].piece_code, "BB11BB11");
    }

    #[test]
    fn test_last_writer_wins_within_one_run() {
        let merged = merger().merge(
            None,
            &[
                piece("MEMBER", None, "First.", "AA00AA00"),
                piece("MEMBER", None, "Second.", "BB11BB11"),
            ],
            &[],
        );
        assert_eq!(merged.tables[0].properties[0].decomment, "Second.");
    }

    #[test]
    fn test_untouched_entries_keep_relative_order() {
        let base = merger().merge(
            None,
            &[
                piece("MEMBER", None, "m", "AA00AA00"),
                piece("PRODUCT", None, "p", "BB11BB11"),
                piece("PURCHASE", None, "pc", "CC22CC22"),
            ],
            &[],
        );
        let merged = merger().merge(
            Some(base),
            &[
                piece("PRODUCT", None, "updated", "DD33DD33"),
                piece("MEMBER_STATUS", None, "new table", "EE44EE44"),
            ],
            &[],
        );

        let names: Vec<&str> = merged.tables.iter().map(|t| t.table_name.as_str()).collect();
        assert_eq!(names, vec!["MEMBER", "PRODUCT", "PURCHASE", "MEMBER_STATUS"]);
        assert_eq!(merged.tables[1].properties[0].decomment, "updated");
    }

    #[test]
    fn test_table_mapping_moves_whole_entry() {
        let base = merger().merge(
            None,
            &[
                piece("MEMBER_LOGIN", None, "login history", "AA00AA00"),
                piece("MEMBER_LOGIN", Some("LOGIN_DATETIME"), "when", "BB11BB11"),
            ],
            &[],
        );
        let merged = merger().merge(
            Some(base),
            &[],
            &[mapping(("MEMBER_LOGIN", None), ("MEMBER_SIGNIN", None))],
        );

        assert_eq!(merged.tables.len(), 1);
        let table = &merged.tables[0];
        assert_eq!(table.table_name, "MEMBER_SIGNIN");
        assert_eq!(table.properties[0].decomment, "login history");
        assert_eq!(table.columns[0].column_name, "LOGIN_DATETIME");
    }

    #[test]
    fn test_column_mapping_rekeys_within_table() {
        let base = merger().merge(
            None,
            &[piece("MEMBER", Some("MEMBER_NAME"), "Display name.", "AA00AA00")],
            &[],
        );
        let merged = merger().merge(
            Some(base),
            &[],
            &[mapping(
                ("MEMBER", Some("MEMBER_NAME")),
                ("MEMBER", Some("MEMBER_FULL_NAME")),
            )],
        );

        let table = &merged.tables[0];
        assert_eq!(table.columns.len(), 1);
        assert_eq!(table.columns[0].column_name, "MEMBER_FULL_NAME");
        assert_eq!(table.columns[0].properties[0].decomment, "Display name.");
    }

    #[test]
    fn test_mapping_to_unknown_identity_is_a_no_op() {
        let base = merger().merge(None, &[piece("MEMBER", None, "m", "AA00AA00")], &[]);
        let merged = merger().merge(
            Some(base.clone()),
            &[],
            &[mapping(("GHOST", None), ("PHANTOM", None))],
        );
        assert_eq!(merged.tables, base.tables);
    }

    #[test]
    fn test_piece_after_mapping_wins_over_moved_content() {
        let base = merger().merge(
            None,
            &[piece("MEMBER_LOGIN", None, "old text", "AA00AA00")],
            &[],
        );
        let merged = merger().merge(
            Some(base),
            &[piece("MEMBER_SIGNIN", None, "fresh text", "BB11BB11")],
            &[mapping(("MEMBER_LOGIN", None), ("MEMBER_SIGNIN", None))],
        );

        assert_eq!(merged.tables.len(), 1);
        assert_eq!(merged.tables[0].properties[0].decomment, "fresh text");
    }
}
