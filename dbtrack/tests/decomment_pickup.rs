//! End-to-end decomment pickup runs against a real directory.

use chrono::{NaiveDate, NaiveDateTime};

use dbtrack::decomment::{
    DecommentMapping, DecommentPaths, DecommentPickupProcess, DecommentPiece, stamp_mapping,
    stamp_piece,
};

fn fixed_clock() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 8, 6)
        .unwrap()
        .and_hms_opt(20, 0, 0)
        .unwrap()
}

fn piece_at(
    table: &str,
    column: Option<&str>,
    text: &str,
    code: &str,
    minute: u32,
) -> DecommentPiece {
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
            .and_hms_opt(9, minute, 0)
            .unwrap(),
        piece_owner: "cabos".to_string(),
        previous_pieces: Vec::new(),
    }
}

fn store() -> (tempfile::TempDir, DecommentPaths) {
    let dir = tempfile::tempdir().unwrap();
    let paths = DecommentPaths::under(dir.path());
    (dir, paths)
}

#[test]
fn pickup_consumes_pieces_and_writes_file() {
    let (_dir, paths) = store();
    stamp_piece(
        &paths.piece_dir,
        &piece_at("MEMBER", None, "Core table.", "AA00AA00", 0),
    )
    .unwrap();
    stamp_piece(
        &paths.piece_dir,
        &piece_at("MEMBER", Some("MEMBER_NAME"), "Display name.", "BB11BB11", 1),
    )
    .unwrap();

    let process = DecommentPickupProcess::new(paths.clone(), fixed_clock);
    let merged = process.run().unwrap();

    assert_eq!(merged.tables.len(), 1);
    assert!(paths.pickup_file.exists());
    let leftover: Vec<_> = std::fs::read_dir(&paths.piece_dir)
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert!(leftover.is_empty(), "pieces must be consumed");
}

#[test]
fn empty_run_writes_nothing() {
    let (_dir, paths) = store();
    let process = DecommentPickupProcess::new(paths.clone(), fixed_clock);
    let merged = process.run().unwrap();

    assert!(merged.is_empty());
    assert!(
        !paths.pickup_file.exists(),
        "an empty merge must not create a pickup file"
    );
}

#[test]
fn second_run_without_pieces_keeps_content() {
    let (_dir, paths) = store();
    stamp_piece(
        &paths.piece_dir,
        &piece_at("MEMBER", None, "Core table.", "AA00AA00", 0),
    )
    .unwrap();

    let process = DecommentPickupProcess::new(paths.clone(), fixed_clock);
    let first = process.run().unwrap();
    let second = process.run().unwrap();

    assert_eq!(second.tables, first.tables);
}

#[test]
fn later_piece_file_wins_for_same_identity() {
    let (_dir, paths) = store();
    // File names sort by datetime, so the later stamp reads second.
    stamp_piece(
        &paths.piece_dir,
        &piece_at("MEMBER", Some("MEMBER_NAME"), "Old text.", "AA00AA00", 0),
    )
    .unwrap();
    stamp_piece(
        &paths.piece_dir,
        &piece_at("MEMBER", Some("MEMBER_NAME"), "New text.", "BB11BB11", 5),
    )
    .unwrap();

    let merged = DecommentPickupProcess::new(paths, fixed_clock).run().unwrap();
    let column = &merged.tables[0].columns[0];
    assert_eq!(column.properties.len(), 1);
    assert_eq!(column.properties[0].decomment, "New text.");
}

#[test]
fn identical_directory_snapshots_produce_identical_output() {
    let (_dir_a, paths_a) = store();
    let (_dir_b, paths_b) = store();

    for paths in [&paths_a, &paths_b] {
        stamp_piece(
            &paths.piece_dir,
            &piece_at("PRODUCT", None, "Catalog table.", "AA00AA00", 0),
        )
        .unwrap();
        stamp_piece(
            &paths.piece_dir,
            &piece_at("MEMBER", Some("MEMBER_NAME"), "Display name.", "BB11BB11", 1),
        )
        .unwrap();
    }

    DecommentPickupProcess::new(paths_a.clone(), fixed_clock)
        .run()
        .unwrap();
    DecommentPickupProcess::new(paths_b.clone(), fixed_clock)
        .run()
        .unwrap();

    let bytes_a = std::fs::read(&paths_a.pickup_file).unwrap();
    let bytes_b = std::fs::read(&paths_b.pickup_file).unwrap();
    assert_eq!(bytes_a, bytes_b);
}

#[test]
fn mapping_files_are_consumed_and_applied() {
    let (_dir, paths) = store();
    stamp_piece(
        &paths.piece_dir,
        &piece_at("MEMBER_LOGIN", None, "Login history.", "AA00AA00", 0),
    )
    .unwrap();
    let process = DecommentPickupProcess::new(paths.clone(), fixed_clock);
    process.run().unwrap();

    stamp_mapping(
        &paths.mapping_dir,
        &DecommentMapping {
            old_table_name: "MEMBER_LOGIN".to_string(),
            old_column_name: None,
            new_table_name: "MEMBER_SIGNIN".to_string(),
            new_column_name: None,
            authors: vec!["hadem".to_string()],
            mapping_code: "MP00XX11".to_string(),
            mapping_datetime: fixed_clock(),
            mapping_owner: "hadem".to_string(),
        },
    )
    .unwrap();

    let merged = process.run().unwrap();
    assert_eq!(merged.tables.len(), 1);
    assert_eq!(merged.tables[0].table_name, "MEMBER_SIGNIN");

    let leftover: Vec<_> = std::fs::read_dir(&paths.mapping_dir)
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert!(leftover.is_empty(), "mappings must be consumed");
}

#[test]
fn malformed_piece_fails_the_whole_run_and_keeps_inputs() {
    let (_dir, paths) = store();
    let good = piece_at("MEMBER", None, "Fine.", "AA00AA00", 0);
    stamp_piece(&paths.piece_dir, &good).unwrap();

    let broken_name =
        "decomment-piece-MEMBER-on-20260805-091000000-cabos-ZZ99ZZ99.dfmap";
    std::fs::write(paths.piece_dir.join(broken_name), "map:{ ; no closing brace").unwrap();

    let process = DecommentPickupProcess::new(paths.clone(), fixed_clock);
    let err = process.run().unwrap_err();
    assert!(err.to_string().contains("ZZ99ZZ99"), "{err}");

    assert!(!paths.pickup_file.exists(), "no partial pickup may appear");
    let leftover = std::fs::read_dir(&paths.piece_dir).unwrap().count();
    assert_eq!(leftover, 2, "a failed run must leave every piece in place");
}

#[test]
fn unrecognized_file_name_fails_the_run() {
    let (_dir, paths) = store();
    std::fs::create_dir_all(&paths.piece_dir).unwrap();
    std::fs::write(paths.piece_dir.join("scratch.dfmap"), "map:{}").unwrap();

    let err = DecommentPickupProcess::new(paths, fixed_clock)
        .run()
        .unwrap_err();
    assert!(err.to_string().contains("scratch.dfmap"), "{err}");
}

#[test]
fn empty_comment_is_rejected_at_stamp_time() {
    let (_dir, paths) = store();
    let mut piece = piece_at("MEMBER", None, "  ", "AA00AA00", 0);
    piece.decomment = "   ".to_string();

    let err = stamp_piece(&paths.piece_dir, &piece).unwrap_err();
    assert!(err.to_string().contains("MEMBER"), "{err}");
    assert!(!paths.piece_dir.exists() || std::fs::read_dir(&paths.piece_dir).unwrap().count() == 0);
}
