use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Table};
use serde::Serialize;

use dbtrack::diff::{DiffHistory, DiffType, ElementDiff, SchemaDiff, diff_schemas};
use dbtrack::schema::load_snapshot;
use dbtrack::timestamp;

use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputManager, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Compare Snapshots",
        commands: &[
            "dbtrack diff previous.json next.json           # Show structural differences",
            "dbtrack diff previous.json next.json --record  # Also prepend to diff history",
        ],
    },
    ExampleGroup {
        title: "Scripting",
        commands: &[
            "dbtrack --output json diff previous.json next.json   # Machine-readable report",
        ],
    },
];

#[derive(Args)]
pub struct DiffArgs {
    /// Snapshot file of the previous schema state
    pub previous: PathBuf,

    /// Snapshot file of the next schema state
    pub next: PathBuf,

    /// Record the diff in the project's history file
    #[arg(long)]
    pub record: bool,
}

pub fn handle_diff(args: DiffArgs, output: &OutputManager) -> Result<()> {
    let previous = load_snapshot(&args.previous)?;
    let next = load_snapshot(&args.next)?;

    let diff = diff_schemas(&previous, &next, timestamp::system_clock())?;

    let report = DiffReport::from_diff(&diff);
    output.heading("Schema Diff");
    output.display(&report)?;

    if !diff.has_diff() {
        output.success("No structural differences.");
    }

    if args.record {
        if !diff.has_diff() {
            output.info("Nothing to record: the snapshots are structurally identical.");
            return Ok(());
        }
        let ctx = ProjectContext::find()?;
        if !ctx.is_initialized() {
            output.error("dbtrack is not initialized in this project.");
            output.info("Run 'dbtrack init' first to initialize.");
            anyhow::bail!("Project not initialized");
        }
        let history_path = ctx.history_path();
        let mut history = DiffHistory::load(&history_path)
            .with_context(|| format!("Failed to load history {}", history_path.display()))?;
        history.prepend(&diff)?;
        history.save()?;
        output.success(&format!(
            "Recorded diff at {} ({} entries total)",
            timestamp::format_display(diff.diff_datetime),
            history.len(),
        ));
    }

    Ok(())
}

/// Flattened view of one schema diff for display.
#[derive(Serialize)]
pub struct DiffReport {
    pub diff_datetime: String,
    pub added: usize,
    pub changed: usize,
    pub deleted: usize,
    pub tables: Vec<TableRow>,
}

#[derive(Serialize)]
pub struct TableRow {
    pub table: String,
    pub diff_type: String,
    pub details: Vec<String>,
}

impl DiffReport {
    pub fn from_diff(diff: &SchemaDiff) -> Self {
        Self {
            diff_datetime: timestamp::format_display(diff.diff_datetime),
            added: diff.added_count(),
            changed: diff.changed_count(),
            deleted: diff.deleted_count(),
            tables: diff
                .table_diffs
                .iter()
                .map(|table| TableRow {
                    table: table.table_name.clone(),
                    diff_type: table.diff_type.code().to_string(),
                    details: table_details(table),
                })
                .collect(),
        }
    }
}

fn table_details(table: &dbtrack::diff::TableDiff) -> Vec<String> {
    let mut details = Vec::new();
    for pair in &table.attributes {
        details.push(format!(
            "{}: {} -> {}",
            pair.attribute, pair.previous, pair.next
        ));
    }
    if let Some(pk) = &table.primary_key_diff {
        details.push(element_detail("primary key", pk));
    }
    for diff in &table.unique_key_diffs {
        details.push(element_detail("unique key", diff));
    }
    for diff in &table.index_diffs {
        details.push(element_detail("index", diff));
    }
    for diff in &table.column_diffs {
        details.push(element_detail("column", diff));
    }
    details
}

fn element_detail(kind: &str, diff: &ElementDiff) -> String {
    match diff.diff_type {
        DiffType::Add => format!("{kind} {} added", diff.key_name),
        DiffType::Delete => format!("{kind} {} deleted", diff.key_name),
        DiffType::Change => {
            let pairs: Vec<String> = diff
                .pairs
                .iter()
                .map(|p| format!("{} {} -> {}", p.attribute, p.previous, p.next))
                .collect();
            format!("{kind} {}: {}", diff.key_name, pairs.join(", "))
        }
    }
}

impl TableDisplay for DiffReport {
    fn to_table(&self, _options: &GlobalOptions) -> Table {
        let mut table = Table::new();
        table.set_header(vec!["Table", "Type", "Changes"]);
        for row in &self.tables {
            table.add_row(vec![
                Cell::new(&row.table),
                Cell::new(&row.diff_type),
                Cell::new(row.details.join("\n")),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        format!(
            "{} added, {} changed, {} deleted",
            self.added, self.changed, self.deleted
        )
    }
}
