use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Table};
use serde::Serialize;

use dbtrack::diff::DiffHistory;

use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputManager, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Diff History",
    commands: &[
        "dbtrack history                   # List recorded diffs, most recent first",
        "dbtrack history --limit 5         # Only the five most recent entries",
    ],
}];

#[derive(Args)]
pub struct HistoryArgs {
    /// Show at most this many entries
    #[arg(long)]
    pub limit: Option<usize>,
}

pub fn handle_history(args: HistoryArgs, output: &OutputManager) -> Result<()> {
    let ctx = ProjectContext::find()?;

    if !ctx.is_initialized() {
        output.error("dbtrack is not initialized in this project.");
        output.info("Run 'dbtrack init' first to initialize.");
        anyhow::bail!("Project not initialized");
    }

    let history_path = ctx.history_path();
    let history = DiffHistory::load(&history_path)
        .with_context(|| format!("Failed to load history {}", history_path.display()))?;

    output.heading("Diff History");

    if history.is_empty() {
        output.info("No diffs recorded yet. Use 'dbtrack diff --record' to add one.");
        return Ok(());
    }

    let limit = args.limit.unwrap_or(usize::MAX);
    let mut rows = Vec::new();
    for entry in history.entries().iter().take(limit) {
        let diff = entry
            .schema_diff()
            .with_context(|| format!("Corrupt history entry '{}'", entry.datetime))?;
        rows.push(HistoryRow {
            datetime: entry.datetime.clone(),
            added: diff.added_count(),
            changed: diff.changed_count(),
            deleted: diff.deleted_count(),
        });
    }

    let report = HistoryReport { entries: rows };
    output.display(&report)?;
    Ok(())
}

#[derive(Serialize)]
pub struct HistoryReport {
    pub entries: Vec<HistoryRow>,
}

#[derive(Serialize)]
pub struct HistoryRow {
    pub datetime: String,
    pub added: usize,
    pub changed: usize,
    pub deleted: usize,
}

impl TableDisplay for HistoryReport {
    fn to_table(&self, _options: &GlobalOptions) -> Table {
        let mut table = Table::new();
        table.set_header(vec!["Recorded", "Added", "Changed", "Deleted"]);
        for row in &self.entries {
            table.add_row(vec![
                Cell::new(&row.datetime),
                Cell::new(row.added),
                Cell::new(row.changed),
                Cell::new(row.deleted),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        format!("{} recorded diff(s)", self.entries.len())
    }
}
