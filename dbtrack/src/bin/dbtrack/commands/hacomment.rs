use anyhow::{Context, Result};
use clap::Subcommand;

use dbtrack::hacomment::{HacommentPaths, HacommentPickupProcess, HacommentPiece, stamp_piece};
use dbtrack::piecefile;
use dbtrack::timestamp;

use crate::commands::decomment::resolve_author;
use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Contribute",
        commands: &[
            "dbtrack hacomment add PURCHASE --comment \"Denormalized on purpose.\"",
            "dbtrack hacomment add PURCHASE --column PURCHASE_PRICE --comment \"Tax included.\"",
        ],
    },
    ExampleGroup {
        title: "Consolidate",
        commands: &[
            "dbtrack hacomment pickup          # Merge all pieces into the pickup file",
        ],
    },
];

#[derive(Subcommand)]
pub enum HacommentCommands {
    /// Stamp an annotation piece for a table or column
    #[command(name = "add")]
    Add {
        /// Target table name
        table: String,

        /// Target column name (table-level annotation if omitted)
        #[arg(long)]
        column: Option<String>,

        /// Annotation text
        #[arg(long)]
        comment: String,

        /// Author name (defaults to configured author)
        #[arg(long)]
        author: Option<String>,
    },

    /// Merge all pending pieces into the pickup file
    #[command(name = "pickup")]
    Pickup,
}

pub fn handle_hacomment_commands(
    command: HacommentCommands,
    output: &OutputManager,
) -> Result<()> {
    let ctx = ProjectContext::find()?;

    if !ctx.is_initialized() {
        output.error("dbtrack is not initialized in this project.");
        output.info("Run 'dbtrack init' first to initialize.");
        anyhow::bail!("Project not initialized");
    }

    let paths = HacommentPaths::under(&ctx.hacomment_dir);

    match command {
        HacommentCommands::Add {
            table,
            column,
            comment,
            author,
        } => {
            let owner = resolve_author(&ctx, author)?;
            let piece = HacommentPiece {
                table_name: table,
                column_name: column,
                comment,
                authors: vec![owner.clone()],
                piece_code: piecefile::generate_code(),
                piece_datetime: timestamp::system_clock(),
                piece_owner: owner,
            };
            let path = stamp_piece(&paths.piece_dir, &piece)
                .with_context(|| format!("Failed to stamp piece for {}", piece.target_display()))?;
            output.success(&format!("Stamped hacomment for {}", piece.target_display()));
            output.verbose(&format!("Piece file: {}", path.display()));
        }
        HacommentCommands::Pickup => {
            let process = HacommentPickupProcess::new(paths.clone(), timestamp::system_clock);
            let merged = process.run().context("Hacomment pickup failed")?;
            if merged.is_empty() {
                output.info("Nothing to pick up: no pieces and no existing pickup.");
            } else {
                output.success(&format!(
                    "Picked up {} annotation(s) at {}",
                    merged.entries.len(),
                    timestamp::format_display(merged.pickup_datetime),
                ));
                output.verbose(&format!("Pickup file: {}", paths.pickup_file.display()));
            }
        }
    }

    Ok(())
}
