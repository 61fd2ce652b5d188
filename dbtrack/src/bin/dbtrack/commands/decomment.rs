use anyhow::{Context, Result};
use clap::Subcommand;

use dbtrack::decomment::{
    DecommentMapping, DecommentPaths, DecommentPickupProcess, DecommentPiece, stamp_mapping,
    stamp_piece,
};
use dbtrack::piecefile;
use dbtrack::timestamp;

use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Contribute",
        commands: &[
            "dbtrack decomment add MEMBER --comment \"Core table of the service.\"",
            "dbtrack decomment add MEMBER --column MEMBER_NAME --comment \"Shown on the profile page.\"",
        ],
    },
    ExampleGroup {
        title: "Follow Renames",
        commands: &[
            "dbtrack decomment map --old-table MEMBER_LOGIN --new-table MEMBER_SIGNIN",
        ],
    },
    ExampleGroup {
        title: "Consolidate",
        commands: &[
            "dbtrack decomment pickup          # Merge all pieces into the pickup file",
        ],
    },
];

#[derive(Subcommand)]
pub enum DecommentCommands {
    /// Stamp a comment piece for a table or column
    #[command(name = "add")]
    Add {
        /// Target table name
        table: String,

        /// Target column name (table-level comment if omitted)
        #[arg(long)]
        column: Option<String>,

        /// Comment text
        #[arg(long)]
        comment: String,

        /// Author name (defaults to configured author)
        #[arg(long)]
        author: Option<String>,

        /// Piece codes this comment supersedes
        #[arg(long = "previous")]
        previous_pieces: Vec<String>,
    },

    /// Stamp a mapping override that re-keys existing comments
    #[command(name = "map")]
    Map {
        /// Table the comments are currently keyed by
        #[arg(long)]
        old_table: String,

        /// Column the comments are currently keyed by
        #[arg(long)]
        old_column: Option<String>,

        /// Table the comments should follow
        #[arg(long)]
        new_table: String,

        /// Column the comments should follow
        #[arg(long)]
        new_column: Option<String>,

        /// Author name (defaults to configured author)
        #[arg(long)]
        author: Option<String>,
    },

    /// Merge all pending pieces and mappings into the pickup file
    #[command(name = "pickup")]
    Pickup,
}

pub fn handle_decomment_commands(
    command: DecommentCommands,
    output: &OutputManager,
) -> Result<()> {
    let ctx = ProjectContext::find()?;

    if !ctx.is_initialized() {
        output.error("dbtrack is not initialized in this project.");
        output.info("Run 'dbtrack init' first to initialize.");
        anyhow::bail!("Project not initialized");
    }

    let paths = DecommentPaths::under(&ctx.decomment_dir);

    match command {
        DecommentCommands::Add {
            table,
            column,
            comment,
            author,
            previous_pieces,
        } => {
            let owner = resolve_author(&ctx, author)?;
            let piece = DecommentPiece {
                table_name: table,
                column_name: column,
                decomment: comment,
                database_comment: None,
                comment_version: 1,
                authors: vec![owner.clone()],
                piece_code: piecefile::generate_code(),
                piece_datetime: timestamp::system_clock(),
                piece_owner: owner,
                previous_pieces,
            };
            let path = stamp_piece(&paths.piece_dir, &piece)
                .with_context(|| format!("Failed to stamp piece for {}", piece.target_display()))?;
            output.success(&format!("Stamped decomment for {}", piece.target_display()));
            output.verbose(&format!("Piece file: {}", path.display()));
        }
        DecommentCommands::Map {
            old_table,
            old_column,
            new_table,
            new_column,
            author,
        } => {
            let owner = resolve_author(&ctx, author)?;
            let mapping = DecommentMapping {
                old_table_name: old_table,
                old_column_name: old_column,
                new_table_name: new_table,
                new_column_name: new_column,
                authors: vec![owner.clone()],
                mapping_code: piecefile::generate_code(),
                mapping_datetime: timestamp::system_clock(),
                mapping_owner: owner,
            };
            let path = stamp_mapping(&paths.mapping_dir, &mapping)
                .context("Failed to stamp mapping override")?;
            output.success(&format!(
                "Stamped mapping {} -> {}",
                mapping.old_table_name, mapping.new_table_name
            ));
            output.verbose(&format!("Mapping file: {}", path.display()));
        }
        DecommentCommands::Pickup => {
            let process = DecommentPickupProcess::new(paths.clone(), timestamp::system_clock);
            let merged = process.run().context("Decomment pickup failed")?;
            if merged.is_empty() {
                output.info("Nothing to pick up: no pieces and no existing pickup.");
            } else {
                output.success(&format!(
                    "Picked up decomments for {} table(s) at {}",
                    merged.tables.len(),
                    timestamp::format_display(merged.pickup_datetime),
                ));
                output.verbose(&format!("Pickup file: {}", paths.pickup_file.display()));
            }
        }
    }

    Ok(())
}

pub fn resolve_author(ctx: &ProjectContext, flag: Option<String>) -> Result<String> {
    match flag {
        Some(author) => Ok(author),
        None => ctx.author(),
    }
}
