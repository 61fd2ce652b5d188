use anyhow::{Context, Result};
use clap::Args;

use crate::context::{DbtrackConfig, ProjectContext};
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Initialize",
    commands: &[
        "dbtrack init                      # Create .dbtrack with default layout",
        "dbtrack init --force              # Rewrite config.toml with defaults",
    ],
}];

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing config.toml with defaults
    #[arg(long)]
    pub force: bool,
}

pub fn handle_init(args: InitArgs, output: &OutputManager) -> Result<()> {
    let ctx = ProjectContext::find()?;

    output.heading("Initialize dbtrack");

    if ctx.is_initialized() && !args.force {
        output.warning("dbtrack is already initialized in this project.");
        output.info("Use --force to rewrite config.toml with defaults.");
        return Ok(());
    }

    std::fs::create_dir_all(&ctx.dbtrack_dir).context("Failed to create .dbtrack directory")?;

    let config = DbtrackConfig::default();
    let rendered = toml::to_string_pretty(&config).context("Failed to render default config")?;
    std::fs::write(&ctx.config_path, rendered).context("Failed to write config.toml")?;

    // Pre-create the store layout so first stamps and pickups just work.
    let ctx = ProjectContext::from_root(ctx.project_root.clone())?;
    for dir in [
        ctx.schema_dir.clone(),
        ctx.decomment_dir.join("piece"),
        ctx.decomment_dir.join("mapping"),
        ctx.decomment_dir.join("pickup"),
        ctx.hacomment_dir.join("piece"),
        ctx.hacomment_dir.join("pickup"),
    ] {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    output.success(&format!(
        "Initialized dbtrack in {}",
        ctx.dbtrack_dir.display()
    ));
    output.bullet("Schema snapshots and diff history: .dbtrack/schema");
    output.bullet("Decomment pieces and pickup: .dbtrack/decomment");
    output.bullet("Hacomment pieces and pickup: .dbtrack/hacomment");
    Ok(())
}
