use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::Table;
use serde::Serialize;

use crate::theme::{ICONS, THEME};

/// Output format options for CLI commands
#[derive(Clone, Debug, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    /// Formatted table output (default)
    #[default]
    Table,
    /// JSON output for scripting
    Json,
    /// Compact single-line output
    Compact,
}

/// Global CLI options that affect output and behavior
#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
    pub no_color: bool,
}

/// Trait for data that can be displayed as a table
pub trait TableDisplay {
    fn to_table(&self, options: &GlobalOptions) -> Table;
    fn to_compact(&self) -> String;
}

/// Output manager handles formatting and display
pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    /// Display data according to the configured output format
    pub fn display<T>(&self, data: &T) -> Result<()>
    where
        T: Serialize + TableDisplay,
    {
        if self.options.quiet {
            return Ok(());
        }

        match self.options.output_format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(data)?;
                println!("{json}");
            }
            OutputFormat::Table => {
                let table = data.to_table(&self.options);
                println!("{table}");
            }
            OutputFormat::Compact => {
                println!("{}", data.to_compact());
            }
        }
        Ok(())
    }

    /// Display a success message with color and icon
    pub fn success(&self, message: &str) {
        if !self.options.quiet {
            println!("{}", self.styled(ICONS.success, message, THEME.success));
        }
    }

    /// Display an error message with color and icon
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.styled(ICONS.error, message, THEME.error));
    }

    /// Display a warning message
    pub fn warning(&self, message: &str) {
        if !self.options.quiet {
            println!("{}", self.styled(ICONS.warning, message, THEME.warning));
        }
    }

    /// Display an informational message
    pub fn info(&self, message: &str) {
        if !self.options.quiet {
            println!("{}", self.styled(ICONS.info, message, THEME.info));
        }
    }

    /// Display a section heading
    pub fn heading(&self, message: &str) {
        if !self.options.quiet {
            if self.options.no_color {
                println!("{message}");
            } else {
                println!("{}", message.color(THEME.highlight).bold());
            }
        }
    }

    /// Display an indented bullet line
    pub fn bullet(&self, message: &str) {
        if !self.options.quiet {
            if self.options.no_color {
                println!("  {} {message}", ICONS.bullet);
            } else {
                println!("  {} {message}", ICONS.bullet.color(THEME.muted));
            }
        }
    }

    /// Display a detail line only in verbose mode
    pub fn verbose(&self, message: &str) {
        if self.options.verbose && !self.options.quiet {
            if self.options.no_color {
                println!("  {message}");
            } else {
                println!("  {}", message.color(THEME.muted));
            }
        }
    }

    fn styled(&self, icon: &str, message: &str, color: colored::Color) -> String {
        if self.options.no_color {
            format!("{icon} {message}")
        } else {
            format!("{} {}", icon.color(color), message.color(color))
        }
    }
}
