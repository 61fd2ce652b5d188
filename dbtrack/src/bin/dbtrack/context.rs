use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project context for dbtrack operations
pub struct ProjectContext {
    /// Root directory of the project (where .dbtrack lives)
    pub project_root: PathBuf,
    /// Path to .dbtrack directory
    pub dbtrack_dir: PathBuf,
    /// Path to config file
    pub config_path: PathBuf,
    /// Path to schema snapshot/history directory
    pub schema_dir: PathBuf,
    /// Path to decomment store
    pub decomment_dir: PathBuf,
    /// Path to hacomment store
    pub hacomment_dir: PathBuf,
    /// Loaded configuration
    pub config: Option<DbtrackConfig>,
}

/// Configuration stored in .dbtrack/config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DbtrackConfig {
    #[serde(default)]
    pub dbtrack: DbtrackSettings,
    #[serde(default)]
    pub author: AuthorSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbtrackSettings {
    #[serde(default = "default_schema_dir")]
    pub schema_dir: String,
    #[serde(default = "default_decomment_dir")]
    pub decomment_dir: String,
    #[serde(default = "default_hacomment_dir")]
    pub hacomment_dir: String,
}

impl Default for DbtrackSettings {
    fn default() -> Self {
        Self {
            schema_dir: default_schema_dir(),
            decomment_dir: default_decomment_dir(),
            hacomment_dir: default_hacomment_dir(),
        }
    }
}

fn default_schema_dir() -> String {
    ".dbtrack/schema".to_string()
}

fn default_decomment_dir() -> String {
    ".dbtrack/decomment".to_string()
}

fn default_hacomment_dir() -> String {
    ".dbtrack/hacomment".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorSettings {
    #[serde(default = "default_author")]
    pub name: String,
}

impl Default for AuthorSettings {
    fn default() -> Self {
        Self {
            name: default_author(),
        }
    }
}

fn default_author() -> String {
    "${DBTRACK_AUTHOR}".to_string()
}

/// File name of the diff history kept under the schema directory.
pub const HISTORY_FILE_NAME: &str = "diff-history.dfmap";

impl ProjectContext {
    /// Find and load project context from current directory or ancestors
    pub fn find() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::find_from(&current_dir)
    }

    /// Find project context starting from the given directory
    pub fn find_from(start: &Path) -> Result<Self> {
        let project_root = Self::find_project_root(start);
        Self::from_root(project_root)
    }

    /// Create context from a known project root
    pub fn from_root(project_root: PathBuf) -> Result<Self> {
        let dbtrack_dir = project_root.join(".dbtrack");
        let config_path = dbtrack_dir.join("config.toml");

        // Load config if it exists
        let config = if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).context("Failed to read config.toml")?;
            let config: DbtrackConfig =
                toml::from_str(&content).context("Failed to parse config.toml")?;
            Some(config)
        } else {
            None
        };

        let settings = config
            .as_ref()
            .map(|c| c.dbtrack.clone())
            .unwrap_or_default();

        Ok(Self {
            schema_dir: project_root.join(&settings.schema_dir),
            decomment_dir: project_root.join(&settings.decomment_dir),
            hacomment_dir: project_root.join(&settings.hacomment_dir),
            project_root,
            dbtrack_dir,
            config_path,
            config,
        })
    }

    /// Find project root by looking for a .dbtrack directory.
    ///
    /// Falls back to the start directory when no ancestor carries one, so
    /// `init` can bootstrap a fresh project in place.
    fn find_project_root(start: &Path) -> PathBuf {
        let mut current = start.to_path_buf();
        loop {
            if current.join(".dbtrack").exists() {
                return current;
            }
            if !current.pop() {
                return start.to_path_buf();
            }
        }
    }

    /// Check if dbtrack is initialized in this project
    pub fn is_initialized(&self) -> bool {
        self.dbtrack_dir.exists() && self.config_path.exists()
    }

    /// Path of the diff history file
    pub fn history_path(&self) -> PathBuf {
        self.schema_dir.join(HISTORY_FILE_NAME)
    }

    /// Resolve the author name for stamped pieces.
    ///
    /// Priority: configured name (with `${VAR}` expansion), then the
    /// DBTRACK_AUTHOR and USER environment variables.
    pub fn author(&self) -> Result<String> {
        let configured = self
            .config
            .as_ref()
            .map(|c| c.author.name.as_str())
            .unwrap_or("${DBTRACK_AUTHOR}");

        if let Some(var_name) = configured
            .strip_prefix("${")
            .and_then(|rest| rest.strip_suffix('}'))
        {
            std::env::var(var_name)
                .or_else(|_| std::env::var("USER"))
                .with_context(|| {
                    format!("Neither {var_name} nor USER is set; pass --author or configure [author]")
                })
        } else {
            Ok(configured.to_string())
        }
    }
}
