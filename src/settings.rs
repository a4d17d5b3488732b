//! Run-wide settings
//!
//! Flags and environment variables win over the config file, which wins over
//! built-in defaults. The result is one immutable [`Settings`] value built at
//! startup and passed by reference to every command.
//!
//! The config file is optional and lives at `~/.config/civars/config.toml`
//! unless `--config` / `CIVARS_CONFIG` points elsewhere:
//!
//! ```toml
//! project = "1234"
//! token = "glpat-xxxx"
//! api_url = "https://gitlab.example.com/api/v4"
//! timeout_secs = 60
//! ```

use anyhow::{Context, Result};
use gitlab::{ClientConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Cli;

/// Defaults read from the config file
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub project: Option<String>,
    pub token: Option<String>,
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Load the config file
    ///
    /// A missing file at the default location is not an error; a missing
    /// file the operator named explicitly is.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let (path, required) = match explicit {
            Some(path) => (expand(&path.to_string_lossy()), true),
            None => match default_config_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            if required {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            log::debug!("No config file at {}", path.display());
            return Ok(Self::default());
        }

        log::debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }
}

/// Immutable settings for one run
#[derive(Clone)]
pub struct Settings {
    pub project: Option<String>,
    pub token: Option<String>,
    pub api_url: String,
    pub timeout: Duration,
    pub import: PathBuf,
    pub export: PathBuf,
}

impl Settings {
    /// Resolve settings from the command line and the config file
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = FileConfig::load(cli.config.as_deref())?;
        Ok(Self::resolve(cli, file))
    }

    fn resolve(cli: &Cli, file: FileConfig) -> Self {
        let timeout = cli
            .timeout
            .or(file.timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        Self {
            project: cli.project.clone().or(file.project),
            token: cli.token.clone().or(file.token),
            api_url: cli
                .api_url
                .clone()
                .or(file.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            timeout,
            import: expand(&cli.import.to_string_lossy()),
            export: expand(&cli.export.to_string_lossy()),
        }
    }

    /// Client settings for commands that talk to GitLab
    ///
    /// Fails before any request is made when the project or token is missing.
    pub fn remote(&self) -> gitlab::Result<ClientConfig> {
        let config = ClientConfig::new(
            self.project.clone().unwrap_or_default(),
            self.token.clone().unwrap_or_default(),
        )
        .with_api_url(self.api_url.clone())
        .with_timeout(self.timeout);
        config.validate()?;
        Ok(config)
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("project", &self.project)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .field("import", &self.import)
            .field("export", &self.export)
            .finish()
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("civars").join("config.toml"))
}

/// Expand `~` and environment variables in a path
fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}
