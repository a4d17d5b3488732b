use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Default desired-state file for `apply`, `diff` and `get`
pub const DEFAULT_VARFILE: &str = ".gitlab-ci-var.yaml";

#[derive(Parser)]
#[command(name = "civars")]
#[command(version)]
#[command(about = "Declarative management of GitLab CI/CD variables", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// GitLab project ID or URL-encoded path
    #[arg(short, long, env = "GITLAB_PROJECT_ID", global = true)]
    pub project: Option<String>,

    /// Personal access token with the 'api' scope
    #[arg(
        short,
        long,
        env = "GITLAB_TOKEN",
        global = true,
        hide_env_values = true
    )]
    pub token: Option<String>,

    /// Base URL of the GitLab v4 API
    #[arg(long, env = "GITLAB_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Desired-state file read by apply and diff
    #[arg(short, long, global = true, default_value = DEFAULT_VARFILE)]
    pub import: PathBuf,

    /// File written by get and init
    #[arg(short = 'o', long, global = true, default_value = DEFAULT_VARFILE)]
    pub export: PathBuf,

    /// Config file with default project, token and API URL
    #[arg(long, env = "CIVARS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Make the project's variables match the desired-state file
    Apply(ApplyArgs),

    /// Preview what apply would change
    Diff,

    /// Write the project's current variables to the export file
    Get,

    /// Write env_var variables of one scope as a dotenv file
    Env(EnvArgs),

    /// Write a sample desired-state file
    Init(InitArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct EnvArgs {
    /// Environment scope to export; '*' variables are always included
    #[arg(short, long, default_value = reconcile::ALL_ENVIRONMENTS)]
    pub scope: String,

    /// Prefix stripped from variable keys
    #[arg(long, default_value = crate::dotenv::DEFAULT_PREFIX)]
    pub prefix: String,

    /// Dotenv file to write
    #[arg(long, default_value = ".env")]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing file without asking
    #[arg(short, long)]
    pub force: bool,
}
