//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Gitee / GitHub pull-request and issue browser
#[derive(Parser, Debug)]
#[command(name = "prforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (YAML)
    #[arg(short = 'S', long, global = true, env = "PRFORGE_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Server host or URL, overrides the account's and the settings' server
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Access token, used instead of a stored account token
    #[arg(long, global = true, env = "PRFORGE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Account to act as (default account when omitted)
    #[arg(short, long, global = true)]
    pub account: Option<String>,

    /// Accounts file (JSON)
    #[arg(long, global = true, env = "PRFORGE_ACCOUNTS")]
    pub accounts_file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the authenticated user
    Whoami,

    /// List repositories of the user, or of an organization
    Repos {
        /// Organization login
        #[arg(long)]
        org: Option<String>,
    },

    /// Show one repository
    Repo {
        /// `owner/name` or a git remote URL
        repo: String,
    },

    /// List branches of a repository
    Branches {
        /// `owner/name` or a git remote URL
        repo: String,
    },

    /// List issues of a repository
    Issues {
        /// `owner/name` or a git remote URL
        repo: String,

        /// Include closed issues
        #[arg(long)]
        closed: bool,

        /// Maximum number of issues
        #[arg(long, default_value = "100")]
        max: usize,

        /// Only issues assigned to this login
        #[arg(long)]
        assignee: Option<String>,
    },

    /// Search issues of a repository
    SearchIssues {
        /// `owner/name` or a git remote URL
        repo: String,

        /// Free-text search
        query: Option<String>,

        /// Include closed issues
        #[arg(long)]
        closed: bool,

        /// Only issues assigned to this login
        #[arg(long)]
        assignee: Option<String>,
    },

    /// List pull requests of a repository
    Pulls {
        /// `owner/name` or a git remote URL
        repo: String,

        /// Search filter, e.g. `state:open author:alice`
        #[arg(short, long, default_value = "state:open")]
        query: String,

        /// Maximum number of pages to load
        #[arg(long, default_value = "1")]
        pages: usize,
    },

    /// Show the timeline of a pull request
    Timeline {
        /// `owner/name` or a git remote URL
        repo: String,

        /// Pull request number
        number: u64,
    },

    /// Manage accounts
    Accounts {
        #[command(subcommand)]
        command: AccountCommand,
    },
}

/// Account subcommands
#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    /// List accounts
    List,

    /// Add an account; the token comes from `--token`
    Add {
        /// Login name
        name: String,
    },

    /// Remove an account
    Remove {
        /// Login name
        name: String,
    },

    /// Make an account the default
    Default {
        /// Login name
        name: String,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one value per line)
    Json,
    /// Human-readable output
    Pretty,
}
