//! CLI module
//!
//! Command-line interface over the loaders.
//!
//! # Commands
//!
//! - `whoami` - Show the authenticated user
//! - `repos` - List user or organization repositories
//! - `repo` - Show one repository
//! - `branches` - List branches
//! - `issues` / `search-issues` - List or search issues
//! - `pulls` - List pull requests through the GraphQL search
//! - `timeline` - Show a pull-request timeline
//! - `accounts` - Manage stored accounts

mod commands;
mod runner;

pub use commands::{AccountCommand, Cli, Commands, OutputFormat};
pub use runner::Runner;
