// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # prforge
//!
//! Paginated loaders for the Gitee v5 / GitHub v3 REST APIs and their
//! GraphQL endpoints, with account bookkeeping and a small CLI.
//!
//! ## Features
//!
//! - **REST pagination**: follow `Link: rel="next"` headers, accumulate,
//!   stream, search or cap results
//! - **GraphQL cursor pagination**: forward paging, reset, and
//!   "changed since last fetch" updates
//! - **Typed entities**: users, repositories, issues, pull requests and the
//!   pull-request timeline as a `__typename`-keyed enum
//! - **Accounts**: persisted account list with a pluggable token store
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use prforge::api::{self, rest};
//! use prforge::http::{ExecutorConfig, RequestExecutor};
//! use prforge::pagination::{PagesLoader, RequestPagination};
//! use prforge::{Credentials, RepositoryPath, ServerPath};
//!
//! #[tokio::main]
//! async fn main() -> prforge::Result<()> {
//!     let server = ServerPath::gitee();
//!     let executor = RequestExecutor::new(
//!         ExecutorConfig::default(),
//!         Credentials::for_forge(server.forge(), "token"),
//!     )?;
//!
//!     let repo: RepositoryPath = "owner/name".parse()?;
//!     let branches = PagesLoader::new(&executor)
//!         .load_all(&rest::branches(&server, &repo, None))
//!         .await?;
//!     let issues = api::load_issues(
//!         &executor,
//!         &server,
//!         &repo,
//!         false,
//!         50,
//!         None,
//!         RequestPagination::with_page_size(50),
//!     )
//!     .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         api / cli                           │
//! │  rest + graphql requests, issues, pull requests, timeline   │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌────────────┬─────────────────┴──────┬───────────┬──────────┐
//! │  accounts  │       pagination       │   http    │  model   │
//! ├────────────┼────────────────────────┼───────────┼──────────┤
//! │ Manager    │ PagesLoader (Link)     │ Executor  │ REST     │
//! │ TokenStore │ GqlPagesLoader (cursor)│ Auth      │ GraphQL  │
//! │            │ PagedListLoader        │ RateLimit │ Timeline │
//! └────────────┴────────────────────────┴───────────┴──────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Forge and server addressing
pub mod types;

/// Credentials and request authentication
pub mod auth;

/// HTTP request execution with rate limiting and cancellation
pub mod http;

/// REST and GraphQL page loaders
pub mod pagination;

/// URL and search query builders
pub mod query;

/// API entities
pub mod model;

/// Gitee / GitHub API operations
pub mod api;

/// Account list persistence
pub mod accounts;

/// Settings
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use accounts::{Account, AccountManager};
pub use auth::Credentials;
pub use config::Settings;
pub use http::RequestExecutor;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
