//! Gitee / GitHub API operations
//!
//! Request builders for the REST and GraphQL endpoints, and the loaders that
//! run them through an executor.
//!
//! # Overview
//!
//! - `rest` - REST request catalogue (users, repositories, issues, pulls)
//! - `graphql` - GraphQL queries (pull-request search, timeline)
//! - `issues` - capped issue lists and issue search
//! - `pull_requests` - search-driven pull-request list
//! - `timeline` - pull-request timeline

pub mod graphql;
pub mod issues;
pub mod pull_requests;
pub mod rest;
pub mod timeline;

pub use issues::{load_issues, search_issues, DEFAULT_MAXIMUM_ISSUES};
pub use pull_requests::{PullRequestListLoader, PullRequestSearchQuery};
pub use timeline::{load_timeline, timeline_pages};
