//! Issue loading helpers

use super::rest;
use crate::error::Result;
use crate::model::Issue;
use crate::pagination::{ApiExecutor, PagesLoader, RequestPagination};
use crate::types::{RepositoryPath, ServerPath};

/// Default cap of `load_issues`
pub const DEFAULT_MAXIMUM_ISSUES: usize = 100;

/// Up to `maximum` issues of a repository, open ones only unless `with_closed`
pub async fn load_issues<E: ApiExecutor>(
    executor: &E,
    server: &ServerPath,
    repo: &RepositoryPath,
    with_closed: bool,
    maximum: usize,
    assignee: Option<&str>,
    pagination: RequestPagination,
) -> Result<Vec<Issue>> {
    let state = if with_closed { "all" } else { "open" };
    let request = rest::issues(
        server,
        repo,
        Some(state),
        assignee,
        Some(pagination),
    );
    PagesLoader::new(executor).load(&request, maximum).await
}

/// Every issue of a repository matching a free-text search
pub async fn search_issues<E: ApiExecutor>(
    executor: &E,
    server: &ServerPath,
    repo: &RepositoryPath,
    with_closed: bool,
    assignee: Option<&str>,
    query: Option<&str>,
    pagination: RequestPagination,
) -> Result<Vec<Issue>> {
    let state = if with_closed { None } else { Some("open") };
    let request = rest::search_issues(
        server,
        Some(repo),
        state,
        assignee,
        query,
        Some(pagination),
    );
    PagesLoader::new(executor).load_all(&request).await
}
