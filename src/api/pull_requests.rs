//! Pull-request list loading
//!
//! The list is driven by a GraphQL search. The search string is rebuilt from
//! a [`PullRequestSearchQuery`] scoped to one repository, and changing the
//! query starts the list over.

use super::graphql;
use crate::error::Result;
use crate::model::PullRequestShort;
use crate::pagination::{ApiExecutor, PagedListLoader, SimpleGqlPagesLoader};
use crate::query::SearchQueryBuilder;
use crate::types::RepositoryCoordinates;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::RwLock;
use tracing::debug;

/// Structured pull-request filter
///
/// Parsed from and rendered to the `key:value` search syntax. Unknown
/// qualifiers stay in the free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestSearchQuery {
    pub state: Option<String>,
    pub author: Option<String>,
    pub assignee: Option<String>,
    pub label: Option<String>,
    pub review_requested: Option<String>,
    pub text: Option<String>,
}

impl PullRequestSearchQuery {
    /// Open pull requests, the default list filter
    pub fn open() -> Self {
        Self {
            state: Some("open".to_string()),
            ..Self::default()
        }
    }

    pub fn parse(input: &str) -> Self {
        let mut query = Self::default();
        let mut text = Vec::new();

        for term in input.split_whitespace() {
            let Some((key, value)) = term.split_once(':').filter(|(_, v)| !v.is_empty()) else {
                text.push(term);
                continue;
            };
            let slot = match key.to_lowercase().as_str() {
                "state" | "is" => &mut query.state,
                "author" => &mut query.author,
                "assignee" => &mut query.assignee,
                "label" => &mut query.label,
                "review-requested" => &mut query.review_requested,
                _ => {
                    text.push(term);
                    continue;
                }
            };
            *slot = Some(value.to_string());
        }

        if !text.is_empty() {
            query.text = Some(text.join(" "));
        }
        query
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    fn qualify(&self, builder: SearchQueryBuilder) -> SearchQueryBuilder {
        builder
            .qualifier("state", self.state.as_ref())
            .qualifier("author", self.author.as_ref())
            .qualifier("assignee", self.assignee.as_ref())
            .qualifier("label", self.label.as_ref())
            .qualifier("review-requested", self.review_requested.as_ref())
            .query(self.text.as_ref())
    }
}

impl fmt::Display for PullRequestSearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualify(SearchQueryBuilder::new()).build())
    }
}

/// Full search string for pull requests of `repository` matching `query`
pub fn build_query(repository: &RepositoryCoordinates, query: &PullRequestSearchQuery) -> String {
    let builder = SearchQueryBuilder::new()
        .qualifier("type", Some("pr"))
        .qualifier("repo", Some(repository.path.to_string()));
    query.qualify(builder).build()
}

/// Pages of the pull-request search for `repository`
pub fn search_pages<E: ApiExecutor>(
    executor: E,
    repository: &RepositoryCoordinates,
    query: &PullRequestSearchQuery,
) -> SimpleGqlPagesLoader<PullRequestShort, E> {
    let server = repository.server.clone();
    let search = build_query(repository, query);
    debug!("Pull request search: {search}");
    SimpleGqlPagesLoader::new(executor, move |pagination| {
        graphql::search_pull_requests(&server, &search, pagination)
    })
}

/// Pull-request list of one repository
pub struct PullRequestListLoader<E> {
    executor: E,
    repository: RepositoryCoordinates,
    query: RwLock<PullRequestSearchQuery>,
    list: PagedListLoader<PullRequestShort, E>,
}

impl<E: ApiExecutor + Clone> PullRequestListLoader<E> {
    pub fn new(
        executor: E,
        repository: RepositoryCoordinates,
        query: PullRequestSearchQuery,
    ) -> Self {
        let pages = search_pages(executor.clone(), &repository, &query);
        Self {
            executor,
            repository,
            query: RwLock::new(query),
            list: PagedListLoader::new(pages),
        }
    }

    pub fn repository(&self) -> &RepositoryCoordinates {
        &self.repository
    }

    pub async fn search_query(&self) -> PullRequestSearchQuery {
        self.query.read().await.clone()
    }

    /// Switch to another filter and start over
    pub async fn set_search_query(&self, query: PullRequestSearchQuery) {
        let pages = search_pages(self.executor.clone(), &self.repository, &query);
        *self.query.write().await = query;
        self.list.replace_pages(pages).await;
    }

    pub async fn can_load_more(&self) -> bool {
        self.list.can_load_more().await
    }

    pub async fn load_more(&self) -> Result<usize> {
        self.list.load_more(false).await
    }

    pub async fn items(&self) -> Vec<PullRequestShort> {
        self.list.items().await
    }

    pub async fn error(&self) -> Option<String> {
        self.list.error().await
    }

    pub async fn reset(&self) {
        self.list.reset().await;
    }
}

impl<E> fmt::Debug for PullRequestListLoader<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PullRequestListLoader")
            .field("repository", &self.repository)
            .finish_non_exhaustive()
    }
}
