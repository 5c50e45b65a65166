//! Pull-request timeline loading

use super::graphql;
use crate::error::Result;
use crate::model::TimelineItem;
use crate::pagination::{ApiExecutor, SimpleGqlPagesLoader};
use crate::types::RepositoryCoordinates;
use tracing::debug;

/// Cursor loader over the timeline of pull request `number`
///
/// Supports update fetches, which return the items added since the last
/// successful fetch.
pub fn timeline_pages<E: ApiExecutor>(
    executor: E,
    repository: &RepositoryCoordinates,
    number: u64,
) -> SimpleGqlPagesLoader<TimelineItem, E> {
    let repository = repository.clone();
    SimpleGqlPagesLoader::new(executor, move |pagination| {
        graphql::pull_request_timeline(&repository, number, pagination)
    })
    .with_timestamp_updates()
}

/// Whole timeline of pull request `number`, without ignored events
pub async fn load_timeline<E: ApiExecutor>(
    executor: E,
    repository: &RepositoryCoordinates,
    number: u64,
) -> Result<Vec<TimelineItem>> {
    let items = timeline_pages(executor, repository, number).load_all().await?;
    let total = items.len();
    let items: Vec<_> = items.into_iter().filter(|i| !i.is_ignored()).collect();
    debug!(
        "Loaded timeline of #{number}: {} items, {} ignored",
        items.len(),
        total - items.len()
    );
    Ok(items)
}
