//! GraphQL cursor page loader
//!
//! Keeps the iteration state of a connection: whether another page exists,
//! the cursor to continue from, and when the last successful fetch started.
//! That timestamp drives "update" fetches returning only items changed since.
//!
//! Fetches are serialized by an async mutex. The iteration state sits behind
//! its own lock so `has_next` and `reset` never wait for a fetch in flight.
//! A fetch only commits its new state if no `reset` happened meanwhile.

use super::types::{ApiExecutor, GraphQLRequestPagination, DEFAULT_PAGE_SIZE};
use crate::error::Result;
use crate::http::ApiRequest;
use crate::model::{CursorPageInfo, GraphQLPagedResponse};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// A GraphQL response carrying a connection page
pub trait CursorPaged {
    /// What a loaded page yields
    type Output;

    fn page_info(&self) -> &CursorPageInfo;

    fn into_output(self) -> Self::Output;
}

impl<T> CursorPaged for GraphQLPagedResponse<T> {
    type Output = Vec<T>;

    fn page_info(&self) -> &CursorPageInfo {
        &self.page_info
    }

    fn into_output(self) -> Vec<T> {
        self.nodes
    }
}

/// Builds the request for a page from its pagination parameters
pub type RequestProducer = Arc<dyn Fn(&GraphQLRequestPagination) -> ApiRequest + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
struct IterationData {
    has_next: bool,
    timestamp: Option<DateTime<Utc>>,
    cursor: Option<String>,
    /// Bumped by every reset
    generation: u64,
}

impl IterationData {
    fn initial(generation: u64) -> Self {
        Self {
            has_next: true,
            timestamp: None,
            cursor: None,
            generation,
        }
    }
}

/// Stateful loader over a GraphQL connection
pub struct GqlPagesLoader<R, E> {
    executor: E,
    request_producer: RequestProducer,
    supports_timestamp_updates: bool,
    page_size: u32,
    state: RwLock<IterationData>,
    fetch_guard: Mutex<()>,
    _response: PhantomData<fn() -> R>,
}

/// Loader over a plain `{ pageInfo, nodes }` connection
pub type SimpleGqlPagesLoader<T, E> = GqlPagesLoader<GraphQLPagedResponse<T>, E>;

impl<R, E> GqlPagesLoader<R, E>
where
    R: CursorPaged + DeserializeOwned + Send,
    E: ApiExecutor,
{
    pub fn new(
        executor: E,
        request_producer: impl Fn(&GraphQLRequestPagination) -> ApiRequest + Send + Sync + 'static,
    ) -> Self {
        Self {
            executor,
            request_producer: Arc::new(request_producer),
            supports_timestamp_updates: false,
            page_size: DEFAULT_PAGE_SIZE,
            state: RwLock::new(IterationData::initial(0)),
            fetch_guard: Mutex::new(()),
            _response: PhantomData,
        }
    }

    /// Enable `since`-based update fetches
    #[must_use]
    pub fn with_timestamp_updates(mut self) -> Self {
        self.supports_timestamp_updates = true;
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Whether a forward fetch would return a page
    pub async fn has_next(&self) -> bool {
        self.state.read().await.has_next
    }

    /// Fetch the next page, or the changes since the last fetch when `update`
    ///
    /// Returns `None` without a request when there is nothing to fetch in the
    /// requested mode.
    pub async fn load_next(&self, update: bool) -> Result<Option<R::Output>> {
        let _guard = self.fetch_guard.lock().await;
        let snapshot = self.state.read().await.clone();

        let pagination = if update {
            if snapshot.has_next || !self.supports_timestamp_updates {
                return Ok(None);
            }
            GraphQLRequestPagination::since(snapshot.timestamp, self.page_size)
        } else {
            if !snapshot.has_next {
                return Ok(None);
            }
            GraphQLRequestPagination::after(snapshot.cursor.clone(), self.page_size)
        };

        let started = Utc::now();
        let request = (self.request_producer)(&pagination);
        let response: R = self.executor.execute_graphql(&request).await?;
        let page = response.page_info();

        {
            let mut state = self.state.write().await;
            if state.generation == snapshot.generation {
                *state = IterationData {
                    has_next: page.has_next_page,
                    timestamp: Some(started),
                    cursor: page.end_cursor.clone(),
                    generation: snapshot.generation,
                };
            } else {
                debug!("Loader was reset during fetch, keeping reset state");
            }
        }

        Ok(Some(response.into_output()))
    }

    /// Start over from the first page
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        *state = IterationData::initial(state.generation + 1);
    }
}

impl<T, E> GqlPagesLoader<GraphQLPagedResponse<T>, E>
where
    T: DeserializeOwned + Send,
    E: ApiExecutor,
{
    /// Every remaining item of the connection
    pub async fn load_all(&self) -> Result<Vec<T>> {
        let mut list = Vec::new();
        while self.has_next().await {
            if let Some(items) = self.load_next(false).await? {
                list.extend(items);
            }
        }
        Ok(list)
    }
}

impl<R, E> std::fmt::Debug for GqlPagesLoader<R, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GqlPagesLoader")
            .field("supports_timestamp_updates", &self.supports_timestamp_updates)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}
