//! Pagination types and traits
//!
//! Defines the page and request abstractions shared by the REST and GraphQL
//! loaders, and the `ApiExecutor` seam the loaders drive.

use crate::error::Result;
use crate::http::{ApiRequest, LinkHeader};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Default number of items requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 100;

// ============================================================================
// REST pages
// ============================================================================

/// One page of a REST list response
#[derive(Debug, Clone, PartialEq)]
pub struct ResponsePage<T> {
    pub items: Vec<T>,
    pub first_link: Option<String>,
    pub prev_link: Option<String>,
    pub next_link: Option<String>,
    pub last_link: Option<String>,
}

impl<T> ResponsePage<T> {
    /// Build a page from its items and the parsed `Link` header
    pub fn new(items: Vec<T>, links: Option<LinkHeader>) -> Self {
        let links = links.unwrap_or_default();
        Self {
            items,
            first_link: links.first,
            prev_link: links.prev,
            next_link: links.next,
            last_link: links.last,
        }
    }

    /// A page with no further pages
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }

    pub fn has_next(&self) -> bool {
        self.next_link.is_some()
    }
}

/// Builds the request for a page from its URL
pub type NextRequestFn = Arc<dyn Fn(&str) -> ApiRequest + Send + Sync>;

/// A paginated REST request: the first page plus how to follow `next` links
pub struct PagedRequest<T> {
    initial: ApiRequest,
    next: NextRequestFn,
    _item: PhantomData<fn() -> T>,
}

impl<T> PagedRequest<T> {
    /// Paged request following next links with the given request factory
    pub fn new(
        initial: ApiRequest,
        next: impl Fn(&str) -> ApiRequest + Send + Sync + 'static,
    ) -> Self {
        Self {
            initial,
            next: Arc::new(next),
            _item: PhantomData,
        }
    }

    /// Paged request whose following pages reuse the initial request shape
    pub fn from_request(initial: ApiRequest) -> Self {
        let template = initial.clone();
        Self::new(initial, move |url| template.with_url(url))
    }

    pub fn initial(&self) -> &ApiRequest {
        &self.initial
    }

    /// Request for the page at `url`
    pub fn next_request(&self, url: &str) -> ApiRequest {
        (self.next)(url)
    }
}

impl<T> Clone for PagedRequest<T> {
    fn clone(&self) -> Self {
        Self {
            initial: self.initial.clone(),
            next: Arc::clone(&self.next),
            _item: PhantomData,
        }
    }
}

impl<T> fmt::Debug for PagedRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagedRequest")
            .field("initial", &self.initial)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Pagination parameters
// ============================================================================

/// Page-number pagination for REST list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPagination {
    pub page_number: u32,
    pub page_size: u32,
}

impl Default for RequestPagination {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl RequestPagination {
    pub fn new(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number,
            page_size,
        }
    }

    /// First page with the given size
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }
}

impl fmt::Display for RequestPagination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page={}&per_page={}", self.page_number, self.page_size)
    }
}

/// Cursor pagination for GraphQL connections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphQLRequestPagination {
    /// Continue after this cursor
    pub after: Option<String>,
    /// Only return items changed since this instant
    pub since: Option<DateTime<Utc>>,
    pub page_size: u32,
}

impl Default for GraphQLRequestPagination {
    fn default() -> Self {
        Self {
            after: None,
            since: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl GraphQLRequestPagination {
    /// Forward page after `cursor`
    pub fn after(cursor: Option<String>, page_size: u32) -> Self {
        Self {
            after: cursor,
            since: None,
            page_size,
        }
    }

    /// Delta page of items updated since `timestamp`
    pub fn since(timestamp: Option<DateTime<Utc>>, page_size: u32) -> Self {
        Self {
            after: None,
            since: timestamp,
            page_size,
        }
    }

    /// `pageSize`, `cursor` and `since` query variables
    pub fn to_variables(&self) -> Map<String, Value> {
        let mut variables = Map::new();
        variables.insert("pageSize".to_string(), Value::from(self.page_size));
        variables.insert(
            "cursor".to_string(),
            self.after.clone().map_or(Value::Null, Value::String),
        );
        if let Some(since) = self.since {
            variables.insert(
                "since".to_string(),
                Value::String(since.to_rfc3339_opts(SecondsFormat::Secs, true)),
            );
        }
        variables
    }
}

// ============================================================================
// Executor seam
// ============================================================================

/// Executes the page and GraphQL requests the loaders issue
#[async_trait]
pub trait ApiExecutor: Send + Sync {
    /// Fetch one REST page
    async fn execute_page<T>(&self, request: &ApiRequest) -> Result<ResponsePage<T>>
    where
        T: DeserializeOwned + Send;

    /// Run a GraphQL request and decode the value at its data path
    async fn execute_graphql<T>(&self, request: &ApiRequest) -> Result<T>
    where
        T: DeserializeOwned + Send;
}

#[async_trait]
impl<E: ApiExecutor> ApiExecutor for Arc<E> {
    async fn execute_page<T>(&self, request: &ApiRequest) -> Result<ResponsePage<T>>
    where
        T: DeserializeOwned + Send,
    {
        (**self).execute_page(request).await
    }

    async fn execute_graphql<T>(&self, request: &ApiRequest) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        (**self).execute_graphql(request).await
    }
}
