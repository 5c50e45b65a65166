//! REST page loader
//!
//! Follows `rel="next"` links until a page without one is returned.

use super::types::{ApiExecutor, PagedRequest, ResponsePage};
use crate::error::Result;
use crate::http::ApiRequest;
use futures::Stream;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Drives a `PagedRequest` through an executor
pub struct PagesLoader<'a, E> {
    executor: &'a E,
}

impl<'a, E: ApiExecutor> PagesLoader<'a, E> {
    pub fn new(executor: &'a E) -> Self {
        Self { executor }
    }

    /// Every item of every page, in page order
    pub async fn load_all<T>(&self, request: &PagedRequest<T>) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        let mut result = Vec::new();
        self.load_all_with(request, |items| result.extend(items)).await?;
        Ok(result)
    }

    /// Hand each page's items to `consumer` as soon as the page arrives
    pub async fn load_all_with<T, F>(&self, request: &PagedRequest<T>, mut consumer: F) -> Result<()>
    where
        T: DeserializeOwned + Send,
        F: FnMut(Vec<T>),
    {
        let mut next = Some(request.initial().clone());
        while let Some(current) = next {
            let page = self.fetch(&current).await?;
            next = page.next_link.as_deref().map(|url| request.next_request(url));
            consumer(page.items);
        }
        Ok(())
    }

    /// First item matching `predicate`. No page after the match is fetched.
    pub async fn find<T, P>(&self, request: &PagedRequest<T>, mut predicate: P) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
        P: FnMut(&T) -> bool,
    {
        let mut next = Some(request.initial().clone());
        while let Some(current) = next {
            let page = self.fetch(&current).await?;
            next = page.next_link.as_deref().map(|url| request.next_request(url));
            if let Some(found) = page.items.into_iter().find(|item| predicate(item)) {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// At most `maximum` items. Stops fetching once the cap is reached.
    pub async fn load<T>(&self, request: &PagedRequest<T>, maximum: usize) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        let mut result = Vec::new();
        if maximum == 0 {
            return Ok(result);
        }

        let mut next = Some(request.initial().clone());
        while let Some(current) = next {
            let page = self.fetch(&current).await?;
            next = page.next_link.as_deref().map(|url| request.next_request(url));
            for item in page.items {
                result.push(item);
                if result.len() == maximum {
                    return Ok(result);
                }
            }
        }
        Ok(result)
    }

    /// Pages as a stream of item batches. Nothing is fetched until polled.
    pub fn stream<T>(&self, request: PagedRequest<T>) -> impl Stream<Item = Result<Vec<T>>> + 'a
    where
        T: DeserializeOwned + Send + 'a,
    {
        let executor = self.executor;
        let first = Some(request.initial().clone());
        futures::stream::try_unfold((first, request), move |(current, request)| async move {
            let Some(current) = current else {
                return Ok(None);
            };
            let page: ResponsePage<T> = executor.execute_page(&current).await?;
            let next = page.next_link.as_deref().map(|url| request.next_request(url));
            Ok(Some((page.items, (next, request))))
        })
    }

    async fn fetch<T>(&self, request: &ApiRequest) -> Result<ResponsePage<T>>
    where
        T: DeserializeOwned + Send,
    {
        debug!("Loading page {}", request.url);
        self.executor.execute_page(request).await
    }
}
