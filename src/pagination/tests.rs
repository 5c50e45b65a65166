//! Tests for pagination module

use super::*;
use crate::error::{Error, Result};
use crate::http::{ApiRequest, LinkHeader};
use crate::model::Identified;
use async_trait::async_trait;
use futures::StreamExt;
use pretty_assertions::assert_eq;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use test_case::test_case;

// ============================================================================
// Mock executor
// ============================================================================

#[derive(Default)]
struct MockExecutor {
    /// url -> (items, next link)
    pages: HashMap<String, (Vec<Value>, Option<String>)>,
    /// Queued GraphQL responses
    graphql: Mutex<VecDeque<Result<Value>>>,
    requests: Mutex<Vec<ApiRequest>>,
    delay: Option<Duration>,
}

impl MockExecutor {
    /// `count` pages of `per_page` numbered items, linked by next links
    fn with_pages(count: usize, per_page: usize) -> Self {
        let mut pages = HashMap::new();
        for page in 0..count {
            let items = (0..per_page)
                .map(|i| json!({"name": format!("item-{}", page * per_page + i)}))
                .collect();
            let next = (page + 1 < count).then(|| page_url(page + 1));
            pages.insert(page_url(page), (items, next));
        }
        Self {
            pages,
            ..Self::default()
        }
    }

    fn with_graphql(responses: Vec<Value>) -> Self {
        Self {
            graphql: Mutex::new(responses.into_iter().map(Ok).collect()),
            ..Self::default()
        }
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn requested_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.clone())
            .collect()
    }

    fn variables(&self, index: usize) -> Value {
        self.requests.lock().unwrap()[index].body.as_ref().unwrap()["variables"].clone()
    }
}

fn page_url(page: usize) -> String {
    format!("https://api.test/items?page={}", page + 1)
}

#[async_trait]
impl ApiExecutor for MockExecutor {
    async fn execute_page<T>(&self, request: &ApiRequest) -> Result<ResponsePage<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.requests.lock().unwrap().push(request.clone());
        let (items, next) = self
            .pages
            .get(&request.url)
            .cloned()
            .ok_or_else(|| Error::http_status(404, "no such page"))?;
        let items = items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<T>, _>>()?;
        let links = LinkHeader {
            next,
            ..LinkHeader::default()
        };
        Ok(ResponsePage::new(items, Some(links)))
    }

    async fn execute_graphql<T>(&self, request: &ApiRequest) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.graphql.lock().unwrap().pop_front();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let value = next.unwrap_or_else(|| Err(Error::Other("no response queued".to_string())))?;
        Ok(serde_json::from_value(value)?)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Node {
    id: String,
    #[serde(default)]
    rev: u32,
}

impl Identified for Node {
    fn item_id(&self) -> String {
        self.id.clone()
    }
}

fn names(items: &[Named]) -> Vec<&str> {
    items.iter().map(|i| i.name.as_str()).collect()
}

fn paged() -> PagedRequest<Named> {
    PagedRequest::from_request(ApiRequest::get_page(page_url(0)))
}

// ============================================================================
// Pagination parameter Tests
// ============================================================================

#[test]
fn test_request_pagination_default() {
    let pagination = RequestPagination::default();
    assert_eq!(pagination.page_number, 1);
    assert_eq!(pagination.page_size, 100);
    assert_eq!(pagination.to_string(), "page=1&per_page=100");
    assert_eq!(RequestPagination::with_page_size(5).to_string(), "page=1&per_page=5");
}

#[test]
fn test_graphql_pagination_variables() {
    let forward = GraphQLRequestPagination::after(Some("abc".to_string()), 50);
    assert_eq!(
        Value::Object(forward.to_variables()),
        json!({"pageSize": 50, "cursor": "abc"})
    );

    let since = chrono::DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let update = GraphQLRequestPagination::since(Some(since), 100);
    assert_eq!(
        Value::Object(update.to_variables()),
        json!({"pageSize": 100, "cursor": null, "since": "2024-03-01T10:00:00Z"})
    );
}

#[test]
fn test_response_page_links() {
    let page = ResponsePage::new(
        vec![1, 2],
        Some(LinkHeader::parse(r#"<https://x.test/?page=2>; rel="next""#)),
    );
    assert!(page.has_next());
    assert!(!ResponsePage::last(vec![3]).has_next());
}

#[test]
fn test_paged_request_next_reuses_shape() {
    let request: PagedRequest<Named> = PagedRequest::from_request(
        ApiRequest::get_search_page("https://x.test/search?q=a").with_operation_name("search"),
    );
    let next = request.next_request("https://x.test/search?q=a&page=2");
    assert_eq!(next.url, "https://x.test/search?q=a&page=2");
    assert_eq!(next.operation_name.as_deref(), Some("search"));
    assert_eq!(next.envelope, crate::http::PageEnvelope::SearchResult);
}

// ============================================================================
// PagesLoader Tests
// ============================================================================

#[tokio::test]
async fn test_load_all_concatenates_pages() {
    let executor = MockExecutor::with_pages(3, 2);
    let items = PagesLoader::new(&executor).load_all(&paged()).await.unwrap();

    assert_eq!(
        names(&items),
        vec!["item-0", "item-1", "item-2", "item-3", "item-4", "item-5"]
    );
    assert_eq!(
        executor.requested_urls(),
        vec![page_url(0), page_url(1), page_url(2)]
    );
}

#[tokio::test]
async fn test_load_all_with_consumer_sees_pages() {
    let executor = MockExecutor::with_pages(2, 3);
    let mut sizes = Vec::new();
    PagesLoader::new(&executor)
        .load_all_with(&paged(), |items| sizes.push(items.len()))
        .await
        .unwrap();
    assert_eq!(sizes, vec![3, 3]);
}

#[tokio::test]
async fn test_find_stops_after_match() {
    let executor = MockExecutor::with_pages(3, 2);
    let found = PagesLoader::new(&executor)
        .find(&paged(), |item| item.name == "item-3")
        .await
        .unwrap();

    assert_eq!(found.unwrap().name, "item-3");
    assert_eq!(executor.request_count(), 2);
}

#[tokio::test]
async fn test_find_without_match() {
    let executor = MockExecutor::with_pages(2, 2);
    let found = PagesLoader::new(&executor)
        .find(&paged(), |item| item.name == "missing")
        .await
        .unwrap();

    assert!(found.is_none());
    assert_eq!(executor.request_count(), 2);
}

#[test_case(0, 0, 0 ; "zero issues no request")]
#[test_case(1, 1, 1 ; "within first page")]
#[test_case(2, 2, 1 ; "exactly first page")]
#[test_case(3, 3, 2 ; "into second page")]
#[test_case(10, 6, 3 ; "more than available")]
#[tokio::test]
async fn test_load_maximum(maximum: usize, expected_items: usize, expected_requests: usize) {
    let executor = MockExecutor::with_pages(3, 2);
    let items = PagesLoader::new(&executor)
        .load(&paged(), maximum)
        .await
        .unwrap();

    assert_eq!(items.len(), expected_items);
    assert_eq!(executor.request_count(), expected_requests);
}

#[tokio::test]
async fn test_load_all_propagates_errors() {
    let mut executor = MockExecutor::with_pages(3, 1);
    executor.pages.remove(&page_url(1));

    let err = PagesLoader::new(&executor)
        .load_all(&paged())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(404));
    assert_eq!(executor.request_count(), 2);
}

#[tokio::test]
async fn test_stream_pages() {
    let executor = MockExecutor::with_pages(3, 1);
    let loader = PagesLoader::new(&executor);
    let stream = loader.stream(paged());
    futures::pin_mut!(stream);

    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(names(&first), vec!["item-0"]);
    assert_eq!(executor.request_count(), 1);

    let rest: Vec<Vec<Named>> = stream
        .map(|page| page.unwrap())
        .collect()
        .await;
    assert_eq!(rest.len(), 2);
    assert_eq!(executor.request_count(), 3);
}

// ============================================================================
// GqlPagesLoader Tests
// ============================================================================

fn gql_page(ids: &[&str], has_next: bool, cursor: Option<&str>) -> Value {
    json!({
        "pageInfo": {"hasNextPage": has_next, "endCursor": cursor},
        "nodes": ids.iter().map(|id| json!({"id": id})).collect::<Vec<_>>()
    })
}

fn produce(pagination: &GraphQLRequestPagination) -> ApiRequest {
    ApiRequest::graphql(
        "https://api.test/graphql",
        "query($cursor: String) { items }",
        Value::Object(pagination.to_variables()),
        &["items"],
    )
}

#[tokio::test]
async fn test_gql_load_all() {
    let executor = MockExecutor::with_graphql(vec![
        gql_page(&["a", "b"], true, Some("c1")),
        gql_page(&["c"], false, Some("c2")),
    ]);
    let loader: SimpleGqlPagesLoader<Node, _> = GqlPagesLoader::new(executor, produce);

    assert!(loader.has_next().await);
    let items = loader.load_all().await.unwrap();
    assert_eq!(items.len(), 3);
    assert!(!loader.has_next().await);

    let executor = loader.executor();
    assert_eq!(executor.variables(0)["cursor"], Value::Null);
    assert_eq!(executor.variables(1)["cursor"], "c1");
    assert_eq!(executor.variables(1)["pageSize"], 100);
}

#[tokio::test]
async fn test_gql_load_next_after_last_page_is_none() {
    let executor = MockExecutor::with_graphql(vec![gql_page(&["a"], false, None)]);
    let loader: SimpleGqlPagesLoader<Node, _> = GqlPagesLoader::new(executor, produce);

    assert!(loader.load_next(false).await.unwrap().is_some());
    assert!(loader.load_next(false).await.unwrap().is_none());
    assert_eq!(loader.executor().request_count(), 1);
}

#[tokio::test]
async fn test_gql_reset_repeats_first_page() {
    let executor = MockExecutor::with_graphql(vec![
        gql_page(&["a"], true, Some("c1")),
        gql_page(&["a"], true, Some("c1")),
    ]);
    let loader: SimpleGqlPagesLoader<Node, _> = GqlPagesLoader::new(executor, produce);

    loader.load_next(false).await.unwrap();
    loader.reset().await;
    assert!(loader.has_next().await);
    loader.load_next(false).await.unwrap();

    assert_eq!(loader.executor().variables(0), loader.executor().variables(1));
}

#[tokio::test]
async fn test_gql_update_mode() {
    let executor = MockExecutor::with_graphql(vec![
        gql_page(&["a"], false, Some("c1")),
        gql_page(&["a"], false, Some("c2")),
    ]);
    let loader: SimpleGqlPagesLoader<Node, _> =
        GqlPagesLoader::new(executor, produce).with_timestamp_updates();

    // Nothing to update while forward pages remain
    assert!(loader.load_next(true).await.unwrap().is_none());
    assert_eq!(loader.executor().request_count(), 0);

    loader.load_next(false).await.unwrap();
    let updated = loader.load_next(true).await.unwrap().unwrap();
    assert_eq!(updated[0].id, "a");

    let variables = loader.executor().variables(1);
    assert!(variables["since"].is_string());
    assert_eq!(variables["cursor"], Value::Null);
}

#[tokio::test]
async fn test_gql_update_unsupported() {
    let executor = MockExecutor::with_graphql(vec![gql_page(&["a"], false, None)]);
    let loader: SimpleGqlPagesLoader<Node, _> = GqlPagesLoader::new(executor, produce);

    loader.load_next(false).await.unwrap();
    assert!(loader.load_next(true).await.unwrap().is_none());
    assert_eq!(loader.executor().request_count(), 1);
}

#[tokio::test]
async fn test_gql_error_keeps_state() {
    let executor = MockExecutor::with_graphql(Vec::new());
    let loader: SimpleGqlPagesLoader<Node, _> = GqlPagesLoader::new(executor, produce);

    assert!(loader.load_next(false).await.is_err());
    assert!(loader.has_next().await);
}

#[tokio::test]
async fn test_gql_reset_during_fetch_wins() {
    let executor = MockExecutor {
        delay: Some(Duration::from_millis(100)),
        ..MockExecutor::with_graphql(vec![gql_page(&["a"], false, Some("end"))])
    };
    let loader: Arc<SimpleGqlPagesLoader<Node, _>> =
        Arc::new(GqlPagesLoader::new(executor, produce));

    let fetching = Arc::clone(&loader);
    let fetch = tokio::spawn(async move { fetching.load_next(false).await });

    tokio::time::sleep(Duration::from_millis(20)).await;
    // reset does not wait for the fetch in flight
    tokio::time::timeout(Duration::from_millis(50), loader.reset())
        .await
        .unwrap();

    let page = fetch.await.unwrap().unwrap();
    assert_eq!(page.unwrap().len(), 1);
    assert!(loader.has_next().await);
}

// ============================================================================
// PagedListLoader Tests
// ============================================================================

#[tokio::test]
async fn test_list_loader_accumulates_and_merges() {
    let executor = MockExecutor::with_graphql(vec![
        gql_page(&["a", "b"], true, Some("c1")),
        gql_page(&["c"], false, Some("c2")),
        json!({
            "pageInfo": {"hasNextPage": false, "endCursor": "c3"},
            "nodes": [{"id": "b", "rev": 2}, {"id": "z"}]
        }),
    ]);
    let list: PagedListLoader<Node, _> =
        PagedListLoader::new(GqlPagesLoader::new(executor, produce).with_timestamp_updates());

    assert!(list.can_load_more().await);
    assert_eq!(list.load_more(false).await.unwrap(), 2);
    assert_eq!(list.load_more(false).await.unwrap(), 1);
    assert!(!list.can_load_more().await);

    assert_eq!(list.load_more(true).await.unwrap(), 2);
    let items: Vec<Node> = list.items().await;
    let ids: Vec<&str> = items.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["z", "a", "b", "c"]);
    assert_eq!(items[2].rev, 2);
}

#[tokio::test]
async fn test_list_loader_error_allows_retry() {
    let executor = MockExecutor::with_graphql(Vec::new());
    let list: PagedListLoader<Node, _> = PagedListLoader::new(GqlPagesLoader::new(executor, produce));

    assert!(list.load_more(false).await.is_err());
    assert!(list.error().await.is_some());
    assert!(list.can_load_more().await);
    assert!(!list.is_loading().await);
}

#[tokio::test]
async fn test_list_loader_reset_clears() {
    let executor = MockExecutor::with_graphql(vec![
        gql_page(&["a"], false, None),
        gql_page(&["b"], false, None),
    ]);
    let list: PagedListLoader<Node, _> = PagedListLoader::new(GqlPagesLoader::new(executor, produce));

    list.load_more(false).await.unwrap();
    list.reset().await;
    assert!(list.items().await.is_empty());
    assert!(list.can_load_more().await);

    list.load_more(false).await.unwrap();
    let items: Vec<Node> = list.items().await;
    assert_eq!(items[0].id, "b");
}
