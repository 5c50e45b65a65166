//! API request descriptions
//!
//! An `ApiRequest` says what to send and how the response should be read.
//! Executing it is the job of `RequestExecutor`.

use crate::types::{JsonValue, Method};
use serde::Serialize;
use serde_json::json;

/// Default accept type for REST calls
pub const V3_JSON_MIME_TYPE: &str = "application/vnd.github.v3+json";
/// REST calls whose markdown bodies should also come back rendered
pub const V3_HTML_JSON_MIME_TYPE: &str = "application/vnd.github.v3.html+json";
/// Raw diff
pub const V3_DIFF_MIME_TYPE: &str = "application/vnd.github.v3.diff";
/// Plain JSON
pub const JSON_MIME_TYPE: &str = "application/json";

/// Shape of a paginated response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageEnvelope {
    /// Body is a JSON array of items
    #[default]
    Array,
    /// Body is a search result object with an `items` array
    SearchResult,
}

/// A request against a REST or GraphQL endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    /// Value of the `Accept` header
    pub accept: Option<String>,
    /// JSON body
    pub body: Option<JsonValue>,
    /// Extra request headers
    pub headers: Vec<(String, String)>,
    /// Human-readable action, used in logs and error messages
    pub operation_name: Option<String>,
    /// How page responses are unwrapped
    pub envelope: PageEnvelope,
    /// Path from GraphQL `data` to the result
    pub data_path: Vec<String>,
}

impl ApiRequest {
    /// Create a request with no body
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            accept: Some(V3_JSON_MIME_TYPE.to_string()),
            body: None,
            headers: Vec::new(),
            operation_name: None,
            envelope: PageEnvelope::Array,
            data_path: Vec::new(),
        }
    }

    /// GET returning a JSON entity
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// GET returning one page of a JSON array
    pub fn get_page(url: impl Into<String>) -> Self {
        Self::get(url)
    }

    /// GET returning one page of search results
    pub fn get_search_page(url: impl Into<String>) -> Self {
        Self {
            envelope: PageEnvelope::SearchResult,
            ..Self::get(url)
        }
    }

    /// HEAD request
    pub fn head(url: impl Into<String>) -> Self {
        Self {
            accept: None,
            ..Self::new(Method::HEAD, url)
        }
    }

    /// POST with a JSON body
    pub fn post_json<B: Serialize>(url: impl Into<String>, body: &B) -> crate::Result<Self> {
        Ok(Self::new(Method::POST, url).with_body(serde_json::to_value(body)?))
    }

    /// PUT with an optional JSON body
    pub fn put(url: impl Into<String>, body: Option<JsonValue>) -> Self {
        let request = Self::new(Method::PUT, url);
        match body {
            Some(body) => request.with_body(body),
            None => request.with_header("Content-Length", "0"),
        }
    }

    /// PATCH with a JSON body
    pub fn patch(url: impl Into<String>, body: JsonValue) -> Self {
        Self::new(Method::PATCH, url).with_body(body)
    }

    /// DELETE with an optional JSON body
    pub fn delete(url: impl Into<String>, body: Option<JsonValue>) -> Self {
        let request = Self::new(Method::DELETE, url);
        match body {
            Some(body) => request.with_body(body),
            None => request,
        }
    }

    /// GraphQL query whose result sits at `data_path` under `data`
    pub fn graphql<P: AsRef<str>>(
        url: impl Into<String>,
        query: &str,
        variables: JsonValue,
        data_path: &[P],
    ) -> Self {
        let body = json!({ "query": query, "variables": variables });
        Self {
            accept: Some(JSON_MIME_TYPE.to_string()),
            data_path: data_path.iter().map(|p| p.as_ref().to_string()).collect(),
            ..Self::new(Method::POST, url).with_body(body)
        }
    }

    /// Same request shape pointed at another URL (used for next pages)
    #[must_use]
    pub fn with_url(&self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// Short description for logs: `GET url (operation)`
    pub fn describe(&self) -> String {
        match &self.operation_name {
            Some(name) => format!("{} {} ({name})", self.method, self.url),
            None => format!("{} {}", self.method, self.url),
        }
    }
}
