//! URL-query and search-query builders
//!
//! `UrlQueryBuilder` produces the `?name=value&...` suffix of REST URLs.
//! `SearchQueryBuilder` produces the space-separated `key:value` search
//! syntax shared by the issue search endpoint and the GraphQL `search` field.

use crate::pagination::RequestPagination;
use url::form_urlencoded::byte_serialize;

/// Builds the query string of a REST URL
#[derive(Debug, Clone, Default)]
pub struct UrlQueryBuilder {
    parts: Vec<String>,
}

impl UrlQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `name=value`, with the value percent-encoded
    #[must_use]
    pub fn param(mut self, name: &str, value: impl AsRef<str>) -> Self {
        let encoded: String = byte_serialize(value.as_ref().as_bytes()).collect();
        self.parts.push(format!("{name}={encoded}"));
        self
    }

    /// Add `name=value` when a value is present
    #[must_use]
    pub fn param_opt(self, name: &str, value: Option<impl AsRef<str>>) -> Self {
        match value {
            Some(value) => self.param(name, value),
            None => self,
        }
    }

    /// Add `page` and `per_page` when pagination is present
    #[must_use]
    pub fn pagination(self, pagination: Option<RequestPagination>) -> Self {
        match pagination {
            Some(p) => self
                .param("page", p.page_number.to_string())
                .param("per_page", p.page_size.to_string()),
            None => self,
        }
    }

    /// `?a=1&b=2`, or an empty string without parameters
    pub fn build(&self) -> String {
        if self.parts.is_empty() {
            String::new()
        } else {
            format!("?{}", self.parts.join("&"))
        }
    }
}

/// Builds a search query such as `repo:owner/name state:open crash`
#[derive(Debug, Clone, Default)]
pub struct SearchQueryBuilder {
    parts: Vec<String>,
}

impl SearchQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `name:value` when a value is present
    #[must_use]
    pub fn qualifier(mut self, name: &str, value: Option<impl AsRef<str>>) -> Self {
        if let Some(value) = value {
            self.parts.push(format!("{name}:{}", value.as_ref()));
        }
        self
    }

    /// Add free text when present
    #[must_use]
    pub fn query(mut self, value: Option<impl AsRef<str>>) -> Self {
        if let Some(value) = value {
            self.parts.push(value.as_ref().to_string());
        }
        self
    }

    pub fn build(&self) -> String {
        self.parts.join(" ")
    }
}

#[cfg(test)]
mod query_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_url_query_empty() {
        assert_eq!(UrlQueryBuilder::new().build(), "");
        assert_eq!(
            UrlQueryBuilder::new()
                .param_opt("state", None::<&str>)
                .pagination(None)
                .build(),
            ""
        );
    }

    #[test]
    fn test_url_query_params_and_pagination() {
        let query = UrlQueryBuilder::new()
            .param("state", "open")
            .param_opt("assignee", Some("alice"))
            .pagination(Some(RequestPagination::default()))
            .build();
        assert_eq!(query, "?state=open&assignee=alice&page=1&per_page=100");
    }

    #[test]
    fn test_url_query_encodes_values() {
        let query = UrlQueryBuilder::new()
            .param("q", "repo:o/r state:open")
            .build();
        assert_eq!(query, "?q=repo%3Ao%2Fr+state%3Aopen");
    }

    #[test]
    fn test_search_query() {
        let query = SearchQueryBuilder::new()
            .qualifier("repo", Some("o/r"))
            .qualifier("state", None::<&str>)
            .qualifier("assignee", Some("bob"))
            .query(Some("crash on start"))
            .build();
        assert_eq!(query, "repo:o/r assignee:bob crash on start");
        assert_eq!(SearchQueryBuilder::new().query(None::<String>).build(), "");
    }
}
