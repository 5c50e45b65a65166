//! Pagination module
//!
//! Supports: REST link-header pagination, GraphQL cursor pagination
//!
//! # Overview
//!
//! - `PagesLoader` follows `rel="next"` links of a `PagedRequest`, collecting,
//!   searching, capping or streaming the items.
//! - `GqlPagesLoader` walks a GraphQL connection by cursor and can fetch the
//!   changes since its last successful fetch.
//! - `PagedListLoader` accumulates GraphQL pages for a list view and merges
//!   incremental updates by item id.

mod graphql;
mod list;
mod rest;
mod types;

pub use graphql::{CursorPaged, GqlPagesLoader, RequestProducer, SimpleGqlPagesLoader};
pub use list::PagedListLoader;
pub use rest::PagesLoader;
pub use types::{
    ApiExecutor, GraphQLRequestPagination, NextRequestFn, PagedRequest, RequestPagination,
    ResponsePage, DEFAULT_PAGE_SIZE,
};

#[cfg(test)]
mod tests;
