//! HTTP module
//!
//! Request descriptions and the executor that runs them.
//!
//! # Features
//!
//! - **Typed execution**: JSON entities, optional entities, text, pages, GraphQL
//! - **Link pagination**: `Link` header parsing for REST list endpoints
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Cancellation**: every executor observes a `CancellationToken`
//! - **Authentication**: Integration with auth module

mod client;
mod link;
mod rate_limit;
mod request;

pub use client::{ExecutorConfig, ExecutorConfigBuilder, RequestExecutor};
pub use link::LinkHeader;
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use request::{
    ApiRequest, PageEnvelope, JSON_MIME_TYPE, V3_DIFF_MIME_TYPE, V3_HTML_JSON_MIME_TYPE,
    V3_JSON_MIME_TYPE,
};
