//! Request executor
//!
//! Sends `ApiRequest`s and turns responses into typed results:
//! - Authentication via the shared `Authenticator`
//! - Client-side rate limiting
//! - Cooperative cancellation through a `CancellationToken`
//! - Status classification (authentication, rate limit, other status errors)
//!
//! There is no retry. Errors go back to the caller, which can consult
//! `Error::is_retryable` to decide whether to offer one.

use super::link::LinkHeader;
use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::request::{ApiRequest, PageEnvelope, JSON_MIME_TYPE};
use crate::auth::{Authenticator, Credentials};
use crate::error::{Error, Result};
use crate::model::{ApiErrorMessage, GraphQLError, GraphQLResponse, SearchResult};
use crate::pagination::{ApiExecutor, ResponsePage};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

/// Message Gitee and GitHub put in 403 bodies when the quota is spent
const RATE_LIMIT_REASON: &str = "API rate limit exceeded";

/// Configuration for the request executor
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Whole-request timeout, unlimited when unset
    pub timeout: Option<Duration>,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            timeout: None,
            rate_limit: None,
            default_headers: HashMap::new(),
            user_agent: format!("prforge/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ExecutorConfig {
    /// Create a new config builder
    pub fn builder() -> ExecutorConfigBuilder {
        ExecutorConfigBuilder::default()
    }
}

/// Builder for executor config
#[derive(Default)]
pub struct ExecutorConfigBuilder {
    config: ExecutorConfig,
}

impl ExecutorConfigBuilder {
    /// Set the connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the whole-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> ExecutorConfig {
        self.config
    }
}

/// Executes API requests
///
/// Clones share the HTTP connection pool, the authenticator, the rate limiter
/// and the cancellation token.
#[derive(Clone)]
pub struct RequestExecutor {
    client: Client,
    config: Arc<ExecutorConfig>,
    authenticator: Authenticator,
    rate_limiter: Option<RateLimiter>,
    cancel: CancellationToken,
}

impl RequestExecutor {
    /// Create an executor with the given credentials
    pub fn new(config: ExecutorConfig, credentials: Credentials) -> Result<Self> {
        Self::with_authenticator(config, Authenticator::new(credentials))
    }

    /// Create an executor sending no credentials
    pub fn anonymous(config: ExecutorConfig) -> Result<Self> {
        Self::new(config, Credentials::None)
    }

    /// Create an executor sharing an existing authenticator
    pub fn with_authenticator(config: ExecutorConfig, authenticator: Authenticator) -> Result<Self> {
        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config: Arc::new(config),
            authenticator,
            rate_limiter,
            cancel: CancellationToken::new(),
        })
    }

    /// Same executor observing another cancellation token
    #[must_use]
    pub fn with_cancellation(&self, cancel: CancellationToken) -> Self {
        Self {
            cancel,
            ..self.clone()
        }
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancel in-flight and future requests of this executor and its clones
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    // ------------------------------------------------------------------------
    // Typed execution
    // ------------------------------------------------------------------------

    /// Execute and decode a JSON body
    pub async fn execute_json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        let response = self.send(request).await?;
        let text = self.read_text(response).await?;
        let result = parse_json(request, &text)?;
        debug!("Request: {} : Result extracted", request.describe());
        Ok(result)
    }

    /// Like `execute_json`, with HTTP 404 mapped to `None`
    pub async fn execute_optional<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<Option<T>> {
        match self.execute_json(request).await {
            Ok(value) => Ok(Some(value)),
            Err(Error::HttpStatus { status: 404, .. }) => {
                debug!("Request: {} : Not found", request.describe());
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Execute and return the raw body
    pub async fn execute_text(&self, request: &ApiRequest) -> Result<String> {
        let response = self.send(request).await?;
        self.read_text(response).await
    }

    /// Execute, ignoring the body
    pub async fn execute_unit(&self, request: &ApiRequest) -> Result<()> {
        self.send(request).await?;
        Ok(())
    }

    /// Execute and decode one page of a list endpoint
    pub async fn execute_page<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<ResponsePage<T>> {
        let response = self.send(request).await?;
        let links = LinkHeader::from_headers(response.headers());
        let text = self.read_text(response).await?;

        let items = match request.envelope {
            PageEnvelope::Array => parse_json::<Vec<T>>(request, &text)?,
            PageEnvelope::SearchResult => parse_json::<SearchResult<T>>(request, &text)?.items,
        };
        debug!(
            "Request: {} : Page of {} items, next: {}",
            request.describe(),
            items.len(),
            links.as_ref().and_then(|l| l.next.as_deref()).unwrap_or("none")
        );
        Ok(ResponsePage::new(items, links))
    }

    /// Execute a GraphQL request and decode the value at its data path
    pub async fn execute_graphql<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        self.execute_graphql_optional(request)
            .await?
            .ok_or_else(|| Error::decode("Non-nullable entity is null or entity path is invalid"))
    }

    /// Like `execute_graphql`, with a null or missing entity mapped to `None`
    pub async fn execute_graphql_optional<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<Option<T>> {
        let response = self.send(request).await?;
        let text = self.read_text(response).await?;
        let envelope: GraphQLResponse<Value> = parse_json(request, &text)?;

        let node = envelope
            .data
            .as_ref()
            .map(|data| traverse(data, &request.data_path))
            .unwrap_or(&Value::Null);
        if !node.is_null() {
            let result = T::deserialize(node)
                .map_err(|e| Error::decode(format!("{}: {e}", request.describe())))?;
            return Ok(Some(result));
        }

        match envelope.errors {
            Some(errors) if !errors.is_empty() => Err(graphql_failure(request, &errors)),
            _ if envelope.data.is_none() => Err(Error::decode(
                "Undefined request state - both result and errors are null",
            )),
            _ => Ok(None),
        }
    }

    // ------------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------------

    async fn send(&self, request: &ApiRequest) -> Result<Response> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        if let Some(ref limiter) = self.rate_limiter {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => return Err(Error::Cancelled),
                () = limiter.wait() => {}
            }
        }

        let url = Url::parse(&request.url)?;
        let mut req = self.client.request(request.method.into(), url);

        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }
        if let Some(ref accept) = request.accept {
            req = req.header(ACCEPT, accept.as_str());
        }
        for (key, value) in &request.headers {
            req = req.header(key.as_str(), value.as_str());
        }
        if let Some(ref body) = request.body {
            req = req.json(body);
        }
        let req = self.authenticator.apply(req).await;

        debug!("Request: {} : Connecting", request.describe());
        let response = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Err(Error::Cancelled),
            result = req.send() => result.map_err(|e| self.transport_error(e))?,
        };
        debug!(
            "Request: {} {} : Connected ({})",
            request.method,
            request.url,
            response.status().as_u16()
        );

        self.check_response(request, response).await
    }

    async fn read_text(&self, response: Response) -> Result<String> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(Error::Cancelled),
            text = response.text() => text.map_err(|e| self.transport_error(e)),
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            let timeout = self.config.timeout.unwrap_or(self.config.connect_timeout);
            #[allow(clippy::cast_possible_truncation)]
            return Error::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            };
        }
        Error::Http(e)
    }

    /// Map status codes >= 400 to errors
    async fn check_response(&self, request: &ApiRequest, response: Response) -> Result<Response> {
        let status = response.status();
        if status.as_u16() < 400 {
            return Ok(response);
        }

        let status_line = match status.canonical_reason() {
            Some(reason) => format!("{} {reason}", status.as_u16()),
            None => status.as_u16().to_string(),
        };
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with(JSON_MIME_TYPE));

        let error_text = match self.read_text(response).await {
            Ok(text) => text,
            Err(Error::Cancelled) => return Err(Error::Cancelled),
            Err(_) => String::new(),
        };
        debug!(
            "Request: {} : Error {status_line} body:\n{error_text}",
            request.describe()
        );

        let json_error = if is_json {
            serde_json::from_str::<ApiErrorMessage>(&error_text).ok()
        } else {
            None
        };
        if json_error.is_none() {
            debug!("Request: {} : Unable to parse JSON error", request.describe());
        }

        Err(classify_status(status.as_u16(), &status_line, &error_text, json_error))
    }
}

/// Build the error for a failed response
fn classify_status(
    status: u16,
    status_line: &str,
    error_text: &str,
    json_error: Option<ApiErrorMessage>,
) -> Error {
    let body_or = |fallback: &str| -> String {
        if error_text.is_empty() {
            fallback.to_string()
        } else {
            error_text.to_string()
        }
    };

    match status {
        401 | 402 | 403 => match json_error {
            Some(ref err) if err.contains_reason(RATE_LIMIT_REASON) => {
                warn!("API rate limit exceeded: {}", err.presentable_error());
                Error::RateLimitExceeded {
                    message: err.presentable_error(),
                }
            }
            Some(ref err) => Error::auth(format!("Request response: {}", err.presentable_error())),
            None => Error::auth(format!("Request response: {}", body_or(status_line))),
        },
        _ => match json_error {
            Some(err) => Error::HttpStatus {
                status,
                message: format!("{status_line} - {}", err.presentable_error()),
                error: Some(err),
            },
            None => Error::http_status(status, format!("{status_line} - {error_text}")),
        },
    }
}

/// Follow `path` from the GraphQL `data` object. Missing keys yield null.
fn traverse<'a>(data: &'a Value, path: &[String]) -> &'a Value {
    path.iter()
        .try_fold(data, |node, key| node.get(key))
        .unwrap_or(&Value::Null)
}

fn graphql_failure(request: &ApiRequest, errors: &[GraphQLError]) -> Error {
    if errors.iter().any(|e| {
        e.error_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("INSUFFICIENT_SCOPES"))
    }) {
        return Error::auth("Access token has not been granted the required scopes.");
    }

    let message = match errors {
        [single] => single.to_string(),
        many => many
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; "),
    };
    match &request.operation_name {
        Some(name) => {
            debug!("Can't {name}: {message}");
            Error::graphql(format!("Can't {name}: {message}"))
        }
        None => Error::graphql(message),
    }
}

fn parse_json<T: DeserializeOwned>(request: &ApiRequest, text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|e| Error::decode(format!("{}: {e}", request.describe())))
}

#[async_trait]
impl ApiExecutor for RequestExecutor {
    async fn execute_page<T>(&self, request: &ApiRequest) -> Result<ResponsePage<T>>
    where
        T: DeserializeOwned + Send,
    {
        RequestExecutor::execute_page(self, request).await
    }

    async fn execute_graphql<T>(&self, request: &ApiRequest) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        RequestExecutor::execute_graphql(self, request).await
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("config", &self.config)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}
