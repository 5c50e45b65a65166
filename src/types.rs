//! Common types used throughout prforge
//!
//! Server addressing, repository coordinates and HTTP method definitions
//! shared by the request builders, the executor and the CLI.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

// ============================================================================
// HTTP Types
// ============================================================================

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    HEAD,
    POST,
    PUT,
    PATCH,
    DELETE,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => reqwest::Method::GET,
            Method::HEAD => reqwest::Method::HEAD,
            Method::POST => reqwest::Method::POST,
            Method::PUT => reqwest::Method::PUT,
            Method::PATCH => reqwest::Method::PATCH,
            Method::DELETE => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::PATCH => "PATCH",
            Method::DELETE => "DELETE",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Forge
// ============================================================================

/// Which hosting service a server speaks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Forge {
    /// gitee.com
    Gitee,
    /// github.com
    GitHub,
    /// Self-hosted GitHub Enterprise
    GitHubEnterprise,
}

/// Host name of the public Gitee service
pub const GITEE_HOST: &str = "gitee.com";

/// Host name of the public GitHub service
pub const GITHUB_HOST: &str = "github.com";

// ============================================================================
// Server Path
// ============================================================================

/// Address of a hosting server.
///
/// Host names are compared case-insensitively, so they are stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerPath {
    /// Use plain `http` instead of `https`
    #[serde(default)]
    pub use_http: bool,
    /// Host name
    #[serde(deserialize_with = "lowercase_host")]
    pub host: String,
    /// Optional port
    #[serde(default)]
    pub port: Option<u16>,
    /// Optional path prefix, always starting with `/`
    #[serde(default)]
    pub suffix: Option<String>,
}

fn lowercase_host<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    String::deserialize(deserializer).map(|host| host.to_lowercase())
}

impl ServerPath {
    /// Create a server path for an https host
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            use_http: false,
            host: host.into().to_lowercase(),
            port: None,
            suffix: None,
        }
    }

    /// The public gitee.com server
    pub fn gitee() -> Self {
        Self::new(GITEE_HOST)
    }

    /// The public github.com server
    pub fn github() -> Self {
        Self::new(GITHUB_HOST)
    }

    /// Set the port
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the path suffix
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        let trimmed = suffix.trim_matches('/');
        self.suffix = if trimmed.is_empty() {
            None
        } else {
            Some(format!("/{trimmed}"))
        };
        self
    }

    /// Forge served at this address
    pub fn forge(&self) -> Forge {
        match self.host.as_str() {
            GITEE_HOST => Forge::Gitee,
            GITHUB_HOST => Forge::GitHub,
            _ => Forge::GitHubEnterprise,
        }
    }

    fn scheme(&self) -> &'static str {
        if self.use_http {
            "http"
        } else {
            "https"
        }
    }

    /// Web URL of the server
    pub fn to_url(&self) -> String {
        let mut url = format!("{}://{}", self.scheme(), self.host);
        if let Some(port) = self.port {
            url.push_str(&format!(":{port}"));
        }
        if let Some(suffix) = &self.suffix {
            url.push_str(suffix);
        }
        url
    }

    /// Base URL of the REST API
    pub fn api_url(&self) -> String {
        match self.forge() {
            Forge::Gitee => format!("{}/api/v5", self.to_url()),
            Forge::GitHub => format!("{}://api.{}", self.scheme(), GITHUB_HOST),
            Forge::GitHubEnterprise => format!("{}/api/v3", self.to_url()),
        }
    }

    /// URL of the GraphQL endpoint
    pub fn graphql_url(&self) -> String {
        match self.forge() {
            Forge::GitHub => format!("{}/graphql", self.api_url()),
            Forge::Gitee | Forge::GitHubEnterprise => format!("{}/api/graphql", self.to_url()),
        }
    }
}

impl fmt::Display for ServerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        if let Some(suffix) = &self.suffix {
            write!(f, "{suffix}")?;
        }
        Ok(())
    }
}

impl FromStr for ServerPath {
    type Err = Error;

    /// Parses `host`, `host:port/suffix` or a full `http(s)://` URL
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (use_http, rest) = if let Some(rest) = s.strip_prefix("http://") {
            (true, rest)
        } else {
            (false, s.strip_prefix("https://").unwrap_or(s))
        };

        let (authority, suffix) = match rest.find('/') {
            Some(idx) => (&rest[..idx], Some(&rest[idx..])),
            None => (rest, None),
        };

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| Error::config(format!("Invalid port in server '{s}'")))?;
                (host, Some(port))
            }
            None => (authority, None),
        };

        if host.is_empty() {
            return Err(Error::config(format!("Invalid server '{s}'")));
        }

        let mut server = ServerPath::new(host);
        server.use_http = use_http;
        server.port = port;
        if let Some(suffix) = suffix {
            server = server.with_suffix(suffix);
        }
        Ok(server)
    }
}

// ============================================================================
// Repository Path / Coordinates
// ============================================================================

/// `owner/name` of a repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryPath {
    /// Owning user or organization
    pub owner: String,
    /// Repository name
    pub repository: String,
}

impl RepositoryPath {
    /// Create a repository path
    pub fn new(owner: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repository: repository.into(),
        }
    }
}

impl fmt::Display for RepositoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repository)
    }
}

impl FromStr for RepositoryPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidRepository {
            value: s.to_string(),
        };
        let (owner, repository) = s.trim().split_once('/').ok_or_else(invalid)?;
        let repository = repository.trim_end_matches(".git");
        if owner.is_empty() || repository.is_empty() || repository.contains('/') {
            return Err(invalid());
        }
        Ok(Self::new(owner, repository))
    }
}

/// A repository on a specific server
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryCoordinates {
    /// Server hosting the repository
    pub server: ServerPath,
    /// Repository path on that server
    pub path: RepositoryPath,
}

impl RepositoryCoordinates {
    /// Create coordinates
    pub fn new(server: ServerPath, path: RepositoryPath) -> Self {
        Self { server, path }
    }

    /// Web URL of the repository
    pub fn to_url(&self) -> String {
        format!("{}/{}", self.server.to_url(), self.path)
    }

    /// Parse a git remote URL (https, scp-like or `ssh://`)
    pub fn from_remote_url(url: &str) -> Option<Self> {
        let caps = REMOTE_URL.captures(url.trim())?;
        let scheme = caps.name("scheme").map(|m| m.as_str());
        let host = caps.name("host")?.as_str();
        let mut server = ServerPath::new(host);
        server.use_http = scheme == Some("http");
        // ssh ports are not web ports
        if matches!(scheme, Some("http" | "https")) {
            server.port = caps.name("port").and_then(|p| p.as_str().parse().ok());
        }
        let path = RepositoryPath::new(&caps["owner"], &caps["repo"]);
        Some(Self::new(server, path))
    }
}

impl fmt::Display for RepositoryCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.server, self.path)
    }
}

static REMOTE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?P<scheme>https?|ssh|git)://)?(?:[^@/\s]+@)?(?P<host>[A-Za-z0-9.\-]+)(?::(?P<port>\d+))?[:/](?P<owner>[^/\s]+)/(?P<repo>[^/\s]+?)(?:\.git)?/?$",
    )
    .expect("remote url regex is valid")
});
