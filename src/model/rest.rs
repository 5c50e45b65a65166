//! REST API entities
//!
//! Field names follow the snake_case JSON used by both Gitee v5 and GitHub v3.

use super::Identified;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// An organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// A repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: User,
    #[serde(rename = "private", default)]
    pub is_private: bool,
    #[serde(rename = "fork", default)]
    pub is_fork: bool,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
}

/// A branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    #[serde(default)]
    pub protected: bool,
}

/// A label attached to an issue or pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueLabel {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Issue state, also used as a list filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    Open,
    /// Gitee only
    Progressing,
    Closed,
    /// Gitee only
    Rejected,
    /// Gitee pull requests only
    Merged,
    /// Filter value matching every state
    All,
}

impl IssueState {
    /// Value used in query strings
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Progressing => "progressing",
            IssueState::Closed => "closed",
            IssueState::Rejected => "rejected",
            IssueState::Merged => "merged",
            IssueState::All => "all",
        }
    }
}

/// Issue number. Numeric on GitHub, an identifier such as `I4ABCD` on Gitee.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IssueNumber {
    Numeric(u64),
    Ident(String),
}

impl fmt::Display for IssueNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueNumber::Numeric(n) => write!(f, "{n}"),
            IssueNumber::Ident(s) => f.write_str(s),
        }
    }
}

/// An issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,
    pub number: IssueNumber,
    pub title: String,
    pub state: IssueState,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub assignee: Option<User>,
    #[serde(default)]
    pub labels: Vec<IssueLabel>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Identified for Issue {
    fn item_id(&self) -> String {
        self.id.to_string()
    }
}

/// A comment on an issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    pub body: String,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub html_url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Head or base of a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRef {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub sha: String,
    #[serde(default)]
    pub repo: Option<Repository>,
}

/// A pull request as returned by the REST API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub state: IssueState,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub assignees: Vec<User>,
    #[serde(default)]
    pub labels: Vec<IssueLabel>,
    pub head: BranchRef,
    pub base: BranchRef,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
}

impl Identified for PullRequest {
    fn item_id(&self) -> String {
        self.id.to_string()
    }
}

/// Envelope of the search endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub incomplete_results: Option<bool>,
}

/// Error body returned with 4xx/5xx responses
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiErrorMessage {
    pub message: String,
    #[serde(default)]
    pub documentation_url: Option<String>,
    #[serde(default)]
    pub errors: Vec<ApiFieldError>,
}

/// Per-field validation error
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiFieldError {
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorMessage {
    /// Message with field errors appended, for display
    pub fn presentable_error(&self) -> String {
        let details: Vec<String> = self
            .errors
            .iter()
            .map(|e| match (&e.message, &e.field, &e.code) {
                (Some(message), _, _) => message.clone(),
                (None, Some(field), Some(code)) => format!("{field} {code}"),
                (None, Some(field), None) => field.clone(),
                (None, None, Some(code)) => code.clone(),
                (None, None, None) => String::new(),
            })
            .filter(|s| !s.is_empty())
            .collect();

        if details.is_empty() {
            self.message.clone()
        } else {
            format!("{} ({})", self.message, details.join(", "))
        }
    }

    /// Whether the message mentions the given reason
    pub fn contains_reason(&self, reason: &str) -> bool {
        self.message.contains(reason)
    }
}
