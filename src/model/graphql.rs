//! GraphQL entities and envelope types

use super::rest::IssueState;
use super::Identified;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ============================================================================
// Envelope
// ============================================================================

/// GraphQL response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQLError>>,
}

/// One entry of the `errors` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub path: Vec<Value>,
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_type {
            Some(t) => write!(f, "{t}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Relay-style page info
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorPageInfo {
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
    #[serde(default)]
    pub has_previous_page: bool,
    #[serde(default)]
    pub start_cursor: Option<String>,
}

/// A connection page: `{ pageInfo, nodes }`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLPagedResponse<T> {
    pub page_info: CursorPageInfo,
    pub nodes: Vec<T>,
}

/// `{ nodes: [...] }` wrapper used by nested connections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nodes<T> {
    pub nodes: Vec<T>,
}

impl<T> Default for Nodes<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

// ============================================================================
// Actors
// ============================================================================

/// Author of an action (user, bot, organization, mannequin)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub login: String,
    pub url: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A user node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlUser {
    pub id: String,
    pub login: String,
    pub url: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A team node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub slug: String,
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    pub combined_slug: String,
}

/// Reviewer requested on a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum RequestedReviewer {
    User(GqlUser),
    Team(Team),
    #[serde(other)]
    Unknown,
}

impl RequestedReviewer {
    /// Login for users, `org/team` for teams
    pub fn short_name(&self) -> Option<&str> {
        match self {
            RequestedReviewer::User(user) => Some(&user.login),
            RequestedReviewer::Team(team) => Some(&team.combined_slug),
            RequestedReviewer::Unknown => None,
        }
    }
}

/// Git author/committer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitActor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

// ============================================================================
// Git objects
// ============================================================================

/// Commit reference by hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitHash {
    pub oid: String,
    pub abbreviated_oid: String,
}

/// Commit summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitShort {
    pub oid: String,
    pub abbreviated_oid: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub message_headline: Option<String>,
    #[serde(default)]
    pub author: Option<GitActor>,
}

/// Named git ref
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefName {
    pub name: String,
}

/// Label node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

// ============================================================================
// Pull requests
// ============================================================================

/// Pull request state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PullRequestState {
    Open,
    Closed,
    Merged,
}

impl PullRequestState {
    /// Equivalent issue state (merged counts as closed)
    pub fn as_issue_state(self) -> IssueState {
        match self {
            PullRequestState::Open => IssueState::Open,
            PullRequestState::Closed | PullRequestState::Merged => IssueState::Closed,
        }
    }
}

/// Review state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewThreadDetails {
    is_resolved: bool,
    is_outdated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewRequest {
    requested_reviewer: Option<RequestedReviewer>,
}

/// Pull request summary used in lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestShort {
    pub id: String,
    pub url: String,
    pub number: u64,
    pub title: String,
    pub state: PullRequestState,
    #[serde(default)]
    pub is_draft: bool,
    #[serde(default)]
    pub author: Option<Actor>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    assignees: Nodes<GqlUser>,
    #[serde(default)]
    labels: Nodes<Label>,
    #[serde(default)]
    review_requests: Nodes<ReviewRequest>,
    #[serde(default)]
    review_threads: Nodes<ReviewThreadDetails>,
    #[serde(default)]
    pub viewer_can_update: bool,
    #[serde(default)]
    pub viewer_did_author: bool,
}

impl PullRequestShort {
    pub fn assignees(&self) -> &[GqlUser] {
        &self.assignees.nodes
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels.nodes
    }

    pub fn requested_reviewers(&self) -> impl Iterator<Item = &RequestedReviewer> {
        self.review_requests
            .nodes
            .iter()
            .filter_map(|r| r.requested_reviewer.as_ref())
    }

    /// Review threads that are neither resolved nor outdated
    pub fn unresolved_review_threads_count(&self) -> usize {
        self.review_threads
            .nodes
            .iter()
            .filter(|t| !t.is_resolved && !t.is_outdated)
            .count()
    }
}

impl fmt::Display for PullRequestShort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.number, self.title)
    }
}

impl Identified for PullRequestShort {
    fn item_id(&self) -> String {
        self.id.clone()
    }
}

/// Submitted review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestReview {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub author: Option<Actor>,
    #[serde(default)]
    pub body: String,
    pub state: ReviewState,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub viewer_can_update: bool,
}

/// Conversation comment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlIssueComment {
    pub id: String,
    #[serde(default)]
    pub author: Option<Actor>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub viewer_can_delete: bool,
    #[serde(default)]
    pub viewer_can_update: bool,
}

/// Commit pushed to a pull request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestCommit {
    pub id: String,
    pub commit: CommitShort,
    pub url: String,
}
