//! Pull-request timeline
//!
//! The GraphQL `PullRequestTimelineItems` union is modelled as one enum keyed
//! by `__typename`. Typenames without a variant deserialize to
//! [`TimelineItem::Unknown`] instead of failing the whole page.

use super::graphql::{
    Actor, CommitHash, CommitShort, GqlIssueComment, GqlUser, Label, PullRequestCommit,
    PullRequestReview, PullRequestState, RefName, RequestedReviewer,
};
use chrono::{DateTime, Utc};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Typenames the timeline never displays
pub const IGNORED_TYPES: &[&str] = &["ReferencedEvent", "MentionedEvent", "CommentDeletedEvent"];

// ============================================================================
// Event payloads
// ============================================================================

/// Event carrying only actor and time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleEvent {
    #[serde(default)]
    pub actor: Option<Actor>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenamedTitleEvent {
    #[serde(default)]
    pub actor: Option<Actor>,
    pub created_at: DateTime<Utc>,
    pub previous_title: String,
    pub current_title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedEvent {
    #[serde(default)]
    pub actor: Option<Actor>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub commit: Option<CommitShort>,
    pub merge_ref_name: String,
}

/// Assigned / unassigned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssigneeEvent {
    #[serde(default)]
    pub actor: Option<Actor>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub user: Option<GqlUser>,
}

/// Labeled / unlabeled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelEvent {
    #[serde(default)]
    pub actor: Option<Actor>,
    pub created_at: DateTime<Utc>,
    pub label: Label,
}

/// Review requested / request removed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequestEvent {
    #[serde(default)]
    pub actor: Option<Actor>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub requested_reviewer: Option<RequestedReviewer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDismissedEvent {
    #[serde(default)]
    pub actor: Option<Actor>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub dismissal_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseRefChangedEvent {
    #[serde(default)]
    pub actor: Option<Actor>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub previous_ref_name: Option<String>,
    #[serde(default)]
    pub current_ref_name: Option<String>,
}

/// Base or head ref force-pushed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefForcePushedEvent {
    #[serde(default)]
    pub actor: Option<Actor>,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "ref", default)]
    pub ref_name: Option<RefName>,
    pub before_commit: CommitHash,
    pub after_commit: CommitHash,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadRefDeletedEvent {
    #[serde(default)]
    pub actor: Option<Actor>,
    pub created_at: DateTime<Utc>,
    pub head_ref_name: String,
}

/// Issue or pull request that referenced this one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSource {
    #[serde(rename = "__typename", default)]
    pub typename: Option<String>,
    pub number: u64,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossReferencedEvent {
    #[serde(default)]
    pub actor: Option<Actor>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub will_close_target: bool,
    pub source: ReferenceSource,
}

// ============================================================================
// Timeline item
// ============================================================================

/// Coarse grouping of timeline entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineEventKind {
    /// Comments, reviews and commits
    Item,
    /// Metadata edits: title, assignees, labels, review requests
    Simple,
    /// Open/close/merge transitions
    State,
    /// Base/head branch changes
    Branch,
    /// Events rendered on their own
    Complex,
}

/// One entry of a pull-request timeline
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineItem {
    IssueComment(GqlIssueComment),
    PullRequestCommit(PullRequestCommit),
    PullRequestReview(PullRequestReview),
    ReviewDismissed(ReviewDismissedEvent),
    ReadyForReview(SimpleEvent),
    RenamedTitle(RenamedTitleEvent),
    Closed(SimpleEvent),
    Reopened(SimpleEvent),
    Merged(MergedEvent),
    Assigned(AssigneeEvent),
    Unassigned(AssigneeEvent),
    Labeled(LabelEvent),
    Unlabeled(LabelEvent),
    ReviewRequested(ReviewRequestEvent),
    ReviewRequestRemoved(ReviewRequestEvent),
    BaseRefChanged(BaseRefChangedEvent),
    BaseRefForcePushed(RefForcePushedEvent),
    HeadRefDeleted(HeadRefDeletedEvent),
    HeadRefForcePushed(RefForcePushedEvent),
    HeadRefRestored(SimpleEvent),
    CrossReferenced(CrossReferencedEvent),
    /// Typename without a dedicated variant
    Unknown { typename: String },
}

impl TimelineItem {
    /// The `__typename` this item was decoded from
    pub fn typename(&self) -> &str {
        match self {
            TimelineItem::IssueComment(_) => "IssueComment",
            TimelineItem::PullRequestCommit(_) => "PullRequestCommit",
            TimelineItem::PullRequestReview(_) => "PullRequestReview",
            TimelineItem::ReviewDismissed(_) => "ReviewDismissedEvent",
            TimelineItem::ReadyForReview(_) => "ReadyForReviewEvent",
            TimelineItem::RenamedTitle(_) => "RenamedTitleEvent",
            TimelineItem::Closed(_) => "ClosedEvent",
            TimelineItem::Reopened(_) => "ReopenedEvent",
            TimelineItem::Merged(_) => "MergedEvent",
            TimelineItem::Assigned(_) => "AssignedEvent",
            TimelineItem::Unassigned(_) => "UnassignedEvent",
            TimelineItem::Labeled(_) => "LabeledEvent",
            TimelineItem::Unlabeled(_) => "UnlabeledEvent",
            TimelineItem::ReviewRequested(_) => "ReviewRequestedEvent",
            TimelineItem::ReviewRequestRemoved(_) => "ReviewRequestRemovedEvent",
            TimelineItem::BaseRefChanged(_) => "BaseRefChangedEvent",
            TimelineItem::BaseRefForcePushed(_) => "BaseRefForcePushedEvent",
            TimelineItem::HeadRefDeleted(_) => "HeadRefDeletedEvent",
            TimelineItem::HeadRefForcePushed(_) => "HeadRefForcePushedEvent",
            TimelineItem::HeadRefRestored(_) => "HeadRefRestoredEvent",
            TimelineItem::CrossReferenced(_) => "CrossReferencedEvent",
            TimelineItem::Unknown { typename } => typename,
        }
    }

    /// Unknown item whose typename is deliberately not shown
    pub fn is_ignored(&self) -> bool {
        match self {
            TimelineItem::Unknown { typename } => IGNORED_TYPES.contains(&typename.as_str()),
            _ => false,
        }
    }

    /// Grouping of this entry, `None` for unknown typenames
    pub fn kind(&self) -> Option<TimelineEventKind> {
        let kind = match self {
            TimelineItem::IssueComment(_)
            | TimelineItem::PullRequestCommit(_)
            | TimelineItem::PullRequestReview(_) => TimelineEventKind::Item,
            TimelineItem::RenamedTitle(_)
            | TimelineItem::Assigned(_)
            | TimelineItem::Unassigned(_)
            | TimelineItem::Labeled(_)
            | TimelineItem::Unlabeled(_)
            | TimelineItem::ReviewRequested(_)
            | TimelineItem::ReviewRequestRemoved(_) => TimelineEventKind::Simple,
            TimelineItem::Closed(_) | TimelineItem::Reopened(_) | TimelineItem::Merged(_) => {
                TimelineEventKind::State
            }
            TimelineItem::BaseRefChanged(_)
            | TimelineItem::BaseRefForcePushed(_)
            | TimelineItem::HeadRefDeleted(_)
            | TimelineItem::HeadRefForcePushed(_)
            | TimelineItem::HeadRefRestored(_) => TimelineEventKind::Branch,
            TimelineItem::ReviewDismissed(_)
            | TimelineItem::ReadyForReview(_)
            | TimelineItem::CrossReferenced(_) => TimelineEventKind::Complex,
            TimelineItem::Unknown { .. } => return None,
        };
        Some(kind)
    }

    /// State the pull request moved to, for state events
    pub fn new_state(&self) -> Option<PullRequestState> {
        match self {
            TimelineItem::Closed(_) => Some(PullRequestState::Closed),
            TimelineItem::Reopened(_) => Some(PullRequestState::Open),
            TimelineItem::Merged(_) => Some(PullRequestState::Merged),
            _ => None,
        }
    }

    /// When the entry happened
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let at = match self {
            TimelineItem::IssueComment(c) => c.created_at,
            TimelineItem::PullRequestCommit(c) => c.commit.author.as_ref()?.date?,
            TimelineItem::PullRequestReview(r) => r.created_at,
            TimelineItem::ReviewDismissed(e) => e.created_at,
            TimelineItem::ReadyForReview(e)
            | TimelineItem::Closed(e)
            | TimelineItem::Reopened(e)
            | TimelineItem::HeadRefRestored(e) => e.created_at,
            TimelineItem::RenamedTitle(e) => e.created_at,
            TimelineItem::Merged(e) => e.created_at,
            TimelineItem::Assigned(e) | TimelineItem::Unassigned(e) => e.created_at,
            TimelineItem::Labeled(e) | TimelineItem::Unlabeled(e) => e.created_at,
            TimelineItem::ReviewRequested(e) | TimelineItem::ReviewRequestRemoved(e) => {
                e.created_at
            }
            TimelineItem::BaseRefChanged(e) => e.created_at,
            TimelineItem::BaseRefForcePushed(e) | TimelineItem::HeadRefForcePushed(e) => {
                e.created_at
            }
            TimelineItem::HeadRefDeleted(e) => e.created_at,
            TimelineItem::CrossReferenced(e) => e.created_at,
            TimelineItem::Unknown { .. } => return None,
        };
        Some(at)
    }

    /// Who performed the action
    pub fn actor(&self) -> Option<&Actor> {
        match self {
            TimelineItem::IssueComment(c) => c.author.as_ref(),
            TimelineItem::PullRequestCommit(_) | TimelineItem::Unknown { .. } => None,
            TimelineItem::PullRequestReview(r) => r.author.as_ref(),
            TimelineItem::ReviewDismissed(e) => e.actor.as_ref(),
            TimelineItem::ReadyForReview(e)
            | TimelineItem::Closed(e)
            | TimelineItem::Reopened(e)
            | TimelineItem::HeadRefRestored(e) => e.actor.as_ref(),
            TimelineItem::RenamedTitle(e) => e.actor.as_ref(),
            TimelineItem::Merged(e) => e.actor.as_ref(),
            TimelineItem::Assigned(e) | TimelineItem::Unassigned(e) => e.actor.as_ref(),
            TimelineItem::Labeled(e) | TimelineItem::Unlabeled(e) => e.actor.as_ref(),
            TimelineItem::ReviewRequested(e) | TimelineItem::ReviewRequestRemoved(e) => {
                e.actor.as_ref()
            }
            TimelineItem::BaseRefChanged(e) => e.actor.as_ref(),
            TimelineItem::BaseRefForcePushed(e) | TimelineItem::HeadRefForcePushed(e) => {
                e.actor.as_ref()
            }
            TimelineItem::HeadRefDeleted(e) => e.actor.as_ref(),
            TimelineItem::CrossReferenced(e) => e.actor.as_ref(),
        }
    }
}

/// Payload written next to its `__typename`
#[derive(Serialize)]
struct Tagged<'a, T> {
    #[serde(rename = "__typename")]
    typename: &'a str,
    #[serde(flatten)]
    payload: &'a T,
}

fn tagged<S: Serializer, T: Serialize>(
    serializer: S,
    typename: &str,
    payload: &T,
) -> Result<S::Ok, S::Error> {
    Tagged { typename, payload }.serialize(serializer)
}

impl Serialize for TimelineItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let typename = self.typename();
        match self {
            TimelineItem::IssueComment(p) => tagged(serializer, typename, p),
            TimelineItem::PullRequestCommit(p) => tagged(serializer, typename, p),
            TimelineItem::PullRequestReview(p) => tagged(serializer, typename, p),
            TimelineItem::ReviewDismissed(p) => tagged(serializer, typename, p),
            TimelineItem::RenamedTitle(p) => tagged(serializer, typename, p),
            TimelineItem::ReadyForReview(p)
            | TimelineItem::Closed(p)
            | TimelineItem::Reopened(p)
            | TimelineItem::HeadRefRestored(p) => tagged(serializer, typename, p),
            TimelineItem::Merged(p) => tagged(serializer, typename, p),
            TimelineItem::Assigned(p) | TimelineItem::Unassigned(p) => {
                tagged(serializer, typename, p)
            }
            TimelineItem::Labeled(p) | TimelineItem::Unlabeled(p) => {
                tagged(serializer, typename, p)
            }
            TimelineItem::ReviewRequested(p) | TimelineItem::ReviewRequestRemoved(p) => {
                tagged(serializer, typename, p)
            }
            TimelineItem::BaseRefChanged(p) => tagged(serializer, typename, p),
            TimelineItem::BaseRefForcePushed(p) | TimelineItem::HeadRefForcePushed(p) => {
                tagged(serializer, typename, p)
            }
            TimelineItem::HeadRefDeleted(p) => tagged(serializer, typename, p),
            TimelineItem::CrossReferenced(p) => tagged(serializer, typename, p),
            TimelineItem::Unknown { typename } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("__typename", typename)?;
                map.end()
            }
        }
    }
}

fn payload<T: DeserializeOwned, E: de::Error>(value: Value) -> Result<T, E> {
    serde_json::from_value(value).map_err(E::custom)
}

impl<'de> Deserialize<'de> for TimelineItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let typename = value
            .get("__typename")
            .and_then(Value::as_str)
            .ok_or_else(|| de::Error::missing_field("__typename"))?
            .to_string();

        let item = match typename.as_str() {
            "IssueComment" => TimelineItem::IssueComment(payload(value)?),
            "PullRequestCommit" => TimelineItem::PullRequestCommit(payload(value)?),
            "PullRequestReview" => TimelineItem::PullRequestReview(payload(value)?),
            "ReviewDismissedEvent" => TimelineItem::ReviewDismissed(payload(value)?),
            "ReadyForReviewEvent" => TimelineItem::ReadyForReview(payload(value)?),
            "RenamedTitleEvent" => TimelineItem::RenamedTitle(payload(value)?),
            "ClosedEvent" => TimelineItem::Closed(payload(value)?),
            "ReopenedEvent" => TimelineItem::Reopened(payload(value)?),
            "MergedEvent" => TimelineItem::Merged(payload(value)?),
            "AssignedEvent" => TimelineItem::Assigned(payload(value)?),
            "UnassignedEvent" => TimelineItem::Unassigned(payload(value)?),
            "LabeledEvent" => TimelineItem::Labeled(payload(value)?),
            "UnlabeledEvent" => TimelineItem::Unlabeled(payload(value)?),
            "ReviewRequestedEvent" => TimelineItem::ReviewRequested(payload(value)?),
            "ReviewRequestRemovedEvent" => TimelineItem::ReviewRequestRemoved(payload(value)?),
            "BaseRefChangedEvent" => TimelineItem::BaseRefChanged(payload(value)?),
            "BaseRefForcePushedEvent" => TimelineItem::BaseRefForcePushed(payload(value)?),
            "HeadRefDeletedEvent" => TimelineItem::HeadRefDeleted(payload(value)?),
            "HeadRefForcePushedEvent" => TimelineItem::HeadRefForcePushed(payload(value)?),
            "HeadRefRestoredEvent" => TimelineItem::HeadRefRestored(payload(value)?),
            "CrossReferencedEvent" => TimelineItem::CrossReferenced(payload(value)?),
            _ => TimelineItem::Unknown { typename },
        };
        Ok(item)
    }
}
