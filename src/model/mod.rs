//! API data model
//!
//! Immutable value objects deserialized from API responses.
//!
//! # Overview
//!
//! - `rest` - entities returned by the Gitee v5 / GitHub v3 REST APIs
//! - `graphql` - entities returned by GraphQL queries, plus the GraphQL envelope
//! - `timeline` - the pull-request timeline, a sum type keyed by `__typename`

mod graphql;
mod rest;
mod timeline;

pub use graphql::{
    Actor, CommitHash, CommitShort, CursorPageInfo, GitActor, GqlIssueComment, GqlUser,
    GraphQLError, GraphQLPagedResponse, GraphQLResponse, Label, Nodes,
    PullRequestCommit, PullRequestReview, PullRequestShort, PullRequestState, RefName,
    RequestedReviewer, ReviewState, Team,
};
pub use rest::{
    ApiErrorMessage, ApiFieldError, Branch, BranchRef, Issue, IssueComment, IssueLabel,
    IssueNumber, IssueState, Organization, PullRequest, Repository, SearchResult, User,
};
pub use timeline::{
    AssigneeEvent, BaseRefChangedEvent, CrossReferencedEvent, HeadRefDeletedEvent, LabelEvent,
    MergedEvent, RefForcePushedEvent, ReferenceSource, RenamedTitleEvent, ReviewDismissedEvent,
    ReviewRequestEvent, SimpleEvent, TimelineEventKind, TimelineItem, IGNORED_TYPES,
};

/// Items with a stable identity, used to merge incremental list updates
pub trait Identified {
    /// Stable identifier of the item
    fn item_id(&self) -> String;
}

#[cfg(test)]
mod tests;
