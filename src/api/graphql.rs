//! GraphQL request catalogue

use crate::http::ApiRequest;
use crate::pagination::GraphQLRequestPagination;
use crate::types::{RepositoryCoordinates, ServerPath};
use serde_json::Value;

const ACTOR_FIELDS: &str = "login url avatarUrl";
const USER_FIELDS: &str = "id login url avatarUrl name";
const TEAM_FIELDS: &str = "id slug url name combinedSlug";
const PAGE_INFO_FIELDS: &str = "pageInfo { hasNextPage endCursor hasPreviousPage startCursor }";

fn pull_request_short_fields() -> String {
    format!(
        "id url number title state isDraft createdAt viewerCanUpdate viewerDidAuthor \
         author {{ {ACTOR_FIELDS} }} \
         assignees(first: 100) {{ nodes {{ {USER_FIELDS} }} }} \
         labels(first: 100) {{ nodes {{ name color }} }} \
         reviewRequests(first: 100) {{ nodes {{ requestedReviewer {{ __typename \
           ... on User {{ {USER_FIELDS} }} ... on Team {{ {TEAM_FIELDS} }} }} }} }} \
         reviewThreads(first: 100) {{ nodes {{ isResolved isOutdated }} }}"
    )
}

/// Pull-request search over `search(type: ISSUE)`
pub fn pull_request_search_query() -> String {
    format!(
        "query($query: String!, $pageSize: Int = 100, $cursor: String) {{ \
           search(first: $pageSize, after: $cursor, type: ISSUE, query: $query) {{ \
             {PAGE_INFO_FIELDS} \
             nodes {{ ... on PullRequest {{ {} }} }} \
           }} \
         }}",
        pull_request_short_fields()
    )
}

fn timeline_item_fields() -> String {
    let actor = format!("actor {{ {ACTOR_FIELDS} }} createdAt");
    let commit_hash = "oid abbreviatedOid";
    let commit_short = "oid abbreviatedOid url messageHeadline author { name email date }";
    let reviewer = format!(
        "requestedReviewer {{ __typename ... on User {{ {USER_FIELDS} }} ... on Team {{ {TEAM_FIELDS} }} }}"
    );
    let force_push = format!(
        "{actor} ref {{ name }} beforeCommit {{ {commit_hash} }} afterCommit {{ {commit_hash} }}"
    );

    format!(
        "__typename \
         ... on IssueComment {{ id author {{ {ACTOR_FIELDS} }} body createdAt viewerCanDelete viewerCanUpdate }} \
         ... on PullRequestCommit {{ id url commit {{ {commit_short} }} }} \
         ... on PullRequestReview {{ id url author {{ {ACTOR_FIELDS} }} body state createdAt viewerCanUpdate }} \
         ... on ReviewDismissedEvent {{ {actor} dismissalMessage }} \
         ... on ReadyForReviewEvent {{ {actor} }} \
         ... on RenamedTitleEvent {{ {actor} previousTitle currentTitle }} \
         ... on ClosedEvent {{ {actor} }} \
         ... on ReopenedEvent {{ {actor} }} \
         ... on MergedEvent {{ {actor} mergeRefName commit {{ {commit_short} }} }} \
         ... on AssignedEvent {{ {actor} user {{ {USER_FIELDS} }} }} \
         ... on UnassignedEvent {{ {actor} user {{ {USER_FIELDS} }} }} \
         ... on LabeledEvent {{ {actor} label {{ name color }} }} \
         ... on UnlabeledEvent {{ {actor} label {{ name color }} }} \
         ... on ReviewRequestedEvent {{ {actor} {reviewer} }} \
         ... on ReviewRequestRemovedEvent {{ {actor} {reviewer} }} \
         ... on BaseRefChangedEvent {{ {actor} previousRefName currentRefName }} \
         ... on BaseRefForcePushedEvent {{ {force_push} }} \
         ... on HeadRefDeletedEvent {{ {actor} headRefName }} \
         ... on HeadRefForcePushedEvent {{ {force_push} }} \
         ... on HeadRefRestoredEvent {{ {actor} }} \
         ... on CrossReferencedEvent {{ {actor} willCloseTarget source {{ __typename \
           ... on Issue {{ number title url }} ... on PullRequest {{ number title url }} }} }}"
    )
}

/// Timeline items of one pull request
pub fn pull_request_timeline_query() -> String {
    format!(
        "query($repoOwner: String!, $repoName: String!, $number: Int!, $pageSize: Int = 100, \
                $cursor: String, $since: DateTime) {{ \
           repository(owner: $repoOwner, name: $repoName) {{ \
             pullRequest(number: $number) {{ \
               timelineItems(first: $pageSize, after: $cursor, since: $since) {{ \
                 {PAGE_INFO_FIELDS} \
                 nodes {{ {} }} \
               }} \
             }} \
           }} \
         }}",
        timeline_item_fields()
    )
}

/// One page of a pull-request search
pub fn search_pull_requests(
    server: &ServerPath,
    search_query: &str,
    pagination: &GraphQLRequestPagination,
) -> ApiRequest {
    let mut variables = pagination.to_variables();
    variables.insert("query".to_string(), Value::String(search_query.to_string()));

    ApiRequest::graphql(
        server.graphql_url(),
        &pull_request_search_query(),
        Value::Object(variables),
        &["search"],
    )
    .with_operation_name("search pull requests")
}

/// One page of a pull request's timeline
pub fn pull_request_timeline(
    repository: &RepositoryCoordinates,
    number: u64,
    pagination: &GraphQLRequestPagination,
) -> ApiRequest {
    let mut variables = pagination.to_variables();
    variables.insert(
        "repoOwner".to_string(),
        Value::String(repository.path.owner.clone()),
    );
    variables.insert(
        "repoName".to_string(),
        Value::String(repository.path.repository.clone()),
    );
    variables.insert("number".to_string(), Value::from(number));

    ApiRequest::graphql(
        repository.server.graphql_url(),
        &pull_request_timeline_query(),
        Value::Object(variables),
        &["repository", "pullRequest", "timelineItems"],
    )
    .with_operation_name(format!("load timeline of pull request #{number}"))
}
