//! Tests for the data model

use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

// ============================================================================
// Timeline Tests
// ============================================================================

#[test]
fn test_timeline_known_variants() {
    let items: Vec<TimelineItem> = serde_json::from_value(json!([
        {
            "__typename": "IssueComment",
            "id": "IC_1",
            "author": {"login": "alice", "url": "https://gitee.com/alice"},
            "body": "Looks good",
            "createdAt": "2024-03-01T10:00:00Z",
            "viewerCanDelete": true
        },
        {
            "__typename": "LabeledEvent",
            "actor": {"login": "bob", "url": "https://gitee.com/bob"},
            "createdAt": "2024-03-01T11:00:00Z",
            "label": {"name": "bug", "color": "d73a4a"}
        },
        {
            "__typename": "MergedEvent",
            "actor": null,
            "createdAt": "2024-03-02T09:30:00Z",
            "commit": null,
            "mergeRefName": "master"
        }
    ]))
    .unwrap();

    assert_eq!(items.len(), 3);

    match &items[0] {
        TimelineItem::IssueComment(comment) => {
            assert_eq!(comment.body, "Looks good");
            assert!(comment.viewer_can_delete);
            assert!(!comment.viewer_can_update);
        }
        other => panic!("Expected IssueComment, got {other:?}"),
    }
    assert_eq!(items[0].kind(), Some(TimelineEventKind::Item));
    assert_eq!(items[0].actor().map(|a| a.login.as_str()), Some("alice"));

    match &items[1] {
        TimelineItem::Labeled(event) => assert_eq!(event.label.name, "bug"),
        other => panic!("Expected LabeledEvent, got {other:?}"),
    }
    assert_eq!(items[1].kind(), Some(TimelineEventKind::Simple));

    assert_eq!(items[2].typename(), "MergedEvent");
    assert_eq!(items[2].kind(), Some(TimelineEventKind::State));
    assert_eq!(items[2].new_state(), Some(PullRequestState::Merged));
    assert!(items[2].actor().is_none());
}

#[test]
fn test_timeline_force_push_event() {
    let item: TimelineItem = serde_json::from_value(json!({
        "__typename": "HeadRefForcePushedEvent",
        "createdAt": "2024-03-01T10:00:00Z",
        "ref": {"name": "feature"},
        "beforeCommit": {"oid": "aaaaaaa1", "abbreviatedOid": "aaaaaaa"},
        "afterCommit": {"oid": "bbbbbbb2", "abbreviatedOid": "bbbbbbb"}
    }))
    .unwrap();

    assert_eq!(item.kind(), Some(TimelineEventKind::Branch));
    match item {
        TimelineItem::HeadRefForcePushed(event) => {
            assert_eq!(event.ref_name.unwrap().name, "feature");
            assert_eq!(event.after_commit.abbreviated_oid, "bbbbbbb");
        }
        other => panic!("Expected HeadRefForcePushedEvent, got {other:?}"),
    }
}

#[test]
fn test_timeline_unknown_and_ignored() {
    let unknown: TimelineItem = serde_json::from_value(json!({
        "__typename": "PinnedEvent",
        "createdAt": "2024-03-01T10:00:00Z"
    }))
    .unwrap();
    assert_eq!(
        unknown,
        TimelineItem::Unknown {
            typename: "PinnedEvent".to_string()
        }
    );
    assert!(!unknown.is_ignored());
    assert!(unknown.kind().is_none());
    assert!(unknown.created_at().is_none());

    let ignored: TimelineItem =
        serde_json::from_value(json!({"__typename": "MentionedEvent"})).unwrap();
    assert!(ignored.is_ignored());
    assert_eq!(ignored.typename(), "MentionedEvent");
}

#[test]
fn test_timeline_missing_typename_fails() {
    let result: Result<TimelineItem, _> = serde_json::from_value(json!({"body": "x"}));
    assert!(result.is_err());
}

#[test]
fn test_timeline_known_typename_with_bad_payload_fails() {
    let result: Result<TimelineItem, _> =
        serde_json::from_value(json!({"__typename": "LabeledEvent", "createdAt": "nope"}));
    assert!(result.is_err());
}

#[test]
fn test_timeline_serializes_with_typename() {
    let item: TimelineItem = serde_json::from_value(json!({
        "__typename": "ClosedEvent",
        "createdAt": "2024-03-01T10:00:00Z"
    }))
    .unwrap();
    let value = serde_json::to_value(&item).unwrap();
    assert_eq!(value["__typename"], "ClosedEvent");
    assert_eq!(item.new_state(), Some(PullRequestState::Closed));
    assert_eq!(serde_json::from_value::<TimelineItem>(value).unwrap(), item);
}

#[test]
fn test_timeline_unknown_serializes_original_typename() {
    let item = TimelineItem::Unknown {
        typename: "PinnedEvent".to_string(),
    };
    let value = serde_json::to_value(&item).unwrap();
    assert_eq!(value, json!({"__typename": "PinnedEvent"}));
    assert_eq!(serde_json::from_value::<TimelineItem>(value).unwrap(), item);
}

// ============================================================================
// Pull Request Tests
// ============================================================================

#[test]
fn test_pull_request_short() {
    let pr: PullRequestShort = serde_json::from_value(json!({
        "id": "PR_1",
        "url": "https://github.com/o/r/pull/7",
        "number": 7,
        "title": "Add pager",
        "state": "OPEN",
        "isDraft": true,
        "author": {"login": "alice", "url": "https://github.com/alice"},
        "createdAt": "2024-03-01T10:00:00Z",
        "assignees": {"nodes": [{"id": "U_1", "login": "bob", "url": "https://github.com/bob"}]},
        "labels": {"nodes": [{"name": "enhancement"}]},
        "reviewRequests": {"nodes": [
            {"requestedReviewer": {"__typename": "Team", "id": "T_1", "slug": "core",
                                   "url": "https://github.com/orgs/o/teams/core",
                                   "combinedSlug": "o/core"}},
            {"requestedReviewer": {"__typename": "Mannequin"}}
        ]},
        "reviewThreads": {"nodes": [
            {"isResolved": false, "isOutdated": false},
            {"isResolved": true, "isOutdated": false},
            {"isResolved": false, "isOutdated": true}
        ]}
    }))
    .unwrap();

    assert_eq!(pr.to_string(), "#7 Add pager");
    assert!(pr.is_draft);
    assert_eq!(pr.assignees()[0].login, "bob");
    assert_eq!(pr.labels()[0].name, "enhancement");
    let reviewers: Vec<_> = pr.requested_reviewers().collect();
    assert_eq!(reviewers.len(), 2);
    assert_eq!(reviewers[0].short_name(), Some("o/core"));
    assert_eq!(reviewers[1], &RequestedReviewer::Unknown);
    assert_eq!(pr.unresolved_review_threads_count(), 1);
    assert_eq!(pr.item_id(), "PR_1");
}

#[test]
fn test_pull_request_state_as_issue_state() {
    assert_eq!(PullRequestState::Open.as_issue_state(), IssueState::Open);
    assert_eq!(PullRequestState::Closed.as_issue_state(), IssueState::Closed);
    assert_eq!(PullRequestState::Merged.as_issue_state(), IssueState::Closed);
}

// ============================================================================
// REST Entity Tests
// ============================================================================

#[test]
fn test_issue_number_forms() {
    let gitee: Issue = serde_json::from_value(json!({
        "id": 1,
        "number": "I4ABCD",
        "title": "Crash",
        "state": "progressing",
        "created_at": "2024-03-01T10:00:00+08:00"
    }))
    .unwrap();
    assert_eq!(gitee.number, IssueNumber::Ident("I4ABCD".to_string()));
    assert_eq!(gitee.state, IssueState::Progressing);

    let github: Issue = serde_json::from_value(json!({
        "id": 2,
        "number": 42,
        "title": "Crash",
        "state": "open",
        "created_at": "2024-03-01T10:00:00Z",
        "labels": [{"name": "bug"}]
    }))
    .unwrap();
    assert_eq!(github.number.to_string(), "42");
    assert_eq!(github.labels[0].name, "bug");
}

#[test]
fn test_api_error_presentable() {
    let error: ApiErrorMessage = serde_json::from_value(json!({
        "message": "Validation Failed",
        "errors": [
            {"resource": "Issue", "field": "title", "code": "missing_field"},
            {"message": "body is too long"}
        ]
    }))
    .unwrap();
    assert_eq!(
        error.presentable_error(),
        "Validation Failed (title missing_field, body is too long)"
    );

    let plain = ApiErrorMessage {
        message: "Not Found".to_string(),
        ..Default::default()
    };
    assert_eq!(plain.presentable_error(), "Not Found");
    assert!(!plain.contains_reason("rate limit"));
}

#[test]
fn test_search_result() {
    let result: SearchResult<Branch> = serde_json::from_value(json!({
        "total_count": 2,
        "incomplete_results": false,
        "items": [{"name": "main"}, {"name": "dev", "protected": true}]
    }))
    .unwrap();
    assert_eq!(result.items.len(), 2);
    assert!(result.items[1].protected);
    assert_eq!(result.total_count, Some(2));
}
