//! REST request catalogue
//!
//! Builders for the Gitee v5 / GitHub v3 endpoints the crate uses. List
//! endpoints return a `PagedRequest` whose next pages reuse the same request
//! shape; single entities return an `ApiRequest`.

use crate::http::{ApiRequest, V3_HTML_JSON_MIME_TYPE};
use crate::model::{
    Branch, Issue, IssueComment, IssueLabel, Organization, PullRequest, Repository, User,
};
use crate::pagination::{PagedRequest, RequestPagination};
use crate::query::{SearchQueryBuilder, UrlQueryBuilder};
use crate::types::{RepositoryPath, ServerPath};

fn api_url(server: &ServerPath, suffix: &str) -> String {
    format!("{}{suffix}", server.api_url())
}

fn repo_url(server: &ServerPath, repo: &RepositoryPath, suffix: &str) -> String {
    api_url(server, &format!("/repos/{repo}{suffix}"))
}

fn paged<T>(url: String, operation: &str) -> PagedRequest<T> {
    PagedRequest::from_request(ApiRequest::get_page(url).with_operation_name(operation))
}

fn page_query(pagination: Option<RequestPagination>) -> String {
    UrlQueryBuilder::new().pagination(pagination).build()
}

// ============================================================================
// Current user
// ============================================================================

/// Profile of the authenticated user
pub fn current_user(server: &ServerPath) -> ApiRequest {
    ApiRequest::get(api_url(server, "/user")).with_operation_name("get profile information")
}

/// Repositories of the authenticated user
pub fn user_repos(
    server: &ServerPath,
    pagination: Option<RequestPagination>,
) -> PagedRequest<Repository> {
    paged(
        api_url(server, &format!("/user/repos{}", page_query(pagination))),
        "get user repositories",
    )
}

/// Organizations of the authenticated user
pub fn user_orgs(
    server: &ServerPath,
    pagination: Option<RequestPagination>,
) -> PagedRequest<Organization> {
    paged(
        api_url(server, &format!("/user/orgs{}", page_query(pagination))),
        "get user organizations",
    )
}

// ============================================================================
// Organizations
// ============================================================================

pub fn org_repos(
    server: &ServerPath,
    organization: &str,
    pagination: Option<RequestPagination>,
) -> PagedRequest<Repository> {
    paged(
        api_url(
            server,
            &format!("/orgs/{organization}/repos{}", page_query(pagination)),
        ),
        "get organisation repositories",
    )
}

// ============================================================================
// Repositories
// ============================================================================

/// Repository details. Run with `execute_optional`: a missing repository is `None`.
pub fn repository(server: &ServerPath, repo: &RepositoryPath) -> ApiRequest {
    ApiRequest::get(repo_url(server, repo, ""))
        .with_operation_name(format!("get information for repository {repo}"))
}

pub fn branches(
    server: &ServerPath,
    repo: &RepositoryPath,
    pagination: Option<RequestPagination>,
) -> PagedRequest<Branch> {
    paged(
        repo_url(server, repo, &format!("/branches{}", page_query(pagination))),
        "get branches",
    )
}

pub fn forks(
    server: &ServerPath,
    repo: &RepositoryPath,
    pagination: Option<RequestPagination>,
) -> PagedRequest<Repository> {
    paged(
        repo_url(server, repo, &format!("/forks{}", page_query(pagination))),
        "get forks",
    )
}

pub fn assignees(
    server: &ServerPath,
    repo: &RepositoryPath,
    pagination: Option<RequestPagination>,
) -> PagedRequest<User> {
    paged(
        repo_url(server, repo, &format!("/assignees{}", page_query(pagination))),
        "get assignees",
    )
}

pub fn labels(
    server: &ServerPath,
    repo: &RepositoryPath,
    pagination: Option<RequestPagination>,
) -> PagedRequest<IssueLabel> {
    paged(
        repo_url(server, repo, &format!("/labels{}", page_query(pagination))),
        "get labels",
    )
}

pub fn collaborators(
    server: &ServerPath,
    repo: &RepositoryPath,
    pagination: Option<RequestPagination>,
) -> PagedRequest<User> {
    paged(
        repo_url(server, repo, &format!("/collaborators{}", page_query(pagination))),
        "get collaborators",
    )
}

// ============================================================================
// Issues
// ============================================================================

/// Issues of a repository, optionally filtered by state and assignee
pub fn issues(
    server: &ServerPath,
    repo: &RepositoryPath,
    state: Option<&str>,
    assignee: Option<&str>,
    pagination: Option<RequestPagination>,
) -> PagedRequest<Issue> {
    let query = UrlQueryBuilder::new()
        .param_opt("state", state)
        .param_opt("assignee", assignee)
        .pagination(pagination)
        .build();
    paged(
        repo_url(server, repo, &format!("/issues{query}")),
        "get issues in repository",
    )
}

/// One issue by number. Run with `execute_optional`.
pub fn issue(server: &ServerPath, repo: &RepositoryPath, number: &str) -> ApiRequest {
    ApiRequest::get(repo_url(server, repo, &format!("/issues/{number}")))
        .with_operation_name(format!("get issue {number}"))
}

/// Comments of an issue, with rendered bodies
pub fn issue_comments(
    server: &ServerPath,
    repo: &RepositoryPath,
    number: &str,
    pagination: Option<RequestPagination>,
) -> PagedRequest<IssueComment> {
    let url = repo_url(
        server,
        repo,
        &format!("/issues/{number}/comments{}", page_query(pagination)),
    );
    PagedRequest::from_request(
        ApiRequest::get_page(url)
            .with_accept(V3_HTML_JSON_MIME_TYPE)
            .with_operation_name("get comments for issue"),
    )
}

/// Issue search, scoped to a repository when given
pub fn search_issues(
    server: &ServerPath,
    repo: Option<&RepositoryPath>,
    state: Option<&str>,
    assignee: Option<&str>,
    query: Option<&str>,
    pagination: Option<RequestPagination>,
) -> PagedRequest<Issue> {
    let search = SearchQueryBuilder::new()
        .qualifier("repo", repo.map(ToString::to_string))
        .qualifier("state", state)
        .qualifier("assignee", assignee)
        .query(query)
        .build();
    let url_query = UrlQueryBuilder::new()
        .param("q", search)
        .pagination(pagination)
        .build();

    PagedRequest::from_request(
        ApiRequest::get_search_page(api_url(server, &format!("/search/issues{url_query}")))
            .with_operation_name("search issues in repository"),
    )
}

// ============================================================================
// Pull requests
// ============================================================================

/// Pull requests of a repository, optionally filtered by state
pub fn pull_requests(
    server: &ServerPath,
    repo: &RepositoryPath,
    state: Option<&str>,
    pagination: Option<RequestPagination>,
) -> PagedRequest<PullRequest> {
    let query = UrlQueryBuilder::new()
        .param_opt("state", state)
        .pagination(pagination)
        .build();
    paged(
        repo_url(server, repo, &format!("/pulls{query}")),
        "get pull requests",
    )
}

#[cfg(test)]
mod rest_tests {
    use super::*;
    use crate::http::PageEnvelope;
    use pretty_assertions::assert_eq;

    fn repo() -> RepositoryPath {
        RepositoryPath::new("owner", "repo")
    }

    #[test]
    fn test_current_user_urls() {
        assert_eq!(
            current_user(&ServerPath::gitee()).url,
            "https://gitee.com/api/v5/user"
        );
        assert_eq!(
            current_user(&ServerPath::github()).url,
            "https://api.github.com/user"
        );
        assert_eq!(
            current_user(&ServerPath::new("git.corp.example")).url,
            "https://git.corp.example/api/v3/user"
        );
    }

    #[test]
    fn test_list_urls() {
        let server = ServerPath::gitee();
        assert_eq!(
            branches(&server, &repo(), None).initial().url,
            "https://gitee.com/api/v5/repos/owner/repo/branches"
        );
        assert_eq!(
            user_repos(&server, Some(RequestPagination::default()))
                .initial()
                .url,
            "https://gitee.com/api/v5/user/repos?page=1&per_page=100"
        );
        assert_eq!(
            org_repos(&server, "oschina", None).initial().url,
            "https://gitee.com/api/v5/orgs/oschina/repos"
        );
    }

    #[test]
    fn test_issues_url() {
        let request = issues(
            &ServerPath::github(),
            &repo(),
            Some("all"),
            Some("alice"),
            None,
        );
        assert_eq!(
            request.initial().url,
            "https://api.github.com/repos/owner/repo/issues?state=all&assignee=alice"
        );
        assert_eq!(
            request.initial().operation_name.as_deref(),
            Some("get issues in repository")
        );
    }

    #[test]
    fn test_search_issues_url() {
        let request = search_issues(
            &ServerPath::github(),
            Some(&repo()),
            Some("open"),
            None,
            Some("crash"),
            None,
        );
        assert_eq!(
            request.initial().url,
            "https://api.github.com/search/issues?q=repo%3Aowner%2Frepo+state%3Aopen+crash"
        );
        assert_eq!(request.initial().envelope, PageEnvelope::SearchResult);
    }

    #[test]
    fn test_issue_comments_accept() {
        let request = issue_comments(&ServerPath::gitee(), &repo(), "I4ABCD", None);
        assert_eq!(
            request.initial().accept.as_deref(),
            Some(V3_HTML_JSON_MIME_TYPE)
        );
        assert_eq!(
            request.initial().url,
            "https://gitee.com/api/v5/repos/owner/repo/issues/I4ABCD/comments"
        );
    }
}
