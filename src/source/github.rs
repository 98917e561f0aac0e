//! GitHub GraphQL API release source

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::{
    DEFAULT_GITHUB_API_URL, DEFAULT_PAGE_SIZE, DEFAULT_POLICY_PATH, FETCH_TIMEOUT_MS, FetchConfig,
    GitHubConfig,
};
use crate::source::error::SourceError;
use crate::source::traits::ReleaseSource;
use crate::source::types::{ReleaseEdge, ReleasePage, Repository};

/// Repositories fetched per organization page
const REPOSITORIES_PER_PAGE: u32 = 50;

const REPOSITORIES_QUERY: &str = r#"
query($org: String!, $after: String, $pageSize: Int!, $repositoriesPerPage: Int!, $policyExpression: String!) {
  organization(login: $org) {
    repositories(first: $repositoriesPerPage, after: $after) {
      pageInfo { hasNextPage endCursor }
      nodes {
        name
        policy: object(expression: $policyExpression) { ... on Blob { text } }
        releases(last: $pageSize, orderBy: {field: CREATED_AT, direction: ASC}) {
          pageInfo { hasPreviousPage startCursor }
          nodes { tagName publishedAt tagCommit { oid } }
        }
      }
    }
  }
}
"#;

const EARLIER_RELEASES_QUERY: &str = r#"
query($org: String!, $name: String!, $before: String!, $pageSize: Int!) {
  repository(owner: $org, name: $name) {
    releases(last: $pageSize, before: $before, orderBy: {field: CREATED_AT, direction: ASC}) {
      pageInfo { hasPreviousPage startCursor }
      nodes { tagName publishedAt tagCommit { oid } }
    }
  }
}
"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct OrganizationData {
    organization: Option<Organization>,
}

#[derive(Debug, Deserialize)]
struct Organization {
    repositories: RepositoryConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryConnection {
    page_info: ForwardPageInfo,
    nodes: Vec<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForwardPageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RepositoryNode {
    name: String,
    policy: Option<BlobNode>,
    releases: ReleaseConnection,
}

#[derive(Debug, Deserialize)]
struct BlobNode {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RepositoryData {
    repository: Option<RepositoryReleases>,
}

#[derive(Debug, Deserialize)]
struct RepositoryReleases {
    releases: ReleaseConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReleaseConnection {
    page_info: BackwardPageInfo,
    nodes: Vec<ReleaseNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackwardPageInfo {
    has_previous_page: bool,
    start_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReleaseNode {
    tag_name: String,
    published_at: Option<DateTime<Utc>>,
    tag_commit: Option<CommitNode>,
}

#[derive(Debug, Deserialize)]
struct CommitNode {
    oid: String,
}

impl ReleaseConnection {
    fn into_page(self) -> ReleasePage {
        let releases = self
            .nodes
            .into_iter()
            .filter_map(|node| match (node.published_at, node.tag_commit) {
                (Some(published_at), Some(commit)) => Some(ReleaseEdge {
                    tag_name: node.tag_name,
                    commit: commit.oid,
                    published_at,
                }),
                _ => {
                    debug!("Skipping unpublished release {}", node.tag_name);
                    None
                }
            })
            .collect();

        ReleasePage {
            has_earlier_page: self.page_info.has_previous_page,
            start_cursor: self.page_info.start_cursor,
            releases,
        }
    }
}

/// Release source backed by the GitHub GraphQL API
pub struct GitHubSource {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    page_size: u32,
    policy_path: String,
}

impl GitHubSource {
    /// Creates a new GitHubSource with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, Duration::from_millis(FETCH_TIMEOUT_MS))
    }

    fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("support-window")
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to configure HTTP client, using defaults: {}", e);
                reqwest::Client::new()
            });
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            page_size: DEFAULT_PAGE_SIZE,
            policy_path: DEFAULT_POLICY_PATH.to_string(),
        }
    }

    /// Creates a GitHubSource from configuration and an optional API token
    pub fn from_config(github: &GitHubConfig, fetch: &FetchConfig, token: Option<String>) -> Self {
        Self::with_timeout(&github.base_url, Duration::from_millis(fetch.timeout_ms))
            .with_token(token)
            .with_page_size(fetch.page_size)
            .with_policy_path(&github.policy_path)
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_policy_path(mut self, policy_path: &str) -> Self {
        self.policy_path = policy_path.to_string();
        self
    }

    async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
        subject: &str,
    ) -> Result<T, SourceError> {
        let url = format!("{}/graphql", self.base_url);

        let mut request = self
            .client
            .post(&url)
            .json(&json!({ "query": query, "variables": variables }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || (status == reqwest::StatusCode::FORBIDDEN
                && response.headers().contains_key("retry-after"))
        {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(SourceError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(SourceError::Unauthorized(format!(
                "GitHub API returned status {} for {}",
                status, subject
            )));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(subject.to_string()));
        }

        if !status.is_success() {
            warn!("GitHub API returned status {}: {}", status, url);
            return Err(SourceError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let body: GraphQlResponse<T> = response.json().await.map_err(|e| {
            warn!("Failed to parse GitHub GraphQL response: {}", e);
            SourceError::InvalidResponse(e.to_string())
        })?;

        if !body.errors.is_empty() {
            let messages: Vec<_> = body.errors.into_iter().map(|e| e.message).collect();
            warn!("GitHub GraphQL errors for {}: {:?}", subject, messages);
            return Err(SourceError::InvalidResponse(messages.join("; ")));
        }

        body.data.ok_or_else(|| {
            SourceError::InvalidResponse(format!("No data returned for {}", subject))
        })
    }
}

impl Default for GitHubSource {
    fn default() -> Self {
        Self::new(DEFAULT_GITHUB_API_URL)
    }
}

#[async_trait::async_trait]
impl ReleaseSource for GitHubSource {
    async fn fetch_repositories(&self, org: &str) -> Result<Vec<Repository>, SourceError> {
        let policy_expression = format!("HEAD:{}", self.policy_path);
        let mut repositories = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let variables = json!({
                "org": org,
                "after": after,
                "pageSize": self.page_size,
                "repositoriesPerPage": REPOSITORIES_PER_PAGE,
                "policyExpression": policy_expression,
            });
            let data: OrganizationData = self.query(REPOSITORIES_QUERY, variables, org).await?;
            let connection = data
                .organization
                .ok_or_else(|| SourceError::NotFound(org.to_string()))?
                .repositories;

            repositories.extend(connection.nodes.into_iter().map(|node| Repository {
                org: org.to_string(),
                name: node.name,
                policy_document: node.policy.and_then(|blob| blob.text),
                releases: node.releases.into_page(),
            }));

            match connection.page_info.end_cursor {
                Some(cursor) if connection.page_info.has_next_page => {
                    if after.as_deref() == Some(cursor.as_str()) {
                        warn!(
                            "Repository pages of {} did not advance past {}; stopping",
                            org, cursor
                        );
                        break;
                    }
                    after = Some(cursor);
                }
                _ => break,
            }
        }

        debug!("Fetched {} repositories for {}", repositories.len(), org);
        Ok(repositories)
    }

    async fn fetch_earlier_releases(
        &self,
        org: &str,
        repository: &str,
        cursor: &str,
    ) -> Result<ReleasePage, SourceError> {
        let subject = format!("{}/{}", org, repository);
        let variables = json!({
            "org": org,
            "name": repository,
            "before": cursor,
            "pageSize": self.page_size,
        });
        let data: RepositoryData = self
            .query(EARLIER_RELEASES_QUERY, variables, &subject)
            .await?;
        let releases = data
            .repository
            .ok_or(SourceError::NotFound(subject))?
            .releases;

        Ok(releases.into_page())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    const REPOSITORIES_BODY: &str = r#"{
        "data": {
            "organization": {
                "repositories": {
                    "pageInfo": {"hasNextPage": false, "endCursor": "r1"},
                    "nodes": [
                        {
                            "name": "widget",
                            "policy": {"text": "library: true\n"},
                            "releases": {
                                "pageInfo": {"hasPreviousPage": true, "startCursor": "c1"},
                                "nodes": [
                                    {"tagName": "v1.1.0", "publishedAt": "2024-02-01T10:00:00Z", "tagCommit": {"oid": "bbb"}},
                                    {"tagName": "v1.2.0", "publishedAt": null, "tagCommit": {"oid": "ccc"}}
                                ]
                            }
                        },
                        {
                            "name": "docs",
                            "policy": null,
                            "releases": {
                                "pageInfo": {"hasPreviousPage": false, "startCursor": null},
                                "nodes": []
                            }
                        }
                    ]
                }
            }
        }
    }"#;

    #[tokio::test]
    async fn fetch_repositories_returns_repositories_with_release_pages() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/graphql")
            .match_body(Matcher::PartialJson(json!({"variables": {"org": "acme"}})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(REPOSITORIES_BODY)
            .create_async()
            .await;

        let source = GitHubSource::new(&server.url());
        let result = source.fetch_repositories("acme").await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.len(), 2);

        let widget = &result[0];
        assert_eq!(widget.org, "acme");
        assert_eq!(widget.name, "widget");
        assert_eq!(widget.policy_document.as_deref(), Some("library: true\n"));
        assert_eq!(widget.releases.earlier_cursor(), Some("c1"));
        assert_eq!(
            widget.releases.releases,
            vec![ReleaseEdge {
                tag_name: "v1.1.0".to_string(),
                commit: "bbb".to_string(),
                published_at: "2024-02-01T10:00:00Z".parse().unwrap(),
            }]
        );

        let docs = &result[1];
        assert_eq!(docs.policy_document, None);
        assert_eq!(docs.releases.earlier_cursor(), None);
    }

    #[tokio::test]
    async fn fetch_repositories_follows_repository_pages() {
        let mut server = Server::new_async().await;

        let first = server
            .mock("POST", "/graphql")
            .match_body(Matcher::PartialJson(json!({"variables": {"after": null}})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data": {"organization": {"repositories": {
                    "pageInfo": {"hasNextPage": true, "endCursor": "r1"},
                    "nodes": [{"name": "one", "policy": null, "releases": {
                        "pageInfo": {"hasPreviousPage": false, "startCursor": null}, "nodes": []}}]
                }}}}"#,
            )
            .create_async()
            .await;
        let second = server
            .mock("POST", "/graphql")
            .match_body(Matcher::PartialJson(json!({"variables": {"after": "r1"}})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data": {"organization": {"repositories": {
                    "pageInfo": {"hasNextPage": false, "endCursor": "r2"},
                    "nodes": [{"name": "two", "policy": null, "releases": {
                        "pageInfo": {"hasPreviousPage": false, "startCursor": null}, "nodes": []}}]
                }}}}"#,
            )
            .create_async()
            .await;

        let source = GitHubSource::new(&server.url());
        let result = source.fetch_repositories("acme").await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        let names: Vec<_> = result.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn fetch_repositories_stops_when_cursor_does_not_advance() {
        let mut server = Server::new_async().await;

        let first = server
            .mock("POST", "/graphql")
            .match_body(Matcher::PartialJson(json!({"variables": {"after": null}})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data": {"organization": {"repositories": {
                    "pageInfo": {"hasNextPage": true, "endCursor": "r1"},
                    "nodes": [{"name": "one", "policy": null, "releases": {
                        "pageInfo": {"hasPreviousPage": false, "startCursor": null}, "nodes": []}}]
                }}}}"#,
            )
            .expect(1)
            .create_async()
            .await;
        let stalled = server
            .mock("POST", "/graphql")
            .match_body(Matcher::PartialJson(json!({"variables": {"after": "r1"}})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data": {"organization": {"repositories": {
                    "pageInfo": {"hasNextPage": true, "endCursor": "r1"},
                    "nodes": [{"name": "two", "policy": null, "releases": {
                        "pageInfo": {"hasPreviousPage": false, "startCursor": null}, "nodes": []}}]
                }}}}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let source = GitHubSource::new(&server.url());
        let result = source.fetch_repositories("acme").await.unwrap();

        first.assert_async().await;
        stalled.assert_async().await;
        let names: Vec<_> = result.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn fetch_earlier_releases_requests_page_before_cursor() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/graphql")
            .match_body(Matcher::PartialJson(json!({
                "variables": {"org": "acme", "name": "widget", "before": "c1"}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data": {"repository": {"releases": {
                    "pageInfo": {"hasPreviousPage": false, "startCursor": "c0"},
                    "nodes": [
                        {"tagName": "v1.0.0", "publishedAt": "2024-01-01T00:00:00Z", "tagCommit": {"oid": "aaa"}}
                    ]
                }}}}"#,
            )
            .create_async()
            .await;

        let source = GitHubSource::new(&server.url());
        let page = source
            .fetch_earlier_releases("acme", "widget", "c1")
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(!page.has_earlier_page);
        assert_eq!(page.releases.len(), 1);
        assert_eq!(page.releases[0].tag_name, "v1.0.0");
    }

    #[tokio::test]
    async fn sends_bearer_token_when_configured() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/graphql")
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": {"repository": {"releases": {
                "pageInfo": {"hasPreviousPage": false, "startCursor": null}, "nodes": []}}}}"#)
            .create_async()
            .await;

        let source = GitHubSource::new(&server.url()).with_token(Some("secret".to_string()));
        let page = source
            .fetch_earlier_releases("acme", "widget", "c1")
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(page.releases.is_empty());
    }

    #[tokio::test]
    async fn returns_not_found_for_unknown_organization() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": {"organization": null}}"#)
            .create_async()
            .await;

        let source = GitHubSource::new(&server.url());
        let result = source.fetch_repositories("nobody").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(SourceError::NotFound(org)) if org == "nobody"));
    }

    #[tokio::test]
    async fn returns_invalid_response_for_graphql_errors() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": null, "errors": [{"message": "Something went wrong"}]}"#)
            .create_async()
            .await;

        let source = GitHubSource::new(&server.url());
        let result = source.fetch_repositories("acme").await;

        mock.assert_async().await;
        assert!(
            matches!(result, Err(SourceError::InvalidResponse(msg)) if msg == "Something went wrong")
        );
    }

    #[tokio::test]
    async fn returns_rate_limited_for_429() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/graphql")
            .with_status(429)
            .with_header("retry-after", "60")
            .with_body(r#"{"message": "API rate limit exceeded"}"#)
            .create_async()
            .await;

        let source = GitHubSource::new(&server.url());
        let result = source.fetch_repositories("acme").await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(SourceError::RateLimited {
                retry_after_secs: Some(60)
            })
        ));
    }

    #[tokio::test]
    async fn returns_unauthorized_for_401() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/graphql")
            .with_status(401)
            .with_body(r#"{"message": "Bad credentials"}"#)
            .create_async()
            .await;

        let source = GitHubSource::new(&server.url());
        let result = source.fetch_repositories("acme").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(SourceError::Unauthorized(_))));
    }
}
