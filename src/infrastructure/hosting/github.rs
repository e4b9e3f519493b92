//! GitHub API 연동 구현.

use anyhow::{Context, Result};
use async_trait::async_trait;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use super::graphql;
use crate::application::config::GitHubEndpoints;
use crate::application::ports::HostingGateway;
use crate::domain::context::{IssueSnapshot, PAGE_LIMIT, PullRequestSnapshot};
use crate::domain::run::{NewPullRequest, RemoteComment};
use crate::domain::trigger::RepoRef;

const USER_AGENT: &str = "commentpilot";

/// 하나의 이슈/PR 번호에 묶인 GitHub 클라이언트.
pub struct GitHubClient {
    client: Client,
    repo: RepoRef,
    number: u64,
    endpoints: GitHubEndpoints,
    token: String,
}

impl GitHubClient {
    pub fn new(repo: RepoRef, number: u64, endpoints: GitHubEndpoints, token: String) -> Self {
        Self {
            client: Client::new(),
            repo,
            number,
            endpoints,
            token,
        }
    }

    fn repo_endpoint(&self) -> String {
        format!(
            "{}/repos/{}/{}",
            self.endpoints.api_base, self.repo.owner, self.repo.name
        )
    }

    fn permission_endpoint(&self, actor: &str) -> String {
        let actor = utf8_percent_encode(actor, NON_ALPHANUMERIC);
        format!("{}/collaborators/{actor}/permission", self.repo_endpoint())
    }

    fn issue_comments_endpoint(&self) -> String {
        format!("{}/issues/{}/comments", self.repo_endpoint(), self.number)
    }

    fn issue_comment_endpoint(&self, comment_id: u64) -> String {
        format!("{}/issues/comments/{comment_id}", self.repo_endpoint())
    }

    fn pulls_endpoint(&self) -> String {
        format!("{}/pulls", self.repo_endpoint())
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        // 공통 헤더/인증 적용.
        self.client
            .request(method, url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .bearer_auth(&self.token)
    }

    /// 요청을 보내고 2xx가 아니면 상태/본문을 담아 실패시킨다.
    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder, action: &str) -> Result<T> {
        let resp = req
            .send()
            .await
            .with_context(|| format!("github: failed to {action}"))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .with_context(|| format!("github: failed to read {action} body"))?;

        if !status.is_success() {
            anyhow::bail!("github: failed to {action} ({status}): {body}");
        }

        serde_json::from_str(&body).with_context(|| format!("github: invalid {action} JSON"))
    }

    async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        action: &str,
    ) -> Result<graphql::GraphQlResponse<T>> {
        let variables = json!({
            "owner": self.repo.owner,
            "repo": self.repo.name,
            "number": self.number,
            "limit": PAGE_LIMIT,
        });
        let req = self
            .request(Method::POST, self.endpoints.graphql_url.clone())
            .json(&json!({ "query": query, "variables": variables }));
        self.send_json(req, action).await
    }
}

#[derive(Debug, Deserialize)]
struct PermissionResponse {
    permission: String,
}

#[derive(Debug, Deserialize)]
struct IssueCommentResponse {
    id: u64,
    #[serde(default)]
    body: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryResponse {
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct PullCreatedResponse {
    number: u64,
}

impl From<IssueCommentResponse> for RemoteComment {
    fn from(comment: IssueCommentResponse) -> Self {
        Self {
            id: comment.id,
            body: comment.body,
        }
    }
}

#[async_trait]
impl HostingGateway for GitHubClient {
    async fn collaborator_permission(&self, actor: &str) -> Result<String> {
        let req = self.request(Method::GET, self.permission_endpoint(actor));
        let resp: PermissionResponse = self.send_json(req, "query permission").await?;
        Ok(resp.permission)
    }

    async fn create_comment(&self, body: &str) -> Result<RemoteComment> {
        let req = self
            .request(Method::POST, self.issue_comments_endpoint())
            .json(&json!({ "body": body }));
        let comment: IssueCommentResponse = self.send_json(req, "create comment").await?;
        Ok(comment.into())
    }

    async fn update_comment(&self, comment_id: u64, body: &str) -> Result<RemoteComment> {
        let req = self
            .request(Method::PATCH, self.issue_comment_endpoint(comment_id))
            .json(&json!({ "body": body }));
        let comment: IssueCommentResponse = self.send_json(req, "update comment").await?;
        Ok(comment.into())
    }

    async fn fetch_issue(&self) -> Result<Option<IssueSnapshot>> {
        let resp = self
            .graphql::<graphql::IssueData>(graphql::ISSUE_QUERY, "fetch issue")
            .await?;
        graphql::issue_snapshot(resp)
    }

    async fn fetch_pull_request(&self) -> Result<Option<PullRequestSnapshot>> {
        let resp = self
            .graphql::<graphql::PullRequestData>(graphql::PULL_REQUEST_QUERY, "fetch pull request")
            .await?;
        graphql::pull_request_snapshot(resp)
    }

    async fn default_branch(&self) -> Result<String> {
        let req = self.request(Method::GET, self.repo_endpoint());
        let repo: RepositoryResponse = self.send_json(req, "fetch repository").await?;
        Ok(repo.default_branch)
    }

    async fn create_pull_request(&self, request: &NewPullRequest) -> Result<u64> {
        let req = self.request(Method::POST, self.pulls_endpoint()).json(&json!({
            "title": request.title,
            "head": request.head,
            "base": request.base,
            "body": request.body,
        }));
        let created: PullCreatedResponse = self.send_json(req, "create pull request").await?;
        Ok(created.number)
    }
}
