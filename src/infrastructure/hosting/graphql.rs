//! 이슈/PR 컨텍스트 조회용 GraphQL 쿼리와 응답 매핑.

use anyhow::{Result, bail};
use serde::Deserialize;

use crate::domain::context::{
    CommentSnapshot, CommitSnapshot, FileChange, IssueSnapshot, PullRequestSnapshot,
    ReviewCommentSnapshot, ReviewSnapshot,
};

// 각 연결의 페이지 상한은 `$limit` 변수(domain::context::PAGE_LIMIT)로 받는다.
pub(super) const ISSUE_QUERY: &str = r#"
query($owner: String!, $repo: String!, $number: Int!, $limit: Int!) {
  repository(owner: $owner, name: $repo) {
    issue(number: $number) {
      title
      body
      author { login }
      createdAt
      state
      comments(first: $limit) {
        nodes { databaseId author { login } createdAt body }
      }
    }
  }
}
"#;

pub(super) const PULL_REQUEST_QUERY: &str = r#"
query($owner: String!, $repo: String!, $number: Int!, $limit: Int!) {
  repository(owner: $owner, name: $repo) {
    pullRequest(number: $number) {
      title
      body
      author { login }
      createdAt
      state
      baseRefName
      headRefName
      headRefOid
      additions
      deletions
      commits(first: $limit) {
        totalCount
        nodes { commit { oid message author { name } } }
      }
      files(first: $limit) {
        nodes { path changeType additions deletions }
      }
      comments(first: $limit) {
        nodes { databaseId author { login } createdAt body }
      }
      reviews(first: $limit) {
        nodes {
          author { login }
          submittedAt
          body
          comments(first: $limit) { nodes { path line body } }
        }
      }
    }
  }
}
"#;

#[derive(Debug, Deserialize)]
pub(super) struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct IssueData {
    repository: Option<IssueRepository>,
}

#[derive(Debug, Deserialize)]
struct IssueRepository {
    issue: Option<IssueNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PullRequestData {
    repository: Option<PullRequestRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestRepository {
    pull_request: Option<PullRequestNode>,
}

#[derive(Debug, Deserialize)]
struct Connection<T> {
    #[serde(default = "Vec::new")]
    nodes: Vec<Option<T>>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<T> Connection<T> {
    fn into_vec<U>(self, f: impl Fn(T) -> U) -> Vec<U> {
        self.nodes.into_iter().flatten().map(f).collect()
    }
}

#[derive(Debug, Deserialize)]
struct Actor {
    login: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueNode {
    title: String,
    #[serde(default)]
    body: String,
    author: Option<Actor>,
    created_at: String,
    state: String,
    #[serde(default)]
    comments: Connection<CommentNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentNode {
    database_id: Option<u64>,
    author: Option<Actor>,
    created_at: String,
    #[serde(default)]
    body: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestNode {
    title: String,
    #[serde(default)]
    body: String,
    author: Option<Actor>,
    created_at: String,
    state: String,
    base_ref_name: String,
    head_ref_name: String,
    head_ref_oid: String,
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
    #[serde(default)]
    commits: CommitConnection,
    #[serde(default)]
    files: Connection<FileNode>,
    #[serde(default)]
    comments: Connection<CommentNode>,
    #[serde(default)]
    reviews: Connection<ReviewNode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitConnection {
    #[serde(default)]
    total_count: u64,
    #[serde(default)]
    nodes: Vec<Option<CommitEdge>>,
}

#[derive(Debug, Deserialize)]
struct CommitEdge {
    commit: CommitNode,
}

#[derive(Debug, Deserialize)]
struct CommitNode {
    oid: String,
    #[serde(default)]
    message: String,
    author: Option<GitActor>,
}

#[derive(Debug, Deserialize)]
struct GitActor {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileNode {
    path: String,
    change_type: String,
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewNode {
    author: Option<Actor>,
    submitted_at: Option<String>,
    #[serde(default)]
    body: String,
    #[serde(default)]
    comments: Connection<ReviewCommentNode>,
}

#[derive(Debug, Deserialize)]
struct ReviewCommentNode {
    path: String,
    line: Option<u64>,
    #[serde(default)]
    body: String,
}

pub(super) fn issue_snapshot(resp: GraphQlResponse<IssueData>) -> Result<Option<IssueSnapshot>> {
    let node = resp
        .data
        .and_then(|d| d.repository)
        .and_then(|r| r.issue);
    Ok(present_or_not_found(node, &resp.errors)?.map(IssueNode::into_snapshot))
}

pub(super) fn pull_request_snapshot(
    resp: GraphQlResponse<PullRequestData>,
) -> Result<Option<PullRequestSnapshot>> {
    let node = resp
        .data
        .and_then(|d| d.repository)
        .and_then(|r| r.pull_request);
    Ok(present_or_not_found(node, &resp.errors)?.map(PullRequestNode::into_snapshot))
}

/// 노드가 비어 있을 때 NOT_FOUND 오류만 있으면 `None`, 그 외 오류는 실패로 본다.
fn present_or_not_found<N>(node: Option<N>, errors: &[GraphQlError]) -> Result<Option<N>> {
    if node.is_some() {
        return Ok(node);
    }
    if errors
        .iter()
        .all(|e| e.kind.as_deref() == Some("NOT_FOUND"))
    {
        return Ok(None);
    }
    let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
    bail!("github graphql: {}", messages.join("; "))
}

fn login(actor: Option<Actor>) -> Option<String> {
    actor.map(|a| a.login)
}

impl IssueNode {
    fn into_snapshot(self) -> IssueSnapshot {
        IssueSnapshot {
            title: self.title,
            body: self.body,
            author: login(self.author),
            created_at: self.created_at,
            state: self.state,
            comments: self.comments.into_vec(CommentNode::into_snapshot),
        }
    }
}

impl CommentNode {
    fn into_snapshot(self) -> CommentSnapshot {
        CommentSnapshot {
            database_id: self.database_id,
            author: login(self.author),
            created_at: self.created_at,
            body: self.body,
        }
    }
}

impl PullRequestNode {
    fn into_snapshot(self) -> PullRequestSnapshot {
        PullRequestSnapshot {
            title: self.title,
            body: self.body,
            author: login(self.author),
            created_at: self.created_at,
            state: self.state,
            base_ref: self.base_ref_name,
            head_ref: self.head_ref_name,
            head_oid: self.head_ref_oid,
            additions: self.additions,
            deletions: self.deletions,
            total_commits: self.commits.total_count,
            commits: self
                .commits
                .nodes
                .into_iter()
                .flatten()
                .map(|edge| CommitSnapshot {
                    oid: edge.commit.oid,
                    message: edge.commit.message,
                    author_name: edge.commit.author.and_then(|a| a.name),
                })
                .collect(),
            files: self.files.into_vec(|f| FileChange {
                path: f.path,
                change_type: f.change_type,
                additions: f.additions,
                deletions: f.deletions,
            }),
            comments: self.comments.into_vec(CommentNode::into_snapshot),
            reviews: self.reviews.into_vec(|r| ReviewSnapshot {
                author: login(r.author),
                submitted_at: r.submitted_at,
                body: r.body,
                comments: r.comments.into_vec(|c| ReviewCommentSnapshot {
                    path: c.path,
                    line: c.line,
                    body: c.body,
                }),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse_pr(value: serde_json::Value) -> Result<Option<PullRequestSnapshot>> {
        pull_request_snapshot(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn pull_request_payload_maps_every_section() {
        let pr = parse_pr(json!({
            "data": { "repository": { "pullRequest": {
                "title": "Add cache",
                "body": "desc",
                "author": { "login": "bob" },
                "createdAt": "2024-01-01T00:00:00Z",
                "state": "OPEN",
                "baseRefName": "main",
                "headRefName": "feature/cache",
                "headRefOid": "abcdef1234567",
                "additions": 10,
                "deletions": 2,
                "commits": { "totalCount": 3, "nodes": [
                    { "commit": { "oid": "abcdef1234567", "message": "Add cache\n\nbody", "author": { "name": "Bob" } } }
                ] },
                "files": { "nodes": [
                    { "path": "src/cache.rs", "changeType": "ADDED", "additions": 10, "deletions": 0 }
                ] },
                "comments": { "nodes": [] },
                "reviews": { "nodes": [
                    { "author": null, "submittedAt": null, "body": "lgtm",
                      "comments": { "nodes": [ { "path": "src/cache.rs", "line": null, "body": "nit" } ] } }
                ] }
            } } }
        }))
        .unwrap()
        .unwrap();

        assert_eq!(pr.head_ref, "feature/cache");
        assert_eq!(pr.total_commits, 3);
        assert_eq!(pr.commits[0].author_name.as_deref(), Some("Bob"));
        assert_eq!(pr.files[0].change_type, "ADDED");
        assert_eq!(pr.reviews[0].author, None);
        assert_eq!(pr.reviews[0].comments[0].line, None);
    }

    #[test]
    fn other_errors_fail_instead_of_not_found() {
        let err = parse_pr(json!({
            "data": null,
            "errors": [ { "message": "API rate limit exceeded", "type": "RATE_LIMITED" } ]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("rate limit"));
    }

    #[test]
    fn null_node_without_errors_is_not_found() {
        let issue = issue_snapshot(
            serde_json::from_value(json!({ "data": { "repository": { "issue": null } } })).unwrap(),
        )
        .unwrap();
        assert!(issue.is_none());
    }
}
