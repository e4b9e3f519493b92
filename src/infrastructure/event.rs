//! GitHub Actions 실행 환경과 웹훅 페이로드에서 트리거 이벤트를 읽는다.

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::application::ports::EventSource;
use crate::domain::run::{RunEnvironment, RunOptions};
use crate::domain::trigger::{RepoRef, TriggerEvent};

/// 러너가 주입하는 환경 변수 묶음.
#[derive(Debug, Clone, Default)]
pub struct ActionsEnv {
    pub event_name: Option<String>,
    pub event_path: Option<String>,
    pub repository: Option<String>,
    pub actor: Option<String>,
    pub run_id: Option<String>,
}

impl ActionsEnv {
    pub fn from_env() -> Self {
        let var = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            event_name: var("GITHUB_EVENT_NAME"),
            event_path: var("GITHUB_EVENT_PATH"),
            repository: var("GITHUB_REPOSITORY"),
            actor: var("GITHUB_ACTOR"),
            run_id: var("GITHUB_RUN_ID"),
        }
    }
}

/// 프로세스 환경을 읽는 이벤트 소스.
pub struct GitHubEventSource;

impl EventSource for GitHubEventSource {
    fn load(&self, options: &RunOptions) -> Result<RunEnvironment> {
        load_environment(&ActionsEnv::from_env(), options)
    }
}

/// CLI 옵션이 환경 값보다 우선한다.
pub fn load_environment(actions: &ActionsEnv, options: &RunOptions) -> Result<RunEnvironment> {
    let kind = options
        .event_name
        .clone()
        .or_else(|| actions.event_name.clone())
        .context("GITHUB_EVENT_NAME is not set (or pass --event-name)")?;
    let path = options
        .event_path
        .clone()
        .or_else(|| actions.event_path.as_ref().map(PathBuf::from))
        .context("GITHUB_EVENT_PATH is not set (or pass --event-path)")?;
    let run_id = actions
        .run_id
        .clone()
        .context("GITHUB_RUN_ID is not set")?;

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read event payload at {}", path.display()))?;
    let event = parse_event(&kind, &raw, actions)
        .with_context(|| format!("failed to parse event payload in {}", path.display()))?;

    Ok(RunEnvironment { event, run_id })
}

#[derive(Debug, Default, Deserialize)]
struct Payload {
    #[serde(default)]
    issue: Option<IssuePayload>,
    #[serde(default)]
    comment: Option<CommentPayload>,
    #[serde(default)]
    repository: Option<RepositoryPayload>,
    #[serde(default)]
    sender: Option<UserPayload>,
}

#[derive(Debug, Deserialize)]
struct IssuePayload {
    number: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct CommentPayload {
    id: u64,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    user: Option<UserPayload>,
}

#[derive(Debug, Deserialize)]
struct RepositoryPayload {
    #[serde(default)]
    owner: Option<UserPayload>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    full_name: Option<String>,
}

impl RepositoryPayload {
    fn repo_ref(&self) -> Option<Result<RepoRef>> {
        if let (Some(owner), Some(name)) = (&self.owner, &self.name) {
            return Some(RepoRef::parse(&format!("{}/{name}", owner.login)));
        }
        self.full_name.as_deref().map(RepoRef::parse)
    }
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    login: String,
}

/// 페이로드 JSON을 이벤트로 변환한다.
/// 코멘트 이벤트가 아닌 경우 이슈/코멘트 필드가 없을 수 있어 기본값으로 채운다.
pub fn parse_event(kind: &str, payload: &str, actions: &ActionsEnv) -> Result<TriggerEvent> {
    let payload: Payload = serde_json::from_str(payload).context("invalid event JSON")?;

    let repo = match &actions.repository {
        Some(slug) => RepoRef::parse(slug)?,
        None => payload
            .repository
            .as_ref()
            .and_then(RepositoryPayload::repo_ref)
            .context("GITHUB_REPOSITORY is not set and payload has no repository")??,
    };

    // GITHUB_ACTOR > 코멘트 작성자 > sender
    let actor = actions
        .actor
        .clone()
        .or_else(|| {
            payload
                .comment
                .as_ref()
                .and_then(|c| c.user.as_ref())
                .map(|u| u.login.clone())
        })
        .or_else(|| payload.sender.as_ref().map(|s| s.login.clone()))
        .unwrap_or_default();

    let (number, title, is_pull_request) = match payload.issue {
        Some(issue) => (issue.number, issue.title, issue.pull_request.is_some()),
        None => (0, String::new(), false),
    };
    let (comment_id, comment_body) = match payload.comment {
        Some(comment) => (comment.id, comment.body.unwrap_or_default()),
        None => (0, String::new()),
    };

    Ok(TriggerEvent {
        kind: kind.to_string(),
        repo,
        actor,
        number,
        title,
        comment_id,
        comment_body,
        is_pull_request,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actions() -> ActionsEnv {
        ActionsEnv {
            repository: Some("acme/widgets".to_string()),
            actor: Some("alice".to_string()),
            run_id: Some("123".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn pull_request_comment_is_detected() {
        let event = parse_event(
            "issue_comment",
            r#"{
                "issue": { "number": 7, "title": "Add cache", "pull_request": { "url": "x" } },
                "comment": { "id": 99, "body": "hey opencode fix tests" }
            }"#,
            &actions(),
        )
        .unwrap();

        assert!(event.is_pull_request);
        assert_eq!(event.number, 7);
        assert_eq!(event.comment_id, 99);
        assert_eq!(event.comment_body, "hey opencode fix tests");
        assert_eq!(event.actor, "alice");
        assert_eq!(event.repo.slug(), "acme/widgets");
    }

    #[test]
    fn non_comment_payload_still_parses() {
        let env = ActionsEnv::default();
        let event = parse_event(
            "push",
            r#"{ "repository": { "full_name": "acme/widgets" }, "sender": { "login": "bob" } }"#,
            &env,
        )
        .unwrap();
        assert_eq!(event.kind, "push");
        assert_eq!(event.actor, "bob");
        assert_eq!(event.number, 0);
    }

    #[test]
    fn payload_supplies_repository_and_comment_author_without_env() {
        let event = parse_event(
            "issue_comment",
            r#"{
                "issue": { "number": 12, "title": "Crash" },
                "comment": { "id": 4, "body": "hey opencode fix", "user": { "login": "carol" } },
                "repository": { "owner": { "login": "acme" }, "name": "widgets" },
                "sender": { "login": "dave" }
            }"#,
            &ActionsEnv::default(),
        )
        .unwrap();
        assert_eq!(event.repo.slug(), "acme/widgets");
        assert_eq!(event.actor, "carol");
    }

    #[test]
    fn cli_options_override_env_and_payload_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        fs::write(
            &path,
            r#"{ "issue": { "number": 3, "title": "Bug" }, "comment": { "id": 1, "body": "hey opencode go" } }"#,
        )
        .unwrap();

        let mut env = actions();
        env.event_name = Some("pull_request".to_string());
        env.event_path = Some("/nonexistent/event.json".to_string());
        let options = RunOptions {
            event_name: Some("issue_comment".to_string()),
            event_path: Some(path),
            model: None,
        };

        let loaded = load_environment(&env, &options).unwrap();
        assert_eq!(loaded.event.kind, "issue_comment");
        assert_eq!(loaded.event.title, "Bug");
        assert!(!loaded.event.is_pull_request);
        assert_eq!(loaded.run_id, "123");
    }

    #[test]
    fn missing_run_id_is_reported() {
        let mut env = actions();
        env.run_id = None;
        let options = RunOptions {
            event_name: Some("issue_comment".to_string()),
            event_path: Some(PathBuf::from("/tmp/none.json")),
            model: None,
        };
        let err = load_environment(&env, &options).unwrap_err();
        assert!(err.to_string().contains("GITHUB_RUN_ID"));
    }
}
