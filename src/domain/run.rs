//! 실행 단위 엔티티/값 객체.

use std::fmt;
use std::path::PathBuf;

use crate::domain::trigger::{EntityKind, Instruction, TriggerEvent};

/// CLI에서 받은 실행 옵션. 비어 있으면 환경변수 값을 사용한다.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub event_name: Option<String>,
    pub event_path: Option<PathBuf>,
    pub model: Option<String>,
}

/// 이벤트 소스가 돌려주는 원본 입력(웹훅 이벤트 + 실행 식별자).
#[derive(Debug, Clone)]
pub struct RunEnvironment {
    pub event: TriggerEvent,
    pub run_id: String,
}

/// 트리거 페이로드로부터 한 번 만들어져 모든 단계에 전달되는 실행 컨텍스트.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub event: TriggerEvent,
    pub instruction: Instruction,
    pub entity: EntityKind,
    pub run_id: String,
    pub server_url: String,
    pub model: Option<String>,
}

impl RunContext {
    /// 현재 자동화 실행(run) 페이지 링크.
    pub fn run_url(&self) -> String {
        format!(
            "{}/{}/actions/runs/{}",
            self.server_url.trim_end_matches('/'),
            self.event.repo.slug(),
            self.run_id
        )
    }

    /// 컨텍스트에서 제외할 코멘트 id(상태 코멘트 + 트리거 코멘트).
    pub fn excluded_comment_ids(&self, status: &StatusComment) -> [u64; 2] {
        [status.id, self.event.comment_id]
    }
}

/// 실행 동안만 보유하는 범위 한정 접근 토큰. 로그/Debug에 값을 남기지 않는다.
#[derive(Clone)]
pub struct Credential {
    token: String,
    source: String,
}

impl Credential {
    pub fn new(token: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            source: source.into(),
        }
    }

    pub fn secret(&self) -> &str {
        &self.token
    }

    /// 토큰 출처 표기(exchange/env:NAME/inline/cmd:...).
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// 실행당 하나뿐인 상태 코멘트 핸들. `open`만 이 값을 만들 수 있다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusComment {
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteComment {
    pub id: u64,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// 새 세션으로 시작.
    Fresh,
    /// 직전 호출의 세션 상태를 이어서 사용(요약 요청용).
    Continue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentResponse {
    pub text: String,
    /// 에이전트가 공유 세션 링크를 출력했을 때만 존재.
    pub share_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    pub head: String,
    pub base: String,
    pub title: String,
    pub body: String,
}

/// 재조정 엔진의 종료 상태.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// 작업 트리 변경 없음.
    Clean,
    /// 기존 PR head 브랜치에 커밋/푸시.
    PushedToHead { branch: String, summary: String },
    /// 새 브랜치 + 새 PR.
    OpenedPullRequest {
        branch: String,
        number: u64,
        summary: String,
    },
}

/// 성공한 실행의 결과 요약.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub status: StatusComment,
    pub outcome: ReconcileOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trigger::{RepoRef, parse_instruction};

    #[test]
    fn credential_debug_redacts_token() {
        let credential = Credential::new("ghs_supersecret", "exchange");
        let rendered = format!("{credential:?}");
        assert!(!rendered.contains("ghs_supersecret"));
        assert!(rendered.contains("exchange"));
        assert_eq!(credential.secret(), "ghs_supersecret");
    }

    #[test]
    fn run_url_points_at_actions_run() {
        let ctx = RunContext {
            event: TriggerEvent {
                kind: "issue_comment".to_string(),
                repo: RepoRef {
                    owner: "acme".to_string(),
                    name: "widgets".to_string(),
                },
                actor: "alice".to_string(),
                number: 42,
                title: "Typo".to_string(),
                comment_id: 7,
                comment_body: "hey opencode, fix".to_string(),
                is_pull_request: false,
            },
            instruction: parse_instruction("hey opencode, fix").unwrap(),
            entity: EntityKind::Issue,
            run_id: "123456".to_string(),
            server_url: "https://github.com/".to_string(),
            model: None,
        };
        assert_eq!(
            ctx.run_url(),
            "https://github.com/acme/widgets/actions/runs/123456"
        );
        assert_eq!(ctx.excluded_comment_ids(&StatusComment { id: 9 }), [9, 7]);
    }
}
