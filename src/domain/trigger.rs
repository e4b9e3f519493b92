//! 코멘트 이벤트 해석(Trigger Parser).
//! 지원 이벤트 여부를 확인하고 호출 문구 뒤의 지시문을 추출한다.

use std::fmt;
use std::sync::LazyLock;

use anyhow::{Result, bail};
use regex::Regex;

use crate::domain::error::RunError;

/// 처리 가능한 유일한 이벤트 종류(이슈/PR 코멘트).
pub const SUPPORTED_EVENT: &str = "issue_comment";

// 본문은 trim 이후 매칭한다. `.`은 개행을 넘지 않으므로 지시문은 한 줄이다.
static INVOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^hey\s*opencode,?\s*(.*)$").expect("invocation pattern must compile")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// `owner/repo` 형식을 해석한다.
    pub fn parse(slug: &str) -> Result<Self> {
        let Some((owner, name)) = slug.trim().split_once('/') else {
            bail!("invalid repository '{slug}': expected owner/repo");
        };
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            bail!("invalid repository '{slug}': expected owner/repo");
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// 웹훅 페이로드에서 한 번 만들어지고 이후 변경되지 않는 입력 이벤트.
#[derive(Debug, Clone)]
pub struct TriggerEvent {
    pub kind: String,
    pub repo: RepoRef,
    pub actor: String,
    pub number: u64,
    pub title: String,
    pub comment_id: u64,
    pub comment_body: String,
    pub is_pull_request: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Issue,
    PullRequest,
}

impl EntityKind {
    /// 브랜치 이름에 쓰이는 짧은 표기.
    pub fn label(self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::PullRequest => "pr",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Issue => f.write_str("Issue"),
            Self::PullRequest => f.write_str("PR"),
        }
    }
}

/// 호출 문구 뒤의 자유 텍스트. 빈 값은 만들 수 없다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction(String);

impl Instruction {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTrigger {
    pub instruction: Instruction,
    pub entity: EntityKind,
}

/// 이벤트 종류를 검증하고 지시문과 대상 종류를 돌려준다. 부수효과 없음.
pub fn parse_trigger(event: &TriggerEvent) -> Result<ParsedTrigger, RunError> {
    if event.kind != SUPPORTED_EVENT {
        return Err(RunError::UnsupportedEvent {
            kind: event.kind.clone(),
        });
    }

    let instruction = parse_instruction(&event.comment_body)?;
    let entity = if event.is_pull_request {
        EntityKind::PullRequest
    } else {
        EntityKind::Issue
    };

    Ok(ParsedTrigger {
        instruction,
        entity,
    })
}

/// 코멘트 본문에서 지시문을 추출한다.
pub fn parse_instruction(body: &str) -> Result<Instruction, RunError> {
    let captured = INVOCATION
        .captures(body.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .ok_or(RunError::MalformedCommand)?;

    if captured.is_empty() {
        return Err(RunError::MalformedCommand);
    }
    Ok(Instruction(captured.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: &str, body: &str, is_pull_request: bool) -> TriggerEvent {
        TriggerEvent {
            kind: kind.to_string(),
            repo: RepoRef {
                owner: "acme".to_string(),
                name: "widgets".to_string(),
            },
            actor: "alice".to_string(),
            number: 42,
            title: "Typo in README".to_string(),
            comment_id: 1001,
            comment_body: body.to_string(),
            is_pull_request,
        }
    }

    #[test]
    fn instruction_follows_phrase_with_optional_comma() {
        let cases = [
            ("hey opencode, fix the typo", "fix the typo"),
            ("hey opencode fix the typo", "fix the typo"),
            ("HEY OpenCode,   fix the typo  ", "fix the typo"),
            ("  heyopencode,fix it\n", "fix it"),
        ];
        for (body, expected) in cases {
            let instruction = parse_instruction(body).expect(body);
            assert_eq!(instruction.as_str(), expected, "body: {body:?}");
        }
    }

    #[test]
    fn bodies_without_phrase_are_malformed() {
        for body in ["please fix", "hi opencode, fix", "opencode fix", "", "fix it hey opencode"] {
            assert!(
                matches!(parse_instruction(body), Err(RunError::MalformedCommand)),
                "body: {body:?}"
            );
        }
    }

    #[test]
    fn empty_instruction_is_malformed() {
        for body in ["hey opencode", "hey opencode,", "  hey opencode,   "] {
            assert!(
                matches!(parse_instruction(body), Err(RunError::MalformedCommand)),
                "body: {body:?}"
            );
        }
    }

    #[test]
    fn instruction_must_fit_on_one_line() {
        let body = "hey opencode, fix the typo\nand also the tests";
        assert!(matches!(
            parse_instruction(body),
            Err(RunError::MalformedCommand)
        ));
    }

    #[test]
    fn non_comment_events_are_unsupported() {
        let err = parse_trigger(&event("push", "hey opencode, fix", false)).unwrap_err();
        assert!(matches!(err, RunError::UnsupportedEvent { ref kind } if kind == "push"));
    }

    #[test]
    fn pull_request_flag_selects_entity_kind() {
        let parsed = parse_trigger(&event(SUPPORTED_EVENT, "hey opencode, review", true))
            .expect("valid trigger");
        assert_eq!(parsed.entity, EntityKind::PullRequest);
        assert_eq!(parsed.instruction.as_str(), "review");

        let parsed = parse_trigger(&event(SUPPORTED_EVENT, "hey opencode, fix", false))
            .expect("valid trigger");
        assert_eq!(parsed.entity, EntityKind::Issue);
    }

    #[test]
    fn repo_ref_requires_owner_and_name() {
        let repo = RepoRef::parse("acme/widgets").expect("valid slug");
        assert_eq!(repo.slug(), "acme/widgets");
        assert!(RepoRef::parse("acme").is_err());
        assert!(RepoRef::parse("/widgets").is_err());
        assert!(RepoRef::parse("a/b/c").is_err());
    }
}
