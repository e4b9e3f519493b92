//! 도메인 정책(권한 규칙, 브랜치 이름, 요약/상태 문구 구성).

use chrono::{DateTime, Utc};

use crate::domain::context::ContextBundle;
use crate::domain::run::{AgentResponse, ReconcileOutcome};
use crate::domain::trigger::{EntityKind, Instruction};

/// 커밋 메시지/PR 제목으로 쓰는 요약의 최대 글자 수.
pub const MAX_SUMMARY_CHARS: usize = 40;

/// 상태 코멘트 최초 본문.
pub const STATUS_STARTED: &str = "opencode started...";

const WRITE_PERMISSIONS: [&str; 2] = ["admin", "write"];

/// 쓰기 작업을 허용하는 협업자 권한인지 판단한다.
pub fn is_write_permission(level: &str) -> bool {
    WRITE_PERMISSIONS.contains(&level.trim())
}

/// `<kind>/<kind><number>-<YYYYMMDDHHMMSS>` (UTC) 형식의 새 브랜치 이름.
pub fn new_branch_name(kind: EntityKind, number: u64, now: DateTime<Utc>) -> String {
    format!(
        "{label}/{label}{number}-{stamp}",
        label = kind.label(),
        stamp = now.format("%Y%m%d%H%M%S")
    )
}

/// 첫 위임 호출용 프롬프트(지시문 + 컨텍스트 블록).
pub fn build_task_prompt(instruction: &Instruction, bundle: &ContextBundle) -> String {
    format!("{}\n\n{}", instruction.as_str(), bundle.text)
}

/// 이어서 실행되는 요약 요청 프롬프트. 새 컨텍스트는 넣지 않는다.
pub fn build_summary_prompt(response: &str) -> String {
    format!(
        "Summarize the following in less than {MAX_SUMMARY_CHARS} characters:\n\n{response}"
    )
}

/// 에이전트 요약 응답을 한 줄 커밋 메시지로 정리한다. 비어 있으면 `None`.
pub fn normalize_summary(raw: &str) -> Option<String> {
    let line = raw
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())?
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim();
    if line.is_empty() {
        return None;
    }
    Some(clamp_chars(line, MAX_SUMMARY_CHARS))
}

/// 요약이 비었을 때 제목에서 만드는 기본 메시지.
pub fn fallback_summary(kind: EntityKind, title: &str) -> String {
    let raw = match kind {
        EntityKind::Issue => format!("Fix issue: {}", title.trim()),
        EntityKind::PullRequest => format!("Update pull request: {}", title.trim()),
    };
    clamp_chars(raw.trim(), MAX_SUMMARY_CHARS)
}

/// 문자 경계를 지키며 최대 `max` 글자로 자른다.
pub fn clamp_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cutoff, _)) => text[..cutoff].trim_end().to_string(),
        None => text.to_string(),
    }
}

/// 새 PR 본문: 에이전트 응답 + 원 이슈 닫기 참조.
pub fn pull_request_body(response: &str, issue_number: u64) -> String {
    format!("{response}\n\nCloses #{issue_number}")
}

/// 재조정 결과에 따라 상태 코멘트 최종 본문을 정한다.
pub fn final_status_text(outcome: &ReconcileOutcome, response: &AgentResponse) -> String {
    match outcome {
        ReconcileOutcome::Clean | ReconcileOutcome::PushedToHead { .. } => response.text.clone(),
        ReconcileOutcome::OpenedPullRequest { number, .. } => {
            format!("opencode created pull request #{number}")
        }
    }
}
