//! 작업 트리 재조정 단계.
//!
//! 상태: Clean / DirtyPullRequest / DirtyIssue -> Done. 재시도는 없다.

use anyhow::Result;

use crate::application::ports::{GenerationAgent, HostingGateway, WorkingTree};
use crate::application::usecases::run_agent::RunAgentUseCase;
use crate::application::usecases::run_agent::delegate::request_summary;
use crate::domain::context::ContextBundle;
use crate::domain::policy::{new_branch_name, pull_request_body};
use crate::domain::run::{AgentResponse, NewPullRequest, ReconcileOutcome, RunContext};
use crate::domain::trigger::EntityKind;

pub(super) struct ReconcileInput<'r> {
    pub ctx: &'r RunContext,
    pub hosting: &'r dyn HostingGateway,
    pub agent: &'r dyn GenerationAgent,
    pub tree: &'r dyn WorkingTree,
    pub bundle: &'r ContextBundle,
    pub response: &'r AgentResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TreeState {
    Clean,
    DirtyPullRequest,
    DirtyIssue,
}

/// 위임 후 작업 트리를 확인하고 기존 브랜치 갱신 / 새 브랜치+PR 중 하나를 수행한다.
pub(super) async fn reconcile(
    use_case: &RunAgentUseCase<'_>,
    input: ReconcileInput<'_>,
) -> Result<ReconcileOutcome> {
    use_case.reporter.section("Reconcile");
    let dirty = input.tree.is_dirty().await?;
    let state = match (dirty, input.ctx.entity) {
        (false, _) => TreeState::Clean,
        (true, EntityKind::PullRequest) => TreeState::DirtyPullRequest,
        (true, EntityKind::Issue) => TreeState::DirtyIssue,
    };
    tracing::debug!(?state, "working tree inspected");

    match state {
        TreeState::Clean => {
            use_case.reporter.status("Git", "working tree clean");
            Ok(ReconcileOutcome::Clean)
        }
        TreeState::DirtyPullRequest => push_to_head(use_case, &input).await,
        TreeState::DirtyIssue => open_pull_request(use_case, &input).await,
    }
}

async fn push_to_head(
    use_case: &RunAgentUseCase<'_>,
    input: &ReconcileInput<'_>,
) -> Result<ReconcileOutcome> {
    let summary = request_summary(
        use_case,
        input.agent,
        input.ctx,
        input.bundle,
        input.response,
    )
    .await?;
    let branch = input
        .bundle
        .head_ref
        .clone()
        .ok_or_else(|| anyhow::anyhow!("internal error: pull request context has no head branch"))?;

    use_case
        .reporter
        .status("Git", &format!("committing to {branch}"));
    input.tree.commit_all(&summary).await?;
    input.tree.push(&branch, false).await?;

    Ok(ReconcileOutcome::PushedToHead { branch, summary })
}

async fn open_pull_request(
    use_case: &RunAgentUseCase<'_>,
    input: &ReconcileInput<'_>,
) -> Result<ReconcileOutcome> {
    let summary = request_summary(
        use_case,
        input.agent,
        input.ctx,
        input.bundle,
        input.response,
    )
    .await?;
    let branch = new_branch_name(
        input.ctx.entity,
        input.ctx.event.number,
        use_case.clock.now_utc(),
    );

    use_case
        .reporter
        .status("Git", &format!("pushing new branch {branch}"));
    input.tree.create_branch(&branch).await?;
    input.tree.commit_all(&summary).await?;
    input.tree.push(&branch, true).await?;

    use_case.reporter.status("GitHub", "creating pull request");
    let base = input.hosting.default_branch().await?;
    let number = input
        .hosting
        .create_pull_request(&NewPullRequest {
            head: branch.clone(),
            base,
            title: summary.clone(),
            body: pull_request_body(&input.response.text, input.ctx.event.number),
        })
        .await?;
    use_case
        .reporter
        .kv("Pull Request", &format!("#{number}"));

    Ok(ReconcileOutcome::OpenedPullRequest {
        branch,
        number,
        summary,
    })
}
