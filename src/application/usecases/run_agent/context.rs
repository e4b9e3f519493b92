//! 이슈/PR 컨텍스트 수집 및 렌더링 단계.

use anyhow::Result;

use crate::application::ports::HostingGateway;
use crate::application::usecases::run_agent::RunAgentUseCase;
use crate::domain::context::{ContextBundle, render_issue_context, render_pull_request_context};
use crate::domain::error::RunError;
use crate::domain::run::{RunContext, StatusComment};
use crate::domain::trigger::EntityKind;

/// 대상 종류에 맞는 메타데이터를 가져와 컨텍스트 블록으로 렌더링한다.
/// 상태 코멘트와 트리거 코멘트는 에이전트에게 보이지 않도록 제외한다.
pub(super) async fn assemble_context(
    use_case: &RunAgentUseCase<'_>,
    ctx: &RunContext,
    hosting: &dyn HostingGateway,
    status: &StatusComment,
) -> Result<ContextBundle> {
    use_case.reporter.section("Context");
    let excluded = ctx.excluded_comment_ids(status);
    let not_found = || RunError::EntityNotFound {
        kind: ctx.entity,
        number: ctx.event.number,
    };

    let bundle = match ctx.entity {
        EntityKind::Issue => {
            use_case.reporter.status("GitHub", "fetching issue data");
            let issue = hosting.fetch_issue().await?.ok_or_else(not_found)?;
            render_issue_context(&issue, &excluded)
        }
        EntityKind::PullRequest => {
            use_case.reporter.status("GitHub", "fetching pull request data");
            let pr = hosting.fetch_pull_request().await?.ok_or_else(not_found)?;
            render_pull_request_context(&pr, &excluded)
        }
    };

    use_case.reporter.kv("Title", &bundle.title);
    use_case
        .reporter
        .kv("Context", &format!("{} bytes", bundle.text.len()));
    Ok(bundle)
}
