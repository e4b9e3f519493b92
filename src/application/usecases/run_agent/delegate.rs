//! 외부 코드 생성 에이전트 위임 단계.

use std::time::Instant;

use anyhow::Result;

use crate::application::ports::GenerationAgent;
use crate::application::usecases::run_agent::RunAgentUseCase;
use crate::domain::context::ContextBundle;
use crate::domain::policy::{
    build_summary_prompt, build_task_prompt, fallback_summary, normalize_summary,
};
use crate::domain::run::{AgentResponse, RunContext, SessionMode};

/// 지시문 + 컨텍스트를 하나의 프롬프트로 묶어 새 세션으로 실행한다.
pub(super) async fn run_task(
    use_case: &RunAgentUseCase<'_>,
    agent: &dyn GenerationAgent,
    ctx: &RunContext,
    bundle: &ContextBundle,
) -> Result<AgentResponse> {
    use_case.reporter.section("Delegate");
    if let Some(model) = &ctx.model {
        use_case.reporter.kv("Model", model);
    }
    use_case.reporter.status("Agent", "running");

    let started = Instant::now();
    let prompt = build_task_prompt(&ctx.instruction, bundle);
    let response = agent.invoke(&prompt, SessionMode::Fresh).await?;

    use_case.reporter.status(
        "Agent",
        &format!("done {:.1}s", started.elapsed().as_secs_f32()),
    );
    Ok(response)
}

/// 직전 세션을 이어서 40자 이하 요약을 요청한다. 비어 있으면 제목 기반 기본값.
pub(super) async fn request_summary(
    use_case: &RunAgentUseCase<'_>,
    agent: &dyn GenerationAgent,
    ctx: &RunContext,
    bundle: &ContextBundle,
    response: &AgentResponse,
) -> Result<String> {
    use_case.reporter.status("Agent", "summarizing changes");
    let reply = agent
        .invoke(&build_summary_prompt(&response.text), SessionMode::Continue)
        .await?;

    let summary = normalize_summary(&reply.text)
        .unwrap_or_else(|| fallback_summary(ctx.entity, &bundle.title));
    use_case.reporter.kv("Summary", &summary);
    Ok(summary)
}
