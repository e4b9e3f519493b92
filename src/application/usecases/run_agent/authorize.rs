//! 신원/권한 게이트 단계. 어떤 쓰기 작업보다 먼저 통과해야 한다.

use anyhow::Result;

use crate::application::config::Config;
use crate::application::ports::HostingGateway;
use crate::application::usecases::run_agent::RunAgentUseCase;
use crate::domain::error::RunError;
use crate::domain::policy::is_write_permission;
use crate::domain::run::RunContext;

/// 범위 한정 토큰을 발급받고, 트리거한 사용자의 쓰기 권한을 확인한다.
/// 성공하면 토큰이 적용된 호스팅 게이트웨이를 돌려준다.
pub(super) async fn authorize(
    use_case: &RunAgentUseCase<'_>,
    ctx: &RunContext,
    config: &Config,
) -> Result<Box<dyn HostingGateway>> {
    use_case.reporter.section("Authorize");
    let credential = use_case.credential_issuer.issue(&config.auth).await?;
    use_case.reporter.kv("Token", credential.source());

    let hosting = use_case.hosting_factory.build(
        &ctx.event.repo,
        ctx.event.number,
        &config.github_endpoints(),
        &credential,
    );

    let actor = &ctx.event.actor;
    use_case
        .reporter
        .status("Auth", &format!("checking permissions for {actor}"));
    let permission = hosting
        .collaborator_permission(actor)
        .await
        .map_err(|err| RunError::PermissionCheckFailed {
            actor: actor.clone(),
            reason: format!("{err:#}"),
        })?;
    use_case.reporter.kv("Permission", &permission);

    if !is_write_permission(&permission) {
        return Err(RunError::InsufficientPermission {
            actor: actor.clone(),
            permission,
        }
        .into());
    }

    Ok(hosting)
}
