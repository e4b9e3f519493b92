//! 코멘트 트리거부터 위임, 작업 트리 재조정, 상태 보고까지 전체 오케스트레이션 유스케이스.
//!
//! 흐름: 트리거 해석 -> 인증/권한 확인 -> 상태 코멘트 open -> 컨텍스트 구성
//! -> 위임 -> 재조정 -> 상태 코멘트 close. 실패 처리기가 전체를 감싼다.

mod authorize;
mod context;
mod delegate;
mod reconcile;
mod status;


use anyhow::{Context, Result};

use crate::application::config::Config;
use crate::application::ports::{
    AgentFactory, Clock, ConfigRepository, CredentialIssuer, EventSource, HostingFactory,
    HostingGateway, Reporter, StatusRenderer, WorkingTreeFactory,
};
use crate::domain::error::{classify, failure_message};
use crate::domain::policy::{STATUS_STARTED, final_status_text};
use crate::domain::run::{ReconcileOutcome, RunContext, RunOptions, RunReport, StatusComment};
use crate::domain::trigger::parse_trigger;

use authorize::authorize;
use context::assemble_context;
use delegate::run_task;
use reconcile::{ReconcileInput, reconcile};
use status::StatusReporter;

/// 단일 실행의 전체 파이프라인을 조율한다. 모든 외부 호출은 순차적으로 수행된다.
pub struct RunAgentUseCase<'a> {
    pub config_repo: &'a dyn ConfigRepository,
    pub event_source: &'a dyn EventSource,
    pub credential_issuer: &'a dyn CredentialIssuer,
    pub hosting_factory: &'a dyn HostingFactory,
    pub agent_factory: &'a dyn AgentFactory,
    pub working_tree_factory: &'a dyn WorkingTreeFactory,
    pub renderer: &'a dyn StatusRenderer,
    pub reporter: &'a dyn Reporter,
    pub clock: &'a dyn Clock,
}

/// 권한 확인까지 통과한 실행. 여기까지는 어떤 쓰기도 일어나지 않는다.
struct AuthorizedRun {
    config: Config,
    ctx: RunContext,
    hosting: Box<dyn HostingGateway>,
}

/// 상태 코멘트 생성 이후의 실패. 핸들을 값으로 들고 다닌다.
struct RunFailure {
    error: anyhow::Error,
    status: Option<StatusComment>,
}

impl RunFailure {
    fn detached(error: anyhow::Error) -> Self {
        Self {
            error,
            status: None,
        }
    }

    fn attached(error: anyhow::Error, status: StatusComment) -> Self {
        Self {
            error,
            status: Some(status),
        }
    }
}

impl<'a> RunAgentUseCase<'a> {
    /// 실행 진입점.
    /// 실패 시 상태 코멘트가 있으면 오류 메시지로 덮어쓰고, 플랫폼 실패 채널로 보고한다.
    pub async fn execute(&self, options: RunOptions) -> Result<RunReport> {
        self.reporter.section("Session");

        let authorized = match self.prepare(&options).await {
            Ok(authorized) => authorized,
            Err(error) => return Err(self.fail(RunFailure::detached(error), None).await),
        };

        let status_reporter = StatusReporter {
            hosting: authorized.hosting.as_ref(),
            renderer: self.renderer,
            run_url: authorized.ctx.run_url(),
        };

        match self.drive(&authorized, &status_reporter).await {
            Ok(report) => {
                self.reporter.section("Done");
                self.reporter
                    .status("Run", &describe_outcome(&report.outcome));
                Ok(report)
            }
            Err(failure) => Err(self.fail(failure, Some(&status_reporter)).await),
        }
    }

    /// 설정/이벤트 로딩, 트리거 해석, 인증/권한 확인. 상태 코멘트 생성 전 단계.
    async fn prepare(&self, options: &RunOptions) -> Result<AuthorizedRun> {
        let mut config = self
            .config_repo
            .load()
            .context("failed to load commentpilot config")?;
        if let Some(model) = &options.model {
            config.agent.model = Some(model.clone());
        }

        let env = self
            .event_source
            .load(options)
            .context("failed to load trigger event")?;
        self.reporter.kv("Event", &env.event.kind);
        self.reporter.kv("Repository", &env.event.repo.slug());
        self.reporter.kv("Number", &env.event.number.to_string());
        self.reporter.kv("Actor", &env.event.actor);

        let parsed = parse_trigger(&env.event)?;
        let ctx = RunContext {
            entity: parsed.entity,
            instruction: parsed.instruction,
            event: env.event,
            run_id: env.run_id,
            server_url: config.github_endpoints().server_url,
            model: config.agent_spec().model,
        };

        let hosting = authorize(self, &ctx, &config).await?;
        Ok(AuthorizedRun {
            config,
            ctx,
            hosting,
        })
    }

    /// 상태 코멘트를 열고 나머지 파이프라인을 실행한다.
    async fn drive(
        &self,
        run: &AuthorizedRun,
        status_reporter: &StatusReporter<'_>,
    ) -> Result<RunReport, RunFailure> {
        let status = status_reporter
            .open(STATUS_STARTED)
            .await
            .map_err(RunFailure::detached)?;
        self.reporter
            .status("Status", &format!("opened comment {}", status.id));

        match self.work(run, status_reporter, &status).await {
            Ok(outcome) => Ok(RunReport { status, outcome }),
            Err(error) => Err(RunFailure::attached(error, status)),
        }
    }

    async fn work(
        &self,
        run: &AuthorizedRun,
        status_reporter: &StatusReporter<'_>,
        status: &StatusComment,
    ) -> Result<ReconcileOutcome> {
        let bundle = assemble_context(self, &run.ctx, run.hosting.as_ref(), status).await?;

        let tree = self.working_tree_factory.build(&run.config.git_settings());
        if let Some(head) = &bundle.head_ref {
            self.reporter
                .status("Git", &format!("checking out PR branch {head}"));
            tree.checkout_existing(head).await?;
        }

        let agent = self.agent_factory.build(&run.config.agent_spec())?;
        let response = run_task(self, agent.as_ref(), &run.ctx, &bundle).await?;

        let outcome = reconcile(
            self,
            ReconcileInput {
                ctx: &run.ctx,
                hosting: run.hosting.as_ref(),
                agent: agent.as_ref(),
                tree: tree.as_ref(),
                bundle: &bundle,
                response: &response,
            },
        )
        .await?;

        status_reporter
            .close(
                status,
                &final_status_text(&outcome, &response),
                response.share_url.as_deref(),
            )
            .await?;
        Ok(outcome)
    }

    /// 최상위 실패 처리기. 모든 실패는 여기서 한 번만 처리된다.
    async fn fail(
        &self,
        failure: RunFailure,
        status_reporter: Option<&StatusReporter<'_>>,
    ) -> anyhow::Error {
        let class = classify(&failure.error);
        let message = failure_message(&failure.error);
        tracing::error!(class = class.code(), "run failed: {:#}", failure.error);

        if let (Some(status), Some(reporter)) = (&failure.status, status_reporter)
            && let Err(update_err) = reporter.close(status, &message, None).await
        {
            // 원래 실패를 가리지 않도록 로그만 남긴다.
            tracing::warn!("failed to write failure into status comment: {update_err:#}");
        }

        self.reporter
            .failure(&format!("opencode failed with error: {message}"));
        failure.error
    }
}

fn describe_outcome(outcome: &ReconcileOutcome) -> String {
    match outcome {
        ReconcileOutcome::Clean => "no changes; replied with agent response".to_string(),
        ReconcileOutcome::PushedToHead { branch, .. } => format!("pushed changes to {branch}"),
        ReconcileOutcome::OpenedPullRequest { branch, number, .. } => {
            format!("opened pull request #{number} from {branch}")
        }
    }
}
